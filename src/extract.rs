//! Defines the [`Extract`] trait, which pulls the front matter out of a
//! [`SourceFile`], and [`YamlExtractor`], its YAML implementation. A file
//! with no front matter is not a post; extractors signal this by returning
//! `Ok(None)` rather than an error.

use crate::source::SourceFile;
use serde_yaml::{Mapping, Value};
use std::fmt;
use std::path::PathBuf;

const FENCE: &str = "---";

/// Converts a raw file into a mapping of front-matter keys to values.
pub trait Extract {
    /// Returns the file's front matter, or `None` if the file has none.
    fn extract(&self, file: &SourceFile) -> Result<Option<Mapping>>;
}

/// Extracts YAML front matter delimited by `---` fences:
///
/// ```md
/// ---
/// title: Hello, world!
/// post::brief: A first post
/// ---
/// # Hello
/// ```
#[derive(Clone, Copy, Debug, Default)]
pub struct YamlExtractor;

impl Extract for YamlExtractor {
    fn extract(&self, file: &SourceFile) -> Result<Option<Mapping>> {
        let bytes = std::fs::read(&file.path).map_err(|err| Error::Io {
            path: file.path.clone(),
            err,
        })?;

        // Checked before decoding so that images and other binary files
        // under the content root are simply not posts.
        if !bytes.starts_with(FENCE.as_bytes()) {
            return Ok(None);
        }
        let input = String::from_utf8(bytes).map_err(|_| Error::InvalidUtf8(file.path.clone()))?;

        let (frontmatter, _) = match split(&input) {
            Some(parts) => parts,
            None => return Err(Error::FrontmatterMissingEndFence(file.path.clone())),
        };
        if frontmatter.trim().is_empty() {
            return Ok(None);
        }
        match serde_yaml::from_str::<Value>(frontmatter) {
            Ok(Value::Null) => Ok(None),
            Ok(Value::Mapping(m)) if m.is_empty() => Ok(None),
            Ok(Value::Mapping(m)) => Ok(Some(m)),
            Ok(_) => Err(Error::NotAMapping(file.path.clone())),
            Err(err) => Err(Error::DeserializeYaml {
                path: file.path.clone(),
                err,
            }),
        }
    }
}

/// Splits `input` into its front matter and its body. Returns `None` if the
/// input doesn't begin with a fence or the closing fence is missing.
pub fn split(input: &str) -> Option<(&str, &str)> {
    fn frontmatter_indices(input: &str) -> Option<(usize, usize, usize)> {
        if !input.starts_with(FENCE) {
            return None;
        }
        let rest = &input[FENCE.len()..];
        if rest.starts_with(FENCE) {
            // `------` or an empty block written as `---\n---`
            return Some((FENCE.len(), FENCE.len(), FENCE.len() * 2));
        }
        rest.find(&format!("\n{}", FENCE)).map(|offset| {
            (
                FENCE.len(),                            // yaml_start
                FENCE.len() + offset + 1,               // yaml_stop
                FENCE.len() + offset + 1 + FENCE.len(), // body_start
            )
        })
    }

    let (yaml_start, yaml_stop, body_start) = frontmatter_indices(input)?;
    Some((&input[yaml_start..yaml_stop], &input[body_start..]))
}

/// Represents the result of a front-matter extraction.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents an error extracting front matter from a file.
#[derive(Debug)]
pub enum Error {
    /// Returned when a file opens a front-matter block with `---` but never
    /// closes it.
    FrontmatterMissingEndFence(PathBuf),

    /// Returned when the front matter isn't valid YAML.
    DeserializeYaml {
        path: PathBuf,
        err: serde_yaml::Error,
    },

    /// Returned when the front matter is valid YAML but not a mapping.
    NotAMapping(PathBuf),

    /// Returned when a file with front matter isn't valid UTF-8.
    InvalidUtf8(PathBuf),

    /// Returned when the file can't be read.
    Io { path: PathBuf, err: std::io::Error },
}

impl fmt::Display for Error {
    /// Displays an [`Error`] as human-readable text.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::FrontmatterMissingEndFence(path) => {
                write!(f, "'{}': missing closing `---`", path.display())
            }
            Error::DeserializeYaml { path, err } => {
                write!(f, "'{}': parsing front matter: {}", path.display(), err)
            }
            Error::NotAMapping(path) => {
                write!(f, "'{}': front matter must be a mapping", path.display())
            }
            Error::InvalidUtf8(path) => {
                write!(f, "'{}': file is not valid UTF-8", path.display())
            }
            Error::Io { path, err } => {
                write!(f, "reading '{}': {}", path.display(), err)
            }
        }
    }
}

impl std::error::Error for Error {
    /// Implements the [`std::error::Error`] trait for [`Error`].
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::FrontmatterMissingEndFence(_) => None,
            Error::DeserializeYaml { path: _, err } => Some(err),
            Error::NotAMapping(_) => None,
            Error::InvalidUtf8(_) => None,
            Error::Io { path: _, err } => Some(err),
        }
    }
}
