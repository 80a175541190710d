//! Derives a post's output path and URL from its source file name and
//! directory.
//!
//! A date-prefixed file name like `2024-01-15-hello.md` is rewritten so the
//! slug leads and the date trails: `hello-2024-01-15`. Each post is written
//! as `index.html` inside a directory named for that slug, so the URL is the
//! directory itself:
//!
//! | source                        | output path                                  | url                                |
//! |-------------------------------|----------------------------------------------|------------------------------------|
//! | `blog/2024-01-15-hello.md`    | `blog/hello-2024-01-15/index.html`           | `blog/hello-2024-01-15`            |
//! | `blog/rust/2024-01-15-rc.md`  | `blog/rust/rc-2024-01-15/index.html`         | `blog/rust/rc-2024-01-15`          |
//! | `blog/about.md`               | `blog/about/index.html`                      | `blog/about`                       |

use crate::source::SourceFile;
use regex::Regex;
use std::sync::OnceLock;

const INDEX_FILE: &str = "index.html";

fn date_prefix() -> &'static Regex {
    static DATE_PREFIX: OnceLock<Regex> = OnceLock::new();
    DATE_PREFIX.get_or_init(|| {
        Regex::new(r"^([0-9]{4}-[0-9]{2}-[0-9]{2})-(.*)$").expect("date prefix pattern is valid")
    })
}

/// The output location of a post.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Resolved {
    /// The path of the output document relative to the output directory,
    /// always `/`-separated and ending in `index.html`.
    pub output_path: String,

    /// The post's URL relative to the site root: `output_path` less its
    /// trailing `/index.html`.
    pub url: String,
}

/// Resolves [`SourceFile`]s to their [`Resolved`] output locations.
#[derive(Clone, Debug)]
pub struct Resolver {
    /// The directory holding the posts, relative to the source directory.
    /// It's stripped from the front of each file's directory.
    content_root: String,

    /// Prepended to every output path.
    url_prefix: String,
}

impl Resolver {
    pub fn new(content_root: &str, url_prefix: &str) -> Resolver {
        Resolver {
            content_root: content_root.to_owned(),
            url_prefix: url_prefix.to_owned(),
        }
    }

    /// Resolves `file` to its output path and URL. This is a pure function of
    /// the file's name and directory and the resolver's configuration. A file
    /// with an empty stem (`.md`) keeps its full name as the last segment.
    pub fn resolve(&self, file: &SourceFile) -> Resolved {
        let basename = output_name(&file.filename);
        let subdirectory = trim_separators(
            file.relative_dir
                .strip_prefix(self.content_root.as_str())
                .unwrap_or(&file.relative_dir),
        );

        let output_path = [self.url_prefix.as_str(), subdirectory, basename.as_str(), INDEX_FILE]
            .iter()
            .map(|segment| trim_separators(segment))
            .filter(|segment| !segment.is_empty())
            .collect::<Vec<_>>()
            .join("/")
            .replace('\\', "/");

        let url = match output_path.rfind('/') {
            Some(i) => output_path[..i].to_owned(),
            None => String::new(),
        };

        Resolved { output_path, url }
    }
}

/// The default title for a file: its stem with hyphens turned to spaces,
/// first letter capitalized. A date prefix is kept, so
/// `2024-01-15-hello-world.md` becomes `2024 01 15 hello world` and
/// `about-me.md` becomes `About me`.
pub fn default_title(filename: &str) -> String {
    let spaced = stem(filename).replace('-', " ");
    let mut chars = spaced.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Everything before the first `.` in a file name.
fn stem(filename: &str) -> &str {
    filename.split('.').next().unwrap_or(filename)
}

/// The directory name for a post. A file whose stem is empty (`.md`,
/// `.hidden`) keeps its whole file name so it can't resolve to the prefix
/// directory itself.
fn output_name(filename: &str) -> String {
    match stem(filename) {
        "" => filename.to_owned(),
        stem => slug(stem),
    }
}

/// Moves a leading `YYYY-MM-DD-` date to the end of the slug. Names without
/// a date prefix are returned as-is.
fn slug(basename: &str) -> String {
    match date_prefix().captures(basename) {
        Some(captures) => format!("{}-{}", &captures[2], &captures[1]),
        None => basename.to_owned(),
    }
}

fn trim_separators(s: &str) -> &str {
    s.trim_matches(|c: char| c == '/' || c == '\\' || c == std::path::MAIN_SEPARATOR)
}
