//! Defines [`SourceFile`], the identity of a candidate post file, and
//! [`discover`], which lists the candidate files under the content root.

use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// A file under the project's source directory that may or may not be a post.
/// All of the relative fields use `/` as the separator regardless of
/// platform.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SourceFile {
    /// The location of the file on disk.
    pub path: PathBuf,

    /// The path of the file relative to the source directory (e.g.,
    /// `blog/2024-01-15-hello.md`). This is the post's identity.
    pub pathname: String,

    /// The file name without any directories (e.g., `2024-01-15-hello.md`).
    pub filename: String,

    /// The directory containing the file, relative to the source directory
    /// (e.g., `blog`). Empty for files directly in the source directory.
    pub relative_dir: String,
}

impl SourceFile {
    /// Builds a [`SourceFile`] from the source directory and a `/`-separated
    /// path relative to it.
    pub fn new(source_directory: &Path, pathname: &str) -> SourceFile {
        let pathname = pathname.trim_start_matches('/');
        let (relative_dir, filename) = match pathname.rfind('/') {
            Some(i) => (&pathname[..i], &pathname[i + 1..]),
            None => ("", pathname),
        };
        SourceFile {
            path: source_directory.join(pathname),
            pathname: pathname.to_owned(),
            filename: filename.to_owned(),
            relative_dir: relative_dir.to_owned(),
        }
    }
}

/// The glob patterns claimed by a blog rooted at `content_root`.
pub fn matched_patterns(content_root: &str) -> Vec<String> {
    vec![format!("{}/*", content_root)]
}

/// Lists every file below `{source_directory}/{content_root}`, recursively,
/// ordered by file name and then by pathname, so files in subdirectories sort
/// among the rest. For date-prefixed file names the listing is oldest-first.
pub fn discover(source_directory: &Path, content_root: &str) -> walkdir::Result<Vec<SourceFile>> {
    let mut files = Vec::new();
    for result in WalkDir::new(source_directory.join(content_root))
        .min_depth(1)
        .sort_by_file_name()
    {
        let entry = result?;
        if !entry.file_type().is_file() {
            continue;
        }

        // `entry` always lives below `source_directory`
        if let Ok(relative) = entry.path().strip_prefix(source_directory) {
            let pathname = relative
                .components()
                .map(|c| c.as_os_str().to_string_lossy())
                .collect::<Vec<_>>()
                .join("/");
            files.push(SourceFile::new(source_directory, &pathname));
        }
    }
    files.sort_by(|a, b| {
        a.filename
            .cmp(&b.filename)
            .then_with(|| a.pathname.cmp(&b.pathname))
    });
    Ok(files)
}
