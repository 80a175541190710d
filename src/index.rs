//! Defines [`PostIndex`], the ordered collection of [`Post`]s.
//!
//! The order in which files are added is the only order the index knows:
//! it's never sorted, and navigation between posts (see [`crate::nav`]) is
//! derived from it. Callers add files newest-first, so position 0 holds the
//! newest post.

use crate::extract::{self, Extract};
use crate::path::Resolver;
use crate::post::Post;
use crate::source::SourceFile;
use serde_yaml::Value;
use std::collections::HashMap;
use std::fmt;
use tracing::debug;

/// An insertion-ordered mapping of pathname to [`Post`]. A pathname appears
/// at most once.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PostIndex {
    posts: Vec<Post>,
    positions: HashMap<String, usize>,
}

impl PostIndex {
    pub fn new() -> PostIndex {
        PostIndex::default()
    }

    /// Indexes `files` in the order given. Each file is handed to `extractor`;
    /// files with no front matter are skipped, as are files whose pathname is
    /// already indexed. Returns the number of posts added.
    pub fn extend<'f, E, I>(&mut self, files: I, extractor: &E, resolver: &Resolver) -> Result<usize>
    where
        E: Extract + ?Sized,
        I: IntoIterator<Item = &'f SourceFile>,
    {
        let mut added = 0;
        for file in files {
            if self.contains(&file.pathname) {
                debug!(pathname = %file.pathname, "already indexed");
                continue;
            }
            match extractor.extract(file)? {
                Some(raw) => {
                    self.insert(Post::new(file, &raw, resolver));
                    added += 1;
                }
                None => debug!(pathname = %file.pathname, "no front matter; not a post"),
            }
        }
        Ok(added)
    }

    /// Appends `post` unless its pathname is already present. Returns whether
    /// the post was added.
    pub fn insert(&mut self, post: Post) -> bool {
        if self.positions.contains_key(&post.pathname) {
            return false;
        }
        self.positions.insert(post.pathname.clone(), self.posts.len());
        self.posts.push(post);
        true
    }

    pub fn contains(&self, pathname: &str) -> bool {
        self.positions.contains_key(pathname)
    }

    pub fn get(&self, pathname: &str) -> Option<&Post> {
        self.position(pathname).map(|i| &self.posts[i])
    }

    /// The position of a post in index order.
    pub fn position(&self, pathname: &str) -> Option<usize> {
        self.positions.get(pathname).copied()
    }

    /// The posts in index order.
    pub fn posts(&self) -> &[Post] {
        &self.posts
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Post> {
        self.posts.iter()
    }

    pub fn len(&self) -> usize {
        self.posts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.posts.is_empty()
    }

    /// Serializes the index as a sequence of post mappings in index order.
    /// Every entry carries its own `pathname`, so [`PostIndex::from_value`]
    /// never has to pair entries with keys by position.
    pub fn to_value(&self) -> Value {
        Value::Sequence(
            self.posts
                .iter()
                .map(|post| Value::Mapping(post.to_mapping()))
                .collect(),
        )
    }

    /// Rebuilds an index from the output of [`PostIndex::to_value`].
    pub fn from_value(value: &Value) -> Result<PostIndex> {
        let entries = match value {
            Value::Sequence(entries) => entries,
            _ => return Err(Error::MalformedPosts("expected a sequence of posts".to_owned())),
        };

        let mut index = PostIndex::new();
        for (i, entry) in entries.iter().enumerate() {
            let post = match entry {
                Value::Mapping(m) => Post::from_mapping(m).ok_or_else(|| {
                    Error::MalformedPosts(format!("post {} has no `pathname` or `url`", i))
                })?,
                _ => {
                    return Err(Error::MalformedPosts(format!(
                        "post {} is not a mapping",
                        i
                    )))
                }
            };
            let pathname = post.pathname.clone();
            if !index.insert(post) {
                return Err(Error::MalformedPosts(format!(
                    "duplicate pathname `{}`",
                    pathname
                )));
            }
        }
        Ok(index)
    }
}

impl<'a> IntoIterator for &'a PostIndex {
    type Item = &'a Post;
    type IntoIter = std::slice::Iter<'a, Post>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Represents the result of an indexing operation.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents an error building or restoring a [`PostIndex`].
#[derive(Debug)]
pub enum Error {
    /// Returned when the front-matter extractor fails.
    Extract(extract::Error),

    /// Returned when a serialized post collection can't be restored.
    MalformedPosts(String),
}

impl fmt::Display for Error {
    /// Displays an [`Error`] as human-readable text.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Extract(err) => err.fmt(f),
            Error::MalformedPosts(msg) => write!(f, "malformed post collection: {}", msg),
        }
    }
}

impl std::error::Error for Error {
    /// Implements the [`std::error::Error`] trait for [`Error`].
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Extract(err) => Some(err),
            Error::MalformedPosts(_) => None,
        }
    }
}

impl From<extract::Error> for Error {
    /// Converts an [`extract::Error`] into an [`Error`]. This allows us to use
    /// the `?` operator on extractor calls.
    fn from(err: extract::Error) -> Error {
        Error::Extract(err)
    }
}
