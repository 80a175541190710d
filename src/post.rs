//! Defines the [`Post`] type. See [`Post::to_mapping`] for details on how a
//! post is presented to templates and to other page generators.

use crate::merge::{insert_missing, merge, set};
use crate::path::{default_title, Resolver};
use crate::source::SourceFile;
use serde_yaml::{Mapping, Value};

pub const PATHNAME_KEY: &str = "pathname";
pub const URL_KEY: &str = "url";
pub const TITLE_KEY: &str = "title";

/// A blog post: a source file with front matter, plus the fields derived
/// from its location.
#[derive(Clone, Debug, PartialEq)]
pub struct Post {
    /// The source file's path relative to the source directory. Identifies
    /// the post within a [`crate::index::PostIndex`].
    pub pathname: String,

    /// The post's URL, as computed by [`Resolver::resolve`].
    pub url: String,

    /// The post's title: the `title` attribute if it's a string, otherwise
    /// derived from the file name.
    pub title: String,

    /// The merged front-matter attributes (see [`merge`]).
    pub attributes: Mapping,
}

impl Post {
    /// Builds a [`Post`] from a source file and its raw front matter.
    pub fn new(file: &SourceFile, raw: &Mapping, resolver: &Resolver) -> Post {
        let attributes = merge(raw);
        let title = match attributes.get(&key(TITLE_KEY)) {
            Some(Value::String(title)) => title.clone(),
            _ => default_title(&file.filename),
        };
        Post {
            pathname: file.pathname.clone(),
            url: resolver.resolve(file).url,
            title,
            attributes,
        }
    }

    /// Rebuilds a [`Post`] from a mapping produced by [`Post::to_mapping`].
    /// Returns `None` if the mapping lacks a string `pathname` or `url`.
    pub fn from_mapping(m: &Mapping) -> Option<Post> {
        let pathname = m.get(&key(PATHNAME_KEY))?.as_str()?.to_owned();
        let url = m.get(&key(URL_KEY))?.as_str()?.to_owned();
        let title = match m.get(&key(TITLE_KEY)) {
            Some(Value::String(title)) => title.clone(),
            _ => default_title(pathname.rsplit('/').next().unwrap_or(&pathname)),
        };
        Some(Post {
            pathname,
            url,
            title,
            attributes: m.clone(),
        })
    }

    /// Converts the post into the mapping handed to templates and stored in
    /// the shared data: the attributes, then `url` and `pathname` (which
    /// always reflect the post's derived values), then `title` if the
    /// attributes don't supply one.
    pub fn to_mapping(&self) -> Mapping {
        let mut m = self.attributes.clone();
        set(&mut m, key(URL_KEY), Value::String(self.url.clone()));
        set(&mut m, key(PATHNAME_KEY), Value::String(self.pathname.clone()));
        insert_missing(&mut m, key(TITLE_KEY), Value::String(self.title.clone()));
        m
    }

    /// Looks up an attribute by name.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.attributes.get(&key(name))
    }
}

pub(crate) fn key(name: &str) -> Value {
    Value::String(name.to_owned())
}
