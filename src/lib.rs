//! The library code for the `chronicle` blog builder. A build has two
//! phases:
//!
//! 1. Indexing: every file under the content root is offered to the
//!    front-matter extractor ([`crate::extract`]); files with front matter
//!    become [`crate::post::Post`]s in a [`crate::index::PostIndex`], in
//!    newest-first order. The index is published to the global data under
//!    `blog.posts` for other page generators.
//! 2. Rendering: each indexed post is rendered ([`crate::write`]) with a
//!    context made of its attributes, its `prev`/`next` neighbors
//!    ([`crate::nav`]), and the global data.
//!
//! Each post's output location comes from its file name ([`crate::path`]):
//! `blog/2024-01-15-hello.md` is written to
//! `blog/hello-2024-01-15/index.html` and linked as `blog/hello-2024-01-15`.
//! [`crate::build`] ties the phases together.

#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]

pub mod build;
pub mod config;
pub mod data;
pub mod extract;
pub mod index;
pub mod markdown;
pub mod merge;
pub mod nav;
pub mod path;
pub mod post;
pub mod source;
pub mod value;
pub mod write;
