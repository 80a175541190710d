//! Links each post to its neighbors in a [`PostIndex`].
//!
//! Index order is newest-first, so the post just before a given post in the
//! index is the `next` (newer) one and the post just after it is the `prev`
//! (older) one.

use crate::index::PostIndex;
use crate::post::Post;

/// The neighbors of a post.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Links<'a> {
    /// The chronologically older post (index position `i + 1`).
    pub prev: Option<&'a Post>,

    /// The chronologically newer post (index position `i - 1`).
    pub next: Option<&'a Post>,
}

/// Returns the neighbors of the post at `position`. A position outside the
/// index has no neighbors.
pub fn links(index: &PostIndex, position: usize) -> Links<'_> {
    let posts = index.posts();
    if position >= posts.len() {
        return Links::default();
    }
    Links {
        prev: posts.get(position + 1),
        next: match position {
            0 => None,
            _ => posts.get(position - 1),
        },
    }
}
