//! Exports [`Blog`], which runs the two phases of a blog build, and
//! [`build_site`], which stitches together discovery, indexing, and
//! rendering from a [`Config`].
//!
//! The indexing phase ([`Blog::index`]) produces a [`PostIndex`] and publishes
//! it under `blog.posts` in the global data so that other page generators
//! (archives, tag pages) can list the posts. The render phase
//! ([`Blog::render`]) takes that same [`PostIndex`] as an argument and writes
//! one page per post. Both phases walk the files in [`processing_order`], so
//! the navigation links computed while rendering agree with the order in
//! which the posts were indexed.

use crate::config::{BlogConfig, Config, View};
use crate::data::{get_path, set_path, POSTS_KEY};
use crate::extract::{Extract, YamlExtractor};
use crate::index::{Error as IndexError, PostIndex};
use crate::merge::{insert_missing, set};
use crate::nav::links;
use crate::path::Resolver;
use crate::post::{key, Post};
use crate::source::{self, SourceFile};
use crate::write::{Error as WriteError, Render, RenderOptions, TemplateRenderer};
use serde_yaml::{Mapping, Value};
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// The order in which both phases visit files: the reverse of the listing
/// order. [`source::discover`] lists date-prefixed files oldest-first, so
/// posts are processed newest-first.
pub fn processing_order(files: &[SourceFile]) -> impl Iterator<Item = &SourceFile> {
    files.iter().rev()
}

/// A blog: where its posts live, how their pages are rendered, and the
/// collaborators that read and write them.
pub struct Blog<E, R> {
    content_root: String,
    resolver: Resolver,
    view: View,
    extractor: E,
    renderer: R,
}

impl<E: Extract, R: Render> Blog<E, R> {
    pub fn new(config: &BlogConfig, extractor: E, renderer: R) -> Blog<E, R> {
        Blog {
            content_root: config.directory.clone(),
            resolver: Resolver::new(&config.directory, &config.url_prefix),
            view: config.post.clone(),
            extractor,
            renderer,
        }
    }

    /// The file patterns this blog claims.
    pub fn matched_patterns(&self) -> Vec<String> {
        source::matched_patterns(&self.content_root)
    }

    /// Indexes `files` (given in listing order) and returns the index along
    /// with `data` extended by the serialized collection under `blog.posts`.
    pub fn index(&self, files: &[SourceFile], data: Mapping) -> Result<(PostIndex, Mapping)> {
        let mut index = PostIndex::new();
        let added = index.extend(processing_order(files), &self.extractor, &self.resolver)?;
        info!(
            posts = added,
            skipped = files.len() - added,
            "indexed posts"
        );

        let mut data = data;
        set_path(&mut data, POSTS_KEY, index.to_value());
        Ok((index, data))
    }

    /// Rebuilds the index published by [`Blog::index`] from the global data.
    pub fn restore(&self, data: &Mapping) -> Result<PostIndex> {
        match get_path(data, POSTS_KEY) {
            Some(value) => Ok(PostIndex::from_value(value)?),
            None => Err(Error::MissingPosts),
        }
    }

    /// Renders a page for every file in `files` (given in listing order) that
    /// appears in `index`. Stops at the first failure.
    pub fn render(&self, files: &[SourceFile], index: &PostIndex, data: &Mapping) -> Result<()> {
        let options = RenderOptions {
            view: &self.view,
            resolver: &self.resolver,
        };

        let mut rendered = 0;
        for file in processing_order(files) {
            let position = match index.position(&file.pathname) {
                Some(position) => position,
                None => {
                    debug!(pathname = %file.pathname, "not indexed; skipping");
                    continue;
                }
            };
            let context = self.context(index, position, data);
            self.renderer
                .render(file, &context, &options)
                .map_err(|err| Error::Render {
                    pathname: file.pathname.clone(),
                    err,
                })?;
            rendered += 1;
        }
        info!(posts = rendered, "rendered posts");
        Ok(())
    }

    /// Builds the template context for the post at `position`: its mapping,
    /// `pageTitle` and `pageDescription` (unless the post sets them), its
    /// `prev` and `next` neighbors (null when absent), and then any global
    /// data the post doesn't shadow. `position` must be in range.
    pub(crate) fn context(&self, index: &PostIndex, position: usize, data: &Mapping) -> Mapping {
        let post = &index.posts()[position];
        let mut context = post.to_mapping();

        insert_missing(
            &mut context,
            key("pageTitle"),
            Value::String(post.title.clone()),
        );
        insert_missing(
            &mut context,
            key("pageDescription"),
            Value::String(post.get("brief").map(scalar_string).unwrap_or_default()),
        );

        let neighbors = links(index, position);
        set(&mut context, key("prev"), neighbor(neighbors.prev));
        set(&mut context, key("next"), neighbor(neighbors.next));

        for (k, v) in data.iter() {
            insert_missing(&mut context, k.clone(), v.clone());
        }
        context
    }
}

fn neighbor(post: Option<&Post>) -> Value {
    match post {
        Some(post) => Value::Mapping(post.to_mapping()),
        None => Value::Null,
    }
}

/// The string form of a scalar; empty for null and collections.
fn scalar_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        _ => String::new(),
    }
}

/// Builds the blog described by `config`: discovers the posts, indexes them,
/// clears the posts' output tree, and renders every post page.
pub fn build_site(config: &Config) -> Result<PostIndex> {
    let files = source::discover(&config.source_directory, &config.blog.directory)?;
    let blog = Blog::new(
        &config.blog,
        YamlExtractor,
        TemplateRenderer::new(&config.templates_directory, &config.output_directory),
    );

    let (index, data) = blog.index(&files, config.data.clone())?;

    // Never clear the whole output directory.
    let url_prefix = config.blog.url_prefix.trim_matches('/');
    if !url_prefix.is_empty() {
        rmdir(&config.output_directory.join(url_prefix))?;
    }

    blog.render(&files, &index, &data)?;
    Ok(index)
}

/// Runs only the indexing phase for `config` and returns the resulting
/// global data.
pub fn index_site(config: &Config) -> Result<Mapping> {
    let files = source::discover(&config.source_directory, &config.blog.directory)?;
    let blog = Blog::new(
        &config.blog,
        YamlExtractor,
        TemplateRenderer::new(&config.templates_directory, &config.output_directory),
    );
    let (_, data) = blog.index(&files, config.data.clone())?;
    Ok(data)
}

fn rmdir(dir: &Path) -> Result<()> {
    match std::fs::remove_dir_all(dir) {
        Ok(x) => Ok(x),
        Err(e) => match e.kind() {
            std::io::ErrorKind::NotFound => Ok(()),
            _ => Err(Error::Clean {
                path: dir.to_owned(),
                err: e,
            }),
        },
    }
}

pub type Result<T> = std::result::Result<T, Error>;

/// The error type for building a blog. Errors can come from discovering,
/// indexing, restoring, or rendering posts, or from cleaning the output
/// directory.
#[derive(Debug)]
pub enum Error {
    /// Returned for errors listing the content root.
    Discover(walkdir::Error),

    /// Returned for errors building or restoring the post index.
    Index(IndexError),

    /// Returned when restoring an index from data that has no `blog.posts`.
    MissingPosts,

    /// Returned when rendering a post fails.
    Render { pathname: String, err: WriteError },

    /// Returned for I/O problems while cleaning output directories.
    Clean { path: PathBuf, err: std::io::Error },
}

impl fmt::Display for Error {
    /// Implements [`fmt::Display`] for [`Error`].
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Discover(err) => write!(f, "Discovering posts: {}", err),
            Error::Index(err) => err.fmt(f),
            Error::MissingPosts => write!(f, "No `{}` in the global data", POSTS_KEY),
            Error::Render { pathname, err } => {
                write!(f, "Rendering post `{}`: {}", pathname, err)
            }
            Error::Clean { path, err } => {
                write!(f, "Cleaning directory '{}': {}", path.display(), err)
            }
        }
    }
}

impl std::error::Error for Error {
    /// Implements [`std::error::Error`] for [`Error`].
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Discover(err) => Some(err),
            Error::Index(err) => Some(err),
            Error::MissingPosts => None,
            Error::Render { pathname: _, err } => Some(err),
            Error::Clean { path: _, err } => Some(err),
        }
    }
}

impl From<walkdir::Error> for Error {
    /// Converts [`walkdir::Error`]s into [`Error`]. This allows us to use the
    /// `?` operator.
    fn from(err: walkdir::Error) -> Error {
        Error::Discover(err)
    }
}

impl From<IndexError> for Error {
    /// Converts [`IndexError`]s into [`Error`]. This allows us to use the `?`
    /// operator.
    fn from(err: IndexError) -> Error {
        Error::Index(err)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::index::test::{files, FakeExtractor};
    use std::cell::RefCell;

    /// Records each render call instead of writing anything. Fails on any
    /// file whose name contains `broken`.
    #[derive(Default)]
    struct FakeRenderer {
        calls: RefCell<Vec<(String, Mapping, String)>>,
    }

    impl Render for FakeRenderer {
        fn render(
            &self,
            file: &SourceFile,
            context: &Mapping,
            options: &RenderOptions,
        ) -> crate::write::Result<()> {
            if file.filename.contains("broken") {
                return Err(WriteError::Template("boom".to_owned()));
            }
            self.calls.borrow_mut().push((
                file.pathname.clone(),
                context.clone(),
                options.resolver.resolve(file).output_path,
            ));
            Ok(())
        }
    }

    fn blog() -> Blog<FakeExtractor, FakeRenderer> {
        Blog::new(
            &BlogConfig::default(),
            FakeExtractor::default(),
            FakeRenderer::default(),
        )
    }

    // Listing order: oldest first.
    const LISTING: &[&str] = &[
        "blog/2024-01-01-a.md",
        "blog/2024-02-01-b.md",
        "blog/2024-03-01-c.md",
    ];

    fn str_at<'a>(m: &'a Mapping, path: &str) -> Option<&'a str> {
        get_path(m, path).and_then(Value::as_str)
    }

    #[test]
    fn test_matched_patterns() {
        assert_eq!(vec!["blog/*".to_owned()], blog().matched_patterns());
    }

    #[test]
    fn test_index_publishes_posts_newest_first() -> Result<()> {
        let mut seed = Mapping::new();
        seed.insert(key("site"), Value::String("Example".to_owned()));
        let (index, data) = blog().index(&files(LISTING), seed)?;

        let pathnames: Vec<&str> = index.iter().map(|p| p.pathname.as_str()).collect();
        assert_eq!(
            vec![
                "blog/2024-03-01-c.md",
                "blog/2024-02-01-b.md",
                "blog/2024-01-01-a.md",
            ],
            pathnames
        );
        assert_eq!(Some("Example"), str_at(&data, "site"));
        match get_path(&data, POSTS_KEY) {
            Some(Value::Sequence(posts)) => {
                assert_eq!(3, posts.len());
                let first = match &posts[0] {
                    Value::Mapping(m) => m,
                    _ => panic!("expected a mapping"),
                };
                assert_eq!(Some("blog/2024-03-01-c.md"), str_at(first, "pathname"));
                assert_eq!(Some("blog/c-2024-03-01"), str_at(first, "url"));
                assert_eq!(Some("2024 03 01 c"), str_at(first, "title"));
            }
            other => panic!("unexpected blog.posts: {:?}", other),
        }
        Ok(())
    }

    #[test]
    fn test_index_twice_is_stable() -> Result<()> {
        let blog = blog();
        let (first, data) = blog.index(&files(LISTING), Mapping::new())?;
        let (second, data) = blog.index(&files(LISTING), data)?;
        assert_eq!(first, second);
        assert_eq!(Some(&first.to_value()), get_path(&data, POSTS_KEY));
        Ok(())
    }

    #[test]
    fn test_restore_matches_index() -> Result<()> {
        let blog = blog();
        let (index, data) = blog.index(&files(LISTING), Mapping::new())?;
        let restored = blog.restore(&data)?;
        let pathnames = |i: &PostIndex| -> Vec<String> {
            i.iter().map(|p| p.pathname.clone()).collect()
        };
        assert_eq!(pathnames(&index), pathnames(&restored));
        for post in &index {
            assert_eq!(
                post.to_mapping(),
                restored.get(&post.pathname).unwrap().to_mapping()
            );
        }
        assert!(matches!(blog.restore(&Mapping::new()), Err(Error::MissingPosts)));
        Ok(())
    }

    #[test]
    fn test_render_links_neighbors_symmetrically() -> Result<()> {
        let blog = blog();
        let files = files(LISTING);
        let (index, data) = blog.index(&files, Mapping::new())?;
        blog.render(&files, &index, &data)?;

        let calls = blog.renderer.calls.borrow();
        let rendered: Vec<&str> = calls.iter().map(|(p, _, _)| p.as_str()).collect();
        assert_eq!(
            vec![
                "blog/2024-03-01-c.md",
                "blog/2024-02-01-b.md",
                "blog/2024-01-01-a.md",
            ],
            rendered
        );

        // newest: no next, prev is older
        let (_, c, c_out) = &calls[0];
        assert_eq!(Some(&Value::Null), c.get(&key("next")));
        assert_eq!(Some("blog/2024-02-01-b.md"), str_at(c, "prev.pathname"));
        assert_eq!("blog/c-2024-03-01/index.html", c_out);

        let (_, b, _) = &calls[1];
        assert_eq!(Some("blog/2024-03-01-c.md"), str_at(b, "next.pathname"));
        assert_eq!(Some("blog/2024-01-01-a.md"), str_at(b, "prev.pathname"));

        // oldest: next is newer, no prev
        let (_, a, _) = &calls[2];
        assert_eq!(Some("blog/2024-02-01-b.md"), str_at(a, "next.pathname"));
        assert_eq!(Some(&Value::Null), a.get(&key("prev")));
        Ok(())
    }

    #[test]
    fn test_context_defaults_and_global_data() -> Result<()> {
        let blog = blog();
        let mut seed = Mapping::new();
        seed.insert(key("site"), Value::String("Example".to_owned()));
        seed.insert(key("title"), Value::String("Global title".to_owned()));
        let (index, data) = blog.index(&files(&["blog/2024-01-01-hello-world.md"]), seed)?;

        let context = blog.context(&index, 0, &data);
        assert_eq!(Some("2024 01 01 hello world"), str_at(&context, "title"));
        assert_eq!(Some("2024 01 01 hello world"), str_at(&context, "pageTitle"));
        assert_eq!(
            Some("About 2024-01-01-hello-world.md"),
            str_at(&context, "pageDescription")
        );
        assert_eq!(Some("Example"), str_at(&context, "site"));
        assert_eq!(Some("blog/hello-world-2024-01-01"), str_at(&context, "url"));
        assert!(get_path(&context, POSTS_KEY).is_some());
        Ok(())
    }

    #[test]
    fn test_render_skips_unindexed_files() -> Result<()> {
        let blog = blog();
        let files = files(&["blog/2024-01-01-a.md", "blog/2024-01-02-draft.md"]);
        let (index, data) = blog.index(&files, Mapping::new())?;
        blog.render(&files, &index, &data)?;
        let calls = blog.renderer.calls.borrow();
        assert_eq!(1, calls.len());
        assert_eq!("blog/2024-01-01-a.md", calls[0].0);
        Ok(())
    }

    #[test]
    fn test_index_skips_empty_front_matter() -> std::result::Result<(), Box<dyn std::error::Error>> {
        use std::fs;

        let dir = tempfile::tempdir()?;
        fs::create_dir_all(dir.path().join("blog"))?;
        fs::write(dir.path().join("blog/2024-01-01-a.md"), "---\ntitle: A\n---\nA\n")?;
        fs::write(dir.path().join("blog/notes.md"), "---\n---\njust notes\n")?;
        fs::write(dir.path().join("blog/scratch.md"), "------\nscratch\n")?;

        let blog = Blog::new(&BlogConfig::default(), YamlExtractor, FakeRenderer::default());
        let listing = source::discover(dir.path(), "blog")?;
        let (index, _) = blog.index(&listing, Mapping::new())?;

        assert_eq!(1, index.len());
        assert!(index.contains("blog/2024-01-01-a.md"));
        assert!(!index.contains("blog/notes.md"));
        assert!(!index.contains("blog/scratch.md"));
        Ok(())
    }

    #[test]
    fn test_render_fails_fast() -> Result<()> {
        let blog = blog();
        let files = files(&[
            "blog/2024-01-01-a.md",
            "blog/2024-02-01-broken.md",
            "blog/2024-03-01-c.md",
        ]);
        let (index, data) = blog.index(&files, Mapping::new())?;
        let result = blog.render(&files, &index, &data);
        assert!(matches!(result, Err(Error::Render { ref pathname, .. }) if pathname == "blog/2024-02-01-broken.md"));

        // `c` was rendered before the failure; `a` never was.
        let calls = blog.renderer.calls.borrow();
        assert_eq!(1, calls.len());
        assert_eq!("blog/2024-03-01-c.md", calls[0].0);
        Ok(())
    }

    #[test]
    fn test_build_site() -> std::result::Result<(), Box<dyn std::error::Error>> {
        use std::fs;

        let dir = tempfile::tempdir()?;
        let root = dir.path();
        fs::create_dir_all(root.join("blog/notes"))?;
        fs::create_dir_all(root.join("templates"))?;
        fs::write(
            root.join("templates/post.html"),
            "{{.pageTitle}}|{{if .next}}{{.next.url}}{{end}}|{{if .prev}}{{.prev.url}}{{end}}|{{.content}}",
        )?;
        fs::write(
            root.join("blog/2024-01-01-first.md"),
            "---\npost::title: First!\n---\nOne\n",
        )?;
        fs::write(
            root.join("blog/notes/2024-02-01-second.md"),
            "---\npost:\n  brief: Two\n---\nTwo\n",
        )?;
        fs::write(root.join("blog/README.txt"), "not a post\n")?;

        let out = root.join("_site");
        fs::create_dir_all(out.join("blog/stale"))?;
        let config = Config {
            source_directory: root.to_owned(),
            templates_directory: root.join("templates"),
            output_directory: out.clone(),
            blog: BlogConfig::default(),
            data: Mapping::new(),
        };

        let index = build_site(&config)?;
        assert_eq!(2, index.len());
        assert!(!out.join("blog/stale").exists());
        assert!(!out.join("blog/README/index.html").exists());

        // listing: 2024-01-01-first.md, notes/2024-02-01-second.md, README.txt
        assert_eq!(
            "2024 02 01 second||blog/first-2024-01-01|<p>Two</p>\n",
            fs::read_to_string(out.join("blog/notes/second-2024-02-01/index.html"))?
        );
        assert_eq!(
            "First!|blog/notes/second-2024-02-01||<p>One</p>\n",
            fs::read_to_string(out.join("blog/first-2024-01-01/index.html"))?
        );
        Ok(())
    }
}
