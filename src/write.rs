//! Defines the [`Render`] trait, through which post pages are written, and
//! [`TemplateRenderer`], which templates post bodies with `gtmpl` and writes
//! the results to disk.

use crate::config::View;
use crate::extract;
use crate::path::Resolver;
use crate::source::SourceFile;
use crate::{markdown, value};
use gtmpl::Template;
use serde_yaml::{Mapping, Value};
use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Everything a [`Render`] needs besides the file and its context.
pub struct RenderOptions<'a> {
    /// The template to apply and the context key for the post body.
    pub view: &'a View,

    /// Determines where each post's document is written.
    pub resolver: &'a Resolver,
}

/// Turns a post's source file and its context into an output document.
pub trait Render {
    fn render(&self, file: &SourceFile, context: &Mapping, options: &RenderOptions) -> Result<()>;
}

/// Renders post pages by converting the markdown body of each source file to
/// HTML, handing it to a template under [`View::yields`], and writing the
/// result to `{output_directory}/{output_path}`.
pub struct TemplateRenderer {
    /// Templates named by [`View::extends`] are loaded from here.
    templates_directory: PathBuf,

    /// The root of the output tree.
    output_directory: PathBuf,

    /// Parsed templates, keyed by file name.
    templates: RefCell<HashMap<String, Template>>,
}

impl TemplateRenderer {
    pub fn new(templates_directory: &Path, output_directory: &Path) -> TemplateRenderer {
        TemplateRenderer {
            templates_directory: templates_directory.to_owned(),
            output_directory: output_directory.to_owned(),
            templates: RefCell::new(HashMap::new()),
        }
    }

    /// Executes the template named `name` against `context`, loading and
    /// parsing it on first use.
    fn execute(&self, name: &str, context: gtmpl::Value, w: &mut Vec<u8>) -> Result<()> {
        let mut templates = self.templates.borrow_mut();
        if !templates.contains_key(name) {
            let template = parse_template(&self.templates_directory.join(name))?;
            templates.insert(name.to_owned(), template);
        }
        let template = templates
            .get(name)
            .ok_or_else(|| Error::Template(format!("template `{}` not loaded", name)))?;
        let context = gtmpl::Context::from(context).map_err(|e| Error::Template(e.to_string()))?;
        template
            .execute(w, &context)
            .map_err(|e| Error::Template(e.to_string()))
    }
}

impl Render for TemplateRenderer {
    fn render(&self, file: &SourceFile, context: &Mapping, options: &RenderOptions) -> Result<()> {
        let contents = std::fs::read_to_string(&file.path).map_err(|err| Error::ReadSource {
            path: file.path.clone(),
            err,
        })?;
        let body = match extract::split(&contents) {
            Some((_, body)) => body,
            None => &contents,
        };

        let mut html = String::new();
        markdown::to_html(&mut html, body);

        let mut context = context.clone();
        crate::merge::set(
            &mut context,
            Value::String(options.view.yields.clone()),
            Value::String(html),
        );

        let mut document = Vec::new();
        self.execute(
            &options.view.extends,
            value::from_mapping(&context),
            &mut document,
        )?;

        let file_path = self
            .output_directory
            .join(options.resolver.resolve(file).output_path);
        if let Some(dir) = file_path.parent() {
            std::fs::create_dir_all(dir)?;
        }
        std::fs::write(&file_path, document)?;
        debug!(path = %file_path.display(), "wrote post");
        Ok(())
    }
}

fn parse_template(path: &Path) -> Result<Template> {
    let contents = std::fs::read_to_string(path).map_err(|err| Error::OpenTemplateFile {
        path: path.to_owned(),
        err,
    })?;
    let mut template = Template::default();
    template
        .parse(&contents)
        .map_err(|e| Error::ParseTemplate(format!("{}: {}", path.display(), e)))?;
    Ok(template)
}

/// The result of a fallible page-writing operation.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents an error in a page-writing operation.
#[derive(Debug)]
pub enum Error {
    /// Returned for I/O problems while reading a post's source file.
    ReadSource { path: PathBuf, err: io::Error },

    /// Returned for I/O problems while opening template files.
    OpenTemplateFile { path: PathBuf, err: io::Error },

    /// Returned for errors parsing template files.
    ParseTemplate(String),

    /// An error during templating.
    Template(String),

    /// An error writing the output files.
    Io(io::Error),
}

impl From<io::Error> for Error {
    /// Converts an [`io::Error`] into an [`Error`]. This allows us to use the
    /// `?` operator for fallible I/O operations.
    fn from(err: io::Error) -> Error {
        Error::Io(err)
    }
}

impl fmt::Display for Error {
    /// Displays an [`Error`] as presentable text.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::ReadSource { path, err } => {
                write!(f, "Reading post '{}': {}", path.display(), err)
            }
            Error::OpenTemplateFile { path, err } => {
                write!(f, "Opening template file '{}': {}", path.display(), err)
            }
            Error::ParseTemplate(err) => write!(f, "Parsing template {}", err),
            Error::Template(err) => err.fmt(f),
            Error::Io(err) => err.fmt(f),
        }
    }
}

impl std::error::Error for Error {
    /// Implements the [`std::error::Error`] trait for [`Error`].
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::ReadSource { path: _, err } => Some(err),
            Error::OpenTemplateFile { path: _, err } => Some(err),
            Error::ParseTemplate(_) => None,
            Error::Template(_) => None,
            Error::Io(err) => Some(err),
        }
    }
}
