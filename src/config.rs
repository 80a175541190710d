//! Loads the project configuration from `chronicle.yaml`.

use anyhow::{anyhow, Context, Result};
use serde::Deserialize;
use serde_yaml::Mapping;
use std::fs::File;
use std::path::{Path, PathBuf};

const PROJECT_FILE: &str = "chronicle.yaml";

/// The template pair used to render post pages.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
pub struct View {
    /// The template file, relative to the templates directory.
    #[serde(default = "default_extends")]
    pub extends: String,

    /// The context key under which the post body's HTML is handed to the
    /// template.
    #[serde(default = "default_yields")]
    pub yields: String,
}

impl Default for View {
    fn default() -> Self {
        View {
            extends: default_extends(),
            yields: default_yields(),
        }
    }
}

fn default_extends() -> String {
    String::from("post.html")
}

fn default_yields() -> String {
    String::from("content")
}

/// The `blog` section of the project file.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
pub struct BlogConfig {
    /// The content root: the directory holding the posts, relative to the
    /// project root.
    #[serde(default = "default_directory")]
    pub directory: String,

    /// The prefix for post output paths and URLs.
    #[serde(default = "default_url_prefix")]
    pub url_prefix: String,

    #[serde(default)]
    pub post: View,
}

impl Default for BlogConfig {
    fn default() -> Self {
        BlogConfig {
            directory: default_directory(),
            url_prefix: default_url_prefix(),
            post: View::default(),
        }
    }
}

fn default_directory() -> String {
    String::from("blog")
}

fn default_url_prefix() -> String {
    String::from("blog")
}

#[derive(Deserialize)]
struct Project {
    #[serde(default)]
    blog: BlogConfig,

    /// Seeds the global data bag handed to every template.
    #[serde(default)]
    data: Mapping,
}

pub struct Config {
    pub source_directory: PathBuf,
    pub templates_directory: PathBuf,
    pub output_directory: PathBuf,
    pub blog: BlogConfig,
    pub data: Mapping,
}

impl Config {
    /// Searches `dir` and its ancestors for `chronicle.yaml` and loads the
    /// first one found.
    pub fn from_directory(dir: &Path, output_directory: &Path) -> Result<Config> {
        let path = dir.join(PROJECT_FILE);
        if path.exists() {
            match Config::from_project_file(&path, output_directory) {
                Ok(config) => Ok(config),
                Err(e) => Err(anyhow!("Loading configuration: {:?}", e)),
            }
        } else {
            match dir.parent() {
                Some(parent) => Config::from_directory(parent, output_directory),
                None => Err(anyhow!(
                    "Could not find `{}` in any parent directory",
                    PROJECT_FILE
                )),
            }
        }
    }

    pub fn from_project_file(path: &Path, output_directory: &Path) -> Result<Config> {
        let file = File::open(path)
            .with_context(|| format!("Opening project file `{}`", path.display()))?;
        let project: Project = serde_yaml::from_reader(file)
            .with_context(|| format!("Parsing project file `{}`", path.display()))?;
        match path.parent() {
            None => Err(anyhow!(
                "Can't get parent directory for provided project file path '{:?}'",
                path
            )),
            Some(project_root) => Ok(Config {
                source_directory: project_root.to_owned(),
                templates_directory: project_root.join("templates"),
                output_directory: output_directory.to_owned(),
                blog: project.blog,
                data: project.data,
            }),
        }
    }
}
