//! Defines the [`SiteConfig`] loaded from the project's `config.yml` and the
//! [`Layout`] which maps a project root onto the well-known input and output
//! locations.

use serde::{Deserialize, Deserializer};
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

/// The template set used when `config.yml` doesn't name one.
pub const DEFAULT_STYLE: &str = "default";

/// The site-wide configuration. `style` is the only key the generator itself
/// understands; every other top-level key is kept in `extra` and handed to the
/// templates untouched.
#[derive(Debug, Default, Deserialize)]
pub struct SiteConfig {
    /// The name of the template set under `tpl/`. Only string values are
    /// honored; anything else is treated as absent.
    #[serde(default, deserialize_with = "string_or_none")]
    pub style: Option<String>,

    /// Unrecognized keys, passed through to the render contexts.
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_yaml::Value>,
}

fn string_or_none<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match serde_yaml::Value::deserialize(deserializer)? {
        serde_yaml::Value::String(s) => Some(s),
        _ => None,
    })
}

impl SiteConfig {
    /// Reads and decodes the configuration document at `path`. An empty
    /// document yields an empty configuration.
    pub fn from_file(path: &Path) -> Result<SiteConfig> {
        let contents = std::fs::read_to_string(path).map_err(|err| Error::Read {
            path: path.to_owned(),
            err,
        })?;
        Self::parse(&contents).map_err(|err| Error::Decode {
            path: path.to_owned(),
            err,
        })
    }

    fn parse(contents: &str) -> std::result::Result<SiteConfig, serde_yaml::Error> {
        if contents.trim().is_empty() {
            return Ok(SiteConfig::default());
        }
        serde_yaml::from_str(contents)
    }

    /// The name of the template set to render with.
    pub fn style(&self) -> &str {
        self.style.as_deref().unwrap_or(DEFAULT_STYLE)
    }
}

/// The current calendar year in local time, exposed to templates as `year`.
pub fn current_year() -> i32 {
    use chrono::Datelike;
    chrono::Local::now().year()
}

/// Resolves every input and output location relative to a project root.
#[derive(Clone, Debug)]
pub struct Layout {
    pub root: PathBuf,
}

impl Layout {
    pub fn new<P: Into<PathBuf>>(root: P) -> Layout {
        Layout { root: root.into() }
    }

    /// `{root}/config.yml`
    pub fn config_file(&self) -> PathBuf {
        self.root.join("config.yml")
    }

    /// `{root}/tpl/{style}`
    pub fn templates_directory(&self, style: &str) -> PathBuf {
        self.root.join("tpl").join(style)
    }

    /// `{root}/posts`. Holds both the post sources and the rendered post
    /// pages.
    pub fn posts_directory(&self) -> PathBuf {
        self.root.join("posts")
    }

    /// `{root}/posts/{path}/post.yml`
    pub fn post_config_file(&self, path: &str) -> PathBuf {
        self.posts_directory().join(path).join("post.yml")
    }

    /// `{root}/posts/{path}/index.html`
    pub fn post_output_file(&self, path: &str) -> PathBuf {
        self.posts_directory().join(path).join("index.html")
    }

    /// `{root}/index.html`
    pub fn index_output_file(&self) -> PathBuf {
        self.root.join("index.html")
    }

    /// `{root}/dist`, the static assets served under `/dist`.
    pub fn static_directory(&self) -> PathBuf {
        self.root.join("dist")
    }
}

/// The result of loading the site configuration.
pub type Result<T> = std::result::Result<T, Error>;

/// Returned when the site configuration can't be loaded.
#[derive(Debug)]
pub enum Error {
    /// The configuration file couldn't be read.
    Read { path: PathBuf, err: std::io::Error },

    /// The configuration file isn't a valid YAML mapping.
    Decode {
        path: PathBuf,
        err: serde_yaml::Error,
    },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Read { path, err } => {
                write!(f, "Can't open '{}': {}", path.display(), err)
            }
            Error::Decode { path, err } => {
                write!(f, "Decoding '{}': {}", path.display(), err)
            }
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Read { path: _, err } => Some(err),
            Error::Decode { path: _, err } => Some(err),
        }
    }
}
