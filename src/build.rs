//! Exports the [`build_site`] function which stitches together the high-level
//! steps of building the site: loading the configuration ([`crate::config`]),
//! loading the template set ([`crate::template`]), collecting the posts
//! ([`crate::post`]) and rendering the pages ([`crate::write`]).

use crate::config::{current_year, Error as ConfigError, Layout, SiteConfig};
use crate::post::{Collector, Error as CollectError, Post};
use crate::template::{Error as TemplateError, TemplateSet, INDEX_TEMPLATE, POST_TEMPLATE};
use crate::write::{Error as WriteError, SiteContext, Writer};
use std::fmt;

/// A summary of a successful build.
#[derive(Debug)]
pub struct Built {
    /// The template set the site was rendered with.
    pub style: String,

    /// The posts which were rendered, in rendering order.
    pub posts: Vec<Post>,

    /// The number of post directories skipped because of a configuration
    /// problem.
    pub skipped: usize,
}

/// Builds the site rooted at `layout`. Every fatal problem is returned as an
/// [`Error`]; nothing is written unless the configuration and both entry
/// templates load. Posts with broken configuration are logged and left out.
pub fn build_site(layout: &Layout) -> Result<Built> {
    let config = SiteConfig::from_file(&layout.config_file())?;
    let style = config.style();

    let templates = TemplateSet::load(style, &layout.templates_directory(style))?;
    let index_template = templates.compile(INDEX_TEMPLATE)?;
    let post_template = templates.compile(POST_TEMPLATE)?;

    let collected = Collector::new(layout).collect()?;
    for skipped in &collected.skipped {
        tracing::warn!("{}", skipped);
    }
    tracing::info!(
        style = templates.name.as_str(),
        posts = collected.posts.len(),
        skipped = collected.skipped.len(),
        "rendering site"
    );

    let writer = Writer {
        index_template: &index_template,
        post_template: &post_template,
        layout,
    };
    writer.write_site(&SiteContext {
        config: &config,
        year: current_year(),
        items: &collected.posts,
    })?;

    Ok(Built {
        style: style.to_owned(),
        skipped: collected.skipped.len(),
        posts: collected.posts,
    })
}

pub type Result<T> = std::result::Result<T, Error>;

/// The error type for building a site. Every variant is fatal.
#[derive(Debug)]
pub enum Error {
    /// Returned when `config.yml` can't be read or decoded.
    Config(ConfigError),

    /// Returned when the template set can't be loaded or compiled.
    Template(TemplateError),

    /// Returned when the posts directory can't be listed.
    Collect(CollectError),

    /// Returned for errors writing pages to disk.
    Write(WriteError),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Config(err) => err.fmt(f),
            Error::Template(err) => err.fmt(f),
            Error::Collect(err) => err.fmt(f),
            Error::Write(err) => err.fmt(f),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Config(err) => Some(err),
            Error::Template(err) => Some(err),
            Error::Collect(err) => Some(err),
            Error::Write(err) => Some(err),
        }
    }
}

impl From<ConfigError> for Error {
    fn from(err: ConfigError) -> Error {
        Error::Config(err)
    }
}

impl From<TemplateError> for Error {
    fn from(err: TemplateError) -> Error {
        Error::Template(err)
    }
}

impl From<CollectError> for Error {
    fn from(err: CollectError) -> Error {
        Error::Collect(err)
    }
}

impl From<WriteError> for Error {
    fn from(err: WriteError) -> Error {
        Error::Write(err)
    }
}
