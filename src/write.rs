use crate::config::{Layout, SiteConfig};
use crate::post::Post;
use crate::value::{from_yaml, text};
use gtmpl::{Template, Value};
use std::collections::HashMap;
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

/// The data shared by every page: the pass-through configuration, the
/// resolved style, the current year and the accepted posts. Built once per
/// run and never mutated; [`IndexContext`] and [`PostContext`] derive fresh
/// template values from it.
pub struct SiteContext<'a> {
    pub config: &'a SiteConfig,
    pub year: i32,
    pub items: &'a [Post],
}

impl SiteContext<'_> {
    fn to_map(&self) -> HashMap<String, Value> {
        let mut m: HashMap<String, Value> = self
            .config
            .extra
            .iter()
            .map(|(k, v)| (k.clone(), from_yaml(v)))
            .collect();
        if let Some(style) = &self.config.style {
            m.insert("style".to_owned(), text(style));
        }
        m.insert("year".to_owned(), self.year.into());
        m.insert(
            "items".to_owned(),
            Value::Array(self.items.iter().map(Value::from).collect()),
        );
        m
    }
}

/// The render context of the site index: everything in [`SiteContext`].
pub struct IndexContext<'a>(pub &'a SiteContext<'a>);

impl IndexContext<'_> {
    pub fn to_value(&self) -> Value {
        Value::Object(self.0.to_map())
    }
}

/// The render context of a single post page: everything in [`SiteContext`]
/// plus the post itself under `post`.
pub struct PostContext<'a> {
    pub site: &'a SiteContext<'a>,
    pub post: &'a Post,
}

impl PostContext<'_> {
    pub fn to_value(&self) -> Value {
        let mut m = self.site.to_map();
        m.insert("post".to_owned(), self.post.into());
        Value::Object(m)
    }
}

/// Templates and writes the site's HTML pages to disk.
pub struct Writer<'a> {
    /// The template for the site index.
    pub index_template: &'a Template,

    /// The template for post pages.
    pub post_template: &'a Template,

    /// Where the pages are written.
    pub layout: &'a Layout,
}

impl Writer<'_> {
    /// Writes the index page followed by one page per post, in order. Stops
    /// at the first failure; pages written before it are left in place.
    pub fn write_site(&self, site: &SiteContext) -> Result<()> {
        write_page(
            self.index_template,
            &self.layout.index_output_file(),
            IndexContext(site).to_value(),
        )?;
        for post in site.items {
            write_page(
                self.post_template,
                &self.layout.post_output_file(&post.path),
                PostContext { site, post }.to_value(),
            )?;
        }
        Ok(())
    }
}

/// Templates a single page and writes it to `file_path`, creating parent
/// directories as needed. The file is closed before returning.
fn write_page(template: &Template, file_path: &Path, value: Value) -> Result<()> {
    let annotate = |err: io::Error| Error::Io {
        path: file_path.to_owned(),
        err,
    };
    if let Some(dir) = file_path.parent() {
        std::fs::create_dir_all(dir).map_err(annotate)?;
    }
    let context = gtmpl::Context::from(value).map_err(|err| Error::Template {
        path: file_path.to_owned(),
        err,
    })?;
    let mut file = std::fs::File::create(file_path).map_err(annotate)?;
    template
        .execute(&mut file, &context)
        .map_err(|err| Error::Template {
            path: file_path.to_owned(),
            err,
        })?;
    tracing::debug!("wrote {}", file_path.display());
    Ok(())
}

/// The result of rendering a page.
pub type Result<T> = std::result::Result<T, Error>;

/// Returned when a page can't be rendered or written. Both variants carry the
/// path of the page being written.
#[derive(Debug)]
pub enum Error {
    /// An error during templating.
    Template { path: PathBuf, err: String },

    /// An error creating the output file or its directory.
    Io { path: PathBuf, err: io::Error },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Template { path, err } => {
                write!(f, "Rendering '{}': {}", path.display(), err)
            }
            Error::Io { path, err } => {
                write!(f, "Can't create file '{}': {}", path.display(), err)
            }
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Template { .. } => None,
            Error::Io { path: _, err } => Some(err),
        }
    }
}
