//! Loads a template set from `tpl/{style}/`. Every file directly inside the
//! directory is a template named after its file name, and every template can
//! include any other with `{{template "header.html" .}}`. Top-level
//! `{{define "name"}}` blocks in any file are visible to every template of the
//! set, so a file may consist of nothing but definitions.

use gtmpl::Template;
use std::collections::BTreeMap;
use std::fmt;
use std::fs::read_dir;
use std::path::{Path, PathBuf};

/// The template rendered into the site's `index.html`.
pub const INDEX_TEMPLATE: &str = "index.html";

/// The template rendered into each post's `index.html`.
pub const POST_TEMPLATE: &str = "post.html";

/// The source text of every template in a set, keyed by file name.
#[derive(Debug)]
pub struct TemplateSet {
    /// The style the set was loaded for.
    pub name: String,
    directory: PathBuf,
    sources: BTreeMap<String, String>,
}

impl TemplateSet {
    /// Reads every regular file directly inside `directory`. Fails if the
    /// directory can't be listed, a file can't be read, or no file is found.
    pub fn load(name: &str, directory: &Path) -> Result<TemplateSet> {
        let list_err = |err| Error::ReadDirectory {
            path: directory.to_owned(),
            err,
        };
        let mut sources = BTreeMap::new();
        for result in read_dir(directory).map_err(list_err)? {
            let entry = result.map_err(list_err)?;
            let path = entry.path();
            if !path.is_file() {
                continue;
            }
            let contents = std::fs::read_to_string(&path).map_err(|err| Error::ReadTemplate {
                path: path.clone(),
                err,
            })?;
            sources.insert(entry.file_name().to_string_lossy().into_owned(), contents);
        }

        if sources.is_empty() {
            return Err(Error::Empty(directory.to_owned()));
        }

        tracing::debug!(
            style = name,
            templates = sources.len(),
            "loaded template set from {}",
            directory.display()
        );
        Ok(TemplateSet {
            name: name.to_owned(),
            directory: directory.to_owned(),
            sources,
        })
    }

    /// Parses the template called `name`. Its body is the root of the result;
    /// the bodies of the other files follow as `{{define "<file name>"}}`
    /// blocks, and every file's own top-level definitions are hoisted
    /// alongside them.
    pub fn compile(&self, name: &str) -> Result<Template> {
        let root = self.sources.get(name).ok_or_else(|| Error::Missing {
            name: name.to_owned(),
            directory: self.directory.clone(),
        })?;

        let (mut contents, mut definitions) = split_definitions(root);
        for (other, source) in self.sources.iter().filter(|(other, _)| *other != name) {
            let (body, defined) = split_definitions(source);
            definitions.push_str(&defined);
            definitions.push_str(&format!("{{{{define \"{}\"}}}}{}{{{{end}}}}", other, body));
        }
        contents.push_str(&definitions);

        let mut template = Template::default();
        template
            .parse(&contents)
            .map_err(|err| Error::Parse {
                name: name.to_owned(),
                err,
            })?;
        Ok(template)
    }
}

/// Splits a template source into its body and its top-level
/// `{{define}}...{{end}}` blocks. Unterminated actions or definitions are left
/// in the body for the parser to report.
fn split_definitions(source: &str) -> (String, String) {
    let mut body = String::new();
    let mut definitions = String::new();
    let mut depth = 0usize;
    let mut define_start: Option<usize> = None;
    let mut copied = 0;
    let mut cursor = 0;

    while let Some(offset) = source[cursor..].find("{{") {
        let open = cursor + offset;
        let close = match source[open + 2..].find("}}") {
            Some(offset) => open + 2 + offset + 2,
            None => break,
        };
        cursor = close;

        match action_keyword(&source[open + 2..close - 2]) {
            "define" if depth == 0 => {
                body.push_str(&source[copied..open]);
                define_start = Some(open);
                depth = 1;
            }
            "define" | "if" | "range" | "with" | "block" => depth += 1,
            "end" if depth > 0 => {
                depth -= 1;
                if depth == 0 {
                    if let Some(start) = define_start.take() {
                        definitions.push_str(&source[start..close]);
                        copied = close;
                    }
                }
            }
            _ => {}
        }
    }

    match define_start {
        Some(start) => body.push_str(&source[start..]),
        None => body.push_str(&source[copied..]),
    }
    (body, definitions)
}

/// The leading keyword of an action, e.g. `define` for `{{- define "x" }}`.
fn action_keyword(action: &str) -> &str {
    let action = action.trim_start_matches('-').trim_start();
    if action.starts_with("/*") {
        return "";
    }
    action.split_whitespace().next().unwrap_or("")
}

/// The result of loading or compiling templates.
pub type Result<T> = std::result::Result<T, Error>;

/// Returned when a template set can't be loaded or one of its templates
/// can't be compiled.
#[derive(Debug)]
pub enum Error {
    /// The template set's directory couldn't be listed.
    ReadDirectory { path: PathBuf, err: std::io::Error },

    /// A template file couldn't be read.
    ReadTemplate { path: PathBuf, err: std::io::Error },

    /// The template set's directory contains no files.
    Empty(PathBuf),

    /// A required template isn't part of the set.
    Missing { name: String, directory: PathBuf },

    /// A template failed to parse.
    Parse { name: String, err: String },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::ReadDirectory { path, err } => {
                write!(f, "Can't scan template files in '{}': {}", path.display(), err)
            }
            Error::ReadTemplate { path, err } => {
                write!(f, "Opening template file '{}': {}", path.display(), err)
            }
            Error::Empty(path) => {
                write!(f, "No template files found in '{}'", path.display())
            }
            Error::Missing { name, directory } => write!(
                f,
                "Template '{}' not found in '{}'",
                name,
                directory.display()
            ),
            Error::Parse { name, err } => {
                write!(f, "Parsing template '{}': {}", name, err)
            }
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::ReadDirectory { path: _, err } => Some(err),
            Error::ReadTemplate { path: _, err } => Some(err),
            Error::Empty(_) => None,
            Error::Missing { .. } => None,
            Error::Parse { .. } => None,
        }
    }
}
