//! Defines the [`Post`] type and the [`Collector`] which gathers the
//! publishable posts from the posts directory. Each post lives in its own
//! subdirectory alongside a `post.yml` describing it:
//!
//! ```yaml
//! title: Winter coast
//! description: A week on the northern shore.
//! base_photo: cover.jpg
//! photos: [1.jpg, 2.jpg, 3.jpg]
//! draft: false
//! ```
//!
//! Posts whose configuration is missing or broken are skipped rather than
//! failing the build; see [`SkipReason`].

use crate::config::Layout;
use serde::{Deserialize, Deserializer};
use std::fmt;
use std::fs::read_dir;
use std::path::PathBuf;

/// A single portfolio entry.
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct Post {
    /// The name of the post's directory. Always overwritten by the collector;
    /// a `path` key in `post.yml` has no effect.
    pub path: String,

    #[serde(deserialize_with = "null_as_default")]
    pub title: String,

    #[serde(deserialize_with = "null_as_default")]
    pub description: String,

    /// The photo representing the post on the index page.
    pub base_photo: Option<String>,

    #[serde(deserialize_with = "null_as_default")]
    pub photos: Vec<String>,

    /// Drafts are never rendered.
    #[serde(deserialize_with = "null_as_default")]
    pub draft: bool,
}

/// Reads a key left empty in `post.yml` (e.g. `photos:`) as the field's
/// default.
fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Why a post directory was left out of the build.
#[derive(Debug)]
pub enum SkipReason {
    /// The directory has no `post.yml`.
    MissingConfig,

    /// `post.yml` exists but couldn't be read.
    Unreadable(std::io::Error),

    /// `post.yml` isn't a valid post description.
    Malformed(serde_yaml::Error),
}

/// A post directory which was left out of the build.
#[derive(Debug)]
pub struct Skipped {
    /// The name of the post's directory.
    pub path: String,
    pub reason: SkipReason,
}

impl fmt::Display for Skipped {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match &self.reason {
            SkipReason::MissingConfig => {
                write!(f, "not found post config in post {}", self.path)
            }
            SkipReason::Unreadable(err) => {
                write!(f, "can't read post config in post {}: {}", self.path, err)
            }
            SkipReason::Malformed(err) => {
                write!(f, "can't unmarshal post {}: {}", self.path, err)
            }
        }
    }
}

/// The outcome of [`Collector::collect`]. Drafts appear in neither list.
#[derive(Debug, Default)]
pub struct Collected {
    /// The publishable posts, ordered by directory name.
    pub posts: Vec<Post>,

    /// The directories which were skipped because of a configuration
    /// problem.
    pub skipped: Vec<Skipped>,
}

/// Gathers [`Post`]s from the posts directory of a [`Layout`].
pub struct Collector<'a> {
    layout: &'a Layout,
}

impl<'a> Collector<'a> {
    pub fn new(layout: &'a Layout) -> Collector<'a> {
        Collector { layout }
    }

    /// Reads every immediate subdirectory of the posts directory. Only a
    /// failure to list the posts directory itself is an error; problems with
    /// an individual post are recorded in [`Collected::skipped`].
    pub fn collect(&self) -> Result<Collected> {
        let posts_directory = self.layout.posts_directory();
        let mut names = Vec::new();
        for result in read_dir(&posts_directory).map_err(|err| Error {
            path: posts_directory.clone(),
            err,
        })? {
            let entry = result.map_err(|err| Error {
                path: posts_directory.clone(),
                err,
            })?;
            if entry.path().is_dir() {
                names.push(entry.file_name().to_string_lossy().into_owned());
            }
        }
        names.sort();

        let mut collected = Collected::default();
        for name in names {
            match self.read_post(&name) {
                Ok(post) if post.draft => {}
                Ok(post) => collected.posts.push(post),
                Err(reason) => collected.skipped.push(Skipped { path: name, reason }),
            }
        }
        Ok(collected)
    }

    fn read_post(&self, name: &str) -> std::result::Result<Post, SkipReason> {
        let contents = std::fs::read_to_string(self.layout.post_config_file(name))
            .map_err(|err| match err.kind() {
                std::io::ErrorKind::NotFound => SkipReason::MissingConfig,
                _ => SkipReason::Unreadable(err),
            })?;
        let mut post: Post = match contents.trim().is_empty() {
            true => Post::default(),
            false => serde_yaml::from_str(&contents).map_err(SkipReason::Malformed)?,
        };
        post.path = name.to_owned();
        Ok(post)
    }
}

/// The result of collecting posts.
pub type Result<T> = std::result::Result<T, Error>;

/// Returned when the posts directory itself can't be listed.
#[derive(Debug)]
pub struct Error {
    pub path: PathBuf,
    pub err: std::io::Error,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Listing posts in '{}': {}", self.path.display(), self.err)
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.err)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::fs;

    fn post_dir(layout: &Layout, name: &str, config: Option<&str>) {
        let dir = layout.posts_directory().join(name);
        fs::create_dir_all(&dir).unwrap();
        if let Some(config) = config {
            fs::write(dir.join("post.yml"), config).unwrap();
        }
    }

    #[test]
    fn test_collect_posts() {
        let root = tempfile::tempdir().unwrap();
        let layout = Layout::new(root.path());
        post_dir(
            &layout,
            "a",
            Some(
                "title: A\n\
                 description: first\n\
                 base_photo: cover.jpg\n\
                 photos: [1.jpg, 2.jpg]\n\
                 unknown: ignored\n",
            ),
        );
        post_dir(&layout, "b", Some("title: B\ndraft: true\n"));
        post_dir(&layout, "c", None);

        let collected = Collector::new(&layout).collect().unwrap();
        assert_eq!(
            collected.posts,
            vec![Post {
                path: "a".to_owned(),
                title: "A".to_owned(),
                description: "first".to_owned(),
                base_photo: Some("cover.jpg".to_owned()),
                photos: vec!["1.jpg".to_owned(), "2.jpg".to_owned()],
                draft: false,
            }]
        );

        // The draft is excluded without a diagnostic.
        assert_eq!(collected.skipped.len(), 1);
        assert_eq!(collected.skipped[0].path, "c");
        assert!(matches!(
            collected.skipped[0].reason,
            SkipReason::MissingConfig
        ));
        assert_eq!(
            collected.skipped[0].to_string(),
            "not found post config in post c"
        );
    }

    #[test]
    fn test_each_missing_config_drops_one_post() {
        let root = tempfile::tempdir().unwrap();
        let layout = Layout::new(root.path());
        for name in &["one", "two", "three"] {
            post_dir(&layout, name, Some("title: ok\n"));
        }
        assert_eq!(Collector::new(&layout).collect().unwrap().posts.len(), 3);

        post_dir(&layout, "four", None);
        post_dir(&layout, "five", None);
        let collected = Collector::new(&layout).collect().unwrap();
        assert_eq!(collected.posts.len(), 3);
        assert_eq!(collected.skipped.len(), 2);
    }

    #[test]
    fn test_malformed_config_is_skipped() {
        let root = tempfile::tempdir().unwrap();
        let layout = Layout::new(root.path());
        post_dir(&layout, "bad", Some("photos: not-a-list\n"));
        post_dir(&layout, "good", Some("title: Good\n"));

        let collected = Collector::new(&layout).collect().unwrap();
        assert_eq!(collected.posts.len(), 1);
        assert_eq!(collected.posts[0].path, "good");
        assert!(matches!(
            collected.skipped[0].reason,
            SkipReason::Malformed(_)
        ));
        assert!(collected.skipped[0]
            .to_string()
            .starts_with("can't unmarshal post bad"));
    }

    #[test]
    fn test_path_comes_from_directory() {
        let root = tempfile::tempdir().unwrap();
        let layout = Layout::new(root.path());
        post_dir(&layout, "real", Some("path: fake\ntitle: T\n"));

        let collected = Collector::new(&layout).collect().unwrap();
        assert_eq!(collected.posts[0].path, "real");
    }

    #[test]
    fn test_posts_are_ordered_by_name_and_files_ignored() {
        let root = tempfile::tempdir().unwrap();
        let layout = Layout::new(root.path());
        for name in &["2021-b", "2020-z", "2021-a"] {
            post_dir(&layout, name, Some("title: x\n"));
        }
        fs::write(layout.posts_directory().join("notes.txt"), "hi").unwrap();

        let collected = Collector::new(&layout).collect().unwrap();
        let paths: Vec<&str> = collected.posts.iter().map(|p| p.path.as_str()).collect();
        assert_eq!(paths, vec!["2020-z", "2021-a", "2021-b"]);
        assert!(collected.skipped.is_empty());
    }

    #[test]
    fn test_missing_posts_directory_is_an_error() {
        let root = tempfile::tempdir().unwrap();
        let layout = Layout::new(root.path());
        let err = Collector::new(&layout).collect().unwrap_err();
        assert_eq!(err.err.kind(), std::io::ErrorKind::NotFound);
    }

    #[test]
    fn test_empty_keys_read_as_defaults() {
        let root = tempfile::tempdir().unwrap();
        let layout = Layout::new(root.path());
        post_dir(
            &layout,
            "a",
            Some("title: A\ndescription:\nphotos:\nbase_photo:\ndraft:\n"),
        );

        let collected = Collector::new(&layout).collect().unwrap();
        assert!(collected.skipped.is_empty());
        assert_eq!(
            collected.posts,
            vec![Post {
                path: "a".to_owned(),
                title: "A".to_owned(),
                ..Post::default()
            }]
        );
    }
}
