//! The library code for the `folio` static site generator. A build runs three
//! steps in order, each finishing before the next begins:
//!
//! 1. Loading the site configuration from `config.yml` ([`crate::config`])
//! 2. Collecting the published posts from `posts/*/post.yml` ([`crate::post`])
//! 3. Rendering `index.html` and one `posts/{path}/index.html` per post with
//!    the template set named by the configuration's `style`
//!    ([`crate::template`], [`crate::write`])
//!
//! [`crate::build::build_site`] ties the steps together. Afterwards the output
//! can be previewed with the static file server in [`crate::serve`].

#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]

pub mod build;
pub mod config;
pub mod post;
pub mod serve;
pub mod template;
pub mod value;
pub mod write;
