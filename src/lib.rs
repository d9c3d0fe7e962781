//! # Simple Site
//!
//! A minimal static site builder. A project is three trees and one JSON
//! document:
//!
//! ```text
//! my-site/
//! ├── simple-site.json    configuration
//! ├── template/           theme: page + gallery templates, css, js, images, fonts
//! ├── src/                site-specific files, same layout as the theme
//! └── pages/<page>/       markdown articles for each configured page
//! ```
//!
//! # Architecture: Five Ordered Stages
//!
//! ```text
//! 1. Reset      dist/ deleted and recreated
//! 2. Merge      template/ then src/ copied byte for byte
//! 3. Images     rasters re-encoded to AVIF, plus half-size thumbnails
//! 4. Templates  css/js evaluated against the site context
//! 5. Pages      articles rendered, imports spliced, page template applied
//! ```
//!
//! In every stage the source tree is processed after the theme tree, so a
//! site file at the same relative path as a theme file replaces it.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`config`] | `simple-site.json` loading, defaults, validation, worker count |
//! | [`assets`] | One classification per path: copy, template, image, skip |
//! | [`naming`] | Natural ordering and transcoded/thumbnail file names |
//! | [`merge`] | Stage 2, plain copies |
//! | [`transcode`] | Stages 3 and 4, planned units run on the rayon pool |
//! | [`imaging`] | Pure-Rust decode, resize, and AVIF encode behind a backend trait |
//! | [`template`] | minijinja environment and the per-render site context |
//! | [`markdown`] | Markdown to HTML |
//! | [`imports`] | `<import src="...">` directives |
//! | [`gallery`] | Gallery fragments from `.gallery.json` descriptors |
//! | [`pages`] | Stage 5, page assembly and optional HTML reformat |
//! | [`pipeline`] | Stage order, destination reset, stage-tagged errors |
//! | [`output`] | Build summary for the CLI |
//! | [`logging`] | tracing subscriber setup |
//!
//! # Design Decisions
//!
//! ## Explicit Render Context
//!
//! The article list and the page being rendered are passed into each render
//! as values. Navigation entries carry an `is_active` flag computed per
//! render, so no page state is ever written back to the configuration.
//!
//! ## Fail-Fast
//!
//! The first error in any stage ends the run with a diagnostic naming the
//! path involved. There is no partial-success mode and no rollback: a failed
//! run can leave a half-built `dist/`.

pub mod assets;
pub mod config;
pub mod gallery;
pub mod imaging;
pub mod imports;
pub mod logging;
pub mod markdown;
pub mod merge;
pub mod naming;
pub mod output;
pub mod pages;
pub mod pipeline;
pub mod template;
pub mod transcode;

#[cfg(test)]
pub(crate) mod test_helpers;
