//! Template evaluation.
//!
//! Page templates, gallery templates, and stylesheet/script assets are all
//! evaluated with [minijinja](https://docs.rs/minijinja) against a
//! [`SiteContext`]. The environment is strict: referencing an undefined
//! variable fails the render instead of printing an empty string. Output is
//! never auto-escaped, since the context mostly carries pre-rendered HTML.
//!
//! ## Context Shape
//!
//! ```text
//! style.*          theme style values (stock defaults + project overrides)
//! website.*        site metadata
//! auto.date        generation date
//! auto.salt        per-run cache-busting token
//! article_tag      element wrapping each article
//! pages[]          { text, link, in_nav, is_active }
//! current_page     link of the page being rendered (none for assets)
//! articles[]       rendered articles of the current page (empty for assets)
//! ```
//!
//! `is_active` is computed per render from `current_page`; nothing in the
//! configuration is mutated to mark a page as active.

use crate::config::{Auto, Config, Page};
use minijinja::{AutoEscape, Environment, UndefinedBehavior, Value};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TemplateError {
    #[error("Template error in {name}: {source}")]
    Syntax {
        name: String,
        #[source]
        source: minijinja::Error,
    },
    #[error("Failed to read template {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Shared minijinja environment.
pub struct Renderer {
    env: Environment<'static>,
}

impl Renderer {
    pub fn new() -> Self {
        let mut env = Environment::new();
        env.set_undefined_behavior(UndefinedBehavior::Strict);
        env.set_auto_escape_callback(|_| AutoEscape::None);
        Self { env }
    }

    /// Render `source` against `ctx`. `name` only labels errors.
    pub fn render<S: Serialize>(
        &self,
        name: &str,
        source: &str,
        ctx: S,
    ) -> Result<String, TemplateError> {
        self.env
            .render_named_str(name, source, ctx)
            .map_err(|source| TemplateError::Syntax {
                name: name.to_string(),
                source,
            })
    }

    /// Read a template file and render it.
    pub fn render_file<S: Serialize>(&self, path: &Path, ctx: S) -> Result<String, TemplateError> {
        let source = fs::read_to_string(path).map_err(|source| TemplateError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        self.render(&path.display().to_string(), &source, ctx)
    }
}

impl Default for Renderer {
    fn default() -> Self {
        Self::new()
    }
}

/// A navigation entry as templates see it.
#[derive(Debug, Clone, Serialize)]
pub struct NavEntry<'a> {
    pub text: &'a str,
    pub link: &'a str,
    pub in_nav: bool,
    pub is_active: bool,
}

/// Everything a template can reference. Built per render, borrowed from the
/// configuration, never written back to it.
#[derive(Debug, Clone, Serialize)]
pub struct SiteContext<'a> {
    pub style: &'a BTreeMap<String, String>,
    pub website: &'a BTreeMap<String, serde_json::Value>,
    pub auto: &'a Auto,
    pub article_tag: &'a str,
    pub pages: Vec<NavEntry<'a>>,
    pub current_page: Option<&'a str>,
    pub articles: &'a [String],
}

impl<'a> SiteContext<'a> {
    /// Context for stylesheet and script assets: no current page, no articles.
    pub fn for_assets(config: &'a Config) -> Self {
        Self::build(config, None, &[])
    }

    /// Context for one page render.
    pub fn for_page(config: &'a Config, page: &'a Page, articles: &'a [String]) -> Self {
        Self::build(config, Some(page.link.as_str()), articles)
    }

    fn build(config: &'a Config, current: Option<&'a str>, articles: &'a [String]) -> Self {
        let pages = config
            .pages
            .iter()
            .map(|p| NavEntry {
                text: &p.text,
                link: &p.link,
                in_nav: p.in_nav,
                is_active: current == Some(p.link.as_str()),
            })
            .collect();

        Self {
            style: &config.style,
            website: &config.website,
            auto: &config.auto,
            article_tag: &config.article_tag,
            pages,
            current_page: current,
            articles,
        }
    }

    /// Freeze into a minijinja value, cheap to clone across workers.
    pub fn to_value(&self) -> Value {
        Value::from_serialize(self)
    }
}
