//! Project configuration module.
//!
//! Handles loading and validating `simple-site.json` from the project root.
//! The document is sparse: every key is optional and falls back to a stock
//! default, so a project only spells out what it wants to change.
//!
//! ## Config File Location
//!
//! ```text
//! my-site/
//! ├── simple-site.json     # This file
//! ├── template/            # Theme tree (page + gallery templates, css, js, images)
//! ├── src/                 # Site-specific tree, overrides the theme on collision
//! └── pages/               # One content directory per configured page
//!     └── index/
//!         ├── 1.md
//!         └── 2.md
//! ```
//!
//! ## Configuration Options
//!
//! ```json
//! {
//!   "template_dir": "template",
//!   "src_dir": "src",
//!   "pages_dir": "pages",
//!   "dist_dir": "dist",
//!   "page_template": "page.html.jinja",
//!   "gallery_template": "gallery.html.jinja",
//!   "article_tag": "article",
//!   "image_quality": 90,
//!   "thumbnail_quality": 80,
//!   "minify": true,
//!   "style": { "accent": "#00F" },
//!   "website": { "title": "My Site" },
//!   "pages": [
//!     { "text": "Home", "link": "index.html", "in_nav": true }
//!   ],
//!   "processing": { "max_workers": 4 }
//! }
//! ```
//!
//! `style` and `website` values are overlaid on stock defaults, so a partial
//! map keeps the remaining defaults. Every known `website` key exists (as
//! `null` when unset), so a theme can test `{% if website.logo %}`. Unknown
//! top-level keys are rejected to catch typos early.
//!
//! ## Run-Derived Values
//!
//! [`Auto`] holds the generation date and a salt token. Both are computed once
//! when the configuration is loaded and stay constant for the whole run. They
//! are not read from the document.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};
use thiserror::Error;

/// Fixed name of the configuration document inside the project root.
pub const CONFIG_FILENAME: &str = "simple-site.json";

/// Default upper bound on transcoding workers when the project sets none.
pub const DEFAULT_WORKER_CAP: usize = 8;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Configuration not found: {0}")]
    Missing(PathBuf),
    #[error("Configuration unreadable: {path}: {source}")]
    Unreadable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Configuration parse error in {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Run parameters loaded from `simple-site.json`.
///
/// Directory fields are relative in the document and absolute after
/// [`load_config`]. Nothing mutates a `Config` once loading returns.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Theme tree root.
    pub template_dir: PathBuf,
    /// Site-specific tree root. Wins over the theme tree on path collision.
    pub src_dir: PathBuf,
    /// Root of the per-page content directories.
    pub pages_dir: PathBuf,
    /// Destination root. Deleted and recreated on every run.
    pub dist_dir: PathBuf,
    /// Page template file name, looked up in `template_dir`.
    pub page_template: String,
    /// Gallery fragment template file name, looked up in `template_dir`.
    pub gallery_template: String,
    /// Element name wrapping each rendered article.
    pub article_tag: String,
    /// Encode quality for the primary raster output (0-100).
    pub image_quality: u32,
    /// Encode quality for thumbnails (0-100).
    pub thumbnail_quality: u32,
    /// Run the rendered pages through the HTML reformatter.
    pub minify: bool,
    /// Theme style values exposed to templates as `style.*`.
    pub style: BTreeMap<String, String>,
    /// Site metadata exposed to templates as `website.*`.
    pub website: BTreeMap<String, serde_json::Value>,
    /// Pages to assemble, in output order.
    pub pages: Vec<Page>,
    /// Parallel processing settings.
    pub processing: ProcessingConfig,
    /// Generation date and salt, computed at load time.
    #[serde(skip_deserializing)]
    pub auto: Auto,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            template_dir: PathBuf::from("template"),
            src_dir: PathBuf::from("src"),
            pages_dir: PathBuf::from("pages"),
            dist_dir: PathBuf::from("dist"),
            page_template: "page.html.jinja".to_string(),
            gallery_template: "gallery.html.jinja".to_string(),
            article_tag: "article".to_string(),
            image_quality: 90,
            thumbnail_quality: 80,
            minify: true,
            style: default_style(),
            website: default_website(),
            pages: Vec::new(),
            processing: ProcessingConfig::default(),
            auto: Auto::now(),
        }
    }
}

impl Config {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.image_quality > 100 {
            return Err(ConfigError::Validation(
                "image_quality must be 0-100".into(),
            ));
        }
        if self.thumbnail_quality > 100 {
            return Err(ConfigError::Validation(
                "thumbnail_quality must be 0-100".into(),
            ));
        }
        if self.article_tag.trim().is_empty() {
            return Err(ConfigError::Validation(
                "article_tag must not be empty".into(),
            ));
        }

        for (key, name) in [
            ("page_template", &self.page_template),
            ("gallery_template", &self.gallery_template),
        ] {
            if !name.ends_with(".jinja") {
                return Err(ConfigError::Validation(format!(
                    "{key} '{name}' must end in .jinja"
                )));
            }
        }

        let mut seen = HashSet::new();
        for page in &self.pages {
            if !page.stays_inside_destination() {
                return Err(ConfigError::Validation(format!(
                    "page link '{}' must be a relative path inside the destination",
                    page.link
                )));
            }
            if page.slug().is_none() {
                return Err(ConfigError::Validation(format!(
                    "page link '{}' has no file name",
                    page.link
                )));
            }
            if !seen.insert(page.link.as_str()) {
                return Err(ConfigError::Validation(format!(
                    "page link '{}' is listed more than once",
                    page.link
                )));
            }
        }
        Ok(())
    }

    /// Resolve the directory fields against the project root.
    ///
    /// Absolute entries are kept as they are.
    fn resolve_dirs(&mut self, root: &Path) {
        for dir in [
            &mut self.template_dir,
            &mut self.src_dir,
            &mut self.pages_dir,
            &mut self.dist_dir,
        ] {
            *dir = root.join(&*dir);
        }
    }

    /// Path of the page template inside the theme tree.
    pub fn page_template_path(&self) -> PathBuf {
        self.template_dir.join(&self.page_template)
    }

    /// Path of the gallery template inside the theme tree.
    pub fn gallery_template_path(&self) -> PathBuf {
        self.template_dir.join(&self.gallery_template)
    }

    /// Content directory for a page: `pages_dir/<link stem>`.
    pub fn content_dir(&self, page: &Page) -> PathBuf {
        self.pages_dir.join(page.slug().unwrap_or_default())
    }
}

/// A page listed in the configuration.
///
/// Whether a page is the one currently being rendered is not stored here;
/// the renderer derives it per render by comparing links.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Page {
    /// Display text in navigation.
    pub text: String,
    /// Output file name, relative to the destination root.
    pub link: String,
    /// Whether this page appears in navigation.
    pub in_nav: bool,
}

impl Default for Page {
    fn default() -> Self {
        Self {
            text: "index".to_string(),
            link: "index.html".to_string(),
            in_nav: true,
        }
    }
}

impl Page {
    /// Link file name without its extension, e.g. `about` for `about.html`.
    pub fn slug(&self) -> Option<&str> {
        Path::new(&self.link)
            .file_stem()
            .and_then(|s| s.to_str())
            .filter(|s| !s.is_empty())
    }

    /// True when the link is relative and has no `..`, root or prefix component.
    pub fn stays_inside_destination(&self) -> bool {
        Path::new(&self.link)
            .components()
            .all(|c| matches!(c, Component::Normal(_) | Component::CurDir))
    }
}

/// Values derived from the moment the run started.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Auto {
    /// Local generation date, `YYYY-MM-DD`.
    pub date: String,
    /// Salt token for cache-busting asset URLs (UTC unix seconds).
    pub salt: String,
}

impl Auto {
    pub fn now() -> Self {
        Self {
            date: chrono::Local::now().format("%Y-%m-%d").to_string(),
            salt: chrono::Utc::now().timestamp().to_string(),
        }
    }
}

impl Default for Auto {
    fn default() -> Self {
        Self::now()
    }
}

/// Parallel processing settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProcessingConfig {
    /// Maximum number of parallel transcoding workers.
    /// When absent, defaults to [`DEFAULT_WORKER_CAP`].
    /// Values larger than the core count are clamped down.
    pub max_workers: Option<usize>,
}

/// Resolve the effective thread count from config.
///
/// - `None` → `min(DEFAULT_WORKER_CAP, cores)`
/// - `Some(n)` → `min(n, cores)`, never below one
pub fn effective_threads(config: &ProcessingConfig) -> usize {
    let cores = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    config
        .max_workers
        .unwrap_or(DEFAULT_WORKER_CAP)
        .min(cores)
        .max(1)
}

/// Stock theme style values. Project `style` entries override these key by key.
pub fn default_style() -> BTreeMap<String, String> {
    [
        ("text_background", "#000"),
        ("background", "#000"),
        ("foreground", "#FFF"),
        ("accent", "#00F"),
        ("accent_hover", "#0FF"),
        ("accent2", "#F00"),
        ("accent2_hover", "#FF0"),
        ("font_family", "monospace"),
        ("font_size", "0.90em"),
        ("small_spacing", "16px"),
        ("large_spacing", "32px"),
        ("border_radius", "0px"),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect()
}

/// Stock site metadata. Unset keys are `null` so templates can test them
/// under strict undefined handling.
pub fn default_website() -> BTreeMap<String, serde_json::Value> {
    use serde_json::Value;

    let mut website: BTreeMap<String, Value> = [
        "author",
        "author_occupation",
        "contact_email",
        "contact_intro",
        "description",
        "favicon",
        "imprint_link",
        "imprint_text",
        "logo",
        "logo_description",
        "theme_color",
        "title",
        "webmanifest",
    ]
    .into_iter()
    .map(|k| (k.to_string(), Value::Null))
    .collect();
    website.insert("logo_width".to_string(), Value::from(1280));
    website.insert("logo_height".to_string(), Value::from(720));
    website
}

/// Overlay `overrides` on top of `base`. Keys missing from `overrides` keep
/// their base value.
pub fn merge_style(
    mut base: BTreeMap<String, String>,
    overrides: BTreeMap<String, String>,
) -> BTreeMap<String, String> {
    base.extend(overrides);
    base
}

/// Parse a configuration document without touching the filesystem.
///
/// Directories stay as written; see [`load_config`] for path resolution.
pub fn parse_config(json: &str, origin: &Path) -> Result<Config, ConfigError> {
    if json.trim().is_empty() {
        return Err(ConfigError::Validation(format!(
            "{} is empty",
            origin.display()
        )));
    }
    let mut config: Config = serde_json::from_str(json).map_err(|source| ConfigError::Parse {
        path: origin.to_path_buf(),
        source,
    })?;
    config.style = merge_style(default_style(), std::mem::take(&mut config.style));
    let mut website = default_website();
    website.extend(std::mem::take(&mut config.website));
    config.website = website;
    config.validate()?;
    Ok(config)
}

/// Load `simple-site.json` from the project root.
///
/// Merges user style values over the stock defaults, rejects unknown keys,
/// validates the result, and resolves every directory to an absolute path.
pub fn load_config(project_root: &Path) -> Result<Config, ConfigError> {
    let config_path = project_root.join(CONFIG_FILENAME);
    if !config_path.is_file() {
        return Err(ConfigError::Missing(config_path));
    }
    let content = fs::read_to_string(&config_path).map_err(|source| ConfigError::Unreadable {
        path: config_path.clone(),
        source,
    })?;
    let mut config = parse_config(&content, &config_path)?;

    let root = std::path::absolute(project_root).map_err(|source| ConfigError::Unreadable {
        path: project_root.to_path_buf(),
        source,
    })?;
    config.resolve_dirs(&root);
    Ok(config)
}
