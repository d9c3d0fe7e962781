//! Page assembly.
//!
//! Every configured page owns a content directory, `pages_dir/<link stem>`.
//! Assembling a page walks through fixed states:
//!
//! ```text
//! Activating        content directory must exist (MissingContentDirectory)
//! ResolvingContent  markdown files, natural order, imports resolved, each
//!                   wrapped in <article_tag>
//! Rendering         page template with the article list and current page
//! PostProcessing    optional HTML reformat (config.minify)
//! Writing           dist_dir/<link>, overwritten
//! ```
//!
//! Pages are assembled one after another in configuration order, so a page
//! that fails stops the run before any later page is written. The article
//! list and the current page travel in the render context; no page state is
//! stored on the configuration.

use crate::assets::is_vcs_path;
use crate::config::{Config, Page};
use crate::gallery::{GalleryError, build_gallery_with_backend};
use crate::imaging::{ImageBackend, RustBackend};
use crate::imports::{ImportError, resolve_imports};
use crate::markdown;
use crate::naming::natural_path_cmp;
use crate::template::{Renderer, SiteContext, TemplateError};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};
use walkdir::WalkDir;

#[derive(Error, Debug)]
pub enum PageError {
    #[error("Content directory for page '{link}' does not exist: {dir}")]
    MissingContentDirectory { link: String, dir: PathBuf },
    #[error("Imported file not found: {0}")]
    ImportNotFound(PathBuf),
    #[error("Page template not found: {0}")]
    TemplateNotFound(PathBuf),
    #[error(transparent)]
    Gallery(#[from] GalleryError),
    #[error(transparent)]
    Template(#[from] TemplateError),
    #[error("Failed to walk {root}: {source}")]
    Walk {
        root: PathBuf,
        #[source]
        source: walkdir::Error,
    },
    #[error("IO error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl From<ImportError> for PageError {
    fn from(err: ImportError) -> Self {
        match err {
            ImportError::NotFound(path) => PageError::ImportNotFound(path),
            ImportError::Io { path, source } => PageError::Io { path, source },
            ImportError::Gallery(e) => PageError::Gallery(e),
        }
    }
}

/// Assemble every configured page. Returns the written files in order.
pub fn assemble_pages(config: &Config, renderer: &Renderer) -> Result<Vec<PathBuf>, PageError> {
    assemble_pages_with_backend(&RustBackend::new(), config, renderer)
}

/// Assemble pages using a specific image backend (allows testing with mock).
pub fn assemble_pages_with_backend(
    backend: &impl ImageBackend,
    config: &Config,
    renderer: &Renderer,
) -> Result<Vec<PathBuf>, PageError> {
    let mut written = Vec::with_capacity(config.pages.len());
    for page in &config.pages {
        written.push(assemble_page(backend, config, renderer, page)?);
    }
    info!(pages = written.len(), "Pages assembled");
    Ok(written)
}

/// Assemble and write a single page.
pub fn assemble_page(
    backend: &impl ImageBackend,
    config: &Config,
    renderer: &Renderer,
    page: &Page,
) -> Result<PathBuf, PageError> {
    let content_dir = config.content_dir(page);
    if !content_dir.is_dir() {
        return Err(PageError::MissingContentDirectory {
            link: page.link.clone(),
            dir: content_dir,
        });
    }
    debug!(page = %page.link, dir = %content_dir.display(), "Activating page");

    let sources = article_sources(&content_dir)?;
    let mut articles = Vec::with_capacity(sources.len());
    for source in &sources {
        articles.push(render_article(backend, config, renderer, source)?);
    }
    debug!(page = %page.link, articles = articles.len(), "Content resolved");

    let template_path = config.page_template_path();
    if !template_path.is_file() {
        return Err(PageError::TemplateNotFound(template_path));
    }
    let ctx = SiteContext::for_page(config, page, &articles);
    let mut html = renderer.render_file(&template_path, &ctx)?;

    if config.minify {
        html = reformat(html);
    }

    let dest = config.dist_dir.join(&page.link);
    write_page(&dest, &html)?;
    info!(page = %page.link, path = %dest.display(), "Page written");
    Ok(dest)
}

/// Markdown files below `content_dir`, in natural order of their relative path.
pub fn article_sources(content_dir: &Path) -> Result<Vec<PathBuf>, PageError> {
    let mut sources = Vec::new();
    for entry in WalkDir::new(content_dir) {
        let entry = entry.map_err(|source| PageError::Walk {
            root: content_dir.to_path_buf(),
            source,
        })?;
        if !entry.file_type().is_file() {
            continue;
        }
        let relative = entry.path().strip_prefix(content_dir).unwrap_or(entry.path());
        if is_vcs_path(relative) || !is_markdown(relative) {
            continue;
        }
        sources.push(entry.into_path());
    }
    sources.sort_by(|a, b| {
        natural_path_cmp(
            a.strip_prefix(content_dir).unwrap_or(a),
            b.strip_prefix(content_dir).unwrap_or(b),
        )
    });
    Ok(sources)
}

fn is_markdown(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("md"))
}

/// Read one article, convert it, resolve its imports, and wrap it.
fn render_article(
    backend: &impl ImageBackend,
    config: &Config,
    renderer: &Renderer,
    source: &Path,
) -> Result<String, PageError> {
    let text = fs::read_to_string(source).map_err(|e| PageError::Io {
        path: source.to_path_buf(),
        source: e,
    })?;
    let base_dir = source.parent().unwrap_or(Path::new(""));
    let html = markdown::to_html(&text);
    let resolved = resolve_imports(&html, base_dir, |descriptor| {
        build_gallery_with_backend(backend, descriptor, config, renderer)
    })?;
    debug!(article = %source.display(), "Article rendered");
    Ok(wrap_article(&config.article_tag, &resolved))
}

fn wrap_article(tag: &str, html: &str) -> String {
    format!("<{tag}>{html}</{tag}>")
}

/// Semantics-preserving HTML normalisation.
///
/// Closing tags and the `<html>`/`<head>` openers are kept so the output
/// stays readable by strict parsers.
pub fn reformat(html: String) -> String {
    let cfg = minify_html::Cfg {
        keep_closing_tags: true,
        keep_html_and_head_opening_tags: true,
        minify_css: true,
        minify_js: true,
        ..Default::default()
    };
    String::from_utf8(minify_html::minify(html.as_bytes(), &cfg)).unwrap_or(html)
}

fn write_page(dest: &Path, html: &str) -> Result<(), PageError> {
    let io_err = |source| PageError::Io {
        path: dest.to_path_buf(),
        source,
    };
    if let Some(parent) = dest.parent() {
        fs::create_dir_all(parent).map_err(io_err)?;
    }
    fs::write(dest, html).map_err(io_err)
}
