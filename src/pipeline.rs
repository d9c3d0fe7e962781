//! The build driver.
//!
//! Stages run strictly in order, each one finishing before the next starts:
//!
//! ```text
//! 1. reset       dist_dir deleted and recreated
//! 2. merge       theme tree, then source tree, plain copies
//! 3. images      raster transcode, theme tree then source tree
//! 4. templates   css/js evaluated, theme tree then source tree
//! 5. pages       one page at a time, in configuration order
//! ```
//!
//! The first failing stage aborts the run. Stages already completed are not
//! rolled back, so a failed run can leave a partial destination tree.

use crate::config::Config;
use crate::imaging::{ImageBackend, RustBackend};
use crate::merge::{MergeError, merge};
use crate::pages::{PageError, assemble_pages_with_backend};
use crate::template::Renderer;
use crate::transcode::{RasterTransform, TemplateTransform, TranscodeError, transcode};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

#[derive(Error, Debug)]
pub enum BuildError {
    #[error("Failed to reset destination {path}: {source}")]
    Reset {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Merge stage failed: {0}")]
    Merge(#[from] MergeError),
    #[error("Image stage failed: {0}")]
    Images(#[source] TranscodeError),
    #[error("Template stage failed: {0}")]
    Templates(#[source] TranscodeError),
    #[error("Page stage failed: {0}")]
    Pages(#[from] PageError),
}

/// What a successful run produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildReport {
    pub dist_dir: PathBuf,
    pub copied: usize,
    pub images: usize,
    pub templates: usize,
    pub pages: Vec<PathBuf>,
}

/// Run every stage with the production image backend.
pub fn build(config: &Config) -> Result<BuildReport, BuildError> {
    build_with_backend(&RustBackend::new(), config)
}

/// Run every stage using a specific backend (allows testing with mock).
pub fn build_with_backend(
    backend: &impl ImageBackend,
    config: &Config,
) -> Result<BuildReport, BuildError> {
    let renderer = Renderer::new();
    let dist = &config.dist_dir;

    reset_destination(dist)?;
    info!(path = %dist.display(), "Destination reset");

    let copied = merge(&config.template_dir, &config.src_dir, dist)?;

    let raster = RasterTransform::new(backend, config);
    let images = transcode(&config.template_dir, &config.src_dir, dist, &raster)
        .map_err(BuildError::Images)?;

    let templates_transform = TemplateTransform::new(&renderer, config);
    let templates = transcode(
        &config.template_dir,
        &config.src_dir,
        dist,
        &templates_transform,
    )
    .map_err(BuildError::Templates)?;

    let pages = assemble_pages_with_backend(backend, config, &renderer)?;

    Ok(BuildReport {
        dist_dir: dist.clone(),
        copied,
        images,
        templates,
        pages,
    })
}

/// Delete `dist` and everything in it, then recreate it empty.
pub fn reset_destination(dist: &Path) -> Result<(), BuildError> {
    let reset_err = |source| BuildError::Reset {
        path: dist.to_path_buf(),
        source,
    };
    if dist.exists() {
        fs::remove_dir_all(dist).map_err(reset_err)?;
    }
    fs::create_dir_all(dist).map_err(reset_err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Page;
    use crate::imaging::backend::tests::MockBackend;
    use tempfile::TempDir;

    fn write(path: &Path, content: &str) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    fn project() -> (TempDir, Config) {
        let tmp = TempDir::new().unwrap();
        let config = Config {
            template_dir: tmp.path().join("template"),
            src_dir: tmp.path().join("src"),
            pages_dir: tmp.path().join("pages"),
            dist_dir: tmp.path().join("dist"),
            minify: false,
            pages: vec![Page::default()],
            ..Config::default()
        };
        write(
            &config.page_template_path(),
            "{% for a in articles %}{{ a }}{% endfor %}",
        );
        write(&config.pages_dir.join("index/1.md"), "# Hi");
        (tmp, config)
    }

    #[test]
    fn reset_removes_stale_files() {
        let tmp = TempDir::new().unwrap();
        let dist = tmp.path().join("dist");
        write(&dist.join("old/stale.html"), "x");

        reset_destination(&dist).unwrap();
        assert!(dist.is_dir());
        assert_eq!(fs::read_dir(&dist).unwrap().count(), 0);
    }

    #[test]
    fn build_runs_every_stage() {
        let (_tmp, config) = project();
        write(&config.template_dir.join("robots.txt"), "theme");
        write(&config.src_dir.join("robots.txt"), "site");
        write(&config.template_dir.join("site.css"), "a { color: {{ style.accent }}; }");
        write(&config.src_dir.join("photos/a.png"), "");
        write(&config.dist_dir.join("leftover.txt"), "old");

        let backend = MockBackend::uniform(100, 80);
        let report = build_with_backend(&backend, &config).unwrap();

        assert_eq!(report.copied, 2);
        assert_eq!(report.images, 1);
        assert_eq!(report.templates, 1);
        assert_eq!(report.pages, vec![config.dist_dir.join("index.html")]);

        let dist = &config.dist_dir;
        assert!(!dist.join("leftover.txt").exists());
        assert_eq!(fs::read_to_string(dist.join("robots.txt")).unwrap(), "site");
        assert_eq!(
            fs::read_to_string(dist.join("site.css")).unwrap(),
            "a { color: #00F; }"
        );
        assert_eq!(
            fs::read_to_string(dist.join("index.html")).unwrap(),
            "<article><h1>Hi</h1>\n</article>"
        );
        assert!(
            backend
                .encoded_outputs()
                .iter()
                .any(|o| o.ends_with("photos/a_thumb.avif"))
        );
    }

    #[test]
    fn image_failure_is_tagged_and_stops_later_stages() {
        let (_tmp, config) = project();
        write(&config.src_dir.join("broken.png"), "");

        let backend = MockBackend::uniform(10, 10).failing_on("broken");
        let result = build_with_backend(&backend, &config);

        assert!(matches!(result, Err(BuildError::Images(_))));
        assert!(!config.dist_dir.join("index.html").exists());
    }

    #[test]
    fn template_failure_is_tagged() {
        let (_tmp, config) = project();
        write(&config.src_dir.join("app.js"), "{% if %}");

        let result = build_with_backend(&MockBackend::new(), &config);
        assert!(matches!(result, Err(BuildError::Templates(_))));
    }

    #[test]
    fn page_failure_is_tagged() {
        let (_tmp, mut config) = project();
        config.pages.push(Page {
            text: "Missing".into(),
            link: "missing.html".into(),
            in_nav: true,
        });

        let result = build_with_backend(&MockBackend::new(), &config);
        assert!(matches!(
            result,
            Err(BuildError::Pages(PageError::MissingContentDirectory { .. }))
        ));
    }
}
