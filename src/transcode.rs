//! Asset transcoding: the transform stages.
//!
//! Two transforms run over both trees, theme tree first:
//!
//! | Transform | Input class | Output |
//! |---|---|---|
//! | [`RasterTransform`] | `Image` | `<stem>.avif` + `<stem>_thumb.avif` |
//! | [`TemplateTransform`] | `Template` | same relative path, evaluated against the site context |
//!
//! ## Execution
//!
//! Work is planned up front as an immutable list of [`WorkUnit`]s per tree.
//! Planning rejects two inputs that would write the same output (for example
//! `logo.png` and `logo.jpg` both becoming `logo.avif`), so no two workers
//! ever touch the same file. Units then run on the global rayon pool, sized
//! from `processing.max_workers` at startup.
//!
//! A tree is a barrier: every unit of the theme tree finishes before the
//! source tree starts, which is what lets source outputs replace theme
//! outputs at the same path.
//!
//! Failure policy is fail-fast. Once a unit fails no further units start,
//! units already running finish, every failure is logged, and the first one
//! is returned.

use crate::assets::AssetClass;
use crate::config::Config;
use crate::imaging::{BackendError, ImageBackend, Quality, TranscodeConfig, transcode_image};
use crate::naming::{thumbnail_path, transcoded_path};
use crate::template::{Renderer, SiteContext, TemplateError};
use minijinja::Value;
use rayon::prelude::*;
use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use thiserror::Error;
use tracing::{debug, error, info};
use walkdir::WalkDir;

#[derive(Error, Debug)]
pub enum TranscodeError {
    #[error("Failed to walk {root}: {source}")]
    Walk {
        root: PathBuf,
        #[source]
        source: walkdir::Error,
    },
    #[error("{first} and {second} both map to {dest}")]
    DestinationCollision {
        dest: PathBuf,
        first: PathBuf,
        second: PathBuf,
    },
    #[error("IO error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error(transparent)]
    Template(#[from] TemplateError),
    #[error(transparent)]
    Imaging(#[from] BackendError),
}

/// One input file and the primary output it produces.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkUnit {
    pub source: PathBuf,
    pub dest: PathBuf,
}

/// A per-file transformation applied to one asset class.
pub trait AssetTransform: Sync {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// The class of inputs this transform consumes.
    fn class(&self) -> AssetClass;

    /// Primary output for an input at `relative` inside its tree.
    fn destination(&self, relative: &Path, dest_root: &Path) -> PathBuf {
        dest_root.join(relative)
    }

    /// Every file written for a primary output.
    fn outputs(&self, dest: &Path) -> Vec<PathBuf> {
        vec![dest.to_path_buf()]
    }

    fn apply(&self, unit: &WorkUnit) -> Result<(), TranscodeError>;
}

/// Evaluates stylesheets and scripts as templates.
pub struct TemplateTransform<'a> {
    renderer: &'a Renderer,
    context: Value,
}

impl<'a> TemplateTransform<'a> {
    pub fn new(renderer: &'a Renderer, config: &Config) -> Self {
        Self {
            renderer,
            context: SiteContext::for_assets(config).to_value(),
        }
    }
}

impl AssetTransform for TemplateTransform<'_> {
    fn name(&self) -> &'static str {
        "templates"
    }

    fn class(&self) -> AssetClass {
        AssetClass::Template
    }

    fn apply(&self, unit: &WorkUnit) -> Result<(), TranscodeError> {
        let source = fs::read_to_string(&unit.source).map_err(|e| io_error(&unit.source, e))?;
        let name = unit.source.display().to_string();
        let rendered = self.renderer.render(&name, &source, &self.context)?;
        write_output(&unit.dest, rendered.as_bytes())?;
        debug!(from = %unit.source.display(), to = %unit.dest.display(), "Template rendered");
        Ok(())
    }
}

/// Re-encodes raster images and derives their thumbnails.
pub struct RasterTransform<'a, B: ImageBackend> {
    backend: &'a B,
    config: TranscodeConfig,
}

impl<'a, B: ImageBackend> RasterTransform<'a, B> {
    pub fn new(backend: &'a B, config: &Config) -> Self {
        Self {
            backend,
            config: TranscodeConfig {
                quality: Quality::new(config.image_quality),
                thumbnail_quality: Quality::new(config.thumbnail_quality),
            },
        }
    }
}

impl<B: ImageBackend> AssetTransform for RasterTransform<'_, B> {
    fn name(&self) -> &'static str {
        "images"
    }

    fn class(&self) -> AssetClass {
        AssetClass::Image
    }

    fn destination(&self, relative: &Path, dest_root: &Path) -> PathBuf {
        transcoded_path(&dest_root.join(relative))
    }

    fn outputs(&self, dest: &Path) -> Vec<PathBuf> {
        vec![dest.to_path_buf(), thumbnail_path(dest)]
    }

    fn apply(&self, unit: &WorkUnit) -> Result<(), TranscodeError> {
        let result = transcode_image(self.backend, &unit.source, &unit.dest, &self.config)?;
        debug!(
            from = %unit.source.display(),
            to = %result.output.display(),
            thumbnail = %result.thumbnail.display(),
            width = result.dimensions.width,
            height = result.dimensions.height,
            thumb_width = result.thumbnail_dimensions.width,
            thumb_height = result.thumbnail_dimensions.height,
            "Image transcoded"
        );
        Ok(())
    }
}

/// Enumerate the units of one tree for `transform`.
///
/// A missing root yields no units.
pub fn plan(
    root: &Path,
    dest_root: &Path,
    transform: &impl AssetTransform,
) -> Result<Vec<WorkUnit>, TranscodeError> {
    if !root.exists() {
        return Ok(Vec::new());
    }

    let mut units = Vec::new();
    let mut claimed: HashMap<PathBuf, PathBuf> = HashMap::new();
    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = entry.map_err(|source| TranscodeError::Walk {
            root: root.to_path_buf(),
            source,
        })?;
        if !entry.file_type().is_file() {
            continue;
        }
        let relative = entry.path().strip_prefix(root).unwrap_or(entry.path());
        if AssetClass::of(relative) != transform.class() {
            continue;
        }

        let dest = transform.destination(relative, dest_root);
        for output in transform.outputs(&dest) {
            if let Some(first) = claimed.insert(output.clone(), entry.path().to_path_buf()) {
                return Err(TranscodeError::DestinationCollision {
                    dest: output,
                    first,
                    second: entry.path().to_path_buf(),
                });
            }
        }
        units.push(WorkUnit {
            source: entry.path().to_path_buf(),
            dest,
        });
    }
    Ok(units)
}

/// Run `units` in parallel. Returns how many completed.
pub fn run(units: &[WorkUnit], transform: &impl AssetTransform) -> Result<usize, TranscodeError> {
    let failed = AtomicBool::new(false);

    let results: Vec<Option<Result<(), TranscodeError>>> = units
        .par_iter()
        .map(|unit| {
            if failed.load(Ordering::Relaxed) {
                return None;
            }
            let result = transform.apply(unit);
            if let Err(e) = &result {
                error!(
                    stage = transform.name(),
                    source = %unit.source.display(),
                    error = %e,
                    "Transcode failed"
                );
                failed.store(true, Ordering::Relaxed);
            }
            Some(result)
        })
        .collect();

    let mut completed = 0;
    let mut first_error = None;
    for result in results.into_iter().flatten() {
        match result {
            Ok(()) => completed += 1,
            Err(e) => {
                first_error.get_or_insert(e);
            }
        }
    }
    match first_error {
        Some(e) => Err(e),
        None => Ok(completed),
    }
}

/// Plan and run one tree.
pub fn transcode_tree(
    root: &Path,
    dest_root: &Path,
    transform: &impl AssetTransform,
) -> Result<usize, TranscodeError> {
    let units = plan(root, dest_root, transform)?;
    debug!(
        stage = transform.name(),
        class = transform.class().label(),
        root = %root.display(),
        units = units.len(),
        "Planned"
    );
    run(&units, transform)
}

/// Run `transform` over the theme tree, then the source tree.
pub fn transcode(
    template_root: &Path,
    source_root: &Path,
    dest_root: &Path,
    transform: &impl AssetTransform,
) -> Result<usize, TranscodeError> {
    let mut total = 0;
    for root in [template_root, source_root] {
        let done = transcode_tree(root, dest_root, transform)?;
        info!(stage = transform.name(), root = %root.display(), files = done, "Transcoded");
        total += done;
    }
    Ok(total)
}

fn io_error(path: &Path, source: io::Error) -> TranscodeError {
    TranscodeError::Io {
        path: path.to_path_buf(),
        source,
    }
}

/// Replace `dest` with `bytes`, creating parent directories.
fn write_output(dest: &Path, bytes: &[u8]) -> Result<(), TranscodeError> {
    if let Some(parent) = dest.parent() {
        fs::create_dir_all(parent).map_err(|e| io_error(parent, e))?;
    }
    if dest.exists() {
        fs::remove_file(dest).map_err(|e| io_error(dest, e))?;
    }
    fs::write(dest, bytes).map_err(|e| io_error(dest, e))
}
