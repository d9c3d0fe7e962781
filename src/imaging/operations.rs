//! High-level image operations.
//!
//! These functions combine calculations with backend execution.
//! They take configuration, compute parameters, and call the backend.

use super::backend::{BackendError, Dimensions, ImageBackend};
use super::calculations::thumbnail_dimensions;
use super::params::{EncodeParams, Quality};
use crate::naming::thumbnail_path;
use std::path::{Path, PathBuf};

/// Result type for image operations.
pub type Result<T> = std::result::Result<T, BackendError>;

/// Get image dimensions using the backend.
pub fn get_dimensions(backend: &impl ImageBackend, path: &Path) -> Result<(u32, u32)> {
    let dims = backend.identify(path)?;
    Ok((dims.width, dims.height))
}

/// Encode qualities for the two raster outputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TranscodeConfig {
    pub quality: Quality,
    pub thumbnail_quality: Quality,
}

impl Default for TranscodeConfig {
    fn default() -> Self {
        Self {
            quality: Quality::new(90),
            thumbnail_quality: Quality::new(80),
        }
    }
}

/// What [`transcode_image`] wrote.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranscodedImage {
    pub output: PathBuf,
    pub thumbnail: PathBuf,
    pub dimensions: Dimensions,
    pub thumbnail_dimensions: Dimensions,
}

/// Plan the primary and thumbnail encodes for one image.
///
/// Useful for testing parameter generation.
pub fn plan_transcode(
    source: &Path,
    output: &Path,
    original: Dimensions,
    config: &TranscodeConfig,
) -> [EncodeParams; 2] {
    let (thumb_w, thumb_h) = thumbnail_dimensions(original.width, original.height);
    [
        EncodeParams {
            source: source.to_path_buf(),
            output: output.to_path_buf(),
            width: original.width,
            height: original.height,
            quality: config.quality,
        },
        EncodeParams {
            source: source.to_path_buf(),
            output: thumbnail_path(output),
            width: thumb_w,
            height: thumb_h,
            quality: config.thumbnail_quality,
        },
    ]
}

/// Re-encode `source` to `output` at full size and write its half-size
/// thumbnail next to it. Existing files at either path are replaced.
pub fn transcode_image(
    backend: &impl ImageBackend,
    source: &Path,
    output: &Path,
    config: &TranscodeConfig,
) -> Result<TranscodedImage> {
    let dimensions = backend.identify(source)?;
    let [main, thumb] = plan_transcode(source, output, dimensions, config);

    backend.encode(&main)?;
    backend.encode(&thumb)?;

    Ok(TranscodedImage {
        output: main.output,
        thumbnail: thumb.output,
        dimensions,
        thumbnail_dimensions: Dimensions {
            width: thumb.width,
            height: thumb.height,
        },
    })
}
