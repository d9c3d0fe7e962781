//! Shared test utilities for the simple-site test suite.
//!
//! Synthetic images are generated with the `image` crate so tests never need
//! fixture binaries, and AVIF outputs are checked by reading the container
//! header rather than decoding pixels.
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! create_test_png(&tmp.path().join("a.png"), 24, 16);
//! // ... transcode ...
//! assert_eq!(avif_dimensions(&tmp.path().join("a.avif")), (24, 16));
//! ```

use image::{ImageEncoder, RgbImage, RgbaImage};
use std::path::Path;

fn ensure_parent(path: &Path) {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
}

/// Write a gradient JPEG of the given size.
pub fn create_test_jpeg(path: &Path, width: u32, height: u32) {
    ensure_parent(path);
    let img = RgbImage::from_fn(width, height, |x, y| {
        image::Rgb([(x % 256) as u8, (y % 256) as u8, 128])
    });
    let file = std::fs::File::create(path).unwrap();
    let writer = std::io::BufWriter::new(file);
    image::codecs::jpeg::JpegEncoder::new(writer)
        .write_image(img.as_raw(), width, height, image::ExtendedColorType::Rgb8)
        .unwrap();
}

/// Write a PNG with an alpha channel of the given size.
pub fn create_test_png(path: &Path, width: u32, height: u32) {
    ensure_parent(path);
    let img = RgbaImage::from_fn(width, height, |x, y| {
        image::Rgba([128, (x % 256) as u8, (y % 256) as u8, 200])
    });
    img.save_with_format(path, image::ImageFormat::Png).unwrap();
}

/// Width and height recorded in an AVIF file's primary item.
pub fn avif_dimensions(path: &Path) -> (u32, u32) {
    let data = std::fs::read(path).unwrap();
    let avif = avif_parse::read_avif(&mut std::io::Cursor::new(&data)).unwrap();
    let meta = avif.primary_item_metadata().unwrap();
    (meta.max_frame_width.get(), meta.max_frame_height.get())
}
