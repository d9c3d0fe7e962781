//! Image processing: pure Rust, statically linked.
//!
//! | Operation | Crate / function |
//! |---|---|
//! | **Identify** | `image::image_dimensions` (header only) |
//! | **Decode** | `image::ImageReader` (bmp, jpeg, png, tiff, webp) |
//! | **Resize** | `resize_exact` with Lanczos3 |
//! | **Encode → AVIF** | `image::codecs::avif::AvifEncoder` (rav1e) |
//!
//! The module is split into:
//! - **Calculations**: Pure functions for dimension math (unit testable)
//! - **Parameters**: Data structures describing image operations
//! - **Backend**: [`ImageBackend`] trait + [`RustBackend`]
//! - **Operations**: High-level functions combining calculations + backend

pub mod backend;
mod calculations;
pub mod operations;
mod params;
pub mod rust_backend;

pub use backend::{BackendError, Dimensions, ImageBackend};
pub use calculations::thumbnail_dimensions;
pub use operations::{TranscodeConfig, TranscodedImage, get_dimensions, transcode_image};
pub use params::{EncodeParams, Quality};
pub use rust_backend::RustBackend;
