//! Gallery fragments.
//!
//! An article can import a gallery descriptor (any file ending in
//! [`GALLERY_SUFFIX`]). The descriptor is a JSON array of items:
//!
//! ```json
//! [
//!   { "image": "photos/dawn.jpg", "alt": "Dawn", "lightbox": true,
//!     "caption": "First light" },
//!   { "image": "photos/dusk.png", "link": "https://example.com" },
//!   { "caption": "Text-only tile" }
//! ]
//! ```
//!
//! For every item with an image the builder reads the source image's
//! dimensions, derives the half-size thumbnail dimensions, and rewrites the
//! paths to the names the raster transcoder produces:
//!
//! ```text
//! image:     photos/dawn.jpg  →  photos/dawn.avif
//! thumbnail:                     photos/dawn_thumb.avif
//! ```
//!
//! The augmented items are rendered through the gallery template as `items`,
//! next to the usual site context. Descriptors are read fresh for every
//! import; nothing is cached and nothing is written back.

use crate::config::Config;
use crate::imaging::{
    BackendError, ImageBackend, RustBackend, get_dimensions, thumbnail_dimensions,
};
use crate::naming::{thumbnail_reference, transcoded_reference};
use crate::template::{Renderer, SiteContext, TemplateError};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

/// Import targets ending with this suffix are rendered as galleries.
pub const GALLERY_SUFFIX: &str = ".gallery.json";

#[derive(Error, Debug)]
pub enum GalleryError {
    #[error("Gallery file not found: {0}")]
    NotFound(PathBuf),
    #[error("Gallery descriptor {path} is malformed: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("Gallery image not found: {0}")]
    ImageNotFound(PathBuf),
    #[error("Gallery image unreadable: {0}")]
    Imaging(#[from] BackendError),
    #[error(transparent)]
    Template(#[from] TemplateError),
    #[error("IO error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// One gallery tile.
///
/// The dimension and thumbnail fields are output-only: they are ignored when
/// reading a descriptor and filled in by [`build_gallery`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GalleryItem {
    /// Image path relative to the source tree. Rewritten to the transcoded name.
    pub image: Option<String>,
    pub alt: Option<String>,
    pub lightbox: bool,
    pub link: Option<String>,
    pub caption: Option<String>,
    #[serde(skip_deserializing)]
    pub width: u32,
    #[serde(skip_deserializing)]
    pub height: u32,
    #[serde(skip_deserializing)]
    pub thumb_width: u32,
    #[serde(skip_deserializing)]
    pub thumb_height: u32,
    #[serde(skip_deserializing)]
    pub thumbnail: Option<String>,
}

/// Ordered gallery items, as stored in a descriptor.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Gallery {
    pub items: Vec<GalleryItem>,
}

/// True when an import target should be routed to the gallery builder.
pub fn is_gallery_descriptor(path: &Path) -> bool {
    path.to_string_lossy().ends_with(GALLERY_SUFFIX)
}

/// Read and parse a descriptor.
pub fn load_gallery(descriptor: &Path) -> Result<Gallery, GalleryError> {
    if !descriptor.is_file() {
        return Err(GalleryError::NotFound(descriptor.to_path_buf()));
    }
    let content = fs::read_to_string(descriptor).map_err(|source| GalleryError::Io {
        path: descriptor.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&content).map_err(|source| GalleryError::Parse {
        path: descriptor.to_path_buf(),
        source,
    })
}

#[derive(Serialize)]
struct GalleryContext<'a> {
    items: &'a [GalleryItem],
    #[serde(flatten)]
    site: SiteContext<'a>,
}

/// Render the gallery described by `descriptor` into an HTML fragment.
pub fn build_gallery(
    descriptor: &Path,
    config: &Config,
    renderer: &Renderer,
) -> Result<String, GalleryError> {
    build_gallery_with_backend(&RustBackend::new(), descriptor, config, renderer)
}

/// Render a gallery using a specific backend (allows testing with mock).
pub fn build_gallery_with_backend(
    backend: &impl ImageBackend,
    descriptor: &Path,
    config: &Config,
    renderer: &Renderer,
) -> Result<String, GalleryError> {
    let mut gallery = load_gallery(descriptor)?;

    let template_path = config.gallery_template_path();
    if !template_path.is_file() {
        return Err(GalleryError::NotFound(template_path));
    }

    for item in &mut gallery.items {
        resolve_item(backend, item, &config.src_dir)?;
    }
    debug!(
        descriptor = %descriptor.display(),
        items = gallery.items.len(),
        "Gallery resolved"
    );

    let ctx = GalleryContext {
        items: &gallery.items,
        site: SiteContext::for_assets(config),
    };
    Ok(renderer.render_file(&template_path, ctx)?)
}

/// Fill in dimensions and rewritten paths for one item. Items without an
/// image are left as they are.
fn resolve_item(
    backend: &impl ImageBackend,
    item: &mut GalleryItem,
    source_root: &Path,
) -> Result<(), GalleryError> {
    let Some(reference) = item.image.as_deref() else {
        return Ok(());
    };

    let source = source_root.join(reference.trim_start_matches('/'));
    if !source.is_file() {
        return Err(GalleryError::ImageNotFound(source));
    }

    let (width, height) = get_dimensions(backend, &source)?;
    let (thumb_width, thumb_height) = thumbnail_dimensions(width, height);
    let image = transcoded_reference(reference);

    item.width = width;
    item.height = height;
    item.thumb_width = thumb_width;
    item.thumb_height = thumb_height;
    item.thumbnail = Some(thumbnail_reference(&image));
    item.image = Some(image);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::imaging::backend::tests::MockBackend;
    use tempfile::TempDir;

    const GALLERY_TEMPLATE: &str = "<div class=\"gallery\">\
{% for item in items %}<figure data-w=\"{{ item.width }}\" data-tw=\"{{ item.thumb_width }}\" data-th=\"{{ item.thumb_height }}\">\
{% if item.image %}<img src=\"{{ item.thumbnail }}\" data-full=\"{{ item.image }}\">{% endif %}\
{% if item.caption %}<figcaption>{{ item.caption }}</figcaption>{% endif %}</figure>\
{% endfor %}</div>";

    struct Fixture {
        _tmp: TempDir,
        config: Config,
        descriptor: PathBuf,
    }

    fn fixture(descriptor_json: &str, images: &[&str]) -> Fixture {
        let tmp = TempDir::new().unwrap();
        let config = Config {
            template_dir: tmp.path().join("template"),
            src_dir: tmp.path().join("src"),
            pages_dir: tmp.path().join("pages"),
            dist_dir: tmp.path().join("dist"),
            ..Config::default()
        };
        fs::create_dir_all(&config.template_dir).unwrap();
        fs::write(config.gallery_template_path(), GALLERY_TEMPLATE).unwrap();
        for image in images {
            let path = config.src_dir.join(image);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(path, "").unwrap();
        }
        let descriptor = config.pages_dir.join("index/photos.gallery.json");
        fs::create_dir_all(descriptor.parent().unwrap()).unwrap();
        fs::write(&descriptor, descriptor_json).unwrap();
        Fixture {
            _tmp: tmp,
            config,
            descriptor,
        }
    }

    #[test]
    fn descriptor_suffix_detection() {
        assert!(is_gallery_descriptor(Path::new("a/trip.gallery.json")));
        assert!(!is_gallery_descriptor(Path::new("a/trip.json")));
        assert!(!is_gallery_descriptor(Path::new("a/snippet.html")));
    }

    #[test]
    fn output_fields_are_ignored_on_input() {
        let gallery: Gallery = serde_json::from_str(
            r#"[{"image": "a.jpg", "width": 5, "thumbnail": "x", "lightbox": true}]"#,
        )
        .unwrap();
        let item = &gallery.items[0];
        assert_eq!(item.image.as_deref(), Some("a.jpg"));
        assert!(item.lightbox);
        assert_eq!(item.width, 0);
        assert_eq!(item.thumbnail, None);
    }

    #[test]
    fn renders_one_block_per_item_with_half_thumbnails() {
        let fx = fixture(
            r#"[
                {"image": "photos/a.jpg", "caption": "A"},
                {"image": "photos/b.png"},
                {"image": "photos/c.jpeg"}
            ]"#,
            &["photos/a.jpg", "photos/b.png", "photos/c.jpeg"],
        );
        let backend = MockBackend::uniform(801, 600);

        let html =
            build_gallery_with_backend(&backend, &fx.descriptor, &fx.config, &Renderer::new())
                .unwrap();

        assert_eq!(html.matches("<figure").count(), 3);
        assert_eq!(html.matches(r#"data-tw="400" data-th="300""#).count(), 3);
        assert!(html.contains(r#"src="photos/a_thumb.avif" data-full="photos/a.avif""#));
        assert!(html.contains(r#"data-full="photos/b.avif""#));
        assert!(html.contains("<figcaption>A</figcaption>"));
    }

    #[test]
    fn items_without_image_are_kept_untouched() {
        let fx = fixture(r#"[{"caption": "Just text"}]"#, &[]);
        let backend = MockBackend::new();

        let html =
            build_gallery_with_backend(&backend, &fx.descriptor, &fx.config, &Renderer::new())
                .unwrap();

        assert!(html.contains(r#"data-w="0""#));
        assert!(!html.contains("<img"));
        assert!(backend.get_operations().is_empty());
    }

    #[test]
    fn missing_image_is_image_not_found() {
        let fx = fixture(r#"[{"image": "photos/missing.jpg"}]"#, &[]);
        let result = build_gallery_with_backend(
            &MockBackend::uniform(10, 10),
            &fx.descriptor,
            &fx.config,
            &Renderer::new(),
        );
        assert!(matches!(
            result,
            Err(GalleryError::ImageNotFound(p)) if p.ends_with("photos/missing.jpg")
        ));
    }

    #[test]
    fn malformed_descriptor_is_parse_error() {
        let fx = fixture(r#"{"image": "not-a-list.jpg"}"#, &[]);
        let result = build_gallery_with_backend(
            &MockBackend::new(),
            &fx.descriptor,
            &fx.config,
            &Renderer::new(),
        );
        assert!(matches!(result, Err(GalleryError::Parse { .. })));
    }

    #[test]
    fn missing_descriptor_is_not_found() {
        let fx = fixture("[]", &[]);
        let missing = fx.descriptor.with_file_name("other.gallery.json");
        let result =
            build_gallery_with_backend(&MockBackend::new(), &missing, &fx.config, &Renderer::new());
        assert!(matches!(result, Err(GalleryError::NotFound(p)) if p == missing));
    }

    #[test]
    fn missing_template_is_not_found() {
        let fx = fixture("[]", &[]);
        fs::remove_file(fx.config.gallery_template_path()).unwrap();
        let result = build_gallery_with_backend(
            &MockBackend::new(),
            &fx.descriptor,
            &fx.config,
            &Renderer::new(),
        );
        assert!(matches!(
            result,
            Err(GalleryError::NotFound(p)) if p.ends_with("gallery.html.jinja")
        ));
    }

    #[test]
    fn undecodable_image_propagates() {
        let fx = fixture(r#"[{"image": "photos/bad.jpg"}]"#, &["photos/bad.jpg"]);
        let backend = MockBackend::uniform(10, 10).failing_on("bad.jpg");
        let result =
            build_gallery_with_backend(&backend, &fx.descriptor, &fx.config, &Renderer::new());
        assert!(matches!(result, Err(GalleryError::Imaging(_))));
    }

    #[test]
    fn repeated_builds_reread_descriptor() {
        let fx = fixture(r#"[{"caption": "one"}]"#, &[]);
        let renderer = Renderer::new();
        let first =
            build_gallery_with_backend(&MockBackend::new(), &fx.descriptor, &fx.config, &renderer)
                .unwrap();
        fs::write(&fx.descriptor, r#"[{"caption": "one"}, {"caption": "two"}]"#).unwrap();
        let second =
            build_gallery_with_backend(&MockBackend::new(), &fx.descriptor, &fx.config, &renderer)
                .unwrap();

        assert_eq!(first.matches("<figure").count(), 1);
        assert_eq!(second.matches("<figure").count(), 2);
    }

    #[test]
    fn real_backend_reads_image_dimensions() {
        let fx = fixture(r#"[{"image": "photos/real.png"}]"#, &[]);
        crate::test_helpers::create_test_png(&fx.config.src_dir.join("photos/real.png"), 21, 10);

        let html = build_gallery(&fx.descriptor, &fx.config, &Renderer::new()).unwrap();
        assert!(html.contains(r#"data-w="21" data-tw="10" data-th="5""#));
    }
}
