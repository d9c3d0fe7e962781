//! Asset classification.
//!
//! Every file under the theme or source tree falls into exactly one
//! [`AssetClass`], decided once from its path. The merger copies `Copy`
//! assets, the transcoder handles `Template` and `Image`, and `Skip` assets
//! never reach the destination tree on their own.
//!
//! | Class | Extensions | Handled by |
//! |---|---|---|
//! | `Copy` | anything else | [`merge`](crate::merge) |
//! | `Template` | `css`, `js` | [`transcode`](crate::transcode) (template transform) |
//! | `Image` | `bmp`, `jpg`, `jpeg`, `png`, `tif`, `tiff`, `webp` | [`transcode`](crate::transcode) (raster transform) |
//! | `Skip` | `md`, `jinja`, version-control paths | page assembly reads them in place |

use std::path::Path;

/// Stylesheets and scripts, evaluated as templates.
pub const TEMPLATE_EXTENSIONS: &[&str] = &["css", "js"];

/// Raster images with decoders compiled into the `image` crate features.
pub const RASTER_EXTENSIONS: &[&str] = &["bmp", "jpg", "jpeg", "png", "tif", "tiff", "webp"];

/// Inputs consumed by page assembly, never emitted as files.
pub const SOURCE_ONLY_EXTENSIONS: &[&str] = &["md", "jinja"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AssetClass {
    Copy,
    Template,
    Image,
    Skip,
}

impl AssetClass {
    /// Classify a path relative to its tree root.
    pub fn of(relative: &Path) -> Self {
        if is_vcs_path(relative) {
            return AssetClass::Skip;
        }
        let ext = relative
            .extension()
            .map(|e| e.to_string_lossy().to_lowercase())
            .unwrap_or_default();
        let ext = ext.as_str();

        if SOURCE_ONLY_EXTENSIONS.contains(&ext) {
            AssetClass::Skip
        } else if TEMPLATE_EXTENSIONS.contains(&ext) {
            AssetClass::Template
        } else if RASTER_EXTENSIONS.contains(&ext) {
            AssetClass::Image
        } else {
            AssetClass::Copy
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            AssetClass::Copy => "copy",
            AssetClass::Template => "template",
            AssetClass::Image => "image",
            AssetClass::Skip => "skip",
        }
    }
}

/// True when any path segment is version-control bookkeeping
/// (`.git`, `.gitignore`, `.gitattributes`, ...).
pub fn is_vcs_path(relative: &Path) -> bool {
    relative
        .components()
        .any(|c| c.as_os_str().to_string_lossy().starts_with(".git"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_by_extension() {
        assert_eq!(AssetClass::of(Path::new("css/site.css")), AssetClass::Template);
        assert_eq!(AssetClass::of(Path::new("js/nav.js")), AssetClass::Template);
        assert_eq!(AssetClass::of(Path::new("img/logo.png")), AssetClass::Image);
        assert_eq!(AssetClass::of(Path::new("img/photo.JPG")), AssetClass::Image);
        assert_eq!(AssetClass::of(Path::new("page.html.jinja")), AssetClass::Skip);
        assert_eq!(AssetClass::of(Path::new("notes.md")), AssetClass::Skip);
        assert_eq!(AssetClass::of(Path::new("fonts/a.woff2")), AssetClass::Copy);
        assert_eq!(AssetClass::of(Path::new("robots.txt")), AssetClass::Copy);
    }

    #[test]
    fn files_without_extension_are_copied() {
        assert_eq!(AssetClass::of(Path::new("CNAME")), AssetClass::Copy);
    }

    #[test]
    fn vcs_paths_are_skipped() {
        assert_eq!(AssetClass::of(Path::new(".git/HEAD")), AssetClass::Skip);
        assert_eq!(AssetClass::of(Path::new(".gitignore")), AssetClass::Skip);
        assert_eq!(
            AssetClass::of(Path::new("vendor/.git/objects/ab.png")),
            AssetClass::Skip
        );
    }

    #[test]
    fn names_merely_containing_git_are_kept() {
        assert_eq!(AssetClass::of(Path::new("digital.txt")), AssetClass::Copy);
        assert_eq!(AssetClass::of(Path::new("img/github.png")), AssetClass::Image);
    }
}
