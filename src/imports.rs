//! Import directives.
//!
//! An article may splice in external content with an inline element:
//!
//! ```html
//! <import src="snippet.html">
//! <import src='trip.gallery.json' />
//! ```
//!
//! `src` is resolved relative to the directory of the article that contains
//! the directive. Targets ending in [`GALLERY_SUFFIX`](crate::gallery::GALLERY_SUFFIX)
//! are replaced by a rendered gallery fragment; anything else is replaced by
//! the file's verbatim contents.
//!
//! Substitution is a single pass over the matches of the original text.
//! Content spliced in is never scanned again, so an imported file that itself
//! contains `<import>` keeps that directive as literal markup.

use crate::gallery::{GalleryError, is_gallery_descriptor};
use regex::{Captures, Regex};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use thiserror::Error;
use tracing::debug;

static IMPORT_DIRECTIVE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"<import\s+src\s*=\s*(?:"([^"]*)"|'([^']*)')\s*/?>(?:\s*</import>)?"#)
        .expect("import directive pattern is valid")
});

#[derive(Error, Debug)]
pub enum ImportError {
    #[error("Imported file not found: {0}")]
    NotFound(PathBuf),
    #[error("Failed to read import {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error(transparent)]
    Gallery(#[from] GalleryError),
}

/// A directive found in an article, in document order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportDirective {
    /// Byte range of the whole directive in the scanned text.
    pub span: std::ops::Range<usize>,
    /// The raw `src` attribute value.
    pub src: String,
}

/// List the import directives in `text`.
pub fn find_imports(text: &str) -> Vec<ImportDirective> {
    IMPORT_DIRECTIVE
        .captures_iter(text)
        .filter_map(|caps| directive(&caps))
        .collect()
}

fn directive(caps: &Captures<'_>) -> Option<ImportDirective> {
    let whole = caps.get(0)?;
    let src = caps.get(1).or_else(|| caps.get(2))?;
    Some(ImportDirective {
        span: whole.range(),
        src: src.as_str().to_string(),
    })
}

/// Replace every import directive in `text`.
///
/// `base_dir` is the containing article's directory. `build_gallery` is
/// called once per gallery directive with the resolved descriptor path.
pub fn resolve_imports<F>(
    text: &str,
    base_dir: &Path,
    mut build_gallery: F,
) -> Result<String, ImportError>
where
    F: FnMut(&Path) -> Result<String, GalleryError>,
{
    let directives = find_imports(text);
    if directives.is_empty() {
        return Ok(text.to_string());
    }

    let mut out = String::with_capacity(text.len());
    let mut cursor = 0;
    for import in directives {
        out.push_str(&text[cursor..import.span.start]);

        let target = base_dir.join(&import.src);
        let replacement = if is_gallery_descriptor(&target) {
            debug!(target = %target.display(), "Importing gallery");
            build_gallery(&target)?
        } else {
            debug!(target = %target.display(), "Importing file");
            read_import(&target)?
        };
        out.push_str(&replacement);
        cursor = import.span.end;
    }
    out.push_str(&text[cursor..]);
    Ok(out)
}

fn read_import(path: &Path) -> Result<String, ImportError> {
    if !path.is_file() {
        return Err(ImportError::NotFound(path.to_path_buf()));
    }
    fs::read_to_string(path).map_err(|source| ImportError::Io {
        path: path.to_path_buf(),
        source,
    })
}
