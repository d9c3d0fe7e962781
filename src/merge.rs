//! Directory merging: the plain-copy stage.
//!
//! Copies the theme tree and then the source tree into the destination,
//! byte for byte, skipping every path whose [`AssetClass`] is not `Copy`.
//! Because the source tree is copied second, it wins any path collision.
//!
//! ```text
//! template/fonts/a.woff2   ─┐
//! template/robots.txt      ─┼─→  dist/fonts/a.woff2
//! src/robots.txt           ─┘     dist/robots.txt      (from src/)
//! ```

use crate::assets::AssetClass;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};
use walkdir::WalkDir;

#[derive(Error, Debug)]
pub enum MergeError {
    #[error("Failed to walk {root}: {source}")]
    Walk {
        root: PathBuf,
        #[source]
        source: walkdir::Error,
    },
    #[error("Failed to copy {from} → {to}: {source}")]
    Copy {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Copy both trees into `dest_root`, template first, source second.
///
/// Returns the number of files written (a collision counts twice).
pub fn merge(
    template_root: &Path,
    source_root: &Path,
    dest_root: &Path,
) -> Result<usize, MergeError> {
    let from_template = copy_tree(template_root, dest_root)?;
    info!(root = %template_root.display(), files = from_template, "Theme files copied");

    let from_source = copy_tree(source_root, dest_root)?;
    info!(root = %source_root.display(), files = from_source, "Source files copied");

    Ok(from_template + from_source)
}

/// Mirror every `Copy`-class file of `root` into `dest_root`.
///
/// A missing root contributes nothing.
pub fn copy_tree(root: &Path, dest_root: &Path) -> Result<usize, MergeError> {
    if !root.exists() {
        debug!(root = %root.display(), "Tree absent, nothing to copy");
        return Ok(0);
    }

    let mut copied = 0;
    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = entry.map_err(|source| MergeError::Walk {
            root: root.to_path_buf(),
            source,
        })?;
        if !entry.file_type().is_file() {
            continue;
        }
        let relative = entry.path().strip_prefix(root).unwrap_or(entry.path());
        if AssetClass::of(relative) != AssetClass::Copy {
            continue;
        }

        let dest = dest_root.join(relative);
        copy_file(entry.path(), &dest).map_err(|source| MergeError::Copy {
            from: entry.path().to_path_buf(),
            to: dest.clone(),
            source,
        })?;
        debug!(from = %entry.path().display(), to = %dest.display(), "Copied");
        copied += 1;
    }
    Ok(copied)
}

fn copy_file(from: &Path, to: &Path) -> io::Result<()> {
    if let Some(parent) = to.parent() {
        fs::create_dir_all(parent)?;
    }
    if to.exists() {
        fs::remove_file(to)?;
    }
    fs::copy(from, to)?;
    Ok(())
}
