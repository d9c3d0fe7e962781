//! Filename conventions shared by every stage.
//!
//! ## Natural Ordering
//!
//! Articles are concatenated in natural order: digit runs compare by numeric
//! value, everything else compares character by character. This lets authors
//! number files without zero padding:
//!
//! ```text
//! 1.md, 2.md, 10.md        (natural)
//! 1.md, 10.md, 2.md        (plain lexical)
//! ```
//!
//! ## Transcoded Names
//!
//! Raster inputs are re-encoded as AVIF. The primary output keeps the input
//! stem; the thumbnail inserts [`THUMBNAIL_SUFFIX`] before the extension:
//!
//! ```text
//! photos/dawn.jpg  →  photos/dawn.avif
//!                     photos/dawn_thumb.avif
//! ```

use std::cmp::Ordering;
use std::path::{Path, PathBuf};

/// Extension of every transcoded raster output.
pub const RASTER_OUTPUT_EXTENSION: &str = "avif";

/// Inserted between the stem and the extension of a thumbnail.
pub const THUMBNAIL_SUFFIX: &str = "_thumb";

/// Compare two strings in natural order.
///
/// Runs of ASCII digits compare by value (leading zeros ignored, ties broken
/// by run length so `01` sorts after `1`). All other characters compare by
/// code point. Falls back to plain comparison when the two are otherwise equal.
pub fn natural_cmp(a: &str, b: &str) -> Ordering {
    let mut left = a.char_indices().peekable();
    let mut right = b.char_indices().peekable();

    loop {
        match (left.peek().copied(), right.peek().copied()) {
            (None, None) => return a.cmp(b),
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some((li, lc)), Some((ri, rc))) => {
                if lc.is_ascii_digit() && rc.is_ascii_digit() {
                    let l_run = digit_run(a, li);
                    let r_run = digit_run(b, ri);
                    let ord = compare_digit_runs(l_run, r_run);
                    if ord != Ordering::Equal {
                        return ord;
                    }
                    for _ in 0..l_run.len() {
                        left.next();
                    }
                    for _ in 0..r_run.len() {
                        right.next();
                    }
                } else {
                    let ord = lc.cmp(&rc);
                    if ord != Ordering::Equal {
                        return ord;
                    }
                    left.next();
                    right.next();
                }
            }
        }
    }
}

fn digit_run(s: &str, start: usize) -> &str {
    let rest = &s[start..];
    let end = rest
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(rest.len());
    &rest[..end]
}

fn compare_digit_runs(l: &str, r: &str) -> Ordering {
    let l_trim = l.trim_start_matches('0');
    let r_trim = r.trim_start_matches('0');
    l_trim
        .len()
        .cmp(&r_trim.len())
        .then_with(|| l_trim.cmp(r_trim))
        .then_with(|| l.len().cmp(&r.len()))
}

/// Compare two paths in natural order, segment by segment.
pub fn natural_path_cmp(a: &Path, b: &Path) -> Ordering {
    let mut left = a.components();
    let mut right = b.components();
    loop {
        match (left.next(), right.next()) {
            (None, None) => return Ordering::Equal,
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some(l), Some(r)) => {
                let ord = natural_cmp(
                    &l.as_os_str().to_string_lossy(),
                    &r.as_os_str().to_string_lossy(),
                );
                if ord != Ordering::Equal {
                    return ord;
                }
            }
        }
    }
}

/// Path of the primary raster output for an input path.
pub fn transcoded_path(path: &Path) -> PathBuf {
    path.with_extension(RASTER_OUTPUT_EXTENSION)
}

/// Path of the thumbnail that sits next to a primary output.
///
/// `dir/name.ext` → `dir/name_thumb.ext`
pub fn thumbnail_path(path: &Path) -> PathBuf {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default();
    let name = match path.extension() {
        Some(ext) => format!("{stem}{THUMBNAIL_SUFFIX}.{}", ext.to_string_lossy()),
        None => format!("{stem}{THUMBNAIL_SUFFIX}"),
    };
    path.with_file_name(name)
}

/// Rewrite a `/`-separated reference to its transcoded name.
///
/// Used for gallery items, whose paths are strings relative to the source
/// tree rather than filesystem paths: `photos/dawn.jpg` → `photos/dawn.avif`.
pub fn transcoded_reference(reference: &str) -> String {
    path_to_reference(&transcoded_path(Path::new(reference)))
}

/// Thumbnail reference for an already transcoded reference.
pub fn thumbnail_reference(reference: &str) -> String {
    path_to_reference(&thumbnail_path(Path::new(reference)))
}

fn path_to_reference(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sorted(mut names: Vec<&str>) -> Vec<&str> {
        names.sort_by(|a, b| natural_cmp(a, b));
        names
    }

    #[test]
    fn numbers_sort_by_value() {
        assert_eq!(
            sorted(vec!["10.md", "2.md", "1.md"]),
            vec!["1.md", "2.md", "10.md"]
        );
    }

    #[test]
    fn embedded_numbers_sort_by_value() {
        assert_eq!(
            sorted(vec!["part-10-end.md", "part-9-end.md", "part-1-end.md"]),
            vec!["part-1-end.md", "part-9-end.md", "part-10-end.md"]
        );
    }

    #[test]
    fn text_without_numbers_is_lexical() {
        assert_eq!(sorted(vec!["b.md", "a.md", "c.md"]), vec!["a.md", "b.md", "c.md"]);
    }

    #[test]
    fn leading_zeros_compare_equal_value_then_length() {
        assert_eq!(natural_cmp("01", "1"), Ordering::Greater);
        assert_eq!(natural_cmp("002", "10"), Ordering::Less);
    }

    #[test]
    fn prefix_sorts_first() {
        assert_eq!(natural_cmp("a", "a1"), Ordering::Less);
        assert_eq!(natural_cmp("", "a"), Ordering::Less);
    }

    #[test]
    fn huge_numbers_do_not_overflow() {
        assert_eq!(
            natural_cmp("99999999999999999999999.md", "100000000000000000000000.md"),
            Ordering::Less
        );
    }

    #[test]
    fn natural_path_cmp_orders_directories_first_by_segment() {
        let mut paths = vec![
            PathBuf::from("10/a.md"),
            PathBuf::from("2/b.md"),
            PathBuf::from("2/a.md"),
        ];
        paths.sort_by(|a, b| natural_path_cmp(a, b));
        assert_eq!(
            paths,
            vec![
                PathBuf::from("2/a.md"),
                PathBuf::from("2/b.md"),
                PathBuf::from("10/a.md"),
            ]
        );
    }

    #[test]
    fn transcoded_path_swaps_extension() {
        assert_eq!(
            transcoded_path(Path::new("/dist/img/dawn.jpg")),
            PathBuf::from("/dist/img/dawn.avif")
        );
    }

    #[test]
    fn thumbnail_path_inserts_suffix() {
        assert_eq!(
            thumbnail_path(Path::new("/dist/img/dawn.avif")),
            PathBuf::from("/dist/img/dawn_thumb.avif")
        );
    }

    #[test]
    fn thumbnail_path_without_extension() {
        assert_eq!(
            thumbnail_path(Path::new("img/dawn")),
            PathBuf::from("img/dawn_thumb")
        );
    }

    #[test]
    fn references_keep_forward_slashes() {
        let main = transcoded_reference("photos/2024/dawn.png");
        assert_eq!(main, "photos/2024/dawn.avif");
        assert_eq!(thumbnail_reference(&main), "photos/2024/dawn_thumb.avif");
    }
}
