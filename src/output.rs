//! CLI output formatting for a finished build.
//!
//! Output is information-centric: the page list leads with each page's
//! position and link, the written file follows as secondary context.
//!
//! ```text
//! Pages
//! 001 index.html
//!     Output: dist/index.html
//! 002 about.html
//!     Output: dist/about.html
//!
//! Built 2 pages, 14 copied files, 6 images, 3 templates → dist
//! ```
//!
//! [`format_build_report`] returns lines and performs no I/O;
//! [`print_build_report`] writes them to stdout.

use crate::pipeline::BuildReport;
use std::path::Path;

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

fn plural(count: usize, one: &str, many: &str) -> String {
    if count == 1 {
        format!("{count} {one}")
    } else {
        format!("{count} {many}")
    }
}

/// Show `path` relative to `base` when possible.
fn display_relative(path: &Path, base: &Path) -> String {
    let shown = base
        .parent()
        .and_then(|parent| path.strip_prefix(parent).ok())
        .unwrap_or(path);
    shown.display().to_string()
}

pub fn format_build_report(report: &BuildReport) -> Vec<String> {
    let mut lines = Vec::new();

    if !report.pages.is_empty() {
        lines.push("Pages".to_string());
        for (i, page) in report.pages.iter().enumerate() {
            let link = page
                .strip_prefix(&report.dist_dir)
                .unwrap_or(page)
                .display()
                .to_string();
            lines.push(format!("{} {}", format_index(i + 1), link));
            lines.push(format!(
                "    Output: {}",
                display_relative(page, &report.dist_dir)
            ));
        }
        lines.push(String::new());
    }

    lines.push(format!(
        "Built {}, {}, {}, {} \u{2192} {}",
        plural(report.pages.len(), "page", "pages"),
        plural(report.copied, "copied file", "copied files"),
        plural(report.images, "image", "images"),
        plural(report.templates, "template", "templates"),
        report.dist_dir.display()
    ));
    lines
}

pub fn print_build_report(report: &BuildReport) {
    for line in format_build_report(report) {
        println!("{}", line);
    }
}
