//! CLI output formatting for every command.
//!
//! # Output Format
//!
//! ## Optimize
//!
//! ```text
//! Optimized 2 of 3 files → out/
//! 001 beach.webp (310.4 KB)
//! 002 photo.webp (12.0 KB)
//! Failed
//! 001 notes.png
//!     decode: Failed to decode notes.png: ...
//! ```
//!
//! ## Favicon
//!
//! ```text
//! favicon.ico (4.1 KB) → out/favicon.ico
//! ```
//!
//! ## PWA
//!
//! ```text
//! Icons
//! 001 icon-72x72.png (2.3 KB)
//! Splash screens
//! 001 splash-640x1136.png (18.9 KB)
//! Archive
//!     pwa-assets.zip (123.0 KB) → out/pwa-assets.zip
//! ```
//!
//! # Architecture
//!
//! Each command has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format
//! functions are pure: no I/O, no side effects.

use crate::batch::BatchReport;
use crate::preview::PreviewKind;
use crate::pwa::PwaBundle;
use crate::types::ImageBlob;
use std::path::Path;

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

/// Human-readable byte count.
fn format_size(bytes: usize) -> String {
    const KB: f64 = 1024.0;
    const MB: f64 = KB * 1024.0;
    let b = bytes as f64;
    if b >= MB {
        format!("{:.1} MB", b / MB)
    } else if b >= KB {
        format!("{:.1} KB", b / KB)
    } else {
        format!("{bytes} B")
    }
}

fn blob_line(index: usize, blob: &ImageBlob) -> String {
    format!(
        "{} {} ({})",
        format_index(index),
        blob.name(),
        format_size(blob.len())
    )
}

// ============================================================================
// Optimize
// ============================================================================

pub fn format_batch_output(report: &BatchReport, out_dir: &Path) -> Vec<String> {
    let mut lines = vec![format!(
        "Optimized {} of {} files → {}",
        report.outputs.len(),
        report.total(),
        out_dir.display()
    )];
    for (i, blob) in report.outputs.iter().enumerate() {
        lines.push(blob_line(i + 1, blob));
    }
    if !report.failures.is_empty() {
        lines.push("Failed".to_string());
        for (i, failure) in report.failures.iter().enumerate() {
            lines.push(format!("{} {}", format_index(i + 1), failure.name));
            lines.push(format!("{}{}: {}", indent(1), failure.kind, failure.message));
        }
    }
    lines
}

pub fn print_batch_output(report: &BatchReport, out_dir: &Path) {
    for line in format_batch_output(report, out_dir) {
        println!("{}", line);
    }
}

// ============================================================================
// Favicon
// ============================================================================

pub fn format_favicon_output(blob: &ImageBlob, out_dir: &Path) -> Vec<String> {
    vec![format!(
        "{} ({}) → {}",
        blob.name(),
        format_size(blob.len()),
        out_dir.join(blob.name()).display()
    )]
}

pub fn print_favicon_output(blob: &ImageBlob, out_dir: &Path) {
    for line in format_favicon_output(blob, out_dir) {
        println!("{}", line);
    }
}

// ============================================================================
// PWA
// ============================================================================

pub fn format_pwa_output(bundle: &PwaBundle, out_dir: &Path) -> Vec<String> {
    let mut lines = Vec::new();
    for (title, kind) in [
        ("Icons", PreviewKind::Icon),
        ("Splash screens", PreviewKind::Splash),
    ] {
        let blobs: Vec<&ImageBlob> = bundle
            .previews
            .iter()
            .filter(|p| p.kind == kind)
            .map(|p| &p.blob)
            .collect();
        if blobs.is_empty() {
            continue;
        }
        lines.push(title.to_string());
        for (i, blob) in blobs.into_iter().enumerate() {
            lines.push(blob_line(i + 1, blob));
        }
    }
    lines.push("Archive".to_string());
    lines.push(format!(
        "{}{} ({}) → {}",
        indent(1),
        bundle.archive.name(),
        format_size(bundle.archive.len()),
        out_dir.join(bundle.archive.name()).display()
    ));
    lines
}

pub fn print_pwa_output(bundle: &PwaBundle, out_dir: &Path) {
    for line in format_pwa_output(bundle, out_dir) {
        println!("{}", line);
    }
}
