//! CLI output formatting for the build.
//!
//! # Information-First Display
//!
//! Every article is shown by its title first, with the slug and image work
//! as indented context lines. Paths are the public URLs the HTML now
//! references, so a line can be pasted straight into a browser.
//!
//! # Output Format
//!
//! ## Build events
//!
//! ```text
//! The Art of War
//!     Slug: the-art-of-war
//!     photos/beach.png → /article/the-art-of-war/photos/beach-3f2a….jpg (encoded)
//!     thumbnail → /article/the-art-of-war/photos/beach-3f2a….thumb.jpg (cached)
//! FAILED broken-post
//!     missing title
//! ```
//!
//! ## Summary
//!
//! ```text
//! Built 12 articles, 1 failed
//! Images: 3 cached, 1 encoded (4 total)
//! Failures
//!     broken-post: missing title
//! ```
//!
//! # Architecture
//!
//! Each output has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format
//! functions are pure: no I/O, no side effects.

use crate::article::{BuildEvent, BuildReport};
use crate::export::{ExportStatus, ExportedImage};
use crate::types::ArticleRecord;

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

fn status_label(status: ExportStatus) -> &'static str {
    match status {
        ExportStatus::Cached => "cached",
        ExportStatus::Encoded => "encoded",
    }
}

/// `src → path (status)`
fn image_line(label: &str, image: &ExportedImage) -> String {
    format!(
        "{}{} \u{2192} {} ({})",
        indent(1),
        label,
        image.path,
        status_label(image.status)
    )
}

fn plural(n: usize, word: &str) -> String {
    if n == 1 {
        format!("{} {}", n, word)
    } else {
        format!("{} {}s", n, word)
    }
}

// ============================================================================
// Build events
// ============================================================================

/// Format one progress event from a parallel build.
pub fn format_build_event(event: &BuildEvent) -> Vec<String> {
    match event {
        BuildEvent::ArticleBuilt {
            slug,
            title,
            images,
            thumbnail,
        } => {
            let mut lines = vec![title.clone(), format!("{}Slug: {}", indent(1), slug)];
            lines.extend(images.iter().map(|img| image_line(&img.source, img)));
            lines.push(image_line("thumbnail", thumbnail));
            lines
        }
        BuildEvent::ArticleFailed { slug, error } => {
            vec![format!("FAILED {}", slug), format!("{}{}", indent(1), error)]
        }
    }
}

pub fn print_build_event(event: &BuildEvent) {
    for line in format_build_event(event) {
        println!("{}", line);
    }
}

// ============================================================================
// Summary
// ============================================================================

/// Format the end-of-build summary.
pub fn format_report(report: &BuildReport) -> Vec<String> {
    let mut lines = vec![format!(
        "Built {}, {} failed",
        plural(report.articles.len(), "article"),
        report.failures.len()
    )];
    lines.push(format!("Images: {}", report.cache_stats));
    if !report.failures.is_empty() {
        lines.push("Failures".to_string());
        for failure in &report.failures {
            lines.push(format!("{}{}: {}", indent(1), failure.slug, failure.error));
        }
    }
    lines
}

pub fn print_report(report: &BuildReport) {
    for line in format_report(report) {
        println!("{}", line);
    }
}

// ============================================================================
// Single article
// ============================================================================

/// Format the key fields of one built record.
pub fn format_article(record: &ArticleRecord) -> Vec<String> {
    vec![
        record.title.clone(),
        format!("{}URL: {}", indent(1), record.absolute_url),
        format!("{}Description: {}", indent(1), record.description),
        format!("{}Reading time: {}", indent(1), record.reading_time),
        format!("{}Cover: {}", indent(1), record.cover_image_url),
        format!("{}Thumbnail: {}", indent(1), record.thumbnail),
    ]
}

pub fn print_article(record: &ArticleRecord) {
    for line in format_article(record) {
        println!("{}", line);
    }
}
