//! CLI output formatting for the build and check commands.
//!
//! # Information-First Display
//!
//! Every product is shown by its positional index and name; links, image
//! sources, and tags follow as indented context lines. The same header is
//! used by `check`, by per-image progress during `build`, and in the build
//! summary, so one product looks the same at every stage.
//!
//! # Output Format
//!
//! ## Check
//!
//! ```text
//! Best Widgets (2 products, 1 duplicate dropped)
//! 001 Widget A
//!     Link: https://x
//!     Image: https://img/a.png
//!     Best for: Travel, Kids
//! 002 Widget B
//!     Link: https://www.amazon.com/dp/B01
//!     Image: (placeholder)
//! ```
//!
//! ## Build
//!
//! ```text
//! 001 Widget A
//!     Image: downloaded → assets/img/B01-5d41402a.png
//! 002 Widget B
//!     Image: remote → https://img/b.png (unexpected status 403)
//!
//! Files
//!     index.html
//!     products.json
//! Images: 1 downloaded, 0 reused, 1 remote, 0 placeholder
//! Built 2 products, last updated 2026-10-19 06:00 UTC
//! ```
//!
//! # Architecture
//!
//! Each output has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout.

use crate::images::{ImageStatus, MaterializeEvent};
use crate::pipeline::{BuildReport, CheckReport};
use crate::types::Product;

// ============================================================================
// Shared entity display helpers
// ============================================================================

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// `001 Widget A`
fn product_header(position: usize, name: &str) -> String {
    format!("{} {}", format_index(position), name)
}

fn plural(n: usize, word: &str) -> String {
    if n == 1 {
        format!("{n} {word}")
    } else {
        format!("{n} {word}s")
    }
}

fn image_reference(product: &Product) -> &str {
    if product.image_url.is_empty() {
        "(placeholder)"
    } else {
        &product.image_url
    }
}

fn status_label(status: ImageStatus) -> &'static str {
    match status {
        ImageStatus::Downloaded => "downloaded",
        ImageStatus::Reused => "reused",
        ImageStatus::Remote => "remote",
        ImageStatus::Placeholder => "placeholder",
        ImageStatus::Passthrough => "local",
    }
}

// ============================================================================
// Check output
// ============================================================================

/// Format the product inventory of a validated config.
pub fn format_check_output(report: &CheckReport) -> Vec<String> {
    let mut lines = Vec::new();

    let mut header = format!("{} ({}", report.title, plural(report.products.len(), "product"));
    if report.duplicates > 0 {
        header.push_str(&format!(", {} dropped", plural(report.duplicates, "duplicate")));
    }
    header.push(')');
    lines.push(header);

    for (i, (product, link)) in report.products.iter().zip(&report.links).enumerate() {
        lines.push(product_header(i + 1, &product.name));
        lines.push(format!("    Link: {}", link));
        lines.push(format!("    Image: {}", image_reference(product)));
        if !product.best_for.is_empty() {
            lines.push(format!("    Best for: {}", product.best_for.join(", ")));
        }
    }

    lines
}

/// Print check output to stdout.
pub fn print_check_output(report: &CheckReport) {
    for line in format_check_output(report) {
        println!("{}", line);
    }
}

// ============================================================================
// Build output
// ============================================================================

/// Format a single image progress event as display lines.
pub fn format_materialize_event(event: &MaterializeEvent) -> Vec<String> {
    match event {
        MaterializeEvent::Resolved {
            position,
            name,
            status,
            src,
            error,
            ..
        } => {
            let mut detail = format!("    Image: {} \u{2192} {}", status_label(*status), src);
            if let Some(error) = error {
                detail.push_str(&format!(" ({})", error));
            }
            vec![product_header(*position, name), detail]
        }
    }
}

/// Format the summary printed after a successful build.
pub fn format_build_output(report: &BuildReport) -> Vec<String> {
    let mut lines = Vec::new();

    if !report.files.is_empty() {
        lines.push("Files".to_string());
        for file in &report.files {
            lines.push(format!("    {}", file));
        }
    }

    if !report.assets.is_empty() {
        lines.push("Assets".to_string());
        for asset in &report.assets {
            lines.push(format!("    {}", asset));
        }
    }

    match &report.image_stats {
        Some(stats) => lines.push(format!("Images: {}", stats)),
        None => lines.push("Images: linked remotely (caching off)".to_string()),
    }

    lines.push(format!(
        "Built {}, last updated {}",
        plural(report.products.len(), "product"),
        report.updated
    ));

    lines
}

/// Print the build summary to stdout.
pub fn print_build_output(report: &BuildReport) {
    for line in format_build_output(report) {
        println!("{}", line);
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::images::MaterializeStats;
    use crate::test_helpers::product;

    // =========================================================================
    // Helper tests
    // =========================================================================

    #[test]
    fn format_index_pads() {
        assert_eq!(format_index(1), "001");
        assert_eq!(format_index(42), "042");
        assert_eq!(format_index(1000), "1000");
    }

    #[test]
    fn plural_forms() {
        assert_eq!(plural(0, "product"), "0 products");
        assert_eq!(plural(1, "product"), "1 product");
        assert_eq!(plural(2, "duplicate"), "2 duplicates");
    }

    // =========================================================================
    // Check output tests
    // =========================================================================

    #[test]
    fn check_output_lists_products() {
        let mut a = product("Widget A", "https://x", "https://img/a.png");
        a.best_for = vec!["Travel".to_string(), "Kids".to_string()];
        let b = product("Widget B", "https://www.amazon.com/dp/B01", "");
        let report = CheckReport {
            title: "Best Widgets".to_string(),
            links: vec![a.amazon_url.clone(), b.amazon_url.clone()],
            products: vec![a, b],
            duplicates: 1,
        };

        let lines = format_check_output(&report);

        assert_eq!(
            lines,
            vec![
                "Best Widgets (2 products, 1 duplicate dropped)",
                "001 Widget A",
                "    Link: https://x",
                "    Image: https://img/a.png",
                "    Best for: Travel, Kids",
                "002 Widget B",
                "    Link: https://www.amazon.com/dp/B01",
                "    Image: (placeholder)",
            ]
        );
    }

    #[test]
    fn check_output_empty_catalog() {
        let report = CheckReport {
            title: "Empty".to_string(),
            products: vec![],
            links: vec![],
            duplicates: 0,
        };
        assert_eq!(format_check_output(&report), vec!["Empty (0 products)"]);
    }

    // =========================================================================
    // Build output tests
    // =========================================================================

    #[test]
    fn materialize_event_downloaded() {
        let event = MaterializeEvent::Resolved {
            position: 1,
            name: "Widget A".to_string(),
            reference: "https://img/a.png".to_string(),
            status: ImageStatus::Downloaded,
            src: "assets/img/B01-5d41402a.png".to_string(),
            error: None,
        };
        assert_eq!(
            format_materialize_event(&event),
            vec![
                "001 Widget A",
                "    Image: downloaded \u{2192} assets/img/B01-5d41402a.png"
            ]
        );
    }

    #[test]
    fn materialize_event_remote_shows_error() {
        let event = MaterializeEvent::Resolved {
            position: 12,
            name: "Widget B".to_string(),
            reference: "https://img/b.png".to_string(),
            status: ImageStatus::Remote,
            src: "https://img/b.png".to_string(),
            error: Some("unexpected status 403".to_string()),
        };
        let lines = format_materialize_event(&event);
        assert_eq!(lines[0], "012 Widget B");
        assert_eq!(
            lines[1],
            "    Image: remote \u{2192} https://img/b.png (unexpected status 403)"
        );
    }

    fn report(image_stats: Option<MaterializeStats>) -> BuildReport {
        BuildReport {
            title: "Best Widgets".to_string(),
            products: vec![product("Widget A", "https://x", "")],
            links: vec!["https://x/?tag=t-20".to_string()],
            images: vec![crate::types::ImageSource::Placeholder],
            image_stats,
            files: vec!["index.html".to_string(), "products.json".to_string()],
            assets: vec![],
            updated: "2026-10-19 06:00 UTC".to_string(),
        }
    }

    #[test]
    fn build_output_with_caching_off() {
        let lines = format_build_output(&report(None));
        assert_eq!(
            lines,
            vec![
                "Files",
                "    index.html",
                "    products.json",
                "Images: linked remotely (caching off)",
                "Built 1 product, last updated 2026-10-19 06:00 UTC",
            ]
        );
    }

    #[test]
    fn build_output_with_stats_and_assets() {
        let mut report = report(Some(MaterializeStats {
            downloaded: 1,
            ..Default::default()
        }));
        report.assets = vec!["favicon.ico".to_string()];

        let lines = format_build_output(&report);

        assert!(lines.contains(&"Assets".to_string()));
        assert!(lines.contains(&"    favicon.ico".to_string()));
        assert!(lines.contains(&"Images: 1 downloaded, 0 reused, 0 remote, 0 placeholder".to_string()));
    }
}
