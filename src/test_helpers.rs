//! Shared test utilities for the shortlist test suite.
//!
//! Builders for raw and normalized products, plus helpers that put a
//! `site_config.json` on disk for pipeline tests.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let products = normalize_products(&[raw("A", "https://x/a"), raw("B", "https://x/b")]);
//! assert_eq!(product_names(&products), vec!["A", "B"]);
//!
//! let tmp = TempDir::new().unwrap();
//! write_config(tmp.path(), &widget_config());
//! ```

use std::path::{Path, PathBuf};

use crate::config::{CONFIG_FILE, RawProduct};
use crate::types::Product;

// =========================================================================
// Product builders
// =========================================================================

/// Raw config entry with a name and a link, everything else unset.
pub fn raw(name: &str, link: &str) -> RawProduct {
    RawProduct {
        product_name: Some(name.to_string()),
        amazon_url: Some(link.to_string()),
        ..Default::default()
    }
}

/// Normalized product without an ASIN, description, or tags.
pub fn product(name: &str, link: &str, image: &str) -> Product {
    Product {
        asin: None,
        name: name.to_string(),
        description: String::new(),
        image_url: image.to_string(),
        amazon_url: link.to_string(),
        best_for: Vec::new(),
    }
}

/// All product names in order.
pub fn product_names(products: &[Product]) -> Vec<&str> {
    products.iter().map(|p| p.name.as_str()).collect()
}

// =========================================================================
// Config fixtures
// =========================================================================

/// The one-product "Best Widgets" config.
pub fn widget_config() -> String {
    r#"{"title":"Best Widgets","products":[{"name":"Widget A","link":"https://x","image":"https://img/a.png"}]}"#
        .to_string()
}

/// Write `content` as `site_config.json` in `dir` and return its path.
pub fn write_config(dir: &Path, content: &str) -> PathBuf {
    let path = dir.join(CONFIG_FILE);
    std::fs::write(&path, content).unwrap();
    path
}
