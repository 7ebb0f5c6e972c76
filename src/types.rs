//! Shared types used across pipeline stages.
//!
//! [`Product`] is produced by the catalog stage, consumed by the image
//! materializer and the renderer, and serialized verbatim into
//! `products.json`, so its field names are part of the published output.

use serde::{Deserialize, Serialize};

/// A display-ready product, normalized from a raw `site_config.json` entry.
///
/// Every string is trimmed. `name` is never empty and `amazon_url` is either
/// the configured link or one derived from the ASIN; it may still be empty
/// when the entry had neither, which the link-tagging step rejects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    /// Amazon product identifier. Used for link derivation, dedup, and local image names.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub asin: Option<String>,
    pub name: String,
    pub description: String,
    /// Image reference as configured: a remote URL, a local path, or empty.
    pub image_url: String,
    pub amazon_url: String,
    /// At most two short "best for" labels, rendered as tag pills.
    pub best_for: Vec<String>,
}

/// Where a product card's `<img src>` points after materialization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageSource {
    /// Copy stored under the output root (path relative to it, `/`-separated).
    Local(String),
    /// The configured reference, used unchanged.
    Remote(String),
    /// No image configured; the bundled placeholder is shown.
    Placeholder,
}

impl ImageSource {
    /// The value to put in `src=`.
    pub fn src(&self) -> &str {
        match self {
            ImageSource::Local(path) | ImageSource::Remote(path) => path,
            ImageSource::Placeholder => crate::generate::PLACEHOLDER_PATH,
        }
    }

    /// Resolve an image reference without fetching anything.
    pub fn passthrough(image_url: &str) -> Self {
        if image_url.is_empty() {
            ImageSource::Placeholder
        } else {
            ImageSource::Remote(image_url.to_string())
        }
    }
}
