//! Product catalog normalization.
//!
//! Raw entries from `site_config.json` are loose: names may be blank, links
//! may be missing when an ASIN is given, `best_for` may be a string or a list.
//! This stage turns them into [`Product`]s the renderer can project directly:
//!
//! | Field | Rule |
//! |-------|------|
//! | `asin` | trimmed; blank → none; a repeated ASIN drops the later entry |
//! | `name` | trimmed; blank → `"Product"` |
//! | `amazon_url` | trimmed; blank → `https://www.amazon.com/dp/{asin}` when an ASIN exists |
//! | `best_for` | trimmed labels, blanks removed, first two kept |
//!
//! Order is preserved: it is the display order of the page.

use crate::affiliate::{amazon_url_for, with_affiliate_tag};
use crate::config::RawProduct;
use crate::generate::RenderError;
use crate::types::Product;
use std::collections::HashSet;

/// Fallback display name for entries without one.
const DEFAULT_NAME: &str = "Product";

/// Maximum number of "best for" pills on a card.
const MAX_BEST_FOR: usize = 2;

fn trimmed(value: &Option<String>) -> String {
    value.as_deref().map(str::trim).unwrap_or_default().to_string()
}

/// Normalize raw config entries into display-ready products.
pub fn normalize_products(items: &[RawProduct]) -> Vec<Product> {
    let mut out = Vec::with_capacity(items.len());
    let mut seen = HashSet::new();

    for item in items {
        let asin = Some(trimmed(&item.amazon_asin)).filter(|a| !a.is_empty());
        if let Some(asin) = &asin
            && !seen.insert(asin.clone())
        {
            tracing::debug!(%asin, "dropping duplicate product entry");
            continue;
        }

        let name = Some(trimmed(&item.product_name))
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| DEFAULT_NAME.to_string());

        let mut amazon_url = trimmed(&item.amazon_url);
        if amazon_url.is_empty()
            && let Some(asin) = &asin
        {
            amazon_url = amazon_url_for(asin);
        }

        let mut best_for = item
            .best_for
            .as_ref()
            .map(|b| b.labels())
            .unwrap_or_default();
        best_for.truncate(MAX_BEST_FOR);

        out.push(Product {
            asin,
            name,
            description: trimmed(&item.description),
            image_url: trimmed(&item.image_url),
            amazon_url,
            best_for,
        });
    }
    out
}

/// Compute the tagged outbound link of every product, in order.
///
/// Fails on the first product that has no link or whose link is not an
/// absolute URL; such a product cannot be rendered as a card.
pub fn tag_links(products: &[Product], partner_tag: &str) -> Result<Vec<String>, RenderError> {
    products
        .iter()
        .enumerate()
        .map(|(index, product)| {
            if product.amazon_url.is_empty() {
                return Err(RenderError::MissingLink {
                    position: index + 1,
                    name: product.name.clone(),
                });
            }
            with_affiliate_tag(&product.amazon_url, partner_tag).map_err(|source| {
                RenderError::InvalidLink {
                    name: product.name.clone(),
                    url: product.amazon_url.clone(),
                    source,
                }
            })
        })
        .collect()
}
