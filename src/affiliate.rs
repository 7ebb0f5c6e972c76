//! Affiliate tagging for outbound product links.
//!
//! Every "Check price" link carries the partner tag as a `tag` query
//! parameter. Existing parameters are kept in their original order and the
//! fragment is untouched:
//!
//! - `https://www.amazon.com/dp/B01` → `https://www.amazon.com/dp/B01?tag=me-20`
//! - `https://www.amazon.com/dp/B01?th=1` → `...?th=1&tag=me-20`
//! - `https://www.amazon.com/dp/B01?tag=old&th=1` → `...?tag=me-20&th=1`

use url::Url;

/// Base used to derive a product link from its ASIN.
const AMAZON_PRODUCT_BASE: &str = "https://www.amazon.com/dp/";

/// Canonical product page for an ASIN.
pub fn amazon_url_for(asin: &str) -> String {
    format!("{AMAZON_PRODUCT_BASE}{asin}")
}

/// Set `tag=<partner_tag>` on `url`, replacing an existing `tag` in place.
///
/// Duplicate `tag` parameters collapse into one at the position of the first.
pub fn with_affiliate_tag(url: &str, partner_tag: &str) -> Result<String, url::ParseError> {
    let mut parsed = Url::parse(url)?;

    let mut pairs: Vec<(String, String)> = Vec::new();
    let mut tagged = false;
    for (key, value) in parsed.query_pairs() {
        if key == "tag" {
            if !tagged {
                pairs.push(("tag".to_string(), partner_tag.to_string()));
                tagged = true;
            }
        } else {
            pairs.push((key.into_owned(), value.into_owned()));
        }
    }
    if !tagged {
        pairs.push(("tag".to_string(), partner_tag.to_string()));
    }

    parsed.query_pairs_mut().clear().extend_pairs(&pairs);
    Ok(parsed.to_string())
}
