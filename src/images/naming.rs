//! Pure naming functions for mirrored images.
//!
//! A local copy is stored as `{key}{ext}`:
//!
//! - **key**: `{asin}-{h8}` for products with an ASIN, where `h8` is the first
//!   8 hex digits of the SHA-256 of the image URL; products without one use
//!   the first 16 hex digits. A new image URL for the same product gets a new
//!   key, so an earlier copy is only ever reused for the URL it came from.
//!   ASINs are validated at config load (`[A-Za-z0-9_-]` only), so the key is
//!   always a safe file name.
//! - **ext**: first match wins, in order: `Content-Type` header, URL path
//!   suffix, payload magic bytes, then `.img`.

use crate::types::Product;
use image::ImageFormat;
use sha2::{Digest, Sha256};

/// Local file key for a product's image.
pub(crate) fn image_key(product: &Product) -> String {
    let digest = format!("{:x}", Sha256::digest(product.image_url.as_bytes()));
    match &product.asin {
        Some(asin) => format!("{asin}-{}", &digest[..8]),
        None => digest[..16].to_string(),
    }
}

pub(crate) fn extension_from_content_type(content_type: &str) -> Option<&'static str> {
    let mime = content_type.split(';').next()?.trim().to_ascii_lowercase();
    match mime.as_str() {
        "image/png" => Some(".png"),
        "image/jpeg" | "image/jpg" => Some(".jpg"),
        "image/webp" => Some(".webp"),
        "image/avif" => Some(".avif"),
        "image/gif" => Some(".gif"),
        _ => None,
    }
}

/// Extension from the URL path, ignoring query string and fragment.
pub(crate) fn extension_from_url(url: &str) -> Option<&'static str> {
    let lower = url.to_ascii_lowercase();
    let path = lower.split(['?', '#']).next().unwrap_or_default();
    [
        (".png", ".png"),
        (".jpg", ".jpg"),
        (".jpeg", ".jpg"),
        (".webp", ".webp"),
        (".avif", ".avif"),
        (".gif", ".gif"),
    ]
    .into_iter()
    .find(|(suffix, _)| path.ends_with(suffix))
    .map(|(_, ext)| ext)
}

/// Extension from the payload's magic bytes.
pub(crate) fn extension_from_bytes(bytes: &[u8]) -> Option<&'static str> {
    match image::guess_format(bytes).ok()? {
        ImageFormat::Png => Some(".png"),
        ImageFormat::Jpeg => Some(".jpg"),
        ImageFormat::WebP => Some(".webp"),
        ImageFormat::Avif => Some(".avif"),
        ImageFormat::Gif => Some(".gif"),
        ImageFormat::Bmp => Some(".bmp"),
        ImageFormat::Tiff => Some(".tiff"),
        ImageFormat::Ico => Some(".ico"),
        _ => None,
    }
}

pub(crate) fn choose_extension(
    url: &str,
    content_type: Option<&str>,
    bytes: &[u8],
) -> &'static str {
    content_type
        .and_then(extension_from_content_type)
        .or_else(|| extension_from_url(url))
        .or_else(|| extension_from_bytes(bytes))
        .unwrap_or(".img")
}

/// Reject payloads that are clearly documents (error pages, captchas).
///
/// A `text/*` response is only accepted if its bytes still sniff as an image.
pub(crate) fn looks_like_image(content_type: Option<&str>, bytes: &[u8]) -> bool {
    let is_text = content_type
        .map(|ct| ct.trim().to_ascii_lowercase().starts_with("text/"))
        .unwrap_or(false);
    !is_text || extension_from_bytes(bytes).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::product;

    const PNG_MAGIC: &[u8] = b"\x89PNG\r\n\x1a\n\0\0\0\rIHDR";
    const JPEG_MAGIC: &[u8] = b"\xff\xd8\xff\xe0\0\x10JFIF\0";

    #[test]
    fn key_is_asin_plus_url_hash() {
        let mut p = product("A", "https://x", "https://img/a.png");
        p.asin = Some("B0TEST".to_string());
        let key = image_key(&p);
        assert!(key.starts_with("B0TEST-"));
        assert_eq!(key.len(), "B0TEST-".len() + 8);
    }

    #[test]
    fn key_changes_with_image_url() {
        let mut old = product("A", "https://x", "https://img/old.png");
        old.asin = Some("B01".to_string());
        let mut new = old.clone();
        new.image_url = "https://img/new.png".to_string();
        assert_ne!(image_key(&old), image_key(&new));
    }

    #[test]
    fn key_distinguishes_similar_asins() {
        let mut a = product("A", "https://x", "https://img/a.png");
        a.asin = Some("B0-1".to_string());
        let mut b = a.clone();
        b.asin = Some("B0_1".to_string());
        assert_ne!(image_key(&a), image_key(&b));
    }

    #[test]
    fn key_hashes_url_without_asin() {
        let a = product("A", "https://x", "https://img/a.png");
        let b = product("B", "https://y", "https://img/a.png");
        let c = product("C", "https://x", "https://img/c.png");
        assert_eq!(image_key(&a).len(), 16);
        assert_eq!(image_key(&a), image_key(&b));
        assert_ne!(image_key(&a), image_key(&c));
    }

    #[test]
    fn content_type_mapping() {
        assert_eq!(extension_from_content_type("image/png"), Some(".png"));
        assert_eq!(
            extension_from_content_type("image/jpeg; charset=binary"),
            Some(".jpg")
        );
        assert_eq!(extension_from_content_type("IMAGE/JPG"), Some(".jpg"));
        assert_eq!(extension_from_content_type("image/webp"), Some(".webp"));
        assert_eq!(extension_from_content_type("image/avif"), Some(".avif"));
        assert_eq!(extension_from_content_type("image/gif"), Some(".gif"));
        assert_eq!(extension_from_content_type("application/octet-stream"), None);
    }

    #[test]
    fn url_suffix_mapping() {
        assert_eq!(
            extension_from_url("https://m.media-amazon.com/images/I/71x._AC_SL1500_.jpg"),
            Some(".jpg")
        );
        assert_eq!(extension_from_url("https://img/a.JPEG?w=300"), Some(".jpg"));
        assert_eq!(extension_from_url("https://img/a.webp#x"), Some(".webp"));
        assert_eq!(extension_from_url("https://img/a.png.html"), None);
        assert_eq!(extension_from_url("https://img/image"), None);
    }

    #[test]
    fn bytes_mapping() {
        assert_eq!(extension_from_bytes(PNG_MAGIC), Some(".png"));
        assert_eq!(extension_from_bytes(JPEG_MAGIC), Some(".jpg"));
        assert_eq!(extension_from_bytes(b"<html>"), None);
    }

    #[test]
    fn choose_extension_precedence() {
        // Header beats URL
        assert_eq!(
            choose_extension("https://img/a.jpg", Some("image/webp"), JPEG_MAGIC),
            ".webp"
        );
        // URL beats bytes
        assert_eq!(choose_extension("https://img/a.gif", None, PNG_MAGIC), ".gif");
        // Bytes when nothing else is known
        assert_eq!(
            choose_extension("https://img/a", Some("application/octet-stream"), PNG_MAGIC),
            ".png"
        );
        // Fallback
        assert_eq!(choose_extension("https://img/a", None, b"????"), ".img");
    }

    #[test]
    fn text_payloads_are_not_images() {
        assert!(!looks_like_image(Some("text/html; charset=utf-8"), b"<html>"));
        assert!(looks_like_image(Some("text/plain"), PNG_MAGIC));
        assert!(looks_like_image(Some("image/png"), b"whatever"));
        assert!(looks_like_image(None, b"whatever"));
    }
}
