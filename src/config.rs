//! Site configuration module.
//!
//! Handles loading and validating `site_config.json`, the single document
//! that drives the whole site, and resolving the build environment
//! (`AMZ_PARTNER_TAG`, `CACHE_IMAGES`) into [`BuildSettings`].
//!
//! ## Config File
//!
//! ```json
//! {
//!   "title": "Best Widgets",
//!   "description": "A short list of widgets worth buying.",
//!   "intro_paragraphs": ["Picked after a month of testing."],
//!   "meta_note": "Prices change often; check the listing.",
//!   "products": [
//!     {
//!       "amazon_asin": "B000000001",
//!       "product_name": "Widget A",
//!       "description": "The sturdy one.",
//!       "image_url": "https://m.media-amazon.com/images/I/a.jpg",
//!       "best_for": ["Beginners", "Travel"]
//!     }
//!   ],
//!   "theme": { "columns": 3 },
//!   "pages": { "disclosure": "...markdown...", "privacy": "...markdown..." }
//! }
//! ```
//!
//! `title` and `products` are required; everything else has a default.
//! Product entries also accept the short names `name`, `link`, and `image`
//! for `product_name`, `amazon_url`, and `image_url`.
//!
//! Unknown top-level and theme keys are rejected to catch typos early.
//! Unknown product keys are ignored so entries pasted from other tools load.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Site configuration loaded from `site_config.json`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SiteConfig {
    /// Page title, used for `<title>` and the main heading.
    pub title: String,
    /// Meta description for search engines.
    #[serde(default)]
    pub description: String,
    /// Introductory prose, one entry per paragraph.
    #[serde(default)]
    pub intro_paragraphs: Vec<String>,
    /// Muted note shown under the intro (e.g. a price disclaimer).
    #[serde(default)]
    pub meta_note: String,
    /// Product entries in display order.
    pub products: Vec<RawProduct>,
    /// Layout and color settings.
    #[serde(default)]
    pub theme: ThemeConfig,
    /// Markdown bodies for the auxiliary pages.
    #[serde(default)]
    pub pages: PagesConfig,
}

impl SiteConfig {
    /// Validate values that parse but cannot produce a usable page.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.title.trim().is_empty() {
            return Err(ConfigError::Validation("title must not be empty".into()));
        }
        if !(1..=6).contains(&self.theme.columns) {
            return Err(ConfigError::Validation(
                "theme.columns must be 1-6".into(),
            ));
        }
        let colors = &self.theme.colors;
        for (mode, scheme) in [("light", &colors.light), ("dark", &colors.dark)] {
            for (key, value) in scheme.entries() {
                if value.contains(['<', '>', '{', '}', ';']) {
                    return Err(ConfigError::Validation(format!(
                        "theme.colors.{mode}.{key} is not a CSS color: {value:?}"
                    )));
                }
            }
        }
        for (i, product) in self.products.iter().enumerate() {
            let asin = product.amazon_asin.as_deref().unwrap_or("").trim();
            if !asin
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
            {
                return Err(ConfigError::Validation(format!(
                    "products[{i}].amazon_asin may only contain letters, digits, '_' and '-': {asin:?}"
                )));
            }
        }
        Ok(())
    }
}

/// A product entry exactly as written in the config file.
///
/// All fields are optional here; [`crate::catalog::normalize_products`]
/// applies defaults and derives missing links.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RawProduct {
    pub amazon_asin: Option<String>,
    #[serde(alias = "name")]
    pub product_name: Option<String>,
    pub description: Option<String>,
    #[serde(alias = "image")]
    pub image_url: Option<String>,
    #[serde(alias = "link")]
    pub amazon_url: Option<String>,
    pub best_for: Option<BestFor>,
}

/// `best_for` may be a single label or a list of labels.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BestFor {
    One(String),
    Many(Vec<serde_json::Value>),
    /// Any other JSON shape; treated as no labels.
    Other(serde_json::Value),
}

impl BestFor {
    /// Flatten into trimmed, non-empty labels in their original order.
    pub fn labels(&self) -> Vec<String> {
        let raw: Vec<String> = match self {
            BestFor::One(s) => vec![s.clone()],
            BestFor::Many(values) => values
                .iter()
                .filter_map(|v| match v {
                    serde_json::Value::Null => None,
                    serde_json::Value::String(s) => Some(s.clone()),
                    other => Some(other.to_string()),
                })
                .collect(),
            BestFor::Other(_) => Vec::new(),
        };
        raw.into_iter()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect()
    }
}

/// Layout and color settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ThemeConfig {
    /// Product grid columns on wide screens (narrow screens step down to 2 and 1).
    pub columns: u8,
    /// Color schemes for light and dark modes.
    pub colors: ColorConfig,
}

impl Default for ThemeConfig {
    fn default() -> Self {
        Self {
            columns: 3,
            colors: ColorConfig::default(),
        }
    }
}

/// Color configuration for light and dark modes.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ColorConfig {
    pub light: ColorScheme,
    pub dark: ColorScheme,
}

impl Default for ColorConfig {
    fn default() -> Self {
        Self {
            light: ColorScheme::default_light(),
            dark: ColorScheme::default_dark(),
        }
    }
}

/// Individual color scheme (light or dark).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ColorScheme {
    /// Page background.
    pub background: String,
    /// Product card background.
    pub surface: String,
    pub text: String,
    /// Secondary text: meta note, timestamp, tag pills.
    pub text_muted: String,
    pub border: String,
    pub link: String,
}

impl ColorScheme {
    pub fn default_light() -> Self {
        Self {
            background: "#fafafa".to_string(),
            surface: "#ffffff".to_string(),
            text: "#111111".to_string(),
            text_muted: "#444444".to_string(),
            border: "#e5e7eb".to_string(),
            link: "#0b57d0".to_string(),
        }
    }

    pub fn default_dark() -> Self {
        Self {
            background: "#0f1115".to_string(),
            surface: "#1a1d23".to_string(),
            text: "#eeeeee".to_string(),
            text_muted: "#a0a4ab".to_string(),
            border: "#2e323a".to_string(),
            link: "#8ab4f8".to_string(),
        }
    }
}

impl ColorScheme {
    fn entries(&self) -> [(&'static str, &str); 6] {
        [
            ("background", self.background.as_str()),
            ("surface", self.surface.as_str()),
            ("text", self.text.as_str()),
            ("text_muted", self.text_muted.as_str()),
            ("border", self.border.as_str()),
            ("link", self.link.as_str()),
        ]
    }
}

impl Default for ColorScheme {
    fn default() -> Self {
        Self::default_light()
    }
}

/// Markdown bodies for `disclosure.html` and `privacy.html`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PagesConfig {
    pub disclosure: String,
    pub privacy: String,
}

impl Default for PagesConfig {
    fn default() -> Self {
        Self {
            disclosure: STOCK_DISCLOSURE.to_string(),
            privacy: STOCK_PRIVACY.to_string(),
        }
    }
}

const STOCK_DISCLOSURE: &str = "\
# Affiliate disclosure

As an Amazon Associate, I earn from qualifying purchases.

Links on this site to Amazon carry an affiliate tag. Buying through them
costs you nothing extra and supports the upkeep of this list.
";

const STOCK_PRIVACY: &str = "\
# Privacy

This site does not use cookies, analytics, or any form of tracking.

Product links lead to Amazon, whose own privacy policy applies once you
follow them.
";

// =============================================================================
// Config loading and validation
// =============================================================================

/// Default config file name, relative to the working directory.
pub const CONFIG_FILE: &str = "site_config.json";

/// Parse and validate a config document held in memory.
pub fn parse_config(content: &str) -> Result<SiteConfig, ConfigError> {
    let config: SiteConfig = serde_json::from_str(content)?;
    config.validate()?;
    Ok(config)
}

/// Load and validate `site_config.json` (or any JSON file with the same shape).
///
/// A missing file is an error, not an empty site.
pub fn load_config(path: &Path) -> Result<SiteConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    parse_config(&content)
}

/// Returns a starter `site_config.json` showing every supported key.
///
/// Used by the `gen-config` CLI command.
pub fn stock_site_config() -> &'static str {
    r##"{
  "title": "Product shortlist",
  "description": "A simple shortlist of products.",
  "intro_paragraphs": [
    "A short, opinionated list. Every pick below was chosen for a reason.",
    "Cards are shown in the order they appear in site_config.json."
  ],
  "meta_note": "Prices and availability change often; check the listing before buying.",
  "products": [
    {
      "amazon_asin": "B000000001",
      "product_name": "Example product",
      "description": "One or two sentences on why it made the list.",
      "image_url": "https://m.media-amazon.com/images/I/example.jpg",
      "amazon_url": "https://www.amazon.com/dp/B000000001",
      "best_for": ["Beginners", "Small spaces"]
    }
  ],
  "theme": {
    "columns": 3,
    "colors": {
      "light": {
        "background": "#fafafa",
        "surface": "#ffffff",
        "text": "#111111",
        "text_muted": "#444444",
        "border": "#e5e7eb",
        "link": "#0b57d0"
      },
      "dark": {
        "background": "#0f1115",
        "surface": "#1a1d23",
        "text": "#eeeeee",
        "text_muted": "#a0a4ab",
        "border": "#2e323a",
        "link": "#8ab4f8"
      }
    }
  }
}
"##
}

// =============================================================================
// Build environment
// =============================================================================

/// Settings that come from the environment rather than the config file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildSettings {
    /// Affiliate tag written into every product link.
    pub partner_tag: String,
    /// Download remote product images into the output directory.
    pub cache_images: bool,
}

impl BuildSettings {
    /// Build settings, rejecting a blank partner tag.
    pub fn new(partner_tag: &str, cache_images: bool) -> Result<Self, ConfigError> {
        let partner_tag = partner_tag.trim();
        if partner_tag.is_empty() {
            return Err(ConfigError::Validation(
                "missing AMZ_PARTNER_TAG (set it as a repository secret)".into(),
            ));
        }
        Ok(Self {
            partner_tag: partner_tag.to_string(),
            cache_images,
        })
    }
}

/// Interpret a boolean environment flag such as `CACHE_IMAGES`.
///
/// `1`, `true`, `TRUE`, `yes`, `YES` are on; everything else is off.
pub fn parse_flag(value: &str) -> bool {
    matches!(value.trim(), "1" | "true" | "TRUE" | "yes" | "YES")
}

// =============================================================================
// CSS generation
// =============================================================================

/// Generate CSS custom properties from theme config.
pub fn generate_theme_css(theme: &ThemeConfig) -> String {
    let light = &theme.colors.light;
    let dark = &theme.colors.dark;
    format!(
        r#":root {{
    --grid-columns: {columns};
    --color-bg: {light_bg};
    --color-surface: {light_surface};
    --color-text: {light_text};
    --color-text-muted: {light_text_muted};
    --color-border: {light_border};
    --color-link: {light_link};
}}

@media (prefers-color-scheme: dark) {{
    :root {{
        --color-bg: {dark_bg};
        --color-surface: {dark_surface};
        --color-text: {dark_text};
        --color-text-muted: {dark_text_muted};
        --color-border: {dark_border};
        --color-link: {dark_link};
    }}
}}"#,
        columns = theme.columns,
        light_bg = light.background,
        light_surface = light.surface,
        light_text = light.text,
        light_text_muted = light.text_muted,
        light_border = light.border,
        light_link = light.link,
        dark_bg = dark.background,
        dark_surface = dark.surface,
        dark_text = dark.text,
        dark_text_muted = dark.text_muted,
        dark_border = dark.border,
        dark_link = dark.link,
    )
}
