//! HTML site generation.
//!
//! Final stage of the build. Takes the validated config, normalized
//! products, resolved image sources, and tagged links, and renders every
//! output file in memory. Nothing touches the disk until [`write_site`], so a
//! render failure leaves the previously published site untouched.
//!
//! ## Generated Files
//!
//! ```text
//! <output>/
//! ├── index.html                 # The shortlist page
//! ├── products.json              # Normalized products + timestamp
//! ├── disclosure.html            # Affiliate disclosure (markdown)
//! ├── privacy.html               # Privacy note (markdown)
//! └── assets/
//!     ├── placeholder.svg        # Shown for products without an image
//!     └── img/                   # Mirrored product images (when enabled)
//! ```
//!
//! ## CSS
//!
//! `static/style.css` is embedded at compile time; the theme's CSS custom
//! properties are prepended to it and the result is inlined into every page.
//!
//! ## HTML Generation
//!
//! Uses [maud](https://maud.lambda.xyz/) for compile-time HTML templating.
//! All interpolated config text is escaped.

use crate::config::{self, SiteConfig};
use crate::types::{ImageSource, Product};
use maud::{DOCTYPE, Markup, PreEscaped, html};
use pulldown_cmark::{Parser, html as md_html};
use serde::Serialize;
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("product #{position} ({name}) has neither a link nor an ASIN")]
    MissingLink { position: usize, name: String },
    #[error("product {name} has an invalid link {url:?}: {source}")]
    InvalidLink {
        name: String,
        url: String,
        source: url::ParseError,
    },
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Placeholder image, relative to the output root.
pub const PLACEHOLDER_PATH: &str = "assets/placeholder.svg";

const CSS_STATIC: &str = include_str!("../static/style.css");
const PLACEHOLDER_SVG: &str = include_str!("../static/placeholder.svg");

const DISCLOSURE_LINE: &str = "As an Amazon Associate, I earn from qualifying purchases.";

/// Everything the renderer needs, already validated and resolved.
///
/// `products`, `images`, and `links` are parallel slices in display order.
#[derive(Debug)]
pub struct SiteInput<'a> {
    pub config: &'a SiteConfig,
    pub products: &'a [Product],
    pub images: &'a [ImageSource],
    pub links: &'a [String],
    /// Preformatted "last updated" stamp, e.g. `2026-10-19 06:00 UTC`.
    pub updated: &'a str,
}

/// One rendered file, path relative to the output root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputFile {
    pub path: String,
    pub contents: String,
}

/// All files of a build, in write order.
#[derive(Debug, Clone, Default)]
pub struct RenderedSite {
    pub files: Vec<OutputFile>,
}

impl RenderedSite {
    fn push(&mut self, path: &str, contents: String) {
        self.files.push(OutputFile {
            path: path.to_string(),
            contents,
        });
    }

    /// Look up a rendered file by its relative path.
    pub fn get(&self, path: &str) -> Option<&str> {
        self.files
            .iter()
            .find(|f| f.path == path)
            .map(|f| f.contents.as_str())
    }
}

/// Shape of `products.json`.
#[derive(Serialize)]
struct ProductsDocument<'a> {
    products: &'a [Product],
    updated: &'a str,
    title: &'a str,
}

/// Render every output file.
pub fn render_site(input: &SiteInput<'_>) -> Result<RenderedSite, RenderError> {
    let css = format!(
        "{}\n\n{}",
        config::generate_theme_css(&input.config.theme),
        CSS_STATIC
    );
    let mut site = RenderedSite::default();

    site.push("index.html", render_index(input, &css).into_string());

    let document = ProductsDocument {
        products: input.products,
        updated: input.updated,
        title: input.config.title.trim(),
    };
    site.push(
        "products.json",
        serde_json::to_string_pretty(&document)? + "\n",
    );

    let pages = &input.config.pages;
    site.push(
        "disclosure.html",
        render_markdown_page("Affiliate disclosure", &pages.disclosure, input.config, &css)
            .into_string(),
    );
    site.push(
        "privacy.html",
        render_markdown_page("Privacy", &pages.privacy, input.config, &css).into_string(),
    );

    site.push(PLACEHOLDER_PATH, PLACEHOLDER_SVG.to_string());

    Ok(site)
}

/// Write a rendered site under `output_dir`, creating directories as needed.
pub fn write_site(site: &RenderedSite, output_dir: &Path) -> std::io::Result<()> {
    for file in &site.files {
        let path = output_dir.join(&file.path);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, &file.contents)?;
        tracing::debug!(path = %path.display(), "wrote file");
    }
    Ok(())
}

// ============================================================================
// HTML Components
// ============================================================================

/// Renders the base HTML document structure
fn base_document(title: &str, description: &str, css: &str, content: Markup) -> Markup {
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="utf-8";
                meta name="viewport" content="width=device-width, initial-scale=1";
                title { (title) }
                @if !description.is_empty() {
                    meta name="description" content=(description);
                }
                style { (PreEscaped(css)) }
            }
            body {
                (content)
            }
        }
    }
}

fn site_footer() -> Markup {
    html! {
        footer {
            p {
                strong { "Affiliate disclosure:" }
                " " (DISCLOSURE_LINE)
            }
            p {
                a href="privacy.html" { "Privacy" }
                " · "
                a href="disclosure.html" { "Disclosure" }
            }
        }
    }
}

/// Intro paragraphs followed by the meta note; blank entries are skipped.
fn render_intro(config: &SiteConfig) -> Markup {
    let meta_note = config.meta_note.trim();
    html! {
        @for paragraph in &config.intro_paragraphs {
            @let paragraph = paragraph.trim();
            @if !paragraph.is_empty() {
                p { (paragraph) }
            }
        }
        @if !meta_note.is_empty() {
            p.meta { (meta_note) }
        }
    }
}

fn render_tags(tags: &[String]) -> Markup {
    html! {
        @if !tags.is_empty() {
            div.tags {
                @for tag in tags {
                    span.tag { (tag) }
                }
            }
        }
    }
}

/// Renders one product card.
pub fn render_card(product: &Product, image: &ImageSource, link: &str) -> Markup {
    let fallback = format!("this.onerror=null;this.src='{PLACEHOLDER_PATH}';");
    html! {
        div.card {
            div.img {
                img src=(image.src()) alt=(product.name) loading="lazy"
                    referrerpolicy="no-referrer" onerror=(fallback);
            }
            div.content {
                p.name { (product.name) }
                (render_tags(&product.best_for))
                p.desc { (product.description) }
                div.actions {
                    a.btn href=(link) rel="nofollow sponsored" { "Check price on Amazon" }
                }
            }
        }
    }
}

// ============================================================================
// Page Renderers
// ============================================================================

/// Renders the shortlist page.
fn render_index(input: &SiteInput<'_>, css: &str) -> Markup {
    let title = input.config.title.trim();

    let content = html! {
        header {
            h1 { (title) }
            (render_intro(input.config))
            p.meta { "Last updated: " (input.updated) }
        }
        main {
            div.grid {
                @for ((product, image), link) in input.products.iter().zip(input.images).zip(input.links) {
                    (render_card(product, image, link))
                }
            }
        }
        (site_footer())
    };

    base_document(title, input.config.description.trim(), css, content)
}

/// Renders an auxiliary page from markdown.
fn render_markdown_page(heading: &str, markdown: &str, config: &SiteConfig, css: &str) -> Markup {
    let parser = Parser::new(markdown);
    let mut body_html = String::new();
    md_html::push_html(&mut body_html, parser);

    let site_title = config.title.trim();
    let page_title = format!("{heading} · {site_title}");

    let content = html! {
        header {
            p.meta { a href="index.html" { "← " (site_title) } }
        }
        main.page-content {
            (PreEscaped(body_html))
        }
        (site_footer())
    };

    base_document(&page_title, "", css, content)
}

// ============================================================================
// Tests
// ============================================================================
