//! # Shortlist
//!
//! A minimal static site generator for affiliate product shortlists. One
//! JSON file is the data source: products become cards in the order they are
//! listed, every outbound link carries the affiliate tag, and the output is
//! plain HTML that GitHub Pages can serve as-is.
//!
//! # Architecture: Single-Pass Pipeline
//!
//! ```text
//! 1. Load       site_config.json  →  SiteConfig        (serde, validated)
//! 2. Normalize  SiteConfig        →  Vec<Product>      (defaults, dedup, tags)
//! 3. Images     Vec<Product>      →  Vec<ImageSource>  (optional download)
//! 4. Render     everything        →  RenderedSite      (in memory)
//! 5. Write      RenderedSite      →  output dir
//! ```
//!
//! Steps 1 and 2 can reject the input; both run before anything is written.
//! Step 3 only degrades (a failed download keeps the remote URL), and it
//! writes downloads before step 5, so an IO error while writing can leave a
//! partial update. The scheduled workflow in `.github/workflows/build.yml`
//! runs the pipeline daily and commits whatever changed.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`config`] | `site_config.json` loading, validation, build settings, CSS generation |
//! | [`catalog`] | Raw entries → display-ready products; affiliate link tagging |
//! | [`affiliate`] | `tag=` query parameter handling and ASIN link derivation |
//! | [`images`] | Image fetcher trait, HTTP fetcher, parallel materializer |
//! | [`generate`] | Renders every output file with Maud |
//! | [`pipeline`] | Runs the stages in order; `build` and `check` entry points |
//! | [`output`] | CLI output formatting |
//! | [`logging`] | `tracing` subscriber setup |
//! | [`types`] | Shared types (`Product`, `ImageSource`) |
//!
//! # Design Decisions
//!
//! ## Maud Over Template Engines
//!
//! HTML is generated with [Maud](https://maud.lambda.xyz/). Config text is
//! untrusted as far as the page is concerned; Maud escapes every
//! interpolation, and a malformed template is a compile error.
//!
//! ## Render in Memory, Then Write
//!
//! A rejected config leaves the published files alone: nothing is written
//! until the config has been validated and every product link has been
//! tagged. Past that point writes are not atomic; downloaded images land
//! before the pages, and stale images are pruned only after the pages are
//! written.
//!
//! ## Images Are Best-Effort
//!
//! Retailer CDNs often block hotlinking, so the build can mirror images
//! under `assets/img/`. Downloads never fail a build: the card falls back to
//! an earlier local copy, then to the remote URL, and the browser falls back
//! to the placeholder if that fails too.

pub mod affiliate;
pub mod catalog;
pub mod config;
pub mod generate;
pub mod images;
pub mod logging;
pub mod output;
pub mod pipeline;
pub mod types;

#[cfg(test)]
pub(crate) mod test_helpers;
