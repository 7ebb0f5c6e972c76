//! The build pipeline: config → catalog → images → HTML → disk.
//!
//! ```text
//! load_config ─▶ normalize_products ─▶ tag_links ─▶ materialize | passthrough
//!                                                          │
//!   prune_unreferenced ◀── write_site ◀── copy assets ◀── render_site
//! ```
//!
//! Every step that can reject the input (config validation, link tagging,
//! the assets directory check) runs before anything is written, so a bad
//! config leaves the previously published output as it was.
//!
//! Once input is accepted, writes are not atomic. With caching on, fresh
//! downloads land in `assets/img/` before the pages are rendered, and an IO
//! error while copying assets or writing pages can leave a partial update.
//! Stale images are only removed after every page has been written, so a
//! published page never points at a deleted image. Image materialization
//! only ever degrades; it never aborts the run.

use crate::catalog::{normalize_products, tag_links};
use crate::config::{self, BuildSettings, ConfigError};
use crate::generate::{self, RenderError, SiteInput};
use crate::images::{self, ImageFetcher, MaterializeError, MaterializeEvent, MaterializeStats};
use crate::types::{ImageSource, Product};
use chrono::{DateTime, Utc};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::mpsc::Sender;
use thiserror::Error;
use walkdir::WalkDir;

#[derive(Error, Debug)]
pub enum BuildError {
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
    #[error("Render error: {0}")]
    Render(#[from] RenderError),
    #[error("Image error: {0}")]
    Materialize(#[from] MaterializeError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Could not read assets: {0}")]
    Walk(#[from] walkdir::Error),
    #[error("Assets directory not found: {}", .0.display())]
    MissingAssets(PathBuf),
}

/// Inputs for one build.
#[derive(Debug, Clone)]
pub struct BuildOptions {
    pub config_path: PathBuf,
    pub output_dir: PathBuf,
    pub settings: BuildSettings,
    /// Download worker count.
    pub jobs: usize,
    /// Static files copied verbatim into the output root.
    pub assets_dir: Option<PathBuf>,
}

/// What a successful build produced.
#[derive(Debug)]
pub struct BuildReport {
    pub title: String,
    pub products: Vec<Product>,
    pub links: Vec<String>,
    pub images: Vec<ImageSource>,
    /// `None` when image caching was off.
    pub image_stats: Option<MaterializeStats>,
    /// Generated files, relative to the output root.
    pub files: Vec<String>,
    /// Copied asset files, relative to the output root.
    pub assets: Vec<String>,
    pub updated: String,
}

/// Result of validating a config without building.
#[derive(Debug)]
pub struct CheckReport {
    pub title: String,
    pub products: Vec<Product>,
    /// Untagged links, in product order.
    pub links: Vec<String>,
    /// Entries dropped as duplicate ASINs.
    pub duplicates: usize,
}

/// Format a "last updated" stamp: `YYYY-MM-DD HH:MM UTC`.
pub fn utc_timestamp(now: DateTime<Utc>) -> String {
    now.format("%Y-%m-%d %H:%M UTC").to_string()
}

/// Run the full pipeline.
///
/// `updated` is the stamp shown on the page and in `products.json`; callers
/// pass [`utc_timestamp`] of the current time. `fetcher` is only used when
/// image caching is enabled.
pub fn build(
    fetcher: &impl ImageFetcher,
    options: &BuildOptions,
    updated: &str,
    events: Option<Sender<MaterializeEvent>>,
) -> Result<BuildReport, BuildError> {
    let site_config = config::load_config(&options.config_path)?;
    let products = normalize_products(&site_config.products);
    let links = tag_links(&products, &options.settings.partner_tag)?;

    if let Some(dir) = &options.assets_dir
        && !dir.is_dir()
    {
        return Err(BuildError::MissingAssets(dir.clone()));
    }

    tracing::info!(
        products = products.len(),
        cache_images = options.settings.cache_images,
        "building {}",
        options.output_dir.display()
    );

    let (images, image_stats) = if options.settings.cache_images {
        let result = images::materialize(
            fetcher,
            &products,
            &options.output_dir,
            options.jobs,
            events,
        )?;
        tracing::info!("images: {}", result.stats);
        (result.images, Some(result.stats))
    } else {
        (images::passthrough(&products), None)
    };

    let site = generate::render_site(&SiteInput {
        config: &site_config,
        products: &products,
        images: &images,
        links: &links,
        updated,
    })?;

    fs::create_dir_all(&options.output_dir)?;
    let assets = match &options.assets_dir {
        Some(dir) => copy_assets(dir, &options.output_dir)?,
        None => Vec::new(),
    };
    generate::write_site(&site, &options.output_dir)?;
    if options.settings.cache_images {
        images::prune_unreferenced(&options.output_dir, &images)?;
    }

    Ok(BuildReport {
        title: site_config.title.trim().to_string(),
        files: site.files.iter().map(|f| f.path.clone()).collect(),
        products,
        links,
        images,
        image_stats,
        assets,
        updated: updated.to_string(),
    })
}

/// Load and validate the config, including every product link. Writes nothing.
pub fn check(config_path: &Path) -> Result<CheckReport, BuildError> {
    let site_config = config::load_config(config_path)?;
    let products = normalize_products(&site_config.products);
    // Links are validated the same way `build` does, with a stand-in tag.
    tag_links(&products, "check-20")?;

    Ok(CheckReport {
        title: site_config.title.trim().to_string(),
        duplicates: site_config.products.len() - products.len(),
        links: products.iter().map(|p| p.amazon_url.clone()).collect(),
        products,
    })
}

/// Copy every file under `src` into `dst`, keeping relative paths.
fn copy_assets(src: &Path, dst: &Path) -> Result<Vec<String>, BuildError> {
    let mut copied = Vec::new();
    for entry in WalkDir::new(src).min_depth(1).follow_links(false).sort_by_file_name() {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }
        let Ok(relative) = entry.path().strip_prefix(src) else {
            continue;
        };
        let target = dst.join(relative);
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::copy(entry.path(), &target)?;
        copied.push(relative.to_string_lossy().replace('\\', "/"));
    }
    Ok(copied)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::images::fetcher::tests::MockFetcher;
    use crate::test_helpers::{widget_config, write_config};
    use chrono::TimeZone;
    use tempfile::TempDir;

    const UPDATED: &str = "2026-10-19 06:00 UTC";
    const PNG: &[u8] = b"\x89PNG\r\n\x1a\n\0\0\0\rIHDR";

    fn options(tmp: &TempDir, cache_images: bool) -> BuildOptions {
        BuildOptions {
            config_path: tmp.path().join("site_config.json"),
            output_dir: tmp.path().join("site"),
            settings: BuildSettings::new("shop-20", cache_images).unwrap(),
            jobs: 2,
            assets_dir: None,
        }
    }

    #[test]
    fn timestamp_format() {
        let now = Utc.with_ymd_and_hms(2026, 3, 7, 9, 5, 59).unwrap();
        assert_eq!(utc_timestamp(now), "2026-03-07 09:05 UTC");
    }

    #[test]
    fn build_without_cache_references_remote_images() {
        let tmp = TempDir::new().unwrap();
        write_config(tmp.path(), &widget_config());
        let fetcher = MockFetcher::new();

        let report = build(&fetcher, &options(&tmp, false), UPDATED, None).unwrap();

        assert!(fetcher.get_requests().is_empty());
        assert!(report.image_stats.is_none());
        let html = fs::read_to_string(tmp.path().join("site/index.html")).unwrap();
        assert!(html.contains("Best Widgets"));
        assert!(html.contains(r#"src="https://img/a.png""#));
        assert!(html.contains("https://x/?tag=shop-20"));
        assert!(!tmp.path().join("site/assets/img").exists());
    }

    #[test]
    fn build_with_cache_references_local_copy() {
        let tmp = TempDir::new().unwrap();
        write_config(tmp.path(), &widget_config());
        let fetcher = MockFetcher::new().with_image("https://img/a.png", PNG, Some("image/png"));

        let report = build(&fetcher, &options(&tmp, true), UPDATED, None).unwrap();

        assert_eq!(report.image_stats.unwrap().downloaded, 1);
        let src = report.images[0].src().to_string();
        assert!(src.starts_with("assets/img/"));
        assert!(tmp.path().join("site").join(&src).exists());
        let html = fs::read_to_string(tmp.path().join("site/index.html")).unwrap();
        assert!(html.contains(&format!(r#"src="{src}""#)));
    }

    #[test]
    fn build_with_cache_keeps_local_image_files() {
        let tmp = TempDir::new().unwrap();
        write_config(
            tmp.path(),
            r#"{"title": "x", "products": [
                {"name": "Own", "link": "https://x/own", "image": "assets/img/own.png"}
            ]}"#,
        );
        let img_dir = tmp.path().join("site/assets/img");
        fs::create_dir_all(&img_dir).unwrap();
        fs::write(img_dir.join("own.png"), PNG).unwrap();
        fs::write(img_dir.join("stale.png"), PNG).unwrap();

        let report = build(&MockFetcher::new(), &options(&tmp, true), UPDATED, None).unwrap();

        assert_eq!(report.images[0].src(), "assets/img/own.png");
        assert!(img_dir.join("own.png").exists());
        assert!(!img_dir.join("stale.png").exists());
    }

    #[test]
    fn failed_page_write_keeps_old_images() {
        let tmp = TempDir::new().unwrap();
        write_config(tmp.path(), &widget_config());
        let site = tmp.path().join("site");
        fs::create_dir_all(site.join("assets/img")).unwrap();
        fs::write(site.join("assets/img/old.png"), PNG).unwrap();
        // A directory where index.html should go makes the page write fail.
        fs::create_dir_all(site.join("index.html")).unwrap();

        let result = build(&MockFetcher::new(), &options(&tmp, true), UPDATED, None);

        assert!(matches!(result, Err(BuildError::Io(_))));
        assert!(site.join("assets/img/old.png").exists());
    }

    #[test]
    fn build_lists_generated_files() {
        let tmp = TempDir::new().unwrap();
        write_config(tmp.path(), &widget_config());

        let report = build(&MockFetcher::new(), &options(&tmp, false), UPDATED, None).unwrap();

        assert_eq!(
            report.files,
            vec![
                "index.html",
                "products.json",
                "disclosure.html",
                "privacy.html",
                "assets/placeholder.svg"
            ]
        );
        assert_eq!(report.updated, UPDATED);
    }

    #[test]
    fn invalid_link_writes_nothing() {
        let tmp = TempDir::new().unwrap();
        write_config(
            tmp.path(),
            r#"{"title": "x", "products": [{"name": "Bad", "link": "not a url"}]}"#,
        );

        let result = build(&MockFetcher::new(), &options(&tmp, true), UPDATED, None);

        assert!(matches!(
            result,
            Err(BuildError::Render(RenderError::InvalidLink { .. }))
        ));
        assert!(!tmp.path().join("site").exists());
    }

    #[test]
    fn missing_config_is_config_error() {
        let tmp = TempDir::new().unwrap();
        let result = build(&MockFetcher::new(), &options(&tmp, false), UPDATED, None);
        assert!(matches!(result, Err(BuildError::Config(ConfigError::Io(_)))));
    }

    #[test]
    fn missing_assets_dir_fails_before_writing() {
        let tmp = TempDir::new().unwrap();
        write_config(tmp.path(), &widget_config());
        let mut opts = options(&tmp, false);
        opts.assets_dir = Some(tmp.path().join("nope"));

        let result = build(&MockFetcher::new(), &opts, UPDATED, None);

        assert!(matches!(result, Err(BuildError::MissingAssets(_))));
        assert!(!tmp.path().join("site").exists());
    }

    #[test]
    fn assets_are_copied_and_generated_files_win() {
        let tmp = TempDir::new().unwrap();
        write_config(tmp.path(), &widget_config());
        let assets = tmp.path().join("public");
        fs::create_dir_all(assets.join("icons")).unwrap();
        fs::write(assets.join("favicon.ico"), b"ico").unwrap();
        fs::write(assets.join("icons/apple.png"), b"png").unwrap();
        fs::write(assets.join("index.html"), b"stale").unwrap();
        let mut opts = options(&tmp, false);
        opts.assets_dir = Some(assets);

        let report = build(&MockFetcher::new(), &opts, UPDATED, None).unwrap();

        assert_eq!(
            report.assets,
            vec!["favicon.ico", "icons/apple.png", "index.html"]
        );
        let site = tmp.path().join("site");
        assert_eq!(fs::read(site.join("icons/apple.png")).unwrap(), b"png");
        let html = fs::read_to_string(site.join("index.html")).unwrap();
        assert!(html.starts_with("<!DOCTYPE html>"));
    }

    #[test]
    fn check_reports_products_and_duplicates() {
        let tmp = TempDir::new().unwrap();
        write_config(
            tmp.path(),
            r#"{"title": " Shop ", "products": [
                {"amazon_asin": "B01", "product_name": "One"},
                {"amazon_asin": "B01", "product_name": "Again"},
                {"name": "Two", "link": "https://x/two"}
            ]}"#,
        );

        let report = check(&tmp.path().join("site_config.json")).unwrap();

        assert_eq!(report.title, "Shop");
        assert_eq!(report.duplicates, 1);
        assert_eq!(
            report.links,
            vec!["https://www.amazon.com/dp/B01", "https://x/two"]
        );
        assert!(fs::read_dir(tmp.path()).unwrap().count() == 1);
    }

    #[test]
    fn check_rejects_missing_link() {
        let tmp = TempDir::new().unwrap();
        write_config(
            tmp.path(),
            r#"{"title": "Shop", "products": [{"name": "Orphan"}]}"#,
        );

        let result = check(&tmp.path().join("site_config.json"));

        assert!(matches!(
            result,
            Err(BuildError::Render(RenderError::MissingLink { position: 1, .. }))
        ));
    }
}
