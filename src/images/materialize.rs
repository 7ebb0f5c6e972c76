//! Mirror remote product images into the output directory.
//!
//! For every product the image reference resolves to one of:
//!
//! | Reference | Fetch result | Card points at | Status |
//! |---|---|---|---|
//! | empty | n/a | placeholder | `Placeholder` |
//! | not `http(s)` | n/a | reference as-is | `Passthrough` |
//! | `http(s)` | ok | `assets/img/{key}{ext}` | `Downloaded` |
//! | `http(s)` | failed, earlier copy of the same URL | `assets/img/{key}.*` | `Reused` |
//! | `http(s)` | failed, no copy | original URL | `Remote` |
//!
//! Fetch failures are never fatal. The only hard errors are failing to create
//! or prune `assets/img/` itself.
//!
//! ## Parallelism
//!
//! Downloads run on a dedicated rayon pool of `jobs` threads. Products that
//! share a key (same ASIN, or same URL without one) are fetched once. Results
//! and progress events follow product order.
//!
//! ## Pruning
//!
//! [`prune_unreferenced`] deletes files in `assets/img/` that no card
//! references, mirrored or configured as a local path. The pipeline calls it
//! only after the pages are written, so a failed run never loses an image
//! the published page still shows.

use super::fetcher::{FetchError, ImageFetcher};
use super::naming::{choose_extension, image_key, looks_like_image};
use crate::types::{ImageSource, Product};
use rayon::prelude::*;
use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::fs;
use std::path::Path;
use std::sync::mpsc::Sender;
use thiserror::Error;

/// Image directory, relative to the output root.
pub const IMG_DIR: &str = "assets/img";

#[derive(Error, Debug)]
pub enum MaterializeError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Could not start download workers: {0}")]
    Pool(#[from] rayon::ThreadPoolBuildError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageStatus {
    Downloaded,
    Reused,
    Remote,
    Placeholder,
    Passthrough,
}

/// Progress event, one per product.
#[derive(Debug, Clone)]
pub enum MaterializeEvent {
    Resolved {
        /// 1-based position in the product list.
        position: usize,
        name: String,
        reference: String,
        status: ImageStatus,
        src: String,
        /// Why the fetch failed, for `Reused` and `Remote`.
        error: Option<String>,
    },
}

/// Per-status counts for the build summary.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MaterializeStats {
    pub downloaded: usize,
    pub reused: usize,
    pub remote: usize,
    pub placeholder: usize,
    pub passthrough: usize,
}

impl MaterializeStats {
    fn record(&mut self, status: ImageStatus) {
        match status {
            ImageStatus::Downloaded => self.downloaded += 1,
            ImageStatus::Reused => self.reused += 1,
            ImageStatus::Remote => self.remote += 1,
            ImageStatus::Placeholder => self.placeholder += 1,
            ImageStatus::Passthrough => self.passthrough += 1,
        }
    }
}

impl fmt::Display for MaterializeStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} downloaded, {} reused, {} remote, {} placeholder",
            self.downloaded, self.reused, self.remote, self.placeholder
        )?;
        if self.passthrough > 0 {
            write!(f, ", {} local", self.passthrough)?;
        }
        Ok(())
    }
}

#[derive(Debug)]
pub struct MaterializeResult {
    /// Image source per product, in product order.
    pub images: Vec<ImageSource>,
    pub stats: MaterializeStats,
}

/// Resolve image sources without any network access (caching disabled).
pub fn passthrough(products: &[Product]) -> Vec<ImageSource> {
    products
        .iter()
        .map(|p| ImageSource::passthrough(&p.image_url))
        .collect()
}

/// Outcome of resolving one unique key.
#[derive(Debug, Clone)]
struct Resolution {
    source: ImageSource,
    status: ImageStatus,
    error: Option<String>,
}

fn is_remote(reference: &str) -> bool {
    url::Url::parse(reference)
        .map(|u| matches!(u.scheme(), "http" | "https"))
        .unwrap_or(false)
}

/// Download every remote product image into `output_dir/assets/img`.
pub fn materialize(
    fetcher: &impl ImageFetcher,
    products: &[Product],
    output_dir: &Path,
    jobs: usize,
    events: Option<Sender<MaterializeEvent>>,
) -> Result<MaterializeResult, MaterializeError> {
    let img_dir = output_dir.join(IMG_DIR);
    fs::create_dir_all(&img_dir)?;

    // One download per key; BTreeMap keeps the work list deterministic.
    let mut work: BTreeMap<String, &str> = BTreeMap::new();
    let keys: Vec<Option<String>> = products
        .iter()
        .map(|p| {
            if !is_remote(&p.image_url) {
                return None;
            }
            let key = image_key(p);
            work.entry(key.clone()).or_insert(p.image_url.as_str());
            Some(key)
        })
        .collect();

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(jobs.max(1))
        .build()?;
    let resolved: BTreeMap<String, Resolution> = pool.install(|| {
        work.par_iter()
            .map(|(key, url)| (key.clone(), fetch_one(fetcher, key, url, &img_dir)))
            .collect()
    });

    let mut images = Vec::with_capacity(products.len());
    let mut stats = MaterializeStats::default();
    for (index, (product, key)) in products.iter().zip(&keys).enumerate() {
        let resolution = match key {
            Some(key) => resolved[key].clone(),
            None if product.image_url.is_empty() => Resolution {
                source: ImageSource::Placeholder,
                status: ImageStatus::Placeholder,
                error: None,
            },
            None => Resolution {
                source: ImageSource::Remote(product.image_url.clone()),
                status: ImageStatus::Passthrough,
                error: None,
            },
        };

        stats.record(resolution.status);
        if let Some(tx) = &events {
            tx.send(MaterializeEvent::Resolved {
                position: index + 1,
                name: product.name.clone(),
                reference: product.image_url.clone(),
                status: resolution.status,
                src: resolution.source.src().to_string(),
                error: resolution.error.clone(),
            })
            .ok();
        }
        images.push(resolution.source);
    }

    Ok(MaterializeResult { images, stats })
}

fn fetch_one(fetcher: &impl ImageFetcher, key: &str, url: &str, img_dir: &Path) -> Resolution {
    match download(fetcher, key, url, img_dir) {
        Ok(file_name) => Resolution {
            source: ImageSource::Local(format!("{IMG_DIR}/{file_name}")),
            status: ImageStatus::Downloaded,
            error: None,
        },
        Err(e) => {
            let error = e.to_string();
            match previous_copy(img_dir, key) {
                Some(file_name) => {
                    tracing::warn!(url, %error, %file_name, "image fetch failed, reusing earlier copy");
                    Resolution {
                        source: ImageSource::Local(format!("{IMG_DIR}/{file_name}")),
                        status: ImageStatus::Reused,
                        error: Some(error),
                    }
                }
                None => {
                    tracing::warn!(url, %error, "image fetch failed, linking remote image");
                    Resolution {
                        source: ImageSource::Remote(url.to_string()),
                        status: ImageStatus::Remote,
                        error: Some(error),
                    }
                }
            }
        }
    }
}

#[derive(Error, Debug)]
enum DownloadError {
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error("could not store image: {0}")]
    Io(#[from] std::io::Error),
}

/// Fetch and write one image; returns the stored file name.
fn download(
    fetcher: &impl ImageFetcher,
    key: &str,
    url: &str,
    img_dir: &Path,
) -> Result<String, DownloadError> {
    let image = fetcher.fetch(url)?;
    let content_type = image.content_type.as_deref();
    if !looks_like_image(content_type, &image.bytes) {
        return Err(FetchError::NotAnImage(content_type.unwrap_or_default().to_string()).into());
    }
    let file_name = format!("{key}{}", choose_extension(url, content_type, &image.bytes));
    fs::write(img_dir.join(&file_name), &image.bytes)?;
    Ok(file_name)
}

/// An image stored for `key` by an earlier run, if any.
fn previous_copy(img_dir: &Path, key: &str) -> Option<String> {
    let mut matches: Vec<String> = fs::read_dir(img_dir)
        .ok()?
        .filter_map(Result::ok)
        .filter(|entry| entry.path().is_file())
        .filter(|entry| {
            entry
                .path()
                .file_stem()
                .is_some_and(|stem| stem.to_string_lossy() == key)
        })
        .map(|entry| entry.file_name().to_string_lossy().into_owned())
        .collect();
    matches.sort();
    matches.into_iter().next()
}

/// Delete files directly in `output_dir/assets/img` that no card references.
///
/// Both mirrored copies and configured local paths (`assets/img/own.png`)
/// count as references. A missing directory is not an error.
pub fn prune_unreferenced(
    output_dir: &Path,
    images: &[ImageSource],
) -> Result<(), MaterializeError> {
    let img_dir = output_dir.join(IMG_DIR);
    if !img_dir.is_dir() {
        return Ok(());
    }

    let prefix = format!("{IMG_DIR}/");
    let keep: HashSet<&str> = images
        .iter()
        .filter_map(|source| match source {
            ImageSource::Local(path) | ImageSource::Remote(path) => {
                path.trim_start_matches("./").strip_prefix(&prefix)
            }
            ImageSource::Placeholder => None,
        })
        .collect();

    for entry in fs::read_dir(&img_dir)? {
        let entry = entry?;
        let path = entry.path();
        let name = entry.file_name().to_string_lossy().into_owned();
        if path.is_file() && !keep.contains(name.as_str()) {
            tracing::debug!(path = %path.display(), "removing unreferenced image");
            fs::remove_file(&path)?;
        }
    }
    Ok(())
}
