//! Product image materialization.
//!
//! | Piece | Role |
//! |---|---|
//! | [`fetcher`] | [`ImageFetcher`] trait + [`HttpFetcher`] (blocking reqwest) |
//! | `naming` | Pure functions: local file keys and extensions |
//! | [`materialize`] | Fetch-and-store for every product, in parallel |
//!
//! Remote image hosts frequently block hotlinking, so the build can mirror
//! product images next to the page. The step is best-effort: any fetch
//! failure leaves the card pointing at the original URL.

pub mod fetcher;
pub mod materialize;
mod naming;

pub use fetcher::{FetchError, FetchedImage, HttpFetcher, ImageFetcher};
pub use materialize::{
    IMG_DIR, ImageStatus, MaterializeError, MaterializeEvent, MaterializeResult,
    MaterializeStats, materialize, passthrough, prune_unreferenced,
};
