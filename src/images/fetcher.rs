//! Image fetcher trait and the HTTP implementation.
//!
//! The [`ImageFetcher`] trait is the only place the build touches the
//! network. The production implementation is [`HttpFetcher`]; tests use the
//! recording `MockFetcher` from this module's test submodule.

use reqwest::blocking::Client;
use reqwest::header::{ACCEPT, CONTENT_TYPE, HeaderMap, HeaderValue};
use std::time::Duration;
use thiserror::Error;

/// Some image CDNs refuse requests without a browser-like agent.
pub const USER_AGENT: &str = "Mozilla/5.0 (compatible; static-site-builder/1.0)";

const ACCEPT_IMAGES: &str = "image/avif,image/webp,image/apng,image/*,*/*;q=0.8";

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(20);

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("unexpected status {0}")]
    Status(u16),
    #[error("empty response body")]
    Empty,
    #[error("response is not an image (content type {0})")]
    NotAnImage(String),
}

/// A successfully downloaded payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedImage {
    pub bytes: Vec<u8>,
    /// Raw `Content-Type` header, if the server sent one.
    pub content_type: Option<String>,
}

/// Trait for image sources.
///
/// `Sync` so a single fetcher can be shared across the rayon pool.
pub trait ImageFetcher: Sync {
    /// Download `url`. Only a 200 response with a non-empty body is a success.
    fn fetch(&self, url: &str) -> Result<FetchedImage, FetchError>;
}

/// Fetcher backed by a blocking reqwest client.
///
/// Redirects are followed (reqwest's default policy, up to 10 hops).
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new() -> Result<Self, FetchError> {
        Self::with_timeout(DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(timeout: Duration) -> Result<Self, FetchError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static(ACCEPT_IMAGES));
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .default_headers(headers)
            .timeout(timeout)
            .build()?;
        Ok(Self { client })
    }
}

impl ImageFetcher for HttpFetcher {
    fn fetch(&self, url: &str) -> Result<FetchedImage, FetchError> {
        tracing::debug!(url, "fetching image");
        let response = self.client.get(url).send()?;

        let status = response.status();
        if status != reqwest::StatusCode::OK {
            return Err(FetchError::Status(status.as_u16()));
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let bytes = response.bytes()?.to_vec();
        if bytes.is_empty() {
            return Err(FetchError::Empty);
        }

        Ok(FetchedImage {
            bytes,
            content_type,
        })
    }
}
