//! Image fetch and decode facility used by consistency scoring.
//!
//! Remote images are fetched over HTTP with bounded exponential-backoff
//! retries on transient failures. Local paths (and `file://` URLs) are read
//! from disk. Both are decoded with the `image` crate.

use std::time::Duration;

use async_trait::async_trait;
use image::DynamicImage;

use crate::retry::{is_retryable_status, next_delay, RetryConfig};

/// Default timeout for a single image download.
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, thiserror::Error)]
pub enum ImageLoadError {
    /// The HTTP request itself failed (network, DNS, TLS, timeout).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Image fetch for {url} returned status {status}")]
    Status { url: String, status: u16 },

    #[error("Failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to decode image: {0}")]
    Decode(#[from] image::ImageError),

    #[error("Unsupported image location: {0}")]
    UnsupportedScheme(String),
}

/// Given a URL or path, returns the decoded pixel buffer.
#[async_trait]
pub trait ImageSource: Send + Sync {
    async fn load(&self, url: &str) -> Result<DynamicImage, ImageLoadError>;
}

/// [`ImageSource`] for `http(s)://` URLs, `file://` URLs and plain paths.
pub struct HttpImageSource {
    client: reqwest::Client,
    retry: RetryConfig,
}

impl HttpImageSource {
    pub fn new() -> Result<Self, ImageLoadError> {
        let client = reqwest::Client::builder()
            .timeout(DEFAULT_FETCH_TIMEOUT)
            .build()?;
        Ok(Self::with_client(client, RetryConfig::default()))
    }

    pub fn with_client(client: reqwest::Client, retry: RetryConfig) -> Self {
        Self { client, retry }
    }

    async fn fetch(&self, url: &str) -> Result<Vec<u8>, ImageLoadError> {
        let attempts = self.retry.max_attempts.max(1);
        let mut delay = self.retry.initial_delay;
        let mut attempt = 0u32;

        loop {
            attempt += 1;
            let last = attempt >= attempts;

            let err = match self.client.get(url).send().await {
                Ok(response) if response.status().is_success() => {
                    match response.bytes().await {
                        Ok(bytes) => return Ok(bytes.to_vec()),
                        Err(e) if last => return Err(e.into()),
                        Err(e) => ImageLoadError::Request(e),
                    }
                }
                Ok(response) => {
                    let status = response.status().as_u16();
                    let err = ImageLoadError::Status {
                        url: url.to_string(),
                        status,
                    };
                    if last || !is_retryable_status(status) {
                        return Err(err);
                    }
                    err
                }
                Err(e) => {
                    if last || !(e.is_timeout() || e.is_connect()) {
                        return Err(e.into());
                    }
                    ImageLoadError::Request(e)
                }
            };

            tracing::warn!(
                url,
                attempt,
                max_attempts = attempts,
                delay_ms = delay.as_millis() as u64,
                error = %err,
                "Image fetch failed, retrying",
            );
            tokio::time::sleep(delay).await;
            delay = next_delay(delay, &self.retry);
        }
    }

    async fn read_local(path: &str) -> Result<Vec<u8>, ImageLoadError> {
        tokio::fs::read(path).await.map_err(|source| ImageLoadError::Io {
            path: path.to_string(),
            source,
        })
    }
}

#[async_trait]
impl ImageSource for HttpImageSource {
    async fn load(&self, url: &str) -> Result<DynamicImage, ImageLoadError> {
        let bytes = if url.starts_with("http://") || url.starts_with("https://") {
            self.fetch(url).await?
        } else if let Some(path) = url.strip_prefix("file://") {
            Self::read_local(path).await?
        } else if url.contains("://") {
            return Err(ImageLoadError::UnsupportedScheme(url.to_string()));
        } else {
            Self::read_local(url).await?
        };

        Ok(image::load_from_memory(&bytes)?)
    }
}
