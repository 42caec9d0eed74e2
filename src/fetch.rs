//! HTTP fetching for the pipeline
//!
//! This module handles all HTTP requests for the scraper:
//! - Building a reqwest client with a proper user agent string
//! - Fetching page bodies
//! - Classifying transport failures into the pipeline's error taxonomy
//!
//! The pipeline itself only sees the [`Fetcher`] trait, which keeps the
//! worker pools testable with stub implementations and keeps transport
//! policy (timeouts, compression, TLS) out of the pipeline code.

use crate::config::UserAgentConfig;
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use thiserror::Error;

/// Failure modes of a single fetch
///
/// The pipeline treats every variant identically: the item is dropped, the
/// failure counter is incremented, and the worker moves on. The variants
/// exist for logging and for tests that care about classification.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Network error for {url}: {message}")]
    Network { url: String, message: String },

    #[error("Request timeout for {url}")]
    Timeout { url: String },

    #[error("HTTP {status} for {url}")]
    BadStatus { url: String, status: u16 },
}

/// A source of page bodies keyed by URL
///
/// The production implementation is [`HttpFetcher`]; tests substitute stubs
/// that return canned bodies or canned failures. Implementations are
/// expected to carry their own timeout so a fetch never blocks a worker
/// indefinitely.
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Fetches the body of `url`, or a classified failure
    async fn fetch(&self, url: &str) -> Result<String, FetchError>;
}

/// Builds an HTTP client with proper configuration
///
/// The user agent is formatted as `ScraperName/Version (+ContactURL)` so
/// site operators can identify and reach the scraper's owner.
pub fn build_http_client(config: &UserAgentConfig) -> Result<Client, reqwest::Error> {
    let user_agent = format!(
        "{}/{} (+{})",
        config.scraper_name, config.scraper_version, config.contact_url
    );

    Client::builder()
        .user_agent(user_agent)
        .timeout(Duration::from_secs(30))
        .connect_timeout(Duration::from_secs(10))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Production fetcher backed by a shared reqwest client
#[derive(Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| classify_error(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::BadStatus {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        response.text().await.map_err(|e| classify_error(url, e))
    }
}

/// Maps a reqwest error onto the pipeline's failure taxonomy
fn classify_error(url: &str, error: reqwest::Error) -> FetchError {
    if error.is_timeout() {
        FetchError::Timeout {
            url: url.to_string(),
        }
    } else {
        FetchError::Network {
            url: url.to_string(),
            message: error.to_string(),
        }
    }
}
