//! HTTP client for fetching Exodus report pages
//!
//! Every request is a single attempt: failures surface to the caller as
//! [`HttpError`] and the caller decides whether they are fatal.

use async_trait::async_trait;
use reqwest::{Client, ClientBuilder, StatusCode};
use thiserror::Error;
use tracing::{debug, info};

use crate::infrastructure::config::SourceConfig;

#[derive(Debug, Error)]
pub enum HttpError {
    #[error("failed to create HTTP client: {0}")]
    ClientBuild(#[source] reqwest::Error),

    #[error("HTTP request failed for {url}: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("HTTP error {status} for {url}")]
    Status { status: StatusCode, url: String },

    #[error("failed to read response body from {url}: {source}")]
    Body {
        url: String,
        #[source]
        source: reqwest::Error,
    },
}

/// Source of raw HTML pages, relative to a fixed base URL
#[async_trait]
pub trait TrackerSource: Send + Sync {
    /// Base URL every relative link is resolved against
    fn base_url(&self) -> &str;

    /// GET `base_url + path`, or the tracker index when `path` is `None`.
    async fn fetch(&self, path: Option<&str>) -> Result<String, HttpError>;
}

/// reqwest-backed [`TrackerSource`] for the live reports site.
///
/// Cloning is cheap; clones share one connection pool.
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
    base_url: String,
    index_path: String,
}

impl HttpClient {
    pub fn with_config(config: &SourceConfig) -> Result<Self, HttpError> {
        let client = ClientBuilder::new()
            .timeout(config.request_timeout())
            .user_agent(&config.user_agent)
            .gzip(true)
            .brotli(true)
            .redirect(reqwest::redirect::Policy::limited(10))
            .build()
            .map_err(HttpError::ClientBuild)?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            index_path: config.index_path.clone(),
        })
    }

    /// Full URL for `path`, falling back to the index page
    #[must_use]
    pub fn url_for(&self, path: Option<&str>) -> String {
        format!("{}{}", self.base_url, path.unwrap_or(&self.index_path))
    }
}

#[async_trait]
impl TrackerSource for HttpClient {
    fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn fetch(&self, path: Option<&str>) -> Result<String, HttpError> {
        let url = self.url_for(path);
        debug!("HTTP GET {}", url);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|source| HttpError::Request {
                url: url.clone(),
                source,
            })?;

        let status = response.status();
        info!("{} {}", status.as_u16(), response.url());

        if !status.is_success() {
            return Err(HttpError::Status { status, url });
        }

        response.text().await.map_err(|source| HttpError::Body { url, source })
    }
}
