//! HTTP collaborator: fetching raw bytes by URL.
//!
//! The pipeline only ever issues plain GETs. Each worker and the feed producer get their
//! own client from an [`HttpClientFactory`] so cookie state is never shared between tasks.

use std::sync::Arc;

use crate::config::HttpConfig;
use crate::error::{Error, Result};

/// Abstraction over HTTP GET, enabling testability.
#[async_trait::async_trait]
pub trait HttpClient: Send + Sync {
    /// Fetch the full response body of `url`.
    ///
    /// Connection failures and non-success statuses are [`Error::Transport`].
    async fn fetch(&self, url: &str) -> Result<Vec<u8>>;
}

/// Creates one independent [`HttpClient`] per consumer.
pub trait HttpClientFactory: Send + Sync {
    /// Create a fresh client with its own session state
    fn create_client(&self) -> Result<Arc<dyn HttpClient>>;
}

/// Production [`HttpClient`] backed by `reqwest` with a private cookie store.
pub struct ReqwestClient {
    client: reqwest::Client,
}

impl ReqwestClient {
    /// Build a client from the HTTP settings
    ///
    /// # Errors
    /// Returns error if the underlying HTTP client cannot be created
    pub fn new(config: &HttpConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.as_str())
            .cookie_store(true)
            .build()
            .map_err(|e| Error::Other(format!("Failed to create HTTP client: {}", e)))?;
        Ok(Self { client })
    }
}

#[async_trait::async_trait]
impl HttpClient for ReqwestClient {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>> {
        let response = self.client.get(url).send().await.map_err(|e| {
            let message = if e.is_connect() {
                format!("connection failed: {}", e)
            } else {
                e.to_string()
            };
            Error::transport(url, message)
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::transport(url, format!("HTTP {}", status)));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| Error::transport(url, format!("failed to read body: {}", e)))?;
        Ok(body.to_vec())
    }
}

/// Production [`HttpClientFactory`] handing out [`ReqwestClient`]s.
#[derive(Clone, Debug, Default)]
pub struct ReqwestClientFactory {
    config: HttpConfig,
}

impl ReqwestClientFactory {
    /// Create a factory that builds clients with these settings
    pub fn new(config: HttpConfig) -> Self {
        Self { config }
    }
}

impl HttpClientFactory for ReqwestClientFactory {
    fn create_client(&self) -> Result<Arc<dyn HttpClient>> {
        Ok(Arc::new(ReqwestClient::new(&self.config)?))
    }
}
