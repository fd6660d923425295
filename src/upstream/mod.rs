//! Upstream module for fetching embed pages from the approved host
//!
//! This module provides the outbound HTTP client used by the proxy. The
//! client sits behind the [`UpstreamFetch`] trait so handlers can be driven
//! by a mock transport in tests.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{REFERER, USER_AGENT};
use reqwest::{Client, ClientBuilder};
use thiserror::Error;

use crate::config::ProxyConfig;

/// Errors that can occur while fetching an upstream page
#[derive(Error, Debug)]
pub enum UpstreamError {
    /// Network-related errors (connection timeout, DNS failure, etc.)
    #[error("Failed to connect to upstream: {0}")]
    NetworkError(String),

    /// Upstream answered with a non-success status code
    #[error("Upstream returned status {0}")]
    HttpError(u16),

    /// Error reading response body
    #[error("Failed to read upstream body: {0}")]
    ResponseError(String),

    /// The HTTP client could not be constructed
    #[error("Failed to build HTTP client: {0}")]
    ClientError(String),
}

/// Result of a successful upstream fetch
#[derive(Debug, Clone, PartialEq)]
pub struct UpstreamPage {
    /// The full response body as text
    pub html: String,
    /// The HTTP status code
    pub status: u16,
}

/// Outbound transport used by the proxy
///
/// Implementations perform exactly one GET per call and never retry.
#[async_trait]
pub trait UpstreamFetch: Send + Sync {
    async fn fetch(&self, url: &str, referer: &str) -> Result<UpstreamPage, UpstreamError>;
}

/// reqwest-backed upstream client
pub struct HttpUpstream {
    client: Client,
    user_agent: String,
}

impl HttpUpstream {
    /// Create a client from the proxy settings
    pub fn new(config: &ProxyConfig) -> Result<Self, UpstreamError> {
        Self::with_builder(Client::builder(), config)
    }

    fn with_builder(mut builder: ClientBuilder, config: &ProxyConfig) -> Result<Self, UpstreamError> {
        if let Some(secs) = config.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }

        let client = builder
            .build()
            .map_err(|e| UpstreamError::ClientError(e.to_string()))?;

        Ok(Self {
            client,
            user_agent: config.user_agent.clone(),
        })
    }

    /// User-Agent sent with every request
    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }
}

#[async_trait]
impl UpstreamFetch for HttpUpstream {
    async fn fetch(&self, url: &str, referer: &str) -> Result<UpstreamPage, UpstreamError> {
        let response = self
            .client
            .get(url)
            .header(USER_AGENT, self.user_agent.as_str())
            .header(REFERER, referer)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    UpstreamError::NetworkError("Connection timeout".to_string())
                } else if e.is_connect() {
                    UpstreamError::NetworkError("Failed to connect to server".to_string())
                } else {
                    UpstreamError::NetworkError(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(UpstreamError::HttpError(status.as_u16()));
        }

        let html = response
            .text()
            .await
            .map_err(|e| UpstreamError::ResponseError(e.to_string()))?;

        Ok(UpstreamPage {
            html,
            status: status.as_u16(),
        })
    }
}
