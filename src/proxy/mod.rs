//! Proxy module: the embed sanitizing reverse proxy
//!
//! Each call runs validate, fetch, sanitize, respond and keeps nothing
//! between calls. A target URL must start with one of the approved prefixes
//! before any outbound request is made.

use std::sync::Arc;

use actix_web::http::header::{CACHE_CONTROL, CONTENT_TYPE};
use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use thiserror::Error;
use tracing::{error, info, warn};
use url::Url;

use crate::config::ProxyConfig;
use crate::constants::{defaults, headers, messages};
use crate::sanitizer::Sanitizer;
use crate::upstream::{UpstreamError, UpstreamFetch};

/// Terminal failures of a proxy call
///
/// The `Display` output is the exact plain-text body sent to the caller.
#[derive(Debug, Error)]
pub enum ProxyError {
    /// `url` missing or outside the allow-list
    #[error("Invalid or missing URL")]
    InvalidRequest,

    /// Upstream answered with a non-success status
    #[error("Upstream error: {0}")]
    Upstream(u16),

    /// Transport or unexpected failure; the detail is logged, never returned
    #[error("Proxy failed")]
    Failure(String),
}

impl ResponseError for ProxyError {
    fn status_code(&self) -> StatusCode {
        match self {
            ProxyError::InvalidRequest => StatusCode::BAD_REQUEST,
            ProxyError::Upstream(status) => {
                StatusCode::from_u16(*status).unwrap_or(StatusCode::BAD_GATEWAY)
            }
            ProxyError::Failure(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code())
            .insert_header((CONTENT_TYPE, headers::TEXT_CONTENT_TYPE))
            .insert_header((CACHE_CONTROL, headers::NO_STORE))
            .body(self.to_string())
    }
}

impl From<UpstreamError> for ProxyError {
    fn from(err: UpstreamError) -> Self {
        match err {
            UpstreamError::HttpError(status) => ProxyError::Upstream(status),
            other => ProxyError::Failure(other.to_string()),
        }
    }
}

/// Errors raised while building an allow-list from configuration
#[derive(Debug, Error)]
pub enum AllowListError {
    #[error("Invalid allow-list entry '{0}': {1}")]
    InvalidUrl(String, url::ParseError),

    #[error("Allow-list entry '{0}' must be an http(s) URL with a host")]
    UnsupportedUrl(String),

    #[error("Allow-list entry '{0}' must end with '/'")]
    MissingTrailingSlash(String),

    #[error("Allow-list is empty")]
    Empty,
}

/// One approved URL prefix and the Referer sent with it
#[derive(Debug, Clone, PartialEq)]
pub struct AllowedPrefix {
    prefix: String,
    referer: String,
}

impl AllowedPrefix {
    /// Parse a prefix such as `https://vidsrc.to/embed/`
    ///
    /// The Referer is the prefix's origin followed by `/`.
    pub fn parse(prefix: &str) -> Result<Self, AllowListError> {
        let parsed = Url::parse(prefix)
            .map_err(|e| AllowListError::InvalidUrl(prefix.to_string(), e))?;

        if !matches!(parsed.scheme(), "http" | "https") || !parsed.has_host() {
            return Err(AllowListError::UnsupportedUrl(prefix.to_string()));
        }

        // Prefixes end at a path boundary
        if !prefix.ends_with('/') {
            return Err(AllowListError::MissingTrailingSlash(prefix.to_string()));
        }

        Ok(Self {
            prefix: prefix.to_string(),
            referer: format!("{}/", parsed.origin().ascii_serialization()),
        })
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn referer(&self) -> &str {
        &self.referer
    }
}

/// Ordered set of approved prefixes
#[derive(Debug, Clone, PartialEq)]
pub struct AllowList {
    entries: Vec<AllowedPrefix>,
}

impl Default for AllowList {
    fn default() -> Self {
        Self {
            entries: vec![AllowedPrefix {
                prefix: defaults::ALLOWED_PREFIX.to_string(),
                referer: "https://vidsrc.to/".to_string(),
            }],
        }
    }
}

impl AllowList {
    /// Parse a comma separated list of prefixes
    pub fn parse(raw: &str) -> Result<Self, AllowListError> {
        let entries = raw
            .split(',')
            .map(str::trim)
            .filter(|entry| !entry.is_empty())
            .map(AllowedPrefix::parse)
            .collect::<Result<Vec<_>, _>>()?;

        if entries.is_empty() {
            return Err(AllowListError::Empty);
        }

        Ok(Self { entries })
    }

    /// First entry whose prefix the target starts with
    pub fn find(&self, target: &str) -> Option<&AllowedPrefix> {
        self.entries
            .iter()
            .find(|entry| target.starts_with(&entry.prefix))
    }

    pub fn matches(&self, target: &str) -> bool {
        self.find(target).is_some()
    }

    pub fn entries(&self) -> &[AllowedPrefix] {
        &self.entries
    }
}

/// The sanitizing proxy: allow-list, transport and sanitizer
pub struct EmbedProxy {
    allow_list: AllowList,
    upstream: Arc<dyn UpstreamFetch>,
    sanitizer: Sanitizer,
}

impl EmbedProxy {
    pub fn new(allow_list: AllowList, upstream: Arc<dyn UpstreamFetch>, sanitizer: Sanitizer) -> Self {
        Self {
            allow_list,
            upstream,
            sanitizer,
        }
    }

    /// Build a proxy from configuration with the given transport
    pub fn from_config(config: &ProxyConfig, upstream: Arc<dyn UpstreamFetch>) -> Self {
        Self::new(
            config.allow_list.clone(),
            upstream,
            Sanitizer::new(config.sanitize_mode),
        )
    }

    pub fn allow_list(&self) -> &AllowList {
        &self.allow_list
    }

    /// Check the target against the allow-list without touching the network
    pub fn validate<'a>(&self, target: Option<&'a str>) -> Result<(&'a str, &AllowedPrefix), ProxyError> {
        let target = target
            .filter(|t| !t.is_empty())
            .ok_or(ProxyError::InvalidRequest)?;

        match self.allow_list.find(target) {
            Some(entry) => Ok((target, entry)),
            None => {
                warn!("Rejected proxy target outside allow-list: {}", target);
                Err(ProxyError::InvalidRequest)
            }
        }
    }

    /// Fetch and sanitize one target, returning the cleaned HTML
    pub async fn fetch_sanitized(&self, target: Option<&str>) -> Result<String, ProxyError> {
        let (target, entry) = self.validate(target)?;

        info!("Proxying embed page: {}", target);
        let page = self
            .upstream
            .fetch(target, entry.referer())
            .await
            .map_err(|e| {
                match &e {
                    UpstreamError::HttpError(status) => error!("Upstream error: {}", status),
                    other => error!("{}: {}", messages::PROXY_FAILED, other),
                }
                ProxyError::from(e)
            })?;

        info!("Upstream answered {} ({} bytes)", page.status, page.html.len());
        Ok(self.sanitizer.sanitize(&page.html))
    }

    /// Run one proxy call and render the HTTP response
    pub async fn handle(&self, target: Option<&str>) -> HttpResponse {
        match self.fetch_sanitized(target).await {
            Ok(html) => HttpResponse::Ok()
                .insert_header((CONTENT_TYPE, headers::HTML_CONTENT_TYPE))
                .insert_header((CACHE_CONTROL, headers::NO_STORE))
                .body(html),
            Err(e) => e.error_response(),
        }
    }
}
