//! Global error handling module for the TuklasVerse embed proxy
//!
//! This module provides a unified error type for the JSON endpoints and
//! converts it to HTTP responses with a consistent JSON structure. The proxy
//! endpoint itself answers in plain text; see [`crate::proxy::ProxyError`].

use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use thiserror::Error;

use crate::models::ApiError;
use crate::proxy::AllowListError;
use crate::upstream::UpstreamError;

/// Application-wide error type for the JSON endpoints
#[derive(Debug, Error)]
pub enum AppError {
    /// Outbound fetch errors (network, HTTP, body read)
    #[error("Upstream error: {0}")]
    Upstream(#[from] UpstreamError),

    /// Allow-list configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] AllowListError),

    /// Validation errors (bad request)
    #[error("Validation error: {0}")]
    Validation(String),

    /// Resource not found errors
    #[error("Not found: {0}")]
    NotFound(String),

    /// Internal server errors
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Create a validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        AppError::Validation(msg.into())
    }

    /// Create a not found error
    pub fn not_found(msg: impl Into<String>) -> Self {
        AppError::NotFound(msg.into())
    }

    /// Create an internal error
    pub fn internal(msg: impl Into<String>) -> Self {
        AppError::Internal(msg.into())
    }

    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Upstream(UpstreamError::HttpError(_)) => StatusCode::BAD_GATEWAY,
            AppError::Upstream(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get a user-friendly error message
    pub fn user_message(&self) -> String {
        match self {
            AppError::Validation(msg) => msg.clone(),
            AppError::NotFound(msg) => msg.clone(),
            AppError::Internal(msg) => msg.clone(),

            AppError::Upstream(upstream_err) => match upstream_err {
                UpstreamError::NetworkError(_) => "Failed to connect to upstream".to_string(),
                UpstreamError::HttpError(status) => {
                    format!("Upstream returned error status: {}", status)
                }
                UpstreamError::ResponseError(_) => "Failed to read upstream response".to_string(),
                UpstreamError::ClientError(_) => "HTTP client unavailable".to_string(),
            },

            AppError::Config(_) => "Server misconfigured".to_string(),
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        self.status_code()
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        let error_response = ApiError::new(self.user_message());

        HttpResponse::build(status).json(error_response)
    }
}

/// Result type alias for operations that can fail with AppError
pub type AppResult<T> = Result<T, AppError>;
