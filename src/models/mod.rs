//! Data models for the TuklasVerse embed proxy
//!
//! JSON envelopes and payloads used by the non-proxy endpoints.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

pub use crate::embed::{EmbedKind, EmbedRequest, EmbedSource};

/// Generic API response wrapper for successful responses
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ApiResponse<T> {
    /// Whether the operation was successful (always true for this type)
    pub success: bool,
    /// The response payload
    pub data: T,
    /// ISO timestamp of when the response was built
    pub timestamp: String,
}

impl<T> ApiResponse<T> {
    /// Create a new successful API response with the current timestamp
    pub fn new(data: T) -> Self {
        Self {
            success: true,
            data,
            timestamp: Utc::now().to_rfc3339(),
        }
    }
}

/// API error response
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ApiError {
    /// Whether the operation was successful (always false for errors)
    pub success: bool,
    /// Error message describing what went wrong
    pub error: String,
    /// ISO timestamp of when the error occurred
    pub timestamp: String,
}

impl ApiError {
    /// Create a new API error response with the current timestamp
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: error.into(),
            timestamp: Utc::now().to_rfc3339(),
        }
    }
}

/// Identifiers echoed back by the season endpoint
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SeasonInfo {
    /// TMDB TV series id, as given in the path
    pub tv_id: String,
    /// Season number, as given in the path
    pub season_number: String,
    pub message: String,
}

/// Body of the health check endpoint
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, ToSchema)]
pub struct HealthStatus {
    pub status: String,
    pub timestamp: String,
}

impl HealthStatus {
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: Utc::now().to_rfc3339(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_response_serialization() {
        let response = ApiResponse::new(vec!["item1", "item2"]);

        let json = serde_json::to_string(&response).unwrap();
        assert!(json.contains("\"success\":true"));
        assert!(json.contains("\"data\""));
        assert!(json.contains("\"timestamp\""));
    }

    #[test]
    fn test_api_error_serialization() {
        let error = ApiError::new("Something went wrong");

        let json = serde_json::to_string(&error).unwrap();
        assert!(json.contains("\"success\":false"));
        assert!(json.contains("\"error\":\"Something went wrong\""));
        assert!(json.contains("\"timestamp\""));
    }

    #[test]
    fn test_season_info_serialization() {
        let info = SeasonInfo {
            tv_id: "1399".to_string(),
            season_number: "2".to_string(),
            message: "Data fetched successfully".to_string(),
        };

        let json = serde_json::to_string(&info).unwrap();
        assert!(json.contains("\"tvId\":\"1399\""));
        assert!(json.contains("\"seasonNumber\":\"2\""));
        assert!(json.contains("\"message\":\"Data fetched successfully\""));
    }

    #[test]
    fn test_embed_source_serialization() {
        let source = EmbedSource {
            kind: EmbedKind::Tv,
            src: "https://vidsrc.xyz/embed/tv/1/1-1?".to_string(),
            proxied_src: Some("/api/proxy/vidsrc?url=x".to_string()),
        };

        let json = serde_json::to_string(&source).unwrap();
        assert!(json.contains("\"kind\":\"tv\""));
        assert!(json.contains("\"proxiedSrc\""));
    }
}
