//! Gateway error types.
//!
//! Most of these never reach a client: transform, modifier and resolution
//! failures are collected next to the value they were computing and logged
//! as warnings. Only the limiter rejections are rendered directly.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Errors produced while executing an endpoint.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GatewayError {
    /// A dynamic expression did not resolve against the request or history.
    #[error("value not found for expression {0}")]
    ValueNotFound(String),

    /// A modifier was skipped because its configuration cannot apply.
    #[error("invalid {target} modifier {action} on key {key:?}: {reason}")]
    InvalidModifier {
        target: &'static str,
        action: String,
        key: String,
        reason: String,
    },

    /// A JSON path operation failed.
    #[error("json path {path:?}: {reason}")]
    JsonPath { path: String, reason: String },

    /// Body representation conversion failed.
    #[error("content conversion from {from} to {to} failed: {reason}")]
    Conversion {
        from: String,
        to: String,
        reason: String,
    },

    /// Body compression or decompression failed.
    #[error("content encoding {encoding} failed: {reason}")]
    Encoding { encoding: String, reason: String },

    /// The backend could not be reached or returned an unreadable response.
    #[error("backend request to {url} failed: {reason}")]
    Transport { url: String, reason: String },

    /// The backend did not answer before the endpoint deadline.
    #[error("backend request to {url} timed out")]
    Timeout { url: String },

    /// The cache store has no live entry for the key.
    #[error("cache entry not found")]
    CacheNotFound,

    /// The cache store failed.
    #[error("cache store error: {0}")]
    Store(String),

    /// A beforeware or afterware key is missing from the middleware registry.
    #[error("middleware {0:?} is not configured")]
    UnknownMiddleware(String),

    #[error("rate limit exceeded for client {0}")]
    RateLimited(String),

    #[error("request body exceeds limit of {limit} bytes")]
    PayloadTooLarge { limit: usize },

    #[error("request header of {size} bytes exceeds limit of {limit} bytes")]
    HeaderTooLarge { size: usize, limit: usize },
}

impl GatewayError {
    pub(crate) fn invalid_modifier(
        target: &'static str,
        action: impl std::fmt::Display,
        key: &str,
        reason: impl Into<String>,
    ) -> Self {
        GatewayError::InvalidModifier {
            target,
            action: action.to_string(),
            key: key.to_string(),
            reason: reason.into(),
        }
    }

    pub(crate) fn json_path(path: &str, reason: impl Into<String>) -> Self {
        GatewayError::JsonPath {
            path: path.to_string(),
            reason: reason.into(),
        }
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let (status, code) = match &self {
            GatewayError::RateLimited(_) => (StatusCode::TOO_MANY_REQUESTS, "RATE_LIMIT_EXCEEDED"),
            GatewayError::PayloadTooLarge { .. } => (StatusCode::PAYLOAD_TOO_LARGE, "PAYLOAD_TOO_LARGE"),
            GatewayError::HeaderTooLarge { .. } => (
                StatusCode::REQUEST_HEADER_FIELDS_TOO_LARGE,
                "HEADER_TOO_LARGE",
            ),
            GatewayError::Encoding { .. } => (StatusCode::BAD_REQUEST, "INVALID_CONTENT_ENCODING"),
            GatewayError::Timeout { .. } => (StatusCode::GATEWAY_TIMEOUT, "GATEWAY_TIMEOUT"),
            GatewayError::Transport { .. } => (StatusCode::BAD_GATEWAY, "BAD_GATEWAY"),
            _ => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": self.to_string(),
            }
        }));

        (status, body).into_response()
    }
}

/// Render a list of non-fatal errors for a single log field.
pub(crate) fn join_errors(errors: &[GatewayError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}
