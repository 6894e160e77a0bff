//! Error types for mboard-proxy
//!
//! Every adapter failure ends up as a JSON `{ "error": "<message>" }` body.
//! Adapters with a soft-failure policy (lyrics, vinyl) build their own 200
//! payloads instead of returning these.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::services::UpstreamError;

/// Adapter error taxonomy
#[derive(Debug, Error)]
pub enum AdapterError {
    /// Required upstream credential is missing (500)
    #[error("{0}")]
    NotConfigured(String),

    /// Upstream reported the resource does not exist (404)
    #[error("{0}")]
    NotFound(String),

    /// Upstream returned a non-2xx status, failed to connect, or sent a body
    /// that does not match its DTO
    #[error("{message}")]
    UpstreamFailure { status: StatusCode, message: String },

    /// Unknown action tag; raised before any network call (400)
    #[error("Invalid action: {0}")]
    InvalidAction(String),

    /// Malformed body or missing parameter (400)
    #[error("{0}")]
    InvalidRequest(String),
}

impl AdapterError {
    /// Upstream failure surfaced as a generic 500
    pub fn upstream(message: impl Into<String>) -> Self {
        AdapterError::UpstreamFailure {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: message.into(),
        }
    }

    /// Default presentation of an upstream failure for `service`, always 500
    ///
    /// Adapters that need a different message or status for a class (404 as
    /// empty results, soft failures) match on [`UpstreamError`] first.
    pub fn from_upstream(service: &str, err: UpstreamError) -> Self {
        match err {
            UpstreamError::NotConfigured(_) => {
                AdapterError::NotConfigured(format!("{} API not configured", service))
            }
            UpstreamError::NotFound => AdapterError::NotFound(format!("{} resource not found", service)),
            UpstreamError::Status { status, .. } => {
                AdapterError::upstream(format!("{} API error: HTTP {}", service, status))
            }
            UpstreamError::Auth(_) => {
                AdapterError::upstream(format!("Failed to authenticate with {}", service))
            }
            UpstreamError::Shape(_) => {
                AdapterError::upstream(format!("Unexpected response from {}", service))
            }
            UpstreamError::Transport(_) | UpstreamError::InvalidUrl(_) => {
                AdapterError::upstream(format!("{} request failed", service))
            }
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AdapterError::NotConfigured(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AdapterError::NotFound(_) => StatusCode::NOT_FOUND,
            AdapterError::UpstreamFailure { status, .. } => *status,
            AdapterError::InvalidAction(_) | AdapterError::InvalidRequest(_) => {
                StatusCode::BAD_REQUEST
            }
        }
    }
}

impl IntoResponse for AdapterError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = Json(json!({ "error": self.to_string() }));

        (status, body).into_response()
    }
}

/// Result type for adapter handlers
pub type AdapterResult<T> = Result<T, AdapterError>;
