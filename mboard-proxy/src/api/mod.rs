//! HTTP handlers for mboard-proxy
//!
//! Each adapter is a `POST /functions/<name>` taking a JSON body. Bodies are
//! read as raw bytes and decoded here so that malformed input gets the same
//! `{ "error": ... }` shape as every other failure.

pub mod catalog;
pub mod chat;
pub mod events;
pub mod health;
pub mod lyrics;
pub mod spotify;
pub mod vinyl;

pub use catalog::catalog_routes;
pub use chat::chat_routes;
pub use events::event_routes;
pub use health::health_routes;
pub use lyrics::lyrics_routes;
pub use spotify::spotify_routes;
pub use vinyl::vinyl_routes;

use axum::http::StatusCode;
use serde::de::DeserializeOwned;

use crate::error::{AdapterError, AdapterResult};

/// `OPTIONS` on an adapter route, answered even without preflight headers
pub(crate) async fn preflight() -> StatusCode {
    StatusCode::OK
}

/// Decode a request body; an empty body means "no parameters"
pub(crate) fn parse_body<T>(body: &[u8]) -> AdapterResult<T>
where
    T: DeserializeOwned + Default,
{
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(T::default());
    }

    serde_json::from_slice(body)
        .map_err(|e| AdapterError::InvalidRequest(format!("Invalid request body: {}", e)))
}

/// A parameter that must be present and non-blank
pub(crate) fn required(value: Option<String>, name: &str) -> AdapterResult<String> {
    non_blank(value).ok_or_else(|| AdapterError::InvalidRequest(format!("{} is required", name)))
}

pub(crate) fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
