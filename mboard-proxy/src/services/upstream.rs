//! Shared upstream plumbing
//!
//! Every adapter issues exactly one data request per invocation (plus a token
//! exchange for Spotify). Status classification lives here so adapters only
//! decide how each class is presented to the caller.

use reqwest::{Client, Request, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, error, warn};

pub const USER_AGENT: &str = concat!("Musicboard/", env!("CARGO_PKG_VERSION"));

/// Upstream call failures, before adapter-specific presentation
#[derive(Debug, Error)]
pub enum UpstreamError {
    #[error("{0} credentials not configured")]
    NotConfigured(&'static str),

    #[error("Invalid upstream URL: {0}")]
    InvalidUrl(String),

    #[error("Network error: {0}")]
    Transport(String),

    #[error("Not found")]
    NotFound,

    #[error("API error {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Unexpected response: {0}")]
    Shape(String),

    #[error("Authentication failed: {0}")]
    Auth(String),
}

/// Build the HTTP client shared by every adapter
pub fn http_client(timeout: Duration) -> Result<Client, UpstreamError> {
    Client::builder()
        .user_agent(USER_AGENT)
        .timeout(timeout)
        .build()
        .map_err(|e| UpstreamError::Transport(e.to_string()))
}

/// Join path segments onto a base URL
///
/// Each segment is percent-encoded on its own, so user input such as
/// `AC/DC` stays a single segment.
pub fn endpoint(base: &str, segments: &[&str]) -> Result<Url, UpstreamError> {
    let mut url = Url::parse(base).map_err(|e| UpstreamError::InvalidUrl(format!("{}: {}", base, e)))?;

    url.path_segments_mut()
        .map_err(|_| UpstreamError::InvalidUrl(base.to_string()))?
        .pop_if_empty()
        .extend(segments);

    Ok(url)
}

/// Execute a request and decode the JSON body into `T`
///
/// 404 becomes [`UpstreamError::NotFound`]; any other non-2xx keeps its status.
pub async fn fetch_json<T>(
    http: &Client,
    request: Request,
    service: &'static str,
) -> Result<T, UpstreamError>
where
    T: DeserializeOwned,
{
    debug!(service, url = %request.url(), method = %request.method(), "Calling upstream");

    let response = http.execute(request).await.map_err(|e| {
        error!(service, error = %e, "Upstream request failed");
        UpstreamError::Transport(e.to_string())
    })?;

    let status = response.status();

    if status == StatusCode::NOT_FOUND {
        debug!(service, "Upstream returned 404");
        return Err(UpstreamError::NotFound);
    }

    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        error!(service, status = status.as_u16(), body = %body, "Upstream error");
        return Err(UpstreamError::Status {
            status: status.as_u16(),
            body,
        });
    }

    response.json::<T>().await.map_err(|e| {
        warn!(service, error = %e, "Upstream body did not match expected shape");
        UpstreamError::Shape(e.to_string())
    })
}

/// Accept an id sent either as a JSON string or a JSON number
pub fn id_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Id {
        Text(String),
        Number(i64),
    }

    Ok(match Id::deserialize(deserializer)? {
        Id::Text(s) => s,
        Id::Number(n) => n.to_string(),
    })
}

/// Optional variant of [`id_string`] for request fields
pub fn optional_id_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    struct Wrapped(#[serde(deserialize_with = "id_string")] String);

    Ok(Option::<Wrapped>::deserialize(deserializer)?.map(|w| w.0))
}
