//! Lyrics metadata (Genius)
//!
//! Soft-failure adapter: apart from a bad request, every failure answers 200
//! with `{ "error": ..., "response": { "hits": [] } }` so the lyrics panel can
//! render a message instead of breaking the page.

use axum::{
    body::Bytes,
    extract::State,
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use super::{parse_body, preflight, required};
use crate::error::{AdapterError, AdapterResult};
use crate::services::upstream::optional_id_string;
use crate::services::{GeniusAction, UpstreamError};
use crate::AppState;

pub const NOT_CONFIGURED: &str =
    "Lyrics service not configured. Please add GENIUS_API_TOKEN to use this feature.";
pub const SONG_NOT_FOUND: &str = "Song not found";
pub const INVALID_TOKEN: &str =
    "Lyrics service requires valid API token. Please configure GENIUS_API_TOKEN.";
pub const UNABLE_TO_FETCH: &str = "Unable to fetch lyrics";
pub const UNAVAILABLE: &str = "Lyrics service temporarily unavailable";

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LyricsRequest {
    pub action: Option<String>,
    pub query: Option<String>,
    #[serde(default, deserialize_with = "optional_id_string")]
    pub song_id: Option<String>,
}

impl TryFrom<LyricsRequest> for GeniusAction {
    type Error = AdapterError;

    fn try_from(request: LyricsRequest) -> Result<Self, Self::Error> {
        match request.action.as_deref() {
            Some("search") => Ok(GeniusAction::Search {
                query: required(request.query, "query")?,
            }),
            Some("getSong") => Ok(GeniusAction::GetSong {
                song_id: required(request.song_id, "songId")?,
            }),
            other => Err(AdapterError::InvalidAction(other.unwrap_or_default().to_string())),
        }
    }
}

#[derive(Debug, Serialize)]
struct EmptyHits {
    hits: Vec<()>,
}

#[derive(Debug, Serialize)]
struct SoftFailure {
    error: &'static str,
    response: EmptyHits,
}

/// Soft message for an upstream failure
fn soft_message(err: &UpstreamError) -> &'static str {
    match err {
        UpstreamError::NotConfigured(_) => NOT_CONFIGURED,
        UpstreamError::NotFound => SONG_NOT_FOUND,
        UpstreamError::Status { status: 401, .. } => INVALID_TOKEN,
        UpstreamError::Status { .. } | UpstreamError::Shape(_) => UNABLE_TO_FETCH,
        UpstreamError::Transport(_) | UpstreamError::InvalidUrl(_) | UpstreamError::Auth(_) => {
            UNAVAILABLE
        }
    }
}

fn soft_failure(message: &'static str) -> Response {
    Json(SoftFailure {
        error: message,
        response: EmptyHits { hits: Vec::new() },
    })
    .into_response()
}

async fn lookup(state: &AppState, body: &[u8]) -> AdapterResult<Response> {
    if !state.genius.is_configured() {
        warn!("Genius token not configured");
        return Ok(soft_failure(NOT_CONFIGURED));
    }

    let request: LyricsRequest = parse_body(body)?;
    let action = GeniusAction::try_from(request)?;

    match state.genius.fetch(&action).await {
        Ok(response) => {
            info!(action = action.name(), "Genius lookup complete");
            Ok(Json(response).into_response())
        }
        Err(e) => {
            if let UpstreamError::Status { status: 401, .. } = e {
                error!("Genius rejected the configured API token");
            }
            Ok(soft_failure(soft_message(&e)))
        }
    }
}

/// POST /functions/genius-lyrics
pub async fn genius_lyrics(State(state): State<AppState>, body: Bytes) -> Response {
    match lookup(&state, &body).await {
        Ok(response) => response,
        Err(e) => e.into_response(),
    }
}

pub fn lyrics_routes() -> Router<AppState> {
    Router::new().route(
        "/functions/genius-lyrics",
        post(genius_lyrics).options(preflight),
    )
}
