//! Vinyl pressings (Discogs)
//!
//! Soft-failure adapter: the album page renders whatever comes back, so a
//! missing token answers 200 with an `error` field and empty results.

use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::{non_blank, parse_body, preflight};
use crate::services::discogs_client::VinylRelease;
use crate::services::{UpstreamError, VinylResults};
use crate::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct VinylRequest {
    pub artist: Option<String>,
    pub album: Option<String>,
}

/// Error body that still carries an empty `results` list
#[derive(Debug, Serialize)]
struct VinylFailure {
    error: String,
    results: Vec<VinylRelease>,
}

fn failure(status: StatusCode, message: &str) -> Response {
    let body = VinylFailure {
        error: message.to_string(),
        results: Vec::new(),
    };
    (status, Json(body)).into_response()
}

/// POST /functions/discogs-vinyl
pub async fn discogs_vinyl(State(state): State<AppState>, body: Bytes) -> Response {
    let request: VinylRequest = match parse_body(&body) {
        Ok(request) => request,
        Err(e) => return e.into_response(),
    };

    let (Some(artist), Some(album)) = (non_blank(request.artist), non_blank(request.album)) else {
        return failure(StatusCode::BAD_REQUEST, "Artist and album are required");
    };

    match state.discogs.search_vinyl(&artist, &album).await {
        Ok(results) => {
            info!(artist = %artist, album = %album, found = results.results.len(), "Discogs search complete");
            Json(results).into_response()
        }
        Err(UpstreamError::NotConfigured(_)) => {
            warn!("Discogs token not configured, returning empty vinyl results");
            failure(StatusCode::OK, "Discogs API not configured")
        }
        Err(UpstreamError::NotFound) => Json(VinylResults::default()).into_response(),
        Err(e) => {
            warn!(error = %e, "Discogs search failed");
            failure(StatusCode::INTERNAL_SERVER_ERROR, "Failed to fetch vinyl data")
        }
    }
}

pub fn vinyl_routes() -> Router<AppState> {
    Router::new().route(
        "/functions/discogs-vinyl",
        post(discogs_vinyl).options(preflight),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failure_body_shape() {
        let body = VinylFailure {
            error: "Discogs API not configured".into(),
            results: Vec::new(),
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["error"], "Discogs API not configured");
        assert_eq!(json["results"], serde_json::json!([]));
    }
}
