//! Spotify adapters: search, new releases, album detail
//!
//! All three share one client-credentials token (see
//! [`crate::services::SpotifyClient::access_token`]).

use axum::{body::Bytes, extract::State, routing::post, Json, Router};
use serde::Deserialize;
use tracing::{info, warn};

use super::{non_blank, parse_body, preflight, required};
use crate::error::{AdapterError, AdapterResult};
use crate::services::spotify_client::DEFAULT_SEARCH_TYPES;
use crate::services::upstream::optional_id_string;
use crate::services::{AlbumDetail, NewReleases, SearchResults, UpstreamError};
use crate::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct SearchRequest {
    pub query: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlbumRequest {
    #[serde(default, deserialize_with = "optional_id_string")]
    pub album_id: Option<String>,
}

/// Present a Spotify failure, `fallback` naming the operation that failed
fn spotify_error(err: UpstreamError, fallback: &str) -> AdapterError {
    match err {
        UpstreamError::NotConfigured(_) => {
            AdapterError::NotConfigured("Spotify API not configured".to_string())
        }
        UpstreamError::Auth(_) => {
            AdapterError::upstream("Failed to authenticate with Spotify")
        }
        UpstreamError::Shape(_) => AdapterError::upstream("Unexpected response from Spotify"),
        other => {
            warn!(error = %other, "{}", fallback);
            AdapterError::upstream(fallback)
        }
    }
}

/// POST /functions/spotify-search
pub async fn spotify_search(
    State(state): State<AppState>,
    body: Bytes,
) -> AdapterResult<Json<SearchResults>> {
    let request: SearchRequest = parse_body(&body)?;
    let query = required(request.query, "Query")?;
    let types = non_blank(request.kind).unwrap_or_else(|| DEFAULT_SEARCH_TYPES.to_string());

    match state.spotify.search(&query, &types).await {
        Ok(results) => {
            info!(
                albums = results.albums.len(),
                tracks = results.tracks.len(),
                artists = results.artists.len(),
                "Spotify search complete"
            );
            Ok(Json(results))
        }
        Err(UpstreamError::NotFound) => Ok(Json(SearchResults::default())),
        Err(e) => Err(spotify_error(e, "Spotify search failed")),
    }
}

/// POST /functions/spotify-recommendations
///
/// Request body is ignored.
pub async fn spotify_recommendations(
    State(state): State<AppState>,
) -> AdapterResult<Json<NewReleases>> {
    match state.spotify.new_releases().await {
        Ok(releases) => Ok(Json(releases)),
        Err(UpstreamError::NotFound) => Ok(Json(NewReleases::default())),
        Err(e) => Err(spotify_error(e, "Failed to fetch recommendations")),
    }
}

/// POST /functions/spotify-album-details
pub async fn spotify_album_details(
    State(state): State<AppState>,
    body: Bytes,
) -> AdapterResult<Json<AlbumDetail>> {
    let request: AlbumRequest = parse_body(&body)?;
    let album_id = non_blank(request.album_id)
        .ok_or_else(|| AdapterError::InvalidRequest("Album ID is required".to_string()))?;

    match state.spotify.album(&album_id).await {
        Ok(album) => Ok(Json(album)),
        Err(UpstreamError::NotFound) => Err(AdapterError::NotFound("Album not found".to_string())),
        Err(e) => Err(spotify_error(e, "Failed to fetch album details")),
    }
}

pub fn spotify_routes() -> Router<AppState> {
    Router::new()
        .route("/functions/spotify-search", post(spotify_search).options(preflight))
        .route(
            "/functions/spotify-recommendations",
            post(spotify_recommendations).options(preflight),
        )
        .route("/functions/spotify-album-details", post(spotify_album_details).options(preflight))
}
