//! Catalog search (TheAudioDB)
//!
//! `POST /functions/audiodb-search`

use axum::{body::Bytes, extract::State, routing::post, Json, Router};
use serde::Deserialize;
use tracing::info;

use super::{parse_body, preflight, required};
use crate::error::{AdapterError, AdapterResult};
use crate::services::upstream::optional_id_string;
use crate::services::{AudioDbAction, AudioDbResponse, UpstreamError};
use crate::AppState;

/// Request body as sent by the client
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogRequest {
    pub action: Option<String>,
    pub query: Option<String>,
    #[serde(default, deserialize_with = "optional_id_string")]
    pub artist_id: Option<String>,
    #[serde(default, deserialize_with = "optional_id_string")]
    pub album_id: Option<String>,
}

/// `searchAlbum` packs both names into `query` as a JSON string
#[derive(Deserialize)]
struct AlbumQuery {
    artist: String,
    album: String,
}

impl TryFrom<CatalogRequest> for AudioDbAction {
    type Error = AdapterError;

    fn try_from(request: CatalogRequest) -> Result<Self, Self::Error> {
        match request.action.as_deref() {
            Some("searchArtist") => Ok(AudioDbAction::SearchArtist {
                query: required(request.query, "query")?,
            }),
            Some("getAlbumsByArtist") => Ok(AudioDbAction::AlbumsByArtist {
                artist_id: required(request.artist_id, "artistId")?,
            }),
            Some("getTracksByAlbum") => Ok(AudioDbAction::TracksByAlbum {
                album_id: required(request.album_id, "albumId")?,
            }),
            Some("searchAlbum") => {
                let raw = required(request.query, "query")?;
                let parsed: AlbumQuery = serde_json::from_str(&raw).map_err(|_| {
                    AdapterError::InvalidRequest(
                        "query must be a JSON object with artist and album".to_string(),
                    )
                })?;
                Ok(AudioDbAction::SearchAlbum {
                    artist: parsed.artist,
                    album: parsed.album,
                })
            }
            other => Err(AdapterError::InvalidAction(other.unwrap_or_default().to_string())),
        }
    }
}

/// POST /functions/audiodb-search
pub async fn audiodb_search(
    State(state): State<AppState>,
    body: Bytes,
) -> AdapterResult<Json<AudioDbResponse>> {
    let request: CatalogRequest = parse_body(&body)?;
    let action = AudioDbAction::try_from(request)?;

    match state.audiodb.fetch(&action).await {
        Ok(response) => {
            info!(action = action.name(), "AudioDB lookup complete");
            Ok(Json(response))
        }
        Err(UpstreamError::NotFound) => Ok(Json(AudioDbResponse::empty_for(&action))),
        Err(e) => Err(AdapterError::from_upstream("AudioDB", e)),
    }
}

pub fn catalog_routes() -> Router<AppState> {
    Router::new().route(
        "/functions/audiodb-search",
        post(audiodb_search).options(preflight),
    )
}
