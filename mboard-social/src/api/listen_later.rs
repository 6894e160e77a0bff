//! "Listen later" queue

use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use chrono::Utc;
use mboard_common::db::listen_later;
use mboard_common::models::ListenLaterEntry;
use serde::{Deserialize, Serialize};

use super::identity::CurrentUser;
use super::json::ApiJson;
use crate::error::{ApiError, ApiResult};
use crate::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveRequest {
    pub album_id: String,
    pub album_name: Option<String>,
    pub artist_name: Option<String>,
    pub album_image: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SaveResponse {
    /// `false` when the album was already saved
    pub added: bool,
}

/// POST /listen-later
///
/// 201 when newly saved, 200 when it was already there.
pub async fn save(
    State(state): State<AppState>,
    user: CurrentUser,
    ApiJson(request): ApiJson<SaveRequest>,
) -> ApiResult<(StatusCode, Json<SaveResponse>)> {
    if request.album_id.trim().is_empty() {
        return Err(ApiError::BadRequest("albumId is required".to_string()));
    }

    let entry = ListenLaterEntry {
        user_id: user.0,
        album_id: request.album_id,
        album_name: request.album_name,
        artist_name: request.artist_name,
        album_image: request.album_image,
        created_at: Utc::now(),
    };

    let added = listen_later::add_listen_later(&state.db, &entry).await?;
    let status = if added { StatusCode::CREATED } else { StatusCode::OK };

    Ok((status, Json(SaveResponse { added })))
}

/// GET /listen-later
pub async fn list(
    State(state): State<AppState>,
    user: CurrentUser,
) -> ApiResult<Json<Vec<ListenLaterEntry>>> {
    Ok(Json(listen_later::listen_later_for_user(&state.db, &user.0).await?))
}

pub fn listen_later_routes() -> Router<AppState> {
    Router::new().route("/listen-later", get(list).post(save))
}
