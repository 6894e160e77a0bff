//! Rating endpoints
//!
//! Summaries are folded from the rating rows on every read; nothing derived
//! is stored.

use axum::{
    extract::{Path, State},
    routing::{get, post},
    Json, Router,
};
use mboard_common::db::ratings;
use mboard_common::validation::require_rating;
use mboard_common::models::{Rating, RatingContext, TargetType};
use mboard_common::{RatingSummary, TrackRatings};
use serde::{Deserialize, Serialize};
use tracing::info;

use super::identity::{CurrentUser, MaybeUser};
use super::json::ApiJson;
use crate::error::{ApiError, ApiResult};
use crate::AppState;

/// Maximum track ids in one summary request
const MAX_TRACK_IDS: usize = 200;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RateRequest {
    /// Required; `None` is reported as a validation error
    pub rating: Option<f64>,
    #[serde(flatten)]
    pub context: RatingContext,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackSummaryRequest {
    pub track_ids: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct TrackSummaryResponse {
    pub tracks: TrackRatings,
}

async fn summary(
    state: &AppState,
    target_type: TargetType,
    target_id: &str,
    caller: &MaybeUser,
) -> ApiResult<Json<RatingSummary>> {
    let summary =
        ratings::target_summary(&state.db, target_id, target_type, caller.as_deref()).await?;
    Ok(Json(summary))
}

async fn rate(
    state: &AppState,
    user: &CurrentUser,
    target_type: TargetType,
    target_id: &str,
    request: &RateRequest,
) -> ApiResult<Json<Rating>> {
    let rating = require_rating(request.rating)?;
    let stored = ratings::upsert_rating(
        &state.db,
        &user.0,
        target_id,
        target_type,
        rating,
        &request.context,
    )
    .await?;

    info!(
        user_id = %user.0,
        target_id,
        target_type = %target_type,
        rating = stored.rating,
        "Rating saved"
    );
    Ok(Json(stored))
}

/// GET /ratings/album/:target_id
pub async fn get_album_rating(
    State(state): State<AppState>,
    Path(target_id): Path<String>,
    caller: MaybeUser,
) -> ApiResult<Json<RatingSummary>> {
    summary(&state, TargetType::Album, &target_id, &caller).await
}

/// GET /ratings/track/:target_id
pub async fn get_track_rating(
    State(state): State<AppState>,
    Path(target_id): Path<String>,
    caller: MaybeUser,
) -> ApiResult<Json<RatingSummary>> {
    summary(&state, TargetType::Track, &target_id, &caller).await
}

/// PUT /ratings/album/:target_id
pub async fn rate_album(
    State(state): State<AppState>,
    Path(target_id): Path<String>,
    user: CurrentUser,
    ApiJson(request): ApiJson<RateRequest>,
) -> ApiResult<Json<Rating>> {
    rate(&state, &user, TargetType::Album, &target_id, &request).await
}

/// PUT /ratings/track/:target_id
pub async fn rate_track(
    State(state): State<AppState>,
    Path(target_id): Path<String>,
    user: CurrentUser,
    ApiJson(request): ApiJson<RateRequest>,
) -> ApiResult<Json<Rating>> {
    rate(&state, &user, TargetType::Track, &target_id, &request).await
}

/// POST /ratings/tracks/summary
///
/// Per-track `{count, average}` for an album's track list; tracks nobody
/// rated are absent from the map.
pub async fn track_summary(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<TrackSummaryRequest>,
) -> ApiResult<Json<TrackSummaryResponse>> {
    if request.track_ids.len() > MAX_TRACK_IDS {
        return Err(ApiError::BadRequest(format!(
            "At most {} track ids per request",
            MAX_TRACK_IDS
        )));
    }

    let tracks = ratings::track_averages(&state.db, &request.track_ids).await?;
    Ok(Json(TrackSummaryResponse { tracks }))
}

pub fn rating_routes() -> Router<AppState> {
    Router::new()
        .route("/ratings/album/:target_id", get(get_album_rating).put(rate_album))
        .route("/ratings/track/:target_id", get(get_track_rating).put(rate_track))
        .route("/ratings/tracks/summary", post(track_summary))
}
