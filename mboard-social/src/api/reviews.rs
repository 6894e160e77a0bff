//! Review endpoints

use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};
use mboard_common::db::reviews;
use mboard_common::models::Review;
use serde::Deserialize;
use tracing::info;

use super::identity::CurrentUser;
use super::json::ApiJson;
use crate::error::ApiResult;
use crate::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewRequest {
    /// Required; `None` is reported as a validation error
    pub rating: Option<f64>,
    pub review_text: String,
}

/// GET /reviews/:target_id
pub async fn list_reviews(
    State(state): State<AppState>,
    Path(target_id): Path<String>,
) -> ApiResult<Json<Vec<Review>>> {
    Ok(Json(reviews::reviews_for_target(&state.db, &target_id).await?))
}

/// PUT /reviews/:target_id
pub async fn put_review(
    State(state): State<AppState>,
    Path(target_id): Path<String>,
    user: CurrentUser,
    ApiJson(request): ApiJson<ReviewRequest>,
) -> ApiResult<Json<Review>> {
    let review = reviews::upsert_review(
        &state.db,
        &user.0,
        &target_id,
        request.rating,
        &request.review_text,
    )
    .await?;

    info!(user_id = %user.0, target_id = %target_id, "Review saved");
    Ok(Json(review))
}

pub fn review_routes() -> Router<AppState> {
    Router::new().route("/reviews/:target_id", get(list_reviews).put(put_review))
}
