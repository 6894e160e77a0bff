//! Profile endpoints

use axum::{
    extract::{Path, State},
    routing::{get, put},
    Json, Router,
};
use mboard_common::db::profiles;
use mboard_common::models::{Profile, ProfileUpdate};

use super::identity::CurrentUser;
use super::json::ApiJson;
use crate::error::ApiResult;
use crate::AppState;

/// GET /profiles/:id
pub async fn get_profile(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Profile>> {
    Ok(Json(profiles::get_profile(&state.db, &id).await?))
}

/// PUT /profile
///
/// Creates or updates the caller's own profile.
pub async fn put_profile(
    State(state): State<AppState>,
    user: CurrentUser,
    ApiJson(update): ApiJson<ProfileUpdate>,
) -> ApiResult<Json<Profile>> {
    Ok(Json(profiles::upsert_profile(&state.db, &user.0, &update).await?))
}

pub fn profile_routes() -> Router<AppState> {
    Router::new()
        .route("/profiles/:id", get(get_profile))
        .route("/profile", put(put_profile))
}
