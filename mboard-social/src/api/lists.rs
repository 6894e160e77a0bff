//! List endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use mboard_common::db::lists;
use mboard_common::models::{ListItem, MusicList, NewList, NewListItem};
use serde::Serialize;

use super::identity::{CurrentUser, MaybeUser};
use super::json::ApiJson;
use crate::error::{ApiError, ApiResult};
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct ListDetail {
    #[serde(flatten)]
    pub list: MusicList,
    pub items: Vec<ListItem>,
}

/// POST /lists
pub async fn create_list(
    State(state): State<AppState>,
    user: CurrentUser,
    ApiJson(new): ApiJson<NewList>,
) -> ApiResult<(StatusCode, Json<MusicList>)> {
    let list = lists::create_list(&state.db, &user.0, &new).await?;
    Ok((StatusCode::CREATED, Json(list)))
}

/// GET /lists/:id
pub async fn get_list(
    State(state): State<AppState>,
    Path(list_id): Path<String>,
    caller: MaybeUser,
) -> ApiResult<Json<ListDetail>> {
    let list = lists::get_list(&state.db, &list_id).await?;
    if !list.is_public && caller.as_deref() != Some(list.owner_id.as_str()) {
        return Err(ApiError::NotFound(format!("List {} not found", list_id)));
    }

    let items = lists::list_items(&state.db, &list_id).await?;
    Ok(Json(ListDetail { list, items }))
}

/// POST /lists/:id/items
pub async fn add_item(
    State(state): State<AppState>,
    Path(list_id): Path<String>,
    user: CurrentUser,
    ApiJson(item): ApiJson<NewListItem>,
) -> ApiResult<(StatusCode, Json<ListItem>)> {
    let stored = lists::add_list_item(&state.db, &user.0, &list_id, &item).await?;
    Ok((StatusCode::CREATED, Json(stored)))
}

pub fn list_routes() -> Router<AppState> {
    Router::new()
        .route("/lists", post(create_list))
        .route("/lists/:id", get(get_list))
        .route("/lists/:id/items", post(add_item))
}
