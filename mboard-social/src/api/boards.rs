//! Board endpoints
//!
//! Private boards are visible to their owner only; to everyone else they
//! do not exist.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use mboard_common::db::boards;
use mboard_common::models::{Board, BoardItem, NewBoard, NewBoardItem};
use serde::Serialize;
use tracing::info;

use super::identity::{CurrentUser, MaybeUser};
use super::json::ApiJson;
use crate::error::{ApiError, ApiResult};
use crate::AppState;

/// Board page payload
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BoardDetail {
    #[serde(flatten)]
    pub board: Board,
    pub items: Vec<BoardItem>,
    pub liked_by_me: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LikeResponse {
    pub likes_count: i64,
    pub liked_by_me: bool,
}

/// Load a board the caller is allowed to see
async fn visible_board(
    state: &AppState,
    board_id: &str,
    caller: Option<&str>,
) -> ApiResult<Board> {
    let board = boards::get_board(&state.db, board_id).await?;

    if board.is_public || caller == Some(board.owner_id.as_str()) {
        Ok(board)
    } else {
        Err(ApiError::NotFound(format!("Board {} not found", board_id)))
    }
}

/// POST /boards
pub async fn create_board(
    State(state): State<AppState>,
    user: CurrentUser,
    ApiJson(new): ApiJson<NewBoard>,
) -> ApiResult<(StatusCode, Json<Board>)> {
    let board = boards::create_board(&state.db, &user.0, &new).await?;
    info!(board_id = %board.id, owner_id = %user.0, "Board created");
    Ok((StatusCode::CREATED, Json(board)))
}

/// GET /boards
///
/// Public feed, newest first.
pub async fn list_public_boards(State(state): State<AppState>) -> ApiResult<Json<Vec<Board>>> {
    Ok(Json(boards::public_boards(&state.db, state.feed_limit).await?))
}

/// GET /boards/:id
pub async fn get_board(
    State(state): State<AppState>,
    Path(board_id): Path<String>,
    caller: MaybeUser,
) -> ApiResult<Json<BoardDetail>> {
    let board = visible_board(&state, &board_id, caller.as_deref()).await?;
    let items = boards::board_items(&state.db, &board_id).await?;
    let liked_by_me = match caller.as_deref() {
        Some(user_id) => boards::is_liked(&state.db, &board_id, user_id).await?,
        None => false,
    };

    Ok(Json(BoardDetail {
        board,
        items,
        liked_by_me,
    }))
}

/// POST /boards/:id/items
pub async fn add_item(
    State(state): State<AppState>,
    Path(board_id): Path<String>,
    user: CurrentUser,
    ApiJson(item): ApiJson<NewBoardItem>,
) -> ApiResult<(StatusCode, Json<BoardItem>)> {
    let stored = boards::add_board_item(&state.db, &user.0, &board_id, &item).await?;
    Ok((StatusCode::CREATED, Json(stored)))
}

/// POST /boards/:id/like
pub async fn like(
    State(state): State<AppState>,
    Path(board_id): Path<String>,
    user: CurrentUser,
) -> ApiResult<Json<LikeResponse>> {
    visible_board(&state, &board_id, Some(&user.0)).await?;
    let likes_count = boards::like_board(&state.db, &board_id, &user.0).await?;

    Ok(Json(LikeResponse {
        likes_count,
        liked_by_me: true,
    }))
}

/// DELETE /boards/:id/like
pub async fn unlike(
    State(state): State<AppState>,
    Path(board_id): Path<String>,
    user: CurrentUser,
) -> ApiResult<Json<LikeResponse>> {
    let likes_count = boards::unlike_board(&state.db, &board_id, &user.0).await?;

    Ok(Json(LikeResponse {
        likes_count,
        liked_by_me: false,
    }))
}

/// GET /users/:id/boards
///
/// The owner also sees their private boards.
pub async fn user_boards(
    State(state): State<AppState>,
    Path(owner_id): Path<String>,
    caller: MaybeUser,
) -> ApiResult<Json<Vec<Board>>> {
    let include_private = caller.as_deref() == Some(owner_id.as_str());
    Ok(Json(
        boards::boards_for_owner(&state.db, &owner_id, include_private).await?,
    ))
}

pub fn board_routes() -> Router<AppState> {
    Router::new()
        .route("/boards", get(list_public_boards).post(create_board))
        .route("/boards/:id", get(get_board))
        .route("/boards/:id/items", post(add_item))
        .route("/boards/:id/like", post(like).delete(unlike))
        .route("/users/:id/boards", get(user_boards))
}
