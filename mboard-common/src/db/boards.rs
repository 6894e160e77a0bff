//! Boards, board items and board likes
//!
//! `likes_count` is a denormalized counter. Every like/unlike changes the
//! like row and recomputes the counter from `board_likes` inside a single
//! transaction, so the two can never disagree.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use super::begin_write;
use crate::models::{Board, BoardItem, NewBoard, NewBoardItem};
use crate::validation::validate_title;
use crate::{Error, Result};

const BOARD_COLUMNS: &str =
    "id, owner_id, title, board_type, description, is_public, likes_count, created_at";

/// Create a board owned by `owner_id`
pub async fn create_board(pool: &SqlitePool, owner_id: &str, new: &NewBoard) -> Result<Board> {
    let title = validate_title(&new.title)?;

    let board = sqlx::query_as::<_, Board>(&format!(
        r#"
        INSERT INTO boards (id, owner_id, title, board_type, description, is_public, likes_count, created_at)
        VALUES (?, ?, ?, ?, ?, ?, 0, ?)
        RETURNING {}
        "#,
        BOARD_COLUMNS
    ))
    .bind(Uuid::new_v4().to_string())
    .bind(owner_id)
    .bind(&title)
    .bind(new.board_type)
    .bind(&new.description)
    .bind(new.is_public)
    .bind(Utc::now())
    .fetch_one(pool)
    .await?;

    debug!(board_id = %board.id, owner_id, "Board created");
    Ok(board)
}

/// Load a board by id
pub async fn get_board(pool: &SqlitePool, board_id: &str) -> Result<Board> {
    sqlx::query_as::<_, Board>(&format!("SELECT {} FROM boards WHERE id = ?", BOARD_COLUMNS))
        .bind(board_id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| Error::NotFound(format!("Board {}", board_id)))
}

/// Public boards, newest first
pub async fn public_boards(pool: &SqlitePool, limit: i64) -> Result<Vec<Board>> {
    let rows = sqlx::query_as::<_, Board>(&format!(
        "SELECT {} FROM boards WHERE is_public = 1 ORDER BY created_at DESC, rowid DESC LIMIT ?",
        BOARD_COLUMNS
    ))
    .bind(limit)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Boards owned by a user
///
/// Private boards are only included when the owner is the one asking.
pub async fn boards_for_owner(
    pool: &SqlitePool,
    owner_id: &str,
    include_private: bool,
) -> Result<Vec<Board>> {
    let rows = sqlx::query_as::<_, Board>(&format!(
        "SELECT {} FROM boards WHERE owner_id = ? AND (is_public = 1 OR ?) ORDER BY created_at DESC, rowid DESC",
        BOARD_COLUMNS
    ))
    .bind(owner_id)
    .bind(include_private)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Append an item to the end of a board
///
/// Only the board owner may add items.
pub async fn add_board_item(
    pool: &SqlitePool,
    caller_id: &str,
    board_id: &str,
    item: &NewBoardItem,
) -> Result<BoardItem> {
    let title = validate_title(&item.title)?;

    let mut tx = begin_write(pool).await?;

    let owner: Option<String> = sqlx::query_scalar("SELECT owner_id FROM boards WHERE id = ?")
        .bind(board_id)
        .fetch_optional(&mut *tx)
        .await?;

    match owner {
        None => return Err(Error::NotFound(format!("Board {}", board_id))),
        Some(owner) if owner != caller_id => {
            return Err(Error::Forbidden("Only the board owner can add items".to_string()))
        }
        Some(_) => {}
    }

    let stored = sqlx::query_as::<_, BoardItem>(
        r#"
        INSERT INTO board_items (id, board_id, title, artist, image_url, external_id, position)
        VALUES (?, ?, ?, ?, ?, ?,
                (SELECT COALESCE(MAX(position) + 1, 0) FROM board_items WHERE board_id = ?))
        RETURNING id, board_id, title, artist, image_url, external_id, position
        "#,
    )
    .bind(Uuid::new_v4().to_string())
    .bind(board_id)
    .bind(&title)
    .bind(&item.artist)
    .bind(&item.image_url)
    .bind(&item.external_id)
    .bind(board_id)
    .fetch_one(&mut *tx)
    .await?;

    tx.commit().await?;
    Ok(stored)
}

/// Items on a board in display order
pub async fn board_items(pool: &SqlitePool, board_id: &str) -> Result<Vec<BoardItem>> {
    let rows = sqlx::query_as::<_, BoardItem>(
        r#"
        SELECT id, board_id, title, artist, image_url, external_id, position
        FROM board_items
        WHERE board_id = ?
        ORDER BY position
        "#,
    )
    .bind(board_id)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Whether a user has liked a board
pub async fn is_liked(pool: &SqlitePool, board_id: &str, user_id: &str) -> Result<bool> {
    let exists: Option<i64> =
        sqlx::query_scalar("SELECT 1 FROM board_likes WHERE board_id = ? AND user_id = ?")
            .bind(board_id)
            .bind(user_id)
            .fetch_optional(pool)
            .await?;

    Ok(exists.is_some())
}

/// Like a board, returning the new like count
///
/// Liking an already-liked board changes nothing.
pub async fn like_board(pool: &SqlitePool, board_id: &str, user_id: &str) -> Result<i64> {
    let mut tx = begin_write(pool).await?;

    ensure_board_exists(&mut tx, board_id).await?;

    sqlx::query(
        r#"
        INSERT INTO board_likes (board_id, user_id, created_at)
        VALUES (?, ?, ?)
        ON CONFLICT(board_id, user_id) DO NOTHING
        "#,
    )
    .bind(board_id)
    .bind(user_id)
    .bind(Utc::now())
    .execute(&mut *tx)
    .await?;

    let count = recount_likes(&mut tx, board_id).await?;
    tx.commit().await?;

    debug!(board_id, user_id, likes = count, "Board liked");
    Ok(count)
}

/// Remove a like, returning the new like count
///
/// Unliking a board that was not liked changes nothing.
pub async fn unlike_board(pool: &SqlitePool, board_id: &str, user_id: &str) -> Result<i64> {
    let mut tx = begin_write(pool).await?;

    ensure_board_exists(&mut tx, board_id).await?;

    sqlx::query("DELETE FROM board_likes WHERE board_id = ? AND user_id = ?")
        .bind(board_id)
        .bind(user_id)
        .execute(&mut *tx)
        .await?;

    let count = recount_likes(&mut tx, board_id).await?;
    tx.commit().await?;

    debug!(board_id, user_id, likes = count, "Board unliked");
    Ok(count)
}

async fn ensure_board_exists(
    tx: &mut sqlx::Transaction<'_, sqlx::Sqlite>,
    board_id: &str,
) -> Result<()> {
    let exists: Option<i64> = sqlx::query_scalar("SELECT 1 FROM boards WHERE id = ?")
        .bind(board_id)
        .fetch_optional(&mut **tx)
        .await?;

    exists
        .map(|_| ())
        .ok_or_else(|| Error::NotFound(format!("Board {}", board_id)))
}

async fn recount_likes(
    tx: &mut sqlx::Transaction<'_, sqlx::Sqlite>,
    board_id: &str,
) -> Result<i64> {
    let count: i64 = sqlx::query_scalar(
        r#"
        UPDATE boards
        SET likes_count = (SELECT COUNT(*) FROM board_likes WHERE board_id = ?)
        WHERE id = ?
        RETURNING likes_count
        "#,
    )
    .bind(board_id)
    .bind(board_id)
    .fetch_one(&mut **tx)
    .await?;

    Ok(count)
}
