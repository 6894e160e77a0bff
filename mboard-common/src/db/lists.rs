//! Narrative lists and their free-text items

use chrono::Utc;
use sqlx::SqlitePool;
use uuid::Uuid;

use super::begin_write;
use crate::models::{ListItem, MusicList, NewList, NewListItem};
use crate::validation::validate_title;
use crate::{Error, Result};

/// Create a list owned by `owner_id`
pub async fn create_list(pool: &SqlitePool, owner_id: &str, new: &NewList) -> Result<MusicList> {
    let title = validate_title(&new.title)?;

    let list = sqlx::query_as::<_, MusicList>(
        r#"
        INSERT INTO lists (id, owner_id, title, description, story, genre, is_public, created_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?)
        RETURNING id, owner_id, title, description, story, genre, is_public, created_at
        "#,
    )
    .bind(Uuid::new_v4().to_string())
    .bind(owner_id)
    .bind(&title)
    .bind(&new.description)
    .bind(&new.story)
    .bind(&new.genre)
    .bind(new.is_public)
    .bind(Utc::now())
    .fetch_one(pool)
    .await?;

    Ok(list)
}

pub async fn get_list(pool: &SqlitePool, list_id: &str) -> Result<MusicList> {
    sqlx::query_as::<_, MusicList>(
        r#"
        SELECT id, owner_id, title, description, story, genre, is_public, created_at
        FROM lists
        WHERE id = ?
        "#,
    )
    .bind(list_id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| Error::NotFound(format!("List {}", list_id)))
}

/// Append an item to a list; owner only
pub async fn add_list_item(
    pool: &SqlitePool,
    caller_id: &str,
    list_id: &str,
    item: &NewListItem,
) -> Result<ListItem> {
    let album_title = validate_title(&item.album_title)?;
    let artist = item.artist.trim();
    if artist.is_empty() {
        return Err(Error::InvalidInput("Artist is required".to_string()));
    }

    let mut tx = begin_write(pool).await?;

    let owner = sqlx::query_scalar::<_, String>("SELECT owner_id FROM lists WHERE id = ?")
        .bind(list_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| Error::NotFound(format!("List {}", list_id)))?;

    if owner != caller_id {
        return Err(Error::Forbidden("Only the list owner can add items".to_string()));
    }

    let stored = sqlx::query_as::<_, ListItem>(
        r#"
        INSERT INTO list_items (id, list_id, album_title, artist, genre, emoji, position)
        VALUES (?, ?, ?, ?, ?, ?,
                (SELECT COALESCE(MAX(position) + 1, 0) FROM list_items WHERE list_id = ?))
        RETURNING id, list_id, album_title, artist, genre, emoji, position
        "#,
    )
    .bind(Uuid::new_v4().to_string())
    .bind(list_id)
    .bind(&album_title)
    .bind(artist)
    .bind(&item.genre)
    .bind(&item.emoji)
    .bind(list_id)
    .fetch_one(&mut *tx)
    .await?;

    tx.commit().await?;
    Ok(stored)
}

/// Items of a list in display order
pub async fn list_items(pool: &SqlitePool, list_id: &str) -> Result<Vec<ListItem>> {
    let rows = sqlx::query_as::<_, ListItem>(
        r#"
        SELECT id, list_id, album_title, artist, genre, emoji, position
        FROM list_items
        WHERE list_id = ?
        ORDER BY position
        "#,
    )
    .bind(list_id)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}
