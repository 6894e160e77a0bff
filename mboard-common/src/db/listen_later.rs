//! "Listen later" queue of saved albums

use chrono::Utc;
use sqlx::SqlitePool;

use crate::models::ListenLaterEntry;
use crate::Result;

/// Save an album for later
///
/// Returns `false` when the album was already saved; the existing entry is
/// left untouched.
pub async fn add_listen_later(pool: &SqlitePool, entry: &ListenLaterEntry) -> Result<bool> {
    let result = sqlx::query(
        r#"
        INSERT INTO listen_later (user_id, album_id, album_name, artist_name, album_image, created_at)
        VALUES (?, ?, ?, ?, ?, ?)
        ON CONFLICT(user_id, album_id) DO NOTHING
        "#,
    )
    .bind(&entry.user_id)
    .bind(&entry.album_id)
    .bind(&entry.album_name)
    .bind(&entry.artist_name)
    .bind(&entry.album_image)
    .bind(Utc::now())
    .execute(pool)
    .await?;

    Ok(result.rows_affected() == 1)
}

/// A user's saved albums, newest first
pub async fn listen_later_for_user(pool: &SqlitePool, user_id: &str) -> Result<Vec<ListenLaterEntry>> {
    let rows = sqlx::query_as::<_, ListenLaterEntry>(
        r#"
        SELECT user_id, album_id, album_name, artist_name, album_image, created_at
        FROM listen_later
        WHERE user_id = ?
        ORDER BY created_at DESC, rowid DESC
        "#,
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}
