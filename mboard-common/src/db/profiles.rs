//! Profile persistence

use sqlx::SqlitePool;

use crate::models::{Profile, ProfileUpdate};
use crate::validation::validate_username;
use crate::{Error, Result};

/// Create or update the profile for an identity
///
/// Usernames are unique; taking one that belongs to someone else is a
/// `Conflict`.
pub async fn upsert_profile(pool: &SqlitePool, id: &str, update: &ProfileUpdate) -> Result<Profile> {
    validate_username(&update.username)?;

    sqlx::query_as::<_, Profile>(
        r#"
        INSERT INTO profiles (id, username, display_name, avatar_url, bio)
        VALUES (?, ?, ?, ?, ?)
        ON CONFLICT(id) DO UPDATE SET
            username = excluded.username,
            display_name = excluded.display_name,
            avatar_url = excluded.avatar_url,
            bio = excluded.bio
        RETURNING id, username, display_name, avatar_url, bio
        "#,
    )
    .bind(id)
    .bind(&update.username)
    .bind(&update.display_name)
    .bind(&update.avatar_url)
    .bind(&update.bio)
    .fetch_one(pool)
    .await
    .map_err(|e| Error::from_unique_violation(e, "Username"))
}

/// Load a profile
pub async fn get_profile(pool: &SqlitePool, id: &str) -> Result<Profile> {
    sqlx::query_as::<_, Profile>(
        "SELECT id, username, display_name, avatar_url, bio FROM profiles WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| Error::NotFound(format!("Profile {}", id)))
}
