//! Rating persistence
//!
//! One row per `(user_id, target_id)`. Re-rating overwrites the value and the
//! display context in place; aggregates are folded on read.

use chrono::Utc;
use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use tracing::debug;

use crate::aggregate::{self, RatingSummary, TrackRatings};
use crate::models::{Rating, RatingContext, TargetType};
use crate::validation::validate_rating;
use crate::Result;

const RATING_COLUMNS: &str =
    "user_id, target_id, target_type, rating, album_name, artist_name, image_url, created_at";

/// Insert or replace a user's rating of a target
///
/// The value is validated before the store is touched.
pub async fn upsert_rating(
    pool: &SqlitePool,
    user_id: &str,
    target_id: &str,
    target_type: TargetType,
    rating: f64,
    context: &RatingContext,
) -> Result<Rating> {
    let rating = validate_rating(rating)?;

    let stored = sqlx::query_as::<_, Rating>(
        r#"
        INSERT INTO ratings (user_id, target_id, target_type, rating,
                             album_name, artist_name, image_url, created_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?)
        ON CONFLICT(user_id, target_id) DO UPDATE SET
            target_type = excluded.target_type,
            rating = excluded.rating,
            album_name = COALESCE(excluded.album_name, ratings.album_name),
            artist_name = COALESCE(excluded.artist_name, ratings.artist_name),
            image_url = COALESCE(excluded.image_url, ratings.image_url),
            created_at = excluded.created_at
        RETURNING user_id, target_id, target_type, rating,
                  album_name, artist_name, image_url, created_at
        "#,
    )
    .bind(user_id)
    .bind(target_id)
    .bind(target_type)
    .bind(rating)
    .bind(&context.album_name)
    .bind(&context.artist_name)
    .bind(&context.image_url)
    .bind(Utc::now())
    .fetch_one(pool)
    .await?;

    debug!(user_id, target_id, rating, "Rating stored");
    Ok(stored)
}

/// All ratings for one album or track
pub async fn ratings_for_target(
    pool: &SqlitePool,
    target_id: &str,
    target_type: TargetType,
) -> Result<Vec<Rating>> {
    let rows = sqlx::query_as::<_, Rating>(&format!(
        "SELECT {} FROM ratings WHERE target_id = ? AND target_type = ? ORDER BY created_at",
        RATING_COLUMNS
    ))
    .bind(target_id)
    .bind(target_type)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// The caller's own rating of a target, if any
pub async fn user_rating(pool: &SqlitePool, user_id: &str, target_id: &str) -> Result<Option<f64>> {
    let value: Option<f64> =
        sqlx::query_scalar("SELECT rating FROM ratings WHERE user_id = ? AND target_id = ?")
            .bind(user_id)
            .bind(target_id)
            .fetch_optional(pool)
            .await?;

    Ok(value)
}

/// Summary statistics for a target, recomputed from its rows
pub async fn target_summary(
    pool: &SqlitePool,
    target_id: &str,
    target_type: TargetType,
    current_user: Option<&str>,
) -> Result<RatingSummary> {
    let rows = ratings_for_target(pool, target_id, target_type).await?;
    Ok(aggregate::summarize(&rows, current_user))
}

/// Track ratings for any of the given track ids
pub async fn ratings_for_tracks(pool: &SqlitePool, track_ids: &[String]) -> Result<Vec<Rating>> {
    if track_ids.is_empty() {
        return Ok(Vec::new());
    }

    let mut builder: QueryBuilder<Sqlite> = QueryBuilder::new(format!(
        "SELECT {} FROM ratings WHERE target_type = 'track' AND target_id IN (",
        RATING_COLUMNS
    ));
    let mut separated = builder.separated(", ");
    for id in track_ids {
        separated.push_bind(id);
    }
    separated.push_unseparated(") ORDER BY created_at");

    let rows = builder.build_query_as::<Rating>().fetch_all(pool).await?;
    Ok(rows)
}

/// Per-track running averages for an album's track list
pub async fn track_averages(pool: &SqlitePool, track_ids: &[String]) -> Result<TrackRatings> {
    let rows = ratings_for_tracks(pool, track_ids).await?;
    Ok(TrackRatings::from_rows(&rows))
}

/// A user's most recent ratings, newest first
pub async fn recent_ratings(pool: &SqlitePool, user_id: &str, limit: i64) -> Result<Vec<Rating>> {
    let rows = sqlx::query_as::<_, Rating>(&format!(
        "SELECT {} FROM ratings WHERE user_id = ? ORDER BY created_at DESC, rowid DESC LIMIT ?",
        RATING_COLUMNS
    ))
    .bind(user_id)
    .bind(limit)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}
