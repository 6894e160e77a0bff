//! Review persistence
//!
//! One review per `(user_id, target_id)`. Edits overwrite the text and rating
//! but keep the original `created_at`.

use chrono::Utc;
use sqlx::SqlitePool;

use crate::models::Review;
use crate::validation::{require_rating, validate_review_text};
use crate::Result;

/// Create or edit a review
///
/// Both the rating and the text are checked before anything is written.
pub async fn upsert_review(
    pool: &SqlitePool,
    user_id: &str,
    target_id: &str,
    rating: Option<f64>,
    review_text: &str,
) -> Result<Review> {
    let rating = require_rating(rating)?;
    let text = validate_review_text(review_text)?;
    let now = Utc::now();

    let review = sqlx::query_as::<_, Review>(
        r#"
        INSERT INTO reviews (user_id, target_id, rating, review_text, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?)
        ON CONFLICT(user_id, target_id) DO UPDATE SET
            rating = excluded.rating,
            review_text = excluded.review_text,
            updated_at = excluded.updated_at
        RETURNING user_id, target_id, rating, review_text, created_at, updated_at
        "#,
    )
    .bind(user_id)
    .bind(target_id)
    .bind(rating)
    .bind(&text)
    .bind(now)
    .bind(now)
    .fetch_one(pool)
    .await?;

    Ok(review)
}

/// Reviews of a target, most recently edited first
pub async fn reviews_for_target(pool: &SqlitePool, target_id: &str) -> Result<Vec<Review>> {
    let rows = sqlx::query_as::<_, Review>(
        r#"
        SELECT user_id, target_id, rating, review_text, created_at, updated_at
        FROM reviews
        WHERE target_id = ?
        ORDER BY updated_at DESC
        "#,
    )
    .bind(target_id)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}
