//! User input validation
//!
//! Every check here runs before anything is written to the store, so a
//! rejected request never produces a partial row.

use thiserror::Error;

/// Lowest rating a user can give
pub const MIN_RATING: f64 = 0.5;
/// Highest rating a user can give
pub const MAX_RATING: f64 = 5.0;
/// Minimum review length in characters (after trimming)
pub const MIN_REVIEW_CHARS: usize = 10;
/// Maximum review length in characters (after trimming)
pub const MAX_REVIEW_CHARS: usize = 5000;
/// Maximum board/list title length
pub const MAX_TITLE_CHARS: usize = 200;

/// Reasons user input is rejected
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("A rating is required")]
    MissingRating,

    #[error("Rating must be between 0.5 and 5.0 in half-star steps, got {0}")]
    RatingOutOfRange(f64),

    #[error("Review must be at least 10 characters (got {0})")]
    ReviewTooShort(usize),

    #[error("Review must be at most 5000 characters (got {0})")]
    ReviewTooLong(usize),

    #[error("Title is required")]
    EmptyTitle,

    #[error("Title must be at most 200 characters")]
    TitleTooLong,

    #[error("Username must be 3-30 characters of letters, digits or underscore")]
    InvalidUsername,
}

/// Check a star rating: finite, within [0.5, 5.0], and a multiple of 0.5
pub fn validate_rating(rating: f64) -> Result<f64, ValidationError> {
    let in_range = rating.is_finite() && (MIN_RATING..=MAX_RATING).contains(&rating);
    let half_step = (rating * 2.0).fract() == 0.0;

    if in_range && half_step {
        Ok(rating)
    } else {
        Err(ValidationError::RatingOutOfRange(rating))
    }
}

/// Check an optional rating where one is mandatory
pub fn require_rating(rating: Option<f64>) -> Result<f64, ValidationError> {
    rating
        .ok_or(ValidationError::MissingRating)
        .and_then(validate_rating)
}

/// Check review text length, returning the trimmed text that should be stored
pub fn validate_review_text(text: &str) -> Result<String, ValidationError> {
    let trimmed = text.trim();
    let chars = trimmed.chars().count();

    if chars < MIN_REVIEW_CHARS {
        return Err(ValidationError::ReviewTooShort(chars));
    }
    if chars > MAX_REVIEW_CHARS {
        return Err(ValidationError::ReviewTooLong(chars));
    }

    Ok(trimmed.to_string())
}

/// Check a board or list title, returning the trimmed title
pub fn validate_title(title: &str) -> Result<String, ValidationError> {
    let trimmed = title.trim();

    if trimmed.is_empty() {
        return Err(ValidationError::EmptyTitle);
    }
    if trimmed.chars().count() > MAX_TITLE_CHARS {
        return Err(ValidationError::TitleTooLong);
    }

    Ok(trimmed.to_string())
}

/// Check a profile username
pub fn validate_username(username: &str) -> Result<(), ValidationError> {
    let len = username.chars().count();
    let valid_chars = username
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_');

    if (3..=30).contains(&len) && valid_chars {
        Ok(())
    } else {
        Err(ValidationError::InvalidUsername)
    }
}
