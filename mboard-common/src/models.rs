//! Data model
//!
//! Plain records with no identity beyond their primary key. Derived values
//! (averages, distributions) are not stored here; see [`crate::aggregate`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::Error;

/// What a rating or review is attached to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
pub enum TargetType {
    Album,
    Track,
}

impl TargetType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TargetType::Album => "album",
            TargetType::Track => "track",
        }
    }
}

impl fmt::Display for TargetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TargetType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "album" => Ok(TargetType::Album),
            "track" => Ok(TargetType::Track),
            other => Err(Error::InvalidInput(format!("Unknown target type: {}", other))),
        }
    }
}

/// One user's star rating of an album or track
///
/// At most one row per `(user_id, target_id)`; re-rating replaces the value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct Rating {
    pub user_id: String,
    pub target_id: String,
    pub target_type: TargetType,
    /// Half-star value in 0.5..=5.0
    pub rating: f64,
    pub album_name: Option<String>,
    pub artist_name: Option<String>,
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Rating {
    pub fn new(
        user_id: impl Into<String>,
        target_id: impl Into<String>,
        target_type: TargetType,
        rating: f64,
    ) -> Self {
        Self {
            user_id: user_id.into(),
            target_id: target_id.into(),
            target_type,
            rating,
            album_name: None,
            artist_name: None,
            image_url: None,
            created_at: Utc::now(),
        }
    }
}

/// Display metadata stored alongside a rating so feeds can render it
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RatingContext {
    pub album_name: Option<String>,
    pub artist_name: Option<String>,
    pub image_url: Option<String>,
}

/// A written review; one per `(user_id, target_id)`, edited in place
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct Review {
    pub user_id: String,
    pub target_id: String,
    pub rating: f64,
    pub review_text: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// What a board collects
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
pub enum BoardType {
    Album,
    Artist,
    Vinyl,
    Concert,
    #[default]
    Mixed,
}

/// A user-curated, ordered collection of catalog items
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct Board {
    pub id: String,
    pub owner_id: String,
    pub title: String,
    pub board_type: BoardType,
    pub description: Option<String>,
    pub is_public: bool,
    pub likes_count: i64,
    pub created_at: DateTime<Utc>,
}

/// Fields supplied when creating a board
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewBoard {
    pub title: String,
    #[serde(default)]
    pub board_type: BoardType,
    pub description: Option<String>,
    #[serde(default = "default_public")]
    pub is_public: bool,
}

/// An entry on a board, referencing an external catalog id
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct BoardItem {
    pub id: String,
    pub board_id: String,
    pub title: String,
    pub artist: Option<String>,
    pub image_url: Option<String>,
    pub external_id: String,
    pub position: i64,
}

/// Fields supplied when adding a board item
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewBoardItem {
    pub title: String,
    pub artist: Option<String>,
    pub image_url: Option<String>,
    pub external_id: String,
}

/// Presence of a row means `user_id` likes `board_id`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct BoardLike {
    pub board_id: String,
    pub user_id: String,
    pub created_at: DateTime<Utc>,
}

/// A narrative list; items are free text rather than catalog ids
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct MusicList {
    pub id: String,
    pub owner_id: String,
    pub title: String,
    pub description: Option<String>,
    pub story: Option<String>,
    pub genre: Option<String>,
    pub is_public: bool,
    pub created_at: DateTime<Utc>,
}

/// Fields supplied when creating a list
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewList {
    pub title: String,
    pub description: Option<String>,
    pub story: Option<String>,
    pub genre: Option<String>,
    #[serde(default = "default_public")]
    pub is_public: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct ListItem {
    pub id: String,
    pub list_id: String,
    pub album_title: String,
    pub artist: String,
    pub genre: Option<String>,
    pub emoji: Option<String>,
    pub position: i64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewListItem {
    pub album_title: String,
    pub artist: String,
    pub genre: Option<String>,
    pub emoji: Option<String>,
}

/// Fields a user may set on their own profile
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdate {
    pub username: String,
    pub display_name: Option<String>,
    pub avatar_url: Option<String>,
    pub bio: Option<String>,
}

/// Public profile, one-to-one with an authenticated identity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub id: String,
    pub username: String,
    pub display_name: Option<String>,
    pub avatar_url: Option<String>,
    pub bio: Option<String>,
}

/// An album saved for later listening
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct ListenLaterEntry {
    pub user_id: String,
    pub album_id: String,
    pub album_name: Option<String>,
    pub artist_name: Option<String>,
    pub album_image: Option<String>,
    pub created_at: DateTime<Utc>,
}

fn default_public() -> bool {
    true
}
