//! mboard-social library interface
//!
//! Persistent social features: ratings, reviews, boards, lists, profiles and
//! the listen-later queue. Storage lives in `mboard-common`; this crate maps
//! it onto HTTP.

use axum::Router;
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tower_http::cors::CorsLayer;

pub mod api;
pub mod config;
pub mod error;

pub use crate::error::{ApiError, ApiResult};

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: SqlitePool,
    /// Number of boards on the public feed
    pub feed_limit: i64,
    /// Service startup timestamp for uptime tracking
    pub startup_time: DateTime<Utc>,
}

impl AppState {
    /// Create new application state
    pub fn new(db: SqlitePool) -> Self {
        Self {
            db,
            feed_limit: config::DEFAULT_FEED_LIMIT,
            startup_time: Utc::now(),
        }
    }

    pub fn with_feed_limit(mut self, feed_limit: i64) -> Self {
        self.feed_limit = feed_limit;
        self
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(api::rating_routes())
        .merge(api::review_routes())
        .merge(api::board_routes())
        .merge(api::list_routes())
        .merge(api::profile_routes())
        .merge(api::listen_later_routes())
        .merge(api::health_routes())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
