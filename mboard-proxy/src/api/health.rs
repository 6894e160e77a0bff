//! Health check endpoint

use axum::{extract::State, routing::get, Json, Router};
use chrono::Utc;
use serde::Serialize;

use crate::AppState;

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Service status ("ok")
    pub status: String,
    /// Module name ("mboard-proxy")
    pub module: String,
    /// Crate version from Cargo.toml
    pub version: String,
    /// Seconds since service started
    pub uptime_seconds: u64,
    /// Upstreams with credentials present
    pub configured: ConfiguredUpstreams,
}

/// Which credentialed upstreams can be called
#[derive(Debug, Serialize)]
pub struct ConfiguredUpstreams {
    pub spotify: bool,
    pub discogs: bool,
    pub genius: bool,
    pub chat: bool,
}

/// GET /health
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let uptime = Utc::now().signed_duration_since(state.startup_time);
    let uptime_seconds = uptime.num_seconds().max(0) as u64;

    Json(HealthResponse {
        status: "ok".to_string(),
        module: "mboard-proxy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds,
        configured: ConfiguredUpstreams {
            spotify: state.spotify.is_configured(),
            discogs: state.discogs.is_configured(),
            genius: state.genius.is_configured(),
            chat: state.chat.is_configured(),
        },
    })
}

/// Build health check routes
pub fn health_routes() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}
