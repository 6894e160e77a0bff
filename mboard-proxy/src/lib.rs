//! mboard-proxy library interface
//!
//! Stateless adapters in front of third-party music services. Each handler
//! forwards one request upstream and normalizes the reply; nothing is stored.

pub mod api;
pub mod config;
pub mod error;
pub mod services;

pub use crate::config::ProxyConfig;
pub use crate::error::{AdapterError, AdapterResult};

use axum::Router;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tower_http::cors::CorsLayer;

use crate::services::{
    upstream, AudioDbClient, BandsintownClient, ChatClient, DiscogsClient, GeniusClient,
    SpotifyClient, UpstreamError,
};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub audiodb: Arc<AudioDbClient>,
    pub spotify: Arc<SpotifyClient>,
    pub bandsintown: Arc<BandsintownClient>,
    pub discogs: Arc<DiscogsClient>,
    pub genius: Arc<GeniusClient>,
    pub chat: Arc<ChatClient>,
    /// Service startup timestamp for uptime tracking
    pub startup_time: DateTime<Utc>,
}

impl AppState {
    /// Build every upstream client from resolved configuration
    ///
    /// All clients share one connection pool.
    pub fn new(config: &ProxyConfig) -> Result<Self, UpstreamError> {
        let http = upstream::http_client(config.timeout)?;

        Ok(Self {
            audiodb: Arc::new(AudioDbClient::new(http.clone(), &config.audiodb_base_url)),
            spotify: Arc::new(SpotifyClient::new(
                http.clone(),
                &config.spotify_accounts_url,
                &config.spotify_api_url,
                config.spotify.clone(),
                config.token_cache,
            )),
            bandsintown: Arc::new(BandsintownClient::new(
                http.clone(),
                &config.bandsintown_base_url,
                &config.bandsintown_app_id,
            )),
            discogs: Arc::new(DiscogsClient::new(
                http.clone(),
                &config.discogs_base_url,
                config.discogs_token.clone(),
            )),
            genius: Arc::new(GeniusClient::new(
                http.clone(),
                &config.genius_base_url,
                config.genius_token.clone(),
            )),
            chat: Arc::new(ChatClient::new(
                http,
                &config.chat_base_url,
                &config.chat_model,
                config.chat_api_key.clone(),
            )),
            startup_time: Utc::now(),
        })
    }
}

/// Build application router
///
/// Browsers call the adapters cross-origin, so every route answers CORS
/// preflights and carries `Access-Control-Allow-Origin: *`.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(api::catalog_routes())
        .merge(api::spotify_routes())
        .merge(api::event_routes())
        .merge(api::vinyl_routes())
        .merge(api::lyrics_routes())
        .merge(api::chat_routes())
        .merge(api::health_routes())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
