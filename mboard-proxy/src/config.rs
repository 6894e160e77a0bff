//! Configuration for mboard-proxy
//!
//! The TOML file only supplies defaults. Upstream credentials resolve
//! ENV → TOML so deployments can keep secrets out of files; base URLs exist so
//! tests and staging can point adapters at a mock server.

use mboard_common::config::{resolve_secret, LoggingConfig};
use serde::Deserialize;
use std::time::Duration;
use tracing::{info, warn};

pub const DEFAULT_PORT: u16 = 5730;

pub const SPOTIFY_CLIENT_ID_ENV: &str = "SPOTIFY_CLIENT_ID";
pub const SPOTIFY_CLIENT_SECRET_ENV: &str = "SPOTIFY_CLIENT_SECRET";
pub const DISCOGS_TOKEN_ENV: &str = "DISCOGS_TOKEN";
pub const GENIUS_TOKEN_ENV: &str = "GENIUS_API_TOKEN";
pub const CHAT_API_KEY_ENV: &str = "MBOARD_CHAT_API_KEY";

/// `proxy.toml` as written on disk
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProxyToml {
    pub port: Option<u16>,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub upstream: UpstreamToml,
    #[serde(default)]
    pub credentials: CredentialsToml,
}

/// `[upstream]` table
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpstreamToml {
    pub audiodb_base_url: Option<String>,
    pub spotify_accounts_url: Option<String>,
    pub spotify_api_url: Option<String>,
    pub bandsintown_base_url: Option<String>,
    pub bandsintown_app_id: Option<String>,
    pub discogs_base_url: Option<String>,
    pub genius_base_url: Option<String>,
    pub chat_base_url: Option<String>,
    pub chat_model: Option<String>,
    pub timeout_secs: Option<u64>,
    pub token_cache: Option<bool>,
}

/// `[credentials]` table; every value can be overridden from the environment
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CredentialsToml {
    pub spotify_client_id: Option<String>,
    pub spotify_client_secret: Option<String>,
    pub discogs_token: Option<String>,
    pub genius_api_token: Option<String>,
    pub chat_api_key: Option<String>,
}

/// Spotify client-credentials pair
#[derive(Debug, Clone, PartialEq)]
pub struct SpotifyCredentials {
    pub client_id: String,
    pub client_secret: String,
}

/// Resolved adapter configuration
#[derive(Debug, Clone)]
pub struct ProxyConfig {
    pub audiodb_base_url: String,
    pub spotify_accounts_url: String,
    pub spotify_api_url: String,
    pub bandsintown_base_url: String,
    pub bandsintown_app_id: String,
    pub discogs_base_url: String,
    pub genius_base_url: String,
    pub chat_base_url: String,
    pub chat_model: String,
    /// Per-request upstream timeout
    pub timeout: Duration,
    /// Reuse Spotify tokens until shortly before they expire
    pub token_cache: bool,
    pub spotify: Option<SpotifyCredentials>,
    pub discogs_token: Option<String>,
    pub genius_token: Option<String>,
    pub chat_api_key: Option<String>,
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self {
            audiodb_base_url: "https://www.theaudiodb.com/api/v1/json/2".to_string(),
            spotify_accounts_url: "https://accounts.spotify.com".to_string(),
            spotify_api_url: "https://api.spotify.com/v1".to_string(),
            bandsintown_base_url: "https://rest.bandsintown.com".to_string(),
            bandsintown_app_id: "vinyl_social_music_app".to_string(),
            discogs_base_url: "https://api.discogs.com".to_string(),
            genius_base_url: "https://api.genius.com".to_string(),
            chat_base_url: "https://ai.gateway.lovable.dev".to_string(),
            chat_model: "google/gemini-2.5-flash".to_string(),
            timeout: Duration::from_secs(30),
            token_cache: true,
            spotify: None,
            discogs_token: None,
            genius_token: None,
            chat_api_key: None,
        }
    }
}

impl ProxyConfig {
    /// Merge the TOML file over compiled defaults and resolve credentials
    pub fn resolve(toml: &ProxyToml) -> Self {
        let defaults = Self::default();
        let upstream = &toml.upstream;
        let creds = &toml.credentials;

        let client_id = resolve_secret(SPOTIFY_CLIENT_ID_ENV, creds.spotify_client_id.as_deref());
        let client_secret =
            resolve_secret(SPOTIFY_CLIENT_SECRET_ENV, creds.spotify_client_secret.as_deref());

        let spotify = match (client_id, client_secret) {
            (Some(client_id), Some(client_secret)) => Some(SpotifyCredentials {
                client_id,
                client_secret,
            }),
            (None, None) => None,
            _ => {
                warn!("Only one of SPOTIFY_CLIENT_ID / SPOTIFY_CLIENT_SECRET is set, Spotify disabled");
                None
            }
        };

        let config = Self {
            audiodb_base_url: upstream.audiodb_base_url.clone().unwrap_or(defaults.audiodb_base_url),
            spotify_accounts_url: upstream
                .spotify_accounts_url
                .clone()
                .unwrap_or(defaults.spotify_accounts_url),
            spotify_api_url: upstream.spotify_api_url.clone().unwrap_or(defaults.spotify_api_url),
            bandsintown_base_url: upstream
                .bandsintown_base_url
                .clone()
                .unwrap_or(defaults.bandsintown_base_url),
            bandsintown_app_id: upstream
                .bandsintown_app_id
                .clone()
                .unwrap_or(defaults.bandsintown_app_id),
            discogs_base_url: upstream.discogs_base_url.clone().unwrap_or(defaults.discogs_base_url),
            genius_base_url: upstream.genius_base_url.clone().unwrap_or(defaults.genius_base_url),
            chat_base_url: upstream.chat_base_url.clone().unwrap_or(defaults.chat_base_url),
            chat_model: upstream.chat_model.clone().unwrap_or(defaults.chat_model),
            timeout: upstream
                .timeout_secs
                .map(Duration::from_secs)
                .unwrap_or(defaults.timeout),
            token_cache: upstream.token_cache.unwrap_or(defaults.token_cache),
            spotify,
            discogs_token: resolve_secret(DISCOGS_TOKEN_ENV, creds.discogs_token.as_deref()),
            genius_token: resolve_secret(GENIUS_TOKEN_ENV, creds.genius_api_token.as_deref()),
            chat_api_key: resolve_secret(CHAT_API_KEY_ENV, creds.chat_api_key.as_deref()),
        };

        config.log_credential_status();
        config
    }

    fn log_credential_status(&self) {
        let status = |present: bool| if present { "configured" } else { "not configured" };

        info!(
            spotify = status(self.spotify.is_some()),
            discogs = status(self.discogs_token.is_some()),
            genius = status(self.genius_token.is_some()),
            chat = status(self.chat_api_key.is_some()),
            "Upstream credentials"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    fn clear_env() {
        for var in [
            SPOTIFY_CLIENT_ID_ENV,
            SPOTIFY_CLIENT_SECRET_ENV,
            DISCOGS_TOKEN_ENV,
            GENIUS_TOKEN_ENV,
            CHAT_API_KEY_ENV,
        ] {
            std::env::remove_var(var);
        }
    }

    #[test]
    #[serial]
    fn test_defaults_without_file() {
        clear_env();
        let config = ProxyConfig::resolve(&ProxyToml::default());

        assert_eq!(config.spotify_api_url, "https://api.spotify.com/v1");
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert!(config.token_cache);
        assert!(config.spotify.is_none());
        assert!(config.discogs_token.is_none());
    }

    #[test]
    #[serial]
    fn test_toml_values_and_env_override() {
        clear_env();
        let toml: ProxyToml = toml::from_str(
            r#"
            [upstream]
            discogs_base_url = "http://localhost:9999"
            timeout_secs = 5
            token_cache = false

            [credentials]
            discogs_token = "from-toml"
            spotify_client_id = "id"
            spotify_client_secret = "secret"
            "#,
        )
        .unwrap();

        std::env::set_var(DISCOGS_TOKEN_ENV, "from-env");
        let config = ProxyConfig::resolve(&toml);
        clear_env();

        assert_eq!(config.discogs_base_url, "http://localhost:9999");
        assert_eq!(config.timeout, Duration::from_secs(5));
        assert!(!config.token_cache);
        assert_eq!(config.discogs_token.as_deref(), Some("from-env"));
        assert_eq!(
            config.spotify,
            Some(SpotifyCredentials {
                client_id: "id".into(),
                client_secret: "secret".into(),
            })
        );
    }

    #[test]
    #[serial]
    fn test_half_spotify_pair_disables_spotify() {
        clear_env();
        std::env::set_var(SPOTIFY_CLIENT_ID_ENV, "only-id");
        let config = ProxyConfig::resolve(&ProxyToml::default());
        clear_env();

        assert!(config.spotify.is_none());
    }
}
