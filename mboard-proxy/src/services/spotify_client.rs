//! Spotify Web API client
//!
//! Uses the client-credentials flow: exchange the app's id/secret for a
//! bearer token, then make one data call. Tokens may be reused across
//! requests through [`TokenCache`] until shortly before they expire. A
//! token the API rejects with 401 is evicted, so the next request exchanges
//! the credentials again.

use reqwest::{Client, Url};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use super::upstream::{self, UpstreamError};
use crate::config::SpotifyCredentials;

const SERVICE: &str = "spotify";
/// Tokens are dropped this long before Spotify says they expire
const TOKEN_EXPIRY_MARGIN: Duration = Duration::from_secs(60);
pub const SEARCH_LIMIT: u32 = 20;
pub const NEW_RELEASES_LIMIT: u32 = 12;
pub const DEFAULT_SEARCH_TYPES: &str = "album,track,artist";

// ============================================================================
// Token cache
// ============================================================================

struct CachedToken {
    access_token: String,
    expires_at: Instant,
}

/// In-process access-token cache keyed by client id
#[derive(Default)]
pub struct TokenCache {
    tokens: Mutex<HashMap<String, CachedToken>>,
}

impl TokenCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Token for `client_id` if one is cached and still valid
    pub async fn get(&self, client_id: &str) -> Option<String> {
        let tokens = self.tokens.lock().await;
        tokens
            .get(client_id)
            .filter(|t| t.expires_at > Instant::now())
            .map(|t| t.access_token.clone())
    }

    /// Remember a token; it is considered expired [`TOKEN_EXPIRY_MARGIN`] early
    pub async fn insert(&self, client_id: &str, access_token: String, expires_in: Duration) {
        let lifetime = expires_in.saturating_sub(TOKEN_EXPIRY_MARGIN);
        let mut tokens = self.tokens.lock().await;
        tokens.insert(
            client_id.to_string(),
            CachedToken {
                access_token,
                expires_at: Instant::now() + lifetime,
            },
        );
    }

    /// Forget the token for `client_id`
    pub async fn remove(&self, client_id: &str) {
        self.tokens.lock().await.remove(client_id);
    }
}

// ============================================================================
// Upstream DTOs
// ============================================================================

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default = "default_expires_in")]
    expires_in: u64,
}

fn default_expires_in() -> u64 {
    3600
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize, Serialize)]
pub struct ExternalUrls {
    pub spotify: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct SpotifyImage {
    pub url: String,
    pub height: Option<u32>,
    pub width: Option<u32>,
}

/// Artist as embedded in albums and tracks
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct SpotifyArtist {
    pub id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub external_urls: ExternalUrls,
    pub href: Option<String>,
    pub uri: Option<String>,
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Paging<T> {
    #[serde(default = "Vec::new")]
    items: Vec<T>,
}

#[derive(Debug, Deserialize)]
struct SimplifiedAlbum {
    id: String,
    name: String,
    #[serde(default)]
    artists: Vec<SpotifyArtist>,
    #[serde(default)]
    images: Vec<SpotifyImage>,
    release_date: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SearchTrack {
    id: String,
    name: String,
    #[serde(default)]
    artists: Vec<SpotifyArtist>,
    album: Option<SimplifiedAlbum>,
}

#[derive(Debug, Deserialize)]
struct SearchArtist {
    id: String,
    name: String,
    #[serde(default)]
    images: Vec<SpotifyImage>,
}

#[derive(Debug, Deserialize)]
struct SearchBody {
    albums: Option<Paging<SimplifiedAlbum>>,
    tracks: Option<Paging<SearchTrack>>,
    artists: Option<Paging<SearchArtist>>,
}

#[derive(Debug, Deserialize)]
struct NewReleasesBody {
    albums: Paging<SimplifiedAlbum>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Copyright {
    pub text: String,
    #[serde(rename = "type")]
    pub kind: String,
}

#[derive(Debug, Deserialize)]
struct AlbumTrackDto {
    id: String,
    name: String,
    duration_ms: u64,
    track_number: u32,
    #[serde(default)]
    artists: Vec<SpotifyArtist>,
    #[serde(default)]
    explicit: bool,
}

#[derive(Debug, Deserialize)]
struct FullAlbum {
    id: String,
    name: String,
    #[serde(default)]
    artists: Vec<SpotifyArtist>,
    #[serde(default)]
    images: Vec<SpotifyImage>,
    release_date: Option<String>,
    total_tracks: Option<u32>,
    tracks: Paging<AlbumTrackDto>,
    label: Option<String>,
    album_type: Option<String>,
    #[serde(default)]
    external_urls: ExternalUrls,
    popularity: Option<u32>,
    #[serde(default)]
    genres: Vec<String>,
    #[serde(default)]
    copyrights: Vec<Copyright>,
    available_markets: Option<Vec<String>>,
}

// ============================================================================
// Adapter output
// ============================================================================

/// One search or new-release hit
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchItem {
    pub id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub artist: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub release_date: Option<String>,
    #[serde(rename = "type")]
    pub kind: &'static str,
}

impl SearchItem {
    fn from_album(album: SimplifiedAlbum) -> Self {
        Self {
            id: album.id,
            name: album.name,
            artist: first_artist_name(&album.artists),
            image: first_image(&album.images),
            release_date: album.release_date,
            kind: "album",
        }
    }

    fn from_track(track: SearchTrack) -> Self {
        let (image, release_date) = match track.album {
            Some(album) => (first_image(&album.images), album.release_date),
            None => (None, None),
        };

        Self {
            id: track.id,
            name: track.name,
            artist: first_artist_name(&track.artists),
            image,
            release_date,
            kind: "track",
        }
    }

    fn from_artist(artist: SearchArtist) -> Self {
        Self {
            id: artist.id,
            name: artist.name,
            artist: None,
            image: first_image(&artist.images),
            release_date: None,
            kind: "artist",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct SearchResults {
    pub albums: Vec<SearchItem>,
    pub tracks: Vec<SearchItem>,
    pub artists: Vec<SearchItem>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct NewReleases {
    pub albums: Vec<SearchItem>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AlbumTrack {
    pub id: String,
    pub name: String,
    pub duration_ms: u64,
    pub track_number: u32,
    pub artists: Vec<String>,
    pub explicit: bool,
}

/// Album page payload
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AlbumDetail {
    pub id: String,
    pub name: String,
    /// First credited artist, `"Unknown Artist"` when none
    pub artist: String,
    pub artists: Vec<SpotifyArtist>,
    /// First cover image, `""` when none
    pub image: String,
    pub release_date: Option<String>,
    pub total_tracks: Option<u32>,
    /// Sum of track durations in milliseconds
    pub duration: u64,
    pub label: Option<String>,
    #[serde(rename = "type")]
    pub album_type: Option<String>,
    pub spotify_url: Option<String>,
    pub popularity: Option<u32>,
    pub genres: Vec<String>,
    pub copyrights: Vec<Copyright>,
    /// Number of markets the album is available in
    pub available_markets: usize,
    pub tracks: Vec<AlbumTrack>,
}

impl From<FullAlbum> for AlbumDetail {
    fn from(album: FullAlbum) -> Self {
        let duration = album.tracks.items.iter().map(|t| t.duration_ms).sum();
        let tracks = album
            .tracks
            .items
            .into_iter()
            .map(|t| AlbumTrack {
                id: t.id,
                name: t.name,
                duration_ms: t.duration_ms,
                track_number: t.track_number,
                artists: t.artists.into_iter().map(|a| a.name).collect(),
                explicit: t.explicit,
            })
            .collect();

        Self {
            id: album.id,
            name: album.name,
            artist: first_artist_name(&album.artists).unwrap_or_else(|| "Unknown Artist".to_string()),
            image: first_image(&album.images).unwrap_or_default(),
            artists: album.artists,
            release_date: album.release_date,
            total_tracks: album.total_tracks,
            duration,
            label: album.label,
            album_type: album.album_type,
            spotify_url: album.external_urls.spotify,
            popularity: album.popularity,
            genres: album.genres,
            copyrights: album.copyrights,
            available_markets: album.available_markets.map(|m| m.len()).unwrap_or(0),
            tracks,
        }
    }
}

fn first_artist_name(artists: &[SpotifyArtist]) -> Option<String> {
    artists.first().map(|a| a.name.clone())
}

fn first_image(images: &[SpotifyImage]) -> Option<String> {
    images.first().map(|i| i.url.clone())
}

// ============================================================================
// Client
// ============================================================================

/// Spotify API client
pub struct SpotifyClient {
    http_client: Client,
    accounts_url: String,
    api_url: String,
    credentials: Option<SpotifyCredentials>,
    token_cache: Option<TokenCache>,
}

impl SpotifyClient {
    pub fn new(
        http_client: Client,
        accounts_url: impl Into<String>,
        api_url: impl Into<String>,
        credentials: Option<SpotifyCredentials>,
        use_token_cache: bool,
    ) -> Self {
        Self {
            http_client,
            accounts_url: accounts_url.into(),
            api_url: api_url.into(),
            credentials,
            token_cache: use_token_cache.then(TokenCache::new),
        }
    }

    pub fn is_configured(&self) -> bool {
        self.credentials.is_some()
    }

    /// Obtain a bearer token, from the cache when allowed
    pub async fn access_token(&self) -> Result<String, UpstreamError> {
        let creds = self
            .credentials
            .as_ref()
            .ok_or(UpstreamError::NotConfigured("Spotify"))?;

        if let Some(cache) = &self.token_cache {
            if let Some(token) = cache.get(&creds.client_id).await {
                debug!("Using cached Spotify token");
                return Ok(token);
            }
        }

        let url = upstream::endpoint(&self.accounts_url, &["api", "token"])?;
        let request = self
            .http_client
            .post(url)
            .basic_auth(&creds.client_id, Some(&creds.client_secret))
            .form(&[("grant_type", "client_credentials")])
            .build()
            .map_err(|e| UpstreamError::Transport(e.to_string()))?;

        let token: TokenResponse = upstream::fetch_json(&self.http_client, request, SERVICE)
            .await
            .map_err(|e| UpstreamError::Auth(e.to_string()))?;

        if let Some(cache) = &self.token_cache {
            cache
                .insert(
                    &creds.client_id,
                    token.access_token.clone(),
                    Duration::from_secs(token.expires_in),
                )
                .await;
        }

        info!(expires_in = token.expires_in, "Obtained Spotify access token");
        Ok(token.access_token)
    }

    pub fn search_url(&self, query: &str, types: &str) -> Result<Url, UpstreamError> {
        let mut url = upstream::endpoint(&self.api_url, &["search"])?;
        url.query_pairs_mut()
            .append_pair("q", query)
            .append_pair("type", types)
            .append_pair("limit", &SEARCH_LIMIT.to_string());
        Ok(url)
    }

    pub fn new_releases_url(&self) -> Result<Url, UpstreamError> {
        let mut url = upstream::endpoint(&self.api_url, &["browse", "new-releases"])?;
        url.query_pairs_mut()
            .append_pair("limit", &NEW_RELEASES_LIMIT.to_string());
        Ok(url)
    }

    pub fn album_url(&self, album_id: &str) -> Result<Url, UpstreamError> {
        upstream::endpoint(&self.api_url, &["albums", album_id])
    }

    async fn get_json<T>(&self, url: Url) -> Result<T, UpstreamError>
    where
        T: serde::de::DeserializeOwned,
    {
        let token = self.access_token().await?;
        let request = self
            .http_client
            .get(url)
            .bearer_auth(token)
            .build()
            .map_err(|e| UpstreamError::Transport(e.to_string()))?;

        let result = upstream::fetch_json(&self.http_client, request, SERVICE).await;

        if let Err(UpstreamError::Status { status: 401, .. }) = &result {
            if let (Some(cache), Some(creds)) = (&self.token_cache, &self.credentials) {
                warn!("Spotify rejected access token, evicting it");
                cache.remove(&creds.client_id).await;
            }
        }

        result
    }

    /// Search albums, tracks and artists
    pub async fn search(&self, query: &str, types: &str) -> Result<SearchResults, UpstreamError> {
        let body: SearchBody = self.get_json(self.search_url(query, types)?).await?;

        Ok(SearchResults {
            albums: body
                .albums
                .map(|p| p.items.into_iter().map(SearchItem::from_album).collect())
                .unwrap_or_default(),
            tracks: body
                .tracks
                .map(|p| p.items.into_iter().map(SearchItem::from_track).collect())
                .unwrap_or_default(),
            artists: body
                .artists
                .map(|p| p.items.into_iter().map(SearchItem::from_artist).collect())
                .unwrap_or_default(),
        })
    }

    /// Latest album releases, used as the discovery feed
    pub async fn new_releases(&self) -> Result<NewReleases, UpstreamError> {
        let body: NewReleasesBody = self.get_json(self.new_releases_url()?).await?;

        Ok(NewReleases {
            albums: body.albums.items.into_iter().map(SearchItem::from_album).collect(),
        })
    }

    /// Full album with track list
    pub async fn album(&self, album_id: &str) -> Result<AlbumDetail, UpstreamError> {
        let album: FullAlbum = self.get_json(self.album_url(album_id)?).await?;
        Ok(album.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> SpotifyClient {
        SpotifyClient::new(
            Client::new(),
            "https://accounts.spotify.com",
            "https://api.spotify.com/v1",
            None,
            true,
        )
    }

    #[test]
    fn test_search_url() {
        let url = client().search_url("ok computer", DEFAULT_SEARCH_TYPES).unwrap();
        assert_eq!(url.path(), "/v1/search");
        let pairs: HashMap<String, String> = url.query_pairs().into_owned().collect();
        assert_eq!(pairs["q"], "ok computer");
        assert_eq!(pairs["type"], "album,track,artist");
        assert_eq!(pairs["limit"], "20");
    }

    #[test]
    fn test_new_releases_url() {
        let url = client().new_releases_url().unwrap();
        assert_eq!(url.as_str(), "https://api.spotify.com/v1/browse/new-releases?limit=12");
    }

    #[tokio::test]
    async fn test_missing_credentials() {
        let result = client().access_token().await;
        assert!(matches!(result, Err(UpstreamError::NotConfigured("Spotify"))));
    }

    #[tokio::test]
    async fn test_token_cache_expiry() {
        let cache = TokenCache::new();

        cache.insert("id", "fresh".into(), Duration::from_secs(3600)).await;
        assert_eq!(cache.get("id").await.as_deref(), Some("fresh"));
        assert_eq!(cache.get("other").await, None);

        // Lifetime shorter than the margin is expired immediately
        cache.insert("id", "short".into(), Duration::from_secs(30)).await;
        assert_eq!(cache.get("id").await, None);
    }

    #[tokio::test]
    async fn test_token_cache_remove() {
        let cache = TokenCache::new();
        cache.insert("id", "tok".into(), Duration::from_secs(3600)).await;
        cache.remove("id").await;
        assert_eq!(cache.get("id").await, None);
    }

    #[tokio::test]
    async fn test_rejected_token_is_evicted() {
        let mut server = mockito::Server::new_async().await;
        let token = server
            .mock("POST", "/api/token")
            .with_status(200)
            .with_body(r#"{"access_token":"fresh","expires_in":3600}"#)
            .expect(1)
            .create_async()
            .await;
        let rejected = server
            .mock("GET", "/v1/search")
            .match_query(mockito::Matcher::Any)
            .match_header("authorization", "Bearer revoked")
            .with_status(401)
            .expect(1)
            .create_async()
            .await;
        let accepted = server
            .mock("GET", "/v1/search")
            .match_query(mockito::Matcher::Any)
            .match_header("authorization", "Bearer fresh")
            .with_status(200)
            .with_body("{}")
            .expect(1)
            .create_async()
            .await;

        let client = SpotifyClient::new(
            Client::new(),
            server.url(),
            format!("{}/v1", server.url()),
            Some(SpotifyCredentials {
                client_id: "id".to_string(),
                client_secret: "secret".to_string(),
            }),
            true,
        );
        let cache = client.token_cache.as_ref().unwrap();
        cache.insert("id", "revoked".into(), Duration::from_secs(3600)).await;

        let result = client.search("low", DEFAULT_SEARCH_TYPES).await;
        assert!(matches!(result, Err(UpstreamError::Status { status: 401, .. })));
        assert_eq!(cache.get("id").await, None);

        // Next request exchanges the credentials again
        let results = client.search("low", DEFAULT_SEARCH_TYPES).await.unwrap();
        assert!(results.albums.is_empty());
        assert_eq!(cache.get("id").await.as_deref(), Some("fresh"));

        token.assert_async().await;
        rejected.assert_async().await;
        accepted.assert_async().await;
    }

    #[test]
    fn test_album_detail_reshaping() {
        let album: FullAlbum = serde_json::from_value(serde_json::json!({
            "id": "alb1",
            "name": "Discovery",
            "artists": [],
            "images": [],
            "release_date": "2001-03-12",
            "total_tracks": 2,
            "tracks": { "items": [
                { "id": "t1", "name": "One More Time", "duration_ms": 320000, "track_number": 1,
                  "artists": [{ "name": "Daft Punk" }], "explicit": false },
                { "id": "t2", "name": "Aerodynamic", "duration_ms": 212000, "track_number": 2,
                  "artists": [{ "name": "Daft Punk" }] }
            ]},
            "label": "Virgin",
            "album_type": "album",
            "external_urls": { "spotify": "https://open.spotify.com/album/alb1" },
            "popularity": 80,
            "available_markets": ["US", "GB", "FR"]
        }))
        .unwrap();

        let detail = AlbumDetail::from(album);

        assert_eq!(detail.artist, "Unknown Artist");
        assert_eq!(detail.image, "");
        assert_eq!(detail.duration, 532000);
        assert_eq!(detail.available_markets, 3);
        assert_eq!(detail.tracks[1].artists, vec!["Daft Punk".to_string()]);
        assert!(detail.genres.is_empty());

        let json = serde_json::to_value(&detail).unwrap();
        assert_eq!(json["type"], "album");
        assert_eq!(json["spotifyUrl"], "https://open.spotify.com/album/alb1");
        assert_eq!(json["tracks"][0]["duration_ms"], 320000);
    }

    #[test]
    fn test_track_item_takes_album_art() {
        let track: SearchTrack = serde_json::from_value(serde_json::json!({
            "id": "t1",
            "name": "Digital Love",
            "artists": [{ "name": "Daft Punk" }],
            "album": { "id": "a", "name": "Discovery",
                       "images": [{ "url": "https://i.scdn.co/x.jpg" }],
                       "release_date": "2001" }
        }))
        .unwrap();

        let item = SearchItem::from_track(track);
        assert_eq!(item.image.as_deref(), Some("https://i.scdn.co/x.jpg"));
        assert_eq!(item.release_date.as_deref(), Some("2001"));
        assert_eq!(item.kind, "track");
    }
}
