//! Integration tests for the adapter endpoints
//!
//! Upstreams are replaced by a local mockito server; the router is driven
//! in-process with `oneshot`.

use axum::{
    body::Body,
    http::{header, HeaderMap, Request, StatusCode},
    Router,
};
use mockito::{Matcher, Server};
use serde_json::{json, Value};
use tower::util::ServiceExt;

use mboard_proxy::config::SpotifyCredentials;
use mboard_proxy::{build_router, AppState, ProxyConfig};

/// Config with every upstream pointed at the mock server and no credentials
fn mock_config(server: &Server) -> ProxyConfig {
    let url = server.url();
    ProxyConfig {
        audiodb_base_url: url.clone(),
        spotify_accounts_url: url.clone(),
        spotify_api_url: format!("{}/v1", url),
        bandsintown_base_url: url.clone(),
        bandsintown_app_id: "test_app".to_string(),
        discogs_base_url: url.clone(),
        genius_base_url: url.clone(),
        chat_base_url: url,
        ..ProxyConfig::default()
    }
}

fn app(config: &ProxyConfig) -> Router {
    build_router(AppState::new(config).expect("Should build clients"))
}

async fn post_json(app: Router, uri: &str, body: Value) -> (StatusCode, HeaderMap, Value) {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .header(header::ORIGIN, "http://localhost:5173")
        .body(Body::from(body.to_string()))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("Should read body");
    let json = serde_json::from_slice(&bytes).expect("Should parse JSON");

    (status, headers, json)
}

// =============================================================================
// Health and CORS
// =============================================================================

#[tokio::test]
async fn test_health() {
    let server = Server::new_async().await;
    let request = Request::builder().uri("/health").body(Body::empty()).unwrap();

    let response = app(&mock_config(&server)).oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["status"], "ok");
    assert_eq!(body["module"], "mboard-proxy");
    assert_eq!(body["configured"]["spotify"], false);
}

#[tokio::test]
async fn test_preflight_answered_with_cors_headers() {
    let server = Server::new_async().await;
    let request = Request::builder()
        .method("OPTIONS")
        .uri("/functions/spotify-search")
        .header(header::ORIGIN, "http://localhost:5173")
        .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
        .header(header::ACCESS_CONTROL_REQUEST_HEADERS, "content-type, authorization")
        .body(Body::empty())
        .unwrap();

    let response = app(&mock_config(&server)).oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN],
        "*"
    );
}

#[tokio::test]
async fn test_bare_options_is_empty_ok() {
    let server = Server::new_async().await;
    let request = Request::builder()
        .method("OPTIONS")
        .uri("/functions/music-chat")
        .body(Body::empty())
        .unwrap();

    let response = app(&mock_config(&server)).oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert!(bytes.is_empty());
}

// =============================================================================
// Catalog (AudioDB)
// =============================================================================

#[tokio::test]
async fn test_audiodb_null_list_becomes_empty() {
    let mut server = Server::new_async().await;
    let _m = server
        .mock("GET", Matcher::Regex(r"^/search\.php".to_string()))
        .match_query(Matcher::UrlEncoded("s".into(), "Nobody".into()))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"artists":null}"#)
        .create_async()
        .await;

    let (status, headers, body) = post_json(
        app(&mock_config(&server)),
        "/functions/audiodb-search",
        json!({ "action": "searchArtist", "query": "Nobody" }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "artists": [] }));
    assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
}

#[tokio::test]
async fn test_audiodb_tracks() {
    let mut server = Server::new_async().await;
    let _m = server
        .mock("GET", Matcher::Regex(r"^/track\.php".to_string()))
        .match_query(Matcher::UrlEncoded("m".into(), "2115888".into()))
        .with_status(200)
        .with_body(
            r#"{"track":[{"idTrack":"32793500","idAlbum":"2115888","strTrack":"La Femme d'Argent","intDuration":"429000","intTrackNumber":"1"}]}"#,
        )
        .create_async()
        .await;

    let (status, _, body) = post_json(
        app(&mock_config(&server)),
        "/functions/audiodb-search",
        json!({ "action": "getTracksByAlbum", "albumId": 2115888 }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["track"][0]["strTrack"], "La Femme d'Argent");
}

#[tokio::test]
async fn test_unknown_action_makes_no_upstream_call() {
    let mut server = Server::new_async().await;
    let m = server
        .mock("GET", Matcher::Any)
        .expect(0)
        .create_async()
        .await;

    let (status, _, body) = post_json(
        app(&mock_config(&server)),
        "/functions/audiodb-search",
        json!({ "action": "dropTables" }),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Invalid action: dropTables");
    m.assert_async().await;
}

#[tokio::test]
async fn test_malformed_body_is_bad_request() {
    let server = Server::new_async().await;
    let request = Request::builder()
        .method("POST")
        .uri("/functions/audiodb-search")
        .body(Body::from("{not json"))
        .unwrap();

    let response = app(&mock_config(&server)).oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

// =============================================================================
// Events (Bandsintown)
// =============================================================================

#[tokio::test]
async fn test_bandsintown_unknown_artist() {
    let mut server = Server::new_async().await;
    let _m = server
        .mock("GET", "/artists/Nobody%20Here")
        .match_query(Matcher::UrlEncoded("app_id".into(), "test_app".into()))
        .with_status(404)
        .with_body(r#"{"errors":["Unknown Artist"]}"#)
        .create_async()
        .await;

    let (status, _, body) = post_json(
        app(&mock_config(&server)),
        "/functions/bandsintown-api",
        json!({ "action": "getArtist", "artistName": "Nobody Here" }),
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({ "error": "Artist not found" }));
}

#[tokio::test]
async fn test_bandsintown_events_wrapped() {
    let mut server = Server::new_async().await;
    let _m = server
        .mock("GET", "/artists/Low/events")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("app_id".into(), "test_app".into()),
            Matcher::UrlEncoded("date".into(), "upcoming".into()),
        ]))
        .with_status(200)
        .with_body(
            r#"[{"id":1012,"datetime":"2025-05-01T20:00:00","venue":{"name":"First Avenue","city":"Minneapolis"},"lineup":["Low"]}]"#,
        )
        .create_async()
        .await;

    let (status, _, body) = post_json(
        app(&mock_config(&server)),
        "/functions/bandsintown-api",
        json!({ "action": "getEvents", "artistName": "Low", "dateFilter": "all" }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["events"][0]["id"], "1012");
    assert_eq!(body["events"][0]["venue"]["name"], "First Avenue");
}

// =============================================================================
// Vinyl (Discogs)
// =============================================================================

#[tokio::test]
async fn test_discogs_without_token_is_soft() {
    let server = Server::new_async().await;

    let (status, _, body) = post_json(
        app(&mock_config(&server)),
        "/functions/discogs-vinyl",
        json!({ "artist": "Portishead", "album": "Dummy" }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "error": "Discogs API not configured", "results": [] }));
}

#[tokio::test]
async fn test_discogs_requires_artist_and_album() {
    let server = Server::new_async().await;

    let (status, _, body) = post_json(
        app(&mock_config(&server)),
        "/functions/discogs-vinyl",
        json!({ "artist": "Portishead" }),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Artist and album are required");
    assert_eq!(body["results"], json!([]));
}

#[tokio::test]
async fn test_discogs_results_mapped() {
    let mut server = Server::new_async().await;
    let _m = server
        .mock("GET", "/database/search")
        .match_header("authorization", "Discogs token=secret")
        .match_query(Matcher::UrlEncoded("format".into(), "vinyl".into()))
        .with_status(200)
        .with_body(
            r#"{"pagination":{"items":42},"results":[{"id":7,"title":"Portishead - Dummy","year":"1994","format":["Vinyl","LP"],"label":[],"thumb":"t.jpg"}]}"#,
        )
        .create_async()
        .await;

    let mut config = mock_config(&server);
    config.discogs_token = Some("secret".to_string());

    let (status, _, body) = post_json(
        app(&config),
        "/functions/discogs-vinyl",
        json!({ "artist": "Portishead", "album": "Dummy" }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["totalResults"], 42);
    assert_eq!(body["results"][0]["id"], 7);
    assert_eq!(body["results"][0]["format"], "Vinyl, LP");
    assert_eq!(body["results"][0]["label"], "Unknown Label");
    assert_eq!(body["results"][0]["coverImage"], "t.jpg");
}

// =============================================================================
// Lyrics (Genius)
// =============================================================================

#[tokio::test]
async fn test_genius_without_token_is_soft() {
    let server = Server::new_async().await;

    let (status, _, body) = post_json(
        app(&mock_config(&server)),
        "/functions/genius-lyrics",
        json!({ "action": "search", "query": "Teardrop" }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert!(body["error"].as_str().unwrap().starts_with("Lyrics service not configured"));
    assert_eq!(body["response"]["hits"], json!([]));
}

#[tokio::test]
async fn test_genius_rejected_token_is_soft() {
    let mut server = Server::new_async().await;
    let _m = server
        .mock("GET", "/search")
        .match_query(Matcher::Any)
        .with_status(401)
        .create_async()
        .await;

    let mut config = mock_config(&server);
    config.genius_token = Some("stale".to_string());

    let (status, _, body) = post_json(
        app(&config),
        "/functions/genius-lyrics",
        json!({ "action": "search", "query": "Teardrop" }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body["error"],
        "Lyrics service requires valid API token. Please configure GENIUS_API_TOKEN."
    );
}

// =============================================================================
// Chat
// =============================================================================

#[tokio::test]
async fn test_chat_without_key() {
    let server = Server::new_async().await;

    let (status, _, body) = post_json(
        app(&mock_config(&server)),
        "/functions/music-chat",
        json!({ "messages": [{ "role": "user", "content": "hi" }] }),
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "chat API key is not configured");
}

#[tokio::test]
async fn test_chat_rate_limited() {
    let mut server = Server::new_async().await;
    let _m = server
        .mock("POST", "/v1/chat/completions")
        .with_status(429)
        .create_async()
        .await;

    let mut config = mock_config(&server);
    config.chat_api_key = Some("key".to_string());

    let (status, _, body) = post_json(
        app(&config),
        "/functions/music-chat",
        json!({ "messages": [{ "role": "user", "content": "hi" }] }),
    )
    .await;

    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(body["error"], "Rate limits exceeded, please try again later.");
}

#[tokio::test]
async fn test_chat_reply_parsed() {
    let reply = "Try this!\nRECOMMENDATION: {\"albumTitle\": \"Mezzanine\", \"artist\": \"Massive Attack\", \"matchPercentage\": 91}\nEnjoy.";
    let completion = json!({ "choices": [{ "message": { "role": "assistant", "content": reply } }] });

    let mut server = Server::new_async().await;
    let _m = server
        .mock("POST", "/v1/chat/completions")
        .match_header("authorization", "Bearer key")
        .match_body(Matcher::PartialJson(json!({ "stream": false })))
        .with_status(200)
        .with_body(completion.to_string())
        .create_async()
        .await;

    let mut config = mock_config(&server);
    config.chat_api_key = Some("key".to_string());

    let (status, _, body) = post_json(
        app(&config),
        "/functions/music-chat",
        json!({ "messages": [{ "role": "user", "content": "Something moody" }] }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["recommendations"][0]["albumTitle"], "Mezzanine");
    assert_eq!(body["recommendations"][0]["matchPercentage"], 91);
    assert!(!body["content"].as_str().unwrap().contains("RECOMMENDATION"));
}

// =============================================================================
// Spotify
// =============================================================================

fn spotify_config(server: &Server) -> ProxyConfig {
    let mut config = mock_config(server);
    config.spotify = Some(SpotifyCredentials {
        client_id: "id".to_string(),
        client_secret: "secret".to_string(),
    });
    config
}

#[tokio::test]
async fn test_spotify_without_credentials() {
    let server = Server::new_async().await;

    let (status, _, body) = post_json(
        app(&mock_config(&server)),
        "/functions/spotify-search",
        json!({ "query": "Air" }),
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "Spotify API not configured");
}

#[tokio::test]
async fn test_spotify_search_requires_query() {
    let server = Server::new_async().await;

    let (status, _, body) = post_json(
        app(&spotify_config(&server)),
        "/functions/spotify-search",
        json!({}),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Query is required");
}

#[tokio::test]
async fn test_spotify_token_reused_across_calls() {
    let mut server = Server::new_async().await;
    let token = server
        .mock("POST", "/api/token")
        .match_body(Matcher::UrlEncoded("grant_type".into(), "client_credentials".into()))
        .with_status(200)
        .with_body(r#"{"access_token":"tok","token_type":"Bearer","expires_in":3600}"#)
        .expect(1)
        .create_async()
        .await;
    let _search = server
        .mock("GET", "/v1/search")
        .match_header("authorization", "Bearer tok")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(
            r#"{"albums":{"items":[{"id":"a1","name":"Moon Safari","artists":[{"name":"Air"}],"images":[{"url":"cover.jpg"}],"release_date":"1998-01-16"}]},"artists":{"items":[{"id":"r1","name":"Air","images":[]}]}}"#,
        )
        .expect(2)
        .create_async()
        .await;

    let app = app(&spotify_config(&server));

    for _ in 0..2 {
        let (status, _, body) = post_json(
            app.clone(),
            "/functions/spotify-search",
            json!({ "query": "Air" }),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["albums"][0]["artist"], "Air");
        assert_eq!(body["albums"][0]["type"], "album");
        assert_eq!(body["tracks"], json!([]));
        assert_eq!(body["artists"][0]["type"], "artist");
    }

    token.assert_async().await;
}

#[tokio::test]
async fn test_spotify_album_not_found() {
    let mut server = Server::new_async().await;
    let _token = server
        .mock("POST", "/api/token")
        .with_status(200)
        .with_body(r#"{"access_token":"tok","expires_in":3600}"#)
        .create_async()
        .await;
    let _album = server
        .mock("GET", "/v1/albums/missing")
        .with_status(404)
        .create_async()
        .await;

    let (status, _, body) = post_json(
        app(&spotify_config(&server)),
        "/functions/spotify-album-details",
        json!({ "albumId": "missing" }),
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Album not found");
}

#[tokio::test]
async fn test_spotify_token_failure() {
    let mut server = Server::new_async().await;
    let _token = server
        .mock("POST", "/api/token")
        .with_status(400)
        .with_body(r#"{"error":"invalid_client"}"#)
        .create_async()
        .await;

    let (status, _, body) = post_json(
        app(&spotify_config(&server)),
        "/functions/spotify-recommendations",
        json!({}),
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "Failed to authenticate with Spotify");
}
