//! Discogs marketplace client (vinyl pressings)

use reqwest::{Client, Url};
use serde::{Deserialize, Serialize};

use super::upstream::{self, UpstreamError};

const SERVICE: &str = "discogs";
const PER_PAGE: u32 = 10;
/// Results shown on the album page
pub const MAX_RESULTS: usize = 5;

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<DiscogsRelease>,
    pagination: Option<Pagination>,
}

#[derive(Debug, Deserialize)]
struct Pagination {
    items: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct DiscogsRelease {
    id: u64,
    title: String,
    year: Option<String>,
    country: Option<String>,
    #[serde(default)]
    format: Vec<String>,
    #[serde(default)]
    label: Vec<String>,
    cover_image: Option<String>,
    thumb: Option<String>,
    uri: Option<String>,
    resource_url: Option<String>,
}

/// One pressing shown on the album page
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VinylRelease {
    pub id: u64,
    pub title: String,
    pub year: Option<String>,
    pub country: Option<String>,
    /// Formats joined with ", ", `"Vinyl"` when upstream lists none
    pub format: String,
    /// Labels joined with ", ", `"Unknown Label"` when upstream lists none
    pub label: String,
    pub cover_image: Option<String>,
    pub uri: Option<String>,
    pub resource_url: Option<String>,
}

impl From<DiscogsRelease> for VinylRelease {
    fn from(release: DiscogsRelease) -> Self {
        Self {
            id: release.id,
            title: release.title,
            year: release.year,
            country: release.country,
            format: join_or(&release.format, "Vinyl"),
            label: join_or(&release.label, "Unknown Label"),
            cover_image: non_empty(release.cover_image).or_else(|| non_empty(release.thumb)),
            uri: release.uri,
            resource_url: release.resource_url,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VinylResults {
    pub results: Vec<VinylRelease>,
    pub total_results: u64,
}

fn join_or(values: &[String], fallback: &str) -> String {
    let joined = values.join(", ");
    if joined.is_empty() {
        fallback.to_string()
    } else {
        joined
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

/// Discogs API client
pub struct DiscogsClient {
    http_client: Client,
    base_url: String,
    token: Option<String>,
}

impl DiscogsClient {
    pub fn new(http_client: Client, base_url: impl Into<String>, token: Option<String>) -> Self {
        Self {
            http_client,
            base_url: base_url.into(),
            token,
        }
    }

    pub fn is_configured(&self) -> bool {
        self.token.is_some()
    }

    pub fn search_url(&self, artist: &str, album: &str) -> Result<Url, UpstreamError> {
        let mut url = upstream::endpoint(&self.base_url, &["database", "search"])?;
        url.query_pairs_mut()
            .append_pair("q", &format!("{} {}", artist, album))
            .append_pair("type", "release")
            .append_pair("format", "vinyl")
            .append_pair("per_page", &PER_PAGE.to_string());
        Ok(url)
    }

    /// Search vinyl releases of an album
    pub async fn search_vinyl(&self, artist: &str, album: &str) -> Result<VinylResults, UpstreamError> {
        let token = self.token.as_ref().ok_or(UpstreamError::NotConfigured("Discogs"))?;

        let request = self
            .http_client
            .get(self.search_url(artist, album)?)
            .header(reqwest::header::AUTHORIZATION, format!("Discogs token={}", token))
            .build()
            .map_err(|e| UpstreamError::Transport(e.to_string()))?;

        let body: SearchResponse = upstream::fetch_json(&self.http_client, request, SERVICE).await?;

        Ok(VinylResults {
            total_results: body.pagination.and_then(|p| p.items).unwrap_or(0),
            results: body
                .results
                .into_iter()
                .take(MAX_RESULTS)
                .map(VinylRelease::from)
                .collect(),
        })
    }
}
