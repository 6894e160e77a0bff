//! Genius lyrics metadata client
//!
//! Genius does not serve lyric text through its API; the app links to the
//! song page using the `url` of the best search hit.

use reqwest::{Client, Url};
use serde::{Deserialize, Serialize};

use super::upstream::{self, UpstreamError};

const SERVICE: &str = "genius";

#[derive(Debug, Clone, PartialEq)]
pub enum GeniusAction {
    Search { query: String },
    GetSong { song_id: String },
}

impl GeniusAction {
    pub fn name(&self) -> &'static str {
        match self {
            GeniusAction::Search { .. } => "search",
            GeniusAction::GetSong { .. } => "getSong",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct GeniusArtist {
    pub id: u64,
    pub name: String,
    pub url: Option<String>,
    pub image_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct GeniusSong {
    pub id: u64,
    pub title: String,
    pub full_title: Option<String>,
    pub url: String,
    pub primary_artist: Option<GeniusArtist>,
    pub song_art_image_thumbnail_url: Option<String>,
    pub header_image_thumbnail_url: Option<String>,
    pub release_date_for_display: Option<String>,
    pub lyrics_state: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct GeniusHit {
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    pub result: GeniusSong,
}

/// Body of the `response` object, search or single song
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum GeniusBody {
    Hits { hits: Vec<GeniusHit> },
    Song { song: GeniusSong },
}

/// Genius wraps every payload in `{ "response": ... }`; the adapter keeps it
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct GeniusResponse {
    pub response: GeniusBody,
}

#[derive(Deserialize)]
struct SearchEnvelope {
    response: SearchBody,
}

#[derive(Deserialize)]
struct SearchBody {
    #[serde(default)]
    hits: Vec<GeniusHit>,
}

#[derive(Deserialize)]
struct SongEnvelope {
    response: SongBody,
}

#[derive(Deserialize)]
struct SongBody {
    song: GeniusSong,
}

/// Genius API client
pub struct GeniusClient {
    http_client: Client,
    base_url: String,
    token: Option<String>,
}

impl GeniusClient {
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

    pub fn url_for(&self, action: &GeniusAction) -> Result<Url, UpstreamError> {
        match action {
            GeniusAction::Search { query } => {
                let mut url = upstream::endpoint(&self.base_url, &["search"])?;
                url.query_pairs_mut().append_pair("q", query);
                Ok(url)
            }
            GeniusAction::GetSong { song_id } => {
                upstream::endpoint(&self.base_url, &["songs", song_id.as_str()])
            }
        }
    }

    pub async fn fetch(&self, action: &GeniusAction) -> Result<GeniusResponse, UpstreamError> {
        let token = self.token.as_ref().ok_or(UpstreamError::NotConfigured("Genius"))?;

        let request = self
            .http_client
            .get(self.url_for(action)?)
            .bearer_auth(token)
            .build()
            .map_err(|e| UpstreamError::Transport(e.to_string()))?;

        let body = match action {
            GeniusAction::Search { .. } => {
                let envelope: SearchEnvelope =
                    upstream::fetch_json(&self.http_client, request, SERVICE).await?;
                GeniusBody::Hits {
                    hits: envelope.response.hits,
                }
            }
            GeniusAction::GetSong { .. } => {
                let envelope: SongEnvelope =
                    upstream::fetch_json(&self.http_client, request, SERVICE).await?;
                GeniusBody::Song {
                    song: envelope.response.song,
                }
            }
        };

        Ok(GeniusResponse { response: body })
    }
}
