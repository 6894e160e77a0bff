//! TheAudioDB catalog client
//!
//! Free-tier API with no credential. Upstream answers `null` instead of an
//! empty list when nothing matches; the envelopes below normalize that.

use reqwest::{Client, Url};
use serde::{Deserialize, Serialize};

use super::upstream::{self, UpstreamError};

const SERVICE: &str = "audiodb";

/// Catalog lookups supported by the adapter
#[derive(Debug, Clone, PartialEq)]
pub enum AudioDbAction {
    SearchArtist { query: String },
    AlbumsByArtist { artist_id: String },
    TracksByAlbum { album_id: String },
    SearchAlbum { artist: String, album: String },
}

impl AudioDbAction {
    pub fn name(&self) -> &'static str {
        match self {
            AudioDbAction::SearchArtist { .. } => "searchArtist",
            AudioDbAction::AlbumsByArtist { .. } => "getAlbumsByArtist",
            AudioDbAction::TracksByAlbum { .. } => "getTracksByAlbum",
            AudioDbAction::SearchAlbum { .. } => "searchAlbum",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct AudioDbArtist {
    #[serde(rename = "idArtist")]
    pub id_artist: String,
    #[serde(rename = "strArtist")]
    pub str_artist: String,
    #[serde(rename = "strArtistThumb")]
    pub str_artist_thumb: Option<String>,
    #[serde(rename = "strGenre")]
    pub str_genre: Option<String>,
    #[serde(rename = "strStyle")]
    pub str_style: Option<String>,
    #[serde(rename = "strMood")]
    pub str_mood: Option<String>,
    #[serde(rename = "strCountry")]
    pub str_country: Option<String>,
    #[serde(rename = "intFormedYear")]
    pub int_formed_year: Option<String>,
    #[serde(rename = "strWebsite")]
    pub str_website: Option<String>,
    #[serde(rename = "strBiographyEN")]
    pub str_biography_en: Option<String>,
    #[serde(rename = "strMusicBrainzID")]
    pub str_music_brainz_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct AudioDbAlbum {
    #[serde(rename = "idAlbum")]
    pub id_album: String,
    #[serde(rename = "idArtist")]
    pub id_artist: Option<String>,
    #[serde(rename = "strAlbum")]
    pub str_album: String,
    #[serde(rename = "strArtist")]
    pub str_artist: Option<String>,
    #[serde(rename = "intYearReleased")]
    pub int_year_released: Option<String>,
    #[serde(rename = "strGenre")]
    pub str_genre: Option<String>,
    #[serde(rename = "strStyle")]
    pub str_style: Option<String>,
    #[serde(rename = "strMood")]
    pub str_mood: Option<String>,
    #[serde(rename = "strLabel")]
    pub str_label: Option<String>,
    #[serde(rename = "strAlbumThumb")]
    pub str_album_thumb: Option<String>,
    #[serde(rename = "strDescriptionEN")]
    pub str_description_en: Option<String>,
    #[serde(rename = "intScore")]
    pub int_score: Option<String>,
    #[serde(rename = "intScoreVotes")]
    pub int_score_votes: Option<String>,
    #[serde(rename = "intLoved")]
    pub int_loved: Option<String>,
    #[serde(rename = "strMusicBrainzID")]
    pub str_music_brainz_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct AudioDbTrack {
    #[serde(rename = "idTrack")]
    pub id_track: String,
    #[serde(rename = "idAlbum")]
    pub id_album: Option<String>,
    #[serde(rename = "strTrack")]
    pub str_track: String,
    #[serde(rename = "strArtist")]
    pub str_artist: Option<String>,
    #[serde(rename = "intDuration")]
    pub int_duration: Option<String>,
    #[serde(rename = "intTrackNumber")]
    pub int_track_number: Option<String>,
    #[serde(rename = "strTrackThumb")]
    pub str_track_thumb: Option<String>,
    #[serde(rename = "strGenre")]
    pub str_genre: Option<String>,
    #[serde(rename = "strMusicVid")]
    pub str_music_vid: Option<String>,
}

#[derive(Deserialize)]
struct ArtistsEnvelope {
    #[serde(default)]
    artists: Option<Vec<AudioDbArtist>>,
}

#[derive(Deserialize)]
struct AlbumEnvelope {
    #[serde(default)]
    album: Option<Vec<AudioDbAlbum>>,
}

#[derive(Deserialize)]
struct TrackEnvelope {
    #[serde(default)]
    track: Option<Vec<AudioDbTrack>>,
}

/// Adapter response; keys match the upstream envelopes
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum AudioDbResponse {
    Artists { artists: Vec<AudioDbArtist> },
    Albums { album: Vec<AudioDbAlbum> },
    Tracks { track: Vec<AudioDbTrack> },
}

impl AudioDbResponse {
    /// Empty result in the shape `action` would normally return
    pub fn empty_for(action: &AudioDbAction) -> Self {
        match action {
            AudioDbAction::SearchArtist { .. } => AudioDbResponse::Artists { artists: Vec::new() },
            AudioDbAction::AlbumsByArtist { .. } | AudioDbAction::SearchAlbum { .. } => {
                AudioDbResponse::Albums { album: Vec::new() }
            }
            AudioDbAction::TracksByAlbum { .. } => AudioDbResponse::Tracks { track: Vec::new() },
        }
    }
}

/// TheAudioDB API client
pub struct AudioDbClient {
    http_client: Client,
    base_url: String,
}

impl AudioDbClient {
    pub fn new(http_client: Client, base_url: impl Into<String>) -> Self {
        Self {
            http_client,
            base_url: base_url.into(),
        }
    }

    /// Upstream URL for an action
    pub fn url_for(&self, action: &AudioDbAction) -> Result<Url, UpstreamError> {
        let (path, params): (&str, Vec<(&str, &str)>) = match action {
            AudioDbAction::SearchArtist { query } => ("search.php", vec![("s", query.as_str())]),
            AudioDbAction::AlbumsByArtist { artist_id } => ("album.php", vec![("i", artist_id.as_str())]),
            AudioDbAction::TracksByAlbum { album_id } => ("track.php", vec![("m", album_id.as_str())]),
            AudioDbAction::SearchAlbum { artist, album } => (
                "searchalbum.php",
                vec![("s", artist.as_str()), ("a", album.as_str())],
            ),
        };

        let mut url = upstream::endpoint(&self.base_url, &[path])?;
        url.query_pairs_mut().extend_pairs(params);
        Ok(url)
    }

    /// Run one catalog lookup
    pub async fn fetch(&self, action: &AudioDbAction) -> Result<AudioDbResponse, UpstreamError> {
        let url = self.url_for(action)?;
        let request = self
            .http_client
            .get(url)
            .build()
            .map_err(|e| UpstreamError::Transport(e.to_string()))?;

        let response = match action {
            AudioDbAction::SearchArtist { .. } => {
                let body: ArtistsEnvelope = upstream::fetch_json(&self.http_client, request, SERVICE).await?;
                AudioDbResponse::Artists {
                    artists: body.artists.unwrap_or_default(),
                }
            }
            AudioDbAction::AlbumsByArtist { .. } | AudioDbAction::SearchAlbum { .. } => {
                let body: AlbumEnvelope = upstream::fetch_json(&self.http_client, request, SERVICE).await?;
                AudioDbResponse::Albums {
                    album: body.album.unwrap_or_default(),
                }
            }
            AudioDbAction::TracksByAlbum { .. } => {
                let body: TrackEnvelope = upstream::fetch_json(&self.http_client, request, SERVICE).await?;
                AudioDbResponse::Tracks {
                    track: body.track.unwrap_or_default(),
                }
            }
        };

        Ok(response)
    }
}
