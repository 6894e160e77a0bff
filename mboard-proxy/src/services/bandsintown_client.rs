//! Bandsintown event listings client
//!
//! Public API identified by an app id in the query string; no secret.

use chrono::{Days, Months, NaiveDate};
use reqwest::{Client, Url};
use serde::{Deserialize, Serialize};

use super::upstream::{self, id_string, UpstreamError};

const SERVICE: &str = "bandsintown";

/// Preset windows offered by the concerts page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DateFilter {
    All,
    Week,
    Month,
    ThreeMonths,
}

impl DateFilter {
    /// Upstream `date` parameter for this window starting at `today`
    ///
    /// `all` maps to Bandsintown's `upcoming`; the others to an inclusive
    /// `YYYY-MM-DD,YYYY-MM-DD` range.
    pub fn date_range(self, today: NaiveDate) -> String {
        let end = match self {
            DateFilter::All => return "upcoming".to_string(),
            DateFilter::Week => today.checked_add_days(Days::new(7)),
            DateFilter::Month => today.checked_add_months(Months::new(1)),
            DateFilter::ThreeMonths => today.checked_add_months(Months::new(3)),
        }
        .unwrap_or(today);

        format!("{},{}", today.format("%Y-%m-%d"), end.format("%Y-%m-%d"))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum BandsintownAction {
    GetArtist { artist_name: String },
    GetEvents { artist_name: String, date_range: Option<String> },
}

impl BandsintownAction {
    pub fn name(&self) -> &'static str {
        match self {
            BandsintownAction::GetArtist { .. } => "getArtist",
            BandsintownAction::GetEvents { .. } => "getEvents",
        }
    }
}

/// Artist profile
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct BandsintownArtist {
    #[serde(deserialize_with = "id_string")]
    pub id: String,
    pub name: String,
    pub url: Option<String>,
    pub image_url: Option<String>,
    pub thumb_url: Option<String>,
    pub facebook_page_url: Option<String>,
    pub mbid: Option<String>,
    #[serde(default)]
    pub tracker_count: u64,
    #[serde(default)]
    pub upcoming_event_count: u64,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Venue {
    pub name: String,
    pub city: Option<String>,
    pub region: Option<String>,
    pub country: Option<String>,
    pub latitude: Option<String>,
    pub longitude: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Offer {
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub url: Option<String>,
    pub status: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Event {
    #[serde(deserialize_with = "id_string")]
    pub id: String,
    pub url: Option<String>,
    pub datetime: String,
    pub on_sale_datetime: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub venue: Venue,
    #[serde(default)]
    pub offers: Vec<Offer>,
    #[serde(default)]
    pub lineup: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EventList {
    pub events: Vec<Event>,
}

/// Adapter response
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum BandsintownResponse {
    Artist(BandsintownArtist),
    Events(EventList),
}

/// Bandsintown API client
pub struct BandsintownClient {
    http_client: Client,
    base_url: String,
    app_id: String,
}

impl BandsintownClient {
    pub fn new(http_client: Client, base_url: impl Into<String>, app_id: impl Into<String>) -> Self {
        Self {
            http_client,
            base_url: base_url.into(),
            app_id: app_id.into(),
        }
    }

    pub fn url_for(&self, action: &BandsintownAction) -> Result<Url, UpstreamError> {
        let mut url = match action {
            BandsintownAction::GetArtist { artist_name } => {
                upstream::endpoint(&self.base_url, &["artists", artist_name.as_str()])?
            }
            BandsintownAction::GetEvents { artist_name, .. } => {
                upstream::endpoint(&self.base_url, &["artists", artist_name.as_str(), "events"])?
            }
        };

        {
            let mut query = url.query_pairs_mut();
            query.append_pair("app_id", &self.app_id);
            if let BandsintownAction::GetEvents {
                date_range: Some(range),
                ..
            } = action
            {
                query.append_pair("date", range);
            }
        }

        Ok(url)
    }

    pub async fn fetch(&self, action: &BandsintownAction) -> Result<BandsintownResponse, UpstreamError> {
        let request = self
            .http_client
            .get(self.url_for(action)?)
            .build()
            .map_err(|e| UpstreamError::Transport(e.to_string()))?;

        match action {
            BandsintownAction::GetArtist { .. } => {
                let artist: BandsintownArtist =
                    upstream::fetch_json(&self.http_client, request, SERVICE).await?;
                Ok(BandsintownResponse::Artist(artist))
            }
            BandsintownAction::GetEvents { .. } => {
                let events: Vec<Event> = upstream::fetch_json(&self.http_client, request, SERVICE).await?;
                Ok(BandsintownResponse::Events(EventList { events }))
            }
        }
    }
}
