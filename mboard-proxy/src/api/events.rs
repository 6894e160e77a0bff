//! Concert listings (Bandsintown)
//!
//! `POST /functions/bandsintown-api`

use axum::{body::Bytes, extract::State, routing::post, Json, Router};
use chrono::{NaiveDate, Utc};
use serde::Deserialize;
use tracing::info;

use super::{non_blank, parse_body, preflight, required};
use crate::error::{AdapterError, AdapterResult};
use crate::services::{BandsintownAction, BandsintownResponse, DateFilter, UpstreamError};
use crate::AppState;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventsRequest {
    pub action: Option<String>,
    pub artist_name: Option<String>,
    /// Raw upstream `date` value, e.g. `upcoming` or `2025-01-01,2025-02-01`
    pub date_range: Option<String>,
    /// Preset window; ignored when `date_range` is given
    pub date_filter: Option<DateFilter>,
}

impl EventsRequest {
    /// Resolve the request against the current date
    pub fn into_action(self, today: NaiveDate) -> AdapterResult<BandsintownAction> {
        match self.action.as_deref() {
            Some("getArtist") => Ok(BandsintownAction::GetArtist {
                artist_name: required(self.artist_name, "artistName")?,
            }),
            Some("getEvents") => {
                let artist_name = required(self.artist_name, "artistName")?;
                let date_range = non_blank(self.date_range)
                    .or_else(|| self.date_filter.map(|f| f.date_range(today)));
                Ok(BandsintownAction::GetEvents {
                    artist_name,
                    date_range,
                })
            }
            other => Err(AdapterError::InvalidAction(other.unwrap_or_default().to_string())),
        }
    }
}

/// POST /functions/bandsintown-api
pub async fn bandsintown_api(
    State(state): State<AppState>,
    body: Bytes,
) -> AdapterResult<Json<BandsintownResponse>> {
    let request: EventsRequest = parse_body(&body)?;
    let action = request.into_action(Utc::now().date_naive())?;

    match state.bandsintown.fetch(&action).await {
        Ok(response) => {
            info!(action = action.name(), "Bandsintown lookup complete");
            Ok(Json(response))
        }
        Err(UpstreamError::NotFound) => Err(AdapterError::NotFound("Artist not found".to_string())),
        Err(e) => Err(AdapterError::from_upstream("Bandsintown", e)),
    }
}

pub fn event_routes() -> Router<AppState> {
    Router::new().route(
        "/functions/bandsintown-api",
        post(bandsintown_api).options(preflight),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 1, 31).unwrap()
    }

    fn request(json: serde_json::Value) -> EventsRequest {
        serde_json::from_value(json).unwrap()
    }

    #[test]
    fn test_explicit_range_wins_over_filter() {
        let action = request(serde_json::json!({
            "action": "getEvents",
            "artistName": "Radiohead",
            "dateRange": "upcoming",
            "dateFilter": "week"
        }))
        .into_action(today())
        .unwrap();

        assert_eq!(
            action,
            BandsintownAction::GetEvents {
                artist_name: "Radiohead".into(),
                date_range: Some("upcoming".into()),
            }
        );
    }

    #[test]
    fn test_filter_resolved_against_today() {
        let action = request(serde_json::json!({
            "action": "getEvents",
            "artistName": "Radiohead",
            "dateFilter": "month"
        }))
        .into_action(today())
        .unwrap();

        assert_eq!(
            action,
            BandsintownAction::GetEvents {
                artist_name: "Radiohead".into(),
                date_range: Some("2025-01-31,2025-02-28".into()),
            }
        );
    }

    #[test]
    fn test_no_range_or_filter() {
        let action = request(serde_json::json!({ "action": "getEvents", "artistName": "Low" }))
            .into_action(today())
            .unwrap();
        assert!(matches!(action, BandsintownAction::GetEvents { date_range: None, .. }));
    }

    #[test]
    fn test_missing_artist_and_bad_action() {
        let err = request(serde_json::json!({ "action": "getArtist" }))
            .into_action(today())
            .unwrap_err();
        assert!(matches!(err, AdapterError::InvalidRequest(_)));

        let err = request(serde_json::json!({ "action": "buyTickets", "artistName": "Low" }))
            .into_action(today())
            .unwrap_err();
        assert!(matches!(err, AdapterError::InvalidAction(a) if a == "buyTickets"));
    }
}
