//! Recommendation extraction from chat replies
//!
//! The model embeds picks as `RECOMMENDATION: {...}` where the object is a
//! single brace pair (no nested objects). Well-formed occurrences are removed
//! from the prose and returned as records; anything that does not decode is
//! left in the prose untouched.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::warn;

static RECOMMENDATION_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"RECOMMENDATION:\s*(\{[^}]+\})").expect("Invalid recommendation regex pattern")
});

/// An album suggested by the assistant
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Recommendation {
    pub album_title: String,
    pub artist: String,
    /// Usually an emoji standing in for cover art
    #[serde(default)]
    pub cover: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub match_percentage: Option<u32>,
    #[serde(default)]
    pub genres: Vec<String>,
    #[serde(default)]
    pub reasoning: String,
}

/// Chat reply split into prose and records
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParsedReply {
    pub content: String,
    pub recommendations: Vec<Recommendation>,
}

/// Split a reply into cleaned prose and the recommendations it contains
pub fn parse_reply(text: &str) -> ParsedReply {
    let mut recommendations = Vec::new();
    let mut content = String::with_capacity(text.len());
    let mut last_end = 0;

    for captures in RECOMMENDATION_RE.captures_iter(text) {
        let (Some(whole), Some(json)) = (captures.get(0), captures.get(1)) else {
            continue;
        };

        match serde_json::from_str::<Recommendation>(json.as_str()) {
            Ok(rec) => {
                recommendations.push(rec);
                content.push_str(&text[last_end..whole.start()]);
                last_end = whole.end();
            }
            Err(e) => {
                warn!(error = %e, raw = json.as_str(), "Skipping malformed recommendation");
            }
        }
    }

    content.push_str(&text[last_end..]);

    ParsedReply {
        content: content.trim().to_string(),
        recommendations,
    }
}
