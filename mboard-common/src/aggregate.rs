//! Rating aggregation
//!
//! Summary statistics are never persisted. They are folded from the rating
//! rows every time a target is read, so two users rating at the same moment
//! simply both show up on the next read.

use serde::Serialize;
use std::collections::BTreeMap;

use crate::models::Rating;

/// Number of histogram buckets (0.5 .. 5.0 in half-star steps)
pub const DISTRIBUTION_BUCKETS: usize = 10;

/// Aggregate view of all ratings for one album or track
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RatingSummary {
    /// Number of ratings
    pub count: u32,
    /// Arithmetic mean of all ratings, 0 when there are none
    pub average: f64,
    /// Bucket `i` holds the number of ratings equal to `(i + 1) * 0.5`
    pub distribution: [u32; DISTRIBUTION_BUCKETS],
    /// The caller's own rating, 0 when they have not rated
    pub user_rating: f64,
}

impl RatingSummary {
    /// Summary of a target nobody has rated
    pub fn empty() -> Self {
        Self {
            count: 0,
            average: 0.0,
            distribution: [0; DISTRIBUTION_BUCKETS],
            user_rating: 0.0,
        }
    }

    /// Average rounded for display, e.g. `"4.0"`
    pub fn average_display(&self) -> String {
        format!("{:.1}", self.average)
    }
}

/// Histogram bucket for a rating: `floor(rating * 2) - 1` when that lands in `[0, 9]`
///
/// Ratings outside the 0.5..=5.0 domain have no bucket.
pub fn distribution_bucket(rating: f64) -> Option<usize> {
    if !rating.is_finite() {
        return None;
    }

    let index = (rating * 2.0).floor() - 1.0;
    if (0.0..DISTRIBUTION_BUCKETS as f64).contains(&index) {
        Some(index as usize)
    } else {
        None
    }
}

/// Fold rating rows for one target into a summary
///
/// `current_user` selects which row (if any) becomes `user_rating`.
pub fn summarize(ratings: &[Rating], current_user: Option<&str>) -> RatingSummary {
    let mut summary = summarize_values(ratings.iter().map(|r| r.rating));

    if let Some(user_id) = current_user {
        summary.user_rating = ratings
            .iter()
            .find(|r| r.user_id == user_id)
            .map(|r| r.rating)
            .unwrap_or(0.0);
    }

    summary
}

/// Fold bare rating values into a summary (no `user_rating`)
pub fn summarize_values<I>(values: I) -> RatingSummary
where
    I: IntoIterator<Item = f64>,
{
    let mut summary = RatingSummary::empty();
    let mut sum = 0.0;

    for rating in values {
        summary.count += 1;
        sum += rating;

        match distribution_bucket(rating) {
            Some(bucket) => summary.distribution[bucket] += 1,
            None => tracing::debug!(rating, "Rating outside 0.5-5.0 left out of distribution"),
        }
    }

    if summary.count > 0 {
        summary.average = sum / summary.count as f64;
    }

    summary
}

/// Running mean for one track
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TrackAverage {
    pub count: u32,
    pub average: f64,
}

/// Per-track running averages, keyed by track id
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct TrackRatings {
    tracks: BTreeMap<String, TrackAverage>,
}

impl TrackRatings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold a list of track rating rows
    pub fn from_rows(rows: &[Rating]) -> Self {
        let mut tracks = Self::new();
        for row in rows {
            tracks.add(&row.target_id, row.rating);
        }
        tracks
    }

    /// Fold one rating into the running mean of its track
    ///
    /// `new_avg = old_avg + (rating - old_avg) / new_count`
    pub fn add(&mut self, track_id: &str, rating: f64) {
        let entry = self
            .tracks
            .entry(track_id.to_string())
            .or_insert(TrackAverage { count: 0, average: 0.0 });

        entry.count += 1;
        entry.average += (rating - entry.average) / entry.count as f64;
    }

    pub fn get(&self, track_id: &str) -> Option<&TrackAverage> {
        self.tracks.get(track_id)
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &TrackAverage)> {
        self.tracks.iter().map(|(id, avg)| (id.as_str(), avg))
    }
}
