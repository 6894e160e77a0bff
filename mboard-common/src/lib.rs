//! # Musicboard Common Library
//!
//! Shared code for the Musicboard services:
//! - Error taxonomy and input validation
//! - Configuration loading (TOML + environment)
//! - Data model and SQLite store
//! - Rating/review aggregation

pub mod aggregate;
pub mod config;
#[cfg(feature = "sqlx")]
pub mod db;
pub mod error;
pub mod models;
pub mod validation;

pub use aggregate::{RatingSummary, TrackAverage, TrackRatings};
pub use error::{Error, Result};
pub use validation::ValidationError;
