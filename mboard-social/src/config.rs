//! Configuration for mboard-social

use mboard_common::config::LoggingConfig;
use serde::Deserialize;
use std::path::PathBuf;

pub const DEFAULT_PORT: u16 = 5731;

/// Public board feed size
pub const DEFAULT_FEED_LIMIT: i64 = 50;

/// `social.toml` as written on disk
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SocialToml {
    pub port: Option<u16>,
    /// Folder holding `musicboard.db`
    pub data_folder: Option<PathBuf>,
    /// Number of boards on the public feed
    pub feed_limit: Option<i64>,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl SocialToml {
    pub fn feed_limit(&self) -> i64 {
        self.feed_limit.filter(|n| *n > 0).unwrap_or(DEFAULT_FEED_LIMIT)
    }
}
