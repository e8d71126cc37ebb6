//! Pipeline configuration models.

mod sections;

pub use sections::{FpsConfig, QueryConfig, ReadinessConfig, StoreConfig, UploadConfig};

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Full leaderboard pipeline configuration.
///
/// Every field has a default so a partial JSON file is accepted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default, Validate)]
pub struct LeaderboardConfig {
    /// Upload throttling
    #[serde(default)]
    #[validate(nested)]
    pub upload: UploadConfig,
    /// Readiness gate thresholds and polling
    #[serde(default)]
    #[validate(nested)]
    pub readiness: ReadinessConfig,
    /// FPS sampling and cache
    #[serde(default)]
    #[validate(nested)]
    pub fps: FpsConfig,
    /// Ranking queries
    #[serde(default)]
    #[validate(nested)]
    pub query: QueryConfig,
    /// Remote store location
    #[serde(default)]
    pub store: StoreConfig,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: LeaderboardConfig =
            serde_json::from_str(r#"{"upload": {"throttle_interval_secs": 120}}"#).unwrap();

        assert_eq!(config.upload.throttle_interval_secs, 120);
        assert_eq!(config.readiness.max_wait_ms, 30_000);
        assert_eq!(config.fps.cache_ttl_secs, 300);
        assert_eq!(config.query.fetch_limit, 100);
        assert!(config.store.base_url.is_none());
    }

    #[test]
    fn test_default_validates() {
        assert!(LeaderboardConfig::default().validate().is_ok());
    }

    #[test]
    fn test_zero_poll_interval_rejected() {
        let mut config = LeaderboardConfig::default();
        config.readiness.poll_interval_ms = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_unbounded_wait_rejected() {
        let mut config = LeaderboardConfig::default();
        config.readiness.max_wait_ms = u64::MAX;
        assert!(config.validate().is_err());
    }
}
