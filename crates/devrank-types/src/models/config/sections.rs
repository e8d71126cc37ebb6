//! Individual configuration sections.

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Upload throttle configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Validate)]
pub struct UploadConfig {
    /// Minimum time between two uploads from this device
    #[validate(range(min = 1_u64))]
    #[serde(default = "default_throttle_interval")]
    pub throttle_interval_secs: u64,
    /// Reject a trigger while another upload from this process is running
    #[serde(default = "default_true")]
    pub single_flight: bool,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self { throttle_interval_secs: default_throttle_interval(), single_flight: true }
    }
}

/// Readiness gate configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Validate)]
pub struct ReadinessConfig {
    /// Upper bound on the polling variant
    #[validate(range(min = 1_u64, max = 86_400_000_u64))]
    #[serde(default = "default_max_wait_ms")]
    pub max_wait_ms: u64,
    /// Delay between two checks while polling
    #[validate(range(min = 1_u64, max = 86_400_000_u64))]
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
    /// Entries older than this are never published
    #[validate(range(min = 1_u64))]
    #[serde(default = "default_max_entry_age")]
    pub max_entry_age_secs: u64,
    /// Data quality required when this device has never uploaded
    #[validate(range(max = 5_u8))]
    #[serde(default = "default_first_min_quality")]
    pub first_upload_min_quality: u8,
    /// Data quality required after the first upload
    #[validate(range(max = 5_u8))]
    #[serde(default = "default_min_quality")]
    pub min_quality: u8,
    /// Non-zero categories required when this device has never uploaded
    #[serde(default = "default_first_min_categories")]
    pub first_upload_min_categories: usize,
    /// Non-zero categories required after the first upload
    #[serde(default = "default_min_categories")]
    pub min_categories: usize,
}

impl Default for ReadinessConfig {
    fn default() -> Self {
        Self {
            max_wait_ms: default_max_wait_ms(),
            poll_interval_ms: default_poll_interval_ms(),
            max_entry_age_secs: default_max_entry_age(),
            first_upload_min_quality: default_first_min_quality(),
            min_quality: default_min_quality(),
            first_upload_min_categories: default_first_min_categories(),
            min_categories: default_min_categories(),
        }
    }
}

/// FPS sampling configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Validate)]
pub struct FpsConfig {
    /// How long to wait for the render loop to answer
    #[validate(range(min = 1_u64, max = 60_000_u64))]
    #[serde(default = "default_render_timeout_ms")]
    pub render_timeout_ms: u64,
    /// Validity of the cached sample used off the render loop
    #[validate(range(min = 1_u64))]
    #[serde(default = "default_fps_cache_ttl")]
    pub cache_ttl_secs: u64,
}

impl Default for FpsConfig {
    fn default() -> Self {
        Self {
            render_timeout_ms: default_render_timeout_ms(),
            cache_ttl_secs: default_fps_cache_ttl(),
        }
    }
}

/// Ranking query configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Validate)]
pub struct QueryConfig {
    /// Rows fetched from the store per category
    #[validate(range(min = 1_usize, max = 1000_usize))]
    #[serde(default = "default_fetch_limit")]
    pub fetch_limit: usize,
    /// Devices returned per leaderboard
    #[validate(range(min = 1_usize))]
    #[serde(default = "default_top_n")]
    pub top_n: usize,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self { fetch_limit: default_fetch_limit(), top_n: default_top_n() }
    }
}

/// Remote document store location.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StoreConfig {
    /// Base URL of the document REST endpoint; in-memory store when unset
    #[serde(default)]
    pub base_url: Option<String>,
    /// Bearer token sent with every request
    #[serde(default)]
    pub api_key: Option<String>,
    /// Collection holding leaderboard entries
    #[serde(default = "default_collection")]
    pub collection: String,
    /// Per-request timeout
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            api_key: None,
            collection: default_collection(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

// Default value functions
pub const fn default_true() -> bool {
    true
}

pub const fn default_throttle_interval() -> u64 {
    3600
}

pub const fn default_max_wait_ms() -> u64 {
    30_000
}

pub const fn default_poll_interval_ms() -> u64 {
    1_000
}

pub const fn default_max_entry_age() -> u64 {
    3600
}

pub const fn default_first_min_quality() -> u8 {
    1
}

pub const fn default_min_quality() -> u8 {
    2
}

pub const fn default_first_min_categories() -> usize {
    1
}

pub const fn default_min_categories() -> usize {
    2
}

pub const fn default_render_timeout_ms() -> u64 {
    2_000
}

pub const fn default_fps_cache_ttl() -> u64 {
    300
}

pub const fn default_fetch_limit() -> usize {
    100
}

pub const fn default_top_n() -> usize {
    10
}

pub fn default_collection() -> String {
    "leaderboard_entries".to_string()
}

pub const fn default_request_timeout() -> u64 {
    15
}
