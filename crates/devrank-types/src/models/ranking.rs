//! Aggregation-time projections. Never persisted; recomputed per query.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::category::Category;

/// One stored row as seen by a category query.
///
/// A raw entry projects to `user_count = 1` and `top_score = score`;
/// pre-aggregated rows may carry larger counts.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DeviceScoreRecord {
    pub normalized_device_id: String,
    pub display_name: String,
    pub brand: String,
    pub model: String,
    pub score: f64,
    #[serde(default = "default_user_count")]
    pub user_count: u32,
    #[serde(default)]
    pub top_score: f64,
    #[serde(default)]
    pub data_quality: u8,
}

const fn default_user_count() -> u32 {
    1
}

/// A device's position on one category leaderboard.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BestDeviceEntry {
    /// 1-based position
    pub rank: usize,
    pub normalized_device_id: String,
    pub display_name: String,
    pub brand: String,
    pub model: String,
    pub category: Category,
    pub avg_score: f64,
    pub user_count: u32,
    pub top_score: f64,
    pub avg_data_quality: u8,
}

/// Cross-category summary for a single device.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DeviceInsight {
    pub normalized_device_id: String,
    pub display_name: String,
    pub entry_count: usize,
    pub category_averages: BTreeMap<Category, f64>,
    pub strongest: Option<Category>,
    pub weakest: Option<Category>,
    /// Mean of the category averages
    pub overall_score: f64,
}
