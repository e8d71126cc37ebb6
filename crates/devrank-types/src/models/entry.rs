//! Leaderboard entry: the unit of upload.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::category::Category;
use super::device::RawDeviceInfo;

/// Who and what a collection pass is for.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct DeviceContext {
    pub user_id: String,
    pub device: RawDeviceInfo,
}

/// One immutable snapshot of a device's category scores.
///
/// Built fresh on every collection pass and never updated in place; the
/// store accumulates a time series of these per user and device. Only
/// categories that had a measurement appear in `scores`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardEntry {
    pub user_id: String,
    pub normalized_device_id: String,
    pub hardware_id: String,
    /// Epoch millis at which the entry was assembled
    pub timestamp: i64,
    pub normalized_brand: String,
    pub normalized_model: String,
    pub display_name: String,
    #[serde(rename = "androidVersion", alias = "osVersion")]
    pub os_version: String,
    pub scores: BTreeMap<Category, f64>,
    /// 0-5, one point per contributing measurement domain
    pub data_quality: u8,
    pub measurement_count: u32,
    /// `YYYY-MM-DD` of the newest measurement
    #[serde(default)]
    pub last_measurement_date: Option<String>,
}

impl LeaderboardEntry {
    /// Number of categories with a score strictly above zero.
    pub fn nonzero_category_count(&self) -> usize {
        self.scores.values().filter(|s| **s > 0.0).count()
    }

    pub fn score(&self, category: Category) -> Option<f64> {
        self.scores.get(&category).copied()
    }

    /// Mean of the present category scores, 0 when there are none.
    pub fn overall_score(&self) -> f64 {
        if self.scores.is_empty() {
            return 0.0;
        }
        self.scores.values().sum::<f64>() / self.scores.len() as f64
    }
}
