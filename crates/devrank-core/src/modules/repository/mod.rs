//! Remote leaderboard store port.
//!
//! The store is an append-only document collection: entries are never
//! updated in place, so every accepted upload adds one row to the device's
//! time series.

mod http;
mod json_file;
mod memory;

pub use http::HttpDocumentStore;
pub use json_file::JsonFileLeaderboardStore;
pub use memory::MemoryLeaderboardStore;

use async_trait::async_trait;
use devrank_types::{Category, DeviceScoreRecord, LeaderboardEntry, StoreError};

pub type StoreResult<T> = Result<T, StoreError>;

#[async_trait]
pub trait LeaderboardStore: Send + Sync {
    /// Append one entry; returns the id of the new document.
    async fn append_entry(&self, entry: &LeaderboardEntry) -> StoreResult<String>;

    /// Up to `limit` rows scored in `category`, highest score first.
    async fn fetch_category(
        &self,
        category: Category,
        limit: usize,
    ) -> StoreResult<Vec<DeviceScoreRecord>>;

    /// Up to `limit` entries of one normalized device, newest first.
    async fn fetch_device_entries(
        &self,
        normalized_device_id: &str,
        limit: usize,
    ) -> StoreResult<Vec<LeaderboardEntry>>;
}

/// View of a raw entry as a single-user category row.
pub fn project_entry(entry: &LeaderboardEntry, category: Category) -> Option<DeviceScoreRecord> {
    let score = entry.score(category)?;
    Some(DeviceScoreRecord {
        normalized_device_id: entry.normalized_device_id.clone(),
        display_name: entry.display_name.clone(),
        brand: entry.normalized_brand.clone(),
        model: entry.normalized_model.clone(),
        score,
        user_count: 1,
        top_score: score,
        data_quality: entry.data_quality,
    })
}

/// Category rows of locally held entries, highest score first.
fn category_rows<'a>(
    entries: impl Iterator<Item = &'a LeaderboardEntry>,
    category: Category,
    limit: usize,
) -> Vec<DeviceScoreRecord> {
    let mut records: Vec<DeviceScoreRecord> =
        entries.filter_map(|entry| project_entry(entry, category)).collect();
    records.sort_by(|a, b| b.score.total_cmp(&a.score));
    records.truncate(limit);
    records
}

/// Entries of one device from a local collection, newest first.
fn device_history<'a>(
    entries: impl Iterator<Item = &'a LeaderboardEntry>,
    normalized_device_id: &str,
    limit: usize,
) -> Vec<LeaderboardEntry> {
    let mut history: Vec<LeaderboardEntry> = entries
        .filter(|entry| entry.normalized_device_id == normalized_device_id)
        .cloned()
        .collect();
    history.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
    history.truncate(limit);
    history
}
