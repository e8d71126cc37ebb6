use async_trait::async_trait;
use devrank_types::{Category, DeviceScoreRecord, LeaderboardEntry, StoreError};
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;

use super::{category_rows, device_history, LeaderboardStore, StoreResult};

/// Append-only store kept as a JSON array file.
///
/// Every append rewrites the file atomically (temp file + rename) before
/// reporting success, so an accepted entry is always on disk.
pub struct JsonFileLeaderboardStore {
    path: PathBuf,
    entries: Mutex<Vec<LeaderboardEntry>>,
}

impl JsonFileLeaderboardStore {
    /// Open the file at `path`; a missing file is an empty store.
    pub async fn open(path: impl Into<PathBuf>) -> StoreResult<Self> {
        let path = path.into();
        let entries = match tokio::fs::read_to_string(&path).await {
            Ok(content) => {
                serde_json::from_str(&content).map_err(|e| StoreError::from_json_error(&e))?
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Vec::new(),
            Err(e) => {
                return Err(StoreError::Unavailable {
                    message: format!("failed to read {}: {}", path.display(), e),
                })
            },
        };
        tracing::debug!("[JsonFileStore] Loaded {} entries from {:?}", entries.len(), path);
        Ok(Self { path, entries: Mutex::new(entries) })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub async fn entries(&self) -> Vec<LeaderboardEntry> {
        self.entries.lock().await.clone()
    }

    async fn persist(&self, entries: &[LeaderboardEntry]) -> StoreResult<()> {
        let content =
            serde_json::to_string_pretty(entries).map_err(|e| StoreError::from_json_error(&e))?;
        let temp_path = self.path.with_extension("json.tmp");
        let unavailable = |e: std::io::Error| StoreError::Unavailable {
            message: format!("failed to write {}: {}", self.path.display(), e),
        };
        tokio::fs::write(&temp_path, content).await.map_err(unavailable)?;
        tokio::fs::rename(&temp_path, &self.path).await.map_err(unavailable)
    }
}

#[async_trait]
impl LeaderboardStore for JsonFileLeaderboardStore {
    async fn append_entry(&self, entry: &LeaderboardEntry) -> StoreResult<String> {
        let mut entries = self.entries.lock().await;
        entries.push(entry.clone());
        if let Err(e) = self.persist(&entries).await {
            entries.pop();
            return Err(e);
        }
        Ok(uuid::Uuid::new_v4().to_string())
    }

    async fn fetch_category(
        &self,
        category: Category,
        limit: usize,
    ) -> StoreResult<Vec<DeviceScoreRecord>> {
        Ok(category_rows(self.entries.lock().await.iter(), category, limit))
    }

    async fn fetch_device_entries(
        &self,
        normalized_device_id: &str,
        limit: usize,
    ) -> StoreResult<Vec<LeaderboardEntry>> {
        Ok(device_history(self.entries.lock().await.iter(), normalized_device_id, limit))
    }
}
