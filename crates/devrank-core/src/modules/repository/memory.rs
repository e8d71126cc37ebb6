use async_trait::async_trait;
use devrank_types::{Category, DeviceScoreRecord, LeaderboardEntry, StoreError};
use parking_lot::RwLock;
use std::sync::atomic::{AtomicBool, Ordering};

use super::{category_rows, device_history, LeaderboardStore, StoreResult};

/// In-process append-only store.
///
/// `set_available(false)` makes every call fail with `Unavailable`, which is
/// how tests exercise the retry path.
#[derive(Default)]
pub struct MemoryLeaderboardStore {
    documents: RwLock<Vec<(String, LeaderboardEntry)>>,
    unavailable: AtomicBool,
}

impl MemoryLeaderboardStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the store, e.g. from an exported JSON file.
    pub fn with_entries(entries: impl IntoIterator<Item = LeaderboardEntry>) -> Self {
        let store = Self::new();
        {
            let mut documents = store.documents.write();
            for entry in entries {
                documents.push((uuid::Uuid::new_v4().to_string(), entry));
            }
        }
        store
    }

    pub fn set_available(&self, available: bool) {
        self.unavailable.store(!available, Ordering::SeqCst);
    }

    pub fn len(&self) -> usize {
        self.documents.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.read().is_empty()
    }

    pub fn entries(&self) -> Vec<LeaderboardEntry> {
        self.documents.read().iter().map(|(_, e)| e.clone()).collect()
    }

    fn check_available(&self) -> StoreResult<()> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable { message: "memory store offline".to_string() });
        }
        Ok(())
    }
}

#[async_trait]
impl LeaderboardStore for MemoryLeaderboardStore {
    async fn append_entry(&self, entry: &LeaderboardEntry) -> StoreResult<String> {
        self.check_available()?;
        let id = uuid::Uuid::new_v4().to_string();
        self.documents.write().push((id.clone(), entry.clone()));
        Ok(id)
    }

    async fn fetch_category(
        &self,
        category: Category,
        limit: usize,
    ) -> StoreResult<Vec<DeviceScoreRecord>> {
        self.check_available()?;
        Ok(category_rows(self.documents.read().iter().map(|(_, e)| e), category, limit))
    }

    async fn fetch_device_entries(
        &self,
        normalized_device_id: &str,
        limit: usize,
    ) -> StoreResult<Vec<LeaderboardEntry>> {
        self.check_available()?;
        let documents = self.documents.read();
        Ok(device_history(documents.iter().map(|(_, e)| e), normalized_device_id, limit))
    }
}
