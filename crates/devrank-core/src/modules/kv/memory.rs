use async_trait::async_trait;
use dashmap::DashMap;

use super::KeyValueStore;
use crate::error::AppResult;

/// Process-local store. State is lost on drop.
#[derive(Debug, Default)]
pub struct MemoryKvStore {
    values: DashMap<String, String>,
}

impl MemoryKvStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KeyValueStore for MemoryKvStore {
    async fn get(&self, key: &str) -> AppResult<Option<String>> {
        Ok(self.values.get(key).map(|v| v.value().clone()))
    }

    async fn set(&self, key: &str, value: String) -> AppResult<()> {
        self.values.insert(key.to_string(), value);
        Ok(())
    }

    async fn remove(&self, key: &str) -> AppResult<()> {
        self.values.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::super::{get_json, set_json, LAST_UPLOAD_TIME};
    use super::*;
    use devrank_types::FpsSample;

    #[tokio::test]
    async fn test_i64_helpers() {
        let store = MemoryKvStore::new();
        assert_eq!(store.get_i64(LAST_UPLOAD_TIME).await.unwrap(), None);

        store.set_i64(LAST_UPLOAD_TIME, 1_700_000_000_000).await.unwrap();
        assert_eq!(store.get_i64(LAST_UPLOAD_TIME).await.unwrap(), Some(1_700_000_000_000));

        store.set(LAST_UPLOAD_TIME, "garbage".to_string()).await.unwrap();
        assert_eq!(store.get_i64(LAST_UPLOAD_TIME).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_json_helpers() {
        let store = MemoryKvStore::new();
        let sample = FpsSample { fps: 58, frame_drop_rate: 1.2, raw_sample: "58".into(), timestamp: 7 };

        set_json(&store, "fps", &sample).await.unwrap();
        assert_eq!(get_json::<FpsSample>(&store, "fps").await.unwrap(), Some(sample));

        store.set("fps", "{broken".to_string()).await.unwrap();
        assert_eq!(get_json::<FpsSample>(&store, "fps").await.unwrap(), None);

        store.remove("fps").await.unwrap();
        assert_eq!(store.get("fps").await.unwrap(), None);
    }
}
