use async_trait::async_trait;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;

use super::KeyValueStore;
use crate::error::AppResult;

/// Key-value store persisted as a single JSON object file.
///
/// The file is read lazily on first access and rewritten atomically
/// (temp file + rename) on every mutation.
pub struct JsonFileKvStore {
    path: PathBuf,
    state: Mutex<Option<BTreeMap<String, String>>>,
}

impl JsonFileKvStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into(), state: Mutex::new(None) }
    }

    /// Store at `<data_dir>/local_state.json`.
    pub fn in_dir(data_dir: &Path) -> Self {
        Self::new(data_dir.join("local_state.json"))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn load(path: &Path) -> BTreeMap<String, String> {
        match tokio::fs::read_to_string(path).await {
            Ok(content) => serde_json::from_str(&content).unwrap_or_else(|e| {
                tracing::warn!("[KvStore] Ignoring corrupt state file {:?}: {}", path, e);
                BTreeMap::new()
            }),
            Err(_) => BTreeMap::new(),
        }
    }

    async fn persist(&self, values: &BTreeMap<String, String>) -> AppResult<()> {
        let content = serde_json::to_string_pretty(values)?;
        let temp_path = self.path.with_extension("json.tmp");
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&temp_path, content).await?;
        tokio::fs::rename(&temp_path, &self.path).await?;
        Ok(())
    }
}

#[async_trait]
impl KeyValueStore for JsonFileKvStore {
    async fn get(&self, key: &str) -> AppResult<Option<String>> {
        let mut state = self.state.lock().await;
        if state.is_none() {
            *state = Some(Self::load(&self.path).await);
        }
        Ok(state.as_ref().and_then(|values| values.get(key).cloned()))
    }

    async fn set(&self, key: &str, value: String) -> AppResult<()> {
        let mut state = self.state.lock().await;
        let mut values = match state.take() {
            Some(values) => values,
            None => Self::load(&self.path).await,
        };
        values.insert(key.to_string(), value);
        let result = self.persist(&values).await;
        *state = Some(values);
        result
    }

    async fn remove(&self, key: &str) -> AppResult<()> {
        let mut state = self.state.lock().await;
        let mut values = match state.take() {
            Some(values) => values,
            None => Self::load(&self.path).await,
        };
        let existed = values.remove(key).is_some();
        let result = if existed { self.persist(&values).await } else { Ok(()) };
        *state = Some(values);
        result
    }
}

#[cfg(test)]
mod tests {
    use super::super::LAST_UPLOAD_TIME;
    use super::*;

    #[tokio::test]
    async fn test_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();

        let store = JsonFileKvStore::in_dir(dir.path());
        store.set_i64(LAST_UPLOAD_TIME, 42).await.unwrap();
        drop(store);

        let reopened = JsonFileKvStore::in_dir(dir.path());
        assert_eq!(reopened.get_i64(LAST_UPLOAD_TIME).await.unwrap(), Some(42));
        assert!(!dir.path().join("local_state.json.tmp").exists());
    }

    #[tokio::test]
    async fn test_corrupt_file_reads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileKvStore::in_dir(dir.path());
        std::fs::write(store.path(), "[not an object").unwrap();

        assert_eq!(store.get("anything").await.unwrap(), None);
        store.set("k", "v".to_string()).await.unwrap();
        assert_eq!(store.get("k").await.unwrap(), Some("v".to_string()));
    }

    #[tokio::test]
    async fn test_remove() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileKvStore::in_dir(dir.path());
        store.set("k", "v".to_string()).await.unwrap();
        store.remove("k").await.unwrap();

        let reopened = JsonFileKvStore::in_dir(dir.path());
        assert_eq!(reopened.get("k").await.unwrap(), None);
    }
}
