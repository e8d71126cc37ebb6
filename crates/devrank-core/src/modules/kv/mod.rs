//! Local key-value persistence port.
//!
//! Holds the small amount of device-local state the pipeline needs across
//! runs: the last successful upload time and the cached FPS sample.

mod json_file;
mod memory;

pub use json_file::JsonFileKvStore;
pub use memory::MemoryKvStore;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::AppResult;

/// Epoch millis of the last successful upload.
pub const LAST_UPLOAD_TIME: &str = "last_upload_time";
/// JSON-encoded `FpsSample` taken on the render loop.
pub const FPS_CACHE: &str = "fps_cache";

#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get(&self, key: &str) -> AppResult<Option<String>>;
    async fn set(&self, key: &str, value: String) -> AppResult<()>;
    async fn remove(&self, key: &str) -> AppResult<()>;

    /// Integer view of a value; unparseable values read as absent.
    async fn get_i64(&self, key: &str) -> AppResult<Option<i64>> {
        Ok(self.get(key).await?.and_then(|v| v.trim().parse().ok()))
    }

    async fn set_i64(&self, key: &str, value: i64) -> AppResult<()> {
        self.set(key, value.to_string()).await
    }
}

/// Read and decode a JSON value. A value that no longer decodes reads as absent.
pub async fn get_json<T: DeserializeOwned>(
    store: &dyn KeyValueStore,
    key: &str,
) -> AppResult<Option<T>> {
    let Some(raw) = store.get(key).await? else {
        return Ok(None);
    };
    match serde_json::from_str(&raw) {
        Ok(value) => Ok(Some(value)),
        Err(e) => {
            tracing::warn!("[KvStore] Discarding undecodable value for {}: {}", key, e);
            Ok(None)
        },
    }
}

pub async fn set_json<T: Serialize + Sync>(
    store: &dyn KeyValueStore,
    key: &str,
    value: &T,
) -> AppResult<()> {
    store.set(key, serde_json::to_string(value)?).await
}
