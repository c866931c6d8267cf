//! Key-value persistence for favorites, search history and the last search.
//!
//! Backends only move text payloads around; typed access goes through
//! [`get`] and [`set`], which own the serialization policy: a payload that
//! cannot be read or decoded is treated as absent, never as an error.

mod file;
mod memory;

pub use file::JsonFileStore;
pub use memory::MemoryStore;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;
use tracing::warn;

use crate::error::ErrorKind;

pub const FAVORITES_KEY: &str = "favorites";
pub const LAST_SEARCH_KEY: &str = "last_search";
pub const SEARCH_HISTORY_KEY: &str = "search_history";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to encode record: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("invalid storage key: {0:?}")]
    InvalidKey(String),
}

/// Durable text storage addressed by key.
///
/// Every call completes its I/O before returning; callers rely on a
/// successful `write` being visible to the next `read` on any handle to the
/// same backend.
#[async_trait]
pub trait PersistentStore: Send + Sync {
    async fn read(&self, key: &str) -> Result<Option<String>, StoreError>;

    async fn write(&self, key: &str, payload: String) -> Result<(), StoreError>;

    /// Removing an absent key is not an error.
    async fn remove(&self, key: &str) -> Result<(), StoreError>;
}

/// Read and decode `key`. Missing, unreadable and corrupt records are all `None`.
pub async fn get<T: DeserializeOwned>(store: &dyn PersistentStore, key: &str) -> Option<T> {
    let payload = match store.read(key).await {
        Ok(Some(payload)) => payload,
        Ok(None) => return None,
        Err(e) => {
            warn!("[store] read {} failed, treating as absent: {}", key, e);
            return None;
        }
    };

    match serde_json::from_str(&payload) {
        Ok(value) => Some(value),
        Err(e) => {
            warn!(
                kind = ?ErrorKind::StorageCorruption,
                "[store] {} holds an unreadable record, ignoring it: {}", key, e
            );
            None
        }
    }
}

/// Encode `value` and write it under `key`.
pub async fn set<T: Serialize + ?Sized>(
    store: &dyn PersistentStore,
    key: &str,
    value: &T,
) -> Result<(), StoreError> {
    let payload = serde_json::to_string_pretty(value)?;
    store.write(key, payload).await
}

pub(crate) fn check_key(key: &str) -> Result<(), StoreError> {
    let ok = !key.is_empty()
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
    if ok {
        Ok(())
    } else {
        Err(StoreError::InvalidKey(key.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_check_key() {
        assert!(check_key("favorites").is_ok());
        assert!(check_key("search_history-v2").is_ok());
        assert!(check_key("").is_err());
        assert!(check_key("../etc/passwd").is_err());
        assert!(check_key("a b").is_err());
    }

    #[tokio::test]
    async fn test_typed_round_trip() {
        let store = MemoryStore::new();
        let mut map = HashMap::new();
        map.insert("E1".to_string(), 3u32);
        set(&store, "counts", &map).await.unwrap();

        let back: Option<HashMap<String, u32>> = get(&store, "counts").await;
        assert_eq!(back, Some(map));
    }

    #[tokio::test]
    async fn test_missing_key_is_none() {
        let store = MemoryStore::new();
        let value: Option<Vec<String>> = get(&store, "nothing").await;
        assert!(value.is_none());
    }

    #[tokio::test]
    async fn test_corrupt_payload_degrades_to_none() {
        let store = MemoryStore::new();
        store.write("history", "{not json".to_string()).await.unwrap();
        let value: Option<Vec<String>> = get(&store, "history").await;
        assert!(value.is_none());

        // Old format: a map where a list is now expected.
        store.write("history", r#"{"a":1}"#.to_string()).await.unwrap();
        let value: Option<Vec<String>> = get(&store, "history").await;
        assert!(value.is_none());
    }
}
