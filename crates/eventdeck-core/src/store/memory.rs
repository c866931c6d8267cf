use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

use super::{check_key, PersistentStore, StoreError};

/// In-process store. Nothing survives the process.
#[derive(Default)]
pub struct MemoryStore {
    records: RwLock<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

#[async_trait]
impl PersistentStore for MemoryStore {
    async fn read(&self, key: &str) -> Result<Option<String>, StoreError> {
        check_key(key)?;
        Ok(self.records.read().await.get(key).cloned())
    }

    async fn write(&self, key: &str, payload: String) -> Result<(), StoreError> {
        check_key(key)?;
        self.records.write().await.insert(key.to_string(), payload);
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), StoreError> {
        check_key(key)?;
        self.records.write().await.remove(key);
        Ok(())
    }
}
