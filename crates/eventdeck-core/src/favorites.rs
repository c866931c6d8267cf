//! Favorited events, keyed by event id and persisted write-through.

use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::model::Event;
use crate::store::{self, PersistentStore, StoreError, FAVORITES_KEY};

/// In-memory map of favorites backed by a [`PersistentStore`].
///
/// Every mutation runs inside one critical section: the change is applied to
/// a copy, the copy is persisted, and only then does it become the live map.
/// A failed write therefore leaves both copies on the previous state.
pub struct FavoritesCache {
    store: Arc<dyn PersistentStore>,
    entries: Mutex<HashMap<String, Event>>,
}

impl FavoritesCache {
    /// Restore from `store`. A missing or corrupt record starts empty.
    pub async fn load(store: Arc<dyn PersistentStore>) -> Self {
        let entries: HashMap<String, Event> = store::get(store.as_ref(), FAVORITES_KEY)
            .await
            .unwrap_or_default();
        info!("[favorites] loaded {} favorites", entries.len());
        Self {
            store,
            entries: Mutex::new(entries),
        }
    }

    /// Insert or overwrite by id.
    pub async fn add(&self, event: Event) -> Result<(), StoreError> {
        let mut entries = self.entries.lock().await;
        let mut next = entries.clone();
        debug!("[favorites] add {}", event.id);
        next.insert(event.id.clone(), event);
        self.commit(&mut entries, next).await
    }

    /// Returns whether anything was removed. Absent ids do not touch storage.
    pub async fn remove(&self, id: &str) -> Result<bool, StoreError> {
        let mut entries = self.entries.lock().await;
        if !entries.contains_key(id) {
            return Ok(false);
        }
        let mut next = entries.clone();
        next.remove(id);
        debug!("[favorites] remove {}", id);
        self.commit(&mut entries, next).await?;
        Ok(true)
    }

    /// Flip membership; returns `true` when the event is now a favorite.
    pub async fn toggle(&self, event: Event) -> Result<bool, StoreError> {
        let mut entries = self.entries.lock().await;
        let mut next = entries.clone();
        let now_favorite = if next.remove(&event.id).is_some() {
            false
        } else {
            next.insert(event.id.clone(), event);
            true
        };
        self.commit(&mut entries, next).await?;
        Ok(now_favorite)
    }

    pub async fn clear(&self) -> Result<(), StoreError> {
        let mut entries = self.entries.lock().await;
        self.commit(&mut entries, HashMap::new()).await
    }

    pub async fn is_favorite(&self, id: &str) -> bool {
        self.entries.lock().await.contains_key(id)
    }

    pub async fn get(&self, id: &str) -> Option<Event> {
        self.entries.lock().await.get(id).cloned()
    }

    /// Snapshot of every favorite, in no particular order.
    pub async fn all(&self) -> Vec<Event> {
        self.entries.lock().await.values().cloned().collect()
    }

    pub async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.lock().await.is_empty()
    }

    async fn commit(
        &self,
        live: &mut HashMap<String, Event>,
        next: HashMap<String, Event>,
    ) -> Result<(), StoreError> {
        store::set(self.store.as_ref(), FAVORITES_KEY, &next).await?;
        *live = next;
        Ok(())
    }
}
