//! Recent search keywords, most recent first.

use std::collections::VecDeque;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::debug;

use crate::store::{self, PersistentStore, StoreError, SEARCH_HISTORY_KEY};

pub const DEFAULT_HISTORY_LIMIT: usize = 10;

/// Move `keyword` to the front of `entries`, dropping any earlier spelling of
/// it and trimming the tail to `limit`. Blank keywords are ignored.
pub fn push_front_dedup(entries: &mut VecDeque<String>, keyword: &str, limit: usize) {
    let keyword = keyword.trim();
    if keyword.is_empty() {
        return;
    }
    entries.retain(|e| !same_keyword(e, keyword));
    entries.push_front(keyword.to_string());
    entries.truncate(limit);
}

/// Case-insensitive across scripts, so "Ópera" and "ópera" are one entry.
fn same_keyword(a: &str, b: &str) -> bool {
    a == b || a.to_lowercase() == b.to_lowercase()
}

/// Bounded keyword history persisted under [`SEARCH_HISTORY_KEY`].
pub struct SearchHistory {
    store: Arc<dyn PersistentStore>,
    limit: usize,
    entries: Mutex<VecDeque<String>>,
}

impl SearchHistory {
    pub async fn load(store: Arc<dyn PersistentStore>, limit: usize) -> Self {
        let limit = limit.max(1);
        let mut entries: VecDeque<String> = store::get(store.as_ref(), SEARCH_HISTORY_KEY)
            .await
            .unwrap_or_default();
        // A record written under a larger limit is cut down on load.
        entries.truncate(limit);
        Self {
            store,
            limit,
            entries: Mutex::new(entries),
        }
    }

    pub async fn record(&self, keyword: &str) -> Result<(), StoreError> {
        let mut entries = self.entries.lock().await;
        let mut next = entries.clone();
        push_front_dedup(&mut next, keyword, self.limit);
        if next == *entries {
            return Ok(());
        }
        debug!("[history] record {:?}", keyword.trim());
        store::set(self.store.as_ref(), SEARCH_HISTORY_KEY, &next).await?;
        *entries = next;
        Ok(())
    }

    pub async fn remove(&self, keyword: &str) -> Result<bool, StoreError> {
        let mut entries = self.entries.lock().await;
        let mut next = entries.clone();
        next.retain(|e| !same_keyword(e, keyword.trim()));
        if next.len() == entries.len() {
            return Ok(false);
        }
        store::set(self.store.as_ref(), SEARCH_HISTORY_KEY, &next).await?;
        *entries = next;
        Ok(true)
    }

    pub async fn clear(&self) -> Result<(), StoreError> {
        let mut entries = self.entries.lock().await;
        self.store.remove(SEARCH_HISTORY_KEY).await?;
        entries.clear();
        Ok(())
    }

    pub async fn entries(&self) -> Vec<String> {
        self.entries.lock().await.iter().cloned().collect()
    }

    pub fn limit(&self) -> usize {
        self.limit
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    #[test]
    fn test_push_front_moves_existing() {
        let mut entries: VecDeque<String> = ["b", "a", "c"].iter().map(|s| s.to_string()).collect();
        push_front_dedup(&mut entries, "A", 10);
        assert_eq!(entries, ["A", "b", "c"]);
    }

    #[test]
    fn test_push_front_dedups_non_ascii_case() {
        let mut entries = VecDeque::new();
        push_front_dedup(&mut entries, "ópera", 10);
        push_front_dedup(&mut entries, "jazz", 10);
        push_front_dedup(&mut entries, "Ópera", 10);
        assert_eq!(entries, ["Ópera", "jazz"]);

        push_front_dedup(&mut entries, "STRASSE ÜBER", 10);
        push_front_dedup(&mut entries, "strasse über", 10);
        assert_eq!(entries, ["strasse über", "Ópera", "jazz"]);
    }

    #[test]
    fn test_push_front_bounded() {
        let mut entries = VecDeque::new();
        for i in 0..25 {
            push_front_dedup(&mut entries, &format!("kw{i}"), 10);
            assert!(entries.len() <= 10);
        }
        assert_eq!(entries.front().map(String::as_str), Some("kw24"));
        assert_eq!(entries.back().map(String::as_str), Some("kw15"));
    }

    #[test]
    fn test_push_front_ignores_blank() {
        let mut entries = VecDeque::new();
        push_front_dedup(&mut entries, "   ", 10);
        assert!(entries.is_empty());
    }

    #[tokio::test]
    async fn test_readding_does_not_grow() {
        let store = Arc::new(MemoryStore::new());
        let history = SearchHistory::load(store, DEFAULT_HISTORY_LIMIT).await;
        for kw in ["jazz", "rock", "opera"] {
            history.record(kw).await.unwrap();
        }
        history.record("jazz").await.unwrap();
        assert_eq!(history.entries().await, vec!["jazz", "opera", "rock"]);
    }

    #[tokio::test]
    async fn test_persists_across_loads() {
        let store = Arc::new(MemoryStore::new());
        let history = SearchHistory::load(store.clone(), 3).await;
        for kw in ["a", "b", "c", "d"] {
            history.record(kw).await.unwrap();
        }
        let reloaded = SearchHistory::load(store, 3).await;
        assert_eq!(reloaded.entries().await, vec!["d", "c", "b"]);
    }

    #[tokio::test]
    async fn test_load_truncates_to_limit() {
        let store = Arc::new(MemoryStore::new());
        let long: Vec<String> = (0..15).map(|i| format!("k{i}")).collect();
        store::set(store.as_ref(), SEARCH_HISTORY_KEY, &long).await.unwrap();
        let history = SearchHistory::load(store, DEFAULT_HISTORY_LIMIT).await;
        assert_eq!(history.entries().await.len(), 10);
    }

    #[tokio::test]
    async fn test_remove_and_clear() {
        let store = Arc::new(MemoryStore::new());
        let history = SearchHistory::load(store.clone(), 10).await;
        history.record("jazz").await.unwrap();
        history.record("rock").await.unwrap();
        history.record("Ñandú").await.unwrap();
        assert!(history.remove("ñANDÚ").await.unwrap());
        assert!(history.remove("JAZZ").await.unwrap());
        assert!(!history.remove("jazz").await.unwrap());
        assert_eq!(history.entries().await, vec!["rock"]);

        history.clear().await.unwrap();
        assert!(history.entries().await.is_empty());
        assert_eq!(store.read(SEARCH_HISTORY_KEY).await.unwrap(), None);
    }
}
