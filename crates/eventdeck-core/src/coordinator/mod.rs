//! Search session orchestration.
//!
//! `SearchCoordinator` owns the published search state. Each submission
//! takes a new generation number; a response only reaches the published
//! state if its generation is still the latest when it arrives, so results
//! are ordered by when searches started, not when they finished.

mod enrich;
mod suggest;

pub use enrich::{enrich, ArtistProfile, Enrichment};
pub use suggest::{SuggestionDebouncer, SuggestionState};

use futures_util::future::join_all;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::{watch, Mutex};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::error::FetchError;
use crate::favorites::FavoritesCache;
use crate::gateway::EventGateway;
use crate::history::SearchHistory;
use crate::model::{Event, EventDetails};
use crate::query::{RawQuery, ValidatedQuery, DEFAULT_RADIUS};
use crate::store::{self, PersistentStore, StoreError, LAST_SEARCH_KEY};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SearchPhase {
    #[default]
    Idle,
    Searching,
    Succeeded,
    Failed,
}

/// A search result with its favorite flag. `favorite` is `None` until the
/// favorites probe for this result has answered.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchResult {
    pub event: Event,
    pub favorite: Option<bool>,
}

impl SearchResult {
    pub fn is_favorite(&self) -> bool {
        self.favorite.unwrap_or(false)
    }
}

/// What the UI renders. Published on a watch channel after every transition.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchSnapshot {
    pub generation: u64,
    pub phase: SearchPhase,
    pub query: Option<ValidatedQuery>,
    pub results: Vec<SearchResult>,
    /// Kept until `clear_error` or the next search.
    pub error: Option<FetchError>,
}

/// How a single `search` call ended, from that caller's point of view.
#[derive(Debug, Clone, PartialEq)]
pub enum SearchOutcome {
    Published(Vec<SearchResult>),
    Failed(FetchError),
    /// A newer search started before this one finished; nothing was published.
    Superseded,
}

pub struct SearchCoordinator {
    gateway: Arc<EventGateway>,
    favorites: Arc<FavoritesCache>,
    history: Arc<SearchHistory>,
    store: Arc<dyn PersistentStore>,
    default_radius: u32,
    generation: AtomicU64,
    snapshot_tx: watch::Sender<SearchSnapshot>,
    /// Generation of the query last written under `LAST_SEARCH_KEY`.
    last_saved: Mutex<u64>,
}

impl SearchCoordinator {
    pub fn new(
        gateway: Arc<EventGateway>,
        favorites: Arc<FavoritesCache>,
        history: Arc<SearchHistory>,
        store: Arc<dyn PersistentStore>,
    ) -> Self {
        let (snapshot_tx, _) = watch::channel(SearchSnapshot::default());
        Self {
            gateway,
            favorites,
            history,
            store,
            default_radius: DEFAULT_RADIUS,
            generation: AtomicU64::new(0),
            snapshot_tx,
            last_saved: Mutex::new(0),
        }
    }

    /// Radius used when the form leaves it empty.
    pub fn with_default_radius(mut self, radius: u32) -> Self {
        self.default_radius = radius.max(1);
        self
    }

    pub fn subscribe(&self) -> watch::Receiver<SearchSnapshot> {
        self.snapshot_tx.subscribe()
    }

    pub fn snapshot(&self) -> SearchSnapshot {
        self.snapshot_tx.borrow().clone()
    }

    pub fn favorites(&self) -> &Arc<FavoritesCache> {
        &self.favorites
    }

    pub fn history(&self) -> &Arc<SearchHistory> {
        &self.history
    }

    /// Validate, fetch and publish. A newer call supersedes this one.
    pub async fn search(&self, mut raw: RawQuery) -> SearchOutcome {
        raw.radius = raw.radius.or(Some(self.default_radius));
        let validated = raw.validate();
        let generation = self.begin(validated.as_ref().ok().cloned());

        let query = match validated {
            Ok(query) => query,
            Err(e) => {
                debug!("[search] #{} rejected: {}", generation, e);
                let error = FetchError::from(e);
                self.publish_if_current(generation, |s| {
                    s.phase = SearchPhase::Failed;
                    s.error = Some(error.clone());
                });
                return SearchOutcome::Failed(error);
            }
        };

        info!("[search] #{} {:?}", generation, query.keyword());
        self.remember(generation, &query).await;

        let events = match self.gateway.search_events(&query).await {
            Ok(events) => events,
            Err(e) => {
                let published = self.publish_if_current(generation, |s| {
                    s.phase = SearchPhase::Failed;
                    s.error = Some(e.clone());
                });
                if !published {
                    debug!("[search] #{} failure discarded (superseded)", generation);
                    return SearchOutcome::Superseded;
                }
                return SearchOutcome::Failed(e);
            }
        };

        let mut results: Vec<SearchResult> = events
            .into_iter()
            .map(|event| SearchResult {
                event,
                favorite: None,
            })
            .collect();

        let published = self.publish_if_current(generation, |s| {
            s.phase = SearchPhase::Succeeded;
            s.results = results.clone();
            s.error = None;
        });
        if !published {
            debug!("[search] #{} results discarded (superseded)", generation);
            return SearchOutcome::Superseded;
        }

        // Results are already visible; annotate favorites afterwards.
        let flags = join_all(
            results
                .iter()
                .map(|r| self.favorites.is_favorite(&r.event.id)),
        )
        .await;
        for (result, flag) in results.iter_mut().zip(flags) {
            result.favorite = Some(flag);
        }
        self.publish_if_current(generation, |s| {
            for (published, annotated) in s.results.iter_mut().zip(&results) {
                if published.event.id == annotated.event.id && published.favorite.is_none() {
                    published.favorite = annotated.favorite;
                }
            }
        });

        SearchOutcome::Published(results)
    }

    /// Run `search` on the runtime; the UI keeps the handle or drops it.
    pub fn spawn_search(self: &Arc<Self>, raw: RawQuery) -> JoinHandle<SearchOutcome> {
        let this = Arc::clone(self);
        tokio::spawn(async move { this.search(raw).await })
    }

    /// Toggle the event with `event_id` in favorites and reflect it in the
    /// published results. `None` when the id is neither a current result nor
    /// a saved favorite.
    pub async fn toggle_favorite(&self, event_id: &str) -> Result<Option<bool>, StoreError> {
        let current = self
            .snapshot_tx
            .borrow()
            .results
            .iter()
            .find(|r| r.event.id == event_id)
            .map(|r| r.event.clone());
        let event = match current {
            Some(event) => event,
            None => match self.favorites.get(event_id).await {
                Some(event) => event,
                None => return Ok(None),
            },
        };

        let now_favorite = self.favorites.toggle(event).await?;
        self.snapshot_tx.send_if_modified(|s| {
            let mut changed = false;
            for r in s.results.iter_mut().filter(|r| r.event.id == event_id) {
                r.favorite = Some(now_favorite);
                changed = true;
            }
            changed
        });
        Ok(Some(now_favorite))
    }

    /// Artist and venue extras for a details view. Never fails.
    pub async fn enrich(&self, details: &EventDetails) -> Enrichment {
        enrich(&self.gateway, details).await
    }

    pub fn gateway(&self) -> &Arc<EventGateway> {
        &self.gateway
    }

    /// Drop a retained error. Results, if any, stay.
    pub fn clear_error(&self) {
        self.snapshot_tx.send_if_modified(|s| {
            if s.error.is_none() {
                return false;
            }
            s.error = None;
            if s.phase == SearchPhase::Failed {
                s.phase = SearchPhase::Idle;
            }
            true
        });
    }

    /// Back to `Idle`, discarding whatever is in flight.
    pub fn reset(&self) {
        self.snapshot_tx.send_modify(|s| {
            let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
            *s = SearchSnapshot {
                generation,
                ..SearchSnapshot::default()
            };
        });
    }

    /// The query submitted most recently, possibly in an earlier session.
    pub async fn restore_last_search(&self) -> Option<ValidatedQuery> {
        store::get(self.store.as_ref(), LAST_SEARCH_KEY).await
    }

    /// Start a new generation and publish `Searching`.
    fn begin(&self, query: Option<ValidatedQuery>) -> u64 {
        let mut generation = 0;
        self.snapshot_tx.send_modify(|s| {
            generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
            *s = SearchSnapshot {
                generation,
                phase: SearchPhase::Searching,
                query,
                results: Vec::new(),
                error: None,
            };
        });
        generation
    }

    /// Apply `update` only if `generation` is still the latest search.
    fn publish_if_current(&self, generation: u64, update: impl FnOnce(&mut SearchSnapshot)) -> bool {
        self.snapshot_tx.send_if_modified(|s| {
            if self.generation.load(Ordering::SeqCst) != generation || s.generation != generation {
                return false;
            }
            update(s);
            true
        })
    }

    /// Record the keyword and persist `query` as the last search. Writes of
    /// the last search are ordered by generation: once a newer submission
    /// is stored (or has started), an older one is never written over it.
    async fn remember(&self, generation: u64, query: &ValidatedQuery) {
        if let Err(e) = self.history.record(query.keyword()).await {
            warn!("[search] could not record history: {}", e);
        }

        let mut last_saved = self.last_saved.lock().await;
        if generation < *last_saved || self.generation.load(Ordering::SeqCst) != generation {
            debug!("[search] #{} not saved as last search (superseded)", generation);
            return;
        }
        match store::set(self.store.as_ref(), LAST_SEARCH_KEY, query).await {
            Ok(()) => *last_saved = generation,
            Err(e) => warn!("[search] could not persist last search: {}", e),
        }
    }
}
