//! Debounced keyword suggestions.
//!
//! Every keystroke starts a new cycle: the previous cycle's token is
//! cancelled, which stops its timer or drops its in-flight fetch. A cycle
//! publishes only while its generation is still the latest.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::config::SuggestionsConfig;
use crate::gateway::EventGateway;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SuggestionState {
    pub generation: u64,
    /// Trimmed input the suggestions belong to.
    pub input: String,
    pub suggestions: Vec<String>,
    /// A cycle for `input` is waiting on its timer or its fetch.
    pub pending: bool,
}

pub struct SuggestionDebouncer {
    gateway: Arc<EventGateway>,
    interval: Duration,
    min_chars: usize,
    generation: AtomicU64,
    cycle: Mutex<CancellationToken>,
    state_tx: watch::Sender<SuggestionState>,
}

impl SuggestionDebouncer {
    /// 300 ms window, two-character minimum.
    pub fn new(gateway: Arc<EventGateway>) -> Self {
        Self::with_config(gateway, &SuggestionsConfig::default())
    }

    pub fn with_config(gateway: Arc<EventGateway>, config: &SuggestionsConfig) -> Self {
        let (state_tx, _) = watch::channel(SuggestionState::default());
        Self {
            gateway,
            interval: config.debounce(),
            min_chars: config.min_chars.max(1),
            generation: AtomicU64::new(0),
            cycle: Mutex::new(CancellationToken::new()),
            state_tx,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn subscribe(&self) -> watch::Receiver<SuggestionState> {
        self.state_tx.subscribe()
    }

    pub fn state(&self) -> SuggestionState {
        self.state_tx.borrow().clone()
    }

    /// Feed the current contents of the keyword field. Returns the handle of
    /// the spawned cycle, or `None` when the input was too short to fetch.
    pub fn on_input(self: &Arc<Self>, text: &str) -> Option<JoinHandle<()>> {
        let (generation, token) = self.restart();
        let input = text.trim().to_string();

        if input.chars().count() < self.min_chars {
            self.state_tx.send_modify(|s| {
                *s = SuggestionState {
                    generation,
                    input,
                    suggestions: Vec::new(),
                    pending: false,
                };
            });
            return None;
        }

        // Previous suggestions stay visible until the new ones land.
        self.state_tx.send_modify(|s| {
            s.generation = generation;
            s.input = input.clone();
            s.pending = true;
        });

        let this = Arc::clone(self);
        Some(tokio::spawn(async move {
            tokio::select! {
                _ = token.cancelled() => return,
                _ = tokio::time::sleep(this.interval) => {}
            }

            let suggestions = tokio::select! {
                _ = token.cancelled() => {
                    debug!("[suggest] #{} fetch dropped", generation);
                    return;
                }
                fetched = this.gateway.autocomplete(&input) => fetched.unwrap_or_default(),
            };

            let published = this.state_tx.send_if_modified(|s| {
                if this.generation.load(Ordering::SeqCst) != generation {
                    return false;
                }
                s.suggestions = suggestions;
                s.pending = false;
                true
            });
            if !published {
                debug!("[suggest] #{} result discarded", generation);
            }
        }))
    }

    /// Abandon the current cycle and clear suggestions.
    pub fn cancel(&self) {
        let (generation, _) = self.restart();
        self.state_tx.send_modify(|s| {
            *s = SuggestionState {
                generation,
                ..SuggestionState::default()
            };
        });
    }

    /// Cancel the running cycle and hand out the next generation and token.
    fn restart(&self) -> (u64, CancellationToken) {
        let mut current = self.cycle.lock().unwrap_or_else(PoisonError::into_inner);
        current.cancel();
        *current = CancellationToken::new();
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        (generation, current.clone())
    }
}
