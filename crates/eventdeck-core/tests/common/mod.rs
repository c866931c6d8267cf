#![allow(dead_code)]

use async_trait::async_trait;
use eventdeck_core::gateway::{HttpResponse, Transport, TransportError};
use eventdeck_core::store::{MemoryStore, PersistentStore, StoreError};
use eventdeck_core::{EventGateway, FavoritesCache, SearchCoordinator, SearchHistory};
use serde_json::{json, Value};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

// ── Scripted transport ────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct Reply {
    delay: Duration,
    result: Result<HttpResponse, String>,
}

impl Reply {
    pub fn json(body: Value) -> Self {
        Self::status(200, &body.to_string())
    }

    pub fn status(status: u16, body: &str) -> Self {
        Self {
            delay: Duration::ZERO,
            result: Ok(HttpResponse::new(status, body)),
        }
    }

    pub fn fail(message: &str) -> Self {
        Self {
            delay: Duration::ZERO,
            result: Err(message.to_string()),
        }
    }

    pub fn after(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

/// One request as the gateway issued it. `path` is the raw segments joined
/// with `/`, before any encoding.
#[derive(Debug, Clone, PartialEq)]
pub struct Call {
    pub path: String,
    pub query: Vec<(String, String)>,
}

impl Call {
    pub fn param(&self, key: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

struct Route {
    path: String,
    param_value: Option<String>,
    reply: Reply,
}

/// In-memory `Transport`: answers from registered routes and records every
/// request. Later routes shadow earlier ones; unmatched requests get a 404.
#[derive(Default)]
pub struct ScriptedTransport {
    routes: Mutex<Vec<Route>>,
    calls: Mutex<Vec<Call>>,
}

impl ScriptedTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Answer every request to `path`.
    pub fn on(&self, path: &str, reply: Reply) {
        self.push(path, None, reply);
    }

    /// Answer requests to `path` carrying a query value equal to `value`.
    pub fn on_param(&self, path: &str, value: &str, reply: Reply) {
        self.push(path, Some(value.to_string()), reply);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn calls_to(&self, path: &str) -> Vec<Call> {
        self.calls().into_iter().filter(|c| c.path == path).collect()
    }

    fn push(&self, path: &str, param_value: Option<String>, reply: Reply) {
        self.routes.lock().unwrap().push(Route {
            path: path.to_string(),
            param_value,
            reply,
        });
    }

    fn lookup(&self, call: &Call) -> Reply {
        let routes = self.routes.lock().unwrap();
        routes
            .iter()
            .rev()
            .find(|r| {
                r.path == call.path
                    && r.param_value
                        .as_ref()
                        .map_or(true, |v| call.query.iter().any(|(_, q)| q == v))
            })
            .map(|r| r.reply.clone())
            .unwrap_or_else(|| Reply::status(404, r#"{"message":"no route"}"#))
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn get(&self, path: &[&str], query: &[(&str, String)]) -> Result<HttpResponse, TransportError> {
        let call = Call {
            path: path.join("/"),
            query: query.iter().map(|(k, v)| (k.to_string(), v.clone())).collect(),
        };
        self.calls.lock().unwrap().push(call.clone());
        let reply = self.lookup(&call);
        if !reply.delay.is_zero() {
            tokio::time::sleep(reply.delay).await;
        }
        reply.result.map_err(TransportError)
    }
}

// ── Store that can refuse writes ──────────────────────────────────────────────

#[derive(Default)]
pub struct FlakyStore {
    pub inner: MemoryStore,
    fail_writes: AtomicBool,
    next_write_delay: Mutex<Option<Duration>>,
}

impl FlakyStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Hold the next write (only that one) for `delay` before it lands.
    pub fn delay_next_write(&self, delay: Duration) {
        *self.next_write_delay.lock().unwrap() = Some(delay);
    }

    fn check(&self) -> Result<(), StoreError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StoreError::Io(std::io::Error::new(
                std::io::ErrorKind::Other,
                "disk full",
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl PersistentStore for FlakyStore {
    async fn read(&self, key: &str) -> Result<Option<String>, StoreError> {
        self.inner.read(key).await
    }

    async fn write(&self, key: &str, payload: String) -> Result<(), StoreError> {
        let delay = self.next_write_delay.lock().unwrap().take();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        self.check()?;
        self.inner.write(key, payload).await
    }

    async fn remove(&self, key: &str) -> Result<(), StoreError> {
        self.check()?;
        self.inner.remove(key).await
    }
}

// ── Fixtures ──────────────────────────────────────────────────────────────────

pub fn event_json(id: &str, name: &str) -> Value {
    json!({
        "id": id,
        "name": name,
        "url": format!("https://tickets.example.com/{id}"),
        "dates": { "start": { "localDate": "2026-11-02", "localTime": "19:30:00" } },
        "classifications": [{ "segment": { "name": "Music" }, "genre": { "name": "Jazz" } }],
        "_embedded": { "venues": [{ "name": "Blue Note", "city": { "name": "New York" } }] }
    })
}

pub fn search_body(events: &[(&str, &str)]) -> Value {
    let events: Vec<Value> = events.iter().map(|(id, name)| event_json(id, name)).collect();
    json!({ "_embedded": { "events": events } })
}

pub fn suggest_body(names: &[&str]) -> Value {
    let attractions: Vec<Value> = names.iter().map(|n| json!({ "name": n })).collect();
    json!({ "_embedded": { "attractions": attractions } })
}

pub struct Harness {
    pub transport: Arc<ScriptedTransport>,
    pub store: Arc<MemoryStore>,
    pub gateway: Arc<EventGateway>,
    pub favorites: Arc<FavoritesCache>,
    pub coordinator: Arc<SearchCoordinator>,
}

pub async fn harness() -> Harness {
    let transport = ScriptedTransport::new();
    let store = Arc::new(MemoryStore::new());
    let gateway = Arc::new(EventGateway::new(transport.clone()));
    let favorites = Arc::new(FavoritesCache::load(store.clone()).await);
    let history = Arc::new(SearchHistory::load(store.clone(), 10).await);
    let coordinator = Arc::new(SearchCoordinator::new(
        gateway.clone(),
        favorites.clone(),
        history,
        store.clone(),
    ));
    Harness {
        transport,
        store,
        gateway,
        favorites,
        coordinator,
    }
}
