//! Async façade over the remote events / artist / venue API.
//!
//! Primary calls (search, details) report failures precisely. Advisory calls
//! never fail loudly: autocomplete folds every failure into an empty list,
//! and enrichment failures are for the caller to drop.

mod transport;
pub mod wire;

pub use transport::{HttpResponse, ReqwestTransport, Transport, TransportError};

use serde::de::DeserializeOwned;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::error::{FetchError, FetchResult};
use crate::model::{Album, Artist, Event, EventDetails, VenueDetails};
use crate::query::ValidatedQuery;

const SEARCH_PATH: &[&str] = &["events", "search"];
const SUGGEST_PATH: &[&str] = &["suggest"];
const ARTIST_SEARCH_PATH: &[&str] = &["artists", "search"];
const VENUES_PATH: &[&str] = &["venues"];

/// Shorter keywords are not worth a round trip.
pub const MIN_AUTOCOMPLETE_CHARS: usize = 2;

pub struct EventGateway {
    transport: Arc<dyn Transport>,
}

impl EventGateway {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }

    /// Events matching `query`. An empty body or no embedded results is an
    /// empty success.
    pub async fn search_events(&self, query: &ValidatedQuery) -> FetchResult<Vec<Event>> {
        let params = query.to_query_parameters();
        let response = self.fetch(SEARCH_PATH, &params).await?;
        if is_empty_body(&response.body) {
            debug!("[gateway] search {:?}: empty body ({})", query.keyword(), response.status);
            return Ok(Vec::new());
        }
        let parsed: wire::SearchResponse = decode(&response)?;
        let events: Vec<Event> = parsed
            .embedded
            .map(|e| e.events)
            .unwrap_or_default()
            .into_iter()
            .map(Event::from)
            .collect();
        debug!("[gateway] search {:?}: {} events", query.keyword(), events.len());
        Ok(events)
    }

    /// Details for one event. A blank id is `NotFound` without a request.
    pub async fn event_details(&self, id: &str) -> FetchResult<EventDetails> {
        let id = resource_id(id, "event")?;
        let response = self.fetch(&["events", id], &[]).await?;
        if is_empty_body(&response.body) {
            return Err(FetchError::NotFound(format!("event {id}")));
        }
        let wire: wire::WireEvent = decode(&response)?;
        Ok(EventDetails::from(wire))
    }

    /// Keyword completions. Never returns `Err`: input shorter than
    /// [`MIN_AUTOCOMPLETE_CHARS`] short-circuits without a request, and any
    /// failure reads as "no suggestions".
    pub async fn autocomplete(&self, keyword: &str) -> FetchResult<Vec<String>> {
        let keyword = keyword.trim();
        if keyword.chars().count() < MIN_AUTOCOMPLETE_CHARS {
            return Ok(Vec::new());
        }

        let params = [("keyword", keyword.to_string())];
        let names = match self.fetch(SUGGEST_PATH, &params).await {
            Ok(response) => match decode::<wire::SuggestResponse>(&response) {
                Ok(parsed) => parsed.names(),
                Err(e) => {
                    debug!("[gateway] autocomplete {:?} unreadable: {}", keyword, e);
                    Vec::new()
                }
            },
            Err(e) => {
                debug!("[gateway] autocomplete {:?} failed: {}", keyword, e);
                Vec::new()
            }
        };
        Ok(names)
    }

    pub async fn search_artist(&self, name: &str) -> FetchResult<Vec<Artist>> {
        let params = [("name", name.trim().to_string())];
        let response = self.fetch(ARTIST_SEARCH_PATH, &params).await?;
        let parsed: wire::ArtistSearchResponse = decode(&response)?;
        Ok(parsed
            .artists
            .map(|p| p.items)
            .unwrap_or_default()
            .into_iter()
            .map(Artist::from)
            .collect())
    }

    pub async fn artist_albums(&self, artist_id: &str) -> FetchResult<Vec<Album>> {
        let artist_id = resource_id(artist_id, "artist")?;
        let response = self.fetch(&["artists", artist_id, "albums"], &[]).await?;
        let parsed: wire::Page<wire::WireAlbum> = decode(&response)?;
        Ok(parsed.items.into_iter().map(Album::from).collect())
    }

    pub async fn venue_details(&self, name: &str) -> FetchResult<VenueDetails> {
        let params = [("name", name.trim().to_string())];
        let response = self.fetch(VENUES_PATH, &params).await?;
        if is_empty_body(&response.body) {
            return Err(FetchError::NotFound(format!("venue {name}")));
        }
        let parsed: wire::VenueSearchResponse = decode(&response)?;
        parsed
            .embedded
            .and_then(|e| e.venues.into_iter().next())
            .map(VenueDetails::from)
            .ok_or_else(|| FetchError::NotFound(format!("venue {name}")))
    }

    /// Run the request and turn transport failures and non-2xx statuses into
    /// `FetchError`s. Only successful responses come back.
    async fn fetch(&self, path: &[&str], params: &[(&str, String)]) -> FetchResult<HttpResponse> {
        let response = self.transport.get(path, params).await.map_err(|e| {
            warn!("[gateway] GET {} failed: {}", path.join("/"), e);
            FetchError::Transport(e.to_string())
        })?;

        if !response.is_success() {
            let message = wire::error_message(&response.body)
                .unwrap_or_else(|| reason_phrase(response.status).to_string());
            warn!("[gateway] GET {} -> {}: {}", path.join("/"), response.status, message);
            return Err(FetchError::Api {
                status: response.status,
                message,
            });
        }
        Ok(response)
    }
}

fn decode<T: DeserializeOwned>(response: &HttpResponse) -> FetchResult<T> {
    serde_json::from_str(&response.body).map_err(|e| FetchError::Api {
        status: response.status,
        message: format!("malformed response: {e}"),
    })
}

/// Blank, `null` and `{}` bodies all mean "nothing here".
fn is_empty_body(body: &str) -> bool {
    let trimmed = body.trim();
    if trimmed.is_empty() || trimmed == "null" {
        return true;
    }
    matches!(
        serde_json::from_str::<serde_json::Value>(trimmed),
        Ok(serde_json::Value::Object(ref map)) if map.is_empty()
    )
}

/// An id used as one path segment. Blank ids and the dot segments can never
/// name a resource, so they are `NotFound` before any request is made.
fn resource_id<'a>(id: &'a str, kind: &str) -> FetchResult<&'a str> {
    let id = id.trim();
    if id.is_empty() || id == "." || id == ".." {
        return Err(FetchError::NotFound(format!("{kind} {id:?}")));
    }
    Ok(id)
}

fn reason_phrase(status: u16) -> &'static str {
    match status {
        400 => "Bad Request",
        401 => "Unauthorized",
        403 => "Forbidden",
        404 => "Not Found",
        429 => "Too Many Requests",
        500 => "Internal Server Error",
        502 => "Bad Gateway",
        503 => "Service Unavailable",
        504 => "Gateway Timeout",
        s if s >= 500 => "Server Error",
        s if s >= 400 => "Client Error",
        _ => "Unexpected Status",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_empty_body() {
        assert!(is_empty_body(""));
        assert!(is_empty_body("  \n"));
        assert!(is_empty_body("null"));
        assert!(is_empty_body("{ }"));
        assert!(!is_empty_body(r#"{"id":"E1"}"#));
        assert!(!is_empty_body("[]"));
    }

    #[test]
    fn test_resource_id() {
        assert_eq!(resource_id(" vvG1iZ9pNkm2sO ", "event"), Ok("vvG1iZ9pNkm2sO"));
        assert_eq!(resource_id("E 1", "event"), Ok("E 1"));
        assert_eq!(resource_id("../admin", "event"), Ok("../admin"));
        for id in ["", "   ", ".", ".."] {
            assert!(matches!(resource_id(id, "event"), Err(FetchError::NotFound(_))), "{id:?}");
        }
    }

    #[test]
    fn test_reason_phrase_fallbacks() {
        assert_eq!(reason_phrase(404), "Not Found");
        assert_eq!(reason_phrase(599), "Server Error");
        assert_eq!(reason_phrase(418), "Client Error");
    }
}
