//! Event discovery client core: query validation, the remote gateway,
//! local persistence (favorites, history, last search) and the search
//! session coordinator that UIs subscribe to.

pub mod config;
pub mod coordinator;
pub mod error;
pub mod favorites;
pub mod gateway;
pub mod history;
pub mod model;
pub mod platform;
pub mod query;
pub mod store;

pub use config::Config;
pub use coordinator::{
    Enrichment, SearchCoordinator, SearchOutcome, SearchPhase, SearchResult, SearchSnapshot,
    SuggestionDebouncer, SuggestionState,
};
pub use error::{ErrorKind, FetchError, FetchResult};
pub use favorites::FavoritesCache;
pub use gateway::{EventGateway, HttpResponse, ReqwestTransport, Transport, TransportError};
pub use history::SearchHistory;
pub use model::{Album, Artist, Coordinates, Event, EventDetails, VenueDetails};
pub use query::{Category, Location, RawQuery, ValidatedQuery, ValidationError};
pub use store::{JsonFileStore, MemoryStore, PersistentStore, StoreError};
