//! JSON shapes returned by the events API, and their conversion into the
//! canonical records in [`crate::model`].
//!
//! Everything is optional on the wire; the API omits fields freely.

use chrono::{NaiveDate, NaiveTime};
use serde::Deserialize;

use crate::model::{
    Album, Artist, Classification, Coordinates, Event, EventDetails, PriceRange, Venue,
    VenueDetails,
};

// ── Shared pieces ─────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct Named {
    pub name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Image {
    pub url: String,
    #[serde(default)]
    pub width: Option<u32>,
}

/// Coordinates arrive as strings from some endpoints and numbers from others.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum Number {
    Float(f64),
    Text(String),
}

impl Number {
    fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Float(f) => Some(*f),
            Self::Text(s) => s.trim().parse().ok(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct Location {
    pub latitude: Option<Number>,
    pub longitude: Option<Number>,
}

impl Location {
    fn coordinates(&self) -> Option<Coordinates> {
        let lat = self.latitude.as_ref()?.as_f64()?;
        let lng = self.longitude.as_ref()?.as_f64()?;
        let c = Coordinates::new(lat, lng);
        c.is_valid().then_some(c)
    }
}

fn best_image(images: &[Image]) -> Option<String> {
    images
        .iter()
        .max_by_key(|i| i.width.unwrap_or(0))
        .map(|i| i.url.clone())
}

fn non_empty(s: Option<String>) -> Option<String> {
    s.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

// ── Events ────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct SearchResponse {
    #[serde(rename = "_embedded")]
    pub embedded: Option<EmbeddedEvents>,
}

#[derive(Debug, Deserialize)]
pub struct EmbeddedEvents {
    #[serde(default)]
    pub events: Vec<WireEvent>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireEvent {
    pub id: String,
    pub name: String,
    pub url: Option<String>,
    #[serde(default)]
    pub images: Vec<Image>,
    pub dates: Option<Dates>,
    #[serde(default)]
    pub classifications: Vec<WireClassification>,
    #[serde(default)]
    pub price_ranges: Vec<WirePriceRange>,
    #[serde(rename = "_embedded")]
    pub embedded: Option<EventEmbedded>,
    pub seatmap: Option<Seatmap>,
    pub info: Option<String>,
    pub please_note: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Dates {
    pub start: Option<Start>,
    pub status: Option<Status>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Start {
    pub local_date: Option<String>,
    pub local_time: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Status {
    pub code: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireClassification {
    pub segment: Option<Named>,
    pub genre: Option<Named>,
    pub sub_genre: Option<Named>,
}

#[derive(Debug, Deserialize)]
pub struct WirePriceRange {
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub currency: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Seatmap {
    pub static_url: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct EventEmbedded {
    #[serde(default)]
    pub venues: Vec<WireVenue>,
    #[serde(default)]
    pub attractions: Vec<Named>,
}

impl From<WireEvent> for Event {
    fn from(w: WireEvent) -> Self {
        let start = w.dates.as_ref().and_then(|d| d.start.as_ref());
        let date = start
            .and_then(|s| s.local_date.as_deref())
            .and_then(|s| NaiveDate::parse_from_str(s, "%Y-%m-%d").ok());
        let time = start
            .and_then(|s| s.local_time.as_deref())
            .and_then(|s| NaiveTime::parse_from_str(s, "%H:%M:%S").ok());

        let classification = w
            .classifications
            .first()
            .map(|c| Classification {
                segment: c.segment.as_ref().and_then(|n| n.name.clone()),
                genre: c.genre.as_ref().and_then(|n| n.name.clone()),
                subgenre: c.sub_genre.as_ref().and_then(|n| n.name.clone()),
            })
            .unwrap_or_default();

        let price_range = w.price_ranges.first().and_then(|p| {
            let min = p.min.or(p.max)?;
            Some(PriceRange {
                min,
                max: p.max.unwrap_or(min),
                currency: p.currency.clone(),
            })
        });

        let venue = w
            .embedded
            .as_ref()
            .and_then(|e| e.venues.first())
            .map(WireVenue::summary);

        Event {
            id: w.id,
            name: w.name,
            date,
            time,
            venue,
            classification,
            image_url: best_image(&w.images),
            price_range,
            ticket_url: non_empty(w.url),
        }
    }
}

impl From<WireEvent> for EventDetails {
    fn from(mut w: WireEvent) -> Self {
        let ticket_status = w
            .dates
            .as_ref()
            .and_then(|d| d.status.as_ref())
            .and_then(|s| s.code.clone());
        let seatmap_url = w.seatmap.take().and_then(|s| non_empty(s.static_url));
        let attractions = w
            .embedded
            .as_mut()
            .map(|e| std::mem::take(&mut e.attractions))
            .unwrap_or_default()
            .into_iter()
            .filter_map(|a| non_empty(a.name))
            .collect();
        let info = non_empty(w.info.take());
        let please_note = non_empty(w.please_note.take());

        EventDetails {
            event: Event::from(w),
            ticket_status,
            seatmap_url,
            attractions,
            info,
            please_note,
        }
    }
}

// ── Venues ────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireVenue {
    pub name: Option<String>,
    pub url: Option<String>,
    pub city: Option<Named>,
    pub state: Option<WireState>,
    pub address: Option<Address>,
    pub location: Option<Location>,
    pub box_office_info: Option<BoxOfficeInfo>,
    pub general_info: Option<GeneralInfo>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireState {
    pub name: Option<String>,
    pub state_code: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Address {
    pub line1: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoxOfficeInfo {
    pub phone_number_detail: Option<String>,
    pub open_hours_detail: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneralInfo {
    pub general_rule: Option<String>,
    pub child_rule: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct VenueSearchResponse {
    #[serde(rename = "_embedded")]
    pub embedded: Option<EventEmbedded>,
}

impl WireVenue {
    fn summary(&self) -> Venue {
        Venue {
            name: self.name.clone().unwrap_or_default(),
            city: self.city.as_ref().and_then(|c| c.name.clone()),
            state: self
                .state
                .as_ref()
                .and_then(|s| s.name.clone().or_else(|| s.state_code.clone())),
            coordinates: self.location.as_ref().and_then(Location::coordinates),
        }
    }
}

impl From<WireVenue> for VenueDetails {
    fn from(w: WireVenue) -> Self {
        let summary = w.summary();
        let city = match (summary.city, summary.state) {
            (Some(c), Some(s)) => Some(format!("{c}, {s}")),
            (c, s) => c.or(s),
        };
        VenueDetails {
            name: summary.name,
            address: w.address.and_then(|a| non_empty(a.line1)),
            city,
            phone: w
                .box_office_info
                .as_ref()
                .and_then(|b| non_empty(b.phone_number_detail.clone())),
            open_hours: w
                .box_office_info
                .and_then(|b| non_empty(b.open_hours_detail)),
            general_rule: w
                .general_info
                .as_ref()
                .and_then(|g| non_empty(g.general_rule.clone())),
            child_rule: w.general_info.and_then(|g| non_empty(g.child_rule)),
            coordinates: summary.coordinates,
            url: non_empty(w.url),
        }
    }
}

// ── Suggestions ───────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct SuggestResponse {
    #[serde(rename = "_embedded")]
    pub embedded: Option<EventEmbedded>,
}

impl SuggestResponse {
    pub fn names(self) -> Vec<String> {
        self.embedded
            .map(|e| e.attractions)
            .unwrap_or_default()
            .into_iter()
            .filter_map(|a| non_empty(a.name))
            .collect()
    }
}

// ── Artists / albums ──────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ArtistSearchResponse {
    pub artists: Option<Page<WireArtist>>,
}

#[derive(Debug, Deserialize)]
pub struct Page<T> {
    #[serde(default = "Vec::new")]
    pub items: Vec<T>,
}

#[derive(Debug, Deserialize)]
pub struct ExternalUrls {
    pub spotify: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Followers {
    pub total: Option<u64>,
}

#[derive(Debug, Deserialize)]
pub struct WireArtist {
    pub id: String,
    pub name: String,
    pub followers: Option<Followers>,
    pub popularity: Option<u8>,
    #[serde(default)]
    pub images: Vec<Image>,
    pub external_urls: Option<ExternalUrls>,
    #[serde(default)]
    pub genres: Vec<String>,
}

impl From<WireArtist> for Artist {
    fn from(w: WireArtist) -> Self {
        Artist {
            id: w.id,
            name: w.name,
            followers: w.followers.and_then(|f| f.total).unwrap_or(0),
            popularity: w.popularity.unwrap_or(0).min(100),
            image_url: best_image(&w.images),
            profile_url: w.external_urls.and_then(|u| non_empty(u.spotify)),
            genres: w.genres,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct WireAlbum {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub images: Vec<Image>,
    pub release_date: Option<String>,
    pub external_urls: Option<ExternalUrls>,
}

impl From<WireAlbum> for Album {
    fn from(w: WireAlbum) -> Self {
        Album {
            id: w.id,
            name: w.name,
            image_url: best_image(&w.images),
            release_date: non_empty(w.release_date),
            url: w.external_urls.and_then(|u| non_empty(u.spotify)),
        }
    }
}

// ── Errors ────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ErrorBody {
    pub message: Option<String>,
    pub fault: Option<Fault>,
    #[serde(default)]
    pub errors: Vec<ErrorDetail>,
}

#[derive(Debug, Deserialize)]
pub struct Fault {
    pub faultstring: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ErrorDetail {
    pub detail: Option<String>,
}

/// Best human-readable message in an error body, if it has one.
pub fn error_message(body: &str) -> Option<String> {
    let parsed: ErrorBody = serde_json::from_str(body).ok()?;
    non_empty(parsed.message)
        .or_else(|| parsed.fault.and_then(|f| non_empty(f.faultstring)))
        .or_else(|| parsed.errors.into_iter().find_map(|e| non_empty(e.detail)))
}
