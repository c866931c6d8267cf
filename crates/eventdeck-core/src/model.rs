//! Canonical records handed to the UI and persisted in favorites.
//!
//! These are the shapes the rest of the crate works with; the remote API's
//! JSON layout lives in `gateway::wire` and is converted into these.

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinates {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Finite and inside the WGS84 ranges.
    pub fn is_valid(&self) -> bool {
        self.lat.is_finite()
            && self.lng.is_finite()
            && (-90.0..=90.0).contains(&self.lat)
            && (-180.0..=180.0).contains(&self.lng)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Venue {
    pub name: String,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub coordinates: Option<Coordinates>,
}

/// Segment → genre → subgenre classification path.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Classification {
    #[serde(default)]
    pub segment: Option<String>,
    #[serde(default)]
    pub genre: Option<String>,
    #[serde(default)]
    pub subgenre: Option<String>,
}

impl Classification {
    /// "Music | Rock | Pop" style label; placeholder values are skipped.
    pub fn label(&self) -> String {
        [&self.segment, &self.genre, &self.subgenre]
            .into_iter()
            .flatten()
            .filter(|s| !s.is_empty() && !s.eq_ignore_ascii_case("undefined"))
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(" | ")
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceRange {
    pub min: f64,
    pub max: f64,
    #[serde(default)]
    pub currency: Option<String>,
}

impl PriceRange {
    pub fn label(&self) -> String {
        let currency = self.currency.as_deref().unwrap_or("USD");
        if (self.max - self.min).abs() < f64::EPSILON {
            format!("{:.2} {}", self.min, currency)
        } else {
            format!("{:.2} - {:.2} {}", self.min, self.max, currency)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    /// Stable across fetches; the favorites key.
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub date: Option<NaiveDate>,
    #[serde(default)]
    pub time: Option<NaiveTime>,
    #[serde(default)]
    pub venue: Option<Venue>,
    #[serde(default)]
    pub classification: Classification,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub price_range: Option<PriceRange>,
    #[serde(default)]
    pub ticket_url: Option<String>,
}

impl Event {
    /// Minimal event, mostly useful for building fixtures.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            date: None,
            time: None,
            venue: None,
            classification: Classification::default(),
            image_url: None,
            price_range: None,
            ticket_url: None,
        }
    }

    pub fn venue_name(&self) -> Option<&str> {
        self.venue.as_ref().map(|v| v.name.as_str())
    }

    /// "2026-11-02 19:30", "2026-11-02" or "TBA".
    pub fn when_label(&self) -> String {
        match (self.date, self.time) {
            (Some(d), Some(t)) => format!("{} {}", d.format("%Y-%m-%d"), t.format("%H:%M")),
            (Some(d), None) => d.format("%Y-%m-%d").to_string(),
            _ => "TBA".to_string(),
        }
    }
}

/// Full record for the details view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventDetails {
    pub event: Event,
    /// Ticket status code, e.g. `onsale`, `offsale`, `cancelled`.
    pub ticket_status: Option<String>,
    pub seatmap_url: Option<String>,
    /// Performer / team names in billing order.
    pub attractions: Vec<String>,
    pub info: Option<String>,
    pub please_note: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Artist {
    pub id: String,
    pub name: String,
    pub followers: u64,
    pub popularity: u8,
    pub image_url: Option<String>,
    pub profile_url: Option<String>,
    pub genres: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Album {
    pub id: String,
    pub name: String,
    pub image_url: Option<String>,
    pub release_date: Option<String>,
    pub url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VenueDetails {
    pub name: String,
    pub address: Option<String>,
    pub city: Option<String>,
    pub phone: Option<String>,
    pub open_hours: Option<String>,
    pub general_rule: Option<String>,
    pub child_rule: Option<String>,
    pub coordinates: Option<Coordinates>,
    pub url: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classification_label_skips_undefined() {
        let c = Classification {
            segment: Some("Music".into()),
            genre: Some("Rock".into()),
            subgenre: Some("Undefined".into()),
        };
        assert_eq!(c.label(), "Music | Rock");
        assert_eq!(Classification::default().label(), "");
    }

    #[test]
    fn test_when_label() {
        let mut e = Event::new("E1", "Concert");
        assert_eq!(e.when_label(), "TBA");
        e.date = NaiveDate::from_ymd_opt(2026, 11, 2);
        assert_eq!(e.when_label(), "2026-11-02");
        e.time = NaiveTime::from_hms_opt(19, 30, 0);
        assert_eq!(e.when_label(), "2026-11-02 19:30");
    }

    #[test]
    fn test_price_label() {
        let fixed = PriceRange { min: 25.0, max: 25.0, currency: None };
        assert_eq!(fixed.label(), "25.00 USD");
        let range = PriceRange { min: 30.5, max: 99.0, currency: Some("EUR".into()) };
        assert_eq!(range.label(), "30.50 - 99.00 EUR");
    }

    #[test]
    fn test_coordinates_validity() {
        assert!(Coordinates::new(34.0522, -118.2437).is_valid());
        assert!(!Coordinates::new(91.0, 0.0).is_valid());
        assert!(!Coordinates::new(0.0, f64::NAN).is_valid());
    }

    #[test]
    fn test_event_snapshot_tolerates_missing_optionals() {
        let e: Event = serde_json::from_str(r#"{"id":"E1","name":"Concert"}"#).unwrap();
        assert_eq!(e, Event::new("E1", "Concert"));
    }
}
