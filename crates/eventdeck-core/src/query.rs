//! Search input validation and the query parameters derived from it.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::model::Coordinates;

pub const DEFAULT_RADIUS: u32 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("keyword must not be blank")]
    InvalidKeyword,
    #[error("enter a location or use the current position")]
    InvalidLocation,
    #[error("radius must be a positive number")]
    InvalidRadius,
}

// ── Category ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    /// No filter. Never sent as a parameter.
    #[default]
    All,
    Music,
    Sports,
    Arts,
    Film,
    Misc,
}

impl Category {
    pub const ALL: [Category; 6] = [
        Category::All,
        Category::Music,
        Category::Sports,
        Category::Arts,
        Category::Film,
        Category::Misc,
    ];

    /// Segment identifier the events API filters on.
    pub fn segment_id(&self) -> Option<&'static str> {
        match self {
            Self::All => None,
            Self::Music => Some("KZFzniwnSyZfZ7v7nJ"),
            Self::Sports => Some("KZFzniwnSyZfZ7v7nE"),
            Self::Arts => Some("KZFzniwnSyZfZ7v7na"),
            Self::Film => Some("KZFzniwnSyZfZ7v7nn"),
            Self::Misc => Some("KZFzniwnSyZfZ7v7n1"),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::All => "All",
            Self::Music => "Music",
            Self::Sports => "Sports",
            Self::Arts => "Arts & Theatre",
            Self::Film => "Film",
            Self::Misc => "Miscellaneous",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "all" | "default" => Ok(Self::All),
            "music" => Ok(Self::Music),
            "sports" => Ok(Self::Sports),
            "arts" | "arts & theatre" | "arts&theatre" | "theatre" => Ok(Self::Arts),
            "film" => Ok(Self::Film),
            "misc" | "miscellaneous" => Ok(Self::Misc),
            other => Err(format!("unknown category: {other}")),
        }
    }
}

// ── Raw input → validated query ───────────────────────────────────────────────

/// Search form contents exactly as the user left them.
#[derive(Debug, Clone, Default)]
pub struct RawQuery {
    pub keyword: String,
    /// `None` means "use the default radius".
    pub radius: Option<u32>,
    pub category: Category,
    /// Set when the user asked to search around their current position.
    pub current_position: Option<Coordinates>,
    pub place: String,
}

impl RawQuery {
    pub fn new(keyword: impl Into<String>) -> Self {
        Self {
            keyword: keyword.into(),
            ..Self::default()
        }
    }

    pub fn radius(mut self, radius: u32) -> Self {
        self.radius = Some(radius);
        self
    }

    pub fn category(mut self, category: Category) -> Self {
        self.category = category;
        self
    }

    pub fn near(mut self, position: Coordinates) -> Self {
        self.current_position = Some(position);
        self
    }

    pub fn at_place(mut self, place: impl Into<String>) -> Self {
        self.place = place.into();
        self
    }

    pub fn validate(&self) -> Result<ValidatedQuery, ValidationError> {
        validate(self)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum Location {
    Coordinates(Coordinates),
    Place { name: String },
}

/// A query that passed validation. Exactly one location mode by construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidatedQuery {
    keyword: String,
    radius: u32,
    category: Category,
    location: Location,
}

impl ValidatedQuery {
    pub fn keyword(&self) -> &str {
        &self.keyword
    }

    pub fn radius(&self) -> u32 {
        self.radius
    }

    pub fn category(&self) -> Category {
        self.category
    }

    pub fn location(&self) -> &Location {
        &self.location
    }

    pub fn to_query_parameters(&self) -> Vec<(&'static str, String)> {
        to_query_parameters(self)
    }
}

pub fn validate(raw: &RawQuery) -> Result<ValidatedQuery, ValidationError> {
    let keyword = raw.keyword.trim();
    if keyword.is_empty() {
        return Err(ValidationError::InvalidKeyword);
    }

    let radius = raw.radius.unwrap_or(DEFAULT_RADIUS);
    if radius == 0 {
        return Err(ValidationError::InvalidRadius);
    }

    // The current position wins when both are filled in.
    let location = match raw.current_position {
        Some(pos) if pos.is_valid() => Location::Coordinates(pos),
        _ => {
            let place = raw.place.trim();
            if place.is_empty() {
                return Err(ValidationError::InvalidLocation);
            }
            Location::Place {
                name: place.to_string(),
            }
        }
    };

    Ok(ValidatedQuery {
        keyword: keyword.to_string(),
        radius,
        category: raw.category,
        location,
    })
}

/// Ordered request parameters. `keyword` and `radius` always lead.
pub fn to_query_parameters(query: &ValidatedQuery) -> Vec<(&'static str, String)> {
    let mut params = vec![
        ("keyword", query.keyword.clone()),
        ("radius", query.radius.to_string()),
    ];
    if let Some(segment) = query.category.segment_id() {
        params.push(("category", segment.to_string()));
    }
    match &query.location {
        Location::Coordinates(c) => {
            params.push(("lat", c.lat.to_string()));
            params.push(("lng", c.lng.to_string()));
        }
        Location::Place { name } => params.push(("location", name.clone())),
    }
    params
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(params: &[(&'static str, String)]) -> Vec<&'static str> {
        params.iter().map(|(k, _)| *k).collect()
    }

    #[test]
    fn test_blank_keyword_rejected() {
        let raw = RawQuery::new("   ").at_place("Los Angeles");
        assert_eq!(raw.validate(), Err(ValidationError::InvalidKeyword));
    }

    #[test]
    fn test_missing_location_rejected() {
        assert_eq!(
            RawQuery::new("jazz").validate(),
            Err(ValidationError::InvalidLocation)
        );
        assert_eq!(
            RawQuery::new("jazz").at_place("  \t").validate(),
            Err(ValidationError::InvalidLocation)
        );
    }

    #[test]
    fn test_unusable_position_falls_back_to_place() {
        let bogus = Coordinates::new(f64::NAN, 10.0);
        assert_eq!(
            RawQuery::new("jazz").near(bogus).validate(),
            Err(ValidationError::InvalidLocation)
        );
        let q = RawQuery::new("jazz").near(bogus).at_place("Austin").validate().unwrap();
        assert_eq!(q.location(), &Location::Place { name: "Austin".into() });
    }

    #[test]
    fn test_zero_radius_rejected() {
        let raw = RawQuery::new("jazz").at_place("Austin").radius(0);
        assert_eq!(raw.validate(), Err(ValidationError::InvalidRadius));
    }

    #[test]
    fn test_defaults_and_trimming() {
        let q = RawQuery::new("  taylor swift ").at_place(" Nashville ").validate().unwrap();
        assert_eq!(q.keyword(), "taylor swift");
        assert_eq!(q.radius(), DEFAULT_RADIUS);
        assert_eq!(q.category(), Category::All);
        assert_eq!(q.location(), &Location::Place { name: "Nashville".into() });
    }

    #[test]
    fn test_params_for_place_mode() {
        let q = RawQuery::new("jazz").at_place("Austin").radius(25).validate().unwrap();
        assert_eq!(
            q.to_query_parameters(),
            vec![
                ("keyword", "jazz".to_string()),
                ("radius", "25".to_string()),
                ("location", "Austin".to_string()),
            ]
        );
    }

    #[test]
    fn test_params_for_position_mode_with_category() {
        let q = RawQuery::new("lakers")
            .category(Category::Sports)
            .near(Coordinates::new(34.05, -118.25))
            .at_place("ignored")
            .validate()
            .unwrap();
        let params = q.to_query_parameters();
        assert_eq!(names(&params), vec!["keyword", "radius", "category", "lat", "lng"]);
        assert_eq!(params[2].1, "KZFzniwnSyZfZ7v7nE");
        assert_eq!(params[3].1, "34.05");
        assert_eq!(params[4].1, "-118.25");
    }

    #[test]
    fn test_params_never_mix_location_modes() {
        let position = Coordinates::new(40.7, -74.0);
        for category in Category::ALL {
            for (pos, place) in [
                (Some(position), ""),
                (Some(position), "Brooklyn"),
                (None, "Brooklyn"),
            ] {
                let raw = RawQuery {
                    keyword: "show".into(),
                    radius: Some(5),
                    category,
                    current_position: pos,
                    place: place.into(),
                };
                let params = raw.validate().unwrap().to_query_parameters();
                let keys = names(&params);
                let has_pair = keys.contains(&"lat") && keys.contains(&"lng");
                let has_place = keys.contains(&"location");
                assert!(has_pair ^ has_place, "{keys:?}");
                assert_eq!(keys.contains(&"category"), category != Category::All);
                assert_eq!(&keys[..2], &["keyword", "radius"]);
            }
        }
    }

    #[test]
    fn test_category_parsing() {
        assert_eq!("default".parse::<Category>(), Ok(Category::All));
        assert_eq!("Music".parse::<Category>(), Ok(Category::Music));
        assert_eq!("Arts & Theatre".parse::<Category>(), Ok(Category::Arts));
        assert_eq!("miscellaneous".parse::<Category>(), Ok(Category::Misc));
        assert!("opera".parse::<Category>().is_err());
    }

    #[test]
    fn test_validated_query_round_trips_through_json() {
        let q = RawQuery::new("jazz")
            .near(Coordinates::new(30.27, -97.74))
            .validate()
            .unwrap();
        let json = serde_json::to_string(&q).unwrap();
        assert!(json.contains(r#""mode":"coordinates""#));
        let back: ValidatedQuery = serde_json::from_str(&json).unwrap();
        assert_eq!(back, q);
    }
}
