use futures_util::future::join_all;
use tracing::{debug, warn};

use crate::gateway::EventGateway;
use crate::model::{Album, Artist, EventDetails, VenueDetails};

/// An attraction resolved to an artist profile.
#[derive(Debug, Clone, PartialEq)]
pub struct ArtistProfile {
    pub artist: Artist,
    /// Empty when the album lookup failed.
    pub albums: Vec<Album>,
}

/// Extras shown next to event details. Any part may be missing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Enrichment {
    pub artists: Vec<ArtistProfile>,
    pub venue: Option<VenueDetails>,
}

impl Enrichment {
    pub fn is_empty(&self) -> bool {
        self.artists.is_empty() && self.venue.is_none()
    }
}

/// Resolve artists for every attraction and the venue, concurrently.
/// Failures are logged and dropped; this never fails.
pub async fn enrich(gateway: &EventGateway, details: &EventDetails) -> Enrichment {
    let artist_lookups = details
        .attractions
        .iter()
        .map(|name| artist_profile(gateway, name));
    let venue_lookup = async {
        let Some(name) = details.event.venue_name() else {
            return None;
        };
        match gateway.venue_details(name).await {
            Ok(venue) => Some(venue),
            Err(e) => {
                warn!("[enrich] venue {:?}: {}", name, e);
                None
            }
        }
    };

    let (artists, venue) = tokio::join!(join_all(artist_lookups), venue_lookup);
    Enrichment {
        artists: artists.into_iter().flatten().collect(),
        venue,
    }
}

async fn artist_profile(gateway: &EventGateway, attraction: &str) -> Option<ArtistProfile> {
    let candidates = match gateway.search_artist(attraction).await {
        Ok(found) => found,
        Err(e) => {
            warn!("[enrich] artist {:?}: {}", attraction, e);
            return None;
        }
    };
    let artist = pick_artist(candidates, attraction)?;

    let albums = match gateway.artist_albums(&artist.id).await {
        Ok(albums) => albums,
        Err(e) => {
            warn!("[enrich] albums for {:?}: {}", artist.name, e);
            Vec::new()
        }
    };
    debug!("[enrich] {:?} -> {} ({} albums)", attraction, artist.id, albums.len());
    Some(ArtistProfile { artist, albums })
}

/// Exact (case-insensitive) name match first, otherwise the top hit.
fn pick_artist(candidates: Vec<Artist>, attraction: &str) -> Option<Artist> {
    let wanted = attraction.trim();
    let exact = candidates
        .iter()
        .position(|a| a.name.trim().eq_ignore_ascii_case(wanted));
    let index = exact.unwrap_or(0);
    candidates.into_iter().nth(index)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn artist(id: &str, name: &str) -> Artist {
        Artist {
            id: id.into(),
            name: name.into(),
            followers: 0,
            popularity: 0,
            image_url: None,
            profile_url: None,
            genres: Vec::new(),
        }
    }

    #[test]
    fn test_pick_artist_prefers_exact_name() {
        let found = vec![artist("1", "Taylor Swift Tribute"), artist("2", "taylor swift")];
        assert_eq!(pick_artist(found, "Taylor Swift").map(|a| a.id), Some("2".into()));
    }

    #[test]
    fn test_pick_artist_falls_back_to_top_hit() {
        let found = vec![artist("1", "The Weeknd"), artist("2", "Weekend")];
        assert_eq!(pick_artist(found, "Weeknd").map(|a| a.id), Some("1".into()));
        assert_eq!(pick_artist(Vec::new(), "Weeknd"), None);
    }
}
