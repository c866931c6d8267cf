//! Terminal output for the subcommands.

use chrono::{Local, NaiveDate};
use eventdeck_core::{
    Enrichment, ErrorKind, Event, EventDetails, FetchError, Location, SearchResult, ValidatedQuery,
};
use serde::Serialize;

const NAME_WIDTH: usize = 40;

pub fn json<T: Serialize + ?Sized>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Turn a surfaced failure into the process error, phrased for the terminal.
pub fn fetch_error(e: &FetchError) -> anyhow::Error {
    let hint = match e.kind() {
        ErrorKind::Validation => "check the search arguments",
        ErrorKind::Transport => "check the connection and try again",
        ErrorKind::Api if e.is_retryable() => "the service is having trouble, try again later",
        ErrorKind::Api => "the service rejected the request",
        ErrorKind::NotFound => "nothing matches that id",
        ErrorKind::StorageCorruption => "local data was unreadable",
    };
    anyhow::anyhow!("{e} ({hint})")
}

pub fn results(query: Option<&ValidatedQuery>, results: &[SearchResult]) {
    if let Some(q) = query {
        let place = match q.location() {
            Location::Coordinates(c) => format!("{:.4},{:.4}", c.lat, c.lng),
            Location::Place { name } => name.clone(),
        };
        println!(
            "{:?} within {} mi of {} [{}]: {} events",
            q.keyword(),
            q.radius(),
            place,
            q.category(),
            results.len()
        );
    }
    let today = Local::now().date_naive();
    for r in results {
        let star = if r.is_favorite() { "★" } else { " " };
        println!(
            "{star} {:<16} {:<width$} {:<18} {}",
            r.event.when_label(),
            truncate(&r.event.name, NAME_WIDTH),
            r.event.venue_name().unwrap_or("-"),
            relative_day(r.event.date, today),
            width = NAME_WIDTH,
        );
        println!("  id {}", r.event.id);
    }
}

pub fn favorites(events: &[Event]) {
    if events.is_empty() {
        println!("no favorites yet");
        return;
    }
    for e in events {
        println!(
            "★ {:<16} {:<width$} {}",
            e.when_label(),
            truncate(&e.name, NAME_WIDTH),
            e.id,
            width = NAME_WIDTH,
        );
    }
}

pub fn details(details: &EventDetails, favorite: bool, enrichment: &Enrichment) {
    let event = &details.event;
    println!("{}{}", event.name, if favorite { "  ★" } else { "" });
    println!("  when      {}", event.when_label());
    if let Some(venue) = event.venue_name() {
        println!("  venue     {venue}");
    }
    let genre = event.classification.label();
    if !genre.is_empty() {
        println!("  genre     {genre}");
    }
    if let Some(price) = &event.price_range {
        println!("  price     {}", price.label());
    }
    if let Some(status) = &details.ticket_status {
        println!("  tickets   {status}");
    }
    if let Some(url) = &event.ticket_url {
        println!("  buy       {url}");
    }
    if let Some(url) = &details.seatmap_url {
        println!("  seatmap   {url}");
    }
    if !details.attractions.is_empty() {
        println!("  lineup    {}", details.attractions.join(", "));
    }

    for profile in &enrichment.artists {
        let a = &profile.artist;
        println!();
        println!("{} ({} followers, popularity {})", a.name, a.followers, a.popularity);
        if !a.genres.is_empty() {
            println!("  {}", a.genres.join(", "));
        }
        for album in profile.albums.iter().take(5) {
            println!("  · {} {}", album.name, album.release_date.as_deref().unwrap_or(""));
        }
    }

    if let Some(v) = &enrichment.venue {
        println!();
        println!("{}", v.name);
        for (label, value) in [
            ("address", &v.address),
            ("city", &v.city),
            ("phone", &v.phone),
            ("hours", &v.open_hours),
            ("rules", &v.general_rule),
            ("children", &v.child_rule),
        ] {
            if let Some(value) = value {
                println!("  {label:<9} {value}");
            }
        }
    }
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out: String = s.chars().take(max.saturating_sub(1)).collect();
    out.push('…');
    out
}

fn relative_day(date: Option<NaiveDate>, today: NaiveDate) -> String {
    let Some(date) = date else {
        return String::new();
    };
    match (date - today).num_days() {
        0 => "today".to_string(),
        1 => "tomorrow".to_string(),
        n if n < 0 => "past".to_string(),
        n => format!("in {n} days"),
    }
}
