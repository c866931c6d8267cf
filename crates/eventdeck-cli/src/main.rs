mod render;

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use eventdeck_core::config::Config;
use eventdeck_core::{
    Category, Coordinates, EventGateway, FavoritesCache, JsonFileStore, Location, PersistentStore,
    RawQuery, ReqwestTransport, SearchCoordinator, SearchHistory, SearchOutcome, SuggestionDebouncer,
};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "eventdeck")]
#[command(about = "Search live events, keep favorites, browse recent searches", long_about = None)]
struct Cli {
    /// Config file to use instead of the default location.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Print machine-readable JSON instead of tables.
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Search events by keyword around a position or a place
    Search {
        keyword: String,

        /// Radius in miles (defaults to the configured radius)
        #[arg(long, short)]
        radius: Option<u32>,

        /// all, music, sports, arts, film or misc
        #[arg(long, short, default_value = "all")]
        category: Category,

        #[arg(long, requires = "lng", allow_hyphen_values = true)]
        lat: Option<f64>,

        #[arg(long, requires = "lat", allow_hyphen_values = true)]
        lng: Option<f64>,

        /// Free-text place name, used when no position is given
        #[arg(long, short)]
        place: Option<String>,
    },
    /// Show one event with artist and venue extras
    Details { id: String },
    /// Keyword suggestions for partially typed text
    Suggest { text: String },
    /// Manage saved events
    Favorites {
        #[command(subcommand)]
        action: FavoritesAction,
    },
    /// Recent search keywords
    History {
        #[arg(long)]
        clear: bool,
    },
    /// Re-run the most recent search
    Last,
}

#[derive(Subcommand)]
enum FavoritesAction {
    List,
    Add { id: String },
    Remove { id: String },
    Toggle { id: String },
    Clear,
}

/// Everything the subcommands need, wired once.
struct Session {
    json: bool,
    gateway: Arc<EventGateway>,
    favorites: Arc<FavoritesCache>,
    coordinator: Arc<SearchCoordinator>,
    debouncer: Arc<SuggestionDebouncer>,
}

impl Session {
    async fn open(config: &Config, json: bool) -> anyhow::Result<Self> {
        let store: Arc<dyn PersistentStore> = Arc::new(JsonFileStore::new(&config.paths.data_dir));
        let transport = ReqwestTransport::new(&config.api).context("failed to build HTTP client")?;
        let gateway = Arc::new(EventGateway::new(Arc::new(transport)));
        let favorites = Arc::new(FavoritesCache::load(store.clone()).await);
        let history = Arc::new(SearchHistory::load(store.clone(), config.search.history_limit).await);
        let coordinator = Arc::new(
            SearchCoordinator::new(gateway.clone(), favorites.clone(), history, store)
                .with_default_radius(config.search.default_radius),
        );
        let debouncer = Arc::new(SuggestionDebouncer::with_config(
            gateway.clone(),
            &config.suggestions,
        ));
        Ok(Self {
            json,
            gateway,
            favorites,
            coordinator,
            debouncer,
        })
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load().unwrap_or_default(),
    };

    std::fs::create_dir_all(&config.paths.data_dir)
        .with_context(|| format!("failed to create {}", config.paths.data_dir.display()))?;
    init_logging(&config)?;
    tracing::info!("eventdeck starting…");

    let session = Session::open(&config, cli.json).await?;
    match cli.command {
        Commands::Search {
            keyword,
            radius,
            category,
            lat,
            lng,
            place,
        } => {
            let mut raw = RawQuery::new(keyword).category(category);
            raw.radius = radius;
            if let (Some(lat), Some(lng)) = (lat, lng) {
                raw = raw.near(Coordinates::new(lat, lng));
            }
            if let Some(place) = place {
                raw = raw.at_place(place);
            }
            run_search(&session, raw).await
        }
        Commands::Details { id } => details(&session, &id).await,
        Commands::Suggest { text } => suggest(&session, &text).await,
        Commands::Favorites { action } => favorites(&session, action).await,
        Commands::History { clear } => history(&session, clear).await,
        Commands::Last => match session.coordinator.restore_last_search().await {
            Some(query) => {
                let mut raw = RawQuery::new(query.keyword())
                    .radius(query.radius())
                    .category(query.category());
                raw = match query.location() {
                    Location::Coordinates(c) => raw.near(*c),
                    Location::Place { name } => raw.at_place(name.clone()),
                };
                run_search(&session, raw).await
            }
            None => bail!("no previous search"),
        },
    }
}

fn init_logging(config: &Config) -> anyhow::Result<()> {
    let log_path = config.paths.data_dir.join("eventdeck.log");
    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .with_context(|| format!("failed to open {}", log_path.display()))?;

    // HTTP client internals are noisy at debug.
    let log_filter = std::env::var("RUST_LOG")
        .unwrap_or_else(|_| "info,hyper_util=warn,reqwest=warn,hyper=warn".to_string());
    tracing_subscriber::fmt()
        .with_writer(log_file)
        .with_env_filter(log_filter.as_str())
        .with_ansi(false)
        .init();
    Ok(())
}

async fn run_search(session: &Session, raw: RawQuery) -> anyhow::Result<()> {
    match session.coordinator.search(raw).await {
        SearchOutcome::Published(results) => {
            if session.json {
                let rows: Vec<_> = results
                    .iter()
                    .map(|r| serde_json::json!({ "event": r.event, "favorite": r.is_favorite() }))
                    .collect();
                return render::json(&rows);
            }
            let snapshot = session.coordinator.snapshot();
            render::results(snapshot.query.as_ref(), &results);
            Ok(())
        }
        SearchOutcome::Failed(e) => Err(render::fetch_error(&e)),
        SearchOutcome::Superseded => bail!("search was superseded"),
    }
}

async fn details(session: &Session, id: &str) -> anyhow::Result<()> {
    let details = session
        .gateway
        .event_details(id)
        .await
        .map_err(|e| render::fetch_error(&e))?;
    let favorite = session.favorites.is_favorite(&details.event.id).await;
    let enrichment = session.coordinator.enrich(&details).await;
    if session.json {
        return render::json(&serde_json::json!({
            "details": details,
            "favorite": favorite,
            "artists": enrichment.artists.iter().map(|p| serde_json::json!({
                "artist": p.artist,
                "albums": p.albums,
            })).collect::<Vec<_>>(),
            "venue": enrichment.venue,
        }));
    }
    render::details(&details, favorite, &enrichment);
    Ok(())
}

/// Feed `text` through the debouncer one keystroke at a time, as a text field would.
async fn suggest(session: &Session, text: &str) -> anyhow::Result<()> {
    let mut typed = String::new();
    let mut last = None;
    for c in text.chars() {
        typed.push(c);
        last = session.debouncer.on_input(&typed);
    }
    if let Some(handle) = last {
        handle.await.context("suggestion task failed")?;
    }
    let state = session.debouncer.state();
    if session.json {
        return render::json(&state.suggestions);
    }
    if state.suggestions.is_empty() {
        println!("no suggestions for {:?}", state.input);
    }
    for s in &state.suggestions {
        println!("{s}");
    }
    Ok(())
}

async fn favorites(session: &Session, action: FavoritesAction) -> anyhow::Result<()> {
    let cache = &session.favorites;
    match action {
        FavoritesAction::List => {
            let mut events = cache.all().await;
            events.sort_by(|a, b| (a.date, a.time, &a.name).cmp(&(b.date, b.time, &b.name)));
            if session.json {
                return render::json(&events);
            }
            render::favorites(&events);
        }
        FavoritesAction::Add { id } => {
            let details = session
                .gateway
                .event_details(&id)
                .await
                .map_err(|e| render::fetch_error(&e))?;
            let name = details.event.name.clone();
            cache.add(details.event).await?;
            println!("★ saved {name}");
        }
        FavoritesAction::Remove { id } => {
            if !cache.remove(&id).await? {
                bail!("{id} is not a favorite");
            }
            println!("removed {id}");
        }
        FavoritesAction::Toggle { id } => {
            let event = match cache.get(&id).await {
                Some(event) => event,
                None => {
                    session
                        .gateway
                        .event_details(&id)
                        .await
                        .map_err(|e| render::fetch_error(&e))?
                        .event
                }
            };
            let name = event.name.clone();
            if cache.toggle(event).await? {
                println!("★ saved {name}");
            } else {
                println!("removed {name}");
            }
        }
        FavoritesAction::Clear => {
            let count = cache.len().await;
            cache.clear().await?;
            println!("cleared {count} favorites");
        }
    }
    Ok(())
}

async fn history(session: &Session, clear: bool) -> anyhow::Result<()> {
    let history = session.coordinator.history();
    if clear {
        history.clear().await?;
        println!("history cleared");
        return Ok(());
    }
    let entries = history.entries().await;
    if session.json {
        return render::json(&entries);
    }
    if entries.is_empty() {
        println!("no recent searches");
    }
    for (i, keyword) in entries.iter().enumerate() {
        println!("{:>2}. {keyword}", i + 1);
    }
    Ok(())
}
