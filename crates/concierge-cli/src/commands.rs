//! Command handlers.

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::info;

use concierge_embeddings::{
    CandleEncoderProvider, LoadOptions, ModelFileCache, Precision, TracingStatusSink,
};
use concierge_engine::{build_corpus, CatalogSource, ConciergeEngine, JsonCatalogSource};
use concierge_scheduler::PlannerFilters;
use concierge_storage::{Preferences, RocksStore};
use concierge_types::{minutes_from_24h, Settings};

/// Load settings and apply CLI overrides.
pub fn load_settings(config_path: Option<&str>, log_level: Option<&str>) -> Result<Settings> {
    let mut settings = Settings::load(config_path).context("Failed to load configuration")?;
    if let Some(level) = log_level {
        settings.log_level = level.to_string();
    }
    settings.validate().context("Invalid configuration")?;
    Ok(settings)
}

/// Initialize logging from settings and RUST_LOG.
pub fn init_logging(settings: &Settings) -> Result<()> {
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&settings.log_level)),
        )
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set tracing subscriber")?;
    Ok(())
}

fn open_store(settings: &Settings) -> Result<Arc<RocksStore>> {
    let path = settings.expanded_db_path();
    let store = RocksStore::open(&path)
        .with_context(|| format!("Failed to open store at {:?}", path))?;
    Ok(Arc::new(store))
}

fn build_engine(settings: &Settings) -> Result<ConciergeEngine> {
    let store = open_store(settings)?;

    let mut file_cache = ModelFileCache::default();
    file_cache.repo_id = settings.encoder.model_id.clone();

    let options = LoadOptions {
        prefer_accelerated: settings.encoder.prefer_accelerated,
        precision: if settings.encoder.reduced_precision {
            Precision::Reduced
        } else {
            Precision::Full
        },
    };

    Ok(ConciergeEngine::new(
        settings.clone(),
        store,
        Arc::new(CandleEncoderProvider::new(file_cache, options)),
        Arc::new(TracingStatusSink),
    ))
}

/// Build and print a personal agenda.
#[allow(clippy::too_many_arguments)]
pub async fn handle_plan(
    settings: &Settings,
    event: &str,
    interest: &str,
    day: Option<String>,
    earliest: Option<String>,
    max: usize,
    boost: Option<String>,
) -> Result<()> {
    let engine = build_engine(settings)?;
    let source = JsonCatalogSource::new(&settings.data_dir);
    let payload = source.load(event).await?;

    let filters = PlannerFilters {
        day,
        earliest_start: earliest.as_deref().and_then(minutes_from_24h),
        max_sessions: max,
        boost_category: boost,
    };

    info!(event, sessions = payload.sessions.len(), "Building agenda");
    let itinerary = engine
        .build_itinerary(event, &payload.version, &payload.sessions, interest, &filters)
        .await?;

    if itinerary.is_empty() {
        println!("No matching non-overlapping sessions found for your constraints.");
        return Ok(());
    }

    println!("Your agenda ({} sessions):", itinerary.len());
    for entry in &itinerary {
        println!(
            "  {:<8} {:<22} {:<12} {}  (match {:.3})",
            entry.session.day,
            entry.session.time,
            if entry.session.room.is_empty() {
                "TBA"
            } else {
                entry.session.room.as_str()
            },
            entry.session.title,
            entry.similarity
        );
    }
    Ok(())
}

/// Rank the event corpus against a question and print the matches.
pub async fn handle_ask(
    settings: &Settings,
    event: &str,
    question: &str,
    top: usize,
) -> Result<()> {
    let engine = build_engine(settings)?;
    let source = JsonCatalogSource::new(&settings.data_dir);
    let payload = source.load(event).await?;
    let corpus = build_corpus(&payload, event);

    info!(event, items = corpus.len(), "Running retrieval");
    let matches = engine
        .retrieve_top_matches(event, &payload.version, &corpus, question, top)
        .await?;

    if matches.is_empty() {
        println!("No matches found.");
        return Ok(());
    }

    for (index, item) in matches.iter().enumerate() {
        println!(
            "{}. [{}] {} (score {:.3})",
            index + 1,
            item.snippet.kind,
            item.snippet.title,
            item.score
        );
        println!("   {}", item.snippet.text);
    }
    Ok(())
}

/// Toggle the assistant opt-in flag.
pub fn handle_toggle(settings: &Settings, enabled: bool) -> Result<()> {
    let store = open_store(settings)?;
    let preferences = Preferences::new(store);
    preferences.set_assistant_enabled(enabled)?;

    if enabled {
        println!("Assistant enabled. Model downloads happen only when needed.");
    } else {
        println!("Assistant disabled.");
    }
    Ok(())
}

/// Drop cached embeddings for an event.
pub async fn handle_clear_cache(settings: &Settings, event: &str) -> Result<()> {
    let engine = build_engine(settings)?;
    engine.clear_cache(event)?;
    println!("Cleared embedding caches for {event}.");
    Ok(())
}
