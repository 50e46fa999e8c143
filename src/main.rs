//! # Daily Digest
//!
//! Polls a fixed registry of personal-interest sources, normalizes what it
//! finds into one item shape, machine-translates foreign-language entries and
//! writes a single static HTML page with client-side source filtering.
//!
//! ## Features
//!
//! - RSS/Atom feeds, a video platform keyword search and per-site page scraping
//! - Recency labels, thumbnails and per-source freshness ceilings
//! - English to Japanese translation of titles and summaries
//! - A seasonal card from the traditional 72-microseason calendar
//!
//! ## Usage
//!
//! ```sh
//! daily_digest -o ./public/index.html
//! ```
//!
//! ## Architecture
//!
//! The run is strictly sequential:
//! 1. **Fetching**: poll each registry row with its fetcher, pausing between sources
//! 2. **Translation**: translate foreign items, pausing between backend calls
//! 3. **Rendering**: sort, annotate with the current season and write the page
//!
//! A failing source contributes zero items; the page is always written.

use chrono::Utc;
use clap::Parser;
use std::error::Error;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, error, info, instrument, warn};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod cli;
mod models;
mod outputs;
mod scrapers;
mod season;
mod sources;
mod translate;
mod utils;

use cli::Cli;
use models::Item;
use outputs::html;
use sources::{SOURCES, Source};
use translate::{CALL_PAUSE, GoogleTranslate, Translator};

/// Pause between consecutive sources.
const SOURCE_PAUSE: Duration = Duration::from_millis(500);

#[tokio::main]
#[instrument]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();
    let started_at = Utc::now().with_timezone(&season::jst());
    info!(%started_at, "daily_digest starting up");

    let args = Cli::parse();
    debug!(?args, "Parsed CLI arguments");

    let client = scrapers::http_client()?;

    // ---- Fetch ----
    let selected = select_sources(&args.sources);
    let mut items: Vec<Item> = Vec::new();
    for (i, source) in selected.iter().enumerate() {
        if i > 0 {
            sleep(SOURCE_PAUSE).await;
        }
        info!(source = source.key, name = source.name, "Fetching source");
        match scrapers::fetch_source(&client, source).await {
            Ok(fetched) => {
                info!(source = source.key, count = fetched.len(), "Source fetched");
                items.extend(fetched);
            }
            Err(e) => {
                error!(source = source.key, kind = e.kind(), error = %e, "Source failed; skipping");
            }
        }
    }
    info!(count = items.len(), sources = selected.len(), "Fetching complete");

    // ---- Translate ----
    let items = if args.no_translate {
        info!("Translation disabled");
        items
    } else {
        let backend = GoogleTranslate::new(client.clone(), "en", "ja");
        Translator::new(backend, CALL_PAUSE).translate_items(items).await
    };

    // ---- Render ----
    let now = Utc::now();
    let entry = season::current(now);
    info!(sekki = entry.sekki, kou = entry.name, "Seasonal entry");
    let page = html::render_page(items, entry, now, &args.reader_name);
    if let Err(e) = html::write_page(&args.output, &page).await {
        error!(path = %args.output.display(), error = %e, "Failed writing page");
        return Err(e);
    }
    info!(path = %args.output.display(), "Wrote digest page");

    let elapsed = start_time.elapsed();
    info!(
        ?elapsed,
        secs = elapsed.as_secs(),
        millis = elapsed.subsec_millis(),
        "Execution complete"
    );
    Ok(())
}

/// Registry rows to poll: all of them, or those named on the command line.
fn select_sources(keys: &[String]) -> Vec<&'static Source> {
    if keys.is_empty() {
        return SOURCES.iter().collect();
    }
    for key in keys {
        if sources::lookup(key).is_none() {
            warn!(key = %key, "Unknown source key; ignoring");
        }
    }
    SOURCES
        .iter()
        .filter(|source| keys.iter().any(|key| key == source.key))
        .collect()
}
