//! # Matchs HDF
//!
//! A scraping pipeline that turns the federation's amateur fixture pages
//! into a static, geocoded JSON feed for a map front end.
//!
//! ## Passes
//!
//! - **update**: fetch each configured fixture page, flatten it to text
//!   lines, parse fixtures, deduplicate repeated listings, join home
//!   clubs against the club-location table, and write `matches.json`,
//!   `missing_clubs.json` and `last_update.json`
//! - **geocode**: resolve names from `missing_clubs.json` through
//!   Nominatim (rate-limited, capped per run) and grow
//!   `club_locations.json` for the next update
//!
//! ## Usage
//!
//! ```sh
//! matchs_hdf update
//! matchs_hdf geocode
//! ```
//!
//! Everything runs strictly sequentially, one page fetch or one geocode
//! query in flight at a time, and every pass is idempotent: rerunning
//! the whole pipeline is the recovery strategy for any partial failure.

use clap::Parser;
use std::error::Error;
use std::path::Path;
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod cli;
mod dates;
mod geocode;
mod join;
mod models;
mod normalize;
mod outputs;
mod parser;
mod scrapers;
mod store;
mod utils;

use cli::{Cli, Command};
use geocode::{NominatimClient, REQUEST_GAP, backfill_missing};
use join::join_fixtures;
use models::MatchFeed;
use outputs::json::{write_feed, write_last_update};
use parser::dedupe_fixtures;
use scrapers::fff;
use utils::ensure_writable_dir;

#[tokio::main]
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
    info!("matchs_hdf starting up");

    let args = Cli::parse();

    // Early check: ensure the data directory is writable
    if let Err(e) = ensure_writable_dir(&args.data_dir).await {
        error!(
            path = %args.data_dir.display(),
            error = %e,
            "data directory is not writable (fix perms or choose a different path)"
        );
        return Err(e);
    }

    match args.command {
        Command::Update { sources, season } => run_update(&args.data_dir, &sources, &season).await?,
        Command::Geocode { max_additions } => run_geocode(&args.data_dir, max_additions).await?,
    }

    let elapsed = start_time.elapsed();
    info!(
        ?elapsed,
        secs = elapsed.as_secs(),
        millis = elapsed.subsec_millis(),
        "Execution complete"
    );

    Ok(())
}

/// The update pass: scrape → parse → dedupe → join → write artifacts.
async fn run_update(
    data_dir: &Path,
    sources_path: &Path,
    season: &str,
) -> Result<(), Box<dyn Error>> {
    // Both input tables are hard preconditions; nothing else in the run is.
    let sources = match store::load_sources(sources_path).await {
        Ok(sources) => sources,
        Err(e) => {
            error!(path = %sources_path.display(), error = %e, "cannot read sources table");
            return Err(e);
        }
    };
    let clubs_path = data_dir.join(store::CLUB_TABLE_FILE);
    let clubs = match store::load_clubs(&clubs_path).await {
        Ok(clubs) => clubs,
        Err(e) => {
            error!(path = %clubs_path.display(), error = %e, "cannot read club table");
            return Err(e);
        }
    };
    info!(
        competitions = sources.len(),
        clubs = clubs.len(),
        "loaded input tables"
    );

    let client = fff::http_client()?;
    let raw = fff::scrape_sources(&client, &sources).await;
    let fixtures = dedupe_fixtures(raw);
    info!(count = fixtures.len(), "fixtures after deduplication");

    let outcome = join_fixtures(fixtures, &clubs);
    let feed = MatchFeed {
        season: season.to_string(),
        matches: outcome.enriched,
    };

    write_feed(data_dir, &feed).await?;
    store::save_missing(&data_dir.join(store::MISSING_FILE), &outcome.missing).await?;
    write_last_update(data_dir).await?;

    info!(
        matches = feed.matches.len(),
        missing = outcome.missing.len(),
        "update pass complete"
    );
    Ok(())
}

/// The geocode pass: work through the missing list, grow the club table.
async fn run_geocode(data_dir: &Path, max_additions: usize) -> Result<(), Box<dyn Error>> {
    let clubs_path = data_dir.join(store::CLUB_TABLE_FILE);
    let missing_path = data_dir.join(store::MISSING_FILE);

    let missing = store::load_missing(&missing_path).await?;
    let mut clubs = store::load_clubs_or_empty(&clubs_path).await?;
    info!(
        missing = missing.len(),
        clubs = clubs.len(),
        max_additions,
        "loaded geocoding work list"
    );

    let lookup = NominatimClient::new(fff::http_client()?);
    let report = backfill_missing(&lookup, &mut clubs, &missing, max_additions, REQUEST_GAP).await;

    if report.added > 0 {
        store::save_clubs(&clubs_path, &clubs).await?;
    }
    store::save_missing(&missing_path, &report.still_missing).await?;

    info!(
        added = report.added,
        remaining = report.still_missing.len(),
        "geocode pass complete"
    );
    Ok(())
}
