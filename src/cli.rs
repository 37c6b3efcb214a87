//! Command-line interface definitions.
//!
//! Two subcommands mirror the two rerunnable passes of the pipeline:
//! `update` scrapes and rebuilds the feed, `geocode` works through the
//! missing-clubs list. Each pass is safe to rerun from scratch at any
//! time, which is also the recovery story for a failed run.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::geocode::MAX_ADDITIONS_PER_RUN;

/// Command-line arguments.
///
/// # Examples
///
/// ```sh
/// # Rebuild the feed from the configured sources
/// matchs_hdf update
///
/// # Same, against a different checkout layout
/// matchs_hdf -d site/data update -s config/sources.json
///
/// # Resolve up to 25 missing clubs
/// matchs_hdf geocode --max-additions 25
/// ```
#[derive(Parser, Debug)]
#[command(version, about)]
pub struct Cli {
    /// Directory holding the JSON artifacts (club table, missing list, feed)
    #[arg(short, long, default_value = "data", env = "MATCHS_DATA_DIR")]
    pub data_dir: PathBuf,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Scrape fixture pages, join venues and rewrite the feed
    Update {
        /// Sources table: competition code → fixture-page URLs
        #[arg(short, long, default_value = "sources.json", env = "MATCHS_SOURCES")]
        sources: PathBuf,

        /// Season label written into matches.json
        #[arg(long, default_value = "auto")]
        season: String,
    },

    /// Geocode clubs from the missing list into the club table
    Geocode {
        /// Ceiling on club-table additions for this run
        #[arg(long, default_value_t = MAX_ADDITIONS_PER_RUN)]
        max_additions: usize,
    },
}
