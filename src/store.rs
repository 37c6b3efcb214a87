//! Reading and writing the pipeline's persisted tables.
//!
//! Three JSON files survive between runs and are the only shared state:
//!
//! - `sources.json`: competition code → list of fixture-page URLs
//! - `club_locations.json`: club display name → [`ClubLocation`]
//! - `missing_clubs.json`: raw club names awaiting geocoding
//!
//! Sources and the club table are required inputs for an update run;
//! failing to read them is the one fatal error in the pipeline. The
//! missing list is a durable work queue, so an absent file just means an
//! empty queue.
//!
//! Tables are written through a temp file renamed into place, so a run
//! killed mid-write leaves the previous version intact and the next rerun
//! picks up from there.

use serde::Serialize;
use serde::de::DeserializeOwned;
use std::collections::BTreeMap;
use std::error::Error;
use std::path::Path;
use tokio::fs;
use tracing::info;

use crate::models::ClubLocation;

/// Club-location table file name under the data directory.
pub const CLUB_TABLE_FILE: &str = "club_locations.json";

/// Missing-clubs work-list file name under the data directory.
pub const MISSING_FILE: &str = "missing_clubs.json";

/// Competition code → fixture-page URLs to scrape.
pub type SourcesTable = BTreeMap<String, Vec<String>>;

/// Club display name → location. A `BTreeMap` keeps serialization order
/// deterministic, which keeps reruns byte-identical.
pub type ClubTable = BTreeMap<String, ClubLocation>;

/// Load the sources table. Required input: any failure is fatal to the
/// run.
pub async fn load_sources(path: &Path) -> Result<SourcesTable, Box<dyn Error>> {
    read_json(path).await
}

/// Load the club-location table. Required input for the update pass.
pub async fn load_clubs(path: &Path) -> Result<ClubTable, Box<dyn Error>> {
    read_json(path).await
}

/// Load the club-location table, treating an absent file as empty. The
/// geocoding pass creates the table on first run.
pub async fn load_clubs_or_empty(path: &Path) -> Result<ClubTable, Box<dyn Error>> {
    if !fs::try_exists(path).await? {
        return Ok(ClubTable::new());
    }
    read_json(path).await
}

/// Load the missing-clubs work list; an absent file is an empty list.
pub async fn load_missing(path: &Path) -> Result<Vec<String>, Box<dyn Error>> {
    if !fs::try_exists(path).await? {
        return Ok(Vec::new());
    }
    read_json(path).await
}

/// Persist the club-location table.
pub async fn save_clubs(path: &Path, clubs: &ClubTable) -> Result<(), Box<dyn Error>> {
    write_json(path, clubs).await?;
    info!(path = %path.display(), entries = clubs.len(), "wrote club table");
    Ok(())
}

/// Persist the missing-clubs work list.
pub async fn save_missing(path: &Path, missing: &[String]) -> Result<(), Box<dyn Error>> {
    write_json(path, &missing).await?;
    info!(path = %path.display(), entries = missing.len(), "wrote missing-clubs list");
    Ok(())
}

async fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, Box<dyn Error>> {
    let raw = fs::read_to_string(path).await?;
    Ok(serde_json::from_str(&raw)?)
}

/// Pretty-printed write through a temp file renamed over the target.
async fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), Box<dyn Error>> {
    let json = serde_json::to_string_pretty(value)?;
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, json).await?;
    fs::rename(&tmp, path).await?;
    Ok(())
}
