//! Writing `matches.json` and `last_update.json`.
//!
//! Both files land in the data directory the front end is served from.
//! The feed is pretty-printed with a fixed ordering (matches pre-sorted
//! by the joiner, struct fields in declaration order), so rerunning the
//! pipeline on unchanged input rewrites `matches.json` byte-identically
//! and only `last_update.json` moves.

use chrono::Local;
use serde::Serialize;
use std::error::Error;
use std::path::Path;
use tokio::fs;
use tracing::{info, instrument};

use crate::models::MatchFeed;
use crate::utils::update_stamp;

/// Feed file name under the data directory.
pub const MATCHES_FILE: &str = "matches.json";

/// Update-stamp file name under the data directory.
pub const LAST_UPDATE_FILE: &str = "last_update.json";

#[derive(Debug, Serialize)]
struct LastUpdate {
    last_update: String,
}

/// Write the match feed.
#[instrument(level = "info", skip_all, fields(data_dir = %data_dir.display()))]
pub async fn write_feed(data_dir: &Path, feed: &MatchFeed) -> Result<(), Box<dyn Error>> {
    let json = serde_json::to_string_pretty(feed)?;
    let path = data_dir.join(MATCHES_FILE);

    fs::write(&path, json).await?;
    info!(path = %path.display(), matches = feed.matches.len(), "wrote match feed");
    Ok(())
}

/// Stamp the run. Written last, after every other artifact, since the
/// front end uses it to bust its cache of `matches.json`.
#[instrument(level = "info", skip_all, fields(data_dir = %data_dir.display()))]
pub async fn write_last_update(data_dir: &Path) -> Result<(), Box<dyn Error>> {
    let stamp = LastUpdate {
        last_update: update_stamp(Local::now()),
    };
    let json = serde_json::to_string_pretty(&stamp)?;
    let path = data_dir.join(LAST_UPDATE_FILE);

    fs::write(&path, json).await?;
    info!(path = %path.display(), "wrote update stamp");
    Ok(())
}
