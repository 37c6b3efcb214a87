//! Small shared helpers: output-directory validation and the feed's
//! update stamp.

use chrono::{DateTime, Local};
use std::error::Error;
use std::fs as stdfs;
use std::path::Path;
use tokio::fs;
use tracing::{info, instrument};

/// Format a timestamp the way `last_update.json` carries it. Local time,
/// minute precision; the front end only uses it as an opaque cache key
/// and a human-readable footer.
pub fn update_stamp(now: DateTime<Local>) -> String {
    now.format("%Y-%m-%d %H:%M").to_string()
}

/// Ensure the data directory exists and is writable.
///
/// Creates the directory if needed, then probes it with a throwaway
/// file. Run this before scraping: finding out at the end of a run that
/// nothing can be written wastes every fetch the run made.
#[instrument(level = "info", skip_all, fields(path = %path.display()))]
pub async fn ensure_writable_dir(path: &Path) -> Result<(), Box<dyn Error>> {
    fs::create_dir_all(path).await?;

    let probe_path = path.join("..__probe_write__");
    match stdfs::File::create(&probe_path) {
        Ok(_) => {
            let _ = stdfs::remove_file(&probe_path);
            info!("Data directory is writable");
            Ok(())
        }
        Err(e) => Err(Box::new(e)),
    }
}
