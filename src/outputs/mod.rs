//! Feed artifacts for the map front end.
//!
//! The update pass ends by writing two files the static site reads
//! directly:
//!
//! ```text
//! data/
//! ├── matches.json      # {season, matches: [...]}, sorted by kickoff
//! └── last_update.json  # {"last_update": "YYYY-MM-DD HH:MM"}
//! ```
//!
//! `matches.json` is deterministic for unchanged input (same fixtures
//! and club table produce a byte-identical file), so the front end's
//! cache key is `last_update.json` alone.

pub mod json;
