//! Data models for scraped fixtures and the published feed.
//!
//! This module defines the core data structures used throughout the
//! pipeline:
//! - [`Fixture`]: one scheduled match as parsed from a fixture page
//! - [`Venue`]: home-ground coordinates attached at join time
//! - [`EnrichedFixture`]: a fixture with its venue, the terminal feed form
//! - [`MatchFeed`]: the `matches.json` document consumed by the map
//! - [`ClubLocation`]: one entry of the curated club-location table
//!
//! Field names follow the JSON the front end already reads (`lat`/`lon`,
//! `source_url`, ...), so renames here are breaking changes for the map.

use serde::{Deserialize, Serialize};

use crate::normalize::club_key;

/// Provenance tag stamped on every fixture scraped from the federation's
/// competition pages.
pub const FIXTURE_SOURCE: &str = "FFF/EPREUVES";

/// One scheduled match as scraped, before venue enrichment.
///
/// `kickoff` is kept in its serialized form (`2026-02-07T18:00:00+01:00`)
/// rather than as a datetime: the fixed-offset ISO string sorts
/// chronologically as a plain string and is written to the feed verbatim.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Fixture {
    /// Competition code, e.g. `R1` or `CDF`.
    pub competition: String,
    /// Display label for the competition. Currently the code itself.
    pub competition_label: String,
    /// Kickoff timestamp, ISO-8601 with the feed's fixed +01:00 offset.
    pub kickoff: String,
    /// Home club name as printed on the page.
    pub home: String,
    /// Away club name as printed on the page.
    pub away: String,
    /// Provenance tag, see [`FIXTURE_SOURCE`].
    pub source: String,
    /// The page this fixture was parsed from.
    pub source_url: String,
}

impl Fixture {
    /// Identity under which repeated scrapes of the same listing collapse:
    /// competition, kickoff, and both club names under their join key.
    pub fn dedup_key(&self) -> (String, String, String, String) {
        (
            self.competition.clone(),
            self.kickoff.clone(),
            club_key(&self.home),
            club_key(&self.away),
        )
    }
}

/// Where a match is played. Only the home ground is ever resolved; the map
/// has no use for away-side coordinates.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Venue {
    /// Ground name. The club table does not carry one yet, so this is
    /// empty; the slot exists because the front end reads it.
    pub name: String,
    /// Municipality of the home ground.
    pub city: String,
    /// Postcode when the club table has one, otherwise empty.
    #[serde(default)]
    pub postcode: String,
    pub lat: f64,
    pub lon: f64,
}

/// A fixture with its home venue attached. Terminal form, written to
/// `matches.json`.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct EnrichedFixture {
    /// Synthetic stable id: competition, kickoff and both club keys.
    pub id: String,
    pub competition: String,
    pub competition_label: String,
    pub kickoff: String,
    pub home: String,
    pub away: String,
    pub source: String,
    pub source_url: String,
    pub venue: Venue,
}

impl EnrichedFixture {
    /// Attach a venue to a parsed fixture and derive its id.
    pub fn new(fixture: Fixture, venue: Venue) -> Self {
        let id = format!(
            "{}_{}_{}_{}",
            fixture.competition,
            fixture.kickoff,
            club_key(&fixture.home),
            club_key(&fixture.away),
        );
        Self {
            id,
            competition: fixture.competition,
            competition_label: fixture.competition_label,
            kickoff: fixture.kickoff,
            home: fixture.home,
            away: fixture.away,
            source: fixture.source,
            source_url: fixture.source_url,
            venue,
        }
    }
}

/// The `matches.json` document: a season label plus every enriched
/// fixture, sorted by kickoff.
#[derive(Debug, Deserialize, Serialize)]
pub struct MatchFeed {
    pub season: String,
    pub matches: Vec<EnrichedFixture>,
}

/// One entry of the club-location table (`club_locations.json`), keyed in
/// the file by the club's display name.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ClubLocation {
    pub city: String,
    /// Optional; absent from geocoded entries.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub postcode: String,
    pub lat: f64,
    pub lon: f64,
}
