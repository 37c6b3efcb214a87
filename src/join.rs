//! Venue enrichment: match parsed fixtures against the club table.
//!
//! A fixture makes it into the feed only when its home club resolves to
//! coordinates: the map cannot place anything else, and a null venue
//! breaks the front end. Unresolved home names are collected instead and
//! persisted as the geocoding backfill's work list. Away clubs are never
//! looked up; the feed maps where matches are played, not who travels.

use itertools::Itertools;
use std::collections::{BTreeMap, HashMap};
use tracing::{debug, info};

use crate::models::{ClubLocation, EnrichedFixture, Fixture, Venue};
use crate::normalize::club_key;

/// What the join produces: the feed entries plus the names it could not
/// resolve.
#[derive(Debug)]
pub struct JoinOutcome {
    /// Fixtures with a venue, sorted by kickoff ascending (ties keep
    /// input order).
    pub enriched: Vec<EnrichedFixture>,
    /// Raw home names with no club-table entry, each exactly once,
    /// sorted.
    pub missing: Vec<String>,
}

/// Join fixtures against the club-location table.
///
/// The table is indexed under [`club_key`], the same function every other
/// lookup uses; the raw spelling from the page never has to match the
/// table's spelling exactly.
pub fn join_fixtures(
    fixtures: Vec<Fixture>,
    clubs: &BTreeMap<String, ClubLocation>,
) -> JoinOutcome {
    let index: HashMap<String, &ClubLocation> = clubs
        .iter()
        .map(|(name, location)| (club_key(name), location))
        .collect();

    let mut enriched = Vec::new();
    let mut missing = Vec::new();

    for fixture in fixtures {
        match index.get(&club_key(&fixture.home)) {
            Some(location) => {
                let venue = Venue {
                    name: String::new(),
                    city: location.city.clone(),
                    postcode: location.postcode.clone(),
                    lat: location.lat,
                    lon: location.lon,
                };
                enriched.push(EnrichedFixture::new(fixture, venue));
            }
            None => {
                debug!(home = %fixture.home, "no club-table entry, fixture dropped");
                missing.push(fixture.home);
            }
        }
    }

    enriched.sort_by(|a, b| a.kickoff.cmp(&b.kickoff));
    let missing: Vec<String> = missing.into_iter().unique().sorted().collect();

    info!(
        enriched = enriched.len(),
        missing = missing.len(),
        "joined fixtures against club table"
    );
    JoinOutcome { enriched, missing }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::FIXTURE_SOURCE;

    fn fixture(kickoff: &str, home: &str, away: &str) -> Fixture {
        Fixture {
            competition: "R1".to_string(),
            competition_label: "R1".to_string(),
            kickoff: kickoff.to_string(),
            home: home.to_string(),
            away: away.to_string(),
            source: FIXTURE_SOURCE.to_string(),
            source_url: "u".to_string(),
        }
    }

    fn clubs() -> BTreeMap<String, ClubLocation> {
        BTreeMap::from([(
            "AS Cambrai".to_string(),
            ClubLocation {
                city: "Cambrai".to_string(),
                postcode: "59400".to_string(),
                lat: 50.17,
                lon: 3.23,
            },
        )])
    }

    #[test]
    fn test_enriches_through_the_join_key() {
        let outcome = join_fixtures(
            vec![fixture("2026-02-07T18:00:00+01:00", "A.S. CAMBRAI", "US Arras")],
            &clubs(),
        );

        assert_eq!(outcome.enriched.len(), 1);
        assert!(outcome.missing.is_empty());
        let venue = &outcome.enriched[0].venue;
        assert_eq!(venue.city, "Cambrai");
        assert_eq!(venue.postcode, "59400");
        assert_eq!(venue.lat, 50.17);
    }

    #[test]
    fn test_unmatched_fixture_is_dropped_and_recorded_once() {
        let outcome = join_fixtures(
            vec![
                fixture("2026-02-07T18:00:00+01:00", "FC Inconnu", "AS Cambrai"),
                fixture("2026-02-14T18:00:00+01:00", "FC Inconnu", "US Arras"),
            ],
            &clubs(),
        );

        assert!(outcome.enriched.is_empty());
        assert_eq!(outcome.missing, vec!["FC Inconnu".to_string()]);
    }

    #[test]
    fn test_away_club_is_never_required() {
        let outcome = join_fixtures(
            vec![fixture("2026-02-07T18:00:00+01:00", "AS Cambrai", "FC Inconnu")],
            &clubs(),
        );

        assert_eq!(outcome.enriched.len(), 1);
        assert!(outcome.missing.is_empty());
    }

    #[test]
    fn test_sorted_by_kickoff_ties_stable() {
        let mut table = clubs();
        table.insert(
            "US Arras".to_string(),
            ClubLocation {
                city: "Arras".to_string(),
                postcode: String::new(),
                lat: 50.29,
                lon: 2.78,
            },
        );

        let outcome = join_fixtures(
            vec![
                fixture("2026-02-14T18:00:00+01:00", "AS Cambrai", "X1"),
                fixture("2026-02-07T18:00:00+01:00", "US Arras", "X2"),
                fixture("2026-02-07T18:00:00+01:00", "AS Cambrai", "X3"),
            ],
            &table,
        );

        let order: Vec<&str> = outcome.enriched.iter().map(|m| m.away.as_str()).collect();
        assert_eq!(order, vec!["X2", "X3", "X1"]);
    }

    #[test]
    fn test_missing_list_is_sorted() {
        let outcome = join_fixtures(
            vec![
                fixture("2026-02-07T18:00:00+01:00", "Zèbres FC", "a"),
                fixture("2026-02-07T19:00:00+01:00", "Aigles SC", "b"),
            ],
            &clubs(),
        );

        assert_eq!(
            outcome.missing,
            vec!["Aigles SC".to_string(), "Zèbres FC".to_string()]
        );
    }
}
