//! Nominatim lookup and the missing-clubs backfill pass.
//!
//! Clubs the joiner could not place are resolved here, one free-text
//! query each, scoped to the target region. The module follows a
//! trait-based design:
//! - [`GeocodeLookup`]: the lookup seam, one query in → at most one place
//!   out
//! - [`NominatimClient`]: the real implementation against the public
//!   Nominatim search endpoint
//! - [`backfill_missing`]: the driver that works through the persisted
//!   missing list and grows the club table
//!
//! # Rate policy
//!
//! The public geocoder allows one request per second per client. The
//! backfill therefore keeps exactly one request in flight and waits
//! [`REQUEST_GAP`] after every query. This is a sequencing rule the
//! service operator relies on, not a tunable.

use serde::Deserialize;
use std::collections::HashSet;
use std::error::Error;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, info, instrument, warn};
use url::Url;

use crate::models::ClubLocation;
use crate::normalize::club_key;
use crate::store::ClubTable;

const NOMINATIM_URL: &str = "https://nominatim.openstreetmap.org/search";

/// Appended to every query to bias results into the region the feed
/// covers.
pub const REGION_QUALIFIER: &str = "Hauts-de-France, France";

/// Minimum pause after each geocoding request.
pub const REQUEST_GAP: Duration = Duration::from_millis(1100);

/// Hard ceiling on table additions per run. Keeps a cold-start backlog
/// from hammering the service; whatever is left over waits for the next
/// scheduled run.
pub const MAX_ADDITIONS_PER_RUN: usize = 80;

/// One geocoder result: coordinates plus whatever address detail came
/// back. Nominatim serializes coordinates as strings.
#[derive(Debug, Clone, Deserialize)]
pub struct Place {
    pub lat: String,
    pub lon: String,
    #[serde(default)]
    pub address: Address,
}

/// Address sub-fields, most-specific first. Any of them may be absent.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Address {
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub town: String,
    #[serde(default)]
    pub village: String,
    #[serde(default)]
    pub municipality: String,
}

impl Address {
    /// Best-effort municipality label: first non-empty of city, town,
    /// village, municipality.
    pub fn best_city(&self) -> String {
        [&self.city, &self.town, &self.village, &self.municipality]
            .into_iter()
            .find(|field| !field.is_empty())
            .cloned()
            .unwrap_or_default()
    }
}

/// The lookup seam between the backfill driver and the geocoding
/// service. Implementations return at most one place per query.
pub trait GeocodeLookup {
    async fn search(&self, query: &str) -> Result<Option<Place>, Box<dyn Error>>;
}

/// [`GeocodeLookup`] against the public Nominatim search endpoint,
/// country-filtered to France, first result only.
#[derive(Debug, Clone)]
pub struct NominatimClient {
    client: reqwest::Client,
}

impl NominatimClient {
    /// The client must carry an identifying User-Agent; build it with
    /// [`crate::scrapers::fff::http_client`].
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }
}

impl GeocodeLookup for NominatimClient {
    #[instrument(level = "info", skip(self))]
    async fn search(&self, query: &str) -> Result<Option<Place>, Box<dyn Error>> {
        let url = Url::parse_with_params(
            NOMINATIM_URL,
            &[
                ("q", query),
                ("format", "json"),
                ("limit", "1"),
                ("addressdetails", "1"),
                ("countrycodes", "fr"),
            ],
        )?;

        let body = self
            .client
            .get(url)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;
        let mut places: Vec<Place> = serde_json::from_str(&body)?;

        if places.is_empty() {
            Ok(None)
        } else {
            Ok(Some(places.remove(0)))
        }
    }
}

/// What one backfill run did.
#[derive(Debug)]
pub struct BackfillReport {
    /// Entries added to the club table this run.
    pub added: usize,
    /// Names that remain unresolved: failed queries, empty results, and
    /// everything deferred once the per-run cap was hit.
    pub still_missing: Vec<String>,
}

/// Work through the missing list, growing the club table in place.
///
/// Per name: skip it when the table already resolves it under
/// [`club_key`] (a previous partial run may have added it); otherwise
/// issue one region-qualified query and take the first result. A failed
/// or empty lookup leaves the name on the list for the next run; there
/// are no in-run retries. Once `max_additions` entries have been added
/// no further queries are issued and every unresolved name, attempted or
/// not, stays on the list.
#[instrument(level = "info", skip(lookup, clubs, missing))]
pub async fn backfill_missing<G: GeocodeLookup>(
    lookup: &G,
    clubs: &mut ClubTable,
    missing: &[String],
    max_additions: usize,
    request_gap: Duration,
) -> BackfillReport {
    let mut known: HashSet<String> = clubs.keys().map(|name| club_key(name)).collect();
    let mut still_missing = Vec::new();
    let mut added = 0usize;

    for raw in missing {
        if known.contains(&club_key(raw)) {
            debug!(name = %raw, "already in club table, dropped from missing list");
            continue;
        }
        if added >= max_additions {
            still_missing.push(raw.clone());
            continue;
        }

        let query = format!("{raw}, {REGION_QUALIFIER}");
        match lookup.search(&query).await {
            Ok(Some(place)) => match (place.lat.parse::<f64>(), place.lon.parse::<f64>()) {
                (Ok(lat), Ok(lon)) => {
                    info!(name = %raw, lat, lon, "geocoded club");
                    clubs.insert(
                        raw.clone(),
                        ClubLocation {
                            city: place.address.best_city(),
                            postcode: String::new(),
                            lat,
                            lon,
                        },
                    );
                    known.insert(club_key(raw));
                    added += 1;
                }
                _ => {
                    warn!(name = %raw, lat = %place.lat, lon = %place.lon, "unparsable coordinates");
                    still_missing.push(raw.clone());
                }
            },
            Ok(None) => {
                info!(name = %raw, "no geocoder result");
                still_missing.push(raw.clone());
            }
            Err(e) => {
                warn!(name = %raw, error = %e, "geocode query failed");
                still_missing.push(raw.clone());
            }
        }

        sleep(request_gap).await;
    }

    if added >= max_additions && !still_missing.is_empty() {
        warn!(
            cap = max_additions,
            deferred = still_missing.len(),
            "per-run geocoding cap reached"
        );
    }
    info!(added, still_missing = still_missing.len(), "backfill pass complete");
    BackfillReport {
        added,
        still_missing,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::collections::HashMap;

    /// Scripted lookup: resolves what it is told to, fails on demand,
    /// records every query it receives.
    struct FakeLookup {
        places: HashMap<String, Place>,
        failing: HashSet<String>,
        queries: RefCell<Vec<String>>,
    }

    impl FakeLookup {
        fn new() -> Self {
            Self {
                places: HashMap::new(),
                failing: HashSet::new(),
                queries: RefCell::new(Vec::new()),
            }
        }

        fn resolving<I: IntoIterator<Item = String>>(names: I) -> Self {
            let mut fake = Self::new();
            for name in names {
                fake.places.insert(
                    name.clone(),
                    Place {
                        lat: "50.5".to_string(),
                        lon: "2.9".to_string(),
                        address: Address {
                            town: name,
                            ..Address::default()
                        },
                    },
                );
            }
            fake
        }
    }

    impl GeocodeLookup for FakeLookup {
        async fn search(&self, query: &str) -> Result<Option<Place>, Box<dyn Error>> {
            self.queries.borrow_mut().push(query.to_string());
            let name = query
                .strip_suffix(&format!(", {REGION_QUALIFIER}"))
                .unwrap_or(query);
            if self.failing.contains(name) {
                return Err("connection reset".into());
            }
            Ok(self.places.get(name).cloned())
        }
    }

    #[test]
    fn test_best_city_priority() {
        let address = Address {
            city: String::new(),
            town: "Bapaume".to_string(),
            village: "ignored".to_string(),
            municipality: "ignored".to_string(),
        };
        assert_eq!(address.best_city(), "Bapaume");
        assert_eq!(Address::default().best_city(), "");

        let village_only = Address {
            village: "Vaulx".to_string(),
            ..Address::default()
        };
        assert_eq!(village_only.best_city(), "Vaulx");
    }

    #[tokio::test]
    async fn test_resolved_names_join_the_table() {
        let fake = FakeLookup::resolving(["FC Inconnu".to_string()]);
        let mut clubs = ClubTable::new();

        let report = backfill_missing(
            &fake,
            &mut clubs,
            &["FC Inconnu".to_string()],
            MAX_ADDITIONS_PER_RUN,
            Duration::ZERO,
        )
        .await;

        assert_eq!(report.added, 1);
        assert!(report.still_missing.is_empty());
        let entry = &clubs["FC Inconnu"];
        assert_eq!(entry.city, "FC Inconnu");
        assert_eq!(entry.lat, 50.5);
        assert_eq!(
            *fake.queries.borrow(),
            vec![format!("FC Inconnu, {REGION_QUALIFIER}")]
        );
    }

    #[tokio::test]
    async fn test_failures_and_empty_results_stay_missing() {
        let mut fake = FakeLookup::resolving(["Bon Club".to_string()]);
        fake.failing.insert("Club Cassé".to_string());
        let mut clubs = ClubTable::new();

        let missing = vec![
            "Club Cassé".to_string(),
            "Club Introuvable".to_string(),
            "Bon Club".to_string(),
        ];
        let report =
            backfill_missing(&fake, &mut clubs, &missing, MAX_ADDITIONS_PER_RUN, Duration::ZERO)
                .await;

        assert_eq!(report.added, 1);
        assert_eq!(
            report.still_missing,
            vec!["Club Cassé".to_string(), "Club Introuvable".to_string()]
        );
        // Each name costs exactly one query, no in-run retries.
        assert_eq!(fake.queries.borrow().len(), 3);
    }

    #[tokio::test]
    async fn test_already_known_names_cost_no_request() {
        let fake = FakeLookup::new();
        let mut clubs = ClubTable::from([(
            "USL2".to_string(),
            ClubLocation {
                city: "Longuenesse".to_string(),
                postcode: String::new(),
                lat: 50.7,
                lon: 2.2,
            },
        )]);

        let report = backfill_missing(
            &fake,
            &mut clubs,
            &["USL 2".to_string()],
            MAX_ADDITIONS_PER_RUN,
            Duration::ZERO,
        )
        .await;

        assert_eq!(report.added, 0);
        assert!(report.still_missing.is_empty());
        assert!(fake.queries.borrow().is_empty());
    }

    #[tokio::test]
    async fn test_cap_stops_queries_and_defers_the_rest() {
        let names: Vec<String> = (0..100).map(|i| format!("Club {i:03}")).collect();
        let fake = FakeLookup::resolving(names.clone());
        let mut clubs = ClubTable::new();

        let report = backfill_missing(&fake, &mut clubs, &names, 80, Duration::ZERO).await;

        assert_eq!(report.added, 80);
        assert_eq!(clubs.len(), 80);
        assert_eq!(report.still_missing.len(), 20);
        assert_eq!(report.still_missing, names[80..].to_vec());
        assert_eq!(fake.queries.borrow().len(), 80);
    }
}
