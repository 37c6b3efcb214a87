//! Fixture extraction from flattened page text.
//!
//! Competition pages are scraped as a flat sequence of text lines, with no
//! markup to lean on. A kickoff date line (see [`crate::dates`]) anchors
//! each fixture block; the two club names sit somewhere in the handful of
//! lines after it, mixed with scores, round headers and other noise.
//!
//! The scan classifies every line into one of a few shapes
//! ([`LineClass`]) and alternates between two modes: seeking the next
//! anchor, then collecting exactly two team lines for it inside a bounded
//! window. Keeping the classification separate from the scan keeps each
//! skip rule testable on its own.
//!
//! The "first two qualifying lines after the anchor are home then away"
//! rule is a heuristic: the pages make no positional promise, so the
//! parser is best-effort by design and an occasional reshuffled block will
//! mis-read. Anchors that cannot produce two teams yield nothing rather
//! than a partial fixture.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;
use std::collections::hash_map::Entry;
use tracing::debug;

use crate::dates::{extract_kickoff, kickoff_iso};
use crate::models::{FIXTURE_SOURCE, Fixture};

/// How far past an anchor the team search looks before giving up.
const TEAM_LOOKAHEAD: usize = 14;

/// Lines shorter than this are headers, bullets or stray glyphs, never a
/// club name.
const MIN_TEAM_LEN: usize = 3;

static FORFEIT_SUFFIX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)[\s\-\u{2013}(]*forfait(\s+g[ée]n[ée]ral)?[\s).]*$").unwrap()
});

/// What a single line looks like to the scan.
#[derive(Debug)]
enum LineClass {
    /// A kickoff date: starts a fixture block, ends the previous one.
    Anchor,
    /// A score pair like `2  1`; present once a match has been played.
    ScoreNoise,
    /// Too short to be a club name.
    Noise,
    /// A plausible club name, forfeit suffix already stripped.
    Team(String),
}

fn classify(line: &str) -> LineClass {
    if extract_kickoff(line).is_some() {
        return LineClass::Anchor;
    }
    if is_score_pair(line) {
        return LineClass::ScoreNoise;
    }
    let name = strip_forfeit(line);
    if name.chars().count() < MIN_TEAM_LEN {
        return LineClass::Noise;
    }
    LineClass::Team(name.to_string())
}

/// Two whitespace-separated integers and nothing else.
fn is_score_pair(line: &str) -> bool {
    let mut count = 0;
    for token in line.split_whitespace() {
        if token.parse::<u32>().is_err() {
            return false;
        }
        count += 1;
    }
    count == 2
}

/// Drop a trailing "forfait" marker (`"AS Cambrai (forfait)"`,
/// `"AS Cambrai - Forfait général"`) so the line still counts as a team.
fn strip_forfeit(line: &str) -> &str {
    let stripped = match FORFEIT_SUFFIX.find(line) {
        Some(m) => &line[..m.start()],
        None => line,
    };
    stripped.trim()
}

/// Parse one page's lines into fixtures.
///
/// Scans in order; every kickoff line becomes an anchor and the window
/// behind it is searched for two team lines. The scan always resumes at
/// the line after the anchor, never after the consumed window, so an
/// anchor sitting inside another block's window is still found.
pub fn parse_fixtures(lines: &[String], competition: &str, source_url: &str) -> Vec<Fixture> {
    let mut fixtures = Vec::new();
    let mut i = 0;

    while i < lines.len() {
        let Some(kickoff) = extract_kickoff(&lines[i]) else {
            i += 1;
            continue;
        };

        match collect_teams(&lines[i + 1..]) {
            Some((home, away)) => fixtures.push(Fixture {
                competition: competition.to_string(),
                competition_label: competition.to_string(),
                kickoff: kickoff_iso(&kickoff),
                home,
                away,
                source: FIXTURE_SOURCE.to_string(),
                source_url: source_url.to_string(),
            }),
            None => debug!(
                line = %lines[i],
                competition,
                "kickoff line without two team lines, skipped"
            ),
        }

        i += 1;
    }

    fixtures
}

/// Collect the anchor's two team lines from the window behind it.
///
/// A nested anchor ends the window immediately: the next fixture block has
/// begun and this anchor keeps whatever it has, which if it is fewer than
/// two teams means it is discarded.
fn collect_teams(window: &[String]) -> Option<(String, String)> {
    let mut home: Option<String> = None;

    for line in window.iter().take(TEAM_LOOKAHEAD) {
        match classify(line) {
            LineClass::Anchor => return None,
            LineClass::ScoreNoise | LineClass::Noise => continue,
            LineClass::Team(name) => match home.take() {
                None => home = Some(name),
                Some(first) => return Some((first, name)),
            },
        }
    }
    None
}

/// Collapse fixtures that are the same listing scraped more than once.
///
/// Identity is [`Fixture::dedup_key`]. The last-seen copy wins; the
/// first-seen position is kept so the merged list stays in input order for
/// the stable kickoff sort downstream.
pub fn dedupe_fixtures(fixtures: Vec<Fixture>) -> Vec<Fixture> {
    let mut merged: Vec<Fixture> = Vec::with_capacity(fixtures.len());
    let mut positions: HashMap<(String, String, String, String), usize> = HashMap::new();

    for fixture in fixtures {
        match positions.entry(fixture.dedup_key()) {
            Entry::Occupied(slot) => merged[*slot.get()] = fixture,
            Entry::Vacant(slot) => {
                slot.insert(merged.len());
                merged.push(fixture);
            }
        }
    }
    merged
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_basic_block_with_score_noise() {
        let page = lines(&["sam 07 fév 2026 - 18h00", "AS CAMBRAI", "2  1", "US ARRAS"]);
        let fixtures = parse_fixtures(&page, "R1", "https://example.org/r1");

        assert_eq!(fixtures.len(), 1);
        assert_eq!(fixtures[0].home, "AS CAMBRAI");
        assert_eq!(fixtures[0].away, "US ARRAS");
        assert_eq!(fixtures[0].kickoff, "2026-02-07T18:00:00+01:00");
        assert_eq!(fixtures[0].competition, "R1");
        assert_eq!(fixtures[0].competition_label, "R1");
        assert_eq!(fixtures[0].source, FIXTURE_SOURCE);
    }

    #[test]
    fn test_back_to_back_anchors_drop_the_first() {
        let page = lines(&[
            "sam 07 fév 2026 - 18h00",
            "dim 08 fév 2026 - 15h00",
            "AS CAMBRAI",
            "US ARRAS",
        ]);
        let fixtures = parse_fixtures(&page, "R1", "u");

        assert_eq!(fixtures.len(), 1);
        assert_eq!(fixtures[0].kickoff, "2026-02-08T15:00:00+01:00");
    }

    #[test]
    fn test_anchor_inside_previous_window_is_not_skipped() {
        let page = lines(&[
            "sam 07 fév 2026 - 18h00",
            "AS CAMBRAI",
            "sam 07 fév 2026 - 20h00",
            "SC ABBEVILLE",
            "OLYMPIQUE MARCQ",
        ]);
        let fixtures = parse_fixtures(&page, "R2", "u");

        // First anchor only collected one team before the next anchor cut
        // its window; the second block parses normally.
        assert_eq!(fixtures.len(), 1);
        assert_eq!(fixtures[0].home, "SC ABBEVILLE");
        assert_eq!(fixtures[0].away, "OLYMPIQUE MARCQ");
    }

    #[test]
    fn test_short_lines_are_skipped() {
        let page = lines(&["sam 07 fév 2026 - 18h00", "»", "AS CAMBRAI", "vs", "US ARRAS"]);
        let fixtures = parse_fixtures(&page, "R1", "u");

        assert_eq!(fixtures.len(), 1);
        assert_eq!(fixtures[0].home, "AS CAMBRAI");
        assert_eq!(fixtures[0].away, "US ARRAS");
    }

    #[test]
    fn test_forfeit_suffix_is_stripped_not_discarded() {
        let page = lines(&[
            "sam 07 fév 2026 - 18h00",
            "AS CAMBRAI (forfait)",
            "US ARRAS - Forfait général",
        ]);
        let fixtures = parse_fixtures(&page, "R1", "u");

        assert_eq!(fixtures.len(), 1);
        assert_eq!(fixtures[0].home, "AS CAMBRAI");
        assert_eq!(fixtures[0].away, "US ARRAS");
    }

    #[test]
    fn test_window_closing_yields_no_partial_fixture() {
        let mut page = vec!["sam 07 fév 2026 - 18h00".to_string(), "AS CAMBRAI".to_string()];
        page.extend(std::iter::repeat_n("..".to_string(), TEAM_LOOKAHEAD + 2));
        page.push("US ARRAS".to_string());

        assert!(parse_fixtures(&page, "R1", "u").is_empty());
    }

    #[test]
    fn test_score_pair_detection() {
        assert!(is_score_pair("2  1"));
        assert!(is_score_pair("0 0"));
        assert!(!is_score_pair("2 - 1"));
        assert!(!is_score_pair("2"));
        assert!(!is_score_pair("AS CAMBRAI"));
        assert!(!is_score_pair(""));
    }

    #[test]
    fn test_strip_forfeit_variants() {
        assert_eq!(strip_forfeit("AS CAMBRAI (forfait)"), "AS CAMBRAI");
        assert_eq!(strip_forfeit("AS CAMBRAI - FORFAIT"), "AS CAMBRAI");
        assert_eq!(strip_forfeit("US ARRAS forfait général"), "US ARRAS");
        assert_eq!(strip_forfeit("AS CAMBRAI"), "AS CAMBRAI");
    }

    #[test]
    fn test_dedupe_last_seen_wins_first_position_kept() {
        let mut a = Fixture {
            competition: "R1".to_string(),
            competition_label: "R1".to_string(),
            kickoff: "2026-02-07T18:00:00+01:00".to_string(),
            home: "A.S. Cambrai".to_string(),
            away: "US Arras".to_string(),
            source: FIXTURE_SOURCE.to_string(),
            source_url: "page-one".to_string(),
        };
        let mut b = a.clone();
        b.home = "AS CAMBRAI".to_string();
        b.source_url = "page-two".to_string();
        let other = {
            let mut f = a.clone();
            f.kickoff = "2026-02-08T15:00:00+01:00".to_string();
            f
        };
        a.source_url = "page-zero".to_string();

        let merged = dedupe_fixtures(vec![a, other, b]);

        assert_eq!(merged.len(), 2);
        // Duplicate kept its first-seen slot but carries the last-seen copy.
        assert_eq!(merged[0].source_url, "page-two");
        assert_eq!(merged[0].home, "AS CAMBRAI");
        assert_eq!(merged[1].kickoff, "2026-02-08T15:00:00+01:00");
    }
}
