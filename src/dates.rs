//! French-locale kickoff extraction from scraped text lines.
//!
//! Fixture listings print the kickoff as a standalone line in the fuzzy
//! shape `<weekday> <day> <month-name> <year> - <hour>h<minute>`, e.g.
//! `sam 07 fév 2026 - 18h00` or `dimanche 24 août 2025 - 15H00`. The
//! weekday may be abbreviated or full, the month name abbreviated
//! (optionally dotted) or full, accented or not, the dash a hyphen or an
//! en-dash, and the `h` separator upper- or lowercase with stray spaces.
//!
//! Kickoffs are pinned to a fixed +01:00 offset. The feed has never
//! carried daylight-saving adjustment and downstream consumers rely on
//! that, so summer kickoffs are intentionally labeled +01:00 too.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveTime};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;
use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;

static DATE_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)^(?:lun|mar|mer|jeu|ven|sam|dim)[a-z]*\s+(\d{2})\s+([a-zéèêëîïôöûüàç\.]+)\s+(\d{4})\s*[-\u{2013}]\s*(\d{2})\s*h\s*(\d{2})$",
    )
    .unwrap()
});

/// Accent-stripped month prefixes. Four-letter keys disambiguate pairs
/// like `juin`/`juil` that share a three-letter prefix.
static MONTHS: Lazy<HashMap<&'static str, u32>> = Lazy::new(|| {
    HashMap::from([
        ("jan", 1),
        ("janv", 1),
        ("fev", 2),
        ("fevr", 2),
        ("mar", 3),
        ("mars", 3),
        ("avr", 4),
        ("avri", 4),
        ("mai", 5),
        ("jui", 6),
        ("juin", 6),
        ("juil", 7),
        ("aou", 8),
        ("aout", 8),
        ("sep", 9),
        ("sept", 9),
        ("oct", 10),
        ("nov", 11),
        ("dec", 12),
    ])
});

/// The feed's fixed UTC+1 offset.
static CET: Lazy<FixedOffset> = Lazy::new(|| FixedOffset::east_opt(3600).unwrap());

/// Try to read a line as a kickoff date.
///
/// Returns `Some` with the timestamp at +01:00 when the whole line is a
/// recognizable kickoff expression. Everything else (a team name, a
/// score, a date-shaped line with an unknown month name or an impossible
/// calendar date) is `None`, never an error: the line scanner probes
/// every line with this and moves on.
pub fn extract_kickoff(line: &str) -> Option<DateTime<FixedOffset>> {
    let caps = DATE_LINE.captures(line.trim())?;

    let day: u32 = caps[1].parse().ok()?;
    let month = month_number(&caps[2])?;
    let year: i32 = caps[3].parse().ok()?;
    let hour: u32 = caps[4].parse().ok()?;
    let minute: u32 = caps[5].parse().ok()?;

    let date = NaiveDate::from_ymd_opt(year, month, day)?;
    let time = NaiveTime::from_hms_opt(hour, minute, 0)?;
    date.and_time(time).and_local_timezone(*CET).single()
}

/// Serialize a kickoff the way the feed stores it: ISO-8601 with the
/// fixed offset spelled `+01:00`, e.g. `2026-02-07T18:00:00+01:00`.
pub fn kickoff_iso(kickoff: &DateTime<FixedOffset>) -> String {
    kickoff.format("%Y-%m-%dT%H:%M:%S%:z").to_string()
}

/// Resolve a scraped month name to its number.
///
/// The name is lowercased, dots dropped, accents stripped, then matched by
/// prefix against the month table, longest first (4 letters, then 3). An
/// unrecognized name is a non-match, not an error.
fn month_number(raw: &str) -> Option<u32> {
    let folded: String = raw
        .to_lowercase()
        .nfd()
        .filter(|c| !is_combining_mark(*c) && *c != '.')
        .collect();

    for len in [4, 3] {
        let prefix: String = folded.chars().take(len).collect();
        if let Some(&month) = MONTHS.get(prefix.as_str()) {
            return Some(month);
        }
    }
    None
}
