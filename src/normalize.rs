//! Club-name normalization for join-key matching.
//!
//! Scraped team names and the curated club table spell the same club a
//! dozen ways: `"U.S. Laon"`, `"US LAON"`, `"Us Laon "` with a trailing
//! non-breaking space. Everything that compares club names goes through
//! this module so the variants collide.
//!
//! # Invariant
//!
//! The club-table index, the joiner lookup, and the geocoding backfill's
//! already-known check must all be keyed with [`club_key`]. Building one
//! side with a different normalization does not fail loudly; it silently
//! drops every fixture whose name happens to differ, so the key function
//! lives here once and is re-exported nowhere else.

use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;

/// Canonicalize a free-text club name for comparison.
///
/// The transformation, in order:
/// 1. Uppercase.
/// 2. Ligatures expanded (`Œ` → `OE`, `Æ` → `AE`) and non-breaking spaces
///    mapped to plain spaces, ahead of decomposition.
/// 3. Unicode canonical decomposition (NFD), then combining marks dropped,
///    so `É` and `E` compare equal.
/// 4. Apostrophes (straight and typographic), periods, hyphens, en-dashes,
///    underscores and slashes each become a single space.
/// 5. Whitespace runs collapse to one space; leading/trailing trimmed.
///
/// Total over all inputs: nothing panics, the worst case is an empty
/// string. Idempotent, so normalizing an already-normalized name is a
/// no-op.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(canonical("Étaples"), "ETAPLES");
/// assert_eq!(canonical("u.s. saint-omer"), "U S SAINT OMER");
/// ```
pub fn canonical(name: &str) -> String {
    let mut mapped = String::with_capacity(name.len());
    for c in name.to_uppercase().chars() {
        match c {
            'Œ' => mapped.push_str("OE"),
            'Æ' => mapped.push_str("AE"),
            '\u{00A0}' | '\u{202F}' => mapped.push(' '),
            _ => mapped.push(c),
        }
    }

    let decomposed = mapped.nfd().filter(|c| !is_combining_mark(*c));

    let mut out = String::with_capacity(name.len());
    let mut pending_space = false;
    for c in decomposed {
        let c = match c {
            '\'' | '\u{2019}' | '`' | '.' | '-' | '\u{2013}' | '_' | '/' => ' ',
            other => other,
        };
        if c.is_whitespace() {
            pending_space = !out.is_empty();
        } else {
            if pending_space {
                out.push(' ');
                pending_space = false;
            }
            out.push(c);
        }
    }
    out
}

/// The join key: [`canonical`] with every internal space removed.
///
/// Squad suffixes are the reason: listings print `"USL 2"` where the club
/// table says `"USL2"`, and the space-insensitive form makes them the same
/// entry.
pub fn club_key(name: &str) -> String {
    canonical(name).split_whitespace().collect()
}
