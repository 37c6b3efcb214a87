//! Fixture-page scraping.
//!
//! One source family today: the federation's "épreuves" competition pages
//! ([`fff`]). The scraper's job ends at flat text: it downloads a page
//! and flattens every text node into trimmed, non-empty lines. Fixture
//! structure is recovered afterwards by [`crate::parser`], which keeps the
//! pipeline robust to the markup reshuffles those pages go through.
//!
//! Fetches are strictly sequential; a failed page is logged and skipped
//! without aborting the run.

pub mod fff;
