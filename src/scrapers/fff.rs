//! FFF "épreuves" page scraper.
//!
//! Competition pages are fetched one at a time and reduced to flat text:
//! every text node, trimmed, one line per node, empty lines dropped. The
//! markup on these pages changes without notice, so nothing here selects
//! elements; the fixture parser works on the text lines alone.

use futures::stream::{self, StreamExt};
use reqwest::Client;
use scraper::Html;
use std::error::Error;
use std::time::Duration;
use tracing::{debug, error, info, instrument};

use crate::models::Fixture;
use crate::parser::parse_fixtures;
use crate::store::SourcesTable;

/// Identifying User-Agent, required by both the federation pages and the
/// geocoder's usage policy so the operator can reach whoever runs this.
pub const USER_AGENT: &str = "Matchs-HDF bot (GitHub Actions) - contact: actions@users.noreply.github.com";

const FETCH_TIMEOUT: Duration = Duration::from_secs(45);

/// Marker left in `sources.json` rows where a page URL has not been
/// pasted in yet.
const URL_PLACEHOLDER: &str = "COLLE_URL";

/// Shared HTTP client: identifying User-Agent, 45 s timeout.
pub fn http_client() -> Result<Client, Box<dyn Error>> {
    Ok(Client::builder()
        .user_agent(USER_AGENT)
        .timeout(FETCH_TIMEOUT)
        .build()?)
}

/// Scrape every configured source page and parse its fixtures.
///
/// Pages are fetched strictly one after another. A fetch failure aborts
/// that page only: it is logged and the remaining sources still run.
/// Placeholder and empty URL rows are skipped silently.
#[instrument(level = "info", skip_all)]
pub async fn scrape_sources(client: &Client, sources: &SourcesTable) -> Vec<Fixture> {
    let pages: Vec<(String, String)> = sources
        .iter()
        .flat_map(|(competition, urls)| {
            urls.iter()
                .filter(|url| is_scrapable_url(url))
                .map(move |url| (competition.clone(), url.clone()))
        })
        .collect();

    let fixtures: Vec<Fixture> = stream::iter(pages)
        .then(|(competition, url)| {
            let client = client.clone();
            async move {
                match fetch_text_lines(&client, &url).await {
                    Ok(lines) => {
                        let parsed = parse_fixtures(&lines, &competition, &url);
                        debug!(%url, %competition, count = parsed.len(), "parsed fixture page");
                        parsed
                    }
                    Err(e) => {
                        error!(error = %e, %url, %competition, "fixture page fetch failed");
                        Vec::new()
                    }
                }
            }
        })
        .collect::<Vec<_>>()
        .await
        .into_iter()
        .flatten()
        .collect();

    info!(count = fixtures.len(), "scraped raw fixtures");
    fixtures
}

/// Fetch one page and flatten it to text lines.
#[instrument(level = "info", skip_all, fields(%url))]
pub async fn fetch_text_lines(client: &Client, url: &str) -> Result<Vec<String>, Box<dyn Error>> {
    let body = client.get(url).send().await?.error_for_status()?.text().await?;
    Ok(text_lines(&body))
}

/// Every text node of the document as a trimmed, non-empty line.
fn text_lines(body: &str) -> Vec<String> {
    let document = Html::parse_document(body);
    let mut lines = Vec::new();
    for chunk in document.root_element().text() {
        for line in chunk.split('\n') {
            let line = line.trim();
            if !line.is_empty() {
                lines.push(line.to_string());
            }
        }
    }
    lines
}

fn is_scrapable_url(url: &str) -> bool {
    !url.trim().is_empty() && !url.contains(URL_PLACEHOLDER)
}
