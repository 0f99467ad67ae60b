//! Suburb profile fetch
//!
//! Builds suburb profile URLs from a table of suburbs and postcodes and
//! fetches them. Pages that do not answer with a success status are
//! skipped. Page-specific extraction is not defined yet: callers get the
//! raw body back and can parse it with [`SuburbProfilePage::document`].

use std::path::Path;

use serde::Deserialize;
use tracing::{info, instrument, warn};

use crate::listing::config::{FetchFailurePolicy, ScrapeConfig};
use crate::listing::document::PageDocument;
use crate::listing::error::ScrapeError;
use crate::listing::fetch::PageFetcher;

/// One row of the suburb table
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SuburbRow {
    pub suburb: String,
    pub postcode: String,
}

/// A suburb profile page that answered with a success status
#[derive(Debug, Clone)]
pub struct SuburbProfilePage {
    pub row: SuburbRow,
    pub url: String,
    pub body: String,
}

impl SuburbProfilePage {
    /// Parse the page for extraction
    pub fn document(&self) -> PageDocument {
        PageDocument::parse(&self.body)
    }
}

/// Read a CSV table with `suburb` and `postcode` columns
pub fn read_suburb_table(path: impl AsRef<Path>) -> Result<Vec<SuburbRow>, ScrapeError> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(path)?;
    let rows = reader.deserialize().collect::<Result<Vec<SuburbRow>, _>>()?;
    Ok(rows)
}

/// Profile URL of a suburb, e.g. `.../suburb-profile/box-hill-north-vic-3129`
pub fn profile_url(base: &str, state: &str, row: &SuburbRow) -> String {
    let suburb = row.suburb.to_lowercase().replace(' ', "-");
    format!("{}{}-{}-{}", base, suburb, state, row.postcode)
}

/// Fetch the profile page of every suburb in `rows`, in order
#[instrument(skip_all, fields(suburbs = rows.len()))]
pub async fn fetch_suburb_profiles<F: PageFetcher>(
    fetcher: &F,
    rows: &[SuburbRow],
    config: &ScrapeConfig,
) -> Result<Vec<SuburbProfilePage>, ScrapeError> {
    let mut pages = Vec::new();

    for row in rows {
        let url = profile_url(&config.suburb_profile_base, &config.state, row);
        match fetcher.fetch(&url).await {
            Ok(body) => {
                info!(url = %url, "Fetched suburb profile");
                pages.push(SuburbProfilePage {
                    row: row.clone(),
                    url,
                    body,
                });
            }
            Err(e) => match e.status() {
                Some(status) => info!(url = %url, status, "Suburb profile unavailable"),
                None if config.on_fetch_error == FetchFailurePolicy::Skip => {
                    warn!(url = %url, error = %e, "Skipping suburb profile");
                }
                None => return Err(e),
            },
        }
    }

    Ok(pages)
}
