//! # Rental Listing Scraper Module
//!
//! This module implements the two-stage listing pipeline: collecting
//! listing URLs from paginated search results, then visiting each listing
//! page and extracting a structured record from it.
//!
//! ## Key Components
//!
//! - `ScrapeConfig`: Site location, pagination, pacing and failure policy
//! - `collect_listing_urls`: Link collector over the search results pages
//! - `extract_records`: Record extractor over a batch of listing URLs
//! - `fields`: One pure extractor per listing field, returning `FieldResult`
//! - `PropertyRecord` / `ExtractionRunStats`: The output of a run
//! - `fetch_suburb_profiles`: Fetches suburb profile pages for a suburb table
//!
//! ## Failure model
//!
//! Field extractors never abort a run. A required field that is missing or
//! malformed marks its listing as failed, the partially filled record is
//! kept and the run moves on. Page fetch failures follow
//! `FetchFailurePolicy`: they abort the run by default, or are logged and
//! skipped.

mod config;
mod document;
mod error;
mod extractor;
mod fetch;
pub mod fields;
mod links;
mod record;
mod suburb;

#[cfg(test)]
pub(crate) mod fixtures;
#[cfg(test)]
pub(crate) mod mock_fetcher;

pub use config::{
    DEFAULT_BASE_URL, DEFAULT_SUBURB_PROFILE_BASE, DEFAULT_USER_AGENT, FetchFailurePolicy,
    ScrapeConfig, ScrapeConfigBuilder,
};
pub use document::PageDocument;
pub use error::ScrapeError;
pub use extractor::{
    ExtractionReport, ExtractionRunStats, ProgressUpdate, extract_records, extraction_slice,
};
pub use fetch::PageFetcher;
pub use fields::FieldResult;
pub use links::{collect_listing_urls, extract_listing_links};
pub use record::{
    Coordinates, FieldIssue, IssueKind, PropertyRecord, RecordOutcome, Requirement,
    extract_record,
};
pub use suburb::{
    SuburbProfilePage, SuburbRow, fetch_suburb_profiles, profile_url, read_suburb_table,
};

/// Absolute URL of one listing detail page
pub type ListingUrl = String;
