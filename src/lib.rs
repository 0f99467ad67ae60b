//! # rentscrape - Rental listing scraper
//!
//! This crate extracts structured rental listing data from a real-estate
//! listing site. It runs as a two-stage batch job: collect listing URLs
//! from paginated search results, then visit each listing page and extract
//! a structured record from it.
//!
//! ## Features
//!
//! - Link collection across any number of results pages
//! - Independent field extractors with tagged results, so one broken field
//!   never hides the others
//! - Per-listing failure isolation with a running success rate
//! - Request pacing, timeouts and optional retries
//! - Suburb profile fetching from a CSV table of suburbs and postcodes
//!
//! ## Example
//!
//! ```rust,no_run
//! use rentscrape::http::HttpClient;
//! use rentscrape::listing::{collect_listing_urls, extract_records, ScrapeConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ScrapeConfig::builder().pages(2).build();
//!     let client = HttpClient::new(&config)?;
//!
//!     let urls = collect_listing_urls(&client, &config).await?;
//!     let report = extract_records(&client, &urls, &config, None).await?;
//!
//!     println!(
//!         "{} records, {:.0}% successful",
//!         report.records.len(),
//!         report.stats.success_rate()
//!     );
//!     Ok(())
//! }
//! ```

pub mod http;
pub mod listing;

