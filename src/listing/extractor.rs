//! Record extraction over a batch of listing URLs

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::{Instrument, debug, info, info_span, instrument, warn};

use crate::listing::ListingUrl;
use crate::listing::config::{FetchFailurePolicy, ScrapeConfig};
use crate::listing::document::PageDocument;
use crate::listing::error::ScrapeError;
use crate::listing::fetch::PageFetcher;
use crate::listing::record::{self, FieldIssue, PropertyRecord, RecordOutcome};

/// Counters of one extraction run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionRunStats {
    /// URLs whose required fields were all extracted
    pub success_count: usize,
    /// URLs processed
    pub total_count: usize,
    /// Field issues met across all URLs
    pub warning_count: usize,
}

impl ExtractionRunStats {
    /// Percentage of processed URLs that succeeded, 0 before any URL
    pub fn success_rate(&self) -> f64 {
        if self.total_count == 0 {
            0.0
        } else {
            self.success_count as f64 / self.total_count as f64 * 100.0
        }
    }
}

/// Sent after every processed URL
#[derive(Debug, Clone)]
pub struct ProgressUpdate {
    pub url: ListingUrl,
    pub succeeded: bool,
    pub stats: ExtractionRunStats,
}

/// Result of an extraction run
///
/// `records`, `issues` and `failed` describe the last visit of each URL.
/// `stats` counts every visit.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ExtractionReport {
    /// One record per processed URL
    pub records: BTreeMap<ListingUrl, PropertyRecord>,
    /// Field issues per URL, only for URLs that had any
    pub issues: BTreeMap<ListingUrl, Vec<FieldIssue>>,
    /// URLs whose last visit did not yield a complete record, in processing order
    pub failed: Vec<ListingUrl>,
    pub stats: ExtractionRunStats,
}

/// URLs the extractor will visit, after the configured offset
pub fn extraction_slice<'a>(urls: &'a [ListingUrl], config: &ScrapeConfig) -> &'a [ListingUrl] {
    if config.skip_first_link {
        urls.get(1..).unwrap_or_default()
    } else {
        urls
    }
}

/// Fetch every listing page and extract its record
///
/// A field issue only affects the URL it occurred on. A fetch failure
/// aborts the run under [`FetchFailurePolicy::Abort`] and leaves an empty
/// record under [`FetchFailurePolicy::Skip`].
#[instrument(skip_all, fields(urls = urls.len()))]
pub async fn extract_records<F: PageFetcher>(
    fetcher: &F,
    urls: &[ListingUrl],
    config: &ScrapeConfig,
    progress: Option<mpsc::Sender<ProgressUpdate>>,
) -> Result<ExtractionReport, ScrapeError> {
    info!("Fetching the rental data");
    let mut report = ExtractionReport::default();

    for url in extraction_slice(urls, config) {
        let outcome = match extract_one(fetcher, url)
            .instrument(info_span!("listing", url = %url))
            .await
        {
            Ok(outcome) => Some(outcome),
            Err(e) if config.on_fetch_error == FetchFailurePolicy::Skip => {
                warn!(url = %url, error = %e, "Skipping listing");
                None
            }
            Err(e) => return Err(e),
        };

        report.stats.total_count += 1;
        report.issues.remove(url);
        report.failed.retain(|failed| failed != url);
        let succeeded = match outcome {
            Some(outcome) => {
                let complete = outcome.is_complete();
                report.stats.warning_count += outcome.issues.len();
                if !outcome.issues.is_empty() {
                    debug!(url = %url, issues = ?outcome.issues, "Field issues");
                    report.issues.insert(url.clone(), outcome.issues);
                }
                report.records.insert(url.clone(), outcome.record);
                complete
            }
            None => {
                report.records.insert(url.clone(), PropertyRecord::default());
                false
            }
        };

        if succeeded {
            report.stats.success_count += 1;
        } else {
            warn!("Issue with {}", url);
            report.failed.push(url.clone());
        }

        if let Some(sender) = &progress {
            let update = ProgressUpdate {
                url: url.clone(),
                succeeded,
                stats: report.stats,
            };
            if sender.send(update).await.is_err() {
                debug!("Progress receiver dropped");
            }
        }
    }

    info!(
        success = report.stats.success_count,
        total = report.stats.total_count,
        "{:.0}% successful",
        report.stats.success_rate()
    );
    Ok(report)
}

async fn extract_one<F: PageFetcher>(fetcher: &F, url: &str) -> Result<RecordOutcome, ScrapeError> {
    let body = fetcher.fetch(url).await?;
    let doc = PageDocument::parse(&body);
    Ok(record::extract_record(&doc))
}
