//! The seam between the pipeline and the network

use std::future::Future;

use crate::listing::error::ScrapeError;

/// Fetches the body of a page
///
/// Implementations return the decoded body for a success status and an
/// error for transport failures or any other status.
pub trait PageFetcher {
    /// Fetch `url` and return its body
    fn fetch(&self, url: &str) -> impl Future<Output = Result<String, ScrapeError>> + Send;
}

