//! # Mock Page Fetcher for Testing
//!
//! Provides a `MockFetcher` that implements `PageFetcher` from an in-memory
//! table of pages, so the pipeline can be exercised without a network.
//! Unknown URLs answer with a 404 status error. Every requested URL is
//! recorded in order.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::listing::error::ScrapeError;
use crate::listing::fetch::PageFetcher;

/// A mock fetcher serving canned pages
#[derive(Debug, Clone, Default)]
pub struct MockFetcher {
    pages: HashMap<String, Result<String, u16>>,
    once: Arc<Mutex<HashMap<String, VecDeque<Result<String, u16>>>>>,
    requests: Arc<Mutex<Vec<String>>>,
}

impl MockFetcher {
    /// Creates a mock fetcher with no pages
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `body` for `url`
    pub fn with_page(mut self, url: impl Into<String>, body: impl Into<String>) -> Self {
        self.pages.insert(url.into(), Ok(body.into()));
        self
    }

    /// Answer `url` with a status error
    pub fn with_status(mut self, url: impl Into<String>, status: u16) -> Self {
        self.pages.insert(url.into(), Err(status));
        self
    }

    /// Serve `body` for the next visit of `url` only, ahead of its regular page
    pub fn with_page_once(self, url: impl Into<String>, body: impl Into<String>) -> Self {
        self.once
            .try_lock()
            .expect("mock fetcher is configured before use")
            .entry(url.into())
            .or_default()
            .push_back(Ok(body.into()));
        self
    }

    /// URLs requested so far, in request order
    pub async fn requests(&self) -> Vec<String> {
        self.requests.lock().await.clone()
    }
}

impl PageFetcher for MockFetcher {
    async fn fetch(&self, url: &str) -> Result<String, ScrapeError> {
        self.requests.lock().await.push(url.to_string());
        let queued = self
            .once
            .lock()
            .await
            .get_mut(url)
            .and_then(VecDeque::pop_front);
        match queued.as_ref().or_else(|| self.pages.get(url)) {
            Some(Ok(body)) => Ok(body.clone()),
            Some(Err(status)) => Err(ScrapeError::Status {
                url: url.to_string(),
                status: *status,
            }),
            None => Err(ScrapeError::Status {
                url: url.to_string(),
                status: 404,
            }),
        }
    }
}
