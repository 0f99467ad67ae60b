//! # Scrape Configuration Module
//!
//! Configuration for the listing pipeline: where the search results live,
//! how many pages to walk, how requests are paced and what happens when a
//! fetch fails. Uses a builder pattern like the rest of the crate.
//!
//! ## Key Components
//!
//! - `ScrapeConfig`: All knobs of the link collector, record extractor and
//!   suburb profile fetch
//! - `ScrapeConfigBuilder`: Builder for `ScrapeConfig`
//! - `FetchFailurePolicy`: Whether a failed fetch aborts the run or is skipped

use std::str::FromStr;
use std::time::Duration;

use url::Url;

use crate::listing::error::ScrapeError;

/// User agent the listing site accepts without blocking
pub const DEFAULT_USER_AGENT: &str = "PostmanRuntime/7.6.0";

/// Base URL of the listing site
pub const DEFAULT_BASE_URL: &str = "https://www.domain.com.au";

/// Base URL of suburb profile pages
pub const DEFAULT_SUBURB_PROFILE_BASE: &str = "https://www.domain.com.au/suburb-profile/";

/// What to do when a page cannot be fetched
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FetchFailurePolicy {
    /// Propagate the error and stop the run
    #[default]
    Abort,
    /// Log the failure and continue with the next page
    Skip,
}

impl FromStr for FetchFailurePolicy {
    type Err = ScrapeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "abort" => Ok(Self::Abort),
            "skip" => Ok(Self::Skip),
            other => Err(ScrapeError::InvalidConfig(format!(
                "unknown fetch failure policy '{}', expected 'abort' or 'skip'",
                other
            ))),
        }
    }
}

/// Configuration for the listing pipeline
#[derive(Debug, Clone)]
pub struct ScrapeConfig {
    /// Base URL of the listing site, without trailing slash
    pub base_url: String,

    /// Path of the rental search results
    pub search_path: String,

    /// Value of the `sort` query parameter on results pages
    pub sort: String,

    /// Number of results pages to walk
    pub pages: u32,

    /// User agent to use for requests
    pub user_agent: String,

    /// Request timeout in seconds
    pub timeout_secs: u64,

    /// Minimum time between requests in milliseconds, 0 disables pacing
    pub rate_limit_ms: u64,

    /// Retries for transport errors, 429 and 5xx responses
    pub max_retries: u32,

    /// Initial backoff between retries in milliseconds, doubled per attempt
    pub retry_backoff_ms: u64,

    /// Behaviour when a page fetch fails
    pub on_fetch_error: FetchFailurePolicy,

    /// Drop the first collected link before extraction
    pub skip_first_link: bool,

    /// Base URL of suburb profile pages
    pub suburb_profile_base: String,

    /// State slug used in suburb profile URLs
    pub state: String,
}

impl Default for ScrapeConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            search_path: "/rent/VIC/".to_string(),
            sort: "price-desc".to_string(),
            pages: 1,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout_secs: 30,
            rate_limit_ms: 500,
            max_retries: 0,
            retry_backoff_ms: 500,
            on_fetch_error: FetchFailurePolicy::Abort,
            skip_first_link: true,
            suburb_profile_base: DEFAULT_SUBURB_PROFILE_BASE.to_string(),
            state: "vic".to_string(),
        }
    }
}

/// Builder for ScrapeConfig
#[derive(Debug, Default)]
pub struct ScrapeConfigBuilder {
    config: ScrapeConfig,
}

impl ScrapeConfigBuilder {
    /// Create a new builder with default configuration
    pub fn new() -> Self {
        Self {
            config: ScrapeConfig::default(),
        }
    }

    /// Set the base URL of the listing site
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        let base_url: String = base_url.into();
        self.config.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    /// Set the search results path
    pub fn search_path(mut self, search_path: impl Into<String>) -> Self {
        self.config.search_path = search_path.into();
        self
    }

    /// Set the sort order of results pages
    pub fn sort(mut self, sort: impl Into<String>) -> Self {
        self.config.sort = sort.into();
        self
    }

    /// Set the number of results pages to walk
    pub fn pages(mut self, pages: u32) -> Self {
        self.config.pages = pages;
        self
    }

    /// Set the user agent to use for requests
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.config.user_agent = user_agent.into();
        self
    }

    /// Set the request timeout in seconds
    pub fn timeout_secs(mut self, timeout_secs: u64) -> Self {
        self.config.timeout_secs = timeout_secs;
        self
    }

    /// Set the minimum time between requests in milliseconds
    pub fn rate_limit_ms(mut self, rate_limit_ms: u64) -> Self {
        self.config.rate_limit_ms = rate_limit_ms;
        self
    }

    /// Set the number of retries for transient failures
    pub fn max_retries(mut self, max_retries: u32) -> Self {
        self.config.max_retries = max_retries;
        self
    }

    /// Set the initial retry backoff in milliseconds
    pub fn retry_backoff_ms(mut self, retry_backoff_ms: u64) -> Self {
        self.config.retry_backoff_ms = retry_backoff_ms;
        self
    }

    /// Set the fetch failure policy
    pub fn on_fetch_error(mut self, policy: FetchFailurePolicy) -> Self {
        self.config.on_fetch_error = policy;
        self
    }

    /// Set whether the first collected link is dropped before extraction
    pub fn skip_first_link(mut self, skip_first_link: bool) -> Self {
        self.config.skip_first_link = skip_first_link;
        self
    }

    /// Set the suburb profile base URL
    pub fn suburb_profile_base(mut self, base: impl Into<String>) -> Self {
        self.config.suburb_profile_base = base.into();
        self
    }

    /// Set the state slug used in suburb profile URLs
    pub fn state(mut self, state: impl Into<String>) -> Self {
        self.config.state = state.into();
        self
    }

    /// Build the configuration
    pub fn build(self) -> ScrapeConfig {
        self.config
    }
}

impl ScrapeConfig {
    /// Create a new builder
    pub fn builder() -> ScrapeConfigBuilder {
        ScrapeConfigBuilder::new()
    }

    /// Get the request timeout as a Duration
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Get the rate limit as a Duration
    pub fn rate_limit(&self) -> Duration {
        Duration::from_millis(self.rate_limit_ms)
    }

    /// URL of results page `page` (1-based)
    pub fn results_page_url(&self, page: u32) -> Result<String, ScrapeError> {
        let mut url = Url::parse(&format!("{}{}", self.base_url, self.search_path))?;
        url.query_pairs_mut()
            .append_pair("sort", &self.sort)
            .append_pair("page", &page.to_string());
        Ok(url.to_string())
    }
}
