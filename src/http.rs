//! HTTP client for fetching listing site pages
//!
//! Wraps a reqwest client with the site's user agent, a request timeout,
//! request pacing through a governor rate limiter and optional retries
//! with exponential backoff.

use std::sync::Arc;
use std::time::Duration;

use governor::{DefaultDirectRateLimiter, Quota, RateLimiter};
use reqwest::{Client as ReqwestClient, StatusCode};
use tracing::{Instrument, debug, debug_span, instrument, warn};

use crate::listing::{PageFetcher, ScrapeConfig, ScrapeError};

/// Upper bound of a single retry delay
const MAX_RETRY_BACKOFF: Duration = Duration::from_secs(60);

/// HTTP client for the listing site
#[derive(Clone)]
pub struct HttpClient {
    /// The underlying reqwest client
    client: ReqwestClient,

    /// Paces requests, `None` when pacing is disabled
    limiter: Option<Arc<DefaultDirectRateLimiter>>,

    /// Retries for transport errors, 429 and 5xx
    max_retries: u32,

    /// Initial delay between retries
    retry_backoff: Duration,
}

impl HttpClient {
    /// Create a client from the scrape configuration
    pub fn new(config: &ScrapeConfig) -> Result<Self, ScrapeError> {
        let client = ReqwestClient::builder()
            .user_agent(config.user_agent.clone())
            .timeout(config.timeout())
            .build()?;

        let limiter = Quota::with_period(config.rate_limit())
            .map(|quota| Arc::new(RateLimiter::direct(quota)));

        Ok(Self {
            client,
            limiter,
            max_retries: config.max_retries,
            retry_backoff: Duration::from_millis(config.retry_backoff_ms),
        })
    }

    /// GET `url` and return the body of a success response
    #[instrument(skip(self), level = "debug")]
    pub async fn get_text(&self, url: &str) -> Result<String, ScrapeError> {
        let mut attempt = 0;
        loop {
            match self.send_once(url).await {
                Ok(body) => return Ok(body),
                Err(failure) if failure.retryable && attempt < self.max_retries => {
                    let delay = failure
                        .retry_after
                        .unwrap_or_else(|| self.backoff_delay(attempt))
                        .min(MAX_RETRY_BACKOFF);
                    attempt += 1;
                    warn!(
                        "Request to {} failed ({}). Retrying in {:?} (attempt {}/{})",
                        url, failure.error, delay, attempt, self.max_retries
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(failure) => return Err(failure.error),
            }
        }
    }

    /// Exponential backoff before retry number `attempt + 1`
    fn backoff_delay(&self, attempt: u32) -> Duration {
        self.retry_backoff
            .saturating_mul(2u32.saturating_pow(attempt))
            .min(MAX_RETRY_BACKOFF)
    }

    async fn send_once(&self, url: &str) -> Result<String, Failure> {
        if let Some(limiter) = &self.limiter {
            limiter.until_ready().instrument(debug_span!("limiter")).await;
        }

        debug!("Sending GET request to {}", url);
        let response = match self.client.get(url).send().await {
            Ok(response) => response,
            Err(e) => {
                return Err(Failure {
                    retryable: e.is_timeout() || e.is_connect() || e.is_request(),
                    retry_after: None,
                    error: ScrapeError::Http(e),
                });
            }
        };

        let status = response.status();
        if status.is_success() {
            return response.text().await.map_err(|e| Failure {
                retryable: false,
                retry_after: None,
                error: ScrapeError::Http(e),
            });
        }

        let retry_after = response
            .headers()
            .get("retry-after")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse::<u64>().ok())
            .map(Duration::from_secs);

        Err(Failure {
            retryable: status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error(),
            retry_after,
            error: ScrapeError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            },
        })
    }
}

struct Failure {
    retryable: bool,
    retry_after: Option<Duration>,
    error: ScrapeError,
}

impl PageFetcher for HttpClient {
    async fn fetch(&self, url: &str) -> Result<String, ScrapeError> {
        self.get_text(url).await
    }
}
