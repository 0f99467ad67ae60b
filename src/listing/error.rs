//! Error types for the listing module

use thiserror::Error;

/// Error type for listing scrape operations
#[derive(Debug, Error)]
pub enum ScrapeError {
    /// HTTP client error (transport, timeout, body decoding)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Server answered with a non-success status
    #[error("HTTP status {status} for {url}")]
    Status {
        /// Requested URL
        url: String,
        /// HTTP status code
        status: u16,
    },

    /// URL parsing error
    #[error("URL parsing error: {0}")]
    UrlParse(#[from] url::ParseError),

    /// A page lacked an element the pipeline cannot do without
    #[error("Missing element {marker} on {url}")]
    MissingElement {
        /// Page the element was expected on
        url: String,
        /// Selector of the missing element
        marker: &'static str,
    },

    /// Invalid configuration value
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Suburb table parsing error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Filesystem error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ScrapeError {
    /// HTTP status carried by the error, if the server answered at all
    pub fn status(&self) -> Option<u16> {
        match self {
            ScrapeError::Status { status, .. } => Some(*status),
            ScrapeError::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}
