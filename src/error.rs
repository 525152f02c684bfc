//! Error types shared by the scraping pipelines.

use std::path::PathBuf;

/// Error type for browser, extraction, and persistence failures.
#[derive(Debug, thiserror::Error)]
pub enum ScrapeError {
    /// The browser could not be launched or the CDP connection broke.
    #[error("browser error: {0}")]
    Browser(String),

    /// Navigation to a URL failed.
    #[error("navigation to {url} failed: {reason}")]
    Navigation { url: String, reason: String },

    /// A CSS selector from the configuration did not parse.
    #[error("invalid selector `{0}`")]
    Selector(String),

    /// Readability could not isolate any main content.
    #[error("readability extraction failed: {0}")]
    Readability(String),

    /// The page never reached the expected state within the timeout.
    #[error("timed out after {waited_ms} ms waiting for {what}")]
    Timeout { what: String, waited_ms: u128 },

    /// Reading the configuration file failed.
    #[error("failed to load config {}: {reason}", .path.display())]
    Config { path: PathBuf, reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl From<chromiumoxide::error::CdpError> for ScrapeError {
    fn from(e: chromiumoxide::error::CdpError) -> Self {
        ScrapeError::Browser(e.to_string())
    }
}

/// Result alias used across the crate.
pub type Result<T> = std::result::Result<T, ScrapeError>;
