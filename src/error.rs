use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScraperError {
    #[error("Connection error for {url}: {source}")]
    Connection {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("Upstream error: {url} responded with {status}")]
    Upstream { url: String, status: u16 },
    #[error("Table not found: {}", .0.display())]
    NotFound(PathBuf),
    #[error("Malformed table {}: {reason}", .path.display())]
    Format { path: PathBuf, reason: String },
    #[error("No identifier segment in asset URL: {0}")]
    PathDerivation(String),
    #[error("Invalid endpoint URL: {0}")]
    InvalidEndpoint(String),
    #[error("Invalid response body from {url}: {reason}")]
    InvalidBody { url: String, reason: String },
    #[error("HTTP client error: {0}")]
    Client(#[from] reqwest::Error),
    #[error("Run cancelled")]
    Cancelled,
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ScraperError {
    /// A missing manifest only short-circuits the download phase; every other
    /// error aborts the run.
    pub fn is_fatal_for_run(&self) -> bool {
        !matches!(self, ScraperError::NotFound(_))
    }
}
