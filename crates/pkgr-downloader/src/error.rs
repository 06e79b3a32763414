//! Error types for the downloader.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DownloadError {
    #[error("fetching {url}: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("fetching {url}: server responded {status}")]
    Status { url: String, status: reqwest::StatusCode },

    #[error("writing {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("download of {name} was cancelled")]
    Cancelled { name: String },

    #[error("{failed} of {total} downloads failed; first error: {first}")]
    Partial { failed: usize, total: usize, first: Box<DownloadError> },
}

impl DownloadError {
    /// Whether a retry of the same request could plausibly succeed.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Request { .. } => true,
            Self::Status { status, .. } => {
                status.is_server_error() || *status == reqwest::StatusCode::TOO_MANY_REQUESTS
            }
            Self::Io { .. } | Self::Cancelled { .. } | Self::Partial { .. } => false,
        }
    }
}

pub type Result<T> = std::result::Result<T, DownloadError>;
