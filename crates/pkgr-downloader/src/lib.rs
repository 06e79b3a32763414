//! Bounded-concurrency fetch of resolved package artifacts into an
//! on-disk, content-addressed cache, with retry/backoff and atomic
//! rename.

#![warn(clippy::all)]

mod downloader;
mod error;
mod retry;
mod types;

pub use downloader::download;
pub use error::{DownloadError, Result};
pub use retry::{with_retry, RetryConfig};
pub use types::{job_for, DownloadJob, DownloadedArtifacts};
