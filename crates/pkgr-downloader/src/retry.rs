//! Retry logic with exponential backoff and bounded jitter.

use crate::error::{DownloadError, Result};
use backon::{BackoffBuilder, ExponentialBuilder};
use std::future::Future;
use std::time::Duration;
use tracing::warn;

const MAX_JITTER: Duration = Duration::from_millis(250);

#[derive(Debug, Clone)]
pub struct RetryConfig {
    pub max_attempts: u32,
    pub base_delay: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self { max_attempts: 3, base_delay: Duration::from_millis(500) }
    }
}

/// Run `operation` up to `config.max_attempts` times, doubling the delay
/// from `config.base_delay` between attempts and adding up to
/// [`MAX_JITTER`] of random jitter on top of each backoff step.
pub async fn with_retry<F, Fut, T>(config: &RetryConfig, operation: F) -> Result<T>
where
    F: Fn() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let mut backoff = ExponentialBuilder::default().with_min_delay(config.base_delay).build();
    let mut attempt = 0u32;

    loop {
        attempt += 1;
        match operation().await {
            Ok(value) => return Ok(value),
            Err(err) if attempt < config.max_attempts && err.is_retryable() => {
                let delay = backoff.next().unwrap_or(config.base_delay) + jitter();
                warn!(error = %err, attempt, delay = ?delay, "download attempt failed, retrying");
                tokio::time::sleep(delay).await;
            }
            Err(err) => return Err(err),
        }
    }
}

fn jitter() -> Duration {
    use rand::Rng;
    let millis = rand::thread_rng().gen_range(0..=MAX_JITTER.as_millis() as u64);
    Duration::from_millis(millis)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[tokio::test]
    async fn succeeds_without_retry_when_first_attempt_succeeds() {
        let calls = AtomicU32::new(0);
        let result: Result<u32> = with_retry(&RetryConfig::default(), || async {
            calls.fetch_add(1, Ordering::SeqCst);
            Ok(42)
        })
        .await;
        assert_eq!(result.unwrap(), 42);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn retries_up_to_max_attempts_on_retryable_error() {
        let calls = AtomicU32::new(0);
        let config = RetryConfig { max_attempts: 3, base_delay: Duration::from_millis(1) };
        let result: Result<u32> = with_retry(&config, || async {
            calls.fetch_add(1, Ordering::SeqCst);
            Err(DownloadError::Status { url: "http://x".into(), status: reqwest::StatusCode::SERVICE_UNAVAILABLE })
        })
        .await;
        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn non_retryable_error_stops_immediately() {
        let calls = AtomicU32::new(0);
        let result: Result<u32> = with_retry(&RetryConfig::default(), || async {
            calls.fetch_add(1, Ordering::SeqCst);
            Err(DownloadError::Cancelled { name: "pkg".into() })
        })
        .await;
        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
