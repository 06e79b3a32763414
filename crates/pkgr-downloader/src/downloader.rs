//! Bounded-concurrency fetch of a resolved download list into the on-disk
//! artifact cache.

use crate::error::{DownloadError, Result};
use crate::retry::{with_retry, RetryConfig};
use crate::types::{job_for, DownloadJob, DownloadedArtifacts};
use md5::{Digest, Md5};
use pkgr_core::AHashMap;
use pkgr_resolver::PkgDl;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tracing::{debug, info, warn};

/// Fetch every package in `downloads` into `cache_dir`, bounded to
/// `min(workers, len(downloads))` concurrent fetchers. Returns the final
/// local path of each artifact, keyed by package name.
///
/// The first fatal error cancels remaining in-flight work (cooperative:
/// fetchers check a shared flag between retry attempts) and is returned.
/// Partial files left by cancelled fetchers are removed before returning.
pub async fn download(client: &reqwest::Client, downloads: &[PkgDl], cache_dir: &Path, workers: usize) -> Result<DownloadedArtifacts> {
    if downloads.is_empty() {
        return Ok(AHashMap::new());
    }

    let jobs: Vec<DownloadJob> = downloads.iter().map(|pkg| job_for(pkg, cache_dir)).collect();
    let pool_size = workers.max(1).min(jobs.len());
    let semaphore = Arc::new(Semaphore::new(pool_size));
    let cancelled = Arc::new(AtomicBool::new(false));
    let retry_config = RetryConfig::default();

    info!(count = jobs.len(), workers = pool_size, "starting downloads");

    let results = futures::future::join_all(jobs.into_iter().map(|job| {
        let client = client.clone();
        let semaphore = Arc::clone(&semaphore);
        let cancelled = Arc::clone(&cancelled);
        let retry_config = retry_config.clone();
        async move {
            let _permit = semaphore.acquire_owned().await.expect("semaphore not closed");
            let name = job.name.clone();
            let outcome = fetch_one(&client, &job, &retry_config, &cancelled).await;
            if outcome.is_err() {
                cancelled.store(true, Ordering::SeqCst);
                cleanup_partial(&job);
            }
            (name, outcome)
        }
    }))
    .await;

    let mut artifacts = AHashMap::new();
    let mut first_error: Option<DownloadError> = None;
    let total = results.len();
    let mut failed = 0usize;

    for (name, outcome) in results {
        match outcome {
            Ok(path) => {
                artifacts.insert(name, path);
            }
            Err(err) => {
                failed += 1;
                if first_error.is_none() {
                    first_error = Some(err);
                }
            }
        }
    }

    if let Some(first) = first_error {
        return Err(DownloadError::Partial { failed, total, first: Box::new(first) });
    }

    Ok(artifacts)
}

async fn fetch_one(
    client: &reqwest::Client,
    job: &DownloadJob,
    retry_config: &RetryConfig,
    cancelled: &Arc<AtomicBool>,
) -> Result<std::path::PathBuf> {
    if cancelled.load(Ordering::SeqCst) {
        return Err(DownloadError::Cancelled { name: job.name.clone() });
    }

    if is_valid_cache_hit(job) {
        debug!(name = %job.name, path = ?job.dest, "cache hit, skipping download");
        return Ok(job.dest.clone());
    }

    if let Some(parent) = job.dest.parent() {
        std::fs::create_dir_all(parent).map_err(|source| DownloadError::Io { path: parent.to_path_buf(), source })?;
    }

    let url = job.url.clone();
    let bytes = with_retry(retry_config, || {
        let client = client.clone();
        let url = url.clone();
        let cancelled = Arc::clone(cancelled);
        async move {
            if cancelled.load(Ordering::SeqCst) {
                return Err(DownloadError::Cancelled { name: String::new() });
            }
            let response = client
                .get(&url)
                .send()
                .await
                .map_err(|source| DownloadError::Request { url: url.clone(), source })?;
            if !response.status().is_success() {
                return Err(DownloadError::Status { url: url.clone(), status: response.status() });
            }
            response.bytes().await.map_err(|source| DownloadError::Request { url: url.clone(), source })
        }
    })
    .await?;

    if let Some(expected) = &job.expected_md5 {
        let actual = hex::encode(Md5::digest(&bytes));
        if &actual != expected {
            warn!(name = %job.name, expected, actual, "checksum mismatch");
            return Err(DownloadError::Status { url: job.url.clone(), status: reqwest::StatusCode::UNPROCESSABLE_ENTITY });
        }
    }

    write_atomically(job, &bytes)?;
    Ok(job.dest.clone())
}

fn is_valid_cache_hit(job: &DownloadJob) -> bool {
    let Ok(metadata) = std::fs::metadata(&job.dest) else {
        return false;
    };
    if metadata.len() == 0 {
        return false;
    }
    match &job.expected_md5 {
        None => true,
        Some(expected) => std::fs::read(&job.dest)
            .map(|bytes| hex::encode(Md5::digest(&bytes)) == *expected)
            .unwrap_or(false),
    }
}

fn write_atomically(job: &DownloadJob, bytes: &[u8]) -> Result<()> {
    let parent = job.dest.parent().expect("job destinations always have a parent directory");
    let mut temp = tempfile::NamedTempFile::new_in(parent).map_err(|source| DownloadError::Io { path: parent.to_path_buf(), source })?;
    std::io::Write::write_all(&mut temp, bytes).map_err(|source| DownloadError::Io { path: job.dest.clone(), source })?;
    temp.persist(&job.dest).map_err(|err| DownloadError::Io { path: job.dest.clone(), source: err.error })?;
    Ok(())
}

fn cleanup_partial(job: &DownloadJob) {
    if job.dest.exists() {
        let _ = std::fs::remove_file(&job.dest);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pkgr_desc::PackageDesc;
    use pkgr_repo::{RepoUrl, SourceType};
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn pkg_dl(repo_url: String, version: &str) -> PkgDl {
        PkgDl {
            desc: PackageDesc {
                name: "dplyr".to_string(),
                version: version.to_string(),
                depends: Vec::new(),
                imports: Vec::new(),
                suggests: Vec::new(),
                linking_to: Vec::new(),
                repo_origin: None,
            },
            repo: RepoUrl { name: "cran".to_string(), url: repo_url },
            source_type: SourceType::Source,
            cache_path: None,
        }
    }

    #[tokio::test]
    async fn downloads_and_caches_a_single_package() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/src/contrib/dplyr_1.1.4.tar.gz"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"archive-bytes".to_vec()))
            .mount(&server)
            .await;

        let cache_dir = tempfile::tempdir().unwrap();
        let client = reqwest::Client::new();
        let downloads = vec![pkg_dl(server.uri(), "1.1.4")];

        let artifacts = download(&client, &downloads, cache_dir.path(), 4).await.unwrap();
        let path = artifacts.get("dplyr").unwrap();
        assert_eq!(std::fs::read(path).unwrap(), b"archive-bytes");
    }

    #[tokio::test]
    async fn cached_file_is_reused_without_refetch() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/src/contrib/dplyr_1.1.4.tar.gz"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"first".to_vec()))
            .expect(1)
            .mount(&server)
            .await;

        let cache_dir = tempfile::tempdir().unwrap();
        let client = reqwest::Client::new();
        let downloads = vec![pkg_dl(server.uri(), "1.1.4")];

        download(&client, &downloads, cache_dir.path(), 4).await.unwrap();
        let artifacts = download(&client, &downloads, cache_dir.path(), 4).await.unwrap();
        assert_eq!(std::fs::read(artifacts.get("dplyr").unwrap()).unwrap(), b"first");
    }

    #[tokio::test]
    async fn server_error_is_returned_as_partial_failure() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/src/contrib/dplyr_1.1.4.tar.gz"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let cache_dir = tempfile::tempdir().unwrap();
        let client = reqwest::Client::new();
        let downloads = vec![pkg_dl(server.uri(), "1.1.4")];

        let result = download(&client, &downloads, cache_dir.path(), 4).await;
        assert!(matches!(result, Err(DownloadError::Partial { .. })));
        assert!(!cache_dir.path().join("cran/source/dplyr_1.1.4.tar.gz").exists());
    }

    #[tokio::test]
    async fn empty_download_list_returns_empty_map() {
        let client = reqwest::Client::new();
        let cache_dir = tempfile::tempdir().unwrap();
        let artifacts = download(&client, &[], cache_dir.path(), 4).await.unwrap();
        assert!(artifacts.is_empty());
    }
}
