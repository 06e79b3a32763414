//! Fetches and caches one repository's `PACKAGES` index per enabled
//! source type, matching the fetch/cache/TTL behavior of the original
//! `pkgr` CRAN client.

use crate::error::IndexFetchError;
use crate::types::{resolve_default, RepoConfig, RepoUrl, SourceType};
use md5::{Digest, Md5};
use pkgr_core::{HostOs, RVersion};
use pkgr_desc::PackageDesc;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

const CACHE_TTL: Duration = Duration::from_secs(3600);

/// One repository's package metadata, keyed by source type then name.
#[derive(Debug, Clone)]
pub struct RepoIndex {
    pub repo: RepoUrl,
    pub default_source_type: SourceType,
    dbs: BTreeMap<SourceType, BTreeMap<String, PackageDesc>>,
    pub fetched_at: SystemTime,
    fingerprint: String,
}

#[derive(Serialize, Deserialize)]
struct CacheEnvelope {
    fetched_at: SystemTime,
    dbs: BTreeMap<SourceType, BTreeMap<String, PackageDesc>>,
}

impl RepoIndex {
    /// Build a synthetic single-repo index from already-parsed packages,
    /// bypassing fetch/cache entirely. Used to fold tarball-ingested
    /// packages into a [`crate::Nexus`] alongside fetched repositories.
    #[must_use]
    pub fn from_packages(repo: RepoUrl, source_type: SourceType, packages: BTreeMap<String, PackageDesc>) -> Self {
        let mut dbs = BTreeMap::new();
        dbs.insert(source_type, packages);
        Self { default_source_type: source_type, repo, dbs, fetched_at: SystemTime::now(), fingerprint: String::new() }
    }

    /// Look up `name` under a specific source type.
    #[must_use]
    pub fn get(&self, name: &str, source_type: SourceType) -> Option<&PackageDesc> {
        self.dbs.get(&source_type)?.get(name)
    }

    /// Does this index carry a db for `source_type` at all (i.e. was it
    /// enabled and did the fetch succeed)?
    #[must_use]
    pub fn has_source_type(&self, source_type: SourceType) -> bool {
        self.dbs.contains_key(&source_type)
    }

    /// Every package name known to this index, across all source types.
    pub fn names(&self) -> impl Iterator<Item = &String> {
        self.dbs.values().flat_map(BTreeMap::keys)
    }

    #[must_use]
    pub fn fingerprint(&self) -> &str {
        &self.fingerprint
    }

    fn cache_path(cache_root: &Path, fingerprint: &str) -> PathBuf {
        cache_root.join("pkgr").join("r_packagedb_caches").join(fingerprint)
    }

    fn persist(&self, path: &Path) -> std::io::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let envelope = CacheEnvelope {
            fetched_at: self.fetched_at,
            dbs: self.dbs.clone(),
        };
        let bytes = bincode::serialize(&envelope)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))?;
        std::fs::write(path, bytes)
    }
}

/// Fetch (or load a fresh cached copy of) `repo`'s package index for every
/// source type enabled on this platform.
pub async fn fetch(
    client: &reqwest::Client,
    cache_root: &Path,
    repo: RepoUrl,
    default_type: SourceType,
    repo_config: &RepoConfig,
    r_version: RVersion,
) -> Result<RepoIndex, IndexFetchError> {
    let enabled = enabled_source_types();
    let fingerprint = fingerprint(&repo, &enabled);
    let cache_path = RepoIndex::cache_path(cache_root, &fingerprint);

    if let Some(index) = load_fresh_cache(&cache_path, &repo, default_type, repo_config, &fingerprint) {
        tracing::debug!(repo = %repo.name, path = %cache_path.display(), "serving package index from cache");
        return Ok(index);
    }

    let _ = std::fs::remove_file(&cache_path);

    let fetches = enabled.iter().map(|st| fetch_one(client, &repo, *st, r_version));
    let results = futures::future::join_all(fetches).await;

    let mut dbs = BTreeMap::new();
    let mut failures = 0usize;
    let mut last_err = None;
    for (source_type, result) in enabled.iter().zip(results) {
        match result {
            Ok(db) => {
                dbs.insert(*source_type, db);
            }
            Err(err) => {
                tracing::warn!(repo = %repo.name, source_type = source_type.tag(), error = %err, "package index fetch failed");
                failures += 1;
                last_err = Some(err);
            }
        }
    }

    if failures == enabled.len() {
        return Err(IndexFetchError::AllSourceTypesFailed {
            repo: repo.name.clone(),
            last: Box::new(last_err.expect("failures == enabled.len() > 0 implies a recorded error")),
        });
    }

    let index = RepoIndex {
        default_source_type: resolve_default(default_type, repo_config),
        repo,
        dbs,
        fetched_at: SystemTime::now(),
        fingerprint,
    };

    if let Err(err) = index.persist(&cache_path) {
        tracing::warn!(error = %err, path = %cache_path.display(), "failed to write package index cache");
    }

    Ok(index)
}

fn load_fresh_cache(
    path: &Path,
    repo: &RepoUrl,
    default_type: SourceType,
    repo_config: &RepoConfig,
    fingerprint: &str,
) -> Option<RepoIndex> {
    let metadata = std::fs::metadata(path).ok()?;
    let modified = metadata.modified().ok()?;
    if modified.elapsed().ok()? > CACHE_TTL {
        return None;
    }
    let bytes = std::fs::read(path).ok()?;
    let envelope: CacheEnvelope = bincode::deserialize(&bytes).ok()?;
    Some(RepoIndex {
        repo: repo.clone(),
        default_source_type: resolve_default(default_type, repo_config),
        dbs: envelope.dbs,
        fetched_at: envelope.fetched_at,
        fingerprint: fingerprint.to_string(),
    })
}

async fn fetch_one(
    client: &reqwest::Client,
    repo: &RepoUrl,
    source_type: SourceType,
    r_version: RVersion,
) -> Result<BTreeMap<String, PackageDesc>, IndexFetchError> {
    let url = base_url(repo, source_type, r_version);
    let body = if url.starts_with("http") {
        let response = client
            .get(&url)
            .send()
            .await
            .map_err(|source| IndexFetchError::Http { url: url.clone(), source })?;
        if !response.status().is_success() {
            return Err(IndexFetchError::Status { url, status: response.status() });
        }
        response
            .text()
            .await
            .map_err(|source| IndexFetchError::Http { url: url.clone(), source })?
    } else {
        match std::fs::read_to_string(&url) {
            Ok(body) => body,
            Err(source) if source.kind() == std::io::ErrorKind::NotFound => {
                return Err(IndexFetchError::NotFound(url));
            }
            Err(source) => return Err(IndexFetchError::Io { path: url, source }),
        }
    };

    let mut db = BTreeMap::new();
    for result in pkgr_desc::parse_packages_file(&body) {
        let mut desc = result.map_err(|source| IndexFetchError::Parse { url: url.clone(), source })?;
        desc.repo_origin = Some(repo.name.clone());
        db.insert(desc.name.clone(), desc);
    }
    Ok(db)
}

fn base_url(repo: &RepoUrl, source_type: SourceType, r_version: RVersion) -> String {
    let trimmed = repo.url.trim_end_matches('/');
    match source_type {
        SourceType::Source => format!("{trimmed}/src/contrib/PACKAGES"),
        SourceType::Binary => {
            let segment = HostOs::current().binary_url_segment().unwrap_or("unknown");
            format!("{trimmed}/bin/{segment}/contrib/{}/PACKAGES", r_version.major_minor())
        }
    }
}

fn enabled_source_types() -> Vec<SourceType> {
    if HostOs::current().supports_binary() {
        vec![SourceType::Source, SourceType::Binary]
    } else {
        vec![SourceType::Source]
    }
}

fn fingerprint(repo: &RepoUrl, enabled: &[SourceType]) -> String {
    let mut tags: Vec<&str> = enabled.iter().map(|st| st.tag()).collect();
    tags.sort_unstable();

    let mut hasher = Md5::new();
    hasher.update(repo.name.as_bytes());
    hasher.update(repo.url.as_bytes());
    hasher.update(tags.concat().as_bytes());
    hex::encode(hasher.finalize())
}
