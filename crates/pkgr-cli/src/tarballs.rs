//! Unpacks every configured `Tarballals` entry into a synthetic
//! single-repo [`RepoIndex`] so the resolver can treat them as ordinary
//! roots, and keeps the unpacked directory for each so the install step
//! can hand it straight to the external installer.

use anyhow::{Context, Result};
use pkgr_core::AHashMap;
use pkgr_repo::{RepoIndex, RepoUrl, SourceType};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

pub struct TarballRoots {
    pub names: Vec<String>,
    pub index: RepoIndex,
    pub dirs: AHashMap<String, PathBuf>,
}

pub fn ingest_all(paths: &[String], cache_dir: &Path) -> Result<TarballRoots> {
    let mut packages = BTreeMap::new();
    let mut names = Vec::with_capacity(paths.len());
    let mut dirs = AHashMap::new();

    for raw in paths {
        let archive_path = pkgr_config::expand_tilde(raw);
        let ingested = pkgr_resolver::ingest(&archive_path, cache_dir)
            .with_context(|| format!("unpacking tarball {}", archive_path.display()))?;
        names.push(ingested.name.clone());
        dirs.insert(ingested.name.clone(), ingested.dir.clone());
        packages.insert(ingested.name.clone(), ingested.desc.clone());
    }

    let repo = RepoUrl { name: "tarballs".to_string(), url: String::new() };
    let index = RepoIndex::from_packages(repo, SourceType::Source, packages);
    Ok(TarballRoots { names, index, dirs })
}
