//! Wires a loaded [`pkgr_config::Config`] into everything the `plan`/
//! `install`/`add`/`remove` commands need: the R runtime probe, the
//! federated [`Nexus`], and the resolved library/cache directories.

use anyhow::{Context as _, Result};
use pkgr_config::Config;
use pkgr_core::{HostOs, RVersion};
use pkgr_repo::{Nexus, RepoConfig, RepoUrl, SourceType};
use pkgr_resolver::{DepPolicy, DepPolicyTable};
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::{debug, warn};

pub struct NexusBuild {
    pub nexus: Nexus,
    pub tarball_roots: Vec<String>,
    pub tarball_dirs: pkgr_core::AHashMap<String, PathBuf>,
}

pub struct Context {
    pub config: Config,
    pub client: reqwest::Client,
    pub r_path: String,
    pub r_version: RVersion,
    pub platform: String,
    pub library: PathBuf,
    pub cache_dir: PathBuf,
}

impl Context {
    pub fn load(config_path: &Path) -> Result<Self> {
        let config = pkgr_config::load(config_path)
            .with_context(|| format!("loading configuration from {}", config_path.display()))?;

        let r_path = config.r_path_or_default();
        let r_version = probe_r_version(&r_path).unwrap_or_else(|err| {
            warn!(%err, r_path, "could not probe R version, assuming 4.0.0");
            RVersion::new(4, 0, 0)
        });
        let platform = probe_r_platform(&r_path).unwrap_or_else(|| {
            warn!(r_path, "could not probe R platform, falling back to target triple");
            default_platform_segment()
        });

        let library = pkgr_config::effective_library(&config, &platform, &r_version);
        let cache_dir = config
            .cache
            .as_ref()
            .map(|raw| pkgr_config::expand_tilde(raw))
            .unwrap_or_else(default_cache_dir);

        let client = reqwest::Client::builder().build().context("building HTTP client")?;

        Ok(Self { config, client, r_path, r_version, platform, library, cache_dir })
    }

    /// Build the name-resolution federation for every configured repo,
    /// plus a synthetic repo for any `Tarballals` entries, applying
    /// `Customizations.Repos`/`Customizations.Packages` overrides.
    pub async fn build_nexus(&self) -> Result<NexusBuild> {
        let default_source_type =
            if HostOs::current().supports_binary() { SourceType::Binary } else { SourceType::Source };

        let repo_customizations = self.config.customizations.as_ref().and_then(|c| c.repos.as_ref());

        let mut indices = Vec::new();
        for (name, url) in self.config.repo_entries() {
            let repo_config = repo_customizations
                .and_then(|repos| repos.get(&name))
                .and_then(|custom| custom.kind)
                .map_or(RepoConfig::default(), |kind| RepoConfig {
                    default_source_type: Some(source_type_from_config(kind)),
                });

            let repo = RepoUrl { name: name.clone(), url: pkgr_config::expand_tilde(&url).to_string_lossy().into_owned() };
            let index = pkgr_repo::fetch(&self.client, &self.cache_dir, repo, default_source_type, &repo_config, self.r_version)
                .await
                .with_context(|| format!("fetching package index for repository {name}"))?;
            indices.push(index);
        }

        let mut tarball_roots = Vec::new();
        let mut tarball_dirs = pkgr_core::AHashMap::default();
        if let Some(tarballs) = self.config.tarballs.as_ref().filter(|t| !t.is_empty()) {
            let ingested = crate::tarballs::ingest_all(tarballs, &self.cache_dir)?;
            tarball_roots = ingested.names;
            tarball_dirs = ingested.dirs;
            indices.push(ingested.index);
        }

        let mut nexus = Nexus::new(indices, default_source_type);

        if let Some(packages) = self.config.customizations.as_ref().and_then(|c| c.packages.as_ref()) {
            for (name, custom) in packages {
                if let Some(repo) = &custom.repo {
                    nexus.set_package_repo(name, repo).with_context(|| format!("Customizations.Packages.{name}.Repo"))?;
                }
                if let Some(kind) = custom.kind {
                    nexus.set_package_type(name, source_type_from_config(kind));
                }
            }
        }

        Ok(NexusBuild { nexus, tarball_roots, tarball_dirs })
    }

    /// Per-package dependency-edge policy derived from `Suggests` and
    /// `Customizations.Packages.*.Suggests`.
    pub fn build_policy(&self) -> DepPolicyTable {
        let mut table =
            DepPolicyTable { default: DepPolicy { suggests: self.config.suggests_or_default(), ..DepPolicy::default() }, ..Default::default() };

        if let Some(packages) = self.config.customizations.as_ref().and_then(|c| c.packages.as_ref()) {
            for (name, custom) in packages {
                if let Some(suggests) = custom.suggests {
                    table.overrides.insert(name.clone(), DepPolicy { suggests, ..table.default });
                }
            }
        }

        table
    }

    pub fn worker_count(&self) -> usize {
        pkgr_installer::resolve_worker_count(self.config.threads_or_default(), num_cpus::get())
    }
}

fn source_type_from_config(kind: pkgr_config::ConfigSourceType) -> SourceType {
    match kind {
        pkgr_config::ConfigSourceType::Source => SourceType::Source,
        pkgr_config::ConfigSourceType::Binary => SourceType::Binary,
    }
}

/// Run `<r_path> --version` and parse the banner. Mirrors the original
/// source's `rcmd.GetRVersion`, which shells out to the configured R
/// binary rather than trusting a bundled version table.
fn probe_r_version(r_path: &str) -> Result<RVersion> {
    let output = Command::new(r_path).arg("--version").output().with_context(|| format!("running {r_path} --version"))?;
    let banner = String::from_utf8_lossy(&output.stdout);
    RVersion::parse(&banner).ok_or_else(|| anyhow::anyhow!("could not parse R version banner: {banner}"))
}

/// Run `<r_path> --vanilla --slave -e 'cat(R.version$platform)'` to get
/// R's own platform string (e.g. `x86_64-pc-linux-gnu`), which packrat/
/// renv library paths key on and which can differ from Rust's target
/// triple (notably on Windows).
fn probe_r_platform(r_path: &str) -> Option<String> {
    let output =
        Command::new(r_path).args(["--vanilla", "--slave", "-e", "cat(R.version$platform)"]).output().ok()?;
    let platform = String::from_utf8_lossy(&output.stdout).trim().to_string();
    if platform.is_empty() {
        None
    } else {
        debug!(platform, "probed R platform");
        Some(platform)
    }
}

fn default_platform_segment() -> String {
    match HostOs::current() {
        HostOs::MacOs => "x86_64-apple-darwin".to_string(),
        HostOs::Windows => "x86_64-w64-mingw32".to_string(),
        HostOs::Linux | HostOs::Other => "x86_64-pc-linux-gnu".to_string(),
    }
}

fn default_cache_dir() -> PathBuf {
    directories::BaseDirs::new().map(|dirs| dirs.cache_dir().join("pkgr")).unwrap_or_else(|| PathBuf::from(".pkgr-cache"))
}
