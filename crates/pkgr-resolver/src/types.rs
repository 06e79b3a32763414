use ahash::AHashMap;
use pkgr_desc::PackageDesc;
use pkgr_repo::{RepoUrl, SourceType};
use std::path::PathBuf;

/// One package selected for download: its metadata plus where it came
/// from. `cache_path` is filled in by the downloader once fetched.
#[derive(Debug, Clone)]
pub struct PkgDl {
    pub desc: PackageDesc,
    pub repo: RepoUrl,
    pub source_type: SourceType,
    pub cache_path: Option<PathBuf>,
}

/// A package whose installed version is older than the resolved target
/// and is being replaced because `update` was requested.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutdatedPackage {
    pub name: String,
    pub old_version: String,
    pub new_version: String,
}

/// The full result of dependency resolution: what to install, in what
/// order, and what it replaces.
#[derive(Debug, Clone)]
pub struct InstallPlan {
    pub roots: Vec<String>,
    pub dep_db: AHashMap<String, Vec<String>>,
    pub downloads: Vec<PkgDl>,
    pub outdated: Vec<OutdatedPackage>,
    pub installed: AHashMap<String, String>,
    pub tarballs: AHashMap<String, PathBuf>,
    pub create_library: bool,
    pub update: bool,
}

/// An ordered sequence of disjoint layers: every dependency edge points
/// from a later layer back to an earlier one, so each layer is safe to
/// install concurrently once every earlier layer has completed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InstallLayers(pub Vec<Vec<String>>);

impl InstallLayers {
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Vec<String>> {
        self.0.iter()
    }
}

/// Per-package dependency-edge policy: which DESCRIPTION fields count as
/// install-time edges.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DepPolicy {
    pub depends: bool,
    pub imports: bool,
    pub linking_to: bool,
    pub suggests: bool,
}

impl Default for DepPolicy {
    /// `depends`+`imports`+`linkingTo` on, `suggests` off. Recommended
    /// packages have no distinct edge kind in this parser's data model, so
    /// they are always folded into `imports`-equivalent treatment.
    fn default() -> Self {
        Self { depends: true, imports: true, linking_to: true, suggests: false }
    }
}

/// Default edge policy plus per-package overrides.
#[derive(Debug, Clone, Default)]
pub struct DepPolicyTable {
    pub default: DepPolicy,
    pub overrides: AHashMap<String, DepPolicy>,
}

impl DepPolicyTable {
    #[must_use]
    pub fn policy_for(&self, name: &str) -> DepPolicy {
        self.overrides.get(name).copied().unwrap_or(self.default)
    }
}
