//! Typed configuration record. Every optional key is `Option<T>` so
//! "set in the YAML file" is distinguishable from "defaulted", rather
//! than walking a dynamic YAML tree.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One `{name: url}` entry from the `Repos` list.
pub type RepoEntry = BTreeMap<String, String>;

/// `source` | `binary`, as written under `Customizations`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfigSourceType {
    Source,
    Binary,
}

/// `Lockfile.Type`: affects default library path derivation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LockfileType {
    Pkgr,
    Packrat,
    Renv,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct LockfileConfig {
    #[serde(rename = "Type")]
    pub kind: Option<LockfileType>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct LoggingConfig {
    pub all: Option<String>,
    pub install: Option<String>,
    pub overwrite: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct RepoCustomization {
    #[serde(rename = "Type")]
    pub kind: Option<ConfigSourceType>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct PackageCustomization {
    pub env: Option<BTreeMap<String, String>>,
    pub suggests: Option<bool>,
    pub repo: Option<String>,
    #[serde(rename = "Type")]
    pub kind: Option<ConfigSourceType>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct CustomizationsConfig {
    pub repos: Option<BTreeMap<String, RepoCustomization>>,
    pub packages: Option<BTreeMap<String, PackageCustomization>>,
}

/// The full `pkgr.yml` document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct Config {
    pub version: Option<i64>,
    pub r_path: Option<String>,
    pub library: Option<String>,
    pub cache: Option<String>,
    pub threads: Option<i64>,
    pub strict: Option<bool>,
    pub update: Option<bool>,
    pub rollback: Option<bool>,
    pub suggests: Option<bool>,
    pub repos: Option<Vec<RepoEntry>>,
    pub packages: Option<Vec<String>>,
    pub tarballs: Option<Vec<String>>,
    pub lockfile: Option<LockfileConfig>,
    pub logging: Option<LoggingConfig>,
    pub customizations: Option<CustomizationsConfig>,
}

impl Config {
    #[must_use]
    pub fn r_path_or_default(&self) -> String {
        self.r_path.clone().unwrap_or_else(|| "R".to_string())
    }

    #[must_use]
    pub fn threads_or_default(&self) -> i64 {
        self.threads.unwrap_or(0)
    }

    #[must_use]
    pub fn strict_or_default(&self) -> bool {
        self.strict.unwrap_or(false)
    }

    #[must_use]
    pub fn update_or_default(&self) -> bool {
        self.update.unwrap_or(false)
    }

    #[must_use]
    pub fn rollback_or_default(&self) -> bool {
        self.rollback.unwrap_or(true)
    }

    #[must_use]
    pub fn suggests_or_default(&self) -> bool {
        self.suggests.unwrap_or(false)
    }

    #[must_use]
    pub fn repo_entries(&self) -> Vec<(String, String)> {
        self.repos
            .iter()
            .flatten()
            .filter_map(|entry| entry.iter().next().map(|(name, url)| (name.clone(), url.clone())))
            .collect()
    }
}
