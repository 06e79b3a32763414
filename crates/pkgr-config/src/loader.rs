//! Loads a `pkgr.yml` file: `$VAR` expansion, YAML parse, `PKGR_*`
//! overlay, then tilde/library-path resolution.

use crate::env::{apply_env_overrides, expand_vars};
use crate::error::{ConfigError, Result};
use crate::types::{Config, LockfileType};
use pkgr_core::RVersion;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Load and fully resolve a config file at `path`.
pub fn load(path: &Path) -> Result<Config> {
    let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read { path: path.to_path_buf(), source })?;
    let expanded = expand_vars(&raw, path)?;
    let mut config: Config =
        serde_yaml::from_str(&expanded).map_err(|source| ConfigError::Parse { path: path.to_path_buf(), source })?;
    apply_env_overrides(&mut config);
    debug!(path = %path.display(), "loaded configuration");
    Ok(config)
}

/// Expand a leading `~` to the user's home directory.
#[must_use]
pub fn expand_tilde(raw: &str) -> PathBuf {
    if let Some(rest) = raw.strip_prefix('~') {
        if let Some(base_dirs) = directories::BaseDirs::new() {
            let rest = rest.trim_start_matches(['/', '\\']);
            return base_dirs.home_dir().join(rest);
        }
    }
    PathBuf::from(raw)
}

/// Resolve the effective library directory, deriving it from
/// `Lockfile.Type` when the config doesn't set `Library` explicitly.
///
/// `packrat`: `packrat/lib/<platform>/<full r version>`. `renv`:
/// `renv/library/R-<major.minor>/<platform>`. `pkgr`/unset: the
/// configured `Library` as-is (mirrors `configlib/config.go::getLibraryPath`).
#[must_use]
pub fn effective_library(config: &Config, platform_segment: &str, r_version: &RVersion) -> PathBuf {
    if let Some(library) = &config.library {
        return expand_tilde(library);
    }

    match config.lockfile.as_ref().and_then(|l| l.kind) {
        Some(LockfileType::Packrat) => PathBuf::from("packrat").join("lib").join(platform_segment).join(r_version.to_string()),
        Some(LockfileType::Renv) => {
            PathBuf::from("renv").join("library").join(format!("R-{}", r_version.major_minor())).join(platform_segment)
        }
        Some(LockfileType::Pkgr) | None => PathBuf::from("library"),
    }
}
