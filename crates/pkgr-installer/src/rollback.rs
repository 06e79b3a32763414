//! Pre-staging of outdated packages and restoration on failure: a
//! recursive copy-then-remove fallback keeps moves working across
//! filesystem boundaries where `rename` would fail.

use crate::error::RollbackError;
use crate::types::UpdateAttempt;
use pkgr_core::AHashSet;
use pkgr_resolver::OutdatedPackage;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

const BACKUP_PREFIX: &str = "__OLD__";

/// Rename every outdated package's installed directory to its
/// `__OLD__<pkg>` backup before install begins.
pub fn pre_stage(outdated: &[OutdatedPackage], library: &Path) -> Result<Vec<UpdateAttempt>, RollbackError> {
    let mut attempts = Vec::with_capacity(outdated.len());

    for pkg in outdated {
        let active_dir = library.join(&pkg.name);
        let backup_dir = library.join(format!("{BACKUP_PREFIX}{}", pkg.name));

        if active_dir.exists() {
            move_dir(&active_dir, &backup_dir)
                .map_err(|source| RollbackError::Stage { name: pkg.name.clone(), path: active_dir.clone(), source })?;
            debug!(name = %pkg.name, "staged backup before update");
        }

        attempts.push(UpdateAttempt {
            name: pkg.name.clone(),
            active_dir,
            backup_dir,
            old_version: pkg.old_version.clone(),
            new_version: pkg.new_version.clone(),
        });
    }

    Ok(attempts)
}

/// A package installed successfully: its backup is no longer needed.
pub fn commit(attempt: &UpdateAttempt) -> Result<(), RollbackError> {
    if attempt.backup_dir.exists() {
        std::fs::remove_dir_all(&attempt.backup_dir)
            .map_err(|source| RollbackError::Restore { name: attempt.name.clone(), path: attempt.backup_dir.clone(), source })?;
    }
    Ok(())
}

/// Roll back a failed run: remove every package created fresh during
/// this run (not in `prior_installed`), and restore any staged backup
/// whose active directory is missing or invalid. Safe to call twice.
pub fn rollback(
    plan_packages: &[String],
    prior_installed: &AHashSet<String>,
    attempts: &[UpdateAttempt],
    library: &Path,
) -> Result<(), RollbackError> {
    for name in plan_packages {
        if prior_installed.contains(name) {
            continue;
        }
        let dir = library.join(name);
        if dir.exists() {
            warn!(%name, "removing package created during failed run");
            std::fs::remove_dir_all(&dir).map_err(|source| RollbackError::Restore { name: name.clone(), path: dir, source })?;
        }
    }

    for attempt in attempts {
        let active_valid = attempt.active_dir.is_dir() && attempt.active_dir.join("DESCRIPTION").exists();
        if !active_valid && attempt.backup_dir.exists() {
            info!(name = %attempt.name, "restoring backup after failed update");
            if attempt.active_dir.exists() {
                std::fs::remove_dir_all(&attempt.active_dir)
                    .map_err(|source| RollbackError::Restore { name: attempt.name.clone(), path: attempt.active_dir.clone(), source })?;
            }
            move_dir(&attempt.backup_dir, &attempt.active_dir)
                .map_err(|source| RollbackError::Restore { name: attempt.name.clone(), path: attempt.backup_dir.clone(), source })?;
        }
    }

    Ok(())
}

/// Rename `src` to `dest`, falling back to recursive copy-then-remove
/// when the rename fails (e.g. crossing a filesystem boundary).
fn move_dir(src: &Path, dest: &Path) -> std::io::Result<()> {
    if std::fs::rename(src, dest).is_ok() {
        return Ok(());
    }
    copy_recursive(src, dest)?;
    std::fs::remove_dir_all(src)
}

fn copy_recursive(src: &Path, dest: &Path) -> std::io::Result<()> {
    std::fs::create_dir_all(dest)?;
    for entry in walkdir::WalkDir::new(src).min_depth(1) {
        let entry = entry.map_err(std::io::Error::from)?;
        let relative = entry.path().strip_prefix(src).expect("walkdir entries are under src");
        let dest_path: PathBuf = dest.join(relative);

        if entry.file_type().is_dir() {
            std::fs::create_dir_all(&dest_path)?;
        } else {
            if let Some(parent) = dest_path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::copy(entry.path(), &dest_path)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pkgr_core::AHashSet;
    use std::fs;

    fn make_pkg(library: &Path, name: &str, version_marker: &str) {
        let dir = library.join(name);
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("DESCRIPTION"), format!("Package: {name}\nVersion: {version_marker}\n")).unwrap();
    }

    #[test]
    fn pre_stage_renames_active_dir_to_backup() {
        let tmp = tempfile::tempdir().unwrap();
        make_pkg(tmp.path(), "dplyr", "1.0");
        let outdated = vec![OutdatedPackage { name: "dplyr".to_string(), old_version: "1.0".to_string(), new_version: "1.1".to_string() }];

        let attempts = pre_stage(&outdated, tmp.path()).unwrap();
        assert!(!attempts[0].active_dir.exists());
        assert!(attempts[0].backup_dir.exists());
    }

    #[test]
    fn commit_removes_backup() {
        let tmp = tempfile::tempdir().unwrap();
        make_pkg(tmp.path(), "dplyr", "1.0");
        let outdated = vec![OutdatedPackage { name: "dplyr".to_string(), old_version: "1.0".to_string(), new_version: "1.1".to_string() }];
        let attempts = pre_stage(&outdated, tmp.path()).unwrap();
        make_pkg(tmp.path(), "dplyr", "1.1");

        commit(&attempts[0]).unwrap();
        assert!(!attempts[0].backup_dir.exists());
        assert!(attempts[0].active_dir.exists());
    }

    #[test]
    fn rollback_restores_backup_when_active_missing() {
        let tmp = tempfile::tempdir().unwrap();
        make_pkg(tmp.path(), "dplyr", "1.0");
        let outdated = vec![OutdatedPackage { name: "dplyr".to_string(), old_version: "1.0".to_string(), new_version: "1.1".to_string() }];
        let attempts = pre_stage(&outdated, tmp.path()).unwrap();

        let prior: AHashSet<String> = ["dplyr".to_string()].into_iter().collect();
        rollback(&["dplyr".to_string()], &prior, &attempts, tmp.path()).unwrap();

        assert!(tmp.path().join("dplyr").exists());
        assert!(!attempts[0].backup_dir.exists());
    }

    #[test]
    fn rollback_removes_freshly_created_package_not_in_prior_snapshot() {
        let tmp = tempfile::tempdir().unwrap();
        make_pkg(tmp.path(), "newpkg", "1.0");
        let prior = AHashSet::new();

        rollback(&["newpkg".to_string()], &prior, &[], tmp.path()).unwrap();
        assert!(!tmp.path().join("newpkg").exists());
    }

    #[test]
    fn rollback_is_idempotent() {
        let tmp = tempfile::tempdir().unwrap();
        make_pkg(tmp.path(), "dplyr", "1.0");
        let outdated = vec![OutdatedPackage { name: "dplyr".to_string(), old_version: "1.0".to_string(), new_version: "1.1".to_string() }];
        let attempts = pre_stage(&outdated, tmp.path()).unwrap();
        let prior: AHashSet<String> = ["dplyr".to_string()].into_iter().collect();

        rollback(&["dplyr".to_string()], &prior, &attempts, tmp.path()).unwrap();
        rollback(&["dplyr".to_string()], &prior, &attempts, tmp.path()).unwrap();
        assert!(tmp.path().join("dplyr").exists());
    }
}
