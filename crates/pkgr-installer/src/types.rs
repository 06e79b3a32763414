use pkgr_core::{AHashMap, InstallArgs};
use std::path::PathBuf;

/// One package ready to be handed to the external installer: its
/// artifact on disk, the target library, and the env/flag overlay.
#[derive(Debug, Clone)]
pub struct InstallRequest {
    pub name: String,
    pub artifact_path: PathBuf,
    pub library: PathBuf,
    pub env: AHashMap<String, String>,
    pub args: InstallArgs,
    pub executable: PathBuf,
}

/// Captured output of one installer invocation.
#[derive(Debug, Clone)]
pub struct CmdResult {
    pub stdout: String,
    pub stderr: String,
    pub exit_code: i32,
    pub success: bool,
}

/// A pre-staged backup of a package being updated, retained until the
/// install either succeeds (backup removed) or fails (backup restored).
#[derive(Debug, Clone)]
pub struct UpdateAttempt {
    pub name: String,
    pub active_dir: PathBuf,
    pub backup_dir: PathBuf,
    pub old_version: String,
    pub new_version: String,
}
