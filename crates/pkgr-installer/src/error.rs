//! Error types for the install engine and rollback machinery.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum InstallError {
    #[error("spawning installer for {name}: {source}")]
    Spawn {
        name: String,
        #[source]
        source: std::io::Error,
    },

    #[error("installing {name}: installer exited with status {exit_code}")]
    NonZeroExit { name: String, exit_code: i32, stderr: String },

    #[error("{failed} of {total} packages failed to install: {names:?}")]
    Composite { failed: usize, total: usize, names: Vec<String> },
}

#[derive(Error, Debug)]
pub enum RollbackError {
    #[error("staging backup for {name} at {path}: {source}")]
    Stage {
        name: String,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("restoring backup for {name} at {path}: {source}")]
    Restore {
        name: String,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
