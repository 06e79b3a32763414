//! Error types for configuration loading.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("reading {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("parsing {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("{path} references unset environment variable ${var}")]
    UnsetVar { path: PathBuf, var: String },

    #[error("library directory {path} does not exist and Strict is set")]
    MissingLibrary { path: PathBuf },
}

pub type Result<T> = std::result::Result<T, ConfigError>;
