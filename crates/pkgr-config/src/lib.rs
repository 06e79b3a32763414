//! YAML configuration loading: `$VAR` expansion, `PKGR_*` env overrides,
//! tilde expansion, and `Lockfile.Type`-aware library path derivation.

#![warn(clippy::all)]

mod env;
mod error;
mod loader;
mod types;
mod validate;

pub use env::{apply_env_overrides, expand_vars};
pub use error::{ConfigError, Result};
pub use loader::{effective_library, expand_tilde, load};
pub use types::{
    Config, ConfigSourceType, CustomizationsConfig, LockfileConfig, LockfileType, LoggingConfig,
    PackageCustomization, RepoCustomization, RepoEntry,
};
pub use validate::check_library;
