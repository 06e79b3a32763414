//! Core types shared across the pkgr workspace.
//!
//! Provides version comparison, platform/base-package detection, and the
//! installer flag mapping used when shelling out to `R CMD INSTALL`.

#![warn(clippy::all)]

mod install_args;
mod platform;
mod version;

pub use install_args::InstallArgs;
pub use platform::{is_base_package, HostOs, RVersion, BASE_PACKAGES};
pub use version::{parse_constraint, Version, VersionConstraint};

pub use ahash::{AHashMap, AHashSet};
