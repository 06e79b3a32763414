//! Transitive dependency resolution, layered install scheduling, and
//! source-tarball ingestion.

mod error;
mod resolver;
mod tarball;
mod types;

pub use error::{ResolverError, TarballError};
pub use resolver::resolve;
pub use tarball::{ingest, IngestedTarball};
pub use types::{DepPolicy, DepPolicyTable, InstallLayers, InstallPlan, OutdatedPackage, PkgDl};
