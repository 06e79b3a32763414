use pkgr_core::{Version, VersionConstraint};
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ResolverError {
    #[error("{package}, required by {wanted_by}, was not found in any configured repository")]
    Unresolved { package: String, wanted_by: String },

    #[error("{package} {found} does not satisfy {wanted} required by {wanted_by}")]
    ConstraintUnsatisfied {
        package: String,
        wanted_by: String,
        wanted: VersionConstraint,
        found: Version,
    },

    #[error("dependency cycle among: {}", .packages.join(", "))]
    Cycle { packages: Vec<String> },
}

/// Errors unpacking a user-supplied source tarball. All are fatal for the
/// whole run.
#[derive(Debug, Error)]
pub enum TarballError {
    #[error("reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("archive {0} is empty")]
    EmptyArchive(PathBuf),
    #[error("unpacking {path}: {source}")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("{0} has no DESCRIPTION file")]
    MissingDescription(PathBuf),
    #[error("parsing DESCRIPTION at {path}: {source}")]
    Desc {
        path: PathBuf,
        #[source]
        source: pkgr_desc::DescError,
    },
}
