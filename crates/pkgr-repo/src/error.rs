use thiserror::Error;

/// Errors produced while acquiring or decoding a repository's package index.
#[derive(Debug, Error)]
pub enum IndexFetchError {
    #[error("fetching {url}: {source}")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("fetching {url}: server responded {status}")]
    Status { url: String, status: reqwest::StatusCode },
    #[error("reading package file at {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("no package file found at {0}")]
    NotFound(String),
    #[error("parsing PACKAGES body from {url}: {source}")]
    Parse {
        url: String,
        #[source]
        source: pkgr_desc::DescError,
    },
    #[error("all enabled source types failed for repository {repo}: {last}")]
    AllSourceTypesFailed { repo: String, last: Box<IndexFetchError> },
    #[error("decoding cached index at {path}: {source}")]
    CacheDecode {
        path: String,
        #[source]
        source: bincode::Error,
    },
}

/// Errors from [`crate::Nexus`] name resolution.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum NexusError {
    #[error("package {0} not found in any configured repository")]
    NotFound(String),
    #[error("unknown repository {0}")]
    UnknownRepo(String),
}
