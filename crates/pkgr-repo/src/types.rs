use serde::{Deserialize, Serialize};

/// A repository location: either an http(s) URL or a filesystem path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepoUrl {
    pub name: String,
    pub url: String,
}

/// Whether a package artifact is a source tarball or a prebuilt binary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum SourceType {
    Source,
    Binary,
}

impl SourceType {
    #[must_use]
    pub const fn tag(self) -> &'static str {
        match self {
            Self::Source => "source",
            Self::Binary => "binary",
        }
    }

    /// The other member of the pair, used when falling back within a repo.
    #[must_use]
    pub const fn other(self) -> Self {
        match self {
            Self::Source => Self::Binary,
            Self::Binary => Self::Source,
        }
    }
}

/// Per-repository source-type preference. `None` defers to the caller's
/// global default.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RepoConfig {
    pub default_source_type: Option<SourceType>,
}

pub(crate) fn resolve_default(global_default: SourceType, repo_config: &RepoConfig) -> SourceType {
    repo_config.default_source_type.unwrap_or(global_default)
}
