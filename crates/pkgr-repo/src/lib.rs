//! Repository metadata acquisition, the on-disk fingerprinted cache, and
//! federated package name resolution.

mod error;
mod index;
mod nexus;
mod suggest;
mod types;

pub use error::{IndexFetchError, NexusError};
pub use index::{fetch, RepoIndex};
pub use nexus::{GetManyResult, Nexus, Resolved};
pub use suggest::{suggest, DEFAULT_SUGGESTION_COUNT};
pub use types::{RepoConfig, RepoUrl, SourceType};
