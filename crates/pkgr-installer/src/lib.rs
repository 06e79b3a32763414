//! Layer-barrier install worker pool, external installer invocation, and
//! update rollback.

#![warn(clippy::all)]

mod engine;
mod error;
mod rollback;
mod types;

pub use engine::{resolve_worker_count, run};
pub use error::{InstallError, RollbackError};
pub use rollback::{commit, pre_stage, rollback};
pub use types::{CmdResult, InstallRequest, UpdateAttempt};
