//! `pkgr remove` - drop a package from the `Packages:` list in place.

use crate::output;
use crate::pkg_edit;
use anyhow::{Context, Result};
use clap::Args;
use std::process::ExitCode;

#[derive(Args, Debug)]
pub struct RemoveArgs {
    /// Name of the package to remove.
    pub name: String,
}

pub fn run(config_path: &std::path::Path, args: &RemoveArgs) -> Result<ExitCode> {
    let raw = std::fs::read_to_string(config_path)
        .with_context(|| format!("reading configuration from {}", config_path.display()))?;

    let updated = pkg_edit::remove_package(&raw, &args.name);
    if updated == raw {
        output::info(&format!("{} is not listed", args.name));
        return Ok(ExitCode::SUCCESS);
    }

    std::fs::write(config_path, updated)
        .with_context(|| format!("writing configuration to {}", config_path.display()))?;
    output::success(&format!("removed {}", args.name));
    Ok(ExitCode::SUCCESS)
}
