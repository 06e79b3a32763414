//! `pkgr add` - append a package to the `Packages:` list in place.

use crate::output;
use crate::pkg_edit;
use anyhow::{Context, Result};
use clap::Args;
use std::process::ExitCode;

#[derive(Args, Debug)]
pub struct AddArgs {
    /// Name of the package to add.
    pub name: String,
}

pub fn run(config_path: &std::path::Path, args: &AddArgs) -> Result<ExitCode> {
    let raw = std::fs::read_to_string(config_path)
        .with_context(|| format!("reading configuration from {}", config_path.display()))?;

    let updated = pkg_edit::add_package(&raw, &args.name);
    if updated == raw {
        output::info(&format!("{} is already listed", args.name));
        return Ok(ExitCode::SUCCESS);
    }

    std::fs::write(config_path, updated)
        .with_context(|| format!("writing configuration to {}", config_path.display()))?;
    output::success(&format!("added {}", args.name));
    Ok(ExitCode::SUCCESS)
}
