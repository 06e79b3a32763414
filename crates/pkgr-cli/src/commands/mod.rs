//! CLI surface: `plan`, `install`, `add`, `remove`.

pub mod add;
pub mod install;
pub mod plan;
pub mod remove;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// pkgr - a CRAN-like R package installer.
#[derive(Parser, Debug)]
#[command(name = "pkgr")]
#[command(author = "pkgr-rs Contributors")]
#[command(version)]
#[command(about = "Resolve and install R packages from a pkgr.yml manifest", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to the configuration file.
    #[arg(short = 'c', long, global = true, env = "PKGR_CONFIG_FILE", default_value = "pkgr.yml")]
    pub config: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv).
    #[arg(short = 'v', long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress all but error-level logging.
    #[arg(short = 'q', long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Compute and print the install plan without downloading or installing anything.
    Plan(plan::PlanArgs),

    /// Compute the install plan and execute it.
    Install(install::InstallArgs),

    /// Add a package to the `Packages:` list in the configuration file.
    Add(add::AddArgs),

    /// Remove a package from the `Packages:` list in the configuration file.
    Remove(remove::RemoveArgs),
}
