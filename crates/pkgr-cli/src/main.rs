//! pkgr: resolve and install R packages from a `pkgr.yml` manifest.

mod commands;
mod context;
mod library;
mod output;
mod pkg_edit;
mod planning;
mod tarballs;

use clap::Parser;
use commands::{Cli, Commands};
use context::Context;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);

    match run(&cli).await {
        Ok(code) => code,
        Err(err) => {
            output::error(&format!("{err:#}"));
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: &Cli) -> anyhow::Result<ExitCode> {
    match &cli.command {
        Commands::Add(args) => commands::add::run(&cli.config, args),
        Commands::Remove(args) => commands::remove::run(&cli.config, args),
        Commands::Plan(args) => {
            let ctx = Context::load(&cli.config)?;
            commands::plan::run(&ctx, args).await
        }
        Commands::Install(args) => {
            let ctx = Context::load(&cli.config)?;
            commands::install::run(&ctx, args).await
        }
    }
}

fn init_logging(verbose: u8, quiet: bool) {
    let default_directive = if quiet {
        "error"
    } else {
        match verbose {
            0 => "warn,pkgr=info",
            1 => "info,pkgr=debug",
            _ => "debug",
        }
    };

    let filter = EnvFilter::try_from_env("PKGR_LOG").unwrap_or_else(|_| EnvFilter::new(default_directive));
    tracing_subscriber::fmt().with_env_filter(filter).with_target(false).without_time().init();
}
