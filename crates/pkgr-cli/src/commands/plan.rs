//! `pkgr plan` - resolve the install plan and print it without touching
//! the network or the filesystem beyond the repo indices already cached.

use crate::context::Context;
use crate::{output, planning};
use anyhow::Result;
use clap::Args;
use std::process::ExitCode;

#[derive(Args, Debug)]
pub struct PlanArgs {
    /// Also print the resolved dependency edges for every package.
    #[arg(long)]
    pub show_deps: bool,
}

pub async fn run(ctx: &Context, args: &PlanArgs) -> Result<ExitCode> {
    let update = ctx.config.update_or_default();
    let built = match planning::build(ctx, update).await {
        Ok(built) => built,
        Err(err) => {
            output::error(&format!("{err}"));
            return Ok(ExitCode::FAILURE);
        }
    };
    let plan = &built.plan;

    output::header(&format!("plan for {} root package(s)", plan.roots.len()));

    if plan.downloads.is_empty() {
        output::info("nothing to install, all requested packages are already satisfied");
    } else {
        for pkg in &plan.downloads {
            output::package_line(&pkg.desc.name, &pkg.desc.version, pkg.source_type.tag(), &pkg.repo.name);
        }
    }

    if !plan.outdated.is_empty() {
        output::info(&format!("{} package(s) will be updated:", plan.outdated.len()));
        for outdated in &plan.outdated {
            println!("  {} {} -> {}", outdated.name, outdated.old_version, outdated.new_version);
        }
    }

    output::info(&format!("{} install layer(s), {} worker(s)", built.layers.len(), ctx.worker_count()));

    if args.show_deps {
        output::header("dependency edges");
        for (name, deps) in &plan.dep_db {
            println!("  {name}: {}", deps.join(", "));
        }
    }

    output::success("plan is valid");
    Ok(ExitCode::SUCCESS)
}
