//! `pkgr install` - resolve the install plan, fetch every artifact, and
//! run the external installer layer by layer, rolling back on failure.

use crate::context::Context;
use crate::{output, planning};
use anyhow::{Context as _, Result};
use clap::Args;
use pkgr_core::{AHashMap, AHashSet};
use pkgr_installer::InstallRequest;
use pkgr_resolver::PkgDl;
use std::process::ExitCode;
use tracing::info;

#[derive(Args, Debug)]
pub struct InstallArgs {
    /// Re-resolve packages that are already installed to a newer version.
    #[arg(long)]
    pub update: bool,
}

const TARBALL_REPO_NAME: &str = "tarballs";

pub async fn run(ctx: &Context, args: &InstallArgs) -> Result<ExitCode> {
    let update = args.update || ctx.config.update_or_default();
    let built = match planning::build(ctx, update).await {
        Ok(built) => built,
        Err(err) => {
            output::error(&format!("{err}"));
            return Ok(ExitCode::FAILURE);
        }
    };
    let plan = built.plan;
    let layers = built.layers;

    if plan.create_library {
        std::fs::create_dir_all(&ctx.library).with_context(|| format!("creating library directory {}", ctx.library.display()))?;
        info!(library = %ctx.library.display(), "created library directory");
    }

    let prior_installed: AHashSet<String> = plan.installed.keys().cloned().collect();

    let (tarball_downloads, fetched_downloads): (Vec<PkgDl>, Vec<PkgDl>) =
        plan.downloads.into_iter().partition(|pkg| pkg.repo.name == TARBALL_REPO_NAME);

    output::header(&format!("installing {} package(s)", tarball_downloads.len() + fetched_downloads.len()));

    let artifacts = pkgr_downloader::download(&ctx.client, &fetched_downloads, &ctx.cache_dir, ctx.worker_count())
        .await
        .context("downloading packages")?;

    let attempts = pkgr_installer::pre_stage(&plan.outdated, &ctx.library).context("staging backups for updated packages")?;

    let mut requests = AHashMap::new();
    for pkg in fetched_downloads.iter().chain(tarball_downloads.iter()) {
        let Some(request) = build_request(ctx, pkg, &artifacts, &plan.tarballs) else { continue };
        requests.insert(pkg.desc.name.clone(), request);
    }

    let run_result = pkgr_installer::run(&layers, &requests, ctx.worker_count()).await;

    match run_result {
        Ok(_) => {
            for attempt in &attempts {
                pkgr_installer::commit(attempt).with_context(|| format!("removing backup for {}", attempt.name))?;
            }
            output::success("install complete");
            Ok(ExitCode::SUCCESS)
        }
        Err(err) => {
            output::error(&format!("{err}"));
            output::warning("rolling back");
            pkgr_installer::rollback(&plan.roots, &prior_installed, &attempts, &ctx.library).context("rolling back failed install")?;
            Ok(ExitCode::FAILURE)
        }
    }
}

fn build_request(
    ctx: &Context,
    pkg: &PkgDl,
    artifacts: &pkgr_core::AHashMap<String, std::path::PathBuf>,
    tarball_dirs: &pkgr_core::AHashMap<String, std::path::PathBuf>,
) -> Option<InstallRequest> {
    let artifact_path = if pkg.repo.name == TARBALL_REPO_NAME {
        tarball_dirs.get(&pkg.desc.name)?.clone()
    } else {
        artifacts.get(&pkg.desc.name)?.clone()
    };

    let env = ctx
        .config
        .customizations
        .as_ref()
        .and_then(|c| c.packages.as_ref())
        .and_then(|packages| packages.get(&pkg.desc.name))
        .and_then(|custom| custom.env.clone())
        .map(|env| env.into_iter().collect())
        .unwrap_or_default();

    Some(InstallRequest {
        name: pkg.desc.name.clone(),
        artifact_path,
        library: ctx.library.clone(),
        env,
        args: pkgr_core::InstallArgs { library: ctx.library.to_string_lossy().into_owned(), ..pkgr_core::InstallArgs::default() },
        executable: ctx.r_path.clone().into(),
    })
}
