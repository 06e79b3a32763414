//! Shared plan construction used by both `plan` and `install`: build the
//! federation, scan the library, and run the resolver.

use crate::context::Context;
use crate::library::scan_installed;
use anyhow::Result;
use pkgr_core::AHashMap;
use pkgr_resolver::{InstallLayers, InstallPlan, ResolverError};

pub struct Plan {
    pub plan: InstallPlan,
    pub layers: InstallLayers,
    pub tarball_dirs: AHashMap<String, std::path::PathBuf>,
}

pub async fn build(ctx: &Context, update: bool) -> Result<Plan> {
    let nexus_build = ctx.build_nexus().await?;

    let mut roots = ctx.config.packages.clone().unwrap_or_default();
    roots.extend(nexus_build.tarball_roots.iter().cloned());

    let installed = scan_installed(&ctx.library);
    let policy = ctx.build_policy();

    let resolved =
        pkgr_resolver::resolve(&roots, &nexus_build.nexus, &policy, &installed, update, &pkgr_core::AHashSet::default());

    let (mut plan, layers) = match resolved {
        Ok(result) => result,
        Err(err) => return Err(anyhow::anyhow!(explain(&err, &nexus_build.nexus))),
    };

    plan.tarballs = nexus_build.tarball_dirs.clone();
    plan.create_library = !ctx.library.is_dir();

    Ok(Plan { plan, layers, tarball_dirs: nexus_build.tarball_dirs })
}

/// Render a [`ResolverError`] with a fuzzy "did you mean" suggestion for
/// unresolved names, using [`pkgr_repo::Nexus::suggest`].
fn explain(err: &ResolverError, nexus: &pkgr_repo::Nexus) -> String {
    let ResolverError::Unresolved { package, .. } = err else {
        return err.to_string();
    };

    let suggestions = nexus.suggest(package);
    if suggestions.is_empty() {
        err.to_string()
    } else {
        format!("{err} (did you mean: {}?)", suggestions.join(", "))
    }
}
