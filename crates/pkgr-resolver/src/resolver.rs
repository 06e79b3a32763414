//! Transitive dependency resolution over a [`Nexus`] federation: breadth-
//! first closure plus layered topological scheduling (no SAT solving — R's
//! dependency graphs are simple name/version-constraint DAGs, not a
//! multi-constraint version-range satisfiability problem).

use crate::error::ResolverError;
use crate::types::{DepPolicyTable, InstallLayers, InstallPlan, OutdatedPackage, PkgDl};
use ahash::{AHashMap, AHashSet};
use pkgr_core::{is_base_package, Version};
use pkgr_desc::{DepSpec, PackageDesc};
use pkgr_repo::{Nexus, Resolved};
use std::collections::VecDeque;

/// Resolve `roots` (plus any tarball-derived extra roots) against `nexus`
/// into an [`InstallPlan`] and its layered schedule.
///
/// `installed` is a snapshot of `name -> version` already present in the
/// target library. `suggests_roots` names roots that opted into pulling in
/// their `Suggests` edges.
pub fn resolve(
    roots: &[String],
    nexus: &Nexus,
    policy: &DepPolicyTable,
    installed: &AHashMap<String, String>,
    update: bool,
    suggests_roots: &AHashSet<String>,
) -> Result<(InstallPlan, InstallLayers), ResolverError> {
    let filtered_roots: Vec<String> = roots.iter().filter(|name| !is_base_package(name)).cloned().collect();

    let mut cache: AHashMap<String, Resolved> = AHashMap::new();
    let mut queue: VecDeque<String> = filtered_roots.iter().cloned().collect();
    let mut seen: AHashSet<String> = filtered_roots.iter().cloned().collect();
    let mut dep_db: AHashMap<String, Vec<String>> = AHashMap::new();
    let mut downloads: Vec<PkgDl> = Vec::new();
    let mut outdated: Vec<OutdatedPackage> = Vec::new();

    while let Some(name) = queue.pop_front() {
        if dep_db.contains_key(&name) {
            continue;
        }

        let resolved = resolve_cached(&name, nexus, &mut cache)?.clone();

        if let Some(installed_version) = installed.get(&name) {
            let installed_ver = Version::parse(installed_version);
            let target_ver = Version::parse(&resolved.desc.version);
            if target_ver > installed_ver {
                if update {
                    outdated.push(OutdatedPackage {
                        name: name.clone(),
                        old_version: installed_version.clone(),
                        new_version: resolved.desc.version.clone(),
                    });
                    downloads.push(to_pkg_dl(&resolved));
                }
                // else: a newer version exists but update=false, leave the
                // installed copy in place and record the edge only.
            }
            // target_ver <= installed_ver: already installed and satisfying.
        } else {
            downloads.push(to_pkg_dl(&resolved));
        }

        let pol = policy.policy_for(&name);
        let include_suggests = pol.suggests || suggests_roots.contains(&name);
        let edges = collect_edges(&resolved.desc, pol, include_suggests);

        let mut dep_names = Vec::with_capacity(edges.len());
        for edge in &edges {
            if is_base_package(&edge.name) {
                continue;
            }

            let edge_resolved = resolve_cached(&edge.name, nexus, &mut cache).map_err(|_| ResolverError::Unresolved {
                package: edge.name.clone(),
                wanted_by: name.clone(),
            })?;
            let edge_version = Version::parse(&edge_resolved.desc.version);
            if !edge.constraint.satisfied_by(&edge_version) {
                return Err(ResolverError::ConstraintUnsatisfied {
                    package: edge.name.clone(),
                    wanted_by: name.clone(),
                    wanted: edge.constraint.clone(),
                    found: edge_version,
                });
            }

            dep_names.push(edge.name.clone());
            if seen.insert(edge.name.clone()) {
                queue.push_back(edge.name.clone());
            }
        }

        dep_db.insert(name, dep_names);
    }

    let plan = InstallPlan {
        roots: filtered_roots,
        dep_db,
        downloads,
        outdated,
        installed: installed.clone(),
        tarballs: AHashMap::new(),
        create_library: false,
        update,
    };

    let layers = build_layers(&plan)?;
    Ok((plan, layers))
}

fn resolve_cached<'a>(
    name: &str,
    nexus: &Nexus,
    cache: &'a mut AHashMap<String, Resolved>,
) -> Result<&'a Resolved, ResolverError> {
    if !cache.contains_key(name) {
        let resolved = nexus.resolve(name).map_err(|_| ResolverError::Unresolved {
            package: name.to_string(),
            wanted_by: String::new(),
        })?;
        cache.insert(name.to_string(), resolved);
    }
    Ok(cache.get(name).expect("just inserted"))
}

fn to_pkg_dl(resolved: &Resolved) -> PkgDl {
    PkgDl {
        desc: resolved.desc.clone(),
        repo: resolved.repo.clone(),
        source_type: resolved.source_type,
        cache_path: None,
    }
}

fn collect_edges(desc: &PackageDesc, policy: crate::types::DepPolicy, include_suggests: bool) -> Vec<DepSpec> {
    let mut edges = Vec::new();
    if policy.depends {
        edges.extend(desc.depends.iter().cloned());
    }
    if policy.imports {
        edges.extend(desc.imports.iter().cloned());
    }
    if policy.linking_to {
        edges.extend(desc.linking_to.iter().cloned());
    }
    if include_suggests {
        edges.extend(desc.suggests.iter().cloned());
    }
    edges
}

/// Repeatedly extract the set of packages in `plan.downloads` whose
/// unresolved deps are all already installed-and-satisfying or in an
/// earlier layer. A nonempty residual after no layer can be extracted is
/// a cycle.
fn build_layers(plan: &InstallPlan) -> Result<InstallLayers, ResolverError> {
    let mut remaining: AHashSet<String> = plan.downloads.iter().map(|d| d.desc.name.clone()).collect();
    let mut layers: Vec<Vec<String>> = Vec::new();

    while !remaining.is_empty() {
        let mut layer: Vec<String> = remaining
            .iter()
            .filter(|name| {
                plan.dep_db
                    .get(*name)
                    .is_none_or(|deps| deps.iter().all(|dep| !remaining.contains(dep)))
            })
            .cloned()
            .collect();

        if layer.is_empty() {
            let mut residual: Vec<String> = remaining.into_iter().collect();
            residual.sort_unstable();
            return Err(ResolverError::Cycle { packages: residual });
        }

        layer.sort_unstable();
        for name in &layer {
            remaining.remove(name);
        }
        layers.push(layer);
    }

    Ok(InstallLayers(layers))
}
