//! Aggregates [`RepoIndex`] instances and resolves a package name to a
//! concrete `(desc, repo, sourceType)` triple under a precedence policy.

use crate::error::NexusError;
use crate::index::RepoIndex;
use crate::suggest::{suggest, DEFAULT_SUGGESTION_COUNT};
use crate::types::{RepoUrl, SourceType};
use ahash::{AHashMap, AHashSet};
use pkgr_desc::PackageDesc;

/// One resolved hit: the package metadata plus where it came from.
#[derive(Debug, Clone)]
pub struct Resolved {
    pub desc: PackageDesc,
    pub repo: RepoUrl,
    pub source_type: SourceType,
}

/// Result of a batch lookup.
#[derive(Debug, Clone, Default)]
pub struct GetManyResult {
    pub resolved: Vec<Resolved>,
    pub missing: Vec<String>,
}

/// An ordered federation of repositories with a global default source type
/// and per-name overrides.
#[derive(Debug)]
pub struct Nexus {
    indices: Vec<RepoIndex>,
    default_source_type: SourceType,
    name_repo_overrides: AHashMap<String, String>,
    name_type_overrides: AHashMap<String, SourceType>,
}

impl Nexus {
    #[must_use]
    pub fn new(indices: Vec<RepoIndex>, default_source_type: SourceType) -> Self {
        Self {
            indices,
            default_source_type,
            name_repo_overrides: AHashMap::new(),
            name_type_overrides: AHashMap::new(),
        }
    }

    /// Pin `name` to a specific configured repository, consulted before the
    /// generic repo-ordering rule.
    pub fn set_package_repo(&mut self, name: &str, repo_name: &str) -> Result<(), NexusError> {
        if !self.indices.iter().any(|index| index.repo.name == repo_name) {
            return Err(NexusError::UnknownRepo(repo_name.to_string()));
        }
        self.name_repo_overrides.insert(name.to_string(), repo_name.to_string());
        Ok(())
    }

    /// Pin `name` to a specific source type, consulted before the per-repo
    /// or global default.
    pub fn set_package_type(&mut self, name: &str, source_type: SourceType) {
        self.name_type_overrides.insert(name.to_string(), source_type);
    }

    /// Resolve `name` to the concrete package it would be installed from.
    pub fn resolve(&self, name: &str) -> Result<Resolved, NexusError> {
        if let Some(repo_name) = self.name_repo_overrides.get(name) {
            let index = self
                .indices
                .iter()
                .find(|index| &index.repo.name == repo_name)
                .ok_or_else(|| NexusError::UnknownRepo(repo_name.clone()))?;
            return self
                .resolve_in_index(name, index)
                .ok_or_else(|| self.not_found(name));
        }

        for index in &self.indices {
            if let Some(resolved) = self.resolve_in_index(name, index) {
                return Ok(resolved);
            }
        }

        Err(self.not_found(name))
    }

    fn resolve_in_index(&self, name: &str, index: &RepoIndex) -> Option<Resolved> {
        let preferred = self
            .name_type_overrides
            .get(name)
            .copied()
            .unwrap_or(index.default_source_type);

        if let Some(desc) = index.get(name, preferred) {
            return Some(Resolved { desc: desc.clone(), repo: index.repo.clone(), source_type: preferred });
        }

        let fallback = preferred.other();
        index
            .get(name, fallback)
            .map(|desc| Resolved { desc: desc.clone(), repo: index.repo.clone(), source_type: fallback })
    }

    fn not_found(&self, name: &str) -> NexusError {
        let suggestions = self.suggest(name);
        if suggestions.is_empty() {
            tracing::warn!(package = name, "package not found in any configured repository");
        } else {
            tracing::warn!(package = name, suggestions = ?suggestions, "package not found; did you mean one of these?");
        }
        NexusError::NotFound(name.to_string())
    }

    /// Resolve every name in `names`, partitioning into hits and misses.
    #[must_use]
    pub fn get_many(&self, names: &[String]) -> GetManyResult {
        let mut result = GetManyResult::default();
        for name in names {
            match self.resolve(name) {
                Ok(hit) => result.resolved.push(hit),
                Err(_) => result.missing.push(name.clone()),
            }
        }
        result
    }

    /// Every package name known across all federated repositories, sorted.
    #[must_use]
    pub fn all_names(&self) -> Vec<String> {
        let set: AHashSet<String> = self.indices.iter().flat_map(RepoIndex::names).cloned().collect();
        let mut names: Vec<String> = set.into_iter().collect();
        names.sort_unstable();
        names
    }

    /// Up to [`DEFAULT_SUGGESTION_COUNT`] names most similar to `name`.
    #[must_use]
    pub fn suggest(&self, name: &str) -> Vec<String> {
        suggest(name, &self.all_names(), DEFAULT_SUGGESTION_COUNT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn empty_indices() -> Vec<RepoIndex> {
        Vec::new()
    }

    #[test]
    fn resolve_on_empty_nexus_is_not_found() {
        let nexus = Nexus::new(empty_indices(), SourceType::Source);
        assert_eq!(nexus.resolve("dplyr"), Err(NexusError::NotFound("dplyr".to_string())));
    }

    #[test]
    fn set_package_repo_rejects_unknown_repo() {
        let mut nexus = Nexus::new(empty_indices(), SourceType::Source);
        let err = nexus.set_package_repo("dplyr", "nonexistent").unwrap_err();
        assert_eq!(err, NexusError::UnknownRepo("nonexistent".to_string()));
    }

    #[test]
    fn all_names_on_empty_nexus_is_empty() {
        let nexus = Nexus::new(empty_indices(), SourceType::Source);
        assert!(nexus.all_names().is_empty());
    }
}
