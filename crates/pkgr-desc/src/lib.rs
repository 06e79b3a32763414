//! Parses CRAN-style DCF (Debian Control File) stanzas — the format used by
//! both `PACKAGES` index files (blank-line-separated stanzas) and
//! per-package `DESCRIPTION` files — into [`PackageDesc`] records.

use pkgr_core::VersionConstraint;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

/// One `{name, versionConstraint}` dependency edge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DepSpec {
    pub name: String,
    pub constraint: VersionConstraint,
}

/// Parsed metadata for one package.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PackageDesc {
    pub name: String,
    pub version: String,
    pub depends: Vec<DepSpec>,
    pub imports: Vec<DepSpec>,
    pub suggests: Vec<DepSpec>,
    pub linking_to: Vec<DepSpec>,
    /// Symbolic origin, filled in by the caller (RepoIndex/Nexus), not
    /// parsed from the stanza itself.
    pub repo_origin: Option<String>,
}

#[derive(Debug, Error)]
pub enum DescError {
    #[error("stanza is missing a Package field")]
    MissingPackage,
    #[error("stanza for {name} is missing a Version field")]
    MissingVersion { name: String },
}

/// Parse every stanza in a `PACKAGES` file body (blank-line separated).
pub fn parse_packages_file(body: &str) -> Vec<Result<PackageDesc, DescError>> {
    split_stanzas(body)
        .into_iter()
        .filter(|s| !s.trim().is_empty())
        .map(parse_stanza)
        .collect()
}

/// Parse a single `DESCRIPTION` file's contents.
pub fn parse_description(body: &str) -> Result<PackageDesc, DescError> {
    parse_stanza(body)
}

fn split_stanzas(body: &str) -> Vec<&str> {
    body.split("\n\n").collect()
}

fn parse_stanza(stanza: &str) -> Result<PackageDesc, DescError> {
    let fields = parse_fields(stanza);

    let name = fields
        .get("Package")
        .map(|s| s.trim().to_string())
        .ok_or(DescError::MissingPackage)?;

    let version = fields
        .get("Version")
        .map(|s| s.trim().to_string())
        .ok_or_else(|| DescError::MissingVersion { name: name.clone() })?;

    Ok(PackageDesc {
        depends: parse_dep_list(fields.get("Depends").map(String::as_str).unwrap_or("")),
        imports: parse_dep_list(fields.get("Imports").map(String::as_str).unwrap_or("")),
        suggests: parse_dep_list(fields.get("Suggests").map(String::as_str).unwrap_or("")),
        linking_to: parse_dep_list(fields.get("LinkingTo").map(String::as_str).unwrap_or("")),
        name,
        version,
        repo_origin: None,
    })
}

/// DCF "unfold": a field starts at column 0 as `Key: value`; continuation
/// lines are indented with whitespace and are appended to the prior value.
fn parse_fields(stanza: &str) -> BTreeMap<String, String> {
    let mut fields = BTreeMap::new();
    let mut current_key: Option<String> = None;

    for line in stanza.lines() {
        if line.starts_with([' ', '\t']) {
            if let Some(key) = &current_key {
                if let Some(existing) = fields.get_mut(key) {
                    let existing: &mut String = existing;
                    existing.push(' ');
                    existing.push_str(line.trim());
                }
            }
            continue;
        }

        if let Some((key, value)) = line.split_once(':') {
            let key = key.trim().to_string();
            fields.insert(key.clone(), value.trim().to_string());
            current_key = Some(key);
        }
    }

    fields
}

/// Parse a comma-separated dependency list, e.g.
/// `R (>= 3.5.0), methods, utils (>= 1.0)`.
fn parse_dep_list(raw: &str) -> Vec<DepSpec> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(parse_dep_entry)
        .collect()
}

fn parse_dep_entry(entry: &str) -> DepSpec {
    match entry.split_once('(') {
        Some((name, constraint)) => DepSpec {
            name: name.trim().to_string(),
            constraint: pkgr_core::parse_constraint(constraint.trim_end_matches(')')),
        },
        None => DepSpec {
            name: entry.trim().to_string(),
            constraint: VersionConstraint::Any,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_single_stanza() {
        let stanza = "Package: dplyr\nVersion: 1.1.4\nDepends: R (>= 3.5.0)\nImports: methods, utils\n";
        let desc = parse_description(stanza).unwrap();
        assert_eq!(desc.name, "dplyr");
        assert_eq!(desc.version, "1.1.4");
        assert_eq!(desc.depends, vec![DepSpec {
            name: "R".to_string(),
            constraint: pkgr_core::parse_constraint(">= 3.5.0"),
        }]);
        assert_eq!(desc.imports.len(), 2);
    }

    #[test]
    fn parses_multiple_stanzas_separated_by_blank_lines() {
        let body = "Package: a\nVersion: 1.0\n\nPackage: b\nVersion: 2.0\n";
        let results = parse_packages_file(body);
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].as_ref().unwrap().name, "a");
        assert_eq!(results[1].as_ref().unwrap().name, "b");
    }

    #[test]
    fn continuation_lines_are_folded() {
        let stanza = "Package: foo\nVersion: 1.0\nDepends: R (>= 3.5.0),\n    methods,\n    utils\n";
        let desc = parse_description(stanza).unwrap();
        assert_eq!(desc.depends.len(), 3);
    }

    #[test]
    fn missing_package_field_is_an_error() {
        let stanza = "Version: 1.0\n";
        assert!(matches!(parse_description(stanza), Err(DescError::MissingPackage)));
    }

    #[test]
    fn trailing_blank_stanzas_are_skipped() {
        let body = "Package: a\nVersion: 1.0\n\n\n";
        let results = parse_packages_file(body);
        assert_eq!(results.len(), 1);
    }
}
