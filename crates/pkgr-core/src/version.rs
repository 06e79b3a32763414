//! Version comparison for CRAN-style dotted version strings.
//!
//! Versions are compared component-wise: `.` and `-` are equivalent
//! separators, and each component is compared as an integer when both
//! sides parse as one, lexicographically otherwise. Shorter sequences are
//! padded with an implicit zero component.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// A parsed, comparable CRAN-style version string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Version {
    raw: String,
    components: Vec<VersionComponent>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
enum VersionComponent {
    Numeric(u64),
    Text(String),
}

impl Version {
    /// Parse a version string into its comparable components.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        let components = raw
            .split(['.', '-'])
            .filter(|s| !s.is_empty())
            .map(|part| {
                part.parse::<u64>()
                    .map_or_else(|_| VersionComponent::Text(part.to_string()), VersionComponent::Numeric)
            })
            .collect();
        Self {
            raw: raw.to_string(),
            components,
        }
    }

    /// The original, unparsed version string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.raw
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        let len = self.components.len().max(other.components.len());
        for i in 0..len {
            let a = self.components.get(i);
            let b = other.components.get(i);
            let ord = match (a, b) {
                (Some(a), Some(b)) => compare_component(a, b),
                (Some(a), None) => compare_component(a, &VersionComponent::Numeric(0)),
                (None, Some(b)) => compare_component(&VersionComponent::Numeric(0), b),
                (None, None) => Ordering::Equal,
            };
            if ord != Ordering::Equal {
                return ord;
            }
        }
        Ordering::Equal
    }
}

fn compare_component(a: &VersionComponent, b: &VersionComponent) -> Ordering {
    match (a, b) {
        (VersionComponent::Numeric(a), VersionComponent::Numeric(b)) => a.cmp(b),
        (VersionComponent::Text(a), VersionComponent::Text(b)) => a.cmp(b),
        // A numeric component sorts by its string form when compared
        // against a text one, mirroring plain string comparison.
        (VersionComponent::Numeric(a), VersionComponent::Text(b)) => a.to_string().as_str().cmp(b.as_str()),
        (VersionComponent::Text(a), VersionComponent::Numeric(b)) => a.as_str().cmp(b.to_string().as_str()),
    }
}

/// A version constraint as found in `Depends`/`Imports`/etc fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum VersionConstraint {
    Any,
    Ge(Version),
    Gt(Version),
    Le(Version),
    Lt(Version),
    Eq(Version),
}

impl VersionConstraint {
    /// Does `candidate` satisfy this constraint?
    #[must_use]
    pub fn satisfied_by(&self, candidate: &Version) -> bool {
        match self {
            Self::Any => true,
            Self::Ge(v) => candidate >= v,
            Self::Gt(v) => candidate > v,
            Self::Le(v) => candidate <= v,
            Self::Lt(v) => candidate < v,
            Self::Eq(v) => candidate == v,
        }
    }
}

impl fmt::Display for VersionConstraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Any => write!(f, "*"),
            Self::Ge(v) => write!(f, ">= {v}"),
            Self::Gt(v) => write!(f, "> {v}"),
            Self::Le(v) => write!(f, "<= {v}"),
            Self::Lt(v) => write!(f, "< {v}"),
            Self::Eq(v) => write!(f, "== {v}"),
        }
    }
}

/// Parse an R-style dependency constraint, e.g. `>= 3.6` or `(>= 3.6)`.
///
/// Returns `VersionConstraint::Any` for an empty or unparsable constraint
/// string, mirroring the permissive original DESCRIPTION parser.
#[must_use]
pub fn parse_constraint(raw: &str) -> VersionConstraint {
    let trimmed = raw.trim().trim_start_matches('(').trim_end_matches(')').trim();
    if trimmed.is_empty() {
        return VersionConstraint::Any;
    }

    for (op, ctor) in [
        (">=", VersionConstraint::Ge as fn(Version) -> VersionConstraint),
        ("<=", VersionConstraint::Le as fn(Version) -> VersionConstraint),
        (">", VersionConstraint::Gt as fn(Version) -> VersionConstraint),
        ("<", VersionConstraint::Lt as fn(Version) -> VersionConstraint),
        ("==", VersionConstraint::Eq as fn(Version) -> VersionConstraint),
        ("=", VersionConstraint::Eq as fn(Version) -> VersionConstraint),
    ] {
        if let Some(rest) = trimmed.strip_prefix(op) {
            return ctor(Version::parse(rest.trim()));
        }
    }

    VersionConstraint::Any
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("1.0.0", "1.0.1", Ordering::Less)]
    #[case("1.2", "1.10", Ordering::Less)]
    #[case("1.2.0", "1.2", Ordering::Equal)]
    #[case("2.0", "1.9.9", Ordering::Greater)]
    #[case("1.0-1", "1.0.1", Ordering::Equal)]
    fn compares_dotted_versions(#[case] a: &str, #[case] b: &str, #[case] expected: Ordering) {
        assert_eq!(Version::parse(a).cmp(&Version::parse(b)), expected);
    }

    #[test]
    fn parses_ge_constraint() {
        let c = parse_constraint(">= 3.6.0");
        assert!(c.satisfied_by(&Version::parse("3.6.1")));
        assert!(!c.satisfied_by(&Version::parse("3.5.9")));
    }

    #[test]
    fn empty_constraint_is_any() {
        assert_eq!(parse_constraint(""), VersionConstraint::Any);
        assert!(parse_constraint("").satisfied_by(&Version::parse("0.0.1")));
    }
}
