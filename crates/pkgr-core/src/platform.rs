//! Base package set and platform/R-version detection.

use std::fmt;

/// Packages shipped with the R runtime that are never installed by pkgr.
pub const BASE_PACKAGES: &[&str] = &[
    "base",
    "stats",
    "methods",
    "utils",
    "tools",
    "graphics",
    "grDevices",
    "datasets",
    "parallel",
    "splines",
    "grid",
    "compiler",
    "tcltk",
    "stats4",
];

/// Is `name` a base/platform-provided package?
#[must_use]
pub fn is_base_package(name: &str) -> bool {
    BASE_PACKAGES.contains(&name)
}

/// Host OS as relevant to CRAN binary availability.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostOs {
    MacOs,
    Windows,
    Linux,
    Other,
}

impl HostOs {
    /// Detect the current host OS using the compile-time target.
    #[must_use]
    pub fn current() -> Self {
        if cfg!(target_os = "macos") {
            Self::MacOs
        } else if cfg!(target_os = "windows") {
            Self::Windows
        } else if cfg!(target_os = "linux") {
            Self::Linux
        } else {
            Self::Other
        }
    }

    /// Does this platform publish CRAN binaries (macOS, Windows)?
    #[must_use]
    pub const fn supports_binary(self) -> bool {
        matches!(self, Self::MacOs | Self::Windows)
    }

    /// The `bin/<segment>` URL path component for binary PACKAGES files.
    #[must_use]
    pub const fn binary_url_segment(self) -> Option<&'static str> {
        match self {
            Self::MacOs => Some("macosx"),
            Self::Windows => Some("windows"),
            Self::Linux | Self::Other => None,
        }
    }

    /// File extension CRAN binary artifacts use on this platform.
    #[must_use]
    pub const fn binary_extension(self) -> &'static str {
        match self {
            Self::MacOs => "tgz",
            Self::Windows => "zip",
            Self::Linux | Self::Other => "tar.gz",
        }
    }
}

/// A parsed R runtime version, e.g. `4.3.1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RVersion {
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
}

impl RVersion {
    #[must_use]
    pub const fn new(major: u32, minor: u32, patch: u32) -> Self {
        Self { major, minor, patch }
    }

    /// Parse `R version 4.3.1 (...)`-style or bare `4.3.1` strings.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        let digits = raw
            .split_whitespace()
            .find(|tok| tok.chars().next().is_some_and(|c| c.is_ascii_digit()))?;
        let mut parts = digits.split('.');
        let major = parts.next()?.parse().ok()?;
        let minor = parts.next()?.parse().ok()?;
        let patch = parts.next().and_then(|p| p.parse().ok()).unwrap_or(0);
        Some(Self { major, minor, patch })
    }

    /// `<major>.<minor>` as used in the binary PACKAGES URL.
    #[must_use]
    pub fn major_minor(&self) -> String {
        format!("{}.{}", self.major, self.minor)
    }
}

impl fmt::Display for RVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recognizes_base_packages() {
        assert!(is_base_package("base"));
        assert!(is_base_package("stats4"));
        assert!(!is_base_package("dplyr"));
    }

    #[test]
    fn parses_full_r_version_banner() {
        let v = RVersion::parse("R version 4.3.1 (2023-06-16)").unwrap();
        assert_eq!(v, RVersion::new(4, 3, 1));
        assert_eq!(v.major_minor(), "4.3");
    }

    #[test]
    fn parses_bare_version() {
        assert_eq!(RVersion::parse("4.2").unwrap(), RVersion::new(4, 2, 0));
    }
}
