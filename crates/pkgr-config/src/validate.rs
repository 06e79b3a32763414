//! `Strict` fatality check for a missing library directory.
//!
//! `Strict: true` makes a missing library fatal; the default logs and
//! continues, creating the library when requested.

use crate::error::ConfigError;
use crate::types::Config;
use std::path::Path;
use tracing::{error, warn};

/// Check that `library` exists, honoring `Strict`. Returns `Ok(true)`
/// if the library is present, `Ok(false)` if it is missing but
/// non-fatal (caller should create it), and `Err` if `Strict` makes
/// the condition fatal.
pub fn check_library(config: &Config, library: &Path) -> Result<bool, ConfigError> {
    if library.is_dir() {
        return Ok(true);
    }

    if config.strict_or_default() {
        return Err(ConfigError::MissingLibrary { path: library.to_path_buf() });
    }

    error!(path = %library.display(), "library directory missing, continuing");
    warn!("set Strict: true to make this fatal");
    Ok(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn existing_library_passes() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::default();
        assert!(check_library(&config, dir.path()).unwrap());
    }

    #[test]
    fn missing_library_is_non_fatal_by_default() {
        let config = Config::default();
        let result = check_library(&config, &std::path::PathBuf::from("/nonexistent/lib"));
        assert!(!result.unwrap());
    }

    #[test]
    fn missing_library_is_fatal_when_strict() {
        let mut config = Config::default();
        config.strict = Some(true);
        let result = check_library(&config, &std::path::PathBuf::from("/nonexistent/lib"));
        assert!(matches!(result, Err(ConfigError::MissingLibrary { .. })));
    }
}
