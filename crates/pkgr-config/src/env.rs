//! `$VAR` expansion (applied to the raw file text before parsing) and
//! `PKGR_*` environment overrides (applied to the parsed [`Config`]
//! after deserialization, case-insensitively).

use crate::error::ConfigError;
use crate::types::Config;
use regex::Regex;
use std::path::Path;
use std::sync::OnceLock;
use tracing::debug;

fn var_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\$\{?([A-Za-z_][A-Za-z0-9_]*)\}?").unwrap())
}

/// Replace every `$VAR`/`${VAR}` in `raw` with its environment value.
/// An unset variable is a fatal [`ConfigError::UnsetVar`].
pub fn expand_vars(raw: &str, path: &Path) -> Result<String, ConfigError> {
    let pattern = var_pattern();
    let mut last_err = None;

    let expanded = pattern.replace_all(raw, |caps: &regex::Captures| {
        let name = &caps[1];
        match std::env::var(name) {
            Ok(value) => value,
            Err(_) => {
                last_err.get_or_insert_with(|| ConfigError::UnsetVar { path: path.to_path_buf(), var: name.to_string() });
                String::new()
            }
        }
    });

    if let Some(err) = last_err {
        return Err(err);
    }
    Ok(expanded.into_owned())
}

const PREFIX: &str = "PKGR_";

/// Apply `PKGR_*` overrides (case-insensitive env var name match against
/// the top-level field names) onto an already-parsed config.
pub fn apply_env_overrides(config: &mut Config) {
    for (key, value) in std::env::vars() {
        let upper = key.to_uppercase();
        if upper.len() <= PREFIX.len() || !upper.starts_with(PREFIX) {
            continue;
        }
        let field = &upper[PREFIX.len()..];
        apply_one(config, field, &value);
    }
}

fn apply_one(config: &mut Config, field: &str, value: &str) {
    match field {
        "VERSION" => {
            if let Ok(v) = value.parse() {
                config.version = Some(v);
                debug!(field, "applied PKGR_ override");
            }
        }
        "RPATH" => config.r_path = Some(value.to_string()),
        "LIBRARY" => config.library = Some(value.to_string()),
        "CACHE" => config.cache = Some(value.to_string()),
        "THREADS" => {
            if let Ok(v) = value.parse() {
                config.threads = Some(v);
            }
        }
        "STRICT" => config.strict = parse_bool(value),
        "UPDATE" => config.update = parse_bool(value),
        "ROLLBACK" => config.rollback = parse_bool(value),
        "SUGGESTS" => config.suggests = parse_bool(value),
        _ => {}
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
#[allow(unsafe_code)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn expands_bare_and_braced_vars() {
        // SAFETY: single-threaded test process, no concurrent env readers.
        unsafe {
            std::env::set_var("PKGR_RS_TEST_VAR", "/opt/R");
        }
        let raw = "RPath: $PKGR_RS_TEST_VAR\nCache: ${PKGR_RS_TEST_VAR}/cache\n";
        let expanded = expand_vars(raw, &PathBuf::from("pkgr.yml")).unwrap();
        assert_eq!(expanded, "RPath: /opt/R\nCache: /opt/R/cache\n");
        unsafe {
            std::env::remove_var("PKGR_RS_TEST_VAR");
        }
    }

    #[test]
    fn unset_var_is_a_fatal_error() {
        let raw = "RPath: $PKGR_RS_DEFINITELY_UNSET\n";
        let result = expand_vars(raw, &PathBuf::from("pkgr.yml"));
        assert!(matches!(result, Err(ConfigError::UnsetVar { .. })));
    }

    #[test]
    fn env_override_replaces_scalar_field() {
        // SAFETY: single-threaded test process, no concurrent env readers.
        unsafe {
            std::env::set_var("PKGR_THREADS", "8");
        }
        let mut config = Config::default();
        apply_env_overrides(&mut config);
        assert_eq!(config.threads, Some(8));
        unsafe {
            std::env::remove_var("PKGR_THREADS");
        }
    }

    #[test]
    fn env_override_is_case_insensitive() {
        // SAFETY: single-threaded test process, no concurrent env readers.
        unsafe {
            std::env::set_var("pkgr_strict", "true");
        }
        let mut config = Config::default();
        apply_env_overrides(&mut config);
        assert_eq!(config.strict, Some(true));
        unsafe {
            std::env::remove_var("pkgr_strict");
        }
    }
}
