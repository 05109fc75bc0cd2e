//! Environment variable helpers shared by configuration builders
//!
//! The `lookup_*` variants take the variable source as a closure so callers
//! can resolve settings from a map instead of the process environment.

use std::str::FromStr;
use thiserror::Error;

/// Error raised when an environment variable is present but malformed
#[derive(Debug, Error, PartialEq, Eq)]
#[error("invalid value for {key}: {value:?}")]
pub struct EnvError {
    pub key: String,
    pub value: String,
}

/// Process environment as a lookup function
pub fn process_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

/// Read an environment variable, treating unset and blank values as absent.
pub fn env_opt(key: &str) -> Option<String> {
    lookup_opt(key, process_env)
}

/// Read and parse an environment variable.
///
/// Returns `Ok(None)` when the variable is unset or blank.
pub fn env_parse<T: FromStr>(key: &str) -> Result<Option<T>, EnvError> {
    lookup_parse(key, process_env)
}

/// Resolve `key` through `lookup`, treating blank values as absent
pub fn lookup_opt(key: &str, lookup: impl Fn(&str) -> Option<String>) -> Option<String> {
    lookup(key)
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Resolve and parse `key` through `lookup`
pub fn lookup_parse<T: FromStr>(
    key: &str,
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<Option<T>, EnvError> {
    match lookup_opt(key, lookup) {
        None => Ok(None),
        Some(value) => value.parse().map(Some).map_err(|_| EnvError {
            key: key.to_string(),
            value,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn vars(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }

    #[test]
    fn test_lookup_opt_blank_is_none() {
        let env = vars(&[("NAME", "  stocks "), ("BLANK", "   ")]);
        let lookup = |key: &str| env.get(key).cloned();

        assert_eq!(lookup_opt("NAME", lookup), Some("stocks".to_string()));
        assert_eq!(lookup_opt("BLANK", lookup), None);
        assert_eq!(lookup_opt("MISSING", lookup), None);
    }

    #[test]
    fn test_lookup_parse() {
        let env = vars(&[("NUM", "42"), ("BAD", "forty-two")]);
        let lookup = |key: &str| env.get(key).cloned();

        assert_eq!(lookup_parse::<u64>("NUM", lookup), Ok(Some(42)));
        assert_eq!(lookup_parse::<u64>("MISSING", lookup), Ok(None));

        let err = lookup_parse::<u64>("BAD", lookup).unwrap_err();
        assert_eq!(err.key, "BAD");
        assert_eq!(err.value, "forty-two");
    }

    #[test]
    fn test_env_opt_reads_process_env() {
        // PATH is set in any test environment; read-only access.
        assert!(env_opt("PATH").is_some());
        assert_eq!(env_opt("AGENT_UTILS_SURELY_UNSET_VARIABLE"), None);
    }
}
