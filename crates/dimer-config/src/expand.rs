//! Environment variable expansion for configuration strings.
//!
//! - `${VAR}` expands to the value of VAR, errors if unset
//! - `${VAR:-default}` expands to VAR if set, otherwise uses default

use std::convert::Infallible;

use crate::ConfigError;

/// Expand `${...}` references in `value`.
///
/// `field` names the config key in error messages. Strings without `${` are
/// returned unchanged.
pub(crate) fn expand_env(value: &str, field: &str) -> Result<String, ConfigError> {
    if !value.contains("${") {
        return Ok(value.to_owned());
    }

    let mut unset = Vec::new();
    let expanded = shellexpand::env_with_context(value, |var| -> Result<Option<String>, Infallible> {
        match std::env::var(var) {
            Ok(found) => Ok(Some(found)),
            Err(_) => {
                unset.push(var.to_owned());
                Ok(None)
            }
        }
    })
    .map(std::borrow::Cow::into_owned);

    let expanded = match expanded {
        Ok(expanded) => expanded,
        Err(err) => match err.cause {},
    };

    // Unset variables without a default are left in place by shellexpand.
    if let Some(var) = unset
        .iter()
        .find(|var| expanded.contains(&format!("${{{var}}}")))
    {
        return Err(ConfigError::EnvVar {
            field: field.to_owned(),
            message: format!("${{{var}}} not set"),
        });
    }

    Ok(expanded)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_expand_url_host() {
        // SAFETY: test runs single-threaded per test function
        unsafe {
            std::env::set_var("DIMER_EXPAND_HOST", "docs.example.com");
        }
        let result = expand_env("https://${DIMER_EXPAND_HOST}/api", "api.url").unwrap();
        assert_eq!(result, "https://docs.example.com/api");
        unsafe {
            std::env::remove_var("DIMER_EXPAND_HOST");
        }
    }

    #[test]
    fn test_expand_default_when_unset() {
        // SAFETY: test runs single-threaded per test function
        unsafe {
            std::env::remove_var("DIMER_EXPAND_UNSET");
        }
        let result = expand_env("${DIMER_EXPAND_UNSET:-http://localhost:5000}", "api.url").unwrap();
        assert_eq!(result, "http://localhost:5000");
    }

    #[test]
    fn test_expand_set_var_ignores_default() {
        // SAFETY: test runs single-threaded per test function
        unsafe {
            std::env::set_var("DIMER_EXPAND_SET", "https://api.test");
        }
        let result = expand_env("${DIMER_EXPAND_SET:-http://localhost}", "api.url").unwrap();
        assert_eq!(result, "https://api.test");
        unsafe {
            std::env::remove_var("DIMER_EXPAND_SET");
        }
    }

    #[test]
    fn test_expand_missing_var_names_field() {
        // SAFETY: test runs single-threaded per test function
        unsafe {
            std::env::remove_var("DIMER_EXPAND_MISSING");
        }
        let err = expand_env("${DIMER_EXPAND_MISSING}/api", "api.url").unwrap_err();
        assert!(matches!(err, ConfigError::EnvVar { .. }));
        let msg = err.to_string();
        assert!(msg.contains("DIMER_EXPAND_MISSING"), "{msg}");
        assert!(msg.contains("api.url"), "{msg}");
    }

    #[test]
    fn test_expand_literal_unchanged() {
        let result = expand_env("http://localhost:5000", "api.url").unwrap();
        assert_eq!(result, "http://localhost:5000");
    }
}
