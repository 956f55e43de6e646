use anyhow::Result;
use regex::Regex;
use std::env;
use tracing::{debug, warn};

/// Substitute environment variables in the format ${VAR_NAME}.
///
/// Unset variables keep their placeholder so the validator can reject them
/// with a precise message instead of silently producing an empty value.
pub fn substitute_env_vars(content: &str) -> Result<String> {
    let re = Regex::new(r"\$\{(\w+)\}").expect("static regex");
    let mut result = content.to_string();
    let mut missing_vars = Vec::new();

    for caps in re.captures_iter(content) {
        let var_name = caps.get(1).map(|m| m.as_str()).unwrap_or_default();
        let placeholder = caps.get(0).map(|m| m.as_str()).unwrap_or_default();

        match env::var(var_name) {
            Ok(value) => {
                debug!(var = var_name, "substituting environment variable");
                result = result.replace(placeholder, &value);
            }
            Err(_) => {
                warn!(var = var_name, "environment variable not set");
                missing_vars.push(var_name.to_string());
            }
        }
    }

    if !missing_vars.is_empty() {
        debug!(?missing_vars, "unresolved environment variables left for validation");
    }

    Ok(result)
}

/// Check whether a string still contains `${VAR}` placeholders.
pub fn has_unresolved_env_vars(content: &str) -> bool {
    let re = Regex::new(r"\$\{(\w+)\}").expect("static regex");
    re.is_match(content)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_substitutes_set_variable() {
        env::set_var("PULSE_TEST_KEY", "abc123");
        let out = substitute_env_vars("api_key: ${PULSE_TEST_KEY}").unwrap();
        assert_eq!(out, "api_key: abc123");
        env::remove_var("PULSE_TEST_KEY");
    }

    #[test]
    fn test_keeps_placeholder_when_unset() {
        env::remove_var("PULSE_TEST_MISSING");
        let out = substitute_env_vars("key: ${PULSE_TEST_MISSING}").unwrap();
        assert!(has_unresolved_env_vars(&out));
    }

    #[test]
    fn test_plain_content_untouched() {
        let out = substitute_env_vars("ttl: 60").unwrap();
        assert_eq!(out, "ttl: 60");
        assert!(!has_unresolved_env_vars(&out));
    }
}
