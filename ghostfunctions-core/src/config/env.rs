//! `${VAR}` interpolation for configuration files

use super::error::ConfigError;
use regex::{Captures, Regex};
use std::env;

const ENV_VAR_PATTERN: &str = r"\$\{([A-Z_][A-Z0-9_]*)\}";

/// Replace every `${VAR}` placeholder in `content` with the variable's value
///
/// Fails on the first placeholder whose variable is unset.
pub fn interpolate_env_vars(content: &str) -> Result<String, ConfigError> {
    let pattern = Regex::new(ENV_VAR_PATTERN).map_err(|e| ConfigError::Invalid {
        message: format!("bad interpolation pattern: {}", e),
    })?;

    if let Some(var) = pattern
        .captures_iter(content)
        .map(|cap| cap[1].to_string())
        .find(|var| env::var(var).is_err())
    {
        return Err(ConfigError::EnvVarNotFound { var });
    }

    let result = pattern.replace_all(content, |cap: &Captures<'_>| {
        env::var(&cap[1]).unwrap_or_default()
    });
    Ok(result.into_owned())
}

/// Read a required variable
pub fn required_var(name: &str) -> Result<String, ConfigError> {
    env::var(name).map_err(|_| ConfigError::EnvVarNotFound {
        var: name.to_string(),
    })
}

/// Read an optional variable, treating an empty value as unset
pub fn optional_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|value| !value.is_empty())
}
