//! Configuration for the default completion backend
//!
//! Settings come either from the environment ([`OpenAIConfig::from_env`]) or
//! from a YAML/JSON file. `${VAR}` placeholders in files are replaced with
//! environment values before parsing, so keys need not be written to disk.

mod env;
mod error;
mod schema;
mod secrets;

pub use env::interpolate_env_vars;
pub use error::{ConfigError, ConfigResult, ValidationError, ValidationErrorKind};
pub use schema::{
    OpenAIConfig, API_KEY_VAR, BASE_URL_VAR, DEFAULT_BASE_URL, DEFAULT_FALLBACK_MODEL,
    DEFAULT_MODEL, DEFAULT_TIMEOUT_SECS, ORGANIZATION_VAR,
};
pub use secrets::SecretString;

use std::fs;
use std::path::Path;
use tracing::debug;

fn read_interpolated(path: &Path) -> Result<String, ConfigError> {
    let content = fs::read_to_string(path).map_err(|e| ConfigError::IoError {
        path: path.to_string_lossy().to_string(),
        source: e,
    })?;
    env::interpolate_env_vars(&content)
}

/// Load backend settings from a YAML file
pub fn load_from_yaml<P: AsRef<Path>>(path: P) -> Result<OpenAIConfig, ConfigError> {
    let path = path.as_ref();
    let content = read_interpolated(path)?;

    let config: OpenAIConfig =
        serde_yaml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_string_lossy().to_string(),
            line: e.location().map(|l| l.line()),
            column: e.location().map(|l| l.column()),
            message: e.to_string(),
        })?;

    config.validate()?;
    debug!(path = %path.display(), model = %config.model, "loaded backend configuration");
    Ok(config)
}

/// Load backend settings from a JSON file
pub fn load_from_json<P: AsRef<Path>>(path: P) -> Result<OpenAIConfig, ConfigError> {
    let path = path.as_ref();
    let content = read_interpolated(path)?;

    let config: OpenAIConfig =
        serde_json::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_string_lossy().to_string(),
            line: Some(e.line()),
            column: Some(e.column()),
            message: e.to_string(),
        })?;

    config.validate()?;
    debug!(path = %path.display(), model = %config.model, "loaded backend configuration");
    Ok(config)
}
