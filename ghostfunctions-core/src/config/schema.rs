//! Settings for the default OpenAI backend

use super::env::{optional_var, required_var};
use super::error::{ConfigError, ValidationError};
use super::secrets::SecretString;
use serde::{Deserialize, Serialize};

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_MODEL: &str = "gpt-4";
pub const DEFAULT_FALLBACK_MODEL: &str = "gpt-3.5-turbo";
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

pub const API_KEY_VAR: &str = "OPENAI_API_KEY";
pub const ORGANIZATION_VAR: &str = "OPENAI_ORGANIZATION";
pub const BASE_URL_VAR: &str = "OPENAI_BASE_URL";

/// Connection settings for an OpenAI-compatible chat completions endpoint
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct OpenAIConfig {
    pub api_key: SecretString,

    /// Sent as the `OpenAI-Organization` header when present
    #[serde(default)]
    pub organization: Option<String>,

    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Preferred model
    #[serde(default = "default_model")]
    pub model: String,

    /// Model tried once when the preferred one is unavailable; `null` disables
    #[serde(default = "default_fallback_model")]
    pub fallback_model: Option<String>,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl OpenAIConfig {
    pub fn new(api_key: impl Into<SecretString>) -> Self {
        Self {
            api_key: api_key.into(),
            organization: None,
            base_url: default_base_url(),
            model: default_model(),
            fallback_model: default_fallback_model(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }

    /// Read `OPENAI_API_KEY` (required), `OPENAI_ORGANIZATION` and
    /// `OPENAI_BASE_URL`
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::new(required_var(API_KEY_VAR)?);
        config.organization = optional_var(ORGANIZATION_VAR);
        if let Some(base_url) = optional_var(BASE_URL_VAR) {
            config.base_url = base_url;
        }
        config.validate()?;
        Ok(config)
    }

    pub fn with_organization(mut self, organization: impl Into<String>) -> Self {
        self.organization = Some(organization.into());
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_fallback_model(mut self, fallback_model: Option<String>) -> Self {
        self.fallback_model = fallback_model;
        self
    }

    pub fn with_timeout_secs(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }

    /// The chat completions endpoint
    pub fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.base_url.trim_end_matches('/'))
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.api_key.is_empty() {
            return Err(ValidationError::required("api_key"));
        }
        if self.model.trim().is_empty() {
            return Err(ValidationError::required("model"));
        }
        if matches!(&self.fallback_model, Some(model) if model.trim().is_empty()) {
            return Err(ValidationError::required("fallback_model"));
        }
        if self.timeout_secs == 0 {
            return Err(ValidationError::out_of_range(
                "timeout_secs",
                "must be greater than 0",
            ));
        }

        let url = url::Url::parse(&self.base_url)
            .map_err(|e| ValidationError::invalid_url("base_url", e.to_string()))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ValidationError::invalid_url(
                "base_url",
                format!("unsupported scheme '{}'", url.scheme()),
            ));
        }
        Ok(())
    }
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_model() -> String {
    DEFAULT_MODEL.to_string()
}

fn default_fallback_model() -> Option<String> {
    Some(DEFAULT_FALLBACK_MODEL.to_string())
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}
