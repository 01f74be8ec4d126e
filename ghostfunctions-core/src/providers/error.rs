//! Completion backend errors

use thiserror::Error;

/// Result type for backend operations
pub type BackendResult<T> = Result<T, BackendError>;

/// Errors raised while obtaining a completion
#[derive(Debug, Error)]
pub enum BackendError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Authentication failed: {0}")]
    Authentication(String),

    #[error("Rate limit exceeded: {0}")]
    RateLimit(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Model not found: {0}")]
    ModelNotFound(String),

    #[error("Service temporarily unavailable: {0}")]
    ServiceUnavailable(String),

    #[error("Request timed out after {0} seconds")]
    Timeout(u64),

    #[error("Failed to parse response: {0}")]
    Parse(String),

    /// Any other error reported by the provider
    #[error("Provider error: {code}: {message}")]
    Provider { code: String, message: String },

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("{0}")]
    Other(String),
}

impl BackendError {
    /// Errors after which a lower-tier model is worth trying
    pub fn is_model_unavailable(&self) -> bool {
        matches!(self, Self::ModelNotFound(_) | Self::InvalidRequest(_))
    }
}

impl From<reqwest::Error> for BackendError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            BackendError::Timeout(0)
        } else if err.is_connect() {
            BackendError::Network(format!("Connection failed: {}", err))
        } else if err.is_decode() {
            BackendError::Parse(err.to_string())
        } else if let Some(status) = err.status() {
            match status.as_u16() {
                401 | 403 => BackendError::Authentication(err.to_string()),
                429 => BackendError::RateLimit(err.to_string()),
                500..=599 => BackendError::ServiceUnavailable(err.to_string()),
                _ => BackendError::Provider {
                    code: status.to_string(),
                    message: err.to_string(),
                },
            }
        } else {
            BackendError::Network(err.to_string())
        }
    }
}

impl From<serde_json::Error> for BackendError {
    fn from(err: serde_json::Error) -> Self {
        BackendError::Parse(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_model_unavailable_class() {
        assert!(BackendError::ModelNotFound("gpt-4".into()).is_model_unavailable());
        assert!(BackendError::InvalidRequest("bad model".into()).is_model_unavailable());
        assert!(!BackendError::Authentication("nope".into()).is_model_unavailable());
        assert!(!BackendError::Timeout(30).is_model_unavailable());
    }

    #[test]
    fn test_json_error_converts_to_parse() {
        let err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        assert!(matches!(BackendError::from(err), BackendError::Parse(_)));
    }
}
