//! Error types for decoration, calls and result interpretation

use crate::config::ConfigError;
use crate::providers::BackendError;
use std::fmt;
use thiserror::Error;

/// Result type used throughout the crate
pub type Result<T> = std::result::Result<T, GhostError>;

/// Which part of a function contract was violated at decoration time
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContractRequirement {
    /// The function must carry a non-empty docstring
    Docstring,
    /// The function must declare a return type
    ReturnAnnotation,
    /// The function name must be a non-empty identifier
    Name,
    /// Parameter names must be identifiers and unique
    Parameter(String),
}

impl fmt::Display for ContractRequirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Docstring => write!(f, "must have a docstring"),
            Self::ReturnAnnotation => write!(f, "must have a return type annotation"),
            Self::Name => write!(f, "must have a valid identifier as its name"),
            Self::Parameter(name) => write!(f, "has an invalid or duplicate parameter '{}'", name),
        }
    }
}

/// Errors raised by ghostfunctions
#[derive(Debug, Error)]
pub enum GhostError {
    /// The function definition cannot be turned into a ghostfunction
    #[error("Function {function} {requirement}")]
    ContractViolation {
        function: String,
        requirement: ContractRequirement,
    },

    /// Call-time arguments do not bind to the declared parameters
    #[error("{function}(): {message}")]
    SignatureMismatch { function: String, message: String },

    /// The completion backend failed
    #[error("Backend error: {0}")]
    Backend(#[from] BackendError),

    /// The reply could not be parsed as a literal value
    #[error("Malformed response: {message}")]
    MalformedResponse { message: String, text: String },

    /// The parsed reply does not conform to the declared return type
    #[error("Type validation failed at {path}: expected {expected}, found {found}")]
    TypeValidation {
        expected: String,
        found: String,
        path: String,
    },

    /// A message role outside of system/user/assistant
    #[error("Invalid message role '{0}': expected one of system, user, assistant")]
    InvalidRole(String),

    /// An annotation string could not be parsed into a type descriptor
    #[error("Invalid type annotation '{annotation}': {message}")]
    InvalidAnnotation { annotation: String, message: String },

    /// The default backend could not be configured
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// A blocking call could not get a runtime to run on
    #[error("Runtime error: {0}")]
    Runtime(String),
}

impl GhostError {
    pub(crate) fn contract(function: impl Into<String>, requirement: ContractRequirement) -> Self {
        Self::ContractViolation {
            function: function.into(),
            requirement,
        }
    }

    pub(crate) fn mismatch(function: impl Into<String>, message: impl Into<String>) -> Self {
        Self::SignatureMismatch {
            function: function.into(),
            message: message.into(),
        }
    }

    pub(crate) fn malformed(message: impl Into<String>, text: impl Into<String>) -> Self {
        Self::MalformedResponse {
            message: message.into(),
            text: text.into(),
        }
    }

    /// Whether this error was raised while decorating rather than calling
    pub fn is_contract_violation(&self) -> bool {
        matches!(self, Self::ContractViolation { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contract_violation_names_requirement() {
        let err = GhostError::contract("f", ContractRequirement::Docstring);
        assert_eq!(err.to_string(), "Function f must have a docstring");
        assert!(err.is_contract_violation());

        let err = GhostError::contract("g", ContractRequirement::ReturnAnnotation);
        assert_eq!(
            err.to_string(),
            "Function g must have a return type annotation"
        );
    }

    #[test]
    fn test_backend_error_converts() {
        let err: GhostError = BackendError::Timeout(30).into();
        assert!(matches!(err, GhostError::Backend(BackendError::Timeout(30))));
        assert!(!err.is_contract_violation());
    }
}
