//! Redacted storage for API keys

use serde::{Deserialize, Serialize};
use std::fmt;

/// A string that never shows up in `Debug` or `Display` output
#[derive(Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(transparent)]
pub struct SecretString {
    value: String,
}

impl SecretString {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
        }
    }

    /// The raw value, for building request headers only
    pub fn expose_secret(&self) -> &str {
        &self.value
    }

    pub fn is_empty(&self) -> bool {
        self.value.trim().is_empty()
    }

    /// `sk-...abcd` style hint for diagnostics
    pub fn partial_redact(&self) -> String {
        let chars: Vec<char> = self.value.chars().collect();
        match chars.len() {
            0 => "[EMPTY]".to_string(),
            1..=8 => "[REDACTED]".to_string(),
            len => {
                let head = if self.value.starts_with("sk-") { 3 } else { 2 };
                let head: String = chars[..head].iter().collect();
                let tail: String = chars[len - 4..].iter().collect();
                format!("{}...{}", head, tail)
            }
        }
    }
}

impl fmt::Debug for SecretString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[REDACTED]")
    }
}

impl fmt::Display for SecretString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[REDACTED]")
    }
}

impl From<String> for SecretString {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

impl From<&str> for SecretString {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}
