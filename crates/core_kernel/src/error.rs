//! Kernel error type shared by the lending crates

use thiserror::Error;
use crate::rate::RateError;

/// Errors raised by kernel types and process configuration
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("Rate error: {0}")]
    Rate(#[from] RateError),

    /// An identifier string is neither `PREFIX-uuid` nor a bare UUID
    #[error("Invalid {kind} identifier '{value}'")]
    InvalidIdentifier {
        kind: &'static str,
        value: String,
    },

    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl CoreError {
    pub fn invalid_identifier(kind: &'static str, value: impl Into<String>) -> Self {
        CoreError::InvalidIdentifier {
            kind,
            value: value.into(),
        }
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        CoreError::Configuration(message.into())
    }
}
