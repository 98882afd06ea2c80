//! Loan desk error handling

use std::path::PathBuf;

use thiserror::Error;

use core_kernel::CoreError;
use domain_lending::LendingError;

/// Loan desk error types
#[derive(Debug, Error)]
pub enum DeskError {
    #[error(transparent)]
    Config(#[from] CoreError),

    /// Config file or environment could not be read into settings
    #[error("Invalid settings: {0}")]
    Settings(#[from] config::ConfigError),

    #[error("Cannot read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid JSON in {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error(transparent)]
    Lending(#[from] LendingError),
}

impl DeskError {
    /// Process exit code for the error
    pub fn exit_code(&self) -> u8 {
        match self {
            DeskError::Config(_) | DeskError::Settings(_) => 78,
            DeskError::Read { .. } => 66,
            DeskError::Parse { .. } | DeskError::Lending(LendingError::Validation(_)) => 65,
            DeskError::Lending(_) => 1,
        }
    }
}

impl From<domain_lending::RuleError> for DeskError {
    fn from(err: domain_lending::RuleError) -> Self {
        DeskError::Lending(err.into())
    }
}
