//! Lending domain errors
//!
//! This module defines the error types that can occur within the
//! lending domain: calculation preconditions, catalog configuration,
//! application lifecycle, and approval rule management.

use thiserror::Error;

use core_kernel::RuleId;

/// Errors that can occur in the lending domain
#[derive(Debug, Error)]
pub enum LendingError {
    /// Term must be at least one month
    #[error("Invalid term: {0} months (must be at least 1)")]
    InvalidTerm(u32),

    /// Arithmetic could not produce a well-defined result
    #[error("Calculation error: {0}")]
    Calculation(String),

    /// Loan type name not recognised
    #[error("Unknown loan type: {0}")]
    UnknownLoanType(String),

    /// Loan catalog is incomplete or inconsistent
    #[error("Invalid loan catalog: {0}")]
    InvalidCatalog(String),

    /// Application data failed validation
    #[error("Validation error: {0}")]
    Validation(String),

    /// Invalid state transition attempted
    #[error("Invalid state transition from {from} to {to}")]
    InvalidStateTransition {
        from: String,
        to: String,
    },

    /// Operation requires a credit score that has not been computed
    #[error("Application has no credit score")]
    MissingCreditScore,

    /// Approval rule error
    #[error(transparent)]
    Rule(#[from] RuleError),
}

impl LendingError {
    /// Creates a validation error
    pub fn validation(message: impl Into<String>) -> Self {
        LendingError::Validation(message.into())
    }

    /// Creates a calculation error
    pub fn calculation(message: impl Into<String>) -> Self {
        LendingError::Calculation(message.into())
    }

    /// Creates an invalid transition error from any displayable states
    pub fn transition(from: impl std::fmt::Display, to: impl std::fmt::Display) -> Self {
        LendingError::InvalidStateTransition {
            from: from.to_string(),
            to: to.to_string(),
        }
    }
}

/// Errors raised while defining or managing approval rules
#[derive(Debug, Error)]
pub enum RuleError {
    /// Condition value does not fit its operator
    #[error("Invalid condition on '{field}': {reason}")]
    InvalidCondition {
        field: String,
        reason: String,
    },

    /// Action parameters are incomplete
    #[error("Invalid action: {0}")]
    InvalidAction(String),

    /// Rule has no conditions
    #[error("Rule must have at least one condition")]
    EmptyConditions,

    /// Rule name is blank
    #[error("Rule name is required")]
    MissingName,

    /// Rule not found in the rule book
    #[error("Rule not found: {0}")]
    RuleNotFound(RuleId),

    /// Rule registry lock was poisoned by a panicking writer
    #[error("Rule registry unavailable")]
    RegistryUnavailable,
}

impl RuleError {
    /// Creates an invalid condition error
    pub fn invalid_condition(field: impl Into<String>, reason: impl Into<String>) -> Self {
        RuleError::InvalidCondition {
            field: field.into(),
            reason: reason.into(),
        }
    }
}
