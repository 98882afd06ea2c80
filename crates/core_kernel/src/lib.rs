//! Core Kernel - Foundational types and utilities for the lending system
//!
//! This crate provides the fundamental building blocks used across the domain:
//! - Strongly-typed identifiers for applications, rules, notes and audit entries
//! - Annual percentage rates and cent rounding on top of `rust_decimal`
//! - The common kernel error type

pub mod rate;
pub mod identifiers;
pub mod error;

pub use rate::{Rate, RateError, round_to_cents};
pub use identifiers::{
    ApplicationId, RuleId, NoteId, HistoryEntryId, DecisionId,
};
pub use error::CoreError;
