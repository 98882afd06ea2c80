//! Test Utilities Crate
//!
//! Provides shared test infrastructure, fixtures, and helpers for the
//! loan desk test suites.
//!
//! # Modules
//!
//! - `fixtures`: Pre-built applicants, loan requests and rule sets
//! - `builders`: Builder patterns for applications and approval rules
//! - `generators`: Property-based test data generators

pub mod fixtures;
pub mod builders;
pub mod generators;

pub use fixtures::*;
pub use builders::*;
pub use generators::*;
