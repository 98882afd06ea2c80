//! Loan Desk Command Line
//!
//! Back-office entry point to the lending domain.
//!
//! # Architecture
//!
//! - **Config**: layered file and environment configuration
//! - **Desk**: `quote`, `score` and `evaluate` over the origination service
//! - **Error Handling**: one error type mapped to process exit codes
//!
//! # Example
//!
//! ```rust,ignore
//! use interface_cli::{config::DeskConfig, desk::{load_application, LoanDesk}};
//!
//! let config = DeskConfig::load()?;
//! let desk = LoanDesk::from_config(&config, None)?;
//! let summary = desk.evaluate(load_application(path)?)?;
//! ```

pub mod config;
pub mod desk;
pub mod error;

pub use config::DeskConfig;
pub use desk::{load_application, load_rules, ApplicationInput, EvaluationSummary, LoanDesk, ScoreReport};
pub use error::DeskError;
