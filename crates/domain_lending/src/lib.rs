//! Lending Domain
//!
//! Credit decision core for the loan wizard and its back-office:
//! - **Calculator**: fixed-rate amortization over the loan catalog
//! - **Scoring**: income, debt ratio, employment and history folded into a 300–850 score
//! - **Rules**: prioritized, administrator-defined approval rules with first-hit evaluation
//! - **Aggregate**: the loan application and its audited lifecycle
//!
//! # Application Lifecycle
//!
//! ```text
//! Draft -> Submitted -> Evaluating -> Approved -> Disbursed
//!                                 \-> Rejected
//!                                 \-> InReview <-> PendingApproval -> Approved | Rejected
//! (any undecided state) -> Cancelled
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use domain_lending::{LoanCatalog, LoanOriginationService, RuleBook, RuleRegistry};
//!
//! let catalog = Arc::new(LoanCatalog::standard());
//! let registry = Arc::new(RuleRegistry::new(RuleBook::from_drafts(drafts)?));
//! let service = LoanOriginationService::new(catalog, registry);
//!
//! let outcome = service.process(&mut application)?;
//! ```

pub mod amortization;
pub mod applicant;
pub mod application;
pub mod catalog;
pub mod error;
pub mod field_registry;
pub mod reporting;
pub mod rule;
pub mod rule_book;
pub mod rules_engine;
pub mod scoring;
pub mod services;
pub mod validation;

pub use amortization::{calculate_loan, calculate_monthly_payment, LoanCalculation};
pub use applicant::{DocumentType, DocumentUpload, EmploymentType, LoanDetails, MaritalStatus, PersonalData, WorkInfo};
pub use application::{
    ApplicationHistoryEntry, ApplicationStatus, ApprovalDecision, ApprovalDecisionRecord, ApprovalNote,
    ApprovalType, HistoryAction, LoanApplication, RiskLevel, SYSTEM_ACTOR,
};
pub use catalog::{LoanCatalog, LoanProduct, LoanType};
pub use error::{LendingError, RuleError};
pub use field_registry::FieldValue;
pub use reporting::{ApplicationFilters, ApprovalStatistics, LoanTypeStats};
pub use rule::{
    ActionParameters, ActionType, ApprovalRule, ConditionOperator, Predicate, RuleAction, RuleCondition,
    RuleDraft, RuleUpdate,
};
pub use rule_book::{RuleBook, RuleRegistry};
pub use rules_engine::{RuleMatch, RuleOutcome, RulesEngine};
pub use scoring::{CreditRating, CreditScore, CreditScoringEngine, ScoreFactors};
pub use services::LoanOriginationService;
pub use validation::{ApplicationValidator, ValidationResult};
