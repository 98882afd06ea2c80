//! Lending domain services
//!
//! The origination service ties the catalog, the scoring engine and the
//! shared rule registry together to move an application from draft to a
//! decision or a reviewer's queue.

use std::sync::Arc;

use rust_decimal::Decimal;
use tracing::{info, warn};

use crate::amortization::{calculate_loan, LoanCalculation};
use crate::application::LoanApplication;
use crate::catalog::{LoanCatalog, LoanType};
use crate::error::LendingError;
use crate::rule_book::RuleRegistry;
use crate::rules_engine::{RuleOutcome, RulesEngine};
use crate::scoring::{CreditScore, CreditScoringEngine};
use crate::validation::ApplicationValidator;

/// Service for originating loan applications
///
/// # Example
///
/// ```rust,ignore
/// let service = LoanOriginationService::new(catalog, registry);
/// let outcome = service.process(&mut application)?;
/// println!("{} -> {}", application.id, application.status);
/// ```
pub struct LoanOriginationService {
    catalog: Arc<LoanCatalog>,
    scoring: CreditScoringEngine,
    engine: RulesEngine,
    rules: Arc<RuleRegistry>,
}

impl LoanOriginationService {
    /// Creates a service over a catalog and a shared rule registry
    pub fn new(catalog: Arc<LoanCatalog>, rules: Arc<RuleRegistry>) -> Self {
        Self {
            scoring: CreditScoringEngine::new(Arc::clone(&catalog)),
            engine: RulesEngine::new(),
            catalog,
            rules,
        }
    }

    pub fn catalog(&self) -> &LoanCatalog {
        &self.catalog
    }

    pub fn rules(&self) -> &Arc<RuleRegistry> {
        &self.rules
    }

    /// Prices a loan at the catalog rate
    pub fn quote(&self, loan_type: LoanType, amount: Decimal, term: u32) -> Result<LoanCalculation, LendingError> {
        calculate_loan(&self.catalog, loan_type, amount, term)
    }

    /// Scores an application without changing it
    pub fn score(&self, application: &LoanApplication) -> Result<CreditScore, LendingError> {
        self.scoring.calculate(
            &application.work_info,
            &application.loan_details,
            application.is_existing_client(),
        )
    }

    /// Validates, scores and submits a draft
    ///
    /// # Returns
    ///
    /// Non-fatal warnings raised along the way
    ///
    /// # Errors
    ///
    /// Returns `LendingError::Validation` with every failed check, or
    /// `LendingError::InvalidStateTransition` if the application is not a draft.
    pub fn submit(&self, application: &mut LoanApplication) -> Result<Vec<String>, LendingError> {
        let mut warnings = ApplicationValidator::validate(application, &self.catalog).into_result()?;

        let score = self.score(application)?;
        application.submit(score)?;

        warnings.extend(ApplicationValidator::score_warnings(application));
        for warning in &warnings {
            warn!(application_id = %application.id, warning = %warning, "Submission warning");
        }
        Ok(warnings)
    }

    /// Runs the active rules against a submitted application and applies the outcome
    ///
    /// The rule set is read once as a snapshot; concurrent rule edits take
    /// effect on the next evaluation.
    pub fn evaluate(&self, application: &mut LoanApplication) -> Result<RuleOutcome, LendingError> {
        let snapshot = self.rules.snapshot()?;
        application.begin_evaluation()?;

        let outcome = self.engine.evaluate_ordered(application, &snapshot);
        application.apply_rule_outcome(&outcome)?;

        info!(
            application_id = %application.id,
            status = %application.status,
            matched = outcome.is_match(),
            "Application evaluated"
        );
        Ok(outcome)
    }

    /// Submits a draft and evaluates it
    pub fn process(&self, application: &mut LoanApplication) -> Result<RuleOutcome, LendingError> {
        self.submit(application)?;
        self.evaluate(application)
    }
}
