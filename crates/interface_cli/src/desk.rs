//! Loan desk commands
//!
//! Each command reads wizard JSON, runs it through the origination service
//! and returns a serialisable report.

use std::fs;
use std::path::Path;
use std::sync::Arc;

use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::info;

use core_kernel::ApplicationId;
use domain_lending::{
    ApplicationStatus, ApprovalType, CreditScore, DocumentUpload, LendingError, LoanApplication, LoanCalculation,
    LoanCatalog, LoanDetails, LoanOriginationService, LoanType, PersonalData, RiskLevel, RuleBook, RuleDraft,
    RuleOutcome, RuleRegistry, WorkInfo,
};

use crate::config::DeskConfig;
use crate::error::DeskError;

/// A completed wizard, as exported by the front end
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationInput {
    pub loan_type: LoanType,
    pub personal_data: PersonalData,
    pub work_info: WorkInfo,
    pub loan_details: LoanDetails,
    #[serde(default)]
    pub documents: Vec<DocumentUpload>,
}

impl ApplicationInput {
    /// Creates a priced draft
    pub fn into_application(self, catalog: &LoanCatalog) -> Result<LoanApplication, LendingError> {
        LoanApplication::draft(
            catalog,
            self.loan_type,
            self.personal_data,
            self.work_info,
            self.loan_details,
            self.documents,
        )
    }
}

/// Output of `score`
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreReport {
    pub calculation: LoanCalculation,
    pub credit_score: CreditScore,
}

/// Output of `evaluate`
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluationSummary {
    pub id: ApplicationId,
    pub status: ApplicationStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub approval_type: Option<ApprovalType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub risk_level: Option<RiskLevel>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub approved_amount: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assigned_to: Option<String>,
    pub credit_score: Option<CreditScore>,
    pub outcome: RuleOutcome,
    pub warnings: Vec<String>,
}

impl EvaluationSummary {
    fn new(application: LoanApplication, outcome: RuleOutcome, warnings: Vec<String>) -> Self {
        Self {
            id: application.id,
            status: application.status,
            approval_type: application.approval_type,
            risk_level: application.risk_level,
            approved_amount: application.decision.and_then(|d| d.approved_amount),
            assigned_to: application.assigned_to,
            credit_score: application.credit_score,
            outcome,
            warnings,
        }
    }
}

/// Front desk over the origination service
pub struct LoanDesk {
    service: LoanOriginationService,
}

impl LoanDesk {
    pub fn new(catalog: Arc<LoanCatalog>, rules: RuleBook) -> Self {
        Self {
            service: LoanOriginationService::new(catalog, Arc::new(RuleRegistry::new(rules))),
        }
    }

    /// Builds a desk from configuration
    ///
    /// `rules_override` takes precedence over the configured `rules_path`;
    /// with neither, the rule book is empty and every application goes to review.
    pub fn from_config(config: &DeskConfig, rules_override: Option<&Path>) -> Result<Self, DeskError> {
        config.validate()?;
        let catalog = config.catalog()?;

        let rules = match rules_override.or(config.rules_path.as_deref()) {
            Some(path) => load_rules(path)?,
            None => RuleBook::new(),
        };
        info!(rules = rules.len(), "Loan desk ready");

        Ok(Self::new(catalog, rules))
    }

    pub fn service(&self) -> &LoanOriginationService {
        &self.service
    }

    /// Prices a loan
    pub fn quote(&self, loan_type: LoanType, amount: Decimal, term: u32) -> Result<LoanCalculation, DeskError> {
        Ok(self.service.quote(loan_type, amount, term)?)
    }

    /// Scores a wizard without submitting it
    pub fn score(&self, input: ApplicationInput) -> Result<ScoreReport, DeskError> {
        let application = input.into_application(self.service.catalog())?;
        let credit_score = self.service.score(&application)?;
        Ok(ScoreReport {
            calculation: application.calculation,
            credit_score,
        })
    }

    /// Submits a wizard and evaluates it against the rule book
    pub fn evaluate(&self, input: ApplicationInput) -> Result<EvaluationSummary, DeskError> {
        let mut application = input.into_application(self.service.catalog())?;
        let warnings = self.service.submit(&mut application)?;
        let outcome = self.service.evaluate(&mut application)?;
        Ok(EvaluationSummary::new(application, outcome, warnings))
    }
}

/// Reads a wizard export
pub fn load_application(path: &Path) -> Result<ApplicationInput, DeskError> {
    read_json(path)
}

/// Reads a JSON array of rule drafts into a rule book
pub fn load_rules(path: &Path) -> Result<RuleBook, DeskError> {
    let drafts: Vec<RuleDraft> = read_json(path)?;
    Ok(RuleBook::from_drafts(drafts)?)
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, DeskError> {
    let text = fs::read_to_string(path).map_err(|source| DeskError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&text).map_err(|source| DeskError::Parse {
        path: path.to_path_buf(),
        source,
    })
}
