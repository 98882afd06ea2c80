//! Submission validation
//!
//! Checks a draft before it may be submitted.
//!
//! # Validation Rules
//!
//! ## Field bounds
//! - Personal data, work info and loan details satisfy their `validator` bounds
//! - Birth date is present
//!
//! ## Catalog
//! - Amount lies within the loan type's minimum and maximum
//! - Term is one of the loan type's allowed terms
//!
//! ## Documents
//! - Identity, income and utility documents are uploaded
//!
//! ## Warnings
//! - Requested amount exceeds what the applicant's score would approve

use chrono::Utc;
use validator::{Validate, ValidationErrors};

use crate::applicant::DocumentType;
use crate::application::LoanApplication;
use crate::catalog::LoanCatalog;
use crate::error::LendingError;

/// Result of application validation
#[derive(Debug, Clone)]
pub struct ValidationResult {
    /// Whether the application may be submitted
    pub is_valid: bool,
    /// List of validation errors
    pub errors: Vec<String>,
    /// List of validation warnings (non-fatal issues)
    pub warnings: Vec<String>,
}

impl ValidationResult {
    /// Creates a successful validation result
    pub fn ok() -> Self {
        Self {
            is_valid: true,
            errors: Vec::new(),
            warnings: Vec::new(),
        }
    }

    /// Adds an error to the result
    pub fn add_error(&mut self, error: impl Into<String>) {
        self.errors.push(error.into());
        self.is_valid = false;
    }

    /// Adds a warning to the result
    pub fn add_warning(&mut self, warning: impl Into<String>) {
        self.warnings.push(warning.into());
    }

    /// Converts a failed result into a `LendingError::Validation` joining all errors
    pub fn into_result(self) -> Result<Vec<String>, LendingError> {
        if self.is_valid {
            Ok(self.warnings)
        } else {
            Err(LendingError::validation(self.errors.join("; ")))
        }
    }
}

impl Default for ValidationResult {
    fn default() -> Self {
        Self::ok()
    }
}

/// Validator for loan applications
///
/// # Examples
///
/// ```rust,ignore
/// let result = ApplicationValidator::validate(&application, &catalog);
/// if !result.is_valid {
///     for error in result.errors {
///         println!("Validation error: {}", error);
///     }
/// }
/// ```
pub struct ApplicationValidator;

impl ApplicationValidator {
    /// Validates an application against the catalog
    pub fn validate(application: &LoanApplication, catalog: &LoanCatalog) -> ValidationResult {
        let mut result = ValidationResult::ok();

        Self::collect(&mut result, "personalData", application.personal_data.validate());
        Self::collect(&mut result, "workInfo", application.work_info.validate());
        Self::collect(&mut result, "loanDetails", application.loan_details.validate());

        if application.personal_data.birth_date.is_none() {
            result.add_error("personalData.birthDate: Birth date is required");
        } else if application.personal_data.birth_date > Some(Utc::now().date_naive()) {
            result.add_error("personalData.birthDate: Birth date must be in the past");
        }

        Self::validate_against_catalog(application, catalog, &mut result);
        Self::validate_documents(application, &mut result);

        for warning in Self::score_warnings(application) {
            result.add_warning(warning);
        }

        result
    }

    /// Non-fatal findings that depend on the credit score
    pub fn score_warnings(application: &LoanApplication) -> Vec<String> {
        let Some(score) = &application.credit_score else {
            return Vec::new();
        };

        let mut warnings = Vec::new();
        if application.loan_details.amount > score.max_approved_amount {
            warnings.push(format!(
                "Requested amount {} exceeds the approvable amount {}",
                application.loan_details.amount, score.max_approved_amount
            ));
        }
        if !score.approved {
            warnings.push(format!("Score {} ({}) does not meet approval criteria", score.score, score.rating));
        }
        warnings
    }

    fn validate_against_catalog(application: &LoanApplication, catalog: &LoanCatalog, result: &mut ValidationResult) {
        let product = catalog.product(application.loan_type);
        let details = &application.loan_details;

        if !product.accepts_amount(details.amount) {
            result.add_error(format!(
                "loanDetails.amount: {} must be between {} and {} for {}",
                details.amount, product.min_amount, product.max_amount, product.loan_type
            ));
        }

        if !product.accepts_term(details.term) {
            let allowed: Vec<String> = product.terms.iter().map(u32::to_string).collect();
            result.add_error(format!(
                "loanDetails.term: {} months is not offered for {} (allowed: {})",
                details.term,
                product.loan_type,
                allowed.join(", ")
            ));
        }
    }

    fn validate_documents(application: &LoanApplication, result: &mut ValidationResult) {
        for doc_type in DocumentType::REQUIRED {
            if !application.has_document(doc_type) {
                result.add_error(format!("documents: {} document has not been uploaded", doc_type));
            }
        }
    }

    fn collect(result: &mut ValidationResult, section: &str, outcome: Result<(), ValidationErrors>) {
        let Err(errors) = outcome else {
            return;
        };

        let mut messages: Vec<String> = errors
            .field_errors()
            .into_iter()
            .flat_map(|(field, field_errors)| {
                field_errors.iter().map(move |e| {
                    let message = e
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| e.code.to_string());
                    format!("{}.{}: {}", section, field, message)
                })
            })
            .collect();
        messages.sort();

        for message in messages {
            result.add_error(message);
        }
    }
}
