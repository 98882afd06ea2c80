//! Applicant data collected by the wizard
//!
//! These records arrive from the wizard in its camelCase wire shape. Field
//! level bounds are declared with `validator` derives; cross-field checks
//! that need the loan catalog live in [`crate::validation`].

use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::fmt;
use validator::{Validate, ValidationError};

/// Lowest monthly income the wizard accepts
pub const MIN_MONTHLY_INCOME: Decimal = dec!(300);

/// Longest tenure the wizard accepts, in years
pub const MAX_WORK_YEARS: Decimal = dec!(50);

/// Smallest amount any loan type accepts
pub const MIN_LOAN_AMOUNT: Decimal = dec!(500);

/// Marital status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MaritalStatus {
    Soltero,
    Casado,
    Divorciado,
    Viudo,
}

impl MaritalStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            MaritalStatus::Soltero => "soltero",
            MaritalStatus::Casado => "casado",
            MaritalStatus::Divorciado => "divorciado",
            MaritalStatus::Viudo => "viudo",
        }
    }
}

/// Employment relationship
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmploymentType {
    /// Salaried employee
    Dependiente,
    /// Self-employed
    Independiente,
}

impl EmploymentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            EmploymentType::Dependiente => "dependiente",
            EmploymentType::Independiente => "independiente",
        }
    }
}

impl fmt::Display for EmploymentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Personal details from the first wizard step
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct PersonalData {
    #[validate(length(min = 3, max = 100, message = "Full name must be 3 to 100 characters"))]
    pub full_name: String,
    #[validate(length(min = 5, max = 20, message = "Document id must be 5 to 20 characters"))]
    pub document_id: String,
    pub birth_date: Option<NaiveDate>,
    pub marital_status: MaritalStatus,
    #[validate(length(min = 7, max = 15, message = "Phone must be 7 to 15 characters"))]
    pub phone: String,
    #[validate(email(message = "Invalid email address"))]
    pub email: String,
    #[validate(length(min = 10, max = 200, message = "Address must be 10 to 200 characters"))]
    pub address: String,
    /// Whether the applicant already banks with us
    #[serde(default)]
    pub is_existing_client: bool,
}

/// Employment details from the second wizard step
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct WorkInfo {
    pub employment_type: EmploymentType,
    #[validate(length(min = 2, max = 100, message = "Position must be 2 to 100 characters"))]
    pub position: String,
    #[validate(length(min = 2, max = 100, message = "Company name must be 2 to 100 characters"))]
    pub company_name: String,
    #[validate(custom(function = "validate_monthly_income"))]
    pub monthly_income: Decimal,
    #[validate(custom(function = "validate_work_years"))]
    pub work_years: Decimal,
    #[validate(length(min = 7, max = 15, message = "Company phone must be 7 to 15 characters"))]
    pub company_phone: String,
}

/// Requested amount and term
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct LoanDetails {
    #[validate(custom(function = "validate_loan_amount"))]
    pub amount: Decimal,
    /// Term in months
    #[validate(range(min = 6, message = "Term must be at least 6 months"))]
    pub term: u32,
    #[validate(length(min = 1, message = "Purpose is required"))]
    pub purpose: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub guarantee_type: Option<String>,
}

/// Supporting document kinds the wizard asks for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentType {
    /// Identity document
    Id,
    /// Proof of income
    Income,
    /// Utility bill as proof of address
    Utility,
}

impl DocumentType {
    /// Documents required before submission
    pub const REQUIRED: [DocumentType; 3] = [DocumentType::Id, DocumentType::Income, DocumentType::Utility];
}

impl fmt::Display for DocumentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            DocumentType::Id => "id",
            DocumentType::Income => "income",
            DocumentType::Utility => "utility",
        };
        f.write_str(label)
    }
}

/// Upload slot for one supporting document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentUpload {
    #[serde(rename = "type")]
    pub doc_type: DocumentType,
    pub name: String,
    pub uploaded: bool,
}

impl DocumentUpload {
    /// Creates an empty slot for a document type
    pub fn pending(doc_type: DocumentType, name: impl Into<String>) -> Self {
        Self {
            doc_type,
            name: name.into(),
            uploaded: false,
        }
    }

    /// Creates a slot already marked uploaded
    pub fn uploaded(doc_type: DocumentType, name: impl Into<String>) -> Self {
        Self {
            doc_type,
            name: name.into(),
            uploaded: true,
        }
    }
}

fn validate_monthly_income(income: &Decimal) -> Result<(), ValidationError> {
    if *income < MIN_MONTHLY_INCOME {
        let mut error = ValidationError::new("min_income");
        error.message = Some(format!("Monthly income must be at least {}", MIN_MONTHLY_INCOME).into());
        return Err(error);
    }
    Ok(())
}

fn validate_loan_amount(amount: &Decimal) -> Result<(), ValidationError> {
    if *amount < MIN_LOAN_AMOUNT {
        let mut error = ValidationError::new("min_amount");
        error.message = Some(format!("Amount must be at least {}", MIN_LOAN_AMOUNT).into());
        return Err(error);
    }
    Ok(())
}

fn validate_work_years(years: &Decimal) -> Result<(), ValidationError> {
    if *years < Decimal::ZERO || *years > MAX_WORK_YEARS {
        let mut error = ValidationError::new("work_years_range");
        error.message = Some(format!("Work years must be between 0 and {}", MAX_WORK_YEARS).into());
        return Err(error);
    }
    Ok(())
}
