//! Pre-built Test Fixtures
//!
//! Ready-to-use applicant data, catalog and rule sets. Fixtures are
//! deterministic; use [`crate::generators`] for random data.

use std::sync::Arc;

use chrono::NaiveDate;
use domain_lending::{
    DocumentType, DocumentUpload, EmploymentType, FieldValue, LoanCatalog, LoanDetails, MaritalStatus,
    PersonalData, Predicate, RuleAction, RuleCondition, RuleDraft, WorkInfo,
};
use once_cell::sync::Lazy;
use rust_decimal_macros::dec;

/// Standard loan catalog shared across tests
pub static STANDARD_CATALOG: Lazy<Arc<LoanCatalog>> = Lazy::new(|| Arc::new(LoanCatalog::standard()));

/// Fixture for applicant data
pub struct ApplicantFixtures;

impl ApplicantFixtures {
    /// Standard birth date (age 36 in 2026)
    pub fn birth_date() -> NaiveDate {
        NaiveDate::from_ymd_opt(1990, 5, 15).unwrap()
    }

    /// Existing client with complete, valid personal data
    pub fn personal_data() -> PersonalData {
        PersonalData {
            full_name: "Lucia Fernandez".to_string(),
            document_id: "40112233".to_string(),
            birth_date: Some(Self::birth_date()),
            marital_status: MaritalStatus::Casado,
            phone: "5551234567".to_string(),
            email: "lucia.fernandez@example.com".to_string(),
            address: "Av. Libertador 1450, Piso 3".to_string(),
            is_existing_client: true,
        }
    }

    /// Same applicant, without banking history
    pub fn new_client_personal_data() -> PersonalData {
        PersonalData {
            is_existing_client: false,
            ..Self::personal_data()
        }
    }

    /// Salaried, 4500 a month, 6 years in the job
    pub fn salaried_work_info() -> WorkInfo {
        WorkInfo {
            employment_type: EmploymentType::Dependiente,
            position: "Contadora".to_string(),
            company_name: "Grupo Austral".to_string(),
            monthly_income: dec!(4500),
            work_years: dec!(6),
            company_phone: "5559876".to_string(),
        }
    }

    /// Self-employed, 800 a month, just started
    pub fn self_employed_work_info() -> WorkInfo {
        WorkInfo {
            employment_type: EmploymentType::Independiente,
            position: "Artesana".to_string(),
            company_name: "Taller Propio".to_string(),
            monthly_income: dec!(800),
            work_years: dec!(0),
            company_phone: "5553210".to_string(),
        }
    }

    /// Personal loan of 10000 over 24 months
    pub fn personal_loan() -> LoanDetails {
        LoanDetails {
            amount: dec!(10000),
            term: 24,
            purpose: "refaccion".to_string(),
            guarantee_type: None,
        }
    }

    /// All required documents, uploaded
    pub fn all_documents() -> Vec<DocumentUpload> {
        DocumentType::REQUIRED
            .iter()
            .map(|t| DocumentUpload::uploaded(*t, format!("{}.pdf", t)))
            .collect()
    }
}

/// Fixture for approval rule sets
pub struct RuleFixtures;

impl RuleFixtures {
    /// Large amounts to review, good personal scores approved, unapproved scores rejected
    pub fn standard_drafts() -> Vec<RuleDraft> {
        vec![
            RuleDraft::new(
                "Montos altos a revision",
                0,
                vec![RuleCondition::new("loanDetails.amount", Predicate::GreaterThan(dec!(40000)))],
                RuleAction::manual_review(),
            ),
            RuleDraft::new(
                "Buen score personal",
                1,
                vec![
                    RuleCondition::new("creditScore.score", Predicate::GreaterThan(dec!(600))),
                    RuleCondition::new("loanType", Predicate::In(vec![FieldValue::from("personal")])),
                ],
                RuleAction::auto_approve(Some(dec!(30000))),
            ),
            RuleDraft::new(
                "Score no aprobado",
                2,
                vec![RuleCondition::new("creditScore.approved", Predicate::Equals(FieldValue::Flag(false)))],
                RuleAction::auto_reject("Score insuficiente"),
            ),
        ]
    }
}
