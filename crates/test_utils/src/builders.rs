//! Test Data Builders
//!
//! Builders start from the fixtures so tests only spell out the fields
//! they care about.

use std::sync::Arc;

use chrono::Utc;
use domain_lending::{
    ApprovalRule, CreditScoringEngine, DocumentType, DocumentUpload, LoanApplication, LoanDetails, LoanType,
    PersonalData, Predicate, RuleAction, RuleCondition, RuleDraft, WorkInfo,
};
use rust_decimal::Decimal;
use serde_json::{json, Value};

use crate::fixtures::{ApplicantFixtures, STANDARD_CATALOG};

/// Builder for loan applications
#[derive(Debug, Clone)]
pub struct LoanApplicationBuilder {
    loan_type: LoanType,
    personal_data: PersonalData,
    work_info: WorkInfo,
    loan_details: LoanDetails,
    documents: Vec<DocumentUpload>,
}

impl Default for LoanApplicationBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl LoanApplicationBuilder {
    /// Personal loan of 10000 over 24 months for a salaried existing client
    pub fn new() -> Self {
        Self {
            loan_type: LoanType::Personal,
            personal_data: ApplicantFixtures::personal_data(),
            work_info: ApplicantFixtures::salaried_work_info(),
            loan_details: ApplicantFixtures::personal_loan(),
            documents: ApplicantFixtures::all_documents(),
        }
    }

    pub fn with_loan_type(mut self, loan_type: LoanType) -> Self {
        self.loan_type = loan_type;
        self
    }

    pub fn with_amount(mut self, amount: Decimal) -> Self {
        self.loan_details.amount = amount;
        self
    }

    pub fn with_term(mut self, term: u32) -> Self {
        self.loan_details.term = term;
        self
    }

    pub fn with_personal_data(mut self, personal_data: PersonalData) -> Self {
        self.personal_data = personal_data;
        self
    }

    pub fn with_work_info(mut self, work_info: WorkInfo) -> Self {
        self.work_info = work_info;
        self
    }

    pub fn with_monthly_income(mut self, income: Decimal) -> Self {
        self.work_info.monthly_income = income;
        self
    }

    pub fn existing_client(mut self, is_existing_client: bool) -> Self {
        self.personal_data.is_existing_client = is_existing_client;
        self
    }

    /// Drops the upload for one document type
    pub fn without_document(mut self, doc_type: DocumentType) -> Self {
        self.documents.retain(|d| d.doc_type != doc_type);
        self
    }

    /// Builds a priced draft against the standard catalog
    pub fn build(self) -> LoanApplication {
        LoanApplication::draft(
            &STANDARD_CATALOG,
            self.loan_type,
            self.personal_data,
            self.work_info,
            self.loan_details,
            self.documents,
        )
        .unwrap()
    }

    /// Builds, scores and submits the application
    pub fn build_submitted(self) -> LoanApplication {
        let mut application = self.build();
        let score = CreditScoringEngine::new(Arc::clone(&STANDARD_CATALOG))
            .calculate(&application.work_info, &application.loan_details, application.is_existing_client())
            .unwrap();
        application.submit(score).unwrap();
        application
    }

    /// Builds a submitted application already in rule evaluation
    pub fn build_evaluating(self) -> LoanApplication {
        let mut application = self.build_submitted();
        application.begin_evaluation().unwrap();
        application
    }

    /// The wizard export shape read by the loan desk
    pub fn to_wizard_json(&self) -> Value {
        json!({
            "loanType": self.loan_type,
            "personalData": self.personal_data,
            "workInfo": self.work_info,
            "loanDetails": self.loan_details,
            "documents": self.documents,
        })
    }
}

/// Builder for approval rules
#[derive(Debug, Clone)]
pub struct RuleDraftBuilder {
    name: String,
    priority: u32,
    conditions: Vec<RuleCondition>,
    action: RuleAction,
    is_active: bool,
}

impl RuleDraftBuilder {
    /// Active manual-review rule with no conditions yet
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            priority: 0,
            conditions: Vec::new(),
            action: RuleAction::manual_review(),
            is_active: true,
        }
    }

    pub fn priority(mut self, priority: u32) -> Self {
        self.priority = priority;
        self
    }

    /// Adds a condition
    pub fn when(mut self, field: &str, predicate: Predicate) -> Self {
        self.conditions.push(RuleCondition::new(field, predicate));
        self
    }

    pub fn then(mut self, action: RuleAction) -> Self {
        self.action = action;
        self
    }

    pub fn inactive(mut self) -> Self {
        self.is_active = false;
        self
    }

    pub fn build(self) -> RuleDraft {
        let draft = RuleDraft::new(self.name, self.priority, self.conditions, self.action);
        if self.is_active {
            draft
        } else {
            draft.inactive()
        }
    }

    /// Builds the rule, panicking if the draft is incomplete
    pub fn build_rule(self) -> ApprovalRule {
        self.build().into_rule(Utc::now()).unwrap()
    }
}
