//! Back-office Reporting Tests
//!
//! # Test Organization
//!
//! - `statistics` - Dashboard counts and rates
//! - `filters` - Application list filtering

use chrono::{Duration, NaiveDate, TimeZone, Utc};
use domain_lending::applicant::{
    DocumentType, DocumentUpload, EmploymentType, LoanDetails, MaritalStatus, PersonalData, WorkInfo,
};
use domain_lending::application::{ApplicationStatus, ApprovalType, LoanApplication, RiskLevel};
use domain_lending::catalog::{LoanCatalog, LoanType};
use domain_lending::reporting::{ApplicationFilters, ApprovalStatistics};
use domain_lending::rule::{Predicate, RuleAction, RuleCondition, RuleDraft};
use domain_lending::rules_engine::{RuleMatch, RuleOutcome};
use domain_lending::scoring::CreditScoringEngine;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

// ============================================================================
// TEST FIXTURES
// ============================================================================

fn draft(name: &str, document_id: &str, loan_type: LoanType, amount: Decimal, term: u32) -> LoanApplication {
    let personal_data = PersonalData {
        full_name: name.to_string(),
        document_id: document_id.to_string(),
        birth_date: NaiveDate::from_ymd_opt(1985, 6, 30),
        marital_status: MaritalStatus::Divorciado,
        phone: "5550001111".to_string(),
        email: format!("{}@example.com", name.to_lowercase().replace(' ', ".")),
        address: "Boulevard Oroño 1200, Rosario".to_string(),
        is_existing_client: false,
    };
    let work_info = WorkInfo {
        employment_type: EmploymentType::Dependiente,
        position: "Operario".to_string(),
        company_name: "Textil Norte".to_string(),
        monthly_income: dec!(5000),
        work_years: dec!(3),
        company_phone: "5550002".to_string(),
    };
    let loan_details = LoanDetails {
        amount,
        term,
        purpose: "capital".to_string(),
        guarantee_type: None,
    };
    let documents = DocumentType::REQUIRED
        .iter()
        .map(|t| DocumentUpload::uploaded(*t, format!("{}.pdf", t)))
        .collect();

    LoanApplication::draft(&LoanCatalog::standard(), loan_type, personal_data, work_info, loan_details, documents)
        .unwrap()
}

fn evaluating(app: &mut LoanApplication) {
    let score = CreditScoringEngine::default()
        .calculate(&app.work_info, &app.loan_details, app.is_existing_client())
        .unwrap();
    app.submit(score).unwrap();
    app.begin_evaluation().unwrap();
}

fn auto_approve() -> RuleOutcome {
    let rule = RuleDraft::new(
        "Todo aprobado",
        0,
        vec![RuleCondition::new("loanDetails.amount", Predicate::GreaterThan(Decimal::ZERO))],
        RuleAction::auto_approve(None),
    )
    .into_rule(Utc::now())
    .unwrap();

    RuleOutcome::Matched(RuleMatch {
        rule_id: rule.id,
        rule_name: rule.name,
        priority: rule.priority,
        action: rule.action,
    })
}

/// Pins submission and review times so processing hours are exact
fn timed(mut app: LoanApplication, submitted_day: u32, hours_to_decision: i64) -> LoanApplication {
    let submitted = Utc.with_ymd_and_hms(2026, 3, submitted_day, 9, 0, 0).unwrap();
    app.submitted_at = Some(submitted);
    if app.reviewed_at.is_some() {
        app.reviewed_at = Some(submitted + Duration::hours(hours_to_decision));
    }
    app
}

/// One application in every interesting state
fn portfolio() -> Vec<LoanApplication> {
    let still_draft = draft("Ana Draft", "10000001", LoanType::Personal, dec!(3000), 12);

    let mut submitted = draft("Bruno Submitted", "10000002", LoanType::Personal, dec!(4000), 12);
    let score = CreditScoringEngine::default()
        .calculate(&submitted.work_info, &submitted.loan_details, false)
        .unwrap();
    submitted.submit(score).unwrap();

    let mut in_review = draft("Carmen Review", "10000003", LoanType::Vehicular, dec!(20000), 36);
    evaluating(&mut in_review);
    in_review.apply_rule_outcome(&RuleOutcome::NoMatch).unwrap();
    in_review.assign("ana.lopez", "supervisor").unwrap();

    let mut auto_one = draft("Diego Auto", "10000004", LoanType::Personal, dec!(6000), 24);
    evaluating(&mut auto_one);
    auto_one.apply_rule_outcome(&auto_approve()).unwrap();

    let mut auto_two = draft("Elena Auto", "10000005", LoanType::Negocio, dec!(9000), 24);
    evaluating(&mut auto_two);
    auto_two.apply_rule_outcome(&auto_approve()).unwrap();
    auto_two.mark_disbursed("tesoreria").unwrap();

    let mut manual = draft("Fabio Manual", "10000006", LoanType::Hipotecario, dec!(90000), 240);
    evaluating(&mut manual);
    manual.apply_rule_outcome(&RuleOutcome::NoMatch).unwrap();
    manual.approve("ana.lopez", None, None).unwrap();

    let mut rejected = draft("Gisela Rejected", "10000007", LoanType::Vehicular, dec!(30000), 48);
    evaluating(&mut rejected);
    rejected.apply_rule_outcome(&RuleOutcome::NoMatch).unwrap();
    rejected.reject("ana.lopez", "Inestable").unwrap();

    let mut cancelled = draft("Hugo Cancelled", "10000008", LoanType::Personal, dec!(2000), 6);
    evaluating(&mut cancelled);
    cancelled.cancel("Hugo Cancelled", "Desiste").unwrap();

    vec![
        still_draft,
        timed(submitted, 2, 0),
        timed(in_review, 3, 0),
        timed(auto_one, 4, 1),
        timed(auto_two, 5, 2),
        timed(manual, 6, 3),
        timed(rejected, 7, 6),
        timed(cancelled, 8, 0),
    ]
}

// ============================================================================
// STATISTICS
// ============================================================================

mod statistics {
    use super::*;

    /// Counts exclude drafts and bucket by status
    #[test]
    fn test_status_counts() {
        let stats = ApprovalStatistics::from_applications(&portfolio());

        assert_eq!(stats.total, 7);
        assert_eq!(stats.pending, 1);
        assert_eq!(stats.in_review, 1);
        assert_eq!(stats.approved, 3);
        assert_eq!(stats.rejected, 1);
    }

    /// Rates are rounded to one decimal
    #[test]
    fn test_rates() {
        let stats = ApprovalStatistics::from_applications(&portfolio());

        // 2 automatic approvals out of 7
        assert_eq!(stats.auto_approval_rate, dec!(28.6));
        // 3 approved out of 4 decided
        assert_eq!(stats.approval_rate, dec!(75.0));
        // (1 + 2 + 3 + 6) / 4
        assert_eq!(stats.average_processing_hours, dec!(3.0));
    }

    /// Per loan type breakdown covers every type
    #[test]
    fn test_by_loan_type() {
        let stats = ApprovalStatistics::from_applications(&portfolio());

        assert_eq!(stats.by_loan_type.len(), 4);
        let vehicular = stats.by_loan_type[&LoanType::Vehicular];
        assert_eq!(vehicular.total, 2);
        assert_eq!(vehicular.rejected, 1);
        assert_eq!(stats.by_loan_type[&LoanType::Negocio].approved, 1);
        assert_eq!(stats.by_loan_type[&LoanType::Personal].total, 3);
    }

    /// No applications means all zeros
    #[test]
    fn test_empty() {
        let stats = ApprovalStatistics::from_applications(&Vec::<LoanApplication>::new());

        assert_eq!(stats.total, 0);
        assert_eq!(stats.approval_rate, Decimal::ZERO);
        assert_eq!(stats.average_processing_hours, Decimal::ZERO);
    }
}

// ============================================================================
// FILTERS
// ============================================================================

mod filters {
    use super::*;

    fn names(found: Vec<&LoanApplication>) -> Vec<&str> {
        found.into_iter().map(|a| a.personal_data.full_name.as_str()).collect()
    }

    /// Empty filters match everything
    #[test]
    fn test_default_matches_all() {
        let apps = portfolio();
        assert_eq!(ApplicationFilters::default().apply(&apps).len(), apps.len());
    }

    /// Status and loan type lists are alternatives within, conjunctive across
    #[test]
    fn test_status_and_type() {
        let apps = portfolio();
        let filters = ApplicationFilters {
            status: vec![ApplicationStatus::Approved, ApplicationStatus::Disbursed],
            loan_type: vec![LoanType::Personal, LoanType::Negocio],
            ..Default::default()
        };

        assert_eq!(names(filters.apply(&apps)), vec!["Diego Auto", "Elena Auto"]);
    }

    /// Approval type and assignee
    #[test]
    fn test_approval_type_and_assignee() {
        let apps = portfolio();

        let manual = ApplicationFilters {
            approval_type: vec![ApprovalType::Manual],
            status: vec![ApplicationStatus::Approved],
            ..Default::default()
        };
        assert_eq!(names(manual.apply(&apps)), vec!["Fabio Manual"]);

        let assigned = ApplicationFilters {
            assigned_to: Some("ana.lopez".to_string()),
            ..Default::default()
        };
        assert_eq!(names(assigned.apply(&apps)), vec!["Carmen Review"]);
    }

    /// Search spans name, email and document id, ignoring case
    #[test]
    fn test_search_term() {
        let apps = portfolio();
        let by = |term: &str| ApplicationFilters {
            search_term: Some(term.to_string()),
            ..Default::default()
        };

        assert_eq!(names(by("gisela").apply(&apps)), vec!["Gisela Rejected"]);
        assert_eq!(names(by("10000004").apply(&apps)), vec!["Diego Auto"]);
        assert_eq!(names(by("HUGO.CANCELLED@").apply(&apps)), vec!["Hugo Cancelled"]);
        assert_eq!(by("   ").apply(&apps).len(), apps.len());

        let id = apps[5].id.to_string();
        assert_eq!(names(by(&id).apply(&apps)), vec!["Fabio Manual"]);
    }

    /// Date range applies to submission time; drafts never match
    #[test]
    fn test_date_range() {
        let apps = portfolio();
        let filters = ApplicationFilters {
            date_from: Some(Utc.with_ymd_and_hms(2026, 3, 4, 0, 0, 0).unwrap()),
            date_to: Some(Utc.with_ymd_and_hms(2026, 3, 6, 23, 59, 59).unwrap()),
            ..Default::default()
        };

        assert_eq!(names(filters.apply(&apps)), vec!["Diego Auto", "Elena Auto", "Fabio Manual"]);
    }

    /// Amount bounds are inclusive
    #[test]
    fn test_amount_range() {
        let apps = portfolio();
        let filters = ApplicationFilters {
            min_amount: Some(dec!(6000)),
            max_amount: Some(dec!(20000)),
            ..Default::default()
        };

        assert_eq!(names(filters.apply(&apps)), vec!["Carmen Review", "Diego Auto", "Elena Auto"]);
    }

    /// Risk level filter skips unscored drafts
    #[test]
    fn test_risk_level() {
        let apps = portfolio();
        let every_level = ApplicationFilters {
            risk_level: vec![RiskLevel::Low, RiskLevel::Medium, RiskLevel::High, RiskLevel::Critical],
            ..Default::default()
        };

        let found = every_level.apply(&apps);
        assert_eq!(found.len(), apps.len() - 1);
        assert!(found.iter().all(|a| a.status != ApplicationStatus::Draft));
    }

    /// Filters deserialize from the back-office query shape
    #[test]
    fn test_filters_from_json() {
        let filters: ApplicationFilters = serde_json::from_value(serde_json::json!({
            "status": ["in-review"],
            "searchTerm": "carmen"
        }))
        .unwrap();

        assert_eq!(names(filters.apply(&portfolio())), vec!["Carmen Review"]);
    }
}
