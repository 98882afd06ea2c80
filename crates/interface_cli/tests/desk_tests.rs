//! Integration tests for the loan desk
//!
//! These tests drive the desk the way the binary does: wizard exports and
//! rule drafts are read from JSON files, and failures map to exit codes.
//!
//! # Test Organization
//!
//! - `quotes` - Pricing against the configured catalog
//! - `scoring` - Score reports for wizard exports
//! - `evaluation` - Submission and rule evaluation from files
//! - `failures` - Read, parse, validation and configuration errors

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};

use domain_lending::{ApplicationStatus, ApprovalType, LoanType, RuleAction, RuleOutcome};
use interface_cli::{load_application, load_rules, ApplicationInput, DeskConfig, DeskError, LoanDesk};
use rust_decimal_macros::dec;
use serde_json::{json, Value};
use test_utils::{ApplicantFixtures, LoanApplicationBuilder, RuleDraftBuilder, RuleFixtures};

// ============================================================================
// Test Helpers
// ============================================================================

static FILE_COUNTER: AtomicUsize = AtomicUsize::new(0);

/// JSON file in the temp directory, removed on drop
struct TempJson(PathBuf);

impl TempJson {
    fn raw(contents: &str) -> Self {
        let name = format!(
            "loan-desk-{}-{}.json",
            std::process::id(),
            FILE_COUNTER.fetch_add(1, Ordering::Relaxed)
        );
        let path = std::env::temp_dir().join(name);
        fs::write(&path, contents).unwrap();
        Self(path)
    }

    fn new(value: &Value) -> Self {
        Self::raw(&serde_json::to_string_pretty(value).unwrap())
    }

    fn path(&self) -> &Path {
        &self.0
    }
}

impl Drop for TempJson {
    fn drop(&mut self) {
        let _ = fs::remove_file(&self.0);
    }
}

fn standard_rules_file() -> TempJson {
    TempJson::new(&serde_json::to_value(RuleFixtures::standard_drafts()).unwrap())
}

fn weak_applicant() -> LoanApplicationBuilder {
    LoanApplicationBuilder::new()
        .with_work_info(ApplicantFixtures::self_employed_work_info())
        .existing_client(false)
        .with_amount(dec!(5000))
}

fn input(builder: &LoanApplicationBuilder) -> ApplicationInput {
    serde_json::from_value(builder.to_wizard_json()).unwrap()
}

fn desk_with_rules(rules: &TempJson) -> LoanDesk {
    LoanDesk::from_config(&DeskConfig::default(), Some(rules.path())).unwrap()
}

// ============================================================================
// Quotes
// ============================================================================

mod quotes {
    use super::*;

    /// Quotes use the standard catalog by default
    #[test]
    fn test_standard_quote() {
        let desk = LoanDesk::from_config(&DeskConfig::default(), None).unwrap();
        let quote = desk.quote(LoanType::Personal, dec!(10000), 24).unwrap();

        assert_eq!(quote.monthly_payment, dec!(487.24));
        assert_eq!(quote.interest_rate, dec!(15.5));
        assert_eq!(quote.total_cost, dec!(11693.76));
        assert_eq!(quote.total_interest, dec!(1693.76));
    }

    /// Configured rates replace the catalog rate
    #[test]
    fn test_configured_rate() {
        let config = DeskConfig {
            rates: BTreeMap::from([(LoanType::Personal, dec!(12.5))]),
            ..Default::default()
        };
        let desk = LoanDesk::from_config(&config, None).unwrap();
        let quote = desk.quote(LoanType::Personal, dec!(10000), 24).unwrap();

        assert_eq!(quote.interest_rate, dec!(12.5));
        assert!(quote.monthly_payment < dec!(487.24));
    }

    /// A zero-month term is a domain error, not a panic
    #[test]
    fn test_zero_term() {
        let desk = LoanDesk::from_config(&DeskConfig::default(), None).unwrap();
        let err = desk.quote(LoanType::Negocio, dec!(5000), 0).unwrap_err();
        assert_eq!(err.exit_code(), 1);
    }
}

// ============================================================================
// Scoring
// ============================================================================

mod scoring {
    use super::*;

    /// The score report carries the quote and the score
    #[test]
    fn test_score_report() {
        let file = TempJson::new(&LoanApplicationBuilder::new().to_wizard_json());
        let desk = LoanDesk::from_config(&DeskConfig::default(), None).unwrap();

        let report = desk.score(load_application(file.path()).unwrap()).unwrap();

        assert_eq!(report.calculation.monthly_payment, dec!(487.24));
        assert_eq!(report.credit_score.score, 662);
        assert!(report.credit_score.approved);
    }

    /// Documents may be omitted from a wizard export
    #[test]
    fn test_documents_default_to_empty() {
        let mut wizard = LoanApplicationBuilder::new().to_wizard_json();
        wizard.as_object_mut().unwrap().remove("documents");

        let input: ApplicationInput = serde_json::from_value(wizard).unwrap();
        assert!(input.documents.is_empty());
    }
}

// ============================================================================
// Evaluation
// ============================================================================

mod evaluation {
    use super::*;

    /// A strong personal applicant is approved automatically
    #[test]
    fn test_auto_approved() {
        let rules = standard_rules_file();
        let summary = desk_with_rules(&rules)
            .evaluate(input(&LoanApplicationBuilder::new()))
            .unwrap();

        assert_eq!(summary.status, ApplicationStatus::Approved);
        assert_eq!(summary.approval_type, Some(ApprovalType::Automatic));
        assert_eq!(summary.approved_amount, Some(dec!(10000)));
        assert!(summary.warnings.is_empty());
        match &summary.outcome {
            RuleOutcome::Matched(hit) => assert_eq!(hit.rule_name, "Buen score personal"),
            RuleOutcome::NoMatch => panic!("expected a matching rule"),
        }
    }

    /// An unapproved score is rejected and warned about
    #[test]
    fn test_auto_rejected() {
        let rules = standard_rules_file();
        let summary = desk_with_rules(&rules).evaluate(input(&weak_applicant())).unwrap();

        assert_eq!(summary.status, ApplicationStatus::Rejected);
        assert_eq!(summary.credit_score.as_ref().map(|s| s.score), Some(345));
        assert!(summary.approved_amount.is_none());
        assert!(summary
            .warnings
            .iter()
            .any(|w| w.contains("does not meet approval criteria")));
    }

    /// Without rules every application goes to an analyst
    #[test]
    fn test_no_rules_goes_to_review() {
        let desk = LoanDesk::from_config(&DeskConfig::default(), None).unwrap();
        let summary = desk.evaluate(input(&LoanApplicationBuilder::new())).unwrap();

        assert_eq!(summary.status, ApplicationStatus::InReview);
        assert_eq!(summary.outcome, RuleOutcome::NoMatch);

        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["status"], "in-review");
        assert_eq!(json["outcome"]["outcome"], "no_match");
        assert!(json.get("approvedAmount").is_none());
    }

    /// The command-line rules file wins over the configured one
    #[test]
    fn test_rules_override_precedence() {
        let reject_all = TempJson::new(&json!([
            {
                "name": "Cerrado",
                "conditions": [
                    { "field": "loanType", "operator": "in", "value": "personal, vehicular, hipotecario, negocio" }
                ],
                "action": { "type": "auto_reject", "parameters": { "reason": "Cartera cerrada" } }
            }
        ]));
        let standard = standard_rules_file();
        let config = DeskConfig {
            rules_path: Some(reject_all.path().to_path_buf()),
            ..Default::default()
        };

        let configured = LoanDesk::from_config(&config, None)
            .unwrap()
            .evaluate(input(&LoanApplicationBuilder::new()))
            .unwrap();
        assert_eq!(configured.status, ApplicationStatus::Rejected);

        let overridden = LoanDesk::from_config(&config, Some(standard.path()))
            .unwrap()
            .evaluate(input(&LoanApplicationBuilder::new()))
            .unwrap();
        assert_eq!(overridden.status, ApplicationStatus::Approved);
    }

    /// Assignment rules route the application to the named analyst
    #[test]
    fn test_assignment_rule() {
        let draft = RuleDraftBuilder::new("Vehiculares a Ana")
            .when("loanType", domain_lending::Predicate::Equals("vehicular".into()))
            .then(RuleAction::assign_to("ana.lopez"))
            .build();
        let rules = TempJson::new(&serde_json::to_value(vec![draft]).unwrap());

        let wizard = LoanApplicationBuilder::new()
            .with_loan_type(LoanType::Vehicular)
            .with_amount(dec!(15000))
            .with_term(36);
        let summary = desk_with_rules(&rules).evaluate(input(&wizard)).unwrap();

        assert_eq!(summary.status, ApplicationStatus::InReview);
        assert_eq!(summary.assigned_to.as_deref(), Some("ana.lopez"));
    }

    /// Rules files load into a rule book in priority order
    #[test]
    fn test_load_rules() {
        let rules = standard_rules_file();
        let book = load_rules(rules.path()).unwrap();

        let names: Vec<&str> = book.list().map(|r| r.name.as_str()).collect();
        assert_eq!(names, ["Montos altos a revision", "Buen score personal", "Score no aprobado"]);
    }
}

// ============================================================================
// Failures
// ============================================================================

mod failures {
    use super::*;

    /// A missing file is an input error
    #[test]
    fn test_missing_file() {
        let path = std::env::temp_dir().join("loan-desk-does-not-exist.json");
        let err = load_application(&path).unwrap_err();

        assert!(matches!(err, DeskError::Read { .. }));
        assert_eq!(err.exit_code(), 66);
    }

    /// Malformed JSON is a data error
    #[test]
    fn test_malformed_json() {
        let file = TempJson::raw("{ \"loanType\": ");
        let err = load_application(file.path()).unwrap_err();

        assert!(matches!(err, DeskError::Parse { .. }));
        assert_eq!(err.exit_code(), 65);
    }

    /// A rule without conditions never loads
    #[test]
    fn test_empty_rule_rejected() {
        let file = TempJson::new(&json!([
            { "name": "Vacia", "conditions": [], "action": { "type": "require_manual_review" } }
        ]));
        let err = load_rules(file.path()).unwrap_err();
        assert!(matches!(err, DeskError::Lending(_)));
    }

    /// Applications outside the catalog fail validation
    #[test]
    fn test_validation_failure() {
        let desk = LoanDesk::from_config(&DeskConfig::default(), None).unwrap();
        let err = desk
            .evaluate(input(&LoanApplicationBuilder::new().with_amount(dec!(100))))
            .unwrap_err();

        assert!(err.to_string().contains("loanDetails.amount"));
        assert_eq!(err.exit_code(), 65);
    }

    /// Invalid configuration is reported before any work is done
    #[test]
    fn test_invalid_config() {
        let config = DeskConfig {
            rates: BTreeMap::from([(LoanType::Hipotecario, dec!(-2))]),
            ..Default::default()
        };
        let err = LoanDesk::from_config(&config, None).err().unwrap();

        assert!(matches!(err, DeskError::Config(_)));
        assert_eq!(err.exit_code(), 78);
    }
}
