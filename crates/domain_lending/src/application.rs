//! Loan application aggregate
//!
//! A `LoanApplication` starts as a wizard draft, is scored on submission,
//! passes through rule evaluation and ends approved, rejected or with a
//! human reviewer. Every state change is checked against the transition
//! table in [`LoanApplication::can_transition_to`] and recorded in the
//! append-only history.

use std::fmt;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::info;

use core_kernel::{ApplicationId, DecisionId, HistoryEntryId, NoteId, RuleId};
use crate::amortization::{calculate_loan, LoanCalculation};
use crate::applicant::{DocumentType, DocumentUpload, LoanDetails, PersonalData, WorkInfo};
use crate::catalog::{LoanCatalog, LoanType};
use crate::error::LendingError;
use crate::rule::ActionType;
use crate::rules_engine::RuleOutcome;
use crate::scoring::{CreditRating, CreditScore};

/// Actor recorded for automatic transitions
pub const SYSTEM_ACTOR: &str = "system";

/// Application status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ApplicationStatus {
    /// Being filled in by the applicant
    Draft,
    /// Submitted and scored
    Submitted,
    /// Approval rules are being evaluated
    Evaluating,
    /// Waiting for an analyst
    InReview,
    /// Analyst recommendation awaiting sign-off
    PendingApproval,
    Approved,
    Rejected,
    /// Funds released
    Disbursed,
    /// Withdrawn before a decision
    Cancelled,
}

impl ApplicationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ApplicationStatus::Draft => "draft",
            ApplicationStatus::Submitted => "submitted",
            ApplicationStatus::Evaluating => "evaluating",
            ApplicationStatus::InReview => "in-review",
            ApplicationStatus::PendingApproval => "pending-approval",
            ApplicationStatus::Approved => "approved",
            ApplicationStatus::Rejected => "rejected",
            ApplicationStatus::Disbursed => "disbursed",
            ApplicationStatus::Cancelled => "cancelled",
        }
    }

    /// Returns true if no further transition is possible
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            ApplicationStatus::Rejected | ApplicationStatus::Disbursed | ApplicationStatus::Cancelled
        )
    }

    /// Returns true once an approve or reject decision has been made
    pub fn is_decided(&self) -> bool {
        matches!(
            self,
            ApplicationStatus::Approved | ApplicationStatus::Rejected | ApplicationStatus::Disbursed
        )
    }
}

impl fmt::Display for ApplicationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How the decision was reached
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApprovalType {
    Automatic,
    Manual,
}

/// Risk level shown to analysts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
    Critical,
}

impl RiskLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Low => "low",
            RiskLevel::Medium => "medium",
            RiskLevel::High => "high",
            RiskLevel::Critical => "critical",
        }
    }
}

impl From<CreditRating> for RiskLevel {
    fn from(rating: CreditRating) -> Self {
        match rating {
            CreditRating::Excelente => RiskLevel::Low,
            CreditRating::Bueno => RiskLevel::Medium,
            CreditRating::Regular => RiskLevel::High,
            CreditRating::Bajo => RiskLevel::Critical,
        }
    }
}

/// Outcome recorded in a decision
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApprovalDecision {
    Approved,
    Rejected,
}

/// Final decision on an application
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApprovalDecisionRecord {
    pub id: DecisionId,
    pub decision: ApprovalDecision,
    pub decision_type: ApprovalType,
    pub decided_by: String,
    pub decided_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub approved_amount: Option<Decimal>,
    /// Rule that produced an automatic decision
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rule_id: Option<RuleId>,
}

/// Analyst note
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApprovalNote {
    pub id: NoteId,
    pub author: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub is_internal: bool,
}

/// Kind of audit trail entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HistoryAction {
    Submitted,
    EvaluationStarted,
    AutoApproved,
    AutoRejected,
    SentToReview,
    Assigned,
    ForwardedForApproval,
    ReturnedToReview,
    Approved,
    Rejected,
    Disbursed,
    Cancelled,
    NoteAdded,
}

/// Append-only audit trail entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationHistoryEntry {
    pub id: HistoryEntryId,
    pub action: HistoryAction,
    pub performed_by: String,
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous_status: Option<ApplicationStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new_status: Option<ApplicationStatus>,
}

/// A loan application from draft to decision
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoanApplication {
    pub id: ApplicationId,
    pub loan_type: LoanType,
    pub personal_data: PersonalData,
    pub work_info: WorkInfo,
    pub loan_details: LoanDetails,
    pub documents: Vec<DocumentUpload>,
    /// Quote for the current loan type, amount and term
    pub calculation: LoanCalculation,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credit_score: Option<CreditScore>,
    pub status: ApplicationStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub approval_type: Option<ApprovalType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub risk_level: Option<RiskLevel>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assigned_to: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reviewed_by: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reviewed_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub decision: Option<ApprovalDecisionRecord>,
    #[serde(default)]
    pub notes: Vec<ApprovalNote>,
    #[serde(default)]
    pub history: Vec<ApplicationHistoryEntry>,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub submitted_at: Option<DateTime<Utc>>,
    pub last_updated_at: DateTime<Utc>,
}

impl LoanApplication {
    /// Creates a draft and prices it against the catalog
    ///
    /// # Errors
    ///
    /// Returns `LendingError::InvalidTerm` if the term is zero.
    pub fn draft(
        catalog: &LoanCatalog,
        loan_type: LoanType,
        personal_data: PersonalData,
        work_info: WorkInfo,
        loan_details: LoanDetails,
        documents: Vec<DocumentUpload>,
    ) -> Result<Self, LendingError> {
        let calculation = calculate_loan(catalog, loan_type, loan_details.amount, loan_details.term)?;
        let now = Utc::now();

        Ok(Self {
            id: ApplicationId::new_v7(),
            loan_type,
            personal_data,
            work_info,
            loan_details,
            documents,
            calculation,
            credit_score: None,
            status: ApplicationStatus::Draft,
            approval_type: None,
            risk_level: None,
            assigned_to: None,
            reviewed_by: None,
            reviewed_at: None,
            decision: None,
            notes: Vec::new(),
            history: Vec::new(),
            created_at: now,
            submitted_at: None,
            last_updated_at: now,
        })
    }

    /// Whether the applicant already banks with us
    pub fn is_existing_client(&self) -> bool {
        self.personal_data.is_existing_client
    }

    /// Changes loan type, amount or term on a draft and re-prices it
    ///
    /// # Errors
    ///
    /// Returns `LendingError::Validation` unless the application is a draft,
    /// or `LendingError::InvalidTerm` for a zero term.
    pub fn update_loan(
        &mut self,
        catalog: &LoanCatalog,
        loan_type: LoanType,
        loan_details: LoanDetails,
    ) -> Result<(), LendingError> {
        self.ensure_draft()?;
        self.calculation = calculate_loan(catalog, loan_type, loan_details.amount, loan_details.term)?;
        self.loan_type = loan_type;
        self.loan_details = loan_details;
        self.last_updated_at = Utc::now();
        Ok(())
    }

    /// Records an upload, replacing any earlier slot for the same document type
    ///
    /// # Errors
    ///
    /// Returns `LendingError::Validation` unless the application is a draft.
    pub fn attach_document(&mut self, upload: DocumentUpload) -> Result<(), LendingError> {
        self.ensure_draft()?;
        self.documents.retain(|d| d.doc_type != upload.doc_type);
        self.documents.push(upload);
        self.last_updated_at = Utc::now();
        Ok(())
    }

    /// Returns true if the given document has been uploaded
    pub fn has_document(&self, doc_type: DocumentType) -> bool {
        self.documents.iter().any(|d| d.doc_type == doc_type && d.uploaded)
    }

    /// Submits the draft with its credit score
    ///
    /// The risk level is derived from the score's rating.
    pub fn submit(&mut self, credit_score: CreditScore) -> Result<(), LendingError> {
        let applicant = self.personal_data.full_name.clone();
        let details = format!("Score {} ({})", credit_score.score, credit_score.rating);
        self.transition(
            ApplicationStatus::Submitted,
            HistoryAction::Submitted,
            &applicant,
            Some(details),
        )?;

        let now = self.last_updated_at;
        self.risk_level = Some(RiskLevel::from(credit_score.rating));
        self.credit_score = Some(credit_score);
        self.submitted_at = Some(now);

        info!(application_id = %self.id, risk_level = ?self.risk_level, "Application submitted");
        Ok(())
    }

    /// Moves a submitted application into rule evaluation
    ///
    /// # Errors
    ///
    /// Returns `LendingError::MissingCreditScore` if the application was never scored.
    pub fn begin_evaluation(&mut self) -> Result<(), LendingError> {
        if self.credit_score.is_none() {
            return Err(LendingError::MissingCreditScore);
        }
        self.transition(
            ApplicationStatus::Evaluating,
            HistoryAction::EvaluationStarted,
            SYSTEM_ACTOR,
            None,
        )
    }

    /// Applies the result of rule evaluation
    ///
    /// Auto-approve and auto-reject decide the application; manual review,
    /// assignment and no match send it to an analyst.
    pub fn apply_rule_outcome(&mut self, outcome: &RuleOutcome) -> Result<(), LendingError> {
        if self.status != ApplicationStatus::Evaluating {
            return Err(LendingError::transition(self.status, "rule outcome"));
        }

        let matched = match outcome {
            RuleOutcome::Matched(matched) => matched,
            RuleOutcome::NoMatch => {
                return self.send_to_review(None, "No automatic rule matched".to_string());
            }
        };

        let parameters = &matched.action.parameters;
        let rule_label = format!("Rule '{}'", matched.rule_name);

        match matched.action.kind {
            ActionType::AutoApprove => {
                let requested = self.loan_details.amount;
                let amount = parameters.max_amount.map_or(requested, |cap| requested.min(cap));
                self.decide(
                    ApprovalDecision::Approved,
                    ApprovalType::Automatic,
                    SYSTEM_ACTOR,
                    Some(parameters.reason.clone().unwrap_or(rule_label)),
                    Some(amount),
                    Some(matched.rule_id),
                )
            }
            ActionType::AutoReject => self.decide(
                ApprovalDecision::Rejected,
                ApprovalType::Automatic,
                SYSTEM_ACTOR,
                Some(parameters.reason.clone().unwrap_or(rule_label)),
                None,
                Some(matched.rule_id),
            ),
            ActionType::RequireManualReview => self.send_to_review(None, rule_label),
            ActionType::AssignTo => self.send_to_review(parameters.assign_to.clone(), rule_label),
        }
    }

    /// Manually approves the application
    ///
    /// `approved_amount` defaults to the requested amount.
    pub fn approve(
        &mut self,
        reviewer: &str,
        approved_amount: Option<Decimal>,
        reason: Option<String>,
    ) -> Result<(), LendingError> {
        let amount = approved_amount.unwrap_or(self.loan_details.amount);
        self.decide(
            ApprovalDecision::Approved,
            ApprovalType::Manual,
            reviewer,
            reason,
            Some(amount),
            None,
        )
    }

    /// Manually rejects the application
    pub fn reject(&mut self, reviewer: &str, reason: impl Into<String>) -> Result<(), LendingError> {
        self.decide(
            ApprovalDecision::Rejected,
            ApprovalType::Manual,
            reviewer,
            Some(reason.into()),
            None,
            None,
        )
    }

    /// Forwards an analyst recommendation for sign-off
    pub fn forward_for_approval(&mut self, reviewer: &str, details: Option<String>) -> Result<(), LendingError> {
        self.transition(
            ApplicationStatus::PendingApproval,
            HistoryAction::ForwardedForApproval,
            reviewer,
            details,
        )
    }

    /// Sends an application awaiting sign-off back to an analyst
    pub fn return_to_review(&mut self, reviewer: &str, reason: impl Into<String>) -> Result<(), LendingError> {
        self.transition(
            ApplicationStatus::InReview,
            HistoryAction::ReturnedToReview,
            reviewer,
            Some(reason.into()),
        )
    }

    /// Assigns the application to an analyst
    ///
    /// # Errors
    ///
    /// Returns `LendingError::InvalidStateTransition` for drafts and applications
    /// that can no longer change.
    pub fn assign(&mut self, assignee: impl Into<String>, performed_by: &str) -> Result<(), LendingError> {
        if self.status == ApplicationStatus::Draft || self.status.is_terminal() {
            return Err(LendingError::transition(self.status, "assignment"));
        }
        let assignee = assignee.into();
        self.record(
            HistoryAction::Assigned,
            performed_by,
            Some(format!("Assigned to {}", assignee)),
            None,
        );
        self.assigned_to = Some(assignee);
        Ok(())
    }

    /// Appends an analyst note
    pub fn add_note(&mut self, author: &str, content: impl Into<String>, is_internal: bool) -> NoteId {
        let note = ApprovalNote {
            id: NoteId::new_v7(),
            author: author.to_string(),
            content: content.into(),
            created_at: Utc::now(),
            is_internal,
        };
        let id = note.id;
        self.notes.push(note);
        self.record(HistoryAction::NoteAdded, author, None, None);
        id
    }

    /// Records disbursal of an approved loan
    pub fn mark_disbursed(&mut self, performed_by: &str) -> Result<(), LendingError> {
        self.transition(ApplicationStatus::Disbursed, HistoryAction::Disbursed, performed_by, None)
    }

    /// Cancels an undecided application
    pub fn cancel(&mut self, performed_by: &str, reason: impl Into<String>) -> Result<(), LendingError> {
        self.transition(
            ApplicationStatus::Cancelled,
            HistoryAction::Cancelled,
            performed_by,
            Some(reason.into()),
        )
    }

    /// Checks if transition is valid
    pub fn can_transition_to(&self, target: ApplicationStatus) -> bool {
        use ApplicationStatus::*;
        matches!(
            (self.status, target),
            (Draft, Submitted) |
            (Submitted, Evaluating) |
            (Evaluating, Approved) |
            (Evaluating, Rejected) |
            (Evaluating, InReview) |
            (InReview, PendingApproval) |
            (InReview, Approved) |
            (InReview, Rejected) |
            (PendingApproval, Approved) |
            (PendingApproval, Rejected) |
            (PendingApproval, InReview) |
            (Approved, Disbursed) |
            (Draft | Submitted | Evaluating | InReview | PendingApproval, Cancelled)
        )
    }

    fn ensure_draft(&self) -> Result<(), LendingError> {
        if self.status != ApplicationStatus::Draft {
            return Err(LendingError::validation(format!(
                "Application {} is {} and can no longer be edited",
                self.id, self.status
            )));
        }
        Ok(())
    }

    fn send_to_review(&mut self, assignee: Option<String>, details: String) -> Result<(), LendingError> {
        self.transition(
            ApplicationStatus::InReview,
            HistoryAction::SentToReview,
            SYSTEM_ACTOR,
            Some(details),
        )?;
        self.approval_type = Some(ApprovalType::Manual);

        if let Some(assignee) = assignee {
            self.record(
                HistoryAction::Assigned,
                SYSTEM_ACTOR,
                Some(format!("Assigned to {}", assignee)),
                None,
            );
            self.assigned_to = Some(assignee);
        }
        Ok(())
    }

    fn decide(
        &mut self,
        decision: ApprovalDecision,
        decision_type: ApprovalType,
        decided_by: &str,
        reason: Option<String>,
        approved_amount: Option<Decimal>,
        rule_id: Option<RuleId>,
    ) -> Result<(), LendingError> {
        let (target, action) = match (decision, decision_type) {
            (ApprovalDecision::Approved, ApprovalType::Automatic) => (ApplicationStatus::Approved, HistoryAction::AutoApproved),
            (ApprovalDecision::Approved, ApprovalType::Manual) => (ApplicationStatus::Approved, HistoryAction::Approved),
            (ApprovalDecision::Rejected, ApprovalType::Automatic) => (ApplicationStatus::Rejected, HistoryAction::AutoRejected),
            (ApprovalDecision::Rejected, ApprovalType::Manual) => (ApplicationStatus::Rejected, HistoryAction::Rejected),
        };

        self.transition(target, action, decided_by, reason.clone())?;

        let now = self.last_updated_at;
        self.approval_type = Some(decision_type);
        self.reviewed_by = Some(decided_by.to_string());
        self.reviewed_at = Some(now);
        self.decision = Some(ApprovalDecisionRecord {
            id: DecisionId::new_v7(),
            decision,
            decision_type,
            decided_by: decided_by.to_string(),
            decided_at: now,
            reason,
            approved_amount,
            rule_id,
        });

        info!(
            application_id = %self.id,
            decision = ?decision,
            decision_type = ?decision_type,
            "Application decided"
        );
        Ok(())
    }

    fn transition(
        &mut self,
        target: ApplicationStatus,
        action: HistoryAction,
        performed_by: &str,
        details: Option<String>,
    ) -> Result<(), LendingError> {
        if !self.can_transition_to(target) {
            return Err(LendingError::transition(self.status, target));
        }
        let previous = self.status;
        self.status = target;
        self.record(action, performed_by, details, Some(previous));
        Ok(())
    }

    fn record(
        &mut self,
        action: HistoryAction,
        performed_by: &str,
        details: Option<String>,
        previous_status: Option<ApplicationStatus>,
    ) {
        let now = Utc::now();
        let new_status = previous_status.map(|_| self.status);
        self.history.push(ApplicationHistoryEntry {
            id: HistoryEntryId::new_v7(),
            action,
            performed_by: performed_by.to_string(),
            timestamp: now,
            details,
            previous_status,
            new_status,
        });
        self.last_updated_at = now;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_risk_level_from_rating() {
        assert_eq!(RiskLevel::from(CreditRating::Excelente), RiskLevel::Low);
        assert_eq!(RiskLevel::from(CreditRating::Bueno), RiskLevel::Medium);
        assert_eq!(RiskLevel::from(CreditRating::Regular), RiskLevel::High);
        assert_eq!(RiskLevel::from(CreditRating::Bajo), RiskLevel::Critical);
    }

    #[test]
    fn test_status_wire_names() {
        let json = serde_json::to_string(&ApplicationStatus::PendingApproval).unwrap();
        assert_eq!(json, "\"pending-approval\"");
        assert_eq!(ApplicationStatus::InReview.to_string(), "in-review");
    }

    #[test]
    fn test_terminal_statuses() {
        assert!(ApplicationStatus::Rejected.is_terminal());
        assert!(ApplicationStatus::Cancelled.is_terminal());
        assert!(!ApplicationStatus::Approved.is_terminal());
        assert!(ApplicationStatus::Disbursed.is_decided());
    }
}
