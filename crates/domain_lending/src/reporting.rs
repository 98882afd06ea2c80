//! Back-office statistics and application filters

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::application::{ApplicationStatus, ApprovalType, LoanApplication, RiskLevel};
use crate::catalog::LoanType;

/// Counts for one loan type
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoanTypeStats {
    pub total: u32,
    pub approved: u32,
    pub rejected: u32,
}

/// Dashboard figures over a set of applications
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApprovalStatistics {
    /// Submitted applications (drafts excluded)
    pub total: u32,
    pub pending: u32,
    pub in_review: u32,
    /// Approved, including disbursed
    pub approved: u32,
    pub rejected: u32,
    /// Mean hours from submission to decision
    pub average_processing_hours: Decimal,
    /// Percentage of all applications approved automatically
    pub auto_approval_rate: Decimal,
    /// Percentage of decided applications that were approved
    pub approval_rate: Decimal,
    pub by_loan_type: BTreeMap<LoanType, LoanTypeStats>,
}

impl ApprovalStatistics {
    /// Computes statistics over the given applications
    pub fn from_applications<'a>(applications: impl IntoIterator<Item = &'a LoanApplication>) -> Self {
        let mut stats = Self {
            total: 0,
            pending: 0,
            in_review: 0,
            approved: 0,
            rejected: 0,
            average_processing_hours: Decimal::ZERO,
            auto_approval_rate: Decimal::ZERO,
            approval_rate: Decimal::ZERO,
            by_loan_type: LoanType::ALL.iter().map(|t| (*t, LoanTypeStats::default())).collect(),
        };

        let mut auto_approved = 0u32;
        let mut processing_minutes = Vec::new();

        for app in applications {
            if app.status == ApplicationStatus::Draft {
                continue;
            }
            stats.total += 1;
            let by_type = stats.by_loan_type.entry(app.loan_type).or_default();
            by_type.total += 1;

            match app.status {
                ApplicationStatus::Submitted
                | ApplicationStatus::Evaluating
                | ApplicationStatus::PendingApproval => stats.pending += 1,
                ApplicationStatus::InReview => stats.in_review += 1,
                ApplicationStatus::Approved | ApplicationStatus::Disbursed => {
                    stats.approved += 1;
                    by_type.approved += 1;
                    if app.approval_type == Some(ApprovalType::Automatic) {
                        auto_approved += 1;
                    }
                }
                ApplicationStatus::Rejected => {
                    stats.rejected += 1;
                    by_type.rejected += 1;
                }
                ApplicationStatus::Draft | ApplicationStatus::Cancelled => {}
            }

            if app.status.is_decided() {
                if let (Some(submitted), Some(reviewed)) = (app.submitted_at, app.reviewed_at) {
                    processing_minutes.push((reviewed - submitted).num_minutes());
                }
            }
        }

        if !processing_minutes.is_empty() {
            let total_minutes: i64 = processing_minutes.iter().sum();
            let mean = Decimal::from(total_minutes) / Decimal::from(processing_minutes.len()) / dec!(60);
            stats.average_processing_hours = mean.round_dp(1);
        }
        stats.auto_approval_rate = percentage(auto_approved, stats.total);
        stats.approval_rate = percentage(stats.approved, stats.approved + stats.rejected);
        stats
    }
}

fn percentage(part: u32, whole: u32) -> Decimal {
    if whole == 0 {
        return Decimal::ZERO;
    }
    (Decimal::from(part) * dec!(100) / Decimal::from(whole)).round_dp(1)
}

/// Back-office list filters; empty criteria match everything
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ApplicationFilters {
    pub status: Vec<ApplicationStatus>,
    pub loan_type: Vec<LoanType>,
    pub risk_level: Vec<RiskLevel>,
    pub approval_type: Vec<ApprovalType>,
    pub date_from: Option<DateTime<Utc>>,
    pub date_to: Option<DateTime<Utc>>,
    pub assigned_to: Option<String>,
    /// Case-insensitive match on id, applicant name, email or document id
    pub search_term: Option<String>,
    pub min_amount: Option<Decimal>,
    pub max_amount: Option<Decimal>,
}

impl ApplicationFilters {
    /// Returns true if the application satisfies every criterion
    pub fn matches(&self, app: &LoanApplication) -> bool {
        if !self.status.is_empty() && !self.status.contains(&app.status) {
            return false;
        }
        if !self.loan_type.is_empty() && !self.loan_type.contains(&app.loan_type) {
            return false;
        }
        if !self.risk_level.is_empty() && !app.risk_level.is_some_and(|r| self.risk_level.contains(&r)) {
            return false;
        }
        if !self.approval_type.is_empty() && !app.approval_type.is_some_and(|t| self.approval_type.contains(&t)) {
            return false;
        }
        if self.date_from.is_some() || self.date_to.is_some() {
            let Some(submitted) = app.submitted_at else {
                return false;
            };
            if self.date_from.is_some_and(|from| submitted < from) || self.date_to.is_some_and(|to| submitted > to) {
                return false;
            }
        }
        if let Some(assignee) = &self.assigned_to {
            if app.assigned_to.as_ref() != Some(assignee) {
                return false;
            }
        }
        if self.min_amount.is_some_and(|min| app.loan_details.amount < min)
            || self.max_amount.is_some_and(|max| app.loan_details.amount > max)
        {
            return false;
        }
        if let Some(term) = self.search_term.as_deref().map(str::trim).filter(|t| !t.is_empty()) {
            let needle = term.to_lowercase();
            let haystacks = [
                app.id.to_string(),
                app.personal_data.full_name.clone(),
                app.personal_data.email.clone(),
                app.personal_data.document_id.clone(),
            ];
            if !haystacks.iter().any(|h| h.to_lowercase().contains(&needle)) {
                return false;
            }
        }
        true
    }

    /// Keeps the matching applications, preserving order
    pub fn apply<'a>(&self, applications: &'a [LoanApplication]) -> Vec<&'a LoanApplication> {
        applications.iter().filter(|app| self.matches(app)).collect()
    }
}
