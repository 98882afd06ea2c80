//! Approval rule evaluation
//!
//! First-hit policy: active rules are visited in ascending priority (ties
//! keep their relative order) and the first rule whose conditions all hold
//! decides. When nothing matches the application goes to manual review.
//!
//! # Example
//!
//! ```rust,ignore
//! let snapshot = registry.snapshot()?;
//! match RulesEngine::new().evaluate_ordered(&application, &snapshot) {
//!     RuleOutcome::Matched(hit) => println!("{} -> {:?}", hit.rule_name, hit.action.kind),
//!     RuleOutcome::NoMatch => println!("manual review"),
//! }
//! ```

use serde::{Deserialize, Serialize};
use tracing::debug;

use core_kernel::RuleId;
use crate::application::LoanApplication;
use crate::rule::{ApprovalRule, RuleAction};

/// The rule that decided an evaluation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleMatch {
    pub rule_id: RuleId,
    pub rule_name: String,
    pub priority: u32,
    pub action: RuleAction,
}

/// Result of evaluating the rule set
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum RuleOutcome {
    Matched(RuleMatch),
    /// No automatic decision; requires manual review
    NoMatch,
}

impl RuleOutcome {
    /// Action of the matched rule, if any
    pub fn action(&self) -> Option<&RuleAction> {
        match self {
            RuleOutcome::Matched(hit) => Some(&hit.action),
            RuleOutcome::NoMatch => None,
        }
    }

    pub fn is_match(&self) -> bool {
        matches!(self, RuleOutcome::Matched(_))
    }
}

/// Evaluates approval rules against applications
#[derive(Debug, Clone, Copy, Default)]
pub struct RulesEngine;

impl RulesEngine {
    pub fn new() -> Self {
        Self
    }

    /// Evaluates an arbitrary rule list
    ///
    /// Inactive rules are dropped and the rest are stably sorted by priority
    /// before evaluation.
    pub fn evaluate(&self, application: &LoanApplication, rules: &[ApprovalRule]) -> RuleOutcome {
        let mut ordered: Vec<&ApprovalRule> = rules.iter().filter(|r| r.is_active).collect();
        ordered.sort_by_key(|r| r.priority);
        self.first_hit(application, ordered)
    }

    /// Evaluates a list already ordered by priority, such as a rule book snapshot
    ///
    /// Inactive rules are still skipped.
    pub fn evaluate_ordered(&self, application: &LoanApplication, ordered: &[ApprovalRule]) -> RuleOutcome {
        self.first_hit(application, ordered.iter().filter(|r| r.is_active))
    }

    fn first_hit<'a>(
        &self,
        application: &LoanApplication,
        ordered: impl IntoIterator<Item = &'a ApprovalRule>,
    ) -> RuleOutcome {
        for rule in ordered {
            let matched = rule.matches(application);
            debug!(
                application_id = %application.id,
                rule = %rule.name,
                priority = rule.priority,
                matched,
                "Rule evaluated"
            );

            if matched {
                return RuleOutcome::Matched(RuleMatch {
                    rule_id: rule.id,
                    rule_name: rule.name.clone(),
                    priority: rule.priority,
                    action: rule.action.clone(),
                });
            }
        }

        debug!(application_id = %application.id, "No rule matched");
        RuleOutcome::NoMatch
    }
}
