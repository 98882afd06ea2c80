//! Approval rules
//!
//! Rules are authored in the console's loose JSON shape:
//!
//! ```json
//! { "field": "loanDetails.amount", "operator": "between", "value": [1000, 5000] }
//! ```
//!
//! Each condition is checked against its operator when the rule is built
//! and stored as a typed [`Predicate`]. Serialisation writes the loose
//! shape back out.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

use core_kernel::RuleId;
use crate::application::LoanApplication;
use crate::error::RuleError;
use crate::field_registry::{self, FieldKind, FieldValue};

/// Comparison operators offered by the console
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConditionOperator {
    Equals,
    GreaterThan,
    LessThan,
    Between,
    In,
    NotIn,
}

/// Typed test applied to a resolved field value
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Predicate {
    /// Same kind and value; text is case-sensitive
    Equals(FieldValue),
    GreaterThan(Decimal),
    LessThan(Decimal),
    /// Inclusive range
    Between { min: Decimal, max: Decimal },
    /// Membership; text is compared ignoring case
    In(Vec<FieldValue>),
    NotIn(Vec<FieldValue>),
}

impl Predicate {
    /// Builds a predicate from an operator and its loose JSON value
    ///
    /// Values for `equals`, `in` and `not_in` are read as the kind of the
    /// registered field, so `"24"` compares as a number on `loanDetails.term`
    /// and `"true"` as a boolean on `isExistingClient`.
    ///
    /// # Errors
    ///
    /// Returns `RuleError::InvalidCondition` if the value does not fit the
    /// operator or the field.
    pub fn parse(field: &str, operator: ConditionOperator, value: &Value) -> Result<Self, RuleError> {
        let invalid = |reason: &str| RuleError::invalid_condition(field, reason);

        match operator {
            ConditionOperator::Equals => {
                let value = scalar(value).ok_or_else(|| invalid("equals expects a string, number or boolean"))?;
                coerce(field, value).map(Predicate::Equals)
            }
            ConditionOperator::GreaterThan => number(value)
                .map(Predicate::GreaterThan)
                .ok_or_else(|| invalid("greater_than expects a number")),
            ConditionOperator::LessThan => number(value)
                .map(Predicate::LessThan)
                .ok_or_else(|| invalid("less_than expects a number")),
            ConditionOperator::Between => {
                let bounds = match value.as_array().map(Vec::as_slice) {
                    Some([low, high]) => number(low).zip(number(high)),
                    _ => None,
                };
                match bounds {
                    Some((min, max)) if min <= max => Ok(Predicate::Between { min, max }),
                    Some(_) => Err(invalid("between minimum exceeds maximum")),
                    None => Err(invalid("between expects [min, max]")),
                }
            }
            ConditionOperator::In | ConditionOperator::NotIn => {
                let items = list(value)
                    .ok_or_else(|| invalid("expects a non-empty list"))?
                    .into_iter()
                    .map(|item| coerce(field, item))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(if operator == ConditionOperator::In {
                    Predicate::In(items)
                } else {
                    Predicate::NotIn(items)
                })
            }
        }
    }

    pub fn operator(&self) -> ConditionOperator {
        match self {
            Predicate::Equals(_) => ConditionOperator::Equals,
            Predicate::GreaterThan(_) => ConditionOperator::GreaterThan,
            Predicate::LessThan(_) => ConditionOperator::LessThan,
            Predicate::Between { .. } => ConditionOperator::Between,
            Predicate::In(_) => ConditionOperator::In,
            Predicate::NotIn(_) => ConditionOperator::NotIn,
        }
    }

    /// Loose JSON value for the console
    pub fn to_value(&self) -> Value {
        match self {
            Predicate::Equals(v) => field_value_to_json(v),
            Predicate::GreaterThan(n) | Predicate::LessThan(n) => decimal_to_json(*n),
            Predicate::Between { min, max } => Value::Array(vec![decimal_to_json(*min), decimal_to_json(*max)]),
            Predicate::In(items) | Predicate::NotIn(items) => {
                Value::Array(items.iter().map(field_value_to_json).collect())
            }
        }
    }

    /// Tests a resolved value
    pub fn test(&self, value: &FieldValue) -> bool {
        match self {
            Predicate::Equals(expected) => value.strictly_equals(expected),
            Predicate::GreaterThan(bound) => value.as_number().is_some_and(|n| n > *bound),
            Predicate::LessThan(bound) => value.as_number().is_some_and(|n| n < *bound),
            Predicate::Between { min, max } => value.as_number().is_some_and(|n| n >= *min && n <= *max),
            Predicate::In(items) => items.iter().any(|item| value.loosely_equals(item)),
            Predicate::NotIn(items) => !items.iter().any(|item| value.loosely_equals(item)),
        }
    }
}

/// Console wire shape of a condition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConditionSpec {
    pub field: String,
    pub operator: ConditionOperator,
    pub value: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

/// One conjunct of a rule
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "ConditionSpec", into = "ConditionSpec")]
pub struct RuleCondition {
    field: String,
    predicate: Predicate,
    label: Option<String>,
}

impl RuleCondition {
    /// Creates a condition from a typed predicate
    pub fn new(field: impl Into<String>, predicate: Predicate) -> Self {
        let field = field.into();
        if !field_registry::is_registered(&field) {
            warn!(field = %field, "Condition references an unknown field and will never match");
        }
        Self {
            field,
            predicate,
            label: None,
        }
    }

    /// Sets the display label
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn field(&self) -> &str {
        &self.field
    }

    pub fn predicate(&self) -> &Predicate {
        &self.predicate
    }

    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    /// Evaluates the condition; an unresolved field is false
    pub fn evaluate(&self, application: &LoanApplication) -> bool {
        field_registry::resolve(&self.field, application)
            .is_some_and(|value| self.predicate.test(&value))
    }
}

impl TryFrom<ConditionSpec> for RuleCondition {
    type Error = RuleError;

    fn try_from(spec: ConditionSpec) -> Result<Self, Self::Error> {
        let predicate = Predicate::parse(&spec.field, spec.operator, &spec.value)?;
        let condition = RuleCondition::new(spec.field, predicate);
        Ok(match spec.label {
            Some(label) => condition.with_label(label),
            None => condition,
        })
    }
}

impl From<RuleCondition> for ConditionSpec {
    fn from(condition: RuleCondition) -> Self {
        ConditionSpec {
            operator: condition.predicate.operator(),
            value: condition.predicate.to_value(),
            field: condition.field,
            label: condition.label,
        }
    }
}

/// What a matching rule does
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionType {
    AutoApprove,
    AutoReject,
    RequireManualReview,
    AssignTo,
}

/// Optional action parameters
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionParameters {
    /// Cap on the approved amount
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_amount: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    /// Analyst to assign
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assign_to: Option<String>,
}

/// Action taken when a rule matches
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleAction {
    #[serde(rename = "type")]
    pub kind: ActionType,
    #[serde(default)]
    pub parameters: ActionParameters,
}

impl RuleAction {
    /// Auto-approve, optionally capping the approved amount
    pub fn auto_approve(max_amount: Option<Decimal>) -> Self {
        Self {
            kind: ActionType::AutoApprove,
            parameters: ActionParameters {
                max_amount,
                ..Default::default()
            },
        }
    }

    pub fn auto_reject(reason: impl Into<String>) -> Self {
        Self {
            kind: ActionType::AutoReject,
            parameters: ActionParameters {
                reason: Some(reason.into()),
                ..Default::default()
            },
        }
    }

    pub fn manual_review() -> Self {
        Self {
            kind: ActionType::RequireManualReview,
            parameters: ActionParameters::default(),
        }
    }

    pub fn assign_to(analyst: impl Into<String>) -> Self {
        Self {
            kind: ActionType::AssignTo,
            parameters: ActionParameters {
                assign_to: Some(analyst.into()),
                ..Default::default()
            },
        }
    }

    /// Checks the parameters the action needs
    ///
    /// # Errors
    ///
    /// Returns `RuleError::InvalidAction` if `assign_to` lacks an analyst or
    /// `max_amount` is not positive.
    pub fn validate(&self) -> Result<(), RuleError> {
        if self.kind == ActionType::AssignTo
            && self.parameters.assign_to.as_deref().map_or(true, |a| a.trim().is_empty())
        {
            return Err(RuleError::InvalidAction("assign_to requires an analyst".to_string()));
        }
        if let Some(max) = self.parameters.max_amount {
            if max <= Decimal::ZERO {
                return Err(RuleError::InvalidAction(format!("max amount must be positive, got {}", max)));
            }
        }
        Ok(())
    }
}

/// A prioritized approval rule
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApprovalRule {
    pub id: RuleId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub is_active: bool,
    /// Evaluation order, 0 first
    pub priority: u32,
    pub conditions: Vec<RuleCondition>,
    pub action: RuleAction,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub created_by: String,
}

impl ApprovalRule {
    /// A rule matches when it has conditions and all of them hold
    pub fn matches(&self, application: &LoanApplication) -> bool {
        !self.conditions.is_empty() && self.conditions.iter().all(|c| c.evaluate(application))
    }
}

/// Fields for a new rule
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleDraft {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub priority: u32,
    pub conditions: Vec<RuleCondition>,
    pub action: RuleAction,
    #[serde(default = "default_active")]
    pub is_active: bool,
    #[serde(default = "default_author")]
    pub created_by: String,
}

fn default_active() -> bool {
    true
}

fn default_author() -> String {
    "admin".to_string()
}

impl RuleDraft {
    pub fn new(name: impl Into<String>, priority: u32, conditions: Vec<RuleCondition>, action: RuleAction) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            priority,
            conditions,
            action,
            is_active: true,
            created_by: default_author(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn inactive(mut self) -> Self {
        self.is_active = false;
        self
    }

    /// Checks name, conditions and action
    pub fn validate(&self) -> Result<(), RuleError> {
        validate_parts(&self.name, &self.conditions, &self.action)
    }

    /// Builds the rule with a fresh id
    pub fn into_rule(self, now: DateTime<Utc>) -> Result<ApprovalRule, RuleError> {
        self.validate()?;
        Ok(ApprovalRule {
            id: RuleId::new_v7(),
            name: self.name.trim().to_string(),
            description: self.description,
            is_active: self.is_active,
            priority: self.priority,
            conditions: self.conditions,
            action: self.action,
            created_at: now,
            updated_at: now,
            created_by: self.created_by,
        })
    }
}

/// Partial update; absent fields are left unchanged
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub priority: Option<u32>,
    pub conditions: Option<Vec<RuleCondition>>,
    pub action: Option<RuleAction>,
    pub is_active: Option<bool>,
}

impl RuleUpdate {
    /// Applies the update to a copy of the rule and validates the result
    pub fn apply_to(self, rule: &ApprovalRule, now: DateTime<Utc>) -> Result<ApprovalRule, RuleError> {
        let mut updated = rule.clone();
        if let Some(name) = self.name {
            updated.name = name.trim().to_string();
        }
        if let Some(description) = self.description {
            updated.description = description;
        }
        if let Some(priority) = self.priority {
            updated.priority = priority;
        }
        if let Some(conditions) = self.conditions {
            updated.conditions = conditions;
        }
        if let Some(action) = self.action {
            updated.action = action;
        }
        if let Some(is_active) = self.is_active {
            updated.is_active = is_active;
        }
        validate_parts(&updated.name, &updated.conditions, &updated.action)?;
        updated.updated_at = now;
        Ok(updated)
    }
}

fn validate_parts(name: &str, conditions: &[RuleCondition], action: &RuleAction) -> Result<(), RuleError> {
    if name.trim().is_empty() {
        return Err(RuleError::MissingName);
    }
    if conditions.is_empty() {
        return Err(RuleError::EmptyConditions);
    }
    action.validate()
}

fn scalar(value: &Value) -> Option<FieldValue> {
    match value {
        Value::Bool(b) => Some(FieldValue::Flag(*b)),
        Value::Number(_) => number(value).map(FieldValue::Number),
        Value::String(s) => Some(FieldValue::Text(s.clone())),
        _ => None,
    }
}

fn number(value: &Value) -> Option<Decimal> {
    match value {
        Value::Number(n) => parse_decimal(&n.to_string()),
        Value::String(s) => parse_decimal(s.trim()),
        _ => None,
    }
}

fn parse_decimal(text: &str) -> Option<Decimal> {
    Decimal::from_str(text)
        .or_else(|_| Decimal::from_scientific(text))
        .ok()
}

/// Reads a comparison value as the kind of the registered field
fn coerce(field: &str, value: FieldValue) -> Result<FieldValue, RuleError> {
    let Some(kind) = field_registry::kind(field) else {
        return Ok(value);
    };
    let coerced = match (kind, value) {
        (FieldKind::Number, FieldValue::Text(text)) => parse_decimal(text.trim()).map(FieldValue::Number),
        (FieldKind::Flag, FieldValue::Text(text)) => match text.trim().to_ascii_lowercase().as_str() {
            "true" => Some(FieldValue::Flag(true)),
            "false" => Some(FieldValue::Flag(false)),
            _ => None,
        },
        (FieldKind::Text, FieldValue::Number(n)) => Some(FieldValue::Text(n.to_string())),
        (kind, value) if value.kind() == kind => Some(value),
        _ => None,
    };
    coerced.ok_or_else(|| RuleError::invalid_condition(field, format!("expects a {} value", kind)))
}

fn list(value: &Value) -> Option<Vec<FieldValue>> {
    let items: Vec<FieldValue> = match value {
        Value::Array(items) => items.iter().map(scalar).collect::<Option<_>>()?,
        // Free-text entry: "personal, vehicular"
        Value::String(s) => s
            .split(',')
            .map(str::trim)
            .filter(|item| !item.is_empty())
            .map(|item| parse_decimal(item).map_or_else(|| FieldValue::from(item), FieldValue::Number))
            .collect(),
        _ => return None,
    };
    (!items.is_empty()).then_some(items)
}

fn decimal_to_json(n: Decimal) -> Value {
    let normalized = n.normalize();
    if normalized.scale() == 0 {
        if let Some(i) = normalized.to_i64() {
            return Value::from(i);
        }
    }
    normalized
        .to_f64()
        .and_then(serde_json::Number::from_f64)
        .map_or_else(|| Value::String(normalized.to_string()), Value::Number)
}

fn field_value_to_json(value: &FieldValue) -> Value {
    match value {
        FieldValue::Flag(b) => Value::Bool(*b),
        FieldValue::Number(n) => decimal_to_json(*n),
        FieldValue::Text(s) => Value::String(s.clone()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use serde_json::json;

    #[test]
    fn test_equals_reads_field_kind() {
        let term = Predicate::parse("loanDetails.term", ConditionOperator::Equals, &json!("24")).unwrap();
        assert_eq!(term, Predicate::Equals(FieldValue::Number(dec!(24))));

        let client = Predicate::parse("isExistingClient", ConditionOperator::Equals, &json!("false")).unwrap();
        assert_eq!(client, Predicate::Equals(FieldValue::Flag(false)));

        let err = Predicate::parse("loanDetails.term", ConditionOperator::Equals, &json!("veinte")).unwrap_err();
        assert!(matches!(err, RuleError::InvalidCondition { .. }));

        // Unregistered fields keep the value as written
        let unknown = Predicate::parse("workInfo.salary", ConditionOperator::Equals, &json!("24")).unwrap();
        assert_eq!(unknown, Predicate::Equals(FieldValue::from("24")));
    }

    #[test]
    fn test_between_requires_ordered_pair() {
        let ok = Predicate::parse("loanDetails.amount", ConditionOperator::Between, &json!([1000, 5000]));
        assert_eq!(ok.unwrap(), Predicate::Between { min: dec!(1000), max: dec!(5000) });

        assert!(Predicate::parse("loanDetails.amount", ConditionOperator::Between, &json!([5000, 1000])).is_err());
        assert!(Predicate::parse("loanDetails.amount", ConditionOperator::Between, &json!([1000])).is_err());
    }

    #[test]
    fn test_in_accepts_comma_separated_text() {
        let predicate = Predicate::parse("loanType", ConditionOperator::In, &json!("personal, vehicular")).unwrap();
        assert_eq!(
            predicate,
            Predicate::In(vec![FieldValue::from("personal"), FieldValue::from("vehicular")])
        );
        assert!(Predicate::parse("loanType", ConditionOperator::In, &json!(" , ")).is_err());
    }

    #[test]
    fn test_numeric_string_accepted_for_comparison() {
        let predicate = Predicate::parse("workInfo.monthlyIncome", ConditionOperator::GreaterThan, &json!("2500")).unwrap();
        assert_eq!(predicate, Predicate::GreaterThan(dec!(2500)));
        assert!(Predicate::parse("workInfo.monthlyIncome", ConditionOperator::LessThan, &json!("abc")).is_err());
    }

    #[test]
    fn test_condition_wire_shape_round_trip() {
        let json = json!({
            "field": "creditScore.score",
            "operator": "greater_than",
            "value": 700,
            "label": "Score > 700"
        });
        let condition: RuleCondition = serde_json::from_value(json.clone()).unwrap();
        assert_eq!(condition.predicate(), &Predicate::GreaterThan(dec!(700)));
        assert_eq!(serde_json::to_value(&condition).unwrap(), json);
    }

    #[test]
    fn test_assign_to_requires_analyst() {
        let action = RuleAction {
            kind: ActionType::AssignTo,
            parameters: ActionParameters::default(),
        };
        assert!(matches!(action.validate(), Err(RuleError::InvalidAction(_))));
        assert!(RuleAction::assign_to("ana.lopez").validate().is_ok());
        assert!(RuleAction::auto_approve(Some(dec!(0))).validate().is_err());
    }

    #[test]
    fn test_draft_without_conditions_rejected() {
        let draft = RuleDraft::new("Empty", 0, Vec::new(), RuleAction::manual_review());
        assert!(matches!(draft.into_rule(Utc::now()), Err(RuleError::EmptyConditions)));
    }

    #[test]
    fn test_blank_name_rejected() {
        let condition = RuleCondition::new("loanType", Predicate::Equals(FieldValue::from("personal")));
        let draft = RuleDraft::new("  ", 0, vec![condition], RuleAction::manual_review());
        assert!(matches!(draft.validate(), Err(RuleError::MissingName)));
    }
}
