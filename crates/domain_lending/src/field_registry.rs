//! Typed accessors for rule condition fields
//!
//! Rule conditions name application fields with the console's dotted paths
//! (`loanDetails.amount`). Each known path maps to a getter over
//! [`LoanApplication`]; an unknown path or an absent value resolves to
//! `None`, which conditions treat as false.

use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::application::LoanApplication;

/// A resolved field value
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Flag(bool),
    Number(Decimal),
    Text(String),
}

/// Kind of value a registered field resolves to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Flag,
    Number,
    Text,
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            FieldKind::Flag => "boolean",
            FieldKind::Number => "number",
            FieldKind::Text => "text",
        })
    }
}

impl FieldValue {
    pub fn kind(&self) -> FieldKind {
        match self {
            FieldValue::Flag(_) => FieldKind::Flag,
            FieldValue::Number(_) => FieldKind::Number,
            FieldValue::Text(_) => FieldKind::Text,
        }
    }

    /// Returns the numeric value, if this is a number
    pub fn as_number(&self) -> Option<Decimal> {
        match self {
            FieldValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Strict equality: same kind, same value, case-sensitive text
    pub fn strictly_equals(&self, other: &FieldValue) -> bool {
        match (self, other) {
            (FieldValue::Flag(a), FieldValue::Flag(b)) => a == b,
            (FieldValue::Number(a), FieldValue::Number(b)) => a == b,
            (FieldValue::Text(a), FieldValue::Text(b)) => a == b,
            _ => false,
        }
    }

    /// Membership equality: same kind, text compared ignoring case
    pub fn loosely_equals(&self, other: &FieldValue) -> bool {
        match (self, other) {
            (FieldValue::Text(a), FieldValue::Text(b)) => a.to_lowercase() == b.to_lowercase(),
            _ => self.strictly_equals(other),
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Flag(b) => write!(f, "{}", b),
            FieldValue::Number(n) => write!(f, "{}", n),
            FieldValue::Text(s) => f.write_str(s),
        }
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        FieldValue::Flag(value)
    }
}

impl From<Decimal> for FieldValue {
    fn from(value: Decimal) -> Self {
        FieldValue::Number(value)
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Text(value)
    }
}

/// Getter for one field path
pub type FieldAccessor = fn(&LoanApplication) -> Option<FieldValue>;

/// Every field path a condition may reference
pub const REGISTERED_FIELDS: [&str; 18] = [
    "isExistingClient",
    "personalData.maritalStatus",
    "workInfo.employmentType",
    "workInfo.monthlyIncome",
    "workInfo.workYears",
    "loanType",
    "loanDetails.amount",
    "loanDetails.term",
    "loanDetails.purpose",
    "loanDetails.guaranteeType",
    "calculation.monthlyPayment",
    "calculation.interestRate",
    "creditScore.score",
    "creditScore.rating",
    "creditScore.approved",
    "creditScore.maxApprovedAmount",
    "riskLevel",
    "status",
];

/// Looks up the accessor for a field path
pub fn accessor(path: &str) -> Option<FieldAccessor> {
    let getter: FieldAccessor = match path {
        "isExistingClient" => |app| Some(app.is_existing_client().into()),
        "personalData.maritalStatus" => |app| Some(app.personal_data.marital_status.as_str().into()),
        "workInfo.employmentType" => |app| Some(app.work_info.employment_type.as_str().into()),
        "workInfo.monthlyIncome" => |app| Some(app.work_info.monthly_income.into()),
        "workInfo.workYears" => |app| Some(app.work_info.work_years.into()),
        "loanType" => |app| Some(app.loan_type.as_str().into()),
        "loanDetails.amount" => |app| Some(app.loan_details.amount.into()),
        "loanDetails.term" => |app| Some(Decimal::from(app.loan_details.term).into()),
        "loanDetails.purpose" => |app| Some(app.loan_details.purpose.as_str().into()),
        "loanDetails.guaranteeType" => |app| app.loan_details.guarantee_type.as_deref().map(FieldValue::from),
        "calculation.monthlyPayment" => |app| Some(app.calculation.monthly_payment.into()),
        "calculation.interestRate" => |app| Some(app.calculation.interest_rate.into()),
        "creditScore.score" => |app| app.credit_score.as_ref().map(|s| Decimal::from(s.score).into()),
        "creditScore.rating" => |app| app.credit_score.as_ref().map(|s| s.rating.as_str().into()),
        "creditScore.approved" => |app| app.credit_score.as_ref().map(|s| s.approved.into()),
        "creditScore.maxApprovedAmount" => |app| app.credit_score.as_ref().map(|s| s.max_approved_amount.into()),
        "riskLevel" => |app| app.risk_level.map(|r| r.as_str().into()),
        "status" => |app| Some(app.status.as_str().into()),
        _ => return None,
    };
    Some(getter)
}

/// Kind of value a registered path resolves to
pub fn kind(path: &str) -> Option<FieldKind> {
    let kind = match path {
        "isExistingClient" | "creditScore.approved" => FieldKind::Flag,
        "workInfo.monthlyIncome"
        | "workInfo.workYears"
        | "loanDetails.amount"
        | "loanDetails.term"
        | "calculation.monthlyPayment"
        | "calculation.interestRate"
        | "creditScore.score"
        | "creditScore.maxApprovedAmount" => FieldKind::Number,
        _ if is_registered(path) => FieldKind::Text,
        _ => return None,
    };
    Some(kind)
}

/// Returns true if the path has an accessor
pub fn is_registered(path: &str) -> bool {
    accessor(path).is_some()
}

/// Resolves a field path against an application
pub fn resolve(path: &str, application: &LoanApplication) -> Option<FieldValue> {
    accessor(path).and_then(|get| get(application))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_every_registered_field_has_accessor() {
        for path in REGISTERED_FIELDS {
            assert!(is_registered(path), "{} has no accessor", path);
        }
        assert!(!is_registered("workInfo.salary"));
        assert!(!is_registered(""));
    }

    #[test]
    fn test_field_kinds() {
        assert_eq!(kind("isExistingClient"), Some(FieldKind::Flag));
        assert_eq!(kind("loanDetails.term"), Some(FieldKind::Number));
        assert_eq!(kind("loanType"), Some(FieldKind::Text));
        assert_eq!(kind("loanDetails.guaranteeType"), Some(FieldKind::Text));
        assert_eq!(kind("workInfo.salary"), None);
    }

    #[test]
    fn test_numbers_compare_by_value() {
        let a = FieldValue::Number(dec!(5000));
        let b = FieldValue::Number(dec!(5000.00));
        assert!(a.strictly_equals(&b));
    }

    #[test]
    fn test_text_equality_modes() {
        let a = FieldValue::from("Personal");
        let b = FieldValue::from("personal");
        assert!(!a.strictly_equals(&b));
        assert!(a.loosely_equals(&b));
        assert!(!FieldValue::from("5000").strictly_equals(&FieldValue::Number(dec!(5000))));
    }
}
