//! Tests for core_kernel error types

use core_kernel::error::CoreError;
use core_kernel::rate::{Rate, RateError};
use core_kernel::{ApplicationId, RuleId};
use rust_decimal_macros::dec;

#[test]
fn test_from_rate_error() {
    let rate_error = Rate::try_from_percentage(dec!(-2.5)).unwrap_err();
    let core_error: CoreError = rate_error.into();

    assert!(matches!(core_error, CoreError::Rate(RateError::Negative(_))));
    assert_eq!(core_error.to_string(), "Rate error: Rate cannot be negative: -2.5%");
}

#[test]
fn test_invalid_identifier_names_the_type() {
    let err = "SOL-12345".parse::<ApplicationId>().unwrap_err();

    match &err {
        CoreError::InvalidIdentifier { kind, value } => {
            assert_eq!(*kind, "ApplicationId");
            assert_eq!(value, "SOL-12345");
        }
        other => panic!("Expected InvalidIdentifier, got {other:?}"),
    }
    assert_eq!(err.to_string(), "Invalid ApplicationId identifier 'SOL-12345'");
}

#[test]
fn test_foreign_prefix_is_rejected() {
    let application = ApplicationId::new();
    let as_rule = application.to_string().parse::<RuleId>();
    assert!(as_rule.is_err());
}

#[test]
fn test_configuration_display() {
    let error = CoreError::configuration("missing rate table");
    assert_eq!(error.to_string(), "Configuration error: missing rate table");
}
