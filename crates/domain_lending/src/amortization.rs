//! Fixed-rate amortization
//!
//! Level monthly payment for a principal, annual rate and term:
//!
//! ```text
//! payment = P · r(1+r)^n / ((1+r)^n − 1)      r = annual% / 100 / 12
//! payment = P / n                              when r = 0
//! ```
//!
//! Payments are rounded to cents (half away from zero) except in the
//! zero-rate case, which returns the exact quotient.

use rust_decimal::{Decimal, MathematicalOps};
use serde::{Deserialize, Serialize};

use core_kernel::{round_to_cents, Rate};
use crate::catalog::{LoanCatalog, LoanType};
use crate::error::LendingError;

/// Derived cost figures for a loan quote
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoanCalculation {
    /// Level monthly payment
    pub monthly_payment: Decimal,
    /// Annual interest rate as a percentage
    pub interest_rate: Decimal,
    /// Monthly payment times term
    pub total_cost: Decimal,
    /// Total cost minus principal
    pub total_interest: Decimal,
}

/// Calculates the level monthly payment
///
/// # Arguments
///
/// * `principal` - Amount borrowed
/// * `annual_rate_percent` - Annual interest rate as a percentage (15.5 for 15.5%)
/// * `months` - Number of monthly payments
///
/// # Errors
///
/// Returns `LendingError::InvalidTerm` if `months` is zero, or
/// `LendingError::Calculation` if the power term overflows or the
/// denominator degenerates to zero.
///
/// # Example
///
/// ```rust,ignore
/// let payment = calculate_monthly_payment(dec!(100000), dec!(8.5), 180)?;
/// assert_eq!(payment, dec!(984.74));
/// ```
pub fn calculate_monthly_payment(
    principal: Decimal,
    annual_rate_percent: Decimal,
    months: u32,
) -> Result<Decimal, LendingError> {
    if months == 0 {
        return Err(LendingError::InvalidTerm(months));
    }

    let monthly_rate = Rate::from_percentage(annual_rate_percent).monthly();
    let periods = Decimal::from(months);

    if monthly_rate.is_zero() {
        return Ok(principal / periods);
    }

    let growth = (Decimal::ONE + monthly_rate)
        .checked_powu(u64::from(months))
        .ok_or_else(|| LendingError::calculation("compound growth overflowed"))?;

    let numerator = principal
        .checked_mul(monthly_rate * growth)
        .ok_or_else(|| LendingError::calculation("payment numerator overflowed"))?;

    let payment = numerator
        .checked_div(growth - Decimal::ONE)
        .ok_or_else(|| LendingError::calculation("rate too small to amortize"))?;

    Ok(round_to_cents(payment))
}

/// Quotes a loan using the catalog's fixed rate for the loan type
///
/// # Errors
///
/// Propagates the preconditions of [`calculate_monthly_payment`], and returns
/// `LendingError::Calculation` if the total cost does not fit in a `Decimal`.
pub fn calculate_loan(
    catalog: &LoanCatalog,
    loan_type: LoanType,
    amount: Decimal,
    term: u32,
) -> Result<LoanCalculation, LendingError> {
    let interest_rate = catalog.rate(loan_type).as_percentage();
    let monthly_payment = calculate_monthly_payment(amount, interest_rate, term)?;
    let total_cost = monthly_payment
        .checked_mul(Decimal::from(term))
        .ok_or_else(|| LendingError::calculation("total cost overflowed"))?;
    let total_interest = total_cost
        .checked_sub(amount)
        .ok_or_else(|| LendingError::calculation("total interest overflowed"))?;

    Ok(LoanCalculation {
        monthly_payment,
        interest_rate,
        total_cost,
        total_interest,
    })
}
