//! Interest rates and cent rounding
//!
//! Rates are kept as `rust_decimal::Decimal` fractions so amortization and
//! ratio calculations stay exact up to the final rounding step.

use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Months per year used to derive the periodic rate
pub const MONTHS_PER_YEAR: Decimal = dec!(12);

/// Errors that can occur when building a rate
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RateError {
    #[error("Rate cannot be negative: {0}%")]
    Negative(Decimal),
}

/// Rounds an amount to cents, halves away from zero
///
/// `243.625` becomes `243.63` and `-243.625` becomes `-243.63`.
pub fn round_to_cents(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// An annual interest rate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Rate {
    /// The annual rate as a percentage (e.g., 15.5 for 15.5%)
    percentage: Decimal,
}

impl Rate {
    /// Creates a rate from a percentage (e.g., 15.5 for 15.5%)
    pub fn from_percentage(percentage: Decimal) -> Self {
        Self { percentage }
    }

    /// Creates a rate from a percentage, rejecting negative values
    pub fn try_from_percentage(percentage: Decimal) -> Result<Self, RateError> {
        if percentage.is_sign_negative() && !percentage.is_zero() {
            return Err(RateError::Negative(percentage));
        }
        Ok(Self::from_percentage(percentage))
    }

    /// A zero rate
    pub fn zero() -> Self {
        Self::from_percentage(Decimal::ZERO)
    }

    /// Returns the rate as a percentage
    pub fn as_percentage(&self) -> Decimal {
        self.percentage
    }

    /// Returns the annual rate as a fraction (0.155 for 15.5%)
    pub fn as_decimal(&self) -> Decimal {
        self.percentage / dec!(100)
    }

    /// Returns the periodic monthly rate as a fraction
    pub fn monthly(&self) -> Decimal {
        self.as_decimal() / MONTHS_PER_YEAR
    }

    /// Returns true if the rate is zero
    pub fn is_zero(&self) -> bool {
        self.percentage.is_zero()
    }

    /// Applies the annual rate to an amount
    pub fn apply(&self, amount: Decimal) -> Decimal {
        amount * self.as_decimal()
    }
}

impl fmt::Display for Rate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.percentage.round_dp(4).normalize())
    }
}
