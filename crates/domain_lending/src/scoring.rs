//! Credit scoring engine
//!
//! Four independent factors are summed, clamped to the 300–850 scale and
//! floored to an integer score:
//!
//! | factor     | points                                                   | max |
//! |------------|----------------------------------------------------------|-----|
//! | income     | `min(250, income / 1000 × 25)`                           | 250 |
//! | debt ratio | 200 / 150 / 100 / 50 for ratio < 30 / < 40 / < 50 / else | 200 |
//! | employment | 150 dependiente or 100 independiente, + `min(50, years × 15)` | 200 |
//! | history    | 150 existing client, else 75                             | 150 |
//!
//! The debt ratio is the reference payment for the requested amount and
//! term over monthly income, as a percentage.
//!
//! # Reference rate
//!
//! The reference payment is always priced at the catalog's *personal* rate,
//! whatever loan type the applicant chose. This matches the scores the
//! wizard has always produced. It is likely an unintended coupling and is
//! kept until product confirms the intended policy.

use std::fmt;
use std::sync::Arc;

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::amortization::calculate_monthly_payment;
use crate::applicant::{EmploymentType, LoanDetails, WorkInfo};
use crate::catalog::{LoanCatalog, LoanType};
use crate::error::LendingError;

/// Lowest score on the scale
pub const MIN_SCORE: u16 = 300;

/// Highest score on the scale
pub const MAX_SCORE: u16 = 850;

/// Minimum score for approval
pub const APPROVAL_SCORE: u16 = 550;

/// Debt ratio (percent) at or above which an application is never approved
pub const MAX_DEBT_RATIO: Decimal = dec!(50);

/// Qualitative tier derived from the score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CreditRating {
    /// Below 550
    Bajo,
    /// 550 to 649
    Regular,
    /// 650 to 749
    Bueno,
    /// 750 and above
    Excelente,
}

impl CreditRating {
    /// Rating for a score
    pub fn from_score(score: u16) -> Self {
        match score {
            750.. => CreditRating::Excelente,
            650..=749 => CreditRating::Bueno,
            550..=649 => CreditRating::Regular,
            _ => CreditRating::Bajo,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CreditRating::Excelente => "excelente",
            CreditRating::Bueno => "bueno",
            CreditRating::Regular => "regular",
            CreditRating::Bajo => "bajo",
        }
    }
}

impl fmt::Display for CreditRating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Points contributed by each factor, before clamping
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreFactors {
    pub income: Decimal,
    pub debt_ratio: Decimal,
    pub employment: Decimal,
    pub history: Decimal,
}

impl ScoreFactors {
    /// Unclamped sum of all factors
    pub fn total(&self) -> Decimal {
        self.income
            .saturating_add(self.debt_ratio)
            .saturating_add(self.employment)
            .saturating_add(self.history)
    }
}

/// Scoring result attached to an application at submission
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreditScore {
    /// Clamped, floored score in [300, 850]
    pub score: u16,
    pub rating: CreditRating,
    pub factors: ScoreFactors,
    pub approved: bool,
    /// Largest amount the applicant qualifies for, in whole units
    pub max_approved_amount: Decimal,
    /// Reference debt-to-income ratio as a percentage; absent when income is not positive
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub debt_to_income: Option<Decimal>,
}

/// Income factor: 25 points per 1000 of monthly income, capped at 250
pub fn income_points(monthly_income: Decimal) -> Decimal {
    (monthly_income / dec!(1000)).saturating_mul(dec!(25)).min(dec!(250))
}

/// Debt-ratio factor; an undefined ratio scores as the worst tier
pub fn debt_ratio_points(debt_ratio: Option<Decimal>) -> Decimal {
    match debt_ratio {
        Some(ratio) if ratio < dec!(30) => dec!(200),
        Some(ratio) if ratio < dec!(40) => dec!(150),
        Some(ratio) if ratio < MAX_DEBT_RATIO => dec!(100),
        _ => dec!(50),
    }
}

/// Employment factor: base by employment type plus 15 points per year, capped at 50
pub fn employment_points(employment_type: EmploymentType, work_years: Decimal) -> Decimal {
    let base = match employment_type {
        EmploymentType::Dependiente => dec!(150),
        EmploymentType::Independiente => dec!(100),
    };
    base + work_years.saturating_mul(dec!(15)).min(dec!(50))
}

/// Banking history factor
pub fn history_points(is_existing_client: bool) -> Decimal {
    if is_existing_client {
        dec!(150)
    } else {
        dec!(75)
    }
}

/// Clamps a factor sum to the scale, keeping any fraction
pub fn clamp_score(total: Decimal) -> Decimal {
    total.max(Decimal::from(MIN_SCORE)).min(Decimal::from(MAX_SCORE))
}

/// Clamps a factor sum to the scale and floors it
pub fn normalize_score(total: Decimal) -> u16 {
    clamp_score(total).floor().to_u16().unwrap_or(MIN_SCORE)
}

/// Approval requires the minimum score and a defined ratio below 50%
pub fn is_approved(score: u16, debt_ratio: Option<Decimal>) -> bool {
    score >= APPROVAL_SCORE && debt_ratio.is_some_and(|ratio| ratio < MAX_DEBT_RATIO)
}

/// `floor(income × score / 200 × 0.4 × term)`
///
/// `clamped_score` is the clamped factor sum before flooring. Returns
/// `None` if the product does not fit in a `Decimal`.
pub fn max_approved_amount(monthly_income: Decimal, clamped_score: Decimal, term: u32) -> Option<Decimal> {
    // score / 200 × 0.4 == score / 500, at most 1.7 per month
    let multiplier = (clamped_score / dec!(500)).checked_mul(Decimal::from(term))?;
    monthly_income.checked_mul(multiplier).map(|amount| amount.floor())
}

/// Scores applicants against a loan catalog
#[derive(Debug, Clone)]
pub struct CreditScoringEngine {
    catalog: Arc<LoanCatalog>,
}

impl CreditScoringEngine {
    pub fn new(catalog: Arc<LoanCatalog>) -> Self {
        Self { catalog }
    }

    /// Annual rate used to price the reference payment
    pub fn reference_rate(&self) -> Decimal {
        self.catalog.rate(LoanType::Personal).as_percentage()
    }

    /// Reference debt-to-income ratio as a percentage
    ///
    /// Returns `None` when monthly income is zero or negative.
    ///
    /// # Errors
    ///
    /// Returns `LendingError::InvalidTerm` for a zero-month term, or
    /// `LendingError::Calculation` if the ratio overflows.
    pub fn debt_to_income(&self, work_info: &WorkInfo, loan_details: &LoanDetails) -> Result<Option<Decimal>, LendingError> {
        let payment = calculate_monthly_payment(loan_details.amount, self.reference_rate(), loan_details.term)?;

        if work_info.monthly_income <= Decimal::ZERO {
            return Ok(None);
        }
        payment
            .checked_div(work_info.monthly_income)
            .and_then(|share| share.checked_mul(dec!(100)))
            .map(Some)
            .ok_or_else(|| LendingError::calculation("debt-to-income ratio overflowed"))
    }

    /// Computes the credit score for an applicant
    ///
    /// # Arguments
    ///
    /// * `work_info` - Employment and income
    /// * `loan_details` - Requested amount and term
    /// * `is_existing_client` - Whether the applicant already banks with us
    ///
    /// # Errors
    ///
    /// Returns `LendingError::InvalidTerm` for a zero-month term, or
    /// `LendingError::Calculation` if the reference payment, the ratio or the
    /// max approved amount does not fit in a `Decimal`.
    pub fn calculate(
        &self,
        work_info: &WorkInfo,
        loan_details: &LoanDetails,
        is_existing_client: bool,
    ) -> Result<CreditScore, LendingError> {
        let debt_to_income = self.debt_to_income(work_info, loan_details)?;

        let factors = ScoreFactors {
            income: income_points(work_info.monthly_income),
            debt_ratio: debt_ratio_points(debt_to_income),
            employment: employment_points(work_info.employment_type, work_info.work_years),
            history: history_points(is_existing_client),
        };

        let clamped = clamp_score(factors.total());
        let score = normalize_score(clamped);
        let rating = CreditRating::from_score(score);
        let approved = is_approved(score, debt_to_income);

        let max_approved_amount = max_approved_amount(work_info.monthly_income, clamped, loan_details.term)
            .ok_or_else(|| LendingError::calculation("max approved amount overflowed"))?;

        debug!(
            score,
            rating = %rating,
            approved,
            debt_to_income = ?debt_to_income,
            "Credit score calculated"
        );

        Ok(CreditScore {
            score,
            rating,
            factors,
            approved,
            max_approved_amount,
            debt_to_income,
        })
    }
}

impl Default for CreditScoringEngine {
    fn default() -> Self {
        Self::new(Arc::new(LoanCatalog::standard()))
    }
}
