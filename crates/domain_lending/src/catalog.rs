//! Loan products and their fixed rate table
//!
//! The catalog is built once at startup and shared read-only by the
//! calculator, the scoring engine and the origination service. Tests and
//! deployments can inject an alternate table through [`LoanCatalog::new`]
//! or [`LoanCatalog::with_rate`].

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use core_kernel::Rate;
use crate::error::LendingError;

/// Loan product families offered by the wizard
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoanType {
    /// Unsecured consumer loan
    Personal,
    /// Vehicle financing
    Vehicular,
    /// Mortgage
    Hipotecario,
    /// Working capital for a business
    Negocio,
}

impl LoanType {
    /// Every loan type, in catalog order
    pub const ALL: [LoanType; 4] = [
        LoanType::Personal,
        LoanType::Vehicular,
        LoanType::Hipotecario,
        LoanType::Negocio,
    ];

    /// Returns the wire name of the loan type
    pub fn as_str(&self) -> &'static str {
        match self {
            LoanType::Personal => "personal",
            LoanType::Vehicular => "vehicular",
            LoanType::Hipotecario => "hipotecario",
            LoanType::Negocio => "negocio",
        }
    }
}

impl fmt::Display for LoanType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LoanType {
    type Err = LendingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim();
        LoanType::ALL
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(needle))
            .ok_or_else(|| LendingError::UnknownLoanType(s.to_string()))
    }
}

/// Terms, bounds and rate for one loan type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanProduct {
    /// Loan type this product describes
    pub loan_type: LoanType,
    /// Display title
    pub title: String,
    /// Fixed annual interest rate
    pub annual_rate: Rate,
    /// Smallest amount that may be requested
    pub min_amount: Decimal,
    /// Largest amount that may be requested
    pub max_amount: Decimal,
    /// Allowed terms in months, ascending
    pub terms: Vec<u32>,
}

impl LoanProduct {
    /// Returns true if the amount lies within the product bounds (inclusive)
    pub fn accepts_amount(&self, amount: Decimal) -> bool {
        amount >= self.min_amount && amount <= self.max_amount
    }

    /// Returns true if the term is one of the product's allowed terms
    pub fn accepts_term(&self, term: u32) -> bool {
        self.terms.contains(&term)
    }
}

/// Immutable table of loan products keyed by type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<LoanProduct>", into = "Vec<LoanProduct>")]
pub struct LoanCatalog {
    products: BTreeMap<LoanType, LoanProduct>,
}

impl LoanCatalog {
    /// Builds a catalog, checking that every loan type is present and consistent
    ///
    /// # Errors
    ///
    /// Returns `LendingError::InvalidCatalog` if a type is missing or duplicated,
    /// a rate is negative, bounds are inverted, or a term list is empty or
    /// contains a zero term.
    pub fn new(products: impl IntoIterator<Item = LoanProduct>) -> Result<Self, LendingError> {
        let mut table = BTreeMap::new();

        for mut product in products {
            if product.annual_rate.as_percentage() < Decimal::ZERO {
                return Err(LendingError::InvalidCatalog(format!(
                    "{} has a negative rate",
                    product.loan_type
                )));
            }
            if product.min_amount > product.max_amount {
                return Err(LendingError::InvalidCatalog(format!(
                    "{} minimum amount exceeds maximum",
                    product.loan_type
                )));
            }
            if product.terms.is_empty() || product.terms.contains(&0) {
                return Err(LendingError::InvalidCatalog(format!(
                    "{} needs at least one non-zero term",
                    product.loan_type
                )));
            }
            product.terms.sort_unstable();
            product.terms.dedup();

            let loan_type = product.loan_type;
            if table.insert(loan_type, product).is_some() {
                return Err(LendingError::InvalidCatalog(format!(
                    "{} is defined twice",
                    loan_type
                )));
            }
        }

        if let Some(missing) = LoanType::ALL.iter().find(|t| !table.contains_key(*t)) {
            return Err(LendingError::InvalidCatalog(format!("{} is missing", missing)));
        }

        Ok(Self { products: table })
    }

    /// The standard product table
    pub fn standard() -> Self {
        let products = [
            (LoanType::Personal, "Préstamo Personal", dec!(15.5), dec!(500), dec!(50000), vec![6, 12, 24, 36]),
            (LoanType::Vehicular, "Préstamo Vehicular", dec!(12.8), dec!(5000), dec!(80000), vec![12, 24, 36, 48, 60]),
            (LoanType::Hipotecario, "Préstamo Hipotecario", dec!(8.5), dec!(20000), dec!(500000), vec![60, 120, 180, 240, 300]),
            (LoanType::Negocio, "Préstamo para Negocio", dec!(14.2), dec!(1000), dec!(100000), vec![6, 12, 24, 36, 48]),
        ];

        let products = products
            .into_iter()
            .map(|(loan_type, title, rate, min_amount, max_amount, terms)| {
                (
                    loan_type,
                    LoanProduct {
                        loan_type,
                        title: title.to_string(),
                        annual_rate: Rate::from_percentage(rate),
                        min_amount,
                        max_amount,
                        terms,
                    },
                )
            })
            .collect();

        Self { products }
    }

    /// Returns a copy of the catalog with one rate replaced
    ///
    /// # Errors
    ///
    /// Returns `LendingError::InvalidCatalog` if the rate is negative.
    pub fn with_rate(&self, loan_type: LoanType, annual_rate_percent: Decimal) -> Result<Self, LendingError> {
        let rate = Rate::try_from_percentage(annual_rate_percent)
            .map_err(|e| LendingError::InvalidCatalog(format!("{}: {}", loan_type, e)))?;

        let mut catalog = self.clone();
        if let Some(product) = catalog.products.get_mut(&loan_type) {
            product.annual_rate = rate;
        }
        Ok(catalog)
    }

    /// Returns the product for a loan type
    pub fn product(&self, loan_type: LoanType) -> &LoanProduct {
        // Construction guarantees every loan type is present.
        &self.products[&loan_type]
    }

    /// Returns the fixed annual rate for a loan type
    pub fn rate(&self, loan_type: LoanType) -> Rate {
        self.product(loan_type).annual_rate
    }

    /// Iterates over the products in catalog order
    pub fn products(&self) -> impl Iterator<Item = &LoanProduct> {
        self.products.values()
    }
}

impl TryFrom<Vec<LoanProduct>> for LoanCatalog {
    type Error = LendingError;

    fn try_from(products: Vec<LoanProduct>) -> Result<Self, Self::Error> {
        Self::new(products)
    }
}

impl From<LoanCatalog> for Vec<LoanProduct> {
    fn from(catalog: LoanCatalog) -> Self {
        catalog.products.into_values().collect()
    }
}

impl Default for LoanCatalog {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_rates() {
        let catalog = LoanCatalog::standard();
        assert_eq!(catalog.rate(LoanType::Personal).as_percentage(), dec!(15.5));
        assert_eq!(catalog.rate(LoanType::Vehicular).as_percentage(), dec!(12.8));
        assert_eq!(catalog.rate(LoanType::Hipotecario).as_percentage(), dec!(8.5));
        assert_eq!(catalog.rate(LoanType::Negocio).as_percentage(), dec!(14.2));
    }

    #[test]
    fn test_loan_type_parsing() {
        assert_eq!("hipotecario".parse::<LoanType>().unwrap(), LoanType::Hipotecario);
        assert_eq!(" Personal ".parse::<LoanType>().unwrap(), LoanType::Personal);
        assert!("leasing".parse::<LoanType>().is_err());
    }

    #[test]
    fn test_missing_type_rejected() {
        let products: Vec<LoanProduct> = LoanCatalog::standard()
            .products()
            .filter(|p| p.loan_type != LoanType::Negocio)
            .cloned()
            .collect();

        let err = LoanCatalog::new(products).unwrap_err();
        assert!(err.to_string().contains("negocio is missing"));
    }

    #[test]
    fn test_with_rate_overrides_single_type() {
        let catalog = LoanCatalog::standard()
            .with_rate(LoanType::Personal, dec!(0))
            .unwrap();
        assert!(catalog.rate(LoanType::Personal).is_zero());
        assert_eq!(catalog.rate(LoanType::Negocio).as_percentage(), dec!(14.2));
    }
}
