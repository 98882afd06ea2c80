//! Loan desk configuration
//!
//! Sources, later ones winning:
//! - optional `loan_desk.{toml,json,yaml}` in the working directory
//! - `LOAN_DESK_*` environment variables (`LOAN_DESK_RATES__PERSONAL=12.5`)

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;

use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError, Environment, File};
use rust_decimal::Decimal;
use serde::Deserialize;

use core_kernel::CoreError;
use domain_lending::{LoanCatalog, LoanType};

/// Loan desk configuration
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct DeskConfig {
    /// Log level or filter directive
    pub log_level: String,
    /// JSON file of rule drafts evaluated when `--rules` is not given
    pub rules_path: Option<PathBuf>,
    /// Annual rate overrides in percent, applied over the standard catalog
    pub rates: BTreeMap<LoanType, Decimal>,
}

impl Default for DeskConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            rules_path: None,
            rates: BTreeMap::new(),
        }
    }
}

impl DeskConfig {
    /// Loads configuration from the optional config file and environment
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_builder(
            Config::builder()
                .add_source(File::with_name("loan_desk").required(false))
                .add_source(
                    Environment::with_prefix("LOAN_DESK")
                        .prefix_separator("_")
                        .separator("__"),
                ),
        )
    }

    /// Builds configuration from explicit sources
    pub fn from_builder(builder: ConfigBuilder<DefaultState>) -> Result<Self, ConfigError> {
        builder.build()?.try_deserialize()
    }

    /// Checks values the deserializer cannot
    ///
    /// # Errors
    ///
    /// Returns `CoreError::Configuration` for a blank log level or a negative rate.
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.log_level.trim().is_empty() {
            return Err(CoreError::configuration("log_level must not be empty"));
        }
        if let Some((loan_type, rate)) = self.rates.iter().find(|(_, rate)| rate.is_sign_negative()) {
            return Err(CoreError::configuration(format!(
                "rate for {} must not be negative, got {}",
                loan_type, rate
            )));
        }
        Ok(())
    }

    /// The standard catalog with configured rate overrides
    pub fn catalog(&self) -> Result<Arc<LoanCatalog>, CoreError> {
        let mut catalog = LoanCatalog::standard();
        for (loan_type, rate) in &self.rates {
            catalog = catalog
                .with_rate(*loan_type, *rate)
                .map_err(|e| CoreError::configuration(e.to_string()))?;
        }
        Ok(Arc::new(catalog))
    }
}
