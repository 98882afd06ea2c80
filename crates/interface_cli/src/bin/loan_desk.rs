//! Loan Desk - Command Line Binary
//!
//! Prices loans, scores wizard exports and runs them through the approval rules.
//!
//! # Usage
//!
//! ```bash
//! loan-desk quote --loan-type personal --amount 5000 --term 24
//! loan-desk score --application solicitud.json
//! loan-desk evaluate --application solicitud.json --rules reglas.json
//! ```
//!
//! # Environment Variables
//!
//! * `LOAN_DESK_LOG_LEVEL` - Log level: trace, debug, info, warn, error (default: info)
//! * `LOAN_DESK_RULES_PATH` - Rule drafts used when `--rules` is not given
//! * `LOAN_DESK_RATES__<TYPE>` - Annual rate override in percent, e.g. `LOAN_DESK_RATES__PERSONAL=12.5`
//! * `RUST_LOG` - Overrides the configured log filter

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::{Parser, Subcommand};
use rust_decimal::Decimal;
use serde::Serialize;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use domain_lending::LoanType;
use interface_cli::{load_application, DeskConfig, DeskError, LoanDesk};

#[derive(Parser, Debug)]
#[command(name = "loan-desk", about = "Loan pricing, credit scoring and approval rules", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Price a loan at the catalog rate
    Quote {
        /// personal, vehicular, hipotecario or negocio
        #[arg(long)]
        loan_type: LoanType,
        #[arg(long)]
        amount: Decimal,
        /// Term in months
        #[arg(long)]
        term: u32,
    },
    /// Score a wizard export without submitting it
    Score {
        #[arg(long)]
        application: PathBuf,
    },
    /// Submit a wizard export and evaluate it against the approval rules
    Evaluate {
        #[arg(long)]
        application: PathBuf,
        /// Rule drafts; overrides the configured rules path
        #[arg(long)]
        rules: Option<PathBuf>,
    },
}

fn main() -> ExitCode {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!(error = %err, "Command failed");
            eprintln!("error: {:#}", err);
            let code = err.downcast_ref::<DeskError>().map_or(1, DeskError::exit_code);
            ExitCode::from(code)
        }
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let config = DeskConfig::load()
        .map_err(DeskError::from)
        .context("loading configuration")?;
    init_tracing(&config.log_level);

    match cli.command {
        Command::Quote { loan_type, amount, term } => {
            let desk = LoanDesk::from_config(&config, None)?;
            print_json(&desk.quote(loan_type, amount, term)?)
        }
        Command::Score { application } => {
            let desk = LoanDesk::from_config(&config, None)?;
            print_json(&desk.score(load_application(&application)?)?)
        }
        Command::Evaluate { application, rules } => {
            let desk = LoanDesk::from_config(&config, rules.as_deref())?;
            let summary = desk.evaluate(load_application(&application)?)?;
            tracing::info!(application_id = %summary.id, status = %summary.status, "Evaluation complete");
            print_json(&summary)
        }
    }
}

/// Initializes the tracing subscriber; logs go to stderr so stdout stays JSON.
fn init_tracing(log_level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_target(true).with_writer(std::io::stderr))
        .init();
}

fn print_json(value: &impl Serialize) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
