mod commands;
mod config;
mod input;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process;

use commands::incentives::IncentivesArgs;
use commands::investment::AnalyzeArgs;
use commands::loan::{CompareLoansArgs, LoanArgs, LoanScheduleArgs};
use commands::tariff::TariffArgs;

/// Solar investment financial engine
#[derive(Parser)]
#[command(
    name = "sfe",
    version,
    about = "Solar investment financial engine",
    long_about = "Evaluates solar installations as investments: loan amortization, \
                  government incentive eligibility, feed-in tariff valuation, and \
                  a combined net cost / payback summary. All arithmetic is decimal."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "json", global = true)]
    output: OutputFormat,
}

#[derive(Subcommand)]
enum Commands {
    /// Fixed-payment loan summary (payment, interest, effective rate)
    Loan(LoanArgs),
    /// Month-by-month repayment schedule
    LoanSchedule(LoanScheduleArgs),
    /// Rank a loan product catalog for one request
    CompareLoans(CompareLoansArgs),
    /// Evaluate incentive rules against a project profile
    Incentives(IncentivesArgs),
    /// Value a feed-in tariff contract
    Tariff(TariffArgs),
    /// Full investment analysis: loan, incentives, tariff, payback
    Analyze(AnalyzeArgs),
    /// Print version information
    Version,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Csv,
    Minimal,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();

    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::Loan(args) => commands::loan::run_loan(args),
        Commands::LoanSchedule(args) => commands::loan::run_loan_schedule(args),
        Commands::CompareLoans(args) => commands::loan::run_compare_loans(args),
        Commands::Incentives(args) => commands::incentives::run_incentives(args),
        Commands::Tariff(args) => commands::tariff::run_tariff(args),
        Commands::Analyze(args) => commands::investment::run_analyze(args),
        Commands::Version => {
            println!("sfe {}", env!("CARGO_PKG_VERSION"));
            return;
        }
    };

    match result {
        Ok(value) => {
            log_warnings(&value);
            output::format_output(&cli.output, &value);
            process::exit(0);
        }
        Err(e) => {
            log::error!("{e}");
            eprintln!("{}: {}", "error".red().bold(), e);
            process::exit(1);
        }
    }
}

fn log_warnings(value: &serde_json::Value) {
    if let Some(warnings) = value.get("warnings").and_then(|w| w.as_array()) {
        for w in warnings.iter().filter_map(|w| w.as_str()) {
            log::warn!("{w}");
        }
    }
}
