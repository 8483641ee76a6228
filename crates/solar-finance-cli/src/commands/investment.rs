use chrono::NaiveDate;
use clap::Args;
use serde_json::Value;

use solar_finance_core::investment::analysis::{self, InvestmentAnalysisInput};

use crate::config::{ConfigArgs, TariffPolicyArg};
use crate::input;

/// Arguments for the full investment analysis
#[derive(Args)]
pub struct AnalyzeArgs {
    /// Path to JSON input file (profile, loan catalog and selection,
    /// incentive rules, tariff parameters, exchange rate)
    #[arg(long)]
    pub input: Option<String>,

    /// Evaluation date for incentive validity (YYYY-MM-DD)
    #[arg(long)]
    pub as_of: Option<NaiveDate>,

    /// How TARIFF rules and the feed-in contract combine; overrides the
    /// config file
    #[arg(long, value_enum)]
    pub tariff_policy: Option<TariffPolicyArg>,

    #[command(flatten)]
    pub config: ConfigArgs,
}

pub fn run_analyze(args: AnalyzeArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let mut analysis_input: InvestmentAnalysisInput =
        input::read_input(args.input.as_deref(), "investment analysis")?;
    if args.as_of.is_some() {
        analysis_input.as_of = args.as_of;
    }
    let config = args
        .config
        .load(args.tariff_policy.map(Into::into), true)?;
    log::debug!(
        "{} loan products, {} incentive rules",
        analysis_input.loan_products.len(),
        analysis_input.incentive_rules.len()
    );

    let result = analysis::analyze_investment(&analysis_input, &config)?;
    Ok(serde_json::to_value(result)?)
}
