use chrono::NaiveDate;
use clap::Args;
use serde_json::Value;

use solar_finance_core::incentives::eligibility::{self, IncentiveEvaluationInput};

use crate::config::ConfigArgs;
use crate::input;

/// Arguments for incentive eligibility evaluation
#[derive(Args)]
pub struct IncentivesArgs {
    /// Path to JSON input file (profile + rules)
    #[arg(long)]
    pub input: Option<String>,

    /// Evaluation date for rule validity (YYYY-MM-DD); overrides the input
    #[arg(long)]
    pub as_of: Option<NaiveDate>,

    #[command(flatten)]
    pub config: ConfigArgs,
}

pub fn run_incentives(args: IncentivesArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let mut eval_input: IncentiveEvaluationInput =
        input::read_input(args.input.as_deref(), "incentive evaluation")?;
    if args.as_of.is_some() {
        eval_input.as_of = args.as_of;
    }
    let config = args.config.load(None, false)?;
    log::debug!("evaluating {} incentive rules", eval_input.rules.len());

    let result = eligibility::evaluate_incentives(&eval_input, &config.regional_multipliers)?;
    Ok(serde_json::to_value(result)?)
}
