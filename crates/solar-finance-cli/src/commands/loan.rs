use clap::{Args, ValueEnum};
use rust_decimal::Decimal;
use serde_json::Value;

use solar_finance_core::loan::amortization::{
    self, LoanCalculationInput, LoanParameters, LoanProduct, LoanType,
};
use solar_finance_core::loan::comparison::{self, LoanComparisonInput};

use crate::input;

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum LoanTypeArg {
    Consumer,
    Business,
    Agricultural,
    Leasing,
}

impl From<LoanTypeArg> for LoanType {
    fn from(arg: LoanTypeArg) -> Self {
        match arg {
            LoanTypeArg::Consumer => LoanType::Consumer,
            LoanTypeArg::Business => LoanType::Business,
            LoanTypeArg::Agricultural => LoanType::Agricultural,
            LoanTypeArg::Leasing => LoanType::Leasing,
        }
    }
}

/// Arguments for a single loan calculation
#[derive(Args)]
pub struct LoanArgs {
    /// Path to JSON input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Financed amount
    #[arg(long)]
    pub amount: Option<Decimal>,

    /// Down payment paid up front
    #[arg(long, default_value = "0")]
    pub down_payment: Decimal,

    /// Annual interest rate in percent
    #[arg(long)]
    pub rate: Option<Decimal>,

    /// Term in months
    #[arg(long)]
    pub term: Option<u32>,

    /// Processing fee
    #[arg(long, default_value = "0")]
    pub fee: Decimal,

    /// Insurance as percent of principal
    #[arg(long, default_value = "0")]
    pub insurance: Decimal,

    /// Lending bank
    #[arg(long, default_value = "custom")]
    pub bank: String,

    #[arg(long, value_enum, default_value = "consumer")]
    pub loan_type: LoanTypeArg,
}

/// Arguments for a month-by-month repayment schedule
#[derive(Args)]
pub struct LoanScheduleArgs {
    #[command(flatten)]
    pub loan: LoanArgs,
}

/// Arguments for ranking a loan product catalog
#[derive(Args)]
pub struct CompareLoansArgs {
    /// Path to JSON input file
    #[arg(long)]
    pub input: Option<String>,
}

pub fn run_loan(args: LoanArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let loan_input = build_input(&args)?;
    let result = amortization::calculate_loan(&loan_input)?;
    Ok(serde_json::to_value(result)?)
}

pub fn run_loan_schedule(args: LoanScheduleArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let loan_input = build_input(&args.loan)?;
    let rows = amortization::amortization_schedule(&loan_input.parameters)?;
    log::debug!("{} schedule rows", rows.len());
    Ok(serde_json::to_value(rows)?)
}

pub fn run_compare_loans(args: CompareLoansArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let cmp_input: LoanComparisonInput =
        input::read_input(args.input.as_deref(), "loan comparison")?;
    log::debug!("comparing {} loan products", cmp_input.products.len());
    let result = comparison::compare_loan_products(&cmp_input)?;
    Ok(serde_json::to_value(result)?)
}

fn build_input(args: &LoanArgs) -> Result<LoanCalculationInput, Box<dyn std::error::Error>> {
    if args.input.is_some() {
        return input::read_input(args.input.as_deref(), "loan calculation");
    }

    match (args.amount, args.rate, args.term) {
        (Some(amount), Some(rate), Some(term)) => Ok(LoanCalculationInput {
            parameters: LoanParameters {
                loan_amount: amount,
                down_payment: args.down_payment,
                interest_rate_pct: rate,
                term_months: term,
                selected_product: LoanProduct {
                    bank_name: args.bank.clone(),
                    loan_type: args.loan_type.into(),
                    interest_rate_pct: rate,
                    max_term_months: term,
                    processing_fee: args.fee,
                    insurance_rate_pct: args.insurance,
                },
            },
            include_schedule: false,
        }),
        (None, None, None) => input::read_input(None, "loan calculation"),
        _ => Err("--amount, --rate and --term are all required without --input".into()),
    }
}
