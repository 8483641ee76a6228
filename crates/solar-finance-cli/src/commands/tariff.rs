use clap::{Args, ValueEnum};
use rust_decimal::Decimal;
use serde_json::Value;

use solar_finance_core::tariff::feed_in::{self, TariffCalculationInput, TariffParameters};
use solar_finance_core::tariff::LicenseType;

use crate::config::ConfigArgs;
use crate::input;

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum LicenseArg {
    Licensed,
    Unlicensed,
}

impl From<LicenseArg> for LicenseType {
    fn from(arg: LicenseArg) -> Self {
        match arg {
            LicenseArg::Licensed => LicenseType::Licensed,
            LicenseArg::Unlicensed => LicenseType::Unlicensed,
        }
    }
}

/// Arguments for feed-in tariff valuation
#[derive(Args)]
pub struct TariffArgs {
    /// Path to JSON input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Installed capacity in kW
    #[arg(long)]
    pub system_size_kw: Option<Decimal>,

    #[arg(long, value_enum, default_value = "unlicensed")]
    pub license: LicenseArg,

    /// Contract length in years (5-15)
    #[arg(long, default_value_t = 10)]
    pub years: u32,

    /// System is not connected to the grid
    #[arg(long)]
    pub off_grid: bool,

    /// Contract currency per unit of the tariff's reference currency
    #[arg(long)]
    pub exchange_rate: Option<Decimal>,

    #[command(flatten)]
    pub config: ConfigArgs,
}

pub fn run_tariff(args: TariffArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let tariff_input: TariffCalculationInput = match (args.system_size_kw, args.exchange_rate) {
        (Some(size), Some(fx)) if args.input.is_none() => TariffCalculationInput {
            parameters: TariffParameters {
                system_size_kw: size,
                license_type: args.license.into(),
                contract_duration_years: args.years,
                grid_connected: !args.off_grid,
            },
            exchange_rate: fx,
        },
        _ => input::read_input(args.input.as_deref(), "tariff valuation")?,
    };
    let config = args.config.load(None, false)?;

    let result = feed_in::calculate_tariff(
        &tariff_input,
        &config.tariff_rates,
        &config.tariff_assumptions,
    )?;
    Ok(serde_json::to_value(result)?)
}
