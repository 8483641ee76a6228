use napi::Result as NapiResult;
use napi_derive::napi;
use serde::Deserialize;

use solar_finance_core::config::{RegionalMultiplierTable, TariffAssumptions, TariffRateTable};
use solar_finance_core::EngineConfig;

/// Convert any Display error into a napi::Error.
fn to_napi_error(e: impl std::fmt::Display) -> napi::Error {
    napi::Error::from_reason(e.to_string())
}

/// The tariff tables of an engine config. A full config document
/// deserializes into this as well; the other sections are ignored.
#[derive(Deserialize)]
struct TariffConfig {
    tariff_rates: TariffRateTable,
    #[serde(default)]
    tariff_assumptions: TariffAssumptions,
}

/// The regional multipliers of an engine config, absent means all 1.0.
#[derive(Deserialize)]
struct IncentiveConfig {
    #[serde(default)]
    regional_multipliers: RegionalMultiplierTable,
}

// ---------------------------------------------------------------------------
// Loan
// ---------------------------------------------------------------------------

#[napi]
pub fn calculate_loan(input_json: String) -> NapiResult<String> {
    let input: solar_finance_core::loan::amortization::LoanCalculationInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output =
        solar_finance_core::loan::amortization::calculate_loan(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

/// Takes bare `LoanParameters`; returns the row array.
#[napi]
pub fn loan_schedule(input_json: String) -> NapiResult<String> {
    let params: solar_finance_core::loan::amortization::LoanParameters =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let rows = solar_finance_core::loan::amortization::amortization_schedule(&params)
        .map_err(to_napi_error)?;
    serde_json::to_string(&rows).map_err(to_napi_error)
}

#[napi]
pub fn compare_loans(input_json: String) -> NapiResult<String> {
    let input: solar_finance_core::loan::comparison::LoanComparisonInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = solar_finance_core::loan::comparison::compare_loan_products(&input)
        .map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Incentives
// ---------------------------------------------------------------------------

#[napi]
pub fn evaluate_incentives(input_json: String, config_json: String) -> NapiResult<String> {
    let input: solar_finance_core::incentives::eligibility::IncentiveEvaluationInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let config: IncentiveConfig = serde_json::from_str(&config_json).map_err(to_napi_error)?;
    let output = solar_finance_core::incentives::eligibility::evaluate_incentives(
        &input,
        &config.regional_multipliers,
    )
    .map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Tariff
// ---------------------------------------------------------------------------

#[napi]
pub fn calculate_tariff(input_json: String, config_json: String) -> NapiResult<String> {
    let input: solar_finance_core::tariff::feed_in::TariffCalculationInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let config: TariffConfig = serde_json::from_str(&config_json).map_err(to_napi_error)?;
    let output = solar_finance_core::tariff::feed_in::calculate_tariff(
        &input,
        &config.tariff_rates,
        &config.tariff_assumptions,
    )
    .map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Investment
// ---------------------------------------------------------------------------

/// `config_json` must be a full engine config, tariff rule policy included.
#[napi]
pub fn analyze_investment(input_json: String, config_json: String) -> NapiResult<String> {
    let input: solar_finance_core::investment::analysis::InvestmentAnalysisInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let config: EngineConfig = serde_json::from_str(&config_json).map_err(to_napi_error)?;
    let output = solar_finance_core::investment::analysis::analyze_investment(&input, &config)
        .map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}
