use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use super::summary::{summarize, summary_warnings, InvestmentSummary, LONG_HORIZON_YEARS};
use crate::config::EngineConfig;
use crate::error::SolarFinanceError;
use crate::incentives::eligibility::{evaluate_rules, IncentiveCalculationResult, IncentiveRule};
use crate::loan::amortization::{
    compute_amortization, AmortizationResult, LoanParameters, LoanProduct,
};
use crate::tariff::feed_in::{value_tariff, TariffParameters, TariffValuation};
use crate::types::{with_metadata, ComputationOutput, Money, Percent, ProjectProfile};
use crate::SolarFinanceResult;

// ---------------------------------------------------------------------------
// Input / Output
// ---------------------------------------------------------------------------

/// Which catalog product finances the project, and how.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoanSelection {
    pub bank_name: String,
    pub down_payment: Money,
    pub term_months: u32,
    /// Negotiated rate; the product's list rate when omitted
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interest_rate_pct: Option<Percent>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvestmentAnalysisInput {
    pub profile: ProjectProfile,
    pub loan_products: Vec<LoanProduct>,
    pub loan: LoanSelection,
    #[serde(default)]
    pub incentive_rules: Vec<IncentiveRule>,
    pub tariff: TariffParameters,
    pub exchange_rate: Decimal,
    /// Evaluation date for incentive validity; today when omitted
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub as_of: Option<NaiveDate>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvestmentAnalysisOutput {
    pub summary: InvestmentSummary,
    pub loan_parameters: LoanParameters,
    pub amortization: AmortizationResult,
    pub incentives: Vec<IncentiveCalculationResult>,
    pub tariff: TariffValuation,
    pub as_of: NaiveDate,
}

// ---------------------------------------------------------------------------
// Core computation
// ---------------------------------------------------------------------------

/// Run the loan, incentive and tariff engines for one project and combine
/// them into an investment summary.
pub fn analyze_investment(
    input: &InvestmentAnalysisInput,
    config: &EngineConfig,
) -> SolarFinanceResult<ComputationOutput<InvestmentAnalysisOutput>> {
    let start = Instant::now();

    config.validate()?;
    input.profile.validate()?;

    let loan_parameters = select_loan(input)?;
    let amortization = compute_amortization(&loan_parameters)?;

    let as_of = input
        .as_of
        .unwrap_or_else(|| chrono::Local::now().date_naive());
    let incentives = evaluate_rules(
        &input.incentive_rules,
        &input.profile,
        as_of,
        &config.regional_multipliers,
    )?;

    let tariff = value_tariff(
        &input.tariff,
        input.exchange_rate,
        &config.tariff_rates,
        &config.tariff_assumptions,
    )?;

    let summary = summarize(
        &input.profile,
        &amortization,
        &incentives,
        tariff.total_value,
        config.tariff_rule_policy,
    )?;

    let mut warnings = summary_warnings(&summary);
    if input.tariff.system_size_kw != input.profile.system_size_kw {
        warnings.push(format!(
            "Tariff sized for {} kW but the project is {} kW",
            input.tariff.system_size_kw, input.profile.system_size_kw
        ));
    }

    let assumptions = serde_json::json!({
        "tariff_rule_policy": config.tariff_rule_policy,
        "long_horizon_years": LONG_HORIZON_YEARS,
        "long_horizon_return": "undiscounted savings less net cost over net cost; not an IRR",
        "annual_yield_kwh_per_kw": config.tariff_assumptions.annual_yield_kwh_per_kw.to_string(),
        "surplus_share": config.tariff_assumptions.surplus_share.to_string(),
        "exchange_rate": input.exchange_rate.to_string(),
    });
    let elapsed = start.elapsed().as_micros() as u64;

    Ok(with_metadata(
        "Solar investment summary: annuity loan, gated incentives, feed-in tariff",
        &assumptions,
        warnings,
        elapsed,
        InvestmentAnalysisOutput {
            summary,
            loan_parameters,
            amortization,
            incentives,
            tariff,
            as_of,
        },
    ))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn select_loan(input: &InvestmentAnalysisInput) -> SolarFinanceResult<LoanParameters> {
    let selection = &input.loan;
    let product = input
        .loan_products
        .iter()
        .find(|p| p.bank_name == selection.bank_name)
        .ok_or_else(|| {
            SolarFinanceError::invalid(
                "loan.bank_name",
                format!("No loan product from '{}' in the catalog", selection.bank_name),
            )
        })?;

    let mut params = LoanParameters::from_product(
        product,
        input.profile.total_cost,
        selection.down_payment,
        selection.term_months,
    )?;
    if let Some(rate) = selection.interest_rate_pct {
        params.interest_rate_pct = rate;
        params.validate()?;
    }
    Ok(params)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{LicenseType, TariffRulePolicy};
    use crate::loan::amortization::LoanType;
    use crate::types::CustomerType;
    use rust_decimal_macros::dec;

    fn sample_input() -> InvestmentAnalysisInput {
        InvestmentAnalysisInput {
            profile: ProjectProfile {
                system_size_kw: dec!(30),
                total_cost: dec!(600_000),
                annual_production_kwh: dec!(39_000),
                monthly_energy_savings: dec!(8_000),
                location: "ic_anadolu".into(),
                customer_type: CustomerType::Corporate,
            },
            loan_products: vec![LoanProduct {
                bank_name: "Akbank".into(),
                loan_type: LoanType::Business,
                interest_rate_pct: dec!(24),
                max_term_months: 60,
                processing_fee: dec!(3_000),
                insurance_rate_pct: dec!(0.3),
            }],
            loan: LoanSelection {
                bank_name: "Akbank".into(),
                down_payment: dec!(120_000),
                term_months: 48,
                interest_rate_pct: None,
            },
            incentive_rules: vec![],
            tariff: TariffParameters {
                system_size_kw: dec!(30),
                license_type: LicenseType::Unlicensed,
                contract_duration_years: 10,
                grid_connected: false,
            },
            exchange_rate: dec!(32),
            as_of: Some(NaiveDate::from_ymd_opt(2025, 1, 15).unwrap()),
        }
    }

    #[test]
    fn test_loan_selected_from_catalog() {
        let out = analyze_investment(
            &sample_input(),
            &EngineConfig::reference(TariffRulePolicy::ContractOnly),
        )
        .unwrap();
        assert_eq!(out.result.loan_parameters.loan_amount, dec!(480_000));
        assert_eq!(out.result.summary.monthly_payment, out.result.amortization.monthly_payment);
        assert_eq!(out.result.tariff.total_value, Decimal::ZERO);
    }

    #[test]
    fn test_unknown_bank_rejected() {
        let mut input = sample_input();
        input.loan.bank_name = "Nobank".into();
        let err = analyze_investment(&input, &EngineConfig::reference(TariffRulePolicy::SumBoth))
            .unwrap_err();
        match err {
            SolarFinanceError::InvalidInput { field, .. } => assert_eq!(field, "loan.bank_name"),
            other => panic!("Expected InvalidInput, got {other:?}"),
        }
    }

    #[test]
    fn test_loan_funds_cost_less_down_payment() {
        let out = analyze_investment(
            &sample_input(),
            &EngineConfig::reference(TariffRulePolicy::SumBoth),
        )
        .unwrap();
        let params = &out.result.loan_parameters;
        assert_eq!(params.loan_amount + params.down_payment, dec!(600_000));

        let mut input = sample_input();
        input.loan.down_payment = dec!(600_000);
        match analyze_investment(&input, &EngineConfig::reference(TariffRulePolicy::SumBoth)) {
            Err(SolarFinanceError::InvalidInput { field, .. }) => assert_eq!(field, "down_payment"),
            other => panic!("Expected InvalidInput, got {other:?}"),
        }
    }

    #[test]
    fn test_negotiated_rate_overrides_list_rate() {
        let mut input = sample_input();
        input.loan.interest_rate_pct = Some(Decimal::ZERO);
        let out = analyze_investment(&input, &EngineConfig::reference(TariffRulePolicy::SumBoth))
            .unwrap();
        assert_eq!(out.result.amortization.monthly_payment, dec!(480_000) / dec!(48));
    }

    #[test]
    fn test_invalid_config_rejected() {
        let mut config = EngineConfig::reference(TariffRulePolicy::SumBoth);
        config.tariff_assumptions.annual_yield_kwh_per_kw = Decimal::ZERO;
        assert!(analyze_investment(&sample_input(), &config).is_err());
    }

    #[test]
    fn test_tariff_size_mismatch_warns() {
        let mut input = sample_input();
        input.tariff.system_size_kw = dec!(25);
        let out = analyze_investment(&input, &EngineConfig::reference(TariffRulePolicy::SumBoth))
            .unwrap();
        assert!(out.warnings.iter().any(|w| w.contains("Tariff sized for 25 kW")));
    }
}
