//! Feed-in tariff (YEKDEM-style) contract valuation.
//!
//! Surplus energy is estimated from installed capacity, never from metering:
//! `capacity * annual_yield * surplus_share`. It is priced at the license
//! class rate in the reference currency, converted at the supplied exchange
//! rate, and summed over the contract. Systems that are not grid-connected
//! cannot sell surplus and are worth zero.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::config::{LicenseType, TariffAssumptions, TariffRateTable};
use crate::error::SolarFinanceError;
use crate::types::{round_currency, with_metadata, ComputationOutput, Kw, Kwh, Money};
use crate::SolarFinanceResult;

pub const MIN_CONTRACT_YEARS: u32 = 5;
pub const MAX_CONTRACT_YEARS: u32 = 15;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TariffParameters {
    pub system_size_kw: Kw,
    pub license_type: LicenseType,
    pub contract_duration_years: u32,
    pub grid_connected: bool,
}

/// Breakdown of a tariff contract's value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TariffValuation {
    pub grid_connected: bool,
    pub annual_production_kwh: Kwh,
    pub surplus_energy_kwh: Kwh,
    /// Per-kWh rate in the reference currency
    pub rate_per_kwh: Money,
    pub exchange_rate: Decimal,
    /// Annual surplus revenue in contract currency, unrounded
    pub annual_value: Money,
    pub contract_duration_years: u32,
    /// Whole-unit value over the full contract
    pub total_value: Money,
}

impl TariffValuation {
    fn not_connected(params: &TariffParameters, exchange_rate: Decimal) -> Self {
        Self {
            grid_connected: false,
            annual_production_kwh: Decimal::ZERO,
            surplus_energy_kwh: Decimal::ZERO,
            rate_per_kwh: Decimal::ZERO,
            exchange_rate,
            annual_value: Decimal::ZERO,
            contract_duration_years: params.contract_duration_years,
            total_value: Decimal::ZERO,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TariffCalculationInput {
    pub parameters: TariffParameters,
    /// Contract currency per unit of reference currency
    pub exchange_rate: Decimal,
}

/// Value a feed-in contract with its full breakdown.
pub fn value_tariff(
    params: &TariffParameters,
    exchange_rate: Decimal,
    rates: &TariffRateTable,
    assumptions: &TariffAssumptions,
) -> SolarFinanceResult<TariffValuation> {
    if !params.grid_connected {
        return Ok(TariffValuation::not_connected(params, exchange_rate));
    }
    validate_params(params, exchange_rate)?;

    let annual_production_kwh = params.system_size_kw * assumptions.annual_yield_kwh_per_kw;
    let surplus_energy_kwh = annual_production_kwh * assumptions.surplus_share;
    let rate_per_kwh = rates.rate_for(params.license_type);
    let annual_value = surplus_energy_kwh * rate_per_kwh * exchange_rate;
    let total_value =
        round_currency(annual_value * Decimal::from(params.contract_duration_years))
            .max(Decimal::ZERO);

    Ok(TariffValuation {
        grid_connected: true,
        annual_production_kwh,
        surplus_energy_kwh,
        rate_per_kwh,
        exchange_rate,
        annual_value,
        contract_duration_years: params.contract_duration_years,
        total_value,
    })
}

/// Total contract value in whole contract-currency units.
pub fn compute_tariff_value(
    params: &TariffParameters,
    exchange_rate: Decimal,
    rates: &TariffRateTable,
    assumptions: &TariffAssumptions,
) -> SolarFinanceResult<Money> {
    value_tariff(params, exchange_rate, rates, assumptions).map(|v| v.total_value)
}

/// Value a feed-in contract, wrapped in the standard output envelope.
pub fn calculate_tariff(
    input: &TariffCalculationInput,
    rates: &TariffRateTable,
    assumptions: &TariffAssumptions,
) -> SolarFinanceResult<ComputationOutput<TariffValuation>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    rates.validate()?;
    assumptions.validate()?;
    let valuation = value_tariff(&input.parameters, input.exchange_rate, rates, assumptions)?;
    if !valuation.grid_connected {
        warnings.push("System is not grid-connected; no surplus can be sold".into());
    }

    let assumptions_json = serde_json::json!({
        "annual_yield_kwh_per_kw": assumptions.annual_yield_kwh_per_kw.to_string(),
        "surplus_share": assumptions.surplus_share.to_string(),
        "note": "yield and surplus share are fixed estimates, not metered values",
    });
    let elapsed = start.elapsed().as_micros() as u64;

    Ok(with_metadata(
        "Feed-in tariff valuation: estimated surplus x license rate x FX x years",
        &assumptions_json,
        warnings,
        elapsed,
        valuation,
    ))
}

fn validate_params(params: &TariffParameters, exchange_rate: Decimal) -> SolarFinanceResult<()> {
    if params.system_size_kw <= Decimal::ZERO {
        return Err(SolarFinanceError::invalid(
            "system_size_kw",
            "System size must be positive",
        ));
    }
    if !(MIN_CONTRACT_YEARS..=MAX_CONTRACT_YEARS).contains(&params.contract_duration_years) {
        return Err(SolarFinanceError::invalid(
            "contract_duration_years",
            format!(
                "Contract duration must be {MIN_CONTRACT_YEARS}–{MAX_CONTRACT_YEARS} years, got {}",
                params.contract_duration_years
            ),
        ));
    }
    if exchange_rate <= Decimal::ZERO {
        return Err(SolarFinanceError::invalid(
            "exchange_rate",
            "Exchange rate must be positive",
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn sample_params(years: u32) -> TariffParameters {
        TariffParameters {
            system_size_kw: dec!(100),
            license_type: LicenseType::Unlicensed,
            contract_duration_years: years,
            grid_connected: true,
        }
    }

    fn value(params: &TariffParameters, fx: Decimal) -> SolarFinanceResult<Money> {
        compute_tariff_value(
            params,
            fx,
            &TariffRateTable::reference(),
            &TariffAssumptions::default(),
        )
    }

    #[test]
    fn test_surplus_estimate() {
        let v = value_tariff(
            &sample_params(10),
            dec!(30),
            &TariffRateTable::reference(),
            &TariffAssumptions::default(),
        )
        .unwrap();
        assert_eq!(v.annual_production_kwh, dec!(130_000));
        assert_eq!(v.surplus_energy_kwh, dec!(39_000));
        // 39,000 kWh * 0.12 * 30
        assert_eq!(v.annual_value, dec!(140_400));
        assert_eq!(v.total_value, dec!(1_404_000));
    }

    #[test]
    fn test_not_grid_connected_is_zero() {
        let mut p = sample_params(10);
        p.grid_connected = false;
        assert_eq!(value(&p, dec!(30)).unwrap(), Decimal::ZERO);

        // Even with otherwise invalid parameters
        p.system_size_kw = dec!(-5);
        p.contract_duration_years = 99;
        assert_eq!(value(&p, Decimal::ZERO).unwrap(), Decimal::ZERO);
    }

    #[test]
    fn test_licensed_worth_more() {
        let mut p = sample_params(10);
        let unlicensed = value(&p, dec!(30)).unwrap();
        p.license_type = LicenseType::Licensed;
        assert!(value(&p, dec!(30)).unwrap() > unlicensed);
    }

    #[test]
    fn test_duration_bounds() {
        assert!(value(&sample_params(4), dec!(30)).is_err());
        assert!(value(&sample_params(16), dec!(30)).is_err());
        assert!(value(&sample_params(5), dec!(30)).is_ok());
        assert!(value(&sample_params(15), dec!(30)).is_ok());
    }

    #[test]
    fn test_non_positive_exchange_rate_rejected() {
        assert!(value(&sample_params(10), Decimal::ZERO).is_err());
    }

    #[test]
    fn test_calculate_tariff_rejects_invalid_tables() {
        let input = TariffCalculationInput {
            parameters: sample_params(10),
            exchange_rate: dec!(30),
        };
        let rates = TariffRateTable {
            licensed: dec!(0.133),
            unlicensed: dec!(-0.12),
        };
        assert!(calculate_tariff(&input, &rates, &TariffAssumptions::default()).is_err());

        let assumptions = TariffAssumptions {
            annual_yield_kwh_per_kw: dec!(1300),
            surplus_share: dec!(1.5),
        };
        match calculate_tariff(&input, &TariffRateTable::reference(), &assumptions) {
            Err(SolarFinanceError::InvalidInput { field, .. }) => {
                assert_eq!(field, "surplus_share")
            }
            other => panic!("Expected InvalidInput, got {other:?}"),
        }
    }

    #[test]
    fn test_overridden_assumptions() {
        let assumptions = TariffAssumptions {
            annual_yield_kwh_per_kw: dec!(1500),
            surplus_share: dec!(0.5),
        };
        let v = value_tariff(
            &sample_params(5),
            dec!(1),
            &TariffRateTable::reference(),
            &assumptions,
        )
        .unwrap();
        assert_eq!(v.surplus_energy_kwh, dec!(75_000));
    }
}
