use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::error::SolarFinanceError;
use crate::SolarFinanceResult;

/// All monetary values. Wraps Decimal to prevent accidental f64 usage.
pub type Money = Decimal;

/// Percentages on the 0–100 scale (2.49 = 2.49%), as bank offers and
/// incentive programs quote them.
pub type Percent = Decimal;

/// Energy in kilowatt-hours
pub type Kwh = Decimal;

/// Installed capacity in kilowatts (peak)
pub type Kw = Decimal;

/// Year fractions or counts
pub type Years = Decimal;

/// Customer segment an incentive program or loan product targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CustomerType {
    Individual,
    Sme,
    Corporate,
    Farmer,
}

/// The investment being evaluated. Built by the caller for one evaluation
/// and never mutated by the engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectProfile {
    /// Installed capacity
    pub system_size_kw: Kw,
    /// Turnkey system cost in contract currency
    pub total_cost: Money,
    /// Estimated annual production
    pub annual_production_kwh: Kwh,
    /// Expected reduction in the monthly energy bill. Negative only when the
    /// upstream production model is wrong.
    pub monthly_energy_savings: Money,
    /// Region or city key, matched against incentive regions and the
    /// regional multiplier table
    pub location: String,
    pub customer_type: CustomerType,
}

impl ProjectProfile {
    pub fn validate(&self) -> SolarFinanceResult<()> {
        if self.system_size_kw <= Decimal::ZERO {
            return Err(SolarFinanceError::invalid(
                "system_size_kw",
                "System size must be positive",
            ));
        }
        if self.total_cost <= Decimal::ZERO {
            return Err(SolarFinanceError::invalid(
                "total_cost",
                "Total cost must be positive",
            ));
        }
        if self.annual_production_kwh < Decimal::ZERO {
            return Err(SolarFinanceError::invalid(
                "annual_production_kwh",
                "Annual production cannot be negative",
            ));
        }
        Ok(())
    }
}

/// Round to the smallest currency unit, half away from zero.
pub fn round_currency(value: Money) -> Money {
    value.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
}

/// Reject percentages outside 0–100.
pub(crate) fn check_percent(field: &str, value: Percent) -> SolarFinanceResult<()> {
    if value < Decimal::ZERO || value > Decimal::ONE_HUNDRED {
        return Err(SolarFinanceError::invalid(
            field,
            format!("Percentage must be between 0 and 100, got {value}"),
        ));
    }
    Ok(())
}

/// Standard computation output envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationOutput<T: Serialize> {
    pub result: T,
    pub methodology: String,
    pub assumptions: serde_json::Value,
    pub warnings: Vec<String>,
    pub metadata: ComputationMetadata,
}

/// Metadata for every computation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationMetadata {
    pub version: String,
    pub computation_time_us: u64,
    pub precision: String,
}

/// Helper to wrap computation results with metadata
pub fn with_metadata<T: Serialize>(
    methodology: &str,
    assumptions: &impl Serialize,
    warnings: Vec<String>,
    elapsed_us: u64,
    result: T,
) -> ComputationOutput<T> {
    ComputationOutput {
        result,
        methodology: methodology.to_string(),
        assumptions: serde_json::to_value(assumptions).unwrap_or_default(),
        warnings,
        metadata: ComputationMetadata {
            version: env!("CARGO_PKG_VERSION").to_string(),
            computation_time_us: elapsed_us,
            precision: "rust_decimal_128bit".to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn sample_profile() -> ProjectProfile {
        ProjectProfile {
            system_size_kw: dec!(10),
            total_cost: dec!(250_000),
            annual_production_kwh: dec!(13_000),
            monthly_energy_savings: dec!(3_000),
            location: "ic_anadolu".into(),
            customer_type: CustomerType::Individual,
        }
    }

    #[test]
    fn test_round_currency_half_away_from_zero() {
        assert_eq!(round_currency(dec!(2.5)), dec!(3));
        assert_eq!(round_currency(dec!(3.5)), dec!(4));
        assert_eq!(round_currency(dec!(1234.49)), dec!(1234));
    }

    #[test]
    fn test_profile_validation() {
        assert!(sample_profile().validate().is_ok());

        let mut p = sample_profile();
        p.total_cost = Decimal::ZERO;
        match p.validate() {
            Err(SolarFinanceError::InvalidInput { field, .. }) => assert_eq!(field, "total_cost"),
            other => panic!("Expected InvalidInput, got {other:?}"),
        }

        let mut p = sample_profile();
        p.system_size_kw = dec!(-1);
        assert!(p.validate().is_err());

        // Negative savings are a modelling error upstream, not an input error
        let mut p = sample_profile();
        p.monthly_energy_savings = dec!(-100);
        assert!(p.validate().is_ok());
    }

    #[test]
    fn test_customer_type_wire_format() {
        let json = serde_json::to_string(&CustomerType::Sme).unwrap();
        assert_eq!(json, "\"SME\"");
        let back: CustomerType = serde_json::from_str("\"FARMER\"").unwrap();
        assert_eq!(back, CustomerType::Farmer);
    }

    #[test]
    fn test_check_percent_bounds() {
        assert!(check_percent("p", dec!(0)).is_ok());
        assert!(check_percent("p", dec!(100)).is_ok());
        assert!(check_percent("p", dec!(100.01)).is_err());
        assert!(check_percent("p", dec!(-0.5)).is_err());
    }
}
