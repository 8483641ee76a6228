//! Injectable reference data for the engine.
//!
//! The regional multiplier table, the feed-in tariff rates and the
//! production assumptions change with regulation, not with code. They are
//! plain serde types so a caller can load them once per process from its own
//! store or from a YAML/JSON file.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::SolarFinanceError;
use crate::types::{Kwh, Money};
use crate::SolarFinanceResult;

/// Assumed annual yield per installed kW. A national-average estimate, not
/// derived from metering data.
pub const DEFAULT_ANNUAL_YIELD_KWH_PER_KW: Decimal = dec!(1300);

/// Assumed share of production exported to the grid as surplus. An
/// approximation; real self-consumption varies by load profile.
pub const DEFAULT_SURPLUS_SHARE: Decimal = dec!(0.30);

/// Feed-in tariff license class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LicenseType {
    Licensed,
    Unlicensed,
}

/// Region key -> multiplier applied to REGIONAL_SUPPORT incentives.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RegionalMultiplierTable(pub BTreeMap<String, Decimal>);

impl RegionalMultiplierTable {
    /// Multiplier for `region`, or 1.0 when the region is not listed.
    pub fn multiplier_for(&self, region: &str) -> Decimal {
        self.0.get(region).copied().unwrap_or(Decimal::ONE)
    }

    pub fn reference() -> Self {
        let entries = [
            ("dogu_anadolu", dec!(1.30)),
            ("guneydogu_anadolu", dec!(1.25)),
            ("karadeniz", dec!(1.15)),
            ("ic_anadolu", dec!(1.10)),
        ];
        Self(
            entries
                .into_iter()
                .map(|(k, v)| (k.to_string(), v))
                .collect(),
        )
    }

    pub fn validate(&self) -> SolarFinanceResult<()> {
        for (region, m) in &self.0 {
            if *m < Decimal::ZERO {
                return Err(SolarFinanceError::invalid(
                    "regional_multipliers",
                    format!("Multiplier for '{region}' cannot be negative"),
                ));
            }
        }
        Ok(())
    }
}

/// Per-kWh feed-in rates in the reference foreign currency, keyed by
/// license class.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TariffRateTable {
    pub licensed: Money,
    pub unlicensed: Money,
}

impl TariffRateTable {
    pub fn rate_for(&self, license: LicenseType) -> Money {
        match license {
            LicenseType::Licensed => self.licensed,
            LicenseType::Unlicensed => self.unlicensed,
        }
    }

    /// Reference USD/kWh rates; licensed capacity earns the higher rate.
    pub fn reference() -> Self {
        Self {
            licensed: dec!(0.133),
            unlicensed: dec!(0.12),
        }
    }

    pub fn validate(&self) -> SolarFinanceResult<()> {
        if self.licensed < Decimal::ZERO || self.unlicensed < Decimal::ZERO {
            return Err(SolarFinanceError::invalid(
                "tariff_rates",
                "Tariff rates cannot be negative",
            ));
        }
        Ok(())
    }
}

/// Production assumptions behind the tariff valuation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TariffAssumptions {
    pub annual_yield_kwh_per_kw: Kwh,
    /// Fraction (0–1) of production exported as surplus
    pub surplus_share: Decimal,
}

impl TariffAssumptions {
    pub fn validate(&self) -> SolarFinanceResult<()> {
        if self.annual_yield_kwh_per_kw <= Decimal::ZERO {
            return Err(SolarFinanceError::invalid(
                "annual_yield_kwh_per_kw",
                "Annual yield must be positive",
            ));
        }
        if self.surplus_share < Decimal::ZERO || self.surplus_share > Decimal::ONE {
            return Err(SolarFinanceError::invalid(
                "surplus_share",
                "Surplus share must be between 0 and 1",
            ));
        }
        Ok(())
    }
}

impl Default for TariffAssumptions {
    fn default() -> Self {
        Self {
            annual_yield_kwh_per_kw: DEFAULT_ANNUAL_YIELD_KWH_PER_KW,
            surplus_share: DEFAULT_SURPLUS_SHARE,
        }
    }
}

/// How a generic TARIFF incentive rule and the dedicated feed-in contract
/// valuation combine into the total incentive value. Both values are always
/// reported; the policy only decides which of them count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TariffRulePolicy {
    /// Count both. May double-count the same feed-in program.
    SumBoth,
    /// Count the contract valuation; TARIFF rules are informational.
    ContractOnly,
    /// Count TARIFF rules; the contract valuation is informational.
    RuleOnly,
}

/// Everything the engine needs besides the per-evaluation inputs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    #[serde(default)]
    pub regional_multipliers: RegionalMultiplierTable,
    pub tariff_rates: TariffRateTable,
    #[serde(default)]
    pub tariff_assumptions: TariffAssumptions,
    pub tariff_rule_policy: TariffRulePolicy,
}

impl EngineConfig {
    /// Reference tables with an explicitly chosen tariff summation policy.
    pub fn reference(tariff_rule_policy: TariffRulePolicy) -> Self {
        Self {
            regional_multipliers: RegionalMultiplierTable::reference(),
            tariff_rates: TariffRateTable::reference(),
            tariff_assumptions: TariffAssumptions::default(),
            tariff_rule_policy,
        }
    }

    pub fn validate(&self) -> SolarFinanceResult<()> {
        self.regional_multipliers.validate()?;
        self.tariff_rates.validate()?;
        self.tariff_assumptions.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_multiplier_defaults_to_one() {
        let table = RegionalMultiplierTable::reference();
        assert_eq!(table.multiplier_for("dogu_anadolu"), dec!(1.30));
        assert_eq!(table.multiplier_for("marmara"), Decimal::ONE);
        assert_eq!(RegionalMultiplierTable::default().multiplier_for("x"), Decimal::ONE);
    }

    #[test]
    fn test_licensed_rate_is_higher() {
        let rates = TariffRateTable::reference();
        assert!(rates.rate_for(LicenseType::Licensed) > rates.rate_for(LicenseType::Unlicensed));
    }

    #[test]
    fn test_reference_config_is_valid() {
        assert!(EngineConfig::reference(TariffRulePolicy::ContractOnly)
            .validate()
            .is_ok());
    }

    #[test]
    fn test_invalid_surplus_share() {
        let mut cfg = EngineConfig::reference(TariffRulePolicy::SumBoth);
        cfg.tariff_assumptions.surplus_share = dec!(1.5);
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_tables_validate_on_their_own() {
        let mut multipliers = RegionalMultiplierTable::reference();
        multipliers.0.insert("karadeniz".into(), dec!(-0.5));
        match multipliers.validate() {
            Err(SolarFinanceError::InvalidInput { field, .. }) => {
                assert_eq!(field, "regional_multipliers")
            }
            other => panic!("Expected InvalidInput, got {other:?}"),
        }

        let rates = TariffRateTable {
            licensed: dec!(0.133),
            unlicensed: dec!(-0.01),
        };
        assert!(rates.validate().is_err());

        let assumptions = TariffAssumptions {
            annual_yield_kwh_per_kw: dec!(1300),
            surplus_share: dec!(1.2),
        };
        assert!(assumptions.validate().is_err());
        assert!(TariffAssumptions::default().validate().is_ok());
    }

    #[test]
    fn test_config_requires_policy() {
        let json = r#"{"tariff_rates": {"licensed": "0.133", "unlicensed": "0.12"}}"#;
        assert!(serde_json::from_str::<EngineConfig>(json).is_err());

        let json = r#"{
            "tariff_rates": {"licensed": "0.133", "unlicensed": "0.12"},
            "tariff_rule_policy": "contract_only"
        }"#;
        let cfg: EngineConfig = serde_json::from_str(json).unwrap();
        assert_eq!(cfg.tariff_rule_policy, TariffRulePolicy::ContractOnly);
        assert_eq!(cfg.tariff_assumptions, TariffAssumptions::default());
        assert!(cfg.regional_multipliers.0.is_empty());
    }
}
