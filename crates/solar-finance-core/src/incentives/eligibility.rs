//! Government incentive eligibility and valuation.
//!
//! Each rule passes through three gates in fixed priority (target group,
//! region, application window) and stops at the first failure. Rules that
//! pass every gate are valued by program type:
//!
//! - **TAX_EXEMPTION**: `total_cost * percentage / 100`
//! - **SUBSIDY / AGRICULTURAL**: `min(total_cost * percentage / 100, amount)`,
//!   or the flat `amount` when no percentage is given
//! - **REGIONAL_SUPPORT**: as SUBSIDY, times the regional multiplier
//! - **TARIFF**: flat `amount`. The feed-in contract itself is valued by
//!   [`crate::tariff`].
//!
//! Values are rounded to whole currency units and never negative.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Instant;

use crate::config::RegionalMultiplierTable;
use crate::error::SolarFinanceError;
use crate::types::{
    check_percent, round_currency, with_metadata, ComputationOutput, CustomerType, Money, Percent,
    ProjectProfile,
};
use crate::SolarFinanceResult;

/// Rules closing within this many days get a warning.
const EXPIRY_WARNING_DAYS: i64 = 30;

// ---------------------------------------------------------------------------
// Input types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IncentiveType {
    TaxExemption,
    Subsidy,
    Tariff,
    RegionalSupport,
    Agricultural,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TargetGroup {
    All,
    Individual,
    Sme,
    Corporate,
    Farmer,
}

impl TargetGroup {
    pub fn admits(self, customer: CustomerType) -> bool {
        match self {
            TargetGroup::All => true,
            TargetGroup::Individual => customer == CustomerType::Individual,
            TargetGroup::Sme => customer == CustomerType::Sme,
            TargetGroup::Corporate => customer == CustomerType::Corporate,
            TargetGroup::Farmer => customer == CustomerType::Farmer,
        }
    }
}

/// One government or authority program. Static reference data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IncentiveRule {
    pub id: String,
    pub name: String,
    pub authority: String,
    #[serde(rename = "type")]
    pub incentive_type: IncentiveType,
    /// Absolute value, or the cap when a percentage is also given
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<Money>,
    /// Share of total cost, 0–100
    #[serde(skip_serializing_if = "Option::is_none")]
    pub percentage: Option<Percent>,
    /// Human-readable terms; displayed, never evaluated
    #[serde(default)]
    pub conditions: Vec<String>,
    /// Last day applications are accepted (inclusive)
    pub valid_until: NaiveDate,
    pub target_group: TargetGroup,
    /// Absent or empty means every region qualifies
    #[serde(skip_serializing_if = "Option::is_none")]
    pub eligible_regions: Option<Vec<String>>,
}

// ---------------------------------------------------------------------------
// Output types
// ---------------------------------------------------------------------------

/// First gate a rule failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IneligibilityReason {
    CustomerTypeNotEligible,
    RegionNotCovered,
    ApplicationWindowClosed,
}

impl fmt::Display for IneligibilityReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            IneligibilityReason::CustomerTypeNotEligible => "customer type not eligible",
            IneligibilityReason::RegionNotCovered => "region not covered",
            IneligibilityReason::ApplicationWindowClosed => "application window closed",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IncentiveCalculationResult {
    pub rule: IncentiveRule,
    pub is_eligible: bool,
    /// Whole currency units; zero when ineligible
    pub calculated_value: Money,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<IneligibilityReason>,
}

/// Entry-point input.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IncentiveEvaluationInput {
    pub profile: ProjectProfile,
    pub rules: Vec<IncentiveRule>,
    /// Evaluation date for the validity gate; today when omitted
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub as_of: Option<NaiveDate>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IncentiveEvaluationOutput {
    pub as_of: NaiveDate,
    pub results: Vec<IncentiveCalculationResult>,
    /// Sum over eligible rules of every type, TARIFF included
    pub total_eligible_value: Money,
    /// Portion of the total coming from eligible TARIFF rules
    pub tariff_rule_value: Money,
    pub eligible_count: usize,
    pub ineligible_count: usize,
}

// ---------------------------------------------------------------------------
// Core computation
// ---------------------------------------------------------------------------

/// Check a catalog rule for malformed values.
pub fn validate_rule(rule: &IncentiveRule) -> SolarFinanceResult<()> {
    if let Some(pct) = rule.percentage {
        check_percent("percentage", pct).map_err(|_| {
            SolarFinanceError::invalid(
                "percentage",
                format!("Rule '{}': percentage must be between 0 and 100, got {pct}", rule.id),
            )
        })?;
    }
    if let Some(amount) = rule.amount {
        if amount < Decimal::ZERO {
            return Err(SolarFinanceError::invalid(
                "amount",
                format!("Rule '{}': amount cannot be negative", rule.id),
            ));
        }
    }
    if rule.incentive_type == IncentiveType::TaxExemption && rule.percentage.is_none() {
        return Err(SolarFinanceError::invalid(
            "percentage",
            format!("Rule '{}': tax exemptions require a percentage", rule.id),
        ));
    }
    Ok(())
}

/// Evaluate every rule against the profile. One result per rule, in input
/// order.
pub fn evaluate_rules(
    rules: &[IncentiveRule],
    profile: &ProjectProfile,
    as_of: NaiveDate,
    multipliers: &RegionalMultiplierTable,
) -> SolarFinanceResult<Vec<IncentiveCalculationResult>> {
    profile.validate()?;
    for rule in rules {
        validate_rule(rule)?;
    }

    Ok(rules
        .iter()
        .map(|rule| match ineligibility(rule, profile, as_of) {
            Some(reason) => IncentiveCalculationResult {
                rule: rule.clone(),
                is_eligible: false,
                calculated_value: Decimal::ZERO,
                reason: Some(reason),
            },
            None => IncentiveCalculationResult {
                rule: rule.clone(),
                is_eligible: true,
                calculated_value: rule_value(rule, profile, multipliers),
                reason: None,
            },
        })
        .collect())
}

/// Sum of values over eligible results.
pub fn total_eligible_value(results: &[IncentiveCalculationResult]) -> Money {
    results
        .iter()
        .filter(|r| r.is_eligible)
        .map(|r| r.calculated_value)
        .sum()
}

/// Sum of values over eligible TARIFF results.
pub fn tariff_rule_value(results: &[IncentiveCalculationResult]) -> Money {
    results
        .iter()
        .filter(|r| r.is_eligible && r.rule.incentive_type == IncentiveType::Tariff)
        .map(|r| r.calculated_value)
        .sum()
}

/// Evaluate a rule catalog for one profile, wrapped in the standard output
/// envelope.
pub fn evaluate_incentives(
    input: &IncentiveEvaluationInput,
    multipliers: &RegionalMultiplierTable,
) -> SolarFinanceResult<ComputationOutput<IncentiveEvaluationOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    multipliers.validate()?;
    let as_of = input
        .as_of
        .unwrap_or_else(|| chrono::Local::now().date_naive());
    let results = evaluate_rules(&input.rules, &input.profile, as_of, multipliers)?;

    for r in results.iter().filter(|r| r.is_eligible) {
        let days_left = (r.rule.valid_until - as_of).num_days();
        if days_left <= EXPIRY_WARNING_DAYS {
            warnings.push(format!(
                "'{}' closes in {days_left} day(s) on {}",
                r.rule.name, r.rule.valid_until
            ));
        }
        if r.rule.incentive_type == IncentiveType::Tariff {
            warnings.push(format!(
                "'{}' is a TARIFF rule valued at its flat amount; the feed-in contract is valued separately",
                r.rule.name
            ));
        }
    }

    let total = total_eligible_value(&results);
    if total > input.profile.total_cost {
        warnings.push(format!(
            "Eligible incentives ({total}) exceed total cost ({})",
            input.profile.total_cost
        ));
    }

    let eligible_count = results.iter().filter(|r| r.is_eligible).count();
    let output = IncentiveEvaluationOutput {
        as_of,
        tariff_rule_value: tariff_rule_value(&results),
        total_eligible_value: total,
        eligible_count,
        ineligible_count: results.len() - eligible_count,
        results,
    };

    let assumptions = serde_json::json!({
        "gate_order": ["target_group", "region", "validity"],
        "rounding": "whole currency units, half away from zero",
        "location": input.profile.location,
        "location_multiplier": multipliers.multiplier_for(&input.profile.location).to_string(),
    });
    let elapsed = start.elapsed().as_micros() as u64;

    Ok(with_metadata(
        "Gated incentive eligibility with type-specific valuation",
        &assumptions,
        warnings,
        elapsed,
        output,
    ))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn ineligibility(
    rule: &IncentiveRule,
    profile: &ProjectProfile,
    as_of: NaiveDate,
) -> Option<IneligibilityReason> {
    if !rule.target_group.admits(profile.customer_type) {
        return Some(IneligibilityReason::CustomerTypeNotEligible);
    }
    if let Some(regions) = rule.eligible_regions.as_ref().filter(|r| !r.is_empty()) {
        if !regions.iter().any(|r| *r == profile.location) {
            return Some(IneligibilityReason::RegionNotCovered);
        }
    }
    if as_of > rule.valid_until {
        return Some(IneligibilityReason::ApplicationWindowClosed);
    }
    None
}

fn rule_value(
    rule: &IncentiveRule,
    profile: &ProjectProfile,
    multipliers: &RegionalMultiplierTable,
) -> Money {
    let raw = match rule.incentive_type {
        IncentiveType::TaxExemption => {
            profile.total_cost * rule.percentage.unwrap_or(Decimal::ZERO) / dec!(100)
        }
        IncentiveType::Subsidy | IncentiveType::Agricultural => {
            capped_value(rule, profile.total_cost)
        }
        IncentiveType::RegionalSupport => {
            capped_value(rule, profile.total_cost) * multipliers.multiplier_for(&profile.location)
        }
        IncentiveType::Tariff => rule.amount.unwrap_or(Decimal::ZERO),
    };
    round_currency(raw).max(Decimal::ZERO)
}

/// Percentage of cost capped by `amount`, or the flat amount.
fn capped_value(rule: &IncentiveRule, total_cost: Money) -> Money {
    match (rule.percentage, rule.amount) {
        (Some(pct), Some(cap)) => (total_cost * pct / dec!(100)).min(cap),
        (Some(pct), None) => total_cost * pct / dec!(100),
        (None, amount) => amount.unwrap_or(Decimal::ZERO),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
