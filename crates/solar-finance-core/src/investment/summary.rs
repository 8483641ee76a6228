use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::config::TariffRulePolicy;
use crate::error::SolarFinanceError;
use crate::incentives::eligibility::{
    tariff_rule_value, total_eligible_value, IncentiveCalculationResult,
};
use crate::loan::amortization::AmortizationResult;
use crate::types::{Money, Percent, ProjectProfile, Years};
use crate::SolarFinanceResult;

/// Horizon of the simplified long-run return ratio.
pub const LONG_HORIZON_YEARS: u32 = 25;

/// Single investment decision summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvestmentSummary {
    pub monthly_payment: Money,
    pub total_payment: Money,
    pub total_interest: Money,
    pub effective_rate_pct: Percent,

    /// Eligible generic incentive rules, TARIFF rules included
    pub eligible_incentive_value: Money,
    /// Eligible TARIFF rules alone
    pub tariff_rule_value: Money,
    /// Dedicated feed-in contract valuation
    pub tariff_contract_value: Money,
    pub tariff_rule_policy: TariffRulePolicy,
    /// What counts toward net cost under `tariff_rule_policy`
    pub total_incentive_value: Money,

    /// total_cost - total_incentive_value, floored at zero
    pub net_cost: Money,
    /// Incentives alone cover the whole cost; net_cost was clamped
    pub incentives_exceed_cost: bool,
    /// Monthly savings minus the loan payment
    pub net_monthly_cash_flow: Money,
    /// None when monthly savings are zero or negative
    pub payback_years: Option<Years>,
    /// Undiscounted 25-year savings less net cost, over net cost. Not an
    /// IRR. None when net cost is zero.
    pub long_horizon_return_pct: Option<Percent>,
}

/// Combine leaf results into the investment summary.
///
/// All-or-nothing: either every field is computed or an error is returned.
/// An undefined payback is an expected outcome and comes back as `None`.
pub fn summarize(
    profile: &ProjectProfile,
    loan: &AmortizationResult,
    incentives: &[IncentiveCalculationResult],
    tariff_value: Money,
    policy: TariffRulePolicy,
) -> SolarFinanceResult<InvestmentSummary> {
    profile.validate()?;
    if tariff_value < Decimal::ZERO {
        return Err(SolarFinanceError::invalid(
            "tariff_value",
            "Tariff value cannot be negative",
        ));
    }

    let eligible = total_eligible_value(incentives);
    let rule_tariff = tariff_rule_value(incentives);
    let total_incentive_value = match policy {
        TariffRulePolicy::SumBoth => eligible + tariff_value,
        TariffRulePolicy::ContractOnly => eligible - rule_tariff + tariff_value,
        TariffRulePolicy::RuleOnly => eligible,
    };

    let raw_net = profile.total_cost - total_incentive_value;
    let incentives_exceed_cost = raw_net < Decimal::ZERO;
    let net_cost = raw_net.max(Decimal::ZERO);

    let savings = profile.monthly_energy_savings;
    let payback = match payback_years(net_cost, savings) {
        Ok(years) => Some(years),
        Err(SolarFinanceError::UndefinedPayback { .. }) => None,
        Err(e) => return Err(e),
    };

    Ok(InvestmentSummary {
        monthly_payment: loan.monthly_payment,
        total_payment: loan.total_payment,
        total_interest: loan.total_interest,
        effective_rate_pct: loan.effective_rate_pct,
        eligible_incentive_value: eligible,
        tariff_rule_value: rule_tariff,
        tariff_contract_value: tariff_value,
        tariff_rule_policy: policy,
        total_incentive_value,
        net_cost,
        incentives_exceed_cost,
        net_monthly_cash_flow: savings - loan.monthly_payment,
        payback_years: payback,
        long_horizon_return_pct: long_horizon_return_pct(net_cost, savings),
    })
}

/// Years of savings needed to recover `net_cost`.
pub fn payback_years(net_cost: Money, monthly_savings: Money) -> SolarFinanceResult<Years> {
    if monthly_savings <= Decimal::ZERO {
        return Err(SolarFinanceError::UndefinedPayback { monthly_savings });
    }
    Ok(net_cost / (monthly_savings * dec!(12)))
}

/// `(savings over LONG_HORIZON_YEARS - net_cost) / net_cost * 100`.
pub fn long_horizon_return_pct(net_cost: Money, monthly_savings: Money) -> Option<Percent> {
    if net_cost.is_zero() {
        return None;
    }
    let horizon_savings = monthly_savings * dec!(12) * Decimal::from(LONG_HORIZON_YEARS);
    Some((horizon_savings - net_cost) / net_cost * dec!(100))
}

/// Caller-facing notes for the non-fatal conditions a summary can carry.
pub fn summary_warnings(summary: &InvestmentSummary) -> Vec<String> {
    let mut warnings = Vec::new();
    if summary.incentives_exceed_cost {
        warnings.push(format!(
            "Incentives ({}) exceed total cost; net cost clamped to zero",
            summary.total_incentive_value
        ));
    }
    if summary.payback_years.is_none() {
        warnings.push("Payback not applicable: monthly savings are zero or negative".into());
    }
    if summary.net_monthly_cash_flow < Decimal::ZERO {
        warnings.push(format!(
            "Loan payment exceeds monthly savings by {}",
            -summary.net_monthly_cash_flow
        ));
    }
    let both_present =
        summary.tariff_rule_value > Decimal::ZERO && summary.tariff_contract_value > Decimal::ZERO;
    match summary.tariff_rule_policy {
        TariffRulePolicy::SumBoth if both_present => warnings.push(
            "TARIFF rules and the feed-in contract are both counted; they may describe the same program"
                .into(),
        ),
        TariffRulePolicy::ContractOnly if summary.tariff_rule_value > Decimal::ZERO => {
            warnings.push(format!(
                "TARIFF rule value ({}) reported but not counted",
                summary.tariff_rule_value
            ))
        }
        TariffRulePolicy::RuleOnly if summary.tariff_contract_value > Decimal::ZERO => {
            warnings.push(format!(
                "Feed-in contract value ({}) reported but not counted",
                summary.tariff_contract_value
            ))
        }
        _ => {}
    }
    warnings
}
