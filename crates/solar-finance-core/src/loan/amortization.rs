use rust_decimal::{Decimal, MathematicalOps, RoundingStrategy};
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::error::SolarFinanceError;
use crate::types::{check_percent, with_metadata, ComputationOutput, Money, Percent};
use crate::SolarFinanceResult;

// ---------------------------------------------------------------------------
// Input types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LoanType {
    Consumer,
    Business,
    Agricultural,
    Leasing,
}

/// One bank's loan offer from the product catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanProduct {
    pub bank_name: String,
    pub loan_type: LoanType,
    /// Annual nominal rate in percent, compounded monthly
    pub interest_rate_pct: Percent,
    /// Longest term the bank offers
    pub max_term_months: u32,
    /// One-off processing / arrangement fee
    pub processing_fee: Money,
    /// Loan insurance as a percentage of the principal
    pub insurance_rate_pct: Percent,
}

impl LoanProduct {
    pub fn validate(&self) -> SolarFinanceResult<()> {
        if self.interest_rate_pct < Decimal::ZERO {
            return Err(SolarFinanceError::invalid(
                "interest_rate_pct",
                format!("{}: interest rate cannot be negative", self.bank_name),
            ));
        }
        if self.max_term_months < 1 {
            return Err(SolarFinanceError::invalid(
                "max_term_months",
                format!("{}: maximum term must be at least 1 month", self.bank_name),
            ));
        }
        if self.processing_fee < Decimal::ZERO {
            return Err(SolarFinanceError::invalid(
                "processing_fee",
                format!("{}: processing fee cannot be negative", self.bank_name),
            ));
        }
        check_percent("insurance_rate_pct", self.insurance_rate_pct)
    }
}

/// The slice of a product chosen for one computation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoanParameters {
    /// Financed amount
    pub loan_amount: Money,
    /// Paid up front; loan_amount + down_payment equals the project cost
    pub down_payment: Money,
    /// Annual rate in percent (may differ from the product's list rate)
    pub interest_rate_pct: Percent,
    pub term_months: u32,
    pub selected_product: LoanProduct,
}

impl LoanParameters {
    /// Finance `total_cost - down_payment` with `product` at its list rate.
    pub fn from_product(
        product: &LoanProduct,
        total_cost: Money,
        down_payment: Money,
        term_months: u32,
    ) -> SolarFinanceResult<Self> {
        if down_payment < Decimal::ZERO || down_payment >= total_cost {
            return Err(SolarFinanceError::invalid(
                "down_payment",
                format!("Down payment must be in [0, {total_cost})"),
            ));
        }
        let params = LoanParameters {
            loan_amount: total_cost - down_payment,
            down_payment,
            interest_rate_pct: product.interest_rate_pct,
            term_months,
            selected_product: product.clone(),
        };
        params.validate()?;
        Ok(params)
    }

    pub fn validate(&self) -> SolarFinanceResult<()> {
        self.selected_product.validate()?;
        if self.loan_amount <= Decimal::ZERO {
            return Err(SolarFinanceError::invalid(
                "loan_amount",
                "Loan amount must be positive",
            ));
        }
        if self.down_payment < Decimal::ZERO {
            return Err(SolarFinanceError::invalid(
                "down_payment",
                "Down payment cannot be negative",
            ));
        }
        if self.interest_rate_pct < Decimal::ZERO {
            return Err(SolarFinanceError::invalid(
                "interest_rate_pct",
                "Interest rate cannot be negative",
            ));
        }
        let max = self.selected_product.max_term_months;
        if self.term_months < 1 || self.term_months > max {
            return Err(SolarFinanceError::invalid(
                "term_months",
                format!("Term must be between 1 and {max} months, got {}", self.term_months),
            ));
        }
        Ok(())
    }

    fn monthly_rate(&self) -> Decimal {
        self.interest_rate_pct / dec!(100) / dec!(12)
    }
}

// ---------------------------------------------------------------------------
// Output types
// ---------------------------------------------------------------------------

/// Fixed-payment loan summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AmortizationResult {
    pub monthly_payment: Money,
    /// monthly_payment * term_months
    pub total_payment: Money,
    /// total_payment - loan_amount
    pub total_interest: Money,
    pub processing_fee: Money,
    /// loan_amount * insurance_rate_pct / 100
    pub insurance_cost: Money,
    /// Approximate annualised all-in cost (interest + fee + insurance) as a
    /// percentage of principal. Not a regulatory APR.
    pub effective_rate_pct: Percent,
}

/// One month of the repayment schedule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AmortizationRow {
    pub period: u32,
    pub opening_balance: Money,
    pub payment: Money,
    pub interest: Money,
    pub principal: Money,
    pub closing_balance: Money,
}

/// Entry-point input: parameters plus whether to expand the schedule.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoanCalculationInput {
    pub parameters: LoanParameters,
    #[serde(default)]
    pub include_schedule: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoanCalculationOutput {
    pub amortization: AmortizationResult,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schedule: Option<Vec<AmortizationRow>>,
}

// ---------------------------------------------------------------------------
// Core computation
// ---------------------------------------------------------------------------

/// Fixed-payment annuity summary for a loan.
///
/// `payment = P * r * (1+r)^n / ((1+r)^n - 1)` with `r` the monthly rate.
/// A zero-interest loan takes the explicit `P / n` branch instead.
pub fn compute_amortization(params: &LoanParameters) -> SolarFinanceResult<AmortizationResult> {
    params.validate()?;

    let principal = params.loan_amount;
    let n = Decimal::from(params.term_months);
    let monthly_payment = level_payment(principal, params.monthly_rate(), params.term_months)?;

    let total_payment = checked(monthly_payment.checked_mul(n), "total payment")?;
    // Zero-rate payments can leave a sub-precision negative remainder
    let total_interest = (total_payment - principal).max(Decimal::ZERO);

    let product = &params.selected_product;
    let processing_fee = product.processing_fee;
    let insurance_cost = checked(
        principal.checked_mul(product.insurance_rate_pct),
        "insurance cost",
    )? / dec!(100);

    let years = n / dec!(12);
    let all_in_cost = checked(
        total_interest
            .checked_add(processing_fee)
            .and_then(|c| c.checked_add(insurance_cost)),
        "effective rate",
    )?;
    let effective_rate_pct = checked(
        all_in_cost
            .checked_div(principal)
            .and_then(|c| c.checked_div(years))
            .and_then(|c| c.checked_mul(dec!(100))),
        "effective rate",
    )?;

    Ok(AmortizationResult {
        monthly_payment,
        total_payment,
        total_interest,
        processing_fee,
        insurance_cost,
        effective_rate_pct,
    })
}

/// Month-by-month repayment schedule in cents. The last period absorbs the
/// rounding residue so the loan closes at exactly zero.
pub fn amortization_schedule(params: &LoanParameters) -> SolarFinanceResult<Vec<AmortizationRow>> {
    params.validate()?;

    let rate = params.monthly_rate();
    let payment = round_cents(level_payment(params.loan_amount, rate, params.term_months)?);
    let mut rows = Vec::with_capacity(params.term_months as usize);
    let mut balance = params.loan_amount;

    for period in 1..=params.term_months {
        let interest = round_cents(checked(balance.checked_mul(rate), "schedule interest")?);
        let (payment, principal) = if period == params.term_months {
            (checked(balance.checked_add(interest), "final payment")?, balance)
        } else {
            (payment, (payment - interest).min(balance))
        };
        let closing = balance - principal;
        rows.push(AmortizationRow {
            period,
            opening_balance: balance,
            payment,
            interest,
            principal,
            closing_balance: closing,
        });
        balance = closing;
    }

    Ok(rows)
}

/// Compute a loan summary (and optionally its schedule) wrapped in the
/// standard output envelope.
pub fn calculate_loan(
    input: &LoanCalculationInput,
) -> SolarFinanceResult<ComputationOutput<LoanCalculationOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    let amortization = compute_amortization(&input.parameters)?;
    let schedule = if input.include_schedule {
        Some(amortization_schedule(&input.parameters)?)
    } else {
        None
    };

    if input.parameters.interest_rate_pct.is_zero() {
        warnings.push("Zero-interest loan: payment is principal / term".into());
    }
    if input.parameters.interest_rate_pct != input.parameters.selected_product.interest_rate_pct {
        warnings.push(format!(
            "Rate {}% differs from {} list rate {}%",
            input.parameters.interest_rate_pct,
            input.parameters.selected_product.bank_name,
            input.parameters.selected_product.interest_rate_pct,
        ));
    }

    let assumptions = serde_json::json!({
        "compounding": "monthly",
        "monthly_rate": input.parameters.monthly_rate().to_string(),
        "term_months": input.parameters.term_months,
    });
    let elapsed = start.elapsed().as_micros() as u64;

    Ok(with_metadata(
        "Fixed-payment annuity amortization",
        &assumptions,
        warnings,
        elapsed,
        LoanCalculationOutput {
            amortization,
            schedule,
        },
    ))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn round_cents(value: Money) -> Money {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

fn checked(value: Option<Decimal>, context: &str) -> SolarFinanceResult<Decimal> {
    value.ok_or_else(|| SolarFinanceError::ArithmeticOverflow {
        context: context.into(),
    })
}

fn level_payment(
    principal: Money,
    monthly_rate: Decimal,
    term_months: u32,
) -> SolarFinanceResult<Money> {
    let n = Decimal::from(term_months);
    if monthly_rate.is_zero() {
        return Ok(principal / n);
    }

    // (1+r)^n / ((1+r)^n - 1); past the decimal range it equals 1 to full precision
    let annuity_factor = match (Decimal::ONE + monthly_rate).checked_powi(i64::from(term_months)) {
        Some(growth) => {
            let denominator = growth - Decimal::ONE;
            if denominator.is_zero() {
                return Err(SolarFinanceError::DivisionByZero {
                    context: "annuity factor".into(),
                });
            }
            checked(growth.checked_div(denominator), "annuity factor")?
        }
        None => Decimal::ONE,
    };
    checked(
        principal
            .checked_mul(monthly_rate)
            .and_then(|interest| interest.checked_mul(annuity_factor)),
        "monthly payment",
    )
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
