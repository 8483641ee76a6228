use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use super::amortization::{
    compute_amortization, AmortizationResult, LoanParameters, LoanProduct, LoanType,
};
use crate::error::SolarFinanceError;
use crate::types::{with_metadata, ComputationOutput, Money};
use crate::SolarFinanceResult;

/// Price one loan request against every product in a catalog.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoanComparisonInput {
    pub products: Vec<LoanProduct>,
    pub loan_amount: Money,
    #[serde(default)]
    pub down_payment: Money,
    pub term_months: u32,
}

/// One product's answer to the request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoanOffer {
    pub bank_name: String,
    pub loan_type: LoanType,
    pub offered: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amortization: Option<AmortizationResult>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoanComparisonOutput {
    /// Offered products by ascending effective rate, then products that
    /// cannot serve the requested term in catalog order
    pub offers: Vec<LoanOffer>,
    pub best_offer: Option<String>,
    pub offered_count: usize,
}

/// Rank a loan product catalog by all-in cost for one request.
pub fn compare_loan_products(
    input: &LoanComparisonInput,
) -> SolarFinanceResult<ComputationOutput<LoanComparisonOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    if input.products.is_empty() {
        return Err(SolarFinanceError::invalid(
            "products",
            "Loan product catalog is empty",
        ));
    }
    if input.loan_amount <= Decimal::ZERO {
        return Err(SolarFinanceError::invalid(
            "loan_amount",
            "Loan amount must be positive",
        ));
    }
    if input.term_months < 1 {
        return Err(SolarFinanceError::invalid(
            "term_months",
            "Term must be at least 1 month",
        ));
    }

    let mut offered: Vec<LoanOffer> = Vec::new();
    let mut declined: Vec<LoanOffer> = Vec::new();

    for product in &input.products {
        product.validate()?;

        if input.term_months > product.max_term_months {
            declined.push(LoanOffer {
                bank_name: product.bank_name.clone(),
                loan_type: product.loan_type,
                offered: false,
                reason: Some(format!(
                    "maximum term is {} months",
                    product.max_term_months
                )),
                amortization: None,
            });
            continue;
        }

        let params = LoanParameters {
            loan_amount: input.loan_amount,
            down_payment: input.down_payment,
            interest_rate_pct: product.interest_rate_pct,
            term_months: input.term_months,
            selected_product: product.clone(),
        };
        let amortization = compute_amortization(&params)?;
        offered.push(LoanOffer {
            bank_name: product.bank_name.clone(),
            loan_type: product.loan_type,
            offered: true,
            reason: None,
            amortization: Some(amortization),
        });
    }

    offered.sort_by(|a, b| {
        let key = |o: &LoanOffer| {
            o.amortization
                .as_ref()
                .map(|am| (am.effective_rate_pct, am.monthly_payment))
                .unwrap_or((Decimal::MAX, Decimal::MAX))
        };
        key(a)
            .cmp(&key(b))
            .then_with(|| a.bank_name.cmp(&b.bank_name))
    });

    if offered.is_empty() {
        warnings.push(format!(
            "No product offers a {}-month term",
            input.term_months
        ));
    }

    let best_offer = offered.first().map(|o| o.bank_name.clone());
    let offered_count = offered.len();
    offered.extend(declined);

    let assumptions = serde_json::json!({
        "ranking": "effective_rate_pct, then monthly_payment, then bank_name",
        "loan_amount": input.loan_amount.to_string(),
        "term_months": input.term_months,
    });
    let elapsed = start.elapsed().as_micros() as u64;

    Ok(with_metadata(
        "Loan product comparison by approximate all-in annual cost",
        &assumptions,
        warnings,
        elapsed,
        LoanComparisonOutput {
            offers: offered,
            best_offer,
            offered_count,
        },
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn product(bank: &str, rate: Decimal, max_term: u32, fee: Decimal) -> LoanProduct {
        LoanProduct {
            bank_name: bank.into(),
            loan_type: LoanType::Consumer,
            interest_rate_pct: rate,
            max_term_months: max_term,
            processing_fee: fee,
            insurance_rate_pct: Decimal::ZERO,
        }
    }

    fn sample_input() -> LoanComparisonInput {
        LoanComparisonInput {
            products: vec![
                product("Garanti", dec!(24), 60, dec!(0)),
                product("Vakif", dec!(18), 36, dec!(2_000)),
                product("Halk", dec!(18), 120, dec!(0)),
                product("Is", dec!(15), 24, dec!(0)),
            ],
            loan_amount: dec!(200_000),
            down_payment: dec!(50_000),
            term_months: 36,
        }
    }

    #[test]
    fn test_cheapest_product_ranks_first() {
        let out = compare_loan_products(&sample_input()).unwrap().result;
        assert_eq!(out.offered_count, 3);
        // Same rate, Vakif carries a fee => Halk wins
        assert_eq!(out.best_offer.as_deref(), Some("Halk"));
        assert_eq!(out.offers[1].bank_name, "Vakif");
        assert_eq!(out.offers[2].bank_name, "Garanti");
    }

    #[test]
    fn test_short_term_product_declined() {
        let out = compare_loan_products(&sample_input()).unwrap().result;
        let is = out.offers.last().unwrap();
        assert_eq!(is.bank_name, "Is");
        assert!(!is.offered);
        assert!(is.amortization.is_none());
        assert!(is.reason.as_deref().unwrap().contains("24"));
    }

    #[test]
    fn test_no_offers_warns() {
        let mut input = sample_input();
        input.term_months = 180;
        let out = compare_loan_products(&input).unwrap();
        assert!(out.result.best_offer.is_none());
        assert_eq!(out.warnings.len(), 1);
    }

    #[test]
    fn test_empty_catalog_rejected() {
        let mut input = sample_input();
        input.products.clear();
        assert!(compare_loan_products(&input).is_err());
    }
}
