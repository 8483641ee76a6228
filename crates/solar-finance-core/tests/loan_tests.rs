use solar_finance_core::loan::amortization::{
    self, LoanCalculationInput, LoanParameters, LoanProduct, LoanType,
};
use solar_finance_core::loan::comparison::{self, LoanComparisonInput};
use solar_finance_core::SolarFinanceError;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

fn sample_product(rate: Decimal, max_term: u32) -> LoanProduct {
    LoanProduct {
        bank_name: "Ziraat".into(),
        loan_type: LoanType::Agricultural,
        interest_rate_pct: rate,
        max_term_months: max_term,
        processing_fee: dec!(2_500),
        insurance_rate_pct: dec!(0.25),
    }
}

fn params(amount: Decimal, rate: Decimal, term: u32) -> LoanParameters {
    LoanParameters {
        loan_amount: amount,
        down_payment: dec!(0),
        interest_rate_pct: rate,
        term_months: term,
        selected_product: sample_product(rate, 360),
    }
}

// ===========================================================================
// Zero-interest loans
// ===========================================================================

#[test]
fn test_zero_interest_payment_is_principal_over_term() {
    for (amount, term) in [
        (dec!(1_120_000), 120u32),
        (dec!(100_000), 7),
        (dec!(999_999.99), 36),
        (dec!(1), 1),
    ] {
        let r = amortization::compute_amortization(&params(amount, Decimal::ZERO, term)).unwrap();
        assert_eq!(r.monthly_payment, amount / Decimal::from(term));
        assert!(r.total_interest >= Decimal::ZERO);
    }
}

// ===========================================================================
// Payment identities
// ===========================================================================

#[test]
fn test_payment_identities_hold() {
    for (rate, term) in [(dec!(1.99), 12u32), (dec!(12), 60), (dec!(36), 24), (dec!(48.5), 120)] {
        let amount = dec!(750_000);
        let r = amortization::compute_amortization(&params(amount, rate, term)).unwrap();
        assert_eq!(r.total_payment, r.monthly_payment * Decimal::from(term));
        assert_eq!(r.total_interest, r.total_payment - amount);
        assert!(r.total_interest > Decimal::ZERO, "rate {rate}: interest should be positive");
    }
}

#[test]
fn test_higher_rate_means_higher_payment() {
    let low = amortization::compute_amortization(&params(dec!(500_000), dec!(10), 60)).unwrap();
    let high = amortization::compute_amortization(&params(dec!(500_000), dec!(20), 60)).unwrap();
    assert!(high.monthly_payment > low.monthly_payment);
    assert!(high.effective_rate_pct > low.effective_rate_pct);
}

#[test]
fn test_single_month_loan() {
    // 1%/month for one month: pay principal plus one month of interest
    let r = amortization::compute_amortization(&params(dec!(10_000), dec!(12), 1)).unwrap();
    assert!((r.monthly_payment - dec!(10_100)).abs() < dec!(0.0000001));
}

#[test]
fn test_effective_rate_known_answer() {
    // Zero rate, 2,500 fee + 0.25% insurance on 1,000,000 over 2 years
    // => (2,500 + 2,500) / 1,000,000 / 2 * 100 = 0.25%
    let r =
        amortization::compute_amortization(&params(dec!(1_000_000), Decimal::ZERO, 24)).unwrap();
    assert_eq!(r.effective_rate_pct, dec!(0.25));
}

// ===========================================================================
// Validation
// ===========================================================================

#[test]
fn test_invalid_inputs_are_rejected() {
    let cases = [
        (params(dec!(0), dec!(10), 12), "loan_amount"),
        (params(dec!(-5), dec!(10), 12), "loan_amount"),
        (params(dec!(100), dec!(10), 0), "term_months"),
        (params(dec!(100), dec!(10), 361), "term_months"),
        (params(dec!(100), dec!(-0.1), 12), "interest_rate_pct"),
    ];
    for (p, expected) in cases {
        match amortization::compute_amortization(&p) {
            Err(SolarFinanceError::InvalidInput { field, .. }) => assert_eq!(field, expected),
            other => panic!("Expected InvalidInput on {expected}, got {other:?}"),
        }
    }
}

#[test]
fn test_loan_calculation_json_round_trip_input() {
    let json = r#"{
        "parameters": {
            "loan_amount": "240000",
            "down_payment": "60000",
            "interest_rate_pct": "0",
            "term_months": 24,
            "selected_product": {
                "bank_name": "Halkbank",
                "loan_type": "CONSUMER",
                "interest_rate_pct": "0",
                "max_term_months": 36,
                "processing_fee": "0",
                "insurance_rate_pct": "0"
            }
        }
    }"#;
    let input: LoanCalculationInput = serde_json::from_str(json).unwrap();
    assert!(!input.include_schedule);
    let out = amortization::calculate_loan(&input).unwrap();
    assert_eq!(out.result.amortization.monthly_payment, dec!(10_000));
    assert!(out.result.schedule.is_none());
}

// ===========================================================================
// Catalog comparison
// ===========================================================================

#[test]
fn test_comparison_prefers_zero_interest() {
    let mut free = sample_product(Decimal::ZERO, 120);
    free.bank_name = "Promo".into();
    free.processing_fee = Decimal::ZERO;
    free.insurance_rate_pct = Decimal::ZERO;
    let paid = sample_product(dec!(15), 120);

    let out = comparison::compare_loan_products(&LoanComparisonInput {
        products: vec![paid, free],
        loan_amount: dec!(300_000),
        down_payment: dec!(0),
        term_months: 60,
    })
    .unwrap();
    assert_eq!(out.result.best_offer.as_deref(), Some("Promo"));
    assert_eq!(
        out.result.offers[0].amortization.as_ref().unwrap().effective_rate_pct,
        Decimal::ZERO
    );
}
