pub mod amortization;
pub mod comparison;
