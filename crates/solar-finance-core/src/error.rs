use rust_decimal::Decimal;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SolarFinanceError {
    #[error("Invalid input: {field} — {reason}")]
    InvalidInput { field: String, reason: String },

    /// Monthly savings are zero or negative, so the investment never pays
    /// back. Callers surface this as "not applicable", not as a failure.
    #[error("Payback undefined: monthly savings of {monthly_savings} never recover the net cost")]
    UndefinedPayback { monthly_savings: Decimal },

    #[error("Division by zero in {context}")]
    DivisionByZero { context: String },

    /// A result left the 96-bit decimal range.
    #[error("Arithmetic overflow in {context}")]
    ArithmeticOverflow { context: String },
}

impl SolarFinanceError {
    pub(crate) fn invalid(field: &str, reason: impl Into<String>) -> Self {
        SolarFinanceError::InvalidInput {
            field: field.into(),
            reason: reason.into(),
        }
    }
}
