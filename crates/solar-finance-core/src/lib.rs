pub mod config;
pub mod error;
pub mod types;

#[cfg(feature = "loan")]
pub mod loan;

#[cfg(feature = "incentives")]
pub mod incentives;

#[cfg(feature = "tariff")]
pub mod tariff;

#[cfg(feature = "investment")]
pub mod investment;

pub use config::{EngineConfig, TariffRulePolicy};
pub use error::SolarFinanceError;
pub use types::*;

/// Standard result type for all solar-finance operations
pub type SolarFinanceResult<T> = Result<T, SolarFinanceError>;
