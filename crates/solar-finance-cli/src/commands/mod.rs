pub mod incentives;
pub mod investment;
pub mod loan;
pub mod tariff;
