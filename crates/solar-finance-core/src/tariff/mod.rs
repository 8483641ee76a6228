pub mod feed_in;

pub use crate::config::LicenseType;
