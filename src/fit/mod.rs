//! Forecast orchestration.
//!
//! Responsibilities:
//!
//! - check the annual series is dense
//! - fit the configured ARIMA order
//! - pair forecast values with month-end dates and 95% intervals

pub mod forecaster;

pub use forecaster::*;
