//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - column names and configuration enums (`GapPolicy`, `Trend`, `ArimaOrder`)
//! - cleaned observations and the annual series (`Observation`, `AnnualSeries`)
//! - forecast outputs (`ForecastPoint`, `ModelSummary`, `ForecastFile`)

pub mod types;

pub use types::*;
