//! Forecasting models.
//!
//! Models are plain functions over `&[f64]` so the pipeline can feed them any
//! dense series without depending on the table types.

pub mod arima;

pub use arima::*;
