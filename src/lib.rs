//! `unemployment-forecast` library crate.
//!
//! The binary (`unemp`) is a thin wrapper around this library so that:
//!
//! - the pipeline is testable without spawning processes
//! - computation stays separate from console output
//! - code stays easy to navigate as the project grows

pub mod app;
pub mod cli;
pub mod data;
pub mod debug;
pub mod domain;
pub mod error;
pub mod fit;
pub mod io;
pub mod math;
pub mod models;
pub mod plot;
pub mod report;
