//! Numerical building blocks: differencing, least squares, summary statistics.

pub mod diff;
pub mod ols;
pub mod stats;

pub use diff::*;
pub use ols::*;
pub use stats::*;
