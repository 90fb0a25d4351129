//! Plot rendering.
//!
//! - `ascii`: fixed-size terminal plots (deterministic, snapshot-tested)
//! - `svg`: chart files written with Plotters

pub mod ascii;
pub mod svg;

pub use ascii::*;
pub use svg::write_svg_plots;
