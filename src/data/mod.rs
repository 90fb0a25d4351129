//! Data shaping between cleaning and modeling.
//!
//! - derived columns (`derive`)
//! - year-end resampling (`resample`)
//! - calendar helpers (`calendar`)
//! - synthetic datasets for demos and tests (`sample`)

pub mod calendar;
pub mod derive;
pub mod resample;
pub mod sample;

pub use derive::{derive_observations, unemployed};
pub use resample::to_year_end;
pub use sample::{SynthConfig, generate_rows, write_synthetic_csv};
