//! Synthetic economic-data generation.
//!
//! Produces a seeded, deterministic table in the same shape as the real
//! input (`Date`, `Unemployment Rate (%)`, `Population`, `Inflation Rate (%)`)
//! so the pipeline can be demoed and tested without the original file.

use std::fs::File;
use std::path::Path;

use chrono::NaiveDate;
use rand::prelude::*;
use rand::rngs::StdRng;
use rand_distr::Normal;
use tracing::info;

use crate::data::calendar::year_end;
use crate::domain::{COL_DATE, COL_INFLATION, COL_POPULATION, COL_RATE};
use crate::error::AppError;

/// Long-run level the unemployment rate reverts to (%).
const RATE_MEAN: f64 = 6.0;
/// Share of last year's deviation that persists.
const RATE_PERSISTENCE: f64 = 0.7;
const INFLATION_MEAN: f64 = 3.0;
const INFLATION_PERSISTENCE: f64 = 0.5;
/// World population in 1991, roughly.
const POPULATION_START: f64 = 5.4e9;
const POPULATION_GROWTH: f64 = 0.013;

/// Options for a synthetic table.
#[derive(Debug, Clone)]
pub struct SynthConfig {
    pub start_year: i32,
    pub end_year: i32,
    pub seed: u64,
    /// Probability that any non-date cell is left blank.
    pub missing_rate: f64,
    /// Write population as `5.40B` instead of a bare number.
    pub population_suffix: bool,
}

impl Default for SynthConfig {
    fn default() -> Self {
        Self {
            start_year: 1991,
            end_year: 2022,
            seed: 42,
            missing_rate: 0.0,
            population_suffix: true,
        }
    }
}

/// One generated row; `None` cells are written blank.
#[derive(Debug, Clone, PartialEq)]
pub struct SynthRow {
    pub date: NaiveDate,
    pub unemployment_rate: Option<f64>,
    pub population: Option<f64>,
    pub inflation_rate: Option<f64>,
}

/// Generate one year-end row per year in `start_year..=end_year`.
pub fn generate_rows(config: &SynthConfig) -> Result<Vec<SynthRow>, AppError> {
    if config.end_year < config.start_year {
        return Err(AppError::input("End year must not precede start year."));
    }
    if !(0.0..1.0).contains(&config.missing_rate) {
        return Err(AppError::input("Missing rate must be in [0, 1)."));
    }

    let mut rng = StdRng::seed_from_u64(config.seed);
    let rate_noise =
        Normal::new(0.0, 0.45).map_err(|e| AppError::numeric(format!("Noise distribution error: {e}")))?;
    let inflation_noise =
        Normal::new(0.0, 0.8).map_err(|e| AppError::numeric(format!("Noise distribution error: {e}")))?;

    let mut rate = RATE_MEAN + rng.gen_range(-1.0..1.0);
    let mut inflation = INFLATION_MEAN;
    let mut population = POPULATION_START;

    let mut rows = Vec::new();
    for year in config.start_year..=config.end_year {
        let date = year_end(year).ok_or_else(|| AppError::input(format!("Year {year} is out of range.")))?;

        rate = (RATE_MEAN + RATE_PERSISTENCE * (rate - RATE_MEAN) + rate_noise.sample(&mut rng)).clamp(0.5, 25.0);
        inflation =
            INFLATION_MEAN + INFLATION_PERSISTENCE * (inflation - INFLATION_MEAN) + inflation_noise.sample(&mut rng);
        population *= 1.0 + POPULATION_GROWTH * rng.gen_range(0.8..1.2);

        let mut blank = |v: f64| {
            if config.missing_rate > 0.0 && rng.gen_bool(config.missing_rate) {
                None
            } else {
                Some(v)
            }
        };
        rows.push(SynthRow {
            date,
            unemployment_rate: blank(round_to(rate, 2)),
            population: blank(population.round()),
            inflation_rate: blank(round_to(inflation, 2)),
        });
    }

    Ok(rows)
}

/// Generate a table and write it as CSV.
pub fn write_synthetic_csv(path: &Path, config: &SynthConfig) -> Result<usize, AppError> {
    let rows = generate_rows(config)?;
    let file = File::create(path)
        .map_err(|e| AppError::input(format!("Failed to create CSV '{}': {e}", path.display())))?;
    let mut writer = csv::Writer::from_writer(file);

    writer
        .write_record([COL_DATE, COL_RATE, COL_POPULATION, COL_INFLATION])
        .map_err(|e| AppError::input(format!("Failed to write CSV header: {e}")))?;

    for row in &rows {
        let population = row.population.map(|p| {
            if config.population_suffix {
                format!("{:.2}B", p / 1e9)
            } else {
                format!("{p:.0}")
            }
        });
        writer
            .write_record([
                row.date.to_string(),
                fmt_opt(row.unemployment_rate),
                population.unwrap_or_default(),
                fmt_opt(row.inflation_rate),
            ])
            .map_err(|e| AppError::input(format!("Failed to write CSV row: {e}")))?;
    }
    writer
        .flush()
        .map_err(|e| AppError::input(format!("Failed to flush CSV '{}': {e}", path.display())))?;

    info!(path = %path.display(), rows = rows.len(), seed = config.seed, "wrote synthetic dataset");
    Ok(rows.len())
}

fn fmt_opt(v: Option<f64>) -> String {
    v.map(|x| x.to_string()).unwrap_or_default()
}

fn round_to(v: f64, decimals: i32) -> f64 {
    let scale = 10f64.powi(decimals);
    (v * scale).round() / scale
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_seed_same_rows() {
        let config = SynthConfig::default();
        let a = generate_rows(&config).unwrap();
        let b = generate_rows(&config).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.len(), 32);
    }

    #[test]
    fn rates_stay_in_plausible_range() {
        let rows = generate_rows(&SynthConfig::default()).unwrap();
        for r in rows {
            let rate = r.unemployment_rate.unwrap();
            assert!((0.5..=25.0).contains(&rate));
            assert!(r.population.unwrap() > POPULATION_START);
        }
    }

    #[test]
    fn missing_rate_blanks_some_cells() {
        let config = SynthConfig {
            missing_rate: 0.5,
            ..SynthConfig::default()
        };
        let rows = generate_rows(&config).unwrap();
        let blanks = rows
            .iter()
            .filter(|r| r.unemployment_rate.is_none() || r.population.is_none() || r.inflation_rate.is_none())
            .count();
        assert!(blanks > 0);
    }

    #[test]
    fn invalid_year_range_is_rejected() {
        let config = SynthConfig {
            start_year: 2000,
            end_year: 1999,
            ..SynthConfig::default()
        };
        assert_eq!(generate_rows(&config).unwrap_err().exit_code(), 2);
    }
}
