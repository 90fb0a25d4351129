//! Derived columns: `Unemployed` and `Year`.

use chrono::Datelike;

use crate::domain::Observation;
use crate::io::ingest::CleanRow;

/// Head count of unemployed people for a rate (%) and a population.
pub fn unemployed(rate_pct: f64, population: f64) -> f64 {
    (rate_pct / 100.0) * population
}

/// Attach `unemployed` and `year` to every cleaned row.
pub fn derive_observations(rows: &[CleanRow]) -> Vec<Observation> {
    rows.iter()
        .map(|r| Observation {
            date: r.date,
            unemployment_rate: r.unemployment_rate,
            population: r.population,
            inflation_rate: r.inflation_rate,
            unemployed: unemployed(r.unemployment_rate, r.population),
            year: r.date.year(),
        })
        .collect()
}
