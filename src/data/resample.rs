//! Year-end resampling.
//!
//! The cleaned observations (monthly or finer, possibly irregular) are
//! reindexed to exactly one point per calendar year, dated December 31. The
//! last observation within a year represents that year.
//!
//! Years with no observation at all become gaps; `GapPolicy` decides what
//! happens to them.

use std::collections::BTreeMap;

use tracing::{info, warn};

use crate::data::calendar::year_end;
use crate::data::derive::unemployed;
use crate::domain::{AnnualPoint, AnnualSeries, GapPolicy, Observation};
use crate::error::AppError;

/// Reindex observations to one point per year-end and apply the gap policy.
pub fn to_year_end(observations: &[Observation], policy: GapPolicy) -> Result<AnnualSeries, AppError> {
    if observations.is_empty() {
        return Err(AppError::data("No observations remain after cleaning."));
    }

    // Keyed by year; later dates overwrite earlier ones so the last one wins.
    let mut by_year: BTreeMap<i32, &Observation> = BTreeMap::new();
    for obs in observations {
        match by_year.get(&obs.year) {
            Some(prev) if prev.date > obs.date => {}
            _ => {
                by_year.insert(obs.year, obs);
            }
        }
    }

    let (Some(&first), Some(&last)) = (by_year.keys().next(), by_year.keys().next_back()) else {
        return Err(AppError::data("No observations remain after cleaning."));
    };

    let mut points = Vec::with_capacity((last - first + 1) as usize);
    let mut gap_years = Vec::new();
    for year in first..=last {
        let date = year_end(year).ok_or_else(|| AppError::data(format!("Year {year} is out of range.")))?;
        let point = match by_year.get(&year) {
            Some(obs) => AnnualPoint {
                date,
                year,
                unemployment_rate: Some(obs.unemployment_rate),
                population: Some(obs.population),
                inflation_rate: Some(obs.inflation_rate),
                unemployed: Some(obs.unemployed),
                interpolated: false,
            },
            None => {
                gap_years.push(year);
                AnnualPoint {
                    date,
                    year,
                    unemployment_rate: None,
                    population: None,
                    inflation_rate: None,
                    unemployed: None,
                    interpolated: false,
                }
            }
        };
        points.push(point);
    }

    if !gap_years.is_empty() {
        warn!(gaps = gap_years.len(), policy = ?policy, "year-end resampling left gaps");
    }

    match policy {
        GapPolicy::Keep => {}
        GapPolicy::Error if !gap_years.is_empty() => {
            return Err(AppError::data(format!(
                "Resampling left {} year(s) without observations: {}.",
                gap_years.len(),
                join_years(&gap_years)
            )));
        }
        GapPolicy::Error => {}
        GapPolicy::Drop => points.retain(|p| !p.is_gap()),
        GapPolicy::Interpolate => interpolate_gaps(&mut points),
    }

    info!(first, last, points = points.len(), gaps = gap_years.len(), "resampled to year-end");
    Ok(AnnualSeries { points, gap_years })
}

/// Fill gaps linearly between the nearest observed years on either side.
///
/// The first and last years always carry an observation, so every gap has
/// both neighbours. `unemployed` is recomputed from the filled rate and
/// population rather than interpolated on its own.
fn interpolate_gaps(points: &mut [AnnualPoint]) {
    let observed: Vec<usize> = points
        .iter()
        .enumerate()
        .filter(|(_, p)| !p.is_gap())
        .map(|(i, _)| i)
        .collect();

    for w in observed.windows(2) {
        let (lo, hi) = (w[0], w[1]);
        if hi - lo < 2 {
            continue;
        }
        let (a, b) = (points[lo].clone(), points[hi].clone());
        for point in points.iter_mut().take(hi).skip(lo + 1) {
            let u = (point.year - a.year) as f64 / (b.year - a.year) as f64;
            let lerp = |x: Option<f64>, y: Option<f64>| Some(x? + u * (y? - x?));
            point.unemployment_rate = lerp(a.unemployment_rate, b.unemployment_rate);
            point.population = lerp(a.population, b.population);
            point.inflation_rate = lerp(a.inflation_rate, b.inflation_rate);
            point.unemployed = match (point.unemployment_rate, point.population) {
                (Some(rate), Some(pop)) => Some(unemployed(rate, pop)),
                _ => None,
            };
            point.interpolated = true;
        }
    }
}

fn join_years(years: &[i32]) -> String {
    years.iter().map(i32::to_string).collect::<Vec<_>>().join(", ")
}
