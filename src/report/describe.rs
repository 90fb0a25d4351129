//! Descriptive statistics per numeric column.

use crate::domain::{
    AnnualPoint, AnnualSeries, COL_INFLATION, COL_POPULATION, COL_RATE, COL_UNEMPLOYED, COL_YEAR,
};
use crate::math::{mean, quantile_sorted, sample_std, sorted};

/// count / mean / std / min / quartiles / max for one column.
///
/// Missing values are excluded; `count` is the number of values actually used.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnSummary {
    pub name: String,
    pub count: usize,
    pub mean: f64,
    pub std: f64,
    pub min: f64,
    pub q25: f64,
    pub median: f64,
    pub q75: f64,
    pub max: f64,
}

/// Summarize one column.
pub fn describe(name: &str, values: &[f64]) -> ColumnSummary {
    let s = sorted(values);
    ColumnSummary {
        name: name.to_string(),
        count: s.len(),
        mean: mean(&s),
        std: sample_std(&s),
        min: s.first().copied().unwrap_or(f64::NAN),
        q25: quantile_sorted(&s, 0.25),
        median: quantile_sorted(&s, 0.5),
        q75: quantile_sorted(&s, 0.75),
        max: s.last().copied().unwrap_or(f64::NAN),
    }
}

/// Summaries for every numeric column of the annual series, in report order.
///
/// Only observed years count: gaps and years filled by interpolation are
/// skipped, so `count` is the number of years that had data.
pub fn describe_annual(series: &AnnualSeries) -> Vec<ColumnSummary> {
    let column = |f: fn(&AnnualPoint) -> Option<f64>| -> Vec<f64> {
        series
            .points
            .iter()
            .filter(|p| !p.interpolated && !p.is_gap())
            .filter_map(f)
            .collect()
    };

    vec![
        describe(COL_RATE, &column(|p| p.unemployment_rate)),
        describe(COL_POPULATION, &column(|p| p.population)),
        describe(COL_INFLATION, &column(|p| p.inflation_rate)),
        describe(COL_UNEMPLOYED, &column(|p| p.unemployed)),
        describe(COL_YEAR, &column(|p| Some(f64::from(p.year)))),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn describe_matches_hand_computed_values() {
        let s = describe("x", &[3.0, 1.0, 4.0, 1.0, 5.0]);
        assert_eq!(s.count, 5);
        assert!((s.mean - 2.8).abs() < 1e-12);
        assert_eq!(s.min, 1.0);
        assert_eq!(s.q25, 1.0);
        assert_eq!(s.median, 3.0);
        assert_eq!(s.q75, 4.0);
        assert_eq!(s.max, 5.0);
        // Σ(x - 2.8)^2 = 12.8, / 4 = 3.2
        assert!((s.std - 3.2_f64.sqrt()).abs() < 1e-12);
    }

    #[test]
    fn filled_years_are_not_counted() {
        use crate::data::{to_year_end, unemployed};
        use crate::domain::{GapPolicy, Observation};
        use chrono::NaiveDate;

        let obs = |y: i32, rate: f64| Observation {
            date: NaiveDate::from_ymd_opt(y, 12, 31).unwrap(),
            unemployment_rate: rate,
            population: 1e9,
            inflation_rate: 2.0,
            unemployed: unemployed(rate, 1e9),
            year: y,
        };
        let series = to_year_end(&[obs(1991, 5.0), obs(1995, 9.0)], GapPolicy::Interpolate).unwrap();
        assert_eq!(series.len(), 5);

        let summaries = describe_annual(&series);
        let rate = &summaries[0];
        assert_eq!(rate.count, 2);
        assert!((rate.mean - 7.0).abs() < 1e-12);
        assert!((rate.std - 8.0_f64.sqrt()).abs() < 1e-12);
        assert!(summaries.iter().all(|s| s.count == 2));

        let kept = to_year_end(&[obs(1991, 5.0), obs(1995, 9.0)], GapPolicy::Keep).unwrap();
        assert!(describe_annual(&kept).iter().all(|s| s.count == 2));
    }

    #[test]
    fn empty_column_summarizes_to_nan() {
        let s = describe("x", &[]);
        assert_eq!(s.count, 0);
        assert!(s.mean.is_nan() && s.min.is_nan() && s.max.is_nan());
    }
}
