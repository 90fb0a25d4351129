//! Forecast orchestration: annual series in, dated forecast points out.

use chrono::NaiveDate;
use tracing::info;

use crate::data::calendar::month_ends_from;
use crate::domain::{AnnualSeries, ArimaOrder, ForecastPoint, HistoryPoint, ModelSummary, RunConfig, Trend};
use crate::error::AppError;
use crate::models::fit_arima;

/// Two-sided 95% normal quantile.
const Z_95: f64 = 1.959_963_984_540_054;

/// Model and calendar settings for one forecast.
#[derive(Debug, Clone, Copy)]
pub struct ForecastOptions {
    pub order: ArimaOrder,
    pub trend: Trend,
    pub horizon: usize,
    pub anchor: NaiveDate,
}

impl From<&RunConfig> for ForecastOptions {
    fn from(config: &RunConfig) -> Self {
        Self {
            order: config.order,
            trend: config.trend,
            horizon: config.horizon,
            anchor: config.anchor,
        }
    }
}

/// Fitted model, the series it was fitted on, and the dated forecast.
#[derive(Debug, Clone)]
pub struct ForecastRun {
    pub model: ModelSummary,
    pub history: Vec<HistoryPoint>,
    pub points: Vec<ForecastPoint>,
    /// In-sample residuals on the differenced scale.
    pub residuals: Vec<f64>,
}

/// Fit the unemployment-rate series and project `horizon` month-end points.
pub fn forecast_unemployment(series: &AnnualSeries, opts: &ForecastOptions) -> Result<ForecastRun, AppError> {
    let gaps: Vec<i32> = series.points.iter().filter(|p| p.is_gap()).map(|p| p.year).collect();
    if !gaps.is_empty() {
        return Err(AppError::data(format!(
            "The annual series has {} missing value(s) (first gap: {}); the model needs a dense series. \
             Use `--gaps interpolate` or `--gaps drop`.",
            gaps.len(),
            gaps[0]
        )));
    }

    let history: Vec<HistoryPoint> = series
        .points
        .iter()
        .filter_map(|p| {
            p.unemployment_rate.map(|value| HistoryPoint {
                date: p.date,
                value,
                interpolated: p.interpolated,
            })
        })
        .collect();
    let values: Vec<f64> = history.iter().map(|h| h.value).collect();

    let fit = fit_arima(&values, opts.order, opts.trend)?;
    let projected = fit.forecast(opts.horizon);
    let dates = month_ends_from(opts.anchor, opts.horizon);
    if dates.len() != opts.horizon {
        return Err(AppError::input(format!(
            "Cannot build {} forecast dates from anchor {}.",
            opts.horizon, opts.anchor
        )));
    }

    let points: Vec<ForecastPoint> = dates
        .into_iter()
        .zip(projected.mean.iter().zip(&projected.std_err))
        .map(|(date, (&value, &std_err))| ForecastPoint {
            date,
            value,
            std_err,
            lower: value - Z_95 * std_err,
            upper: value + Z_95 * std_err,
        })
        .collect();

    info!(
        order = %opts.order,
        horizon = points.len(),
        first = %points.first().map(|p| p.date).unwrap_or(opts.anchor),
        "forecast complete"
    );

    Ok(ForecastRun {
        model: fit.summary().clone(),
        history,
        points,
        residuals: fit.residuals().to_vec(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Datelike;
    use crate::data::calendar::year_end;
    use crate::domain::{AnnualPoint, default_anchor};

    fn series(rates: &[Option<f64>]) -> AnnualSeries {
        let points = rates
            .iter()
            .enumerate()
            .map(|(i, r)| {
                let year = 1991 + i as i32;
                AnnualPoint {
                    date: year_end(year).unwrap(),
                    year,
                    unemployment_rate: *r,
                    population: r.map(|_| 5e9),
                    inflation_rate: r.map(|_| 2.0),
                    unemployed: r.map(|v| v / 100.0 * 5e9),
                    interpolated: false,
                }
            })
            .collect();
        AnnualSeries {
            points,
            gap_years: Vec::new(),
        }
    }

    fn opts() -> ForecastOptions {
        ForecastOptions {
            order: ArimaOrder::default(),
            trend: Trend::N,
            horizon: 12,
            anchor: default_anchor(),
        }
    }

    #[test]
    fn twelve_month_end_points_after_anchor() {
        let rates: Vec<Option<f64>> = (0..32).map(|i| Some(6.0 + (i as f64 * 0.9).sin())).collect();
        let run = forecast_unemployment(&series(&rates), &opts()).unwrap();

        assert_eq!(run.points.len(), 12);
        assert_eq!(run.history.len(), 32);
        assert_eq!(run.residuals.len(), run.model.n_eff);
        assert_eq!(run.points[0].date.to_string(), "2022-12-31");
        assert_eq!(run.points[11].date.to_string(), "2023-11-30");
        assert!(run.points.windows(2).all(|w| w[0].date < w[1].date));
        for p in &run.points {
            assert!(p.lower <= p.value && p.value <= p.upper);
        }
    }

    #[test]
    fn gaps_are_refused() {
        let mut rates: Vec<Option<f64>> = (0..20).map(|i| Some(5.0 + i as f64 * 0.1)).collect();
        rates[4] = None;
        let err = forecast_unemployment(&series(&rates), &opts()).unwrap_err();
        assert_eq!(err.exit_code(), 3);
        assert!(err.message().contains("1995"));
    }

    #[test]
    fn history_marks_filled_years() {
        let rates: Vec<Option<f64>> = (0..20).map(|i| Some(6.0 + (i as f64 * 0.7).cos())).collect();
        let mut annual = series(&rates);
        annual.points[4].interpolated = true;

        let run = forecast_unemployment(&annual, &opts()).unwrap();
        let filled: Vec<i32> = run
            .history
            .iter()
            .filter(|h| h.interpolated)
            .map(|h| h.date.year())
            .collect();
        assert_eq!(filled, vec![1995]);
    }
}
