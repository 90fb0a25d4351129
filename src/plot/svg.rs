//! SVG chart files via Plotters.
//!
//! One file per chart, written into a caller-chosen directory:
//!
//! - `rate_line.svg`: annual unemployment rate over time
//! - `rate_by_year.svg`: the same series as bars
//! - `inflation_box.svg` / `unemployment_box.svg`: distribution boxes
//! - `forecast.svg`: history, forecast and its 95% band
//!
//! All series and bounds are computed before drawing so each `draw_*`
//! function only deals with Plotters.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{Datelike, NaiveDate};
use plotters::drawing::DrawingAreaErrorKind;
use plotters::prelude::*;
use tracing::info;

use crate::domain::{AnnualSeries, COL_INFLATION, COL_RATE, COL_UNEMPLOYED, ForecastPoint, HistoryPoint};
use crate::error::AppError;
use crate::math::{quantile_sorted, sorted};

type DrawResult = Result<(), DrawingAreaErrorKind<std::io::Error>>;

/// Pixel size used for every chart.
pub const SVG_SIZE: (u32, u32) = (960, 540);

const HISTORY_COLOR: RGBColor = RGBColor(31, 119, 180);
const FORECAST_COLOR: RGBColor = RGBColor(214, 39, 40);

/// Write every chart into `dir`, creating it if needed. Returns the paths written.
pub fn write_svg_plots(
    dir: &Path,
    series: &AnnualSeries,
    history: &[HistoryPoint],
    forecast: &[ForecastPoint],
) -> Result<Vec<PathBuf>, AppError> {
    fs::create_dir_all(dir)
        .map_err(|e| AppError::input(format!("Failed to create plot directory '{}': {e}", dir.display())))?;

    let rates: Vec<(f64, f64)> = series
        .points
        .iter()
        .filter_map(|p| p.unemployment_rate.map(|r| (f64::from(p.year), r)))
        .collect();
    let inflation: Vec<f64> = series.points.iter().filter_map(|p| p.inflation_rate).collect();
    // Millions keep the axis labels short.
    let unemployed: Vec<f64> = series.points.iter().filter_map(|p| p.unemployed.map(|u| u / 1e6)).collect();

    let mut written = Vec::new();

    let path = dir.join("rate_line.svg");
    draw_rate_line(&path, &rates).map_err(|e| plot_error(&path, e))?;
    written.push(path);

    let path = dir.join("rate_by_year.svg");
    draw_rate_bars(&path, &rates).map_err(|e| plot_error(&path, e))?;
    written.push(path);

    let path = dir.join("inflation_box.svg");
    draw_box(&path, COL_INFLATION, &inflation).map_err(|e| plot_error(&path, e))?;
    written.push(path);

    let path = dir.join("unemployment_box.svg");
    draw_box(&path, &format!("{COL_UNEMPLOYED} (millions)"), &unemployed).map_err(|e| plot_error(&path, e))?;
    written.push(path);

    let path = dir.join("forecast.svg");
    draw_forecast(&path, history, forecast).map_err(|e| plot_error(&path, e))?;
    written.push(path);

    info!(dir = %dir.display(), files = written.len(), "wrote SVG plots");
    Ok(written)
}

fn plot_error(path: &Path, e: impl std::fmt::Display) -> AppError {
    AppError::input(format!("Failed to draw '{}': {e}", path.display()))
}

fn draw_rate_line(path: &Path, rates: &[(f64, f64)]) -> DrawResult {
    let root = SVGBackend::new(path, SVG_SIZE).into_drawing_area();
    root.fill(&WHITE)?;

    let (x0, x1) = bounds(rates.iter().map(|p| p.0), 0.0);
    let (y0, y1) = bounds(rates.iter().map(|p| p.1), 0.05);

    let mut chart = ChartBuilder::on(&root)
        .caption("Unemployment rate over time", ("sans-serif", 24).into_font())
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(50)
        .build_cartesian_2d(x0..x1, y0..y1)?;

    chart
        .configure_mesh()
        .x_desc("Year")
        .y_desc(COL_RATE)
        .x_label_formatter(&|v| format!("{v:.0}"))
        .draw()?;

    chart.draw_series(LineSeries::new(rates.iter().copied(), HISTORY_COLOR.stroke_width(2)))?;
    chart.draw_series(rates.iter().map(|&(x, y)| Circle::new((x, y), 3, HISTORY_COLOR.filled())))?;

    root.present()?;
    Ok(())
}

fn draw_rate_bars(path: &Path, rates: &[(f64, f64)]) -> DrawResult {
    let root = SVGBackend::new(path, SVG_SIZE).into_drawing_area();
    root.fill(&WHITE)?;

    let (x0, x1) = bounds(rates.iter().map(|p| p.0), 0.0);
    let y_max = rates.iter().map(|p| p.1).fold(0.0_f64, f64::max).max(1.0) * 1.1;

    let mut chart = ChartBuilder::on(&root)
        .caption("Unemployment rate by year", ("sans-serif", 24).into_font())
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(50)
        .build_cartesian_2d((x0 - 0.5)..(x1 + 0.5), 0.0..y_max)?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_desc("Year")
        .y_desc(COL_RATE)
        .x_label_formatter(&|v| format!("{v:.0}"))
        .draw()?;

    chart.draw_series(
        rates
            .iter()
            .map(|&(x, y)| Rectangle::new([(x - 0.4, 0.0), (x + 0.4, y)], HISTORY_COLOR.filled())),
    )?;

    root.present()?;
    Ok(())
}

/// Five-number box with 1.5·IQR whiskers; points beyond are drawn as outliers.
fn draw_box(path: &Path, label: &str, values: &[f64]) -> DrawResult {
    let root = SVGBackend::new(path, (480, 540)).into_drawing_area();
    root.fill(&WHITE)?;

    let s = sorted(values);
    let q1 = quantile_sorted(&s, 0.25);
    let median = quantile_sorted(&s, 0.5);
    let q3 = quantile_sorted(&s, 0.75);
    let iqr = q3 - q1;
    let lo = s.iter().copied().find(|v| *v >= q1 - 1.5 * iqr).unwrap_or(q1);
    let hi = s.iter().rev().copied().find(|v| *v <= q3 + 1.5 * iqr).unwrap_or(q3);

    let (y0, y1) = bounds(s.iter().copied(), 0.1);

    let mut chart = ChartBuilder::on(&root)
        .caption(label, ("sans-serif", 20).into_font())
        .margin(10)
        .x_label_area_size(10)
        .y_label_area_size(60)
        .build_cartesian_2d(0.0..1.0, y0..y1)?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(0)
        .y_desc(label)
        .draw()?;

    if s.is_empty() || !median.is_finite() {
        root.present()?;
        return Ok(());
    }

    chart.draw_series(std::iter::once(Rectangle::new(
        [(0.3, q1), (0.7, q3)],
        HISTORY_COLOR.mix(0.3).filled(),
    )))?;
    chart.draw_series(std::iter::once(Rectangle::new(
        [(0.3, q1), (0.7, q3)],
        HISTORY_COLOR.stroke_width(2),
    )))?;
    chart.draw_series([
        PathElement::new(vec![(0.3, median), (0.7, median)], BLACK.stroke_width(2)),
        PathElement::new(vec![(0.5, q3), (0.5, hi)], BLACK),
        PathElement::new(vec![(0.5, q1), (0.5, lo)], BLACK),
        PathElement::new(vec![(0.4, hi), (0.6, hi)], BLACK),
        PathElement::new(vec![(0.4, lo), (0.6, lo)], BLACK),
    ])?;
    chart.draw_series(
        s.iter()
            .filter(|v| **v < lo || **v > hi)
            .map(|&v| Circle::new((0.5, v), 3, FORECAST_COLOR.filled())),
    )?;

    root.present()?;
    Ok(())
}

fn draw_forecast(path: &Path, history: &[HistoryPoint], forecast: &[ForecastPoint]) -> DrawResult {
    let root = SVGBackend::new(path, SVG_SIZE).into_drawing_area();
    root.fill(&WHITE)?;

    let hist: Vec<(f64, f64)> = history.iter().map(|h| (year_fraction(h.date), h.value)).collect();
    let fc: Vec<(f64, f64)> = forecast.iter().map(|p| (year_fraction(p.date), p.value)).collect();

    let (x0, x1) = bounds(hist.iter().chain(fc.iter()).map(|p| p.0), 0.02);
    let ys = hist
        .iter()
        .map(|p| p.1)
        .chain(forecast.iter().flat_map(|p| [p.lower, p.upper]));
    let (y0, y1) = bounds(ys, 0.05);

    let mut chart = ChartBuilder::on(&root)
        .caption("Unemployment rate forecast", ("sans-serif", 24).into_font())
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(50)
        .build_cartesian_2d(x0..x1, y0..y1)?;

    chart
        .configure_mesh()
        .x_desc("Year")
        .y_desc(COL_RATE)
        .x_label_formatter(&|v| format!("{v:.0}"))
        .draw()?;

    if !forecast.is_empty() {
        let band: Vec<(f64, f64)> = forecast
            .iter()
            .map(|p| (year_fraction(p.date), p.upper))
            .chain(forecast.iter().rev().map(|p| (year_fraction(p.date), p.lower)))
            .collect();
        chart
            .draw_series(std::iter::once(Polygon::new(band, FORECAST_COLOR.mix(0.15).filled())))?
            .label("95% interval")
            .legend(|(x, y)| Rectangle::new([(x, y - 5), (x + 20, y + 5)], FORECAST_COLOR.mix(0.15).filled()));
    }

    chart
        .draw_series(LineSeries::new(hist.iter().copied(), HISTORY_COLOR.stroke_width(2)))?
        .label("Observed (year-end)")
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], HISTORY_COLOR));
    chart
        .draw_series(LineSeries::new(fc.iter().copied(), FORECAST_COLOR.stroke_width(2)))?
        .label("Forecast")
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], FORECAST_COLOR));

    chart
        .configure_series_labels()
        .background_style(&WHITE.mix(0.8))
        .border_style(&BLACK)
        .draw()?;

    root.present()?;
    Ok(())
}

/// Date as a fractional year, e.g. 2022-12-31 -> ~2022.997.
fn year_fraction(d: NaiveDate) -> f64 {
    let days = if d.leap_year() { 366.0 } else { 365.0 };
    f64::from(d.year()) + f64::from(d.ordinal0()) / days
}

/// Finite min/max padded by `frac` of the span; never an empty range.
fn bounds(values: impl Iterator<Item = f64>, frac: f64) -> (f64, f64) {
    let (lo, hi) = values
        .filter(|v| v.is_finite())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| (lo.min(v), hi.max(v)));
    if !(lo.is_finite() && hi.is_finite()) {
        return (0.0, 1.0);
    }
    if hi - lo < 1e-12 {
        return (lo - 0.5, hi + 0.5);
    }
    let pad = (hi - lo) * frac;
    (lo - pad, hi + pad)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bounds_never_collapse() {
        assert_eq!(bounds([5.0, 5.0].into_iter(), 0.1), (4.5, 5.5));
        assert_eq!(bounds(std::iter::empty(), 0.1), (0.0, 1.0));
        let (lo, hi) = bounds([1.0, 3.0, f64::NAN].into_iter(), 0.5);
        assert!((lo - 0.0).abs() < 1e-12 && (hi - 4.0).abs() < 1e-12);
    }

    #[test]
    fn year_fraction_orders_month_ends() {
        let a = year_fraction(NaiveDate::from_ymd_opt(2022, 12, 31).unwrap());
        let b = year_fraction(NaiveDate::from_ymd_opt(2023, 1, 31).unwrap());
        assert!(a > 2022.99 && a < 2023.0);
        assert!(b > a);
    }
}
