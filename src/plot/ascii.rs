//! ASCII plotting for terminal output.
//!
//! This is intentionally "dumb" (fixed-size grid), optimized for:
//! - quick visual sanity checks in a terminal
//! - deterministic output (helpful for golden tests)
//!
//! Plot elements:
//! - observed annual rate: `o` joined by `-`
//! - years filled by gap interpolation: `+`
//! - forecast: `*` joined by `.`

use chrono::{Datelike, NaiveDate};

use crate::domain::{ForecastFile, ForecastPoint, HistoryPoint};

/// Render observed history and (optionally) a forecast on one time axis.
pub fn render_ascii_plot(
    history: &[HistoryPoint],
    forecast: Option<&[ForecastPoint]>,
    width: usize,
    height: usize,
) -> String {
    let observed: Vec<(f64, f64)> = history.iter().map(|h| (day_x(h.date), h.value)).collect();
    let filled: Vec<(f64, f64)> = history
        .iter()
        .filter(|h| h.interpolated)
        .map(|h| (day_x(h.date), h.value))
        .collect();
    let projected: Vec<(f64, f64)> = forecast
        .unwrap_or(&[])
        .iter()
        .map(|p| (day_x(p.date), p.value))
        .collect();

    let first = history
        .first()
        .map(|h| h.date)
        .or_else(|| forecast.and_then(|f| f.first()).map(|p| p.date));
    let last = forecast
        .and_then(|f| f.last())
        .map(|p| p.date)
        .or_else(|| history.last().map(|h| h.date));

    render_plot(&observed, &filled, &projected, first.zip(last), width, height)
}

/// Render a saved forecast file (history + forecast).
pub fn render_forecast_file(file: &ForecastFile, width: usize, height: usize) -> String {
    render_ascii_plot(&file.history, Some(file.forecast.as_slice()), width, height)
}

fn render_plot(
    observed: &[(f64, f64)],
    filled: &[(f64, f64)],
    projected: &[(f64, f64)],
    span: Option<(NaiveDate, NaiveDate)>,
    width: usize,
    height: usize,
) -> String {
    let width = width.max(10);
    let height = height.max(5);

    let all = || observed.iter().chain(projected.iter());
    let (x_min, x_max) = range(all().map(|p| p.0)).unwrap_or((0.0, 1.0));
    let (y_min, y_max) = range(all().map(|p| p.1)).unwrap_or((0.0, 1.0));
    let (y_min, y_max) = pad_range(y_min, y_max, 0.05);

    let mut grid = vec![vec![' '; width]; height];

    // Connecting lines first so markers overlay them.
    draw_polyline(&mut grid, observed, (x_min, x_max), (y_min, y_max), '-');
    draw_polyline(&mut grid, projected, (x_min, x_max), (y_min, y_max), '.');

    for &(x, y) in observed {
        grid[map_y(y, y_min, y_max, height)][map_x(x, x_min, x_max, width)] = 'o';
    }
    for &(x, y) in filled {
        grid[map_y(y, y_min, y_max, height)][map_x(x, x_min, x_max, width)] = '+';
    }
    for &(x, y) in projected {
        grid[map_y(y, y_min, y_max, height)][map_x(x, x_min, x_max, width)] = '*';
    }

    let mut out = String::new();
    match span {
        Some((a, b)) => out.push_str(&format!(
            "Plot: date=[{}, {}] | rate=[{y_min:.2}, {y_max:.2}]%\n",
            fmt_month(a),
            fmt_month(b)
        )),
        None => out.push_str(&format!("Plot: rate=[{y_min:.2}, {y_max:.2}]%\n")),
    }

    for row in grid {
        out.push_str(row.into_iter().collect::<String>().trim_end());
        out.push('\n');
    }

    out
}

fn day_x(d: NaiveDate) -> f64 {
    f64::from(d.num_days_from_ce())
}

fn fmt_month(d: NaiveDate) -> String {
    format!("{:04}-{:02}", d.year(), d.month())
}

fn range(values: impl Iterator<Item = f64>) -> Option<(f64, f64)> {
    let (lo, hi) = values
        .filter(|v| v.is_finite())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| (lo.min(v), hi.max(v)));
    if !(lo.is_finite() && hi.is_finite()) {
        return None;
    }
    if hi > lo {
        Some((lo, hi))
    } else {
        Some((lo - 0.5, hi + 0.5))
    }
}

fn pad_range(min: f64, max: f64, frac: f64) -> (f64, f64) {
    let span = (max - min).abs();
    let pad = (span * frac).max(1e-12);
    (min - pad, max + pad)
}

fn map_x(x: f64, x_min: f64, x_max: f64, width: usize) -> usize {
    let width = width.max(2);
    let u = ((x - x_min) / (x_max - x_min)).clamp(0.0, 1.0);
    (u * (width as f64 - 1.0)).round() as usize
}

fn map_y(y: f64, y_min: f64, y_max: f64, height: usize) -> usize {
    let height = height.max(2);
    let u = ((y - y_min) / (y_max - y_min)).clamp(0.0, 1.0);
    // y=top is max -> row 0
    (height as f64 - 1.0 - (u * (height as f64 - 1.0))).round() as usize
}

fn draw_polyline(grid: &mut [Vec<char>], pts: &[(f64, f64)], xr: (f64, f64), yr: (f64, f64), ch: char) {
    let height = grid.len();
    let width = grid[0].len();
    for w in pts.windows(2) {
        let (x0, y0) = (map_x(w[0].0, xr.0, xr.1, width), map_y(w[0].1, yr.0, yr.1, height));
        let (x1, y1) = (map_x(w[1].0, xr.0, xr.1, width), map_y(w[1].1, yr.0, yr.1, height));
        draw_line(grid, x0, y0, x1, y1, ch);
    }
}

/// Integer line drawing (Bresenham-ish).
fn draw_line(grid: &mut [Vec<char>], x0: usize, y0: usize, x1: usize, y1: usize, ch: char) {
    let mut x0 = x0 as isize;
    let mut y0 = y0 as isize;
    let x1 = x1 as isize;
    let y1 = y1 as isize;

    let dx = (x1 - x0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let dy = -(y1 - y0).abs();
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;

    loop {
        if y0 >= 0
            && (y0 as usize) < grid.len()
            && x0 >= 0
            && (x0 as usize) < grid[0].len()
            && grid[y0 as usize][x0 as usize] == ' '
        {
            grid[y0 as usize][x0 as usize] = ch;
        }

        if x0 == x1 && y0 == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x0 += sx;
        }
        if e2 <= dx {
            err += dx;
            y0 += sy;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hp(y: i32, m: u32, d: u32, value: f64) -> HistoryPoint {
        HistoryPoint {
            date: NaiveDate::from_ymd_opt(y, m, d).unwrap(),
            value,
            interpolated: false,
        }
    }

    #[test]
    fn plot_golden_snapshot_small() {
        // Two points at the corners of the grid.
        let history = vec![hp(2000, 1, 1, 5.0), hp(2001, 1, 1, 6.0)];
        let txt = render_ascii_plot(&history, None, 10, 5);
        let expected = concat!(
            "Plot: date=[2000-01, 2001-01] | rate=[4.95, 6.05]%\n",
            "        -o\n",
            "      --\n",
            "    --\n",
            "  --\n",
            "o-\n",
        );
        assert_eq!(txt, expected);
    }

    #[test]
    fn forecast_markers_follow_history() {
        let history = vec![hp(2020, 12, 31, 5.0), hp(2021, 12, 31, 5.5), hp(2022, 12, 31, 6.0)];
        let forecast = vec![ForecastPoint {
            date: NaiveDate::from_ymd_opt(2023, 12, 31).unwrap(),
            value: 6.5,
            std_err: 0.1,
            lower: 6.3,
            upper: 6.7,
        }];
        let txt = render_ascii_plot(&history, Some(forecast.as_slice()), 20, 6);
        assert!(txt.starts_with("Plot: date=[2020-12, 2023-12]"));
        let body: String = txt.lines().skip(1).collect();
        assert_eq!(body.matches('o').count(), 3);
        assert_eq!(body.matches('*').count(), 1);
        // Last column of the top row holds the highest (forecast) value.
        assert!(txt.lines().nth(1).unwrap().ends_with('*'));
    }

    #[test]
    fn filled_years_use_their_own_marker() {
        let mut history = vec![hp(2000, 12, 31, 5.0), hp(2001, 12, 31, 6.0), hp(2002, 12, 31, 7.0)];
        history[1].interpolated = true;
        let txt = render_ascii_plot(&history, None, 21, 5);
        let body: String = txt.lines().skip(1).collect();
        assert_eq!(body.matches('o').count(), 2);
        assert_eq!(body.matches('+').count(), 1);
    }
}
