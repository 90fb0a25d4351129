//! Export the forecast to CSV.
//!
//! Two columns only, so the file opens cleanly in spreadsheets:
//! `Date,Forecasted Unemployment Rate (%)`.

use std::fs::File;
use std::path::Path;

use tracing::info;

use crate::domain::{COL_DATE, COL_FORECAST, ForecastPoint};
use crate::error::AppError;

/// Write one row per forecast point, dates in ISO format.
pub fn write_forecast_csv(path: &Path, points: &[ForecastPoint]) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::input(format!("Failed to create export CSV '{}': {e}", path.display())))?;
    write_forecast(file, points)
        .map_err(|e| AppError::input(format!("Failed to write export CSV '{}': {e}", path.display())))?;

    info!(path = %path.display(), rows = points.len(), "wrote forecast CSV");
    Ok(())
}

fn write_forecast<W: std::io::Write>(sink: W, points: &[ForecastPoint]) -> Result<(), csv::Error> {
    let mut writer = csv::Writer::from_writer(sink);
    writer.write_record([COL_DATE, COL_FORECAST])?;
    for p in points {
        writer.write_record([p.date.to_string(), p.value.to_string()])?;
    }
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn point(m: u32, d: u32, value: f64) -> ForecastPoint {
        ForecastPoint {
            date: NaiveDate::from_ymd_opt(2023, m, d).unwrap(),
            value,
            std_err: 0.5,
            lower: value - 1.0,
            upper: value + 1.0,
        }
    }

    #[test]
    fn csv_has_header_and_iso_dates() {
        let mut buf = Vec::new();
        write_forecast(&mut buf, &[point(1, 31, 6.25), point(2, 28, 6.5)]).unwrap();
        let txt = String::from_utf8(buf).unwrap();
        assert_eq!(
            txt,
            "Date,Forecasted Unemployment Rate (%)\n2023-01-31,6.25\n2023-02-28,6.5\n"
        );
    }

    #[test]
    fn unwritable_path_is_an_input_error() {
        let err = write_forecast_csv(Path::new("/nonexistent-dir/out.csv"), &[]).unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }
}
