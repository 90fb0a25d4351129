//! Read/write forecast JSON files.
//!
//! A forecast file is the portable record of one run:
//! - the fitted model (order, coefficients, σ², AIC/BIC)
//! - the annual history it was fitted on
//! - the dated forecast with 95% intervals
//!
//! The schema is defined by `domain::ForecastFile`. `unemp plot --forecast`
//! renders one without refitting.

use std::fs::File;
use std::path::Path;

use tracing::info;

use crate::domain::ForecastFile;
use crate::error::AppError;
use crate::fit::ForecastRun;

/// Build the file contents for a finished run.
pub fn forecast_file(run: &ForecastRun, anchor: chrono::NaiveDate) -> ForecastFile {
    ForecastFile {
        tool: "unemp".to_string(),
        anchor,
        model: run.model.clone(),
        history: run.history.clone(),
        forecast: run.points.clone(),
    }
}

/// Write a forecast JSON file.
pub fn write_forecast_json(path: &Path, file: &ForecastFile) -> Result<(), AppError> {
    let out = File::create(path)
        .map_err(|e| AppError::input(format!("Failed to create forecast JSON '{}': {e}", path.display())))?;

    serde_json::to_writer_pretty(out, file)
        .map_err(|e| AppError::input(format!("Failed to write forecast JSON: {e}")))?;

    info!(path = %path.display(), points = file.forecast.len(), "wrote forecast JSON");
    Ok(())
}

/// Read a forecast JSON file.
pub fn read_forecast_json(path: &Path) -> Result<ForecastFile, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::input(format!("Failed to open forecast JSON '{}': {e}", path.display())))?;
    let parsed: ForecastFile =
        serde_json::from_reader(file).map_err(|e| AppError::input(format!("Invalid forecast JSON: {e}")))?;
    Ok(parsed)
}
