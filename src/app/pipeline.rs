//! Shared pipeline logic, free of console output.
//!
//! load -> clean -> derive -> resample -> describe -> forecast
//!
//! The CLI (and the integration tests) call `run_pipeline` and then decide
//! what to print or write.

use tracing::info;

use crate::data::{derive_observations, to_year_end};
use crate::domain::{AnnualSeries, Observation, RunConfig};
use crate::error::AppError;
use crate::fit::{ForecastOptions, ForecastRun, forecast_unemployment};
use crate::io::ingest::{CleanedData, RawTable, clean_table, load_table};
use crate::report::{ColumnSummary, describe_annual};

/// All computed outputs of a single run.
#[derive(Debug, Clone)]
pub struct RunOutput {
    pub table: RawTable,
    pub cleaned: CleanedData,
    pub observations: Vec<Observation>,
    pub annual: AnnualSeries,
    pub summaries: Vec<ColumnSummary>,
    pub forecast: ForecastRun,
}

/// Execute the full pipeline for `config.input`.
pub fn run_pipeline(config: &RunConfig) -> Result<RunOutput, AppError> {
    let table = load_table(&config.input)?;
    run_pipeline_with_table(config, table)
}

/// Execute the pipeline on an already-loaded table.
pub fn run_pipeline_with_table(config: &RunConfig, table: RawTable) -> Result<RunOutput, AppError> {
    let cleaned = clean_table(&table)?;
    let observations = derive_observations(&cleaned.rows);
    let annual = to_year_end(&observations, config.gap_policy)?;
    let summaries = describe_annual(&annual);
    let forecast = forecast_unemployment(&annual, &ForecastOptions::from(config))?;

    info!(
        rows = observations.len(),
        years = annual.len(),
        horizon = forecast.points.len(),
        "pipeline finished"
    );

    Ok(RunOutput {
        table,
        cleaned,
        observations,
        annual,
        summaries,
        forecast,
    })
}
