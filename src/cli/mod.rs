//! Command-line parsing for the unemployment forecaster.
//!
//! The goal of this module is to keep **argument parsing** and **command dispatch**
//! separate from the data and modeling code.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};

use crate::domain::{ArimaOrder, GapPolicy, RunConfig, Trend};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "unemp", version, about = "Unemployment data report and ARIMA forecast")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Load, clean, summarize and forecast the dataset (default).
    Run(RunArgs),
    /// Plot a previously exported forecast JSON.
    Plot(PlotArgs),
    /// Write a seeded synthetic dataset in the input format.
    Synth(SynthArgs),
}

/// Options for a full run.
#[derive(Debug, Parser, Clone)]
pub struct RunArgs {
    /// Input CSV with Date, Unemployment Rate (%), Population, Inflation Rate (%).
    #[arg(short = 'i', long, env = "UNEMP_INPUT", default_value = "economic_data.csv")]
    pub input: PathBuf,

    /// Forecast CSV to write.
    #[arg(short = 'o', long, env = "UNEMP_OUTPUT", default_value = "forecasted_unemployment.csv")]
    pub output: PathBuf,

    /// ARIMA order as `p,d,q` (only q = 0 is supported).
    #[arg(long, default_value = "5,1,0")]
    pub order: ArimaOrder,

    /// Trend term of the differenced model: `n` (none) or `c` (constant).
    #[arg(long, value_enum, default_value_t = Trend::N)]
    pub trend: Trend,

    /// Number of month-end points to forecast.
    #[arg(long, default_value_t = 12)]
    pub horizon: usize,

    /// Anchor date; forecast dates start at the first month-end on or after it.
    #[arg(long, default_value = "2022-12-01")]
    pub anchor: NaiveDate,

    /// How to treat years with no observation after year-end resampling.
    #[arg(long, value_enum, default_value_t = GapPolicy::Interpolate)]
    pub gaps: GapPolicy,

    /// Render ASCII plots in the terminal (enabled by default).
    #[arg(long, default_value_t = true)]
    pub plot: bool,

    /// Disable the terminal plots.
    #[arg(long)]
    pub no_plot: bool,

    /// Plot width (columns).
    #[arg(long, default_value_t = 80)]
    pub width: usize,

    /// Plot height (rows).
    #[arg(long, default_value_t = 20)]
    pub height: usize,

    /// Also write SVG charts into this directory.
    #[arg(long = "plot-dir", value_name = "DIR")]
    pub plot_dir: Option<PathBuf>,

    /// Export the model and forecast to JSON.
    #[arg(long = "export-json", value_name = "JSON")]
    pub export_json: Option<PathBuf>,

    /// Write a Markdown bundle of the run under `debug/`.
    #[arg(long = "debug-bundle")]
    pub debug_bundle: bool,

    /// Skip the full dataset dump.
    #[arg(short = 'q', long)]
    pub quiet: bool,
}

impl RunArgs {
    pub fn to_config(&self) -> RunConfig {
        RunConfig {
            input: self.input.clone(),
            output: self.output.clone(),
            order: self.order,
            trend: self.trend,
            horizon: self.horizon,
            anchor: self.anchor,
            gap_policy: self.gaps,
            plot: self.plot && !self.no_plot,
            plot_width: self.width,
            plot_height: self.height,
            plot_dir: self.plot_dir.clone(),
            export_json: self.export_json.clone(),
            debug_bundle: self.debug_bundle,
            quiet: self.quiet,
        }
    }
}

/// Options for plotting a saved forecast.
#[derive(Debug, Parser)]
pub struct PlotArgs {
    /// Forecast JSON file produced by `unemp run --export-json`.
    #[arg(long, value_name = "JSON")]
    pub forecast: PathBuf,

    /// Plot width (columns).
    #[arg(long, default_value_t = 80)]
    pub width: usize,

    /// Plot height (rows).
    #[arg(long, default_value_t = 20)]
    pub height: usize,
}

/// Options for the synthetic dataset.
#[derive(Debug, Parser)]
pub struct SynthArgs {
    /// CSV file to write.
    #[arg(short = 'o', long, default_value = "economic_data.csv")]
    pub output: PathBuf,

    #[arg(long, default_value_t = 1991)]
    pub start_year: i32,

    #[arg(long, default_value_t = 2022)]
    pub end_year: i32,

    /// Random seed; the same seed always writes the same file.
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// Probability that a value cell is left blank.
    #[arg(long, default_value_t = 0.0)]
    pub missing_rate: f64,

    /// Write population as `5.40B` rather than a bare number.
    #[arg(long, default_value_t = true)]
    pub population_suffix: bool,

    /// Write population as a bare number.
    #[arg(long)]
    pub plain_population: bool,
}
