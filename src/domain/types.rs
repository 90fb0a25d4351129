//! Shared domain types.
//!
//! These types are kept small and serializable so they can be:
//!
//! - passed between pipeline stages in memory
//! - exported to CSV/JSON
//! - reloaded later for plotting

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use chrono::NaiveDate;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

pub const COL_DATE: &str = "Date";
pub const COL_RATE: &str = "Unemployment Rate (%)";
pub const COL_POPULATION: &str = "Population";
pub const COL_INFLATION: &str = "Inflation Rate (%)";
pub const COL_UNEMPLOYED: &str = "Unemployed";
pub const COL_YEAR: &str = "Year";
pub const COL_FORECAST: &str = "Forecasted Unemployment Rate (%)";

/// Columns every input file must carry.
pub const REQUIRED_COLUMNS: [&str; 4] = [COL_DATE, COL_RATE, COL_POPULATION, COL_INFLATION];

/// What to do with calendar years that have no observation after resampling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum GapPolicy {
    /// Leave the gap as a missing value (the forecaster will refuse the series).
    Keep,
    /// Fill the gap linearly between the neighbouring years.
    Interpolate,
    /// Remove the gap year from the series.
    Drop,
    /// Fail the run.
    Error,
}

/// Deterministic trend term of the differenced model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    /// No constant.
    N,
    /// Constant (drift after differencing).
    C,
}

impl Trend {
    pub fn has_constant(self) -> bool {
        matches!(self, Trend::C)
    }
}

/// ARIMA `(p, d, q)` order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArimaOrder {
    pub p: usize,
    pub d: usize,
    pub q: usize,
}

impl ArimaOrder {
    pub const fn new(p: usize, d: usize, q: usize) -> Self {
        Self { p, d, q }
    }

    /// Smallest series length that leaves more regression rows than parameters.
    ///
    /// `None` when the order is too large to count.
    pub fn min_observations(&self, trend: Trend) -> Option<usize> {
        let k = self.p.checked_add(usize::from(trend.has_constant()))?;
        self.d.checked_add(self.p)?.checked_add(k)?.checked_add(1)
    }
}

impl Default for ArimaOrder {
    fn default() -> Self {
        Self::new(5, 1, 0)
    }
}

impl fmt::Display for ArimaOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{},{})", self.p, self.d, self.q)
    }
}

impl FromStr for ArimaOrder {
    type Err = String;

    /// Parse `p,d,q` (parentheses optional), e.g. `5,1,0` or `(5,1,0)`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let inner = s.trim().trim_start_matches('(').trim_end_matches(')');
        let parts: Vec<&str> = inner.split(',').map(str::trim).collect();
        if parts.len() != 3 {
            return Err(format!("Invalid order '{s}'. Expected `p,d,q`, e.g. `5,1,0`."));
        }
        let parse = |v: &str| {
            v.parse::<usize>()
                .map_err(|_| format!("Invalid order component '{v}' in '{s}'."))
        };
        Ok(Self::new(parse(parts[0])?, parse(parts[1])?, parse(parts[2])?))
    }
}

/// One cleaned row of the input table.
#[derive(Debug, Clone, PartialEq)]
pub struct Observation {
    pub date: NaiveDate,
    /// Percent, nominally in `0..=100`.
    pub unemployment_rate: f64,
    /// Head count (magnitude suffixes already expanded).
    pub population: f64,
    pub inflation_rate: f64,
    /// Derived: `unemployment_rate / 100 * population`.
    pub unemployed: f64,
    /// Derived: calendar year of `date`.
    pub year: i32,
}

/// One year-end point of the resampled series.
///
/// Value fields are `None` when the year had no observation and the gap was
/// kept as-is.
#[derive(Debug, Clone, PartialEq)]
pub struct AnnualPoint {
    /// December 31 of `year`.
    pub date: NaiveDate,
    pub year: i32,
    pub unemployment_rate: Option<f64>,
    pub population: Option<f64>,
    pub inflation_rate: Option<f64>,
    pub unemployed: Option<f64>,
    /// True when the values were filled in by interpolation.
    pub interpolated: bool,
}

impl AnnualPoint {
    pub fn is_gap(&self) -> bool {
        self.unemployment_rate.is_none()
    }
}

/// The observation set reindexed to one point per year-end.
#[derive(Debug, Clone, Default)]
pub struct AnnualSeries {
    pub points: Vec<AnnualPoint>,
    /// Years that had no observation before the gap policy was applied.
    pub gap_years: Vec<i32>,
}

impl AnnualSeries {
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Unemployment-rate column (`None` for kept gaps).
    pub fn rates(&self) -> Vec<Option<f64>> {
        self.points.iter().map(|p| p.unemployment_rate).collect()
    }
}

/// One projected period.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastPoint {
    pub date: NaiveDate,
    /// Forecasted unemployment rate (%).
    pub value: f64,
    pub std_err: f64,
    pub lower: f64,
    pub upper: f64,
}

/// Fitted model parameters and diagnostics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelSummary {
    pub order: ArimaOrder,
    pub trend: Trend,
    /// AR coefficients `φ_1..φ_p` on the differenced scale.
    pub ar: Vec<f64>,
    pub constant: f64,
    pub sigma2: f64,
    pub log_likelihood: f64,
    pub aic: f64,
    pub bic: f64,
    /// Observations in the input series.
    pub n_obs: usize,
    /// Rows used by the conditional least squares fit.
    pub n_eff: usize,
}

/// A historical point kept alongside an exported forecast.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryPoint {
    pub date: NaiveDate,
    pub value: f64,
    /// Filled by gap interpolation rather than observed.
    #[serde(default)]
    pub interpolated: bool,
}

/// A saved forecast file (JSON).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForecastFile {
    pub tool: String,
    pub anchor: NaiveDate,
    pub model: ModelSummary,
    pub history: Vec<HistoryPoint>,
    pub forecast: Vec<ForecastPoint>,
}

/// A full run's configuration as understood by the pipeline.
///
/// This is derived from CLI flags (plus environment and defaults).
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub input: PathBuf,
    pub output: PathBuf,
    pub order: ArimaOrder,
    pub trend: Trend,
    pub horizon: usize,
    /// Calendar anchor for forecast dates.
    pub anchor: NaiveDate,
    pub gap_policy: GapPolicy,

    pub plot: bool,
    pub plot_width: usize,
    pub plot_height: usize,
    pub plot_dir: Option<PathBuf>,
    pub export_json: Option<PathBuf>,
    pub debug_bundle: bool,
    /// Skip the full dataset dump on the console.
    pub quiet: bool,
}

impl RunConfig {
    /// Defaults matching the reference run, reading from `input`.
    pub fn with_input(input: impl Into<PathBuf>) -> Self {
        Self {
            input: input.into(),
            output: PathBuf::from("forecasted_unemployment.csv"),
            order: ArimaOrder::default(),
            trend: Trend::N,
            horizon: 12,
            anchor: default_anchor(),
            gap_policy: GapPolicy::Interpolate,
            plot: true,
            plot_width: 80,
            plot_height: 20,
            plot_dir: None,
            export_json: None,
            debug_bundle: false,
            quiet: false,
        }
    }
}

/// 2022-12-01, the anchor of the reference run.
pub fn default_anchor() -> NaiveDate {
    NaiveDate::from_ymd_opt(2022, 12, 1).unwrap_or_default()
}
