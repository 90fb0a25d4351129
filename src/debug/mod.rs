//! Debug bundle writer for inspecting one run end to end.
//!
//! The bundle is a single Markdown file under `debug/` holding the run
//! configuration, what cleaning removed, the annual series, the fitted
//! coefficients and the forecast.

use std::fmt::Write as _;
use std::fs::{File, create_dir_all};
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::Local;
use tracing::info;

use crate::app::pipeline::RunOutput;
use crate::domain::RunConfig;
use crate::error::AppError;
use crate::math::{mean, sample_std};

/// Write the bundle into `debug/` and return its path.
pub fn write_debug_bundle(run: &RunOutput, config: &RunConfig) -> Result<PathBuf, AppError> {
    write_debug_bundle_in(Path::new("debug"), run, config)
}

/// Write the bundle into `dir` and return its path.
pub fn write_debug_bundle_in(dir: &Path, run: &RunOutput, config: &RunConfig) -> Result<PathBuf, AppError> {
    create_dir_all(dir).map_err(|e| AppError::input(format!("Failed to create debug dir: {e}")))?;

    let ts = Local::now().format("%Y%m%d_%H%M%S");
    let path = dir.join(format!("unemp_debug_{}_{ts}.md", config.order.to_string().replace([',', '(', ')'], "")));

    let mut file = File::create(&path).map_err(|e| AppError::input(format!("Failed to create debug file: {e}")))?;
    file.write_all(render_bundle(run, config).as_bytes())
        .map_err(|e| AppError::input(format!("Failed to write debug file: {e}")))?;

    info!(path = %path.display(), "wrote debug bundle");
    Ok(path)
}

/// The bundle body. Separate from the file write so it can be inspected in tests.
pub fn render_bundle(run: &RunOutput, config: &RunConfig) -> String {
    let mut md = String::new();
    let m = &run.forecast.model;

    // Writing to a String cannot fail.
    let _ = writeln!(md, "# unemp debug bundle");
    let _ = writeln!(md, "- generated: {}", Local::now().to_rfc3339());
    let _ = writeln!(md, "- input: {}", config.input.display());
    let _ = writeln!(md, "- output: {}", config.output.display());
    let _ = writeln!(md, "- order: {} trend: {:?}", config.order, config.trend);
    let _ = writeln!(md, "- horizon: {} anchor: {}", config.horizon, config.anchor);
    let _ = writeln!(md, "- gaps: {:?}", config.gap_policy);

    let _ = writeln!(md, "\n## Cleaning");
    let _ = writeln!(md, "| column | missing |");
    let _ = writeln!(md, "| - | - |");
    for (name, count) in &run.cleaned.missing.per_column {
        let _ = writeln!(md, "| {name} | {count} |");
    }
    let _ = writeln!(
        md,
        "\nrows read: {}, dropped: {}",
        run.cleaned.missing.rows_read, run.cleaned.missing.rows_dropped
    );

    let _ = writeln!(md, "\n## Annual series");
    let _ = writeln!(md, "| date | rate | population | inflation | unemployed | interpolated |");
    let _ = writeln!(md, "| - | - | - | - | - | - |");
    for p in &run.annual.points {
        let _ = writeln!(
            md,
            "| {} | {} | {} | {} | {} | {} |",
            p.date,
            opt(p.unemployment_rate),
            opt(p.population),
            opt(p.inflation_rate),
            opt(p.unemployed),
            p.interpolated
        );
    }
    if !run.annual.gap_years.is_empty() {
        let _ = writeln!(md, "\ngap years: {:?}", run.annual.gap_years);
    }

    let _ = writeln!(md, "\n## Model ARIMA{}", m.order);
    for (i, phi) in m.ar.iter().enumerate() {
        let _ = writeln!(md, "- ar.L{}: {phi:.10}", i + 1);
    }
    if m.trend.has_constant() {
        let _ = writeln!(md, "- const: {:.10}", m.constant);
    }
    let _ = writeln!(md, "- sigma2: {:.10}", m.sigma2);
    let _ = writeln!(md, "- loglik: {:.6} aic: {:.6} bic: {:.6}", m.log_likelihood, m.aic, m.bic);
    let _ = writeln!(md, "- n_obs: {} n_eff: {}", m.n_obs, m.n_eff);

    let res = &run.forecast.residuals;
    let max_abs = res.iter().fold(0.0_f64, |acc, r| acc.max(r.abs()));
    let _ = writeln!(md, "\n## Residuals (differenced scale)");
    let _ = writeln!(
        md,
        "- n: {} mean: {:.6} std: {:.6} max_abs: {:.6}",
        res.len(),
        mean(res),
        sample_std(res),
        max_abs
    );

    let _ = writeln!(md, "\n## Forecast");
    let _ = writeln!(md, "| date | value | std_err | lo95 | hi95 |");
    let _ = writeln!(md, "| - | - | - | - | - |");
    for p in &run.forecast.points {
        let _ = writeln!(
            md,
            "| {} | {:.6} | {:.6} | {:.6} | {:.6} |",
            p.date, p.value, p.std_err, p.lower, p.upper
        );
    }

    md
}

fn opt(v: Option<f64>) -> String {
    v.map(|x| format!("{x:.4}")).unwrap_or_else(|| "NaN".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::pipeline::run_pipeline_with_table;
    use crate::io::ingest::read_table;

    #[test]
    fn bundle_lists_coefficients_and_forecast_rows() {
        let mut csv = String::from("Date,Unemployment Rate (%),Population,Inflation Rate (%)\n");
        for (i, y) in (1991..=2022).enumerate() {
            csv.push_str(&format!("{y}-06-30,{:.3},5.3B,2.0\n", 5.0 + ((i as f64) * 0.9).cos()));
        }
        let config = RunConfig::with_input("mem.csv");
        let run = run_pipeline_with_table(&config, read_table(csv.as_bytes()).unwrap()).unwrap();

        let md = render_bundle(&run, &config);
        assert!(md.starts_with("# unemp debug bundle\n"));
        assert!(md.contains("## Model ARIMA(5,1,0)"));
        assert_eq!(md.matches("- ar.L").count(), 5);
        assert!(md.contains("| 2023-11-30 |"));
        assert!(md.contains(&format!("## Residuals (differenced scale)\n- n: {} ", run.forecast.model.n_eff)));

        let dir = tempfile::tempdir().unwrap();
        let path = write_debug_bundle_in(dir.path(), &run, &config).unwrap();
        assert!(path.exists());
    }
}
