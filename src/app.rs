//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - loads `.env` and sets up logging
//! - parses CLI arguments
//! - runs the pipeline
//! - prints reports/plots
//! - writes the forecast CSV and optional exports

use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::cli::{Command, PlotArgs, RunArgs, SynthArgs};
use crate::data::{SynthConfig, write_synthetic_csv};
use crate::domain::RunConfig;
use crate::error::AppError;

pub mod pipeline;

/// Entry point for the `unemp` binary.
pub fn run() -> Result<(), AppError> {
    // A missing .env is fine; only explicit settings matter.
    let _ = dotenvy::dotenv();
    init_logging();

    // `unemp` and `unemp -i data.csv` behave like `unemp run ...`.
    let argv = rewrite_args(std::env::args().collect());
    let cli = crate::cli::Cli::parse_from(argv);

    match cli.command {
        Command::Run(args) => handle_run(args),
        Command::Plot(args) => handle_plot(args),
        Command::Synth(args) => handle_synth(args),
    }
}

/// Structured logs go to stderr so stdout stays the report.
fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn handle_run(args: RunArgs) -> Result<(), AppError> {
    let config = args.to_config();
    info!(input = %config.input.display(), order = %config.order, "starting run");

    let run = pipeline::run_pipeline(&config)?;
    print_report(&run, &config);

    crate::io::export::write_forecast_csv(&config.output, &run.forecast.points)?;

    if let Some(path) = &config.export_json {
        let file = crate::io::forecast_file(&run.forecast, config.anchor);
        crate::io::write_forecast_json(path, &file)?;
    }
    if let Some(dir) = &config.plot_dir {
        crate::plot::write_svg_plots(dir, &run.annual, &run.forecast.history, &run.forecast.points)?;
    }
    if config.debug_bundle {
        let path = crate::debug::write_debug_bundle(&run, &config)?;
        println!("Debug bundle written to {}", path.display());
    }

    println!("\nForecasted data saved to '{}'", config.output.display());
    Ok(())
}

fn print_report(run: &pipeline::RunOutput, config: &RunConfig) {
    if !config.quiet {
        println!("{}", crate::report::format_dataset(&run.table, None));
    }
    println!("{}", crate::report::format_missing_report(&run.cleaned.missing));

    if config.plot {
        println!("=== Unemployment rate over time ===");
        let plot = crate::plot::render_ascii_plot(&run.forecast.history, None, config.plot_width, config.plot_height);
        println!("{plot}");
    }

    println!("{}", crate::report::format_summary_table(&run.summaries));
    println!("{}", crate::report::format_explanations(&run.summaries));
    println!("{}", crate::report::format_forecast(&run.forecast));

    if config.plot {
        println!("=== Forecast ===");
        let plot = crate::plot::render_ascii_plot(
            &run.forecast.history,
            Some(run.forecast.points.as_slice()),
            config.plot_width,
            config.plot_height,
        );
        println!("{plot}");
    }
}

fn handle_plot(args: PlotArgs) -> Result<(), AppError> {
    let file = crate::io::read_forecast_json(&args.forecast)?;
    let plot = crate::plot::render_forecast_file(&file, args.width, args.height);
    println!("{plot}");
    Ok(())
}

fn handle_synth(args: SynthArgs) -> Result<(), AppError> {
    let config = SynthConfig {
        start_year: args.start_year,
        end_year: args.end_year,
        seed: args.seed,
        missing_rate: args.missing_rate,
        population_suffix: args.population_suffix && !args.plain_population,
    };
    let rows = write_synthetic_csv(&args.output, &config)?;
    println!("Wrote {rows} rows to '{}'", args.output.display());
    Ok(())
}

/// Rewrite argv so `unemp` defaults to `unemp run`.
///
/// Rules:
/// - `unemp`                      -> `unemp run`
/// - `unemp -i data.csv ...`      -> `unemp run -i data.csv ...`
/// - `unemp --help/--version/-h`  -> unchanged (show top-level help/version)
fn rewrite_args(mut argv: Vec<String>) -> Vec<String> {
    let Some(arg1) = argv.get(1).cloned() else {
        argv.push("run".to_string());
        return argv;
    };

    let is_top_level_help_or_version = matches!(arg1.as_str(), "-h" | "--help" | "-V" | "--version" | "help");
    if is_top_level_help_or_version {
        return argv;
    }

    let is_subcommand = matches!(arg1.as_str(), "run" | "plot" | "synth");
    if is_subcommand {
        return argv;
    }

    // If the first token is a flag, treat it as "run flags".
    if arg1.starts_with('-') {
        argv.insert(1, "run".to_string());
        return argv;
    }

    argv
}

#[cfg(test)]
mod tests {
    use super::*;

    fn argv(args: &[&str]) -> Vec<String> {
        args.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn bare_invocation_defaults_to_run() {
        assert_eq!(rewrite_args(argv(&["unemp"])), argv(&["unemp", "run"]));
        assert_eq!(
            rewrite_args(argv(&["unemp", "-i", "x.csv"])),
            argv(&["unemp", "run", "-i", "x.csv"])
        );
    }

    #[test]
    fn subcommands_and_help_pass_through() {
        assert_eq!(rewrite_args(argv(&["unemp", "synth"])), argv(&["unemp", "synth"]));
        assert_eq!(rewrite_args(argv(&["unemp", "--help"])), argv(&["unemp", "--help"]));
    }
}
