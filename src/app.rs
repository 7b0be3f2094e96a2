//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments
//! - fetches the requested dataset
//! - runs the filter-and-project pipeline
//! - prints reports/plots or hands off to the TUI
//! - writes optional exports

use clap::Parser;

use crate::cli::{Command, ExportArgs, QueryArgs};
use crate::data::ApiClient;
use crate::domain::QueryConfig;
use crate::error::AppError;

pub mod pipeline;

/// Entry point for the `gwt` binary.
pub fn run() -> Result<(), AppError> {
    // We want `gwt` and `gwt -d co2` to behave like `gwt tui ...`.
    //
    // Clap requires a subcommand name, so we do a small, explicit rewrite of the
    // argv list before parsing. This preserves a clean clap structure while
    // retaining the requested UX.
    let argv = rewrite_args(std::env::args().collect());
    let cli = crate::cli::Cli::parse_from(argv);

    match cli.command {
        Command::Show(args) => {
            init_tracing();
            handle_show(args)
        }
        Command::Export(args) => {
            init_tracing();
            handle_export(args)
        }
        Command::Tui(args) => crate::tui::run(&args),
    }
}

/// Stderr diagnostics for the non-interactive commands (`RUST_LOG` to enable).
///
/// The TUI skips this: log lines would fight the alternate screen.
fn init_tracing() {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn handle_show(args: QueryArgs) -> Result<(), AppError> {
    let config = query_config_from_args(&args);
    let client = ApiClient::from_env()?;
    let run = pipeline::run_query(&client, config.dataset, config.year)?;

    if run.series.is_empty() {
        println!(
            "{}",
            crate::report::format_no_data(config.dataset, config.year)
        );
        return Ok(());
    }

    println!(
        "{}",
        crate::report::format_run_summary(&run.series, run.records_fetched)
    );

    if config.table {
        println!("{}", crate::report::format_table(&run.series));
    }

    if config.plot {
        let plot =
            crate::plot::render_ascii_plot(&run.series, config.plot_width, config.plot_height);
        println!("{plot}");
    }

    Ok(())
}

fn handle_export(args: ExportArgs) -> Result<(), AppError> {
    if args.csv.is_none() && args.json.is_none() {
        return Err(AppError::new(
            2,
            "Nothing to export: pass --csv and/or --json.",
        ));
    }

    let dataset = args.dataset;
    let year = args.year.unwrap_or_else(|| dataset.default_year());

    let client = ApiClient::from_env()?;
    let run = pipeline::run_query(&client, dataset, year)?;

    if run.series.is_empty() {
        return Err(AppError::new(
            3,
            crate::report::format_no_data(dataset, year),
        ));
    }

    if let Some(path) = &args.csv {
        crate::io::export::write_series_csv(path, &run.series)?;
        tracing::info!(path = %path.display(), "wrote CSV export");
    }
    if let Some(path) = &args.json {
        crate::io::export::write_series_json(path, &run.series)?;
        tracing::info!(path = %path.display(), "wrote JSON export");
    }

    Ok(())
}

pub fn query_config_from_args(args: &QueryArgs) -> QueryConfig {
    QueryConfig {
        dataset: args.dataset,
        year: args.year.unwrap_or_else(|| args.dataset.default_year()),
        table: args.table,
        plot: args.plot && !args.no_plot,
        plot_width: args.width,
        plot_height: args.height,
        export_csv: None,
        export_json: None,
    }
}

/// Rewrite argv so `gwt` defaults to `gwt tui`.
///
/// Rules:
/// - `gwt`                     -> `gwt tui`
/// - `gwt -d co2 ...`          -> `gwt tui -d co2 ...`
/// - `gwt --help/--version/-h` -> unchanged (show top-level help/version)
fn rewrite_args(mut argv: Vec<String>) -> Vec<String> {
    let Some(arg1) = argv.get(1).cloned() else {
        argv.push("tui".to_string());
        return argv;
    };

    let is_top_level_help_or_version = matches!(
        arg1.as_str(),
        "-h" | "--help" | "-V" | "--version" | "help"
    );
    if is_top_level_help_or_version {
        return argv;
    }

    let is_subcommand = matches!(arg1.as_str(), "show" | "export" | "tui");
    if is_subcommand {
        return argv;
    }

    // If the first token is a flag, treat it as "tui flags".
    if arg1.starts_with('-') {
        argv.insert(1, "tui".to_string());
        return argv;
    }

    // Otherwise, leave as-is.
    argv
}
