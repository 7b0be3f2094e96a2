//! Command-line parsing for the climate trends dashboard.
//!
//! The goal of this module is to keep **argument parsing** and **command dispatch**
//! separate from the fetch/filter code.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::domain::Dataset;

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(
    name = "gwt",
    version,
    about = "Climate-indicator trends (global-warming.org)"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Fetch a dataset, filter by year, and print a summary (plus optional table/plot).
    Show(QueryArgs),
    /// Fetch a dataset, filter by year, and write CSV/JSON exports.
    Export(ExportArgs),
    /// Launch the interactive TUI dashboard.
    ///
    /// This uses the same underlying query pipeline as `gwt show`, but renders
    /// results in a terminal UI using Ratatui.
    Tui(QueryArgs),
}

/// Common options for querying a dataset.
#[derive(Debug, Parser, Clone)]
pub struct QueryArgs {
    /// Dataset to query (temperature, co2, methane, nitrous, arctic).
    #[arg(short = 'd', long, value_enum, default_value_t = Dataset::Temperature)]
    pub dataset: Dataset,

    /// Year to filter by (defaults to the dataset's starting year).
    #[arg(short = 'y', long)]
    pub year: Option<i32>,

    /// Print the per-point value table.
    #[arg(long)]
    pub table: bool,

    /// Render an ASCII chart in the terminal (enabled by default).
    #[arg(long, default_value_t = true)]
    pub plot: bool,

    /// Disable the terminal chart.
    #[arg(long)]
    pub no_plot: bool,

    /// Plot width (columns).
    #[arg(long, default_value_t = 100)]
    pub width: usize,

    /// Plot height (rows).
    #[arg(long, default_value_t = 25)]
    pub height: usize,
}

/// Options for exporting a filtered series.
#[derive(Debug, Parser)]
pub struct ExportArgs {
    /// Dataset to query (temperature, co2, methane, nitrous, arctic).
    #[arg(short = 'd', long, value_enum, default_value_t = Dataset::Temperature)]
    pub dataset: Dataset,

    /// Year to filter by (defaults to the dataset's starting year).
    #[arg(short = 'y', long)]
    pub year: Option<i32>,

    /// Write the series to a CSV file.
    #[arg(long, value_name = "CSV")]
    pub csv: Option<PathBuf>,

    /// Write the series to a JSON file.
    #[arg(long, value_name = "JSON")]
    pub json: Option<PathBuf>,
}
