//! Command-line parsing for the reporting board.
//!
//! The goal of this module is to keep **argument parsing** and **command dispatch**
//! separate from the series code.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};

use crate::domain::Metric;

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "board", version, about = "Daily sales/meeting reporting board")]
pub struct Cli {
    /// Write logs to this file (the TUI never logs to the terminal).
    #[arg(long, global = true, value_name = "FILE")]
    pub log_file: Option<PathBuf>,

    /// Increase log verbosity (-v debug, -vv trace). `RUST_LOG` takes precedence.
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Print the completed daily series (table + chart), optionally exporting it.
    Daily(BoardArgs),
    /// Print current-month totals per category.
    Rollup(BoardArgs),
    /// Print monthly totals with a linear trend line.
    Monthly(BoardArgs),
    /// List the holidays resolved for the window.
    Holidays(BoardArgs),
    /// Plot a previously exported series JSON.
    Plot(PlotArgs),
    /// Launch the auto-refreshing terminal dashboard.
    Tui(BoardArgs),
}

/// Common options for every data-driven command.
#[derive(Debug, Args, Clone)]
pub struct BoardArgs {
    /// Data source CSV (one row per meeting/sale). Demo data is used when omitted.
    #[arg(short = 'f', long, value_name = "CSV")]
    pub data: Option<PathBuf>,

    /// Name of the date column.
    #[arg(long, default_value = "date")]
    pub date_column: String,

    /// Name of the numeric value column.
    #[arg(long, default_value = "value")]
    pub value_column: String,

    /// Name of the category column (salesperson, agent) used by the rollup.
    #[arg(long, default_value = "category")]
    pub category_column: String,

    /// Count rows per day, or sum their values.
    #[arg(short, long, value_enum, default_value_t = Metric::Count)]
    pub metric: Metric,

    /// Window length in days, ending at `--end`.
    #[arg(short, long, default_value_t = 10)]
    pub days: u32,

    /// Last day of the window (YYYY-MM-DD). Defaults to today.
    #[arg(long, value_name = "DATE")]
    pub end: Option<NaiveDate>,

    /// Minimum on-target value for a business day.
    #[arg(short, long, default_value_t = 20.0)]
    pub threshold: f64,

    /// Holiday region: country code with optional subdivision (BR, BR-SP).
    /// Falls back to `BOARD_REGION`, then `BR`.
    #[arg(short, long)]
    pub region: Option<String>,

    /// Read holidays from a CSV file (`date[,name]`) instead of the holiday API.
    #[arg(long, value_name = "CSV", conflicts_with = "no_holidays")]
    pub holidays_file: Option<PathBuf>,

    /// Treat every weekday as a business day.
    #[arg(long)]
    pub no_holidays: bool,

    /// Seed for demo data.
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// Days of demo history to generate.
    #[arg(long, default_value_t = 400)]
    pub history_days: u32,

    /// Dashboard refresh interval in seconds.
    #[arg(long, default_value_t = 300)]
    pub refresh_secs: u64,

    /// Plot height (rows).
    #[arg(long, default_value_t = 12)]
    pub height: usize,

    /// Plot width (columns), used by the category bars.
    #[arg(long, default_value_t = 60)]
    pub width: usize,

    /// Export the completed series to CSV.
    #[arg(long, value_name = "CSV")]
    pub export: Option<PathBuf>,

    /// Export the completed series to JSON (re-plot with `board plot`).
    #[arg(long = "export-json", value_name = "JSON")]
    pub export_json: Option<PathBuf>,
}

/// Options for plotting a saved series.
#[derive(Debug, Parser)]
pub struct PlotArgs {
    /// Series JSON file produced by `board daily --export-json`.
    #[arg(long, value_name = "JSON")]
    pub series: PathBuf,

    /// Plot height (rows).
    #[arg(long, default_value_t = 12)]
    pub height: usize,
}
