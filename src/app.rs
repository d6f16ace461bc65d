//! Top-level application orchestration.
//!
//! `src/main.rs` only maps errors to exit codes; this module:
//! - parses CLI arguments
//! - initialises logging
//! - resolves the board configuration (flags + `.env`)
//! - runs one render cycle and prints reports/plots
//! - writes optional exports

use std::path::Path;
use std::sync::Mutex;

use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::cli::{BoardArgs, Command, PlotArgs};
use crate::domain::{BoardConfig, ColumnNames, HolidaySource, Metric};
use crate::error::AppError;

pub mod pipeline;

const DEFAULT_REGION: &str = "BR";

/// Entry point for the `board` binary.
pub fn run() -> Result<(), AppError> {
    // We want `board` and `board -f vendas.csv` to behave like `board tui ...`.
    let argv = rewrite_args(std::env::args().collect());
    let cli = crate::cli::Cli::parse_from(argv);

    let is_tui = matches!(cli.command, Command::Tui(_));
    init_tracing(cli.verbose, cli.log_file.as_deref(), is_tui)?;

    match cli.command {
        Command::Daily(args) => handle_daily(args),
        Command::Rollup(args) => handle_rollup(args),
        Command::Monthly(args) => handle_monthly(args),
        Command::Holidays(args) => handle_holidays(args),
        Command::Plot(args) => handle_plot(args),
        Command::Tui(args) => crate::tui::run(board_config_from_args(&args), args.end.is_none()),
    }
}

/// Install the global `tracing` subscriber.
///
/// Batch commands log to stderr. The TUI owns the terminal, so it only logs
/// when a log file is given.
fn init_tracing(verbose: u8, log_file: Option<&Path>, is_tui: bool) -> Result<(), AppError> {
    let default_level = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("sales_board={default_level}")));

    match log_file {
        Some(path) => {
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .map_err(|e| AppError::new(2, format!("Failed to open log file '{}': {e}", path.display())))?;
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .init();
        }
        None if is_tui => {}
        None => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .with_target(false)
                .init();
        }
    }
    Ok(())
}

fn handle_daily(args: BoardArgs) -> Result<(), AppError> {
    let config = board_config_from_args(&args);
    let run = pipeline::run_board(&config)?;

    println!("{}", crate::report::format_cycle_summary(&run, &config));
    println!("{}", crate::report::format_series_table(&run.series, config.metric));
    println!(
        "{}",
        crate::plot::render_daily_bars(run.series.points(), Some(config.threshold), config.plot_height)
    );

    // Optional exports.
    if let Some(path) = &config.export_csv {
        crate::io::write_series_csv(path, &run.series)?;
        info!(path = %path.display(), "series CSV written");
    }
    if let Some(path) = &config.export_json {
        crate::io::write_series_json(path, &crate::io::series_file(&run.series, &config))?;
        info!(path = %path.display(), "series JSON written");
    }

    Ok(())
}

fn handle_rollup(args: BoardArgs) -> Result<(), AppError> {
    let config = board_config_from_args(&args);
    let run = pipeline::run_board(&config)?;

    let label = run.period.label();
    println!("{}", crate::report::format_rollup_table(&run.rollup, config.metric, &label));
    let fmt: fn(f64) -> String = match config.metric {
        Metric::Count => fmt_count,
        Metric::Sum => fmt_sum,
    };
    println!("{}", crate::plot::render_rollup_bars(&run.rollup, config.plot_width, fmt));
    Ok(())
}

fn handle_monthly(args: BoardArgs) -> Result<(), AppError> {
    let config = board_config_from_args(&args);
    let run = pipeline::run_board(&config)?;

    println!(
        "{}",
        crate::report::format_monthly_table(&run.monthly, run.trend.as_ref(), config.metric)
    );
    Ok(())
}

fn handle_holidays(args: BoardArgs) -> Result<(), AppError> {
    let config = board_config_from_args(&args);
    let provider = crate::data::provider_for(&config)?;

    println!("Holidays ({}) for {}:", provider.describe(), config.interval());
    for year in config.interval().years() {
        let holidays = provider.holidays_for_year(year)?;
        println!("{}", crate::report::format_holidays(&holidays));
    }
    Ok(())
}

fn handle_plot(args: PlotArgs) -> Result<(), AppError> {
    let file = crate::io::read_series_json(&args.series)?;
    println!("{}", crate::plot::render_series_file(&file, args.height));
    Ok(())
}

fn fmt_count(v: f64) -> String {
    crate::report::fmt_value(v, Metric::Count)
}

fn fmt_sum(v: f64) -> String {
    crate::report::fmt_value(v, Metric::Sum)
}

/// Resolve flags + environment into the pipeline configuration.
pub fn board_config_from_args(args: &BoardArgs) -> BoardConfig {
    dotenvy::dotenv().ok();

    let region = args
        .region
        .clone()
        .or_else(|| std::env::var("BOARD_REGION").ok())
        .filter(|r| !r.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_REGION.to_string());

    let holiday_source = if args.no_holidays {
        HolidaySource::None
    } else if let Some(path) = &args.holidays_file {
        HolidaySource::File(path.clone())
    } else {
        HolidaySource::Api
    };

    let category = args.category_column.trim();

    BoardConfig {
        data_path: args.data.clone(),
        columns: ColumnNames {
            date: args.date_column.clone(),
            value: args.value_column.clone(),
            category: (!category.is_empty()).then(|| category.to_string()),
        },
        metric: args.metric,
        days: args.days.max(1),
        end: args.end.unwrap_or_else(today),
        threshold: args.threshold,
        region,
        holiday_source,
        sample_seed: args.seed,
        history_days: args.history_days,
        refresh_secs: args.refresh_secs.max(1),
        plot_height: args.height,
        plot_width: args.width,
        export_csv: args.export.clone(),
        export_json: args.export_json.clone(),
    }
}

/// The wall-clock date, read only at the edges (CLI startup, TUI refresh).
pub fn today() -> chrono::NaiveDate {
    chrono::Local::now().date_naive()
}

/// Rewrite argv so `board` defaults to `board tui`.
///
/// Rules:
/// - `board`                     -> `board tui`
/// - `board -f x.csv ...`        -> `board tui -f x.csv ...`
/// - `board -v daily ...`        -> unchanged (global flags before a subcommand)
/// - `board -v -f x.csv`         -> `board -v tui -f x.csv`
/// - `board --help/--version/-h` -> unchanged (show top-level help/version)
fn rewrite_args(mut argv: Vec<String>) -> Vec<String> {
    let pos = skip_global_flags(&argv);
    let Some(arg) = argv.get(pos).cloned() else {
        argv.push("tui".to_string());
        return argv;
    };

    let is_top_level_help_or_version = matches!(
        arg.as_str(),
        "-h" | "--help" | "-V" | "--version" | "help"
    );
    if is_top_level_help_or_version {
        return argv;
    }

    let is_subcommand = matches!(
        arg.as_str(),
        "daily" | "rollup" | "monthly" | "holidays" | "plot" | "tui"
    );
    if is_subcommand {
        return argv;
    }

    // If the first non-global token is a flag, treat it as "tui flags".
    if arg.starts_with('-') {
        argv.insert(pos, "tui".to_string());
        return argv;
    }

    argv
}

/// Index of the first argument after the leading `-v`/`--log-file` flags.
fn skip_global_flags(argv: &[String]) -> usize {
    let mut pos = 1;
    while let Some(arg) = argv.get(pos) {
        let is_verbose = arg == "--verbose"
            || (arg.len() > 1 && arg.starts_with('-') && arg[1..].chars().all(|c| c == 'v'));
        if is_verbose || arg.starts_with("--log-file=") {
            pos += 1;
        } else if arg == "--log-file" {
            pos += 2;
        } else {
            break;
        }
    }
    pos.min(argv.len())
}
