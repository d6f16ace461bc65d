//! Shared "render cycle" logic used by both CLI and TUI front-ends.
//!
//! Keeping this in one place avoids duplicating the core workflow:
//! rows -> per-date observations -> completed series / month rollup / monthly trend
//!
//! The CLI and the TUI can then focus on presentation (printing vs widgets).

use tracing::{debug, info};

use crate::data::{HolidayProvider, SampleConfig, generate_rows, holiday_set_for};
use crate::domain::{
    BoardConfig, CategoryTotal, HolidaySet, Interval, MonthPeriod, MonthlyTotal, RecordRow, SeriesResult,
};
use crate::error::AppError;
use crate::io::{category_observations, daily_observations, load_rows};
use crate::math::TrendLine;
use crate::series::{complete, monthly_totals, monthly_trend, rollup_period};

/// Rows handed over by the data source for one cycle.
#[derive(Debug, Clone)]
pub struct SourceRows {
    pub rows: Vec<RecordRow>,
    pub skipped: usize,
    pub label: String,
}

/// All computed outputs of a single render cycle.
#[derive(Debug, Clone)]
pub struct CycleOutput {
    pub interval: Interval,
    pub series: SeriesResult,
    pub period: MonthPeriod,
    pub rollup: Vec<CategoryTotal>,
    pub monthly: Vec<MonthlyTotal>,
    pub trend: Option<TrendLine>,
    pub holidays: HolidaySet,
    pub holiday_label: String,
    pub source_label: String,
    pub skipped_rows: usize,
}

/// Fetch rows from the configured data source (CSV or demo generator).
pub fn load_source(config: &BoardConfig) -> Result<SourceRows, AppError> {
    match &config.data_path {
        Some(path) => {
            let ingested = load_rows(path, &config.columns)?;
            Ok(SourceRows {
                skipped: ingested.row_errors.len(),
                rows: ingested.rows,
                label: path.display().to_string(),
            })
        }
        None => {
            let sample = SampleConfig {
                seed: config.sample_seed,
                history_days: config.history_days,
                ..SampleConfig::default()
            };
            let rows = generate_rows(&sample, config.end)?;
            Ok(SourceRows {
                rows,
                skipped: 0,
                label: format!("demo data (seed {})", config.sample_seed),
            })
        }
    }
}

/// Resolve the holiday set covering the configured window.
pub fn resolve_holidays(provider: &dyn HolidayProvider, config: &BoardConfig) -> Result<HolidaySet, AppError> {
    holiday_set_for(provider, &config.interval().years())
}

/// Execute one render cycle against already-fetched rows and holidays.
pub fn run_cycle(
    config: &BoardConfig,
    source: &SourceRows,
    holidays: &HolidaySet,
    holiday_label: &str,
) -> Result<CycleOutput, AppError> {
    let interval = config.interval();

    // 1) Pre-aggregate to one observation per date.
    let observations = daily_observations(&source.rows, config.metric);

    // 2) Dense daily series with business-day / target flags.
    let series = complete(&observations, interval, holidays, config.threshold)?;

    // 3) Current-month rollup per category.
    let period = MonthPeriod::containing(config.end);
    let rollup = rollup_period(&category_observations(&source.rows, config.metric), period);

    // 4) Monthly totals up to the end of the window + trend line.
    let history: Vec<_> = observations.into_iter().filter(|o| o.date <= config.end).collect();
    let monthly = monthly_totals(&history);
    let trend = monthly_trend(&monthly);

    debug!(
        days = series.len(),
        alerts = series.alert_days(),
        categories = rollup.len(),
        months = monthly.len(),
        "cycle computed"
    );

    Ok(CycleOutput {
        interval,
        series,
        period,
        rollup,
        monthly,
        trend,
        holidays: holidays.clone(),
        holiday_label: holiday_label.to_string(),
        source_label: source.label.clone(),
        skipped_rows: source.skipped,
    })
}

/// Load, resolve holidays and compute in one go (batch commands).
pub fn run_board(config: &BoardConfig) -> Result<CycleOutput, AppError> {
    let source = load_source(config)?;
    info!(rows = source.rows.len(), source = %source.label, "rows loaded");

    let provider = crate::data::provider_for(config)?;
    let holidays = resolve_holidays(provider.as_ref(), config)?;

    run_cycle(config, &source, &holidays, &provider.describe())
}
