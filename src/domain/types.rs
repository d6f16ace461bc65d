//! Shared domain types.
//!
//! Lightweight, serializable types that are:
//!
//! - produced fresh on every refresh tick
//! - exported to JSON/CSV
//! - reloaded later for plotting

use std::collections::BTreeSet;
use std::fmt;
use std::path::PathBuf;

use chrono::{Datelike, Duration, Months, NaiveDate, Weekday};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::error::SeriesError;

/// One (date, value) pair from the data source, already aggregated per date.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub date: NaiveDate,
    pub value: f64,
}

impl Observation {
    pub fn new(date: NaiveDate, value: f64) -> Self {
        Self { date, value }
    }
}

/// Closed date interval `[start, end]`.
///
/// Fields are public so callers can hold an unchecked pair; `Interval::new`
/// validates and `series::complete` rejects `end < start`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Interval {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl Interval {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, SeriesError> {
        let interval = Self { start, end };
        interval.validate()?;
        Ok(interval)
    }

    /// The trailing `days`-day window ending at (and including) `end`.
    ///
    /// `days = 0` is treated as a single day.
    pub fn trailing(end: NaiveDate, days: u32) -> Self {
        let span = i64::from(days.max(1)) - 1;
        let start = end.checked_sub_signed(Duration::days(span)).unwrap_or(NaiveDate::MIN);
        Self { start, end }
    }

    pub fn validate(&self) -> Result<(), SeriesError> {
        if self.end < self.start {
            return Err(SeriesError::InvalidInterval {
                start: self.start,
                end: self.end,
            });
        }
        Ok(())
    }

    /// Number of calendar days covered (0 for an invalid interval).
    pub fn num_days(&self) -> usize {
        let days = (self.end - self.start).num_days() + 1;
        usize::try_from(days).unwrap_or(0)
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    /// Every calendar date in the interval, ascending.
    pub fn dates(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.start.iter_days().take_while(move |d| *d <= self.end)
    }

    /// Calendar years touched by the interval, ascending.
    pub fn years(&self) -> Vec<i32> {
        if self.end < self.start {
            return Vec::new();
        }
        (self.start.year()..=self.end.year()).collect()
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..={}", self.start, self.end)
    }
}

/// Region-specific non-working days. Only membership is ever asked of it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HolidaySet {
    dates: BTreeSet<NaiveDate>,
}

impl HolidaySet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.dates.contains(&date)
    }

    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.dates.iter().copied()
    }
}

impl FromIterator<NaiveDate> for HolidaySet {
    fn from_iter<I: IntoIterator<Item = NaiveDate>>(iter: I) -> Self {
        Self {
            dates: iter.into_iter().collect(),
        }
    }
}

impl Extend<NaiveDate> for HolidaySet {
    fn extend<I: IntoIterator<Item = NaiveDate>>(&mut self, iter: I) {
        self.dates.extend(iter);
    }
}

/// A named holiday as reported by a provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Holiday {
    pub date: NaiveDate,
    pub name: String,
}

/// Bar colour for the daily chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DisplayColor {
    Normal,
    Alert,
}

/// One day of a completed series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DailyPoint {
    pub date: NaiveDate,
    pub value: f64,
    pub is_business_day: bool,
    pub display_color: DisplayColor,
}

impl DailyPoint {
    pub fn is_alert(&self) -> bool {
        self.display_color == DisplayColor::Alert
    }

    pub fn weekday(&self) -> Weekday {
        self.date.weekday()
    }
}

/// Dense, gap-free series: one point per calendar day of the interval,
/// ascending by date.
#[derive(Debug, Clone, PartialEq)]
pub struct SeriesResult {
    points: Vec<DailyPoint>,
}

impl SeriesResult {
    /// Only the series module builds results, so the ordering/density
    /// invariant holds for every value in circulation.
    pub(crate) fn from_points(points: Vec<DailyPoint>) -> Self {
        Self { points }
    }

    pub fn points(&self) -> &[DailyPoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &DailyPoint> {
        self.points.iter()
    }

    pub fn get(&self, date: NaiveDate) -> Option<&DailyPoint> {
        self.points
            .binary_search_by_key(&date, |p| p.date)
            .ok()
            .map(|idx| &self.points[idx])
    }

    pub fn total(&self) -> f64 {
        self.points.iter().map(|p| p.value).sum()
    }

    pub fn business_days(&self) -> usize {
        self.points.iter().filter(|p| p.is_business_day).count()
    }

    pub fn alert_days(&self) -> usize {
        self.points.iter().filter(|p| p.is_alert()).count()
    }

    pub fn into_points(self) -> Vec<DailyPoint> {
        self.points
    }
}

/// How raw rows turn into a per-date value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Metric {
    /// Each row counts as 1 (meetings per day).
    Count,
    /// Row values are summed (MRR per day).
    Sum,
}

impl Metric {
    pub fn display_name(self) -> &'static str {
        match self {
            Metric::Count => "count",
            Metric::Sum => "sum",
        }
    }

    /// Value a single row contributes under this metric.
    pub fn row_value(self, value: f64) -> f64 {
        match self {
            Metric::Count => 1.0,
            Metric::Sum => value,
        }
    }
}

/// A raw row from the data source.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordRow {
    pub date: NaiveDate,
    pub value: f64,
    pub category: Option<String>,
}

/// A row attributed to a category (salesperson, agent, team).
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryObservation {
    pub date: NaiveDate,
    pub category: String,
    pub value: f64,
}

/// Per-category rollup result.
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryTotal {
    pub category: String,
    pub total: f64,
    pub rows: usize,
}

/// A calendar month, represented by its first day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MonthPeriod {
    first: NaiveDate,
}

impl MonthPeriod {
    pub fn containing(date: NaiveDate) -> Self {
        Self {
            first: date - Duration::days(i64::from(date.day0())),
        }
    }

    pub fn first_day(&self) -> NaiveDate {
        self.first
    }

    pub fn last_day(&self) -> NaiveDate {
        self.next()
            .map(|n| n.first - Duration::days(1))
            .unwrap_or(NaiveDate::MAX)
    }

    pub fn next(&self) -> Option<Self> {
        self.first
            .checked_add_months(Months::new(1))
            .map(|first| Self { first })
    }

    pub fn year(&self) -> i32 {
        self.first.year()
    }

    pub fn month(&self) -> u32 {
        self.first.month()
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        MonthPeriod::containing(date) == *self
    }

    /// `YYYY-MM`.
    pub fn label(&self) -> String {
        self.first.format("%Y-%m").to_string()
    }
}

impl fmt::Display for MonthPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.first.format("%Y-%m"))
    }
}

/// Monthly aggregate bucket.
#[derive(Debug, Clone, PartialEq)]
pub struct MonthlyTotal {
    pub period: MonthPeriod,
    pub total: f64,
    pub rows: usize,
}

/// Column names used to read the data source CSV.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnNames {
    pub date: String,
    pub value: String,
    pub category: Option<String>,
}

impl Default for ColumnNames {
    fn default() -> Self {
        Self {
            date: "date".to_string(),
            value: "value".to_string(),
            category: Some("category".to_string()),
        }
    }
}

/// Where the holiday set comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HolidaySource {
    /// Public holiday HTTP API for `region`.
    Api,
    /// CSV file with `date[,name]` rows.
    File(PathBuf),
    /// No holidays observed.
    None,
}

/// A full run's configuration as understood by the pipeline.
///
/// This is derived from CLI flags (plus defaults and `.env` overrides).
#[derive(Debug, Clone)]
pub struct BoardConfig {
    /// Data source CSV; `None` runs on synthetic demo rows.
    pub data_path: Option<PathBuf>,
    pub columns: ColumnNames,
    pub metric: Metric,

    /// Trailing window length in days.
    pub days: u32,
    /// Last day of the window ("today" unless overridden).
    pub end: NaiveDate,
    /// Minimum on-target value for a business day.
    pub threshold: f64,

    /// `CC` or `CC-SUBDIV` (e.g. `BR`, `BR-SP`).
    pub region: String,
    pub holiday_source: HolidaySource,

    pub sample_seed: u64,
    pub history_days: u32,

    pub refresh_secs: u64,
    pub plot_height: usize,
    pub plot_width: usize,

    pub export_csv: Option<PathBuf>,
    pub export_json: Option<PathBuf>,
}

impl BoardConfig {
    pub fn interval(&self) -> Interval {
        Interval::trailing(self.end, self.days)
    }
}

/// A saved series file (JSON).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeriesFile {
    pub tool: String,
    pub interval: Interval,
    pub metric: Metric,
    pub threshold: f64,
    pub region: String,
    pub points: Vec<DailyPoint>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn trailing_interval_includes_end() {
        let interval = Interval::trailing(d(2025, 3, 10), 10);
        assert_eq!(interval.start, d(2025, 3, 1));
        assert_eq!(interval.num_days(), 10);
        assert_eq!(interval.dates().count(), 10);
        assert_eq!(Interval::trailing(d(2025, 3, 10), 0).num_days(), 1);
    }

    #[test]
    fn interval_new_rejects_reversed_bounds() {
        let err = Interval::new(d(2025, 3, 10), d(2025, 3, 9)).unwrap_err();
        assert!(matches!(err, SeriesError::InvalidInterval { .. }));
    }

    #[test]
    fn interval_years_spans_new_year() {
        let interval = Interval::new(d(2024, 12, 28), d(2025, 1, 3)).unwrap();
        assert_eq!(interval.years(), vec![2024, 2025]);
    }

    #[test]
    fn month_period_bounds() {
        let feb = MonthPeriod::containing(d(2024, 2, 17));
        assert_eq!(feb.first_day(), d(2024, 2, 1));
        assert_eq!(feb.last_day(), d(2024, 2, 29));
        assert_eq!(feb.label(), "2024-02");
        assert!(feb.contains(d(2024, 2, 29)));
        assert!(!feb.contains(d(2024, 3, 1)));

        let dec = MonthPeriod::containing(d(2024, 12, 5));
        assert_eq!(dec.next(), Some(MonthPeriod::containing(d(2025, 1, 20))));
    }
}
