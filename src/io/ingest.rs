//! CSV ingest and pre-aggregation.
//!
//! This module turns a query export (one row per meeting / sale) into typed
//! `RecordRow`s and then into the per-date observations the series core wants.
//!
//! Design goals:
//! - **Strict schema** for required columns (clear errors + exit code 2)
//! - **Row-level validation** (skip bad rows, but report what happened)
//! - **Separation of concerns**: no series logic here

use std::collections::{BTreeMap, HashMap};
use std::io::Read;
use std::path::Path;

use chrono::{NaiveDate, NaiveDateTime};
use csv::StringRecord;
use tracing::{debug, warn};

use crate::domain::{CategoryObservation, ColumnNames, Metric, Observation, RecordRow};
use crate::error::AppError;

/// A row-level error encountered during ingest.
#[derive(Debug, Clone)]
pub struct RowError {
    pub line: usize,
    pub message: String,
}

/// Ingest output: parsed rows + row errors.
#[derive(Debug, Clone)]
pub struct IngestedRows {
    pub rows: Vec<RecordRow>,
    pub row_errors: Vec<RowError>,
    pub rows_read: usize,
}

/// Column positions resolved from the header line.
#[derive(Debug, Clone, Copy)]
struct ColumnIndex {
    date: usize,
    value: usize,
    category: Option<usize>,
}

/// Load rows from a CSV file.
pub fn load_rows(path: &Path, columns: &ColumnNames) -> Result<IngestedRows, AppError> {
    let file = std::fs::File::open(path)
        .map_err(|e| AppError::new(2, format!("Failed to open CSV '{}': {e}", path.display())))?;
    let ingested = read_rows(file, columns)?;
    debug!(
        path = %path.display(),
        rows = ingested.rows.len(),
        errors = ingested.row_errors.len(),
        "loaded data source"
    );
    Ok(ingested)
}

/// Parse rows from any CSV reader.
pub fn read_rows<R: Read>(reader: R, columns: &ColumnNames) -> Result<IngestedRows, AppError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = reader
        .headers()
        .map_err(|e| AppError::new(2, format!("Failed to read CSV headers: {e}")))?
        .clone();
    let index = resolve_columns(&build_header_map(&headers), columns)?;

    let mut rows = Vec::new();
    let mut row_errors = Vec::new();
    let mut rows_read = 0usize;

    for (idx, result) in reader.records().enumerate() {
        // +2: header is line 1 and CSV lines are 1-based.
        let line = idx + 2;
        rows_read += 1;

        let record = match result {
            Ok(r) => r,
            Err(e) => {
                row_errors.push(RowError {
                    line,
                    message: format!("CSV parse error: {e}"),
                });
                continue;
            }
        };

        match parse_row(&record, index) {
            Ok(row) => rows.push(row),
            Err(message) => row_errors.push(RowError { line, message }),
        }
    }

    for err in row_errors.iter().take(5) {
        warn!(line = err.line, "skipped row: {}", err.message);
    }
    if row_errors.len() > 5 {
        warn!("... and {} more skipped rows", row_errors.len() - 5);
    }

    // A header with no data lines is a quiet period, not a failure.
    if rows.is_empty() && rows_read > 0 {
        return Err(AppError::new(3, "No valid rows in the data source."));
    }

    Ok(IngestedRows {
        rows,
        row_errors,
        rows_read,
    })
}

/// Pre-aggregate raw rows to one observation per date, ascending.
pub fn daily_observations(rows: &[RecordRow], metric: Metric) -> Vec<Observation> {
    let mut by_date: BTreeMap<NaiveDate, f64> = BTreeMap::new();
    for row in rows {
        *by_date.entry(row.date).or_insert(0.0) += metric.row_value(row.value);
    }
    by_date
        .into_iter()
        .map(|(date, value)| Observation::new(date, value))
        .collect()
}

/// Rows that carry a category, valued according to `metric`.
pub fn category_observations(rows: &[RecordRow], metric: Metric) -> Vec<CategoryObservation> {
    rows.iter()
        .filter_map(|row| {
            let category = row.category.as_deref()?.trim();
            if category.is_empty() {
                return None;
            }
            Some(CategoryObservation {
                date: row.date,
                category: category.to_string(),
                value: metric.row_value(row.value),
            })
        })
        .collect()
}

fn build_header_map(headers: &StringRecord) -> HashMap<String, usize> {
    headers
        .iter()
        .enumerate()
        .map(|(idx, name)| (normalize_header_name(name), idx))
        .collect()
}

fn normalize_header_name(name: &str) -> String {
    // Spreadsheet exports sometimes prefix the first header with a UTF-8 BOM.
    let name = name.trim().trim_start_matches('\u{feff}');
    name.to_ascii_lowercase()
}

fn resolve_columns(header_map: &HashMap<String, usize>, columns: &ColumnNames) -> Result<ColumnIndex, AppError> {
    let find = |name: &str| header_map.get(&normalize_header_name(name)).copied();

    let date = find(&columns.date)
        .ok_or_else(|| AppError::new(2, format!("Missing required column: `{}`", columns.date)))?;
    let value = find(&columns.value)
        .ok_or_else(|| AppError::new(2, format!("Missing required column: `{}`", columns.value)))?;

    // A missing category column only disables the rollup.
    let category = match &columns.category {
        Some(name) => {
            let idx = find(name);
            if idx.is_none() {
                debug!(column = %name, "category column not present; rollup disabled");
            }
            idx
        }
        None => None,
    };

    Ok(ColumnIndex { date, value, category })
}

fn parse_row(record: &StringRecord, index: ColumnIndex) -> Result<RecordRow, String> {
    let raw_date = record.get(index.date).unwrap_or("").trim();
    let date = parse_date(raw_date).ok_or_else(|| format!("Invalid date '{raw_date}'"))?;

    let raw_value = record.get(index.value).unwrap_or("").trim();
    let value = parse_value(raw_value)?;

    let category = index
        .category
        .and_then(|idx| record.get(idx))
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string);

    Ok(RecordRow { date, value, category })
}

/// Accepts `YYYY-MM-DD` and database timestamps (`YYYY-MM-DD HH:MM:SS`).
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Some(date);
    }
    for fmt in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Some(dt.date());
        }
    }
    None
}

fn parse_value(raw: &str) -> Result<f64, String> {
    // Empty cells come from NULL sums; treat them as zero activity.
    if raw.is_empty() {
        return Ok(0.0);
    }
    let v = raw
        .parse::<f64>()
        .map_err(|_| format!("Invalid numeric value '{raw}'"))?;
    if !v.is_finite() {
        return Err(format!("Non-finite value '{raw}'"));
    }
    if v < 0.0 {
        return Err(format!("Negative value '{raw}'"));
    }
    Ok(v)
}
