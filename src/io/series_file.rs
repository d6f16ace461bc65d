//! Read/write series JSON files.
//!
//! A series file is the portable representation of one completed daily
//! series: the interval and threshold it was computed with, plus every point.
//! `board plot --series FILE` re-renders it without the data source.

use std::fs::File;
use std::path::Path;

use crate::domain::{BoardConfig, SeriesFile, SeriesResult};
use crate::error::AppError;

/// Build the file representation of a series computed under `config`.
pub fn series_file(series: &SeriesResult, config: &BoardConfig) -> SeriesFile {
    SeriesFile {
        tool: "board".to_string(),
        interval: config.interval(),
        metric: config.metric,
        threshold: config.threshold,
        region: config.region.clone(),
        points: series.points().to_vec(),
    }
}

/// Write a series JSON file.
pub fn write_series_json(path: &Path, file: &SeriesFile) -> Result<(), AppError> {
    let out = File::create(path)
        .map_err(|e| AppError::new(4, format!("Failed to create series JSON '{}': {e}", path.display())))?;
    serde_json::to_writer_pretty(out, file)
        .map_err(|e| AppError::new(4, format!("Failed to write series JSON: {e}")))?;
    Ok(())
}

/// Read a series JSON file.
pub fn read_series_json(path: &Path) -> Result<SeriesFile, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::new(2, format!("Failed to open series JSON '{}': {e}", path.display())))?;
    let series: SeriesFile =
        serde_json::from_reader(file).map_err(|e| AppError::new(2, format!("Invalid series JSON: {e}")))?;
    Ok(series)
}
