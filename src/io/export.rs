//! Export a completed series to CSV.
//!
//! The export is meant to be easy to consume in spreadsheets or downstream scripts.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use crate::domain::{DisplayColor, SeriesResult};
use crate::error::AppError;

/// Write one line per day of `series`.
pub fn write_series_csv(path: &Path, series: &SeriesResult) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::new(4, format!("Failed to create export CSV '{}': {e}", path.display())))?;
    write_series(file, series)
}

fn write_series<W: Write>(mut out: W, series: &SeriesResult) -> Result<(), AppError> {
    writeln!(out, "date,weekday,value,business_day,color")
        .map_err(|e| AppError::new(4, format!("Failed to write export CSV header: {e}")))?;

    for p in series.iter() {
        let color = match p.display_color {
            DisplayColor::Normal => "normal",
            DisplayColor::Alert => "alert",
        };
        writeln!(
            out,
            "{},{},{},{},{}",
            p.date,
            p.weekday(),
            p.value,
            p.is_business_day,
            color,
        )
        .map_err(|e| AppError::new(4, format!("Failed to write export CSV row: {e}")))?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    use crate::domain::{HolidaySet, Interval, Observation};
    use crate::series::complete;

    #[test]
    fn csv_lines_follow_the_series() {
        // Fri 2025-03-07 .. Sat 2025-03-08
        let interval = Interval::new(
            NaiveDate::from_ymd_opt(2025, 3, 7).unwrap(),
            NaiveDate::from_ymd_opt(2025, 3, 8).unwrap(),
        )
        .unwrap();
        let obs = [Observation::new(interval.start, 12.5)];
        let series = complete(&obs, interval, &HolidaySet::new(), 20.0).unwrap();

        let mut buf = Vec::new();
        write_series(&mut buf, &series).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert_eq!(
            text,
            "date,weekday,value,business_day,color\n\
             2025-03-07,Fri,12.5,true,alert\n\
             2025-03-08,Sat,0,false,normal\n"
        );
    }
}
