//! ASCII plotting for terminal output.
//!
//! Fixed-size character grid, meant for:
//! - quick visual checks in a terminal or a cron mail
//! - deterministic output (helpful for golden tests)
//!
//! Daily chart elements:
//! - bars on target / off business days: `#`
//! - business days below target: `!`
//! - target line: `-` (only where no bar covers it)
//! - bottom axis: weekday initials

use chrono::Datelike;

use crate::domain::{CategoryTotal, DailyPoint, SeriesFile};

/// Render one column per day.
pub fn render_daily_bars(points: &[DailyPoint], threshold: Option<f64>, height: usize) -> String {
    let height = height.max(2);
    let Some((first, last)) = points.first().zip(points.last()) else {
        return "Plot: (empty series)\n".to_string();
    };

    let target = threshold.filter(|t| t.is_finite() && *t > 0.0);
    let y_max = points
        .iter()
        .map(|p| p.value)
        .chain(target)
        .filter(|v| v.is_finite())
        .fold(0.0_f64, f64::max);
    let y_max = if y_max > 0.0 { y_max } else { 1.0 };

    let bar_levels: Vec<usize> = points.iter().map(|p| level(p.value, y_max, height)).collect();
    let target_level = target.map(|t| level(t, y_max, height)).filter(|l| *l > 0);

    let mut out = String::new();
    match target {
        Some(t) => out.push_str(&format!(
            "Plot: {} .. {} | max={y_max:.2} | target={t:.2}\n",
            first.date, last.date
        )),
        None => out.push_str(&format!("Plot: {} .. {} | max={y_max:.2}\n", first.date, last.date)),
    }

    for row in 0..height {
        // Level counted from the bottom: the last row is level 1.
        let row_level = height - row;
        let line: String = points
            .iter()
            .zip(&bar_levels)
            .map(|(p, &bar)| {
                if bar >= row_level {
                    if p.is_alert() { '!' } else { '#' }
                } else if target_level == Some(row_level) {
                    '-'
                } else {
                    ' '
                }
            })
            .collect();
        out.push_str(&line);
        out.push('\n');
    }

    let axis: String = points.iter().map(|p| weekday_initial(p.date.weekday())).collect();
    out.push_str(&axis);
    out.push('\n');

    out
}

/// Render a previously exported series file.
pub fn render_series_file(file: &SeriesFile, height: usize) -> String {
    render_daily_bars(&file.points, Some(file.threshold), height)
}

/// Horizontal bars, largest on top.
///
/// `totals` is expected in rollup order (ascending).
pub fn render_rollup_bars(totals: &[CategoryTotal], width: usize, fmt: fn(f64) -> String) -> String {
    if totals.is_empty() {
        return "(no categories)\n".to_string();
    }

    let label_width = totals
        .iter()
        .map(|t| t.category.chars().count())
        .max()
        .unwrap_or(0)
        .min(16);
    let bar_width = width.saturating_sub(label_width + 2).max(1);
    let max = totals
        .iter()
        .map(|t| t.total)
        .filter(|v| v.is_finite())
        .fold(0.0_f64, f64::max);

    let mut out = String::new();
    for t in totals.iter().rev() {
        let len = if max > 0.0 {
            ((t.total / max).clamp(0.0, 1.0) * bar_width as f64).round() as usize
        } else {
            0
        };
        let label: String = t.category.chars().take(label_width).collect();
        out.push_str(&format!(
            "{label:<label_width$} |{} {}\n",
            "=".repeat(len),
            fmt(t.total)
        ));
    }
    out
}

fn level(value: f64, y_max: f64, height: usize) -> usize {
    if !value.is_finite() || value <= 0.0 {
        return 0;
    }
    let u = (value / y_max).clamp(0.0, 1.0);
    (u * height as f64).round() as usize
}

fn weekday_initial(day: chrono::Weekday) -> char {
    match day {
        chrono::Weekday::Mon => 'M',
        chrono::Weekday::Tue | chrono::Weekday::Thu => 'T',
        chrono::Weekday::Wed => 'W',
        chrono::Weekday::Fri => 'F',
        chrono::Weekday::Sat | chrono::Weekday::Sun => 'S',
    }
}
