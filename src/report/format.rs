//! Formatted terminal output.
//!
//! We keep formatting code in one place so:
//! - the series code stays clean and testable
//! - output changes are localized

use crate::app::pipeline::CycleOutput;
use crate::domain::{BoardConfig, CategoryTotal, Holiday, Metric, MonthlyTotal, SeriesResult};
use crate::math::TrendLine;

/// Summary block printed above the tables.
pub fn format_cycle_summary(run: &CycleOutput, config: &BoardConfig) -> String {
    let mut out = String::new();

    out.push_str("=== board - daily activity ===\n");
    out.push_str(&format!("Source: {}\n", run.source_label));
    out.push_str(&format!(
        "Window: {} ({} days) | metric: {} | target: {}\n",
        run.interval,
        run.series.len(),
        config.metric.display_name(),
        fmt_value(config.threshold, config.metric),
    ));
    out.push_str(&format!(
        "Holidays: {} ({} in window)\n",
        run.holiday_label,
        run.series.iter().filter(|p| run.holidays.contains(p.date)).count(),
    ));
    out.push_str(&format!(
        "Total: {} | business days: {} | below target: {}\n",
        fmt_value(run.series.total(), config.metric),
        run.series.business_days(),
        run.series.alert_days(),
    ));
    if run.skipped_rows > 0 {
        out.push_str(&format!("Skipped rows: {}\n", run.skipped_rows));
    }
    out.push('\n');

    out
}

/// One line per day.
pub fn format_series_table(series: &SeriesResult, metric: Metric) -> String {
    let mut out = String::new();
    out.push_str(format!("{:<10} {:<3} {:>14} {:<8} {:<6}", "date", "dow", "value", "business", "status").trim_end());
    out.push('\n');
    out.push_str(format!("{:-<10} {:-<3} {:-<14} {:-<8} {:-<6}", "", "", "", "", "").trim_end());
    out.push('\n');

    for p in series.iter() {
        let business = if p.is_business_day { "yes" } else { "no" };
        let status = if p.is_alert() { "BELOW" } else { "" };
        out.push_str(
            format!(
                "{:<10} {:<3} {:>14} {:<8} {:<6}",
                p.date.to_string(),
                p.weekday().to_string(),
                fmt_value(p.value, metric),
                business,
                status,
            )
            .trim_end(),
        );
        out.push('\n');
    }

    out
}

/// Per-category totals (already sorted by the rollup).
pub fn format_rollup_table(totals: &[CategoryTotal], metric: Metric, period_label: &str) -> String {
    let mut out = String::new();
    out.push_str(&format!("Per category ({period_label}):\n"));
    if totals.is_empty() {
        out.push_str("  (no categorised rows in this period)\n");
        return out;
    }

    out.push_str(format!("{:<24} {:>14} {:>6}", "category", "total", "rows").trim_end());
    out.push('\n');
    out.push_str(format!("{:-<24} {:-<14} {:-<6}", "", "", "").trim_end());
    out.push('\n');
    for t in totals {
        out.push_str(
            format!(
                "{:<24} {:>14} {:>6}",
                truncate(&t.category, 24),
                fmt_value(t.total, metric),
                t.rows
            )
            .trim_end(),
        );
        out.push('\n');
    }
    out
}

/// Monthly totals with the trend value next to each month.
pub fn format_monthly_table(totals: &[MonthlyTotal], trend: Option<&TrendLine>, metric: Metric) -> String {
    let mut out = String::new();
    out.push_str(format!("{:<7} {:>14} {:>14}", "month", "total", "trend").trim_end());
    out.push('\n');
    out.push_str(format!("{:-<7} {:-<14} {:-<14}", "", "", "").trim_end());
    out.push('\n');

    for (i, m) in totals.iter().enumerate() {
        let trend_value = trend
            .map(|t| fmt_value(t.value_at(i as f64), metric))
            .unwrap_or_else(|| "-".to_string());
        out.push_str(
            format!("{:<7} {:>14} {:>14}", m.period.label(), fmt_value(m.total, metric), trend_value).trim_end(),
        );
        out.push('\n');
    }

    if let Some(t) = trend {
        out.push_str(&format!("\nTrend: {} per month\n", fmt_signed(t.slope, metric)));
    }
    out
}

pub fn format_holidays(holidays: &[Holiday]) -> String {
    let mut out = String::new();
    if holidays.is_empty() {
        out.push_str("(no holidays)\n");
        return out;
    }
    for h in holidays {
        out.push_str(format!("{} {:<3} {}", h.date, h.date.format("%a"), h.name).trim_end());
        out.push('\n');
    }
    out
}

/// Counts print as integers; sums as currency-style with two decimals.
pub fn fmt_value(v: f64, metric: Metric) -> String {
    match metric {
        Metric::Count => fmt_thousands(v, 0),
        Metric::Sum => fmt_thousands(v, 2),
    }
}

fn fmt_signed(v: f64, metric: Metric) -> String {
    if v >= 0.0 {
        format!("+{}", fmt_value(v, metric))
    } else {
        fmt_value(v, metric)
    }
}

/// Format with `,` thousands separators and a fixed number of decimals.
pub fn fmt_thousands(v: f64, decimals: usize) -> String {
    if !v.is_finite() {
        return "-".to_string();
    }
    let raw = format!("{:.*}", decimals, v.abs());
    let (int_part, frac_part) = match raw.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (raw.as_str(), None),
    };

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    // "-0" / "-0.00" after rounding prints unsigned.
    let is_zero = raw.chars().all(|c| c == '0' || c == '.');
    let sign = if v < 0.0 && !is_zero { "-" } else { "" };
    match frac_part {
        Some(f) => format!("{sign}{grouped}.{f}"),
        None => format!("{sign}{grouped}"),
    }
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out: String = s.chars().take(max.saturating_sub(1)).collect();
    out.push('.');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    use crate::domain::{HolidaySet, Interval, MonthPeriod, Observation};
    use crate::series::complete;

    #[test]
    fn thousands_grouping() {
        assert_eq!(fmt_thousands(0.0, 0), "0");
        assert_eq!(fmt_thousands(999.0, 0), "999");
        assert_eq!(fmt_thousands(1000.0, 0), "1,000");
        assert_eq!(fmt_thousands(1234567.891, 2), "1,234,567.89");
        assert_eq!(fmt_thousands(-98765.4, 1), "-98,765.4");
        assert_eq!(fmt_thousands(-0.001, 2), "0.00");
        assert_eq!(fmt_thousands(f64::NAN, 2), "-");
    }

    #[test]
    fn series_table_marks_alert_days() {
        // Fri 2025-03-07 (below target) and Sat 2025-03-08.
        let interval = Interval::new(
            NaiveDate::from_ymd_opt(2025, 3, 7).unwrap(),
            NaiveDate::from_ymd_opt(2025, 3, 8).unwrap(),
        )
        .unwrap();
        let series = complete(&[Observation::new(interval.start, 3.0)], interval, &HolidaySet::new(), 5.0).unwrap();

        let table = format_series_table(&series, Metric::Count);
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines.len(), 4);
        assert!(lines[2].starts_with("2025-03-07 Fri"));
        assert!(lines[2].ends_with("yes      BELOW"));
        assert!(lines[3].ends_with("no"));
    }

    #[test]
    fn rollup_table_lists_in_given_order() {
        let totals = vec![
            CategoryTotal { category: "B".to_string(), total: 30.0, rows: 1 },
            CategoryTotal { category: "A".to_string(), total: 1500.0, rows: 2 },
        ];
        let table = format_rollup_table(&totals, Metric::Sum, "2025-03");
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines[0], "Per category (2025-03):");
        assert!(lines[3].starts_with("B "));
        assert!(lines[4].contains("1,500.00"));
    }

    #[test]
    fn monthly_table_includes_trend() {
        let jan = MonthPeriod::containing(NaiveDate::from_ymd_opt(2025, 1, 1).unwrap());
        let feb = MonthPeriod::containing(NaiveDate::from_ymd_opt(2025, 2, 1).unwrap());
        let totals = vec![
            MonthlyTotal { period: jan, total: 10.0, rows: 10 },
            MonthlyTotal { period: feb, total: 20.0, rows: 20 },
        ];
        let trend = TrendLine { slope: 10.0, intercept: 10.0 };
        let table = format_monthly_table(&totals, Some(&trend), Metric::Count);
        assert!(table.contains("2025-02"));
        assert!(table.ends_with("Trend: +10 per month\n"));
    }
}
