//! Month-bucket aggregation (`YYYY-MM` totals) for the monthly bar/trend chart.

use std::collections::BTreeMap;

use crate::domain::{MonthPeriod, MonthlyTotal, Observation};
use crate::math::{TrendLine, fit_trend};

/// Sum observations per calendar month, ascending.
///
/// Months between the first and last observed month with no rows are emitted
/// with a zero total so the periods are evenly spaced for the trend fit.
pub fn monthly_totals(observations: &[Observation]) -> Vec<MonthlyTotal> {
    let mut buckets: BTreeMap<MonthPeriod, (f64, usize)> = BTreeMap::new();
    for obs in observations {
        let entry = buckets.entry(MonthPeriod::containing(obs.date)).or_insert((0.0, 0));
        entry.0 += obs.value;
        entry.1 += 1;
    }

    let (Some(&first), Some(&last)) = (buckets.keys().next(), buckets.keys().next_back()) else {
        return Vec::new();
    };

    let mut out = Vec::with_capacity(buckets.len());
    let mut cursor = Some(first);
    while let Some(period) = cursor {
        if period > last {
            break;
        }
        let (total, rows) = buckets.get(&period).copied().unwrap_or((0.0, 0));
        out.push(MonthlyTotal { period, total, rows });
        cursor = period.next();
    }
    out
}

/// Trend line through the monthly totals (x = month index).
pub fn monthly_trend(totals: &[MonthlyTotal]) -> Option<TrendLine> {
    let values: Vec<f64> = totals.iter().map(|m| m.total).collect();
    fit_trend(&values)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn obs(y: i32, m: u32, d: u32, v: f64) -> Observation {
        Observation::new(NaiveDate::from_ymd_opt(y, m, d).unwrap(), v)
    }

    #[test]
    fn buckets_by_month_and_fills_gaps() {
        let rows = vec![
            obs(2025, 3, 2, 5.0),
            obs(2024, 12, 31, 1.0),
            obs(2025, 3, 31, 5.0),
            obs(2024, 12, 1, 2.0),
        ];
        let totals = monthly_totals(&rows);

        let labels: Vec<String> = totals.iter().map(|m| m.period.label()).collect();
        assert_eq!(labels, vec!["2024-12", "2025-01", "2025-02", "2025-03"]);
        let values: Vec<f64> = totals.iter().map(|m| m.total).collect();
        assert_eq!(values, vec![3.0, 0.0, 0.0, 10.0]);
        assert_eq!(totals[3].rows, 2);
    }

    #[test]
    fn empty_input_has_no_months() {
        assert!(monthly_totals(&[]).is_empty());
        assert!(monthly_trend(&[]).is_none());
    }

    #[test]
    fn trend_follows_growth() {
        let rows = vec![obs(2025, 1, 10, 100.0), obs(2025, 2, 10, 200.0), obs(2025, 3, 10, 300.0)];
        let trend = monthly_trend(&monthly_totals(&rows)).unwrap();
        assert!((trend.slope - 100.0).abs() < 1e-9);
        assert!((trend.intercept - 100.0).abs() < 1e-9);
    }
}
