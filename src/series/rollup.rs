//! Current-period per-category rollup.
//!
//! Filter to one calendar month, group by category, sum, sort ascending so the
//! largest bar ends up on top of a horizontal bar chart.

use std::collections::HashMap;

use crate::domain::{CategoryObservation, CategoryTotal, MonthPeriod};

/// Sum `rows` per category for the rows falling in `period`.
///
/// Ordering is ascending by total; ties are broken by category name.
pub fn rollup_period(rows: &[CategoryObservation], period: MonthPeriod) -> Vec<CategoryTotal> {
    let mut groups: HashMap<&str, (f64, usize)> = HashMap::new();
    for row in rows.iter().filter(|r| period.contains(r.date)) {
        let entry = groups.entry(row.category.as_str()).or_insert((0.0, 0));
        entry.0 += row.value;
        entry.1 += 1;
    }

    let mut out: Vec<CategoryTotal> = groups
        .into_iter()
        .map(|(category, (total, rows))| CategoryTotal {
            category: category.to_string(),
            total,
            rows,
        })
        .collect();

    out.sort_by(|a, b| {
        a.total
            .partial_cmp(&b.total)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.category.cmp(&b.category))
    });
    out
}
