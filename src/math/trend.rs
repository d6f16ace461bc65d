//! Linear trend line over an ordered sequence of period totals.
//!
//! x is the position in the sequence (0, 1, 2, ...), so the slope reads as
//! "change per period".

use nalgebra::{DMatrix, DVector};
use serde::{Deserialize, Serialize};

use crate::math::solve_least_squares;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrendLine {
    pub slope: f64,
    pub intercept: f64,
}

impl TrendLine {
    pub fn value_at(&self, x: f64) -> f64 {
        self.intercept + self.slope * x
    }

    /// Evaluate the line at every index `0..n`.
    pub fn sample(&self, n: usize) -> Vec<f64> {
        (0..n).map(|i| self.value_at(i as f64)).collect()
    }
}

/// Fit `y = intercept + slope * x` by ordinary least squares.
///
/// Needs at least two finite values.
pub fn fit_trend(values: &[f64]) -> Option<TrendLine> {
    if values.len() < 2 || values.iter().any(|v| !v.is_finite()) {
        return None;
    }

    let n = values.len();
    let mut design = DMatrix::zeros(n, 2);
    for i in 0..n {
        design[(i, 0)] = 1.0;
        design[(i, 1)] = i as f64;
    }
    let y = DVector::from_column_slice(values);

    let beta = solve_least_squares(&design, &y)?;
    Some(TrendLine {
        intercept: beta[0],
        slope: beta[1],
    })
}
