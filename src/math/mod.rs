//! Mathematical utilities: least squares and linear trend lines.

pub mod ols;
pub mod trend;

pub use ols::*;
pub use trend::*;
