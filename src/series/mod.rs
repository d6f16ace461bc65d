//! Series shaping for the dashboards.
//!
//! Responsibilities:
//!
//! - complete a sparse daily series over an interval (`complete`)
//! - roll up the current month per category (`rollup`)
//! - bucket totals per month and fit a trend line (`monthly`)

pub mod complete;
pub mod monthly;
pub mod rollup;

pub use complete::*;
pub use monthly::*;
pub use rollup::*;
