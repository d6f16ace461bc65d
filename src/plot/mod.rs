//! Deterministic terminal plots (daily columns, category bars).

pub mod ascii;

pub use ascii::*;
