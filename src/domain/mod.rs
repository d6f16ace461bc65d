//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - core series inputs/outputs (`Observation`, `Interval`, `HolidaySet`, `SeriesResult`)
//! - raw and categorised rows (`RecordRow`, `CategoryObservation`)
//! - aggregate outputs (`CategoryTotal`, `MonthlyTotal`)
//! - run configuration (`BoardConfig`)

pub mod types;

pub use types::*;
