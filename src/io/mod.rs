//! Input/output helpers.
//!
//! - CSV ingest + pre-aggregation (`ingest`)
//! - series CSV export (`export`)
//! - series JSON read/write (`series_file`)

pub mod export;
pub mod ingest;
pub mod series_file;

pub use export::*;
pub use ingest::*;
pub use series_file::*;
