//! `sales-board` library crate.
//!
//! The binary (`board`) is a thin wrapper around this library so that:
//!
//! - the series core is testable without spawning processes or a terminal
//! - every report (CLI tables, TUI dashboard) reuses the same render cycle

pub mod app;
pub mod cli;
pub mod data;
pub mod domain;
pub mod error;
pub mod io;
pub mod math;
pub mod plot;
pub mod report;
pub mod series;
pub mod tui;
