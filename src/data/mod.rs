//! External data suppliers.
//!
//! - holiday providers: public holiday API, CSV file, none (`holidays`)
//! - seeded synthetic meeting/sales rows for demo runs (`sample`)

pub mod holidays;
pub mod sample;

pub use holidays::*;
pub use sample::*;
