//! Feed parsers for Casetrack.
//!
//! Converts the raw upstream formats (wide historical CSVs, daily snapshot
//! CSVs, the UK government JSON) into normalized rows ready to merge into a
//! dataset. Pure synchronous; no I/O or locking — callers read the bytes
//! and hold the lock.
//!
//! All parsers share one contract: a malformed header is a fatal
//! [`Error::Schema`] and the whole file is abandoned, while a malformed
//! data row is skipped with a `tracing::warn!` so one bad upstream line
//! never discards a day of figures.
//!
//! # Quick start
//!
//! ```no_run
//! use casetrack_feeds::wide;
//!
//! let text = std::fs::read_to_string("time_series_covid19_deaths_global.csv").unwrap();
//! for row in wide::parse_wide(&text).unwrap() {
//!   println!("{}/{}: {} days", row.country, row.province, row.values.len());
//! }
//! ```

pub mod csv;
pub mod daily;
pub mod error;
pub mod policy;
pub mod registry;
pub mod uk;
pub mod wide;

pub use daily::TodayRow;
pub use error::{Error, Result};
pub use uk::UkSnapshot;
pub use wide::WideRow;
