//! Core types for the casetrack time-series engine.
//!
//! This crate holds the in-memory data model — one [`Day`](day::Day) of
//! cumulative counts, one [`AreaSeries`](series::AreaSeries) per geographic
//! area — and the merge/slice operations over them. It is deliberately free
//! of file and network I/O; feed parsing lives in `casetrack-feeds` and the
//! locked dataset in `casetrack-store`.

pub mod area;
pub mod day;
pub mod error;
pub mod series;

pub use area::{Area, AreaFlags};
pub use day::{Day, Metric};
pub use error::{Error, Result};
pub use series::AreaSeries;

use chrono::NaiveDate;

/// First day of the dataset. Day offset 0 in every series is this date;
/// the persisted sparse format counts days 1-based from here.
pub fn epoch() -> NaiveDate {
  NaiveDate::from_ymd_opt(2020, 1, 22).expect("valid epoch date")
}

/// Normalize a country or province name into a comparison/url key:
/// lowercased, with runs of whitespace and hyphens collapsed to `-`.
pub fn key(v: &str) -> String {
  let mut out = String::with_capacity(v.len());
  let mut pending_sep = false;
  for c in v.trim().chars() {
    if c.is_whitespace() || c == '-' {
      pending_sep = !out.is_empty();
    } else {
      if pending_sep {
        out.push('-');
        pending_sep = false;
      }
      out.extend(c.to_lowercase());
    }
  }
  out
}
