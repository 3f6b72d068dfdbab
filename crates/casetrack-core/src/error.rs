//! Error types for `casetrack-core`.

use chrono::NaiveDate;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  /// A merge or range write was offered data whose dates do not line up
  /// with the stored days. Signals a caller bug or feed-format drift;
  /// never retryable.
  #[error("date mismatch: expected {expected}, found {found}")]
  DateMismatch {
    expected: NaiveDate,
    found:    NaiveDate,
  },

  #[error("series not found: {country:?}/{province:?}")]
  NotFound { country: String, province: String },

  #[error("series not found for area id {0}")]
  NotFoundId(u32),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
