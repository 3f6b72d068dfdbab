//! Error types for the casetrack-feeds parsers.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  /// The header row does not match the expected shape — the upstream feed
  /// changed format, and parsing the body blind would silently corrupt the
  /// dataset. Always fatal for the file being read.
  #[error("schema mismatch in {feed}: {detail}")]
  Schema { feed: &'static str, detail: String },

  /// A single data row is malformed. Adapters skip and log these; this
  /// variant is surfaced only where a row failure is fatal (the area
  /// registry, where identity data must be complete).
  #[error("bad row {line}: {detail}")]
  Row { line: usize, detail: String },

  #[error("JSON error: {0}")]
  Json(#[from] serde_json::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
