//! Store errors.

#[derive(Debug, thiserror::Error)]
pub enum Error {
  #[error(transparent)]
  Core(#[from] casetrack_core::Error),

  #[error(transparent)]
  Feed(#[from] casetrack_feeds::Error),

  #[error("io error: {0}")]
  Io(#[from] std::io::Error),

  #[error("operation on an empty dataset")]
  EmptyDataset,

  #[error("dataset lock poisoned")]
  Lock,
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
