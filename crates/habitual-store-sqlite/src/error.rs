//! Error type for `habitual-store-sqlite`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  /// A domain rule was violated (duplicate name, unknown habit, ...).
  #[error(transparent)]
  Core(#[from] habitual_core::Error),

  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  /// A stored id column did not hold a UUID.
  #[error("corrupt id column: {0}")]
  Uuid(#[from] uuid::Error),

  /// A stored timestamp was not the RFC 3339 text this store writes.
  #[error("corrupt timestamp {value:?}: {source}")]
  Timestamp {
    value:  String,
    #[source]
    source: chrono::ParseError,
  },

  /// The `periodicity` column held something other than `daily` or `weekly`.
  #[error("corrupt periodicity {0:?}")]
  Periodicity(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
