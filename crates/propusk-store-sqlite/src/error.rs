//! Error type for `propusk-store-sqlite`.

use propusk_core::StoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("uuid parse error: {0}")]
  Uuid(#[from] uuid::Error),

  #[error("date/time parse error: {0}")]
  DateParse(String),

  #[error("unknown pass status code: {0}")]
  UnknownStatus(i64),

  #[error("row not found")]
  NotFound,

  #[error("pass is no longer in the expected status")]
  StatusChanged,
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

impl Error {
  /// `true` for UNIQUE and PRIMARY KEY violations.
  fn is_unique_violation(&self) -> bool {
    use rusqlite::ffi::{SQLITE_CONSTRAINT_PRIMARYKEY, SQLITE_CONSTRAINT_UNIQUE};

    matches!(
      self,
      Error::Database(tokio_rusqlite::Error::Rusqlite(
        rusqlite::Error::SqliteFailure(f, _)
      )) if f.extended_code == SQLITE_CONSTRAINT_UNIQUE
        || f.extended_code == SQLITE_CONSTRAINT_PRIMARYKEY
    )
  }
}

impl From<Error> for StoreError {
  fn from(e: Error) -> Self {
    match e {
      Error::NotFound => StoreError::NotFound,
      Error::StatusChanged => StoreError::StatusChanged,
      e if e.is_unique_violation() => StoreError::Conflict(e.to_string()),
      e => StoreError::backend(e),
    }
  }
}
