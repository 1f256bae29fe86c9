//! Translation of repository results into domain errors.
//!
//! Repositories report every missing row with [`StoreError::NotFound`]. Each
//! engine call site names the domain error that sentinel stands for; every
//! other store failure is logged and becomes [`Error::Internal`].

use propusk_core::{Error, Result, StoreError, store::StoreResult};

pub(crate) trait StoreResultExt<T> {
  /// `NotFound` becomes `missing`.
  fn or_missing(self, missing: Error) -> Result<T>;

  /// `Conflict` becomes `conflict`.
  fn or_conflict(self, conflict: Error) -> Result<T>;

  /// `NotFound` becomes `missing`; `StatusChanged`, a status move that lost
  /// a race, becomes `stale`.
  fn or_moved(self, missing: Error, stale: Error) -> Result<T>;

  /// Any failure is unexpected here.
  fn or_internal(self) -> Result<T>;
}

impl<T> StoreResultExt<T> for StoreResult<T> {
  fn or_missing(self, missing: Error) -> Result<T> {
    self.map_err(|e| match e {
      StoreError::NotFound => missing,
      e => internal(e),
    })
  }

  fn or_conflict(self, conflict: Error) -> Result<T> {
    self.map_err(|e| match e {
      StoreError::Conflict(_) => conflict,
      e => internal(e),
    })
  }

  fn or_moved(self, missing: Error, stale: Error) -> Result<T> {
    self.map_err(|e| match e {
      StoreError::NotFound => missing,
      StoreError::StatusChanged => stale,
      e => internal(e),
    })
  }

  fn or_internal(self) -> Result<T> { self.map_err(internal) }
}

/// `None` for `NotFound`, the value otherwise.
pub(crate) fn optional<T>(res: StoreResult<T>) -> Result<Option<T>> {
  match res {
    Ok(v) => Ok(Some(v)),
    Err(StoreError::NotFound) => Ok(None),
    Err(e) => Err(internal(e)),
  }
}

fn internal(e: StoreError) -> Error {
  tracing::error!(error = %e, "store failure");
  Error::Internal(e.to_string())
}
