//! Error types for `propusk-core`.
//!
//! [`Error`] is the machine-checkable taxonomy every engine operation
//! returns. Transport adapters decide user-facing messages and status codes;
//! they match on the variant (or on [`Error::kind`]), never on the message.

use thiserror::Error;

use crate::user::MIN_PASSWORD_LEN;

#[derive(Debug, Error)]
pub enum Error {
  // ── Identity ──────────────────────────────────────────────────────────
  /// Missing, malformed or expired credential.
  #[error("token authentication error")]
  AuthToken,

  /// Authenticated, but not allowed to perform this action on this resource.
  #[error("there is no permission for this")]
  NoPermission,

  #[error("invalid login or password")]
  InvalidCredentials,

  // ── Missing or invisible entities ─────────────────────────────────────
  #[error("invalid pass")]
  InvalidPass,

  #[error("there is no such building")]
  BuildingNotFound,

  #[error("no such building in the pass")]
  InvalidPassBuilding,

  // ── State machine ─────────────────────────────────────────────────────
  #[error("pass is not a draft")]
  PassNotDraft,

  #[error("pass status is not draft")]
  StatusNotDraft,

  #[error("pass cannot be deleted")]
  CannotBeDeleted,

  #[error("pass has not been formed by its creator")]
  StatusNotFormed,

  #[error("pass cannot be formed")]
  CannotBeFormed,

  #[error("pass cannot be edited")]
  CannotBeEdited,

  // ── Membership & input ────────────────────────────────────────────────
  #[error("the building has already been added to the pass")]
  BuildingAlreadyAdded,

  #[error("malformed date filter: {0:?}")]
  MalformedDate(String),

  #[error("the user already exists")]
  UserAlreadyExists,

  #[error("password must be at least {MIN_PASSWORD_LEN} characters")]
  ShortPassword,

  // ── Everything else ───────────────────────────────────────────────────
  /// Unexpected repository, storage or encoding failure.
  #[error("internal error: {0}")]
  Internal(String),
}

impl Error {
  /// A stable, snake_case identifier for the error kind.
  pub fn kind(&self) -> &'static str {
    match self {
      Self::AuthToken => "auth_token",
      Self::NoPermission => "no_permission",
      Self::InvalidCredentials => "invalid_credentials",
      Self::InvalidPass => "invalid_pass",
      Self::BuildingNotFound => "building_not_found",
      Self::InvalidPassBuilding => "invalid_pass_building",
      Self::PassNotDraft => "pass_not_draft",
      Self::StatusNotDraft => "status_not_draft",
      Self::CannotBeDeleted => "cannot_be_deleted",
      Self::StatusNotFormed => "status_not_formed",
      Self::CannotBeFormed => "cannot_be_formed",
      Self::CannotBeEdited => "cannot_be_edited",
      Self::BuildingAlreadyAdded => "building_already_added",
      Self::MalformedDate(_) => "malformed_date",
      Self::UserAlreadyExists => "user_already_exists",
      Self::ShortPassword => "short_password",
      Self::Internal(_) => "internal",
    }
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
