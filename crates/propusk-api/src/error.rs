//! API error type and [`axum::response::IntoResponse`] implementation.

use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use propusk_core::Error;
use serde_json::json;
use thiserror::Error;

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error(transparent)]
  Domain(#[from] Error),

  #[error("bad request: {0}")]
  BadRequest(String),
}

/// HTTP status for each engine error kind.
pub fn status_for(e: &Error) -> StatusCode {
  match e {
    Error::AuthToken | Error::InvalidCredentials => StatusCode::UNAUTHORIZED,
    Error::NoPermission => StatusCode::FORBIDDEN,
    Error::InvalidPass
    | Error::BuildingNotFound
    | Error::InvalidPassBuilding => StatusCode::NOT_FOUND,
    Error::PassNotDraft
    | Error::StatusNotDraft
    | Error::CannotBeDeleted
    | Error::StatusNotFormed
    | Error::CannotBeFormed
    | Error::CannotBeEdited
    | Error::BuildingAlreadyAdded
    | Error::UserAlreadyExists => StatusCode::CONFLICT,
    Error::MalformedDate(_) | Error::ShortPassword => StatusCode::BAD_REQUEST,
    Error::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let (status, kind) = match &self {
      ApiError::Domain(e) => (status_for(e), e.kind()),
      ApiError::BadRequest(_) => (StatusCode::BAD_REQUEST, "bad_request"),
    };
    let message = match &self {
      ApiError::Domain(e) => e.to_string(),
      ApiError::BadRequest(m) => m.clone(),
    };
    (status, Json(json!({ "error": message, "kind": kind }))).into_response()
  }
}
