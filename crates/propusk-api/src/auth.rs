//! `Authorization: Bearer` extractor.
//!
//! The extractor only lifts the raw token out of the request; verification
//! happens inside the engine on every call.

use axum::{
  extract::FromRequestParts,
  http::{HeaderMap, header, request::Parts},
};
use propusk_core::Error;

use crate::error::ApiError;

/// The bearer token presented with the request.
pub struct Bearer(pub String);

/// Extract the token from headers. The scheme name is case-insensitive.
pub fn bearer_token(headers: &HeaderMap) -> Result<String, ApiError> {
  let value = headers
    .get(header::AUTHORIZATION)
    .and_then(|v| v.to_str().ok())
    .ok_or(Error::AuthToken)?;

  let (scheme, token) = value.split_once(' ').ok_or(Error::AuthToken)?;
  if !scheme.eq_ignore_ascii_case("bearer") || token.trim().is_empty() {
    return Err(Error::AuthToken.into());
  }
  Ok(token.trim().to_string())
}

impl<S> FromRequestParts<S> for Bearer
where
  S: Send + Sync,
{
  type Rejection = ApiError;

  async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
    bearer_token(&parts.headers).map(Bearer)
  }
}
