//! Handlers for `/users` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/users/register` | Body: [`CredentialsBody`]; returns 201 + `{"id":"..."}` |
//! | `POST` | `/users/login` | Body: [`CredentialsBody`]; returns `{"token":"..."}` |
//! | `PUT`  | `/users/me` | Body: [`CredentialsBody`]; replaces login and password |

use std::sync::Arc;

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use propusk_core::{
  auth::{TokenIssuer, TokenVerifier},
  media::ImageStore,
  store::PassStore,
};
use propusk_service::PassDesk;
use serde::Deserialize;
use serde_json::json;

use crate::{auth::Bearer, error::ApiError, extract::ApiJson};

#[derive(Debug, Deserialize)]
pub struct CredentialsBody {
  pub login:    String,
  pub password: String,
}

/// `POST /users/register`
pub async fn register<S, T, M>(
  State(desk): State<Arc<PassDesk<S, T, M>>>,
  ApiJson(body): ApiJson<CredentialsBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: PassStore,
  T: TokenVerifier + TokenIssuer,
  M: ImageStore,
{
  let id = desk.users.register(&body.login, &body.password).await?;
  Ok((StatusCode::CREATED, Json(json!({ "id": id }))))
}

/// `POST /users/login`
pub async fn login<S, T, M>(
  State(desk): State<Arc<PassDesk<S, T, M>>>,
  ApiJson(body): ApiJson<CredentialsBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: PassStore,
  T: TokenVerifier + TokenIssuer,
  M: ImageStore,
{
  let token = desk.users.login(&body.login, &body.password).await?;
  Ok(Json(json!({ "token": token })))
}

/// `PUT /users/me`
pub async fn edit_profile<S, T, M>(
  State(desk): State<Arc<PassDesk<S, T, M>>>,
  Bearer(token): Bearer,
  ApiJson(body): ApiJson<CredentialsBody>,
) -> Result<StatusCode, ApiError>
where
  S: PassStore,
  T: TokenVerifier + TokenIssuer,
  M: ImageStore,
{
  desk
    .users
    .edit_profile(&token, &body.login, &body.password)
    .await?;
  Ok(StatusCode::NO_CONTENT)
}
