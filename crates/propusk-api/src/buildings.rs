//! Handlers for `/buildings` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`    | `/buildings` | Optional `?name=` substring; active buildings only |
//! | `POST`   | `/buildings` | Admin. Body: [`BuildingBody`]; returns 201 |
//! | `GET`    | `/buildings/:id` | 404 if missing or deleted |
//! | `PUT`    | `/buildings/:id` | Admin. Body: [`BuildingBody`] |
//! | `DELETE` | `/buildings/:id` | Admin. Soft delete |
//! | `PUT`    | `/buildings/:id/preview` | Admin. Raw PNG body; returns the new `image_url` |

use std::sync::Arc;

use axum::{
  Json,
  body::Bytes,
  extract::State,
  http::StatusCode,
  response::IntoResponse,
};
use propusk_core::{
  auth::{TokenIssuer, TokenVerifier},
  building::{Building, NewBuilding},
  media::ImageStore,
  store::PassStore,
};
use propusk_service::PassDesk;
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use crate::{
  auth::Bearer,
  error::ApiError,
  extract::{ApiJson, ApiPath, ApiQuery},
};

// ─── Reads ────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct FindParams {
  #[serde(default)]
  pub name: String,
}

/// `GET /buildings[?name=<substring>]`
pub async fn list<S, T, M>(
  State(desk): State<Arc<PassDesk<S, T, M>>>,
  ApiQuery(params): ApiQuery<FindParams>,
) -> Result<Json<Vec<Building>>, ApiError>
where
  S: PassStore,
  T: TokenVerifier + TokenIssuer,
  M: ImageStore,
{
  Ok(Json(desk.catalog.find_buildings(&params.name).await?))
}

/// `GET /buildings/:id`
pub async fn get_one<S, T, M>(
  State(desk): State<Arc<PassDesk<S, T, M>>>,
  ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<Building>, ApiError>
where
  S: PassStore,
  T: TokenVerifier + TokenIssuer,
  M: ImageStore,
{
  Ok(Json(desk.catalog.get_building(id).await?))
}

// ─── Admin ────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct BuildingBody {
  pub name:        String,
  #[serde(default)]
  pub description: String,
}

/// `POST /buildings`
pub async fn create<S, T, M>(
  State(desk): State<Arc<PassDesk<S, T, M>>>,
  Bearer(token): Bearer,
  ApiJson(body): ApiJson<BuildingBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: PassStore,
  T: TokenVerifier + TokenIssuer,
  M: ImageStore,
{
  let building = desk
    .catalog
    .add_building(&token, NewBuilding {
      name:        body.name,
      description: body.description,
    })
    .await?;
  Ok((StatusCode::CREATED, Json(building)))
}

/// `PUT /buildings/:id`
pub async fn update<S, T, M>(
  State(desk): State<Arc<PassDesk<S, T, M>>>,
  Bearer(token): Bearer,
  ApiPath(id): ApiPath<Uuid>,
  ApiJson(body): ApiJson<BuildingBody>,
) -> Result<StatusCode, ApiError>
where
  S: PassStore,
  T: TokenVerifier + TokenIssuer,
  M: ImageStore,
{
  desk
    .catalog
    .edit_building(&token, id, body.name, body.description)
    .await?;
  Ok(StatusCode::NO_CONTENT)
}

/// `DELETE /buildings/:id`
pub async fn delete_one<S, T, M>(
  State(desk): State<Arc<PassDesk<S, T, M>>>,
  Bearer(token): Bearer,
  ApiPath(id): ApiPath<Uuid>,
) -> Result<StatusCode, ApiError>
where
  S: PassStore,
  T: TokenVerifier + TokenIssuer,
  M: ImageStore,
{
  desk.catalog.delete_building(&token, id).await?;
  Ok(StatusCode::NO_CONTENT)
}

/// `PUT /buildings/:id/preview`: the body is the photo itself.
pub async fn replace_preview<S, T, M>(
  State(desk): State<Arc<PassDesk<S, T, M>>>,
  Bearer(token): Bearer,
  ApiPath(id): ApiPath<Uuid>,
  body: Bytes,
) -> Result<impl IntoResponse, ApiError>
where
  S: PassStore,
  T: TokenVerifier + TokenIssuer,
  M: ImageStore,
{
  if body.is_empty() {
    return Err(ApiError::BadRequest("empty photo".into()));
  }
  let url = desk.catalog.replace_preview(&token, id, body.to_vec()).await?;
  Ok(Json(json!({ "image_url": url })))
}
