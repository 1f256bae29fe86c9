//! Handlers for `/passes` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`    | `/passes` | Optional `status`, `from`, `to`; admins see all passes |
//! | `GET`    | `/passes/draft` | The caller's draft id and item count |
//! | `POST`   | `/passes/draft/items` | Body: `{"building_id":"..."}`; opens a draft if needed |
//! | `GET`    | `/passes/:id` | Creator or admin |
//! | `PUT`    | `/passes/:id` | Body: [`EditBody`]; visitor info |
//! | `DELETE` | `/passes/:id` | Draft only |
//! | `POST`   | `/passes/:id/submit` | Draft → formed |
//! | `POST`   | `/passes/:id/reject` | Admin. Formed → rejected |
//! | `POST`   | `/passes/:id/complete` | Admin. Formed → completed |
//! | `PUT`    | `/passes/:id/items/:building_id` | Body: `{"comment":"..."}` |
//! | `DELETE` | `/passes/:id/items/:building_id` | |
//! | `GET`    | `/public/passes/:id` | No token; the target of the pass QR code |

use std::sync::Arc;

use axum::{
  Json,
  extract::State,
  http::StatusCode,
  response::IntoResponse,
};
use chrono::{DateTime, Utc};
use propusk_core::{
  auth::{TokenIssuer, TokenVerifier},
  media::ImageStore,
  pass::{PassDetails, PassStatus, PassSummary},
  store::PassStore,
};
use propusk_service::PassDesk;
use serde::{Deserialize, Serialize};
use serde_json::json;
use uuid::Uuid;

use crate::{
  auth::Bearer,
  error::ApiError,
  extract::{ApiJson, ApiPath, ApiQuery},
};

// ─── Listing ──────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ListParams {
  pub status: Option<PassStatus>,
  /// `YYYY-MM-DD` or `DD.MM.YYYY`, inclusive.
  pub from:   Option<String>,
  pub to:     Option<String>,
}

/// `GET /passes[?status=formed][&from=2024-06-01][&to=30.06.2024]`
pub async fn list<S, T, M>(
  State(desk): State<Arc<PassDesk<S, T, M>>>,
  Bearer(token): Bearer,
  ApiQuery(params): ApiQuery<ListParams>,
) -> Result<Json<Vec<PassSummary>>, ApiError>
where
  S: PassStore,
  T: TokenVerifier + TokenIssuer,
  M: ImageStore,
{
  let passes = desk
    .queries
    .list_passes(
      &token,
      params.status,
      params.from.as_deref(),
      params.to.as_deref(),
    )
    .await?;
  Ok(Json(passes))
}

// ─── Draft ────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct DraftBadge {
  pub pass_id:     Option<Uuid>,
  pub items_count: usize,
}

/// `GET /passes/draft`
pub async fn draft<S, T, M>(
  State(desk): State<Arc<PassDesk<S, T, M>>>,
  Bearer(token): Bearer,
) -> Result<Json<DraftBadge>, ApiError>
where
  S: PassStore,
  T: TokenVerifier + TokenIssuer,
  M: ImageStore,
{
  let pass_id = desk.queries.get_pass_id(&token).await?;
  let items_count = desk.queries.get_items_count(&token).await?;
  Ok(Json(DraftBadge { pass_id, items_count }))
}

#[derive(Debug, Deserialize)]
pub struct AddItemBody {
  pub building_id: Uuid,
}

/// `POST /passes/draft/items`: returns 201 + `{"pass_id":"..."}`.
pub async fn add_item<S, T, M>(
  State(desk): State<Arc<PassDesk<S, T, M>>>,
  Bearer(token): Bearer,
  ApiJson(body): ApiJson<AddItemBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: PassStore,
  T: TokenVerifier + TokenIssuer,
  M: ImageStore,
{
  let pass_id = desk
    .items
    .add_building_to_pass(&token, body.building_id)
    .await?;
  Ok((StatusCode::CREATED, Json(json!({ "pass_id": pass_id }))))
}

// ─── Single pass ──────────────────────────────────────────────────────────────

/// `GET /passes/:id`
pub async fn get_one<S, T, M>(
  State(desk): State<Arc<PassDesk<S, T, M>>>,
  Bearer(token): Bearer,
  ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<PassDetails>, ApiError>
where
  S: PassStore,
  T: TokenVerifier + TokenIssuer,
  M: ImageStore,
{
  Ok(Json(desk.lifecycle.get_protected(&token, id).await?))
}

/// `GET /public/passes/:id`
pub async fn get_public<S, T, M>(
  State(desk): State<Arc<PassDesk<S, T, M>>>,
  ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<PassDetails>, ApiError>
where
  S: PassStore,
  T: TokenVerifier + TokenIssuer,
  M: ImageStore,
{
  Ok(Json(desk.lifecycle.get_public(id).await?))
}

#[derive(Debug, Deserialize)]
pub struct EditBody {
  pub visitor_name: String,
  pub visit_date:   Option<DateTime<Utc>>,
}

/// `PUT /passes/:id`
pub async fn edit<S, T, M>(
  State(desk): State<Arc<PassDesk<S, T, M>>>,
  Bearer(token): Bearer,
  ApiPath(id): ApiPath<Uuid>,
  ApiJson(body): ApiJson<EditBody>,
) -> Result<StatusCode, ApiError>
where
  S: PassStore,
  T: TokenVerifier + TokenIssuer,
  M: ImageStore,
{
  desk
    .lifecycle
    .edit(&token, id, body.visitor_name, body.visit_date)
    .await?;
  Ok(StatusCode::NO_CONTENT)
}

/// `DELETE /passes/:id`
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
  desk.lifecycle.delete(&token, id).await?;
  Ok(StatusCode::NO_CONTENT)
}

/// `POST /passes/:id/submit`
pub async fn submit<S, T, M>(
  State(desk): State<Arc<PassDesk<S, T, M>>>,
  Bearer(token): Bearer,
  ApiPath(id): ApiPath<Uuid>,
) -> Result<StatusCode, ApiError>
where
  S: PassStore,
  T: TokenVerifier + TokenIssuer,
  M: ImageStore,
{
  desk.lifecycle.submit(&token, id).await?;
  Ok(StatusCode::NO_CONTENT)
}

/// `POST /passes/:id/reject`
pub async fn reject<S, T, M>(
  State(desk): State<Arc<PassDesk<S, T, M>>>,
  Bearer(token): Bearer,
  ApiPath(id): ApiPath<Uuid>,
) -> Result<StatusCode, ApiError>
where
  S: PassStore,
  T: TokenVerifier + TokenIssuer,
  M: ImageStore,
{
  desk.lifecycle.reject(&token, id).await?;
  Ok(StatusCode::NO_CONTENT)
}

/// `POST /passes/:id/complete`
pub async fn complete<S, T, M>(
  State(desk): State<Arc<PassDesk<S, T, M>>>,
  Bearer(token): Bearer,
  ApiPath(id): ApiPath<Uuid>,
) -> Result<StatusCode, ApiError>
where
  S: PassStore,
  T: TokenVerifier + TokenIssuer,
  M: ImageStore,
{
  desk.lifecycle.complete(&token, id).await?;
  Ok(StatusCode::NO_CONTENT)
}

// ─── Items ────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct CommentBody {
  #[serde(default)]
  pub comment: String,
}

/// `PUT /passes/:id/items/:building_id`
pub async fn edit_item<S, T, M>(
  State(desk): State<Arc<PassDesk<S, T, M>>>,
  Bearer(token): Bearer,
  ApiPath((id, building_id)): ApiPath<(Uuid, Uuid)>,
  ApiJson(body): ApiJson<CommentBody>,
) -> Result<StatusCode, ApiError>
where
  S: PassStore,
  T: TokenVerifier + TokenIssuer,
  M: ImageStore,
{
  desk
    .items
    .edit_item_comment(&token, id, building_id, body.comment)
    .await?;
  Ok(StatusCode::NO_CONTENT)
}

/// `DELETE /passes/:id/items/:building_id`
pub async fn remove_item<S, T, M>(
  State(desk): State<Arc<PassDesk<S, T, M>>>,
  Bearer(token): Bearer,
  ApiPath((id, building_id)): ApiPath<(Uuid, Uuid)>,
) -> Result<StatusCode, ApiError>
where
  S: PassStore,
  T: TokenVerifier + TokenIssuer,
  M: ImageStore,
{
  desk.items.remove_item(&token, id, building_id).await?;
  Ok(StatusCode::NO_CONTENT)
}
