//! JSON REST API for propusk.
//!
//! Exposes an axum [`Router`] over a [`PassDesk`]. Every handler is a thin
//! adapter: it lifts the bearer token and the request data, calls one engine
//! operation and maps the engine's error kind to a status code. TLS and
//! request tracing are the caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", propusk_api::api_router(desk.clone()))
//! ```

pub mod auth;
pub mod buildings;
pub mod error;
pub mod extract;
pub mod passes;
pub mod users;

use std::sync::Arc;

use axum::{
  Router,
  routing::{get, post, put},
};
use propusk_core::{
  auth::{TokenIssuer, TokenVerifier},
  media::ImageStore,
  store::PassStore,
};
use propusk_service::PassDesk;

pub use error::ApiError;

/// Build a fully-materialised API router for `desk`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S, T, M>(desk: Arc<PassDesk<S, T, M>>) -> Router<()>
where
  S: PassStore,
  T: TokenVerifier + TokenIssuer,
  M: ImageStore,
{
  Router::new()
    // Users
    .route("/users/register", post(users::register::<S, T, M>))
    .route("/users/login", post(users::login::<S, T, M>))
    .route("/users/me", put(users::edit_profile::<S, T, M>))
    // Buildings
    .route(
      "/buildings",
      get(buildings::list::<S, T, M>).post(buildings::create::<S, T, M>),
    )
    .route(
      "/buildings/{id}",
      get(buildings::get_one::<S, T, M>)
        .put(buildings::update::<S, T, M>)
        .delete(buildings::delete_one::<S, T, M>),
    )
    .route("/buildings/{id}/preview", put(buildings::replace_preview::<S, T, M>))
    // Passes
    .route("/passes", get(passes::list::<S, T, M>))
    .route("/passes/draft", get(passes::draft::<S, T, M>))
    .route("/passes/draft/items", post(passes::add_item::<S, T, M>))
    .route(
      "/passes/{id}",
      get(passes::get_one::<S, T, M>)
        .put(passes::edit::<S, T, M>)
        .delete(passes::delete_one::<S, T, M>),
    )
    .route("/passes/{id}/submit", post(passes::submit::<S, T, M>))
    .route("/passes/{id}/reject", post(passes::reject::<S, T, M>))
    .route("/passes/{id}/complete", post(passes::complete::<S, T, M>))
    .route(
      "/passes/{id}/items/{building_id}",
      put(passes::edit_item::<S, T, M>).delete(passes::remove_item::<S, T, M>),
    )
    .route("/public/passes/{id}", get(passes::get_public::<S, T, M>))
    .with_state(desk)
}
