//! The pass lifecycle and access-control engine.
//!
//! Every component here is stateless between calls. Durable state lives in
//! the [`PassStore`], binary objects in the [`ImageStore`], and identity is
//! re-derived from the bearer token on every call through the
//! [`AuthorizationGuard`].
//!
//! [`PassDesk`] bundles the components over one shared set of collaborators
//! and is what transport adapters hold.

pub mod catalog;
pub mod config;
pub mod guard;
pub mod items;
pub mod lifecycle;
mod lookup;
pub mod password;
pub mod qr;
pub mod query;
pub mod users;

use std::sync::Arc;

use propusk_core::{
  auth::{TokenIssuer, TokenVerifier},
  media::ImageStore,
  store::PassStore,
};

pub use catalog::BuildingCatalog;
pub use config::ServiceConfig;
pub use guard::AuthorizationGuard;
pub use items::PassItemManager;
pub use lifecycle::PassLifecycleEngine;
pub use query::PassQueryService;
pub use users::UserService;

/// All engine components wired over the same store, token service and image
/// store.
pub struct PassDesk<S, T, M> {
  pub catalog:   BuildingCatalog<S, T, M>,
  pub lifecycle: PassLifecycleEngine<S, T, M>,
  pub items:     PassItemManager<S, T>,
  pub queries:   PassQueryService<S, T>,
  pub users:     UserService<S, T>,
}

impl<S, T, M> PassDesk<S, T, M>
where
  S: PassStore,
  T: TokenVerifier + TokenIssuer,
  M: ImageStore,
{
  pub fn new(
    store: Arc<S>,
    tokens: Arc<T>,
    images: Arc<M>,
    config: ServiceConfig,
  ) -> Self {
    let config = Arc::new(config);
    let guard = AuthorizationGuard::new(tokens.clone());
    Self {
      catalog:   BuildingCatalog::new(
        store.clone(),
        guard.clone(),
        images.clone(),
        config.clone(),
      ),
      lifecycle: PassLifecycleEngine::new(store.clone(), guard.clone(), images, config),
      items:     PassItemManager::new(store.clone(), guard.clone()),
      queries:   PassQueryService::new(store.clone(), guard.clone()),
      users:     UserService::new(store, guard, tokens),
    }
  }
}

#[cfg(test)]
mod tests;
