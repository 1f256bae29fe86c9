//! PassQueryService: role-scoped listings and draft badges.

use std::sync::Arc;

use propusk_core::{
  Result,
  auth::TokenVerifier,
  filter::PassFilter,
  pass::{PassStatus, PassSummary},
  store::PassStore,
};
use uuid::Uuid;

use crate::{
  guard::AuthorizationGuard,
  lookup::{StoreResultExt as _, optional},
};

pub struct PassQueryService<S, V> {
  store: Arc<S>,
  guard: AuthorizationGuard<V>,
}

impl<S, V> PassQueryService<S, V>
where
  S: PassStore,
  V: TokenVerifier,
{
  pub fn new(store: Arc<S>, guard: AuthorizationGuard<V>) -> Self {
    Self { store, guard }
  }

  /// Admins see every pass, everyone else only their own. Without a status
  /// filter, drafts and deleted passes are left out. `from`/`to` are date
  /// literals bounding `visit_date`, both inclusive.
  pub async fn list_passes(
    &self,
    token: &str,
    status: Option<PassStatus>,
    from: Option<&str>,
    to: Option<&str>,
  ) -> Result<Vec<PassSummary>> {
    let claims = self.guard.claims(token)?;
    let filter = PassFilter::parse(status, from, to)?;
    if claims.is_admin {
      self.store.list_all(filter).await.or_internal()
    } else {
      self
        .store
        .list_for_creator(claims.subject_id, filter)
        .await
        .or_internal()
    }
  }

  /// The caller's draft pass id, if any.
  pub async fn get_pass_id(&self, token: &str) -> Result<Option<Uuid>> {
    let claims = self.guard.claims(token)?;
    optional(self.store.find_draft_by_creator(claims.subject_id).await)
  }

  /// Number of buildings on the caller's draft; zero without a draft.
  pub async fn get_items_count(&self, token: &str) -> Result<usize> {
    let Some(pass_id) = self.get_pass_id(token).await? else {
      return Ok(0);
    };
    self.store.count(pass_id).await.or_internal()
  }
}
