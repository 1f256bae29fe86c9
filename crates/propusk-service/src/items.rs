//! PassItemManager: building membership of a creator's draft pass.

use std::sync::Arc;

use propusk_core::{
  Error, Result,
  auth::TokenVerifier,
  pass::{PassShort, PassStatus},
  store::PassStore,
  user::Claims,
};
use uuid::Uuid;

use crate::{
  guard::{AuthorizationGuard, ensure_owner},
  lookup::StoreResultExt as _,
};

pub struct PassItemManager<S, V> {
  store: Arc<S>,
  guard: AuthorizationGuard<V>,
}

impl<S, V> PassItemManager<S, V>
where
  S: PassStore,
  V: TokenVerifier,
{
  pub fn new(store: Arc<S>, guard: AuthorizationGuard<V>) -> Self {
    Self { store, guard }
  }

  /// Attach an active building to the caller's draft, opening a draft if
  /// the caller has none. Returns the draft's id.
  ///
  /// Adding a building that is already on the draft is an error, never a
  /// silent success.
  pub async fn add_building_to_pass(&self, token: &str, building_id: Uuid) -> Result<Uuid> {
    let claims = self.guard.claims(token)?;

    let building = self
      .store
      .get(building_id)
      .await
      .or_missing(Error::BuildingNotFound)?;
    if !building.active {
      return Err(Error::BuildingNotFound);
    }

    let (pass_id, created) = self
      .store
      .find_or_create_draft(claims.subject_id)
      .await
      .or_internal()?;
    if created {
      tracing::info!(%pass_id, creator = %claims.subject_id, "draft pass opened");
    } else {
      let items = self.store.list(pass_id).await.or_internal()?;
      if items.iter().any(|i| i.building_id == building_id) {
        return Err(Error::BuildingAlreadyAdded);
      }
    }

    self
      .store
      .add(pass_id, building_id, String::new())
      .await
      .or_conflict(Error::BuildingAlreadyAdded)?;
    Ok(pass_id)
  }

  pub async fn edit_item_comment(
    &self,
    token: &str,
    pass_id: Uuid,
    building_id: Uuid,
    comment: String,
  ) -> Result<()> {
    let claims = self.guard.claims(token)?;
    self.editable_draft(&claims, pass_id, "edit item").await?;
    self
      .store
      .edit_comment(pass_id, building_id, comment)
      .await
      .or_missing(Error::InvalidPassBuilding)
  }

  pub async fn remove_item(&self, token: &str, pass_id: Uuid, building_id: Uuid) -> Result<()> {
    let claims = self.guard.claims(token)?;
    self.editable_draft(&claims, pass_id, "remove item").await?;
    self
      .store
      .remove(pass_id, building_id)
      .await
      .or_missing(Error::InvalidPassBuilding)
  }

  /// The pass exists, belongs to the caller, and is still a draft.
  async fn editable_draft(
    &self,
    claims: &Claims,
    pass_id: Uuid,
    action: &'static str,
  ) -> Result<PassShort> {
    let pass = self
      .store
      .load_short(pass_id)
      .await
      .or_missing(Error::InvalidPass)?;
    ensure_owner(claims, pass.creator_id, action)?;
    if pass.status != PassStatus::Draft {
      return Err(Error::PassNotDraft);
    }
    Ok(pass)
  }
}
