//! BuildingCatalog: the set of buildings a pass can grant access to.
//!
//! Reads are open to anyone and only ever see active buildings. Every
//! mutation requires an admin token.

use std::sync::Arc;

use propusk_core::{
  Error, Result,
  auth::TokenVerifier,
  building::{Building, NewBuilding},
  media::ImageStore,
  store::PassStore,
};
use uuid::Uuid;

use crate::{
  config::ServiceConfig,
  guard::AuthorizationGuard,
  lookup::StoreResultExt as _,
};

pub struct BuildingCatalog<S, V, M> {
  store:  Arc<S>,
  guard:  AuthorizationGuard<V>,
  images: Arc<M>,
  config: Arc<ServiceConfig>,
}

impl<S, V, M> BuildingCatalog<S, V, M>
where
  S: PassStore,
  V: TokenVerifier,
  M: ImageStore,
{
  pub fn new(
    store: Arc<S>,
    guard: AuthorizationGuard<V>,
    images: Arc<M>,
    config: Arc<ServiceConfig>,
  ) -> Self {
    Self { store, guard, images, config }
  }

  // ─── Reads ─────────────────────────────────────────────────────────────────

  /// Substring match over active buildings. A blank pattern lists them all.
  pub async fn find_buildings(&self, pattern: &str) -> Result<Vec<Building>> {
    let pattern = pattern.trim();
    if pattern.is_empty() {
      self.store.list_active().await.or_internal()
    } else {
      self.store.search(pattern.to_owned()).await.or_internal()
    }
  }

  /// An active building by id.
  pub async fn get_building(&self, id: Uuid) -> Result<Building> {
    self.active(id).await
  }

  // ─── Admin mutations ───────────────────────────────────────────────────────

  pub async fn add_building(&self, token: &str, input: NewBuilding) -> Result<Building> {
    let claims = self.guard.admin(token, "add building")?;
    let building = Building::new(input);
    self.store.save(building.clone()).await.or_internal()?;
    tracing::info!(building_id = %building.id, admin = %claims.subject_id, "building added");
    Ok(building)
  }

  pub async fn edit_building(
    &self,
    token: &str,
    id: Uuid,
    name: String,
    description: String,
  ) -> Result<()> {
    self.guard.admin(token, "edit building")?;
    self.active(id).await?;
    self
      .store
      .update_info(id, name, description)
      .await
      .or_missing(Error::BuildingNotFound)
  }

  /// Soft delete: hide the building from the catalog and drop its photo.
  pub async fn delete_building(&self, token: &str, id: Uuid) -> Result<()> {
    let claims = self.guard.admin(token, "delete building")?;
    self.active(id).await?;
    self
      .store
      .set_active(id, false)
      .await
      .or_missing(Error::BuildingNotFound)?;
    tracing::info!(building_id = %id, admin = %claims.subject_id, "building deactivated");

    self.drop_photo(id).await;
    Ok(())
  }

  /// Upload a new preview photo, replacing any previous one. Returns the
  /// new image URL.
  pub async fn replace_preview(
    &self,
    token: &str,
    id: Uuid,
    png: Vec<u8>,
  ) -> Result<String> {
    self.guard.admin(token, "replace preview")?;
    self.active(id).await?;

    self.drop_photo(id).await;
    self.images.save_building_photo(id, png).await.or_internal()?;

    let url = self.config.building_image_url(id);
    self
      .store
      .set_image_url(id, url.clone())
      .await
      .or_missing(Error::BuildingNotFound)?;
    Ok(url)
  }

  // ─── Helpers ───────────────────────────────────────────────────────────────

  async fn active(&self, id: Uuid) -> Result<Building> {
    let building = self
      .store
      .get(id)
      .await
      .or_missing(Error::BuildingNotFound)?;
    if !building.active {
      return Err(Error::BuildingNotFound);
    }
    Ok(building)
  }

  /// Best effort: a failure here never aborts the caller's operation.
  async fn drop_photo(&self, id: Uuid) {
    if let Err(e) = self.images.delete_building_photo(id).await {
      tracing::warn!(building_id = %id, error = %e, "failed to delete building photo");
    }
  }
}
