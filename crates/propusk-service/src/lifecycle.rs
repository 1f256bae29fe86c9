//! PassLifecycleEngine: the pass status machine.
//!
//! Legal moves are exactly those of [`PassStatus::can_transition_to`]:
//!
//! | Move | Operation | Caller |
//! |------|-----------|--------|
//! | Draft → Formed | [`submit`](PassLifecycleEngine::submit) | creator |
//! | Draft → Deleted | [`delete`](PassLifecycleEngine::delete) | creator |
//! | Formed → Rejected | [`reject`](PassLifecycleEngine::reject) | admin |
//! | Formed → Completed | [`complete`](PassLifecycleEngine::complete) | admin |
//!
//! [`edit`](PassLifecycleEngine::edit) changes visitor info without moving
//! the status. Drafts come into existence through
//! [`crate::PassItemManager::add_building_to_pass`].
//!
//! Every operation checks, in order: the token, that the pass exists, that
//! the caller may act on it, and finally its status.
//! The status write itself is conditional on the status that was checked,
//! so of two racing moves on one pass only the first applies.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use propusk_core::{
  Error, Result,
  auth::TokenVerifier,
  media::ImageStore,
  pass::{PassDetails, PassShort, PassStatus, StatusChange},
  store::PassStore,
};
use uuid::Uuid;

use crate::{
  config::ServiceConfig,
  guard::{AuthorizationGuard, ensure_admin, ensure_owner},
  lookup::StoreResultExt as _,
  qr,
};

pub struct PassLifecycleEngine<S, V, M> {
  store:  Arc<S>,
  guard:  AuthorizationGuard<V>,
  images: Arc<M>,
  config: Arc<ServiceConfig>,
}

impl<S, V, M> PassLifecycleEngine<S, V, M>
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

  // ─── Creator moves ─────────────────────────────────────────────────────────

  /// Draft → Formed. Needs at least one item and a visitor name. Renders
  /// the pass QR code and hands it to the image store.
  pub async fn submit(&self, token: &str, pass_id: Uuid) -> Result<()> {
    let claims = self.guard.claims(token)?;
    let pass = self.store.load(pass_id).await.or_missing(Error::InvalidPass)?;
    ensure_owner(&claims, pass.creator_id, "submit pass")?;
    if !pass.status.can_transition_to(PassStatus::Formed) {
      return Err(Error::StatusNotDraft);
    }

    let items = self.store.count(pass_id).await.or_internal()?;
    if items == 0 || pass.visitor_name.trim().is_empty() {
      return Err(Error::CannotBeFormed);
    }

    self
      .move_to(
        pass_id,
        StatusChange::new(pass.status, PassStatus::Formed),
        Error::StatusNotDraft,
      )
      .await?;
    self.persist_qr(pass_id).await;
    Ok(())
  }

  /// Draft → Deleted.
  pub async fn delete(&self, token: &str, pass_id: Uuid) -> Result<()> {
    let claims = self.guard.claims(token)?;
    let pass = self.short(pass_id).await?;
    ensure_owner(&claims, pass.creator_id, "delete pass")?;
    if !pass.status.can_transition_to(PassStatus::Deleted) {
      return Err(Error::CannotBeDeleted);
    }
    self
      .move_to(
        pass_id,
        StatusChange::new(pass.status, PassStatus::Deleted),
        Error::CannotBeDeleted,
      )
      .await
  }

  /// Replace visitor name and date. Allowed in every status but Completed.
  pub async fn edit(
    &self,
    token: &str,
    pass_id: Uuid,
    visitor_name: String,
    visit_date: Option<DateTime<Utc>>,
  ) -> Result<()> {
    let claims = self.guard.claims(token)?;
    let pass = self.short(pass_id).await?;
    ensure_owner(&claims, pass.creator_id, "edit pass")?;
    if !pass.status.allows_visitor_edit() {
      return Err(Error::CannotBeEdited);
    }
    self
      .store
      .update_visitor_info(pass_id, visitor_name, visit_date)
      .await
      .or_missing(Error::InvalidPass)
  }

  // ─── Moderator moves ───────────────────────────────────────────────────────

  /// Formed → Rejected. Records the moderator and marks every item visited.
  pub async fn reject(&self, token: &str, pass_id: Uuid) -> Result<()> {
    let moderator = self.moderate(token, pass_id, PassStatus::Rejected).await?;
    tracing::info!(%pass_id, %moderator, "pass rejected");
    Ok(())
  }

  /// Formed → Completed. Records the moderator, marks every item visited
  /// and persists the QR code.
  pub async fn complete(&self, token: &str, pass_id: Uuid) -> Result<()> {
    let moderator = self.moderate(token, pass_id, PassStatus::Completed).await?;
    tracing::info!(%pass_id, %moderator, "pass completed");
    self.persist_qr(pass_id).await;
    Ok(())
  }

  async fn moderate(
    &self,
    token: &str,
    pass_id: Uuid,
    next: PassStatus,
  ) -> Result<Uuid> {
    let claims = self.guard.claims(token)?;
    let pass = self.short(pass_id).await?;
    ensure_admin(&claims, "moderate pass")?;
    if !pass.status.can_transition_to(next) {
      return Err(Error::StatusNotFormed);
    }

    let change = StatusChange::new(pass.status, next).by(claims.subject_id);
    self
      .store
      .moderate(pass_id, change)
      .await
      .or_moved(Error::InvalidPass, Error::StatusNotFormed)?;
    tracing::debug!(%pass_id, status = %next, "pass status changed");
    Ok(claims.subject_id)
  }

  // ─── Reads ─────────────────────────────────────────────────────────────────

  /// Long projection for the creator or an admin.
  pub async fn get_protected(&self, token: &str, pass_id: Uuid) -> Result<PassDetails> {
    let claims = self.guard.claims(token)?;
    let details = self.details(pass_id).await?;
    if !claims.is_admin {
      ensure_owner(&claims, details.pass.creator_id, "read pass")?;
    }
    Ok(details)
  }

  /// Long projection with no caller check, for lookups that reach the pass
  /// by its id alone (e.g. scanning its QR code).
  pub async fn get_public(&self, pass_id: Uuid) -> Result<PassDetails> {
    self.details(pass_id).await
  }

  // ─── Helpers ───────────────────────────────────────────────────────────────

  async fn short(&self, pass_id: Uuid) -> Result<PassShort> {
    self
      .store
      .load_short(pass_id)
      .await
      .or_missing(Error::InvalidPass)
  }

  async fn details(&self, pass_id: Uuid) -> Result<PassDetails> {
    let pass = self.store.load(pass_id).await.or_missing(Error::InvalidPass)?;
    let items = self.store.list_details(pass_id).await.or_internal()?;
    Ok(PassDetails { pass, items })
  }

  /// Apply `change` if the pass is still where we last saw it; `stale` if
  /// another request moved it first.
  async fn move_to(&self, pass_id: Uuid, change: StatusChange, stale: Error) -> Result<()> {
    self
      .store
      .update_status(pass_id, change)
      .await
      .or_moved(Error::InvalidPass, stale)?;
    tracing::debug!(%pass_id, status = %change.status, "pass status changed");
    Ok(())
  }

  /// Best effort: the status move has already happened.
  async fn persist_qr(&self, pass_id: Uuid) {
    let png = match qr::render_png(&self.config.pass_url(pass_id)) {
      Ok(png) => png,
      Err(e) => {
        tracing::warn!(%pass_id, error = %e, "failed to render QR code");
        return;
      }
    };
    if let Err(e) = self.images.save_qr_code(pass_id, png).await {
      tracing::warn!(%pass_id, error = %e, "failed to store QR code");
    }
  }
}
