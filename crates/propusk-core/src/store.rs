//! Repository traits and the shared [`StoreError`].
//!
//! The traits are implemented by storage backends (e.g.
//! `propusk-store-sqlite`). The engine depends on this abstraction, not on
//! any concrete backend.
//!
//! Every backend reports a missing row with the single
//! [`StoreError::NotFound`] sentinel. Soft-deleted and absent rows are not
//! distinguished here; the engine translates the sentinel into the domain
//! error that fits each call site.

use std::future::Future;

use chrono::{DateTime, Utc};
use thiserror::Error;
use uuid::Uuid;

use crate::{
  building::Building,
  filter::PassFilter,
  pass::{Pass, PassItem, PassItemDetails, PassShort, PassSummary, StatusChange},
  user::User,
};

// ─── Error ───────────────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum StoreError {
  /// The addressed row does not exist.
  #[error("not found")]
  NotFound,

  /// A uniqueness constraint rejected the write.
  #[error("conflict: {0}")]
  Conflict(String),

  /// A conditional status write found the row in another status.
  #[error("status changed concurrently")]
  StatusChanged,

  /// Any other backend failure.
  #[error("backend error: {0}")]
  Backend(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl StoreError {
  pub fn backend(e: impl std::error::Error + Send + Sync + 'static) -> Self {
    Self::Backend(Box::new(e))
  }
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;

// ─── Passes ──────────────────────────────────────────────────────────────────

pub trait PassRepository: Send + Sync {
  /// The creator's current draft pass id.
  fn find_draft_by_creator(
    &self,
    creator_id: Uuid,
  ) -> impl Future<Output = StoreResult<Uuid>> + Send + '_;

  /// Return the creator's draft, creating one if none exists, as a single
  /// atomic step. The boolean is `true` when a new pass was created.
  ///
  /// Implementations must guarantee that concurrent callers for the same
  /// creator observe one draft.
  fn find_or_create_draft(
    &self,
    creator_id: Uuid,
  ) -> impl Future<Output = StoreResult<(Uuid, bool)>> + Send + '_;

  fn create(
    &self,
    pass: Pass,
  ) -> impl Future<Output = StoreResult<()>> + Send + '_;

  fn load(&self, id: Uuid) -> impl Future<Output = StoreResult<Pass>> + Send + '_;

  fn load_short(
    &self,
    id: Uuid,
  ) -> impl Future<Output = StoreResult<PassShort>> + Send + '_;

  /// Move the pass to `change.status`, but only while it is still in
  /// `change.from`. A pass in any other status is left untouched and the
  /// call fails with [`StoreError::StatusChanged`].
  fn update_status(
    &self,
    id: Uuid,
    change: StatusChange,
  ) -> impl Future<Output = StoreResult<()>> + Send + '_;

  /// [`update_status`](Self::update_status) plus marking every item of the
  /// pass visited, committed together or not at all.
  fn moderate(
    &self,
    id: Uuid,
    change: StatusChange,
  ) -> impl Future<Output = StoreResult<()>> + Send + '_;

  fn update_visitor_info(
    &self,
    id: Uuid,
    visitor_name: String,
    visit_date: Option<DateTime<Utc>>,
  ) -> impl Future<Output = StoreResult<()>> + Send + '_;

  fn list_all(
    &self,
    filter: PassFilter,
  ) -> impl Future<Output = StoreResult<Vec<PassSummary>>> + Send + '_;

  fn list_for_creator(
    &self,
    creator_id: Uuid,
    filter: PassFilter,
  ) -> impl Future<Output = StoreResult<Vec<PassSummary>>> + Send + '_;
}

// ─── Pass items ──────────────────────────────────────────────────────────────

pub trait PassItemRepository: Send + Sync {
  /// Insert an item. A duplicate `(pass_id, building_id)` pair is a
  /// [`StoreError::Conflict`].
  fn add(
    &self,
    pass_id: Uuid,
    building_id: Uuid,
    comment: String,
  ) -> impl Future<Output = StoreResult<()>> + Send + '_;

  fn remove(
    &self,
    pass_id: Uuid,
    building_id: Uuid,
  ) -> impl Future<Output = StoreResult<()>> + Send + '_;

  fn edit_comment(
    &self,
    pass_id: Uuid,
    building_id: Uuid,
    comment: String,
  ) -> impl Future<Output = StoreResult<()>> + Send + '_;

  fn mark_all_visited(
    &self,
    pass_id: Uuid,
  ) -> impl Future<Output = StoreResult<()>> + Send + '_;

  fn list(
    &self,
    pass_id: Uuid,
  ) -> impl Future<Output = StoreResult<Vec<PassItem>>> + Send + '_;

  fn list_details(
    &self,
    pass_id: Uuid,
  ) -> impl Future<Output = StoreResult<Vec<PassItemDetails>>> + Send + '_;

  fn count(
    &self,
    pass_id: Uuid,
  ) -> impl Future<Output = StoreResult<usize>> + Send + '_;
}

// ─── Buildings ───────────────────────────────────────────────────────────────

pub trait BuildingRepository: Send + Sync {
  /// Any building, active or not.
  fn get(&self, id: Uuid) -> impl Future<Output = StoreResult<Building>> + Send + '_;

  fn list_active(&self) -> impl Future<Output = StoreResult<Vec<Building>>> + Send + '_;

  /// Substring match on the name, over active buildings only.
  fn search(
    &self,
    pattern: String,
  ) -> impl Future<Output = StoreResult<Vec<Building>>> + Send + '_;

  fn save(
    &self,
    building: Building,
  ) -> impl Future<Output = StoreResult<()>> + Send + '_;

  fn update_info(
    &self,
    id: Uuid,
    name: String,
    description: String,
  ) -> impl Future<Output = StoreResult<()>> + Send + '_;

  /// Deactivating also clears `image_url` in the same write: a hidden
  /// building keeps no photo.
  fn set_active(
    &self,
    id: Uuid,
    active: bool,
  ) -> impl Future<Output = StoreResult<()>> + Send + '_;

  fn set_image_url(
    &self,
    id: Uuid,
    url: String,
  ) -> impl Future<Output = StoreResult<()>> + Send + '_;
}

// ─── Users ───────────────────────────────────────────────────────────────────

pub trait UserRepository: Send + Sync {
  fn find_by_login(
    &self,
    login: String,
  ) -> impl Future<Output = StoreResult<User>> + Send + '_;

  /// A duplicate login is a [`StoreError::Conflict`].
  fn insert_user(&self, user: User) -> impl Future<Output = StoreResult<()>> + Send + '_;

  fn update_user(
    &self,
    id: Uuid,
    login: String,
    password_hash: String,
  ) -> impl Future<Output = StoreResult<()>> + Send + '_;
}

// ─── Aggregate ───────────────────────────────────────────────────────────────

/// Everything the engine needs from persistent storage.
pub trait PassStore:
  PassRepository + PassItemRepository + BuildingRepository + UserRepository + 'static
{
}

impl<T> PassStore for T where
  T: PassRepository + PassItemRepository + BuildingRepository + UserRepository + 'static
{
}
