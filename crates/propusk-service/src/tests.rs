//! Engine tests against an in-memory `SqliteStore`, a table-backed token
//! service and a recording image store.

use std::{
  collections::HashMap,
  sync::{
    Arc, Mutex,
    atomic::{AtomicBool, Ordering},
  },
};

use chrono::{TimeZone, Utc};
use propusk_core::{
  Error, Result, StoreError,
  auth::{TokenIssuer, TokenVerifier},
  building::NewBuilding,
  media::ImageStore,
  pass::{Pass, PassStatus},
  store::{BuildingRepository, PassItemRepository, PassRepository, StoreResult},
  user::Claims,
};
use propusk_store_sqlite::SqliteStore;
use uuid::Uuid;

use crate::{PassDesk, ServiceConfig};

// ─── Fakes ───────────────────────────────────────────────────────────────────

/// Tokens are opaque random strings looked up in a table.
#[derive(Default)]
struct FakeTokens {
  table: Mutex<HashMap<String, Claims>>,
}

impl TokenVerifier for FakeTokens {
  fn claims(&self, token: &str) -> Result<Claims> {
    self
      .table
      .lock()
      .unwrap()
      .get(token)
      .copied()
      .ok_or(Error::AuthToken)
  }
}

impl TokenIssuer for FakeTokens {
  fn issue(&self, claims: Claims) -> Result<String> {
    let token = Uuid::new_v4().to_string();
    self.table.lock().unwrap().insert(token.clone(), claims);
    Ok(token)
  }
}

#[derive(Debug, Clone, PartialEq)]
enum Stored {
  Photo(Uuid),
  PhotoDeleted(Uuid),
  Qr(Uuid, Vec<u8>),
}

#[derive(Default)]
struct RecordingImages {
  log:          Mutex<Vec<Stored>>,
  fail_deletes: AtomicBool,
  fail_qr:      AtomicBool,
}

impl RecordingImages {
  fn log(&self) -> Vec<Stored> { self.log.lock().unwrap().clone() }

  fn qr_codes(&self) -> Vec<(Uuid, Vec<u8>)> {
    self
      .log()
      .into_iter()
      .filter_map(|s| match s {
        Stored::Qr(id, png) => Some((id, png)),
        _ => None,
      })
      .collect()
  }
}

fn disk_failure() -> StoreError {
  StoreError::backend(std::io::Error::other("disk unavailable"))
}

impl ImageStore for RecordingImages {
  async fn save_building_photo(&self, building_id: Uuid, _bytes: Vec<u8>) -> StoreResult<()> {
    self.log.lock().unwrap().push(Stored::Photo(building_id));
    Ok(())
  }

  async fn delete_building_photo(&self, building_id: Uuid) -> StoreResult<()> {
    if self.fail_deletes.load(Ordering::SeqCst) {
      return Err(disk_failure());
    }
    self.log.lock().unwrap().push(Stored::PhotoDeleted(building_id));
    Ok(())
  }

  async fn save_qr_code(&self, pass_id: Uuid, png: Vec<u8>) -> StoreResult<()> {
    if self.fail_qr.load(Ordering::SeqCst) {
      return Err(disk_failure());
    }
    self.log.lock().unwrap().push(Stored::Qr(pass_id, png));
    Ok(())
  }
}

// ─── Fixture ─────────────────────────────────────────────────────────────────

type Desk = PassDesk<SqliteStore, FakeTokens, RecordingImages>;

struct Fixture {
  desk:   Arc<Desk>,
  store:  Arc<SqliteStore>,
  tokens: Arc<FakeTokens>,
  images: Arc<RecordingImages>,
  admin:  String,
}

async fn fixture() -> Fixture {
  let store = Arc::new(SqliteStore::open_in_memory().await.unwrap());
  let tokens = Arc::new(FakeTokens::default());
  let images = Arc::new(RecordingImages::default());
  let desk = Arc::new(PassDesk::new(
    store.clone(),
    tokens.clone(),
    images.clone(),
    ServiceConfig::new("https://propusk.test"),
  ));
  let admin = tokens.issue(Claims::admin(Uuid::new_v4())).unwrap();
  Fixture { desk, store, tokens, images, admin }
}

impl Fixture {
  fn user(&self) -> (Uuid, String) {
    let id = Uuid::new_v4();
    (id, self.tokens.issue(Claims::user(id)).unwrap())
  }

  fn admin_id(&self) -> Uuid { self.tokens.claims(&self.admin).unwrap().subject_id }

  async fn building(&self, name: &str) -> Uuid {
    self
      .desk
      .catalog
      .add_building(&self.admin, NewBuilding {
        name:        name.into(),
        description: String::new(),
      })
      .await
      .unwrap()
      .id
  }

  async fn status(&self, pass_id: Uuid) -> PassStatus {
    self.store.load(pass_id).await.unwrap().status
  }

  async fn load(&self, pass_id: Uuid) -> Pass { self.store.load(pass_id).await.unwrap() }

  /// A formed pass with one building, owned by a fresh user.
  async fn formed_pass(&self) -> (Uuid, String) {
    let (_, token) = self.user();
    let b = self.building("Formed Hall").await;
    let pass = self.desk.items.add_building_to_pass(&token, b).await.unwrap();
    self
      .desk
      .lifecycle
      .edit(&token, pass, "Ivan".into(), None)
      .await
      .unwrap();
    self.desk.lifecycle.submit(&token, pass).await.unwrap();
    (pass, token)
  }
}

// ─── Scenarios ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn scenario_a_first_add_opens_draft_and_rejects_duplicates() {
  let f = fixture().await;
  let (u1, token) = f.user();
  let b1 = f.building("Main Hall").await;
  let b2 = f.building("Library").await;

  let p1 = f.desk.items.add_building_to_pass(&token, b1).await.unwrap();
  let pass = f.load(p1).await;
  assert_eq!(pass.status, PassStatus::Draft);
  assert_eq!(pass.creator_id, u1);
  assert!(pass.visit_date.is_none());
  assert_eq!(f.store.list(p1).await.unwrap().len(), 1);

  assert!(matches!(
    f.desk.items.add_building_to_pass(&token, b1).await,
    Err(Error::BuildingAlreadyAdded)
  ));

  let again = f.desk.items.add_building_to_pass(&token, b2).await.unwrap();
  assert_eq!(again, p1);
  let buildings: Vec<_> = f
    .store
    .list(p1)
    .await
    .unwrap()
    .into_iter()
    .map(|i| i.building_id)
    .collect();
  assert_eq!(buildings, vec![b1, b2]);
}

#[tokio::test]
async fn scenario_b_submit_forms_pass_and_stores_qr() {
  let f = fixture().await;
  let (_, token) = f.user();
  let b1 = f.building("Main Hall").await;
  let p1 = f.desk.items.add_building_to_pass(&token, b1).await.unwrap();
  let date = Utc.with_ymd_and_hms(2024, 6, 1, 10, 0, 0).unwrap();

  f.desk
    .lifecycle
    .edit(&token, p1, "Ivan".into(), Some(date))
    .await
    .unwrap();
  f.desk.lifecycle.submit(&token, p1).await.unwrap();

  let pass = f.load(p1).await;
  assert_eq!(pass.status, PassStatus::Formed);
  assert!(pass.formed_at.is_some());
  assert_eq!(pass.visitor_name, "Ivan");
  assert_eq!(pass.visit_date, Some(date));

  let qrs = f.images.qr_codes();
  assert_eq!(qrs.len(), 1);
  assert_eq!(qrs[0].0, p1);
  assert!(qrs[0].1.starts_with(b"\x89PNG"));
}

#[tokio::test]
async fn scenario_c_complete_is_admin_only_and_single_shot() {
  let f = fixture().await;
  let (p1, _) = f.formed_pass().await;

  f.desk.lifecycle.complete(&f.admin, p1).await.unwrap();

  let pass = f.load(p1).await;
  assert_eq!(pass.status, PassStatus::Completed);
  assert_eq!(pass.moderator_id, Some(f.admin_id()));
  assert!(pass.completed_at.is_some());
  assert!(f.store.list(p1).await.unwrap().iter().all(|i| i.was_visited));

  assert!(matches!(
    f.desk.lifecycle.complete(&f.admin, p1).await,
    Err(Error::StatusNotFormed)
  ));
}

#[tokio::test]
async fn scenario_d_delete_checks_owner_then_state() {
  let f = fixture().await;
  let (p1, owner) = f.formed_pass().await;
  let (_, stranger) = f.user();

  assert!(matches!(
    f.desk.lifecycle.delete(&stranger, p1).await,
    Err(Error::NoPermission)
  ));
  assert!(matches!(
    f.desk.lifecycle.delete(&owner, p1).await,
    Err(Error::CannotBeDeleted)
  ));
  assert_eq!(f.status(p1).await, PassStatus::Formed);
}

// ─── Lifecycle ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn submit_requires_items_and_visitor() {
  let f = fixture().await;
  let (_, token) = f.user();
  let b = f.building("Hall").await;
  let pass = f.desk.items.add_building_to_pass(&token, b).await.unwrap();

  // Items but no visitor.
  assert!(matches!(
    f.desk.lifecycle.submit(&token, pass).await,
    Err(Error::CannotBeFormed)
  ));

  // Visitor but no items.
  f.desk
    .lifecycle
    .edit(&token, pass, "Ivan".into(), None)
    .await
    .unwrap();
  f.desk.items.remove_item(&token, pass, b).await.unwrap();
  assert!(matches!(
    f.desk.lifecycle.submit(&token, pass).await,
    Err(Error::CannotBeFormed)
  ));

  // Whitespace is not a name.
  f.desk.items.add_building_to_pass(&token, b).await.unwrap();
  f.desk
    .lifecycle
    .edit(&token, pass, "   ".into(), None)
    .await
    .unwrap();
  assert!(matches!(
    f.desk.lifecycle.submit(&token, pass).await,
    Err(Error::CannotBeFormed)
  ));

  assert_eq!(f.status(pass).await, PassStatus::Draft);
  assert!(f.images.qr_codes().is_empty());
}

#[tokio::test]
async fn submit_is_creator_only_and_draft_only() {
  let f = fixture().await;
  let (pass, owner) = f.formed_pass().await;
  let (_, stranger) = f.user();

  assert!(matches!(
    f.desk.lifecycle.submit(&stranger, pass).await,
    Err(Error::NoPermission)
  ));
  assert!(matches!(
    f.desk.lifecycle.submit(&f.admin, pass).await,
    Err(Error::NoPermission)
  ));
  assert!(matches!(
    f.desk.lifecycle.submit(&owner, pass).await,
    Err(Error::StatusNotDraft)
  ));
}

#[tokio::test]
async fn submit_succeeds_when_qr_storage_fails() {
  let f = fixture().await;
  f.images.fail_qr.store(true, Ordering::SeqCst);

  let (pass, _) = f.formed_pass().await;

  assert_eq!(f.status(pass).await, PassStatus::Formed);
  assert!(f.images.qr_codes().is_empty());
}

#[tokio::test]
async fn delete_draft_then_open_a_new_one() {
  let f = fixture().await;
  let (u, token) = f.user();
  let b = f.building("Hall").await;
  let first = f.desk.items.add_building_to_pass(&token, b).await.unwrap();

  f.desk.lifecycle.delete(&token, first).await.unwrap();
  let pass = f.load(first).await;
  assert_eq!(pass.status, PassStatus::Deleted);
  assert!(pass.completed_at.is_none());
  assert!(f.desk.queries.get_pass_id(&token).await.unwrap().is_none());

  let second = f.desk.items.add_building_to_pass(&token, b).await.unwrap();
  assert_ne!(first, second);
  assert_eq!(f.store.find_draft_by_creator(u).await.unwrap(), second);

  // Deleted is terminal.
  assert!(matches!(
    f.desk.lifecycle.delete(&token, first).await,
    Err(Error::CannotBeDeleted)
  ));
}

#[tokio::test]
async fn moderation_requires_admin_regardless_of_ownership() {
  let f = fixture().await;
  let (pass, owner) = f.formed_pass().await;

  for result in [
    f.desk.lifecycle.reject(&owner, pass).await,
    f.desk.lifecycle.complete(&owner, pass).await,
  ] {
    assert!(matches!(result, Err(Error::NoPermission)));
  }
  assert_eq!(f.status(pass).await, PassStatus::Formed);
}

#[tokio::test]
async fn moderation_requires_formed() {
  let f = fixture().await;
  let (_, token) = f.user();
  let b = f.building("Hall").await;
  let draft = f.desk.items.add_building_to_pass(&token, b).await.unwrap();

  assert!(matches!(
    f.desk.lifecycle.reject(&f.admin, draft).await,
    Err(Error::StatusNotFormed)
  ));
  assert!(matches!(
    f.desk.lifecycle.complete(&f.admin, draft).await,
    Err(Error::StatusNotFormed)
  ));

  let (formed, _) = f.formed_pass().await;
  f.desk.lifecycle.reject(&f.admin, formed).await.unwrap();
  assert!(matches!(
    f.desk.lifecycle.complete(&f.admin, formed).await,
    Err(Error::StatusNotFormed)
  ));
}

#[tokio::test]
async fn reject_records_moderator_and_marks_items_visited() {
  let f = fixture().await;
  let (pass, _) = f.formed_pass().await;
  let qrs_before = f.images.qr_codes().len();

  f.desk.lifecycle.reject(&f.admin, pass).await.unwrap();

  let rejected = f.load(pass).await;
  assert_eq!(rejected.status, PassStatus::Rejected);
  assert_eq!(rejected.moderator_id, Some(f.admin_id()));
  assert!(rejected.completed_at.is_some());
  assert!(f.store.list(pass).await.unwrap().iter().all(|i| i.was_visited));
  assert_eq!(f.images.qr_codes().len(), qrs_before);
}

#[tokio::test]
async fn racing_moderators_yield_one_legal_move() {
  let f = fixture().await;
  let other_admin = f.tokens.issue(Claims::admin(Uuid::new_v4())).unwrap();

  for _ in 0..20 {
    let (pass, _) = f.formed_pass().await;
    let qrs_before = f.images.qr_codes().len();

    let reject = {
      let desk = f.desk.clone();
      let token = f.admin.clone();
      tokio::spawn(async move { desk.lifecycle.reject(&token, pass).await })
    };
    let complete = {
      let desk = f.desk.clone();
      let token = other_admin.clone();
      tokio::spawn(async move { desk.lifecycle.complete(&token, pass).await })
    };
    let rejected = reject.await.unwrap();
    let completed = complete.await.unwrap();

    let stored = f.load(pass).await;
    match (rejected, completed) {
      (Ok(()), Err(Error::StatusNotFormed)) => {
        assert_eq!(stored.status, PassStatus::Rejected);
        assert_eq!(stored.moderator_id, Some(f.admin_id()));
        assert_eq!(f.images.qr_codes().len(), qrs_before);
      }
      (Err(Error::StatusNotFormed), Ok(())) => {
        assert_eq!(stored.status, PassStatus::Completed);
        assert_ne!(stored.moderator_id, Some(f.admin_id()));
        assert_eq!(f.images.qr_codes().len(), qrs_before + 1);
      }
      other => panic!("expected exactly one moderation to win, got {other:?}"),
    }
    assert!(f.store.list(pass).await.unwrap().iter().all(|i| i.was_visited));
  }
}

#[tokio::test]
async fn submit_and_delete_race_to_a_single_outcome() {
  let f = fixture().await;
  let b = f.building("Race Hall").await;

  for _ in 0..20 {
    let (_, token) = f.user();
    let pass = f.desk.items.add_building_to_pass(&token, b).await.unwrap();
    f.desk
      .lifecycle
      .edit(&token, pass, "Ivan".into(), None)
      .await
      .unwrap();

    let submit = {
      let desk = f.desk.clone();
      let token = token.clone();
      tokio::spawn(async move { desk.lifecycle.submit(&token, pass).await })
    };
    let delete = {
      let desk = f.desk.clone();
      let token = token.clone();
      tokio::spawn(async move { desk.lifecycle.delete(&token, pass).await })
    };
    let submitted = submit.await.unwrap();
    let deleted = delete.await.unwrap();

    match (submitted, deleted) {
      (Ok(()), Err(Error::CannotBeDeleted)) => {
        assert_eq!(f.status(pass).await, PassStatus::Formed)
      }
      (Err(Error::StatusNotDraft), Ok(())) => {
        assert_eq!(f.status(pass).await, PassStatus::Deleted)
      }
      other => panic!("expected exactly one move to win, got {other:?}"),
    }
  }
}

#[tokio::test]
async fn complete_persists_qr_again() {
  let f = fixture().await;
  let (pass, _) = f.formed_pass().await;
  f.desk.lifecycle.complete(&f.admin, pass).await.unwrap();

  let qrs = f.images.qr_codes();
  assert_eq!(qrs.len(), 2);
  assert!(qrs.iter().all(|(id, _)| *id == pass));
}

#[tokio::test]
async fn edit_blocked_only_when_completed() {
  let f = fixture().await;

  let (rejected, owner) = f.formed_pass().await;
  f.desk.lifecycle.reject(&f.admin, rejected).await.unwrap();
  f.desk
    .lifecycle
    .edit(&owner, rejected, "Petr".into(), None)
    .await
    .unwrap();
  let pass = f.load(rejected).await;
  assert_eq!(pass.visitor_name, "Petr");
  assert_eq!(pass.status, PassStatus::Rejected);

  let (completed, owner) = f.formed_pass().await;
  f.desk.lifecycle.complete(&f.admin, completed).await.unwrap();
  assert!(matches!(
    f.desk
      .lifecycle
      .edit(&owner, completed, "Petr".into(), None)
      .await,
    Err(Error::CannotBeEdited)
  ));

  let (_, stranger) = f.user();
  assert!(matches!(
    f.desk
      .lifecycle
      .edit(&stranger, rejected, "Eve".into(), None)
      .await,
    Err(Error::NoPermission)
  ));
}

#[tokio::test]
async fn unknown_pass_is_invalid_pass_before_any_permission_check() {
  let f = fixture().await;
  let (_, token) = f.user();
  let missing = Uuid::new_v4();

  assert!(matches!(f.desk.lifecycle.submit(&token, missing).await, Err(Error::InvalidPass)));
  assert!(matches!(f.desk.lifecycle.delete(&token, missing).await, Err(Error::InvalidPass)));
  assert!(matches!(f.desk.lifecycle.reject(&token, missing).await, Err(Error::InvalidPass)));
  assert!(matches!(
    f.desk.lifecycle.edit(&token, missing, "x".into(), None).await,
    Err(Error::InvalidPass)
  ));
  assert!(matches!(
    f.desk.lifecycle.get_protected(&token, missing).await,
    Err(Error::InvalidPass)
  ));
  assert!(matches!(
    f.desk.items.remove_item(&token, missing, Uuid::new_v4()).await,
    Err(Error::InvalidPass)
  ));
}

#[tokio::test]
async fn bad_token_fails_before_lookup() {
  let f = fixture().await;
  let missing = Uuid::new_v4();

  assert!(matches!(f.desk.lifecycle.submit("", missing).await, Err(Error::AuthToken)));
  assert!(matches!(
    f.desk.lifecycle.complete("forged", missing).await,
    Err(Error::AuthToken)
  ));
  assert!(matches!(
    f.desk.items.add_building_to_pass("forged", missing).await,
    Err(Error::AuthToken)
  ));
  assert!(matches!(
    f.desk.queries.list_passes("", None, None, None).await,
    Err(Error::AuthToken)
  ));
}

#[tokio::test]
async fn protected_read_is_for_creator_or_admin() {
  let f = fixture().await;
  let (pass, owner) = f.formed_pass().await;
  let (_, stranger) = f.user();

  let details = f.desk.lifecycle.get_protected(&owner, pass).await.unwrap();
  assert_eq!(details.pass.id, pass);
  assert_eq!(details.items.len(), 1);
  assert_eq!(details.items[0].name, "Formed Hall");

  assert!(f.desk.lifecycle.get_protected(&f.admin, pass).await.is_ok());
  assert!(matches!(
    f.desk.lifecycle.get_protected(&stranger, pass).await,
    Err(Error::NoPermission)
  ));
  assert_eq!(f.desk.lifecycle.get_public(pass).await.unwrap().pass.id, pass);
}

// ─── Items ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn add_rejects_missing_and_inactive_buildings() {
  let f = fixture().await;
  let (_, token) = f.user();

  assert!(matches!(
    f.desk.items.add_building_to_pass(&token, Uuid::new_v4()).await,
    Err(Error::BuildingNotFound)
  ));

  let b = f.building("Closed").await;
  f.desk.catalog.delete_building(&f.admin, b).await.unwrap();
  assert!(matches!(
    f.desk.items.add_building_to_pass(&token, b).await,
    Err(Error::BuildingNotFound)
  ));

  // No draft was opened by the failed adds.
  assert!(f.desk.queries.get_pass_id(&token).await.unwrap().is_none());
}

#[tokio::test]
async fn item_edits_check_owner_then_draft_then_membership() {
  let f = fixture().await;
  let (_, owner) = f.user();
  let (_, stranger) = f.user();
  let b = f.building("Hall").await;
  let other = f.building("Annex").await;
  let pass = f.desk.items.add_building_to_pass(&owner, b).await.unwrap();

  assert!(matches!(
    f.desk.items.edit_item_comment(&stranger, pass, b, "x".into()).await,
    Err(Error::NoPermission)
  ));
  assert!(matches!(
    f.desk.items.remove_item(&stranger, pass, b).await,
    Err(Error::NoPermission)
  ));
  assert!(matches!(
    f.desk.items.edit_item_comment(&owner, pass, other, "x".into()).await,
    Err(Error::InvalidPassBuilding)
  ));
  assert!(matches!(
    f.desk.items.remove_item(&owner, pass, other).await,
    Err(Error::InvalidPassBuilding)
  ));

  f.desk
    .items
    .edit_item_comment(&owner, pass, b, "north entrance".into())
    .await
    .unwrap();
  assert_eq!(f.store.list(pass).await.unwrap()[0].comment, "north entrance");

  f.desk
    .lifecycle
    .edit(&owner, pass, "Ivan".into(), None)
    .await
    .unwrap();
  f.desk.lifecycle.submit(&owner, pass).await.unwrap();
  assert!(matches!(
    f.desk.items.edit_item_comment(&owner, pass, b, "late".into()).await,
    Err(Error::PassNotDraft)
  ));
  assert!(matches!(
    f.desk.items.remove_item(&owner, pass, b).await,
    Err(Error::PassNotDraft)
  ));
}

#[tokio::test]
async fn concurrent_adds_share_one_draft() {
  let f = fixture().await;
  let (u, token) = f.user();
  let mut buildings = Vec::new();
  for i in 0..6 {
    buildings.push(f.building(&format!("Block {i}")).await);
  }

  let handles: Vec<_> = buildings
    .iter()
    .map(|&b| {
      let desk = f.desk.clone();
      let token = token.clone();
      tokio::spawn(async move { desk.items.add_building_to_pass(&token, b).await })
    })
    .collect();

  let mut passes = Vec::new();
  for h in handles {
    passes.push(h.await.unwrap().unwrap());
  }
  passes.dedup();
  assert_eq!(passes.len(), 1);
  assert_eq!(f.store.find_draft_by_creator(u).await.unwrap(), passes[0]);
  assert_eq!(f.store.count(passes[0]).await.unwrap(), buildings.len());
}

// ─── Queries ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn listings_are_scoped_by_role() {
  let f = fixture().await;
  let (mine, me) = f.formed_pass().await;
  let (theirs, _) = f.formed_pass().await;

  // An open draft stays out of default listings.
  let b = f.building("Draft Hall").await;
  let draft = f.desk.items.add_building_to_pass(&me, b).await.unwrap();

  let own = f.desk.queries.list_passes(&me, None, None, None).await.unwrap();
  assert_eq!(own.iter().map(|p| p.pass.id).collect::<Vec<_>>(), vec![mine]);

  let all = f.desk.queries.list_passes(&f.admin, None, None, None).await.unwrap();
  let ids: Vec<_> = all.iter().map(|p| p.pass.id).collect();
  assert_eq!(ids.len(), 2);
  assert!(ids.contains(&mine) && ids.contains(&theirs));

  let drafts = f
    .desk
    .queries
    .list_passes(&me, Some(PassStatus::Draft), None, None)
    .await
    .unwrap();
  assert_eq!(drafts.iter().map(|p| p.pass.id).collect::<Vec<_>>(), vec![draft]);
}

#[tokio::test]
async fn listing_date_filters() {
  let f = fixture().await;
  let (_, token) = f.user();
  let b = f.building("Hall").await;
  let pass = f.desk.items.add_building_to_pass(&token, b).await.unwrap();
  let date = Utc.with_ymd_and_hms(2024, 6, 15, 18, 30, 0).unwrap();
  f.desk
    .lifecycle
    .edit(&token, pass, "Ivan".into(), Some(date))
    .await
    .unwrap();
  f.desk.lifecycle.submit(&token, pass).await.unwrap();

  let on_day = f
    .desk
    .queries
    .list_passes(&token, None, Some("15.06.2024"), Some("2024-06-15"))
    .await
    .unwrap();
  assert_eq!(on_day.len(), 1);

  let after = f
    .desk
    .queries
    .list_passes(&token, None, Some("2024-06-16"), None)
    .await
    .unwrap();
  assert!(after.is_empty());

  assert!(matches!(
    f.desk.queries.list_passes(&token, None, Some("2024-6-1"), None).await,
    Err(Error::MalformedDate(_))
  ));
}

#[tokio::test]
async fn draft_badges_are_empty_without_draft() {
  let f = fixture().await;
  let (_, token) = f.user();

  assert_eq!(f.desk.queries.get_pass_id(&token).await.unwrap(), None);
  assert_eq!(f.desk.queries.get_items_count(&token).await.unwrap(), 0);

  let b1 = f.building("One").await;
  let b2 = f.building("Two").await;
  let pass = f.desk.items.add_building_to_pass(&token, b1).await.unwrap();
  f.desk.items.add_building_to_pass(&token, b2).await.unwrap();

  assert_eq!(f.desk.queries.get_pass_id(&token).await.unwrap(), Some(pass));
  assert_eq!(f.desk.queries.get_items_count(&token).await.unwrap(), 2);
}

// ─── Catalog ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn catalog_mutations_are_admin_only() {
  let f = fixture().await;
  let (_, user) = f.user();
  let b = f.building("Hall").await;
  let input = || NewBuilding { name: "X".into(), description: String::new() };

  assert!(matches!(
    f.desk.catalog.add_building(&user, input()).await,
    Err(Error::NoPermission)
  ));
  assert!(matches!(
    f.desk.catalog.edit_building(&user, b, "Y".into(), String::new()).await,
    Err(Error::NoPermission)
  ));
  assert!(matches!(
    f.desk.catalog.delete_building(&user, b).await,
    Err(Error::NoPermission)
  ));
  assert!(matches!(
    f.desk.catalog.replace_preview(&user, b, vec![1, 2, 3]).await,
    Err(Error::NoPermission)
  ));
  assert!(matches!(
    f.desk.catalog.add_building("", input()).await,
    Err(Error::AuthToken)
  ));

  assert_eq!(f.desk.catalog.get_building(b).await.unwrap().name, "Hall");
}

#[tokio::test]
async fn find_buildings_matches_active_substrings() {
  let f = fixture().await;
  f.building("Main Hall").await;
  f.building("Sports Hall").await;
  let lib = f.building("Library").await;

  assert_eq!(f.desk.catalog.find_buildings("").await.unwrap().len(), 3);
  assert_eq!(f.desk.catalog.find_buildings("  ").await.unwrap().len(), 3);
  assert_eq!(f.desk.catalog.find_buildings("hall").await.unwrap().len(), 2);

  f.desk.catalog.delete_building(&f.admin, lib).await.unwrap();
  assert_eq!(f.desk.catalog.find_buildings("").await.unwrap().len(), 2);
  assert!(f.desk.catalog.find_buildings("Lib").await.unwrap().is_empty());
}

#[tokio::test]
async fn edit_and_delete_building() {
  let f = fixture().await;
  let b = f.building("Old").await;

  f.desk
    .catalog
    .edit_building(&f.admin, b, "New".into(), "Renovated".into())
    .await
    .unwrap();
  let fetched = f.desk.catalog.get_building(b).await.unwrap();
  assert_eq!(fetched.name, "New");
  assert_eq!(fetched.description, "Renovated");

  f.desk.catalog.delete_building(&f.admin, b).await.unwrap();
  assert!(matches!(f.desk.catalog.get_building(b).await, Err(Error::BuildingNotFound)));
  assert!(f.images.log().contains(&Stored::PhotoDeleted(b)));

  assert!(matches!(
    f.desk.catalog.edit_building(&f.admin, b, "Z".into(), String::new()).await,
    Err(Error::BuildingNotFound)
  ));
  assert!(matches!(
    f.desk.catalog.delete_building(&f.admin, Uuid::new_v4()).await,
    Err(Error::BuildingNotFound)
  ));
}

#[tokio::test]
async fn delete_building_succeeds_once_hidden() {
  let f = fixture().await;
  let b = f.building("Gallery").await;
  f.desk
    .catalog
    .replace_preview(&f.admin, b, vec![1, 2, 3])
    .await
    .unwrap();
  f.images.fail_deletes.store(true, Ordering::SeqCst);

  f.desk.catalog.delete_building(&f.admin, b).await.unwrap();

  let hidden = f.store.get(b).await.unwrap();
  assert!(!hidden.active);
  assert_eq!(hidden.image_url, "");
}

#[tokio::test]
async fn replace_preview_survives_failed_cleanup() {
  let f = fixture().await;
  let b = f.building("Hall").await;
  f.images.fail_deletes.store(true, Ordering::SeqCst);

  let url = f
    .desk
    .catalog
    .replace_preview(&f.admin, b, vec![0x89, b'P', b'N', b'G'])
    .await
    .unwrap();

  assert_eq!(url, format!("/buildings/{b}.png"));
  assert_eq!(f.desk.catalog.get_building(b).await.unwrap().image_url, url);
  assert_eq!(f.images.log(), vec![Stored::Photo(b)]);
}

#[tokio::test]
async fn replace_preview_deletes_old_photo_first() {
  let f = fixture().await;
  let b = f.building("Hall").await;

  f.desk.catalog.replace_preview(&f.admin, b, vec![1]).await.unwrap();

  assert_eq!(f.images.log(), vec![Stored::PhotoDeleted(b), Stored::Photo(b)]);
}

// ─── Users ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn register_and_login() {
  let f = fixture().await;
  let id = f.desk.users.register("ivan", "hunter2hunter2").await.unwrap();

  let token = f.desk.users.login("ivan", "hunter2hunter2").await.unwrap();
  let claims = f.tokens.claims(&token).unwrap();
  assert_eq!(claims, Claims::user(id));

  assert!(matches!(
    f.desk.users.login("ivan", "wrong-password").await,
    Err(Error::InvalidCredentials)
  ));
  assert!(matches!(
    f.desk.users.login("nobody", "hunter2hunter2").await,
    Err(Error::InvalidCredentials)
  ));
}

#[tokio::test]
async fn register_validates_input() {
  let f = fixture().await;
  assert!(matches!(
    f.desk.users.register("ivan", "short").await,
    Err(Error::ShortPassword)
  ));

  f.desk.users.register("ivan", "long enough").await.unwrap();
  assert!(matches!(
    f.desk.users.register("ivan", "another password").await,
    Err(Error::UserAlreadyExists)
  ));
}

#[tokio::test]
async fn registered_user_drives_a_pass() {
  let f = fixture().await;
  f.desk.users.register("ivan", "long enough").await.unwrap();
  let token = f.desk.users.login("ivan", "long enough").await.unwrap();
  let b = f.building("Hall").await;

  let pass = f.desk.items.add_building_to_pass(&token, b).await.unwrap();
  f.desk
    .lifecycle
    .edit(&token, pass, "Guest".into(), None)
    .await
    .unwrap();
  f.desk.lifecycle.submit(&token, pass).await.unwrap();

  let listed = f.desk.queries.list_passes(&f.admin, None, None, None).await.unwrap();
  assert_eq!(listed.len(), 1);
  assert_eq!(listed[0].creator_login, "ivan");
}

#[tokio::test]
async fn admin_seeding_and_profile_edit() {
  let f = fixture().await;
  f.desk.users.register_admin("root", "administrator").await.unwrap();
  let token = f.desk.users.login("root", "administrator").await.unwrap();
  assert!(f.tokens.claims(&token).unwrap().is_admin);

  f.desk.users.register("ivan", "long enough").await.unwrap();
  assert!(matches!(
    f.desk.users.edit_profile(&token, "ivan", "administrator").await,
    Err(Error::UserAlreadyExists)
  ));
  assert!(matches!(
    f.desk.users.edit_profile(&token, "root2", "short").await,
    Err(Error::ShortPassword)
  ));

  f.desk
    .users
    .edit_profile(&token, "root2", "new password")
    .await
    .unwrap();
  assert!(f.desk.users.login("root2", "new password").await.is_ok());
  assert!(matches!(
    f.desk.users.login("root", "administrator").await,
    Err(Error::InvalidCredentials)
  ));
}
