//! The visitor permit, its status machine and its items.
//!
//! A pass is never physically deleted. `Deleted`, `Rejected` and `Completed`
//! are terminal logical states retained for history.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString, FromRepr, IntoStaticStr};
use uuid::Uuid;

// ─── Status ──────────────────────────────────────────────────────────────────

/// Lifecycle status of a pass. The discriminant is the value stored in the
/// `status` column.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Hash,
  Serialize,
  Deserialize,
  Display,
  EnumString,
  FromRepr,
  IntoStaticStr,
)]
#[repr(u8)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum PassStatus {
  Draft     = 0,
  Formed    = 1,
  Rejected  = 2,
  Completed = 3,
  Deleted   = 4,
}

impl PassStatus {
  /// Statuses shown in listings when the caller supplies no status filter:
  /// everything that has left the creator's private workspace.
  pub const LISTED_BY_DEFAULT: [PassStatus; 3] =
    [Self::Formed, Self::Rejected, Self::Completed];

  pub fn code(self) -> u8 { self as u8 }

  /// The complete set of legal status moves. `Edit` is not a move: it never
  /// changes status.
  pub fn can_transition_to(self, next: PassStatus) -> bool {
    use PassStatus::*;
    matches!(
      (self, next),
      (Draft, Formed) | (Draft, Deleted) | (Formed, Rejected) | (Formed, Completed)
    )
  }

  /// Visitor name and date may be changed in every state except `Completed`.
  pub fn allows_visitor_edit(self) -> bool { self != Self::Completed }
}

// ─── Pass ────────────────────────────────────────────────────────────────────

/// A visitor permit aggregating one or more buildings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pass {
  pub id:           Uuid,
  pub creator_id:   Uuid,
  /// The admin who rejected or completed the pass.
  pub moderator_id: Option<Uuid>,
  pub status:       PassStatus,
  pub visitor_name: String,
  /// Unset until the creator fills in visitor info.
  pub visit_date:   Option<DateTime<Utc>>,
  pub created_at:   DateTime<Utc>,
  pub formed_at:    Option<DateTime<Utc>>,
  pub completed_at: Option<DateTime<Utc>>,
}

impl Pass {
  /// A fresh draft owned by `creator_id`, with no visitor info.
  pub fn draft(creator_id: Uuid) -> Self {
    Self {
      id: Uuid::new_v4(),
      creator_id,
      moderator_id: None,
      status: PassStatus::Draft,
      visitor_name: String::new(),
      visit_date: None,
      created_at: Utc::now(),
      formed_at: None,
      completed_at: None,
    }
  }
}

/// The minimum needed for ownership and state checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PassShort {
  pub id:         Uuid,
  pub status:     PassStatus,
  pub creator_id: Uuid,
}

/// Input to [`crate::store::PassRepository::update_status`] and
/// [`crate::store::PassRepository::moderate`].
#[derive(Debug, Clone, Copy)]
pub struct StatusChange {
  /// The status the pass must still be in for the write to apply.
  pub from:         PassStatus,
  pub status:       PassStatus,
  pub moderator_id: Option<Uuid>,
  /// Stored as `formed_at` for `Formed`, as `completed_at` for `Completed`
  /// and `Rejected`; ignored otherwise.
  pub at:           DateTime<Utc>,
}

impl StatusChange {
  /// `from` → `status`, stamped now, with no moderator.
  pub fn new(from: PassStatus, status: PassStatus) -> Self {
    Self { from, status, moderator_id: None, at: Utc::now() }
  }

  pub fn by(self, moderator_id: Uuid) -> Self {
    Self { moderator_id: Some(moderator_id), ..self }
  }
}

// ─── Items ───────────────────────────────────────────────────────────────────

/// Association between a pass and one building. A building appears at most
/// once per pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PassItem {
  pub pass_id:     Uuid,
  pub building_id: Uuid,
  pub comment:     String,
  pub was_visited: bool,
}

/// A pass item joined with its building, for the long projection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PassItemDetails {
  pub building_id: Uuid,
  pub name:        String,
  pub description: String,
  pub image_url:   String,
  pub comment:     String,
  pub was_visited: bool,
}

// ─── Projections ─────────────────────────────────────────────────────────────

/// Long projection: the pass with every item and its building.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PassDetails {
  #[serde(flatten)]
  pub pass:  Pass,
  pub items: Vec<PassItemDetails>,
}

/// A listing row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PassSummary {
  #[serde(flatten)]
  pub pass:          Pass,
  pub creator_login: String,
}

#[cfg(test)]
mod tests {
  use std::str::FromStr;

  use super::*;

  #[test]
  fn status_codes_match_storage_values() {
    assert_eq!(PassStatus::Draft.code(), 0);
    assert_eq!(PassStatus::Formed.code(), 1);
    assert_eq!(PassStatus::Rejected.code(), 2);
    assert_eq!(PassStatus::Completed.code(), 3);
    assert_eq!(PassStatus::Deleted.code(), 4);
    assert_eq!(PassStatus::from_repr(3), Some(PassStatus::Completed));
    assert_eq!(PassStatus::from_repr(9), None);
  }

  #[test]
  fn status_parses_case_insensitively() {
    assert_eq!(PassStatus::from_str("Formed").unwrap(), PassStatus::Formed);
    assert_eq!(PassStatus::from_str("deleted").unwrap(), PassStatus::Deleted);
    assert!(PassStatus::from_str("archived").is_err());
    assert_eq!(PassStatus::Rejected.to_string(), "rejected");
  }

  #[test]
  fn transition_graph_is_forward_only() {
    use PassStatus::*;
    let all = [Draft, Formed, Rejected, Completed, Deleted];
    let legal: Vec<_> = all
      .iter()
      .flat_map(|a| all.iter().map(move |b| (*a, *b)))
      .filter(|(a, b)| a.can_transition_to(*b))
      .collect();
    assert_eq!(
      legal,
      vec![
        (Draft, Formed),
        (Draft, Deleted),
        (Formed, Rejected),
        (Formed, Completed),
      ]
    );
  }

  #[test]
  fn only_completed_blocks_visitor_edit() {
    assert!(PassStatus::Draft.allows_visitor_edit());
    assert!(PassStatus::Rejected.allows_visitor_edit());
    assert!(PassStatus::Deleted.allows_visitor_edit());
    assert!(!PassStatus::Completed.allows_visitor_edit());
  }

  #[test]
  fn details_serialise_flat() {
    let pass = Pass::draft(Uuid::new_v4());
    let details = PassDetails { pass: pass.clone(), items: vec![] };
    let json = serde_json::to_value(&details).unwrap();
    assert_eq!(json["status"], "draft");
    assert_eq!(json["id"], pass.id.to_string());
    assert!(json["items"].as_array().unwrap().is_empty());
  }
}
