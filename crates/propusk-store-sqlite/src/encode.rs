//! Encoding and decoding helpers between domain types and SQLite columns.
//!
//! Timestamps are stored as RFC 3339 UTC strings with a fixed nanosecond
//! width, so lexicographic order matches chronological order. UUIDs are
//! stored as hyphenated lowercase strings. Pass status is its integer code.

use chrono::{DateTime, SecondsFormat, Utc};
use propusk_core::{
  building::Building,
  pass::{Pass, PassItem, PassItemDetails, PassStatus, PassSummary},
  user::User,
};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Scalars ─────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

pub fn encode_dt(dt: DateTime<Utc>) -> String {
  dt.to_rfc3339_opts(SecondsFormat::Nanos, true)
}

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

fn decode_opt_dt(s: Option<String>) -> Result<Option<DateTime<Utc>>> {
  s.as_deref().map(decode_dt).transpose()
}

pub fn encode_status(s: PassStatus) -> i64 { i64::from(s.code()) }

pub fn decode_status(v: i64) -> Result<PassStatus> {
  u8::try_from(v)
    .ok()
    .and_then(PassStatus::from_repr)
    .ok_or(Error::UnknownStatus(v))
}

// ─── Passes ──────────────────────────────────────────────────────────────────

/// Column list matching [`RawPass::from_row`]; expects the table alias `p`.
pub const PASS_COLUMNS: &str = "p.pass_id, p.creator_id, p.moderator_id, \
  p.status, p.visitor, p.visit_date, p.created_at, p.formed_at, p.completed_at";

/// Raw values read directly from a `passes` row.
pub struct RawPass {
  pub pass_id:      String,
  pub creator_id:   String,
  pub moderator_id: Option<String>,
  pub status:       i64,
  pub visitor:      String,
  pub visit_date:   Option<String>,
  pub created_at:   String,
  pub formed_at:    Option<String>,
  pub completed_at: Option<String>,
}

impl RawPass {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      pass_id:      row.get(0)?,
      creator_id:   row.get(1)?,
      moderator_id: row.get(2)?,
      status:       row.get(3)?,
      visitor:      row.get(4)?,
      visit_date:   row.get(5)?,
      created_at:   row.get(6)?,
      formed_at:    row.get(7)?,
      completed_at: row.get(8)?,
    })
  }

  pub fn into_pass(self) -> Result<Pass> {
    Ok(Pass {
      id:           decode_uuid(&self.pass_id)?,
      creator_id:   decode_uuid(&self.creator_id)?,
      moderator_id: self.moderator_id.as_deref().map(decode_uuid).transpose()?,
      status:       decode_status(self.status)?,
      visitor_name: self.visitor,
      visit_date:   decode_opt_dt(self.visit_date)?,
      created_at:   decode_dt(&self.created_at)?,
      formed_at:    decode_opt_dt(self.formed_at)?,
      completed_at: decode_opt_dt(self.completed_at)?,
    })
  }
}

/// A `passes` row joined with the creator's login.
pub struct RawSummary {
  pub pass:  RawPass,
  pub login: String,
}

impl RawSummary {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self { pass: RawPass::from_row(row)?, login: row.get(9)? })
  }

  pub fn into_summary(self) -> Result<PassSummary> {
    Ok(PassSummary { pass: self.pass.into_pass()?, creator_login: self.login })
  }
}

// ─── Items ───────────────────────────────────────────────────────────────────

pub struct RawItem {
  pub pass_id:     String,
  pub building_id: String,
  pub comment:     String,
  pub was_visited: bool,
}

impl RawItem {
  pub fn into_item(self) -> Result<PassItem> {
    Ok(PassItem {
      pass_id:     decode_uuid(&self.pass_id)?,
      building_id: decode_uuid(&self.building_id)?,
      comment:     self.comment,
      was_visited: self.was_visited,
    })
  }
}

pub struct RawItemDetails {
  pub building_id: String,
  pub name:        String,
  pub description: String,
  pub image_url:   String,
  pub comment:     String,
  pub was_visited: bool,
}

impl RawItemDetails {
  pub fn into_details(self) -> Result<PassItemDetails> {
    Ok(PassItemDetails {
      building_id: decode_uuid(&self.building_id)?,
      name:        self.name,
      description: self.description,
      image_url:   self.image_url,
      comment:     self.comment,
      was_visited: self.was_visited,
    })
  }
}

// ─── Buildings ───────────────────────────────────────────────────────────────

pub const BUILDING_COLUMNS: &str =
  "building_id, name, description, image_url, active";

pub struct RawBuilding {
  pub building_id: String,
  pub name:        String,
  pub description: String,
  pub image_url:   String,
  pub active:      bool,
}

impl RawBuilding {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      building_id: row.get(0)?,
      name:        row.get(1)?,
      description: row.get(2)?,
      image_url:   row.get(3)?,
      active:      row.get(4)?,
    })
  }

  pub fn into_building(self) -> Result<Building> {
    Ok(Building {
      id:          decode_uuid(&self.building_id)?,
      name:        self.name,
      description: self.description,
      image_url:   self.image_url,
      active:      self.active,
    })
  }
}

// ─── Users ───────────────────────────────────────────────────────────────────

pub struct RawUser {
  pub user_id:    String,
  pub login:      String,
  pub pass_hash:  String,
  pub is_admin:   bool,
  pub created_at: String,
}

impl RawUser {
  pub fn into_user(self) -> Result<User> {
    Ok(User {
      id:            decode_uuid(&self.user_id)?,
      login:         self.login,
      password_hash: self.pass_hash,
      is_admin:      self.is_admin,
      created_at:    decode_dt(&self.created_at)?,
    })
  }
}
