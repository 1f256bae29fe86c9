//! Users and the verified identity extracted from a bearer token.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Minimum password length, counted in characters.
pub const MIN_PASSWORD_LEN: usize = 8;

/// A registered account. `password_hash` is an opaque PHC string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
  pub id:            Uuid,
  pub login:         String,
  pub password_hash: String,
  pub is_admin:      bool,
  pub created_at:    DateTime<Utc>,
}

/// The verified identity behind a request. Derived from the token on every
/// call; never cached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
  pub subject_id: Uuid,
  pub is_admin:   bool,
}

impl Claims {
  pub fn user(subject_id: Uuid) -> Self { Self { subject_id, is_admin: false } }

  pub fn admin(subject_id: Uuid) -> Self { Self { subject_id, is_admin: true } }
}
