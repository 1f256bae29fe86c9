//! Buildings: the catalog entries that passes grant access to.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A physical building. `active == false` means soft-deleted: the row is
/// kept for pass history but hidden from catalog queries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Building {
  pub id:          Uuid,
  pub name:        String,
  pub description: String,
  /// Path of the preview photo, relative to the public image host.
  pub image_url:   String,
  pub active:      bool,
}

/// Input to [`crate::store::BuildingRepository::save`].
#[derive(Debug, Clone)]
pub struct NewBuilding {
  pub name:        String,
  pub description: String,
}

impl Building {
  /// A fresh, active building with no photo.
  pub fn new(input: NewBuilding) -> Self {
    Self {
      id:          Uuid::new_v4(),
      name:        input.name,
      description: input.description,
      image_url:   String::new(),
      active:      true,
    }
  }
}
