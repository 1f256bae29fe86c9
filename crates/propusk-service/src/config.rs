//! Engine configuration.

use serde::Deserialize;
use uuid::Uuid;

fn default_building_images_prefix() -> String { "buildings".to_string() }

/// The settings the engine needs from the server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceConfig {
  /// Scheme and host prefixed to QR payloads, e.g. `https://propusk.example`.
  pub public_base_url:        String,
  /// First path segment of building photo URLs.
  #[serde(default = "default_building_images_prefix")]
  pub building_images_prefix: String,
}

impl ServiceConfig {
  pub fn new(public_base_url: impl Into<String>) -> Self {
    Self {
      public_base_url:        public_base_url.into(),
      building_images_prefix: default_building_images_prefix(),
    }
  }

  /// The URL encoded into a pass's QR code.
  pub fn pass_url(&self, pass_id: Uuid) -> String {
    format!("{}/passes/{pass_id}", self.public_base_url.trim_end_matches('/'))
  }

  /// `/{prefix}/{id}.png`
  pub fn building_image_url(&self, building_id: Uuid) -> String {
    format!(
      "/{}/{building_id}.png",
      self.building_images_prefix.trim_matches('/')
    )
  }
}
