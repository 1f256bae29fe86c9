//! Runtime server configuration.

use std::path::PathBuf;

use propusk_service::ServiceConfig;
use serde::Deserialize;

fn default_host() -> String { "127.0.0.1".to_string() }
fn default_port() -> u16 { 8080 }
fn default_image_dir() -> PathBuf { PathBuf::from("images") }
fn default_token_ttl_secs() -> u64 { 3600 }
fn default_building_images_prefix() -> String { "buildings".to_string() }

/// Deserialised from `config.toml`, overridden by `PROPUSK_*` variables.
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
  #[serde(default = "default_host")]
  pub host:                   String,
  #[serde(default = "default_port")]
  pub port:                   u16,
  /// SQLite database file. A leading `~` is expanded.
  pub store_path:             PathBuf,
  /// Root of the filesystem object store for photos and QR codes.
  #[serde(default = "default_image_dir")]
  pub image_dir:              PathBuf,
  /// Public origin, e.g. `https://propusk.example`. Prefixes QR payloads.
  pub public_base_url:        String,
  /// HMAC secret for bearer tokens.
  pub jwt_secret:             String,
  #[serde(default = "default_token_ttl_secs")]
  pub token_ttl_secs:         u64,
  #[serde(default = "default_building_images_prefix")]
  pub building_images_prefix: String,
}

impl ServerConfig {
  /// Layer `path` (optional) under `PROPUSK_*` environment variables.
  pub fn load(path: impl Into<PathBuf>) -> Result<Self, config::ConfigError> {
    config::Config::builder()
      .add_source(config::File::from(path.into()).required(false))
      .add_source(config::Environment::with_prefix("PROPUSK"))
      .build()?
      .try_deserialize()
  }

  pub fn service(&self) -> ServiceConfig {
    ServiceConfig {
      public_base_url:        self.public_base_url.clone(),
      building_images_prefix: self.building_images_prefix.clone(),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn parse(toml: &str) -> Result<ServerConfig, config::ConfigError> {
    config::Config::builder()
      .add_source(config::File::from_str(toml, config::FileFormat::Toml))
      .build()?
      .try_deserialize()
  }

  #[test]
  fn minimal_file_gets_defaults() {
    let cfg = parse(
      r#"
        store_path      = "~/propusk.db"
        public_base_url = "https://propusk.example"
        jwt_secret      = "s3cret"
      "#,
    )
    .unwrap();

    assert_eq!(cfg.host, "127.0.0.1");
    assert_eq!(cfg.port, 8080);
    assert_eq!(cfg.token_ttl_secs, 3600);
    assert_eq!(cfg.image_dir, PathBuf::from("images"));
    assert_eq!(cfg.service().building_images_prefix, "buildings");
    assert_eq!(cfg.service().public_base_url, "https://propusk.example");
  }

  #[test]
  fn secret_is_required() {
    let err = parse(
      r#"
        store_path      = "propusk.db"
        public_base_url = "https://propusk.example"
      "#,
    )
    .unwrap_err();
    assert!(err.to_string().contains("jwt_secret"), "{err}");
  }
}
