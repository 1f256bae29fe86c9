//! Filesystem object store.
//!
//! Layout under the root directory:
//!
//! ```text
//! {root}/{building_prefix}/{building_id}.png
//! {root}/qrcodes/{pass_id}.png
//! ```
//!
//! The same tree is served read-only by the HTTP router, so a building's
//! `image_url` resolves against the server origin.

use std::{
  io,
  path::{Path, PathBuf},
};

use propusk_core::{
  StoreError,
  media::ImageStore,
  store::StoreResult,
};
use uuid::Uuid;

pub const QR_DIR: &str = "qrcodes";

pub struct FsImageStore {
  root:            PathBuf,
  building_prefix: String,
}

impl FsImageStore {
  pub fn new(root: impl Into<PathBuf>, building_prefix: impl Into<String>) -> Self {
    Self {
      root:            root.into(),
      building_prefix: building_prefix.into().trim_matches('/').to_string(),
    }
  }

  pub fn building_dir(&self) -> PathBuf { self.root.join(&self.building_prefix) }

  pub fn qr_dir(&self) -> PathBuf { self.root.join(QR_DIR) }

  fn building_path(&self, id: Uuid) -> PathBuf {
    self.building_dir().join(format!("{id}.png"))
  }

  fn qr_path(&self, id: Uuid) -> PathBuf { self.qr_dir().join(format!("{id}.png")) }
}

/// Write through a sibling temp file so readers never see a partial image.
async fn write_file(path: &Path, bytes: Vec<u8>) -> io::Result<()> {
  if let Some(dir) = path.parent() {
    tokio::fs::create_dir_all(dir).await?;
  }
  let tmp = path.with_extension("png.tmp");
  tokio::fs::write(&tmp, bytes).await?;
  tokio::fs::rename(&tmp, path).await
}

impl ImageStore for FsImageStore {
  async fn save_building_photo(&self, building_id: Uuid, bytes: Vec<u8>) -> StoreResult<()> {
    write_file(&self.building_path(building_id), bytes)
      .await
      .map_err(StoreError::backend)
  }

  async fn delete_building_photo(&self, building_id: Uuid) -> StoreResult<()> {
    match tokio::fs::remove_file(self.building_path(building_id)).await {
      Ok(()) => Ok(()),
      Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
      Err(e) => Err(StoreError::backend(e)),
    }
  }

  async fn save_qr_code(&self, pass_id: Uuid, png: Vec<u8>) -> StoreResult<()> {
    write_file(&self.qr_path(pass_id), png)
      .await
      .map_err(StoreError::backend)
  }
}
