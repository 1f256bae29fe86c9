//! Binary object storage for building photos and pass QR codes.
//!
//! No binary data lives in the relational store; rows only carry the URL
//! path under which the object is published.

use std::future::Future;

use uuid::Uuid;

use crate::store::StoreResult;

pub trait ImageStore: Send + Sync + 'static {
  fn save_building_photo(
    &self,
    building_id: Uuid,
    bytes: Vec<u8>,
  ) -> impl Future<Output = StoreResult<()>> + Send + '_;

  /// Deleting a photo that does not exist is not an error.
  fn delete_building_photo(
    &self,
    building_id: Uuid,
  ) -> impl Future<Output = StoreResult<()>> + Send + '_;

  fn save_qr_code(
    &self,
    pass_id: Uuid,
    png: Vec<u8>,
  ) -> impl Future<Output = StoreResult<()>> + Send + '_;
}
