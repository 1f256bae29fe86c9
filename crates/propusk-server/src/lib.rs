//! propusk server: wiring of the engine to its concrete collaborators.
//!
//! The binary in `main.rs` loads a [`ServerConfig`], opens the SQLite store,
//! and serves [`router`] over HTTP.

pub mod config;
pub mod images;
pub mod jwt;

use std::sync::Arc;

use axum::Router;
use propusk_service::PassDesk;
use propusk_store_sqlite::SqliteStore;
use tower_http::{services::ServeDir, trace::TraceLayer};

pub use config::ServerConfig;
pub use images::FsImageStore;
pub use jwt::JwtTokens;

/// The engine over its production collaborators.
pub type Desk = PassDesk<SqliteStore, JwtTokens, FsImageStore>;

/// Build the desk for `config` over an opened store.
pub fn desk(store: SqliteStore, config: &ServerConfig) -> (Arc<Desk>, Arc<FsImageStore>) {
  let images = Arc::new(FsImageStore::new(
    &config.image_dir,
    &config.building_images_prefix,
  ));
  let tokens = Arc::new(JwtTokens::new(
    config.jwt_secret.as_bytes(),
    config.token_ttl_secs,
  ));
  let desk = PassDesk::new(Arc::new(store), tokens, images.clone(), config.service());
  (Arc::new(desk), images)
}

/// `/api/*` JSON routes plus the read-only image tree.
pub fn router(desk: Arc<Desk>, images: &FsImageStore, config: &ServerConfig) -> Router {
  let photos = format!("/{}", config.building_images_prefix.trim_matches('/'));
  Router::new()
    .nest("/api", propusk_api::api_router(desk))
    .nest_service(&photos, ServeDir::new(images.building_dir()))
    .nest_service(
      &format!("/{}", images::QR_DIR),
      ServeDir::new(images.qr_dir()),
    )
    .layer(TraceLayer::new_for_http())
}

#[cfg(test)]
mod tests {
  use std::path::PathBuf;

  use axum::{
    body::Body,
    http::{Request, StatusCode},
  };
  use propusk_core::{auth::TokenIssuer, media::ImageStore, user::Claims};
  use tower::ServiceExt as _;
  use uuid::Uuid;

  use super::*;

  fn config(image_dir: PathBuf) -> ServerConfig {
    ServerConfig {
      host: "127.0.0.1".into(),
      port: 0,
      store_path: PathBuf::from(":memory:"),
      image_dir,
      public_base_url: "http://localhost".into(),
      jwt_secret: "test-secret".into(),
      token_ttl_secs: 60,
      building_images_prefix: "buildings".into(),
    }
  }

  async fn get(app: Router, uri: &str, token: Option<&str>) -> StatusCode {
    let mut req = Request::builder().uri(uri);
    if let Some(t) = token {
      req = req.header("authorization", format!("Bearer {t}"));
    }
    app
      .oneshot(req.body(Body::empty()).unwrap())
      .await
      .unwrap()
      .status()
  }

  #[tokio::test]
  async fn serves_api_and_stored_images() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = config(dir.path().to_path_buf());
    let store = SqliteStore::open_in_memory().await.unwrap();
    let (desk, images) = desk(store, &cfg);

    let building = Uuid::new_v4();
    images.save_building_photo(building, vec![1, 2, 3]).await.unwrap();
    let pass = Uuid::new_v4();
    images.save_qr_code(pass, vec![4, 5]).await.unwrap();

    let app = router(desk, &images, &cfg);

    assert_eq!(get(app.clone(), "/api/buildings", None).await, StatusCode::OK);
    assert_eq!(
      get(app.clone(), &format!("/buildings/{building}.png"), None).await,
      StatusCode::OK
    );
    assert_eq!(
      get(app.clone(), &format!("/qrcodes/{pass}.png"), None).await,
      StatusCode::OK
    );
    assert_eq!(
      get(app.clone(), &format!("/buildings/{}.png", Uuid::new_v4()), None).await,
      StatusCode::NOT_FOUND
    );
  }

  #[tokio::test]
  async fn jwt_tokens_reach_the_engine() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = config(dir.path().to_path_buf());
    let store = SqliteStore::open_in_memory().await.unwrap();
    let (desk, images) = desk(store, &cfg);
    let app = router(desk, &images, &cfg);

    let token = JwtTokens::new(cfg.jwt_secret.as_bytes(), 60)
      .issue(Claims::user(Uuid::new_v4()))
      .unwrap();

    assert_eq!(get(app.clone(), "/api/passes", Some(&token)).await, StatusCode::OK);
    assert_eq!(
      get(app.clone(), "/api/passes", Some("forged")).await,
      StatusCode::UNAUTHORIZED
    );
  }
}
