//! Registration, login and profile edits.

use std::sync::Arc;

use chrono::Utc;
use propusk_core::{
  Error, Result, StoreError,
  auth::{TokenIssuer, TokenVerifier},
  store::PassStore,
  user::{Claims, User},
};
use uuid::Uuid;

use crate::{
  guard::AuthorizationGuard,
  lookup::{StoreResultExt as _, optional},
  password,
};

pub struct UserService<S, T> {
  store:  Arc<S>,
  guard:  AuthorizationGuard<T>,
  tokens: Arc<T>,
}

impl<S, T> UserService<S, T>
where
  S: PassStore,
  T: TokenVerifier + TokenIssuer,
{
  pub fn new(store: Arc<S>, guard: AuthorizationGuard<T>, tokens: Arc<T>) -> Self {
    Self { store, guard, tokens }
  }

  /// Create a regular (non-admin) account.
  pub async fn register(&self, login: &str, password: &str) -> Result<Uuid> {
    self.create(login, password, false).await
  }

  /// Create an admin account. Reached only from the server's seeding
  /// command, never from the network.
  pub async fn register_admin(&self, login: &str, password: &str) -> Result<Uuid> {
    self.create(login, password, true).await
  }

  /// Exchange credentials for a bearer token.
  pub async fn login(&self, login: &str, password: &str) -> Result<String> {
    let user = optional(self.store.find_by_login(login.to_owned()).await)?
      .ok_or(Error::InvalidCredentials)?;
    if !password::verify(password, &user.password_hash) {
      tracing::info!(login, "rejected login");
      return Err(Error::InvalidCredentials);
    }
    self.tokens.issue(Claims {
      subject_id: user.id,
      is_admin:   user.is_admin,
    })
  }

  /// Change the caller's own login and password.
  pub async fn edit_profile(&self, token: &str, login: &str, password: &str) -> Result<()> {
    let claims = self.guard.claims(token)?;
    password::ensure_strength(password)?;
    let hash = password::hash(password)?;
    match self
      .store
      .update_user(claims.subject_id, login.to_owned(), hash)
      .await
    {
      Err(StoreError::NotFound) => Err(Error::InvalidCredentials),
      res => res.or_conflict(Error::UserAlreadyExists),
    }
  }

  async fn create(&self, login: &str, password: &str, is_admin: bool) -> Result<Uuid> {
    if optional(self.store.find_by_login(login.to_owned()).await)?.is_some() {
      return Err(Error::UserAlreadyExists);
    }
    password::ensure_strength(password)?;

    let user = User {
      id: Uuid::new_v4(),
      login: login.to_owned(),
      password_hash: password::hash(password)?,
      is_admin,
      created_at: Utc::now(),
    };
    let id = user.id;
    self
      .store
      .insert_user(user)
      .await
      .or_conflict(Error::UserAlreadyExists)?;
    tracing::info!(user_id = %id, login, is_admin, "user registered");
    Ok(id)
  }
}
