//! Identity resolution for every engine operation.

use std::sync::Arc;

use propusk_core::{Error, Result, auth::TokenVerifier, user::Claims};
use uuid::Uuid;

/// Turns a bearer token into [`Claims`] through the configured verifier.
pub struct AuthorizationGuard<V> {
  verifier: Arc<V>,
}

impl<V> Clone for AuthorizationGuard<V> {
  fn clone(&self) -> Self { Self { verifier: self.verifier.clone() } }
}

impl<V: TokenVerifier> AuthorizationGuard<V> {
  pub fn new(verifier: Arc<V>) -> Self { Self { verifier } }

  /// An empty token is a missing token.
  pub fn claims(&self, token: &str) -> Result<Claims> {
    let token = token.trim();
    if token.is_empty() {
      return Err(Error::AuthToken);
    }
    self.verifier.claims(token)
  }

  /// Claims of an admin caller, else `NoPermission`.
  pub fn admin(&self, token: &str, action: &'static str) -> Result<Claims> {
    let claims = self.claims(token)?;
    if !claims.is_admin {
      return Err(denied(&claims, action));
    }
    Ok(claims)
  }
}

/// Fails unless `claims` belongs to `owner`.
pub(crate) fn ensure_owner(
  claims: &Claims,
  owner: Uuid,
  action: &'static str,
) -> Result<()> {
  if claims.subject_id == owner {
    Ok(())
  } else {
    Err(denied(claims, action))
  }
}

pub(crate) fn ensure_admin(claims: &Claims, action: &'static str) -> Result<()> {
  if claims.is_admin { Ok(()) } else { Err(denied(claims, action)) }
}

fn denied(claims: &Claims, action: &'static str) -> Error {
  tracing::info!(subject = %claims.subject_id, action, "permission denied");
  Error::NoPermission
}
