//! Token verification and issuance seams.
//!
//! Verification is CPU-only, so these traits are synchronous.

use crate::{Result, user::Claims};

/// Decodes a bearer credential into [`Claims`].
pub trait TokenVerifier: Send + Sync + 'static {
  /// Fails with [`crate::Error::AuthToken`] when the token is missing,
  /// malformed, badly signed or expired.
  fn claims(&self, token: &str) -> Result<Claims>;
}

/// Mints bearer credentials for authenticated users.
pub trait TokenIssuer: Send + Sync + 'static {
  fn issue(&self, claims: Claims) -> Result<String>;
}
