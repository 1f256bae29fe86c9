//! HS256 bearer tokens.

use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use propusk_core::{
  Error, Result,
  auth::{TokenIssuer, TokenVerifier},
  user::Claims,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Wire form of [`Claims`].
#[derive(Debug, Serialize, Deserialize)]
struct JwtClaims {
  sub:      Uuid,
  is_admin: bool,
  iat:      i64,
  exp:      i64,
}

/// Signs and verifies tokens with one shared secret.
pub struct JwtTokens {
  encoding: EncodingKey,
  decoding: DecodingKey,
  ttl:      Duration,
}

impl JwtTokens {
  pub fn new(secret: &[u8], ttl_secs: u64) -> Self {
    Self {
      encoding: EncodingKey::from_secret(secret),
      decoding: DecodingKey::from_secret(secret),
      ttl:      Duration::seconds(
        i64::try_from(ttl_secs).unwrap_or(i64::MAX).min(i64::MAX / 1000),
      ),
    }
  }
}

impl TokenIssuer for JwtTokens {
  fn issue(&self, claims: Claims) -> Result<String> {
    let now = Utc::now();
    let expires = now
      .checked_add_signed(self.ttl)
      .ok_or_else(|| Error::Internal("token lifetime out of range".into()))?;
    let wire = JwtClaims {
      sub:      claims.subject_id,
      is_admin: claims.is_admin,
      iat:      now.timestamp(),
      exp:      expires.timestamp(),
    };
    encode(&Header::default(), &wire, &self.encoding)
      .map_err(|e| Error::Internal(format!("token encode: {e}")))
  }
}

impl TokenVerifier for JwtTokens {
  fn claims(&self, token: &str) -> Result<Claims> {
    let data = decode::<JwtClaims>(token, &self.decoding, &Validation::default())
      .map_err(|e| {
        tracing::debug!(error = %e, "token rejected");
        Error::AuthToken
      })?;
    Ok(Claims {
      subject_id: data.claims.sub,
      is_admin:   data.claims.is_admin,
    })
  }
}
