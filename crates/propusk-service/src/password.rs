//! argon2 password hashing.

use argon2::{
  Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
  password_hash::SaltString,
};
use propusk_core::{Error, Result, user::MIN_PASSWORD_LEN};
use rand_core::OsRng;

/// Rejects passwords shorter than [`MIN_PASSWORD_LEN`] characters.
pub fn ensure_strength(password: &str) -> Result<()> {
  if password.chars().count() < MIN_PASSWORD_LEN {
    return Err(Error::ShortPassword);
  }
  Ok(())
}

/// PHC string, e.g. `$argon2id$v=19$…`
pub fn hash(password: &str) -> Result<String> {
  let salt = SaltString::generate(&mut OsRng);
  Ok(
    Argon2::default()
      .hash_password(password.as_bytes(), &salt)
      .map_err(|e| Error::Internal(format!("argon2 error: {e}")))?
      .to_string(),
  )
}

/// `false` for a wrong password and for an unparseable hash alike.
pub fn verify(password: &str, phc: &str) -> bool {
  let Ok(parsed) = PasswordHash::new(phc) else {
    return false;
  };
  Argon2::default()
    .verify_password(password.as_bytes(), &parsed)
    .is_ok()
}
