//! Argon2id password hashing and verification.

use argon2::password_hash::SaltString;
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};
use rand::rngs::OsRng;
use zeroize::Zeroizing;

use super::validation::FieldError;

const PASSWORD_MIN_BYTES: usize = 8;
/// Longer inputs are silently truncated by some hashers; reject them instead.
const PASSWORD_MAX_BYTES: usize = 72;

/// Errors raised while hashing or verifying passwords.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PasswordError {
    /// The stored hash is not a valid PHC string.
    #[error("stored password hash is malformed: {0}")]
    MalformedHash(String),
    /// Hashing failed.
    #[error("password hashing failed: {0}")]
    Hashing(String),
}

/// A plaintext password that passed policy checks. Wiped on drop.
#[derive(Clone)]
pub struct PlainPassword(Zeroizing<String>);

impl PlainPassword {
    /// Apply the length policy (8–72 bytes).
    ///
    /// # Errors
    /// Returns a [`FieldError`] on the `password` field.
    pub fn parse(raw: &str) -> Result<Self, FieldError> {
        if (PASSWORD_MIN_BYTES..=PASSWORD_MAX_BYTES).contains(&raw.len()) {
            Ok(Self(Zeroizing::new(raw.to_owned())))
        } else {
            Err(FieldError::new(
                "password",
                "length",
                format!(
                    "password must be between {PASSWORD_MIN_BYTES} and {PASSWORD_MAX_BYTES} bytes"
                ),
            ))
        }
    }

    /// Borrow the plaintext.
    #[must_use]
    pub fn expose(&self) -> &str {
        self.0.as_str()
    }
}

impl std::fmt::Debug for PlainPassword {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("PlainPassword(**redacted**)")
    }
}

/// Hash a password into an Argon2id PHC string.
///
/// # Errors
/// Returns [`PasswordError::Hashing`] if the hasher rejects its input.
pub fn hash_password(password: &str) -> Result<String, PasswordError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|err| PasswordError::Hashing(err.to_string()))
}

/// Verify a plaintext password against a stored PHC string.
///
/// Returns `Ok(false)` on mismatch.
///
/// # Errors
/// Returns [`PasswordError::MalformedHash`] when the stored hash cannot be
/// parsed or verification fails for reasons other than a mismatch.
pub fn verify_password(password: &str, hash: &str) -> Result<bool, PasswordError> {
    let parsed =
        PasswordHash::new(hash).map_err(|err| PasswordError::MalformedHash(err.to_string()))?;
    match Argon2::default().verify_password(password.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(err) => Err(PasswordError::MalformedHash(err.to_string())),
    }
}
