//! # cb-auth-simple
//!
//! Implementations of `CredentialScheme`.
//!
//! `PlaintextScheme` matches how existing member rows were written and is a
//! known gap, not a recommendation. `Argon2Scheme` stores PHC-format hashes;
//! moving to it means re-sealing every stored credential.

use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use cb_core::error::{AppError, Result};
use cb_core::traits::CredentialScheme;

/// Stores passwords verbatim.
#[derive(Debug, Default, Clone, Copy)]
pub struct PlaintextScheme;

impl CredentialScheme for PlaintextScheme {
    fn seal(&self, password: &str) -> Result<String> {
        Ok(password.to_string())
    }

    fn verify(&self, password: &str, stored: &str) -> bool {
        constant_time_eq(password.as_bytes(), stored.as_bytes())
    }
}

/// Argon2id with the crate's default cost parameters and a 16-byte random salt.
#[derive(Default, Clone)]
pub struct Argon2Scheme {
    hasher: Argon2<'static>,
}

impl Argon2Scheme {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CredentialScheme for Argon2Scheme {
    fn seal(&self, password: &str) -> Result<String> {
        let mut salt = [0u8; 16];
        getrandom::getrandom(&mut salt)
            .map_err(|e| AppError::Storage(format!("salt generation failed: {e}")))?;
        let salt = SaltString::encode_b64(&salt)
            .map_err(|e| AppError::Storage(format!("salt encoding failed: {e}")))?;

        self.hasher
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| AppError::Storage(format!("password hashing failed: {e}")))
    }

    /// Verifies a password against a stored PHC string. Anything that does
    /// not parse as a hash (e.g., a legacy plaintext row) is a mismatch.
    fn verify(&self, password: &str, stored: &str) -> bool {
        let parsed_hash = match PasswordHash::new(stored) {
            Ok(p) => p,
            Err(_) => {
                tracing::warn!("stored credential is not a PHC hash");
                return false;
            }
        };
        self.hasher
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_ok()
    }
}

/// Compares without short-circuiting on the first differing byte.
fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}
