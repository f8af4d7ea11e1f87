/*
 * Responsibility
 * - password hash / verify の collaborator
 * - 実装は argon2 (PHC 文字列として digest を保存)
 */
use argon2::password_hash::{SaltString, rand_core::OsRng};
use argon2::{Argon2, PasswordHash, PasswordVerifier};
use thiserror::Error;
use tracing::error;

#[derive(Debug, Error)]
#[error("failed to hash password")]
pub struct PasswordError;

pub trait PasswordHasher: Send + Sync {
    fn hash(&self, plain: &str) -> Result<String, PasswordError>;

    fn verify(&self, plain: &str, digest: &str) -> bool;
}

#[derive(Debug, Default, Clone)]
pub struct Argon2Hasher;

impl PasswordHasher for Argon2Hasher {
    fn hash(&self, plain: &str) -> Result<String, PasswordError> {
        use argon2::PasswordHasher as _;

        let salt = SaltString::generate(&mut OsRng);
        Argon2::default()
            .hash_password(plain.as_bytes(), &salt)
            .map(|h| h.to_string())
            .map_err(|e| {
                error!(error = %e, "argon2 hashing failed");
                PasswordError
            })
    }

    fn verify(&self, plain: &str, digest: &str) -> bool {
        // An unparsable digest never matches.
        let Ok(parsed) = PasswordHash::new(digest) else {
            return false;
        };
        Argon2::default()
            .verify_password(plain.as_bytes(), &parsed)
            .is_ok()
    }
}
