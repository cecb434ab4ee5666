//! Password digests.
//!
//! # Responsibility
//! - Derive storable Argon2id digests from plaintext passwords.
//! - Verify candidate passwords against stored digests.
//!
//! # Invariants
//! - Every digest carries its own random salt.
//! - Stored values are PHC strings (`$argon2id$v=19$...`).
//! - Malformed stored values never verify.

use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;

pub use argon2::password_hash::Error as PasswordHashError;

/// Hashes `password` with a fresh random salt.
pub fn hash_password(password: &str) -> Result<String, PasswordHashError> {
    let salt = SaltString::generate(&mut rand::thread_rng());
    let digest = Argon2::default().hash_password(password.as_bytes(), &salt)?;
    Ok(digest.to_string())
}

/// Returns whether `password` matches the stored digest.
pub fn verify_password(password: &str, stored: &str) -> bool {
    let Ok(parsed) = PasswordHash::new(stored) else {
        return false;
    };
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok()
}
