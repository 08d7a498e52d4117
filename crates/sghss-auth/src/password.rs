//! Password hashing and verification.
//!
//! Uses Argon2id with a random per-hash salt. Hashes are stored in PHC
//! string format; plaintext passwords never reach storage.

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};

use sghss_core::ApiError;

/// Hash a password for storage.
///
/// # Errors
///
/// Returns an internal error if hashing fails (rare).
pub fn hash_password(password: &str) -> Result<String, ApiError> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| ApiError::internal(format!("password hashing failed: {e}")))?;
    Ok(hash.to_string())
}

/// Verify a password against a stored PHC hash.
///
/// Returns `false` both on mismatch and on an unparseable stored hash, so
/// a corrupted hash behaves like a failed login rather than a 500.
pub fn verify_password(password: &str, stored_hash: &str) -> bool {
    let Ok(parsed) = PasswordHash::new(stored_hash) else {
        return false;
    };
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify_roundtrip() {
        let hash = hash_password("senha123").unwrap();
        assert!(hash.starts_with("$argon2id$"));
        assert!(verify_password("senha123", &hash));
        assert!(!verify_password("senha124", &hash));
    }

    #[test]
    fn test_hashes_are_salted() {
        let a = hash_password("senha123").unwrap();
        let b = hash_password("senha123").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_garbage_hash_fails_closed() {
        assert!(!verify_password("senha123", "not-a-phc-string"));
    }
}
