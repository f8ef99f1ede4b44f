use argon2::password_hash::SaltString;
use argon2::password_hash::rand_core::OsRng;
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};
use darzi_core::{DarziError, DarziResult};

/// Hash a password using Argon2id with a random salt.
pub fn hash_password(password: &str) -> DarziResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    let hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| DarziError::Crypto(format!("password hashing failed: {e}")))?;
    Ok(hash.to_string())
}

/// Verify a password against a stored Argon2id hash.
///
/// Returns `Ok(true)` on a match, `Ok(false)` on a mismatch; anything else
/// (malformed hash, parameter problems) is an error.
pub fn verify_password(password: &str, hash: &str) -> DarziResult<bool> {
    let parsed_hash = PasswordHash::new(hash)
        .map_err(|e| DarziError::Crypto(format!("invalid password hash: {e}")))?;
    match Argon2::default().verify_password(password.as_bytes(), &parsed_hash) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(DarziError::Crypto(format!(
            "password verification failed: {e}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verify_accepts_the_right_password() {
        let hash = hash_password("naap-jhok").unwrap();
        assert!(verify_password("naap-jhok", &hash).unwrap());
    }

    #[test]
    fn verify_rejects_the_wrong_password() {
        let hash = hash_password("naap-jhok").unwrap();
        assert!(!verify_password("jhol-jhaal", &hash).unwrap());
    }

    #[test]
    fn hashes_are_salted() {
        let a = hash_password("same-password").unwrap();
        let b = hash_password("same-password").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn garbage_hash_is_an_error() {
        assert!(verify_password("anything", "not-a-phc-string").is_err());
    }
}
