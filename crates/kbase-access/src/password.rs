//! Account secrets
//!
//! `users.json` never holds a password, only the PHC string Argon2 produces
//! for it. The string carries salt and cost, so a directory written with one
//! set of parameters keeps authenticating after the defaults change.

use crate::error::{AccessError, AccessResult};
use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};

/// Turn a password into the string stored on a [`UserAccount`](crate::UserAccount)
///
/// # Errors
/// `PasswordHash` if Argon2 rejects the input
pub fn hash_password(password: &str) -> AccessResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    let stored = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| AccessError::PasswordHash(e.to_string()))?;
    Ok(stored.to_string())
}

/// Whether `stored` is a PHC string rather than a leftover plaintext value
#[must_use]
pub fn is_password_hash(stored: &str) -> bool {
    PasswordHash::new(stored).is_ok()
}

/// Check a login attempt against an account's stored string
///
/// # Errors
/// `PasswordHash` when `stored` does not parse, e.g. a plaintext password
/// copied in by hand
pub fn verify_password(password: &str, stored: &str) -> AccessResult<bool> {
    let stored = PasswordHash::new(stored).map_err(|e| AccessError::PasswordHash(e.to_string()))?;
    Ok(Argon2::default().verify_password(password.as_bytes(), &stored).is_ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stored_string_is_argon2id_phc() {
        let stored = hash_password("pw-ravi").unwrap();
        let parsed = PasswordHash::new(&stored).unwrap();
        assert_eq!(parsed.algorithm.as_str(), "argon2id");
        assert!(parsed.salt.is_some());
        assert!(!stored.contains("pw-ravi"));
    }

    #[test]
    fn login_attempts_against_stored_string() {
        let stored = hash_password("pw-meena").unwrap();
        for (attempt, expected) in [("pw-meena", true), ("pw-Meena", false), ("pw-meena ", false), ("", false)] {
            assert_eq!(verify_password(attempt, &stored).unwrap(), expected, "{attempt:?}");
        }
    }

    #[test]
    fn empty_password_still_hashes() {
        let stored = hash_password("").unwrap();
        assert!(is_password_hash(&stored));
        assert!(verify_password("", &stored).unwrap());
    }

    #[test]
    fn two_accounts_with_one_password_store_different_strings() {
        assert_ne!(hash_password("admin123").unwrap(), hash_password("admin123").unwrap());
    }

    #[test]
    fn legacy_plaintext_is_not_accepted_as_a_hash() {
        assert!(!is_password_hash("admin123"));
        assert!(matches!(
            verify_password("admin123", "admin123"),
            Err(AccessError::PasswordHash(_))
        ));
    }
}
