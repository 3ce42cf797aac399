//! Password hashing.
//!
//! New passwords are stored as argon2 PHC strings. Records written by the
//! dashboards keep the password in clear text; those still verify, compared
//! in constant time, and are rehashed on the next successful login.

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::SaltString;
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};
use subtle::ConstantTimeEq;

use crate::error::{AppError, AppResult};

/// How a login attempt matched the stored password.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PasswordMatch {
    /// Verified against an argon2 hash.
    Hashed,
    /// Matched a clear-text value; the caller should rehash it.
    Plaintext,
    Mismatch,
}

pub fn hash_password(password: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);

    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| {
            tracing::error!("Failed to hash password: {}", e);
            AppError::internal("No se pudo guardar la contraseña")
        })?;

    Ok(hash.to_string())
}

pub fn check_password(password: &str, stored: &str) -> PasswordMatch {
    match PasswordHash::new(stored) {
        Ok(parsed_hash) => {
            if Argon2::default()
                .verify_password(password.as_bytes(), &parsed_hash)
                .is_ok()
            {
                PasswordMatch::Hashed
            } else {
                PasswordMatch::Mismatch
            }
        }
        Err(_) if stored.is_empty() => PasswordMatch::Mismatch,
        Err(_) => {
            if bool::from(password.as_bytes().ct_eq(stored.as_bytes())) {
                PasswordMatch::Plaintext
            } else {
                PasswordMatch::Mismatch
            }
        }
    }
}

pub fn verify_password(password: &str, stored: &str) -> bool {
    check_password(password, stored) != PasswordMatch::Mismatch
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify() {
        let hash = hash_password("Segura#2024").unwrap();
        assert!(hash.starts_with("$argon2"));
        assert_eq!(check_password("Segura#2024", &hash), PasswordMatch::Hashed);
        assert!(!verify_password("segura#2024", &hash));
    }

    #[test]
    fn test_plaintext_matches_exactly() {
        assert_eq!(check_password("Segura#2024", "Segura#2024"), PasswordMatch::Plaintext);
        assert_eq!(check_password("segura#2024", "Segura#2024"), PasswordMatch::Mismatch);
        assert_eq!(check_password("Segura#20", "Segura#2024"), PasswordMatch::Mismatch);
    }

    #[test]
    fn test_empty_stored_password_never_matches() {
        assert_eq!(check_password("", ""), PasswordMatch::Mismatch);
    }
}
