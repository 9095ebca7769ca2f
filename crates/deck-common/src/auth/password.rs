//! Password hashing and verification
//!
//! Argon2id with a random salt per hash. Digests are stored as PHC strings,
//! so the salt and parameters travel with the hash.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Algorithm, Argon2, Params, Version,
};

use std::sync::OnceLock;

use super::session_token::generate_session_token;
use crate::error::AppError;

const MAX_PASSWORD_LENGTH: usize = 128;

/// Digest checked when the account does not exist, so that branch costs one
/// full Argon2 verification like a wrong password does
static ABSENT_ACCOUNT_DIGEST: OnceLock<Option<String>> = OnceLock::new();

/// Hash a password using Argon2id
///
/// # Errors
/// Returns an error if hashing fails
pub fn hash_password(password: &str) -> Result<String, AppError> {
    PasswordService::new().hash(password)
}

/// Verify a password against a stored digest.
///
/// Fails closed: a malformed digest verifies as `false`.
#[must_use]
pub fn verify_password(password: &str, hash: &str) -> bool {
    PasswordService::new().verify(password, hash)
}

/// Hasher shared through the service context
#[derive(Debug, Clone, Default)]
pub struct PasswordService {
    params: Params,
}

impl PasswordService {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn argon2(&self) -> Argon2<'_> {
        Argon2::new(Algorithm::Argon2id, Version::V0x13, self.params.clone())
    }

    pub fn hash(&self, password: &str) -> Result<String, AppError> {
        let salt = SaltString::generate(&mut OsRng);
        self.argon2()
            .hash_password(password.as_bytes(), &salt)
            .map(|digest| digest.to_string())
            .map_err(|e| AppError::internal(anyhow::anyhow!("Password hashing failed: {e}")))
    }

    #[must_use]
    pub fn verify(&self, password: &str, hash: &str) -> bool {
        let Ok(parsed) = PasswordHash::new(hash) else {
            return false;
        };

        self.argon2()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok()
    }

    /// Spend the cost of a verification without an account to check against.
    /// Always `false`.
    pub fn verify_absent(&self, password: &str) -> bool {
        let digest = ABSENT_ACCOUNT_DIGEST.get_or_init(|| self.hash(&generate_session_token()).ok());

        if let Some(digest) = digest {
            let _ = self.verify(password, digest);
        }
        false
    }
}

/// Validate a password or access code.
///
/// Only presence and an upper bound are enforced; access codes handed out by
/// administrators are often short.
///
/// # Errors
/// Returns a validation error if the password is empty or too long
pub fn validate_password(password: &str) -> Result<(), AppError> {
    if password.is_empty() {
        return Err(AppError::validation("Password must not be empty"));
    }

    if password.len() > MAX_PASSWORD_LENGTH {
        return Err(AppError::validation(format!(
            "Password must be at most {MAX_PASSWORD_LENGTH} characters long"
        )));
    }

    Ok(())
}
