//! Password hashing using Argon2

use argon2::{
    password_hash::{
        rand_core::OsRng, PasswordHash, PasswordHasher as Argon2PasswordHasher, PasswordVerifier,
        SaltString,
    },
    Algorithm, Argon2, Params, Version,
};
use once_cell::sync::OnceCell;
use std::fmt::Debug;

use crate::domain::DomainError;

/// Trait for password hashing operations
pub trait PasswordHasher: Send + Sync + Debug {
    /// Hash a password with a fresh salt
    fn hash(&self, password: &str) -> Result<String, DomainError>;

    /// Verify a password against a stored digest
    fn verify(&self, password: &str, hash: &str) -> bool;

    /// Verify against `hash` when an account exists, otherwise spend the same
    /// work on a throwaway digest and fail
    fn verify_account(&self, password: &str, hash: Option<&str>) -> bool;
}

/// Argon2id hasher
pub struct Argon2Hasher {
    argon2: Argon2<'static>,
    decoy: OnceCell<String>,
}

impl Debug for Argon2Hasher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Argon2Hasher")
            .field("decoy_ready", &self.decoy.get().is_some())
            .finish()
    }
}

impl Default for Argon2Hasher {
    fn default() -> Self {
        Self::with_params(Params::default())
    }
}

impl Argon2Hasher {
    /// Argon2id v0x13 with the crate's recommended cost
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_params(params: Params) -> Self {
        Self {
            argon2: Argon2::new(Algorithm::Argon2id, Version::V0x13, params),
            decoy: OnceCell::new(),
        }
    }

    /// Minimal cost, for tests only
    #[cfg(test)]
    pub fn low_cost() -> Self {
        match Params::new(Params::MIN_M_COST, 1, 1, None) {
            Ok(params) => Self::with_params(params),
            Err(_) => Self::default(),
        }
    }

    fn decoy_hash(&self) -> Option<&str> {
        self.decoy
            .get_or_try_init(|| self.hash("decoy-password-for-unknown-accounts"))
            .ok()
            .map(String::as_str)
    }
}

impl PasswordHasher for Argon2Hasher {
    fn hash(&self, password: &str) -> Result<String, DomainError> {
        let salt = SaltString::generate(&mut OsRng);

        self.argon2
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| DomainError::internal(format!("Failed to hash password: {}", e)))
    }

    fn verify(&self, password: &str, hash: &str) -> bool {
        let Ok(parsed_hash) = PasswordHash::new(hash) else {
            return false;
        };

        self.argon2
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_ok()
    }

    fn verify_account(&self, password: &str, hash: Option<&str>) -> bool {
        match hash {
            Some(hash) => self.verify(password, hash),
            None => {
                if let Some(decoy) = self.decoy_hash() {
                    let _ = self.verify(password, decoy);
                }
                false
            }
        }
    }
}
