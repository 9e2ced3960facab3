//! Registration and credential checks

use std::sync::Arc;

use tracing::{debug, info};

use crate::domain::user::{
    validate_password, validate_username, NewUser, User, UserRepository,
    DUPLICATE_USERNAME,
};
use crate::domain::DomainError;
use crate::infrastructure::observability::record_login;

use super::password::PasswordHasher;

pub const MISSING_CREDENTIALS: &str = "Username and password are required";

/// User service for registration and authentication
#[derive(Debug, Clone)]
pub struct UserService {
    repository: Arc<dyn UserRepository>,
    hasher: Arc<dyn PasswordHasher>,
}

impl UserService {
    pub fn new(repository: Arc<dyn UserRepository>, hasher: Arc<dyn PasswordHasher>) -> Self {
        Self { repository, hasher }
    }

    /// Validate, hash and store a new account
    pub async fn register(&self, username: &str, password: &str) -> Result<User, DomainError> {
        let username = username.trim();

        validate_username(username).map_err(|e| DomainError::validation(e.to_string()))?;
        validate_password(password).map_err(|e| DomainError::validation(e.to_string()))?;

        if self.repository.username_exists(username).await? {
            return Err(DomainError::conflict(DUPLICATE_USERNAME));
        }

        let password_hash = self.hasher.hash(password)?;
        let user = self
            .repository
            .create(NewUser::new(username, password_hash))
            .await?;

        info!(user_id = %user.id(), username = %user.username(), "User registered");
        Ok(user)
    }

    /// Check credentials. `None` covers both unknown user and wrong password.
    pub async fn authenticate(
        &self,
        username: &str,
        password: &str,
    ) -> Result<Option<User>, DomainError> {
        let username = username.trim();

        if username.is_empty() || password.is_empty() {
            return Err(DomainError::validation(MISSING_CREDENTIALS));
        }

        let user = match self.repository.get_by_username(username).await {
            Ok(user) => user,
            Err(e) => {
                record_login("error");
                return Err(e);
            }
        };

        let verified = self
            .hasher
            .verify_account(password, user.as_ref().map(User::password_hash));

        if verified {
            record_login("success");
            Ok(user)
        } else {
            record_login("invalid_credentials");
            debug!(username = %username, "Rejected login");
            Ok(None)
        }
    }

    /// Readiness probe for the backing store
    pub async fn ping(&self) -> Result<(), DomainError> {
        self.repository.ping().await
    }
}
