//! User repository trait

use async_trait::async_trait;
use std::fmt::Debug;

use super::entity::{NewUser, User};
use crate::domain::DomainError;

/// Message surfaced for both the pre-check and the storage constraint
pub const DUPLICATE_USERNAME: &str = "Username already exists";

/// Repository trait for user storage
///
/// Username uniqueness is enforced by the store; `create` reports a violation
/// as a [`DomainError::Conflict`] carrying [`DUPLICATE_USERNAME`].
#[async_trait]
pub trait UserRepository: Send + Sync + Debug {
    /// Get a user by their username (for login)
    async fn get_by_username(&self, username: &str) -> Result<Option<User>, DomainError>;

    /// Insert a new user, assigning its ID
    async fn create(&self, user: NewUser) -> Result<User, DomainError>;

    /// Check if a username exists
    async fn username_exists(&self, username: &str) -> Result<bool, DomainError> {
        Ok(self.get_by_username(username).await?.is_some())
    }

    /// Check that the backing store is reachable
    async fn ping(&self) -> Result<(), DomainError> {
        Ok(())
    }
}
