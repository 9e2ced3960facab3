//! Contact repository trait

use async_trait::async_trait;
use std::fmt::Debug;

use super::entity::{Contact, ContactDraft, ContactId};
use super::query::{ContactPage, ContactQuery};
use crate::domain::user::UserId;
use crate::domain::DomainError;

/// Message surfaced for both the pre-check and the storage constraint
pub const DUPLICATE_PHONE: &str = "A contact with this phone number already exists";

/// Owner-scoped contact storage
///
/// Every method takes the owning user first and never touches rows of another
/// owner. A contact that exists but belongs to someone else is reported
/// exactly like one that does not exist.
#[async_trait]
pub trait ContactRepository: Send + Sync + Debug {
    /// Count then fetch one page of the owner's contacts
    async fn list(&self, owner: UserId, query: &ContactQuery) -> Result<ContactPage, DomainError>;

    async fn get(&self, owner: UserId, id: ContactId) -> Result<Option<Contact>, DomainError>;

    /// Owned contacts among `ids`, ordered by id; foreign or unknown ids are dropped
    async fn get_many(&self, owner: UserId, ids: &[ContactId])
    -> Result<Vec<Contact>, DomainError>;

    /// `phone` must already be normalized
    async fn phone_exists(&self, owner: UserId, phone: &str) -> Result<bool, DomainError>;

    /// Fails with a Conflict ([`DUPLICATE_PHONE`]) when the phone is taken
    async fn insert(&self, owner: UserId, draft: ContactDraft) -> Result<Contact, DomainError>;

    /// `None` when no owned row matched
    async fn update(
        &self,
        owner: UserId,
        id: ContactId,
        draft: ContactDraft,
    ) -> Result<Option<Contact>, DomainError>;

    /// `false` when no owned row matched
    async fn delete(&self, owner: UserId, id: ContactId) -> Result<bool, DomainError>;

    /// Every owned contact ordered by id
    async fn export_all(&self, owner: UserId) -> Result<Vec<Contact>, DomainError>;
}
