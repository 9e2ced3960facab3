//! Contact use cases on top of the owner-scoped repository

use std::sync::Arc;

use tracing::info;

use crate::domain::contact::{
    validate_contact, Contact, ContactId, ContactInput, ContactPage, ContactQuery,
    ContactRepository, DUPLICATE_PHONE,
};
use crate::domain::user::UserId;
use crate::domain::DomainError;

pub const CONTACT_NOT_FOUND: &str = "Contact not found";

/// Contact CRUD for the authenticated owner
#[derive(Debug, Clone)]
pub struct ContactService {
    repository: Arc<dyn ContactRepository>,
}

impl ContactService {
    pub fn new(repository: Arc<dyn ContactRepository>) -> Self {
        Self { repository }
    }

    pub async fn list(
        &self,
        owner: UserId,
        query: &ContactQuery,
    ) -> Result<ContactPage, DomainError> {
        self.repository.list(owner, query).await
    }

    pub async fn get(&self, owner: UserId, id: ContactId) -> Result<Contact, DomainError> {
        self.repository
            .get(owner, id)
            .await?
            .ok_or_else(|| DomainError::not_found(CONTACT_NOT_FOUND))
    }

    /// Validate and insert. The phone pre-check only shapes the message; the
    /// store's constraint decides races.
    pub async fn create(&self, owner: UserId, input: &ContactInput) -> Result<Contact, DomainError> {
        let draft = validate_contact(input)?;

        if self.repository.phone_exists(owner, &draft.phone_number).await? {
            return Err(DomainError::conflict(DUPLICATE_PHONE));
        }

        let contact = self.repository.insert(owner, draft).await?;
        info!(user_id = %owner, contact_id = %contact.id, "Contact created");
        Ok(contact)
    }

    pub async fn update(
        &self,
        owner: UserId,
        id: ContactId,
        input: &ContactInput,
    ) -> Result<Contact, DomainError> {
        let draft = validate_contact(input)?;

        let contact = self
            .repository
            .update(owner, id, draft)
            .await?
            .ok_or_else(|| DomainError::not_found(CONTACT_NOT_FOUND))?;

        info!(user_id = %owner, contact_id = %id, "Contact updated");
        Ok(contact)
    }

    pub async fn delete(&self, owner: UserId, id: ContactId) -> Result<(), DomainError> {
        if !self.repository.delete(owner, id).await? {
            return Err(DomainError::not_found(CONTACT_NOT_FOUND));
        }

        info!(user_id = %owner, contact_id = %id, "Contact deleted");
        Ok(())
    }
}
