//! In-memory contact repository implementation

use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::contact::{
    Contact, ContactDraft, ContactId, ContactPage, ContactQuery, ContactRepository, SortOrder,
    DUPLICATE_PHONE,
};
use crate::domain::user::UserId;
use crate::domain::DomainError;

#[derive(Debug, Default)]
struct ContactTable {
    next_id: i64,
    /// Keyed by id so iteration follows insertion order
    rows: BTreeMap<ContactId, Contact>,
}

impl ContactTable {
    fn phone_taken(&self, owner: UserId, phone: &str, except: Option<ContactId>) -> bool {
        self.rows.values().any(|c| {
            c.owner == owner && c.phone_number == phone && Some(c.id) != except
        })
    }

    fn owned(&self, owner: UserId) -> impl Iterator<Item = &Contact> {
        self.rows.values().filter(move |c| c.owner == owner)
    }
}

/// In-memory implementation of ContactRepository
///
/// Both uniqueness checks and writes happen under one write lock, which gives
/// the same guarantee as the `(user_id, phone_number)` constraint.
#[derive(Debug, Default, Clone)]
pub struct InMemoryContactRepository {
    table: Arc<RwLock<ContactTable>>,
}

impl InMemoryContactRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ContactRepository for InMemoryContactRepository {
    async fn list(&self, owner: UserId, query: &ContactQuery) -> Result<ContactPage, DomainError> {
        let table = self.table.read().await;

        let mut matching: Vec<&Contact> =
            table.owned(owner).filter(|c| query.matches(c)).collect();

        matching.sort_by(|a, b| {
            let by_field = query.sort_by.value_of(a).cmp(query.sort_by.value_of(b));
            let by_field = match query.sort_order {
                SortOrder::Asc => by_field,
                SortOrder::Desc => by_field.reverse(),
            };
            by_field.then(a.id.cmp(&b.id))
        });

        let total = matching.len() as u64;
        let contacts = matching
            .into_iter()
            .skip(query.offset() as usize)
            .take(query.page_size as usize)
            .cloned()
            .collect();

        Ok(ContactPage {
            contacts,
            total,
            page: query.page,
            page_size: query.page_size,
        })
    }

    async fn get(&self, owner: UserId, id: ContactId) -> Result<Option<Contact>, DomainError> {
        let table = self.table.read().await;
        Ok(table.rows.get(&id).filter(|c| c.owner == owner).cloned())
    }

    async fn get_many(
        &self,
        owner: UserId,
        ids: &[ContactId],
    ) -> Result<Vec<Contact>, DomainError> {
        let table = self.table.read().await;
        Ok(table
            .owned(owner)
            .filter(|c| ids.contains(&c.id))
            .cloned()
            .collect())
    }

    async fn phone_exists(&self, owner: UserId, phone: &str) -> Result<bool, DomainError> {
        let table = self.table.read().await;
        Ok(table.phone_taken(owner, phone, None))
    }

    async fn insert(&self, owner: UserId, draft: ContactDraft) -> Result<Contact, DomainError> {
        let mut table = self.table.write().await;

        if table.phone_taken(owner, &draft.phone_number, None) {
            return Err(DomainError::conflict(DUPLICATE_PHONE));
        }

        table.next_id += 1;
        let contact = Contact::from_draft(ContactId::new(table.next_id), owner, draft);
        table.rows.insert(contact.id, contact.clone());

        Ok(contact)
    }

    async fn update(
        &self,
        owner: UserId,
        id: ContactId,
        draft: ContactDraft,
    ) -> Result<Option<Contact>, DomainError> {
        let mut table = self.table.write().await;

        let owned = table.rows.get(&id).is_some_and(|c| c.owner == owner);
        if !owned {
            return Ok(None);
        }

        if table.phone_taken(owner, &draft.phone_number, Some(id)) {
            return Err(DomainError::conflict(DUPLICATE_PHONE));
        }

        Ok(table.rows.get_mut(&id).map(|contact| {
            contact.apply(draft);
            contact.clone()
        }))
    }

    async fn delete(&self, owner: UserId, id: ContactId) -> Result<bool, DomainError> {
        let mut table = self.table.write().await;

        let owned = table.rows.get(&id).is_some_and(|c| c.owner == owner);
        if owned {
            table.rows.remove(&id);
        }

        Ok(owned)
    }

    async fn export_all(&self, owner: UserId) -> Result<Vec<Contact>, DomainError> {
        let table = self.table.read().await;
        Ok(table.owned(owner).cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::contact::ContactField;

    const ALICE: UserId = UserId::new(1);
    const BOB: UserId = UserId::new(2);

    fn draft(first: &str, last: &str, phone: &str) -> ContactDraft {
        ContactDraft {
            first_name: first.to_string(),
            last_name: last.to_string(),
            phone_number: phone.to_string(),
            email_address: None,
            address: None,
        }
    }

    #[tokio::test]
    async fn test_insert_and_get() {
        let repo = InMemoryContactRepository::new();
        let created = repo.insert(ALICE, draft("Jo", "Li", "5551234567")).await.unwrap();

        let fetched = repo.get(ALICE, created.id).await.unwrap().unwrap();
        assert_eq!(fetched, created);
        assert_eq!(fetched.owner, ALICE);
    }

    #[tokio::test]
    async fn test_foreign_rows_are_invisible() {
        let repo = InMemoryContactRepository::new();
        let created = repo.insert(ALICE, draft("Jo", "Li", "5551234567")).await.unwrap();

        assert!(repo.get(BOB, created.id).await.unwrap().is_none());
        assert!(repo
            .update(BOB, created.id, draft("X", "Y", "5550000000"))
            .await
            .unwrap()
            .is_none());
        assert!(!repo.delete(BOB, created.id).await.unwrap());
        assert!(repo.get_many(BOB, &[created.id]).await.unwrap().is_empty());
        assert!(repo.export_all(BOB).await.unwrap().is_empty());
        assert_eq!(repo.list(BOB, &ContactQuery::new()).await.unwrap().total, 0);

        let untouched = repo.get(ALICE, created.id).await.unwrap().unwrap();
        assert_eq!(untouched.first_name, "Jo");
    }

    #[tokio::test]
    async fn test_phone_unique_per_owner() {
        let repo = InMemoryContactRepository::new();
        repo.insert(ALICE, draft("Jo", "Li", "5551234567")).await.unwrap();

        let err = repo
            .insert(ALICE, draft("Al", "Bo", "5551234567"))
            .await
            .unwrap_err();
        assert!(err.is_conflict());

        // Another owner may hold the same number
        assert!(repo.insert(BOB, draft("Al", "Bo", "5551234567")).await.is_ok());
        assert!(repo.phone_exists(ALICE, "5551234567").await.unwrap());
        assert!(!repo.phone_exists(ALICE, "5559999999").await.unwrap());
    }

    #[tokio::test]
    async fn test_update_to_taken_phone_conflicts() {
        let repo = InMemoryContactRepository::new();
        repo.insert(ALICE, draft("Jo", "Li", "5551111111")).await.unwrap();
        let second = repo.insert(ALICE, draft("Al", "Bo", "5552222222")).await.unwrap();

        let err = repo
            .update(ALICE, second.id, draft("Al", "Bo", "5551111111"))
            .await
            .unwrap_err();
        assert!(err.is_conflict());

        // Keeping its own number is fine
        let updated = repo
            .update(ALICE, second.id, draft("Alan", "Bo", "5552222222"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.first_name, "Alan");
    }

    #[tokio::test]
    async fn test_list_sorts_filters_and_pages() {
        let repo = InMemoryContactRepository::new();
        repo.insert(ALICE, draft("Cara", "Young", "5550000001")).await.unwrap();
        repo.insert(ALICE, draft("Abe", "Smith", "5550000002")).await.unwrap();
        repo.insert(ALICE, draft("Bea", "Adams", "5550000003")).await.unwrap();
        repo.insert(BOB, draft("Zed", "Aaron", "5550000004")).await.unwrap();

        let page = repo.list(ALICE, &ContactQuery::new()).await.unwrap();
        let last_names: Vec<_> = page.contacts.iter().map(|c| c.last_name.as_str()).collect();
        assert_eq!(page.total, 3);
        assert_eq!(last_names, ["Adams", "Smith", "Young"]);

        let query = ContactQuery::new()
            .with_sort(ContactField::FirstName, SortOrder::Desc)
            .with_page_size(2)
            .with_page(2);
        let page = repo.list(ALICE, &query).await.unwrap();
        assert_eq!(page.total, 3);
        assert_eq!(page.contacts.len(), 1);
        assert_eq!(page.contacts[0].first_name, "Abe");

        let query = ContactQuery::new().with_filter(ContactField::PhoneNumber, "0003");
        let page = repo.list(ALICE, &query).await.unwrap();
        assert_eq!(page.total, 1);
        assert_eq!(page.contacts[0].first_name, "Bea");
    }

    #[tokio::test]
    async fn test_list_filters_match_unescaped_text() {
        let repo = InMemoryContactRepository::new();
        repo.insert(ALICE, draft("Jo", "O&#x27;Brien", "5551234567")).await.unwrap();

        let query = ContactQuery::new().with_filter(ContactField::LastName, "x27");
        assert_eq!(repo.list(ALICE, &query).await.unwrap().total, 0);

        let query = ContactQuery::new().with_filter(ContactField::LastName, "O'B");
        assert_eq!(repo.list(ALICE, &query).await.unwrap().total, 1);

        let query = ContactQuery::new().with_filter(ContactField::PhoneNumber, "abc");
        assert_eq!(repo.list(ALICE, &query).await.unwrap().total, 0);
    }

    #[tokio::test]
    async fn test_export_all_is_id_ordered() {
        let repo = InMemoryContactRepository::new();
        let a = repo.insert(ALICE, draft("Zoe", "Z", "5550000001")).await.unwrap();
        let b = repo.insert(ALICE, draft("Amy", "A", "5550000002")).await.unwrap();

        let exported = repo.export_all(ALICE).await.unwrap();
        let ids: Vec<_> = exported.iter().map(|c| c.id).collect();
        assert_eq!(ids, [a.id, b.id]);
    }

    #[tokio::test]
    async fn test_delete() {
        let repo = InMemoryContactRepository::new();
        let created = repo.insert(ALICE, draft("Jo", "Li", "5551234567")).await.unwrap();

        assert!(repo.delete(ALICE, created.id).await.unwrap());
        assert!(!repo.delete(ALICE, created.id).await.unwrap());
        assert!(repo.get(ALICE, created.id).await.unwrap().is_none());
    }
}
