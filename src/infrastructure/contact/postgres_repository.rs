//! PostgreSQL contact repository implementation

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Row};

use super::sql::{count_query, page_query, CONTACT_COLUMNS};
use crate::domain::contact::{
    Contact, ContactDraft, ContactId, ContactPage, ContactQuery, ContactRepository,
    DUPLICATE_PHONE,
};
use crate::domain::user::UserId;
use crate::domain::DomainError;
use crate::infrastructure::storage::is_unique_violation;

/// PostgreSQL implementation of ContactRepository
#[derive(Debug, Clone)]
pub struct PostgresContactRepository {
    pool: PgPool,
}

impl PostgresContactRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn write_error(action: &str, e: sqlx::Error) -> DomainError {
    if is_unique_violation(&e) {
        DomainError::conflict(DUPLICATE_PHONE)
    } else {
        DomainError::storage(format!("Failed to {} contact: {}", action, e))
    }
}

#[async_trait]
impl ContactRepository for PostgresContactRepository {
    async fn list(&self, owner: UserId, query: &ContactQuery) -> Result<ContactPage, DomainError> {
        let mut count = count_query(owner, query);
        let total: i64 = count
            .build_query_scalar()
            .fetch_one(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to count contacts: {}", e)))?;

        let mut page = page_query(owner, query);
        let rows = page
            .build()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to list contacts: {}", e)))?;

        let contacts = rows
            .iter()
            .map(row_to_contact)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(ContactPage {
            contacts,
            total: total.max(0) as u64,
            page: query.page,
            page_size: query.page_size,
        })
    }

    async fn get(&self, owner: UserId, id: ContactId) -> Result<Option<Contact>, DomainError> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM contacts WHERE contact_id = $1 AND user_id = $2",
            CONTACT_COLUMNS
        ))
        .bind(id.value())
        .bind(owner.value())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to get contact: {}", e)))?;

        row.as_ref().map(row_to_contact).transpose()
    }

    async fn get_many(
        &self,
        owner: UserId,
        ids: &[ContactId],
    ) -> Result<Vec<Contact>, DomainError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<i64> = ids.iter().map(ContactId::value).collect();

        let rows = sqlx::query(&format!(
            "SELECT {} FROM contacts WHERE user_id = $1 AND contact_id = ANY($2) \
             ORDER BY contact_id",
            CONTACT_COLUMNS
        ))
        .bind(owner.value())
        .bind(ids)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to get contacts: {}", e)))?;

        rows.iter().map(row_to_contact).collect()
    }

    async fn phone_exists(&self, owner: UserId, phone: &str) -> Result<bool, DomainError> {
        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM contacts WHERE user_id = $1 AND phone_number = $2)",
        )
        .bind(owner.value())
        .bind(phone)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to check phone number: {}", e)))
    }

    async fn insert(&self, owner: UserId, draft: ContactDraft) -> Result<Contact, DomainError> {
        let row = sqlx::query(&format!(
            r#"
            INSERT INTO contacts (user_id, first_name, last_name, phone_number, email_address, address)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {}
            "#,
            CONTACT_COLUMNS
        ))
        .bind(owner.value())
        .bind(&draft.first_name)
        .bind(&draft.last_name)
        .bind(&draft.phone_number)
        .bind(&draft.email_address)
        .bind(&draft.address)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| write_error("insert", e))?;

        row_to_contact(&row)
    }

    async fn update(
        &self,
        owner: UserId,
        id: ContactId,
        draft: ContactDraft,
    ) -> Result<Option<Contact>, DomainError> {
        let row = sqlx::query(&format!(
            r#"
            UPDATE contacts
            SET first_name = $3, last_name = $4, phone_number = $5,
                email_address = $6, address = $7
            WHERE contact_id = $1 AND user_id = $2
            RETURNING {}
            "#,
            CONTACT_COLUMNS
        ))
        .bind(id.value())
        .bind(owner.value())
        .bind(&draft.first_name)
        .bind(&draft.last_name)
        .bind(&draft.phone_number)
        .bind(&draft.email_address)
        .bind(&draft.address)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| write_error("update", e))?;

        row.as_ref().map(row_to_contact).transpose()
    }

    async fn delete(&self, owner: UserId, id: ContactId) -> Result<bool, DomainError> {
        let result = sqlx::query("DELETE FROM contacts WHERE contact_id = $1 AND user_id = $2")
            .bind(id.value())
            .bind(owner.value())
            .execute(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to delete contact: {}", e)))?;

        Ok(result.rows_affected() > 0)
    }

    async fn export_all(&self, owner: UserId) -> Result<Vec<Contact>, DomainError> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM contacts WHERE user_id = $1 ORDER BY contact_id",
            CONTACT_COLUMNS
        ))
        .bind(owner.value())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to export contacts: {}", e)))?;

        rows.iter().map(row_to_contact).collect()
    }
}

fn row_to_contact(row: &sqlx::postgres::PgRow) -> Result<Contact, DomainError> {
    let invalid = |e: sqlx::Error| DomainError::storage(format!("Invalid contact row: {}", e));

    let id: i64 = row.try_get("contact_id").map_err(invalid)?;
    let owner: i64 = row.try_get("user_id").map_err(invalid)?;
    let created_at: DateTime<Utc> = row.try_get("created_at").map_err(invalid)?;

    Ok(Contact {
        id: ContactId::new(id),
        owner: UserId::new(owner),
        first_name: row.try_get("first_name").map_err(invalid)?,
        last_name: row.try_get("last_name").map_err(invalid)?,
        phone_number: row.try_get("phone_number").map_err(invalid)?,
        email_address: row.try_get("email_address").map_err(invalid)?,
        address: row.try_get("address").map_err(invalid)?,
        created_at,
    })
}
