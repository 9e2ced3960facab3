//! In-memory user repository implementation

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::user::{NewUser, User, UserId, UserRepository, DUPLICATE_USERNAME};
use crate::domain::DomainError;

#[derive(Debug, Default)]
struct UserTable {
    next_id: i64,
    users: HashMap<UserId, User>,
    /// username -> id, the uniqueness constraint
    username_index: HashMap<String, UserId>,
}

/// In-memory implementation of UserRepository
#[derive(Debug, Default, Clone)]
pub struct InMemoryUserRepository {
    table: Arc<RwLock<UserTable>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn get_by_username(&self, username: &str) -> Result<Option<User>, DomainError> {
        let table = self.table.read().await;

        Ok(table
            .username_index
            .get(username)
            .and_then(|id| table.users.get(id))
            .cloned())
    }

    async fn create(&self, user: NewUser) -> Result<User, DomainError> {
        let mut table = self.table.write().await;

        if table.username_index.contains_key(&user.username) {
            return Err(DomainError::conflict(DUPLICATE_USERNAME));
        }

        table.next_id += 1;
        let id = UserId::new(table.next_id);
        let created = User::new(id, &user.username, user.password_hash, user.role);

        table.username_index.insert(user.username, id);
        table.users.insert(id, created.clone());

        Ok(created)
    }
}
