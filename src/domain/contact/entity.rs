//! Contact entity and related types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::user::UserId;

/// Surrogate key of a contact row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContactId(i64);

impl ContactId {
    pub const fn new(id: i64) -> Self {
        Self(id)
    }

    pub const fn value(&self) -> i64 {
        self.0
    }
}

impl From<i64> for ContactId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for ContactId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A stored contact. Text fields hold the escaped form written at save time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contact {
    #[serde(rename = "contact_id")]
    pub id: ContactId,
    #[serde(rename = "user_id")]
    pub owner: UserId,
    pub first_name: String,
    pub last_name: String,
    pub phone_number: String,
    pub email_address: Option<String>,
    pub address: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Contact {
    pub fn from_draft(id: ContactId, owner: UserId, draft: ContactDraft) -> Self {
        Self {
            id,
            owner,
            first_name: draft.first_name,
            last_name: draft.last_name,
            phone_number: draft.phone_number,
            email_address: draft.email_address,
            address: draft.address,
            created_at: Utc::now(),
        }
    }

    /// Replace the mutable fields, keeping identity and ownership
    pub fn apply(&mut self, draft: ContactDraft) {
        self.first_name = draft.first_name;
        self.last_name = draft.last_name;
        self.phone_number = draft.phone_number;
        self.email_address = draft.email_address;
        self.address = draft.address;
    }
}

/// Normalized, storage-ready contact fields
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactDraft {
    pub first_name: String,
    pub last_name: String,
    /// Digits only
    pub phone_number: String,
    pub email_address: Option<String>,
    pub address: Option<String>,
}

/// Raw contact payload as received from a client
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactInput {
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub phone_number: Option<String>,
    #[serde(default)]
    pub email_address: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
}
