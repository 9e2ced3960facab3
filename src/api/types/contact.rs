//! Request and response bodies of the contact and account endpoints

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::contact::{
    Contact, ContactField, ContactId, ContactPage, ContactQuery, SortOrder,
};
use crate::domain::user::UserRole;
use crate::infrastructure::auth::IssuedToken;

/// `{"message": ...}`
#[derive(Debug, Clone, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Register and login body
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CredentialsRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

/// Returned by login and refresh
#[derive(Debug, Clone, Serialize)]
pub struct TokenResponse {
    pub token: String,
    pub username: String,
    pub role: UserRole,
    pub expires_at: String,
}

impl From<IssuedToken> for TokenResponse {
    fn from(issued: IssuedToken) -> Self {
        Self {
            expires_at: issued.claims.expires_at().to_rfc3339(),
            username: issued.claims.username,
            role: issued.claims.role,
            token: issued.token,
        }
    }
}

/// `{"message": ..., "contact": {...}}`
#[derive(Debug, Clone, Serialize)]
pub struct ContactMutationResponse {
    pub message: &'static str,
    pub contact: Contact,
}

#[derive(Debug, Clone, Serialize)]
pub struct ContactListResponse {
    pub contacts: Vec<Contact>,
    pub total: u64,
    pub page: u32,
    pub limit: u32,
}

impl From<ContactPage> for ContactListResponse {
    fn from(page: ContactPage) -> Self {
        Self {
            contacts: page.contacts,
            total: page.total,
            page: page.page,
            limit: page.page_size,
        }
    }
}

/// Build a list query from raw query parameters.
///
/// Unparseable numbers and unknown sort fields fall back to the defaults;
/// only allow-listed field names become filters.
pub fn contact_query(params: &HashMap<String, String>) -> ContactQuery {
    let number = |name: &str| params.get(name).and_then(|v| v.trim().parse::<u32>().ok());

    let sort_by = params
        .get("sort_by")
        .and_then(|v| ContactField::parse(v))
        .unwrap_or_default();
    let sort_order = params
        .get("sort_order")
        .map(|v| SortOrder::parse(v))
        .unwrap_or_default();

    let mut query = ContactQuery::new().with_sort(sort_by, sort_order);

    if let Some(page) = number("page") {
        query = query.with_page(page);
    }
    if let Some(limit) = number("limit") {
        query = query.with_page_size(limit);
    }

    for field in ContactField::ALL {
        if let Some(value) = params.get(field.name()) {
            query = query.with_filter(field, value);
        }
    }

    query
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SendEmailRequest {
    #[serde(default)]
    pub subject: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ShareContactsRequest {
    /// Kept loose so a non-list value gets a precise message
    #[serde(default)]
    pub contact_ids: Option<Value>,
    #[serde(default)]
    pub recipient_email: Option<String>,
    #[serde(default)]
    pub subject: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

impl ShareContactsRequest {
    /// Integer ids of a JSON list; anything else yields an empty list
    pub fn contact_ids(&self) -> Vec<ContactId> {
        match &self.contact_ids {
            Some(Value::Array(values)) => values
                .iter()
                .filter_map(Value::as_i64)
                .map(ContactId::new)
                .collect(),
            _ => Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::contact::{DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};

    fn params(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_contact_query_defaults() {
        let query = contact_query(&HashMap::new());

        assert_eq!(query.page, 1);
        assert_eq!(query.page_size, DEFAULT_PAGE_SIZE);
        assert_eq!(query.sort_by, ContactField::LastName);
        assert_eq!(query.sort_order, SortOrder::Asc);
        assert!(query.filters.is_empty());
    }

    #[test]
    fn test_contact_query_falls_back_on_bad_input() {
        let query = contact_query(&params(&[
            ("page", "abc"),
            ("limit", "-5"),
            ("sort_by", "drop table"),
            ("sort_order", "sideways"),
        ]));

        assert_eq!(query.page, 1);
        assert_eq!(query.page_size, DEFAULT_PAGE_SIZE);
        assert_eq!(query.sort_by, ContactField::LastName);
        assert_eq!(query.sort_order, SortOrder::Asc);
    }

    #[test]
    fn test_contact_query_reads_params() {
        let query = contact_query(&params(&[
            ("page", "3"),
            ("limit", "1000"),
            ("sort_by", "first_name"),
            ("sort_order", "desc"),
            ("phone_number", "555-12"),
            ("user_id", "2"),
        ]));

        assert_eq!(query.page, 3);
        assert_eq!(query.page_size, MAX_PAGE_SIZE);
        assert_eq!(query.sort_by, ContactField::FirstName);
        assert_eq!(query.sort_order, SortOrder::Desc);
        assert_eq!(query.filters.len(), 1);
        assert_eq!(query.filters[0].value, "55512");
    }

    #[test]
    fn test_share_request_ids() {
        let request: ShareContactsRequest =
            serde_json::from_str(r#"{"contact_ids": [1, "x", 3]}"#).unwrap();
        assert_eq!(request.contact_ids(), vec![ContactId::new(1), ContactId::new(3)]);

        let request: ShareContactsRequest =
            serde_json::from_str(r#"{"contact_ids": "1,2"}"#).unwrap();
        assert!(request.contact_ids().is_empty());
    }
}
