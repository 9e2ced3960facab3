//! List query: paging, allow-listed sort and substring filters

use serde::{Deserialize, Serialize};

use super::entity::Contact;
use super::validation::normalize_phone;
use crate::domain::validation::unescape_html;

pub const DEFAULT_PAGE_SIZE: u32 = 10;
pub const MAX_PAGE_SIZE: u32 = 100;

/// The only contact columns a caller may sort or filter on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContactField {
    FirstName,
    #[default]
    LastName,
    PhoneNumber,
    EmailAddress,
    Address,
}

impl ContactField {
    pub const ALL: [ContactField; 5] = [
        Self::FirstName,
        Self::LastName,
        Self::PhoneNumber,
        Self::EmailAddress,
        Self::Address,
    ];

    /// Parse a caller-supplied name; anything outside the allow-list is `None`
    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|field| field.name() == name)
    }

    /// Column name; doubles as the public field name
    pub fn name(&self) -> &'static str {
        match self {
            Self::FirstName => "first_name",
            Self::LastName => "last_name",
            Self::PhoneNumber => "phone_number",
            Self::EmailAddress => "email_address",
            Self::Address => "address",
        }
    }

    /// Stored value of this field on a contact
    pub fn value_of<'a>(&self, contact: &'a Contact) -> &'a str {
        match self {
            Self::FirstName => &contact.first_name,
            Self::LastName => &contact.last_name,
            Self::PhoneNumber => &contact.phone_number,
            Self::EmailAddress => contact.email_address.as_deref().unwrap_or_default(),
            Self::Address => contact.address.as_deref().unwrap_or_default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl SortOrder {
    /// `asc`/`desc` in any case; anything else falls back to ascending
    pub fn parse(value: &str) -> Self {
        if value.trim().eq_ignore_ascii_case("desc") {
            Self::Desc
        } else {
            Self::Asc
        }
    }

    pub fn as_sql(&self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

/// Case-insensitive substring match on one field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldFilter {
    pub field: ContactField,
    /// Plain-text needle, compared against the unescaped field value.
    /// Empty only for a phone needle without digits, which matches nothing.
    pub value: String,
}

impl FieldFilter {
    pub fn matches_nothing(&self) -> bool {
        self.value.is_empty()
    }

    pub fn matches(&self, contact: &Contact) -> bool {
        if self.matches_nothing() {
            return false;
        }

        unescape_html(self.field.value_of(contact))
            .to_lowercase()
            .contains(&self.value.to_lowercase())
    }
}

/// A fully resolved list request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactQuery {
    pub page: u32,
    pub page_size: u32,
    pub sort_by: ContactField,
    pub sort_order: SortOrder,
    pub filters: Vec<FieldFilter>,
}

impl Default for ContactQuery {
    fn default() -> Self {
        Self {
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
            sort_by: ContactField::default(),
            sort_order: SortOrder::default(),
            filters: Vec::new(),
        }
    }
}

impl ContactQuery {
    pub fn new() -> Self {
        Self::default()
    }

    /// Page numbers start at 1; zero is clamped up
    pub fn with_page(mut self, page: u32) -> Self {
        self.page = page.max(1);
        self
    }

    /// Clamped to `1..=MAX_PAGE_SIZE`
    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size.clamp(1, MAX_PAGE_SIZE);
        self
    }

    pub fn with_sort(mut self, sort_by: ContactField, sort_order: SortOrder) -> Self {
        self.sort_by = sort_by;
        self.sort_order = sort_order;
        self
    }

    /// Add a filter from raw input. Blank needles are ignored. Phone needles
    /// keep digits only, text needles are trimmed.
    pub fn with_filter(mut self, field: ContactField, raw: &str) -> Self {
        let raw = raw.trim();
        if raw.is_empty() {
            return self;
        }

        let value = match field {
            ContactField::PhoneNumber => normalize_phone(raw),
            _ => raw.to_string(),
        };

        self.filters.retain(|f| f.field != field);
        self.filters.push(FieldFilter { field, value });
        self
    }

    pub fn offset(&self) -> u64 {
        u64::from(self.page - 1) * u64::from(self.page_size)
    }

    /// In-process evaluation of the filters, mirroring `ILIKE '%needle%'`
    pub fn matches(&self, contact: &Contact) -> bool {
        self.filters.iter().all(|filter| filter.matches(contact))
    }
}

/// One page of a listing plus the total number of matches
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactPage {
    pub contacts: Vec<Contact>,
    pub total: u64,
    pub page: u32,
    pub page_size: u32,
}
