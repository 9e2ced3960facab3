//! Contact domain
//!
//! Entities, field rules, list queries and the owner-scoped repository trait.

mod entity;
mod query;
mod repository;
mod validation;

pub use entity::{Contact, ContactDraft, ContactId, ContactInput};
pub use query::{
    ContactField, ContactPage, ContactQuery, FieldFilter, SortOrder, DEFAULT_PAGE_SIZE,
    MAX_PAGE_SIZE,
};
pub use repository::{ContactRepository, DUPLICATE_PHONE};
pub use validation::{
    normalize_phone, validate_address, validate_contact, validate_email, validate_name,
    validate_phone, ContactValidationError, MAX_ADDRESS_LENGTH, MAX_NAME_LENGTH, PHONE_DIGITS,
};
