//! HTTP request/response types

pub mod contact;
pub mod error;
pub mod json;

pub use contact::{
    contact_query, ContactListResponse, ContactMutationResponse, CredentialsRequest,
    MessageResponse, SendEmailRequest, ShareContactsRequest, TokenResponse,
};
pub use error::{ApiError, ApiErrorBody};
pub use json::Json;
