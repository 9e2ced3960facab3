//! Domain layer - entities, rules and the traits infrastructure implements

pub mod contact;
pub mod error;
pub mod notification;
pub mod user;
pub mod validation;

pub use contact::{
    Contact, ContactDraft, ContactField, ContactId, ContactInput, ContactPage, ContactQuery,
    ContactRepository, SortOrder,
};
pub use error::DomainError;
pub use notification::{Mailbox, MailTransport, OutboundEmail, TransportError};
pub use user::{NewUser, User, UserId, UserRepository, UserRole};
pub use validation::FieldErrors;
