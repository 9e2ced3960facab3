//! User domain
//!
//! Account entities, registration rules and the repository trait.

mod entity;
mod repository;
mod validation;

pub use entity::{NewUser, User, UserId, UserRole};
pub use repository::{UserRepository, DUPLICATE_USERNAME};
pub use validation::{validate_password, validate_username, UserValidationError};
