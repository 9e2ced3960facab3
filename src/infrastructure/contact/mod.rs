//! Contact infrastructure module
//!
//! Owner-scoped repositories (in-memory and PostgreSQL) and the contact service.

mod postgres_repository;
mod repository;
mod service;
mod sql;

pub use postgres_repository::PostgresContactRepository;
pub use repository::InMemoryContactRepository;
pub use service::{ContactService, CONTACT_NOT_FOUND};
