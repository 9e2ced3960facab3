//! Storage infrastructure - connection pool and schema

pub mod migrations;
mod postgres;

pub use migrations::{run_schema_migrations, schema_migrations, Migration, PostgresMigrator};
pub use postgres::{is_unique_violation, PostgresConfig};
