//! Bulk CSV transfer of contacts

mod export;
mod import;

pub use export::{ContactExporter, EXPORT_COLUMNS, EXPORT_FILENAME};
pub use import::{ContactImporter, ImportSummary, ENCODING_ERROR};
