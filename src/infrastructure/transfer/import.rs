//! CSV contact import
//!
//! Every row is its own unit of work: a bad row is recorded and skipped while
//! earlier and later rows still land.

use std::sync::Arc;

use csv::{ReaderBuilder, StringRecord, Trim};
use serde::Serialize;
use tracing::{debug, error, info};

use crate::domain::contact::{normalize_phone, ContactDraft, ContactRepository, PHONE_DIGITS};
use crate::domain::user::UserId;
use crate::domain::validation::sanitize_text;
use crate::domain::DomainError;
use crate::infrastructure::observability::record_import;

pub const ENCODING_ERROR: &str = "File encoding error. Please use UTF-8 encoded CSV files.";

const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];

/// Outcome of one import request
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ImportSummary {
    pub imported: u64,
    pub skipped: u64,
    pub errors: Vec<String>,
    pub message: String,
}

impl ImportSummary {
    fn reject(&mut self, row: usize, reason: &str) {
        self.errors.push(format!("Row {}: {}", row, reason));
        self.skipped += 1;
    }

    fn finish(mut self) -> Self {
        self.message = format!(
            "Import completed: {} contacts imported, {} skipped",
            self.imported, self.skipped
        );
        self
    }
}

/// Column positions resolved from the header row
#[derive(Debug, Default)]
struct ColumnMap {
    first_name: Option<usize>,
    last_name: Option<usize>,
    phone_number: Option<usize>,
    email_address: Option<usize>,
    address: Option<usize>,
}

impl ColumnMap {
    fn from_headers(headers: &StringRecord) -> Self {
        let position = |name: &str| headers.iter().position(|h| h.trim() == name);

        Self {
            first_name: position("first_name"),
            last_name: position("last_name"),
            phone_number: position("phone_number"),
            email_address: position("email_address"),
            address: position("address"),
        }
    }

    fn value<'r>(record: &'r StringRecord, index: Option<usize>) -> &'r str {
        index.and_then(|i| record.get(i)).unwrap_or_default().trim()
    }
}

/// Result of checking one row before it is written
enum RowOutcome {
    Ready(ContactDraft),
    Duplicate,
    Rejected(&'static str),
}

/// Imports CSV uploads into one owner's book
#[derive(Debug, Clone)]
pub struct ContactImporter {
    repository: Arc<dyn ContactRepository>,
}

impl ContactImporter {
    pub fn new(repository: Arc<dyn ContactRepository>) -> Self {
        Self { repository }
    }

    /// Decode and import an uploaded file.
    ///
    /// Only a non-UTF-8 upload fails the whole request; everything else is
    /// reported per row in the summary.
    pub async fn import(&self, owner: UserId, data: &[u8]) -> Result<ImportSummary, DomainError> {
        let data = data.strip_prefix(UTF8_BOM).unwrap_or(data);
        let text = std::str::from_utf8(data).map_err(|_| DomainError::validation(ENCODING_ERROR))?;

        let mut reader = ReaderBuilder::new()
            .flexible(true)
            .trim(Trim::All)
            .from_reader(text.as_bytes());

        let columns = match reader.headers() {
            Ok(headers) => ColumnMap::from_headers(headers),
            Err(e) => {
                debug!(user_id = %owner, error = %e, "Unreadable CSV header");
                ColumnMap::default()
            }
        };

        let mut summary = ImportSummary::default();

        for (index, record) in reader.records().enumerate() {
            let row = index + 1;

            let record = match record {
                Ok(record) => record,
                Err(e) => {
                    debug!(user_id = %owner, row, error = %e, "Unparseable CSV row");
                    summary.reject(row, "Could not parse row");
                    continue;
                }
            };

            match self.check_row(owner, &columns, &record).await {
                Ok(RowOutcome::Ready(draft)) => match self.repository.insert(owner, draft).await {
                    Ok(_) => summary.imported += 1,
                    // Lost a race with a concurrent write of the same phone
                    Err(e) if e.is_conflict() => summary.skipped += 1,
                    Err(e) => {
                        error!(user_id = %owner, row, error = %e, "Failed to save imported contact");
                        summary.reject(row, "Failed to save contact");
                    }
                },
                Ok(RowOutcome::Duplicate) => summary.skipped += 1,
                Ok(RowOutcome::Rejected(reason)) => summary.reject(row, reason),
                Err(e) => {
                    error!(user_id = %owner, row, error = %e, "Duplicate check failed during import");
                    summary.reject(row, "Failed to save contact");
                }
            }
        }

        let summary = summary.finish();
        record_import(summary.imported, summary.skipped);
        info!(
            user_id = %owner,
            imported = summary.imported,
            skipped = summary.skipped,
            "Contact import finished"
        );

        Ok(summary)
    }

    async fn check_row(
        &self,
        owner: UserId,
        columns: &ColumnMap,
        record: &StringRecord,
    ) -> Result<RowOutcome, DomainError> {
        let first_name = ColumnMap::value(record, columns.first_name);
        let last_name = ColumnMap::value(record, columns.last_name);
        let phone = ColumnMap::value(record, columns.phone_number);

        if first_name.is_empty() || last_name.is_empty() || phone.is_empty() {
            return Ok(RowOutcome::Rejected("Missing required fields"));
        }

        let phone_number = normalize_phone(phone);

        if self.repository.phone_exists(owner, &phone_number).await? {
            return Ok(RowOutcome::Duplicate);
        }

        if phone_number.len() != PHONE_DIGITS {
            return Ok(RowOutcome::Rejected("Phone number must be 10 digits"));
        }

        let optional = |value: &str| (!value.is_empty()).then(|| sanitize_text(value));

        Ok(RowOutcome::Ready(ContactDraft {
            first_name: sanitize_text(first_name),
            last_name: sanitize_text(last_name),
            phone_number,
            email_address: optional(ColumnMap::value(record, columns.email_address)),
            address: optional(ColumnMap::value(record, columns.address)),
        }))
    }
}
