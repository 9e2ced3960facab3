//! CSV contact export

use std::io;
use std::sync::Arc;

use bytes::Bytes;
use futures::stream::{self, Stream};
use tracing::info;

use crate::domain::contact::{Contact, ContactRepository};
use crate::domain::user::UserId;
use crate::domain::validation::unescape_html;
use crate::domain::DomainError;

/// Fixed column order of exported files
pub const EXPORT_COLUMNS: [&str; 6] = [
    "contact_id",
    "first_name",
    "last_name",
    "phone_number",
    "email_address",
    "address",
];

pub const EXPORT_FILENAME: &str = "contacts.csv";

const ROWS_PER_CHUNK: usize = 256;

/// Writes an owner's whole book as CSV
#[derive(Debug, Clone)]
pub struct ContactExporter {
    repository: Arc<dyn ContactRepository>,
}

impl ContactExporter {
    pub fn new(repository: Arc<dyn ContactRepository>) -> Self {
        Self { repository }
    }

    /// Load every owned contact and return the file as a chunked byte stream.
    /// The header is always the first chunk, even for an empty book.
    pub async fn export(
        &self,
        owner: UserId,
    ) -> Result<impl Stream<Item = Result<Bytes, io::Error>> + Send + 'static, DomainError> {
        let contacts = self.repository.export_all(owner).await?;
        info!(user_id = %owner, rows = contacts.len(), "Exporting contacts");

        let mut chunks = vec![encode_header()];
        chunks.extend(contacts.chunks(ROWS_PER_CHUNK).map(encode_rows));

        Ok(stream::iter(chunks))
    }
}

fn encode_header() -> Result<Bytes, io::Error> {
    write_records(std::iter::once(EXPORT_COLUMNS.map(str::to_string)))
}

fn encode_rows(contacts: &[Contact]) -> Result<Bytes, io::Error> {
    write_records(contacts.iter().map(export_row))
}

fn write_records(rows: impl Iterator<Item = [String; 6]>) -> Result<Bytes, io::Error> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(Vec::new());

    for row in rows {
        writer.write_record(&row).map_err(io::Error::other)?;
    }

    let data = writer
        .into_inner()
        .map_err(|e| io::Error::other(e.to_string()))?;
    Ok(Bytes::from(data))
}

/// Stored text is escaped markup; the file carries what the user typed
fn export_row(contact: &Contact) -> [String; 6] {
    let text = |value: &Option<String>| value.as_deref().map(unescape_html).unwrap_or_default();

    [
        contact.id.to_string(),
        unescape_html(&contact.first_name),
        unescape_html(&contact.last_name),
        contact.phone_number.clone(),
        text(&contact.email_address),
        text(&contact.address),
    ]
}

/// Collect an export stream into one buffer
#[cfg(test)]
async fn collect_export(
    stream: impl Stream<Item = Result<Bytes, io::Error>>,
) -> String {
    use futures::StreamExt;

    let chunks: Vec<_> = stream.collect().await;
    let mut out = Vec::new();
    for chunk in chunks {
        out.extend_from_slice(&chunk.unwrap());
    }
    String::from_utf8(out).unwrap()
}
