use axum::{
    body::Body,
    extract::{multipart::MultipartRejection, Multipart, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use tracing::debug;

use crate::api::middleware::AuthenticatedUser;
use crate::api::state::AppState;
use crate::api::types::{ApiError, Json};
use crate::infrastructure::transfer::{ImportSummary, EXPORT_FILENAME};

const NO_FILE_PART: &str = "No file part";
const NO_SELECTED_FILE: &str = "No selected file";
const CSV_ONLY: &str = "Only CSV files are allowed";

/// GET /api/contacts/export
pub async fn export_contacts(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> Result<Response, ApiError> {
    let stream = state.exporter.export(user.id).await?;

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "text/csv".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename={}", EXPORT_FILENAME),
            ),
        ],
        Body::from_stream(stream),
    )
        .into_response())
}

/// POST /api/contacts/import - multipart upload in field `file`
pub async fn import_contacts(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<ImportSummary>, ApiError> {
    let mut multipart = multipart.map_err(|e| {
        debug!(error = %e, "Import without multipart body");
        ApiError::bad_request(NO_FILE_PART)
    })?;

    let max_bytes = state.limits.max_body_bytes;
    let upload_error = |e: axum::extract::multipart::MultipartError| {
        if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
            ApiError::payload_too_large(max_bytes)
        } else {
            debug!(error = %e, "Malformed multipart upload");
            ApiError::bad_request(NO_FILE_PART)
        }
    };

    while let Some(field) = multipart.next_field().await.map_err(upload_error)? {
        if field.name() != Some("file") {
            continue;
        }

        let filename = field.file_name().unwrap_or_default().to_string();

        if filename.is_empty() {
            return Err(ApiError::bad_request(NO_SELECTED_FILE));
        }
        if !filename.ends_with(".csv") {
            return Err(ApiError::bad_request(CSV_ONLY));
        }

        let data = field.bytes().await.map_err(upload_error)?;
        let summary = state.importer.import(user.id, &data).await?;

        return Ok(Json(summary));
    }

    Err(ApiError::bad_request(NO_FILE_PART))
}
