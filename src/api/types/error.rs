//! API error rendering
//!
//! Every failure leaves the service as `{"error": message}` or, for rejected
//! contact fields, `{"errors": {field: message}}`.

use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use tracing::error;

use crate::domain::validation::FieldErrors;
use crate::domain::DomainError;

pub const GENERIC_SERVER_ERROR: &str = "An unexpected error occurred";
pub const MAIL_AUTH_FAILED: &str = "Email service authentication failed";
pub const MAIL_SEND_FAILED: &str = "Email sending failed";
pub const RATE_LIMITED: &str = "Rate limit exceeded. Please try again later.";

/// Error response body
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ApiErrorBody {
    Message { error: String },
    Fields { errors: FieldErrors },
}

/// API error with status code
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub body: ApiErrorBody,
    /// Seconds for the `Retry-After` header
    pub retry_after: Option<u64>,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            body: ApiErrorBody::Message {
                error: message.into(),
            },
            retry_after: None,
        }
    }

    pub fn fields(errors: FieldErrors) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            body: ApiErrorBody::Fields { errors },
            retry_after: None,
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    /// 413 with the configured limit rendered in MB
    pub fn payload_too_large(max_bytes: usize) -> Self {
        Self::new(
            StatusCode::PAYLOAD_TOO_LARGE,
            format!(
                "File too large. Maximum size is {}MB.",
                max_bytes / (1024 * 1024)
            ),
        )
    }

    pub fn rate_limited(retry_after: u64) -> Self {
        Self {
            retry_after: Some(retry_after),
            ..Self::new(StatusCode::TOO_MANY_REQUESTS, RATE_LIMITED)
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }

    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::new(StatusCode::SERVICE_UNAVAILABLE, message)
    }

    /// Message of a plain error body
    pub fn message(&self) -> Option<&str> {
        match &self.body {
            ApiErrorBody::Message { error } => Some(error),
            ApiErrorBody::Fields { .. } => None,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let mut response = (self.status, Json(self.body)).into_response();

        if let Some(seconds) = self.retry_after {
            response
                .headers_mut()
                .insert(header::RETRY_AFTER, HeaderValue::from(seconds));
        }

        response
    }
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::NotFound { message } => Self::not_found(message),
            DomainError::Validation { message } => Self::bad_request(message),
            DomainError::InvalidFields(errors) => Self::fields(errors),
            DomainError::Conflict { message } => Self::bad_request(message),
            DomainError::Unauthorized { message } => Self::unauthorized(message),
            DomainError::TransportAuth { ref message } => {
                error!(error = %message, "Mail transport rejected credentials");
                Self::new(StatusCode::BAD_GATEWAY, MAIL_AUTH_FAILED)
            }
            DomainError::Transport { ref message } => {
                error!(error = %message, "Mail transport failure");
                Self::internal(MAIL_SEND_FAILED)
            }
            DomainError::Storage { .. }
            | DomainError::Configuration { .. }
            | DomainError::Internal { .. } => {
                error!(error = %err, "Request failed");
                Self::internal(GENERIC_SERVER_ERROR)
            }
        }
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.body {
            ApiErrorBody::Message { error } => write!(f, "{}: {}", self.status, error),
            ApiErrorBody::Fields { errors } => write!(f, "{}: {}", self.status, errors),
        }
    }
}

impl std::error::Error for ApiError {}
