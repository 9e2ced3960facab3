//! Security headers and early request size checks

use axum::{
    body::Body,
    extract::State,
    http::{header, HeaderName, HeaderValue, Request},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::api::types::ApiError;
use crate::config::LimitsConfig;

const CONTENT_SECURITY_POLICY: &str =
    "default-src 'self'; script-src 'self' 'unsafe-inline'; style-src 'self' 'unsafe-inline'";

const SECURITY_HEADERS: [(HeaderName, &str); 6] = [
    (header::X_CONTENT_TYPE_OPTIONS, "nosniff"),
    (header::X_FRAME_OPTIONS, "DENY"),
    (HeaderName::from_static("x-xss-protection"), "1; mode=block"),
    (
        header::STRICT_TRANSPORT_SECURITY,
        "max-age=31536000; includeSubDomains",
    ),
    (header::CONTENT_SECURITY_POLICY, CONTENT_SECURITY_POLICY),
    (header::REFERRER_POLICY, "strict-origin-when-cross-origin"),
];

/// Add the security headers to every response
pub async fn security_headers_middleware(request: Request<Body>, next: Next) -> Response {
    let mut response = next.run(request).await;
    let headers = response.headers_mut();

    for (name, value) in SECURITY_HEADERS {
        headers.insert(name, HeaderValue::from_static(value));
    }

    response
}

/// Reject a declared oversized body before it is read, and expose the limit
/// to extractors so their 413 carries the same message
pub async fn body_limit_middleware(
    State(limits): State<LimitsConfig>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    let declared = request
        .headers()
        .get(header::CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<usize>().ok());

    if let Err(err) = validate_content_length(declared, limits.max_body_bytes) {
        return err.into_response();
    }

    request.extensions_mut().insert(limits);
    next.run(request).await
}

/// Validate a declared content length against the configured maximum
pub fn validate_content_length(content_length: Option<usize>, max: usize) -> Result<(), ApiError> {
    match content_length {
        Some(len) if len > max => Err(ApiError::payload_too_large(max)),
        _ => Ok(()),
    }
}
