//! Bearer token authentication for contact endpoints

use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts, HeaderMap},
};
use tracing::debug;

use crate::api::state::AppState;
use crate::api::types::ApiError;
use crate::domain::user::UserId;
use crate::infrastructure::auth::{TokenClaims, TokenError};

pub const TOKEN_MISSING: &str = "Token is missing!";
pub const TOKEN_EXPIRED: &str = "Token has expired. Please log in again.";
pub const TOKEN_INVALID: &str = "Token is invalid!";

/// Extractor that requires a valid bearer token
///
/// Tokens are self-contained; the caller's identity comes from the verified
/// claims without a store lookup.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub id: UserId,
    pub claims: TokenClaims,
}

impl AuthenticatedUser {
    pub fn username(&self) -> &str {
        &self.claims.username
    }
}

impl FromRequestParts<AppState> for AuthenticatedUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = extract_bearer_token(&parts.headers)
            .ok_or_else(|| ApiError::unauthorized(TOKEN_MISSING))?;

        let claims = state.token_service.verify(token).map_err(|e| {
            debug!(error = %e, "Rejected bearer token");
            match e {
                TokenError::Expired => ApiError::unauthorized(TOKEN_EXPIRED),
                _ => ApiError::unauthorized(TOKEN_INVALID),
            }
        })?;

        let id = claims
            .user_id()
            .map_err(|_| ApiError::unauthorized(TOKEN_INVALID))?;

        Ok(AuthenticatedUser { id, claims })
    }
}

/// Token from `Authorization: Bearer <token>`; `None` when absent or empty
pub fn extract_bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
}
