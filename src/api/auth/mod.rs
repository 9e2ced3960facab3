//! Account endpoints
//!
//! Registration, password login and token refresh.

use axum::{extract::State, http::StatusCode, routing::post, Router};
use tracing::{error, info};

use crate::api::middleware::AuthenticatedUser;
use crate::api::state::AppState;
use crate::api::types::{ApiError, CredentialsRequest, Json, MessageResponse, TokenResponse};
use crate::infrastructure::auth::TokenError;

pub const INVALID_CREDENTIALS: &str = "Invalid username or password";

pub fn create_auth_router() -> Router<AppState> {
    Router::new()
        .route("/api/register", post(register))
        .route("/api/login", post(login))
        .route("/api/refresh", post(refresh))
}

/// POST /api/register
pub async fn register(
    State(state): State<AppState>,
    Json(request): Json<CredentialsRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    state
        .user_service
        .register(&request.username, &request.password)
        .await?;

    Ok(Json(MessageResponse::new("User registered successfully")))
}

/// POST /api/login
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<CredentialsRequest>,
) -> Result<Json<TokenResponse>, ApiError> {
    let user = state
        .user_service
        .authenticate(&request.username, &request.password)
        .await?
        .ok_or_else(|| ApiError::unauthorized(INVALID_CREDENTIALS))?;

    let issued = state
        .token_service
        .issue(user.id(), user.username(), user.role())
        .map_err(token_failure)?;

    info!(user_id = %user.id(), "User logged in");
    Ok(Json(issued.into()))
}

/// POST /api/refresh - new expiry for a still valid token
pub async fn refresh(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> Result<Json<TokenResponse>, ApiError> {
    let issued = state
        .token_service
        .refresh(&user.claims)
        .map_err(token_failure)?;

    Ok(Json(issued.into()))
}

fn token_failure(err: TokenError) -> ApiError {
    error!(error = %err, "Token signing failed");
    ApiError::new(
        StatusCode::INTERNAL_SERVER_ERROR,
        crate::api::types::error::GENERIC_SERVER_ERROR,
    )
}
