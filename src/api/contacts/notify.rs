use axum::extract::{Path, State};

use super::contact_id;
use crate::api::middleware::AuthenticatedUser;
use crate::api::state::AppState;
use crate::api::types::{ApiError, Json, MessageResponse, SendEmailRequest, ShareContactsRequest};
use crate::infrastructure::notification::Sender;

/// POST /api/contacts/{id}/send_email
pub async fn send_email(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    path: Path<String>,
    Json(request): Json<SendEmailRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    let id = contact_id(path)?;
    let sender = Sender {
        owner: user.id,
        username: user.username(),
    };

    state
        .dispatcher
        .send_to_contact(
            sender,
            id,
            request.subject.as_deref().unwrap_or_default(),
            request.message.as_deref().unwrap_or_default(),
        )
        .await?;

    Ok(Json(MessageResponse::new("Email sent successfully")))
}

/// POST /api/contacts/share
pub async fn share_contacts(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Json(request): Json<ShareContactsRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    let sender = Sender {
        owner: user.id,
        username: user.username(),
    };

    let receipt = state
        .dispatcher
        .share_contacts(
            sender,
            &request.contact_ids(),
            request.recipient_email.as_deref().unwrap_or_default(),
            request.subject.as_deref(),
            request.message.as_deref(),
        )
        .await?;

    Ok(Json(MessageResponse::new(receipt.message())))
}
