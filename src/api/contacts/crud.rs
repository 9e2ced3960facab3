use std::collections::HashMap;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
};

use super::contact_id;
use crate::api::middleware::AuthenticatedUser;
use crate::api::state::AppState;
use crate::api::types::{
    contact_query, ApiError, ContactListResponse, ContactMutationResponse, Json, MessageResponse,
};
use crate::domain::contact::{Contact, ContactInput};

/// GET /api/contacts
pub async fn list_contacts(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<ContactListResponse>, ApiError> {
    let query = contact_query(&params);
    let page = state.contact_service.list(user.id, &query).await?;

    Ok(Json(page.into()))
}

/// GET /api/contacts/{id}
pub async fn get_contact(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    path: Path<String>,
) -> Result<Json<Contact>, ApiError> {
    let id = contact_id(path)?;
    let contact = state.contact_service.get(user.id, id).await?;

    Ok(Json(contact))
}

/// POST /api/contacts
pub async fn create_contact(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Json(input): Json<ContactInput>,
) -> Result<(StatusCode, Json<ContactMutationResponse>), ApiError> {
    let contact = state.contact_service.create(user.id, &input).await?;

    Ok((
        StatusCode::CREATED,
        Json(ContactMutationResponse {
            message: "Contact added",
            contact,
        }),
    ))
}

/// PUT /api/contacts/{id}
pub async fn update_contact(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    path: Path<String>,
    Json(input): Json<ContactInput>,
) -> Result<Json<ContactMutationResponse>, ApiError> {
    let id = contact_id(path)?;
    let contact = state.contact_service.update(user.id, id, &input).await?;

    Ok(Json(ContactMutationResponse {
        message: "Contact updated",
        contact,
    }))
}

/// DELETE /api/contacts/{id}
pub async fn delete_contact(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    path: Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    let id = contact_id(path)?;
    state.contact_service.delete(user.id, id).await?;

    Ok(Json(MessageResponse::new("Contact deleted")))
}
