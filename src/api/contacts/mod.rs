//! Contact endpoints
//!
//! Every handler takes the caller from the bearer token and passes that id
//! down as the owner filter.

mod crud;
mod notify;
mod transfer;

use axum::{
    extract::Path,
    routing::{get, post},
    Router,
};

use crate::api::state::AppState;
use crate::api::types::ApiError;
use crate::domain::contact::ContactId;
use crate::infrastructure::contact::CONTACT_NOT_FOUND;

pub fn create_contacts_router() -> Router<AppState> {
    Router::new()
        .route("/api/contacts", get(crud::list_contacts).post(crud::create_contact))
        .route("/api/contacts/export", get(transfer::export_contacts))
        .route("/api/contacts/import", post(transfer::import_contacts))
        .route("/api/contacts/share", post(notify::share_contacts))
        .route(
            "/api/contacts/{id}",
            get(crud::get_contact)
                .put(crud::update_contact)
                .delete(crud::delete_contact),
        )
        .route("/api/contacts/{id}/send_email", post(notify::send_email))
}

/// A non-numeric id cannot name a contact
fn contact_id(Path(raw): Path<String>) -> Result<ContactId, ApiError> {
    raw.parse::<i64>()
        .map(ContactId::new)
        .map_err(|_| ApiError::not_found(CONTACT_NOT_FOUND))
}
