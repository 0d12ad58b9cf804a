//! Contact form API.

use axum::{Json, extract::State, extract::rejection::JsonRejection};
use tracing::instrument;

use super::{ApiError, SubmitResponse};
use crate::error::add_breadcrumb;
use crate::services::ContactRequest;
use crate::state::AppState;

/// Submit the contact form.
///
/// POST /api/contact
///
/// The message is stored before any email is attempted. Email failures are
/// logged and never change the response.
///
/// # Errors
///
/// 400 for an unreadable body, missing fields or a malformed email; 500 if
/// the message could not be stored.
#[instrument(skip_all)]
pub async fn submit(
    State(state): State<AppState>,
    payload: Result<Json<ContactRequest>, JsonRejection>,
) -> Result<Json<SubmitResponse>, ApiError> {
    let Json(request) = payload.map_err(|e| ApiError::rejected(&e))?;
    add_breadcrumb("form", "Contact form submitted", &[]);

    state
        .inquiries()
        .submit_contact(request)
        .await
        .map_err(|e| ApiError::submission(e, "Failed to send message"))?;

    Ok(SubmitResponse::ok("Message sent successfully"))
}
