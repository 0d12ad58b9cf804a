//! Quote request API.

use axum::{Json, extract::State, extract::rejection::JsonRejection};
use tracing::instrument;

use super::{ApiError, SubmitResponse};
use crate::error::add_breadcrumb;
use crate::services::QuoteRequest;
use crate::state::AppState;

/// Submit a quote request from a product page.
///
/// POST /api/quote-request
///
/// # Errors
///
/// 400 for an unreadable body, missing fields or a malformed email; 500 if
/// the request could not be stored.
#[instrument(skip_all)]
pub async fn submit(
    State(state): State<AppState>,
    payload: Result<Json<QuoteRequest>, JsonRejection>,
) -> Result<Json<SubmitResponse>, ApiError> {
    let Json(request) = payload.map_err(|e| ApiError::rejected(&e))?;
    add_breadcrumb(
        "form",
        "Quote requested",
        &[("product_id", request.product_id.as_deref().unwrap_or_default())],
    );

    state
        .inquiries()
        .submit_quote(request)
        .await
        .map_err(|e| ApiError::submission(e, "Failed to submit quote request"))?;

    Ok(SubmitResponse::ok("Quote request submitted successfully"))
}
