//! Branch directory and nearest-branch locator API.

use axum::{Json, extract::rejection::JsonRejection, http::StatusCode};
use serde::{Deserialize, Serialize};

use tas_core::locator::{Locator, LocatorCommand, LocatorEvent};
use tas_core::offices::{OFFICES, Office};

use super::ApiError;
use crate::routes::BranchBar;

/// Longest event log accepted for one page view.
const MAX_EVENTS: usize = 32;

/// List every branch with coordinates and contacts.
///
/// GET /api/offices
pub async fn list() -> Json<&'static [Office]> {
    Json(OFFICES)
}

/// Every locator event of one page view, oldest first.
#[derive(Debug, Deserialize)]
pub struct LocateRequest {
    pub events: Vec<LocatorEvent>,
}

/// Locator answer for the latest event.
#[derive(Debug, Serialize)]
pub struct LocateResponse {
    /// Side effects for the browser to run.
    pub commands: Vec<LocatorCommand>,
    pub show_prompt: bool,
    /// `None` hides the bar.
    pub branch: Option<BranchBar>,
}

/// Advance the nearest-branch locator.
///
/// POST /api/offices/locator
///
/// The browser keeps the page's event log and posts all of it; the locator
/// is rebuilt from the log, so no server-side session is needed.
pub async fn locate(
    payload: Result<Json<LocateRequest>, JsonRejection>,
) -> Result<Json<LocateResponse>, ApiError> {
    let Json(request) = payload.map_err(|e| ApiError::rejected(&e))?;
    if request.events.len() > MAX_EVENTS {
        return Err(ApiError::new(
            StatusCode::BAD_REQUEST,
            "Too many locator events",
        ));
    }

    let (locator, commands) = Locator::replay(OFFICES, request.events).ok_or_else(|| {
        ApiError::new(StatusCode::INTERNAL_SERVER_ERROR, "No branches configured")
    })?;
    tracing::debug!(state = ?locator.state(), commands = commands.len(), "Locator step");

    let view = locator.view();
    Ok(Json(LocateResponse {
        commands,
        show_prompt: view.show_prompt,
        branch: BranchBar::from_view(view),
    }))
}
