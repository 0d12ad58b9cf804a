//! JSON API routes used by the storefront forms and branch bar.
//!
//! Failures answer `{"error": "..."}`; form submissions answer
//! `{"success": true, "message": "..."}`.

pub mod contact;
pub mod offices;
pub mod quote;

use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;

use crate::services::SubmitError;

/// Error response for API endpoints.
#[derive(Debug, Serialize)]
pub struct ApiError {
    #[serde(skip)]
    status: StatusCode,
    pub error: String,
}

impl ApiError {
    fn new(status: StatusCode, msg: impl Into<String>) -> Self {
        Self {
            status,
            error: msg.into(),
        }
    }

    /// Body could not be read as JSON.
    fn rejected(rejection: &JsonRejection) -> Self {
        tracing::debug!(error = %rejection, "Rejected request body");
        Self::new(StatusCode::BAD_REQUEST, "Invalid request body")
    }

    /// Map a failed submission. Validation messages go back verbatim;
    /// storage failures are reported as `failure` and captured to Sentry.
    fn submission(err: SubmitError, failure: &str) -> Self {
        match err {
            SubmitError::Invalid(e) => Self::new(StatusCode::BAD_REQUEST, e.to_string()),
            SubmitError::Store(e) => {
                let event_id = sentry::capture_error(&e);
                tracing::error!(error = %e, sentry_event_id = %event_id, "Submission not stored");
                Self::new(StatusCode::INTERNAL_SERVER_ERROR, failure)
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self)).into_response()
    }
}

/// Response for an accepted form submission.
#[derive(Debug, Serialize)]
pub struct SubmitResponse {
    pub success: bool,
    pub message: &'static str,
}

impl SubmitResponse {
    const fn ok(message: &'static str) -> Json<Self> {
        Json(Self {
            success: true,
            message,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
pub(crate) mod tests {
    use std::sync::Arc;

    use axum::{
        Router,
        body::Body,
        http::{Request, header},
    };
    use http_body_util::BodyExt;
    use serde_json::Value;
    use sqlx::postgres::PgPoolOptions;
    use tower::ServiceExt;

    use crate::config::StorefrontConfig;
    use crate::services::inquiry::tests::{MemoryStore, RecordingMailer, notifier};
    use crate::services::{InquiryService, Notifier};
    use crate::state::AppState;

    use super::*;

    /// State over in-memory fakes. The pool is lazy and never connects.
    pub fn state(store: Arc<MemoryStore>, notifier: Option<Notifier>) -> AppState {
        let config = StorefrontConfig::from_lookup(|key| {
            (key == "DATABASE_URL").then(|| "postgres://localhost/tas".to_string())
        })
        .unwrap();
        let pool = PgPoolOptions::new()
            .connect_lazy("postgres://localhost/tas")
            .unwrap();
        AppState::from_parts(config, pool, InquiryService::new(store, notifier))
    }

    pub fn app(state: AppState) -> Router {
        crate::routes::routes().with_state(state)
    }

    pub async fn post_json(app: Router, uri: &str, body: &str) -> (StatusCode, Value) {
        let response = app
            .oneshot(
                Request::post(uri)
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(body.to_owned()))
                    .unwrap(),
            )
            .await
            .unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_malformed_body_is_bad_request() {
        let store = Arc::new(MemoryStore::default());
        let (status, body) = post_json(app(state(store.clone(), None)), "/api/contact", "{name").await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Invalid request body");
        assert_eq!(store.len(), 0);
    }

    #[tokio::test]
    async fn test_store_failure_hides_details() {
        let store = Arc::new(MemoryStore::failing());
        let mailer = Arc::new(RecordingMailer::default());
        let (status, body) = post_json(
            app(state(store, Some(notifier(mailer.clone())))),
            "/api/contact",
            r#"{"name":"Ravi","email":"ravi@example.com","message":"Hello"}"#,
        )
        .await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, serde_json::json!({ "error": "Failed to send message" }));
        assert!(mailer.subjects().is_empty());
    }
}
