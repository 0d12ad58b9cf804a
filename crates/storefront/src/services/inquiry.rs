//! Contact and quote-request submissions.
//!
//! A submission is validated, stored once, then announced by two emails
//! (admin notification and customer acknowledgment) sent concurrently.
//! Mail failures are logged and reported in the [`DispatchReport`] but never
//! undo the stored row.

use std::sync::Arc;

use serde::Deserialize;
use thiserror::Error;
use tracing::instrument;

use tas_core::Email;

use super::email::{self, MailError, Mailer, OutgoingEmail, SiteLinks};
use crate::db::{MessageStore, RepositoryError};
use crate::models::{ContactMessage, NewContactMessage};

/// Stored message body when a quote request carries no message.
pub const DEFAULT_QUOTE_MESSAGE: &str = "Customer requested a quote.";

/// Contact form body.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ContactRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub message: Option<String>,
    pub subject: Option<String>,
}

/// Quote request form body.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct QuoteRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub message: Option<String>,
    pub product_name: Option<String>,
    pub product_id: Option<String>,
}

/// Rejected form input. The message is shown to the visitor verbatim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Name, email, and message are required")]
    MissingContactFields,
    #[error("Name, email, and product are required")]
    MissingQuoteFields,
    #[error("Invalid email format")]
    InvalidEmail,
}

/// Why a submission did not complete.
#[derive(Debug, Error)]
pub enum SubmitError {
    #[error(transparent)]
    Invalid(#[from] ValidationError),
    #[error("failed to store submission: {0}")]
    Store(#[from] RepositoryError),
}

/// A validated contact form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactInquiry {
    pub name: String,
    pub email: Email,
    pub phone: Option<String>,
    pub subject: Option<String>,
    pub message: String,
}

impl ContactInquiry {
    /// Subject line shown to staff; falls back to a generic label.
    #[must_use]
    pub fn subject_or_default(&self) -> &str {
        self.subject.as_deref().unwrap_or("Website Inquiry")
    }
}

/// A validated quote request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuoteInquiry {
    pub name: String,
    pub email: Email,
    pub phone: Option<String>,
    pub message: Option<String>,
    pub product_name: String,
    pub product_id: Option<String>,
}

impl QuoteInquiry {
    /// Message text persisted for the request.
    #[must_use]
    pub fn stored_message(&self) -> String {
        format!(
            "[Quote Request for: {}]\n\n{}",
            self.product_name,
            self.message.as_deref().unwrap_or(DEFAULT_QUOTE_MESSAGE)
        )
    }
}

impl ContactRequest {
    /// # Errors
    ///
    /// Returns `ValidationError` if a required field is blank or the email is malformed.
    pub fn validate(self) -> Result<ContactInquiry, ValidationError> {
        let (Some(name), Some(email), Some(message)) = (
            present(self.name),
            present(self.email),
            present(self.message),
        ) else {
            return Err(ValidationError::MissingContactFields);
        };

        Ok(ContactInquiry {
            name,
            email: Email::parse(&email).map_err(|_| ValidationError::InvalidEmail)?,
            phone: present(self.phone),
            subject: present(self.subject),
            message,
        })
    }
}

impl QuoteRequest {
    /// # Errors
    ///
    /// Returns `ValidationError` if a required field is blank or the email is malformed.
    pub fn validate(self) -> Result<QuoteInquiry, ValidationError> {
        let (Some(name), Some(email), Some(product_name)) = (
            present(self.name),
            present(self.email),
            present(self.product_name),
        ) else {
            return Err(ValidationError::MissingQuoteFields);
        };

        Ok(QuoteInquiry {
            name,
            email: Email::parse(&email).map_err(|_| ValidationError::InvalidEmail)?,
            phone: present(self.phone),
            message: present(self.message),
            product_name,
            product_id: present(self.product_id),
        })
    }
}

/// Trimmed value, or `None` when blank.
fn present(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_owned())
        .filter(|v| !v.is_empty())
}

/// Result of sending one email.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DispatchOutcome {
    pub sent: bool,
    pub error: Option<String>,
}

impl DispatchOutcome {
    const fn sent() -> Self {
        Self {
            sent: true,
            error: None,
        }
    }

    fn failed(error: &MailError) -> Self {
        Self {
            sent: false,
            error: Some(error.to_string()),
        }
    }
}

/// What happened to the two emails of a submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchReport {
    /// Mail is not configured.
    Skipped,
    Attempted {
        admin: DispatchOutcome,
        customer: DispatchOutcome,
    },
}

impl DispatchReport {
    fn log(&self, kind: &'static str) {
        match self {
            Self::Skipped => {
                tracing::info!(kind, "Email not configured, skipping notifications");
            }
            Self::Attempted { admin, customer } if admin.sent && customer.sent => {
                tracing::info!(kind, "Notification emails sent");
            }
            Self::Attempted { admin, customer } => {
                tracing::warn!(
                    kind,
                    admin_sent = admin.sent,
                    admin_error = admin.error.as_deref().unwrap_or(""),
                    customer_sent = customer.sent,
                    customer_error = customer.error.as_deref().unwrap_or(""),
                    "Failed to send notification emails"
                );
            }
        }
    }
}

/// A stored submission and the fate of its emails.
#[derive(Debug, Clone)]
pub struct Submission {
    pub message: ContactMessage,
    pub dispatch: DispatchReport,
}

/// Sends inquiry emails through a [`Mailer`].
#[derive(Clone)]
pub struct Notifier {
    mailer: Arc<dyn Mailer>,
    admin_address: String,
    site: SiteLinks,
}

impl Notifier {
    #[must_use]
    pub fn new(mailer: Arc<dyn Mailer>, admin_address: impl Into<String>, site: SiteLinks) -> Self {
        Self {
            mailer,
            admin_address: admin_address.into(),
            site,
        }
    }

    async fn dispatch(
        &self,
        admin: Result<OutgoingEmail, MailError>,
        customer: Result<OutgoingEmail, MailError>,
    ) -> DispatchReport {
        let (admin, customer) = tokio::join!(self.deliver(admin), self.deliver(customer));
        DispatchReport::Attempted { admin, customer }
    }

    async fn deliver(&self, email: Result<OutgoingEmail, MailError>) -> DispatchOutcome {
        let result = match email {
            Ok(email) => self.mailer.send(email).await,
            Err(e) => Err(e),
        };
        match result {
            Ok(()) => DispatchOutcome::sent(),
            Err(e) => {
                tracing::error!(error = %e, "Email delivery failed");
                DispatchOutcome::failed(&e)
            }
        }
    }
}

/// Entry point for both forms.
#[derive(Clone)]
pub struct InquiryService {
    store: Arc<dyn MessageStore>,
    notifier: Option<Notifier>,
}

impl InquiryService {
    /// `notifier` is `None` when mail is not configured.
    #[must_use]
    pub fn new(store: Arc<dyn MessageStore>, notifier: Option<Notifier>) -> Self {
        Self { store, notifier }
    }

    /// Validate, store and announce a contact form.
    ///
    /// # Errors
    ///
    /// Returns `SubmitError::Invalid` before any side effect, or
    /// `SubmitError::Store` if the row could not be written.
    #[instrument(skip_all)]
    pub async fn submit_contact(&self, request: ContactRequest) -> Result<Submission, SubmitError> {
        let inquiry = request.validate()?;

        let message = self
            .store
            .insert(NewContactMessage {
                name: inquiry.name.clone(),
                email: inquiry.email.clone(),
                phone: inquiry.phone.clone(),
                message: inquiry.message.clone(),
            })
            .await?;
        tracing::info!(id = %message.id, "New contact message received");

        let dispatch = match &self.notifier {
            Some(notifier) => {
                notifier
                    .dispatch(
                        email::contact_admin(&inquiry, &notifier.admin_address, &notifier.site),
                        email::contact_reply(&inquiry, &notifier.site),
                    )
                    .await
            }
            None => DispatchReport::Skipped,
        };
        dispatch.log("contact");

        Ok(Submission { message, dispatch })
    }

    /// Validate, store and announce a quote request.
    ///
    /// # Errors
    ///
    /// Returns `SubmitError::Invalid` before any side effect, or
    /// `SubmitError::Store` if the row could not be written.
    #[instrument(skip_all)]
    pub async fn submit_quote(&self, request: QuoteRequest) -> Result<Submission, SubmitError> {
        let inquiry = request.validate()?;

        let message = self
            .store
            .insert(NewContactMessage {
                name: inquiry.name.clone(),
                email: inquiry.email.clone(),
                phone: inquiry.phone.clone(),
                message: inquiry.stored_message(),
            })
            .await?;
        tracing::info!(id = %message.id, product = %inquiry.product_name, "New quote request received");

        let dispatch = match &self.notifier {
            Some(notifier) => {
                notifier
                    .dispatch(
                        email::quote_admin(&inquiry, &notifier.admin_address, &notifier.site),
                        email::quote_customer(&inquiry, &notifier.site),
                    )
                    .await
            }
            None => DispatchReport::Skipped,
        };
        dispatch.log("quote");

        Ok(Submission { message, dispatch })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
pub(crate) mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;
    use chrono::Utc;
    use uuid::Uuid;

    use super::*;

    /// In-memory [`MessageStore`].
    #[derive(Default)]
    pub struct MemoryStore {
        pub rows: Mutex<Vec<ContactMessage>>,
        pub fail: bool,
    }

    impl MemoryStore {
        pub fn failing() -> Self {
            Self {
                fail: true,
                ..Self::default()
            }
        }

        pub fn len(&self) -> usize {
            self.rows.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl MessageStore for MemoryStore {
        async fn insert(&self, message: NewContactMessage) -> Result<ContactMessage, RepositoryError> {
            if self.fail {
                return Err(RepositoryError::Database(sqlx::Error::PoolTimedOut));
            }
            let row = ContactMessage {
                id: Uuid::new_v4(),
                name: message.name,
                email: message.email,
                phone: message.phone,
                message: message.message,
                created_at: Utc::now(),
            };
            self.rows.lock().unwrap().push(row.clone());
            Ok(row)
        }
    }

    /// [`Mailer`] that records messages and optionally rejects one recipient.
    #[derive(Default)]
    pub struct RecordingMailer {
        pub sent: Mutex<Vec<OutgoingEmail>>,
        pub reject: Option<String>,
    }

    impl RecordingMailer {
        pub fn subjects(&self) -> Vec<String> {
            let mut subjects: Vec<String> = self
                .sent
                .lock()
                .unwrap()
                .iter()
                .map(|m| m.subject.clone())
                .collect();
            subjects.sort();
            subjects
        }
    }

    #[async_trait]
    impl Mailer for RecordingMailer {
        async fn send(&self, email: OutgoingEmail) -> Result<(), MailError> {
            if self.reject.as_deref() == Some(email.to.as_str()) {
                return Err(MailError::InvalidAddress(email.to));
            }
            self.sent.lock().unwrap().push(email);
            Ok(())
        }
    }

    pub fn notifier(mailer: Arc<RecordingMailer>) -> Notifier {
        Notifier::new(
            mailer,
            "admin@tastrading.in",
            SiteLinks::new("https://tastrading.in"),
        )
    }

    fn contact(name: &str, email: &str, message: &str) -> ContactRequest {
        ContactRequest {
            name: Some(name.into()),
            email: Some(email.into()),
            message: Some(message.into()),
            ..ContactRequest::default()
        }
    }

    fn quote(name: &str, email: &str, product: &str) -> QuoteRequest {
        QuoteRequest {
            name: Some(name.into()),
            email: Some(email.into()),
            product_name: Some(product.into()),
            product_id: Some("p-42".into()),
            ..QuoteRequest::default()
        }
    }

    #[test]
    fn test_contact_missing_fields() {
        for request in [
            contact("", "a@b.co", "hi"),
            contact("Ravi", "  ", "hi"),
            contact("Ravi", "a@b.co", ""),
            ContactRequest::default(),
        ] {
            assert_eq!(
                request.validate().unwrap_err(),
                ValidationError::MissingContactFields
            );
        }
    }

    #[test]
    fn test_quote_missing_fields() {
        let mut request = quote("Ravi", "a@b.co", "Drill");
        request.product_name = None;
        assert_eq!(
            request.validate().unwrap_err(),
            ValidationError::MissingQuoteFields
        );
    }

    #[test]
    fn test_invalid_email_rejected() {
        for email in ["ravi", "ravi@host", "ra vi@host.in", "@host.in", "a@b@c.in"] {
            assert_eq!(
                contact("Ravi", email, "hi").validate().unwrap_err(),
                ValidationError::InvalidEmail,
                "{email}"
            );
        }
    }

    #[test]
    fn test_validation_messages() {
        assert_eq!(
            ValidationError::MissingContactFields.to_string(),
            "Name, email, and message are required"
        );
        assert_eq!(
            ValidationError::MissingQuoteFields.to_string(),
            "Name, email, and product are required"
        );
        assert_eq!(ValidationError::InvalidEmail.to_string(), "Invalid email format");
    }

    #[test]
    fn test_fields_are_trimmed() {
        let mut request = contact("  Ravi ", " ravi@example.in ", " Need taps ");
        request.phone = Some("   ".into());
        let inquiry = request.validate().unwrap();
        assert_eq!(inquiry.name, "Ravi");
        assert_eq!(inquiry.email.as_str(), "ravi@example.in");
        assert_eq!(inquiry.message, "Need taps");
        assert_eq!(inquiry.phone, None);
        assert_eq!(inquiry.subject_or_default(), "Website Inquiry");
    }

    #[test]
    fn test_quote_stored_message() {
        let inquiry = quote("Ravi", "ravi@example.in", "Bosch GSB 500").validate().unwrap();
        assert_eq!(
            inquiry.stored_message(),
            "[Quote Request for: Bosch GSB 500]\n\nCustomer requested a quote."
        );

        let mut request = quote("Ravi", "ravi@example.in", "Bosch GSB 500");
        request.message = Some("Need 10 units".into());
        assert_eq!(
            request.validate().unwrap().stored_message(),
            "[Quote Request for: Bosch GSB 500]\n\nNeed 10 units"
        );
    }

    #[tokio::test]
    async fn test_invalid_submission_has_no_side_effects() {
        let store = Arc::new(MemoryStore::default());
        let mailer = Arc::new(RecordingMailer::default());
        let service = InquiryService::new(store.clone(), Some(notifier(mailer.clone())));

        let err = service
            .submit_contact(contact("Ravi", "not-an-email", "hi"))
            .await
            .unwrap_err();

        assert!(matches!(err, SubmitError::Invalid(ValidationError::InvalidEmail)));
        assert_eq!(store.len(), 0);
        assert!(mailer.subjects().is_empty());
    }

    #[tokio::test]
    async fn test_without_mail_stores_once_and_skips() {
        let store = Arc::new(MemoryStore::default());
        let service = InquiryService::new(store.clone(), None);

        let submission = service
            .submit_quote(quote("Ravi", "ravi@example.in", "Drill"))
            .await
            .unwrap();

        assert_eq!(store.len(), 1);
        assert_eq!(submission.dispatch, DispatchReport::Skipped);
        assert!(submission.message.message.starts_with("[Quote Request for: Drill]"));
    }

    #[tokio::test]
    async fn test_contact_sends_two_emails() {
        let store = Arc::new(MemoryStore::default());
        let mailer = Arc::new(RecordingMailer::default());
        let service = InquiryService::new(store.clone(), Some(notifier(mailer.clone())));

        let mut request = contact("Ravi", "ravi@example.in", "Need taps");
        request.subject = Some("Bulk order".into());
        let submission = service.submit_contact(request).await.unwrap();

        assert_eq!(
            submission.dispatch,
            DispatchReport::Attempted {
                admin: DispatchOutcome::sent(),
                customer: DispatchOutcome::sent(),
            }
        );
        assert_eq!(
            mailer.subjects(),
            vec![
                "We received your message - TAS Trading Corporation".to_string(),
                "📩 New Contact: Bulk order".to_string(),
            ]
        );
        let sent = mailer.sent.lock().unwrap();
        assert!(sent.iter().any(|m| m.to == "admin@tastrading.in"));
        assert!(sent.iter().any(|m| m.to == "ravi@example.in"));
    }

    #[tokio::test]
    async fn test_mail_failure_is_isolated() {
        let store = Arc::new(MemoryStore::default());
        let mailer = Arc::new(RecordingMailer {
            reject: Some("ravi@example.in".into()),
            ..RecordingMailer::default()
        });
        let service = InquiryService::new(store.clone(), Some(notifier(mailer.clone())));

        let submission = service
            .submit_quote(quote("Ravi", "ravi@example.in", "Drill"))
            .await
            .unwrap();

        let DispatchReport::Attempted { admin, customer } = submission.dispatch else {
            panic!("expected an attempted dispatch");
        };
        assert!(admin.sent);
        assert!(!customer.sent);
        assert!(customer.error.is_some());
        assert_eq!(store.len(), 1);
        assert_eq!(mailer.subjects(), vec!["📋 New Quote Request: Drill".to_string()]);
    }

    #[tokio::test]
    async fn test_store_failure_sends_nothing() {
        let mailer = Arc::new(RecordingMailer::default());
        let service = InquiryService::new(
            Arc::new(MemoryStore::failing()),
            Some(notifier(mailer.clone())),
        );

        let err = service
            .submit_contact(contact("Ravi", "ravi@example.in", "hi"))
            .await
            .unwrap_err();

        assert!(matches!(err, SubmitError::Store(_)));
        assert!(mailer.subjects().is_empty());
    }
}
