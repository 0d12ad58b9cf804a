//! Application state shared across handlers.

use std::sync::Arc;

use lettre::transport::smtp::Error as SmtpError;
use sqlx::PgPool;

use crate::config::StorefrontConfig;
use crate::db::ContactMessageRepository;
use crate::services::{InquiryService, Notifier, SiteLinks, SmtpMailer};

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// shared resources like database connections and configuration.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    pool: PgPool,
    inquiries: InquiryService,
}

impl AppState {
    /// Create a new application state.
    ///
    /// Inquiry emails go through SMTP when mail is configured and are
    /// skipped otherwise.
    ///
    /// # Errors
    ///
    /// Returns an error if the SMTP relay host is invalid.
    pub fn new(config: StorefrontConfig, pool: PgPool) -> Result<Self, SmtpError> {
        let notifier = match &config.mail {
            Some(mail) => {
                let mailer = SmtpMailer::new(mail)?;
                Some(Notifier::new(
                    Arc::new(mailer),
                    mail.admin_address.clone(),
                    SiteLinks::new(config.base_url.clone()),
                ))
            }
            None => {
                tracing::warn!("SMTP credentials not set; inquiry emails are disabled");
                None
            }
        };

        let store = Arc::new(ContactMessageRepository::new(pool.clone()));
        let inquiries = InquiryService::new(store, notifier);

        Ok(Self::from_parts(config, pool, inquiries))
    }

    /// Assemble state from already-built parts.
    #[must_use]
    pub fn from_parts(config: StorefrontConfig, pool: PgPool, inquiries: InquiryService) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                config,
                pool,
                inquiries,
            }),
        }
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Get a reference to the database connection pool.
    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.inner.pool
    }

    /// Contact and quote-request handling.
    #[must_use]
    pub fn inquiries(&self) -> &InquiryService {
        &self.inner.inquiries
    }
}
