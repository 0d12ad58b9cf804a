//! Contact message persistence.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use tas_core::Email;

use super::RepositoryError;
use crate::models::{ContactMessage, NewContactMessage};

/// Append-only sink for form submissions.
#[async_trait]
pub trait MessageStore: Send + Sync {
    /// Store one submission and return the saved row.
    async fn insert(&self, message: NewContactMessage) -> Result<ContactMessage, RepositoryError>;
}

/// `PostgreSQL`-backed [`MessageStore`].
#[derive(Clone)]
pub struct ContactMessageRepository {
    pool: PgPool,
}

impl ContactMessageRepository {
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct ContactMessageRow {
    id: Uuid,
    name: String,
    email: String,
    phone: Option<String>,
    message: String,
    created_at: DateTime<Utc>,
}

#[async_trait]
impl MessageStore for ContactMessageRepository {
    async fn insert(&self, message: NewContactMessage) -> Result<ContactMessage, RepositoryError> {
        let row: ContactMessageRow = sqlx::query_as(
            r"
            INSERT INTO contact_message (name, email, phone, message)
            VALUES ($1, $2, $3, $4)
            RETURNING id, name, email, phone, message, created_at
            ",
        )
        .bind(&message.name)
        .bind(message.email.as_str())
        .bind(message.phone.as_deref())
        .bind(&message.message)
        .fetch_one(&self.pool)
        .await?;

        let email = Email::parse(&row.email).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid email in database: {e}"))
        })?;

        Ok(ContactMessage {
            id: row.id,
            name: row.name,
            email,
            phone: row.phone,
            message: row.message,
            created_at: row.created_at,
        })
    }
}
