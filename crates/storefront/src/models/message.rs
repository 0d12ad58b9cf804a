//! Persisted contact and quote submissions.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use tas_core::Email;

/// A stored submission. Quote requests are stored here too, with the
/// product name prefixed to the message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactMessage {
    pub id: Uuid,
    pub name: String,
    pub email: Email,
    pub phone: Option<String>,
    pub message: String,
    pub created_at: DateTime<Utc>,
}

/// Insert payload for [`ContactMessage`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewContactMessage {
    pub name: String,
    pub email: Email,
    pub phone: Option<String>,
    pub message: String,
}
