//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `STOREFRONT_DATABASE_URL` - `PostgreSQL` connection string (falls back to `DATABASE_URL`)
//!
//! ## Optional
//! - `STOREFRONT_HOST` - Bind address (default: 127.0.0.1)
//! - `STOREFRONT_PORT` - Listen port (default: 3000)
//! - `STOREFRONT_BASE_URL` - Public URL used in email links (default: <https://tastrading.in>)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//!
//! ## Mail
//! Email is enabled only when both credentials are present.
//! - `SMTP_USERNAME` / `SMTP_PASSWORD` - Relay credentials
//!   (legacy names `GMAIL_USER` / `GMAIL_APP_PASSWORD` are still read)
//! - `SMTP_HOST` - Relay host (default: smtp.gmail.com)
//! - `SMTP_PORT` - Relay port (default: 587)
//! - `ADMIN_EMAIL` - Inbox for new inquiries (default: the SMTP username)
//! - `MAIL_FROM` - Sender address (default: the SMTP username)

use std::net::{IpAddr, SocketAddr};

use secrecy::SecretString;
use thiserror::Error;

const DEFAULT_BASE_URL: &str = "https://tastrading.in";
const DEFAULT_SMTP_HOST: &str = "smtp.gmail.com";
const DEFAULT_SMTP_PORT: &str = "587";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Storefront application configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// `PostgreSQL` database connection URL (contains password)
    pub database_url: SecretString,
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public base URL, without trailing slash
    pub base_url: String,
    /// Outbound mail settings; `None` disables inquiry emails
    pub mail: Option<MailConfig>,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
}

/// SMTP relay configuration.
///
/// Implements `Debug` manually to redact the password.
#[derive(Clone)]
pub struct MailConfig {
    pub smtp_host: String,
    pub smtp_port: u16,
    pub smtp_username: String,
    pub smtp_password: SecretString,
    /// `From:` address on every message
    pub from_address: String,
    /// Recipient of admin notifications
    pub admin_address: String,
}

impl std::fmt::Debug for MailConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MailConfig")
            .field("smtp_host", &self.smtp_host)
            .field("smtp_port", &self.smtp_port)
            .field("smtp_username", &self.smtp_username)
            .field("smtp_password", &"[REDACTED]")
            .field("from_address", &self.from_address)
            .field("admin_address", &self.admin_address)
            .finish()
    }
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable source.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let env = Env(&lookup);

        let database_url = env.database_url("STOREFRONT_DATABASE_URL")?;
        let host = env
            .or_default("STOREFRONT_HOST", "127.0.0.1")
            .parse::<IpAddr>()
            .map_err(|e| {
                ConfigError::InvalidEnvVar("STOREFRONT_HOST".to_string(), e.to_string())
            })?;
        let port = parse_port(&env, "STOREFRONT_PORT", "3000")?;
        let base_url = env
            .or_default("STOREFRONT_BASE_URL", DEFAULT_BASE_URL)
            .trim_end_matches('/')
            .to_owned();
        url::Url::parse(&base_url).map_err(|e| {
            ConfigError::InvalidEnvVar("STOREFRONT_BASE_URL".to_string(), e.to_string())
        })?;

        let mail = MailConfig::from_env(&env)?;
        let sentry_dsn = env.optional("SENTRY_DSN");

        Ok(Self {
            database_url,
            host,
            port,
            base_url,
            mail,
            sentry_dsn,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

impl MailConfig {
    fn from_env(env: &Env<'_>) -> Result<Option<Self>, ConfigError> {
        let username = env
            .optional("SMTP_USERNAME")
            .or_else(|| env.optional("GMAIL_USER"));
        let password = env
            .optional("SMTP_PASSWORD")
            .or_else(|| env.optional("GMAIL_APP_PASSWORD"));

        let (Some(smtp_username), Some(password)) = (username, password) else {
            return Ok(None);
        };

        Ok(Some(Self {
            smtp_host: env.or_default("SMTP_HOST", DEFAULT_SMTP_HOST),
            smtp_port: parse_port(env, "SMTP_PORT", DEFAULT_SMTP_PORT)?,
            from_address: env
                .optional("MAIL_FROM")
                .unwrap_or_else(|| smtp_username.clone()),
            admin_address: env
                .optional("ADMIN_EMAIL")
                .unwrap_or_else(|| smtp_username.clone()),
            smtp_username,
            smtp_password: SecretString::from(password),
        }))
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Variable source; empty values count as unset.
struct Env<'a>(&'a dyn Fn(&str) -> Option<String>);

impl Env<'_> {
    fn optional(&self, key: &str) -> Option<String> {
        (self.0)(key).filter(|value| !value.trim().is_empty())
    }

    fn or_default(&self, key: &str, default: &str) -> String {
        self.optional(key).unwrap_or_else(|| default.to_string())
    }

    /// Database URL with fallback to generic `DATABASE_URL`.
    fn database_url(&self, primary_key: &str) -> Result<SecretString, ConfigError> {
        self.optional(primary_key)
            .or_else(|| self.optional("DATABASE_URL"))
            .map(SecretString::from)
            .ok_or_else(|| ConfigError::MissingEnvVar(primary_key.to_string()))
    }
}

fn parse_port(env: &Env<'_>, key: &str, default: &str) -> Result<u16, ConfigError> {
    env.or_default(key, default)
        .parse::<u16>()
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashMap;

    use secrecy::ExposeSecret;

    use super::*;

    fn load(vars: &[(&str, &str)]) -> Result<StorefrontConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        StorefrontConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_database_url_is_required() {
        let err = load(&[]).unwrap_err();
        assert!(matches!(err, ConfigError::MissingEnvVar(key) if key == "STOREFRONT_DATABASE_URL"));
    }

    #[test]
    fn test_database_url_fallback() {
        let config = load(&[("DATABASE_URL", "postgres://fallback")]).unwrap();
        assert_eq!(config.database_url.expose_secret(), "postgres://fallback");
    }

    #[test]
    fn test_defaults() {
        let config = load(&[("STOREFRONT_DATABASE_URL", "postgres://db")]).unwrap();
        assert_eq!(config.socket_addr().to_string(), "127.0.0.1:3000");
        assert_eq!(config.base_url, "https://tastrading.in");
        assert!(config.mail.is_none());
        assert!(config.sentry_dsn.is_none());
    }

    #[test]
    fn test_invalid_port() {
        let err = load(&[
            ("STOREFRONT_DATABASE_URL", "postgres://db"),
            ("STOREFRONT_PORT", "http"),
        ])
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(key, _) if key == "STOREFRONT_PORT"));
    }

    #[test]
    fn test_base_url_trailing_slash_removed() {
        let config = load(&[
            ("STOREFRONT_DATABASE_URL", "postgres://db"),
            ("STOREFRONT_BASE_URL", "http://localhost:3000/"),
        ])
        .unwrap();
        assert_eq!(config.base_url, "http://localhost:3000");
    }

    #[test]
    fn test_mail_requires_both_credentials() {
        let config = load(&[
            ("STOREFRONT_DATABASE_URL", "postgres://db"),
            ("SMTP_USERNAME", "sales@tastrading.in"),
        ])
        .unwrap();
        assert!(config.mail.is_none());
    }

    #[test]
    fn test_mail_legacy_names_and_defaults() {
        let config = load(&[
            ("STOREFRONT_DATABASE_URL", "postgres://db"),
            ("GMAIL_USER", "sales@tastrading.in"),
            ("GMAIL_APP_PASSWORD", "abcd efgh ijkl mnop"),
        ])
        .unwrap();
        let mail = config.mail.unwrap();
        assert_eq!(mail.smtp_host, "smtp.gmail.com");
        assert_eq!(mail.smtp_port, 587);
        assert_eq!(mail.admin_address, "sales@tastrading.in");
        assert_eq!(mail.from_address, "sales@tastrading.in");
    }

    #[test]
    fn test_mail_admin_override() {
        let config = load(&[
            ("STOREFRONT_DATABASE_URL", "postgres://db"),
            ("SMTP_USERNAME", "relay@tastrading.in"),
            ("SMTP_PASSWORD", "pw"),
            ("ADMIN_EMAIL", "owner@tastrading.in"),
        ])
        .unwrap();
        assert_eq!(config.mail.unwrap().admin_address, "owner@tastrading.in");
    }

    #[test]
    fn test_mail_debug_redacts_password() {
        let config = load(&[
            ("STOREFRONT_DATABASE_URL", "postgres://db"),
            ("SMTP_USERNAME", "relay@tastrading.in"),
            ("SMTP_PASSWORD", "hunter2"),
        ])
        .unwrap();
        let debug = format!("{:?}", config.mail.unwrap());
        assert!(debug.contains("[REDACTED]"));
        assert!(!debug.contains("hunter2"));
    }
}
