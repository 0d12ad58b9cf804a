//! Inquiry emails: rendering and SMTP delivery.
//!
//! Each (scenario, audience) pair has an HTML and a plain-text Askama
//! template. HTML templates escape every interpolated value; nothing is
//! marked safe. Delivery goes through the [`Mailer`] trait so handlers can be
//! exercised without a relay.

use askama::Template;
use async_trait::async_trait;
use lettre::{
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
    message::{MultiPart, SinglePart, header::ContentType},
    transport::smtp::{Error as SmtpError, authentication::Credentials},
};
use secrecy::ExposeSecret;
use thiserror::Error;

use tas_core::offices::{OFFICES, Office, display_phone, head_office, whatsapp_link};

use super::inquiry::{ContactInquiry, QuoteInquiry};
use crate::config::MailConfig;

/// Sent to the customer after a contact form.
pub const CONTACT_REPLY_SUBJECT: &str = "We received your message - TAS Trading Corporation";

/// Sent to the customer after a quote request.
pub const QUOTE_CUSTOMER_SUBJECT: &str = "Thank you for your inquiry - TAS Trading Corporation";

/// Errors that can occur when rendering or sending email.
#[derive(Debug, Error)]
pub enum MailError {
    /// SMTP transport error.
    #[error("SMTP error: {0}")]
    Smtp(#[from] SmtpError),

    /// Failed to build email message.
    #[error("Failed to build message: {0}")]
    MessageBuild(#[from] lettre::error::Error),

    /// Invalid email address.
    #[error("Invalid email address: {0}")]
    InvalidAddress(String),

    /// Template rendering error.
    #[error("Template error: {0}")]
    Template(#[from] askama::Error),
}

/// A rendered message ready for delivery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingEmail {
    pub to: String,
    pub subject: String,
    pub html: String,
    pub text: String,
}

/// Outbound mail transport.
#[async_trait]
pub trait Mailer: Send + Sync {
    /// Deliver one message.
    async fn send(&self, email: OutgoingEmail) -> Result<(), MailError>;
}

/// [`Mailer`] backed by an SMTP relay with STARTTLS.
#[derive(Clone)]
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from_address: String,
}

impl SmtpMailer {
    /// Create a mailer from configuration.
    ///
    /// # Errors
    ///
    /// Returns error if the relay host is invalid.
    pub fn new(config: &MailConfig) -> Result<Self, SmtpError> {
        let credentials = Credentials::new(
            config.smtp_username.clone(),
            config.smtp_password.expose_secret().to_string(),
        );

        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.smtp_host)?
            .port(config.smtp_port)
            .credentials(credentials)
            .build();

        Ok(Self {
            transport,
            from_address: config.from_address.clone(),
        })
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send(&self, email: OutgoingEmail) -> Result<(), MailError> {
        let message = Message::builder()
            .from(
                self.from_address
                    .parse()
                    .map_err(|_| MailError::InvalidAddress(self.from_address.clone()))?,
            )
            .to(email
                .to
                .parse()
                .map_err(|_| MailError::InvalidAddress(email.to.clone()))?)
            .subject(email.subject.as_str())
            .multipart(
                MultiPart::alternative()
                    .singlepart(
                        SinglePart::builder()
                            .header(ContentType::TEXT_PLAIN)
                            .body(email.text),
                    )
                    .singlepart(
                        SinglePart::builder()
                            .header(ContentType::TEXT_HTML)
                            .body(email.html),
                    ),
            )?;

        self.transport.send(message).await?;

        tracing::info!(to = %email.to, subject = %email.subject, "Email sent successfully");
        Ok(())
    }
}

/// Site links and head-office contact shared by every template.
#[derive(Debug, Clone)]
pub struct SiteLinks {
    pub base_url: String,
    pub phone: String,
    pub phone_tel: String,
    pub whatsapp: String,
}

impl SiteLinks {
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        let phone = head_office()
            .and_then(Office::primary_contact)
            .map_or("", |contact| contact.phone);

        Self {
            base_url: base_url.into(),
            phone: display_phone(phone),
            phone_tel: format!("tel:{phone}"),
            whatsapp: whatsapp_link(phone, ""),
        }
    }

    fn products(&self) -> String {
        format!("{}/products", self.base_url)
    }

    fn product(&self, id: Option<&str>) -> String {
        id.map_or_else(
            || self.products(),
            |id| format!("{}/products/{}", self.base_url, urlencoding::encode(id)),
        )
    }
}

/// One office row in the auto-reply.
struct OfficeLine {
    name: &'static str,
    phone: String,
    tel: String,
}

fn office_lines() -> Vec<OfficeLine> {
    OFFICES
        .iter()
        .filter_map(|office| {
            office.primary_contact().map(|contact| OfficeLine {
                name: office.name,
                phone: display_phone(contact.phone),
                tel: format!("tel:{}", contact.phone),
            })
        })
        .collect()
}

fn mailto(address: &str, subject: &str) -> String {
    format!("mailto:{address}?subject={}", urlencoding::encode(subject))
}

/// WhatsApp link for a customer-entered number; ten-digit numbers get the
/// India country code.
fn customer_whatsapp(phone: &str) -> Option<String> {
    let digits: String = phone.chars().filter(char::is_ascii_digit).collect();
    match digits.len() {
        0 => None,
        10 => Some(whatsapp_link(&format!("91{digits}"), "")),
        _ => Some(whatsapp_link(&digits, "")),
    }
}

// =============================================================================
// Quote request
// =============================================================================

struct QuoteAdminView<'a> {
    site: &'a SiteLinks,
    inquiry: &'a QuoteInquiry,
    product_href: String,
    reply_href: String,
    whatsapp_href: Option<String>,
}

#[derive(Template)]
#[template(path = "email/quote_admin.html")]
struct QuoteAdminHtml<'a> {
    view: &'a QuoteAdminView<'a>,
}

#[derive(Template)]
#[template(path = "email/quote_admin.txt")]
struct QuoteAdminText<'a> {
    view: &'a QuoteAdminView<'a>,
}

/// Staff notification for a quote request.
///
/// # Errors
///
/// Returns `MailError::Template` if rendering fails.
pub fn quote_admin(
    inquiry: &QuoteInquiry,
    admin_address: &str,
    site: &SiteLinks,
) -> Result<OutgoingEmail, MailError> {
    let view = QuoteAdminView {
        site,
        inquiry,
        product_href: site.product(inquiry.product_id.as_deref()),
        reply_href: mailto(
            inquiry.email.as_str(),
            &format!("Re: Quote Request for {}", inquiry.product_name),
        ),
        whatsapp_href: inquiry.phone.as_deref().and_then(customer_whatsapp),
    };

    Ok(OutgoingEmail {
        to: admin_address.to_string(),
        subject: format!("📋 New Quote Request: {}", inquiry.product_name),
        html: QuoteAdminHtml { view: &view }.render()?,
        text: QuoteAdminText { view: &view }.render()?,
    })
}

struct QuoteCustomerView<'a> {
    site: &'a SiteLinks,
    inquiry: &'a QuoteInquiry,
    product_href: String,
    products_href: String,
}

#[derive(Template)]
#[template(path = "email/quote_customer.html")]
struct QuoteCustomerHtml<'a> {
    view: &'a QuoteCustomerView<'a>,
}

#[derive(Template)]
#[template(path = "email/quote_customer.txt")]
struct QuoteCustomerText<'a> {
    view: &'a QuoteCustomerView<'a>,
}

/// Acknowledgment sent to the customer who asked for a quote.
///
/// # Errors
///
/// Returns `MailError::Template` if rendering fails.
pub fn quote_customer(inquiry: &QuoteInquiry, site: &SiteLinks) -> Result<OutgoingEmail, MailError> {
    let view = QuoteCustomerView {
        site,
        inquiry,
        product_href: site.product(inquiry.product_id.as_deref()),
        products_href: site.products(),
    };

    Ok(OutgoingEmail {
        to: inquiry.email.to_string(),
        subject: QUOTE_CUSTOMER_SUBJECT.to_string(),
        html: QuoteCustomerHtml { view: &view }.render()?,
        text: QuoteCustomerText { view: &view }.render()?,
    })
}

// =============================================================================
// Contact form
// =============================================================================

struct ContactAdminView<'a> {
    site: &'a SiteLinks,
    inquiry: &'a ContactInquiry,
    subject: &'a str,
    reply_href: String,
}

#[derive(Template)]
#[template(path = "email/contact_admin.html")]
struct ContactAdminHtml<'a> {
    view: &'a ContactAdminView<'a>,
}

#[derive(Template)]
#[template(path = "email/contact_admin.txt")]
struct ContactAdminText<'a> {
    view: &'a ContactAdminView<'a>,
}

/// Staff notification for a contact form.
///
/// # Errors
///
/// Returns `MailError::Template` if rendering fails.
pub fn contact_admin(
    inquiry: &ContactInquiry,
    admin_address: &str,
    site: &SiteLinks,
) -> Result<OutgoingEmail, MailError> {
    let subject = inquiry.subject_or_default();
    let view = ContactAdminView {
        site,
        inquiry,
        subject,
        reply_href: mailto(inquiry.email.as_str(), &format!("Re: {subject}")),
    };

    Ok(OutgoingEmail {
        to: admin_address.to_string(),
        subject: format!("📩 New Contact: {subject}"),
        html: ContactAdminHtml { view: &view }.render()?,
        text: ContactAdminText { view: &view }.render()?,
    })
}

struct ContactReplyView<'a> {
    site: &'a SiteLinks,
    name: &'a str,
    products_href: String,
    offices: Vec<OfficeLine>,
}

#[derive(Template)]
#[template(path = "email/contact_reply.html")]
struct ContactReplyHtml<'a> {
    view: &'a ContactReplyView<'a>,
}

#[derive(Template)]
#[template(path = "email/contact_reply.txt")]
struct ContactReplyText<'a> {
    view: &'a ContactReplyView<'a>,
}

/// Auto-reply sent to whoever used the contact form.
///
/// # Errors
///
/// Returns `MailError::Template` if rendering fails.
pub fn contact_reply(inquiry: &ContactInquiry, site: &SiteLinks) -> Result<OutgoingEmail, MailError> {
    let view = ContactReplyView {
        site,
        name: &inquiry.name,
        products_href: site.products(),
        offices: office_lines(),
    };

    Ok(OutgoingEmail {
        to: inquiry.email.to_string(),
        subject: CONTACT_REPLY_SUBJECT.to_string(),
        html: ContactReplyHtml { view: &view }.render()?,
        text: ContactReplyText { view: &view }.render()?,
    })
}
