//! Business logic services for the storefront.
//!
//! - `inquiry` - Contact and quote-request submissions
//! - `email` - Inquiry email templates and SMTP delivery

pub mod email;
pub mod inquiry;

pub use email::{MailError, Mailer, OutgoingEmail, SiteLinks, SmtpMailer};
pub use inquiry::{
    ContactRequest, DispatchOutcome, DispatchReport, InquiryService, Notifier, QuoteRequest,
    SubmitError, Submission, ValidationError,
};
