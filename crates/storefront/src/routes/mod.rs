//! HTTP route handlers for the storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                       - Redirect to /products
//! GET  /health                 - Liveness check
//! GET  /health/ready           - Readiness check (database)
//!
//! # Catalog
//! GET  /products               - Product listing (?brand, ?category, ?search)
//! GET  /products/{id}          - Product detail with quote form
//! GET  /categories             - Category listing
//! GET  /categories/{id}        - Category products grouped by brand
//! GET  /brands                 - Brand listing
//! GET  /brands/{id}            - Brand products
//!
//! # API
//! POST /api/contact            - Contact form (JSON)
//! POST /api/quote-request      - Quote request (JSON)
//! GET  /api/offices            - Branch directory (JSON)
//! POST /api/offices/locator    - Nearest-branch locator step (JSON)
//! ```

pub mod api;
pub mod brands;
pub mod categories;
pub mod health;
pub mod products;

use axum::{
    Router,
    response::Redirect,
    routing::{get, post},
};

use serde::Serialize;

use tas_core::locator::{BranchView, CACHE_KEY, DISMISS_KEY, Locator};
use tas_core::offices::{OFFICES, display_phone, whatsapp_link};

use crate::state::AppState;

/// Greeting pre-filled in branch WhatsApp links.
const WHATSAPP_GREETING: &str = "Hi, I'd like to know more about your products.";

/// Branch bar contents.
///
/// Pages render the head office; `locator.js` replaces the fields with the
/// answers of `POST /api/offices/locator` once the visitor's location is known.
#[derive(Debug, Clone, Serialize)]
pub struct BranchBar {
    pub office_name: &'static str,
    pub distance_label: String,
    pub contact_name: &'static str,
    pub phone: String,
    pub tel_href: String,
    pub whatsapp_href: String,
}

impl BranchBar {
    /// Bar for a locator view. `None` when the office has no contact.
    #[must_use]
    pub fn from_view(view: BranchView) -> Option<Self> {
        let contact = view.contact?;
        Some(Self {
            office_name: view.office.name,
            distance_label: view.distance_label,
            contact_name: contact.name,
            phone: display_phone(contact.phone),
            tel_href: format!("tel:{}", contact.phone),
            whatsapp_href: whatsapp_link(contact.phone, WHATSAPP_GREETING),
        })
    }

    /// Initial bar, before any location is known.
    #[must_use]
    pub fn initial() -> Option<Self> {
        Self::from_view(Locator::new(OFFICES)?.view())
    }
}

/// Browser storage keys handed to `locator.js`.
#[derive(Debug, Clone, Copy)]
pub struct LocatorKeys {
    pub cache: &'static str,
    pub dismissed: &'static str,
}

/// Data the base layout needs on every page.
#[derive(Debug, Clone)]
pub struct Chrome {
    /// Current search text, echoed into the header search box.
    pub search: String,
    pub branch: Option<BranchBar>,
    pub locator: LocatorKeys,
}

impl Chrome {
    #[must_use]
    pub fn new(search: Option<&str>) -> Self {
        Self {
            search: search.unwrap_or_default().to_owned(),
            branch: BranchBar::initial(),
            locator: LocatorKeys {
                cache: CACHE_KEY,
                dismissed: DISMISS_KEY,
            },
        }
    }
}

/// Create the product routes router.
pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(products::index))
        .route("/{id}", get(products::show))
}

/// Create the category routes router.
pub fn category_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(categories::index))
        .route("/{id}", get(categories::show))
}

/// Create the brand routes router.
pub fn brand_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(brands::index))
        .route("/{id}", get(brands::show))
}

/// Create the JSON API router.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/contact", post(api::contact::submit))
        .route("/quote-request", post(api::quote::submit))
        .route("/offices", get(api::offices::list))
        .route("/offices/locator", post(api::offices::locate))
}

/// Create all routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(|| async { Redirect::to("/products") }))
        .route("/health", get(health::health))
        .route("/health/ready", get(health::readiness))
        .nest("/products", product_routes())
        .nest("/categories", category_routes())
        .nest("/brands", brand_routes())
        .nest("/api", api_routes())
}
