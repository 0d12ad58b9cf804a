//! Core types for the TAS storefront.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod email;
pub mod filter;
pub mod id;
pub mod price;

pub use email::{Email, EmailError};
pub use filter::{CatalogFilter, CatalogQuery, PRODUCTS_PATH};
pub use id::*;
pub use price::{Price, PriceError};
