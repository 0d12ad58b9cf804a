//! TAS Core - Shared types library.
//!
//! This crate provides the types and pure logic used by the storefront:
//! - `storefront` - Public catalog site and lead-form API
//! - `cli` - Command-line tools for migrations and demo data
//!
//! # Architecture
//!
//! The core crate contains only types and pure logic - no I/O, no database
//! access, no HTTP clients. Decisions behind client-side behaviour
//! (nearest-branch lookup, search-to-URL sync) live here so they can be
//! tested without a browser; the storefront's scripts only report events and
//! apply the results.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for IDs, prices, emails, and catalog filters
//! - [`geo`] - Coordinates and great-circle distance
//! - [`offices`] - The static branch directory
//! - [`locator`] - Nearest-branch geolocation state machine
//! - [`search_sync`] - Search box to URL reconciliation

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod geo;
pub mod locator;
pub mod offices;
pub mod search_sync;
pub mod types;

pub use types::*;
