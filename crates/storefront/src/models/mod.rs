//! Domain models for the storefront.

pub mod catalog;
pub mod message;

pub use catalog::{Brand, BrandGroup, Category, ProductDetail, ProductSummary, group_by_brand};
pub use message::{ContactMessage, NewContactMessage};
