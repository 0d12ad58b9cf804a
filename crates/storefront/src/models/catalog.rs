//! Catalog read models.

use std::collections::HashMap;

use serde::Serialize;

use tas_core::{BrandId, CategoryId, Price, ProductId};

/// Title of the group holding products without a brand.
pub const OTHER_PRODUCTS: &str = "Other Products";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct Brand {
    pub id: BrandId,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
}

/// A product as listed on catalog pages.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductSummary {
    pub id: ProductId,
    pub name: String,
    pub description: String,
    pub price: Option<Price>,
    pub priority: i32,
    pub brand: Option<Brand>,
    pub category: Option<Category>,
    /// First image by position.
    pub image_url: Option<String>,
}

/// A product with every image, for the detail page.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductDetail {
    pub product: ProductSummary,
    pub images: Vec<String>,
}

/// Products of one brand on the category page.
#[derive(Debug, Clone, PartialEq)]
pub struct BrandGroup {
    /// `None` collects products without a brand.
    pub brand: Option<Brand>,
    pub products: Vec<ProductSummary>,
}

impl BrandGroup {
    #[must_use]
    pub fn title(&self) -> &str {
        self.brand.as_ref().map_or(OTHER_PRODUCTS, |b| b.name.as_str())
    }
}

/// Group products by brand.
///
/// Groups are ordered by title, ignoring case; products keep their input
/// order inside each group.
#[must_use]
pub fn group_by_brand(products: Vec<ProductSummary>) -> Vec<BrandGroup> {
    let mut groups: Vec<BrandGroup> = Vec::new();
    let mut index: HashMap<Option<BrandId>, usize> = HashMap::new();

    for product in products {
        let key = product.brand.as_ref().map(|b| b.id.clone());
        let slot = *index.entry(key).or_insert_with(|| {
            groups.push(BrandGroup {
                brand: product.brand.clone(),
                products: Vec::new(),
            });
            groups.len() - 1
        });
        if let Some(group) = groups.get_mut(slot) {
            group.products.push(product);
        }
    }

    groups.sort_by(|a, b| {
        a.title()
            .to_lowercase()
            .cmp(&b.title().to_lowercase())
            .then_with(|| a.title().cmp(b.title()))
    });
    groups
}
