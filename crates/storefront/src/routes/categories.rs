//! Category route handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::extract::{Path, State};
use tracing::instrument;

use tas_core::{CatalogFilter, CategoryId};

use super::Chrome;
use super::products::{FilterLink, ProductCard};
use crate::db::CatalogRepository;
use crate::error::{AppError, Result};
use crate::filters;
use crate::models::{BrandGroup, Category, group_by_brand};
use crate::state::AppState;

/// One brand section on a category page.
#[derive(Debug, Clone)]
pub struct BrandSection {
    pub title: String,
    /// Listing filtered to this category and brand; `None` for unbranded products.
    pub more_href: Option<String>,
    pub products: Vec<ProductCard>,
}

impl BrandSection {
    fn new(category: &CategoryId, group: BrandGroup) -> Self {
        let title = group.title().to_owned();
        let more_href = group
            .brand
            .as_ref()
            .map(|brand| CatalogFilter::for_category(category.clone()).with_brand_href(&brand.id));
        Self {
            title,
            more_href,
            products: group.products.into_iter().map(ProductCard::from).collect(),
        }
    }
}

fn category_link(category: &Category) -> FilterLink {
    FilterLink {
        label: category.name.clone(),
        href: format!("/categories/{}", urlencoding::encode(category.id.as_str())),
        active: false,
    }
}

/// Category listing page template.
#[derive(Template, WebTemplate)]
#[template(path = "categories/index.html")]
pub struct CategoriesIndexTemplate {
    pub chrome: Chrome,
    pub categories: Vec<FilterLink>,
}

/// Category page template.
#[derive(Template, WebTemplate)]
#[template(path = "categories/show.html")]
pub struct CategoryShowTemplate {
    pub chrome: Chrome,
    pub category: Category,
    pub sections: Vec<BrandSection>,
    pub product_count: usize,
}

/// Display all categories.
#[instrument(skip(state))]
pub async fn index(State(state): State<AppState>) -> Result<CategoriesIndexTemplate> {
    let categories = CatalogRepository::new(state.pool()).list_categories().await?;

    Ok(CategoriesIndexTemplate {
        chrome: Chrome::new(None),
        categories: categories.iter().map(category_link).collect(),
    })
}

/// Display a category's products grouped by brand.
#[instrument(skip(state))]
pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<CategoryShowTemplate> {
    let id = CategoryId::new(id);
    let repo = CatalogRepository::new(state.pool());

    let category = repo
        .get_category(&id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("category {id}")))?;
    let products = repo
        .list_products(&CatalogFilter::for_category(id.clone()))
        .await?;

    let product_count = products.len();
    let sections = group_by_brand(products)
        .into_iter()
        .map(|group| BrandSection::new(&id, group))
        .collect();

    Ok(CategoryShowTemplate {
        chrome: Chrome::new(None),
        category,
        sections,
        product_count,
    })
}
