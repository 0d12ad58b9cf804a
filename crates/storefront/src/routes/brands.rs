//! Brand route handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::extract::{Path, State};
use tracing::instrument;

use tas_core::{BrandId, CatalogFilter};

use super::Chrome;
use super::products::{FilterLink, ProductCard};
use crate::db::CatalogRepository;
use crate::error::{AppError, Result};
use crate::filters;
use crate::models::Brand;
use crate::state::AppState;

fn brand_link(brand: &Brand) -> FilterLink {
    FilterLink {
        label: brand.name.clone(),
        href: format!("/brands/{}", urlencoding::encode(brand.id.as_str())),
        active: false,
    }
}

/// Brand listing page template.
#[derive(Template, WebTemplate)]
#[template(path = "brands/index.html")]
pub struct BrandsIndexTemplate {
    pub chrome: Chrome,
    pub brands: Vec<FilterLink>,
}

/// Brand page template.
#[derive(Template, WebTemplate)]
#[template(path = "brands/show.html")]
pub struct BrandShowTemplate {
    pub chrome: Chrome,
    pub brand: Brand,
    pub products: Vec<ProductCard>,
    /// Listing page with this brand preselected.
    pub filter_href: String,
}

/// Display all brands.
#[instrument(skip(state))]
pub async fn index(State(state): State<AppState>) -> Result<BrandsIndexTemplate> {
    let brands = CatalogRepository::new(state.pool()).list_brands().await?;

    Ok(BrandsIndexTemplate {
        chrome: Chrome::new(None),
        brands: brands.iter().map(brand_link).collect(),
    })
}

/// Display a brand's products.
#[instrument(skip(state))]
pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<BrandShowTemplate> {
    let id = BrandId::new(id);
    let repo = CatalogRepository::new(state.pool());

    let brand = repo
        .get_brand(&id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("brand {id}")))?;

    let filter = CatalogFilter::for_brand(id);
    let products = repo.list_products(&filter).await?;

    Ok(BrandShowTemplate {
        chrome: Chrome::new(None),
        filter_href: filter.without_category_href(),
        brand,
        products: products.into_iter().map(ProductCard::from).collect(),
    })
}
