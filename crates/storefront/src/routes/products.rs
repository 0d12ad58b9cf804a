//! Product route handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, HeaderValue};
use tracing::instrument;
use url::Url;

use tas_core::search_sync::{SEARCH_PARAM, UrlUpdate, reconcile};
use tas_core::{BrandId, CatalogFilter, CatalogQuery, CategoryId, ProductId};

use super::Chrome;
use crate::db::CatalogRepository;
use crate::error::{AppError, Result};
use crate::filters;
use crate::models::{Brand, Category, ProductSummary};
use crate::state::AppState;

/// Product display data for templates.
#[derive(Debug, Clone)]
pub struct ProductCard {
    pub id: String,
    pub href: String,
    pub name: String,
    pub description: String,
    /// `None` renders as "Price on request".
    pub price: Option<String>,
    pub image_url: Option<String>,
    pub brand_name: Option<String>,
    pub category_name: Option<String>,
}

impl From<ProductSummary> for ProductCard {
    fn from(product: ProductSummary) -> Self {
        Self {
            href: format!("/products/{}", urlencoding::encode(product.id.as_str())),
            id: product.id.into_inner(),
            name: product.name,
            description: product.description,
            price: product.price.filter(|p| !p.is_zero()).map(|p| p.to_string()),
            image_url: product.image_url,
            brand_name: product.brand.map(|b| b.name),
            category_name: product.category.map(|c| c.name),
        }
    }
}

/// A link in the filter sidebar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterLink {
    pub label: String,
    pub href: String,
    pub active: bool,
}

/// An applied filter with the link that removes it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterChip {
    pub label: String,
    pub remove_href: String,
}

/// Brand and category filter panel for the listing page.
#[derive(Debug, Clone)]
pub struct FilterSidebar {
    pub all_brands: FilterLink,
    pub brands: Vec<FilterLink>,
    pub all_categories: FilterLink,
    pub categories: Vec<FilterLink>,
    pub chips: Vec<FilterChip>,
    pub active_count: usize,
    pub clear_href: String,
}

impl FilterSidebar {
    /// Build the panel for `filter`. Links keep the other dimension's
    /// selection; search text is not carried over.
    #[must_use]
    pub fn new(filter: &CatalogFilter, brands: &[Brand], categories: &[Category]) -> Self {
        let mut chips = Vec::new();
        if let Some(selected) = &filter.brand {
            chips.push(FilterChip {
                label: brand_label(selected, brands),
                remove_href: filter.without_brand_href(),
            });
        }
        if let Some(selected) = &filter.category {
            chips.push(FilterChip {
                label: category_label(selected, categories),
                remove_href: filter.without_category_href(),
            });
        }

        Self {
            all_brands: FilterLink {
                label: "All Brands".to_string(),
                href: filter.without_brand_href(),
                active: filter.brand.is_none(),
            },
            brands: brands
                .iter()
                .map(|brand| FilterLink {
                    label: brand.name.clone(),
                    href: filter.with_brand_href(&brand.id),
                    active: filter.brand.as_ref() == Some(&brand.id),
                })
                .collect(),
            all_categories: FilterLink {
                label: "All Categories".to_string(),
                href: filter.without_category_href(),
                active: filter.category.is_none(),
            },
            categories: categories
                .iter()
                .map(|category| FilterLink {
                    label: category.name.clone(),
                    href: filter.with_category_href(&category.id),
                    active: filter.category.as_ref() == Some(&category.id),
                })
                .collect(),
            chips,
            active_count: filter.active_count(),
            clear_href: CatalogFilter::cleared_href(),
        }
    }
}

fn brand_label(id: &BrandId, brands: &[Brand]) -> String {
    brands
        .iter()
        .find(|b| &b.id == id)
        .map_or_else(|| id.to_string(), |b| b.name.clone())
}

fn category_label(id: &CategoryId, categories: &[Category]) -> String {
    categories
        .iter()
        .find(|c| &c.id == id)
        .map_or_else(|| id.to_string(), |c| c.name.clone())
}

/// Product listing page template.
#[derive(Template, WebTemplate)]
#[template(path = "products/index.html")]
pub struct ProductsIndexTemplate {
    pub chrome: Chrome,
    pub products: Vec<ProductCard>,
    pub sidebar: FilterSidebar,
    /// Applied filter, carried into the search box as hidden fields.
    pub filter: CatalogFilter,
}

/// Product detail page template.
#[derive(Template, WebTemplate)]
#[template(path = "products/show.html")]
pub struct ProductShowTemplate {
    pub chrome: Chrome,
    pub product: ProductCard,
    pub images: Vec<String>,
}

const HX_CURRENT_URL: &str = "hx-current-url";
const HX_TRIGGER_NAME: &str = "hx-trigger-name";
const HX_PUSH_URL: &str = "hx-push-url";
const HX_TRIGGER: &str = "hx-trigger";

/// Event raised in the browser after the address bar took a new search value.
const SEARCH_SYNCED_EVENT: &str = "search-synced";

/// Response headers reconciling the address bar with the search box.
///
/// Only htmx requests fired by the search input are considered. The trimmed
/// input is compared with the `search` parameter of the page the visitor is
/// on: an unchanged value leaves the history alone, a changed one pushes the
/// listing URL with every other parameter kept.
fn search_sync_headers(request: &HeaderMap, input: Option<&str>) -> HeaderMap {
    let mut headers = HeaderMap::new();
    if request.get(HX_TRIGGER_NAME).and_then(|v| v.to_str().ok()) != Some(SEARCH_PARAM) {
        return headers;
    }
    let Some(current) = request
        .get(HX_CURRENT_URL)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| Url::parse(v).ok())
    else {
        return headers;
    };

    let query = current.query().unwrap_or_default();
    match reconcile(input, query) {
        Some(update) => {
            if let Ok(href) = HeaderValue::from_str(&update.href("/products", query)) {
                headers.insert(HX_PUSH_URL, href);
            }
            if matches!(update, UrlUpdate::Set(_)) {
                headers.insert(HX_TRIGGER, HeaderValue::from_static(SEARCH_SYNCED_EVENT));
            }
        }
        None => {
            headers.insert(HX_PUSH_URL, HeaderValue::from_static("false"));
        }
    }
    headers
}

/// Display product listing page.
#[instrument(skip(state, headers))]
pub async fn index(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<CatalogQuery>,
) -> Result<(HeaderMap, ProductsIndexTemplate)> {
    let sync = search_sync_headers(&headers, query.search.as_deref());
    let filter = CatalogFilter::from(query);
    let repo = CatalogRepository::new(state.pool());

    let (products, brands, categories) = tokio::try_join!(
        repo.list_products(&filter),
        repo.list_brands(),
        repo.list_categories(),
    )?;
    tracing::debug!(count = products.len(), "Catalog query");

    Ok((
        sync,
        ProductsIndexTemplate {
            chrome: Chrome::new(filter.search.as_deref()),
            sidebar: FilterSidebar::new(&filter, &brands, &categories),
            products: products.into_iter().map(ProductCard::from).collect(),
            filter,
        },
    ))
}

/// Display product detail page.
#[instrument(skip(state))]
pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<ProductShowTemplate> {
    let id = ProductId::new(id);
    let detail = CatalogRepository::new(state.pool())
        .get_product(&id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("product {id}")))?;

    Ok(ProductShowTemplate {
        chrome: Chrome::new(None),
        product: detail.product.into(),
        images: detail.images,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rust_decimal::Decimal;
    use tas_core::Price;

    use super::*;

    fn brands() -> Vec<Brand> {
        vec![
            Brand {
                id: BrandId::new("bosch"),
                name: "Bosch".into(),
            },
            Brand {
                id: BrandId::new("makita"),
                name: "Makita".into(),
            },
        ]
    }

    fn categories() -> Vec<Category> {
        vec![Category {
            id: CategoryId::new("drills"),
            name: "Drills".into(),
        }]
    }

    fn filter(brand: Option<&str>, category: Option<&str>, search: Option<&str>) -> CatalogFilter {
        CatalogFilter::from(CatalogQuery {
            brand: brand.map(String::from),
            category: category.map(String::from),
            search: search.map(String::from),
        })
    }

    #[test]
    fn test_sidebar_without_filters() {
        let sidebar = FilterSidebar::new(&CatalogFilter::default(), &brands(), &categories());

        assert!(sidebar.all_brands.active);
        assert!(sidebar.all_categories.active);
        assert!(sidebar.chips.is_empty());
        assert_eq!(sidebar.active_count, 0);
        assert_eq!(sidebar.brands[0].href, "/products?brand=bosch");
        assert_eq!(sidebar.categories[0].href, "/products?category=drills");
    }

    #[test]
    fn test_sidebar_links_keep_other_dimension() {
        let sidebar = FilterSidebar::new(
            &filter(Some("bosch"), Some("drills"), Some("impact")),
            &brands(),
            &categories(),
        );

        assert_eq!(sidebar.active_count, 2);
        assert!(sidebar.brands[0].active);
        assert!(!sidebar.brands[1].active);
        assert_eq!(sidebar.brands[1].href, "/products?brand=makita&category=drills");
        assert_eq!(sidebar.all_brands.href, "/products?category=drills");
        assert_eq!(sidebar.all_categories.href, "/products?brand=bosch");
        assert_eq!(sidebar.clear_href, "/products");
    }

    #[test]
    fn test_sidebar_chips_use_names() {
        let sidebar = FilterSidebar::new(
            &filter(Some("bosch"), Some("unknown"), None),
            &brands(),
            &categories(),
        );

        assert_eq!(
            sidebar.chips,
            vec![
                FilterChip {
                    label: "Bosch".into(),
                    remove_href: "/products?category=unknown".into(),
                },
                FilterChip {
                    label: "unknown".into(),
                    remove_href: "/products?brand=bosch".into(),
                },
            ]
        );
    }

    #[test]
    fn test_product_card() {
        let card = ProductCard::from(ProductSummary {
            id: ProductId::new("gsb 500"),
            name: "Impact Drill".into(),
            description: String::new(),
            price: Some(Price::new(Decimal::new(12_345_600, 2)).unwrap()),
            priority: 1,
            brand: brands().into_iter().next(),
            category: None,
            image_url: None,
        });

        assert_eq!(card.href, "/products/gsb%20500");
        assert_eq!(card.price.as_deref(), Some("₹1,23,456"));
        assert_eq!(card.brand_name.as_deref(), Some("Bosch"));
    }

    #[test]
    fn test_zero_price_is_on_request() {
        let card = ProductCard::from(ProductSummary {
            id: ProductId::new("clamp"),
            name: "G Clamp".into(),
            description: String::new(),
            price: Some(Price::new(Decimal::ZERO).unwrap()),
            priority: 0,
            brand: None,
            category: None,
            image_url: None,
        });
        assert!(card.price.is_none());
    }

    fn htmx_search(current: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(HX_TRIGGER_NAME, HeaderValue::from_static("search"));
        headers.insert(HX_CURRENT_URL, HeaderValue::from_str(current).unwrap());
        headers
    }

    #[test]
    fn test_search_push_is_trimmed_and_keeps_filters() {
        let headers = search_sync_headers(
            &htmx_search("http://localhost:3000/products?brand=bosch"),
            Some("  drill "),
        );
        assert_eq!(headers[HX_PUSH_URL], "/products?brand=bosch&search=drill");
        assert_eq!(headers[HX_TRIGGER], SEARCH_SYNCED_EVENT);
    }

    #[test]
    fn test_emptied_search_removes_parameter() {
        let headers = search_sync_headers(
            &htmx_search("http://localhost:3000/products?search=drill&category=drills"),
            Some("   "),
        );
        assert_eq!(headers[HX_PUSH_URL], "/products?category=drills");
        assert!(headers.get(HX_TRIGGER).is_none());
    }

    #[test]
    fn test_unchanged_search_keeps_history() {
        let headers = search_sync_headers(
            &htmx_search("http://localhost:3000/products?search=drill"),
            Some("drill "),
        );
        assert_eq!(headers[HX_PUSH_URL], "false");
    }

    #[test]
    fn test_search_sync_ignores_other_requests() {
        assert!(search_sync_headers(&HeaderMap::new(), Some("drill")).is_empty());

        let mut headers = htmx_search("http://localhost:3000/products");
        headers.insert(HX_TRIGGER_NAME, HeaderValue::from_static("brand"));
        assert!(search_sync_headers(&headers, Some("drill")).is_empty());
    }

    #[test]
    fn test_index_renders_products_and_chips() {
        let filter = filter(Some("bosch"), None, Some("drill"));
        let template = ProductsIndexTemplate {
            chrome: Chrome::new(filter.search.as_deref()),
            products: vec![ProductCard {
                id: "gsb-500".into(),
                href: "/products/gsb-500".into(),
                name: "Impact Drill".into(),
                description: String::new(),
                price: Some("₹4,999".into()),
                image_url: None,
                brand_name: Some("Bosch".into()),
                category_name: None,
            }],
            sidebar: FilterSidebar::new(&filter, &brands(), &categories()),
            filter,
        };

        let html = template.render().unwrap();
        assert!(html.contains("Impact Drill"));
        assert!(html.contains("₹4,999"));
        assert!(html.contains("Clear all"));
        assert!(html.contains("Filters (1)"));
        assert!(html.contains(r#"name="brand" value="bosch""#));
        assert!(html.contains("delay:400ms"));
        assert!(!html.contains("hx-push-url"));
        assert!(html.contains("(<span data-branch=\"distance_label\">Head Office</span>)"));
        assert!(html.contains("data-location-banner hidden"));
        assert!(html.contains(r#"data-cache-key="tas_user_location""#));
        assert!(html.contains(r#"data-dismiss-key="locationBannerDismissed""#));
        assert!(html.contains("/static/js/locator.js"));
        assert!(html.contains("/static/js/search.js"));
    }

    #[test]
    fn test_search_script_handles_sync_event() {
        let script = include_str!("../../static/js/search.js");
        assert!(script.contains(&format!(r#""{SEARCH_SYNCED_EVENT}""#)));
        assert!(script.contains(r#"htmx.trigger(input, "search")"#));
        assert!(script.contains("300"));
    }

    #[test]
    fn test_index_escapes_search_text() {
        let filter = filter(None, None, Some("<script>"));
        let template = ProductsIndexTemplate {
            chrome: Chrome::new(filter.search.as_deref()),
            products: Vec::new(),
            sidebar: FilterSidebar::new(&filter, &[], &[]),
            filter,
        };

        let html = template.render().unwrap();
        assert!(!html.contains("<script>"));
        assert!(html.contains("No products found."));
    }
}
