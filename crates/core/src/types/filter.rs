//! Catalog filter selection and the `/products` links built from it.

use serde::{Deserialize, Serialize};
use url::form_urlencoded;

use super::id::{BrandId, CategoryId};

/// Path of the product listing page that filter links point at.
pub const PRODUCTS_PATH: &str = "/products";

/// Raw `/products` query string as sent by the browser.
///
/// Every field is optional; empty strings are treated as absent.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CatalogQuery {
    pub brand: Option<String>,
    pub category: Option<String>,
    pub search: Option<String>,
}

/// A normalized catalog filter.
///
/// Brand and category match exactly. Search text matches product name or
/// description case-insensitively.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CatalogFilter {
    pub brand: Option<BrandId>,
    pub category: Option<CategoryId>,
    pub search: Option<String>,
}

impl From<CatalogQuery> for CatalogFilter {
    fn from(query: CatalogQuery) -> Self {
        Self {
            brand: non_empty(query.brand).map(BrandId::new),
            category: non_empty(query.category).map(CategoryId::new),
            search: non_empty(query.search),
        }
    }
}

impl CatalogFilter {
    /// Filter on a single category, used by the category detail page.
    #[must_use]
    pub fn for_category(category: CategoryId) -> Self {
        Self {
            category: Some(category),
            ..Self::default()
        }
    }

    /// Filter on a single brand, used by the brand detail page.
    #[must_use]
    pub fn for_brand(brand: BrandId) -> Self {
        Self {
            brand: Some(brand),
            ..Self::default()
        }
    }

    /// Number of brand/category filters applied (search is not counted).
    #[must_use]
    pub fn active_count(&self) -> usize {
        usize::from(self.brand.is_some()) + usize::from(self.category.is_some())
    }

    /// `ILIKE` pattern for the search text, with `%`, `_` and `\` escaped.
    #[must_use]
    pub fn search_pattern(&self) -> Option<String> {
        self.search.as_deref().map(|text| {
            let mut pattern = String::with_capacity(text.len() + 2);
            pattern.push('%');
            for c in text.chars() {
                if matches!(c, '%' | '_' | '\\') {
                    pattern.push('\\');
                }
                pattern.push(c);
            }
            pattern.push('%');
            pattern
        })
    }

    /// In-memory equivalent of the catalog `WHERE` clause.
    #[must_use]
    pub fn matches(
        &self,
        archived: bool,
        brand: Option<&BrandId>,
        category: Option<&CategoryId>,
        name: &str,
        description: &str,
    ) -> bool {
        if archived {
            return false;
        }
        if let Some(wanted) = &self.brand
            && brand != Some(wanted)
        {
            return false;
        }
        if let Some(wanted) = &self.category
            && category != Some(wanted)
        {
            return false;
        }
        match &self.search {
            Some(text) => {
                let needle = text.to_lowercase();
                name.to_lowercase().contains(&needle)
                    || description.to_lowercase().contains(&needle)
            }
            None => true,
        }
    }

    /// Link to the listing with this brand selected, keeping the category.
    #[must_use]
    pub fn with_brand_href(&self, brand: &BrandId) -> String {
        build_href(Some(brand), self.category.as_ref())
    }

    /// Link to the listing with this category selected, keeping the brand.
    #[must_use]
    pub fn with_category_href(&self, category: &CategoryId) -> String {
        build_href(self.brand.as_ref(), Some(category))
    }

    /// Link that drops the brand filter ("All Brands" and the brand chip).
    #[must_use]
    pub fn without_brand_href(&self) -> String {
        build_href(None, self.category.as_ref())
    }

    /// Link that drops the category filter ("All Categories" and the category chip).
    #[must_use]
    pub fn without_category_href(&self) -> String {
        build_href(self.brand.as_ref(), None)
    }

    /// Link with every filter removed.
    #[must_use]
    pub fn cleared_href() -> String {
        PRODUCTS_PATH.to_owned()
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_owned())
        .filter(|v| !v.is_empty())
}

fn build_href(brand: Option<&BrandId>, category: Option<&CategoryId>) -> String {
    let mut query = form_urlencoded::Serializer::new(String::new());
    if let Some(brand) = brand {
        query.append_pair("brand", brand.as_str());
    }
    if let Some(category) = category {
        query.append_pair("category", category.as_str());
    }
    let query = query.finish();

    if query.is_empty() {
        PRODUCTS_PATH.to_owned()
    } else {
        format!("{PRODUCTS_PATH}?{query}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filter(brand: Option<&str>, category: Option<&str>, search: Option<&str>) -> CatalogFilter {
        CatalogFilter::from(CatalogQuery {
            brand: brand.map(String::from),
            category: category.map(String::from),
            search: search.map(String::from),
        })
    }

    #[test]
    fn test_empty_values_are_absent() {
        let f = filter(Some(""), Some("  "), Some(" "));
        assert_eq!(f, CatalogFilter::default());
    }

    #[test]
    fn test_search_is_trimmed() {
        let f = filter(None, None, Some("  drill bit "));
        assert_eq!(f.search.as_deref(), Some("drill bit"));
    }

    #[test]
    fn test_active_count_ignores_search() {
        assert_eq!(filter(Some("b"), Some("c"), Some("s")).active_count(), 2);
        assert_eq!(filter(None, Some("c"), Some("s")).active_count(), 1);
        assert_eq!(filter(None, None, Some("s")).active_count(), 0);
    }

    #[test]
    fn test_search_pattern_escapes_wildcards() {
        let f = filter(None, None, Some("50%_off\\"));
        assert_eq!(f.search_pattern().as_deref(), Some("%50\\%\\_off\\\\%"));
        assert_eq!(filter(None, None, None).search_pattern(), None);
    }

    #[test]
    fn test_matches_excludes_archived() {
        let f = CatalogFilter::default();
        assert!(!f.matches(true, None, None, "Tap", ""));
        assert!(f.matches(false, None, None, "Tap", ""));
    }

    #[test]
    fn test_matches_requires_every_filter() {
        let brand = BrandId::new("b1");
        let other_brand = BrandId::new("b2");
        let category = CategoryId::new("c1");
        let f = filter(Some("b1"), Some("c1"), Some("hss"));

        assert!(f.matches(false, Some(&brand), Some(&category), "HSS Tap", ""));
        assert!(f.matches(false, Some(&brand), Some(&category), "Tap", "Made of hss"));
        assert!(!f.matches(false, Some(&other_brand), Some(&category), "HSS Tap", ""));
        assert!(!f.matches(false, None, Some(&category), "HSS Tap", ""));
        assert!(!f.matches(false, Some(&brand), None, "HSS Tap", ""));
        assert!(!f.matches(false, Some(&brand), Some(&category), "Belt", "Rubber"));
    }

    #[test]
    fn test_filter_links_keep_the_other_dimension() {
        let f = filter(Some("taparia"), Some("taps"), Some("m8"));

        assert_eq!(
            f.with_brand_href(&BrandId::new("yamuna")),
            "/products?brand=yamuna&category=taps"
        );
        assert_eq!(
            f.with_category_href(&CategoryId::new("belts")),
            "/products?brand=taparia&category=belts"
        );
        assert_eq!(f.without_brand_href(), "/products?category=taps");
        assert_eq!(f.without_category_href(), "/products?brand=taparia");
        assert_eq!(CatalogFilter::cleared_href(), "/products");
    }

    #[test]
    fn test_filter_links_encode_ids() {
        let f = CatalogFilter::default();
        assert_eq!(
            f.with_brand_href(&BrandId::new("a&b")),
            "/products?brand=a%26b"
        );
    }
}
