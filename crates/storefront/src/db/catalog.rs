//! Catalog repository: products, brands and categories.
//!
//! Read-only. Archived products are never returned.

use rust_decimal::Decimal;
use sqlx::PgPool;

use tas_core::{BrandId, CatalogFilter, CategoryId, Price, ProductId};

use super::RepositoryError;
use crate::models::{Brand, Category, ProductDetail, ProductSummary};

const PRODUCT_COLUMNS: &str = r"
    SELECT p.id, p.name, p.description, p.price, p.priority,
           p.brand_id, b.name AS brand_name,
           p.category_id, c.name AS category_name,
           (SELECT i.url FROM product_image i
             WHERE i.product_id = p.id
             ORDER BY i.position, i.id
             LIMIT 1) AS image_url
    FROM product p
    LEFT JOIN brand b ON b.id = p.brand_id
    LEFT JOIN category c ON c.id = p.category_id
";

#[derive(sqlx::FromRow)]
struct ProductRow {
    id: ProductId,
    name: String,
    description: String,
    price: Option<Decimal>,
    priority: i32,
    brand_id: Option<BrandId>,
    brand_name: Option<String>,
    category_id: Option<CategoryId>,
    category_name: Option<String>,
    image_url: Option<String>,
}

impl TryFrom<ProductRow> for ProductSummary {
    type Error = RepositoryError;

    fn try_from(row: ProductRow) -> Result<Self, Self::Error> {
        let price = row
            .price
            .map(Price::new)
            .transpose()
            .map_err(|e| {
                RepositoryError::DataCorruption(format!("invalid price for {}: {e}", row.id))
            })?;

        Ok(Self {
            price,
            brand: row
                .brand_id
                .zip(row.brand_name)
                .map(|(id, name)| Brand { id, name }),
            category: row
                .category_id
                .zip(row.category_name)
                .map(|(id, name)| Category { id, name }),
            id: row.id,
            name: row.name,
            description: row.description,
            priority: row.priority,
            image_url: row.image_url,
        })
    }
}

/// Repository for catalog reads.
pub struct CatalogRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> CatalogRepository<'a> {
    /// Create a new catalog repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Non-archived products matching every filter in `filter`.
    ///
    /// Ordered by descending priority, then id.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if a stored price is negative.
    pub async fn list_products(
        &self,
        filter: &CatalogFilter,
    ) -> Result<Vec<ProductSummary>, RepositoryError> {
        let sql = format!(
            r"{PRODUCT_COLUMNS}
            WHERE NOT p.archived
              AND ($1::text IS NULL OR p.brand_id = $1)
              AND ($2::text IS NULL OR p.category_id = $2)
              AND ($3::text IS NULL
                   OR p.name ILIKE $3 ESCAPE '\'
                   OR p.description ILIKE $3 ESCAPE '\')
            ORDER BY p.priority DESC, p.id ASC"
        );

        let rows: Vec<ProductRow> = sqlx::query_as(&sql)
            .bind(filter.brand.as_ref().map(BrandId::as_str))
            .bind(filter.category.as_ref().map(CategoryId::as_str))
            .bind(filter.search_pattern())
            .fetch_all(self.pool)
            .await?;

        rows.into_iter().map(ProductSummary::try_from).collect()
    }

    /// A non-archived product with all its images.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_product(&self, id: &ProductId) -> Result<Option<ProductDetail>, RepositoryError> {
        let sql = format!("{PRODUCT_COLUMNS} WHERE p.id = $1 AND NOT p.archived");

        let Some(row) = sqlx::query_as::<_, ProductRow>(&sql)
            .bind(id.as_str())
            .fetch_optional(self.pool)
            .await?
        else {
            return Ok(None);
        };

        let images: Vec<String> = sqlx::query_scalar(
            r"
            SELECT url FROM product_image
            WHERE product_id = $1
            ORDER BY position, id
            ",
        )
        .bind(id.as_str())
        .fetch_all(self.pool)
        .await?;

        Ok(Some(ProductDetail {
            product: row.try_into()?,
            images,
        }))
    }

    /// All brands ordered by name.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_brands(&self) -> Result<Vec<Brand>, RepositoryError> {
        let brands = sqlx::query_as("SELECT id, name FROM brand ORDER BY name ASC, id ASC")
            .fetch_all(self.pool)
            .await?;
        Ok(brands)
    }

    /// All categories ordered by name.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_categories(&self) -> Result<Vec<Category>, RepositoryError> {
        let categories =
            sqlx::query_as("SELECT id, name FROM category ORDER BY name ASC, id ASC")
                .fetch_all(self.pool)
                .await?;
        Ok(categories)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_brand(&self, id: &BrandId) -> Result<Option<Brand>, RepositoryError> {
        let brand = sqlx::query_as("SELECT id, name FROM brand WHERE id = $1")
            .bind(id.as_str())
            .fetch_optional(self.pool)
            .await?;
        Ok(brand)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_category(&self, id: &CategoryId) -> Result<Option<Category>, RepositoryError> {
        let category = sqlx::query_as("SELECT id, name FROM category WHERE id = $1")
            .bind(id.as_str())
            .fetch_optional(self.pool)
            .await?;
        Ok(category)
    }
}
