//! Demo catalog data for local development.
//!
//! Inserts are idempotent: rows whose id already exists are skipped.

use rust_decimal::Decimal;

use super::{CommandError, connect};

struct SeedProduct {
    id: &'static str,
    name: &'static str,
    description: &'static str,
    /// Price in paise; `None` shows "Price on request".
    price_paise: Option<i64>,
    priority: i32,
    brand: &'static str,
    category: &'static str,
    image: Option<&'static str>,
}

const BRANDS: &[(&str, &str)] = &[
    ("bosch", "Bosch"),
    ("makita", "Makita"),
    ("stanley", "Stanley"),
    ("taparia", "Taparia"),
];

const CATEGORIES: &[(&str, &str)] = &[
    ("power-tools", "Power Tools"),
    ("hand-tools", "Hand Tools"),
    ("measuring", "Measuring Instruments"),
];

const PRODUCTS: &[SeedProduct] = &[
    SeedProduct {
        id: "bosch-gsb-500-re",
        name: "Bosch GSB 500 RE Impact Drill",
        description: "500 W impact drill with 13 mm keyed chuck.",
        price_paise: Some(349_900),
        priority: 10,
        brand: "bosch",
        category: "power-tools",
        image: Some("/static/img/products/bosch-gsb-500-re.jpg"),
    },
    SeedProduct {
        id: "bosch-gws-600",
        name: "Bosch GWS 600 Angle Grinder",
        description: "670 W angle grinder for 100 mm discs.",
        price_paise: Some(299_900),
        priority: 8,
        brand: "bosch",
        category: "power-tools",
        image: None,
    },
    SeedProduct {
        id: "makita-hr2470",
        name: "Makita HR2470 Rotary Hammer",
        description: "SDS-plus rotary hammer, 780 W, three modes.",
        price_paise: None,
        priority: 9,
        brand: "makita",
        category: "power-tools",
        image: None,
    },
    SeedProduct {
        id: "stanley-stht33989",
        name: "Stanley 5 m Measuring Tape",
        description: "Tylon-coated blade with belt clip.",
        price_paise: Some(34_900),
        priority: 3,
        brand: "stanley",
        category: "measuring",
        image: None,
    },
    SeedProduct {
        id: "taparia-1002",
        name: "Taparia 1002 Combination Spanner Set",
        description: "Set of 8 drop-forged combination spanners, 6-22 mm.",
        price_paise: Some(124_500),
        priority: 5,
        brand: "taparia",
        category: "hand-tools",
        image: None,
    },
];

/// Insert demo brands, categories and products.
///
/// # Errors
///
/// Returns an error if the database URL is missing or any insert fails.
/// Nothing is written unless every insert succeeds.
pub async fn catalog() -> Result<(), CommandError> {
    let pool = connect().await?;
    let mut tx = pool.begin().await?;

    for &(id, name) in BRANDS {
        sqlx::query("INSERT INTO brand (id, name) VALUES ($1, $2) ON CONFLICT (id) DO NOTHING")
            .bind(id)
            .bind(name)
            .execute(&mut *tx)
            .await?;
    }

    for &(id, name) in CATEGORIES {
        sqlx::query("INSERT INTO category (id, name) VALUES ($1, $2) ON CONFLICT (id) DO NOTHING")
            .bind(id)
            .bind(name)
            .execute(&mut *tx)
            .await?;
    }

    let mut inserted = 0_u64;
    for product in PRODUCTS {
        let result = sqlx::query(
            r"
            INSERT INTO product (id, name, description, price, priority, brand_id, category_id)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ON CONFLICT (id) DO NOTHING
            ",
        )
        .bind(product.id)
        .bind(product.name)
        .bind(product.description)
        .bind(product.price_paise.map(|p| Decimal::new(p, 2)))
        .bind(product.priority)
        .bind(product.brand)
        .bind(product.category)
        .execute(&mut *tx)
        .await?;

        // Only new products get their image, so reruns do not duplicate it.
        if result.rows_affected() == 1 {
            inserted += 1;
            if let Some(url) = product.image {
                sqlx::query("INSERT INTO product_image (product_id, url, position) VALUES ($1, $2, 0)")
                    .bind(product.id)
                    .bind(url)
                    .execute(&mut *tx)
                    .await?;
            }
        }
    }

    tx.commit().await?;

    tracing::info!(
        brands = BRANDS.len(),
        categories = CATEGORIES.len(),
        products_inserted = inserted,
        "Seeding complete!"
    );
    Ok(())
}
