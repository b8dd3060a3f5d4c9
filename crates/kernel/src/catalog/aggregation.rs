//! Product facets and price statistics.
//!
//! Six independent queries run concurrently on the pool; any failure fails
//! the whole aggregation.

use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use tracing::debug;

const TOTAL_SQL: &str = r#"SELECT COUNT(*) FROM "product""#;

const TAG_FACET_SQL: &str = r#"
    SELECT "tag"."name" AS name, COUNT("productToTag"."tagId") AS product_count
    FROM "tag"
    LEFT JOIN "productToTag" ON "productToTag"."tagId" = "tag"."id"
    GROUP BY "tag"."id", "tag"."name"
"#;

const CATEGORY_FACET_SQL: &str = r#"
    SELECT "category"."name" AS name, COUNT("product"."id") AS product_count
    FROM "category"
    LEFT JOIN "product" ON "product"."categoryId" = "category"."id"
    GROUP BY "category"."id", "category"."name"
"#;

const BRAND_FACET_SQL: &str = r#"
    SELECT "brand" AS name, COUNT("id") AS product_count
    FROM "product"
    GROUP BY "brand"
"#;

const AVAILABILITY_FACET_SQL: &str = r#"
    SELECT "availabilityStatus" AS name, COUNT(*) AS product_count
    FROM "product"
    GROUP BY "availabilityStatus"
"#;

const PRICE_SQL: &str = r#"
    SELECT MIN("price")::float8 AS min, MAX("price")::float8 AS max, AVG("price")::float8 AS average
    FROM "product"
"#;

/// Number of products carrying one facet value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct FacetCount {
    /// Facet value; `None` for products with no value (brand only).
    pub name: Option<String>,
    pub product_count: i64,
}

impl FacetCount {
    pub fn new(name: &str, product_count: i64) -> Self {
        Self {
            name: Some(name.to_string()),
            product_count,
        }
    }
}

/// Price statistics over all products.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PriceSummary {
    pub min: f64,
    pub max: f64,
    pub average: f64,
}

#[derive(sqlx::FromRow)]
struct PriceRow {
    min: Option<f64>,
    max: Option<f64>,
    average: Option<f64>,
}

impl From<PriceRow> for PriceSummary {
    fn from(row: PriceRow) -> Self {
        Self {
            min: row.min.unwrap_or(0.0),
            max: row.max.unwrap_or(0.0),
            average: row.average.unwrap_or(0.0),
        }
    }
}

/// Faceted summary of the whole product catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductAggregation {
    pub total: i64,
    /// Sorted by descending count.
    pub tag: Vec<FacetCount>,
    /// Sorted by descending count.
    pub category: Vec<FacetCount>,
    /// Sorted by descending count.
    pub brand: Vec<FacetCount>,
    /// Grouping order as returned by the database, not sorted.
    pub availability_status: Vec<FacetCount>,
    pub price: PriceSummary,
}

impl ProductAggregation {
    /// Assemble from raw facet rows, applying the facet ordering rules.
    pub fn assemble(
        total: i64,
        tag: Vec<FacetCount>,
        category: Vec<FacetCount>,
        brand: Vec<FacetCount>,
        availability_status: Vec<FacetCount>,
        price: PriceSummary,
    ) -> Self {
        Self {
            total,
            tag: sort_by_count_desc(tag),
            category: sort_by_count_desc(category),
            brand: sort_by_count_desc(brand),
            availability_status,
            price,
        }
    }
}

/// Stable sort by descending product count; ties keep their input order.
pub fn sort_by_count_desc(mut facets: Vec<FacetCount>) -> Vec<FacetCount> {
    facets.sort_by(|a, b| b.product_count.cmp(&a.product_count));
    facets
}

/// Compute every facet and the price summary.
pub async fn product_aggregation(pool: &PgPool) -> Result<ProductAggregation, sqlx::Error> {
    let (total, tag, category, brand, availability_status, price) = tokio::try_join!(
        sqlx::query_scalar::<_, i64>(TOTAL_SQL).fetch_one(pool),
        sqlx::query_as::<_, FacetCount>(TAG_FACET_SQL).fetch_all(pool),
        sqlx::query_as::<_, FacetCount>(CATEGORY_FACET_SQL).fetch_all(pool),
        sqlx::query_as::<_, FacetCount>(BRAND_FACET_SQL).fetch_all(pool),
        sqlx::query_as::<_, FacetCount>(AVAILABILITY_FACET_SQL).fetch_all(pool),
        sqlx::query_as::<_, PriceRow>(PRICE_SQL).fetch_one(pool),
    )?;

    debug!(
        total,
        tags = tag.len(),
        categories = category.len(),
        brands = brand.len(),
        "product aggregation computed"
    );

    Ok(ProductAggregation::assemble(
        total,
        tag,
        category,
        brand,
        availability_status,
        price.into(),
    ))
}
