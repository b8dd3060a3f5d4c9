//! Storefront test utilities.
//!
//! Helpers for integration testing: indexed product fixtures and canned
//! search-index responses.

use serde_json::{Value as JsonValue, json};

/// Create a test product with default values.
pub fn test_product(id: i64, title: &str) -> TestProduct {
    TestProduct {
        id,
        title: title.to_string(),
        description: format!("{title} description"),
        category: "beauty".to_string(),
        tags: Vec::new(),
        price: 9.99,
        rating: 4.0,
        stock: 10,
        availability_status: "In Stock".to_string(),
        brand: None,
    }
}

/// A product document as mirrored into the search index.
#[derive(Debug, Clone)]
pub struct TestProduct {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub category: String,
    pub tags: Vec<String>,
    pub price: f64,
    pub rating: f64,
    pub stock: i64,
    pub availability_status: String,
    pub brand: Option<String>,
}

impl TestProduct {
    /// Set the brand.
    pub fn with_brand(mut self, brand: &str) -> Self {
        self.brand = Some(brand.to_string());
        self
    }

    /// Set the price.
    pub fn with_price(mut self, price: f64) -> Self {
        self.price = price;
        self
    }

    /// Set the tags.
    pub fn with_tags(mut self, tags: &[&str]) -> Self {
        self.tags = tags.iter().map(|t| t.to_string()).collect();
        self
    }

    /// Set the category name.
    pub fn with_category(mut self, category: &str) -> Self {
        self.category = category.to_string();
        self
    }

    /// Render as an index `_source` document.
    pub fn to_source(&self) -> JsonValue {
        json!({
            "id": self.id,
            "title": self.title,
            "description": self.description,
            "category": self.category,
            "tags": self.tags,
            "price": self.price,
            "rating": self.rating,
            "stock": self.stock,
            "availabilityStatus": self.availability_status,
            "brand": self.brand,
        })
    }
}

/// Build a search response with the given `hits.total` and sources.
///
/// `total` is passed through untouched so callers can exercise the bare
/// integer form, the `{ "value": n }` form and malformed values.
pub fn search_response(total: JsonValue, sources: &[JsonValue]) -> JsonValue {
    let hits: Vec<JsonValue> = sources
        .iter()
        .enumerate()
        .map(|(i, source)| {
            json!({
                "_index": "products",
                "_id": i.to_string(),
                "_score": 1.0,
                "_source": source,
            })
        })
        .collect();

    json!({
        "took": 1,
        "timed_out": false,
        "hits": {
            "total": total,
            "max_score": 1.0,
            "hits": hits,
        }
    })
}

/// Build a search response from product fixtures with an object total.
pub fn product_hits(products: &[TestProduct]) -> JsonValue {
    let sources: Vec<JsonValue> = products.iter().map(TestProduct::to_source).collect();
    search_response(
        json!({ "value": products.len(), "relation": "eq" }),
        &sources,
    )
}
