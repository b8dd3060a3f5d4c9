//! Query layer types.
//!
//! Provides type definitions shared by both query builders:
//! - Descriptor: validated list request (select, search, orderBy, paging)
//! - SearchFilter / FilterOperation / FilterValue: structured search predicates
//! - OrderSpec / SortDirection: multi-column sort
//! - PaginatedResult: response envelope used by every list endpoint

use serde::{Deserialize, Serialize};

/// Page used when the request omits one.
pub const DEFAULT_PAGE: u32 = 1;

/// Page size used when the request omits one.
pub const DEFAULT_PAGE_SIZE: u32 = 10;

/// Largest page size a request may ask for.
pub const MAX_PAGE_SIZE: u32 = 100;

/// Normalized list request consumed by both query builders.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Descriptor {
    /// Columns to project.
    pub select: Vec<String>,

    /// Filter predicates, ANDed in declaration order.
    pub search: Vec<SearchFilter>,

    /// Sort order; earlier entries take priority.
    pub order_by: Vec<OrderSpec>,

    /// Current page (1-indexed).
    pub page: u32,

    /// Items per page.
    pub page_size: u32,
}

impl Default for Descriptor {
    fn default() -> Self {
        Self {
            select: vec!["id".to_string()],
            search: Vec::new(),
            order_by: vec![OrderSpec::asc("id")],
            page: DEFAULT_PAGE,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl Descriptor {
    /// Number of rows skipped before the current page.
    pub fn offset(&self) -> u64 {
        u64::from(self.page.saturating_sub(1)) * u64::from(self.page_size)
    }
}

/// Filter condition for list queries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchFilter {
    /// Column to filter on.
    pub column: String,

    /// Comparison operation.
    pub operation: FilterOperation,

    /// Value to compare against.
    pub value: FilterValue,
}

impl SearchFilter {
    pub fn new(column: &str, operation: FilterOperation, value: impl Into<FilterValue>) -> Self {
        Self {
            column: column.to_string(),
            operation,
            value: value.into(),
        }
    }
}

/// Comparison operations accepted in `search`.
///
/// Text columns take `like`/`not like`; numeric columns take the six
/// comparison operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FilterOperation {
    /// Case-insensitive substring match.
    #[serde(rename = "like")]
    Like,
    /// Negated case-insensitive substring match.
    #[serde(rename = "not like")]
    NotLike,
    #[serde(rename = "=")]
    Eq,
    #[serde(rename = "!=")]
    Ne,
    #[serde(rename = ">")]
    Gt,
    #[serde(rename = ">=")]
    Gte,
    #[serde(rename = "<")]
    Lt,
    #[serde(rename = "<=")]
    Lte,
}

impl FilterOperation {
    /// Operations allowed on text columns.
    pub const TEXT: [FilterOperation; 2] = [FilterOperation::Like, FilterOperation::NotLike];

    /// Operations allowed on numeric columns.
    pub const NUMERIC: [FilterOperation; 6] = [
        FilterOperation::Eq,
        FilterOperation::Ne,
        FilterOperation::Gt,
        FilterOperation::Gte,
        FilterOperation::Lt,
        FilterOperation::Lte,
    ];

    /// Whether this is one of the substring operations.
    pub fn is_text(self) -> bool {
        matches!(self, FilterOperation::Like | FilterOperation::NotLike)
    }

    /// Parse the wire form (`"like"`, `">="`, ...).
    pub fn parse(raw: &str) -> Option<Self> {
        let op = match raw {
            "like" => FilterOperation::Like,
            "not like" => FilterOperation::NotLike,
            "=" => FilterOperation::Eq,
            "!=" => FilterOperation::Ne,
            ">" => FilterOperation::Gt,
            ">=" => FilterOperation::Gte,
            "<" => FilterOperation::Lt,
            "<=" => FilterOperation::Lte,
            _ => return None,
        };
        Some(op)
    }

    /// The wire form of this operation.
    pub fn as_str(self) -> &'static str {
        match self {
            FilterOperation::Like => "like",
            FilterOperation::NotLike => "not like",
            FilterOperation::Eq => "=",
            FilterOperation::Ne => "!=",
            FilterOperation::Gt => ">",
            FilterOperation::Gte => ">=",
            FilterOperation::Lt => "<",
            FilterOperation::Lte => "<=",
        }
    }
}

impl std::fmt::Display for FilterOperation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Filter value types.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FilterValue {
    /// Numeric value (integer or decimal, kept as written).
    Number(serde_json::Number),
    /// String value.
    Text(String),
}

impl FilterValue {
    /// Borrow the text payload.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            FilterValue::Text(s) => Some(s),
            FilterValue::Number(_) => None,
        }
    }

    /// Borrow the numeric payload.
    pub fn as_number(&self) -> Option<&serde_json::Number> {
        match self {
            FilterValue::Number(n) => Some(n),
            FilterValue::Text(_) => None,
        }
    }

    /// Convert to a SQL value, keeping integers integral.
    pub fn to_sql_value(&self) -> sea_query::Value {
        match self {
            FilterValue::Text(s) => s.clone().into(),
            FilterValue::Number(n) => match n.as_i64() {
                Some(i) => i.into(),
                None => n.as_f64().unwrap_or_default().into(),
            },
        }
    }
}

impl From<&str> for FilterValue {
    fn from(value: &str) -> Self {
        FilterValue::Text(value.to_string())
    }
}

impl From<String> for FilterValue {
    fn from(value: String) -> Self {
        FilterValue::Text(value)
    }
}

impl From<i64> for FilterValue {
    fn from(value: i64) -> Self {
        FilterValue::Number(value.into())
    }
}

impl From<i32> for FilterValue {
    fn from(value: i32) -> Self {
        FilterValue::Number(value.into())
    }
}

impl From<f64> for FilterValue {
    fn from(value: f64) -> Self {
        // Non-finite floats have no JSON form; fall back to zero.
        let number = serde_json::Number::from_f64(value).unwrap_or_else(|| 0.into());
        FilterValue::Number(number)
    }
}

/// Sort specification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderSpec {
    /// Column to sort by.
    pub column: String,

    /// Sort direction.
    pub direction: SortDirection,
}

impl OrderSpec {
    pub fn asc(column: &str) -> Self {
        Self {
            column: column.to_string(),
            direction: SortDirection::Asc,
        }
    }

    pub fn desc(column: &str) -> Self {
        Self {
            column: column.to_string(),
            direction: SortDirection::Desc,
        }
    }
}

/// Sort direction.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

/// Paginated response envelope shared by the relational and search paths.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginatedResult<T> {
    /// Rows or documents on the current page.
    pub data: Vec<T>,

    /// Total count (before paging).
    pub total: u64,

    /// Current page number (1-indexed).
    pub page: u32,

    /// Items per page.
    pub page_size: u32,

    /// Total number of pages; zero exactly when `total` is zero.
    pub total_pages: u64,
}

impl<T> PaginatedResult<T> {
    /// Assemble an envelope with paging calculations.
    pub fn assemble(data: Vec<T>, total: u64, page: u32, page_size: u32) -> Self {
        Self {
            data,
            total,
            page,
            page_size,
            total_pages: total_pages(total, page_size),
        }
    }
}

/// `ceil(total / page_size)`, and zero for an empty result set.
pub fn total_pages(total: u64, page_size: u32) -> u64 {
    if total == 0 {
        return 0;
    }
    total.div_ceil(u64::from(page_size.max(1)))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn descriptor_defaults() {
        let d = Descriptor::default();
        assert_eq!(d.select, vec!["id".to_string()]);
        assert!(d.search.is_empty());
        assert_eq!(d.order_by, vec![OrderSpec::asc("id")]);
        assert_eq!(d.page, 1);
        assert_eq!(d.page_size, 10);
        assert_eq!(d.offset(), 0);
    }

    #[test]
    fn offset_second_page() {
        let d = Descriptor {
            page: 2,
            page_size: 20,
            ..Default::default()
        };
        assert_eq!(d.offset(), 20);
    }

    #[test]
    fn filter_operation_serialization() {
        let json = serde_json::to_string(&FilterOperation::NotLike).unwrap();
        assert_eq!(json, "\"not like\"");

        let parsed: FilterOperation = serde_json::from_str("\">=\"").unwrap();
        assert_eq!(parsed, FilterOperation::Gte);
        assert_eq!(FilterOperation::parse("<="), Some(FilterOperation::Lte));
        assert_eq!(FilterOperation::parse("ilike"), None);
    }

    #[test]
    fn filter_value_untagged() {
        let text: FilterValue = serde_json::from_str("\"beauty\"").unwrap();
        assert_eq!(text.as_text(), Some("beauty"));

        let number: FilterValue = serde_json::from_str("4.5").unwrap();
        assert_eq!(number.as_number().and_then(|n| n.as_f64()), Some(4.5));
    }

    #[test]
    fn filter_value_sql_keeps_integers() {
        assert_eq!(
            FilterValue::from(7).to_sql_value(),
            sea_query::Value::BigInt(Some(7))
        );
        assert_eq!(
            FilterValue::from(2.5).to_sql_value(),
            sea_query::Value::Double(Some(2.5))
        );
    }

    #[test]
    fn envelope_paging() {
        let result = PaginatedResult::assemble(vec![serde_json::json!({"id": 1})], 25, 2, 10);
        assert_eq!(result.total, 25);
        assert_eq!(result.page, 2);
        assert_eq!(result.total_pages, 3);
    }

    #[test]
    fn envelope_empty_has_zero_pages() {
        let result: PaginatedResult<serde_json::Value> =
            PaginatedResult::assemble(vec![], 0, 1, 10);
        assert_eq!(result.total_pages, 0);
        assert!(result.data.is_empty());
    }

    #[test]
    fn total_pages_matches_ceiling() {
        for page_size in 1..=25u32 {
            for total in 0..=120u64 {
                let pages = total_pages(total, page_size);
                assert_eq!(pages == 0, total == 0);
                if total > 0 {
                    let expected = (total as f64 / f64::from(page_size)).ceil() as u64;
                    assert_eq!(pages, expected, "total={total} page_size={page_size}");
                }
            }
        }
    }

    #[test]
    fn envelope_serializes_camel_case() {
        let result: PaginatedResult<serde_json::Value> =
            PaginatedResult::assemble(vec![], 50, 2, 20);
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "data": [],
                "total": 50,
                "page": 2,
                "pageSize": 20,
                "totalPages": 3
            })
        );
    }
}
