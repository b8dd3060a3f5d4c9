//! Search-index query builder.
//!
//! Translates a [`Descriptor`] into an Elasticsearch-style request body with
//! the same filtering, sorting and paging semantics as the relational path.
//! Filters are partitioned into four buckets:
//! - analyzed text columns with `like` → one `match` clause (all terms)
//! - other text columns with `like` → one case-insensitive `wildcard` clause
//! - numeric operations → one `range` clause, merged per column
//! - `not like` on any column → a `wildcard` clause under `must_not`

use std::collections::BTreeMap;

use serde::Serialize;

use super::QueryBuilder;
use super::error::QueryError;
use super::schema::EntitySchema;
use super::types::{Descriptor, FilterOperation, SearchFilter, SortDirection};

/// Complete search request body.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchRequest {
    /// Source fields to return.
    #[serde(rename = "_source")]
    pub source: Vec<String>,

    pub query: SearchQuery,

    /// One single-key map per sort column, in priority order.
    pub sort: Vec<BTreeMap<String, SortDirection>>,

    pub from: u64,

    pub size: u32,
}

/// Top-level query wrapper.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchQuery {
    pub bool: BoolQuery,
}

/// Boolean query; only non-empty buckets contribute clauses.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BoolQuery {
    pub must: Vec<Clause>,
    pub must_not: Vec<Clause>,
}

/// A leaf query clause keyed by column.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Clause {
    Match(BTreeMap<String, MatchQuery>),
    Wildcard(BTreeMap<String, WildcardQuery>),
    Range(BTreeMap<String, RangeQuery>),
}

/// Token match requiring every term.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchQuery {
    pub query: String,
    pub operator: MatchOperator,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchOperator {
    And,
}

/// Case-insensitive substring wildcard.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WildcardQuery {
    pub value: String,
    pub case_insensitive: bool,
}

/// Numeric bounds for one column.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RangeQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub eq: Option<serde_json::Number>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ne: Option<serde_json::Number>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gt: Option<serde_json::Number>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gte: Option<serde_json::Number>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lt: Option<serde_json::Number>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lte: Option<serde_json::Number>,
}

impl RangeQuery {
    fn set(&mut self, operation: FilterOperation, value: serde_json::Number) {
        let slot = match operation {
            FilterOperation::Eq => &mut self.eq,
            FilterOperation::Ne => &mut self.ne,
            FilterOperation::Gt => &mut self.gt,
            FilterOperation::Gte => &mut self.gte,
            FilterOperation::Lt => &mut self.lt,
            FilterOperation::Lte => &mut self.lte,
            FilterOperation::Like | FilterOperation::NotLike => return,
        };
        *slot = Some(value);
    }
}

/// Query builder for the document index.
#[derive(Debug, Clone, Copy)]
pub struct SearchQueryBuilder {
    schema: &'static EntitySchema,
}

impl SearchQueryBuilder {
    pub fn new(schema: &'static EntitySchema) -> Self {
        Self { schema }
    }

    /// Partition filters into the boolean query.
    fn build_bool(&self, filters: &[SearchFilter]) -> Result<BoolQuery, QueryError> {
        let mut analyzed: BTreeMap<String, MatchQuery> = BTreeMap::new();
        let mut wildcard: BTreeMap<String, WildcardQuery> = BTreeMap::new();
        let mut range: BTreeMap<String, RangeQuery> = BTreeMap::new();
        let mut negated: BTreeMap<String, WildcardQuery> = BTreeMap::new();

        for filter in filters {
            let column = self.schema.check_filter(filter)?;

            match filter.operation {
                FilterOperation::NotLike => {
                    negated.insert(filter.column.clone(), contains_wildcard(filter));
                }
                FilterOperation::Like if column.analyzed => {
                    analyzed.insert(
                        filter.column.clone(),
                        MatchQuery {
                            query: filter.value.as_text().unwrap_or_default().to_string(),
                            operator: MatchOperator::And,
                        },
                    );
                }
                FilterOperation::Like => {
                    wildcard.insert(filter.column.clone(), contains_wildcard(filter));
                }
                operation => {
                    if let Some(number) = filter.value.as_number() {
                        range
                            .entry(filter.column.clone())
                            .or_default()
                            .set(operation, number.clone());
                    }
                }
            }
        }

        let mut query = BoolQuery::default();
        if !analyzed.is_empty() {
            query.must.push(Clause::Match(analyzed));
        }
        if !wildcard.is_empty() {
            query.must.push(Clause::Wildcard(wildcard));
        }
        if !range.is_empty() {
            query.must.push(Clause::Range(range));
        }
        if !negated.is_empty() {
            query.must_not.push(Clause::Wildcard(negated));
        }
        Ok(query)
    }
}

impl QueryBuilder for SearchQueryBuilder {
    type Output = SearchRequest;

    fn build(&self, descriptor: &Descriptor) -> Result<SearchRequest, QueryError> {
        self.schema.validate(descriptor)?;

        let sort = descriptor
            .order_by
            .iter()
            .map(|order| BTreeMap::from([(order.column.clone(), order.direction)]))
            .collect();

        Ok(SearchRequest {
            source: descriptor.select.clone(),
            query: SearchQuery {
                bool: self.build_bool(&descriptor.search)?,
            },
            sort,
            from: descriptor.offset(),
            size: descriptor.page_size,
        })
    }
}

fn contains_wildcard(filter: &SearchFilter) -> WildcardQuery {
    WildcardQuery {
        value: format!(
            "*{}*",
            escape_wildcards(filter.value.as_text().unwrap_or_default())
        ),
        case_insensitive: true,
    }
}

/// Escape wildcard-query metacharacters (`*`, `?`, `\`) in a value.
fn escape_wildcards(value: &str) -> String {
    value
        .replace('\\', "\\\\")
        .replace('*', "\\*")
        .replace('?', "\\?")
}
