//! Per-entity column catalogs.
//!
//! Each entity declares which columns may be selected, searched and sorted,
//! the column type (which decides the allowed filter operations), which text
//! columns are analyzed in the search index, and a table of virtual columns
//! that are resolved through joins instead of read from the base row.

use sea_query::extension::postgres::PgExpr;
use sea_query::{Alias, Expr, Query, SelectStatement, SimpleExpr};

use super::error::QueryError;
use super::sql_builder::{col, contains_pattern};
use super::types::{Descriptor, FilterOperation, FilterValue, MAX_PAGE_SIZE, SearchFilter};

/// Column value type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    /// Integer column (ids, counts).
    Integer,
    /// Fixed-point or floating column (prices, ratings).
    Decimal,
    /// String column (including enumerated status values).
    Text,
}

impl ColumnKind {
    pub fn is_numeric(self) -> bool {
        matches!(self, ColumnKind::Integer | ColumnKind::Decimal)
    }

    /// Operations a filter on a column of this kind may use.
    pub fn operations(self) -> &'static [FilterOperation] {
        if self.is_numeric() {
            &FilterOperation::NUMERIC
        } else {
            &FilterOperation::TEXT
        }
    }

    /// Operation applied when the request leaves it out.
    pub fn default_operation(self) -> FilterOperation {
        if self.is_numeric() {
            FilterOperation::Eq
        } else {
            FilterOperation::Like
        }
    }

    pub(crate) fn value_label(self) -> &'static str {
        if self.is_numeric() {
            "number"
        } else {
            "string"
        }
    }
}

/// A column exposed through the list API.
#[derive(Debug, Clone, Copy)]
pub struct Column {
    pub name: &'static str,
    pub kind: ColumnKind,
    pub selectable: bool,
    pub searchable: bool,
    pub sortable: bool,
    /// Token-matched in the search index rather than wildcard-matched.
    pub analyzed: bool,
}

impl Column {
    const fn new(name: &'static str, kind: ColumnKind) -> Self {
        Self {
            name,
            kind,
            selectable: true,
            searchable: true,
            sortable: true,
            analyzed: false,
        }
    }

    pub const fn integer(name: &'static str) -> Self {
        Self::new(name, ColumnKind::Integer)
    }

    pub const fn decimal(name: &'static str) -> Self {
        Self::new(name, ColumnKind::Decimal)
    }

    pub const fn text(name: &'static str) -> Self {
        Self::new(name, ColumnKind::Text)
    }

    pub const fn analyzed(self) -> Self {
        Self {
            analyzed: true,
            ..self
        }
    }

    pub const fn unsortable(self) -> Self {
        Self {
            sortable: false,
            ..self
        }
    }
}

/// A join that a virtual column depends on.
///
/// `key` deduplicates joins shared between several virtual columns.
#[derive(Debug, Clone, Copy)]
pub struct JoinSpec {
    pub key: &'static str,
    pub apply: fn(&mut SelectStatement),
}

/// A projected field resolved through joins and aggregation.
#[derive(Debug, Clone, Copy)]
pub struct VirtualColumn {
    pub name: &'static str,
    /// Joins needed to project the column.
    pub joins: &'static [JoinSpec],
    /// Expression projected under `name`.
    pub projection: fn() -> SimpleExpr,
    /// Group-by keys added when projecting, as `(table, column)`.
    pub group_by: &'static [(&'static str, &'static str)],
    /// Joins needed to filter on the column.
    pub filter_joins: &'static [JoinSpec],
    /// Predicate for a text filter on the column.
    pub filter: fn(FilterOperation, &str) -> SimpleExpr,
}

/// Column catalog and join topology for one entity.
#[derive(Debug)]
pub struct EntitySchema {
    /// Entity name used in error messages.
    pub entity: &'static str,
    /// Base table.
    pub table: &'static str,
    pub primary_key: &'static str,
    pub columns: &'static [Column],
    pub virtual_columns: &'static [VirtualColumn],
    /// Projection used when the request omits `select`.
    pub default_select: &'static [&'static str],
}

impl EntitySchema {
    /// Look up a column by name.
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Look up a virtual column by name.
    pub fn virtual_column(&self, name: &str) -> Option<&VirtualColumn> {
        self.virtual_columns.iter().find(|v| v.name == name)
    }

    /// Column allowed in `select`.
    pub fn selectable(&self, name: &str) -> Result<&Column, QueryError> {
        self.column(name)
            .filter(|c| c.selectable)
            .ok_or_else(|| self.unknown("select", name))
    }

    /// Column allowed in `search`.
    pub fn searchable(&self, name: &str) -> Result<&Column, QueryError> {
        self.column(name)
            .filter(|c| c.searchable)
            .ok_or_else(|| self.unknown("search", name))
    }

    /// Column allowed in `orderBy`.
    pub fn sortable(&self, name: &str) -> Result<&Column, QueryError> {
        self.column(name)
            .filter(|c| c.sortable)
            .ok_or_else(|| self.unknown("orderBy", name))
    }

    fn unknown(&self, clause: &'static str, column: &str) -> QueryError {
        QueryError::UnknownColumn {
            entity: self.entity,
            clause,
            column: column.to_string(),
        }
    }

    /// Check a filter against the column's type and return that column.
    pub fn check_filter(&self, filter: &SearchFilter) -> Result<&Column, QueryError> {
        let column = self.searchable(&filter.column)?;

        if !column.kind.operations().contains(&filter.operation) {
            return Err(QueryError::OperationNotAllowed {
                entity: self.entity,
                column: filter.column.clone(),
                operation: filter.operation.to_string(),
            });
        }

        let value_matches = match filter.value {
            FilterValue::Number(_) => column.kind.is_numeric(),
            FilterValue::Text(_) => !column.kind.is_numeric(),
        };
        if !value_matches {
            return Err(QueryError::InvalidValue {
                entity: self.entity,
                column: filter.column.clone(),
                expected: column.kind.value_label(),
            });
        }

        Ok(column)
    }

    /// Validate every column, operation and paging value in a descriptor.
    pub fn validate(&self, descriptor: &Descriptor) -> Result<(), QueryError> {
        for name in &descriptor.select {
            self.selectable(name)?;
        }
        for filter in &descriptor.search {
            self.check_filter(filter)?;
        }
        for order in &descriptor.order_by {
            self.sortable(&order.column)?;
        }
        if descriptor.page == 0 {
            return Err(QueryError::NotPositive {
                param: "page",
                value: descriptor.page.to_string(),
            });
        }
        if descriptor.page_size == 0 {
            return Err(QueryError::NotPositive {
                param: "pageSize",
                value: descriptor.page_size.to_string(),
            });
        }
        if descriptor.page_size > MAX_PAGE_SIZE {
            return Err(QueryError::AboveMaximum {
                param: "pageSize",
                value: descriptor.page_size.to_string(),
                max: u64::from(MAX_PAGE_SIZE),
            });
        }
        Ok(())
    }
}

// -------------------------------------------------------------------------
// Category
// -------------------------------------------------------------------------

pub static CATEGORY: EntitySchema = EntitySchema {
    entity: "category",
    table: "category",
    primary_key: "id",
    columns: &[Column::integer("id"), Column::text("name")],
    virtual_columns: &[],
    default_select: &["id"],
};

// -------------------------------------------------------------------------
// Product
// -------------------------------------------------------------------------

const TAG_LINK_TABLE: &str = "productToTag";

const JOIN_TAGS: JoinSpec = JoinSpec {
    key: "tags",
    apply: join_tags,
};

const JOIN_CATEGORY: JoinSpec = JoinSpec {
    key: "category",
    apply: join_category,
};

pub static PRODUCT: EntitySchema = EntitySchema {
    entity: "product",
    table: "product",
    primary_key: "id",
    columns: &[
        Column::integer("id"),
        Column::text("title"),
        Column::text("description"),
        Column::text("category").analyzed().unsortable(),
        Column::text("tags").analyzed().unsortable(),
        Column::decimal("price"),
        Column::decimal("discountPercentage"),
        Column::decimal("rating"),
        Column::integer("stock"),
        Column::text("availabilityStatus").analyzed(),
        Column::text("brand"),
        Column::text("sku"),
        Column::decimal("weight"),
        Column::text("warrantyInformation"),
        Column::text("shippingInformation"),
        Column::text("returnPolicy"),
        Column::integer("minimumOrderQuantity"),
        Column::text("thumbnail"),
    ],
    virtual_columns: &[
        VirtualColumn {
            name: "tags",
            joins: &[JOIN_TAGS],
            projection: tags_projection,
            group_by: &[("product", "id")],
            filter_joins: &[],
            filter: tags_filter,
        },
        VirtualColumn {
            name: "category",
            joins: &[JOIN_CATEGORY],
            projection: category_projection,
            group_by: &[("product", "id"), ("category", "id")],
            filter_joins: &[JOIN_CATEGORY],
            filter: category_filter,
        },
    ],
    default_select: &["id", "title"],
};

fn join_tags(query: &mut SelectStatement) {
    query
        .left_join(
            Alias::new(TAG_LINK_TABLE),
            col(TAG_LINK_TABLE, "productId").equals((Alias::new("product"), Alias::new("id"))),
        )
        .left_join(
            Alias::new("tag"),
            col("tag", "id").equals((Alias::new(TAG_LINK_TABLE), Alias::new("tagId"))),
        );
}

fn join_category(query: &mut SelectStatement) {
    query.left_join(
        Alias::new("category"),
        col("category", "id").equals((Alias::new("product"), Alias::new("categoryId"))),
    );
}

/// Tag names as a sorted JSON array; products without tags get `[]`.
fn tags_projection() -> SimpleExpr {
    Expr::cust(
        r#"COALESCE(json_agg("tag"."name" ORDER BY "tag"."name") FILTER (WHERE "tag"."name" IS NOT NULL), '[]'::json)"#,
    )
}

fn category_projection() -> SimpleExpr {
    col("category", "name").into()
}

/// Tags are matched through a correlated sub-select so filtering never
/// multiplies rows.
fn tags_filter(operation: FilterOperation, value: &str) -> SimpleExpr {
    let matching_tag = Query::select()
        .expr(Expr::val(1))
        .from(Alias::new(TAG_LINK_TABLE))
        .inner_join(
            Alias::new("tag"),
            col("tag", "id").equals((Alias::new(TAG_LINK_TABLE), Alias::new("tagId"))),
        )
        .and_where(
            col(TAG_LINK_TABLE, "productId").equals((Alias::new("product"), Alias::new("id"))),
        )
        .and_where(col("tag", "name").ilike(contains_pattern(value)))
        .to_owned();

    match operation {
        FilterOperation::NotLike => Expr::exists(matching_tag).not(),
        _ => Expr::exists(matching_tag),
    }
}

fn category_filter(operation: FilterOperation, value: &str) -> SimpleExpr {
    let name = col("category", "name");
    match operation {
        FilterOperation::NotLike => name.not_ilike(contains_pattern(value)),
        _ => name.ilike(contains_pattern(value)),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::query::types::OrderSpec;

    #[test]
    fn product_allow_lists() {
        assert!(PRODUCT.selectable("tags").is_ok());
        assert!(PRODUCT.selectable("categoryId").is_err());
        assert!(PRODUCT.sortable("price").is_ok());
        assert!(PRODUCT.sortable("tags").is_err());
        assert!(PRODUCT.virtual_column("category").is_some());
        assert!(PRODUCT.virtual_column("brand").is_none());
    }

    #[test]
    fn analyzed_columns() {
        let analyzed: Vec<&str> = PRODUCT
            .columns
            .iter()
            .filter(|c| c.analyzed)
            .map(|c| c.name)
            .collect();
        assert_eq!(analyzed, vec!["category", "tags", "availabilityStatus"]);
    }

    #[test]
    fn every_virtual_column_is_declared() {
        for virtual_column in PRODUCT.virtual_columns {
            let column = PRODUCT.column(virtual_column.name).unwrap();
            assert!(column.selectable);
            assert!(!column.sortable);
        }
    }

    #[test]
    fn unknown_select_column_rejected() {
        let d = Descriptor {
            select: vec!["id".to_string(), "password".to_string()],
            ..Default::default()
        };
        let err = CATEGORY.validate(&d).unwrap_err();
        assert_eq!(
            err,
            QueryError::UnknownColumn {
                entity: "category",
                clause: "select",
                column: "password".to_string(),
            }
        );
    }

    #[test]
    fn text_operation_on_numeric_column_rejected() {
        let filter = SearchFilter::new("price", FilterOperation::Like, 10);
        assert!(matches!(
            PRODUCT.check_filter(&filter),
            Err(QueryError::OperationNotAllowed { .. })
        ));
    }

    #[test]
    fn numeric_value_on_text_column_rejected() {
        let filter = SearchFilter::new("brand", FilterOperation::Like, 10);
        assert!(matches!(
            PRODUCT.check_filter(&filter),
            Err(QueryError::InvalidValue { .. })
        ));
    }

    #[test]
    fn unknown_order_column_rejected() {
        let d = Descriptor {
            order_by: vec![OrderSpec::desc("tags")],
            ..Default::default()
        };
        assert!(PRODUCT.validate(&d).is_err());
    }

    #[test]
    fn page_size_bounds() {
        let too_big = Descriptor {
            page_size: MAX_PAGE_SIZE + 1,
            ..Default::default()
        };
        assert!(matches!(
            CATEGORY.validate(&too_big),
            Err(QueryError::AboveMaximum { max: 100, .. })
        ));

        let zero_page = Descriptor {
            page: 0,
            ..Default::default()
        };
        assert!(matches!(
            CATEGORY.validate(&zero_page),
            Err(QueryError::NotPositive { param: "page", .. })
        ));

        let max = Descriptor {
            page_size: MAX_PAGE_SIZE,
            ..Default::default()
        };
        assert!(CATEGORY.validate(&max).is_ok());
    }

    #[test]
    fn default_operations_by_kind() {
        assert_eq!(ColumnKind::Text.default_operation(), FilterOperation::Like);
        assert_eq!(ColumnKind::Decimal.default_operation(), FilterOperation::Eq);
        assert_eq!(ColumnKind::Integer.operations().len(), 6);
    }
}
