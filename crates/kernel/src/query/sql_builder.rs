//! Relational query builder using SeaQuery.
//!
//! Generates PostgreSQL from a [`Descriptor`] and an [`EntitySchema`]:
//! - projection of base columns plus join-resolved virtual columns
//! - ANDed filters, case-insensitive substring matching for text
//! - multi-column ordering
//! - LIMIT/OFFSET pagination and a matching COUNT query

use sea_query::extension::postgres::PgExpr;
use sea_query::{
    Alias, Asterisk, Expr, Order, PostgresQueryBuilder, Query, SelectStatement, SimpleExpr,
};

use super::QueryBuilder;
use super::error::QueryError;
use super::schema::{EntitySchema, JoinSpec};
use super::types::{Descriptor, FilterOperation, SearchFilter, SortDirection};

/// Data and count SQL for one list request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelationalQuery {
    /// Projected, ordered, paginated rows.
    pub data: String,
    /// `COUNT(*)` over the same filtered set.
    pub count: String,
}

/// Query builder for the relational store.
#[derive(Debug, Clone, Copy)]
pub struct RelationalQueryBuilder {
    schema: &'static EntitySchema,
}

impl RelationalQueryBuilder {
    pub fn new(schema: &'static EntitySchema) -> Self {
        Self { schema }
    }

    /// Build the main SELECT query with pagination.
    pub fn build_data(&self, descriptor: &Descriptor) -> Result<String, QueryError> {
        self.schema.validate(descriptor)?;

        let mut query = Query::select();
        query.from(Alias::new(self.schema.table));

        let mut joins = AppliedJoins::default();

        // Virtual columns first: joins, aggregated projection, group-by keys
        self.add_projection(&mut query, &descriptor.select, &mut joins);

        // WHERE conditions
        self.add_filters(&mut query, &descriptor.search, &mut joins);

        // ORDER BY
        self.add_sorts(&mut query, descriptor);

        // LIMIT/OFFSET for pagination
        query.limit(u64::from(descriptor.page_size));
        query.offset(descriptor.offset());

        Ok(query.to_string(PostgresQueryBuilder))
    }

    /// Build a COUNT query for total results.
    ///
    /// Shares the filters of [`build_data`](Self::build_data) but ignores
    /// projection, ordering and paging.
    pub fn build_count(&self, descriptor: &Descriptor) -> Result<String, QueryError> {
        self.schema.validate(descriptor)?;

        let mut query = Query::select();

        // SELECT COUNT(*)
        query.expr(Expr::col(Asterisk).count());
        query.from(Alias::new(self.schema.table));

        let mut joins = AppliedJoins::default();
        self.add_filters(&mut query, &descriptor.search, &mut joins);

        Ok(query.to_string(PostgresQueryBuilder))
    }

    /// Build a single-row lookup by primary key.
    pub fn build_by_id(&self, id: i64, select: &[String]) -> Result<String, QueryError> {
        for name in select {
            self.schema.selectable(name)?;
        }

        let mut query = Query::select();
        query.from(Alias::new(self.schema.table));

        let mut joins = AppliedJoins::default();
        self.add_projection(&mut query, select, &mut joins);

        query.and_where(col(self.schema.table, self.schema.primary_key).eq(id));
        query.limit(1);

        Ok(query.to_string(PostgresQueryBuilder))
    }

    /// Add SELECT fields, resolving virtual columns through their joins.
    fn add_projection(
        &self,
        query: &mut SelectStatement,
        select: &[String],
        joins: &mut AppliedJoins,
    ) {
        let table = self.schema.table;
        let mut group_by: Vec<(&'static str, &'static str)> = Vec::new();

        for name in select {
            if let Some(virtual_column) = self.schema.virtual_column(name) {
                joins.apply_all(query, virtual_column.joins);
                query.expr_as(
                    (virtual_column.projection)(),
                    Alias::new(virtual_column.name),
                );
                for key in virtual_column.group_by {
                    if !group_by.contains(key) {
                        group_by.push(*key);
                    }
                }
            } else {
                query.column((Alias::new(table), Alias::new(name)));
            }
        }

        for (group_table, group_column) in group_by {
            query.group_by_col((Alias::new(group_table), Alias::new(group_column)));
        }
    }

    /// Add WHERE conditions from filters.
    fn add_filters(
        &self,
        query: &mut SelectStatement,
        filters: &[SearchFilter],
        joins: &mut AppliedJoins,
    ) {
        for filter in filters {
            let condition = match self.schema.virtual_column(&filter.column) {
                Some(virtual_column) => {
                    joins.apply_all(query, virtual_column.filter_joins);
                    let value = filter.value.as_text().unwrap_or_default();
                    (virtual_column.filter)(filter.operation, value)
                }
                None => self.build_filter_condition(filter),
            };
            query.and_where(condition);
        }
    }

    /// Build a single filter condition on a base column.
    fn build_filter_condition(&self, filter: &SearchFilter) -> SimpleExpr {
        let field = col(self.schema.table, &filter.column);

        match filter.operation {
            FilterOperation::Like => {
                field.ilike(contains_pattern(filter.value.as_text().unwrap_or_default()))
            }
            FilterOperation::NotLike => {
                field.not_ilike(contains_pattern(filter.value.as_text().unwrap_or_default()))
            }
            FilterOperation::Eq => field.eq(filter.value.to_sql_value()),
            FilterOperation::Ne => field.ne(filter.value.to_sql_value()),
            FilterOperation::Gt => field.gt(filter.value.to_sql_value()),
            FilterOperation::Gte => field.gte(filter.value.to_sql_value()),
            FilterOperation::Lt => field.lt(filter.value.to_sql_value()),
            FilterOperation::Lte => field.lte(filter.value.to_sql_value()),
        }
    }

    /// Add ORDER BY clauses in priority order.
    fn add_sorts(&self, query: &mut SelectStatement, descriptor: &Descriptor) {
        for sort in &descriptor.order_by {
            let order = match sort.direction {
                SortDirection::Asc => Order::Asc,
                SortDirection::Desc => Order::Desc,
            };
            query.order_by(
                (Alias::new(self.schema.table), Alias::new(&sort.column)),
                order,
            );
        }
    }
}

impl QueryBuilder for RelationalQueryBuilder {
    type Output = RelationalQuery;

    fn build(&self, descriptor: &Descriptor) -> Result<RelationalQuery, QueryError> {
        Ok(RelationalQuery {
            data: self.build_data(descriptor)?,
            count: self.build_count(descriptor)?,
        })
    }
}

/// Joins already attached to a statement, by [`JoinSpec::key`].
#[derive(Default)]
struct AppliedJoins(Vec<&'static str>);

impl AppliedJoins {
    fn apply_all(&mut self, query: &mut SelectStatement, joins: &[JoinSpec]) {
        for join in joins {
            if !self.0.contains(&join.key) {
                (join.apply)(query);
                self.0.push(join.key);
            }
        }
    }
}

/// Qualified column reference.
pub(crate) fn col(table: &str, column: &str) -> Expr {
    Expr::col((Alias::new(table), Alias::new(column)))
}

/// `%value%` with the value's own wildcards escaped.
pub(crate) fn contains_pattern(value: &str) -> String {
    format!("%{}%", escape_like_wildcards(value))
}

/// Escape SQL LIKE wildcard characters (`%`, `_`, `\`) in a value.
fn escape_like_wildcards(value: &str) -> String {
    value
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}
