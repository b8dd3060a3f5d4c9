//! Query-string parsing into a [`Descriptor`].
//!
//! `select`, `search` and `orderBy` arrive JSON-encoded; `page` and
//! `pageSize` arrive as plain integers. Missing parameters take their
//! defaults and everything is checked against the entity's allow-lists.

use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use super::error::QueryError;
use super::schema::EntitySchema;
use super::types::{
    DEFAULT_PAGE, DEFAULT_PAGE_SIZE, Descriptor, FilterOperation, FilterValue, MAX_PAGE_SIZE,
    OrderSpec, SearchFilter,
};

/// Raw list parameters as they appear in the query string.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListParams {
    pub select: Option<String>,
    pub search: Option<String>,
    pub order_by: Option<String>,
    pub page: Option<String>,
    pub page_size: Option<String>,
}

/// Filter as sent by the client; `operation` is optional.
#[derive(Debug, Deserialize)]
struct RawSearchFilter {
    column: String,
    #[serde(default)]
    operation: Option<String>,
    value: Value,
}

impl EntitySchema {
    /// Parse and validate list parameters for this entity.
    pub fn parse_list(&self, params: &ListParams) -> Result<Descriptor, QueryError> {
        let defaults = Descriptor::default();

        let select = self.parse_select(params.select.as_deref())?;

        let search = match present(&params.search) {
            Some(raw) => decode::<Vec<RawSearchFilter>>("search", raw)?
                .into_iter()
                .map(|raw| self.parse_filter(raw))
                .collect::<Result<Vec<_>, _>>()?,
            None => defaults.search,
        };

        let order_by = match present(&params.order_by) {
            Some(raw) => decode::<Vec<OrderSpec>>("orderBy", raw)?,
            None => defaults.order_by,
        };

        let page = match present(&params.page) {
            Some(raw) => to_u32("page", raw, parse_positive_int("page", raw, None)?)?,
            None => DEFAULT_PAGE,
        };

        let page_size = match present(&params.page_size) {
            Some(raw) => to_u32(
                "pageSize",
                raw,
                parse_positive_int("pageSize", raw, Some(u64::from(MAX_PAGE_SIZE)))?,
            )?,
            None => DEFAULT_PAGE_SIZE,
        };

        let descriptor = Descriptor {
            select,
            search,
            order_by,
            page,
            page_size,
        };
        self.validate(&descriptor)?;
        Ok(descriptor)
    }

    /// Parse a JSON `select` array, falling back to the entity default when
    /// the parameter is absent or empty.
    pub fn parse_select(&self, raw: Option<&str>) -> Result<Vec<String>, QueryError> {
        let select = match raw.map(str::trim).filter(|s| !s.is_empty()) {
            Some(raw) => decode::<Vec<String>>("select", raw)?,
            None => Vec::new(),
        };

        if select.is_empty() {
            return Ok(self.default_select.iter().map(|c| c.to_string()).collect());
        }

        for name in &select {
            self.selectable(name)?;
        }
        Ok(select)
    }

    fn parse_filter(&self, raw: RawSearchFilter) -> Result<SearchFilter, QueryError> {
        let column = self.searchable(&raw.column)?;

        let operation = match raw.operation.as_deref() {
            Some(op) => {
                FilterOperation::parse(op).ok_or_else(|| QueryError::OperationNotAllowed {
                    entity: self.entity,
                    column: raw.column.clone(),
                    operation: op.to_string(),
                })?
            }
            None => column.kind.default_operation(),
        };

        let value = match raw.value {
            Value::Number(n) => FilterValue::Number(n),
            Value::String(s) => FilterValue::Text(s),
            _ => {
                return Err(QueryError::InvalidValue {
                    entity: self.entity,
                    column: raw.column,
                    expected: column.kind.value_label(),
                });
            }
        };

        let filter = SearchFilter {
            column: raw.column,
            operation,
            value,
        };
        self.check_filter(&filter)?;
        Ok(filter)
    }
}

/// Parse a strictly positive integer parameter, optionally bounded.
pub fn parse_positive_int(
    param: &'static str,
    raw: &str,
    max: Option<u64>,
) -> Result<u64, QueryError> {
    let trimmed = raw.trim();

    let value = match trimmed.parse::<u64>() {
        Ok(value) => value,
        Err(_) => {
            let number = trimmed
                .parse::<f64>()
                .ok()
                .filter(|n| n.is_finite())
                .ok_or_else(|| QueryError::NotANumber {
                    param,
                    value: raw.to_string(),
                })?;
            if number.fract() != 0.0 {
                return Err(QueryError::NotAnInteger {
                    param,
                    value: raw.to_string(),
                });
            }
            if number <= 0.0 {
                return Err(QueryError::NotPositive {
                    param,
                    value: raw.to_string(),
                });
            }
            if number > u64::MAX as f64 {
                return Err(QueryError::AboveMaximum {
                    param,
                    value: raw.to_string(),
                    max: max.unwrap_or(u64::MAX),
                });
            }
            number as u64
        }
    };

    if value == 0 {
        return Err(QueryError::NotPositive {
            param,
            value: raw.to_string(),
        });
    }

    if let Some(max) = max
        && value > max
    {
        return Err(QueryError::AboveMaximum {
            param,
            value: raw.to_string(),
            max,
        });
    }

    Ok(value)
}

fn present(raw: &Option<String>) -> Option<&str> {
    raw.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

fn decode<T: DeserializeOwned>(param: &'static str, raw: &str) -> Result<T, QueryError> {
    serde_json::from_str(raw).map_err(|e| QueryError::InvalidJson {
        param,
        details: e.to_string(),
    })
}

fn to_u32(param: &'static str, raw: &str, value: u64) -> Result<u32, QueryError> {
    u32::try_from(value).map_err(|_| QueryError::AboveMaximum {
        param,
        value: raw.to_string(),
        max: u64::from(u32::MAX),
    })
}
