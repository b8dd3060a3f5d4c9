//! Query layer error types.
//!
//! Every variant is a request validation failure: the query builders refuse
//! to build anything from a descriptor they cannot fully honor.

use thiserror::Error;

/// Errors raised while parsing or building a list query.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum QueryError {
    /// Column is not in the entity's allow-list for this clause.
    #[error("{entity}: unknown {clause} column '{column}'")]
    UnknownColumn {
        entity: &'static str,
        clause: &'static str,
        column: String,
    },

    /// Operation is not valid for the column's type.
    #[error("{entity}: operation '{operation}' is not allowed on column '{column}'")]
    OperationNotAllowed {
        entity: &'static str,
        column: String,
        operation: String,
    },

    /// Filter value has the wrong JSON type for the column.
    #[error("{entity}: column '{column}' expects a {expected} value")]
    InvalidValue {
        entity: &'static str,
        column: String,
        expected: &'static str,
    },

    /// A JSON-encoded request parameter did not parse.
    #[error("{param} parameter is not valid JSON: {details}")]
    InvalidJson {
        param: &'static str,
        details: String,
    },

    /// A numeric parameter is not a number.
    #[error("{param} parameter is not a valid number: \"{value}\"")]
    NotANumber { param: &'static str, value: String },

    /// A numeric parameter is not an integer.
    #[error("{param} parameter is not an integer: \"{value}\"")]
    NotAnInteger { param: &'static str, value: String },

    /// A numeric parameter is zero or negative.
    #[error("{param} parameter is not a positive integer: \"{value}\"")]
    NotPositive { param: &'static str, value: String },

    /// A numeric parameter exceeds its maximum.
    #[error("{param} parameter value \"{value}\" is greater than the allowed maximum ({max})")]
    AboveMaximum {
        param: &'static str,
        value: String,
        max: u64,
    },
}
