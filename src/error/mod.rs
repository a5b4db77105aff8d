//! Unified error handling for Shoal.
//!
//! This module defines [`ShoalError`], the single error type propagated
//! through every layer of the engine — from the tokenizer, through the
//! clause handlers, up to the public [`execute_query`](crate::execute_query)
//! entry point.
//!
//! A convenience [`Result<T>`] type alias is re-exported so that callers can
//! write `Result<T>` instead of `std::result::Result<T, ShoalError>`.

use std::fmt;

/// The canonical error type for all Shoal operations.
///
/// Every failure aborts the current query immediately; there are no retries
/// and no partial results. Variants are organised by failure category so
/// that callers can match on the kind without inspecting free-form strings.
#[derive(Debug)]
pub enum ShoalError {
    /// The SQL text could not be tokenized, or the statement is structurally
    /// incomplete (e.g. it has no `FROM` clause, or a dangling `LIMIT`).
    InvalidSql(String),

    /// A token arrived in a grammar state that does not expect it, or the
    /// clauses appear out of the one legal SELECT order. Carries the
    /// offending token and the full statement text for diagnosis.
    UnexpectedToken {
        /// Rendered form of the token that broke the grammar.
        token: String,
        /// The complete statement being executed.
        statement: String,
    },

    /// A literal fits none of the supported lexical classes
    /// (string / integer / float) — e.g. a number too large for `i64`.
    UnknownLiteral(String),

    /// An aggregate function name outside the supported set (`AVG`, `COUNT`).
    UnknownFunction(String),

    /// A comparison operator outside the supported set `= > >= < <=`.
    UnknownComparisonOperator(String),

    /// A value has the wrong type for the requested operation, such as
    /// averaging a text column or a non-integer `LIMIT` count.
    TypeError(String),

    /// The referenced column does not exist on the current table.
    ColumnNotFound(String),

    /// The `FROM` clause names a table absent from the supplied table set.
    TableNotFound(String),

    /// An internal invariant was violated. This indicates a bug in the
    /// engine itself and should be reported.
    Internal(String),
}

impl fmt::Display for ShoalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShoalError::InvalidSql(msg) => write!(f, "invalid SQL: {msg}"),
            ShoalError::UnexpectedToken { token, statement } => {
                write!(f, "unexpected token {token} in statement: {statement}")
            }
            ShoalError::UnknownLiteral(msg) => write!(f, "unknown literal: {msg}"),
            ShoalError::UnknownFunction(name) => {
                write!(f, "unknown aggregate function: {name}")
            }
            ShoalError::UnknownComparisonOperator(op) => {
                write!(f, "unknown comparison operator: {op}")
            }
            ShoalError::TypeError(msg) => write!(f, "type error: {msg}"),
            ShoalError::ColumnNotFound(name) => write!(f, "column not found: {name}"),
            ShoalError::TableNotFound(name) => write!(f, "table not found: {name}"),
            ShoalError::Internal(msg) => write!(f, "internal error: {msg}"),
        }
    }
}

impl std::error::Error for ShoalError {}

/// A specialised [`Result`] type for Shoal operations.
pub type Result<T> = std::result::Result<T, ShoalError>;
