//! # Shoal
//!
//! An embeddable SQL `SELECT` engine over in-memory tables.
//!
//! Shoal is not a database: it has no storage, no server, and no DDL/DML.
//! The host application already holds named [`Table`]s in memory; Shoal
//! translates one SQL `SELECT` statement into a sequence of operations over
//! them — projection, predicate filtering, grouping with aggregation,
//! stable ordering, and row limiting — and returns the resulting table.
//!
//! The pipeline is a single synchronous pass: the SQL front-end
//! ([`sql`]) tokenizes the statement, and a grammar-order state machine
//! ([`execution`]) walks the tokens once, applying each clause to the
//! evolving table handle. Every table operation is non-mutating, so source
//! tables are never changed by a query.
//!
//! # Examples
//!
//! ```
//! use std::collections::HashMap;
//! use shoal::{execute_query, Table, Value};
//!
//! let tips = Table::new(
//!     vec!["time".into(), "total_bill".into()],
//!     vec![
//!         vec![Value::Text("Dinner".into()), Value::Real(16.99)],
//!         vec![Value::Text("Lunch".into()), Value::Real(10.34)],
//!         vec![Value::Text("Dinner".into()), Value::Real(21.01)],
//!     ],
//! )
//! .unwrap();
//!
//! let mut tables = HashMap::new();
//! tables.insert("tips".to_string(), tips);
//!
//! let result = execute_query("SELECT * FROM tips WHERE time = 'Dinner'", &tables).unwrap();
//! assert_eq!(result.num_rows(), 2);
//! ```

pub mod error;
pub mod execution;
pub mod sql;
pub mod table;
pub mod types;

pub use error::{Result, ShoalError};
pub use table::Table;
pub use types::Value;

use std::collections::HashMap;

/// Execute one SQL `SELECT` statement against the named tables.
///
/// `tables` maps table names to their in-memory tables; the statement's
/// `FROM` clause picks one of them. The source tables are read-only — the
/// returned table is always a fresh handle.
///
/// # Errors
///
/// Fails with one of the [`ShoalError`] kinds: unparseable SQL, a token
/// outside the SELECT grammar, an unsupported aggregate function or
/// comparison operator, a reference to a missing table or column, or a
/// mistyped literal. No partial results are ever returned.
pub fn execute_query(statement: &str, tables: &HashMap<String, Table>) -> Result<Table> {
    let tokens = sql::tokenize(statement)?;
    execution::execute_select(&tokens, tables, statement)
}
