//! GROUP BY aggregation planning.
//!
//! Maps the aggregate function calls collected from the column list onto
//! the table engine's reductions: one [`ReduceOp`] per requested aggregate,
//! then a single group-and-reduce call.

use crate::error::{Result, ShoalError};
use crate::execution::strip_qualifier;
use crate::sql::{Func, FuncArg};
use crate::table::{ReduceOp, Reduction, Table};

/// The closed set of supported aggregate functions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AggregateFn {
    Avg,
    Count,
}

impl AggregateFn {
    /// Resolve a function name, case-insensitively. Unknown names are fatal.
    fn parse(name: &str) -> Result<Self> {
        match name.to_ascii_uppercase().as_str() {
            "AVG" => Ok(AggregateFn::Avg),
            "COUNT" => Ok(AggregateFn::Count),
            _ => Err(ShoalError::UnknownFunction(name.to_string())),
        }
    }

    fn reduction(self) -> Reduction {
        match self {
            AggregateFn::Avg => Reduction::Mean,
            AggregateFn::Count => Reduction::Count,
        }
    }
}

/// One requested aggregate: the function, its source column (`None` for a
/// wildcard argument), and the label of the output column.
#[derive(Debug, Clone)]
pub struct AggregateSpec {
    func: AggregateFn,
    column: Option<String>,
    label: String,
}

impl AggregateSpec {
    /// Build a spec from a function-call token.
    pub(crate) fn from_call(call: &Func) -> Result<Self> {
        let func = AggregateFn::parse(&call.name)?;
        let (column, arg_text) = match &call.arg {
            FuncArg::Wildcard => (None, "*".to_string()),
            FuncArg::Column(name) => {
                let name = strip_qualifier(name).to_string();
                (Some(name.clone()), name)
            }
        };
        let label = format!("{}({})", call.name.to_ascii_uppercase(), arg_text);
        Ok(AggregateSpec {
            func,
            column,
            label,
        })
    }
}

/// Group `table` by `keys` and reduce each group with the collected specs.
///
/// A wildcard argument resolves to the first group-by column as the count
/// target — or, when grouping the whole table (`keys` empty), to the
/// table's first column.
pub(crate) fn apply(table: &Table, keys: &[String], specs: &[AggregateSpec]) -> Result<Table> {
    let fallback = keys
        .first()
        .cloned()
        .or_else(|| table.columns().first().cloned());

    let mut ops = Vec::with_capacity(specs.len());
    for spec in specs {
        let source = match &spec.column {
            Some(column) => column.clone(),
            None => fallback.clone().ok_or_else(|| {
                ShoalError::Internal("aggregate over a table with no columns".into())
            })?,
        };
        ops.push(ReduceOp {
            source,
            reduction: spec.func.reduction(),
            label: spec.label.clone(),
        });
    }

    table.group_by(keys, &ops)
}

// ===========================================================================
// Tests
// ===========================================================================
