//! In-memory table engine for Shoal.
//!
//! A [`Table`] is a set of named columns over an ordered sequence of rows,
//! stored row-major. Every operation is non-mutating: clause handlers treat
//! tables as immutable value-like handles and receive a fresh table from
//! each transformation (projection, boolean-mask selection, grouping with
//! reductions, stable multi-key sorting, head-truncation).

use std::cmp::Ordering;

use crate::error::{Result, ShoalError};
use crate::types::Value;

/// A reduction applied to one column within each group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reduction {
    /// Arithmetic mean of the column's non-NULL values.
    Mean,
    /// Number of rows in the group.
    Count,
}

impl Reduction {
    fn reduce<'a, I>(&self, values: I) -> Result<Value>
    where
        I: Iterator<Item = &'a Value>,
    {
        match self {
            Reduction::Count => Ok(Value::Integer(values.count() as i64)),
            Reduction::Mean => {
                let mut sum = 0.0;
                let mut count = 0usize;
                for value in values {
                    match value {
                        Value::Integer(i) => {
                            sum += *i as f64;
                            count += 1;
                        }
                        Value::Real(r) => {
                            sum += r;
                            count += 1;
                        }
                        Value::Null => {}
                        Value::Text(_) => {
                            return Err(ShoalError::TypeError(
                                "cannot average a text column".into(),
                            ));
                        }
                    }
                }
                if count == 0 {
                    Ok(Value::Null)
                } else {
                    Ok(Value::Real(sum / count as f64))
                }
            }
        }
    }
}

/// One reduction request for [`Table::group_by`]: reduce `source` with
/// `reduction` and expose the result under the `label` column.
#[derive(Debug, Clone)]
pub struct ReduceOp {
    pub source: String,
    pub reduction: Reduction,
    pub label: String,
}

/// One key of a multi-key sort.
#[derive(Debug, Clone)]
pub struct SortKey {
    pub column: String,
    pub descending: bool,
}

/// An in-memory table: named columns over an ordered sequence of rows.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Vec<Value>>,
}

impl Table {
    /// Create a table from column names and rows.
    ///
    /// Every row must have exactly one value per column.
    pub fn new(columns: Vec<String>, rows: Vec<Vec<Value>>) -> Result<Self> {
        for (i, row) in rows.iter().enumerate() {
            if row.len() != columns.len() {
                return Err(ShoalError::Internal(format!(
                    "row {} has {} values but the table has {} columns",
                    i,
                    row.len(),
                    columns.len()
                )));
            }
        }
        Ok(Table { columns, rows })
    }

    /// The column names, in order.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// The rows, in order.
    pub fn rows(&self) -> &[Vec<Value>] {
        &self.rows
    }

    pub fn num_rows(&self) -> usize {
        self.rows.len()
    }

    pub fn num_columns(&self) -> usize {
        self.columns.len()
    }

    /// Position of a column by name.
    ///
    /// # Errors
    ///
    /// Returns [`ShoalError::ColumnNotFound`] if the table has no column
    /// with that name.
    pub fn column_index(&self, name: &str) -> Result<usize> {
        self.columns
            .iter()
            .position(|c| c == name)
            .ok_or_else(|| ShoalError::ColumnNotFound(name.to_string()))
    }

    /// A new table containing only the named columns, in request order.
    pub fn project(&self, columns: &[String]) -> Result<Table> {
        let indexes: Vec<usize> = columns
            .iter()
            .map(|name| self.column_index(name))
            .collect::<Result<_>>()?;
        let rows = self
            .rows
            .iter()
            .map(|row| indexes.iter().map(|&i| row[i].clone()).collect())
            .collect();
        Ok(Table {
            columns: columns.to_vec(),
            rows,
        })
    }

    /// A new table containing the rows whose mask entry is `true`.
    ///
    /// The mask must carry exactly one boolean per row.
    pub fn filter(&self, mask: &[bool]) -> Result<Table> {
        if mask.len() != self.rows.len() {
            return Err(ShoalError::Internal(format!(
                "row mask has {} entries for {} rows",
                mask.len(),
                self.rows.len()
            )));
        }
        let rows = self
            .rows
            .iter()
            .zip(mask)
            .filter(|(_, keep)| **keep)
            .map(|(row, _)| row.clone())
            .collect();
        Ok(Table {
            columns: self.columns.clone(),
            rows,
        })
    }

    /// Per-row null test for one column: `true` where the cell is NULL.
    pub fn null_mask(&self, column: &str) -> Result<Vec<bool>> {
        let index = self.column_index(column)?;
        Ok(self.rows.iter().map(|row| row[index].is_null()).collect())
    }

    /// Group rows by the distinct value tuples of `keys` and reduce each
    /// group with `ops`.
    ///
    /// The result has one row per distinct key tuple, in first-appearance
    /// order; its columns are the key columns followed by one labeled
    /// column per reduction. With an empty `keys` list the whole table
    /// forms a single group (and an empty table yields no rows).
    pub fn group_by(&self, keys: &[String], ops: &[ReduceOp]) -> Result<Table> {
        let key_indexes: Vec<usize> = keys
            .iter()
            .map(|name| self.column_index(name))
            .collect::<Result<_>>()?;
        let op_indexes: Vec<usize> = ops
            .iter()
            .map(|op| self.column_index(&op.source))
            .collect::<Result<_>>()?;

        // Vec-keyed grouping keeps first-appearance order; group counts are
        // small enough that the linear key lookup is not a concern here.
        let mut groups: Vec<(Vec<Value>, Vec<usize>)> = Vec::new();
        for (row_index, row) in self.rows.iter().enumerate() {
            let key: Vec<Value> = key_indexes.iter().map(|&i| row[i].clone()).collect();
            match groups.iter_mut().find(|(k, _)| *k == key) {
                Some((_, members)) => members.push(row_index),
                None => groups.push((key, vec![row_index])),
            }
        }

        let mut columns = keys.to_vec();
        columns.extend(ops.iter().map(|op| op.label.clone()));

        let mut rows = Vec::with_capacity(groups.len());
        for (key, members) in groups {
            let mut row = key;
            for (op, &col) in ops.iter().zip(&op_indexes) {
                let values = members.iter().map(|&r| &self.rows[r][col]);
                row.push(op.reduction.reduce(values)?);
            }
            rows.push(row);
        }

        Ok(Table { columns, rows })
    }

    /// A new table with rows stably sorted by the given keys.
    ///
    /// Key priority follows the order of `keys`; each key carries its own
    /// direction. Ties preserve the original relative row order.
    pub fn sort_by(&self, keys: &[SortKey]) -> Result<Table> {
        let indexes: Vec<usize> = keys
            .iter()
            .map(|key| self.column_index(&key.column))
            .collect::<Result<_>>()?;

        let mut rows = self.rows.clone();
        rows.sort_by(|a, b| {
            for (key, &i) in keys.iter().zip(&indexes) {
                let cmp = a[i].cmp(&b[i]);
                let cmp = if key.descending { cmp.reverse() } else { cmp };
                if cmp != Ordering::Equal {
                    return cmp;
                }
            }
            Ordering::Equal
        });

        Ok(Table {
            columns: self.columns.clone(),
            rows,
        })
    }

    /// A new table containing the first `min(n, num_rows)` rows.
    pub fn head(&self, n: usize) -> Table {
        Table {
            columns: self.columns.clone(),
            rows: self.rows.iter().take(n).cloned().collect(),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
