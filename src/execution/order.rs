//! ORDER BY planning.
//!
//! Translates the order-by column tokens into the table engine's sort keys.
//! Key priority follows the textual order of the list; each key carries its
//! own direction (a trailing `DESC` on that column's token).

use crate::error::Result;
use crate::execution::strip_qualifier;
use crate::sql::Ident;
use crate::table::{SortKey, Table};

/// Stably sort `table` by the listed columns.
pub(crate) fn apply(table: &Table, items: &[Ident]) -> Result<Table> {
    let keys: Vec<SortKey> = items
        .iter()
        .map(|item| SortKey {
            column: strip_qualifier(&item.name).to_string(),
            descending: item.descending,
        })
        .collect();
    table.sort_by(&keys)
}
