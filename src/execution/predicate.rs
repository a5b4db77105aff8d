//! WHERE-clause predicate compiler.
//!
//! Folds the tokens of a WHERE sub-group, left to right, into a single
//! boolean mask aligned to the row order of the bound table. The fold
//! state is an explicit accumulator — the mask so far, the pending AND/OR
//! combinator, and the most recently referenced bare column (the subject
//! of a following `IS [NOT] NULL`).

use std::cmp::Ordering;

use crate::error::{Result, ShoalError};
use crate::execution::{literal_value, strip_qualifier, unexpected};
use crate::sql::{CmpOp, Comparison, Keyword, Token};
use crate::table::Table;

/// How the next compiled term joins the mask built so far.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Combine {
    /// No combinator seen yet — only valid for the first term.
    Replace,
    And,
    Or,
}

struct Fold {
    mask: Option<Vec<bool>>,
    pending: Combine,
    column: Option<String>,
}

/// Compile a WHERE sub-group into one boolean per row of `table`.
pub(crate) fn compile(body: &[Token], table: &Table, statement: &str) -> Result<Vec<bool>> {
    let mut fold = Fold {
        mask: None,
        pending: Combine::Replace,
        column: None,
    };

    for token in body {
        match token {
            Token::Whitespace => {}
            Token::Comparison(cmp) => {
                let term = comparison_mask(table, cmp)?;
                apply_term(&mut fold, term, token, statement)?;
            }
            Token::Identifier(ident) => {
                fold.column = Some(ident.name.clone());
            }
            Token::Keyword(Keyword::And) => fold.pending = Combine::And,
            Token::Keyword(Keyword::Or) => fold.pending = Combine::Or,
            // `IS` is a pure separator between a column and its null-check.
            Token::Keyword(Keyword::Is) => {}
            Token::Keyword(Keyword::Null) => {
                let term = null_mask(&fold, table, false, token, statement)?;
                apply_term(&mut fold, term, token, statement)?;
            }
            Token::Keyword(Keyword::NotNull) => {
                let term = null_mask(&fold, table, true, token, statement)?;
                apply_term(&mut fold, term, token, statement)?;
            }
            other => return Err(unexpected(other, statement)),
        }
    }

    match fold.mask {
        Some(mask) => Ok(mask),
        // An empty or term-less WHERE keeps every row.
        None => Ok(vec![true; table.num_rows()]),
    }
}

/// Join a compiled term into the fold with the pending combinator.
///
/// The combinator persists after use, so `a AND b AND c` chains (and the
/// source-compatible `a AND b c`) keep combining with the last one seen. A
/// second term with no combinator ever given is a grammar error.
fn apply_term(fold: &mut Fold, term: Vec<bool>, token: &Token, statement: &str) -> Result<()> {
    fold.mask = Some(match (fold.mask.take(), fold.pending) {
        (None, _) => term,
        (Some(_), Combine::Replace) => return Err(unexpected(token, statement)),
        (Some(mask), Combine::And) => {
            mask.iter().zip(&term).map(|(a, b)| *a && *b).collect()
        }
        (Some(mask), Combine::Or) => {
            mask.iter().zip(&term).map(|(a, b)| *a || *b).collect()
        }
    });
    Ok(())
}

/// Per-row mask for `column OP literal`. NULL cells never satisfy a
/// comparison.
fn comparison_mask(table: &Table, cmp: &Comparison) -> Result<Vec<bool>> {
    let index = table.column_index(strip_qualifier(&cmp.column))?;
    let target = literal_value(&cmp.literal);

    let accepts: fn(Ordering) -> bool = match cmp.op {
        CmpOp::Eq => |o| o == Ordering::Equal,
        CmpOp::Lt => |o| o == Ordering::Less,
        CmpOp::LtEq => |o| o != Ordering::Greater,
        CmpOp::Gt => |o| o == Ordering::Greater,
        CmpOp::GtEq => |o| o != Ordering::Less,
        CmpOp::NotEq => {
            return Err(ShoalError::UnknownComparisonOperator(cmp.op.to_string()));
        }
    };

    Ok(table
        .rows()
        .iter()
        .map(|row| {
            let cell = &row[index];
            !cell.is_null() && accepts(cell.cmp(&target))
        })
        .collect())
}

/// Null / not-null mask over the most recently referenced bare column.
fn null_mask(
    fold: &Fold,
    table: &Table,
    negated: bool,
    token: &Token,
    statement: &str,
) -> Result<Vec<bool>> {
    let column = match &fold.column {
        Some(column) => column,
        None => return Err(unexpected(token, statement)),
    };
    let mask = table.null_mask(strip_qualifier(column))?;
    if negated {
        Ok(mask.iter().map(|is_null| !is_null).collect())
    } else {
        Ok(mask)
    }
}

// ===========================================================================
// Tests
// ===========================================================================
