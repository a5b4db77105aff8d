//! Query execution for Shoal.
//!
//! The heart of the crate: [`SelectExecutor`], a grammar-order state
//! machine that walks the structured token stream of one SELECT statement
//! exactly once, left to right. Each token is dispatched against the
//! current [`Clause`] state; clause handlers apply their transformation to
//! the evolving table handle as the tokens arrive, so by the end of the
//! stream the final table is already built:
//!
//! ```text
//! source → projected/filtered → grouped-or-not → ordered-or-not → limited-or-not
//! ```
//!
//! Any (state, token) pair outside the grammar is a hard error carrying
//! the offending token and the full statement text. The clause handlers
//! themselves live in the submodules: [`predicate`] (WHERE), [`aggregate`]
//! (GROUP BY), and [`order`] (ORDER BY).

pub mod aggregate;
pub mod order;
pub mod predicate;

use std::collections::HashMap;

use crate::error::{Result, ShoalError};
use crate::execution::aggregate::AggregateSpec;
use crate::sql::{Ident, Keyword, Literal, SelectItem, Token};
use crate::table::Table;
use crate::types::Value;

/// The grammar states, in the one legal SELECT clause order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Clause {
    Select,
    Columns,
    Table,
    Group,
    Order,
    Limit,
    End,
}

/// Execute one SELECT statement's token stream against the named tables.
pub fn execute_select(
    tokens: &[Token],
    tables: &HashMap<String, Table>,
    statement: &str,
) -> Result<Table> {
    let mut executor = SelectExecutor::new(tables, statement);
    for token in tokens {
        executor.feed(token)?;
    }
    executor.finish()
}

/// The grammar state machine for one SELECT statement.
///
/// All state lives for exactly one call: the clause position, the evolving
/// table handle, and the projection/aggregate specs gathered from the
/// column list before the table is bound.
pub struct SelectExecutor<'a> {
    tables: &'a HashMap<String, Table>,
    statement: &'a str,
    state: Clause,
    table: Option<Table>,
    projection: Vec<String>,
    aggregates: Vec<AggregateSpec>,
    grouped: bool,
    ordered: bool,
    limited: bool,
}

impl<'a> SelectExecutor<'a> {
    pub fn new(tables: &'a HashMap<String, Table>, statement: &'a str) -> Self {
        SelectExecutor {
            tables,
            statement,
            state: Clause::Select,
            table: None,
            projection: Vec::new(),
            aggregates: Vec::new(),
            grouped: false,
            ordered: false,
            limited: false,
        }
    }

    /// Dispatch one token against the current grammar state.
    pub fn feed(&mut self, token: &Token) -> Result<()> {
        if matches!(token, Token::Whitespace) {
            return Ok(());
        }

        match (self.state, token) {
            (Clause::End, _) => Err(self.unexpected(token)),

            // A statement-opening keyword is only ever legal as the very
            // first token, and only if it is SELECT.
            (state, Token::Keyword(kw)) if kw.is_dml() => {
                if *kw == Keyword::Select && state == Clause::Select {
                    self.state = Clause::Columns;
                    Ok(())
                } else {
                    Err(self.unexpected(token))
                }
            }

            // ----- column list -----
            (Clause::Columns, Token::Wildcard) => Ok(()),
            (Clause::Columns, Token::Identifier(ident)) => {
                self.projection = vec![ident.name.clone()];
                Ok(())
            }
            (Clause::Columns, Token::Function(call)) => {
                self.aggregates.push(AggregateSpec::from_call(call)?);
                Ok(())
            }
            (Clause::Columns, Token::IdentifierList(items)) => {
                for item in items {
                    match item {
                        SelectItem::Column(ident) => self.projection.push(ident.name.clone()),
                        SelectItem::Function(call) => {
                            self.aggregates.push(AggregateSpec::from_call(call)?);
                        }
                    }
                }
                Ok(())
            }
            (Clause::Columns, Token::Keyword(Keyword::From)) => {
                self.state = Clause::Table;
                Ok(())
            }

            // ----- FROM table -----
            (Clause::Table, Token::Identifier(ident)) if self.table.is_none() => {
                self.bind_table(&ident.name)
            }

            // ----- WHERE -----
            (Clause::Table, Token::Where(body)) if self.table.is_some() => {
                let table = self.take_table()?;
                let mask = predicate::compile(body, &table, self.statement)?;
                self.table = Some(table.filter(&mask)?);
                Ok(())
            }

            // ----- GROUP BY -----
            (Clause::Table, Token::Keyword(Keyword::Group)) if self.table.is_some() => {
                self.state = Clause::Group;
                Ok(())
            }
            (Clause::Group | Clause::Order, Token::Keyword(Keyword::By)) => Ok(()),
            (Clause::Group, Token::Identifier(_) | Token::IdentifierList(_)) if !self.grouped => {
                let keys = column_names(token, self.statement)?;
                let table = self.take_table()?;
                self.table = Some(aggregate::apply(&table, &keys, &self.aggregates)?);
                self.grouped = true;
                Ok(())
            }

            // ----- ORDER BY -----
            (Clause::Table | Clause::Group, Token::Keyword(Keyword::Order))
                if self.table.is_some() =>
            {
                self.state = Clause::Order;
                Ok(())
            }
            (Clause::Order, Token::Identifier(_) | Token::IdentifierList(_)) if !self.ordered => {
                let items = order_items(token, self.statement)?;
                let table = self.take_table()?;
                self.table = Some(order::apply(&table, &items)?);
                self.ordered = true;
                Ok(())
            }

            // ----- LIMIT -----
            (Clause::Table | Clause::Group | Clause::Order, Token::Keyword(Keyword::Limit))
                if self.table.is_some() =>
            {
                self.state = Clause::Limit;
                Ok(())
            }
            (Clause::Limit, Token::Literal(literal)) if !self.limited => {
                let count = limit_count(literal)?;
                let table = self.take_table()?;
                self.table = Some(table.head(count));
                self.limited = true;
                Ok(())
            }

            // ----- statement terminator -----
            (Clause::Table | Clause::Group | Clause::Order, Token::Punctuation(_))
                if self.table.is_some() =>
            {
                self.state = Clause::End;
                Ok(())
            }
            (Clause::Limit, Token::Punctuation(_)) if self.limited => {
                self.state = Clause::End;
                Ok(())
            }

            _ => Err(self.unexpected(token)),
        }
    }

    /// Consume the machine and return the final table.
    pub fn finish(mut self) -> Result<Table> {
        if self.state == Clause::Limit && !self.limited {
            return Err(ShoalError::InvalidSql("LIMIT clause has no row count".into()));
        }
        let table = match self.table.take() {
            Some(table) => table,
            None => {
                return Err(ShoalError::InvalidSql(
                    "statement has no FROM clause".into(),
                ));
            }
        };
        // Aggregates requested without GROUP BY reduce the whole table as a
        // single group.
        if !self.aggregates.is_empty() && !self.grouped {
            return aggregate::apply(&table, &[], &self.aggregates);
        }
        Ok(table)
    }

    /// Bind the source table by name and, when plain columns were requested
    /// without aggregates, narrow it to those columns immediately.
    fn bind_table(&mut self, name: &str) -> Result<()> {
        let source = self
            .tables
            .get(name)
            .ok_or_else(|| ShoalError::TableNotFound(name.to_string()))?;
        let table = if !self.projection.is_empty() && self.aggregates.is_empty() {
            let columns: Vec<String> = self
                .projection
                .iter()
                .map(|column| strip_qualifier(column).to_string())
                .collect();
            source.project(&columns)?
        } else {
            source.clone()
        };
        self.table = Some(table);
        Ok(())
    }

    fn take_table(&mut self) -> Result<Table> {
        self.table
            .take()
            .ok_or_else(|| ShoalError::Internal("no table bound".into()))
    }

    fn unexpected(&self, token: &Token) -> ShoalError {
        unexpected(token, self.statement)
    }
}

// ---------------------------------------------------------------------------
// Helpers shared by the clause handlers
// ---------------------------------------------------------------------------

pub(crate) fn unexpected(token: &Token, statement: &str) -> ShoalError {
    ShoalError::UnexpectedToken {
        token: format!("{token:?}"),
        statement: statement.to_string(),
    }
}

/// Strip an optional `table.` qualifier from a column reference.
///
/// The qualifier is discarded without checking it names the bound table.
pub(crate) fn strip_qualifier(name: &str) -> &str {
    match name.split_once('.') {
        Some((_, column)) => column,
        None => name,
    }
}

/// Convert a typed literal into a table value.
pub(crate) fn literal_value(literal: &Literal) -> Value {
    match literal {
        Literal::Integer(i) => Value::Integer(*i),
        Literal::Real(r) => Value::Real(*r),
        Literal::Text(s) => Value::Text(s.clone()),
    }
}

/// Coerce the LIMIT literal to a row count.
fn limit_count(literal: &Literal) -> Result<usize> {
    match literal {
        Literal::Integer(n) if *n >= 0 => Ok(*n as usize),
        Literal::Integer(n) => Err(ShoalError::InvalidSql(format!(
            "LIMIT row count cannot be negative: {n}"
        ))),
        other => Err(ShoalError::TypeError(format!(
            "LIMIT expects an integer literal, got {other:?}"
        ))),
    }
}

/// The column items of a GROUP BY / ORDER BY token. Function calls are not
/// legal there.
fn order_items(token: &Token, statement: &str) -> Result<Vec<Ident>> {
    match token {
        Token::Identifier(ident) => Ok(vec![ident.clone()]),
        Token::IdentifierList(items) => items
            .iter()
            .map(|item| match item {
                SelectItem::Column(ident) => Ok(ident.clone()),
                SelectItem::Function(_) => Err(unexpected(token, statement)),
            })
            .collect(),
        other => Err(unexpected(other, statement)),
    }
}

fn column_names(token: &Token, statement: &str) -> Result<Vec<String>> {
    Ok(order_items(token, statement)?
        .into_iter()
        .map(|ident| strip_qualifier(&ident.name).to_string())
        .collect())
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sql;

    fn tables() -> HashMap<String, Table> {
        let t = Table::new(
            vec!["id".into(), "kind".into()],
            vec![
                vec![Value::Integer(1), Value::Text("a".into())],
                vec![Value::Integer(2), Value::Text("b".into())],
                vec![Value::Integer(3), Value::Text("a".into())],
            ],
        )
        .unwrap();
        let mut map = HashMap::new();
        map.insert("t".to_string(), t);
        map
    }

    fn run(statement: &str) -> Result<Table> {
        let tokens = sql::tokenize(statement)?;
        execute_select(&tokens, &tables(), statement)
    }

    #[test]
    fn select_star_passes_the_table_through() {
        let result = run("SELECT * FROM t").unwrap();
        assert_eq!(result.num_rows(), 3);
        assert_eq!(result.num_columns(), 2);
    }

    #[test]
    fn projection_narrows_at_bind_time() {
        let result = run("SELECT kind FROM t").unwrap();
        assert_eq!(result.columns(), &["kind".to_string()]);
        assert_eq!(result.num_rows(), 3);
    }

    #[test]
    fn missing_table_is_fatal() {
        assert!(matches!(
            run("SELECT * FROM nope"),
            Err(ShoalError::TableNotFound(name)) if name == "nope"
        ));
    }

    #[test]
    fn statement_without_from_is_fatal() {
        assert!(matches!(
            run("SELECT *"),
            Err(ShoalError::InvalidSql(_))
        ));
    }

    #[test]
    fn non_select_statements_are_rejected() {
        assert!(matches!(
            run("INSERT t"),
            Err(ShoalError::UnexpectedToken { .. })
        ));
        assert!(matches!(
            run("DROP t"),
            Err(ShoalError::UnexpectedToken { .. })
        ));
    }

    #[test]
    fn select_twice_is_rejected() {
        assert!(matches!(
            run("SELECT SELECT * FROM t"),
            Err(ShoalError::UnexpectedToken { .. })
        ));
    }

    #[test]
    fn tokens_after_terminator_are_rejected() {
        assert!(matches!(
            run("SELECT * FROM t; LIMIT 1"),
            Err(ShoalError::UnexpectedToken { .. })
        ));
    }

    #[test]
    fn clauses_out_of_order_are_rejected() {
        // ORDER BY cannot precede GROUP BY.
        assert!(matches!(
            run("SELECT * FROM t ORDER BY id GROUP BY kind"),
            Err(ShoalError::UnexpectedToken { .. })
        ));
        // WHERE cannot follow LIMIT.
        assert!(matches!(
            run("SELECT * FROM t LIMIT 2 WHERE id = 1"),
            Err(ShoalError::UnexpectedToken { .. })
        ));
    }

    #[test]
    fn limit_requires_a_row_count() {
        assert!(matches!(
            run("SELECT * FROM t LIMIT"),
            Err(ShoalError::InvalidSql(_))
        ));
    }

    #[test]
    fn limit_rejects_non_integer_counts() {
        assert!(matches!(
            run("SELECT * FROM t LIMIT 2.5"),
            Err(ShoalError::TypeError(_))
        ));
        assert!(matches!(
            run("SELECT * FROM t LIMIT -1"),
            Err(ShoalError::InvalidSql(_))
        ));
    }

    #[test]
    fn limit_truncates_after_prior_clauses() {
        let result = run("SELECT * FROM t WHERE kind = 'a' LIMIT 1").unwrap();
        assert_eq!(result.num_rows(), 1);
        assert_eq!(result.rows()[0][0], Value::Integer(1));
    }

    #[test]
    fn group_by_drives_the_aggregation_planner() {
        let result = run("SELECT kind, COUNT(*) FROM t GROUP BY kind").unwrap();
        assert_eq!(
            result.columns(),
            &["kind".to_string(), "COUNT(*)".to_string()]
        );
        assert_eq!(result.num_rows(), 2);
    }

    #[test]
    fn aggregates_without_group_by_reduce_the_whole_table() {
        let result = run("SELECT COUNT(*) FROM t").unwrap();
        assert_eq!(result.columns(), &["COUNT(*)".to_string()]);
        assert_eq!(result.rows(), &[vec![Value::Integer(3)]]);
    }

    #[test]
    fn order_by_desc_then_limit() {
        let result = run("SELECT * FROM t ORDER BY id DESC LIMIT 2").unwrap();
        assert_eq!(result.rows()[0][0], Value::Integer(3));
        assert_eq!(result.rows()[1][0], Value::Integer(2));
    }

    #[test]
    fn qualified_projection_is_stripped_unvalidated() {
        // The qualifier is discarded without being checked, so even a
        // qualifier that is not the bound table's name resolves.
        let result = run("SELECT other.kind FROM t").unwrap();
        assert_eq!(result.columns(), &["kind".to_string()]);
    }

    #[test]
    fn strip_qualifier_splits_once() {
        assert_eq!(strip_qualifier("tips.total_bill"), "total_bill");
        assert_eq!(strip_qualifier("total_bill"), "total_bill");
        assert_eq!(strip_qualifier("a.b.c"), "b.c");
    }

    #[test]
    fn literal_values_map_by_lexical_class() {
        assert_eq!(literal_value(&Literal::Integer(7)), Value::Integer(7));
        assert_eq!(literal_value(&Literal::Real(1.5)), Value::Real(1.5));
        assert_eq!(
            literal_value(&Literal::Text("x".into())),
            Value::Text("x".into())
        );
    }
}
