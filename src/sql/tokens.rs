//! Token model and grouping pass for Shoal's SQL front-end.
//!
//! The scanner in [`super::lexer`] produces a flat stream; this module
//! assembles it into the nested shapes the executor consumes:
//!
//! - dotted names (`tips.total_bill`) merged into one identifier,
//! - `NOT NULL` merged into a single keyword token,
//! - `FUNC(arg)` merged into a function-call token,
//! - a trailing `ASC`/`DESC` attached to the preceding identifier,
//! - comma-separated runs outside WHERE grouped into identifier-lists,
//! - `column OP literal` inside WHERE grouped into comparison tokens,
//! - everything between `WHERE` and the next clause wrapped in a single
//!   WHERE sub-group token.
//!
//! [`tokenize`] runs both passes over the text of exactly one statement.

use std::fmt;

use crate::error::{Result, ShoalError};
use crate::sql::lexer::{Lexer, RawToken};

/// SQL keywords recognised by the scanner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Keyword {
    Select,
    Insert,
    Update,
    Delete,
    Create,
    Drop,
    From,
    Where,
    Group,
    Order,
    By,
    Limit,
    And,
    Or,
    Is,
    Not,
    Null,
    /// Produced by the grouping pass when `NOT` is followed by `NULL`.
    NotNull,
    Asc,
    Desc,
}

impl Keyword {
    /// Whether this keyword opens a statement. Only `SELECT` is executable;
    /// the rest are recognised so they can be rejected with a grammar error
    /// instead of being mistaken for identifiers.
    pub fn is_dml(self) -> bool {
        matches!(
            self,
            Keyword::Select
                | Keyword::Insert
                | Keyword::Update
                | Keyword::Delete
                | Keyword::Create
                | Keyword::Drop
        )
    }
}

/// A comparison operator as scanned from the text.
///
/// `NotEq` is recognised by the lexer so the predicate compiler can reject
/// it with the dedicated unsupported-operator error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CmpOp {
    Eq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,
}

impl fmt::Display for CmpOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let symbol = match self {
            CmpOp::Eq => "=",
            CmpOp::NotEq => "!=",
            CmpOp::Lt => "<",
            CmpOp::LtEq => "<=",
            CmpOp::Gt => ">",
            CmpOp::GtEq => ">=",
        };
        write!(f, "{symbol}")
    }
}

/// A typed literal. The type is fixed by the lexical class alone, never by
/// surrounding context.
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Integer(i64),
    Real(f64),
    Text(String),
}

/// A column reference, possibly qualified (`table.column`), with an
/// optional ordering direction attached by a trailing `DESC`.
#[derive(Debug, Clone, PartialEq)]
pub struct Ident {
    pub name: String,
    pub descending: bool,
}

/// The argument of an aggregate function call.
#[derive(Debug, Clone, PartialEq)]
pub enum FuncArg {
    /// `FUNC(*)`
    Wildcard,
    /// `FUNC(column)`
    Column(String),
}

/// An aggregate function call such as `COUNT(*)` or `AVG(total_bill)`.
#[derive(Debug, Clone, PartialEq)]
pub struct Func {
    pub name: String,
    pub arg: FuncArg,
}

/// One item of an identifier-list: a plain column or a function call.
#[derive(Debug, Clone, PartialEq)]
pub enum SelectItem {
    Column(Ident),
    Function(Func),
}

/// A grouped comparison from a WHERE clause: `column OP literal`.
#[derive(Debug, Clone, PartialEq)]
pub struct Comparison {
    pub column: String,
    pub op: CmpOp,
    pub literal: Literal,
}

/// A structured token as consumed by the grammar state machine.
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    Keyword(Keyword),
    Identifier(Ident),
    IdentifierList(Vec<SelectItem>),
    Function(Func),
    Wildcard,
    Literal(Literal),
    Comparison(Comparison),
    Punctuation(char),
    Whitespace,
    /// The WHERE sub-group: every token between `WHERE` and the next
    /// clause boundary (GROUP/ORDER/LIMIT/`;`/end of input).
    Where(Vec<Token>),
}

/// Tokenize the text of one SELECT statement into structured tokens.
pub fn tokenize(statement: &str) -> Result<Vec<Token>> {
    let raw = Lexer::new(statement).tokenize()?;
    Grouper { raw, pos: 0 }.run()
}

// ---------------------------------------------------------------------------
// Grouping pass
// ---------------------------------------------------------------------------

struct Grouper {
    raw: Vec<RawToken>,
    pos: usize,
}

impl Grouper {
    fn run(mut self) -> Result<Vec<Token>> {
        let mut tokens = Vec::new();
        while let Some(token) = self.next_token(false)? {
            tokens.push(token);
        }
        Ok(tokens)
    }

    fn peek(&self) -> &RawToken {
        self.raw.get(self.pos).unwrap_or(&RawToken::Eof)
    }

    /// Index and value of the next non-whitespace raw token.
    fn peek_past_whitespace(&self) -> (usize, &RawToken) {
        let mut i = self.pos;
        while matches!(self.raw.get(i), Some(RawToken::Whitespace)) {
            i += 1;
        }
        (i, self.raw.get(i).unwrap_or(&RawToken::Eof))
    }

    fn next_token(&mut self, in_where: bool) -> Result<Option<Token>> {
        let token = match self.peek().clone() {
            RawToken::Eof => return Ok(None),
            RawToken::Whitespace => {
                self.pos += 1;
                Token::Whitespace
            }
            RawToken::Keyword(Keyword::Where) if !in_where => {
                self.pos += 1;
                self.read_where_group()?
            }
            RawToken::Keyword(Keyword::Not) => {
                self.pos += 1;
                let (i, next) = self.peek_past_whitespace();
                if matches!(next, RawToken::Keyword(Keyword::Null)) {
                    self.pos = i + 1;
                    Token::Keyword(Keyword::NotNull)
                } else {
                    Token::Keyword(Keyword::Not)
                }
            }
            RawToken::Keyword(kw) => {
                self.pos += 1;
                Token::Keyword(kw)
            }
            RawToken::Identifier(_) => self.read_identifier(in_where)?,
            RawToken::Literal(literal) => {
                self.pos += 1;
                Token::Literal(literal)
            }
            RawToken::Star => {
                self.pos += 1;
                Token::Wildcard
            }
            RawToken::Semicolon => {
                self.pos += 1;
                Token::Punctuation(';')
            }
            RawToken::Op(op) => {
                return Err(ShoalError::InvalidSql(format!(
                    "comparison operator '{op}' has no left-hand column"
                )));
            }
            other => {
                return Err(ShoalError::InvalidSql(format!(
                    "misplaced punctuation: {other:?}"
                )));
            }
        };
        Ok(Some(token))
    }

    fn read_where_group(&mut self) -> Result<Token> {
        let mut body = Vec::new();
        loop {
            match self.peek() {
                RawToken::Eof | RawToken::Semicolon => break,
                RawToken::Keyword(Keyword::Group | Keyword::Order | Keyword::Limit) => break,
                _ => match self.next_token(true)? {
                    Some(token) => body.push(token),
                    None => break,
                },
            }
        }
        Ok(Token::Where(body))
    }

    /// Read an identifier and everything the grouping rules attach to it:
    /// a comparison (inside WHERE), a function call, a direction tag, or a
    /// comma-separated list of further items (outside WHERE).
    fn read_identifier(&mut self, in_where: bool) -> Result<Token> {
        let name = self.read_name()?;

        if in_where {
            let (i, next) = self.peek_past_whitespace();
            if let RawToken::Op(op) = next {
                let op = *op;
                self.pos = i + 1;
                let literal = self.read_literal()?;
                return Ok(Token::Comparison(Comparison {
                    column: name,
                    op,
                    literal,
                }));
            }
        }

        let first = self.finish_item(name)?;

        if !in_where {
            let (i, next) = self.peek_past_whitespace();
            if matches!(next, RawToken::Comma) {
                self.pos = i + 1;
                let mut items = vec![first];
                loop {
                    let name = self.expect_name()?;
                    items.push(self.finish_item(name)?);
                    let (j, next) = self.peek_past_whitespace();
                    if matches!(next, RawToken::Comma) {
                        self.pos = j + 1;
                    } else {
                        break;
                    }
                }
                return Ok(Token::IdentifierList(items));
            }
        }

        Ok(match first {
            SelectItem::Column(ident) => Token::Identifier(ident),
            SelectItem::Function(func) => Token::Function(func),
        })
    }

    /// Read one (possibly dotted) name. The current raw token must be an
    /// identifier.
    fn read_name(&mut self) -> Result<String> {
        let mut name = match self.peek().clone() {
            RawToken::Identifier(name) => {
                self.pos += 1;
                name
            }
            other => {
                return Err(ShoalError::InvalidSql(format!(
                    "expected identifier, got {other:?}"
                )));
            }
        };
        while self.peek() == &RawToken::Dot {
            if let Some(RawToken::Identifier(part)) = self.raw.get(self.pos + 1).cloned() {
                name.push('.');
                name.push_str(&part);
                self.pos += 2;
            } else {
                break;
            }
        }
        Ok(name)
    }

    fn expect_name(&mut self) -> Result<String> {
        let (i, _) = self.peek_past_whitespace();
        self.pos = i;
        self.read_name()
    }

    /// Turn a just-read name into a list item, consuming a function-call
    /// argument list or a trailing direction tag if one follows.
    fn finish_item(&mut self, name: String) -> Result<SelectItem> {
        let (i, next) = self.peek_past_whitespace();
        match next {
            RawToken::LeftParen => {
                self.pos = i + 1;
                let arg = self.read_function_arg()?;
                Ok(SelectItem::Function(Func { name, arg }))
            }
            RawToken::Keyword(Keyword::Asc) => {
                self.pos = i + 1;
                Ok(SelectItem::Column(Ident {
                    name,
                    descending: false,
                }))
            }
            RawToken::Keyword(Keyword::Desc) => {
                self.pos = i + 1;
                Ok(SelectItem::Column(Ident {
                    name,
                    descending: true,
                }))
            }
            _ => Ok(SelectItem::Column(Ident {
                name,
                descending: false,
            })),
        }
    }

    fn read_function_arg(&mut self) -> Result<FuncArg> {
        let (i, next) = self.peek_past_whitespace();
        let arg = match next {
            RawToken::Star => {
                self.pos = i + 1;
                FuncArg::Wildcard
            }
            RawToken::Identifier(_) => {
                self.pos = i;
                FuncArg::Column(self.read_name()?)
            }
            other => {
                return Err(ShoalError::InvalidSql(format!(
                    "expected column or '*' in function call, got {other:?}"
                )));
            }
        };
        let (j, close) = self.peek_past_whitespace();
        if matches!(close, RawToken::RightParen) {
            self.pos = j + 1;
            Ok(arg)
        } else {
            Err(ShoalError::InvalidSql(
                "expected ')' to close function call".into(),
            ))
        }
    }

    fn read_literal(&mut self) -> Result<Literal> {
        let (i, next) = self.peek_past_whitespace();
        if let RawToken::Literal(literal) = next {
            let literal = literal.clone();
            self.pos = i + 1;
            Ok(literal)
        } else {
            Err(ShoalError::InvalidSql(format!(
                "expected literal after comparison operator, got {next:?}"
            )))
        }
    }
}

// ===========================================================================
// Tests
// ===========================================================================
