//! Hand-written SQL scanner for Shoal.
//!
//! The [`Lexer`] takes the raw text of one SELECT statement and produces a
//! flat `Vec<RawToken>`. It is case-insensitive for keywords and handles
//! string literals in single or double quotes, integer and real literals
//! (including leading-dot, exponent, and unary-minus forms), comparison
//! operators, and punctuation. Whitespace runs are coalesced into single
//! tokens so the downstream grouping pass can carry them through.

use crate::error::{Result, ShoalError};
use crate::sql::tokens::{CmpOp, Keyword, Literal};

/// A single flat token as scanned from the input text.
///
/// Raw tokens are an intermediate form: the grouping pass in
/// [`super::tokens`] assembles them into the nested token shapes the
/// executor consumes.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum RawToken {
    Keyword(Keyword),
    Identifier(String),
    Literal(Literal),
    Op(CmpOp),
    Star,
    Comma,
    Semicolon,
    Dot,
    LeftParen,
    RightParen,
    Whitespace,
    Eof,
}

fn keyword_token(word: &str) -> Option<Keyword> {
    // The input `word` is already uppercased by the caller.
    match word {
        "SELECT" => Some(Keyword::Select),
        "INSERT" => Some(Keyword::Insert),
        "UPDATE" => Some(Keyword::Update),
        "DELETE" => Some(Keyword::Delete),
        "CREATE" => Some(Keyword::Create),
        "DROP" => Some(Keyword::Drop),
        "FROM" => Some(Keyword::From),
        "WHERE" => Some(Keyword::Where),
        "GROUP" => Some(Keyword::Group),
        "ORDER" => Some(Keyword::Order),
        "BY" => Some(Keyword::By),
        "LIMIT" => Some(Keyword::Limit),
        "AND" => Some(Keyword::And),
        "OR" => Some(Keyword::Or),
        "IS" => Some(Keyword::Is),
        "NOT" => Some(Keyword::Not),
        "NULL" => Some(Keyword::Null),
        "ASC" => Some(Keyword::Asc),
        "DESC" => Some(Keyword::Desc),
        _ => None,
    }
}

/// A hand-written scanner over one statement's text.
///
/// Create one with [`Lexer::new`], then call [`Lexer::tokenize`] to obtain
/// the full raw token stream (terminated by [`RawToken::Eof`]).
pub(crate) struct Lexer<'a> {
    input: &'a [u8],
    pos: usize,
}

impl<'a> Lexer<'a> {
    pub(crate) fn new(input: &'a str) -> Self {
        Lexer {
            input: input.as_bytes(),
            pos: 0,
        }
    }

    /// Tokenize the entire input and return the raw token list.
    pub(crate) fn tokenize(&mut self) -> Result<Vec<RawToken>> {
        let mut tokens = Vec::new();
        loop {
            let tok = self.next_token()?;
            let is_eof = tok == RawToken::Eof;
            tokens.push(tok);
            if is_eof {
                break;
            }
        }
        Ok(tokens)
    }

    // -- helpers ------------------------------------------------------------

    fn peek(&self) -> Option<u8> {
        self.input.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<u8> {
        self.input.get(self.pos + offset).copied()
    }

    fn advance(&mut self) -> Option<u8> {
        let ch = self.input.get(self.pos).copied()?;
        self.pos += 1;
        Some(ch)
    }

    // -- main scanner -------------------------------------------------------

    fn next_token(&mut self) -> Result<RawToken> {
        let ch = match self.peek() {
            Some(c) => c,
            None => return Ok(RawToken::Eof),
        };

        // ----- whitespace (coalesced into one token) -----
        if ch.is_ascii_whitespace() {
            while self.peek().map_or(false, |c| c.is_ascii_whitespace()) {
                self.pos += 1;
            }
            return Ok(RawToken::Whitespace);
        }

        // ----- string literal, single or double quoted -----
        if ch == b'\'' || ch == b'"' {
            return self.read_string_literal(ch);
        }

        // ----- numeric literal, including `.5` and `-3` forms -----
        if ch.is_ascii_digit() {
            return self.read_number();
        }
        if ch == b'.' && self.peek_at(1).map_or(false, |c| c.is_ascii_digit()) {
            return self.read_number();
        }
        if ch == b'-'
            && self.peek_at(1).map_or(false, |c| {
                c.is_ascii_digit()
                    || (c == b'.' && self.peek_at(2).map_or(false, |d| d.is_ascii_digit()))
            })
        {
            return self.read_number();
        }

        // ----- identifier / keyword -----
        if ch.is_ascii_alphabetic() || ch == b'_' {
            return self.read_identifier_or_keyword();
        }

        // ----- operators & punctuation -----
        self.read_operator()
    }

    // -- literal readers ----------------------------------------------------

    fn read_string_literal(&mut self, quote: u8) -> Result<RawToken> {
        self.advance(); // consume opening quote
        let mut s = String::new();
        loop {
            match self.advance() {
                None => {
                    return Err(ShoalError::InvalidSql(
                        "unterminated string literal".into(),
                    ));
                }
                Some(c) if c == quote => {
                    // A doubled quote escapes itself.
                    if self.peek() == Some(quote) {
                        self.advance();
                        s.push(quote as char);
                    } else {
                        break;
                    }
                }
                Some(c) => {
                    s.push(c as char);
                }
            }
        }
        Ok(RawToken::Literal(Literal::Text(s)))
    }

    fn read_number(&mut self) -> Result<RawToken> {
        let start = self.pos;
        let mut is_real = false;

        if self.peek() == Some(b'-') {
            self.advance();
        }

        // Integer part
        while self.peek().map_or(false, |c| c.is_ascii_digit()) {
            self.advance();
        }

        // Fractional part
        if self.peek() == Some(b'.') {
            is_real = true;
            self.advance();
            while self.peek().map_or(false, |c| c.is_ascii_digit()) {
                self.advance();
            }
        }

        // Exponent part
        if self.peek() == Some(b'e') || self.peek() == Some(b'E') {
            is_real = true;
            self.advance();
            if self.peek() == Some(b'+') || self.peek() == Some(b'-') {
                self.advance();
            }
            if !self.peek().map_or(false, |c| c.is_ascii_digit()) {
                return Err(ShoalError::InvalidSql(
                    "invalid numeric literal: expected digit after exponent".into(),
                ));
            }
            while self.peek().map_or(false, |c| c.is_ascii_digit()) {
                self.advance();
            }
        }

        let text = std::str::from_utf8(&self.input[start..self.pos])
            .map_err(|_| ShoalError::Internal("non-UTF-8 numeric literal".into()))?;

        if is_real {
            let val: f64 = text
                .parse()
                .map_err(|_| ShoalError::UnknownLiteral(text.to_string()))?;
            Ok(RawToken::Literal(Literal::Real(val)))
        } else {
            let val: i64 = text
                .parse()
                .map_err(|_| ShoalError::UnknownLiteral(text.to_string()))?;
            Ok(RawToken::Literal(Literal::Integer(val)))
        }
    }

    fn read_identifier_or_keyword(&mut self) -> Result<RawToken> {
        let start = self.pos;
        while self
            .peek()
            .map_or(false, |c| c.is_ascii_alphanumeric() || c == b'_')
        {
            self.advance();
        }
        let word = std::str::from_utf8(&self.input[start..self.pos])
            .map_err(|_| ShoalError::Internal("non-UTF-8 identifier".into()))?;
        let upper = word.to_ascii_uppercase();

        if let Some(kw) = keyword_token(&upper) {
            Ok(RawToken::Keyword(kw))
        } else {
            Ok(RawToken::Identifier(word.to_string()))
        }
    }

    fn read_operator(&mut self) -> Result<RawToken> {
        let ch = match self.advance() {
            Some(c) => c,
            None => return Ok(RawToken::Eof),
        };
        match ch {
            b'*' => Ok(RawToken::Star),
            b',' => Ok(RawToken::Comma),
            b';' => Ok(RawToken::Semicolon),
            b'.' => Ok(RawToken::Dot),
            b'(' => Ok(RawToken::LeftParen),
            b')' => Ok(RawToken::RightParen),
            b'=' => {
                if self.peek() == Some(b'=') {
                    self.advance();
                }
                Ok(RawToken::Op(CmpOp::Eq))
            }
            b'!' => {
                if self.peek() == Some(b'=') {
                    self.advance();
                    Ok(RawToken::Op(CmpOp::NotEq))
                } else {
                    Err(ShoalError::InvalidSql("expected '=' after '!'".into()))
                }
            }
            b'<' => {
                if self.peek() == Some(b'=') {
                    self.advance();
                    Ok(RawToken::Op(CmpOp::LtEq))
                } else if self.peek() == Some(b'>') {
                    self.advance();
                    Ok(RawToken::Op(CmpOp::NotEq))
                } else {
                    Ok(RawToken::Op(CmpOp::Lt))
                }
            }
            b'>' => {
                if self.peek() == Some(b'=') {
                    self.advance();
                    Ok(RawToken::Op(CmpOp::GtEq))
                } else {
                    Ok(RawToken::Op(CmpOp::Gt))
                }
            }
            _ => Err(ShoalError::InvalidSql(format!(
                "unexpected character: '{}'",
                ch as char
            ))),
        }
    }
}

// ===========================================================================
// Tests
// ===========================================================================
