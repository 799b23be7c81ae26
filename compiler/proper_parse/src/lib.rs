//! Recursive descent parser for the proper configuration language.
//!
//! Produces a [`Program`]: a flat list of top-level statements with every
//! expression allocated in an `ExprArena`. The grammar is a Python subset
//! without blocks, so there is no indentation tracking beyond rejecting
//! indented lines.

mod cursor;
mod error;
mod grammar;

pub use cursor::Cursor;
pub use error::ParseError;

use proper_ir::{Expr, ExprArena, ExprId, ExprKind, Program, Span, TokenList};

/// Parser state.
pub struct Parser<'a> {
    cursor: Cursor<'a>,
    arena: ExprArena,
}

impl<'a> Parser<'a> {
    pub fn new(tokens: &'a TokenList) -> Self {
        Parser {
            cursor: Cursor::new(tokens),
            arena: ExprArena::new(),
        }
    }

    /// Parse a whole program, stopping at the first syntax error.
    pub fn parse_program(mut self) -> Result<Program, ParseError> {
        let mut stmts = Vec::new();
        loop {
            self.cursor.skip_separators();
            if self.cursor.at_end() {
                break;
            }
            let stmt = self.statement()?;
            tracing::trace!(kind = ?stmt.kind, span = %stmt.span, "parsed statement");
            stmts.push(stmt);
            self.end_of_statement()?;
        }
        Ok(Program {
            stmts,
            arena: self.arena,
        })
    }

    /// Parse a single expression followed by end of input.
    pub fn parse_standalone_expr(mut self) -> Result<(ExprArena, ExprId), ParseError> {
        self.cursor.skip_separators();
        let id = self.expression()?;
        self.cursor.skip_separators();
        if !self.cursor.at_end() {
            return Err(ParseError::expected(
                "end of input",
                self.cursor.current_kind(),
                self.cursor.current_span(),
            ));
        }
        Ok((self.arena, id))
    }

    #[inline]
    fn alloc(&mut self, kind: ExprKind, span: Span) -> ExprId {
        self.arena.alloc(Expr::new(kind, span))
    }

    /// Span from `start` through the last consumed token.
    #[inline]
    fn span_from(&self, start: Span) -> Span {
        start.merge(self.cursor.previous_span())
    }
}

/// Lex and parse configuration source.
pub fn parse(source: &str) -> Result<Program, ParseError> {
    let tokens = proper_lexer::lex(source);
    parse_tokens(&tokens)
}

pub fn parse_tokens(tokens: &TokenList) -> Result<Program, ParseError> {
    Parser::new(tokens).parse_program()
}

/// Parse source consisting of exactly one expression.
pub fn parse_expr(source: &str) -> Result<(ExprArena, ExprId), ParseError> {
    let tokens = proper_lexer::lex(source);
    Parser::new(&tokens).parse_standalone_expr()
}

#[cfg(test)]
mod tests;
