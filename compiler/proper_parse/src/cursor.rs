//! Token cursor for navigating the token stream.

use proper_ir::{Span, Token, TokenKind, TokenList};

use crate::ParseError;

static EOF: Token = Token {
    kind: TokenKind::Eof,
    span: Span::DUMMY,
};

/// Cursor over a `TokenList`.
///
/// Reading past the end yields the final `Eof` token, so grammar code never
/// has to bounds-check.
pub struct Cursor<'a> {
    tokens: &'a TokenList,
    pos: usize,
}

impl<'a> Cursor<'a> {
    pub fn new(tokens: &'a TokenList) -> Self {
        Cursor { tokens, pos: 0 }
    }

    #[inline]
    pub fn current(&self) -> &'a Token {
        self.peek_token(0)
    }

    #[inline]
    pub fn current_kind(&self) -> &'a TokenKind {
        &self.current().kind
    }

    #[inline]
    pub fn current_span(&self) -> Span {
        self.current().span
    }

    /// Kind of the token `offset` positions ahead.
    #[inline]
    pub fn peek(&self, offset: usize) -> &'a TokenKind {
        &self.peek_token(offset).kind
    }

    fn peek_token(&self, offset: usize) -> &'a Token {
        let tokens: &'a [Token] = &self.tokens.tokens;
        tokens
            .get(self.pos + offset)
            .or_else(|| tokens.last())
            .unwrap_or(&EOF)
    }

    /// Span of the most recently consumed token.
    #[inline]
    pub fn previous_span(&self) -> Span {
        match self.pos.checked_sub(1).and_then(|i| self.tokens.get(i)) {
            Some(token) => token.span,
            None => Span::DUMMY,
        }
    }

    #[inline]
    pub fn at_end(&self) -> bool {
        matches!(self.current_kind(), TokenKind::Eof)
    }

    /// Consume the current token and return it.
    pub fn advance(&mut self) -> &'a Token {
        let token = self.current();
        if !self.at_end() {
            self.pos += 1;
        }
        token
    }

    /// Check the current token's discriminant, ignoring payloads.
    #[inline]
    pub fn check(&self, kind: &TokenKind) -> bool {
        std::mem::discriminant(self.current_kind()) == std::mem::discriminant(kind)
    }

    /// Consume the current token if it matches `kind`.
    pub fn eat(&mut self, kind: &TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    /// Consume a token of `kind` or fail with "expected `what`".
    pub fn expect(&mut self, kind: &TokenKind, what: &str) -> Result<&'a Token, ParseError> {
        if self.check(kind) {
            Ok(self.advance())
        } else {
            Err(ParseError::expected(what, self.current_kind(), self.current_span()))
        }
    }

    /// Consume an identifier and return its text.
    pub fn expect_ident(&mut self, what: &str) -> Result<&'a str, ParseError> {
        match self.current_kind() {
            TokenKind::Ident(name) => {
                self.advance();
                Ok(name.as_str())
            }
            other => Err(ParseError::expected(what, other, self.current_span())),
        }
    }

    pub fn skip_separators(&mut self) {
        while matches!(
            self.current_kind(),
            TokenKind::Newline | TokenKind::Semicolon
        ) {
            self.advance();
        }
    }
}
