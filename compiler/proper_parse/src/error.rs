//! Parse error type.

use proper_ir::{Span, TokenKind};
use thiserror::Error;

/// A syntax error with the span of the offending token.
///
/// Parsing stops at the first error: configuration files are short and a
/// single precise message beats a cascade of recovered ones.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ParseError {
    pub message: String,
    pub span: Span,
}

impl ParseError {
    pub fn new(message: impl Into<String>, span: Span) -> Self {
        ParseError {
            message: message.into(),
            span,
        }
    }

    /// "expected X, found Y"
    pub fn expected(what: &str, found: &TokenKind, span: Span) -> Self {
        ParseError::new(format!("expected {what}, found {}", found.describe()), span)
    }

    /// Error for a construct the configuration language leaves out.
    pub fn unsupported(what: &str, span: Span) -> Self {
        ParseError::new(format!("{what} are not supported"), span)
    }

    /// 1-based line and column of the error in `source`.
    pub fn line_col(&self, source: &str) -> (usize, usize) {
        self.span.line_col(source)
    }
}
