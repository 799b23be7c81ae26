//! Keyword resolution.
//!
//! Identifiers are lexed by a single regex and classified here. Two tables:
//!
//! 1. **Grammar keywords**: words the configuration grammar understands.
//! 2. **Reserved keywords**: host-language keywords for constructs the
//!    configuration language deliberately lacks (`def`, `class`, loops,
//!    `lambda`, ...). They lex as [`TokenKind::Reserved`] so the parser can
//!    reject them with a precise message instead of a generic syntax error.

use proper_ir::TokenKind;

/// Host keywords that are recognized but not part of the grammar.
pub const RESERVED: &[&str] = &[
    "assert", "async", "await", "break", "class", "continue", "def", "del", "elif", "except",
    "finally", "for", "global", "lambda", "nonlocal", "raise", "return", "try", "while", "with",
    "yield",
];

/// Look up a keyword by text.
///
/// Returns `None` for ordinary identifiers.
#[inline]
pub(crate) fn lookup(text: &str) -> Option<TokenKind> {
    let kind = match text {
        "False" => TokenKind::False,
        "None" => TokenKind::None,
        "True" => TokenKind::True,
        "and" => TokenKind::And,
        "as" => TokenKind::As,
        "from" => TokenKind::From,
        "if" => TokenKind::If,
        "else" => TokenKind::Else,
        "import" => TokenKind::Import,
        "in" => TokenKind::In,
        "is" => TokenKind::Is,
        "not" => TokenKind::Not,
        "or" => TokenKind::Or,
        "pass" => TokenKind::Pass,
        other => {
            return RESERVED
                .iter()
                .copied()
                .find(|word| *word == other)
                .map(TokenKind::Reserved);
        }
    };
    Some(kind)
}
