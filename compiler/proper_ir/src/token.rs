//! Token types produced by `proper_lexer`.

use std::fmt;

use super::Span;

/// A token with its span in the source.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
}

impl Token {
    #[inline]
    pub fn new(kind: TokenKind, span: Span) -> Self {
        Token { kind, span }
    }
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?} @ {}", self.kind, self.span)
    }
}

/// Token kinds for the configuration language.
///
/// Float literals store their bits so the enum stays `Eq + Hash`.
#[derive(Clone, PartialEq, Eq, Hash)]
pub enum TokenKind {
    /// Integer literal: `42`, `0xff`, `1_000`
    Int(i64),
    /// Integer literal outside the `i64` range, kept as written
    BigInt(String),
    /// Float literal: `3.14`, `1e-3` (stored as bits)
    Float(u64),
    /// String literal with escapes already processed
    Str(String),
    /// Identifier
    Ident(String),

    // Keywords accepted by the grammar
    False,
    None,
    True,
    And,
    As,
    From,
    If,
    Else,
    Import,
    In,
    Is,
    Not,
    Or,
    Pass,

    /// A keyword of the host language that configuration files may not use
    /// (`def`, `class`, `for`, `lambda`, ...). The parser reports it by name.
    Reserved(&'static str),

    // Delimiters
    LParen,
    RParen,
    LBracket,
    RBracket,
    LBrace,
    RBrace,
    Comma,
    Colon,
    Semicolon,
    Dot,
    Arrow,
    At,

    // Operators
    Plus,
    Minus,
    Star,
    DoubleStar,
    Slash,
    DoubleSlash,
    Percent,
    Tilde,
    Amp,
    Pipe,
    Caret,
    Shl,
    Shr,
    Lt,
    Gt,
    LtEq,
    GtEq,
    EqEq,
    NotEq,
    Eq,
    Walrus,
    /// Augmented assignment operator: `+=`, `-=`, ... (carries the lexeme)
    AugAssign(&'static str),

    /// End of a logical line at bracket depth zero.
    Newline,
    /// Leading whitespace on a logical line at bracket depth zero.
    Indent,
    /// Unrecognized input or malformed literal.
    Error,
    Eof,
}

impl TokenKind {
    /// Human-readable description used in parse errors.
    pub fn describe(&self) -> String {
        match self {
            TokenKind::Int(n) => format!("integer `{n}`"),
            TokenKind::BigInt(text) => format!("integer `{text}`"),
            TokenKind::Float(bits) => format!("float `{}`", f64::from_bits(*bits)),
            TokenKind::Str(_) => "string literal".to_string(),
            TokenKind::Ident(name) => format!("identifier `{name}`"),
            TokenKind::Reserved(word) => format!("keyword `{word}`"),
            TokenKind::AugAssign(op) => format!("`{op}`"),
            TokenKind::Newline => "end of line".to_string(),
            TokenKind::Indent => "indentation".to_string(),
            TokenKind::Error => "invalid token".to_string(),
            TokenKind::Eof => "end of input".to_string(),
            other => format!("`{}`", other.symbol()),
        }
    }

    fn symbol(&self) -> &'static str {
        match self {
            TokenKind::False => "False",
            TokenKind::None => "None",
            TokenKind::True => "True",
            TokenKind::And => "and",
            TokenKind::As => "as",
            TokenKind::From => "from",
            TokenKind::If => "if",
            TokenKind::Else => "else",
            TokenKind::Import => "import",
            TokenKind::In => "in",
            TokenKind::Is => "is",
            TokenKind::Not => "not",
            TokenKind::Or => "or",
            TokenKind::Pass => "pass",
            TokenKind::LParen => "(",
            TokenKind::RParen => ")",
            TokenKind::LBracket => "[",
            TokenKind::RBracket => "]",
            TokenKind::LBrace => "{",
            TokenKind::RBrace => "}",
            TokenKind::Comma => ",",
            TokenKind::Colon => ":",
            TokenKind::Semicolon => ";",
            TokenKind::Dot => ".",
            TokenKind::Arrow => "->",
            TokenKind::At => "@",
            TokenKind::Plus => "+",
            TokenKind::Minus => "-",
            TokenKind::Star => "*",
            TokenKind::DoubleStar => "**",
            TokenKind::Slash => "/",
            TokenKind::DoubleSlash => "//",
            TokenKind::Percent => "%",
            TokenKind::Tilde => "~",
            TokenKind::Amp => "&",
            TokenKind::Pipe => "|",
            TokenKind::Caret => "^",
            TokenKind::Shl => "<<",
            TokenKind::Shr => ">>",
            TokenKind::Lt => "<",
            TokenKind::Gt => ">",
            TokenKind::LtEq => "<=",
            TokenKind::GtEq => ">=",
            TokenKind::EqEq => "==",
            TokenKind::NotEq => "!=",
            TokenKind::Eq => "=",
            TokenKind::Walrus => ":=",
            _ => "?",
        }
    }
}

impl fmt::Debug for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenKind::Int(n) => write!(f, "Int({n})"),
            TokenKind::BigInt(text) => write!(f, "BigInt({text})"),
            TokenKind::Float(bits) => write!(f, "Float({})", f64::from_bits(*bits)),
            TokenKind::Str(s) => write!(f, "Str({s:?})"),
            TokenKind::Ident(name) => write!(f, "Ident({name})"),
            TokenKind::Reserved(word) => write!(f, "Reserved({word})"),
            TokenKind::AugAssign(op) => write!(f, "AugAssign({op})"),
            TokenKind::Newline => write!(f, "Newline"),
            TokenKind::Indent => write!(f, "Indent"),
            TokenKind::Error => write!(f, "Error"),
            TokenKind::Eof => write!(f, "Eof"),
            other => write!(f, "{}", other.symbol()),
        }
    }
}

/// Lexer output: tokens in source order, always terminated by `Eof`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TokenList {
    pub tokens: Vec<Token>,
}

impl TokenList {
    pub fn new() -> Self {
        TokenList { tokens: Vec::new() }
    }

    #[inline]
    pub fn push(&mut self, token: Token) {
        self.tokens.push(token);
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    #[inline]
    pub fn get(&self, index: usize) -> Option<&Token> {
        self.tokens.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Token> {
        self.tokens.iter()
    }

    /// Token kinds only, convenient for assertions.
    pub fn kinds(&self) -> Vec<TokenKind> {
        self.tokens.iter().map(|t| t.kind.clone()).collect()
    }
}
