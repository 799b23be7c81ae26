//! Lexer for the proper configuration language, built on logos.
//!
//! The surface syntax is a Python subset, so besides plain tokenization the
//! lexer handles the line structure:
//!
//! - Newlines inside `()`, `[]` and `{}` are insignificant and dropped.
//! - Consecutive blank lines produce a single [`TokenKind::Newline`].
//! - A logical line that starts with whitespace at bracket depth zero gets an
//!   [`TokenKind::Indent`] token; configuration files have no blocks, so the
//!   parser rejects it as an unexpected indent.
//! - Comments and backslash line continuations are trivia.

mod escape;
mod keywords;

use std::num::IntErrorKind;

use logos::Logos;
use proper_ir::{Span, Token, TokenKind, TokenList};

pub use keywords::RESERVED;

/// Raw token from logos (before keyword resolution and unescaping).
#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(skip r"[ \t\r\f]+")]
enum RawToken {
    #[regex(r"#[^\n]*")]
    Comment,

    #[token("\n")]
    Newline,

    #[regex(r"\\[ \t\r\f]*\n")]
    LineContinuation,

    #[regex(r"[0-9][0-9_]*", |lex| parse_int(lex.slice(), 10))]
    #[regex(r"0[xX][0-9a-fA-F_]+", |lex| parse_int(&lex.slice()[2..], 16))]
    #[regex(r"0[oO][0-7_]+", |lex| parse_int(&lex.slice()[2..], 8))]
    #[regex(r"0[bB][01_]+", |lex| parse_int(&lex.slice()[2..], 2))]
    Int(IntLiteral),

    #[regex(r"[0-9][0-9_]*\.[0-9_]*([eE][+-]?[0-9_]+)?", |lex| parse_float(lex.slice()))]
    #[regex(r"\.[0-9][0-9_]*([eE][+-]?[0-9_]+)?", |lex| parse_float(lex.slice()))]
    #[regex(r"[0-9][0-9_]*[eE][+-]?[0-9_]+", |lex| parse_float(lex.slice()))]
    Float(f64),

    #[regex(r#""([^"\\\n]|\\.)*""#)]
    #[regex(r#"'([^'\\\n]|\\.)*'"#)]
    Str,

    #[regex(r#"[rR]"[^"\n]*""#)]
    #[regex(r#"[rR]'[^'\n]*'"#)]
    RawStr,

    #[token("\"\"\"", |lex| close_triple_quoted(lex, "\"\"\""))]
    #[token("'''", |lex| close_triple_quoted(lex, "'''"))]
    TripleStr,

    #[regex(r"[A-Za-z_][A-Za-z0-9_]*")]
    Ident,

    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token("[")]
    LBracket,
    #[token("]")]
    RBracket,
    #[token("{")]
    LBrace,
    #[token("}")]
    RBrace,
    #[token(",")]
    Comma,
    #[token(":")]
    Colon,
    #[token(";")]
    Semicolon,
    #[token(".")]
    Dot,
    #[token("->")]
    Arrow,
    #[token("@")]
    At,

    #[token("+")]
    Plus,
    #[token("-")]
    Minus,
    #[token("*")]
    Star,
    #[token("**")]
    DoubleStar,
    #[token("/")]
    Slash,
    #[token("//")]
    DoubleSlash,
    #[token("%")]
    Percent,
    #[token("~")]
    Tilde,
    #[token("&")]
    Amp,
    #[token("|")]
    Pipe,
    #[token("^")]
    Caret,
    #[token("<<")]
    Shl,
    #[token(">>")]
    Shr,
    #[token("<")]
    Lt,
    #[token(">")]
    Gt,
    #[token("<=")]
    LtEq,
    #[token(">=")]
    GtEq,
    #[token("==")]
    EqEq,
    #[token("!=")]
    NotEq,
    #[token("=")]
    Eq,
    #[token(":=")]
    Walrus,

    #[token("+=")]
    #[token("-=")]
    #[token("*=")]
    #[token("/=")]
    #[token("//=")]
    #[token("%=")]
    #[token("**=")]
    #[token("&=")]
    #[token("|=")]
    #[token("^=")]
    #[token("<<=")]
    #[token(">>=")]
    #[token("@=")]
    AugAssign,
}

/// Integer literal value. Over-range literals still lex so that the
/// evaluator can report them at their own position.
#[derive(Debug, Clone, PartialEq)]
enum IntLiteral {
    Fits(i64),
    TooLarge,
}

fn parse_int(digits: &str, radix: u32) -> Option<IntLiteral> {
    let cleaned: String = digits.chars().filter(|c| *c != '_').collect();
    match i64::from_str_radix(&cleaned, radix) {
        Ok(n) => Some(IntLiteral::Fits(n)),
        Err(err) if *err.kind() == IntErrorKind::PosOverflow => Some(IntLiteral::TooLarge),
        Err(_) => None,
    }
}

fn parse_float(text: &str) -> Option<f64> {
    let cleaned: String = text.chars().filter(|c| *c != '_').collect();
    cleaned.parse().ok()
}

/// Extend a triple-quoted string token up to and including its closing delimiter.
fn close_triple_quoted(lex: &mut logos::Lexer<'_, RawToken>, delim: &str) -> bool {
    if let Some(end) = lex.remainder().find(delim) {
        lex.bump(end + delim.len());
        true
    } else {
        let rest = lex.remainder().len();
        lex.bump(rest);
        false
    }
}

/// Lex configuration source into a `TokenList` terminated by `Eof`.
pub fn lex(source: &str) -> TokenList {
    let mut result = TokenList::new();
    let mut logos = RawToken::lexer(source);
    let mut depth: u32 = 0;
    let mut line_start = 0usize;
    let mut at_line_start = true;

    while let Some(token_result) = logos.next() {
        let range = logos.span();
        let span = Span::from_range(range.clone());

        let kind = match token_result {
            Ok(RawToken::Comment | RawToken::LineContinuation) => continue,
            Ok(RawToken::Newline) => {
                if depth == 0 {
                    let after_line = !matches!(
                        result.tokens.last().map(|t| &t.kind),
                        None | Some(TokenKind::Newline)
                    );
                    if after_line {
                        result.push(Token::new(TokenKind::Newline, span));
                    }
                    line_start = range.end;
                    at_line_start = true;
                }
                continue;
            }
            Ok(raw) => convert_token(raw, logos.slice()),
            Err(()) => TokenKind::Error,
        };

        if at_line_start && depth == 0 && range.start > line_start {
            result.push(Token::new(
                TokenKind::Indent,
                Span::from_range(line_start..range.start),
            ));
        }
        at_line_start = false;

        match kind {
            TokenKind::LParen | TokenKind::LBracket | TokenKind::LBrace => depth += 1,
            TokenKind::RParen | TokenKind::RBracket | TokenKind::RBrace => {
                depth = depth.saturating_sub(1);
            }
            _ => {}
        }
        result.push(Token::new(kind, span));
    }

    let eof = Span::from_range(source.len()..source.len());
    result.push(Token::new(TokenKind::Eof, eof));
    result
}

/// Convert a raw token to its final `TokenKind`.
fn convert_token(raw: RawToken, slice: &str) -> TokenKind {
    match raw {
        RawToken::Int(IntLiteral::Fits(n)) => TokenKind::Int(n),
        RawToken::Int(IntLiteral::TooLarge) => TokenKind::BigInt(slice.to_string()),
        RawToken::Float(f) => TokenKind::Float(f.to_bits()),
        RawToken::Str => string_token(&slice[1..slice.len() - 1]),
        RawToken::RawStr => TokenKind::Str(slice[2..slice.len() - 1].to_string()),
        RawToken::TripleStr => string_token(&slice[3..slice.len() - 3]),
        RawToken::Ident => keywords::lookup(slice).unwrap_or_else(|| TokenKind::Ident(slice.to_string())),

        RawToken::LParen => TokenKind::LParen,
        RawToken::RParen => TokenKind::RParen,
        RawToken::LBracket => TokenKind::LBracket,
        RawToken::RBracket => TokenKind::RBracket,
        RawToken::LBrace => TokenKind::LBrace,
        RawToken::RBrace => TokenKind::RBrace,
        RawToken::Comma => TokenKind::Comma,
        RawToken::Colon => TokenKind::Colon,
        RawToken::Semicolon => TokenKind::Semicolon,
        RawToken::Dot => TokenKind::Dot,
        RawToken::Arrow => TokenKind::Arrow,
        RawToken::At => TokenKind::At,

        RawToken::Plus => TokenKind::Plus,
        RawToken::Minus => TokenKind::Minus,
        RawToken::Star => TokenKind::Star,
        RawToken::DoubleStar => TokenKind::DoubleStar,
        RawToken::Slash => TokenKind::Slash,
        RawToken::DoubleSlash => TokenKind::DoubleSlash,
        RawToken::Percent => TokenKind::Percent,
        RawToken::Tilde => TokenKind::Tilde,
        RawToken::Amp => TokenKind::Amp,
        RawToken::Pipe => TokenKind::Pipe,
        RawToken::Caret => TokenKind::Caret,
        RawToken::Shl => TokenKind::Shl,
        RawToken::Shr => TokenKind::Shr,
        RawToken::Lt => TokenKind::Lt,
        RawToken::Gt => TokenKind::Gt,
        RawToken::LtEq => TokenKind::LtEq,
        RawToken::GtEq => TokenKind::GtEq,
        RawToken::EqEq => TokenKind::EqEq,
        RawToken::NotEq => TokenKind::NotEq,
        RawToken::Eq => TokenKind::Eq,
        RawToken::Walrus => TokenKind::Walrus,
        RawToken::AugAssign => TokenKind::AugAssign(aug_assign_symbol(slice)),

        // Trivia is filtered before conversion.
        RawToken::Comment | RawToken::Newline | RawToken::LineContinuation => TokenKind::Error,
    }
}

fn string_token(body: &str) -> TokenKind {
    match escape::unescape_string(body) {
        Some(s) => TokenKind::Str(s),
        None => TokenKind::Error,
    }
}

fn aug_assign_symbol(slice: &str) -> &'static str {
    match slice {
        "+=" => "+=",
        "-=" => "-=",
        "*=" => "*=",
        "/=" => "/=",
        "//=" => "//=",
        "%=" => "%=",
        "**=" => "**=",
        "&=" => "&=",
        "|=" => "|=",
        "^=" => "^=",
        "<<=" => "<<=",
        ">>=" => ">>=",
        _ => "@=",
    }
}
