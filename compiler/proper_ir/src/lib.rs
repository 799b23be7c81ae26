//! Proper IR - shared syntax types for the proper configuration language.
//!
//! This crate holds everything the lexer, parser and evaluator exchange:
//!
//! - [`Span`]: byte ranges into the configuration source
//! - [`Token`] / [`TokenKind`] / [`TokenList`]: lexer output
//! - [`Program`], [`Stmt`], [`ExprArena`]: parser output, with expressions
//!   stored in a flat arena and referenced by [`ExprId`]
//! - [`ensure_sufficient_stack`]: stack growth for the recursive passes
//!
//! The surface syntax is a subset of Python: configuration files are a
//! sequence of top-level imports, assignments and expression statements.

mod ast;
mod span;
mod stack;
mod token;

pub use ast::{
    Arg, BinaryOp, BoolOp, CmpOp, DictEntry, Expr, ExprArena, ExprId, ExprKind, ImportName,
    ImportedNames, Program, Stmt, StmtKind, UnaryOp,
};
pub use span::Span;
pub use stack::ensure_sufficient_stack;
pub use token::{Token, TokenKind, TokenList};
