//! Statement parsing.
//!
//! Only simple statements exist: imports, assignments (plain, augmented and
//! annotated), `pass` and bare expressions. Anything that would open a block
//! is rejected by keyword.

use proper_ir::{
    BinaryOp, ExprId, ExprKind, ImportName, ImportedNames, Span, Stmt, StmtKind, TokenKind,
};

use crate::{ParseError, Parser};

impl Parser<'_> {
    pub(crate) fn statement(&mut self) -> Result<Stmt, ParseError> {
        let start = self.cursor.current_span();
        let kind = match self.cursor.current_kind() {
            TokenKind::Indent => {
                return Err(ParseError::new("unexpected indent", start));
            }
            TokenKind::Reserved(word) => {
                return Err(ParseError::new(
                    format!("`{word}` statements are not supported in configuration files"),
                    start,
                ));
            }
            TokenKind::Import => self.import_stmt()?,
            TokenKind::From => self.from_import_stmt()?,
            TokenKind::Pass => {
                self.cursor.advance();
                StmtKind::Pass
            }
            _ => self.expr_or_assign_stmt()?,
        };
        Ok(Stmt {
            kind,
            span: self.span_from(start),
        })
    }

    /// A statement ends at a newline, a semicolon or end of input.
    pub(crate) fn end_of_statement(&mut self) -> Result<(), ParseError> {
        match self.cursor.current_kind() {
            TokenKind::Newline | TokenKind::Semicolon | TokenKind::Eof => Ok(()),
            other => Err(ParseError::expected(
                "end of statement",
                other,
                self.cursor.current_span(),
            )),
        }
    }

    /// `import a.b as c, d`
    fn import_stmt(&mut self) -> Result<StmtKind, ParseError> {
        self.cursor.advance();
        let mut names = vec![self.import_name(true)?];
        while self.cursor.eat(&TokenKind::Comma) {
            names.push(self.import_name(true)?);
        }
        Ok(StmtKind::Import(names))
    }

    /// `from m import x, y as z`, `from m import (x, y)` or `from m import *`
    fn from_import_stmt(&mut self) -> Result<StmtKind, ParseError> {
        self.cursor.advance();
        if self.cursor.check(&TokenKind::Dot) {
            return Err(ParseError::unsupported(
                "relative imports",
                self.cursor.current_span(),
            ));
        }
        let module = self.dotted_name()?;
        self.cursor.expect(&TokenKind::Import, "`import`")?;

        if self.cursor.eat(&TokenKind::Star) {
            return Ok(StmtKind::FromImport {
                module,
                names: ImportedNames::All,
            });
        }

        let parenthesized = self.cursor.eat(&TokenKind::LParen);
        let mut names = vec![self.import_name(false)?];
        while self.cursor.eat(&TokenKind::Comma) {
            if parenthesized && self.cursor.check(&TokenKind::RParen) {
                break;
            }
            names.push(self.import_name(false)?);
        }
        if parenthesized {
            self.cursor.expect(&TokenKind::RParen, "`)`")?;
        }
        Ok(StmtKind::FromImport {
            module,
            names: ImportedNames::Names(names),
        })
    }

    fn import_name(&mut self, dotted: bool) -> Result<ImportName, ParseError> {
        let start = self.cursor.current_span();
        let path = if dotted {
            self.dotted_name()?
        } else {
            self.cursor.expect_ident("name to import")?.to_string()
        };
        let alias = if self.cursor.eat(&TokenKind::As) {
            Some(self.cursor.expect_ident("alias after `as`")?.to_string())
        } else {
            None
        };
        Ok(ImportName {
            path,
            alias,
            span: self.span_from(start),
        })
    }

    fn dotted_name(&mut self) -> Result<String, ParseError> {
        let mut name = self.cursor.expect_ident("module name")?.to_string();
        while self.cursor.eat(&TokenKind::Dot) {
            name.push('.');
            name.push_str(self.cursor.expect_ident("module name after `.`")?);
        }
        Ok(name)
    }

    fn expr_or_assign_stmt(&mut self) -> Result<StmtKind, ParseError> {
        let first = self.expression_list()?;

        match self.cursor.current_kind() {
            TokenKind::Eq => {
                let mut targets = vec![first];
                let mut value;
                loop {
                    self.cursor.advance();
                    value = self.expression_list()?;
                    if !self.cursor.check(&TokenKind::Eq) {
                        break;
                    }
                    targets.push(value);
                }
                for &target in &targets {
                    self.check_assign_target(target)?;
                }
                Ok(StmtKind::Assign { targets, value })
            }
            TokenKind::AugAssign(symbol) => {
                let span = self.cursor.current_span();
                let op = aug_assign_op(symbol, span)?;
                self.check_aug_target(first)?;
                self.cursor.advance();
                let value = self.expression_list()?;
                Ok(StmtKind::AugAssign {
                    target: first,
                    op,
                    value,
                })
            }
            TokenKind::Colon => {
                self.cursor.advance();
                self.check_aug_target(first)?;
                let annotation = self.expression()?;
                let value = if self.cursor.eat(&TokenKind::Eq) {
                    Some(self.expression_list()?)
                } else {
                    None
                };
                Ok(StmtKind::AnnAssign {
                    target: first,
                    annotation,
                    value,
                })
            }
            _ => Ok(StmtKind::Expr(first)),
        }
    }

    fn check_assign_target(&self, id: ExprId) -> Result<(), ParseError> {
        match self.arena.kind(id) {
            ExprKind::Name(_) | ExprKind::Attribute { .. } | ExprKind::Subscript { .. } => Ok(()),
            ExprKind::Tuple(items) | ExprKind::List(items) => {
                for &item in items {
                    self.check_assign_target(item)?;
                }
                Ok(())
            }
            _ => Err(ParseError::new(
                "cannot assign to expression",
                self.arena.span(id),
            )),
        }
    }

    /// Augmented and annotated assignments take a single target.
    fn check_aug_target(&self, id: ExprId) -> Result<(), ParseError> {
        match self.arena.kind(id) {
            ExprKind::Name(_) | ExprKind::Attribute { .. } | ExprKind::Subscript { .. } => Ok(()),
            _ => Err(ParseError::new(
                "illegal target for augmented or annotated assignment",
                self.arena.span(id),
            )),
        }
    }
}

fn aug_assign_op(symbol: &str, span: Span) -> Result<BinaryOp, ParseError> {
    let op = match symbol {
        "+=" => BinaryOp::Add,
        "-=" => BinaryOp::Sub,
        "*=" => BinaryOp::Mul,
        "/=" => BinaryOp::Div,
        "//=" => BinaryOp::FloorDiv,
        "%=" => BinaryOp::Mod,
        "**=" => BinaryOp::Pow,
        "&=" => BinaryOp::BitAnd,
        "|=" => BinaryOp::BitOr,
        "^=" => BinaryOp::BitXor,
        "<<=" => BinaryOp::Shl,
        ">>=" => BinaryOp::Shr,
        _ => return Err(ParseError::unsupported("matrix operators", span)),
    };
    Ok(op)
}
