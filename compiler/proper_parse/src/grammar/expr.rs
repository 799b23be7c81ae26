//! Expression parsing.
//!
//! Precedence, lowest to highest:
//!
//! ```text
//! a if c else b
//! or
//! and
//! not
//! == != < <= > >= in, not in, is, is not   (chained)
//! |  ^  &  << >>  + -  * / // %            (precedence climbing)
//! unary - + ~
//! **                                       (right associative)
//! call, attribute, subscript
//! ```

use proper_ir::{
    ensure_sufficient_stack, Arg, BinaryOp, BoolOp, CmpOp, DictEntry, ExprId, ExprKind,
    TokenKind, UnaryOp,
};

use crate::{ParseError, Parser};

fn binary_op(kind: &TokenKind) -> Option<BinaryOp> {
    let op = match kind {
        TokenKind::Pipe => BinaryOp::BitOr,
        TokenKind::Caret => BinaryOp::BitXor,
        TokenKind::Amp => BinaryOp::BitAnd,
        TokenKind::Shl => BinaryOp::Shl,
        TokenKind::Shr => BinaryOp::Shr,
        TokenKind::Plus => BinaryOp::Add,
        TokenKind::Minus => BinaryOp::Sub,
        TokenKind::Star => BinaryOp::Mul,
        TokenKind::Slash => BinaryOp::Div,
        TokenKind::DoubleSlash => BinaryOp::FloorDiv,
        TokenKind::Percent => BinaryOp::Mod,
        _ => return None,
    };
    Some(op)
}

impl Parser<'_> {
    /// Parse one expression.
    pub(crate) fn expression(&mut self) -> Result<ExprId, ParseError> {
        ensure_sufficient_stack(|| self.ternary())
    }

    /// An expression, or a bare tuple `a, b` where statements allow one.
    pub(crate) fn expression_list(&mut self) -> Result<ExprId, ParseError> {
        let start = self.cursor.current_span();
        let first = self.expression()?;
        if !self.cursor.check(&TokenKind::Comma) {
            return Ok(first);
        }
        let mut items = vec![first];
        while self.cursor.eat(&TokenKind::Comma) {
            if !self.starts_expression() {
                break;
            }
            items.push(self.expression()?);
        }
        Ok(self.alloc(ExprKind::Tuple(items), self.span_from(start)))
    }

    fn starts_expression(&self) -> bool {
        !matches!(
            self.cursor.current_kind(),
            TokenKind::Newline
                | TokenKind::Semicolon
                | TokenKind::Eof
                | TokenKind::Eq
                | TokenKind::AugAssign(_)
                | TokenKind::Colon
                | TokenKind::RParen
                | TokenKind::RBracket
                | TokenKind::RBrace
        )
    }

    fn ternary(&mut self) -> Result<ExprId, ParseError> {
        let start = self.cursor.current_span();
        let then = self.or_expr()?;
        if !self.cursor.eat(&TokenKind::If) {
            return Ok(then);
        }
        let cond = self.or_expr()?;
        self.cursor.expect(&TokenKind::Else, "`else` in conditional expression")?;
        let otherwise = self.expression()?;
        Ok(self.alloc(
            ExprKind::IfElse {
                cond,
                then,
                otherwise,
            },
            self.span_from(start),
        ))
    }

    fn or_expr(&mut self) -> Result<ExprId, ParseError> {
        let start = self.cursor.current_span();
        let mut left = self.and_expr()?;
        while self.cursor.eat(&TokenKind::Or) {
            let right = self.and_expr()?;
            left = self.alloc(
                ExprKind::Logical {
                    op: BoolOp::Or,
                    left,
                    right,
                },
                self.span_from(start),
            );
        }
        Ok(left)
    }

    fn and_expr(&mut self) -> Result<ExprId, ParseError> {
        let start = self.cursor.current_span();
        let mut left = self.not_expr()?;
        while self.cursor.eat(&TokenKind::And) {
            let right = self.not_expr()?;
            left = self.alloc(
                ExprKind::Logical {
                    op: BoolOp::And,
                    left,
                    right,
                },
                self.span_from(start),
            );
        }
        Ok(left)
    }

    fn not_expr(&mut self) -> Result<ExprId, ParseError> {
        let start = self.cursor.current_span();
        if self.cursor.eat(&TokenKind::Not) {
            let operand = ensure_sufficient_stack(|| self.not_expr())?;
            return Ok(self.alloc(
                ExprKind::Unary {
                    op: UnaryOp::Not,
                    operand,
                },
                self.span_from(start),
            ));
        }
        self.comparison()
    }

    fn comparison(&mut self) -> Result<ExprId, ParseError> {
        let start = self.cursor.current_span();
        let left = self.binary(1)?;
        let mut rest = Vec::new();
        while let Some(op) = self.comparison_op() {
            let right = self.binary(1)?;
            rest.push((op, right));
        }
        if rest.is_empty() {
            return Ok(left);
        }
        Ok(self.alloc(ExprKind::Compare { left, rest }, self.span_from(start)))
    }

    /// Consume a comparison operator, including the two-token `not in` and `is not`.
    fn comparison_op(&mut self) -> Option<CmpOp> {
        let op = match self.cursor.current_kind() {
            TokenKind::EqEq => CmpOp::Eq,
            TokenKind::NotEq => CmpOp::NotEq,
            TokenKind::Lt => CmpOp::Lt,
            TokenKind::LtEq => CmpOp::LtEq,
            TokenKind::Gt => CmpOp::Gt,
            TokenKind::GtEq => CmpOp::GtEq,
            TokenKind::In => CmpOp::In,
            TokenKind::Not if matches!(self.cursor.peek(1), TokenKind::In) => {
                self.cursor.advance();
                CmpOp::NotIn
            }
            TokenKind::Is => {
                if matches!(self.cursor.peek(1), TokenKind::Not) {
                    self.cursor.advance();
                    CmpOp::IsNot
                } else {
                    CmpOp::Is
                }
            }
            _ => return None,
        };
        self.cursor.advance();
        Some(op)
    }

    /// Precedence climbing over the arithmetic and bitwise operators.
    fn binary(&mut self, min_prec: u8) -> Result<ExprId, ParseError> {
        let start = self.cursor.current_span();
        let mut left = self.unary()?;
        while let Some(op) = binary_op(self.cursor.current_kind()) {
            let prec = op.precedence();
            if prec < min_prec {
                break;
            }
            self.cursor.advance();
            let right = ensure_sufficient_stack(|| self.binary(prec + 1))?;
            left = self.alloc(ExprKind::Binary { op, left, right }, self.span_from(start));
        }
        Ok(left)
    }

    fn unary(&mut self) -> Result<ExprId, ParseError> {
        let start = self.cursor.current_span();
        let op = match self.cursor.current_kind() {
            TokenKind::Minus => UnaryOp::Neg,
            TokenKind::Plus => UnaryOp::Pos,
            TokenKind::Tilde => UnaryOp::Invert,
            _ => return self.power(),
        };
        self.cursor.advance();
        let operand = ensure_sufficient_stack(|| self.unary())?;
        Ok(self.alloc(ExprKind::Unary { op, operand }, self.span_from(start)))
    }

    /// `**` binds tighter than a unary operator on its left and looser than
    /// one on its right: `-2 ** -1` is `-(2 ** (-1))`.
    fn power(&mut self) -> Result<ExprId, ParseError> {
        let start = self.cursor.current_span();
        let base = self.postfix()?;
        if !self.cursor.eat(&TokenKind::DoubleStar) {
            return Ok(base);
        }
        let exponent = ensure_sufficient_stack(|| self.unary())?;
        Ok(self.alloc(
            ExprKind::Binary {
                op: BinaryOp::Pow,
                left: base,
                right: exponent,
            },
            self.span_from(start),
        ))
    }

    fn postfix(&mut self) -> Result<ExprId, ParseError> {
        let start = self.cursor.current_span();
        let mut expr = self.atom()?;
        loop {
            match self.cursor.current_kind() {
                TokenKind::LParen => {
                    self.cursor.advance();
                    let args = self.call_args()?;
                    expr = self.alloc(ExprKind::Call { func: expr, args }, self.span_from(start));
                }
                TokenKind::Dot => {
                    self.cursor.advance();
                    let name = self.cursor.expect_ident("attribute name after `.`")?;
                    expr = self.alloc(
                        ExprKind::Attribute {
                            receiver: expr,
                            name: name.to_string(),
                        },
                        self.span_from(start),
                    );
                }
                TokenKind::LBracket => {
                    self.cursor.advance();
                    if self.cursor.check(&TokenKind::Colon) {
                        return Err(ParseError::unsupported(
                            "slices",
                            self.cursor.current_span(),
                        ));
                    }
                    let index = self.expression_list()?;
                    if self.cursor.check(&TokenKind::Colon) {
                        return Err(ParseError::unsupported(
                            "slices",
                            self.cursor.current_span(),
                        ));
                    }
                    self.cursor.expect(&TokenKind::RBracket, "`]`")?;
                    expr = self.alloc(
                        ExprKind::Subscript {
                            receiver: expr,
                            index,
                        },
                        self.span_from(start),
                    );
                }
                _ => return Ok(expr),
            }
        }
    }

    /// Arguments after `(`, through the closing `)`.
    fn call_args(&mut self) -> Result<Vec<Arg>, ParseError> {
        let mut args = Vec::new();
        let mut seen_keyword = false;
        while !self.cursor.check(&TokenKind::RParen) {
            let span = self.cursor.current_span();
            let arg = match (self.cursor.current_kind(), self.cursor.peek(1)) {
                (TokenKind::Star, _) => {
                    self.cursor.advance();
                    Arg::Star(self.expression()?)
                }
                (TokenKind::DoubleStar, _) => {
                    self.cursor.advance();
                    seen_keyword = true;
                    Arg::DoubleStar(self.expression()?)
                }
                (TokenKind::Ident(name), TokenKind::Eq) => {
                    let duplicate = args
                        .iter()
                        .any(|arg| matches!(arg, Arg::Keyword { name: prev, .. } if prev == name));
                    if duplicate {
                        return Err(ParseError::new(
                            format!("keyword argument repeated: {name}"),
                            span,
                        ));
                    }
                    self.cursor.advance();
                    self.cursor.advance();
                    seen_keyword = true;
                    Arg::Keyword {
                        name: name.clone(),
                        value: self.expression()?,
                    }
                }
                _ => {
                    if seen_keyword {
                        return Err(ParseError::new(
                            "positional argument follows keyword argument",
                            span,
                        ));
                    }
                    Arg::Positional(self.expression()?)
                }
            };
            args.push(arg);
            if !self.cursor.eat(&TokenKind::Comma) {
                break;
            }
        }
        if let TokenKind::Reserved("for") = self.cursor.current_kind() {
            return Err(ParseError::unsupported(
                "comprehensions",
                self.cursor.current_span(),
            ));
        }
        self.cursor.expect(&TokenKind::RParen, "`,` or `)` in call")?;
        Ok(args)
    }

    fn atom(&mut self) -> Result<ExprId, ParseError> {
        let start = self.cursor.current_span();
        let kind = match self.cursor.current_kind() {
            TokenKind::Int(n) => ExprKind::Int(*n),
            TokenKind::BigInt(text) => ExprKind::BigInt(text.clone()),
            TokenKind::Float(bits) => ExprKind::Float(f64::from_bits(*bits)),
            TokenKind::True => ExprKind::Bool(true),
            TokenKind::False => ExprKind::Bool(false),
            TokenKind::None => ExprKind::None,
            TokenKind::Ident(name) => ExprKind::Name(name.clone()),
            TokenKind::Str(_) => return Ok(self.strings()),
            TokenKind::LParen => return self.paren(),
            TokenKind::LBracket => return self.list_display(),
            TokenKind::LBrace => return self.dict_display(),
            TokenKind::Reserved("lambda") => {
                return Err(ParseError::unsupported("lambda expressions", start));
            }
            other => return Err(ParseError::expected("expression", other, start)),
        };
        self.cursor.advance();
        Ok(self.alloc(kind, start))
    }

    /// Adjacent string literals concatenate: `"a" "b"` is `"ab"`.
    fn strings(&mut self) -> ExprId {
        let start = self.cursor.current_span();
        let mut text = String::new();
        while let TokenKind::Str(part) = self.cursor.current_kind() {
            text.push_str(part);
            self.cursor.advance();
        }
        self.alloc(ExprKind::Str(text), self.span_from(start))
    }

    /// `()`, `(expr)` or a tuple `(a, b)`.
    fn paren(&mut self) -> Result<ExprId, ParseError> {
        let start = self.cursor.current_span();
        self.cursor.advance();
        if self.cursor.eat(&TokenKind::RParen) {
            return Ok(self.alloc(ExprKind::Tuple(Vec::new()), self.span_from(start)));
        }
        let first = self.expression()?;
        self.reject_comprehension()?;
        if self.cursor.eat(&TokenKind::RParen) {
            return Ok(first);
        }
        let mut items = vec![first];
        while self.cursor.eat(&TokenKind::Comma) {
            if self.cursor.check(&TokenKind::RParen) {
                break;
            }
            items.push(self.expression()?);
        }
        self.cursor.expect(&TokenKind::RParen, "`,` or `)`")?;
        Ok(self.alloc(ExprKind::Tuple(items), self.span_from(start)))
    }

    fn list_display(&mut self) -> Result<ExprId, ParseError> {
        let start = self.cursor.current_span();
        self.cursor.advance();
        let mut items = Vec::new();
        while !self.cursor.check(&TokenKind::RBracket) {
            items.push(self.expression()?);
            if items.len() == 1 {
                self.reject_comprehension()?;
            }
            if !self.cursor.eat(&TokenKind::Comma) {
                break;
            }
        }
        self.cursor.expect(&TokenKind::RBracket, "`,` or `]`")?;
        Ok(self.alloc(ExprKind::List(items), self.span_from(start)))
    }

    fn dict_display(&mut self) -> Result<ExprId, ParseError> {
        let start = self.cursor.current_span();
        self.cursor.advance();
        let mut entries = Vec::new();
        while !self.cursor.check(&TokenKind::RBrace) {
            if self.cursor.eat(&TokenKind::DoubleStar) {
                entries.push(DictEntry::Spread(self.expression()?));
            } else {
                let key = self.expression()?;
                if !self.cursor.check(&TokenKind::Colon) {
                    self.reject_comprehension()?;
                    return Err(ParseError::unsupported(
                        "set literals",
                        self.span_from(start),
                    ));
                }
                self.cursor.advance();
                let value = self.expression()?;
                if entries.is_empty() {
                    self.reject_comprehension()?;
                }
                entries.push(DictEntry::Pair { key, value });
            }
            if !self.cursor.eat(&TokenKind::Comma) {
                break;
            }
        }
        self.cursor.expect(&TokenKind::RBrace, "`,` or `}`")?;
        Ok(self.alloc(ExprKind::Dict(entries), self.span_from(start)))
    }

    fn reject_comprehension(&self) -> Result<(), ParseError> {
        if let TokenKind::Reserved("for") = self.cursor.current_kind() {
            return Err(ParseError::unsupported(
                "comprehensions",
                self.cursor.current_span(),
            ));
        }
        Ok(())
    }
}
