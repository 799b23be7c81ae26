//! Syntax tree for configuration programs.
//!
//! Expressions live in an [`ExprArena`] and refer to each other through
//! [`ExprId`] indices instead of boxes. Statements are a flat list: the
//! language only has top-level statements.

use std::fmt;

use super::Span;

/// Index of an expression in its [`ExprArena`].
#[derive(Copy, Clone, PartialEq, Eq, Hash)]
pub struct ExprId(u32);

impl ExprId {
    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Debug for ExprId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ExprId({})", self.0)
    }
}

/// An expression with its source span.
#[derive(Clone, Debug, PartialEq)]
pub struct Expr {
    pub kind: ExprKind,
    pub span: Span,
}

impl Expr {
    #[inline]
    pub fn new(kind: ExprKind, span: Span) -> Self {
        Expr { kind, span }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum ExprKind {
    None,
    Bool(bool),
    Int(i64),
    /// Integer literal too large for `i64`; evaluates to an error.
    BigInt(String),
    Float(f64),
    Str(String),
    Name(String),
    List(Vec<ExprId>),
    Tuple(Vec<ExprId>),
    Dict(Vec<DictEntry>),
    Unary {
        op: UnaryOp,
        operand: ExprId,
    },
    Binary {
        op: BinaryOp,
        left: ExprId,
        right: ExprId,
    },
    /// `and` / `or`, which return one of their operands.
    Logical {
        op: BoolOp,
        left: ExprId,
        right: ExprId,
    },
    /// Chained comparison: `a < b <= c` is `Compare { left: a, rest: [(<, b), (<=, c)] }`.
    Compare {
        left: ExprId,
        rest: Vec<(CmpOp, ExprId)>,
    },
    /// `then if cond else otherwise`
    IfElse {
        cond: ExprId,
        then: ExprId,
        otherwise: ExprId,
    },
    Attribute {
        receiver: ExprId,
        name: String,
    },
    Subscript {
        receiver: ExprId,
        index: ExprId,
    },
    Call {
        func: ExprId,
        args: Vec<Arg>,
    },
}

/// Entry of a dict display: `key: value` or `**mapping`.
#[derive(Clone, Debug, PartialEq)]
pub enum DictEntry {
    Pair { key: ExprId, value: ExprId },
    Spread(ExprId),
}

/// A call argument.
#[derive(Clone, Debug, PartialEq)]
pub enum Arg {
    Positional(ExprId),
    Keyword { name: String, value: ExprId },
    /// `*iterable`
    Star(ExprId),
    /// `**mapping`
    DoubleStar(ExprId),
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum UnaryOp {
    Neg,
    Pos,
    Invert,
    Not,
}

impl UnaryOp {
    pub fn symbol(self) -> &'static str {
        match self {
            UnaryOp::Neg => "-",
            UnaryOp::Pos => "+",
            UnaryOp::Invert => "~",
            UnaryOp::Not => "not",
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    FloorDiv,
    Mod,
    Pow,
    BitAnd,
    BitOr,
    BitXor,
    Shl,
    Shr,
}

impl BinaryOp {
    pub fn symbol(self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::FloorDiv => "//",
            BinaryOp::Mod => "%",
            BinaryOp::Pow => "**",
            BinaryOp::BitAnd => "&",
            BinaryOp::BitOr => "|",
            BinaryOp::BitXor => "^",
            BinaryOp::Shl => "<<",
            BinaryOp::Shr => ">>",
        }
    }

    /// Binding strength for precedence climbing (higher binds tighter).
    ///
    /// `**` is handled separately by the parser because it is
    /// right-associative and binds tighter than unary minus on its left.
    pub fn precedence(self) -> u8 {
        match self {
            BinaryOp::BitOr => 1,
            BinaryOp::BitXor => 2,
            BinaryOp::BitAnd => 3,
            BinaryOp::Shl | BinaryOp::Shr => 4,
            BinaryOp::Add | BinaryOp::Sub => 5,
            BinaryOp::Mul | BinaryOp::Div | BinaryOp::FloorDiv | BinaryOp::Mod => 6,
            BinaryOp::Pow => 7,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum BoolOp {
    And,
    Or,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum CmpOp {
    Eq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,
    In,
    NotIn,
    Is,
    IsNot,
}

impl CmpOp {
    pub fn symbol(self) -> &'static str {
        match self {
            CmpOp::Eq => "==",
            CmpOp::NotEq => "!=",
            CmpOp::Lt => "<",
            CmpOp::LtEq => "<=",
            CmpOp::Gt => ">",
            CmpOp::GtEq => ">=",
            CmpOp::In => "in",
            CmpOp::NotIn => "not in",
            CmpOp::Is => "is",
            CmpOp::IsNot => "is not",
        }
    }
}

/// Flat storage for every expression of a program.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ExprArena {
    exprs: Vec<Expr>,
}

impl ExprArena {
    pub fn new() -> Self {
        ExprArena { exprs: Vec::new() }
    }

    /// Store an expression and return its id.
    ///
    /// # Panics
    /// Panics if the arena would exceed `u32::MAX` expressions.
    pub fn alloc(&mut self, expr: Expr) -> ExprId {
        let id = u32::try_from(self.exprs.len())
            .unwrap_or_else(|_| panic!("expression arena exceeds {} entries", u32::MAX));
        self.exprs.push(expr);
        ExprId(id)
    }

    /// Look up an expression.
    ///
    /// Ids are only minted by [`ExprArena::alloc`], so an id from this arena
    /// is always in bounds.
    #[inline]
    pub fn get(&self, id: ExprId) -> &Expr {
        &self.exprs[id.index()]
    }

    #[inline]
    pub fn kind(&self, id: ExprId) -> &ExprKind {
        &self.get(id).kind
    }

    #[inline]
    pub fn span(&self, id: ExprId) -> Span {
        self.get(id).span
    }

    pub fn len(&self) -> usize {
        self.exprs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.exprs.is_empty()
    }
}

/// One name in an import statement: `a.b.c as alias`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ImportName {
    /// Dotted module (or symbol) name.
    pub path: String,
    pub alias: Option<String>,
    pub span: Span,
}

/// What a `from m import ...` statement names.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ImportedNames {
    /// `from m import *`
    All,
    Names(Vec<ImportName>),
}

#[derive(Clone, Debug, PartialEq)]
pub struct Stmt {
    pub kind: StmtKind,
    pub span: Span,
}

#[derive(Clone, Debug, PartialEq)]
pub enum StmtKind {
    /// `import a, b.c as d`
    Import(Vec<ImportName>),
    /// `from m import x, y`
    FromImport {
        module: String,
        names: ImportedNames,
    },
    /// `a = b = value`; targets are arbitrary expressions, only names bind.
    Assign { targets: Vec<ExprId>, value: ExprId },
    /// `a += value`
    AugAssign {
        target: ExprId,
        op: BinaryOp,
        value: ExprId,
    },
    /// `a: annotation = value`
    AnnAssign {
        target: ExprId,
        annotation: ExprId,
        value: Option<ExprId>,
    },
    /// Bare expression statement.
    Expr(ExprId),
    Pass,
}

/// A parsed configuration program.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Program {
    pub stmts: Vec<Stmt>,
    pub arena: ExprArena,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_arena_alloc_returns_sequential_ids() {
        let mut arena = ExprArena::new();
        let a = arena.alloc(Expr::new(ExprKind::Int(1), Span::new(0, 1)));
        let b = arena.alloc(Expr::new(ExprKind::Name("x".into()), Span::new(2, 3)));
        assert_eq!(a.index(), 0);
        assert_eq!(b.index(), 1);
        assert_eq!(arena.kind(b), &ExprKind::Name("x".into()));
        assert_eq!(arena.span(a), Span::new(0, 1));
    }

    #[test]
    fn test_precedence_order() {
        assert!(BinaryOp::Mul.precedence() > BinaryOp::Add.precedence());
        assert!(BinaryOp::Add.precedence() > BinaryOp::Shl.precedence());
        assert!(BinaryOp::BitAnd.precedence() > BinaryOp::BitOr.precedence());
    }
}
