//! Constant-literal evaluation.
//!
//! The first of the two resolution passes: accepts only constants,
//! displays of constants, and unary `+`/`-` applied to a number. No names,
//! no calls, no operators beyond that. Anything else yields `None` and is
//! left to the [`Interpreter`](crate::Interpreter).

use proper_ir::{ensure_sufficient_stack, DictEntry, ExprArena, ExprId, ExprKind, UnaryOp};

use crate::{Dict, Value};

pub fn literal_eval(arena: &ExprArena, id: ExprId) -> Option<Value> {
    ensure_sufficient_stack(|| eval(arena, id))
}

fn eval(arena: &ExprArena, id: ExprId) -> Option<Value> {
    match arena.kind(id) {
        ExprKind::None => Some(Value::None),
        ExprKind::Bool(b) => Some(Value::Bool(*b)),
        ExprKind::Int(n) => Some(Value::Int(*n)),
        ExprKind::Float(f) => Some(Value::Float(*f)),
        ExprKind::Str(s) => Some(Value::str(s.as_str())),
        ExprKind::List(items) => items_of(arena, items).map(Value::list),
        ExprKind::Tuple(items) => items_of(arena, items).map(Value::tuple),
        ExprKind::Dict(entries) => {
            let mut dict = Dict::new();
            for entry in entries {
                let DictEntry::Pair { key, value } = entry else {
                    return None;
                };
                let ExprKind::Str(key) = arena.kind(*key) else {
                    return None;
                };
                dict.insert(key.as_str(), literal_eval(arena, *value)?);
            }
            Some(Value::dict(dict))
        }
        ExprKind::Unary { op, operand } => signed(*op, arena.kind(*operand)),
        _ => None,
    }
}

fn items_of(arena: &ExprArena, items: &[ExprId]) -> Option<Vec<Value>> {
    items.iter().map(|&item| literal_eval(arena, item)).collect()
}

fn signed(op: UnaryOp, operand: &ExprKind) -> Option<Value> {
    match (op, operand) {
        (UnaryOp::Pos, ExprKind::Int(n)) => Some(Value::Int(*n)),
        (UnaryOp::Pos, ExprKind::Float(f)) => Some(Value::Float(*f)),
        (UnaryOp::Neg, ExprKind::Int(n)) => n.checked_neg().map(Value::Int),
        (UnaryOp::Neg, ExprKind::Float(f)) => Some(Value::Float(-f)),
        _ => None,
    }
}
