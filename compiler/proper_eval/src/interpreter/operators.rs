//! Operator semantics.
//!
//! Direct enum dispatch over the fixed value set. Integer arithmetic is
//! checked: overflow is an evaluation error rather than a wrap or a bigint
//! promotion. Division, floor division and modulo follow the sign rules of
//! the configuration syntax's host language.

use std::cmp::Ordering;

use proper_ir::{BinaryOp, CmpOp, UnaryOp};

use crate::errors::{self, EvalResult};
use crate::Value;

/// Longest string, list or tuple a repetition may produce.
pub(crate) const MAX_SEQUENCE_LEN: usize = 1 << 20;

#[derive(Copy, Clone)]
enum Num {
    Int(i64),
    Float(f64),
}

impl Num {
    fn of(value: &Value) -> Option<Num> {
        match value {
            Value::Int(n) => Some(Num::Int(*n)),
            Value::Bool(b) => Some(Num::Int(i64::from(*b))),
            Value::Float(f) => Some(Num::Float(*f)),
            _ => None,
        }
    }

    fn to_f64(self) -> f64 {
        match self {
            Num::Int(n) => int_to_float(n),
            Num::Float(f) => f,
        }
    }
}

#[allow(clippy::cast_precision_loss)]
fn int_to_float(n: i64) -> f64 {
    n as f64
}

// Binary operators

pub fn binary(op: BinaryOp, left: &Value, right: &Value) -> EvalResult {
    if let (Value::Bool(a), Value::Bool(b)) = (left, right) {
        match op {
            BinaryOp::BitAnd => return Ok(Value::Bool(*a & *b)),
            BinaryOp::BitOr => return Ok(Value::Bool(*a | *b)),
            BinaryOp::BitXor => return Ok(Value::Bool(*a ^ *b)),
            _ => {}
        }
    }

    let mismatch = || errors::unsupported_operand(op.symbol(), left.type_name(), right.type_name());
    match (Num::of(left), Num::of(right)) {
        (Some(Num::Int(a)), Some(Num::Int(b))) => return int_binary(op, a, b),
        (Some(a), Some(b)) => {
            return float_binary(op, a.to_f64(), b.to_f64()).unwrap_or_else(|| Err(mismatch()))
        }
        _ => {}
    }

    match (op, left, right) {
        (BinaryOp::Add, Value::Str(a), Value::Str(b)) => {
            let mut joined = String::with_capacity(a.len() + b.len());
            joined.push_str(a);
            joined.push_str(b);
            Ok(Value::str(joined))
        }
        (BinaryOp::Add, Value::List(a), Value::List(b)) => {
            Ok(Value::list(a.iter().chain(b.iter()).cloned().collect()))
        }
        (BinaryOp::Add, Value::Tuple(a), Value::Tuple(b)) => {
            Ok(Value::tuple(a.iter().chain(b.iter()).cloned().collect()))
        }
        (BinaryOp::Mul, seq @ (Value::Str(_) | Value::List(_) | Value::Tuple(_)), count)
        | (BinaryOp::Mul, count, seq @ (Value::Str(_) | Value::List(_) | Value::Tuple(_))) => {
            match count {
                Value::Int(_) | Value::Bool(_) => repeat(seq, count.as_int().unwrap_or(0)),
                _ => Err(mismatch()),
            }
        }
        (BinaryOp::BitOr, Value::Dict(a), Value::Dict(b)) => {
            let mut merged = a.as_ref().clone();
            merged.extend_from(b);
            Ok(Value::dict(merged))
        }
        _ => Err(mismatch()),
    }
}

fn int_binary(op: BinaryOp, a: i64, b: i64) -> EvalResult {
    let checked = |result: Option<i64>| result.map(Value::Int).ok_or_else(errors::integer_overflow);
    match op {
        BinaryOp::Add => checked(a.checked_add(b)),
        BinaryOp::Sub => checked(a.checked_sub(b)),
        BinaryOp::Mul => checked(a.checked_mul(b)),
        BinaryOp::Div => {
            if b == 0 {
                return Err(errors::division_by_zero());
            }
            Ok(Value::Float(int_to_float(a) / int_to_float(b)))
        }
        BinaryOp::FloorDiv => {
            if b == 0 {
                return Err(errors::integer_division_by_zero());
            }
            checked(floor_div(a, b))
        }
        BinaryOp::Mod => {
            if b == 0 {
                return Err(errors::modulo_by_zero());
            }
            checked(floor_mod(a, b))
        }
        BinaryOp::Pow => int_pow(a, b),
        BinaryOp::BitAnd => Ok(Value::Int(a & b)),
        BinaryOp::BitOr => Ok(Value::Int(a | b)),
        BinaryOp::BitXor => Ok(Value::Int(a ^ b)),
        BinaryOp::Shl => shift_left(a, b),
        BinaryOp::Shr => shift_right(a, b),
    }
}

/// Quotient rounded toward negative infinity.
fn floor_div(a: i64, b: i64) -> Option<i64> {
    let quotient = a.checked_div(b)?;
    if a % b != 0 && (a < 0) != (b < 0) {
        quotient.checked_sub(1)
    } else {
        Some(quotient)
    }
}

/// Remainder with the sign of the divisor.
fn floor_mod(a: i64, b: i64) -> Option<i64> {
    let rem = a.checked_rem(b)?;
    if rem != 0 && (rem < 0) != (b < 0) {
        Some(rem + b)
    } else {
        Some(rem)
    }
}

fn int_pow(base: i64, exp: i64) -> EvalResult {
    if exp < 0 {
        return float_pow(int_to_float(base), int_to_float(exp));
    }
    let Ok(exp) = u32::try_from(exp) else {
        return match base {
            0 | 1 => Ok(Value::Int(base)),
            -1 if exp % 2 == 0 => Ok(Value::Int(1)),
            -1 => Ok(Value::Int(-1)),
            _ => Err(errors::integer_overflow()),
        };
    };
    base.checked_pow(exp)
        .map(Value::Int)
        .ok_or_else(errors::integer_overflow)
}

fn shift_left(a: i64, b: i64) -> EvalResult {
    if b < 0 {
        return Err(errors::negative_shift_count());
    }
    if a == 0 {
        return Ok(Value::Int(0));
    }
    match u32::try_from(b) {
        Ok(shift) if shift < 64 && (a << shift) >> shift == a => Ok(Value::Int(a << shift)),
        _ => Err(errors::integer_overflow()),
    }
}

fn shift_right(a: i64, b: i64) -> EvalResult {
    if b < 0 {
        return Err(errors::negative_shift_count());
    }
    let shift = u32::try_from(b).map_or(63, |shift| shift.min(63));
    Ok(Value::Int(a >> shift))
}

/// Float arithmetic; `None` for operators floats do not support.
fn float_binary(op: BinaryOp, a: f64, b: f64) -> Option<EvalResult> {
    let result = match op {
        BinaryOp::Add => Ok(Value::Float(a + b)),
        BinaryOp::Sub => Ok(Value::Float(a - b)),
        BinaryOp::Mul => Ok(Value::Float(a * b)),
        BinaryOp::Div if b == 0.0 => Err(errors::float_division_by_zero()),
        BinaryOp::Div => Ok(Value::Float(a / b)),
        BinaryOp::FloorDiv | BinaryOp::Mod if b == 0.0 => Err(errors::float_division_by_zero()),
        BinaryOp::FloorDiv => Ok(Value::Float((a / b).floor())),
        BinaryOp::Mod => {
            let rem = a % b;
            if rem != 0.0 && (rem < 0.0) != (b < 0.0) {
                Ok(Value::Float(rem + b))
            } else {
                Ok(Value::Float(rem))
            }
        }
        BinaryOp::Pow => float_pow(a, b),
        BinaryOp::BitAnd
        | BinaryOp::BitOr
        | BinaryOp::BitXor
        | BinaryOp::Shl
        | BinaryOp::Shr => return None,
    };
    Some(result)
}

fn float_pow(base: f64, exp: f64) -> EvalResult {
    if base == 0.0 && exp < 0.0 {
        return Err(errors::zero_to_negative_power());
    }
    if base < 0.0 && exp.is_finite() && exp.fract() != 0.0 {
        return Err(errors::fractional_power_of_negative());
    }
    Ok(Value::Float(base.powf(exp)))
}

fn repeat(seq: &Value, count: i64) -> EvalResult {
    let times = usize::try_from(count).unwrap_or(0);
    let unit = match seq {
        Value::Str(s) => s.len(),
        Value::List(items) | Value::Tuple(items) => items.len(),
        _ => 0,
    };
    if unit == 0 || times == 0 {
        return Ok(match seq {
            Value::Str(_) => Value::str(""),
            Value::List(_) => Value::list(Vec::new()),
            Value::Tuple(_) => Value::tuple(Vec::new()),
            other => other.clone(),
        });
    }
    if unit.checked_mul(times).map_or(true, |len| len > MAX_SEQUENCE_LEN) {
        return Err(errors::sequence_too_long());
    }
    let repeated = |items: &[Value]| -> Vec<Value> {
        (0..times).flat_map(|_| items.iter().cloned()).collect()
    };
    Ok(match seq {
        Value::Str(s) => Value::str(s.repeat(times)),
        Value::List(items) => Value::list(repeated(items)),
        Value::Tuple(items) => Value::tuple(repeated(items)),
        other => other.clone(),
    })
}

// Unary operators

pub fn unary(op: UnaryOp, operand: &Value) -> EvalResult {
    match (op, operand) {
        (UnaryOp::Not, value) => Ok(Value::Bool(!value.is_truthy())),
        (UnaryOp::Neg, Value::Float(f)) => Ok(Value::Float(-f)),
        (UnaryOp::Neg, Value::Int(_) | Value::Bool(_)) => operand
            .as_int()
            .and_then(i64::checked_neg)
            .map(Value::Int)
            .ok_or_else(errors::integer_overflow),
        (UnaryOp::Pos, Value::Float(f)) => Ok(Value::Float(*f)),
        (UnaryOp::Pos | UnaryOp::Invert, Value::Int(_) | Value::Bool(_)) => {
            let n = operand.as_int().unwrap_or(0);
            Ok(Value::Int(if op == UnaryOp::Invert { !n } else { n }))
        }
        _ => Err(errors::bad_unary_operand(op.symbol(), operand.type_name())),
    }
}

// Comparisons

pub fn compare(op: CmpOp, left: &Value, right: &Value) -> EvalResult<bool> {
    let ordered = |accept: fn(Ordering) -> bool| -> EvalResult<bool> {
        Ok(ordering(left, right, op.symbol())?.is_some_and(accept))
    };
    match op {
        CmpOp::Eq => Ok(left == right),
        CmpOp::NotEq => Ok(left != right),
        CmpOp::Lt => ordered(Ordering::is_lt),
        CmpOp::LtEq => ordered(Ordering::is_le),
        CmpOp::Gt => ordered(Ordering::is_gt),
        CmpOp::GtEq => ordered(Ordering::is_ge),
        CmpOp::In => contains(right, left),
        CmpOp::NotIn => contains(right, left).map(|found| !found),
        CmpOp::Is => Ok(left.is_same(right)),
        CmpOp::IsNot => Ok(!left.is_same(right)),
    }
}

/// Order two values; `None` when they are unordered (a NaN is involved).
pub(crate) fn ordering(left: &Value, right: &Value, op: &str) -> EvalResult<Option<Ordering>> {
    match (Num::of(left), Num::of(right)) {
        (Some(Num::Int(a)), Some(Num::Int(b))) => return Ok(Some(a.cmp(&b))),
        (Some(a), Some(b)) => return Ok(a.to_f64().partial_cmp(&b.to_f64())),
        _ => {}
    }
    match (left, right) {
        (Value::Str(a), Value::Str(b)) => Ok(Some(a.cmp(b))),
        (Value::List(a), Value::List(b)) | (Value::Tuple(a), Value::Tuple(b)) => {
            for (x, y) in a.iter().zip(b.iter()) {
                if x != y {
                    return ordering(x, y, op);
                }
            }
            Ok(Some(a.len().cmp(&b.len())))
        }
        _ => Err(errors::not_comparable(op, left.type_name(), right.type_name())),
    }
}

/// Membership test for `in`.
pub(crate) fn contains(container: &Value, item: &Value) -> EvalResult<bool> {
    match container {
        Value::Str(text) => match item {
            Value::Str(needle) => Ok(text.contains(&**needle)),
            other => Err(errors::in_string_requires_string(other.type_name())),
        },
        Value::List(items) | Value::Tuple(items) => Ok(items.iter().any(|v| v == item)),
        Value::Dict(dict) => Ok(item.as_str().is_some_and(|key| dict.contains_key(key))),
        Value::Node(node) => Ok(item
            .as_str()
            .is_some_and(|key| node.entries().contains_key(key))),
        other => Err(errors::not_a_container(other.type_name())),
    }
}

// Subscripts

pub fn subscript(receiver: &Value, index: &Value) -> EvalResult {
    match receiver {
        Value::List(items) => Ok(items[resolve_index(items.len(), index, "list")?].clone()),
        Value::Tuple(items) => Ok(items[resolve_index(items.len(), index, "tuple")?].clone()),
        Value::Str(text) => {
            let chars: Vec<char> = text.chars().collect();
            let at = resolve_index(chars.len(), index, "string")?;
            Ok(Value::str(chars[at].to_string()))
        }
        Value::Dict(dict) => index
            .as_str()
            .and_then(|key| dict.get(key))
            .cloned()
            .ok_or_else(|| errors::key_not_found(index)),
        Value::Node(node) => index
            .as_str()
            .and_then(|key| node.entries().get(key).cloned())
            .ok_or_else(|| errors::key_not_found(index)),
        other => Err(errors::not_subscriptable(other.type_name())),
    }
}

/// Resolve a possibly negative index against a sequence length.
fn resolve_index(len: usize, index: &Value, type_name: &str) -> EvalResult<usize> {
    let Some(i) = index.as_int() else {
        return Err(errors::indices_must_be_integers(type_name, index.type_name()));
    };
    let signed_len = i64::try_from(len).map_err(|_| errors::integer_overflow())?;
    let position = if i < 0 { i + signed_len } else { i };
    usize::try_from(position)
        .ok()
        .filter(|&at| at < len)
        .ok_or_else(|| errors::index_out_of_range(type_name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::EvalError;
    use pretty_assertions::assert_eq;

    fn int(n: i64) -> Value {
        Value::Int(n)
    }

    #[test]
    fn test_floor_division_and_modulo_signs() {
        assert_eq!(binary(BinaryOp::FloorDiv, &int(-7), &int(2)), Ok(int(-4)));
        assert_eq!(binary(BinaryOp::Mod, &int(-7), &int(2)), Ok(int(1)));
        assert_eq!(binary(BinaryOp::Mod, &int(7), &int(-2)), Ok(int(-1)));
        assert_eq!(
            binary(BinaryOp::Mod, &Value::Float(-7.5), &int(2)),
            Ok(Value::Float(0.5))
        );
    }

    #[test]
    fn test_true_division_gives_float() {
        assert_eq!(binary(BinaryOp::Div, &int(7), &int(2)), Ok(Value::Float(3.5)));
        assert_eq!(
            binary(BinaryOp::Div, &int(1), &int(0)),
            Err(EvalError::new("division by zero"))
        );
        assert_eq!(
            binary(BinaryOp::FloorDiv, &int(1), &int(0)),
            Err(EvalError::new("integer division or modulo by zero"))
        );
    }

    #[test]
    fn test_overflow_is_an_error() {
        assert_eq!(
            binary(BinaryOp::Add, &int(i64::MAX), &int(1)),
            Err(EvalError::new("integer overflow"))
        );
        assert_eq!(
            binary(BinaryOp::Pow, &int(2), &int(64)),
            Err(EvalError::new("integer overflow"))
        );
        assert_eq!(
            binary(BinaryOp::Shl, &int(1), &int(63)),
            Err(EvalError::new("integer overflow"))
        );
        assert_eq!(binary(BinaryOp::Pow, &int(1), &int(i64::MAX)), Ok(int(1)));
    }

    #[test]
    fn test_power() {
        assert_eq!(binary(BinaryOp::Pow, &int(2), &int(10)), Ok(int(1024)));
        assert_eq!(binary(BinaryOp::Pow, &int(2), &int(-1)), Ok(Value::Float(0.5)));
        assert_eq!(
            binary(BinaryOp::Pow, &int(0), &int(-1)),
            Err(EvalError::new("0.0 cannot be raised to a negative power"))
        );
    }

    #[test]
    fn test_shifts() {
        assert_eq!(binary(BinaryOp::Shl, &int(3), &int(2)), Ok(int(12)));
        assert_eq!(binary(BinaryOp::Shr, &int(-9), &int(100)), Ok(int(-1)));
        assert_eq!(
            binary(BinaryOp::Shr, &int(1), &int(-1)),
            Err(EvalError::new("negative shift count"))
        );
    }

    #[test]
    fn test_bool_arithmetic_and_bitwise() {
        let t = Value::Bool(true);
        assert_eq!(binary(BinaryOp::Add, &t, &t), Ok(int(2)));
        assert_eq!(binary(BinaryOp::BitAnd, &t, &Value::Bool(false)), Ok(Value::Bool(false)));
    }

    #[test]
    fn test_sequence_operators() {
        assert_eq!(
            binary(BinaryOp::Add, &Value::str("ab"), &Value::str("cd")),
            Ok(Value::str("abcd"))
        );
        assert_eq!(
            binary(BinaryOp::Mul, &int(3), &Value::str("ab")),
            Ok(Value::str("ababab"))
        );
        assert_eq!(
            binary(BinaryOp::Mul, &Value::list(vec![int(1)]), &int(-2)),
            Ok(Value::list(vec![]))
        );
        assert_eq!(
            binary(BinaryOp::Mul, &Value::str("x"), &int(i64::MAX)),
            Err(EvalError::new("repeated sequence is too long"))
        );
    }

    #[test]
    fn test_repeating_empty_sequences_is_immediate() {
        let huge = int(1_000_000_000_000_000_000);
        assert_eq!(
            binary(BinaryOp::Mul, &Value::list(vec![]), &huge),
            Ok(Value::list(vec![]))
        );
        assert_eq!(
            binary(BinaryOp::Mul, &huge, &Value::tuple(vec![])),
            Ok(Value::tuple(vec![]))
        );
        assert_eq!(binary(BinaryOp::Mul, &Value::str(""), &huge), Ok(Value::str("")));
        assert_eq!(
            binary(BinaryOp::Mul, &Value::list(vec![int(1)]), &int(0)),
            Ok(Value::list(vec![]))
        );
    }

    #[test]
    fn test_mismatched_operands() {
        assert_eq!(
            binary(BinaryOp::Add, &Value::str("a"), &int(1)),
            Err(EvalError::new(
                "unsupported operand type(s) for +: 'str' and 'int'"
            ))
        );
        assert_eq!(
            binary(BinaryOp::Shl, &Value::Float(1.0), &int(1)),
            Err(EvalError::new(
                "unsupported operand type(s) for <<: 'float' and 'int'"
            ))
        );
    }

    #[test]
    fn test_dict_union() {
        let a = Value::dict([("a", int(1)), ("b", int(2))].into_iter().collect());
        let b = Value::dict([("b", int(3))].into_iter().collect());
        let expected = Value::dict([("a", int(1)), ("b", int(3))].into_iter().collect());
        assert_eq!(binary(BinaryOp::BitOr, &a, &b), Ok(expected));
    }

    #[test]
    fn test_unary() {
        assert_eq!(unary(UnaryOp::Neg, &int(5)), Ok(int(-5)));
        assert_eq!(unary(UnaryOp::Invert, &int(5)), Ok(int(-6)));
        assert_eq!(unary(UnaryOp::Pos, &Value::Bool(true)), Ok(int(1)));
        assert_eq!(unary(UnaryOp::Not, &Value::str("")), Ok(Value::Bool(true)));
        assert_eq!(
            unary(UnaryOp::Neg, &Value::str("a")),
            Err(EvalError::new("bad operand type for unary -: 'str'"))
        );
    }

    #[test]
    fn test_comparisons() {
        assert_eq!(compare(CmpOp::Lt, &int(1), &Value::Float(1.5)), Ok(true));
        assert_eq!(compare(CmpOp::GtEq, &Value::str("b"), &Value::str("a")), Ok(true));
        let nan = Value::Float(f64::NAN);
        assert_eq!(compare(CmpOp::Lt, &nan, &int(1)), Ok(false));
        assert_eq!(compare(CmpOp::GtEq, &nan, &int(1)), Ok(false));
        let short = Value::list(vec![int(1), int(2)]);
        let long = Value::list(vec![int(1), int(2), int(0)]);
        assert_eq!(compare(CmpOp::Lt, &short, &long), Ok(true));
        assert_eq!(
            compare(CmpOp::Lt, &int(1), &Value::str("a")),
            Err(EvalError::new(
                "'<' not supported between instances of 'int' and 'str'"
            ))
        );
    }

    #[test]
    fn test_membership() {
        assert_eq!(compare(CmpOp::In, &Value::str("ell"), &Value::str("hello")), Ok(true));
        let dict = Value::dict([("k", int(1))].into_iter().collect());
        assert_eq!(compare(CmpOp::In, &Value::str("k"), &dict), Ok(true));
        assert_eq!(compare(CmpOp::NotIn, &int(3), &Value::list(vec![int(1)])), Ok(true));
        assert_eq!(
            compare(CmpOp::In, &int(1), &Value::str("1")),
            Err(EvalError::new(
                "'in <string>' requires string as left operand, not int"
            ))
        );
    }

    #[test]
    fn test_subscripts() {
        let list = Value::list(vec![int(10), int(20), int(30)]);
        assert_eq!(subscript(&list, &int(-1)), Ok(int(30)));
        assert_eq!(
            subscript(&list, &int(3)),
            Err(EvalError::new("list index out of range"))
        );
        assert_eq!(
            subscript(&list, &Value::str("0")),
            Err(EvalError::new("list indices must be integers, not str"))
        );
        assert_eq!(subscript(&Value::str("héllo"), &int(1)), Ok(Value::str("é")));
        let dict = Value::dict([("k", int(1))].into_iter().collect());
        assert_eq!(
            subscript(&dict, &Value::str("missing")),
            Err(EvalError::new("'missing'"))
        );
        assert_eq!(
            subscript(&int(1), &int(0)),
            Err(EvalError::new("'int' object is not subscriptable"))
        );
    }
}
