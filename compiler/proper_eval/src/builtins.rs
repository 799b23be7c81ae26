//! Built-in functions available in every sandbox namespace.
//!
//! These are the side-effect free builtins of the host syntax. `print`
//! logs through `tracing` instead of writing to stdout.

use std::cmp::Ordering;

use proper_ir::BinaryOp;

use crate::callable::{type_error, CallArgs, NativeFn};
use crate::errors::{self, EvalError, EvalResult};
use crate::interpreter::operators::{self, MAX_SEQUENCE_LEN};
use crate::{Dict, Value};

const BUILTINS: &[NativeFn] = &[
    NativeFn::new("len", builtin_len),
    NativeFn::new("str", builtin_str),
    NativeFn::new("int", builtin_int),
    NativeFn::new("float", builtin_float),
    NativeFn::new("bool", builtin_bool),
    NativeFn::new("list", builtin_list),
    NativeFn::new("tuple", builtin_tuple),
    NativeFn::new("dict", builtin_dict),
    NativeFn::new("range", builtin_range),
    NativeFn::new("min", builtin_min),
    NativeFn::new("max", builtin_max),
    NativeFn::new("sum", builtin_sum),
    NativeFn::new("abs", builtin_abs),
    NativeFn::new("round", builtin_round),
    NativeFn::new("sorted", builtin_sorted),
    NativeFn::new("reversed", builtin_reversed),
    NativeFn::new("enumerate", builtin_enumerate),
    NativeFn::new("zip", builtin_zip),
    NativeFn::new("any", builtin_any),
    NativeFn::new("all", builtin_all),
    NativeFn::new("repr", builtin_repr),
    NativeFn::new("print", builtin_print),
];

/// Bind every builtin into `namespace`.
pub fn install(namespace: &mut Dict) {
    for builtin in BUILTINS {
        namespace.insert(crate::Callable::name(builtin), Value::function(*builtin));
    }
}

/// Names of the builtins, in installation order.
pub fn names() -> impl Iterator<Item = &'static str> {
    BUILTINS.iter().map(|builtin| crate::Callable::name(builtin))
}

/// Materialize an iterable: sequences give their items, strings their
/// characters, mappings their keys.
pub(crate) fn iterate(value: &Value) -> EvalResult<Vec<Value>> {
    match value {
        Value::List(items) | Value::Tuple(items) => Ok(items.as_ref().clone()),
        Value::Str(text) => Ok(text.chars().map(|c| Value::str(c.to_string())).collect()),
        Value::Dict(dict) => Ok(dict.keys().map(Value::str).collect()),
        Value::Node(node) => Ok(node.entries().keys().map(Value::str).collect()),
        other => Err(errors::not_iterable(other.type_name())),
    }
}

/// Truncate a float to an integer, failing for NaN, infinities and
/// values outside the `i64` range.
pub(crate) fn float_to_int(f: f64) -> EvalResult<i64> {
    if f.is_nan() {
        return Err(errors::value_error("cannot convert float NaN to integer"));
    }
    if f.is_infinite() {
        return Err(EvalError::new("cannot convert float infinity to integer"));
    }
    let truncated = f.trunc();
    let bound = 2f64.powi(63);
    if truncated >= bound || truncated < -bound {
        return Err(errors::integer_overflow());
    }
    #[allow(clippy::cast_possible_truncation)]
    let n = truncated as i64;
    Ok(n)
}

fn count(n: usize) -> EvalResult {
    i64::try_from(n)
        .map(Value::Int)
        .map_err(|_| errors::integer_overflow())
}

fn single<'a>(args: &'a CallArgs, func: &str) -> EvalResult<&'a Value> {
    args.no_keywords(func)?;
    args.arity(func, 1, 1)?;
    Ok(&args.positional[0])
}

fn builtin_len(args: CallArgs) -> EvalResult {
    match single(&args, "len")? {
        Value::Str(text) => count(text.chars().count()),
        Value::List(items) | Value::Tuple(items) => count(items.len()),
        Value::Dict(dict) => count(dict.len()),
        Value::Node(node) => count(node.entries().len()),
        other => Err(errors::EvalError::new(format!(
            "object of type '{}' has no len()",
            other.type_name()
        ))),
    }
}

fn builtin_str(args: CallArgs) -> EvalResult {
    args.no_keywords("str")?;
    args.arity("str", 0, 1)?;
    Ok(match args.positional.first() {
        Some(Value::Str(text)) => Value::Str(text.clone()),
        Some(value) => Value::str(value.to_string()),
        None => Value::str(""),
    })
}

fn builtin_int(args: CallArgs) -> EvalResult {
    args.no_keywords("int")?;
    args.arity("int", 0, 2)?;
    let Some(value) = args.positional.first() else {
        return Ok(Value::Int(0));
    };
    if let Some(base) = args.positional.get(1) {
        let Some(text) = value.as_str() else {
            return Err(errors::EvalError::new(
                "int() can't convert non-string with explicit base",
            ));
        };
        let base = base
            .as_int()
            .and_then(|b| u32::try_from(b).ok())
            .filter(|b| (2..=36).contains(b))
            .ok_or_else(|| errors::value_error("int() base must be >= 2 and <= 36"))?;
        return parse_int(text, base);
    }
    match value {
        Value::Int(n) => Ok(Value::Int(*n)),
        Value::Bool(b) => Ok(Value::Int(i64::from(*b))),
        Value::Float(f) => float_to_int(*f).map(Value::Int),
        Value::Str(text) => parse_int(text, 10),
        other => Err(type_error("int", "a string or a number", other)),
    }
}

fn parse_int(text: &str, base: u32) -> EvalResult {
    let cleaned: String = text.trim().chars().filter(|&c| c != '_').collect();
    i64::from_str_radix(&cleaned, base)
        .map(Value::Int)
        .map_err(|_| errors::invalid_literal(base, text))
}

fn builtin_float(args: CallArgs) -> EvalResult {
    args.no_keywords("float")?;
    args.arity("float", 0, 1)?;
    match args.positional.first() {
        None => Ok(Value::Float(0.0)),
        Some(Value::Str(text)) => text
            .trim()
            .parse::<f64>()
            .map(Value::Float)
            .map_err(|_| errors::invalid_float(text)),
        Some(value) => value
            .as_float()
            .map(Value::Float)
            .ok_or_else(|| type_error("float", "a string or a number", value)),
    }
}

fn builtin_bool(args: CallArgs) -> EvalResult {
    args.no_keywords("bool")?;
    args.arity("bool", 0, 1)?;
    Ok(Value::Bool(args.positional.first().is_some_and(Value::is_truthy)))
}

fn builtin_list(args: CallArgs) -> EvalResult {
    args.no_keywords("list")?;
    args.arity("list", 0, 1)?;
    match args.positional.first() {
        Some(value) => iterate(value).map(Value::list),
        None => Ok(Value::list(Vec::new())),
    }
}

fn builtin_tuple(args: CallArgs) -> EvalResult {
    args.no_keywords("tuple")?;
    args.arity("tuple", 0, 1)?;
    match args.positional.first() {
        Some(value) => iterate(value).map(Value::tuple),
        None => Ok(Value::tuple(Vec::new())),
    }
}

fn builtin_dict(args: CallArgs) -> EvalResult {
    args.arity("dict", 0, 1)?;
    let mut dict = Dict::new();
    if let Some(source) = args.positional.first() {
        if let Some(mapping) = source.as_mapping() {
            dict.extend_from(&mapping);
        } else {
            for (i, pair) in iterate(source)?.iter().enumerate() {
                match pair {
                    Value::List(kv) | Value::Tuple(kv) if kv.len() == 2 => match &kv[0] {
                        Value::Str(key) => {
                            dict.insert(&**key, kv[1].clone());
                        }
                        other => return Err(errors::dict_keys_must_be_strings(other.type_name())),
                    },
                    _ => {
                        return Err(errors::value_error(format!(
                            "dictionary update sequence element #{i} is not a key/value pair"
                        )))
                    }
                }
            }
        }
    }
    for (key, value) in args.keywords {
        dict.insert(key, value);
    }
    Ok(Value::dict(dict))
}

fn int_arg(func: &str, value: &Value) -> EvalResult<i64> {
    match value {
        Value::Int(_) | Value::Bool(_) => Ok(value.as_int().unwrap_or(0)),
        other => Err(type_error(func, "an integer", other)),
    }
}

fn builtin_range(args: CallArgs) -> EvalResult {
    args.no_keywords("range")?;
    args.arity("range", 1, 3)?;
    let bounds = args
        .positional
        .iter()
        .map(|value| int_arg("range", value))
        .collect::<EvalResult<Vec<i64>>>()?;
    let (start, stop, step) = match bounds[..] {
        [stop] => (0, stop, 1),
        [start, stop] => (start, stop, 1),
        [start, stop, step] => (start, stop, step),
        _ => (0, 0, 1),
    };
    if step == 0 {
        return Err(errors::value_error("range() arg 3 must not be zero"));
    }
    let mut items = Vec::new();
    let mut current = start;
    while (step > 0 && current < stop) || (step < 0 && current > stop) {
        if items.len() >= MAX_SEQUENCE_LEN {
            return Err(errors::sequence_too_long());
        }
        items.push(Value::Int(current));
        match current.checked_add(step) {
            Some(next) => current = next,
            None => break,
        }
    }
    Ok(Value::list(items))
}

/// Total order for sorting; unordered pairs (NaN) compare equal.
fn sort_values(items: &mut [Value], func: &str) -> EvalResult<()> {
    let mut failure = None;
    items.sort_by(|a, b| match operators::ordering(a, b, "<") {
        Ok(order) => order.unwrap_or(Ordering::Equal),
        Err(err) => {
            failure.get_or_insert(err);
            Ordering::Equal
        }
    });
    match failure {
        Some(err) => Err(err),
        None => {
            tracing::trace!(func, len = items.len(), "sorted");
            Ok(())
        }
    }
}

fn extremum(args: &CallArgs, func: &str, wanted: Ordering) -> EvalResult {
    if let Some((key, _)) = args.keywords.iter().find(|(key, _)| key != "default") {
        return Err(errors::unexpected_keyword(func, key));
    }
    let candidates = match args.positional.as_slice() {
        [] => return Err(errors::wrong_arg_count(func, "at least 1 argument", 0)),
        [iterable] => iterate(iterable)?,
        many => many.to_vec(),
    };
    let mut best: Option<Value> = None;
    for candidate in candidates {
        best = Some(match best {
            None => candidate,
            Some(current) => {
                if operators::ordering(&candidate, &current, if wanted == Ordering::Less { "<" } else { ">" })?
                    == Some(wanted)
                {
                    candidate
                } else {
                    current
                }
            }
        });
    }
    best.or_else(|| args.keyword("default").cloned())
        .ok_or_else(|| errors::empty_sequence(func))
}

fn builtin_min(args: CallArgs) -> EvalResult {
    extremum(&args, "min", Ordering::Less)
}

fn builtin_max(args: CallArgs) -> EvalResult {
    extremum(&args, "max", Ordering::Greater)
}

fn builtin_sum(args: CallArgs) -> EvalResult {
    if let Some((key, _)) = args.keywords.iter().find(|(key, _)| key != "start") {
        return Err(errors::unexpected_keyword("sum", key));
    }
    args.arity("sum", 1, 2)?;
    let start = args
        .positional
        .get(1)
        .or_else(|| args.keyword("start"))
        .cloned()
        .unwrap_or(Value::Int(0));
    if start.as_str().is_some() {
        return Err(errors::EvalError::new(
            "sum() can't sum strings [use ''.join(seq) instead]",
        ));
    }
    iterate(&args.positional[0])?
        .iter()
        .try_fold(start, |total, item| operators::binary(BinaryOp::Add, &total, item))
}

fn builtin_abs(args: CallArgs) -> EvalResult {
    match single(&args, "abs")? {
        Value::Float(f) => Ok(Value::Float(f.abs())),
        value @ (Value::Int(_) | Value::Bool(_)) => value
            .as_int()
            .and_then(i64::checked_abs)
            .map(Value::Int)
            .ok_or_else(errors::integer_overflow),
        other => Err(errors::bad_unary_operand("abs()", other.type_name())),
    }
}

fn builtin_round(args: CallArgs) -> EvalResult {
    if let Some((key, _)) = args.keywords.iter().find(|(key, _)| key != "ndigits") {
        return Err(errors::unexpected_keyword("round", key));
    }
    args.arity("round", 1, 2)?;
    let ndigits = match args.positional.get(1).or_else(|| args.keyword("ndigits")) {
        None | Some(Value::None) => None,
        Some(value) => Some(int_arg("round", value)?),
    };
    match (&args.positional[0], ndigits) {
        (Value::Float(f), None) => float_to_int(f.round_ties_even()).map(Value::Int),
        (Value::Float(f), Some(digits)) => {
            let digits = i32::try_from(digits.clamp(-308, 308)).unwrap_or(0);
            let scale = 10f64.powi(digits);
            Ok(Value::Float((f * scale).round_ties_even() / scale))
        }
        (value @ (Value::Int(_) | Value::Bool(_)), _) => Ok(Value::Int(value.as_int().unwrap_or(0))),
        (other, _) => Err(type_error("round", "a number", other)),
    }
}

fn builtin_sorted(args: CallArgs) -> EvalResult {
    if let Some((key, _)) = args.keywords.iter().find(|(key, _)| key != "reverse") {
        return Err(errors::unexpected_keyword("sorted", key));
    }
    args.arity("sorted", 1, 1)?;
    let mut items = iterate(&args.positional[0])?;
    sort_values(&mut items, "sorted")?;
    if args.keyword("reverse").is_some_and(Value::is_truthy) {
        items.reverse();
    }
    Ok(Value::list(items))
}

fn builtin_reversed(args: CallArgs) -> EvalResult {
    let value = single(&args, "reversed")?;
    match value {
        Value::List(_) | Value::Tuple(_) | Value::Str(_) => {
            let mut items = iterate(value)?;
            items.reverse();
            Ok(Value::list(items))
        }
        other => Err(errors::EvalError::new(format!(
            "'{}' object is not reversible",
            other.type_name()
        ))),
    }
}

fn builtin_enumerate(args: CallArgs) -> EvalResult {
    if let Some((key, _)) = args.keywords.iter().find(|(key, _)| key != "start") {
        return Err(errors::unexpected_keyword("enumerate", key));
    }
    args.arity("enumerate", 1, 2)?;
    let start = match args.positional.get(1).or_else(|| args.keyword("start")) {
        Some(value) => int_arg("enumerate", value)?,
        None => 0,
    };
    let mut index = start;
    let mut pairs = Vec::new();
    for item in iterate(&args.positional[0])? {
        pairs.push(Value::tuple(vec![Value::Int(index), item]));
        index = index.checked_add(1).ok_or_else(errors::integer_overflow)?;
    }
    Ok(Value::list(pairs))
}

fn builtin_zip(args: CallArgs) -> EvalResult {
    args.no_keywords("zip")?;
    let columns = args
        .positional
        .iter()
        .map(iterate)
        .collect::<EvalResult<Vec<_>>>()?;
    let rows = columns.iter().map(Vec::len).min().unwrap_or(0);
    let zipped = (0..rows)
        .map(|row| Value::tuple(columns.iter().map(|column| column[row].clone()).collect()))
        .collect();
    Ok(Value::list(zipped))
}

fn builtin_any(args: CallArgs) -> EvalResult {
    let items = iterate(single(&args, "any")?)?;
    Ok(Value::Bool(items.iter().any(Value::is_truthy)))
}

fn builtin_all(args: CallArgs) -> EvalResult {
    let items = iterate(single(&args, "all")?)?;
    Ok(Value::Bool(items.iter().all(Value::is_truthy)))
}

fn builtin_repr(args: CallArgs) -> EvalResult {
    single(&args, "repr").map(|value| Value::str(value.repr()))
}

fn builtin_print(args: CallArgs) -> EvalResult {
    if let Some((key, _)) = args.keywords.iter().find(|(key, _)| key != "sep") {
        return Err(errors::unexpected_keyword("print", key));
    }
    let sep = match args.keyword("sep") {
        None | Some(Value::None) => " ".to_string(),
        Some(Value::Str(sep)) => sep.to_string(),
        Some(other) => return Err(type_error("print", "str or None", other)),
    };
    let line = args
        .positional
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(&sep);
    tracing::info!(target: "proper::print", "{line}");
    Ok(Value::None)
}

#[cfg(test)]
mod tests;
