//! Modules implemented in Rust.

use std::f64::consts;

use super::Module;
use crate::builtins::float_to_int;
use crate::callable::{type_error, CallArgs, NativeFn};
use crate::component::attrs;
use crate::errors::{self, EvalResult};
use crate::interpreter::methods::capitalize;
use crate::{Dict, Value};

fn symbols(constants: &[(&str, Value)], functions: &[NativeFn]) -> Dict {
    let mut dict: Dict = constants.iter().cloned().collect();
    for func in functions {
        dict.insert(crate::Callable::name(func), Value::function(*func));
    }
    dict
}

// proper

/// The first-party module every sandbox may import.
pub(super) fn proper_module() -> Module {
    Module::new("proper", symbols(&[], &[NativeFn::new("attrs", proper_attrs)]))
}

fn proper_attrs(args: CallArgs) -> EvalResult {
    Ok(Value::dict(attrs(&args)))
}

// math

pub(super) fn math_module() -> Module {
    let constants = [
        ("pi", Value::Float(consts::PI)),
        ("e", Value::Float(consts::E)),
        ("tau", Value::Float(consts::TAU)),
        ("inf", Value::Float(f64::INFINITY)),
        ("nan", Value::Float(f64::NAN)),
    ];
    let functions = [
        NativeFn::new("sqrt", math_sqrt),
        NativeFn::new("floor", math_floor),
        NativeFn::new("ceil", math_ceil),
        NativeFn::new("trunc", math_trunc),
        NativeFn::new("fabs", math_fabs),
        NativeFn::new("pow", math_pow),
        NativeFn::new("exp", math_exp),
        NativeFn::new("log", math_log),
        NativeFn::new("sin", math_sin),
        NativeFn::new("cos", math_cos),
        NativeFn::new("tan", math_tan),
        NativeFn::new("isfinite", math_isfinite),
        NativeFn::new("isnan", math_isnan),
        NativeFn::new("gcd", math_gcd),
    ];
    Module::new("math", symbols(&constants, &functions))
}

fn real(args: &CallArgs, func: &str, index: usize) -> EvalResult<f64> {
    let value = &args.positional[index];
    value
        .as_float()
        .ok_or_else(|| type_error(func, "a real number", value))
}

fn unary(args: &CallArgs, func: &str) -> EvalResult<f64> {
    args.no_keywords(func)?;
    args.arity(func, 1, 1)?;
    real(args, func, 0)
}

fn domain_checked(result: f64) -> EvalResult {
    if result.is_nan() {
        Err(errors::value_error("math domain error"))
    } else {
        Ok(Value::Float(result))
    }
}

/// Rounding helpers keep ints as they are and convert float results back to int.
fn rounded(args: &CallArgs, func: &str, round: fn(f64) -> f64) -> EvalResult {
    args.no_keywords(func)?;
    args.arity(func, 1, 1)?;
    match &args.positional[0] {
        Value::Int(n) => Ok(Value::Int(*n)),
        Value::Bool(b) => Ok(Value::Int(i64::from(*b))),
        Value::Float(f) => float_to_int(round(*f)).map(Value::Int),
        other => Err(type_error(func, "a real number", other)),
    }
}

fn math_sqrt(args: CallArgs) -> EvalResult {
    let x = unary(&args, "sqrt")?;
    if x < 0.0 {
        return Err(errors::value_error("math domain error"));
    }
    Ok(Value::Float(x.sqrt()))
}

fn math_floor(args: CallArgs) -> EvalResult {
    rounded(&args, "floor", f64::floor)
}

fn math_ceil(args: CallArgs) -> EvalResult {
    rounded(&args, "ceil", f64::ceil)
}

fn math_trunc(args: CallArgs) -> EvalResult {
    rounded(&args, "trunc", f64::trunc)
}

fn math_fabs(args: CallArgs) -> EvalResult {
    unary(&args, "fabs").map(|x| Value::Float(x.abs()))
}

fn math_pow(args: CallArgs) -> EvalResult {
    args.no_keywords("pow")?;
    args.arity("pow", 2, 2)?;
    let base = real(&args, "pow", 0)?;
    let exponent = real(&args, "pow", 1)?;
    domain_checked(base.powf(exponent))
}

fn math_exp(args: CallArgs) -> EvalResult {
    unary(&args, "exp").map(|x| Value::Float(x.exp()))
}

fn math_log(args: CallArgs) -> EvalResult {
    args.no_keywords("log")?;
    args.arity("log", 1, 2)?;
    let x = real(&args, "log", 0)?;
    if x <= 0.0 {
        return Err(errors::value_error("math domain error"));
    }
    if args.positional.len() == 1 {
        return Ok(Value::Float(x.ln()));
    }
    let base = real(&args, "log", 1)?;
    if base <= 0.0 || base == 1.0 {
        return Err(errors::value_error("math domain error"));
    }
    Ok(Value::Float(x.ln() / base.ln()))
}

fn math_sin(args: CallArgs) -> EvalResult {
    unary(&args, "sin").map(|x| Value::Float(x.sin()))
}

fn math_cos(args: CallArgs) -> EvalResult {
    unary(&args, "cos").map(|x| Value::Float(x.cos()))
}

fn math_tan(args: CallArgs) -> EvalResult {
    unary(&args, "tan").and_then(|x| domain_checked(x.tan()))
}

fn math_isfinite(args: CallArgs) -> EvalResult {
    unary(&args, "isfinite").map(|x| Value::Bool(x.is_finite()))
}

fn math_isnan(args: CallArgs) -> EvalResult {
    unary(&args, "isnan").map(|x| Value::Bool(x.is_nan()))
}

fn math_gcd(args: CallArgs) -> EvalResult {
    args.no_keywords("gcd")?;
    let mut acc: u64 = 0;
    for value in &args.positional {
        let Some(n) = value.as_int() else {
            return Err(type_error("gcd", "an integer", value));
        };
        let mut a = acc;
        let mut b = n.unsigned_abs();
        while b != 0 {
            (a, b) = (b, a % b);
        }
        acc = a;
    }
    i64::try_from(acc)
        .map(Value::Int)
        .map_err(|_| errors::integer_overflow())
}

// string

const ASCII_LOWERCASE: &str = "abcdefghijklmnopqrstuvwxyz";
const ASCII_UPPERCASE: &str = "ABCDEFGHIJKLMNOPQRSTUVWXYZ";
const DIGITS: &str = "0123456789";
const PUNCTUATION: &str = r##"!"#$%&'()*+,-./:;<=>?@[\]^_`{|}~"##;
const WHITESPACE: &str = " \t\n\r\x0b\x0c";

pub(super) fn string_module() -> Module {
    let letters = format!("{ASCII_LOWERCASE}{ASCII_UPPERCASE}");
    let printable = format!("{DIGITS}{letters}{PUNCTUATION}{WHITESPACE}");
    let constants = [
        ("ascii_letters", Value::str(letters)),
        ("ascii_lowercase", Value::str(ASCII_LOWERCASE)),
        ("ascii_uppercase", Value::str(ASCII_UPPERCASE)),
        ("digits", Value::str(DIGITS)),
        ("hexdigits", Value::str("0123456789abcdefABCDEF")),
        ("octdigits", Value::str("01234567")),
        ("punctuation", Value::str(PUNCTUATION)),
        ("whitespace", Value::str(WHITESPACE)),
        ("printable", Value::str(printable)),
    ];
    let functions = [NativeFn::new("capwords", string_capwords)];
    Module::new("string", symbols(&constants, &functions))
}

fn string_capwords(args: CallArgs) -> EvalResult {
    args.no_keywords("capwords")?;
    args.arity("capwords", 1, 2)?;
    let text = &args.positional[0];
    let Some(text) = text.as_str() else {
        return Err(type_error("capwords", "str", text));
    };
    let sep = match args.positional.get(1) {
        None | Some(Value::None) => None,
        Some(Value::Str(sep)) => Some(sep.to_string()),
        Some(other) => return Err(type_error("capwords", "str or None", other)),
    };
    let words: Vec<String> = match &sep {
        Some(sep) => text.split(sep.as_str()).map(capitalize).collect(),
        None => text.split_whitespace().map(capitalize).collect(),
    };
    Ok(Value::str(words.join(sep.as_deref().unwrap_or(" "))))
}
