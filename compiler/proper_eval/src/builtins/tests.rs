use super::*;
use crate::callable::call_value;
use pretty_assertions::assert_eq;

fn call(name: &str, args: CallArgs) -> EvalResult {
    let mut namespace = Dict::new();
    install(&mut namespace);
    let func = namespace.get(name).cloned().unwrap_or(Value::None);
    call_value(&func, &mut Dict::new(), args)
}

fn ints(items: &[i64]) -> Value {
    Value::list(items.iter().map(|&n| Value::Int(n)).collect())
}

#[test]
fn test_install_binds_every_builtin() {
    let mut namespace = Dict::new();
    install(&mut namespace);
    assert_eq!(namespace.len(), names().count());
    assert!(matches!(namespace.get("len"), Some(Value::Function(_))));
}

#[test]
fn test_len() {
    assert_eq!(call("len", CallArgs::new().arg("héllo")), Ok(Value::Int(5)));
    assert_eq!(call("len", CallArgs::new().arg(ints(&[1, 2]))), Ok(Value::Int(2)));
    assert_eq!(
        call("len", CallArgs::new().arg(Value::Int(3))),
        Err(EvalError::new("object of type 'int' has no len()"))
    );
}

#[test]
fn test_conversions() {
    assert_eq!(call("int", CallArgs::new().arg(" 42 ")), Ok(Value::Int(42)));
    assert_eq!(call("int", CallArgs::new().arg(Value::Float(-2.9))), Ok(Value::Int(-2)));
    assert_eq!(call("int", CallArgs::new().arg("ff").arg(Value::Int(16))), Ok(Value::Int(255)));
    assert_eq!(
        call("int", CallArgs::new().arg("abc")),
        Err(EvalError::new("invalid literal for int() with base 10: 'abc'"))
    );
    assert_eq!(call("float", CallArgs::new().arg("1.5")), Ok(Value::Float(1.5)));
    assert_eq!(
        call("float", CallArgs::new().arg("x")),
        Err(EvalError::new("could not convert string to float: 'x'"))
    );
    assert_eq!(call("str", CallArgs::new().arg(Value::Float(2.0))), Ok(Value::str("2.0")));
    assert_eq!(call("str", CallArgs::new().arg(Value::None)), Ok(Value::str("None")));
    assert_eq!(call("bool", CallArgs::new().arg(ints(&[]))), Ok(Value::Bool(false)));
}

#[test]
fn test_containers() {
    assert_eq!(call("list", CallArgs::new().arg("ab")), Ok(Value::list(vec![Value::str("a"), Value::str("b")])));
    let pairs = Value::list(vec![Value::tuple(vec![Value::str("k"), Value::Int(1)])]);
    let expected: Dict = [("k", Value::Int(1)), ("z", Value::Int(2))].into_iter().collect();
    assert_eq!(
        call("dict", CallArgs::new().arg(pairs).kwarg("z", Value::Int(2))),
        Ok(Value::dict(expected))
    );
}

#[test]
fn test_range() {
    assert_eq!(call("range", CallArgs::new().arg(Value::Int(3))), Ok(ints(&[0, 1, 2])));
    assert_eq!(
        call("range", CallArgs::new().arg(Value::Int(5)).arg(Value::Int(0)).arg(Value::Int(-2))),
        Ok(ints(&[5, 3, 1]))
    );
    assert_eq!(
        call("range", CallArgs::new().arg(Value::Int(0)).arg(Value::Int(1)).arg(Value::Int(0))),
        Err(EvalError::new("range() arg 3 must not be zero"))
    );
    assert_eq!(
        call("range", CallArgs::new().arg(Value::Int(i64::MAX))),
        Err(EvalError::new("repeated sequence is too long"))
    );
}

#[test]
fn test_min_max_sum() {
    assert_eq!(call("min", CallArgs::new().arg(ints(&[3, 1, 2]))), Ok(Value::Int(1)));
    assert_eq!(
        call("max", CallArgs::new().arg(Value::Int(3)).arg(Value::Float(4.5))),
        Ok(Value::Float(4.5))
    );
    assert_eq!(
        call("max", CallArgs::new().arg(ints(&[]))),
        Err(EvalError::new("max() arg is an empty sequence"))
    );
    assert_eq!(
        call("max", CallArgs::new().arg(ints(&[])).kwarg("default", Value::None)),
        Ok(Value::None)
    );
    assert_eq!(call("sum", CallArgs::new().arg(ints(&[1, 2, 3]))), Ok(Value::Int(6)));
    assert_eq!(
        call("sum", CallArgs::new().arg(ints(&[1])).arg(Value::Float(0.5))),
        Ok(Value::Float(1.5))
    );
}

#[test]
fn test_rounding_and_abs() {
    assert_eq!(call("round", CallArgs::new().arg(Value::Float(2.5))), Ok(Value::Int(2)));
    assert_eq!(call("round", CallArgs::new().arg(Value::Float(3.5))), Ok(Value::Int(4)));
    assert_eq!(
        call("round", CallArgs::new().arg(Value::Float(1.25)).arg(Value::Int(1))),
        Ok(Value::Float(1.2))
    );
    assert_eq!(call("abs", CallArgs::new().arg(Value::Int(-4))), Ok(Value::Int(4)));
    assert_eq!(
        call("abs", CallArgs::new().arg(Value::Int(i64::MIN))),
        Err(EvalError::new("integer overflow"))
    );
}

#[test]
fn test_ordering_helpers() {
    assert_eq!(
        call("sorted", CallArgs::new().arg(ints(&[3, 1, 2])).kwarg("reverse", Value::Bool(true))),
        Ok(ints(&[3, 2, 1]))
    );
    let mixed = call("sorted", CallArgs::new().arg(Value::list(vec![Value::Int(1), Value::str("a")])));
    assert!(mixed.is_err_and(|err| err.message.starts_with("'<' not supported")));
    assert_eq!(call("reversed", CallArgs::new().arg(ints(&[1, 2]))), Ok(ints(&[2, 1])));
}

#[test]
fn test_iteration_helpers() {
    assert_eq!(
        call("enumerate", CallArgs::new().arg("ab").kwarg("start", Value::Int(1))),
        Ok(Value::list(vec![
            Value::tuple(vec![Value::Int(1), Value::str("a")]),
            Value::tuple(vec![Value::Int(2), Value::str("b")]),
        ]))
    );
    assert_eq!(
        call("zip", CallArgs::new().arg(ints(&[1, 2, 3])).arg("ab")),
        Ok(Value::list(vec![
            Value::tuple(vec![Value::Int(1), Value::str("a")]),
            Value::tuple(vec![Value::Int(2), Value::str("b")]),
        ]))
    );
    assert_eq!(call("any", CallArgs::new().arg(ints(&[0, 0, 1]))), Ok(Value::Bool(true)));
    assert_eq!(call("all", CallArgs::new().arg(ints(&[]))), Ok(Value::Bool(true)));
}

#[test]
fn test_repr_and_print() {
    assert_eq!(call("repr", CallArgs::new().arg("a")), Ok(Value::str("'a'")));
    assert_eq!(
        call("print", CallArgs::new().arg("x").arg(Value::Int(1))),
        Ok(Value::None)
    );
    assert_eq!(
        call("print", CallArgs::new().kwarg("file", Value::None)),
        Err(EvalError::new("print() got an unexpected keyword argument 'file'"))
    );
}
