//! Attribute access and built-in methods.
//!
//! Method lookup produces a [`BoundMethod`] capturing the receiver, so
//! `"a,b".split` is a first-class value and `"a,b".split(",")` is an
//! ordinary call on it.

use crate::callable::{type_error, BoundMethod, CallArgs, MethodFnPtr};
use crate::errors::{self, EvalResult};
use crate::Value;

const STR_METHODS: &[(&str, MethodFnPtr)] = &[
    ("upper", str_upper),
    ("lower", str_lower),
    ("strip", str_strip),
    ("lstrip", str_lstrip),
    ("rstrip", str_rstrip),
    ("split", str_split),
    ("join", str_join),
    ("replace", str_replace),
    ("startswith", str_startswith),
    ("endswith", str_endswith),
    ("title", str_title),
    ("capitalize", str_capitalize),
];

const DICT_METHODS: &[(&str, MethodFnPtr)] = &[
    ("get", dict_get),
    ("keys", dict_keys),
    ("values", dict_values),
    ("items", dict_items),
];

const SEQUENCE_METHODS: &[(&str, MethodFnPtr)] = &[("index", seq_index), ("count", seq_count)];

/// Evaluate `receiver.name`.
pub fn attribute(receiver: &Value, name: &str) -> EvalResult {
    let table = match receiver {
        Value::Module(module) => {
            return module
                .get(name)
                .cloned()
                .ok_or_else(|| errors::module_has_no_attribute(module.name(), name));
        }
        Value::Node(node) => {
            return match name {
                "tag" => Ok(node.tag_value().cloned().unwrap_or(Value::None)),
                "children" => Ok(Value::list(node.children().to_vec())),
                _ => node
                    .attribute(name)
                    .cloned()
                    .ok_or_else(|| errors::no_attribute("node", name)),
            };
        }
        Value::Str(_) => STR_METHODS,
        Value::Dict(_) => DICT_METHODS,
        Value::List(_) | Value::Tuple(_) => SEQUENCE_METHODS,
        _ => &[],
    };
    table
        .iter()
        .find(|(method, _)| *method == name)
        .map(|&(method, func)| Value::function(BoundMethod::new(receiver.clone(), method, func)))
        .ok_or_else(|| errors::no_attribute(receiver.type_name(), name))
}

/// Argument by position, or by keyword when not given positionally.
fn param<'v>(args: &'v CallArgs, index: usize, name: &str) -> Option<&'v Value> {
    args.positional.get(index).or_else(|| args.keyword(name))
}

fn reject_unknown_keywords(args: &CallArgs, func: &str, known: &[&str]) -> EvalResult<()> {
    match args.keywords.iter().find(|(key, _)| !known.contains(&key.as_str())) {
        Some((key, _)) => Err(errors::unexpected_keyword(func, key)),
        None => Ok(()),
    }
}

fn receiver_str<'v>(receiver: &'v Value) -> &'v str {
    receiver.as_str().unwrap_or_default()
}

fn optional_str<'v>(func: &str, value: Option<&'v Value>) -> EvalResult<Option<&'v str>> {
    match value {
        None | Some(Value::None) => Ok(None),
        Some(Value::Str(s)) => Ok(Some(s)),
        Some(other) => Err(type_error(func, "str or None", other)),
    }
}

fn required_str<'v>(func: &str, value: &'v Value) -> EvalResult<&'v str> {
    value.as_str().ok_or_else(|| type_error(func, "str", value))
}

// str

/// First character upper-cased, the rest lower-cased.
pub(crate) fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

fn str_upper(receiver: &Value, args: CallArgs) -> EvalResult {
    args.no_keywords("upper")?;
    args.arity("upper", 0, 0)?;
    Ok(Value::str(receiver_str(receiver).to_uppercase()))
}

fn str_lower(receiver: &Value, args: CallArgs) -> EvalResult {
    args.no_keywords("lower")?;
    args.arity("lower", 0, 0)?;
    Ok(Value::str(receiver_str(receiver).to_lowercase()))
}

#[derive(Copy, Clone)]
enum Trim {
    Both,
    Start,
    End,
}

fn strip(receiver: &Value, args: &CallArgs, func: &str, side: Trim) -> EvalResult {
    args.no_keywords(func)?;
    args.arity(func, 0, 1)?;
    let text = receiver_str(receiver);
    let stripped = match optional_str(func, args.positional.first())? {
        None => match side {
            Trim::Both => text.trim(),
            Trim::Start => text.trim_start(),
            Trim::End => text.trim_end(),
        },
        Some(chars) => {
            let set = |c: char| chars.contains(c);
            match side {
                Trim::Both => text.trim_matches(set),
                Trim::Start => text.trim_start_matches(set),
                Trim::End => text.trim_end_matches(set),
            }
        }
    };
    Ok(Value::str(stripped))
}

fn str_strip(receiver: &Value, args: CallArgs) -> EvalResult {
    strip(receiver, &args, "strip", Trim::Both)
}

fn str_lstrip(receiver: &Value, args: CallArgs) -> EvalResult {
    strip(receiver, &args, "lstrip", Trim::Start)
}

fn str_rstrip(receiver: &Value, args: CallArgs) -> EvalResult {
    strip(receiver, &args, "rstrip", Trim::End)
}

fn str_split(receiver: &Value, args: CallArgs) -> EvalResult {
    reject_unknown_keywords(&args, "split", &["sep", "maxsplit"])?;
    args.arity("split", 0, 2)?;
    let text = receiver_str(receiver);
    let sep = optional_str("split", param(&args, 0, "sep"))?;
    let limit = match param(&args, 1, "maxsplit") {
        None => None,
        Some(value) => {
            let n = value.as_int().ok_or_else(|| type_error("split", "int", value))?;
            usize::try_from(n).ok()
        }
    };

    let parts: Vec<&str> = match sep {
        Some("") => return Err(errors::value_error("empty separator")),
        Some(sep) => match limit {
            Some(n) => text.splitn(n + 1, sep).collect(),
            None => text.split(sep).collect(),
        },
        None => split_whitespace(text, limit),
    };
    Ok(Value::list(parts.into_iter().map(Value::str).collect()))
}

/// Whitespace split; after `limit` splits the remainder is kept whole.
fn split_whitespace(text: &str, limit: Option<usize>) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut rest = text.trim_start();
    while !rest.is_empty() {
        if limit == Some(parts.len()) {
            parts.push(rest);
            break;
        }
        match rest.find(char::is_whitespace) {
            Some(end) => {
                parts.push(&rest[..end]);
                rest = rest[end..].trim_start();
            }
            None => {
                parts.push(rest);
                break;
            }
        }
    }
    parts
}

fn str_join(receiver: &Value, args: CallArgs) -> EvalResult {
    args.no_keywords("join")?;
    args.arity("join", 1, 1)?;
    let items = crate::builtins::iterate(&args.positional[0])?;
    let mut pieces = Vec::with_capacity(items.len());
    for (i, item) in items.iter().enumerate() {
        match item.as_str() {
            Some(s) => pieces.push(s),
            None => {
                return Err(errors::value_error(format!(
                    "sequence item {i}: expected str instance, {} found",
                    item.type_name()
                )))
            }
        }
    }
    Ok(Value::str(pieces.join(receiver_str(receiver))))
}

fn str_replace(receiver: &Value, args: CallArgs) -> EvalResult {
    args.no_keywords("replace")?;
    args.arity("replace", 2, 3)?;
    let text = receiver_str(receiver);
    let old = required_str("replace", &args.positional[0])?;
    let new = required_str("replace", &args.positional[1])?;
    let replaced = match args.positional.get(2) {
        Some(count) => {
            let n = count.as_int().ok_or_else(|| type_error("replace", "int", count))?;
            match usize::try_from(n) {
                Ok(n) => text.replacen(old, new, n),
                Err(_) => text.replace(old, new),
            }
        }
        None => text.replace(old, new),
    };
    Ok(Value::str(replaced))
}

fn affix_test(receiver: &Value, args: &CallArgs, func: &str, test: fn(&str, &str) -> bool) -> EvalResult {
    args.no_keywords(func)?;
    args.arity(func, 1, 1)?;
    let text = receiver_str(receiver);
    let found = match &args.positional[0] {
        Value::Str(affix) => test(text, affix),
        Value::Tuple(options) => {
            let mut found = false;
            for option in options.iter() {
                found |= test(text, required_str(func, option)?);
            }
            found
        }
        other => return Err(type_error(func, "str or a tuple of str", other)),
    };
    Ok(Value::Bool(found))
}

fn str_startswith(receiver: &Value, args: CallArgs) -> EvalResult {
    affix_test(receiver, &args, "startswith", |text, affix| text.starts_with(affix))
}

fn str_endswith(receiver: &Value, args: CallArgs) -> EvalResult {
    affix_test(receiver, &args, "endswith", |text, affix| text.ends_with(affix))
}

fn str_title(receiver: &Value, args: CallArgs) -> EvalResult {
    args.no_keywords("title")?;
    args.arity("title", 0, 0)?;
    let mut titled = String::new();
    let mut in_word = false;
    for c in receiver_str(receiver).chars() {
        if c.is_alphabetic() {
            if in_word {
                titled.extend(c.to_lowercase());
            } else {
                titled.extend(c.to_uppercase());
            }
            in_word = true;
        } else {
            titled.push(c);
            in_word = false;
        }
    }
    Ok(Value::str(titled))
}

fn str_capitalize(receiver: &Value, args: CallArgs) -> EvalResult {
    args.no_keywords("capitalize")?;
    args.arity("capitalize", 0, 0)?;
    Ok(Value::str(capitalize(receiver_str(receiver))))
}

// dict

fn receiver_dict(receiver: &Value) -> crate::Dict {
    receiver
        .as_mapping()
        .map(std::borrow::Cow::into_owned)
        .unwrap_or_default()
}

fn dict_get(receiver: &Value, args: CallArgs) -> EvalResult {
    args.no_keywords("get")?;
    args.arity("get", 1, 2)?;
    let found = match receiver {
        Value::Dict(dict) => args.positional[0].as_str().and_then(|key| dict.get(key)).cloned(),
        _ => None,
    };
    Ok(found
        .or_else(|| args.positional.get(1).cloned())
        .unwrap_or(Value::None))
}

fn dict_keys(receiver: &Value, args: CallArgs) -> EvalResult {
    args.no_keywords("keys")?;
    args.arity("keys", 0, 0)?;
    Ok(Value::list(receiver_dict(receiver).keys().map(Value::str).collect()))
}

fn dict_values(receiver: &Value, args: CallArgs) -> EvalResult {
    args.no_keywords("values")?;
    args.arity("values", 0, 0)?;
    Ok(Value::list(receiver_dict(receiver).values().cloned().collect()))
}

fn dict_items(receiver: &Value, args: CallArgs) -> EvalResult {
    args.no_keywords("items")?;
    args.arity("items", 0, 0)?;
    let items = receiver_dict(receiver)
        .into_iter()
        .map(|(key, value)| Value::tuple(vec![Value::str(key), value]))
        .collect();
    Ok(Value::list(items))
}

// list and tuple

fn receiver_items(receiver: &Value) -> &[Value] {
    match receiver {
        Value::List(items) | Value::Tuple(items) => items,
        _ => &[],
    }
}

fn seq_index(receiver: &Value, args: CallArgs) -> EvalResult {
    args.no_keywords("index")?;
    args.arity("index", 1, 1)?;
    let needle = &args.positional[0];
    let position = receiver_items(receiver).iter().position(|item| item == needle);
    match position.map(i64::try_from) {
        Some(Ok(at)) => Ok(Value::Int(at)),
        Some(Err(_)) => Err(errors::integer_overflow()),
        None => Err(errors::not_in_sequence(&needle.repr(), receiver.type_name())),
    }
}

fn seq_count(receiver: &Value, args: CallArgs) -> EvalResult {
    args.no_keywords("count")?;
    args.arity("count", 1, 1)?;
    let needle = &args.positional[0];
    let count = receiver_items(receiver).iter().filter(|item| *item == needle).count();
    i64::try_from(count)
        .map(Value::Int)
        .map_err(|_| errors::integer_overflow())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::callable::call_value;
    use crate::errors::EvalError;
    use crate::{Dict, Node};
    use pretty_assertions::assert_eq;

    fn call_method(receiver: Value, name: &str, args: CallArgs) -> EvalResult {
        let method = attribute(&receiver, name)?;
        call_value(&method, &mut Dict::new(), args)
    }

    fn strs(items: &[&str]) -> Value {
        Value::list(items.iter().map(|s| Value::str(*s)).collect())
    }

    #[test]
    fn test_case_methods() {
        let text = Value::str("hello wORLD");
        assert_eq!(call_method(text.clone(), "upper", CallArgs::new()), Ok(Value::str("HELLO WORLD")));
        assert_eq!(call_method(text.clone(), "title", CallArgs::new()), Ok(Value::str("Hello World")));
        assert_eq!(call_method(text, "capitalize", CallArgs::new()), Ok(Value::str("Hello world")));
    }

    #[test]
    fn test_strip_variants() {
        let text = Value::str("  xx  ");
        assert_eq!(call_method(text.clone(), "strip", CallArgs::new()), Ok(Value::str("xx")));
        assert_eq!(call_method(text, "rstrip", CallArgs::new()), Ok(Value::str("  xx")));
        assert_eq!(
            call_method(Value::str("--a--"), "lstrip", CallArgs::new().arg("-")),
            Ok(Value::str("a--"))
        );
    }

    #[test]
    fn test_split() {
        assert_eq!(
            call_method(Value::str(" a  b c "), "split", CallArgs::new()),
            Ok(strs(&["a", "b", "c"]))
        );
        assert_eq!(
            call_method(Value::str("a,b,,c"), "split", CallArgs::new().arg(",")),
            Ok(strs(&["a", "b", "", "c"]))
        );
        assert_eq!(
            call_method(
                Value::str("a b  c "),
                "split",
                CallArgs::new().kwarg("maxsplit", Value::Int(1))
            ),
            Ok(strs(&["a", "b  c "]))
        );
        assert_eq!(
            call_method(Value::str("a"), "split", CallArgs::new().arg("")),
            Err(EvalError::new("empty separator"))
        );
    }

    #[test]
    fn test_join_and_replace() {
        assert_eq!(
            call_method(Value::str("-"), "join", CallArgs::new().arg(strs(&["a", "b"]))),
            Ok(Value::str("a-b"))
        );
        assert_eq!(
            call_method(
                Value::str(", "),
                "join",
                CallArgs::new().arg(Value::list(vec![Value::Int(1)]))
            ),
            Err(EvalError::new("sequence item 0: expected str instance, int found"))
        );
        assert_eq!(
            call_method(Value::str("aaa"), "replace", CallArgs::new().arg("a").arg("b").arg(Value::Int(2))),
            Ok(Value::str("bba"))
        );
    }

    #[test]
    fn test_affix_tests() {
        let text = Value::str("config.py");
        assert_eq!(
            call_method(text.clone(), "endswith", CallArgs::new().arg(".py")),
            Ok(Value::Bool(true))
        );
        let options = Value::tuple(vec![Value::str("x"), Value::str("con")]);
        assert_eq!(
            call_method(text, "startswith", CallArgs::new().arg(options)),
            Ok(Value::Bool(true))
        );
    }

    #[test]
    fn test_dict_methods() {
        let dict = Value::dict([("a", Value::Int(1)), ("b", Value::Int(2))].into_iter().collect());
        assert_eq!(
            call_method(dict.clone(), "get", CallArgs::new().arg("zz").arg(Value::Int(0))),
            Ok(Value::Int(0))
        );
        assert_eq!(call_method(dict.clone(), "keys", CallArgs::new()), Ok(strs(&["a", "b"])));
        assert_eq!(
            call_method(dict, "items", CallArgs::new()),
            Ok(Value::list(vec![
                Value::tuple(vec![Value::str("a"), Value::Int(1)]),
                Value::tuple(vec![Value::str("b"), Value::Int(2)]),
            ]))
        );
    }

    #[test]
    fn test_sequence_methods() {
        let list = Value::list(vec![Value::Int(1), Value::Int(2), Value::Int(1)]);
        assert_eq!(call_method(list.clone(), "count", CallArgs::new().arg(Value::Int(1))), Ok(Value::Int(2)));
        assert_eq!(call_method(list.clone(), "index", CallArgs::new().arg(Value::Int(2))), Ok(Value::Int(1)));
        assert_eq!(
            call_method(list, "index", CallArgs::new().arg(Value::Int(9))),
            Err(EvalError::new("9 is not in list"))
        );
    }

    #[test]
    fn test_node_attributes() {
        let mut node = Node::tagged("div");
        node.set("id", Value::str("main"));
        let node = Value::node(node);
        assert_eq!(attribute(&node, "tag"), Ok(Value::str("div")));
        assert_eq!(attribute(&node, "id"), Ok(Value::str("main")));
        assert_eq!(
            attribute(&node, "missing"),
            Err(EvalError::new("'node' object has no attribute 'missing'"))
        );
    }

    #[test]
    fn test_unknown_attribute() {
        assert_eq!(
            attribute(&Value::Int(1), "real"),
            Err(EvalError::new("'int' object has no attribute 'real'"))
        );
        assert_eq!(
            call_method(Value::str("a"), "upper", CallArgs::new().arg("x")),
            Err(EvalError::new("upper() takes no arguments (1 given)"))
        );
    }
}
