//! Runtime values.
//!
//! `Value` is the single sum type crossing every boundary: literals,
//! expression results, call arguments, node children and attributes.
//! Reference types are `Rc`-shared, so cloning a value is cheap and the
//! evaluator is single-threaded.

use std::borrow::Cow;
use std::fmt::{self, Write as _};
use std::rc::Rc;

use serde::ser::{Serialize, SerializeSeq, Serializer};

use crate::callable::Function;
use crate::errors::EvalError;
use crate::modules::Module;
use crate::{Dict, Node};

/// Runtime value.
#[derive(Clone)]
pub enum Value {
    None,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(Rc<str>),
    List(Rc<Vec<Value>>),
    Tuple(Rc<Vec<Value>>),
    Dict(Rc<Dict>),
    Node(Rc<Node>),
    Function(Function),
    Module(Rc<Module>),
    /// A captured evaluation failure standing in for the value.
    Error(EvalError),
}

/// How a value folds into a tree node.
#[derive(Clone, Debug, PartialEq)]
pub enum Shape {
    /// A tag-bearing mapping: appended to `children`.
    Child(Rc<Node>),
    /// A mapping without a tag: merged into the node's fields.
    Attributes(Dict),
    /// Anything else.
    Scalar(Value),
}

impl Value {
    pub fn str(s: impl Into<Rc<str>>) -> Value {
        Value::Str(s.into())
    }

    pub fn list(items: Vec<Value>) -> Value {
        Value::List(Rc::new(items))
    }

    pub fn tuple(items: Vec<Value>) -> Value {
        Value::Tuple(Rc::new(items))
    }

    pub fn dict(dict: Dict) -> Value {
        Value::Dict(Rc::new(dict))
    }

    pub fn node(node: Node) -> Value {
        Value::Node(Rc::new(node))
    }

    pub fn function(callable: impl crate::Callable + 'static) -> Value {
        Value::Function(Function::new(callable))
    }

    pub fn error(message: impl Into<String>) -> Value {
        Value::Error(EvalError::new(message))
    }

    #[inline]
    pub fn is_none(&self) -> bool {
        matches!(self, Value::None)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Integer view; `bool` counts as an integer.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(n) => Some(*n),
            Value::Bool(b) => Some(i64::from(*b)),
            _ => None,
        }
    }

    /// Numeric view as a float.
    #[allow(clippy::cast_precision_loss)]
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Float(f) => Some(*f),
            other => other.as_int().map(|n| n as f64),
        }
    }

    /// Mapping view. Nodes are mappings in their flattened form.
    pub fn as_mapping(&self) -> Option<Cow<'_, Dict>> {
        match self {
            Value::Dict(dict) => Some(Cow::Borrowed(dict.as_ref())),
            Value::Node(node) => Some(Cow::Owned(node.entries())),
            _ => None,
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Value::None => "NoneType",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Str(_) => "str",
            Value::List(_) => "list",
            Value::Tuple(_) => "tuple",
            Value::Dict(_) => "dict",
            Value::Node(_) => "node",
            Value::Function(_) => "function",
            Value::Module(_) => "module",
            Value::Error(_) => "error",
        }
    }

    pub fn is_truthy(&self) -> bool {
        match self {
            Value::None => false,
            Value::Bool(b) => *b,
            Value::Int(n) => *n != 0,
            Value::Float(f) => *f != 0.0,
            Value::Str(s) => !s.is_empty(),
            Value::List(items) | Value::Tuple(items) => !items.is_empty(),
            Value::Dict(dict) => !dict.is_empty(),
            Value::Node(_) | Value::Function(_) | Value::Module(_) => true,
            Value::Error(_) => false,
        }
    }

    /// Classify for folding into a node.
    ///
    /// Presence of a `tag` key decides, not its value: `{"tag": ""}` is a child.
    pub fn into_shape(self) -> Shape {
        match self {
            Value::Node(node) if node.has_tag() => Shape::Child(node),
            Value::Node(node) => Shape::Attributes(node.entries()),
            Value::Dict(dict) if dict.contains_key("tag") => {
                Shape::Child(Rc::new(Node::from_dict(&dict)))
            }
            Value::Dict(dict) => Shape::Attributes(Rc::unwrap_or_clone(dict)),
            other => Shape::Scalar(other),
        }
    }

    /// Identity comparison for `is`.
    pub fn is_same(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::None, Value::None) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a.to_bits() == b.to_bits(),
            (Value::Str(a), Value::Str(b)) => Rc::ptr_eq(a, b),
            (Value::List(a), Value::List(b)) | (Value::Tuple(a), Value::Tuple(b)) => {
                Rc::ptr_eq(a, b)
            }
            (Value::Dict(a), Value::Dict(b)) => Rc::ptr_eq(a, b),
            (Value::Node(a), Value::Node(b)) => Rc::ptr_eq(a, b),
            (Value::Function(a), Value::Function(b)) => a.ptr_eq(b),
            (Value::Module(a), Value::Module(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }

    /// `repr()` text.
    pub fn repr(&self) -> String {
        let mut out = String::new();
        self.write_repr(&mut out);
        out
    }

    fn write_repr(&self, out: &mut String) {
        match self {
            Value::Str(s) => write_quoted(out, s),
            Value::List(items) => {
                out.push('[');
                write_items(out, items);
                out.push(']');
            }
            Value::Tuple(items) => {
                out.push('(');
                write_items(out, items);
                if items.len() == 1 {
                    out.push(',');
                }
                out.push(')');
            }
            Value::Dict(dict) => write_dict(out, dict),
            Value::Node(node) => write_dict(out, &node.entries()),
            other => {
                let _ = write!(out, "{other}");
            }
        }
    }
}

fn write_items(out: &mut String, items: &[Value]) {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            out.push_str(", ");
        }
        item.write_repr(out);
    }
}

fn write_dict(out: &mut String, dict: &Dict) {
    out.push('{');
    for (i, (key, value)) in dict.iter().enumerate() {
        if i > 0 {
            out.push_str(", ");
        }
        write_quoted(out, key);
        out.push_str(": ");
        value.write_repr(out);
    }
    out.push('}');
}

/// Quote a string the way `repr` does: single quotes unless the text
/// contains a single quote and no double quote.
fn write_quoted(out: &mut String, s: &str) {
    let quote = if s.contains('\'') && !s.contains('"') {
        '"'
    } else {
        '\''
    };
    out.push(quote);
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c == quote => {
                out.push('\\');
                out.push(c);
            }
            c if c.is_control() => {
                let _ = write!(out, "\\x{:02x}", u32::from(c));
            }
            c => out.push(c),
        }
    }
    out.push(quote);
}

/// Float text: shortest round-trip digits, always with a decimal point or
/// exponent, scientific outside `[1e-4, 1e16)`.
pub(crate) fn format_float(f: f64) -> String {
    if f.is_nan() {
        return "nan".to_string();
    }
    if f.is_infinite() {
        return if f > 0.0 { "inf" } else { "-inf" }.to_string();
    }
    let magnitude = f.abs();
    if magnitude != 0.0 && !(1e-4..1e16).contains(&magnitude) {
        let text = format!("{f:e}");
        let Some((mantissa, exponent)) = text.split_once('e') else {
            return text;
        };
        let (sign, digits) = match exponent.strip_prefix('-') {
            Some(digits) => ('-', digits),
            None => ('+', exponent),
        };
        return format!("{mantissa}e{sign}{digits:0>2}");
    }
    let text = f.to_string();
    if text.contains('.') {
        text
    } else {
        format!("{text}.0")
    }
}

/// `str()` text.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::None => f.write_str("None"),
            Value::Bool(true) => f.write_str("True"),
            Value::Bool(false) => f.write_str("False"),
            Value::Int(n) => write!(f, "{n}"),
            Value::Float(x) => f.write_str(&format_float(*x)),
            Value::Str(s) => f.write_str(s),
            Value::Function(func) => write!(f, "<function {}>", func.name()),
            Value::Module(module) => write!(f, "<module '{}'>", module.name()),
            Value::Error(err) => write!(f, "<Evaluation Error: {}>", err.message),
            Value::List(_) | Value::Tuple(_) | Value::Dict(_) | Value::Node(_) => {
                f.write_str(&self.repr())
            }
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Str(_) | Value::List(_) | Value::Tuple(_) | Value::Dict(_) | Value::Node(_) => {
                f.write_str(&self.repr())
            }
            other => write!(f, "{other}"),
        }
    }
}

/// Equality with the host language's numeric tower: `1 == 1.0 == True`.
impl PartialEq for Value {
    #[allow(clippy::float_cmp)]
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::None, Value::None) => true,
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::List(a), Value::List(b)) | (Value::Tuple(a), Value::Tuple(b)) => a == b,
            (Value::Dict(a), Value::Dict(b)) => a == b,
            (Value::Node(a), Value::Node(b)) => a == b,
            (Value::Function(a), Value::Function(b)) => a.ptr_eq(b),
            (Value::Module(a), Value::Module(b)) => Rc::ptr_eq(a, b),
            (Value::Error(a), Value::Error(b)) => a == b,
            (Value::Float(_), _) | (_, Value::Float(_)) => {
                match (self.as_float(), other.as_float()) {
                    (Some(a), Some(b)) => a == b,
                    _ => false,
                }
            }
            _ => match (self.as_int(), other.as_int()) {
                (Some(a), Some(b)) => a == b,
                _ => false,
            },
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Int(n)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::str(s)
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::str(s)
    }
}

impl From<Dict> for Value {
    fn from(dict: Dict) -> Self {
        Value::dict(dict)
    }
}

impl From<Node> for Value {
    fn from(node: Node) -> Self {
        Value::node(node)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::list(items)
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::None => serializer.serialize_unit(),
            Value::Bool(b) => serializer.serialize_bool(*b),
            Value::Int(n) => serializer.serialize_i64(*n),
            Value::Float(f) => serializer.serialize_f64(*f),
            Value::Str(s) => serializer.serialize_str(s),
            Value::List(items) | Value::Tuple(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items.iter() {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            Value::Dict(dict) => dict.serialize(serializer),
            Value::Node(node) => node.serialize(serializer),
            Value::Function(_) | Value::Module(_) | Value::Error(_) => {
                serializer.collect_str(self)
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_numeric_equality_crosses_types() {
        assert_eq!(Value::Int(1), Value::Float(1.0));
        assert_eq!(Value::Bool(true), Value::Int(1));
        assert_ne!(Value::Int(1), Value::str("1"));
        assert_ne!(Value::None, Value::Bool(false));
    }

    #[test]
    fn test_float_formatting() {
        assert_eq!(format_float(1.0), "1.0");
        assert_eq!(format_float(0.1), "0.1");
        assert_eq!(format_float(-2.5), "-2.5");
        assert_eq!(format_float(1e16), "1e+16");
        assert_eq!(format_float(1.5e-7), "1.5e-07");
        assert_eq!(format_float(f64::INFINITY), "inf");
    }

    #[test]
    fn test_repr_of_collections() {
        let value = Value::list(vec![
            Value::Int(1),
            Value::str("it's"),
            Value::tuple(vec![Value::None]),
            Value::dict([("k", Value::Bool(true))].into_iter().collect()),
        ]);
        assert_eq!(value.repr(), r#"[1, "it's", (None,), {'k': True}]"#);
    }

    #[test]
    fn test_error_marker_text() {
        let value = Value::error("name 'x' is not defined");
        assert_eq!(value.to_string(), "<Evaluation Error: name 'x' is not defined>");
        assert!(!value.is_truthy());
    }

    #[test]
    fn test_shape_presence_of_tag_governs() {
        let tagged: Dict = [("tag", Value::str("")), ("a", Value::Int(1))]
            .into_iter()
            .collect();
        let Shape::Child(node) = Value::dict(tagged).into_shape() else {
            panic!("expected child");
        };
        assert_eq!(node.tag(), Some(""));
        assert_eq!(node.attribute("a"), Some(&Value::Int(1)));

        let plain: Dict = [("a", Value::Int(1))].into_iter().collect();
        assert!(matches!(Value::dict(plain).into_shape(), Shape::Attributes(_)));
        assert!(matches!(Value::Int(3).into_shape(), Shape::Scalar(Value::Int(3))));
    }

    #[test]
    fn test_serialize_markers_as_strings() {
        let value = Value::list(vec![Value::Int(1), Value::error("boom"), Value::None]);
        let json = serde_json::to_string(&value).unwrap();
        assert_eq!(json, r#"[1,"<Evaluation Error: boom>",null]"#);
    }
}
