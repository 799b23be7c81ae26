//! The tagged tree node produced by components and by the evaluator.

use std::rc::Rc;

use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::errors::EvalError;
use crate::value::Shape;
use crate::{Dict, Value};

/// Key that replaces a node's tag when a mapping is folded into it.
pub const TAG_KEY: &str = "tag";
/// Key that replaces a node's children when a mapping is folded into it.
pub const CHILDREN_KEY: &str = "children";

/// A `{tag?, children[], attributes{}}` tree node.
///
/// `attributes` never holds the reserved keys `tag` and `children`: writes
/// through [`Node::set`] route them to the dedicated fields instead. A tag,
/// once present, stays present even when its value is `None`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Node {
    tag: Option<Value>,
    children: Vec<Value>,
    attributes: Dict,
}

impl Node {
    /// A node produced by the builder called `tag`.
    pub fn tagged(tag: impl Into<String>) -> Self {
        Node {
            tag: Some(Value::str(tag.into())),
            ..Node::default()
        }
    }

    /// An untagged document root.
    pub fn root() -> Self {
        Node::default()
    }

    /// Fold a flat mapping into a fresh node.
    pub fn from_dict(dict: &Dict) -> Self {
        let mut node = Node::root();
        node.merge_entries(dict);
        node
    }

    /// The tag when it is a string.
    pub fn tag(&self) -> Option<&str> {
        self.tag.as_ref().and_then(Value::as_str)
    }

    /// The tag as stored, `None` when the node has no `tag` key at all.
    pub fn tag_value(&self) -> Option<&Value> {
        self.tag.as_ref()
    }

    /// Whether the node carries a `tag` key, whatever its value.
    pub fn has_tag(&self) -> bool {
        self.tag.is_some()
    }

    pub fn children(&self) -> &[Value] {
        &self.children
    }

    pub fn attributes(&self) -> &Dict {
        &self.attributes
    }

    pub fn attribute(&self, key: &str) -> Option<&Value> {
        self.attributes.get(key)
    }

    pub fn push_child(&mut self, value: Value) {
        self.children.push(value);
    }

    /// Write one flat-mapping entry, routing the reserved keys.
    ///
    /// `tag` keeps any value, `None` included; `children` takes a list or
    /// tuple as the new children, `None` as no children, and any other
    /// value as a single child.
    pub fn set(&mut self, key: &str, value: Value) {
        match key {
            TAG_KEY => self.tag = Some(value),
            CHILDREN_KEY => self.children = children_of(value),
            _ => {
                self.attributes.insert(key, value);
            }
        }
    }

    /// Merge a flat mapping, later entries winning.
    pub fn merge_entries(&mut self, entries: &Dict) {
        for (key, value) in entries.iter() {
            self.set(key, value.clone());
        }
    }

    /// Merge a builder's return value: a mapping overrides the node's
    /// fields, `None` leaves the node alone, anything else is a child.
    pub fn merge_return(&mut self, value: Value) {
        match value {
            Value::None => {}
            Value::Dict(dict) => self.merge_entries(&dict),
            Value::Node(node) => self.merge_entries(&node.entries()),
            other => self.children.push(other),
        }
    }

    /// The flat mapping form: `tag` (when present), `children`, then attributes.
    pub fn entries(&self) -> Dict {
        let mut dict = Dict::new();
        if let Some(tag) = &self.tag {
            dict.insert(TAG_KEY, tag.clone());
        }
        dict.insert(CHILDREN_KEY, Value::list(self.children.clone()));
        dict.extend_from(&self.attributes);
        dict
    }

    /// Every evaluation-error marker in the tree with its path, e.g.
    /// `title` or `children[0].style[1]`.
    pub fn errors(&self) -> Vec<(String, EvalError)> {
        let mut found = Vec::new();
        self.collect_errors("", &mut found);
        found
    }

    fn collect_errors(&self, prefix: &str, found: &mut Vec<(String, EvalError)>) {
        for (i, child) in self.children.iter().enumerate() {
            collect_value_errors(child, format!("{prefix}{CHILDREN_KEY}[{i}]"), found);
        }
        for (key, value) in self.attributes.iter() {
            collect_value_errors(value, format!("{prefix}{key}"), found);
        }
    }
}

fn children_of(value: Value) -> Vec<Value> {
    match value {
        Value::List(items) | Value::Tuple(items) => Rc::unwrap_or_clone(items),
        Value::None => Vec::new(),
        other => vec![other],
    }
}

/// Accumulates one node from positional values and attribute entries.
///
/// Positionals append children as they arrive, but a `children` entry
/// replaces the whole list when the node is finished, wherever it appeared.
#[derive(Debug, Default)]
pub struct NodeBuilder {
    node: Node,
    children: Option<Value>,
}

impl NodeBuilder {
    pub fn new(node: Node) -> Self {
        NodeBuilder {
            node,
            children: None,
        }
    }

    /// Fold a positional value: child-shaped values become children,
    /// attribute-shaped ones merge into the fields, scalars become children.
    pub fn absorb(&mut self, value: Value) {
        match value.into_shape() {
            Shape::Child(node) => self.node.push_child(Value::Node(node)),
            Shape::Attributes(entries) => {
                for (key, value) in entries.iter() {
                    self.set(key, value.clone());
                }
            }
            Shape::Scalar(value) => self.node.push_child(value),
        }
    }

    /// Write one attribute entry; `children` is held until [`finish`](Self::finish).
    pub fn set(&mut self, key: &str, value: Value) {
        if key == CHILDREN_KEY {
            self.children = Some(value);
        } else {
            self.node.set(key, value);
        }
    }

    pub fn finish(self) -> Node {
        let mut node = self.node;
        if let Some(children) = self.children {
            node.set(CHILDREN_KEY, children);
        }
        node
    }
}

fn collect_value_errors(value: &Value, path: String, found: &mut Vec<(String, EvalError)>) {
    match value {
        Value::Error(err) => found.push((path, err.clone())),
        Value::List(items) | Value::Tuple(items) => {
            for (i, item) in items.iter().enumerate() {
                collect_value_errors(item, format!("{path}[{i}]"), found);
            }
        }
        Value::Dict(dict) => {
            for (key, item) in dict.iter() {
                collect_value_errors(item, format!("{path}.{key}"), found);
            }
        }
        Value::Node(node) => node.collect_errors(&format!("{path}."), found),
        _ => {}
    }
}

impl Serialize for Node {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let len = self.attributes.len() + 1 + usize::from(self.has_tag());
        let mut map = serializer.serialize_map(Some(len))?;
        if let Some(tag) = &self.tag {
            map.serialize_entry(TAG_KEY, tag)?;
        }
        map.serialize_entry(CHILDREN_KEY, &self.children)?;
        for (key, value) in self.attributes.iter() {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}
