//! Component builders: calls that produce normalized tree nodes.
//!
//! A component pairs a declared [`Signature`] with a body. Calling it does
//! two independent things with the same arguments:
//!
//! 1. binds them against the signature and runs the body, keeping its
//!    return value aside;
//! 2. folds the *original* arguments into a node tagged with the component
//!    name: positional mappings with a `tag` become children, other
//!    mappings merge into the fields, anything else is a child, keywords
//!    merge last.
//!
//! The body's return value is then merged into the node.

use std::fmt;
use std::rc::Rc;

use crate::callable::{CallArgs, Callable, Environment};
use crate::errors::{self, EvalResult};
use crate::{Dict, Node, NodeBuilder, Value};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ParamKind {
    PositionalOrKeyword,
    KeywordOnly,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Param {
    pub name: String,
    pub kind: ParamKind,
    pub default: Option<Value>,
}

/// Declared parameters of a component.
///
/// ```ignore
/// let sig = Signature::new("html")
///     .positional("title")
///     .optional("lang", Value::str("en"))
///     .catch_all("extra");
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct Signature {
    name: String,
    params: Vec<Param>,
    catch_all: Option<String>,
}

impl Signature {
    pub fn new(name: impl Into<String>) -> Self {
        Signature {
            name: name.into(),
            params: Vec::new(),
            catch_all: None,
        }
    }

    /// Required parameter accepted by position or keyword.
    #[must_use]
    pub fn positional(self, name: impl Into<String>) -> Self {
        self.param(name, ParamKind::PositionalOrKeyword, None)
    }

    /// Positional-or-keyword parameter with a default.
    #[must_use]
    pub fn optional(self, name: impl Into<String>, default: Value) -> Self {
        self.param(name, ParamKind::PositionalOrKeyword, Some(default))
    }

    /// Parameter accepted only by keyword; required when `default` is `None`.
    #[must_use]
    pub fn keyword_only(self, name: impl Into<String>, default: Option<Value>) -> Self {
        self.param(name, ParamKind::KeywordOnly, default)
    }

    /// Collect unknown keyword arguments instead of dropping them.
    #[must_use]
    pub fn catch_all(mut self, name: impl Into<String>) -> Self {
        self.catch_all = Some(name.into());
        self
    }

    fn param(mut self, name: impl Into<String>, kind: ParamKind, default: Option<Value>) -> Self {
        self.params.push(Param {
            name: name.into(),
            kind,
            default,
        });
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn params(&self) -> &[Param] {
        &self.params
    }

    /// Filter call arguments down to what the signature accepts.
    ///
    /// Positional argument *i* binds to the *i*-th positional-capable
    /// parameter unless a keyword names that parameter, in which case the
    /// keyword wins and the slot is skipped. Surplus positionals are
    /// dropped; unknown keywords go to the catch-all or are dropped.
    pub fn bind(&self, args: &CallArgs) -> EvalResult<BoundArgs> {
        let mut slots: Vec<Option<Value>> = vec![None; self.params.len()];
        let positional_slots = self
            .params
            .iter()
            .enumerate()
            .filter(|(_, p)| p.kind == ParamKind::PositionalOrKeyword)
            .map(|(i, _)| i);
        for (slot, value) in positional_slots.zip(&args.positional) {
            if !args.has_keyword(&self.params[slot].name) {
                slots[slot] = Some(value.clone());
            }
        }

        let mut extras = Dict::new();
        for (key, value) in &args.keywords {
            match self.params.iter().position(|p| &p.name == key) {
                Some(slot) => slots[slot] = Some(value.clone()),
                None if self.catch_all.is_some() => {
                    extras.insert(key.as_str(), value.clone());
                }
                None => {}
            }
        }

        let mut values = Dict::new();
        for (param, slot) in self.params.iter().zip(slots) {
            let value = match slot.or_else(|| param.default.clone()) {
                Some(value) => value,
                None => return Err(errors::missing_argument(&self.name, &param.name)),
            };
            values.insert(param.name.as_str(), value);
        }
        Ok(BoundArgs { values, extras })
    }
}

/// Arguments after binding against a [`Signature`].
#[derive(Clone, Debug, Default, PartialEq)]
pub struct BoundArgs {
    values: Dict,
    extras: Dict,
}

impl BoundArgs {
    /// Value bound to a declared parameter.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    /// Declared parameters in declaration order.
    pub fn values(&self) -> &Dict {
        &self.values
    }

    /// Keywords collected by the catch-all.
    pub fn extras(&self) -> &Dict {
        &self.extras
    }
}

type Body = Rc<dyn Fn(&BoundArgs) -> EvalResult>;

/// A component builder.
#[derive(Clone)]
pub struct Component {
    signature: Signature,
    body: Body,
}

impl Component {
    pub fn new(signature: Signature, body: impl Fn(&BoundArgs) -> EvalResult + 'static) -> Self {
        Component {
            signature,
            body: Rc::new(body),
        }
    }

    /// A component whose body does nothing: the node comes from the arguments alone.
    pub fn markup(signature: Signature) -> Self {
        Component::new(signature, |_| Ok(Value::None))
    }

    pub fn name(&self) -> &str {
        self.signature.name()
    }

    pub fn signature(&self) -> &Signature {
        &self.signature
    }

    /// Build the node for one call.
    pub fn invoke(&self, args: &CallArgs) -> EvalResult<Node> {
        let bound = self.signature.bind(args)?;
        let returned = (self.body)(&bound)?;

        let mut builder = NodeBuilder::new(Node::tagged(self.name()));
        for value in &args.positional {
            builder.absorb(value.clone());
        }
        for (key, value) in &args.keywords {
            builder.set(key, value.clone());
        }
        let mut node = builder.finish();
        node.merge_return(returned);
        Ok(node)
    }
}

impl fmt::Debug for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Component")
            .field("signature", &self.signature)
            .finish_non_exhaustive()
    }
}

impl Callable for Component {
    fn name(&self) -> &str {
        self.signature.name()
    }

    fn call(&self, _env: &mut dyn Environment, args: CallArgs) -> EvalResult {
        self.invoke(&args).map(Value::node)
    }
}

/// Merge mapping arguments into one attribute dict.
///
/// Mappings merge in order, later winning; keywords override everything.
/// Non-mapping positionals are ignored.
pub fn attrs(args: &CallArgs) -> Dict {
    let mut merged = Dict::new();
    for value in &args.positional {
        if let Some(mapping) = value.as_mapping() {
            merged.extend_from(&mapping);
        }
    }
    for (key, value) in &args.keywords {
        merged.insert(key.as_str(), value.clone());
    }
    merged
}
