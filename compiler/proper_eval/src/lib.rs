//! Sandboxed evaluation for the proper configuration language.
//!
//! A configuration program is parsed by `proper_parse` and walked by an
//! [`Evaluator`]. Top-level assignments become attributes of a root
//! [`Node`]; bare expressions become its children. Component calls build
//! nested nodes, so the result is a tree that serializes to JSON.
//!
//! Imports are restricted to an allow-list. Modules are classified by
//! [`RiskTier`] so hosts can allow whole tiers at once.
//!
//! # Example
//!
//! ```
//! use proper_eval::{Component, Evaluator, Signature, Value};
//!
//! let mut evaluator = Evaluator::new();
//! evaluator.register_component(Component::markup(Signature::new("div")));
//! let root = evaluator.parse("title = 'home'\ndiv('hello')").unwrap();
//! assert_eq!(root.attribute("title"), Some(&Value::str("home")));
//! assert_eq!(root.children().len(), 1);
//! ```

pub mod builtins;
mod callable;
mod component;
mod dict;
pub mod errors;
mod interpreter;
mod literal;
mod modules;
mod node;
mod risk;
mod router;
mod sandbox;
mod value;

pub use callable::{
    BoundMethod, CallArgs, Callable, Environment, Function, ImportHook, MethodFnPtr, NativeFn,
    NativeFnPtr,
};
pub use component::{attrs, BoundArgs, Component, Param, ParamKind, Signature};
pub use dict::Dict;
pub use errors::{EvalError, EvalResult, SandboxError};
pub use interpreter::Interpreter;
pub use literal::literal_eval;
pub use modules::{Module, ModuleResolver, NativeModules};
pub use node::{Node, NodeBuilder, CHILDREN_KEY, TAG_KEY};
pub use risk::{modules_at, tier_of, RiskTier, UnknownTier};
pub use router::{Receiver, RoutedComponent};
pub use sandbox::{
    Evaluator, EvaluatorBuilder, EvaluatorState, DENIED_NAMES, FIRST_PARTY_MODULE,
};
pub use value::{Shape, Value};
