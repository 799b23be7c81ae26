//! Callables and the environment they run against.

use std::fmt;
use std::rc::Rc;

use crate::errors::{self, EvalError, EvalResult};
use crate::modules::Module;
use crate::Value;

/// Name scope an expression is evaluated against.
///
/// The evaluator implements it over its sandbox namespace; a bare [`Dict`]
/// implements it with imports unavailable.
///
/// [`Dict`]: crate::Dict
pub trait Environment {
    fn lookup(&self, name: &str) -> Option<Value>;

    /// Import through the guarded import routine, merging the module's
    /// symbols into the scope.
    fn import(&mut self, name: &str) -> EvalResult<Rc<Module>>;
}

impl Environment for crate::Dict {
    fn lookup(&self, name: &str) -> Option<Value> {
        self.get(name).cloned()
    }

    fn import(&mut self, name: &str) -> EvalResult<Rc<Module>> {
        Err(errors::import_unavailable(name))
    }
}

/// Something that can be called from configuration code.
pub trait Callable {
    fn name(&self) -> &str;

    fn call(&self, env: &mut dyn Environment, args: CallArgs) -> EvalResult;
}

/// Arguments of one call, after `*` and `**` expansion.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CallArgs {
    pub positional: Vec<Value>,
    pub keywords: Vec<(String, Value)>,
}

impl CallArgs {
    pub fn new() -> Self {
        CallArgs::default()
    }

    pub fn positional(values: Vec<Value>) -> Self {
        CallArgs {
            positional: values,
            keywords: Vec::new(),
        }
    }

    #[must_use]
    pub fn arg(mut self, value: impl Into<Value>) -> Self {
        self.positional.push(value.into());
        self
    }

    #[must_use]
    pub fn kwarg(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.keywords.push((name.into(), value.into()));
        self
    }

    pub fn keyword(&self, name: &str) -> Option<&Value> {
        self.keywords
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value)
    }

    pub fn has_keyword(&self, name: &str) -> bool {
        self.keyword(name).is_some()
    }

    /// Reject keyword arguments for builtins that take none.
    pub fn no_keywords(&self, func: &str) -> EvalResult<()> {
        match self.keywords.first() {
            Some((name, _)) => Err(errors::unexpected_keyword(func, name)),
            None => Ok(()),
        }
    }

    /// Require between `min` and `max` positional arguments.
    pub fn arity(&self, func: &str, min: usize, max: usize) -> EvalResult<()> {
        let given = self.positional.len();
        if (min..=max).contains(&given) {
            return Ok(());
        }
        let expected = match (min, max) {
            (0, 0) => "no arguments".to_string(),
            (1, 1) => "exactly one argument".to_string(),
            (min, max) if min == max => format!("exactly {min} arguments"),
            (min, max) => format!("from {min} to {max} arguments"),
        };
        Err(errors::wrong_arg_count(func, &expected, given))
    }
}

/// A shared, opaque callable value.
#[derive(Clone)]
pub struct Function(Rc<dyn Callable>);

impl Function {
    pub fn new(callable: impl Callable + 'static) -> Self {
        Function(Rc::new(callable))
    }

    pub fn name(&self) -> &str {
        self.0.name()
    }

    pub fn call(&self, env: &mut dyn Environment, args: CallArgs) -> EvalResult {
        tracing::trace!(function = self.name(), "call");
        self.0.call(env, args)
    }

    pub fn ptr_eq(&self, other: &Function) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<function {}>", self.name())
    }
}

/// Signature of a native function.
pub type NativeFnPtr = fn(CallArgs) -> EvalResult;

/// A function implemented in Rust.
#[derive(Clone, Copy)]
pub struct NativeFn {
    name: &'static str,
    func: NativeFnPtr,
}

impl NativeFn {
    pub const fn new(name: &'static str, func: NativeFnPtr) -> Self {
        NativeFn { name, func }
    }
}

impl Callable for NativeFn {
    fn name(&self) -> &str {
        self.name
    }

    fn call(&self, _env: &mut dyn Environment, args: CallArgs) -> EvalResult {
        (self.func)(args)
    }
}

/// Signature of a method implemented in Rust.
pub type MethodFnPtr = fn(&Value, CallArgs) -> EvalResult;

/// A method bound to its receiver: `"a,b".split` evaluates to one of these.
#[derive(Clone)]
pub struct BoundMethod {
    receiver: Value,
    name: &'static str,
    func: MethodFnPtr,
}

impl BoundMethod {
    pub fn new(receiver: Value, name: &'static str, func: MethodFnPtr) -> Self {
        BoundMethod {
            receiver,
            name,
            func,
        }
    }
}

impl Callable for BoundMethod {
    fn name(&self) -> &str {
        self.name
    }

    fn call(&self, _env: &mut dyn Environment, args: CallArgs) -> EvalResult {
        (self.func)(&self.receiver, args)
    }
}

/// The `__import__` entry point installed in every sandbox namespace.
pub struct ImportHook;

impl Callable for ImportHook {
    fn name(&self) -> &str {
        "__import__"
    }

    fn call(&self, env: &mut dyn Environment, args: CallArgs) -> EvalResult {
        let Some(first) = args.positional.first() else {
            return Err(errors::missing_argument("__import__", "name"));
        };
        let Some(name) = first.as_str() else {
            return Err(errors::wrong_arg_type("__import__", "str", first.type_name()));
        };
        env.import(name).map(Value::Module)
    }
}

/// Call `callee`, failing for values that are not functions.
pub(crate) fn call_value(callee: &Value, env: &mut dyn Environment, args: CallArgs) -> EvalResult {
    match callee {
        Value::Function(func) => func.call(env, args),
        other => Err(errors::not_callable(other.type_name())),
    }
}

pub(crate) fn type_error(func: &str, expected: &str, got: &Value) -> EvalError {
    errors::wrong_arg_type(func, expected, got.type_name())
}
