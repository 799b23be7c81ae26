//! Full expression evaluation.
//!
//! The second resolution pass. Walks an expression tree in an
//! [`ExprArena`] against an [`Environment`], the sandbox namespace in
//! practice. Failures come back as [`EvalError`]s; the caller decides
//! whether they are fatal.
//!
//! [`EvalError`]: crate::EvalError

pub(crate) mod methods;
pub(crate) mod operators;

use proper_ir::{ensure_sufficient_stack, Arg, BoolOp, DictEntry, ExprArena, ExprId, ExprKind};

use crate::builtins::iterate;
use crate::callable::{call_value, CallArgs, Environment};
use crate::errors::{self, EvalResult};
use crate::{Dict, Value};

/// Tree-walking evaluator for one expression arena.
pub struct Interpreter<'a> {
    arena: &'a ExprArena,
    env: &'a mut dyn Environment,
}

impl<'a> Interpreter<'a> {
    pub fn new(arena: &'a ExprArena, env: &'a mut dyn Environment) -> Self {
        Interpreter { arena, env }
    }

    /// Evaluate an expression.
    pub fn eval(&mut self, id: ExprId) -> EvalResult {
        ensure_sufficient_stack(|| self.eval_inner(id))
    }

    fn eval_inner(&mut self, id: ExprId) -> EvalResult {
        let arena = self.arena;
        match arena.kind(id) {
            ExprKind::None => Ok(Value::None),
            ExprKind::Bool(b) => Ok(Value::Bool(*b)),
            ExprKind::Int(n) => Ok(Value::Int(*n)),
            ExprKind::BigInt(text) => Err(errors::integer_literal_too_large(text)),
            ExprKind::Float(f) => Ok(Value::Float(*f)),
            ExprKind::Str(s) => Ok(Value::str(s.as_str())),
            ExprKind::Name(name) => self
                .env
                .lookup(name)
                .ok_or_else(|| errors::undefined_name(name)),
            ExprKind::List(items) => self.eval_all(items).map(Value::list),
            ExprKind::Tuple(items) => self.eval_all(items).map(Value::tuple),
            ExprKind::Dict(entries) => self.eval_dict(entries),
            ExprKind::Unary { op, operand } => {
                let operand = self.eval(*operand)?;
                operators::unary(*op, &operand)
            }
            ExprKind::Binary { op, left, right } => {
                let left = self.eval(*left)?;
                let right = self.eval(*right)?;
                operators::binary(*op, &left, &right)
            }
            ExprKind::Logical { op, left, right } => {
                let left = self.eval(*left)?;
                let short_circuits = match op {
                    BoolOp::And => !left.is_truthy(),
                    BoolOp::Or => left.is_truthy(),
                };
                if short_circuits {
                    Ok(left)
                } else {
                    self.eval(*right)
                }
            }
            ExprKind::Compare { left, rest } => {
                let mut lhs = self.eval(*left)?;
                for (op, right) in rest {
                    let rhs = self.eval(*right)?;
                    if !operators::compare(*op, &lhs, &rhs)? {
                        return Ok(Value::Bool(false));
                    }
                    lhs = rhs;
                }
                Ok(Value::Bool(true))
            }
            ExprKind::IfElse {
                cond,
                then,
                otherwise,
            } => {
                if self.eval(*cond)?.is_truthy() {
                    self.eval(*then)
                } else {
                    self.eval(*otherwise)
                }
            }
            ExprKind::Attribute { receiver, name } => {
                let receiver = self.eval(*receiver)?;
                methods::attribute(&receiver, name)
            }
            ExprKind::Subscript { receiver, index } => {
                let receiver = self.eval(*receiver)?;
                let index = self.eval(*index)?;
                operators::subscript(&receiver, &index)
            }
            ExprKind::Call { func, args } => {
                let callee = self.eval(*func)?;
                let args = self.eval_args(&callee, args)?;
                call_value(&callee, &mut *self.env, args)
            }
        }
    }

    fn eval_all(&mut self, items: &[ExprId]) -> EvalResult<Vec<Value>> {
        items.iter().map(|&item| self.eval(item)).collect()
    }

    fn eval_dict(&mut self, entries: &[DictEntry]) -> EvalResult {
        let mut dict = Dict::new();
        for entry in entries {
            match entry {
                DictEntry::Pair { key, value } => {
                    let key = match self.eval(*key)? {
                        Value::Str(key) => key,
                        other => return Err(errors::dict_keys_must_be_strings(other.type_name())),
                    };
                    let value = self.eval(*value)?;
                    dict.insert(&*key, value);
                }
                DictEntry::Spread(mapping) => {
                    let mapping = self.eval(*mapping)?;
                    let Some(entries) = mapping.as_mapping() else {
                        return Err(errors::not_a_mapping(mapping.type_name()));
                    };
                    dict.extend_from(&entries);
                }
            }
        }
        Ok(Value::dict(dict))
    }

    /// Evaluate call arguments left to right, expanding `*` and `**`.
    fn eval_args(&mut self, callee: &Value, args: &[Arg]) -> EvalResult<CallArgs> {
        let func_name = match callee {
            Value::Function(func) => func.name().to_string(),
            other => other.type_name().to_string(),
        };
        let mut call = CallArgs::new();
        let push_keyword = |call: &mut CallArgs, name: &str, value: Value| {
            if call.has_keyword(name) {
                return Err(errors::duplicate_keyword(&func_name, name));
            }
            call.keywords.push((name.to_string(), value));
            Ok(())
        };
        for arg in args {
            match arg {
                Arg::Positional(value) => call.positional.push(self.eval(*value)?),
                Arg::Star(iterable) => {
                    let iterable = self.eval(*iterable)?;
                    call.positional.extend(iterate(&iterable)?);
                }
                Arg::Keyword { name, value } => {
                    let value = self.eval(*value)?;
                    push_keyword(&mut call, name, value)?;
                }
                Arg::DoubleStar(mapping) => {
                    let mapping = self.eval(*mapping)?;
                    let Some(entries) = mapping.as_mapping() else {
                        return Err(errors::not_a_mapping(mapping.type_name()));
                    };
                    for (name, value) in entries.iter() {
                        push_keyword(&mut call, name, value.clone())?;
                    }
                }
            }
        }
        Ok(call)
    }
}
