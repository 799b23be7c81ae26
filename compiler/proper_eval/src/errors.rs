//! Centralized error types and constructors for the evaluator.
//!
//! Two policies coexist. [`EvalError`] is a soft failure: it becomes a
//! [`Value::Error`](crate::Value::Error) in place of the value that failed
//! and the parse carries on. [`SandboxError`] is a hard failure returned
//! from [`Evaluator::parse`](crate::Evaluator::parse).
//!
//! Messages follow the wording of the host language the configuration
//! syntax borrows from, so authors recognize them.

use std::path::PathBuf;

use proper_parse::ParseError;
use thiserror::Error;

/// A soft evaluation failure.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct EvalError {
    pub message: String,
}

impl EvalError {
    #[cold]
    pub fn new(message: impl Into<String>) -> Self {
        EvalError {
            message: message.into(),
        }
    }
}

/// Result of evaluating an expression.
pub type EvalResult<T = crate::Value> = Result<T, EvalError>;

/// A hard failure that aborts `Evaluator::parse`.
#[derive(Debug, Error)]
pub enum SandboxError {
    #[error("syntax error at line {line}, column {column}: {source}")]
    Parse {
        line: usize,
        column: usize,
        #[source]
        source: ParseError,
    },

    /// The module is not on the evaluator's allow-list.
    #[error("Module {name} is not allowed")]
    DisallowedModule { name: String },

    #[error("No module named '{name}'")]
    ModuleNotFound { name: String },

    #[error("failed to read module '{name}' from {}: {source}", .path.display())]
    ModuleRead {
        name: String,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to load module '{name}': {source}")]
    ModuleLoad {
        name: String,
        #[source]
        source: Box<SandboxError>,
    },

    #[error("cyclic import of module '{name}'")]
    CyclicImport { name: String },
}

// Name resolution

#[cold]
pub fn undefined_name(name: &str) -> EvalError {
    EvalError::new(format!("name '{name}' is not defined"))
}

#[cold]
pub fn no_attribute(type_name: &str, attr: &str) -> EvalError {
    EvalError::new(format!("'{type_name}' object has no attribute '{attr}'"))
}

#[cold]
pub fn module_has_no_attribute(module: &str, attr: &str) -> EvalError {
    EvalError::new(format!("module '{module}' has no attribute '{attr}'"))
}

// Operators

#[cold]
pub fn division_by_zero() -> EvalError {
    EvalError::new("division by zero")
}

#[cold]
pub fn float_division_by_zero() -> EvalError {
    EvalError::new("float division by zero")
}

#[cold]
pub fn integer_division_by_zero() -> EvalError {
    EvalError::new("integer division or modulo by zero")
}

#[cold]
pub fn modulo_by_zero() -> EvalError {
    EvalError::new("integer modulo by zero")
}

#[cold]
pub fn integer_overflow() -> EvalError {
    EvalError::new("integer overflow")
}

#[cold]
pub fn integer_literal_too_large(text: &str) -> EvalError {
    EvalError::new(format!("integer literal too large: {text}"))
}

#[cold]
pub fn negative_shift_count() -> EvalError {
    EvalError::new("negative shift count")
}

#[cold]
pub fn unsupported_operand(op: &str, left: &str, right: &str) -> EvalError {
    EvalError::new(format!(
        "unsupported operand type(s) for {op}: '{left}' and '{right}'"
    ))
}

#[cold]
pub fn bad_unary_operand(op: &str, type_name: &str) -> EvalError {
    EvalError::new(format!("bad operand type for unary {op}: '{type_name}'"))
}

#[cold]
pub fn not_comparable(op: &str, left: &str, right: &str) -> EvalError {
    EvalError::new(format!(
        "'{op}' not supported between instances of '{left}' and '{right}'"
    ))
}

#[cold]
pub fn sequence_too_long() -> EvalError {
    EvalError::new("repeated sequence is too long")
}

#[cold]
pub fn zero_to_negative_power() -> EvalError {
    EvalError::new("0.0 cannot be raised to a negative power")
}

#[cold]
pub fn fractional_power_of_negative() -> EvalError {
    EvalError::new("negative number cannot be raised to a fractional power")
}

// Indexing and containers

#[cold]
pub fn not_subscriptable(type_name: &str) -> EvalError {
    EvalError::new(format!("'{type_name}' object is not subscriptable"))
}

#[cold]
pub fn index_out_of_range(type_name: &str) -> EvalError {
    EvalError::new(format!("{type_name} index out of range"))
}

#[cold]
pub fn indices_must_be_integers(type_name: &str, index_type: &str) -> EvalError {
    EvalError::new(format!(
        "{type_name} indices must be integers, not {index_type}"
    ))
}

#[cold]
pub fn key_not_found(key: &crate::Value) -> EvalError {
    EvalError::new(key.repr())
}

#[cold]
pub fn not_iterable(type_name: &str) -> EvalError {
    EvalError::new(format!("'{type_name}' object is not iterable"))
}

#[cold]
pub fn not_a_container(type_name: &str) -> EvalError {
    EvalError::new(format!("argument of type '{type_name}' is not iterable"))
}

#[cold]
pub fn in_string_requires_string(type_name: &str) -> EvalError {
    EvalError::new(format!(
        "'in <string>' requires string as left operand, not {type_name}"
    ))
}

#[cold]
pub fn empty_sequence(func: &str) -> EvalError {
    EvalError::new(format!("{func}() arg is an empty sequence"))
}

#[cold]
pub fn not_in_sequence(item: &str, type_name: &str) -> EvalError {
    EvalError::new(format!("{item} is not in {type_name}"))
}

#[cold]
pub fn dict_keys_must_be_strings(type_name: &str) -> EvalError {
    EvalError::new(format!("dict keys must be strings, not {type_name}"))
}

#[cold]
pub fn not_a_mapping(type_name: &str) -> EvalError {
    EvalError::new(format!(
        "argument after ** must be a mapping, not {type_name}"
    ))
}

// Calls

#[cold]
pub fn not_callable(type_name: &str) -> EvalError {
    EvalError::new(format!("'{type_name}' object is not callable"))
}

#[cold]
pub fn missing_argument(func: &str, param: &str) -> EvalError {
    EvalError::new(format!(
        "{func}() missing 1 required argument: '{param}'"
    ))
}

#[cold]
pub fn duplicate_keyword(func: &str, name: &str) -> EvalError {
    EvalError::new(format!(
        "{func}() got multiple values for keyword argument '{name}'"
    ))
}

#[cold]
pub fn unexpected_keyword(func: &str, name: &str) -> EvalError {
    EvalError::new(format!(
        "{func}() got an unexpected keyword argument '{name}'"
    ))
}

#[cold]
pub fn wrong_arg_count(func: &str, expected: &str, given: usize) -> EvalError {
    EvalError::new(format!(
        "{func}() takes {expected} ({given} given)"
    ))
}

#[cold]
pub fn wrong_arg_type(func: &str, expected: &str, given: &str) -> EvalError {
    EvalError::new(format!(
        "{func}() argument must be {expected}, not '{given}'"
    ))
}

#[cold]
pub fn invalid_literal(base: u32, text: &str) -> EvalError {
    EvalError::new(format!(
        "invalid literal for int() with base {base}: {}",
        crate::Value::str(text).repr()
    ))
}

#[cold]
pub fn invalid_float(text: &str) -> EvalError {
    EvalError::new(format!(
        "could not convert string to float: {}",
        crate::Value::str(text).repr()
    ))
}

#[cold]
pub fn value_error(message: impl Into<String>) -> EvalError {
    EvalError::new(message)
}

// Imports

/// An import attempted inside an expression, demoted to a soft failure.
#[cold]
pub fn import_failed(err: &SandboxError) -> EvalError {
    EvalError::new(err.to_string())
}

#[cold]
pub fn import_unavailable(name: &str) -> EvalError {
    EvalError::new(format!("import of '{name}' is not available here"))
}
