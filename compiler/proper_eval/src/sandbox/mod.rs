//! The sandboxed evaluator.
//!
//! An [`Evaluator`] owns a private namespace, a module allow-list and a
//! registry of host-supplied values. Each call to [`Evaluator::parse`]
//! rebuilds the namespace from scratch:
//!
//! 1. builtins, then every allow-listed module that resolves (failures are
//!    skipped);
//! 2. hardening: the guarded `__import__` hook is installed and the names in
//!    [`DENIED_NAMES`] are set to `None`;
//! 3. the registry, which wins over everything above.
//!
//! It then walks the program's top-level statements and assembles an
//! untagged root [`Node`]. The deny-list blocks the known dangerous entry
//! points of the host syntax; it is not an isolation boundary.

mod imports;

use std::collections::BTreeSet;
use std::fmt;
use std::path::PathBuf;
use std::rc::Rc;

use proper_ir::{ExprArena, ExprId, ExprKind, ImportedNames, Program, StmtKind};
use tracing::{debug, trace};

use crate::callable::{Callable, ImportHook};
use crate::errors::SandboxError;
use crate::literal::literal_eval;
use crate::modules::{Module, ModuleResolver, NativeModules};
use crate::risk::{modules_at, RiskTier};
use crate::{builtins, Dict, Interpreter, Node, NodeBuilder, Value};

use imports::Loader;

/// Names neutralized to `None` in every sandbox namespace.
pub const DENIED_NAMES: &[&str] = &[
    "open",
    "eval",
    "exec",
    "compile",
    "input",
    "globals",
    "locals",
    "vars",
    "getattr",
    "setattr",
    "delattr",
    "breakpoint",
    "exit",
    "quit",
    "help",
    "memoryview",
    "type",
    "object",
    "super",
    "dir",
    "classmethod",
    "staticmethod",
    "property",
    "__builtins__",
    "__loader__",
    "__spec__",
    "__build_class__",
];

/// The first-party module every evaluator allows.
pub const FIRST_PARTY_MODULE: &str = "proper";

/// Lifecycle of an [`Evaluator`].
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum EvaluatorState {
    /// Built, never parsed.
    Constructed,
    /// Allow-listed modules loaded into a fresh namespace.
    Preloaded,
    /// Namespace hardened and registrations installed.
    Ready,
    /// Walking a program.
    Parsing,
    /// Last parse completed.
    Done,
}

/// Sandboxed parse-and-evaluate engine.
pub struct Evaluator {
    state: EvaluatorState,
    allowlist: BTreeSet<String>,
    registry: Dict,
    natives: NativeModules,
    resolver: Option<Rc<dyn ModuleResolver>>,
    search_paths: Vec<PathBuf>,
    namespace: Dict,
    loader: Loader,
    /// Set on evaluators forked to load a file module.
    nested: bool,
}

impl Evaluator {
    /// An evaluator with the standard native modules and `.` as search path.
    pub fn new() -> Self {
        EvaluatorBuilder::new().build()
    }

    pub fn builder() -> EvaluatorBuilder {
        EvaluatorBuilder::new()
    }

    pub fn state(&self) -> EvaluatorState {
        self.state
    }

    /// The namespace as left by the last parse.
    pub fn namespace(&self) -> &Dict {
        &self.namespace
    }

    pub fn is_allowed(&self, module: &str) -> bool {
        self.allowlist.contains(module)
    }

    /// Allow-listed module identifiers, sorted.
    pub fn allowed_modules(&self) -> impl Iterator<Item = &str> {
        self.allowlist.iter().map(String::as_str)
    }

    pub fn search_paths(&self) -> &[PathBuf] {
        &self.search_paths
    }

    // Registration

    /// Allow importing the named modules.
    pub fn register_module<I, S>(&mut self, names: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.allowlist.extend(names.into_iter().map(Into::into));
        self.registration_changed();
    }

    /// Allow every module classified at the given risk tiers.
    pub fn register_builtin_tier(&mut self, tiers: impl IntoIterator<Item = RiskTier>) {
        for tier in tiers {
            self.allowlist
                .extend(modules_at(tier).into_iter().map(String::from));
        }
        self.registration_changed();
    }

    /// Make `value` available under `name` in every future parse.
    pub fn register_value(&mut self, name: impl Into<String>, value: Value) {
        self.registry.insert(name, value);
        self.registration_changed();
    }

    /// Register a builder under its own name.
    pub fn register_component(&mut self, component: impl Callable + 'static) {
        let name = component.name().to_string();
        self.register_value(name, Value::function(component));
    }

    /// Make a module resolvable. Importing it still requires
    /// [`register_module`](Self::register_module).
    pub fn define_module(&mut self, module: Module) -> Rc<Module> {
        let module = self.natives.insert(module);
        self.registration_changed();
        module
    }

    fn registration_changed(&mut self) {
        if self.state == EvaluatorState::Done {
            self.state = EvaluatorState::Ready;
        }
    }

    // Parsing

    /// Evaluate a configuration program and return its root node.
    ///
    /// Syntax errors and import violations abort with a [`SandboxError`];
    /// failing expressions become [`Value::Error`] in place.
    #[tracing::instrument(level = "debug", skip_all)]
    pub fn parse(&mut self, source: &str) -> Result<Node, SandboxError> {
        if !self.nested {
            self.loader.reset();
        }
        self.rebuild_namespace();

        let program = proper_parse::parse(source).map_err(|err| {
            let (line, column) = err.line_col(source);
            SandboxError::Parse {
                line,
                column,
                source: err,
            }
        })?;

        self.state = EvaluatorState::Parsing;
        let result = self.walk(&program);
        self.state = match result {
            Ok(_) => EvaluatorState::Done,
            Err(_) => EvaluatorState::Ready,
        };
        result
    }

    fn rebuild_namespace(&mut self) {
        self.namespace = Dict::new();
        builtins::install(&mut self.namespace);

        let allowed: Vec<String> = self.allowlist.iter().cloned().collect();
        for name in &allowed {
            match self.resolve_module(name) {
                Ok(module) => self.namespace.extend_from(module.symbols()),
                Err(err) => debug!(module = %name, error = %err, "preload skipped"),
            }
        }
        self.state = EvaluatorState::Preloaded;

        self.namespace
            .insert("__import__", Value::function(ImportHook));
        for name in DENIED_NAMES {
            self.namespace.insert(*name, Value::None);
        }

        self.namespace.extend_from(&self.registry);
        self.state = EvaluatorState::Ready;
    }

    fn walk(&mut self, program: &Program) -> Result<Node, SandboxError> {
        let mut root = NodeBuilder::new(Node::root());
        for stmt in &program.stmts {
            trace!(span = %stmt.span, "statement");
            match &stmt.kind {
                StmtKind::Import(names) => {
                    for import in names {
                        let module = self.import_module(&import.path)?;
                        let binding = match &import.alias {
                            Some(alias) => Some(alias.as_str()),
                            None if !import.path.contains('.') => Some(import.path.as_str()),
                            None => None,
                        };
                        if let Some(binding) = binding {
                            self.namespace.insert(binding, Value::Module(module));
                        }
                    }
                }
                StmtKind::FromImport { module, names } => {
                    let imported = self.import_module(module)?;
                    if let ImportedNames::Names(names) = names {
                        for name in names {
                            let Some(symbol) = imported.get(&name.path) else {
                                debug!(module = %module, symbol = %name.path, "imported name not in module");
                                continue;
                            };
                            let binding = name.alias.as_deref().unwrap_or(&name.path);
                            self.namespace.insert(binding, symbol.clone());
                        }
                    }
                }
                StmtKind::Assign { targets, value } => {
                    let value = self.resolve_value(&program.arena, *value);
                    for target in targets {
                        match program.arena.kind(*target) {
                            ExprKind::Name(name) => root.set(name, value.clone()),
                            _ => debug!(span = %program.arena.span(*target), "non-name target skipped"),
                        }
                    }
                }
                StmtKind::Expr(id) => {
                    let value = self.resolve_value(&program.arena, *id);
                    if !value.is_none() {
                        root.absorb(value);
                    }
                }
                StmtKind::AugAssign { .. } | StmtKind::AnnAssign { .. } | StmtKind::Pass => {
                    debug!(span = %stmt.span, "statement ignored");
                }
            }
        }
        Ok(root.finish())
    }

    /// Constant literal first, then full evaluation; failures become an
    /// error marker.
    fn resolve_value(&mut self, arena: &ExprArena, id: ExprId) -> Value {
        if let Some(value) = literal_eval(arena, id) {
            return value;
        }
        match Interpreter::new(arena, self).eval(id) {
            Ok(value) => value,
            Err(err) => {
                debug!(span = %arena.span(id), error = %err, "evaluation failed");
                Value::Error(err)
            }
        }
    }
}

impl Default for Evaluator {
    fn default() -> Self {
        Evaluator::new()
    }
}

impl fmt::Debug for Evaluator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Evaluator")
            .field("state", &self.state)
            .field("allowlist", &self.allowlist)
            .field("registry", &self.registry.keys().collect::<Vec<_>>())
            .field("search_paths", &self.search_paths)
            .finish_non_exhaustive()
    }
}

/// Configures an [`Evaluator`] before first use.
#[derive(Default)]
pub struct EvaluatorBuilder {
    natives: Option<NativeModules>,
    modules: Vec<Module>,
    resolver: Option<Rc<dyn ModuleResolver>>,
    search_paths: Vec<PathBuf>,
}

impl EvaluatorBuilder {
    pub fn new() -> Self {
        EvaluatorBuilder::default()
    }

    /// Replace the standard native module table.
    #[must_use]
    pub fn natives(mut self, natives: NativeModules) -> Self {
        self.natives = Some(natives);
        self
    }

    /// Add a resolvable module. It still has to be allow-listed.
    #[must_use]
    pub fn module(mut self, module: Module) -> Self {
        self.modules.push(module);
        self
    }

    /// Consult `resolver` after the native table.
    #[must_use]
    pub fn resolver(mut self, resolver: impl ModuleResolver + 'static) -> Self {
        self.resolver = Some(Rc::new(resolver));
        self
    }

    /// Add a directory searched for `a/b.py` when importing `a.b`.
    /// Without any, the current directory is searched.
    #[must_use]
    pub fn search_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.search_paths.push(path.into());
        self
    }

    pub fn build(self) -> Evaluator {
        let mut natives = self.natives.unwrap_or_else(NativeModules::standard);
        for module in self.modules {
            natives.insert(module);
        }
        let search_paths = if self.search_paths.is_empty() {
            vec![PathBuf::from(".")]
        } else {
            self.search_paths
        };
        Evaluator {
            state: EvaluatorState::Constructed,
            allowlist: BTreeSet::from([FIRST_PARTY_MODULE.to_string()]),
            registry: Dict::new(),
            natives,
            resolver: self.resolver,
            search_paths,
            namespace: Dict::new(),
            loader: Loader::default(),
            nested: false,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests;
