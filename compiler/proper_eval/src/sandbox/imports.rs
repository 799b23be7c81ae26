//! Guarded imports.
//!
//! Resolution order for an allow-listed name: the native table, the custom
//! resolver, modules already loaded from files during this parse, then
//! `<search path>/a/b.py` for `a.b`. File modules are evaluated by a fork
//! of the importing evaluator and expose the root attributes of the
//! resulting node as their symbols.

use std::cell::RefCell;
use std::fs;
use std::path::PathBuf;
use std::rc::Rc;

use rustc_hash::FxHashMap;
use tracing::debug;

use super::Evaluator;
use crate::callable::Environment;
use crate::errors::{self, EvalResult, SandboxError};
use crate::modules::{Module, ModuleResolver};
use crate::{Dict, Value};

/// File-module state shared between an evaluator and its forks.
#[derive(Clone, Debug, Default)]
pub(super) struct Loader {
    inner: Rc<RefCell<LoaderState>>,
}

#[derive(Debug, Default)]
struct LoaderState {
    cache: FxHashMap<String, Rc<Module>>,
    /// Modules currently being evaluated, outermost first.
    loading: Vec<String>,
}

impl Loader {
    pub(super) fn reset(&self) {
        let mut state = self.inner.borrow_mut();
        state.cache.clear();
        state.loading.clear();
    }

    fn cached(&self, name: &str) -> Option<Rc<Module>> {
        self.inner.borrow().cache.get(name).cloned()
    }

    fn is_loading(&self, name: &str) -> bool {
        self.inner.borrow().loading.iter().any(|loading| loading == name)
    }
}

impl Evaluator {
    /// Import an allow-listed module and merge its symbols into the
    /// namespace.
    pub fn import_module(&mut self, name: &str) -> Result<Rc<Module>, SandboxError> {
        if !self.allowlist.contains(name) {
            return Err(SandboxError::DisallowedModule {
                name: name.to_string(),
            });
        }
        let module = self.resolve_module(name)?;
        debug!(module = name, symbols = module.symbols().len(), "imported");
        self.namespace.extend_from(module.symbols());
        Ok(module)
    }

    pub(super) fn resolve_module(&self, name: &str) -> Result<Rc<Module>, SandboxError> {
        if let Some(module) = self.natives.resolve(name) {
            return Ok(module);
        }
        if let Some(module) = self.resolver.as_ref().and_then(|r| r.resolve(name)) {
            return Ok(module);
        }
        if let Some(module) = self.loader.cached(name) {
            return Ok(module);
        }
        self.load_file_module(name)
    }

    fn load_file_module(&self, name: &str) -> Result<Rc<Module>, SandboxError> {
        let Some(path) = self.find_module_file(name) else {
            return Err(SandboxError::ModuleNotFound {
                name: name.to_string(),
            });
        };
        if self.loader.is_loading(name) {
            return Err(SandboxError::CyclicImport {
                name: name.to_string(),
            });
        }
        let source = fs::read_to_string(&path).map_err(|source| SandboxError::ModuleRead {
            name: name.to_string(),
            path: path.clone(),
            source,
        })?;
        debug!(module = name, path = %path.display(), "loading module file");

        self.loader.inner.borrow_mut().loading.push(name.to_string());
        let result = self.fork().parse(&source);
        self.loader.inner.borrow_mut().loading.pop();

        let root = result.map_err(|err| SandboxError::ModuleLoad {
            name: name.to_string(),
            source: Box::new(err),
        })?;
        let module = Rc::new(Module::new(name, root.attributes().clone()));
        self.loader
            .inner
            .borrow_mut()
            .cache
            .insert(name.to_string(), Rc::clone(&module));
        Ok(module)
    }

    /// `a.b` maps to `a/b.py` under the first search path that has it.
    fn find_module_file(&self, name: &str) -> Option<PathBuf> {
        let valid = name.split('.').all(|part| {
            !part.is_empty() && part.chars().all(|c| c.is_alphanumeric() || c == '_')
        });
        if !valid {
            return None;
        }
        let relative = name.split('.').collect::<PathBuf>().with_extension("py");
        self.search_paths
            .iter()
            .map(|dir| dir.join(&relative))
            .find(|path| path.is_file())
    }

    /// An evaluator sharing this one's configuration and loader state.
    fn fork(&self) -> Evaluator {
        Evaluator {
            state: super::EvaluatorState::Constructed,
            allowlist: self.allowlist.clone(),
            registry: self.registry.clone(),
            natives: self.natives.clone(),
            resolver: self.resolver.clone(),
            search_paths: self.search_paths.clone(),
            namespace: Dict::new(),
            loader: self.loader.clone(),
            nested: true,
        }
    }
}

impl Environment for Evaluator {
    fn lookup(&self, name: &str) -> Option<Value> {
        self.namespace.get(name).cloned()
    }

    fn import(&mut self, name: &str) -> EvalResult<Rc<Module>> {
        self.import_module(name)
            .map_err(|err| errors::import_failed(&err))
    }
}
