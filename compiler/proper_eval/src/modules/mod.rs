//! Importable modules and how the evaluator finds them.
//!
//! A [`Module`] is a named bag of symbols. Modules written in Rust come from a
//! [`ModuleResolver`]; [`NativeModules`] is the stock resolver and ships the
//! `proper`, `math` and `string` modules. Configuration files on the search
//! path are loaded by the evaluator itself.

mod native;

use std::fmt;
use std::rc::Rc;

use rustc_hash::FxHashMap;

use crate::{Dict, Value};

/// A named set of symbols merged into the namespace on import.
#[derive(Clone, PartialEq)]
pub struct Module {
    name: String,
    symbols: Dict,
}

impl Module {
    pub fn new(name: impl Into<String>, symbols: Dict) -> Self {
        Module {
            name: name.into(),
            symbols,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn symbols(&self) -> &Dict {
        &self.symbols
    }

    pub fn get(&self, symbol: &str) -> Option<&Value> {
        self.symbols.get(symbol)
    }
}

impl fmt::Debug for Module {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Module")
            .field("name", &self.name)
            .field("symbols", &self.symbols.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// Source of modules defined outside configuration files.
pub trait ModuleResolver {
    /// The module named by a dotted identifier, or `None` if this resolver
    /// does not provide it.
    fn resolve(&self, name: &str) -> Option<Rc<Module>>;
}

/// Table of modules built in Rust.
#[derive(Clone, Debug, Default)]
pub struct NativeModules {
    modules: FxHashMap<String, Rc<Module>>,
}

impl NativeModules {
    /// An empty table.
    pub fn new() -> Self {
        NativeModules::default()
    }

    /// The modules every evaluator starts with: `proper`, `math`, `string`.
    pub fn standard() -> Self {
        let mut modules = NativeModules::new();
        modules.insert(native::proper_module());
        modules.insert(native::math_module());
        modules.insert(native::string_module());
        modules
    }

    /// Add or replace a module, keyed by its name.
    pub fn insert(&mut self, module: Module) -> Rc<Module> {
        let module = Rc::new(module);
        self.modules.insert(module.name.clone(), Rc::clone(&module));
        module
    }
}

impl ModuleResolver for NativeModules {
    fn resolve(&self, name: &str) -> Option<Rc<Module>> {
        self.modules.get(name).cloned()
    }
}
