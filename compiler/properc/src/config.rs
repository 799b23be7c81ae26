//! One-call configuration loading.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use proper_eval::{Evaluator, Module, Node, RiskTier, SandboxError};
use thiserror::Error;

use crate::source::{load_source, to_valid_module_name, DEFAULT_MODULE_NAME};

/// Failure to load or evaluate a configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error(transparent)]
    Sandbox(#[from] SandboxError),
}

/// What an evaluator built by [`parse_config`] may import.
#[derive(Clone, Debug, Default)]
pub struct ConfigOptions {
    /// Module identifiers to allow.
    pub modules: Vec<String>,
    /// Risk tiers whose modules are allowed.
    pub tiers: Vec<RiskTier>,
    /// Directories searched for file modules. Empty means `.`.
    pub search_paths: Vec<PathBuf>,
}

impl ConfigOptions {
    /// A fresh evaluator configured from these options.
    pub fn evaluator(&self) -> Evaluator {
        let mut builder = Evaluator::builder();
        for path in &self.search_paths {
            builder = builder.search_path(path);
        }
        let mut evaluator = builder.build();
        evaluator.register_module(self.modules.iter().cloned());
        evaluator.register_builtin_tier(self.tiers.iter().copied());
        evaluator
    }
}

/// Evaluate a configuration given as a file path or as source text.
pub fn parse_config(input: &str, options: &ConfigOptions) -> Result<Node, ConfigError> {
    let source = load_source(input)?;
    let mut evaluator = options.evaluator();
    Ok(evaluator.parse(&source)?)
}

/// Evaluate the file at `path` and make its root attributes importable
/// from `evaluator` under a sanitized form of `module_name`.
///
/// The module still has to be allowed with `register_module` before a
/// program can import it.
pub fn import_config(
    path: impl AsRef<Path>,
    module_name: &str,
    evaluator: &mut Evaluator,
) -> Result<Rc<Module>, ConfigError> {
    let path = path.as_ref();
    let source = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let name = to_valid_module_name(module_name, DEFAULT_MODULE_NAME);
    let root = evaluator.parse(&source)?;
    tracing::debug!(module = %name, path = %path.display(), "defined configuration module");
    Ok(evaluator.define_module(Module::new(name, root.attributes().clone())))
}
