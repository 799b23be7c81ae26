//! Source loading and module naming.

use std::fs;
use std::path::Path;

use crate::ConfigError;

/// Module name used when a requested name has no usable character.
pub const DEFAULT_MODULE_NAME: &str = "config_file";

/// Read `input` if it names an existing file, otherwise treat it as source
/// text.
pub fn load_source(input: &str) -> Result<String, ConfigError> {
    let path = Path::new(input);
    if !path.is_file() {
        return Ok(input.to_string());
    }
    tracing::debug!(path = %path.display(), "reading configuration file");
    fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Turn an arbitrary string into a module identifier.
///
/// Characters outside `[A-Za-z0-9_]` become `_`, runs of `_` collapse into
/// one, and a leading digit gets a `_` prefix. A name without a single
/// valid character yields `fallback`.
pub fn to_valid_module_name(name: &str, fallback: &str) -> String {
    let is_valid = |c: char| c.is_ascii_alphanumeric() || c == '_';
    if !name.chars().any(is_valid) {
        return fallback.to_string();
    }

    let mut result = String::with_capacity(name.len() + 1);
    for c in name.chars() {
        let c = if is_valid(c) { c } else { '_' };
        if c == '_' && result.ends_with('_') {
            continue;
        }
        result.push(c);
    }
    if result.starts_with(|c: char| c.is_ascii_digit()) {
        result.insert(0, '_');
    }
    result
}
