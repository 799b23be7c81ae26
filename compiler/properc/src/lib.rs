//! Driver for the proper configuration language.
//!
//! Wraps [`proper_eval`] with the pieces an application needs around a
//! sandboxed parse: reading sources, naming file-backed modules, and
//! one-call evaluation from [`ConfigOptions`]. The `proper` binary is
//! built on the handlers in [`commands`].

use std::sync::Once;

pub mod commands;
mod config;
mod source;

pub use config::{import_config, parse_config, ConfigError, ConfigOptions};
pub use source::{load_source, to_valid_module_name, DEFAULT_MODULE_NAME};

static TRACING_INIT: Once = Once::new();

/// Install a `tracing` subscriber filtered by `RUST_LOG`.
///
/// Does nothing when `RUST_LOG` is unset, so `print()` calls and debug
/// output stay silent by default. Safe to call more than once.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, prelude::*, EnvFilter};

        if std::env::var("RUST_LOG").is_ok() {
            let filter = EnvFilter::from_default_env();
            tracing_subscriber::registry()
                .with(fmt::layer().with_target(true).with_level(true).with_writer(std::io::stderr))
                .with(filter)
                .init();
        }
    });
}
