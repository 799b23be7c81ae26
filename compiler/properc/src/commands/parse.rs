//! The `parse` command: evaluate a configuration and print it as JSON.

use proper_eval::Node;

use crate::{parse_config, ConfigOptions};

/// Pretty JSON for a root node.
pub fn render_json(root: &Node) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(root)
}

pub fn parse_file(input: &str, options: &ConfigOptions) -> bool {
    let root = match parse_config(input, options) {
        Ok(root) => root,
        Err(err) => {
            eprintln!("error: {err}");
            return false;
        }
    };
    match render_json(&root) {
        Ok(json) => {
            println!("{json}");
            true
        }
        Err(err) => {
            eprintln!("error: cannot render configuration: {err}");
            false
        }
    }
}
