//! The `check` command: report every evaluation error in a configuration.

use proper_eval::Node;

use crate::{parse_config, ConfigOptions};

/// One line per error marker: `<path>: <message>`.
pub fn error_report(root: &Node) -> Vec<String> {
    root.errors()
        .into_iter()
        .map(|(path, err)| format!("{path}: {err}"))
        .collect()
}

/// Fails on a hard error or when any value failed to evaluate.
pub fn check_file(input: &str, options: &ConfigOptions) -> bool {
    let root = match parse_config(input, options) {
        Ok(root) => root,
        Err(err) => {
            eprintln!("error: {err}");
            return false;
        }
    };
    let report = error_report(&root);
    if report.is_empty() {
        println!("ok: no evaluation errors");
        return true;
    }
    for line in &report {
        eprintln!("{line}");
    }
    eprintln!(
        "{} evaluation error{}",
        report.len(),
        if report.len() == 1 { "" } else { "s" }
    );
    false
}
