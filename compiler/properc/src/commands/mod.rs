//! Command handlers for the `proper` CLI.
//!
//! Each handler prints its output and returns whether the command
//! succeeded; `main` turns that into the exit status. The rendering
//! helpers are public so tests can check output without a process.

mod check;
mod parse;
mod tiers;

use std::path::PathBuf;

use proper_eval::RiskTier;

use crate::ConfigOptions;

pub use check::{check_file, error_report};
pub use parse::{parse_file, render_json};
pub use tiers::{list_tiers, tier_listing};

/// Split `proper parse`/`proper check` arguments into the input and its
/// options. Unknown flags are errors; a second positional is too.
pub fn parse_config_options(args: &[String]) -> Result<(String, ConfigOptions), String> {
    let mut options = ConfigOptions::default();
    let mut input = None;

    for arg in args {
        if let Some(module) = arg.strip_prefix("--module=") {
            options.modules.push(module.to_string());
        } else if let Some(tier) = arg.strip_prefix("--tier=") {
            options.tiers
                .push(tier.parse::<RiskTier>().map_err(|err| err.to_string())?);
        } else if let Some(path) = arg.strip_prefix("--path=") {
            options.search_paths.push(PathBuf::from(path));
        } else if arg.starts_with("--") {
            return Err(format!("unknown option '{arg}'"));
        } else if input.is_none() {
            input = Some(arg.clone());
        } else {
            return Err(format!("unexpected argument '{arg}'"));
        }
    }

    let input = input.ok_or_else(|| "missing file path".to_string())?;
    Ok((input, options))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn args(items: &[&str]) -> Vec<String> {
        items.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn test_parse_config_options() {
        let (input, options) = parse_config_options(&args(&[
            "site.py",
            "--module=theme",
            "--tier=normal",
            "--tier=0",
            "--path=lib",
        ]))
        .unwrap();
        assert_eq!(input, "site.py");
        assert_eq!(options.modules, vec!["theme".to_string()]);
        assert_eq!(options.tiers, vec![RiskTier::Normal, RiskTier::Monitor]);
        assert_eq!(options.search_paths, vec![PathBuf::from("lib")]);
    }

    #[test]
    fn test_parse_config_options_errors() {
        assert_eq!(
            parse_config_options(&args(&[])).unwrap_err(),
            "missing file path"
        );
        assert_eq!(
            parse_config_options(&args(&["a.py", "--verbose"])).unwrap_err(),
            "unknown option '--verbose'"
        );
        assert_eq!(
            parse_config_options(&args(&["a.py", "b.py"])).unwrap_err(),
            "unexpected argument 'b.py'"
        );
        assert!(parse_config_options(&args(&["a.py", "--tier=lethal"]))
            .unwrap_err()
            .starts_with("unknown risk tier `lethal`"));
    }
}
