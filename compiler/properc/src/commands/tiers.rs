//! The `tiers` command: list classified modules per risk tier.

use std::fmt::Write;

use proper_eval::{modules_at, RiskTier};

/// Modules grouped under a heading per tier, `filter` limiting it to one.
pub fn tier_listing(filter: Option<RiskTier>) -> String {
    let mut out = String::new();
    let tiers: Vec<RiskTier> = match filter {
        Some(tier) => vec![tier],
        None => RiskTier::ALL.to_vec(),
    };
    for (i, tier) in tiers.into_iter().enumerate() {
        if i > 0 {
            out.push('\n');
        }
        let modules = modules_at(tier);
        // Writing to a String cannot fail.
        let _ = writeln!(out, "{tier} ({}, {} modules):", tier.level(), modules.len());
        for module in modules {
            let _ = writeln!(out, "  {module}");
        }
    }
    out
}

pub fn list_tiers(filter: Option<&str>) -> bool {
    let tier = match filter.map(str::parse::<RiskTier>).transpose() {
        Ok(tier) => tier,
        Err(err) => {
            eprintln!("error: {err}");
            return false;
        }
    };
    print!("{}", tier_listing(tier));
    true
}
