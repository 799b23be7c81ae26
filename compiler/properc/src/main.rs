//! The `proper` command-line tool.

use std::process::ExitCode;

use properc::commands::{check_file, list_tiers, parse_config_options, parse_file};

fn main() -> ExitCode {
    properc::init_tracing();

    let args: Vec<String> = std::env::args().collect();
    if args.len() < 2 {
        print_usage();
        return ExitCode::FAILURE;
    }

    let succeeded = match args[1].as_str() {
        "parse" | "check" => match parse_config_options(&args[2..]) {
            Ok((input, options)) if args[1] == "parse" => parse_file(&input, &options),
            Ok((input, options)) => check_file(&input, &options),
            Err(message) => {
                eprintln!("error: {message}");
                eprintln!("Usage: proper {} <file> [options]", args[1]);
                false
            }
        },
        "tiers" => list_tiers(args.get(2).map(String::as_str)),
        "help" | "--help" | "-h" => {
            print_usage();
            true
        }
        "version" | "--version" | "-V" => {
            println!("proper {}", env!("CARGO_PKG_VERSION"));
            true
        }
        other => {
            eprintln!("error: unknown command '{other}'");
            eprintln!();
            print_usage();
            false
        }
    };

    if succeeded {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

fn print_usage() {
    println!("proper - sandboxed configuration evaluator");
    println!();
    println!("Usage: proper <command> [options]");
    println!();
    println!("Commands:");
    println!("  parse <file>     Evaluate a configuration and print it as JSON");
    println!("  check <file>     Report every evaluation error in a configuration");
    println!("  tiers [<tier>]   List classified modules per risk tier");
    println!("  help             Show this help message");
    println!("  version          Show version information");
    println!();
    println!("Options for parse and check:");
    println!("  --module=<id>    Allow importing a module (repeatable)");
    println!("  --tier=<tier>    Allow every module of a tier: monitor, normal, risk, blocked (repeatable)");
    println!("  --path=<dir>     Search a directory for module files (repeatable, default: .)");
    println!();
    println!("Set RUST_LOG (e.g. RUST_LOG=debug) to see evaluation logs and print() output.");
}
