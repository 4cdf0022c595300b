//! xom generator CLI

use std::process::ExitCode;

use xomc::commands::{check, explain_error, generate, graph};

fn main() -> ExitCode {
    xomc::init_tracing();

    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        print_usage();
        return ExitCode::FAILURE;
    }

    let command = &args[1];

    match command.as_str() {
        "generate" | "gen" => generate(&args[2..]),
        "check" => check(&args[2..]),
        "graph" => graph(&args[2..]),
        "explain" | "--explain" => {
            if args.len() < 3 {
                eprintln!("Usage: xomc explain <ERROR_CODE>");
                eprintln!("Example: xomc explain E2002");
                return ExitCode::FAILURE;
            }
            explain_error(&args[2])
        }
        "help" | "--help" | "-h" => {
            print_usage();
            ExitCode::SUCCESS
        }
        "version" | "--version" | "-V" => {
            println!("xomc {}", env!("CARGO_PKG_VERSION"));
            ExitCode::SUCCESS
        }
        _ => {
            eprintln!("Unknown command: {command}");
            eprintln!();
            print_usage();
            ExitCode::FAILURE
        }
    }
}

fn print_usage() {
    println!("xom object-model generator");
    println!();
    println!("Usage: xomc <command> [options]");
    println!();
    println!("Commands:");
    println!("  generate <paths...>  Validate declarations and write all artifacts");
    println!("  check <paths...>     Validate declarations without writing anything");
    println!("  graph <paths...>     Print the resolved type graph");
    println!("  explain <code>       Explain an error code (e.g., E2002)");
    println!("  help                 Show this help message");
    println!("  version              Show version information");
    println!();
    println!("Paths are declaration files or directories searched for *.xom.json.");
    println!();
    println!("Options:");
    println!("  -o, --out=<dir>             Output directory (default: generated)");
    println!("  --format=<text|json>        Artifact encoding (default: text)");
    println!("  --diagnostics=<terminal|json>");
    println!("                              Diagnostic output (default: terminal)");
    println!("  --default-contract=<name>   Contract of ungated declarations");
    println!("  --error-limit=<n>           Show at most n errors (0 = all)");
    println!("  --no-parallel               Run every stage on one thread");
    println!("  --color=<auto|always|never> Colored diagnostics (default: auto)");
    println!();
    println!("Environment:");
    println!("  RUST_LOG=xom_sema=debug     Enable tracing output");
    println!("  XOMC_LOG_TREE=1             Print tracing as an indented span tree");
}
