//! The `explain` command: display documentation for an error code.

use std::process::ExitCode;

use xom_diagnostic::{ErrorCode, ErrorDocs};

pub fn explain_error(code_str: &str) -> ExitCode {
    let Ok(code) = code_str.parse::<ErrorCode>() else {
        eprintln!("Unknown error code: {code_str}");
        eprintln!();
        eprintln!("Codes have the format EXXXX where X is a digit.");
        eprintln!("Examples: E0003, E1005, E2002, E4001");
        return ExitCode::FAILURE;
    };

    match ErrorDocs::get(code) {
        Some(doc) => {
            println!("{doc}");
            println!("Kind: {}", code.kind());
            ExitCode::SUCCESS
        }
        None => {
            eprintln!("No documentation available for {code}");
            ExitCode::FAILURE
        }
    }
}
