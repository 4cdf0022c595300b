//! Command handlers for the `xomc` CLI.
//!
//! Each handler takes the arguments after the command name, reports to
//! stdout/stderr and returns the process exit code.

use std::io::IsTerminal;
use std::path::PathBuf;
use std::process::ExitCode;

use xom_diagnostic::Diagnostic;

use crate::options::{parse_args, GenerateOptions};
use crate::report::report;

mod check;
mod explain;
mod generate;
mod graph;

pub use check::check;
pub use explain::explain_error;
pub use generate::generate;
pub use graph::graph;

/// Parse arguments, printing the usage line of `command` on failure.
fn parse_or_usage(command: &str, args: &[String]) -> Option<(GenerateOptions, Vec<PathBuf>)> {
    match parse_args(args) {
        Ok(parsed) => Some(parsed),
        Err(err) => {
            eprintln!("error: {err}");
            eprintln!("Usage: xomc {command} <paths...> [options]");
            eprintln!("Run `xomc help` for the list of options.");
            None
        }
    }
}

/// Write diagnostics to stderr; returns the failure exit code.
fn report_failure(diagnostics: Vec<Diagnostic>, options: &GenerateOptions) -> ExitCode {
    report_to_stderr(diagnostics, options);
    ExitCode::FAILURE
}

/// Write the warnings of a successful run to stderr.
fn report_warnings(warnings: &[Diagnostic], options: &GenerateOptions) {
    if !warnings.is_empty() {
        report_to_stderr(warnings.to_vec(), options);
    }
}

fn report_to_stderr(diagnostics: Vec<Diagnostic>, options: &GenerateOptions) {
    let stderr = std::io::stderr();
    let is_tty = stderr.is_terminal();
    report(diagnostics, options, stderr.lock(), is_tty);
}
