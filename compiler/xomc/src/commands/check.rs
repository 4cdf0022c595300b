//! The `check` command: run every validation without writing artifacts.

use std::process::ExitCode;

use crate::analyze_inputs;

use super::{parse_or_usage, report_failure, report_warnings};

pub fn check(args: &[String]) -> ExitCode {
    let Some((options, inputs)) = parse_or_usage("check", args) else {
        return ExitCode::FAILURE;
    };

    match analyze_inputs(&inputs, &options) {
        Ok(session) => {
            report_warnings(&session.warnings, &options);
            println!(
                "OK: {} type(s), {} member(s) in {} file(s)",
                session.table.type_count(),
                session.table.member_count(),
                session.files.len()
            );
            ExitCode::SUCCESS
        }
        Err(diagnostics) => report_failure(diagnostics, &options),
    }
}
