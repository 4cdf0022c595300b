//! The `graph` command: print the resolved type graph.

use std::process::ExitCode;

use crate::{analyze_inputs, render_graph};

use super::{parse_or_usage, report_failure, report_warnings};

pub fn graph(args: &[String]) -> ExitCode {
    let Some((options, inputs)) = parse_or_usage("graph", args) else {
        return ExitCode::FAILURE;
    };

    match analyze_inputs(&inputs, &options) {
        Ok(session) => {
            report_warnings(&session.warnings, &options);
            print!("{}", render_graph(&session));
            ExitCode::SUCCESS
        }
        Err(diagnostics) => report_failure(diagnostics, &options),
    }
}
