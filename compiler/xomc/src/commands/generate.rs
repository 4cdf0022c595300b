//! The `generate` command: validate the declarations and write all three
//! artifacts.

use std::process::ExitCode;

use crate::GenerateError;

use super::{parse_or_usage, report_failure, report_warnings};

pub fn generate(args: &[String]) -> ExitCode {
    let Some((options, inputs)) = parse_or_usage("generate", args) else {
        return ExitCode::FAILURE;
    };

    match crate::generate(&inputs, &options) {
        Ok(generated) => {
            report_warnings(&generated.warnings, &options);
            println!(
                "generated {} artifact(s) for {} type(s) from {} file(s) in {}",
                generated.artifacts.len(),
                generated.types,
                generated.files,
                options.out_dir.display()
            );
            ExitCode::SUCCESS
        }
        Err(GenerateError::Invalid(diagnostics)) => report_failure(diagnostics, &options),
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}
