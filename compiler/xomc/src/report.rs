//! Diagnostic reporting for the CLI.

use std::io::Write;

use xom_diagnostic::emitter::{DiagnosticEmitter, JsonEmitter, TerminalEmitter};
use xom_diagnostic::{Diagnostic, DiagnosticConfig, DiagnosticQueue};

use crate::options::{DiagnosticFormat, GenerateOptions};

/// Sort, limit and write `diagnostics`. Returns the number of errors.
///
/// Warnings are written alongside errors. Nothing is written when there are
/// no diagnostics at all.
pub fn report<W: Write>(
    diagnostics: Vec<Diagnostic>,
    options: &GenerateOptions,
    mut writer: W,
    is_tty: bool,
) -> usize {
    let mut queue = DiagnosticQueue::with_config(DiagnosticConfig {
        error_limit: options.error_limit,
        deduplicate: true,
    });
    queue.extend(diagnostics);
    if queue.is_empty() {
        return 0;
    }
    let errors = queue.error_count();
    let warnings = queue.warning_count();
    let sorted = queue.flush();
    let truncated = queue.truncated();

    match options.diagnostics {
        DiagnosticFormat::Terminal => {
            let mut emitter = TerminalEmitter::with_color_mode(&mut writer, options.color, is_tty);
            emitter.emit_all(&sorted);
            emitter.emit_summary(errors, warnings);
            emitter.flush();
            if truncated > 0 {
                let _ = writeln!(
                    writer,
                    "note: {truncated} more error(s) not shown (--error-limit={})",
                    options.error_limit
                );
            }
        }
        DiagnosticFormat::Json => {
            let mut emitter = JsonEmitter::new(&mut writer);
            emitter.begin();
            emitter.emit_all(&sorted);
            emitter.end();
            emitter.flush();
        }
    }
    errors
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use xom_diagnostic::emitter::ColorMode;
    use xom_diagnostic::ErrorCode;

    use super::*;

    fn sample() -> Vec<Diagnostic> {
        vec![
            Diagnostic::error(ErrorCode::E1001)
                .with_message("unresolved type `Nowhere`")
                .with_label("Demo.Orphan", "base type not found"),
            Diagnostic::error(ErrorCode::E1005)
                .with_message("cyclic inheritance: `Demo.Loop` -> `Demo.Loop`")
                .with_label("Demo.Loop", "inherits from itself"),
        ]
    }

    fn render(diagnostics: Vec<Diagnostic>, options: &GenerateOptions) -> (usize, String) {
        let mut out = Vec::new();
        let errors = report(diagnostics, options, &mut out, false);
        (errors, String::from_utf8_lossy(&out).into_owned())
    }

    #[test]
    fn test_terminal_report_is_sorted() {
        let options = GenerateOptions {
            color: ColorMode::Never,
            ..GenerateOptions::default()
        };
        let (errors, text) = render(sample(), &options);
        assert_eq!(errors, 2);
        let lup = text.find("Demo.Loop").unwrap_or(usize::MAX);
        let orphan = text.find("Demo.Orphan").unwrap_or(usize::MAX);
        assert!(lup < orphan, "{text}");
        assert!(text.ends_with("error: aborting due to 2 previous errors\n"));
    }

    #[test]
    fn test_error_limit_note() {
        let options = GenerateOptions {
            color: ColorMode::Never,
            error_limit: 1,
            ..GenerateOptions::default()
        };
        let (errors, text) = render(sample(), &options);
        assert_eq!(errors, 2);
        assert!(text.contains("E1005"));
        assert!(!text.contains("E1001"));
        assert!(text.ends_with("note: 1 more error(s) not shown (--error-limit=1)\n"));
    }

    #[test]
    fn test_json_report() {
        let options = GenerateOptions {
            diagnostics: DiagnosticFormat::Json,
            ..GenerateOptions::default()
        };
        let (_, text) = render(sample(), &options);
        let value: serde_json::Value = match serde_json::from_str(&text) {
            Ok(value) => value,
            Err(err) => panic!("report is not JSON: {err}\n{text}"),
        };
        let codes: Vec<&str> = value
            .as_array()
            .map(|items| items.iter().filter_map(|d| d["code"].as_str()).collect())
            .unwrap_or_default();
        assert_eq!(codes, vec!["E1005", "E1001"]);
    }

    #[test]
    fn test_warnings_alone_do_not_count_as_errors() {
        let options = GenerateOptions {
            color: ColorMode::Never,
            ..GenerateOptions::default()
        };
        let warning = Diagnostic::warning(ErrorCode::E2006)
            .with_message("`force_include(interface)` on `Demo.Foo.Bar` has no effect")
            .with_label("Demo.Foo.Bar", "owning type is not included");
        let (errors, text) = render(vec![warning.clone()], &options);
        assert_eq!(errors, 0);
        assert!(text.starts_with("warning[E2006]"), "{text}");
        assert!(text.ends_with("warning: 1 warning emitted\n"));

        let mut diagnostics = sample();
        diagnostics.push(warning);
        let (errors, text) = render(diagnostics, &options);
        assert_eq!(errors, 2);
        assert!(text.ends_with("error: aborting due to 2 previous errors; 1 warning emitted\n"));
    }

    #[test]
    fn test_nothing_reported_without_diagnostics() {
        let (errors, text) = render(Vec::new(), &GenerateOptions::default());
        assert_eq!(errors, 0);
        assert_eq!(text, "");
    }
}
