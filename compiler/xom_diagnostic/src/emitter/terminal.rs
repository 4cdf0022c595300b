//! Terminal Emitter
//!
//! Human-readable diagnostic output with optional ANSI color support.

use std::io::{self, Write};

use crate::{Diagnostic, Severity};

use super::DiagnosticEmitter;

/// ANSI color codes for terminal output.
mod colors {
    pub const ERROR: &str = "\x1b[1;31m"; // Bold red
    pub const WARNING: &str = "\x1b[1;33m"; // Bold yellow
    pub const HELP: &str = "\x1b[1;32m"; // Bold green
    pub const BOLD: &str = "\x1b[1m";
    pub const SECONDARY: &str = "\x1b[1;34m"; // Bold blue
    pub const RESET: &str = "\x1b[0m";
}

/// Returns "s" for plural counts, "" for singular.
#[inline]
fn plural_s(count: usize) -> &'static str {
    if count == 1 {
        ""
    } else {
        "s"
    }
}

/// Color output mode for terminal emitter.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ColorMode {
    /// Use colors when the output is a terminal.
    #[default]
    Auto,
    Always,
    Never,
}

impl ColorMode {
    /// Resolve to a boolean. `is_tty` only matters for `Auto`.
    pub fn should_use_colors(self, is_tty: bool) -> bool {
        match self {
            ColorMode::Auto => is_tty,
            ColorMode::Always => true,
            ColorMode::Never => false,
        }
    }
}

impl std::str::FromStr for ColorMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "auto" => Ok(ColorMode::Auto),
            "always" => Ok(ColorMode::Always),
            "never" => Ok(ColorMode::Never),
            other => Err(format!(
                "unknown color mode `{other}` (expected auto, always or never)"
            )),
        }
    }
}

/// Terminal emitter with optional color support.
pub struct TerminalEmitter<W: Write> {
    writer: W,
    colors: bool,
}

impl<W: Write> TerminalEmitter<W> {
    /// Create a new terminal emitter.
    ///
    /// `is_tty` is whether `writer` is a terminal, used for `ColorMode::Auto`.
    pub fn with_color_mode(writer: W, mode: ColorMode, is_tty: bool) -> Self {
        TerminalEmitter {
            writer,
            colors: mode.should_use_colors(is_tty),
        }
    }

    /// Create a terminal emitter for stderr.
    pub fn stderr(mode: ColorMode, is_tty: bool) -> TerminalEmitter<io::Stderr> {
        TerminalEmitter {
            writer: io::stderr(),
            colors: mode.should_use_colors(is_tty),
        }
    }

    fn write_colored(&mut self, text: &str, color: &str) {
        if self.colors {
            let _ = write!(self.writer, "{color}{text}{}", colors::RESET);
        } else {
            let _ = write!(self.writer, "{text}");
        }
    }

    fn write_severity(&mut self, severity: Severity) {
        let color = match severity {
            Severity::Error => colors::ERROR,
            Severity::Warning => colors::WARNING,
        };
        self.write_colored(severity.as_str(), color);
    }

    fn write_bold(&mut self, text: &str) {
        self.write_colored(text, colors::BOLD);
    }
}

impl<W: Write> DiagnosticEmitter for TerminalEmitter<W> {
    fn emit(&mut self, diagnostic: &Diagnostic) {
        // Header: severity[CODE]: message
        self.write_severity(diagnostic.severity);
        self.write_bold(&format!("[{}]", diagnostic.code));
        let _ = writeln!(self.writer, ": {}", diagnostic.message);

        for label in &diagnostic.labels {
            let marker = if label.is_primary { "-->" } else { "   " };
            let _ = write!(self.writer, "  {marker} ");
            self.write_bold(&label.decl);
            if let Some(file) = &label.file {
                let _ = write!(self.writer, " ({file})");
            }
            let _ = write!(self.writer, ": ");
            let color = if label.is_primary {
                colors::ERROR
            } else {
                colors::SECONDARY
            };
            self.write_colored(&label.message, color);
            let _ = writeln!(self.writer);
        }

        let _ = writeln!(self.writer, "   = kind: {}", diagnostic.kind());

        for note in &diagnostic.notes {
            let _ = write!(self.writer, "   = ");
            self.write_bold("note");
            let _ = writeln!(self.writer, ": {note}");
        }

        for suggestion in &diagnostic.suggestions {
            let _ = write!(self.writer, "   = ");
            self.write_colored("help", colors::HELP);
            let _ = writeln!(self.writer, ": {suggestion}");
        }

        let _ = writeln!(self.writer);
    }

    fn flush(&mut self) {
        let _ = self.writer.flush();
    }

    fn emit_summary(&mut self, error_count: usize, warning_count: usize) {
        if error_count > 0 {
            self.write_colored("error", colors::ERROR);
            let error_part = if error_count == 1 {
                "previous error".to_string()
            } else {
                format!("{error_count} previous errors")
            };
            if warning_count > 0 {
                let _ = writeln!(
                    self.writer,
                    ": aborting due to {error_part}; {warning_count} warning{} emitted",
                    plural_s(warning_count)
                );
            } else {
                let _ = writeln!(self.writer, ": aborting due to {error_part}");
            }
        } else if warning_count > 0 {
            self.write_colored("warning", colors::WARNING);
            let _ = writeln!(
                self.writer,
                ": {warning_count} warning{} emitted",
                plural_s(warning_count)
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::ErrorCode;

    fn sample_diagnostic() -> Diagnostic {
        Diagnostic::error(ErrorCode::E2002)
            .with_message("storage `bool` does not match declared type `Double`")
            .with_label("Controls.RangeBase.Value", "declared as `Double`")
            .with_secondary_label("Controls.RangeBase", "owning type")
            .with_note("`bool` storage requires `Boolean`")
            .with_suggestion("use `double` storage")
    }

    fn render(diag: &Diagnostic, mode: ColorMode) -> String {
        let mut output = Vec::new();
        let mut emitter = TerminalEmitter::with_color_mode(&mut output, mode, false);
        emitter.emit(diag);
        emitter.flush();
        String::from_utf8_lossy(&output).into_owned()
    }

    #[test]
    fn test_terminal_emitter_no_color() {
        let text = render(&sample_diagnostic(), ColorMode::Never);
        assert_eq!(
            text,
            "error[E2002]: storage `bool` does not match declared type `Double`\n\
             \x20 --> Controls.RangeBase.Value: declared as `Double`\n\
             \x20     Controls.RangeBase: owning type\n\
             \x20  = kind: ConflictingAnnotations\n\
             \x20  = note: `bool` storage requires `Boolean`\n\
             \x20  = help: use `double` storage\n\n"
        );
    }

    #[test]
    fn test_terminal_emitter_with_color() {
        let text = render(&sample_diagnostic(), ColorMode::Always);
        assert!(text.contains("\x1b["));
        assert!(text.contains("E2002"));
    }

    #[test]
    fn test_auto_mode_follows_tty() {
        assert!(ColorMode::Auto.should_use_colors(true));
        assert!(!ColorMode::Auto.should_use_colors(false));
        assert_eq!("never".parse::<ColorMode>(), Ok(ColorMode::Never));
        assert!("sometimes".parse::<ColorMode>().is_err());
    }

    #[test]
    fn test_summary() {
        let mut output = Vec::new();
        let mut emitter = TerminalEmitter::with_color_mode(&mut output, ColorMode::Never, false);
        emitter.emit_summary(3, 1);
        emitter.emit_summary(0, 0);
        emitter.emit_summary(1, 0);
        emitter.flush();
        assert_eq!(
            String::from_utf8_lossy(&output),
            "error: aborting due to 3 previous errors; 1 warning emitted\n\
             error: aborting due to previous error\n"
        );
    }

    #[test]
    fn test_warning_rendering() {
        let warning = Diagnostic::warning(ErrorCode::E2006)
            .with_message("`force_include(interface)` on `UI.Foo.Bar` has no effect")
            .with_label("UI.Foo.Bar", "owning type is not included");
        let text = render(&warning, ColorMode::Never);
        assert!(text.starts_with("warning[E2006]: `force_include(interface)`"));

        let mut output = Vec::new();
        let mut emitter = TerminalEmitter::with_color_mode(&mut output, ColorMode::Never, false);
        emitter.emit_summary(0, 2);
        assert_eq!(String::from_utf8_lossy(&output), "warning: 2 warnings emitted\n");
    }
}
