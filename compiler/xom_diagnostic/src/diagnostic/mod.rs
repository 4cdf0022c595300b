//! Core diagnostic types for structured error reporting.
//!
//! Defines [`Diagnostic`], [`Label`] and [`Severity`], the building blocks
//! every stage uses to report problems with declarations.

use std::fmt;

use crate::{ErrorCode, ErrorKind};

/// Severity level for diagnostics.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug)]
pub enum Severity {
    Error,
    Warning,
}

impl Severity {
    pub fn as_str(self) -> &'static str {
        match self {
            Severity::Error => "error",
            Severity::Warning => "warning",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Points at a declaration with a message.
///
/// Declarations are addressed by their dotted path
/// (`Namespace.Type` or `Namespace.Type.Member`). Input files carry no
/// positions once parsed, so the path is the location.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct Label {
    /// Dotted path of the declaration.
    pub decl: String,
    /// Declaration file the declaration came from, when known.
    pub file: Option<String>,
    pub message: String,
    /// Whether this is the primary error location.
    pub is_primary: bool,
}

impl Label {
    /// Create a primary label (the offending declaration).
    pub fn primary(decl: impl Into<String>, message: impl Into<String>) -> Self {
        Label {
            decl: decl.into(),
            file: None,
            message: message.into(),
            is_primary: true,
        }
    }

    /// Create a secondary label (related declaration).
    pub fn secondary(decl: impl Into<String>, message: impl Into<String>) -> Self {
        Label {
            decl: decl.into(),
            file: None,
            message: message.into(),
            is_primary: false,
        }
    }

    /// Attach the declaration file.
    #[must_use]
    pub fn in_file(mut self, file: impl Into<String>) -> Self {
        self.file = Some(file.into());
        self
    }
}

/// A diagnostic with everything needed to report it.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
#[must_use = "diagnostics should be reported or returned, not silently dropped"]
pub struct Diagnostic {
    /// Error code for searchability.
    pub code: ErrorCode,
    pub severity: Severity,
    /// Main error message.
    pub message: String,
    /// Declarations involved, primary first.
    pub labels: Vec<Label>,
    /// Additional notes providing context.
    pub notes: Vec<String>,
    /// Human-readable suggestions for fixing the error.
    pub suggestions: Vec<String>,
}

impl Diagnostic {
    fn new_with_severity(code: ErrorCode, severity: Severity) -> Self {
        Diagnostic {
            code,
            severity,
            message: String::new(),
            labels: Vec::new(),
            notes: Vec::new(),
            suggestions: Vec::new(),
        }
    }

    /// Create a new error diagnostic.
    #[cold]
    pub fn error(code: ErrorCode) -> Self {
        Self::new_with_severity(code, Severity::Error)
    }

    /// Create a new warning diagnostic.
    #[cold]
    pub fn warning(code: ErrorCode) -> Self {
        Self::new_with_severity(code, Severity::Warning)
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    /// Add a primary label at the offending declaration.
    pub fn with_label(mut self, decl: impl Into<String>, message: impl Into<String>) -> Self {
        self.labels.push(Label::primary(decl, message));
        self
    }

    /// Add a secondary label for a related declaration.
    pub fn with_secondary_label(
        mut self,
        decl: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        self.labels.push(Label::secondary(decl, message));
        self
    }

    /// Add a prepared label.
    pub fn with_full_label(mut self, label: Label) -> Self {
        self.labels.push(label);
        self
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.notes.push(note.into());
        self
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestions.push(suggestion.into());
        self
    }

    /// The taxonomy kind of this diagnostic's code.
    pub fn kind(&self) -> ErrorKind {
        self.code.kind()
    }

    /// Path of the first primary label's declaration.
    pub fn primary_decl(&self) -> Option<&str> {
        self.labels
            .iter()
            .find(|l| l.is_primary)
            .map(|l| l.decl.as_str())
    }

    /// Check if this is an error (vs warning/note).
    pub fn is_error(&self) -> bool {
        matches!(self.severity, Severity::Error)
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}]: {}", self.severity, self.code, self.message)?;

        for label in &self.labels {
            let marker = if label.is_primary { "-->" } else { "   " };
            match &label.file {
                Some(file) => write!(
                    f,
                    "\n  {marker} {} ({file}): {}",
                    label.decl, label.message
                )?,
                None => write!(f, "\n  {marker} {}: {}", label.decl, label.message)?,
            }
        }

        for note in &self.notes {
            write!(f, "\n  = note: {note}")?;
        }

        for suggestion in &self.suggestions {
            write!(f, "\n  = help: {suggestion}")?;
        }

        Ok(())
    }
}
