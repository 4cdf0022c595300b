//! JSON Emitter
//!
//! Machine-readable diagnostic output: one JSON array of diagnostic objects,
//! written when the array is closed.

use std::io::Write;

use serde::Serialize;

use crate::{Diagnostic, Label};

use super::DiagnosticEmitter;

#[derive(Serialize)]
struct JsonLabel<'a> {
    decl: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    file: Option<&'a str>,
    message: &'a str,
    primary: bool,
}

impl<'a> From<&'a Label> for JsonLabel<'a> {
    fn from(label: &'a Label) -> Self {
        JsonLabel {
            decl: &label.decl,
            file: label.file.as_deref(),
            message: &label.message,
            primary: label.is_primary,
        }
    }
}

#[derive(Serialize)]
struct JsonDiagnostic<'a> {
    code: String,
    kind: String,
    severity: &'static str,
    message: &'a str,
    labels: Vec<JsonLabel<'a>>,
    notes: &'a [String],
    suggestions: &'a [String],
}

impl<'a> From<&'a Diagnostic> for JsonDiagnostic<'a> {
    fn from(diagnostic: &'a Diagnostic) -> Self {
        JsonDiagnostic {
            code: diagnostic.code.to_string(),
            kind: diagnostic.kind().to_string(),
            severity: diagnostic.severity.as_str(),
            message: &diagnostic.message,
            labels: diagnostic.labels.iter().map(JsonLabel::from).collect(),
            notes: &diagnostic.notes,
            suggestions: &diagnostic.suggestions,
        }
    }
}

/// JSON emitter for machine-readable output.
///
/// Diagnostics are buffered between [`JsonEmitter::begin`] and
/// [`JsonEmitter::end`]; `end` writes the whole array.
pub struct JsonEmitter<W: Write> {
    writer: W,
    pending: Vec<Diagnostic>,
}

impl<W: Write> JsonEmitter<W> {
    pub fn new(writer: W) -> Self {
        JsonEmitter {
            writer,
            pending: Vec::new(),
        }
    }

    /// Begin the JSON array output.
    pub fn begin(&mut self) {
        self.pending.clear();
    }

    /// End the JSON array output.
    pub fn end(&mut self) {
        let records: Vec<JsonDiagnostic<'_>> =
            self.pending.iter().map(JsonDiagnostic::from).collect();
        if serde_json::to_writer_pretty(&mut self.writer, &records).is_ok() {
            let _ = writeln!(self.writer);
        }
        self.pending.clear();
    }
}

impl<W: Write> DiagnosticEmitter for JsonEmitter<W> {
    fn emit(&mut self, diagnostic: &Diagnostic) {
        self.pending.push(diagnostic.clone());
    }

    fn flush(&mut self) {
        let _ = self.writer.flush();
    }

    fn emit_summary(&mut self, _error_count: usize, _warning_count: usize) {
        // The array itself is the summary.
    }
}
