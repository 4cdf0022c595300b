//! Diagnostic queue for collecting, deduplicating, and sorting diagnostics.
//!
//! Features:
//! - Exact-duplicate suppression
//! - Deterministic ordering independent of the order stages report in
//! - Error limit applied after sorting, so the shown subset is stable
//! - `ErrorGuaranteed` proof that errors were recorded
//! - Warnings pass through the error limit and never count as errors

use rustc_hash::FxHashSet;

use crate::{Diagnostic, ErrorGuaranteed};

/// Configuration for diagnostic processing.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct DiagnosticConfig {
    /// Maximum number of errors reported by [`DiagnosticQueue::flush`]
    /// (0 = unlimited).
    pub error_limit: usize,
    /// Drop diagnostics identical to one already queued.
    pub deduplicate: bool,
}

impl Default for DiagnosticConfig {
    fn default() -> Self {
        DiagnosticConfig {
            error_limit: 0,
            deduplicate: true,
        }
    }
}

/// Queue for collecting, deduplicating, and sorting diagnostics.
///
/// # Example
///
/// ```text
/// let mut queue = DiagnosticQueue::new();
/// queue.extend(graph_diagnostics);
/// queue.extend(resolver_diagnostics);
/// let sorted = queue.flush();
/// ```
#[derive(Clone, Debug, Default)]
pub struct DiagnosticQueue {
    diagnostics: Vec<Diagnostic>,
    seen: FxHashSet<Diagnostic>,
    error_count: usize,
    warning_count: usize,
    /// Errors dropped by the last flush because of the error limit.
    truncated: usize,
    config: DiagnosticConfig,
}

impl DiagnosticQueue {
    /// Create a new diagnostic queue with default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a diagnostic queue with custom configuration.
    pub fn with_config(config: DiagnosticConfig) -> Self {
        DiagnosticQueue {
            config,
            ..Self::default()
        }
    }

    /// Add a diagnostic.
    ///
    /// Returns `true` if the diagnostic was added, `false` if it duplicated
    /// one already queued.
    pub fn add(&mut self, diag: Diagnostic) -> bool {
        if self.config.deduplicate && !self.seen.insert(diag.clone()) {
            return false;
        }
        if diag.is_error() {
            self.error_count += 1;
        } else {
            self.warning_count += 1;
        }
        self.diagnostics.push(diag);
        true
    }

    /// Number of errors collected.
    pub fn error_count(&self) -> usize {
        self.error_count
    }

    /// Number of warnings collected.
    pub fn warning_count(&self) -> usize {
        self.warning_count
    }

    /// Whether nothing has been queued since the last flush.
    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }

    /// Check if any errors were recorded and get proof if so.
    pub fn has_errors(&self) -> Option<ErrorGuaranteed> {
        ErrorGuaranteed::from_error_count(self.error_count)
    }

    /// Errors left out of the last [`Self::flush`] by the error limit.
    pub fn truncated(&self) -> usize {
        self.truncated
    }

    /// Sort diagnostics and return them, applying the error limit.
    ///
    /// Ordering is by offending declaration path, then error code, then
    /// message, so the result is identical however the stages interleaved.
    /// Clears the queue.
    pub fn flush(&mut self) -> Vec<Diagnostic> {
        let mut result = std::mem::take(&mut self.diagnostics);
        result.sort_by(|a, b| {
            (a.primary_decl(), a.code, &a.message).cmp(&(b.primary_decl(), b.code, &b.message))
        });

        self.truncated = 0;
        if self.config.error_limit > 0 {
            let mut errors = 0;
            result.retain(|diag| {
                if !diag.is_error() {
                    return true;
                }
                errors += 1;
                errors <= self.config.error_limit
            });
            self.truncated = errors.saturating_sub(self.config.error_limit);
        }

        self.error_count = 0;
        self.warning_count = 0;
        self.seen.clear();
        result
    }
}

impl Extend<Diagnostic> for DiagnosticQueue {
    fn extend<I: IntoIterator<Item = Diagnostic>>(&mut self, iter: I) {
        for diag in iter {
            self.add(diag);
        }
    }
}

#[cfg(test)]
mod tests;
