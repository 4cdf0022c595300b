//! Diagnostic system for the xom generator.
//!
//! Every problem found while loading, analyzing or emitting declarations is
//! reported as a [`Diagnostic`]:
//! - an error code for searchability (`xomc explain E2002`),
//! - a message saying what went wrong,
//! - labels naming the offending declaration by its dotted path,
//! - notes and suggestions.
//!
//! Each [`ErrorCode`] maps to exactly one [`ErrorKind`] of the error taxonomy.
//! Diagnostics are accumulated rather than returned at the first failure; a
//! run that produced any error emits no artifacts.
//!
//! # Error Guarantees
//!
//! [`ErrorGuaranteed`] is proof that at least one error was recorded:
//!
//! ```text
//! if let Some(guar) = queue.has_errors() {
//!     return Err(guar);
//! }
//! ```

mod diagnostic;
pub mod emitter;
mod error_code;
pub mod errors;
mod guarantee;
pub mod queue;

pub use diagnostic::{Diagnostic, Label, Severity};
pub use error_code::{ErrorCode, ErrorKind};
pub use errors::ErrorDocs;
pub use guarantee::ErrorGuaranteed;
pub use queue::{DiagnosticConfig, DiagnosticQueue};
