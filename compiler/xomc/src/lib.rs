//! The xom object-model generator driver.
//!
//! ```text
//! paths ──► input::load ──► DeclarationTable
//!                               │  xom_sema::analyze
//!                               ▼
//!                           Analysis ──► xom_emit::emit_all ──► output::write_artifacts
//! ```
//!
//! Every stage runs to completion and contributes its diagnostics; any error
//! stops the run before artifacts are written. Warnings never stop a run and
//! are handed back with the result.

pub mod commands;
pub mod input;
pub mod options;
pub mod output;
pub mod report;

use std::path::PathBuf;
use std::sync::Once;

use xom_diagnostic::Diagnostic;
use xom_emit::{emit_all, EmitContext, EmitError};
use xom_ir::DeclarationTable;
use xom_sema::{analyze, Analysis};

pub use options::{parse_args, DiagnosticFormat, GenerateOptions, OptionsError};
pub use output::OutputError;

static TRACING_INIT: Once = Once::new();

/// Initialize tracing.
///
/// Nothing is installed unless `RUST_LOG` is set, e.g.
/// `RUST_LOG=xom_sema=debug`. With `XOMC_LOG_TREE` set the output is an
/// indented span tree instead of flat lines.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, prelude::*, EnvFilter};

        if std::env::var("RUST_LOG").is_err() {
            return;
        }
        let filter = EnvFilter::from_default_env();
        if std::env::var_os("XOMC_LOG_TREE").is_some() {
            let tree = tracing_tree::HierarchicalLayer::new(2)
                .with_targets(true)
                .with_bracketed_fields(true)
                .with_writer(std::io::stderr);
            let _ = tracing_subscriber::registry().with(tree).with(filter).try_init();
        } else {
            let _ = tracing_subscriber::registry()
                .with(
                    fmt::layer()
                        .with_writer(std::io::stderr)
                        .with_target(true)
                        .with_level(true),
                )
                .with(filter)
                .try_init();
        }
    });
}

/// A loaded and validated declaration set.
#[derive(Debug)]
pub struct Session {
    pub table: DeclarationTable,
    pub analysis: Analysis,
    pub files: Vec<PathBuf>,
    pub warnings: Vec<Diagnostic>,
}

/// Load and analyze `inputs`.
///
/// Returns every diagnostic when any of them is an error. Analysis is
/// skipped when a file could not be loaded at all, since its declarations
/// would show up as unresolved references.
pub fn analyze_inputs(
    inputs: &[PathBuf],
    options: &GenerateOptions,
) -> Result<Session, Vec<Diagnostic>> {
    let loaded = input::load(inputs, options.parallel);
    if loaded.failed_files > 0 {
        return Err(loaded.diagnostics);
    }

    let (analysis, analysis_diagnostics) = analyze(&loaded.table, &options.analysis());
    let mut diagnostics = loaded.diagnostics;
    diagnostics.extend(analysis_diagnostics);
    if diagnostics.iter().any(Diagnostic::is_error) {
        return Err(diagnostics);
    }

    Ok(Session {
        table: loaded.table,
        analysis,
        files: loaded.files,
        warnings: diagnostics,
    })
}

/// A failed `generate` run. No artifact was written.
#[derive(Debug, thiserror::Error)]
pub enum GenerateError {
    #[error("{} error(s) found in the declarations", .0.iter().filter(|d| d.is_error()).count())]
    Invalid(Vec<Diagnostic>),
    #[error(transparent)]
    Emit(#[from] EmitError),
    #[error(transparent)]
    Output(#[from] OutputError),
}

/// Summary of a successful run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Generated {
    pub files: usize,
    pub types: usize,
    /// Written artifact paths in emission order.
    pub artifacts: Vec<PathBuf>,
    pub warnings: Vec<Diagnostic>,
}

/// Run the whole pipeline and write the three artifacts to `options.out_dir`.
#[tracing::instrument(level = "info", skip_all, fields(out = %options.out_dir.display(), format = %options.format))]
pub fn generate(inputs: &[PathBuf], options: &GenerateOptions) -> Result<Generated, GenerateError> {
    let session = analyze_inputs(inputs, options).map_err(GenerateError::Invalid)?;
    let cx = EmitContext::new(&session.table, &session.analysis);
    let rendered = emit_all(&cx, options.format, options.parallel)?;
    let artifacts = output::write_artifacts(&options.out_dir, &rendered)?;
    tracing::info!(types = session.table.type_count(), "artifacts generated");
    Ok(Generated {
        files: session.files.len(),
        types: session.table.type_count(),
        artifacts,
        warnings: session.warnings,
    })
}

/// Render the resolved type graph of a validated session.
///
/// One line per type in output order, followed by its edges.
pub fn render_graph(session: &Session) -> String {
    let table = &session.table;
    let graph = &session.analysis.graph;
    let cx = EmitContext::new(table, &session.analysis);
    let mut out = xom_emit::TextWriter::new();

    for id in cx.types_in_order() {
        let node = graph.node(xom_sema::TypeId::from_decl(id));
        out.line(&format!("{} {}", node.kind, table.qualified_name(id)));
        out.indent();
        if let Some(base) = node.base {
            out.line(&format!("base {}", table.qualified_name(base.decl())));
        }
        if let Some(core) = node.core_base {
            out.line(&format!("core_base {}", table.qualified_name(core.decl())));
        }
        for iface in &node.interfaces {
            out.line(&format!("implements {}", graph.display(*iface, table)));
        }
        for conflict in graph.conflicts_for(xom_sema::TypeId::from_decl(id)) {
            let interfaces: Vec<String> = conflict
                .interfaces
                .iter()
                .map(|i| table.qualified_name(i.decl()))
                .collect();
            out.line(&format!(
                "conflict {} in {}",
                table.name(conflict.name),
                interfaces.join(", ")
            ));
        }
        out.dedent();
    }
    out.take_output()
}
