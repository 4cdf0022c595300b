//! Semantic analysis for the xom object-model generator.
//!
//! ```text
//! DeclarationTable
//!     │  graph::build_graph
//!     ▼
//! TypeGraph ──┬── resolve::resolve_shapes ──► Shapes  ─┐
//!             └── gate::build_gates ────────► Gates   ─┤  (rayon::join)
//!                                                      ▼
//!                      identity::register_identities ──► IdentityTable
//! ```
//!
//! Every stage reads the immutable table and reports problems as
//! diagnostics instead of stopping; [`analyze`] returns the full set so a
//! single run shows every error.

pub mod gate;
pub mod graph;
pub mod identity;
pub mod resolve;
mod site;

#[cfg(test)]
mod test_support;

use rayon::prelude::*;
use xom_diagnostic::Diagnostic;
use xom_ir::DeclarationTable;

pub use gate::{GateEntry, GateShape, GateTable, Gates, PlatformKey, TypeVersion, VersionRange};
pub use graph::{
    build_graph, GenericHead, MemberConflict, ResolvedType, TypeGraph, TypeGraphNode, TypeHead, TypeId,
};
pub use identity::{IdentityTable, IdentityViolation};
pub use resolve::{ResolvedShape, Shapes};

/// Contract declarations without `platform` annotations ship in.
pub const DEFAULT_CONTRACT: &str = "Xom.Foundation.UniversalApiContract";

/// Analysis configuration.
#[derive(Clone, Debug)]
pub struct AnalysisOptions {
    pub default_contract: String,
    /// Resolve and gate declarations on the rayon pool.
    pub parallel: bool,
}

impl Default for AnalysisOptions {
    fn default() -> Self {
        AnalysisOptions {
            default_contract: DEFAULT_CONTRACT.to_owned(),
            parallel: true,
        }
    }
}

/// Everything the emitters consume.
#[derive(Clone, Debug, Default)]
pub struct Analysis {
    pub graph: TypeGraph,
    pub shapes: Shapes,
    pub gates: Gates,
    pub identities: IdentityTable,
}

/// Run every analysis stage over `table`.
///
/// Diagnostics come back grouped by stage (graph, annotations, versions,
/// identity) and in declaration order within a stage.
#[tracing::instrument(level = "debug", skip_all, fields(types = table.type_count()))]
pub fn analyze(table: &DeclarationTable, options: &AnalysisOptions) -> (Analysis, Vec<Diagnostic>) {
    let (graph, mut diagnostics) = build_graph(table);

    let resolve = || resolve::resolve_shapes(table, &graph, options.parallel);
    let gate = || gate::build_gates(table, &options.default_contract, options.parallel);
    let ((shapes, shape_diagnostics), (gates, gate_diagnostics)) = if options.parallel {
        rayon::join(resolve, gate)
    } else {
        (resolve(), gate())
    };
    diagnostics.extend(shape_diagnostics);
    diagnostics.extend(gate_diagnostics);

    let (identities, violations) = identity::register_identities(table, &shapes);
    diagnostics.extend(identity::identity_diagnostic(&violations, table));

    tracing::debug!(errors = diagnostics.len(), "analysis finished");
    (
        Analysis {
            graph,
            shapes,
            gates,
            identities,
        },
        diagnostics,
    )
}

/// Map `f` over `items`, on the rayon pool when `parallel` is set.
/// Results keep the order of `items`.
pub(crate) fn par_map<T, R, F>(items: &[T], parallel: bool, f: F) -> Vec<R>
where
    T: Sync,
    R: Send,
    F: Fn(&T) -> R + Sync + Send,
{
    if parallel && items.len() > 1 {
        items.par_iter().map(f).collect()
    } else {
        items.iter().map(f).collect()
    }
}
