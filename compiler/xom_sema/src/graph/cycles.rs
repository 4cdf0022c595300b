//! Inheritance cycle detection.
//!
//! Every type has at most one base edge per layer, so each layer is a
//! functional graph and a single walk per unvisited node finds every cycle.
//! The walk is iterative; base chains in real object models run deep.

use xom_diagnostic::{Diagnostic, ErrorCode};
use xom_ir::DeclarationTable;

use super::{TypeGraph, TypeGraphNode, TypeId};
use crate::site::Site;

#[derive(Copy, Clone, Eq, PartialEq)]
enum Mark {
    New,
    OnPath,
    Done,
}

#[derive(Copy, Clone)]
enum Layer {
    Framework,
    Core,
}

impl Layer {
    fn as_str(self) -> &'static str {
        match self {
            Layer::Framework => "framework",
            Layer::Core => "core",
        }
    }

    fn edge(self, node: &TypeGraphNode) -> Option<TypeId> {
        match self {
            Layer::Framework => node.base,
            Layer::Core => node.core_layer_base(),
        }
    }
}

/// Find the cycles of both layers, each reported once.
pub(super) fn detect(
    graph: &TypeGraph,
    table: &DeclarationTable,
) -> (Vec<Vec<TypeId>>, Vec<Diagnostic>) {
    let mut cycles: Vec<Vec<TypeId>> = Vec::new();
    let mut diagnostics = Vec::new();

    for layer in [Layer::Framework, Layer::Core] {
        for cycle in cycles_in(graph, layer) {
            if cycles.contains(&cycle) {
                continue;
            }
            diagnostics.push(cycle_diagnostic(&cycle, layer, table));
            cycles.push(cycle);
        }
    }

    (cycles, diagnostics)
}

fn cycles_in(graph: &TypeGraph, layer: Layer) -> Vec<Vec<TypeId>> {
    let count = graph.nodes.len();
    let mut marks = vec![Mark::New; count];
    let mut cycles = Vec::new();
    let mut path: Vec<TypeId> = Vec::new();

    for (start, _) in graph.nodes() {
        if marks[start.index()] != Mark::New {
            continue;
        }
        path.clear();
        let mut current = Some(start);
        while let Some(id) = current {
            match marks[id.index()] {
                Mark::New => {
                    marks[id.index()] = Mark::OnPath;
                    path.push(id);
                    current = layer.edge(graph.node(id));
                }
                Mark::OnPath => {
                    if let Some(pos) = path.iter().position(|p| *p == id) {
                        cycles.push(canonical(&path[pos..]));
                    }
                    break;
                }
                Mark::Done => break,
            }
        }
        for id in &path {
            marks[id.index()] = Mark::Done;
        }
    }

    cycles
}

/// Rotate a cycle to start at its smallest node.
fn canonical(cycle: &[TypeId]) -> Vec<TypeId> {
    let start = cycle
        .iter()
        .enumerate()
        .min_by_key(|(_, id)| **id)
        .map_or(0, |(i, _)| i);
    cycle[start..].iter().chain(&cycle[..start]).copied().collect()
}

fn cycle_diagnostic(cycle: &[TypeId], layer: Layer, table: &DeclarationTable) -> Diagnostic {
    let names: Vec<String> = cycle
        .iter()
        .map(|id| table.qualified_name(id.decl()))
        .collect();
    let chain = names
        .iter()
        .chain(names.first())
        .map(|n| format!("`{n}`"))
        .collect::<Vec<_>>()
        .join(" -> ");

    let mut diagnostic = Diagnostic::error(ErrorCode::E1005)
        .with_message(format!("cyclic inheritance: {chain}"))
        .with_note(format!("the cycle is in the {} layer", layer.as_str()));
    for (i, id) in cycle.iter().enumerate() {
        let next = &names[(i + 1) % names.len()];
        let site = Site::Type(id.decl());
        let label = if i == 0 {
            site.label(table, format!("inherits from `{next}`"))
        } else {
            site.secondary_label(table, format!("inherits from `{next}`"))
        };
        diagnostic = diagnostic.with_full_label(label);
    }
    diagnostic
}
