//! Diamond interface member conflicts.

use std::collections::BTreeSet;

use rustc_hash::FxHashMap;
use xom_ir::{DeclarationTable, Name, TypeKind};

use super::{GenericHead, TypeGraph, TypeHead, TypeId};

/// Two or more distinct interfaces reachable from `ty` declare a member
/// named `name`. The emitters decide how to name them explicitly.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct MemberConflict {
    pub ty: TypeId,
    pub name: Name,
    /// The declaring interfaces, in table order.
    pub interfaces: Vec<TypeId>,
}

pub(super) fn collect(graph: &TypeGraph, table: &DeclarationTable) -> Vec<MemberConflict> {
    let mut conflicts = Vec::new();
    for (id, node) in graph.nodes() {
        if !matches!(node.kind, TypeKind::Class | TypeKind::Interface) {
            continue;
        }
        let reachable = interface_closure(graph, id);
        if reachable.len() < 2 {
            continue;
        }

        let mut declared_in: FxHashMap<Name, Vec<TypeId>> = FxHashMap::default();
        for iface in &reachable {
            for member in &table.ty(iface.decl()).members {
                let entry = declared_in.entry(table.member(*member).name).or_default();
                if entry.last() != Some(iface) {
                    entry.push(*iface);
                }
            }
        }

        let mut found: Vec<MemberConflict> = declared_in
            .into_iter()
            .filter(|(_, interfaces)| interfaces.len() > 1)
            .map(|(name, interfaces)| MemberConflict {
                ty: id,
                name,
                interfaces,
            })
            .collect();
        found.sort_by(|a, b| table.name(a.name).cmp(table.name(b.name)));
        conflicts.extend(found);
    }
    conflicts
}

/// Declared interfaces reachable from `id` through interface edges,
/// excluding `id` itself. Ordered by node index.
fn interface_closure(graph: &TypeGraph, id: TypeId) -> BTreeSet<TypeId> {
    let mut reachable = BTreeSet::new();
    let mut stack: Vec<TypeId> = declared_interfaces(graph, id).collect();
    while let Some(iface) = stack.pop() {
        if iface == id || !reachable.insert(iface) {
            continue;
        }
        stack.extend(declared_interfaces(graph, iface));
    }
    reachable
}

fn declared_interfaces(graph: &TypeGraph, id: TypeId) -> impl Iterator<Item = TypeId> + '_ {
    graph
        .node(id)
        .interfaces
        .iter()
        .filter_map(|iface| match iface.head {
            TypeHead::Declared(target) => Some(target),
            TypeHead::Instance(inst) => match graph.instantiation(inst).generic {
                GenericHead::Declared(target) => Some(target),
                GenericHead::Builtin(_) => None,
            },
            TypeHead::Primitive(_) | TypeHead::Param { .. } | TypeHead::Error => None,
        })
}
