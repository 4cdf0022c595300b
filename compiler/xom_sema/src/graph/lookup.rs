//! Fully-qualified name lookup, built once before any reference is resolved.

use rustc_hash::FxHashMap;
use xom_ir::DeclarationTable;

use super::TypeId;

/// Immutable map from fully-qualified type name to its node.
///
/// When two declarations share a fully-qualified name the first one in
/// table order is registered; the collision itself is an identity error.
#[derive(Clone, Debug, Default)]
pub struct NameLookup {
    by_fqn: FxHashMap<Box<str>, TypeId>,
}

impl NameLookup {
    pub(crate) fn register(table: &DeclarationTable) -> Self {
        let mut by_fqn = FxHashMap::default();
        by_fqn.reserve(table.type_count());
        for (id, _) in table.types() {
            by_fqn
                .entry(table.qualified_name(id).into_boxed_str())
                .or_insert(TypeId::from_decl(id));
        }
        NameLookup { by_fqn }
    }

    /// Exact fully-qualified lookup.
    pub fn get(&self, fqn: &str) -> Option<TypeId> {
        self.by_fqn.get(fqn).copied()
    }

    /// Resolve `path` as written inside `namespace`.
    ///
    /// Tries `namespace.path`, then each enclosing namespace, then `path`
    /// as a fully-qualified name.
    pub fn resolve_in(&self, path: &str, namespace: &str) -> Option<TypeId> {
        let mut scope = namespace;
        while !scope.is_empty() {
            if let Some(id) = self.get(&format!("{scope}.{path}")) {
                return Some(id);
            }
            scope = scope.rsplit_once('.').map_or("", |(outer, _)| outer);
        }
        self.get(path)
    }

    pub fn len(&self) -> usize {
        self.by_fqn.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_fqn.is_empty()
    }
}
