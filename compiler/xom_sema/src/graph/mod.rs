//! Type Graph Builder.
//!
//! Turns the flat declaration table into a graph with resolved edges:
//!
//! ```text
//! DeclarationTable
//!     │  NameLookup::register      (phase 1: every FQN, immutable afterwards)
//!     ▼
//! resolve base / core_base / interfaces / member types   (phase 2)
//!     │
//!     ├── cycle detection per layer (framework, core)
//!     ├── content property check
//!     └── diamond member conflicts
//!     ▼
//! TypeGraph
//! ```
//!
//! Unresolved references become [`TypeHead::Error`] so the later stages keep
//! running and report their own problems in the same run.

mod conflicts;
mod cycles;
mod lookup;
mod primitive;

use std::fmt;

use rustc_hash::{FxHashMap, FxHashSet};
use smallvec::SmallVec;
use xom_diagnostic::{Diagnostic, ErrorCode};
use xom_ir::{
    Annotation, DeclId, DeclarationTable, MemberId, MemberKind, Name, TypeDeclaration, TypeKind,
    TypeRef,
};

use crate::site::Site;

pub use conflicts::MemberConflict;
pub use lookup::NameLookup;
pub use primitive::{BuiltinGeneric, Primitive};

/// Node index in the type graph; one node per type declaration.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[repr(transparent)]
pub struct TypeId(u32);

impl TypeId {
    #[inline]
    pub const fn from_decl(decl: DeclId) -> Self {
        TypeId(decl.raw())
    }

    #[inline]
    pub const fn decl(self) -> DeclId {
        DeclId::from_raw(self.0)
    }

    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Debug for TypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TypeId({})", self.0)
    }
}

/// Index of an interned generic instantiation.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug)]
#[repr(transparent)]
pub struct InstId(u32);

impl InstId {
    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

/// What a type reference resolved to, ignoring nullability.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum TypeHead {
    Primitive(Primitive),
    Declared(TypeId),
    /// Generic parameter `index` of `owner`.
    Param { owner: TypeId, index: u16 },
    Instance(InstId),
    /// Placeholder for a reference that failed to resolve.
    Error,
}

/// A resolved type reference.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct ResolvedType {
    pub head: TypeHead,
    pub nullable: bool,
}

impl ResolvedType {
    pub const ERROR: ResolvedType = ResolvedType {
        head: TypeHead::Error,
        nullable: false,
    };

    pub const fn new(head: TypeHead) -> Self {
        ResolvedType {
            head,
            nullable: false,
        }
    }

    pub fn is_error(self) -> bool {
        self.head == TypeHead::Error
    }

    /// The declared type, if this is a non-generic declared type.
    pub fn declared(self) -> Option<TypeId> {
        match self.head {
            TypeHead::Declared(id) => Some(id),
            _ => None,
        }
    }
}

/// The generic definition of an instantiation.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum GenericHead {
    Builtin(BuiltinGeneric),
    Declared(TypeId),
}

/// A generic type applied to resolved arguments. Interned per graph.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct Instantiation {
    pub generic: GenericHead,
    pub args: SmallVec<[ResolvedType; 2]>,
}

/// Resolved edges of one type declaration.
#[derive(Clone, Debug)]
pub struct TypeGraphNode {
    pub decl: DeclId,
    pub kind: TypeKind,
    /// Framework-layer base class.
    pub base: Option<TypeId>,
    /// Core-layer base cross-link, replacing `base` in the core layer.
    pub core_base: Option<TypeId>,
    /// Implemented or required interfaces in declaration order.
    pub interfaces: SmallVec<[ResolvedType; 4]>,
}

impl TypeGraphNode {
    /// Base edge in the core layer.
    pub fn core_layer_base(&self) -> Option<TypeId> {
        self.core_base.or(self.base)
    }
}

/// Resolved types of one member declaration.
#[derive(Clone, Debug, Default)]
pub struct ResolvedMember {
    /// Property/field/event type or method return type.
    pub ty: Option<ResolvedType>,
    pub params: Vec<ResolvedType>,
    /// Element and key types of a `collection` annotation.
    pub collection: Option<(ResolvedType, Option<ResolvedType>)>,
}

/// The resolved type graph.
#[derive(Clone, Debug, Default)]
pub struct TypeGraph {
    nodes: Vec<TypeGraphNode>,
    members: Vec<ResolvedMember>,
    instantiations: Vec<Instantiation>,
    lookup: NameLookup,
    conflicts: Vec<MemberConflict>,
    cycles: Vec<Vec<TypeId>>,
}

impl TypeGraph {
    pub fn node(&self, id: TypeId) -> &TypeGraphNode {
        &self.nodes[id.index()]
    }

    pub fn nodes(&self) -> impl ExactSizeIterator<Item = (TypeId, &TypeGraphNode)> {
        self.nodes
            .iter()
            .map(|node| (TypeId::from_decl(node.decl), node))
    }

    pub fn member(&self, id: MemberId) -> &ResolvedMember {
        &self.members[id.index()]
    }

    pub fn instantiation(&self, id: InstId) -> &Instantiation {
        &self.instantiations[id.index()]
    }

    pub fn instantiation_count(&self) -> usize {
        self.instantiations.len()
    }

    pub fn lookup(&self) -> &NameLookup {
        &self.lookup
    }

    /// Diamond member-name conflicts, ordered by type.
    pub fn conflicts(&self) -> &[MemberConflict] {
        &self.conflicts
    }

    pub fn conflicts_for(&self, ty: TypeId) -> impl Iterator<Item = &MemberConflict> {
        self.conflicts.iter().filter(move |c| c.ty == ty)
    }

    /// Inheritance cycles found in either layer.
    pub fn cycles(&self) -> &[Vec<TypeId>] {
        &self.cycles
    }

    pub fn has_cycles(&self) -> bool {
        !self.cycles.is_empty()
    }

    /// Framework-layer ancestors, nearest first. Stops at a repeated node.
    pub fn framework_bases(&self, id: TypeId) -> Vec<TypeId> {
        let mut seen = FxHashSet::default();
        seen.insert(id);
        let mut bases = Vec::new();
        let mut current = self.node(id).base;
        while let Some(base) = current {
            if !seen.insert(base) {
                break;
            }
            bases.push(base);
            current = self.node(base).base;
        }
        bases
    }

    /// Render a resolved type with fully-qualified names.
    pub fn display(&self, ty: ResolvedType, table: &DeclarationTable) -> String {
        let mut out = String::new();
        self.write_type(&mut out, ty, table);
        out
    }

    fn write_type(&self, out: &mut String, ty: ResolvedType, table: &DeclarationTable) {
        match ty.head {
            TypeHead::Primitive(p) => out.push_str(p.as_str()),
            TypeHead::Declared(id) => out.push_str(&table.qualified_name(id.decl())),
            TypeHead::Param { owner, index } => {
                let params = &table.ty(owner.decl()).type_params;
                let name = params
                    .get(usize::from(index))
                    .map_or("<param>", |n| table.name(*n));
                out.push_str(name);
            }
            TypeHead::Instance(inst) => {
                let inst = self.instantiation(inst);
                match inst.generic {
                    GenericHead::Builtin(g) => out.push_str(g.as_str()),
                    GenericHead::Declared(id) => {
                        out.push_str(&table.qualified_name(id.decl()));
                    }
                }
                out.push('<');
                for (i, arg) in inst.args.iter().enumerate() {
                    if i > 0 {
                        out.push_str(", ");
                    }
                    self.write_type(out, *arg, table);
                }
                out.push('>');
            }
            TypeHead::Error => out.push_str("<error>"),
        }
        if ty.nullable {
            out.push('?');
        }
    }
}

// ============================================================================
// Builder
// ============================================================================

/// Build the type graph, reporting unresolved references, invalid edges and
/// inheritance cycles.
#[tracing::instrument(level = "debug", skip_all, fields(types = table.type_count()))]
pub fn build_graph(table: &DeclarationTable) -> (TypeGraph, Vec<Diagnostic>) {
    let mut builder = Builder {
        table,
        lookup: NameLookup::register(table),
        instantiations: Vec::new(),
        inst_ids: FxHashMap::default(),
        diagnostics: Vec::new(),
    };

    let nodes: Vec<TypeGraphNode> = table
        .types()
        .map(|(id, decl)| builder.resolve_node(id, decl))
        .collect();
    let members: Vec<ResolvedMember> = table
        .members()
        .map(|(id, _)| builder.resolve_member(id))
        .collect();

    let Builder {
        lookup,
        instantiations,
        mut diagnostics,
        ..
    } = builder;
    let mut graph = TypeGraph {
        nodes,
        members,
        instantiations,
        lookup,
        conflicts: Vec::new(),
        cycles: Vec::new(),
    };

    let (cycles, cycle_diagnostics) = cycles::detect(&graph, table);
    graph.cycles = cycles;
    diagnostics.extend(cycle_diagnostics);

    check_content_properties(&graph, table, &mut diagnostics);
    graph.conflicts = conflicts::collect(&graph, table);

    tracing::debug!(
        nodes = graph.nodes.len(),
        instantiations = graph.instantiations.len(),
        conflicts = graph.conflicts.len(),
        cycles = graph.cycles.len(),
        "type graph built"
    );
    (graph, diagnostics)
}

struct Builder<'t> {
    table: &'t DeclarationTable,
    lookup: NameLookup,
    instantiations: Vec<Instantiation>,
    inst_ids: FxHashMap<Instantiation, InstId>,
    diagnostics: Vec<Diagnostic>,
}

/// A name resolved before arity is checked.
enum Head {
    Primitive(Primitive),
    Param(u16),
    Builtin(BuiltinGeneric),
    Declared(TypeId),
}

impl<'t> Builder<'t> {
    fn resolve_node(&mut self, id: DeclId, decl: &'t TypeDeclaration) -> TypeGraphNode {
        let site = Site::Type(id);
        let fqn = self.table.qualified_name(id);

        let base = decl.base.as_ref().and_then(|base_ref| {
            if decl.kind != TypeKind::Class {
                self.report(
                    Diagnostic::error(ErrorCode::E1002)
                        .with_message(format!(
                            "{} `{fqn}` cannot declare a base type",
                            decl.kind
                        ))
                        .with_full_label(site.label(self.table, "only classes have a base type")),
                );
                return None;
            }
            let base = self.resolve(base_ref, id, site);
            match base.head {
                TypeHead::Declared(target)
                    if !base.nullable && self.table.ty(target.decl()).kind == TypeKind::Class =>
                {
                    Some(target)
                }
                TypeHead::Error => None,
                _ => {
                    let found = self.describe(base_ref);
                    self.report(
                        Diagnostic::error(ErrorCode::E1002)
                            .with_message(format!(
                                "base type of `{fqn}` must be a class, found `{found}`"
                            ))
                            .with_full_label(site.label(self.table, "invalid base type")),
                    );
                    None
                }
            }
        });

        let core_base = decl.annotations.iter().find_map(|a| match a {
            Annotation::CoreBase(ty) => Some(ty),
            _ => None,
        });
        let core_base = core_base.and_then(|core_ref| {
            let core = self.resolve(core_ref, id, site);
            match core.head {
                TypeHead::Declared(target)
                    if !core.nullable
                        && matches!(
                            self.table.ty(target.decl()).kind,
                            TypeKind::Class | TypeKind::Struct
                        ) =>
                {
                    Some(target)
                }
                TypeHead::Error => None,
                _ => {
                    let found = self.describe(core_ref);
                    self.report(
                        Diagnostic::error(ErrorCode::E1007)
                            .with_message(format!(
                                "core base of `{fqn}` must be a class or struct, found `{found}`"
                            ))
                            .with_full_label(site.label(self.table, "invalid core base")),
                    );
                    None
                }
            }
        });

        let mut interfaces = SmallVec::new();
        for iface_ref in &decl.interfaces {
            let iface = self.resolve(iface_ref, id, site);
            if iface.is_error() {
                continue;
            }
            let is_interface = !iface.nullable
                && match iface.head {
                    TypeHead::Declared(target) => {
                        self.table.ty(target.decl()).kind == TypeKind::Interface
                    }
                    TypeHead::Instance(inst) => match self.instantiations[inst.index()].generic {
                        GenericHead::Builtin(_) => true,
                        GenericHead::Declared(target) => {
                            self.table.ty(target.decl()).kind == TypeKind::Interface
                        }
                    },
                    TypeHead::Primitive(_) | TypeHead::Param { .. } | TypeHead::Error => false,
                };
            if is_interface {
                interfaces.push(iface);
            } else {
                let found = self.describe(iface_ref);
                self.report(
                    Diagnostic::error(ErrorCode::E1003)
                        .with_message(format!(
                            "`{found}` in the interface list of `{fqn}` is not an interface"
                        ))
                        .with_full_label(site.label(self.table, "expected an interface")),
                );
            }
        }

        TypeGraphNode {
            decl: id,
            kind: decl.kind,
            base,
            core_base,
            interfaces,
        }
    }

    fn resolve_member(&mut self, id: MemberId) -> ResolvedMember {
        let table = self.table;
        let member = table.member(id);
        let site = Site::Member(id);
        let owner = member.owner;

        let ty = member.ty.as_ref().map(|ty| self.resolve(ty, owner, site));
        let params = member
            .params
            .iter()
            .map(|param| self.resolve(&param.ty, owner, site))
            .collect();
        let collection = member.annotations.iter().find_map(|a| match a {
            Annotation::Collection { element, key, .. } => Some((element, key)),
            _ => None,
        });
        let collection = collection.map(|(element, key)| {
            let element = self.resolve(element, owner, site);
            let key = key.as_ref().map(|key| self.resolve(key, owner, site));
            (element, key)
        });

        ResolvedMember {
            ty,
            params,
            collection,
        }
    }

    /// Resolve a type reference written inside `owner`.
    ///
    /// Generic arguments are resolved before the generic itself.
    fn resolve(&mut self, ty: &TypeRef, owner: DeclId, site: Site) -> ResolvedType {
        match ty {
            TypeRef::Nullable(inner) => {
                let mut resolved = self.resolve(inner, owner, site);
                if !resolved.is_error() {
                    resolved.nullable = true;
                }
                resolved
            }
            TypeRef::Path { path, args } => {
                let resolved_args: SmallVec<[ResolvedType; 2]> = args
                    .iter()
                    .map(|arg| self.resolve(arg, owner, site))
                    .collect();
                let table = self.table;
                let text = table.name(*path);

                let Some(head) = self.resolve_head(text, owner) else {
                    let written = self.describe(ty);
                    self.report(
                        Diagnostic::error(ErrorCode::E1001)
                            .with_message(format!("unresolved type `{written}`"))
                            .with_full_label(site.label(self.table, format!("`{text}` not found")))
                            .with_note(format!(
                                "looked up in `{}`, its enclosing namespaces, and as a fully-qualified name",
                                self.table.name(self.table.ty(owner).namespace)
                            )),
                    );
                    return ResolvedType::ERROR;
                };

                let expected = match head {
                    Head::Primitive(_) | Head::Param(_) => 0,
                    Head::Builtin(generic) => generic.arity(),
                    Head::Declared(id) => self.table.ty(id.decl()).type_params.len(),
                };
                if expected != resolved_args.len() {
                    let written = self.describe(ty);
                    self.report(
                        Diagnostic::error(ErrorCode::E1004)
                            .with_message(format!(
                                "`{text}` expects {expected} type argument{}, found {} in `{written}`",
                                if expected == 1 { "" } else { "s" },
                                resolved_args.len()
                            ))
                            .with_full_label(site.label(self.table, "wrong number of type arguments")),
                    );
                    return ResolvedType::ERROR;
                }
                if resolved_args.iter().any(|arg| arg.is_error()) {
                    return ResolvedType::ERROR;
                }

                let head = match head {
                    Head::Primitive(p) => TypeHead::Primitive(p),
                    Head::Param(index) => TypeHead::Param {
                        owner: TypeId::from_decl(owner),
                        index,
                    },
                    Head::Declared(id) if resolved_args.is_empty() => TypeHead::Declared(id),
                    Head::Declared(id) => TypeHead::Instance(self.intern(Instantiation {
                        generic: GenericHead::Declared(id),
                        args: resolved_args,
                    })),
                    Head::Builtin(generic) => TypeHead::Instance(self.intern(Instantiation {
                        generic: GenericHead::Builtin(generic),
                        args: resolved_args,
                    })),
                };
                ResolvedType::new(head)
            }
        }
    }

    /// Lookup order: primitives and builtin generics, generic parameters of
    /// the owner, then namespace scopes.
    fn resolve_head(&self, text: &str, owner: DeclId) -> Option<Head> {
        let decl = self.table.ty(owner);
        if !text.contains('.') {
            if let Some(p) = Primitive::from_name(text) {
                return Some(Head::Primitive(p));
            }
            if let Some(g) = BuiltinGeneric::from_name(text) {
                return Some(Head::Builtin(g));
            }
            if let Some(index) = decl
                .type_params
                .iter()
                .position(|p| self.table.name(*p) == text)
            {
                if let Ok(index) = u16::try_from(index) {
                    return Some(Head::Param(index));
                }
            }
        }
        self.lookup
            .resolve_in(text, self.table.name(decl.namespace))
            .map(Head::Declared)
    }

    fn intern(&mut self, inst: Instantiation) -> InstId {
        if let Some(id) = self.inst_ids.get(&inst) {
            return *id;
        }
        let raw = u32::try_from(self.instantiations.len())
            .unwrap_or_else(|_| panic!("more than u32::MAX generic instantiations"));
        let id = InstId(raw);
        self.instantiations.push(inst.clone());
        self.inst_ids.insert(inst, id);
        id
    }

    fn describe(&self, ty: &TypeRef) -> String {
        self.table.type_ref_text(ty)
    }

    fn report(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }
}

/// A class's content property must name a property of the class or one of
/// its framework bases.
fn check_content_properties(
    graph: &TypeGraph,
    table: &DeclarationTable,
    diagnostics: &mut Vec<Diagnostic>,
) {
    for (id, node) in graph.nodes() {
        let decl = table.ty(node.decl);
        let Some(property) = decl.annotations.iter().find_map(|a| match a {
            Annotation::ContentProperty(name) => Some(*name),
            _ => None,
        }) else {
            continue;
        };
        if node.kind != TypeKind::Class {
            // Reported as not applicable by the resolver.
            continue;
        }
        if has_property(graph, table, id, property) {
            continue;
        }
        let site = Site::Type(node.decl);
        diagnostics.push(
            Diagnostic::error(ErrorCode::E1006)
                .with_message(format!(
                    "content property `{}` of `{}` is not a property of the class or its bases",
                    table.name(property),
                    site.path(table)
                ))
                .with_full_label(site.label(table, "declared here")),
        );
    }
}

fn has_property(graph: &TypeGraph, table: &DeclarationTable, id: TypeId, name: Name) -> bool {
    std::iter::once(id)
        .chain(graph.framework_bases(id))
        .flat_map(|ty| table.ty(ty.decl()).members.iter())
        .map(|m| table.member(*m))
        .any(|m| m.kind == MemberKind::Property && m.name == name)
}
