//! Annotation Resolver.
//!
//! Folds each declaration's annotation bag into a [`ResolvedShape`]: which
//! artifacts the declaration appears in and how it is represented there.
//!
//! Artifact visibility is decided by this precedence, applied in order:
//!
//! 1. the most restrictive `codegen` level gives the base set (no level
//!    means every artifact);
//! 2. `force_include(t)` adds `t`;
//! 3. `exclude(t)` removes `t`;
//! 4. `exclude(t)` with `force_include(t)` on one declaration is an error;
//! 5. internal visibility removes `interface` unless it is force-included;
//! 6. a member's set is intersected with its owning type's set.
//!
//! A member `force_include(t)` that step 6 removes again is reported as a
//! warning.
//!
//! Every step only reads the annotation bag and the immutable type graph, so
//! declarations resolve independently and in parallel.

mod storage;

use xom_diagnostic::{Diagnostic, ErrorCode};
use xom_ir::{
    AccessorShape, Annotation, AnnotationTag, ArtifactSet, CodeGenLevel, CollectionKind,
    DeclId, DeclTarget, DeclarationTable, MemberId, MemberKind, Name, PropertyFlags, PropertyKind,
    StorageKind, TypeRef, Visibility,
};

use crate::graph::TypeGraph;
use crate::identity::normalize_guid;
use crate::par_map;
use crate::site::Site;

/// Normalized interpretation of one declaration's annotations.
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct ResolvedShape {
    /// Artifacts the declaration is visible in.
    pub artifacts: ArtifactSet,
    /// Most restrictive explicit `codegen` level.
    pub level: Option<CodeGenLevel>,
    /// The projection wrapper is completed by hand.
    pub partial: bool,
    /// Members carry their owner's visibility.
    pub visibility: Visibility,
    pub guid: Option<Name>,
    /// Explicit or inferred storage of a property or field.
    pub storage: Option<StorageKind>,
    pub offset: Option<Name>,
    pub field_backed: bool,
    /// Accessor shape of a member after `read_only` and `attached`.
    pub accessor: Option<AccessorShape>,
    pub collection: Option<CollectionKind>,
    pub projection_name: Option<Name>,
    pub overload_name: Option<Name>,
    pub native_name: Option<Name>,
    pub content_property: Option<Name>,
    pub deprecated: Option<String>,
    pub comment: Option<String>,
    pub property_kind: PropertyKind,
    /// Interface file group of a type.
    pub idl_group: Option<Name>,
    pub property_flags: PropertyFlags,
    pub render_dirty: Option<RenderDirty>,
}

/// Native dirty-marking call of a property. No class means the owner's.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct RenderDirty {
    pub class: Option<Name>,
    pub method: Name,
}

impl ResolvedShape {
    pub fn is_visible_in(&self, artifact: xom_ir::Artifact) -> bool {
        self.artifacts.includes(artifact)
    }
}

/// Resolved shapes of every type and member, indexed like the table.
#[derive(Clone, Debug, Default)]
pub struct Shapes {
    types: Vec<ResolvedShape>,
    members: Vec<ResolvedShape>,
}

impl Shapes {
    pub fn ty(&self, id: DeclId) -> &ResolvedShape {
        &self.types[id.index()]
    }

    pub fn member(&self, id: MemberId) -> &ResolvedShape {
        &self.members[id.index()]
    }

    pub fn type_count(&self) -> usize {
        self.types.len()
    }

    pub fn member_count(&self) -> usize {
        self.members.len()
    }
}

/// Resolve every declaration's annotations.
///
/// Types resolve first since members intersect with their owner's artifact
/// set. Diagnostics are returned in declaration order.
#[tracing::instrument(
    level = "debug",
    skip_all,
    fields(types = table.type_count(), members = table.member_count(), parallel = parallel)
)]
pub fn resolve_shapes(
    table: &DeclarationTable,
    graph: &TypeGraph,
    parallel: bool,
) -> (Shapes, Vec<Diagnostic>) {
    let mut diagnostics = Vec::new();

    let type_ids: Vec<DeclId> = table.types().map(|(id, _)| id).collect();
    let resolved = par_map(&type_ids, parallel, |id| resolve_type(table, *id));
    let mut types = Vec::with_capacity(resolved.len());
    for (shape, found) in resolved {
        types.push(shape);
        diagnostics.extend(found);
    }

    let member_ids: Vec<MemberId> = table.members().map(|(id, _)| id).collect();
    let resolved = par_map(&member_ids, parallel, |id| {
        resolve_member(table, graph, &types, *id)
    });
    let mut members = Vec::with_capacity(resolved.len());
    for (shape, found) in resolved {
        members.push(shape);
        diagnostics.extend(found);
    }

    tracing::debug!(errors = diagnostics.len(), "annotations resolved");
    (Shapes { types, members }, diagnostics)
}

fn resolve_type(table: &DeclarationTable, id: DeclId) -> (ResolvedShape, Vec<Diagnostic>) {
    let decl = table.ty(id);
    let bag = Bag::collect(table, Site::Type(id), DeclTarget::Type(decl.kind), &decl.annotations);
    bag.finish(decl.visibility, ArtifactSet::all(), None)
}

fn resolve_member(
    table: &DeclarationTable,
    graph: &TypeGraph,
    owners: &[ResolvedShape],
    id: MemberId,
) -> (ResolvedShape, Vec<Diagnostic>) {
    let member = table.member(id);
    let owner = &owners[member.owner.index()];
    let site = Site::Member(id);
    let bag = Bag::collect(table, site, DeclTarget::Member(member.kind), &member.annotations);
    let (mut shape, mut diagnostics) =
        bag.finish(owner.visibility, owner.artifacts, Some(member.accessor));

    if !matches!(member.kind, MemberKind::Property | MemberKind::Field) {
        return (shape, diagnostics);
    }
    let Some(ty) = graph.member(id).ty else {
        let path = site.path(table);
        let mut diag = Diagnostic::error(ErrorCode::E1009)
            .with_message(format!("{} `{path}` has no declared type", member.kind))
            .with_full_label(site.label(table, "type missing"));
        if let Some(kind) = shape.storage {
            diag = diag.with_note(format!("`{kind}` storage cannot be checked without a type"));
        }
        diagnostics.push(diag);
        return (shape, diagnostics);
    };
    match shape.storage {
        Some(kind) if !storage::accepts(kind, ty, graph) => {
            diagnostics.push(
                Diagnostic::error(ErrorCode::E2002)
                    .with_message(format!(
                        "storage `{kind}` does not match the type of `{}`",
                        site.path(table)
                    ))
                    .with_full_label(site.label(
                        table,
                        format!("declared as `{}`", graph.display(ty, table)),
                    ))
                    .with_note(format!("`{kind}` storage requires {}", storage::family(kind))),
            );
        }
        Some(_) => {}
        None if !shape.field_backed => shape.storage = storage::infer(ty, graph, table),
        None => {}
    }
    (shape, diagnostics)
}

// ============================================================================
// Annotation bag
// ============================================================================

/// One pass over a declaration's annotations.
struct Bag<'t> {
    table: &'t DeclarationTable,
    site: Site,
    diagnostics: Vec<Diagnostic>,
    level: Option<CodeGenLevel>,
    partial: bool,
    excluded: ArtifactSet,
    forced: ArtifactSet,
    guid: Option<Name>,
    storage: Option<StorageKind>,
    offset: Option<Name>,
    field_backed: bool,
    read_only: bool,
    attached: bool,
    core_base: Option<&'t TypeRef>,
    collection: Option<&'t Annotation>,
    projection_name: Option<Name>,
    overload_name: Option<Name>,
    native_name: Option<Name>,
    content_property: Option<Name>,
    deprecated: Option<&'t str>,
    comments: Vec<&'t str>,
    property_kind: Option<PropertyKind>,
    idl_group: Option<Name>,
    property_flags: PropertyFlags,
    render_dirty: Option<RenderDirty>,
}

/// Store `value` in an empty slot, or return the differing value already there.
fn merge<T: Copy + PartialEq>(slot: &mut Option<T>, value: T) -> Result<(), T> {
    match *slot {
        None => {
            *slot = Some(value);
            Ok(())
        }
        Some(existing) if existing == value => Ok(()),
        Some(existing) => Err(existing),
    }
}

impl<'t> Bag<'t> {
    fn collect(
        table: &'t DeclarationTable,
        site: Site,
        target: DeclTarget,
        annotations: &'t [Annotation],
    ) -> Self {
        let mut bag = Bag {
            table,
            site,
            diagnostics: Vec::new(),
            level: None,
            partial: false,
            excluded: ArtifactSet::empty(),
            forced: ArtifactSet::empty(),
            guid: None,
            storage: None,
            offset: None,
            field_backed: false,
            read_only: false,
            attached: false,
            core_base: None,
            collection: None,
            projection_name: None,
            overload_name: None,
            native_name: None,
            content_property: None,
            deprecated: None,
            comments: Vec::new(),
            property_kind: None,
            idl_group: None,
            property_flags: PropertyFlags::empty(),
            render_dirty: None,
        };
        for annotation in annotations {
            bag.add(annotation, target);
        }
        bag
    }

    fn add(&mut self, annotation: &'t Annotation, target: DeclTarget) {
        let tag = annotation.tag();
        if !tag.applies_to(target) {
            self.not_applicable(tag, target);
            return;
        }
        let table = self.table;
        let name = |n: Name| table.name(n).to_owned();

        match annotation {
            Annotation::Guid(value) => match self.guid {
                Some(existing)
                    if normalize_guid(table.name(existing)) != normalize_guid(table.name(*value)) =>
                {
                    self.conflicting(tag, name(existing), name(*value));
                }
                Some(_) => {}
                None => self.guid = Some(*value),
            },
            Annotation::CodeGen { level, partial } => {
                self.level = Some(self.level.map_or(*level, |l| l.min(*level)));
                self.partial |= *partial;
            }
            Annotation::Exclude(artifact) => self.excluded |= artifact.flag(),
            Annotation::ForceInclude(artifact) => self.forced |= artifact.flag(),
            Annotation::Storage(kind) => {
                if let Err(existing) = merge(&mut self.storage, *kind) {
                    self.conflicting(tag, existing.to_string(), kind.to_string());
                }
            }
            Annotation::Offset(field) => {
                if let Err(existing) = merge(&mut self.offset, *field) {
                    self.conflicting(tag, name(existing), name(*field));
                }
            }
            Annotation::FieldBacked => self.field_backed = true,
            Annotation::ReadOnly => self.read_only = true,
            Annotation::Attached => self.attached = true,
            // Version gating reads these directly.
            Annotation::Platform(_) | Annotation::Version(_) => {}
            Annotation::CoreBase(ty) => match self.core_base {
                Some(existing) if existing != ty => {
                    let (a, b) = (table.type_ref_text(existing), table.type_ref_text(ty));
                    self.conflicting(tag, a, b);
                }
                Some(_) => {}
                None => self.core_base = Some(ty),
            },
            Annotation::Collection { .. } => match self.collection {
                Some(existing) if existing != annotation => {
                    let (a, b) = (
                        self.describe_collection(existing),
                        self.describe_collection(annotation),
                    );
                    self.conflicting(tag, a, b);
                }
                Some(_) => {}
                None => self.collection = Some(annotation),
            },
            Annotation::ProjectionName(value) => {
                if let Err(existing) = merge(&mut self.projection_name, *value) {
                    self.conflicting(tag, name(existing), name(*value));
                }
            }
            Annotation::OverloadName(value) => {
                if let Err(existing) = merge(&mut self.overload_name, *value) {
                    self.conflicting(tag, name(existing), name(*value));
                }
            }
            Annotation::NativeName(value) => {
                if let Err(existing) = merge(&mut self.native_name, *value) {
                    self.conflicting(tag, name(existing), name(*value));
                }
            }
            Annotation::ContentProperty(value) => {
                if let Err(existing) = merge(&mut self.content_property, *value) {
                    self.conflicting(tag, name(existing), name(*value));
                }
            }
            Annotation::Deprecated(message) => match self.deprecated {
                Some(existing) if existing != message.as_str() => {
                    self.conflicting(tag, existing.to_owned(), message.clone());
                }
                Some(_) => {}
                None => self.deprecated = Some(message.as_str()),
            },
            Annotation::Comment(text) => self.comments.push(text),
            Annotation::PropertyKind(kind) => {
                if let Err(existing) = merge(&mut self.property_kind, *kind) {
                    self.conflicting(tag, existing.to_string(), kind.to_string());
                }
            }
            Annotation::IdlGroup(group) => {
                if let Err(existing) = merge(&mut self.idl_group, *group) {
                    self.conflicting(tag, name(existing), name(*group));
                }
            }
            Annotation::PropertyFlags(flags) => self.property_flags |= *flags,
            Annotation::RenderDirty { method, class } => {
                let dirty = RenderDirty {
                    class: *class,
                    method: *method,
                };
                if let Err(existing) = merge(&mut self.render_dirty, dirty) {
                    let (a, b) = (self.describe_dirty(existing), self.describe_dirty(dirty));
                    self.conflicting(tag, a, b);
                }
            }
        }
    }

    fn describe_collection(&self, annotation: &Annotation) -> String {
        match annotation {
            Annotation::Collection { kind, element, key } => {
                let element = self.table.type_ref_text(element);
                match key {
                    Some(key) => format!(
                        "{}<{}, {element}>",
                        kind.generic_name(),
                        self.table.type_ref_text(key)
                    ),
                    None => format!("{}<{element}>", kind.generic_name()),
                }
            }
            other => other.tag().to_string(),
        }
    }

    fn describe_dirty(&self, dirty: RenderDirty) -> String {
        let method = self.table.name(dirty.method);
        match dirty.class {
            Some(class) => format!("{}::{method}", self.table.name(class)),
            None => method.to_owned(),
        }
    }

    /// Apply the precedence rules and the cross-annotation checks.
    fn finish(
        mut self,
        visibility: Visibility,
        owner: ArtifactSet,
        accessor: Option<AccessorShape>,
    ) -> (ResolvedShape, Vec<Diagnostic>) {
        let both = self.excluded & self.forced;
        for artifact in both.artifacts() {
            let path = self.site.path(self.table);
            self.diagnostics.push(
                Diagnostic::error(ErrorCode::E2004)
                    .with_message(format!(
                        "`{path}` is both excluded from and force-included in `{artifact}`"
                    ))
                    .with_full_label(self.site.label(self.table, "conflicting inclusion"))
                    .with_suggestion(format!(
                        "remove either `exclude` or `force_include` for `{artifact}`"
                    )),
            );
        }

        let mut artifacts = self.level.map_or(ArtifactSet::all(), CodeGenLevel::artifacts);
        artifacts |= self.forced;
        artifacts &= !self.excluded;
        if visibility == Visibility::Internal && !self.forced.contains(ArtifactSet::INTERFACE) {
            artifacts.remove(ArtifactSet::INTERFACE);
        }
        artifacts &= owner;

        let ineffective = self.forced & !owner;
        for artifact in ineffective.artifacts() {
            let path = self.site.path(self.table);
            self.diagnostics.push(
                Diagnostic::warning(ErrorCode::E2006)
                    .with_message(format!(
                        "`force_include({artifact})` on `{path}` has no effect"
                    ))
                    .with_full_label(self.site.label(self.table, "owning type is not included"))
                    .with_note(format!(
                        "members only appear in `{artifact}` when their owning type does"
                    )),
            );
        }

        if self.storage.is_some() && self.field_backed {
            let path = self.site.path(self.table);
            self.diagnostics.push(
                Diagnostic::error(ErrorCode::E2001)
                    .with_message(format!(
                        "`storage` and `field_backed` are mutually exclusive on `{path}`"
                    ))
                    .with_full_label(self.site.label(self.table, "both annotations present")),
            );
        }

        if let Some(field) = self.offset {
            if !artifacts.contains(ArtifactSet::NATIVE_STUB) {
                let path = self.site.path(self.table);
                self.diagnostics.push(
                    Diagnostic::error(ErrorCode::E2005)
                        .with_message(format!(
                            "`{path}` has native offset `{}` but is not visible in the native stub",
                            self.table.name(field)
                        ))
                        .with_full_label(self.site.label(self.table, "offset without native storage")),
                );
            }
        }

        if self.attached && self.property_kind == Some(PropertyKind::PropertyOnly) {
            let path = self.site.path(self.table);
            self.diagnostics.push(
                Diagnostic::error(ErrorCode::E2001)
                    .with_message(format!(
                        "`attached` requires a dependency property, `{path}` is `property_only`"
                    ))
                    .with_full_label(self.site.label(self.table, "both annotations present")),
            );
        }

        let animation = PropertyFlags::INDEPENDENTLY_ANIMATABLE
            | PropertyFlags::CONDITIONALLY_INDEPENDENTLY_ANIMATABLE;
        if self.property_flags.contains(animation) {
            let path = self.site.path(self.table);
            self.diagnostics.push(
                Diagnostic::error(ErrorCode::E2001)
                    .with_message(format!(
                        "`{path}` cannot be both independently and conditionally independently animatable"
                    ))
                    .with_full_label(self.site.label(self.table, "conflicting `property_flags`")),
            );
        }

        let accessor = accessor.map(|declared| self.accessor(declared));

        let shape = ResolvedShape {
            artifacts,
            level: self.level,
            partial: self.partial || self.level.is_some_and(CodeGenLevel::is_partial),
            visibility,
            guid: self.guid,
            storage: self.storage,
            offset: self.offset,
            field_backed: self.field_backed,
            accessor,
            collection: self.collection.and_then(|a| match a {
                Annotation::Collection { kind, .. } => Some(*kind),
                _ => None,
            }),
            projection_name: self.projection_name,
            overload_name: self.overload_name,
            native_name: self.native_name,
            content_property: self.content_property,
            deprecated: self.deprecated.map(str::to_owned),
            comment: (!self.comments.is_empty()).then(|| self.comments.join("\n")),
            property_kind: self.property_kind.unwrap_or_default(),
            idl_group: self.idl_group,
            property_flags: self.property_flags,
            render_dirty: self.render_dirty,
        };
        (shape, self.diagnostics)
    }

    fn accessor(&mut self, declared: AccessorShape) -> AccessorShape {
        if self.attached {
            if matches!(declared, AccessorShape::GetSet | AccessorShape::Attached) {
                return AccessorShape::Attached;
            }
            let path = self.site.path(self.table);
            self.diagnostics.push(
                Diagnostic::error(ErrorCode::E2003)
                    .with_message(format!(
                        "`attached` requires a get/set accessor, `{path}` is `{declared}`"
                    ))
                    .with_full_label(self.site.label(self.table, "not attachable")),
            );
            return declared;
        }
        if self.read_only && declared == AccessorShape::GetSet {
            return AccessorShape::GetOnly;
        }
        declared
    }

    #[cold]
    fn conflicting(&mut self, tag: AnnotationTag, first: String, second: String) {
        let path = self.site.path(self.table);
        self.diagnostics.push(
            Diagnostic::error(ErrorCode::E2001)
                .with_message(format!(
                    "conflicting `{tag}` annotations on `{path}`: `{first}` and `{second}`"
                ))
                .with_full_label(self.site.label(self.table, format!("`{tag}` given twice"))),
        );
    }

    #[cold]
    fn not_applicable(&mut self, tag: AnnotationTag, target: DeclTarget) {
        let path = self.site.path(self.table);
        let what = match target {
            DeclTarget::Type(kind) => kind.as_str(),
            DeclTarget::Member(kind) => kind.as_str(),
        };
        self.diagnostics.push(
            Diagnostic::error(ErrorCode::E2003)
                .with_message(format!("`{tag}` cannot be applied to {what} `{path}`"))
                .with_full_label(self.site.label(self.table, format!("this is a {what}"))),
        );
    }
}
