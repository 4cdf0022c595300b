//! The closed set of annotation kinds.
//!
//! Declaration files carry annotations as `{ "kind": ..., <params> }`
//! objects. Lowering maps each one onto an [`Annotation`] variant with a
//! typed payload and rejects unknown kinds outright; nothing downstream ever
//! sees an untyped key/value bag.

use std::fmt;

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

use crate::{Artifact, ArtifactSet, MemberKind, Name, TypeKind, TypeRef};

/// Code-generation inclusion level.
///
/// Variants are declared from most to least restrictive, so the derived
/// `Ord` is the restrictiveness order used when several levels meet.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CodeGenLevel {
    /// Not generated anywhere.
    Excluded,
    /// Only a type-table lookup entry on the native side.
    LookupOnly,
    /// Native engine only.
    CoreOnly,
    /// Interface description only.
    Idl,
    /// Native storage and projection wrapper, no interface.
    Stub,
    /// Everything; the projection wrapper is partial and completed by hand.
    IdlAndPartialStub,
    /// Everything.
    IdlAndStub,
}

impl CodeGenLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            CodeGenLevel::Excluded => "excluded",
            CodeGenLevel::LookupOnly => "lookup_only",
            CodeGenLevel::CoreOnly => "core_only",
            CodeGenLevel::Idl => "idl",
            CodeGenLevel::Stub => "stub",
            CodeGenLevel::IdlAndPartialStub => "idl_and_partial_stub",
            CodeGenLevel::IdlAndStub => "idl_and_stub",
        }
    }

    /// Artifacts this level includes the declaration in.
    pub fn artifacts(self) -> ArtifactSet {
        match self {
            CodeGenLevel::Excluded => ArtifactSet::empty(),
            CodeGenLevel::LookupOnly | CodeGenLevel::CoreOnly => ArtifactSet::NATIVE_STUB,
            CodeGenLevel::Idl => ArtifactSet::INTERFACE,
            CodeGenLevel::Stub => ArtifactSet::NATIVE_STUB | ArtifactSet::PROJECTION,
            CodeGenLevel::IdlAndPartialStub | CodeGenLevel::IdlAndStub => ArtifactSet::all(),
        }
    }

    /// Whether the generated projection wrapper is partial.
    pub fn is_partial(self) -> bool {
        self == CodeGenLevel::IdlAndPartialStub
    }
}

impl fmt::Display for CodeGenLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Native storage representation of a property or field value.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StorageKind {
    Bool,
    Float,
    Double,
    Signed,
    Unsigned,
    String,
    Enum,
    Object,
    ValueObject,
    Point,
    Size,
    Rect,
    Thickness,
    CornerRadius,
    Color,
    GridLength,
    TypeHandle,
    Any,
}

impl StorageKind {
    pub fn as_str(self) -> &'static str {
        match self {
            StorageKind::Bool => "bool",
            StorageKind::Float => "float",
            StorageKind::Double => "double",
            StorageKind::Signed => "signed",
            StorageKind::Unsigned => "unsigned",
            StorageKind::String => "string",
            StorageKind::Enum => "enum",
            StorageKind::Object => "object",
            StorageKind::ValueObject => "value_object",
            StorageKind::Point => "point",
            StorageKind::Size => "size",
            StorageKind::Rect => "rect",
            StorageKind::Thickness => "thickness",
            StorageKind::CornerRadius => "corner_radius",
            StorageKind::Color => "color",
            StorageKind::GridLength => "grid_length",
            StorageKind::TypeHandle => "type_handle",
            StorageKind::Any => "any",
        }
    }
}

impl fmt::Display for StorageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Builtin collection interface a collection-typed property projects as.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CollectionKind {
    Vector,
    VectorView,
    Iterable,
    Map,
    MapView,
}

impl CollectionKind {
    /// Name of the builtin generic interface.
    pub fn generic_name(self) -> &'static str {
        match self {
            CollectionKind::Vector => "IVector",
            CollectionKind::VectorView => "IVectorView",
            CollectionKind::Iterable => "IIterable",
            CollectionKind::Map => "IMap",
            CollectionKind::MapView => "IMapView",
        }
    }

    pub fn is_map(self) -> bool {
        matches!(self, CollectionKind::Map | CollectionKind::MapView)
    }
}

/// Whether a property is a plain property, a dependency property, or both.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PropertyKind {
    /// Plain property backed by a framework field, no dependency property.
    PropertyOnly,
    /// Dependency property identifier without a property accessor.
    DependencyPropertyOnly,
    #[default]
    Both,
}

impl PropertyKind {
    pub fn as_str(self) -> &'static str {
        match self {
            PropertyKind::PropertyOnly => "property_only",
            PropertyKind::DependencyPropertyOnly => "dependency_property_only",
            PropertyKind::Both => "both",
        }
    }
}

impl fmt::Display for PropertyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

bitflags! {
    /// Native property behavior flags.
    #[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
    pub struct PropertyFlags: u16 {
        const AFFECTS_MEASURE = 1 << 0;
        const AFFECTS_ARRANGE = 1 << 1;
        const VALUE_INHERITED = 1 << 2;
        const VALUE_CREATED_ON_DEMAND = 1 << 3;
        const EXCLUDED_FROM_VISUAL_TREE = 1 << 4;
        const INDEPENDENTLY_ANIMATABLE = 1 << 5;
        const CONDITIONALLY_INDEPENDENTLY_ANIMATABLE = 1 << 6;
        const READ_ONLY_EXCEPT_FOR_PARSER = 1 << 7;
        const IN_STORAGE_GROUP = 1 << 8;
        const NEEDS_INVOKE = 1 << 9;
    }
}

impl PropertyFlags {
    /// Names of the set flags in declaration order.
    pub fn names(self) -> impl Iterator<Item = &'static str> {
        PropertyFlag::ALL
            .into_iter()
            .filter(move |flag| self.contains(flag.flag()))
            .map(PropertyFlag::as_str)
    }
}

impl fmt::Display for PropertyFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, name) in self.names().enumerate() {
            if i > 0 {
                f.write_str("|")?;
            }
            f.write_str(name)?;
        }
        Ok(())
    }
}

/// One named [`PropertyFlags`] bit, as written in declaration files.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PropertyFlag {
    AffectsMeasure,
    AffectsArrange,
    ValueInherited,
    ValueCreatedOnDemand,
    ExcludedFromVisualTree,
    IndependentlyAnimatable,
    ConditionallyIndependentlyAnimatable,
    ReadOnlyExceptForParser,
    InStorageGroup,
    NeedsInvoke,
}

impl PropertyFlag {
    pub const ALL: [PropertyFlag; 10] = [
        PropertyFlag::AffectsMeasure,
        PropertyFlag::AffectsArrange,
        PropertyFlag::ValueInherited,
        PropertyFlag::ValueCreatedOnDemand,
        PropertyFlag::ExcludedFromVisualTree,
        PropertyFlag::IndependentlyAnimatable,
        PropertyFlag::ConditionallyIndependentlyAnimatable,
        PropertyFlag::ReadOnlyExceptForParser,
        PropertyFlag::InStorageGroup,
        PropertyFlag::NeedsInvoke,
    ];

    pub fn flag(self) -> PropertyFlags {
        match self {
            PropertyFlag::AffectsMeasure => PropertyFlags::AFFECTS_MEASURE,
            PropertyFlag::AffectsArrange => PropertyFlags::AFFECTS_ARRANGE,
            PropertyFlag::ValueInherited => PropertyFlags::VALUE_INHERITED,
            PropertyFlag::ValueCreatedOnDemand => PropertyFlags::VALUE_CREATED_ON_DEMAND,
            PropertyFlag::ExcludedFromVisualTree => PropertyFlags::EXCLUDED_FROM_VISUAL_TREE,
            PropertyFlag::IndependentlyAnimatable => PropertyFlags::INDEPENDENTLY_ANIMATABLE,
            PropertyFlag::ConditionallyIndependentlyAnimatable => {
                PropertyFlags::CONDITIONALLY_INDEPENDENTLY_ANIMATABLE
            }
            PropertyFlag::ReadOnlyExceptForParser => PropertyFlags::READ_ONLY_EXCEPT_FOR_PARSER,
            PropertyFlag::InStorageGroup => PropertyFlags::IN_STORAGE_GROUP,
            PropertyFlag::NeedsInvoke => PropertyFlags::NEEDS_INVOKE,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            PropertyFlag::AffectsMeasure => "affects_measure",
            PropertyFlag::AffectsArrange => "affects_arrange",
            PropertyFlag::ValueInherited => "value_inherited",
            PropertyFlag::ValueCreatedOnDemand => "value_created_on_demand",
            PropertyFlag::ExcludedFromVisualTree => "excluded_from_visual_tree",
            PropertyFlag::IndependentlyAnimatable => "independently_animatable",
            PropertyFlag::ConditionallyIndependentlyAnimatable => {
                "conditionally_independently_animatable"
            }
            PropertyFlag::ReadOnlyExceptForParser => "read_only_except_for_parser",
            PropertyFlag::InStorageGroup => "in_storage_group",
            PropertyFlag::NeedsInvoke => "needs_invoke",
        }
    }
}

/// Payload of a `platform` annotation.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct PlatformSpec {
    /// API contract the declaration ships in.
    pub contract: Name,
    /// First contract version the declaration is visible in.
    pub version: u32,
    /// First contract version it is no longer visible in.
    pub until: Option<u32>,
    /// On types: the type version index this entry introduces.
    pub type_version: Option<u32>,
    /// Feature gate the entry is conditional on.
    pub feature: Option<Name>,
    /// Name the declaration is visible under within this range.
    pub rename: Option<Name>,
}

/// What an annotation is attached to, for applicability checks.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum DeclTarget {
    Type(TypeKind),
    Member(MemberKind),
}

/// A typed annotation.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub enum Annotation {
    /// Stable identifier.
    Guid(Name),
    CodeGen { level: CodeGenLevel, partial: bool },
    Exclude(Artifact),
    ForceInclude(Artifact),
    Storage(StorageKind),
    /// Native offset field name.
    Offset(Name),
    FieldBacked,
    ReadOnly,
    Attached,
    Platform(PlatformSpec),
    /// Type version index a member was introduced in.
    Version(u32),
    /// Core-layer base type cross-link.
    CoreBase(TypeRef),
    Collection {
        kind: CollectionKind,
        element: TypeRef,
        key: Option<TypeRef>,
    },
    ProjectionName(Name),
    OverloadName(Name),
    NativeName(Name),
    ContentProperty(Name),
    Deprecated(String),
    Comment(String),
    PropertyKind(PropertyKind),
    /// Interface file group a type is emitted into.
    IdlGroup(Name),
    PropertyFlags(PropertyFlags),
    /// Native method that marks the owner's render state dirty on change.
    RenderDirty { method: Name, class: Option<Name> },
}

impl Annotation {
    pub fn tag(&self) -> AnnotationTag {
        match self {
            Annotation::Guid(_) => AnnotationTag::Guid,
            Annotation::CodeGen { .. } => AnnotationTag::CodeGen,
            Annotation::Exclude(_) => AnnotationTag::Exclude,
            Annotation::ForceInclude(_) => AnnotationTag::ForceInclude,
            Annotation::Storage(_) => AnnotationTag::Storage,
            Annotation::Offset(_) => AnnotationTag::Offset,
            Annotation::FieldBacked => AnnotationTag::FieldBacked,
            Annotation::ReadOnly => AnnotationTag::ReadOnly,
            Annotation::Attached => AnnotationTag::Attached,
            Annotation::Platform(_) => AnnotationTag::Platform,
            Annotation::Version(_) => AnnotationTag::Version,
            Annotation::CoreBase(_) => AnnotationTag::CoreBase,
            Annotation::Collection { .. } => AnnotationTag::Collection,
            Annotation::ProjectionName(_) => AnnotationTag::ProjectionName,
            Annotation::OverloadName(_) => AnnotationTag::OverloadName,
            Annotation::NativeName(_) => AnnotationTag::NativeName,
            Annotation::ContentProperty(_) => AnnotationTag::ContentProperty,
            Annotation::Deprecated(_) => AnnotationTag::Deprecated,
            Annotation::Comment(_) => AnnotationTag::Comment,
            Annotation::PropertyKind(_) => AnnotationTag::PropertyKind,
            Annotation::IdlGroup(_) => AnnotationTag::IdlGroup,
            Annotation::PropertyFlags(_) => AnnotationTag::PropertyFlags,
            Annotation::RenderDirty { .. } => AnnotationTag::RenderDirty,
        }
    }
}

/// Payload-free discriminant of [`Annotation`].
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug)]
pub enum AnnotationTag {
    Guid,
    CodeGen,
    Exclude,
    ForceInclude,
    Storage,
    Offset,
    FieldBacked,
    ReadOnly,
    Attached,
    Platform,
    Version,
    CoreBase,
    Collection,
    ProjectionName,
    OverloadName,
    NativeName,
    ContentProperty,
    Deprecated,
    Comment,
    PropertyKind,
    IdlGroup,
    PropertyFlags,
    RenderDirty,
}

impl AnnotationTag {
    pub const ALL: [AnnotationTag; 23] = [
        AnnotationTag::Guid,
        AnnotationTag::CodeGen,
        AnnotationTag::Exclude,
        AnnotationTag::ForceInclude,
        AnnotationTag::Storage,
        AnnotationTag::Offset,
        AnnotationTag::FieldBacked,
        AnnotationTag::ReadOnly,
        AnnotationTag::Attached,
        AnnotationTag::Platform,
        AnnotationTag::Version,
        AnnotationTag::CoreBase,
        AnnotationTag::Collection,
        AnnotationTag::ProjectionName,
        AnnotationTag::OverloadName,
        AnnotationTag::NativeName,
        AnnotationTag::ContentProperty,
        AnnotationTag::Deprecated,
        AnnotationTag::Comment,
        AnnotationTag::PropertyKind,
        AnnotationTag::IdlGroup,
        AnnotationTag::PropertyFlags,
        AnnotationTag::RenderDirty,
    ];

    /// The `kind` string used in declaration files.
    pub fn as_str(self) -> &'static str {
        match self {
            AnnotationTag::Guid => "guid",
            AnnotationTag::CodeGen => "codegen",
            AnnotationTag::Exclude => "exclude",
            AnnotationTag::ForceInclude => "force_include",
            AnnotationTag::Storage => "storage",
            AnnotationTag::Offset => "offset",
            AnnotationTag::FieldBacked => "field_backed",
            AnnotationTag::ReadOnly => "read_only",
            AnnotationTag::Attached => "attached",
            AnnotationTag::Platform => "platform",
            AnnotationTag::Version => "version",
            AnnotationTag::CoreBase => "core_base",
            AnnotationTag::Collection => "collection",
            AnnotationTag::ProjectionName => "name",
            AnnotationTag::OverloadName => "overload_name",
            AnnotationTag::NativeName => "native_name",
            AnnotationTag::ContentProperty => "content_property",
            AnnotationTag::Deprecated => "deprecated",
            AnnotationTag::Comment => "comment",
            AnnotationTag::PropertyKind => "property_kind",
            AnnotationTag::IdlGroup => "idl_group",
            AnnotationTag::PropertyFlags => "property_flags",
            AnnotationTag::RenderDirty => "render_dirty",
        }
    }

    pub fn from_kind(kind: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|tag| tag.as_str() == kind)
    }

    /// Whether an annotation of this kind may appear on `target`.
    pub fn applies_to(self, target: DeclTarget) -> bool {
        use DeclTarget::{Member, Type};

        match self {
            AnnotationTag::CodeGen
            | AnnotationTag::Exclude
            | AnnotationTag::ForceInclude
            | AnnotationTag::Platform
            | AnnotationTag::Deprecated
            | AnnotationTag::Comment => true,
            AnnotationTag::Guid | AnnotationTag::IdlGroup => matches!(target, Type(_)),
            AnnotationTag::Storage | AnnotationTag::Offset => {
                matches!(target, Member(MemberKind::Property | MemberKind::Field))
            }
            AnnotationTag::FieldBacked
            | AnnotationTag::ReadOnly
            | AnnotationTag::Attached
            | AnnotationTag::Collection
            | AnnotationTag::PropertyKind
            | AnnotationTag::PropertyFlags
            | AnnotationTag::RenderDirty => matches!(target, Member(MemberKind::Property)),
            AnnotationTag::Version | AnnotationTag::ProjectionName => matches!(target, Member(_)),
            AnnotationTag::OverloadName => matches!(target, Member(MemberKind::Method)),
            AnnotationTag::CoreBase => matches!(target, Type(TypeKind::Class | TypeKind::Struct)),
            AnnotationTag::NativeName => {
                matches!(target, Type(_) | Member(MemberKind::EnumValue))
            }
            AnnotationTag::ContentProperty => matches!(target, Type(TypeKind::Class)),
        }
    }
}

impl fmt::Display for AnnotationTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
