//! Type and member declarations.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{Annotation, Name, TypeRef};

/// Index of a [`TypeDeclaration`] in the declaration table.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[repr(transparent)]
pub struct DeclId(u32);

impl DeclId {
    #[inline]
    pub const fn from_raw(raw: u32) -> Self {
        DeclId(raw)
    }

    #[inline]
    pub const fn raw(self) -> u32 {
        self.0
    }

    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Debug for DeclId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DeclId({})", self.0)
    }
}

/// Index of a [`MemberDeclaration`] in the declaration table.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[repr(transparent)]
pub struct MemberId(u32);

impl MemberId {
    #[inline]
    pub const fn from_raw(raw: u32) -> Self {
        MemberId(raw)
    }

    #[inline]
    pub const fn raw(self) -> u32 {
        self.0
    }

    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Debug for MemberId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "MemberId({})", self.0)
    }
}

/// Index of a declaration file registered with the table.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug, Default)]
#[repr(transparent)]
pub struct FileId(u32);

impl FileId {
    #[inline]
    pub const fn from_raw(raw: u32) -> Self {
        FileId(raw)
    }

    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

/// The kind of a declared type.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TypeKind {
    Class,
    Struct,
    Interface,
    Enum,
    Delegate,
}

impl TypeKind {
    pub fn as_str(self) -> &'static str {
        match self {
            TypeKind::Class => "class",
            TypeKind::Struct => "struct",
            TypeKind::Interface => "interface",
            TypeKind::Enum => "enum",
            TypeKind::Delegate => "delegate",
        }
    }

    /// Reference types are stored as objects in native storage.
    pub fn is_reference(self) -> bool {
        matches!(
            self,
            TypeKind::Class | TypeKind::Interface | TypeKind::Delegate
        )
    }
}

impl fmt::Display for TypeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The kind of a declared member.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MemberKind {
    Property,
    Event,
    Method,
    Field,
    EnumValue,
}

impl MemberKind {
    pub fn as_str(self) -> &'static str {
        match self {
            MemberKind::Property => "property",
            MemberKind::Event => "event",
            MemberKind::Method => "method",
            MemberKind::Field => "field",
            MemberKind::EnumValue => "enum_value",
        }
    }

    /// Accessor shape used when the declaration file does not state one.
    pub fn default_accessor(self) -> AccessorShape {
        match self {
            MemberKind::Property => AccessorShape::GetSet,
            MemberKind::Event | MemberKind::Method | MemberKind::Field | MemberKind::EnumValue => {
                AccessorShape::Instance
            }
        }
    }
}

impl fmt::Display for MemberKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a member is accessed on the projected surface.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccessorShape {
    /// Readable, not publicly writable.
    GetOnly,
    /// Readable and writable.
    GetSet,
    /// Attached property: static `GetX(target)` / `SetX(target, value)` pair.
    Attached,
    /// Static member of the type.
    Static,
    /// Instance method, event, or field.
    Instance,
}

impl AccessorShape {
    pub fn as_str(self) -> &'static str {
        match self {
            AccessorShape::GetOnly => "get",
            AccessorShape::GetSet => "get_set",
            AccessorShape::Attached => "attached",
            AccessorShape::Static => "static",
            AccessorShape::Instance => "instance",
        }
    }
}

impl fmt::Display for AccessorShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Declared visibility.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Visibility {
    #[default]
    Public,
    Internal,
}

impl Visibility {
    pub fn as_str(self) -> &'static str {
        match self {
            Visibility::Public => "public",
            Visibility::Internal => "internal",
        }
    }
}

/// A method parameter.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct Param {
    pub name: Name,
    pub ty: TypeRef,
}

/// A declared class, struct, interface, enum, or delegate.
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct TypeDeclaration {
    pub name: Name,
    /// Enclosing namespace, dotted.
    pub namespace: Name,
    pub kind: TypeKind,
    /// Framework-layer base type. `None` denotes a root.
    pub base: Option<TypeRef>,
    /// Implemented (or, for interfaces, required) interfaces in declaration order.
    pub interfaces: Vec<TypeRef>,
    pub visibility: Visibility,
    /// Generic parameter names, e.g. `T` in `PresentationFrameworkCollection<T>`.
    pub type_params: Vec<Name>,
    pub annotations: Vec<Annotation>,
    /// Members in declaration order.
    pub members: Vec<MemberId>,
    pub file: FileId,
}

/// A declared property, event, method, field, or enum value.
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct MemberDeclaration {
    pub owner: DeclId,
    pub name: Name,
    pub kind: MemberKind,
    /// Property/field/event type or method return type. `None` for `void`
    /// methods and enum values.
    pub ty: Option<TypeRef>,
    pub accessor: AccessorShape,
    pub params: Vec<Param>,
    /// Numeric value of an enum value.
    pub value: Option<i64>,
    pub annotations: Vec<Annotation>,
}
