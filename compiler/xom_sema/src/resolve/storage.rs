//! Storage kinds and the declared-type families they bind to.

use xom_ir::{DeclarationTable, StorageKind, TypeKind};

use crate::graph::{Primitive, ResolvedType, TypeGraph, TypeHead};

/// The storage kind a property or field of type `ty` gets when none is
/// written. `None` when the type failed to resolve.
pub(crate) fn infer(ty: ResolvedType, graph: &TypeGraph, table: &DeclarationTable) -> Option<StorageKind> {
    if ty.nullable {
        return Some(StorageKind::Object);
    }
    let kind = match ty.head {
        TypeHead::Primitive(p) => match p {
            Primitive::Boolean => StorageKind::Bool,
            Primitive::Single => StorageKind::Float,
            Primitive::Double => StorageKind::Double,
            Primitive::String => StorageKind::String,
            Primitive::Object => StorageKind::Object,
            Primitive::TypeName => StorageKind::TypeHandle,
            Primitive::Char16 => StorageKind::Unsigned,
            p if p.is_signed() => StorageKind::Signed,
            p if p.is_unsigned() => StorageKind::Unsigned,
            _ => StorageKind::ValueObject,
        },
        TypeHead::Declared(id) => match graph.node(id).kind {
            TypeKind::Enum => StorageKind::Enum,
            TypeKind::Struct => struct_storage(table.name(table.ty(id.decl()).name)),
            TypeKind::Class | TypeKind::Interface | TypeKind::Delegate => StorageKind::Object,
        },
        TypeHead::Instance(_) => StorageKind::Object,
        TypeHead::Param { .. } => StorageKind::Any,
        TypeHead::Error => return None,
    };
    Some(kind)
}

/// Well-known geometry structs have dedicated storage.
fn struct_storage(name: &str) -> StorageKind {
    match name {
        "Point" => StorageKind::Point,
        "Size" => StorageKind::Size,
        "Rect" => StorageKind::Rect,
        "Thickness" => StorageKind::Thickness,
        "CornerRadius" => StorageKind::CornerRadius,
        "Color" => StorageKind::Color,
        "GridLength" => StorageKind::GridLength,
        _ => StorageKind::ValueObject,
    }
}

/// Whether `storage` can hold a value of type `ty`.
pub(crate) fn accepts(storage: StorageKind, ty: ResolvedType, graph: &TypeGraph) -> bool {
    if storage == StorageKind::Any || ty.is_error() {
        return true;
    }
    if ty.nullable {
        return storage == StorageKind::Object;
    }
    let declared = match ty.head {
        TypeHead::Declared(id) => Some(graph.node(id).kind),
        _ => None,
    };
    let primitive = match ty.head {
        TypeHead::Primitive(p) => Some(p),
        _ => None,
    };

    match storage {
        StorageKind::Bool => primitive == Some(Primitive::Boolean),
        StorageKind::Float | StorageKind::Double => {
            matches!(primitive, Some(Primitive::Single | Primitive::Double))
        }
        StorageKind::Signed => primitive.is_some_and(Primitive::is_signed),
        StorageKind::Unsigned => primitive.is_some_and(|p| p.is_unsigned() || p == Primitive::Char16),
        StorageKind::String => primitive == Some(Primitive::String),
        StorageKind::Enum => declared == Some(TypeKind::Enum),
        StorageKind::Object => match ty.head {
            TypeHead::Primitive(p) => p == Primitive::Object,
            TypeHead::Declared(_) => declared.is_some_and(TypeKind::is_reference),
            TypeHead::Instance(_) | TypeHead::Param { .. } => true,
            TypeHead::Error => true,
        },
        StorageKind::ValueObject => {
            declared == Some(TypeKind::Struct) || primitive.is_some_and(Primitive::is_value_object)
        }
        StorageKind::Point
        | StorageKind::Size
        | StorageKind::Rect
        | StorageKind::Thickness
        | StorageKind::CornerRadius
        | StorageKind::Color
        | StorageKind::GridLength => declared == Some(TypeKind::Struct),
        StorageKind::TypeHandle => primitive == Some(Primitive::TypeName),
        StorageKind::Any => true,
    }
}

/// Human description of the family `storage` requires, for diagnostics.
pub(crate) fn family(storage: StorageKind) -> &'static str {
    match storage {
        StorageKind::Bool => "Boolean",
        StorageKind::Float | StorageKind::Double => "Single or Double",
        StorageKind::Signed => "a signed integer type",
        StorageKind::Unsigned => "an unsigned integer type",
        StorageKind::String => "String",
        StorageKind::Enum => "an enum type",
        StorageKind::Object => "a reference type",
        StorageKind::ValueObject
        | StorageKind::Point
        | StorageKind::Size
        | StorageKind::Rect
        | StorageKind::Thickness
        | StorageKind::CornerRadius
        | StorageKind::Color
        | StorageKind::GridLength => "a struct type",
        StorageKind::TypeHandle => "TypeName",
        StorageKind::Any => "any type",
    }
}
