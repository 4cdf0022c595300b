//! Builtin types every declaration file can reference without declaring.

use std::fmt;

/// Builtin scalar and reference types.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug)]
pub enum Primitive {
    Boolean,
    Char16,
    Int8,
    Int16,
    Int32,
    Int64,
    UInt8,
    UInt16,
    UInt32,
    UInt64,
    Single,
    Double,
    String,
    Object,
    Guid,
    DateTime,
    TimeSpan,
    TypeName,
}

impl Primitive {
    const ALL: [Primitive; 18] = [
        Primitive::Boolean,
        Primitive::Char16,
        Primitive::Int8,
        Primitive::Int16,
        Primitive::Int32,
        Primitive::Int64,
        Primitive::UInt8,
        Primitive::UInt16,
        Primitive::UInt32,
        Primitive::UInt64,
        Primitive::Single,
        Primitive::Double,
        Primitive::String,
        Primitive::Object,
        Primitive::Guid,
        Primitive::DateTime,
        Primitive::TimeSpan,
        Primitive::TypeName,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Primitive::Boolean => "Boolean",
            Primitive::Char16 => "Char16",
            Primitive::Int8 => "Int8",
            Primitive::Int16 => "Int16",
            Primitive::Int32 => "Int32",
            Primitive::Int64 => "Int64",
            Primitive::UInt8 => "UInt8",
            Primitive::UInt16 => "UInt16",
            Primitive::UInt32 => "UInt32",
            Primitive::UInt64 => "UInt64",
            Primitive::Single => "Single",
            Primitive::Double => "Double",
            Primitive::String => "String",
            Primitive::Object => "Object",
            Primitive::Guid => "Guid",
            Primitive::DateTime => "DateTime",
            Primitive::TimeSpan => "TimeSpan",
            Primitive::TypeName => "TypeName",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.as_str() == name)
    }

    pub fn is_signed(self) -> bool {
        matches!(
            self,
            Primitive::Int8 | Primitive::Int16 | Primitive::Int32 | Primitive::Int64
        )
    }

    pub fn is_unsigned(self) -> bool {
        matches!(
            self,
            Primitive::UInt8 | Primitive::UInt16 | Primitive::UInt32 | Primitive::UInt64
        )
    }

    /// Value types stored out of line as boxed values.
    pub fn is_value_object(self) -> bool {
        matches!(
            self,
            Primitive::Guid | Primitive::DateTime | Primitive::TimeSpan
        )
    }
}

impl fmt::Display for Primitive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Builtin generic interfaces.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug)]
pub enum BuiltinGeneric {
    Vector,
    VectorView,
    Iterable,
    Map,
    MapView,
    Reference,
}

impl BuiltinGeneric {
    const ALL: [BuiltinGeneric; 6] = [
        BuiltinGeneric::Vector,
        BuiltinGeneric::VectorView,
        BuiltinGeneric::Iterable,
        BuiltinGeneric::Map,
        BuiltinGeneric::MapView,
        BuiltinGeneric::Reference,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            BuiltinGeneric::Vector => "IVector",
            BuiltinGeneric::VectorView => "IVectorView",
            BuiltinGeneric::Iterable => "IIterable",
            BuiltinGeneric::Map => "IMap",
            BuiltinGeneric::MapView => "IMapView",
            BuiltinGeneric::Reference => "IReference",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|g| g.as_str() == name)
    }

    /// Number of type arguments.
    pub fn arity(self) -> usize {
        match self {
            BuiltinGeneric::Map | BuiltinGeneric::MapView => 2,
            BuiltinGeneric::Vector
            | BuiltinGeneric::VectorView
            | BuiltinGeneric::Iterable
            | BuiltinGeneric::Reference => 1,
        }
    }
}

impl fmt::Display for BuiltinGeneric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
