//! Declaration-level IR for the xom object-model generator.
//!
//! Everything downstream of the front-end works on the types defined here:
//!
//! ```text
//! declaration files (*.xom.json)
//!     │  raw::lower
//!     ▼
//! DeclarationTable ── TypeDeclaration ── MemberDeclaration
//!                         │                  │
//!                         └── Annotation ────┘
//! ```
//!
//! The table owns every declaration for the lifetime of one generation run.
//! Later stages (`xom_sema`, `xom_emit`) address declarations through the
//! `DeclId` / `MemberId` arena handles and never mutate the table.

mod annotation;
mod artifact;
mod decl;
mod interner;
mod name;
pub mod raw;
mod table;
mod type_ref;

pub use annotation::{
    Annotation, AnnotationTag, CodeGenLevel, CollectionKind, DeclTarget, PlatformSpec,
    PropertyFlag, PropertyFlags, PropertyKind, StorageKind,
};
pub use artifact::{Artifact, ArtifactSet};
pub use decl::{
    AccessorShape, DeclId, FileId, MemberDeclaration, MemberId, MemberKind, Param, TypeDeclaration,
    TypeKind, Visibility,
};
pub use interner::StringInterner;
pub use name::Name;
pub use table::DeclarationTable;
pub use type_ref::{TypeRef, TypeRefError};
