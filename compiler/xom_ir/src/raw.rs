//! Declaration file records and their lowering into a [`DeclarationTable`].
//!
//! A declaration file is a JSON document:
//!
//! ```text
//! {
//!   "namespace": "Microsoft.UI.Xaml.Controls",
//!   "types": [{
//!     "name": "Frame", "kind": "class",
//!     "base": "ContentControl", "interfaces": ["INavigate"],
//!     "annotations": [{ "kind": "guid", "value": "6dd83456-8b6f-4c19-9e09-501a6de803f6" }],
//!     "members": [{ "name": "CacheSize", "kind": "property", "type": "Int32" }]
//!   }]
//! }
//! ```
//!
//! Structural problems (bad JSON, unknown type/member kinds) fail the whole
//! file at parse time. Annotation and type-expression problems are collected
//! per declaration by [`lower`] so one run reports all of them.

use std::fmt;

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{Map, Value};

use crate::table::qualify;
use crate::{
    AccessorShape, Annotation, AnnotationTag, Artifact, CodeGenLevel, CollectionKind, DeclId,
    DeclarationTable, MemberDeclaration, MemberKind, Name, Param, PlatformSpec, PropertyFlag,
    PropertyFlags, PropertyKind, StorageKind, StringInterner, TypeDeclaration, TypeKind, TypeRef,
    TypeRefError, Visibility,
};

/// One declaration file.
#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawFile {
    pub namespace: String,
    #[serde(default)]
    pub types: Vec<RawType>,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawType {
    pub name: String,
    pub kind: TypeKind,
    #[serde(default)]
    pub base: Option<String>,
    #[serde(default)]
    pub interfaces: Vec<String>,
    #[serde(default)]
    pub visibility: Visibility,
    #[serde(default)]
    pub type_params: Vec<String>,
    #[serde(default)]
    pub annotations: Vec<RawAnnotation>,
    #[serde(default)]
    pub members: Vec<RawMember>,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawMember {
    pub name: String,
    pub kind: MemberKind,
    #[serde(rename = "type", default)]
    pub ty: Option<String>,
    #[serde(default)]
    pub accessor: Option<AccessorShape>,
    #[serde(default)]
    pub params: Vec<RawParam>,
    #[serde(default)]
    pub value: Option<i64>,
    #[serde(default)]
    pub annotations: Vec<RawAnnotation>,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawParam {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: String,
}

/// An annotation before its kind is checked: a tag plus untyped parameters.
#[derive(Clone, Debug, Deserialize)]
pub struct RawAnnotation {
    pub kind: String,
    #[serde(flatten)]
    pub params: Map<String, Value>,
}

/// Parse the text of one declaration file.
pub fn parse_file(text: &str) -> Result<RawFile, serde_json::Error> {
    serde_json::from_str(text)
}

/// A problem found while lowering one declaration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LowerError {
    /// Path of the declaration file.
    pub file: String,
    /// Dotted path of the offending declaration.
    pub decl: String,
    pub kind: LowerErrorKind,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LowerErrorKind {
    /// The annotation `kind` is not one of the known tags.
    UnknownAnnotation { kind: String },
    /// The annotation parameters do not match its kind.
    MalformedAnnotation { kind: String, message: String },
    MalformedType(TypeRefError),
    InvalidIdentifier { ident: String },
}

impl fmt::Display for LowerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            LowerErrorKind::UnknownAnnotation { kind } => {
                write!(f, "unknown annotation kind `{kind}` on `{}`", self.decl)
            }
            LowerErrorKind::MalformedAnnotation { kind, message } => write!(
                f,
                "malformed `{kind}` annotation on `{}`: {message}",
                self.decl
            ),
            LowerErrorKind::MalformedType(err) => write!(f, "{err} (in `{}`)", self.decl),
            LowerErrorKind::InvalidIdentifier { ident } => {
                write!(f, "invalid identifier `{ident}` in `{}`", self.decl)
            }
        }
    }
}

/// Result of lowering: the populated table and everything that was rejected.
///
/// Rejected annotations and type expressions are dropped from the table, so
/// callers must not emit artifacts when `errors` is non-empty.
#[derive(Debug)]
pub struct Lowered {
    pub table: DeclarationTable,
    pub errors: Vec<LowerError>,
}

/// Lower parsed declaration files into a single table.
///
/// Files are processed in the order given; callers sort them by path so
/// declaration order is reproducible.
pub fn lower(sources: impl IntoIterator<Item = (String, RawFile)>) -> Lowered {
    let mut lowerer = Lowerer {
        table: DeclarationTable::new(),
        errors: Vec::new(),
        file_path: String::new(),
    };
    for (path, file) in sources {
        lowerer.lower_file(path, &file);
    }
    Lowered {
        table: lowerer.table,
        errors: lowerer.errors,
    }
}

struct Lowerer {
    table: DeclarationTable,
    errors: Vec<LowerError>,
    file_path: String,
}

impl Lowerer {
    fn error(&mut self, decl: &str, kind: LowerErrorKind) {
        self.errors.push(LowerError {
            file: self.file_path.clone(),
            decl: decl.to_owned(),
            kind,
        });
    }

    fn check_ident(&mut self, decl: &str, ident: &str) {
        if !is_identifier(ident) {
            self.error(
                decl,
                LowerErrorKind::InvalidIdentifier {
                    ident: ident.to_owned(),
                },
            );
        }
    }

    fn parse_type(&mut self, decl: &str, text: &str) -> Option<TypeRef> {
        match TypeRef::parse(text, self.table.interner_mut()) {
            Ok(ty) => Some(ty),
            Err(err) => {
                self.error(decl, LowerErrorKind::MalformedType(err));
                None
            }
        }
    }

    fn lower_annotations(&mut self, decl: &str, raw: &[RawAnnotation]) -> Vec<Annotation> {
        let mut annotations = Vec::with_capacity(raw.len());
        for annotation in raw {
            match lower_annotation(annotation, self.table.interner_mut()) {
                Ok(lowered) => annotations.push(lowered),
                Err(kind) => self.error(decl, kind),
            }
        }
        annotations
    }

    fn lower_file(&mut self, path: String, file: &RawFile) {
        self.file_path.clone_from(&path);
        let file_id = self.table.add_file(path);

        if !file.namespace.is_empty() {
            for segment in file.namespace.split('.') {
                self.check_ident(&file.namespace, segment);
            }
        }
        let namespace = self.table.intern(&file.namespace);

        for raw_type in &file.types {
            let decl_path = qualify(&file.namespace, &raw_type.name);
            self.check_ident(&decl_path, &raw_type.name);
            for param in &raw_type.type_params {
                self.check_ident(&decl_path, param);
            }

            let base = raw_type
                .base
                .as_deref()
                .and_then(|text| self.parse_type(&decl_path, text));
            let interfaces = raw_type
                .interfaces
                .iter()
                .filter_map(|text| self.parse_type(&decl_path, text))
                .collect();
            let annotations = self.lower_annotations(&decl_path, &raw_type.annotations);
            let type_params = raw_type
                .type_params
                .iter()
                .map(|p| self.table.intern(p))
                .collect();

            let decl = TypeDeclaration {
                name: self.table.intern(&raw_type.name),
                namespace,
                kind: raw_type.kind,
                base,
                interfaces,
                visibility: raw_type.visibility,
                type_params,
                annotations,
                members: Vec::new(),
                file: file_id,
            };
            let owner = self.table.add_type(decl);

            for raw_member in &raw_type.members {
                self.lower_member(owner, &decl_path, raw_member);
            }
        }
    }

    fn lower_member(&mut self, owner: DeclId, owner_path: &str, raw: &RawMember) {
        let decl_path = format!("{owner_path}.{}", raw.name);
        self.check_ident(&decl_path, &raw.name);

        let ty = raw
            .ty
            .as_deref()
            .and_then(|text| self.parse_type(&decl_path, text));
        let mut params = Vec::with_capacity(raw.params.len());
        for param in &raw.params {
            self.check_ident(&decl_path, &param.name);
            if let Some(param_ty) = self.parse_type(&decl_path, &param.ty) {
                params.push(Param {
                    name: self.table.intern(&param.name),
                    ty: param_ty,
                });
            }
        }
        let annotations = self.lower_annotations(&decl_path, &raw.annotations);

        let member = MemberDeclaration {
            owner,
            name: self.table.intern(&raw.name),
            kind: raw.kind,
            ty,
            accessor: raw.accessor.unwrap_or(raw.kind.default_accessor()),
            params,
            value: raw.value,
            annotations,
        };
        self.table.add_member(member);
    }
}

fn is_identifier(s: &str) -> bool {
    let mut bytes = s.bytes();
    bytes
        .next()
        .is_some_and(|b| b.is_ascii_alphabetic() || b == b'_')
        && bytes.all(|b| b.is_ascii_alphanumeric() || b == b'_')
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct ValueParams {
    value: String,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct CodeGenParams {
    level: CodeGenLevel,
    #[serde(default)]
    partial: bool,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct TargetParams {
    target: Artifact,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct StorageParams {
    storage: StorageKind,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct OffsetParams {
    field: String,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct EmptyParams {}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct PlatformParams {
    contract: String,
    version: u32,
    #[serde(default)]
    until: Option<u32>,
    #[serde(default)]
    type_version: Option<u32>,
    #[serde(default)]
    feature: Option<String>,
    #[serde(default)]
    rename: Option<String>,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct VersionParams {
    index: u32,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct TypeParams {
    #[serde(rename = "type")]
    ty: String,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct CollectionParams {
    collection: CollectionKind,
    element: String,
    #[serde(default)]
    key: Option<String>,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct PropertyParams {
    property: String,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct MessageParams {
    #[serde(default)]
    message: String,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct TextParams {
    text: String,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct PropertyKindParams {
    value: PropertyKind,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct FlagsParams {
    flags: Vec<PropertyFlag>,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct RenderDirtyParams {
    method: String,
    #[serde(default)]
    class: Option<String>,
}

fn lower_annotation(
    raw: &RawAnnotation,
    interner: &mut StringInterner,
) -> Result<Annotation, LowerErrorKind> {
    let Some(tag) = AnnotationTag::from_kind(&raw.kind) else {
        return Err(LowerErrorKind::UnknownAnnotation {
            kind: raw.kind.clone(),
        });
    };

    fn params<T: DeserializeOwned>(raw: &RawAnnotation) -> Result<T, LowerErrorKind> {
        serde_json::from_value(Value::Object(raw.params.clone())).map_err(|err| {
            LowerErrorKind::MalformedAnnotation {
                kind: raw.kind.clone(),
                message: err.to_string(),
            }
        })
    }

    let annotation = match tag {
        AnnotationTag::Guid => {
            let p: ValueParams = params(raw)?;
            Annotation::Guid(interner.intern(&p.value))
        }
        AnnotationTag::CodeGen => {
            let p: CodeGenParams = params(raw)?;
            Annotation::CodeGen {
                level: p.level,
                partial: p.partial,
            }
        }
        AnnotationTag::Exclude => Annotation::Exclude(params::<TargetParams>(raw)?.target),
        AnnotationTag::ForceInclude => {
            Annotation::ForceInclude(params::<TargetParams>(raw)?.target)
        }
        AnnotationTag::Storage => Annotation::Storage(params::<StorageParams>(raw)?.storage),
        AnnotationTag::Offset => {
            let p: OffsetParams = params(raw)?;
            Annotation::Offset(interner.intern(&p.field))
        }
        AnnotationTag::FieldBacked => {
            params::<EmptyParams>(raw)?;
            Annotation::FieldBacked
        }
        AnnotationTag::ReadOnly => {
            params::<EmptyParams>(raw)?;
            Annotation::ReadOnly
        }
        AnnotationTag::Attached => {
            params::<EmptyParams>(raw)?;
            Annotation::Attached
        }
        AnnotationTag::Platform => {
            let p: PlatformParams = params(raw)?;
            let intern_opt =
                |interner: &mut StringInterner, s: Option<String>| -> Option<Name> {
                    s.map(|s| interner.intern(&s))
                };
            Annotation::Platform(PlatformSpec {
                contract: interner.intern(&p.contract),
                version: p.version,
                until: p.until,
                type_version: p.type_version,
                feature: intern_opt(interner, p.feature),
                rename: intern_opt(interner, p.rename),
            })
        }
        AnnotationTag::Version => Annotation::Version(params::<VersionParams>(raw)?.index),
        AnnotationTag::CoreBase => {
            let p: TypeParams = params(raw)?;
            let ty = TypeRef::parse(&p.ty, interner).map_err(LowerErrorKind::MalformedType)?;
            Annotation::CoreBase(ty)
        }
        AnnotationTag::Collection => {
            let p: CollectionParams = params(raw)?;
            if p.collection.is_map() != p.key.is_some() {
                return Err(LowerErrorKind::MalformedAnnotation {
                    kind: raw.kind.clone(),
                    message: if p.collection.is_map() {
                        "map collections require a `key` type".to_owned()
                    } else {
                        "only map collections take a `key` type".to_owned()
                    },
                });
            }
            let element =
                TypeRef::parse(&p.element, interner).map_err(LowerErrorKind::MalformedType)?;
            let key = match p.key {
                Some(key) => {
                    Some(TypeRef::parse(&key, interner).map_err(LowerErrorKind::MalformedType)?)
                }
                None => None,
            };
            Annotation::Collection {
                kind: p.collection,
                element,
                key,
            }
        }
        AnnotationTag::ProjectionName => {
            Annotation::ProjectionName(interner.intern(&params::<ValueParams>(raw)?.value))
        }
        AnnotationTag::OverloadName => {
            Annotation::OverloadName(interner.intern(&params::<ValueParams>(raw)?.value))
        }
        AnnotationTag::NativeName => {
            Annotation::NativeName(interner.intern(&params::<ValueParams>(raw)?.value))
        }
        AnnotationTag::ContentProperty => {
            Annotation::ContentProperty(interner.intern(&params::<PropertyParams>(raw)?.property))
        }
        AnnotationTag::Deprecated => Annotation::Deprecated(params::<MessageParams>(raw)?.message),
        AnnotationTag::Comment => Annotation::Comment(params::<TextParams>(raw)?.text),
        AnnotationTag::PropertyKind => {
            Annotation::PropertyKind(params::<PropertyKindParams>(raw)?.value)
        }
        AnnotationTag::IdlGroup => {
            Annotation::IdlGroup(interner.intern(&params::<ValueParams>(raw)?.value))
        }
        AnnotationTag::PropertyFlags => {
            let p: FlagsParams = params(raw)?;
            let flags = p
                .flags
                .into_iter()
                .fold(PropertyFlags::empty(), |acc, flag| acc | flag.flag());
            Annotation::PropertyFlags(flags)
        }
        AnnotationTag::RenderDirty => {
            let p: RenderDirtyParams = params(raw)?;
            Annotation::RenderDirty {
                method: interner.intern(&p.method),
                class: p.class.map(|class| interner.intern(&class)),
            }
        }
    };
    Ok(annotation)
}
