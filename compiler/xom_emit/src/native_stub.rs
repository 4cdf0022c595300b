//! Native stub emitter: engine-side classes and their storage bindings.

use serde::Serialize;
use xom_ir::{Artifact, CodeGenLevel, DeclId, MemberId, MemberKind, StorageKind, TypeKind};
use xom_sema::TypeId;

use crate::{EmitContext, Emitter, TextWriter};

pub struct NativeStubEmitter;

#[derive(Clone, Eq, PartialEq, Debug, Serialize)]
pub struct NativeType {
    pub name: String,
    pub kind: TypeKind,
    pub native_name: String,
    /// Native class of the core-layer base.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub core_base: Option<String>,
    /// Only a type-table entry is generated.
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub lookup_only: bool,
    pub members: Vec<NativeMember>,
}

#[derive(Clone, Eq, PartialEq, Debug, Serialize)]
pub struct NativeMember {
    pub name: String,
    pub kind: MemberKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub storage: Option<StorageKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offset: Option<String>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub field_backed: bool,
    /// Native name of an enum value.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub native_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<i64>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub flags: Vec<String>,
    /// `Class::Method` called when the property changes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub render_dirty: Option<String>,
}

/// `native_name`, or the type name prefixed with `C`.
fn native_type_name(cx: &EmitContext<'_>, id: DeclId) -> String {
    match cx.analysis.shapes.ty(id).native_name {
        Some(name) => cx.name(name).to_owned(),
        None => format!("C{}", cx.name(cx.table.ty(id).name)),
    }
}

impl NativeStubEmitter {
    fn type_record(cx: &EmitContext<'_>, id: DeclId) -> NativeType {
        let decl = cx.table.ty(id);
        let shape = cx.analysis.shapes.ty(id);
        let node = cx.analysis.graph.node(TypeId::from_decl(id));
        NativeType {
            name: cx.fqn(id),
            kind: decl.kind,
            native_name: native_type_name(cx, id),
            core_base: node
                .core_layer_base()
                .map(|base| native_type_name(cx, base.decl())),
            lookup_only: shape.level == Some(CodeGenLevel::LookupOnly),
            members: cx
                .members_in(id, Artifact::NativeStub)
                .map(|member| Self::member_record(cx, id, member))
                .collect(),
        }
    }

    fn member_record(cx: &EmitContext<'_>, owner: DeclId, id: MemberId) -> NativeMember {
        let member = cx.table.member(id);
        let shape = cx.analysis.shapes.member(id);
        let native_name = (member.kind == MemberKind::EnumValue).then(|| match shape.native_name {
            Some(name) => cx.name(name).to_owned(),
            None => format!(
                "{}_{}",
                cx.name(cx.table.ty(owner).name),
                cx.name(member.name)
            ),
        });
        let render_dirty = shape.render_dirty.map(|dirty| {
            let class = match dirty.class {
                Some(class) => cx.name(class).to_owned(),
                None => native_type_name(cx, owner),
            };
            format!("{class}::{}", cx.name(dirty.method))
        });
        NativeMember {
            name: cx.name(member.name).to_owned(),
            kind: member.kind,
            storage: shape.storage,
            offset: shape.offset.map(|n| cx.name(n).to_owned()),
            field_backed: shape.field_backed,
            native_name,
            value: member.value,
            flags: shape.property_flags.names().map(str::to_owned).collect(),
            render_dirty,
        }
    }
}

impl Emitter for NativeStubEmitter {
    type Record = NativeType;

    const ARTIFACT: Artifact = Artifact::NativeStub;

    fn records(&self, cx: &EmitContext<'_>) -> Vec<NativeType> {
        cx.types_in(Artifact::NativeStub)
            .map(|id| Self::type_record(cx, id))
            .collect()
    }

    fn render_text(&self, records: &[NativeType], out: &mut TextWriter) {
        for (i, ty) in records.iter().enumerate() {
            if i > 0 {
                out.blank();
            }
            let mut header = format!("{} {} -> {}", ty.kind, ty.name, ty.native_name);
            if let Some(base) = &ty.core_base {
                header.push_str(" : ");
                header.push_str(base);
            }
            if ty.lookup_only {
                header.push_str(" lookup_only");
            }
            out.line(&header);
            out.indent();
            for member in &ty.members {
                let mut line = format!("{} {}", member.kind, member.name);
                if let Some(storage) = member.storage {
                    line.push_str(&format!(" storage={storage}"));
                }
                if let Some(offset) = &member.offset {
                    line.push_str(&format!(" offset={offset}"));
                }
                if member.field_backed {
                    line.push_str(" field_backed");
                }
                if let Some(native) = &member.native_name {
                    line.push_str(&format!(" native={native}"));
                }
                if !member.flags.is_empty() {
                    line.push_str(&format!(" flags={}", member.flags.join("|")));
                }
                if let Some(dirty) = &member.render_dirty {
                    line.push_str(&format!(" dirty={dirty}"));
                }
                if let Some(value) = member.value {
                    line.push_str(&format!(" = {value}"));
                }
                out.line(&line);
            }
            out.dedent();
        }
    }
}
