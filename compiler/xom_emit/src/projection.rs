//! Projection wrapper emitter: the managed surface of each type.

use serde::Serialize;
use xom_ir::{AccessorShape, Artifact, DeclId, MemberId, MemberKind, PropertyKind, TypeKind};
use xom_sema::TypeId;

use crate::{params_text, EmitContext, Emitter, ParamRecord, TextWriter};

pub struct ProjectionEmitter;

#[derive(Clone, Eq, PartialEq, Debug, Serialize)]
pub struct ProjectionType {
    pub name: String,
    pub kind: TypeKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base: Option<String>,
    /// The wrapper is completed by hand.
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub partial: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_property: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deprecated: Option<String>,
    pub members: Vec<ProjectionMember>,
}

#[derive(Clone, Eq, PartialEq, Debug, Serialize)]
pub struct ProjectionMember {
    /// Name on the projected surface.
    pub name: String,
    /// Declared name, when renamed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub declared_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub overload_name: Option<String>,
    pub kind: MemberKind,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub ty: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub accessor: Option<AccessorShape>,
    /// Set when the property is not both a property and a dependency property.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub property_kind: Option<PropertyKind>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub params: Vec<ParamRecord>,
    /// Collection interface a collection property projects as.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub collection: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deprecated: Option<String>,
}

impl ProjectionEmitter {
    fn type_record(cx: &EmitContext<'_>, id: DeclId) -> ProjectionType {
        let decl = cx.table.ty(id);
        let shape = cx.analysis.shapes.ty(id);
        let node = cx.analysis.graph.node(TypeId::from_decl(id));
        ProjectionType {
            name: cx.fqn(id),
            kind: decl.kind,
            base: node.base.map(|base| cx.fqn(base.decl())),
            partial: shape.partial,
            content_property: shape.content_property.map(|n| cx.name(n).to_owned()),
            deprecated: shape.deprecated.clone(),
            members: cx
                .members_in(id, Artifact::Projection)
                .map(|member| Self::member_record(cx, member))
                .collect(),
        }
    }

    fn member_record(cx: &EmitContext<'_>, id: MemberId) -> ProjectionMember {
        let member = cx.table.member(id);
        let shape = cx.analysis.shapes.member(id);
        let resolved = cx.analysis.graph.member(id);
        let declared = cx.name(member.name);
        let name = shape.projection_name.map_or(declared, |n| cx.name(n));

        let collection = match (shape.collection, resolved.collection) {
            (Some(kind), Some((element, key))) => Some(match key {
                Some(key) => format!(
                    "{}<{}, {}>",
                    kind.generic_name(),
                    cx.type_text(key),
                    cx.type_text(element)
                ),
                None => format!("{}<{}>", kind.generic_name(), cx.type_text(element)),
            }),
            _ => None,
        };

        ProjectionMember {
            name: name.to_owned(),
            declared_name: (name != declared).then(|| declared.to_owned()),
            overload_name: shape.overload_name.map(|n| cx.name(n).to_owned()),
            kind: member.kind,
            ty: resolved.ty.map(|ty| cx.type_text(ty)),
            accessor: match member.kind {
                MemberKind::Property | MemberKind::Field => shape.accessor,
                _ => None,
            },
            property_kind: (shape.property_kind != PropertyKind::Both).then_some(shape.property_kind),
            params: ParamRecord::all(id, cx),
            collection,
            deprecated: shape.deprecated.clone(),
        }
    }
}

impl Emitter for ProjectionEmitter {
    type Record = ProjectionType;

    const ARTIFACT: Artifact = Artifact::Projection;

    fn records(&self, cx: &EmitContext<'_>) -> Vec<ProjectionType> {
        cx.types_in(Artifact::Projection)
            .map(|id| Self::type_record(cx, id))
            .collect()
    }

    fn render_text(&self, records: &[ProjectionType], out: &mut TextWriter) {
        for (i, ty) in records.iter().enumerate() {
            if i > 0 {
                out.blank();
            }
            let mut header = format!("{} {}", ty.kind, ty.name);
            if let Some(base) = &ty.base {
                header.push_str(" : ");
                header.push_str(base);
            }
            if ty.partial {
                header.push_str(" partial");
            }
            out.line(&header);
            out.indent();
            if let Some(property) = &ty.content_property {
                out.line(&format!("content {property}"));
            }
            if let Some(message) = &ty.deprecated {
                out.line(&format!("deprecated {message:?}"));
            }
            for member in &ty.members {
                out.line(&member_line(member));
                if let Some(message) = &member.deprecated {
                    out.indent();
                    out.line(&format!("deprecated {message:?}"));
                    out.dedent();
                }
            }
            out.dedent();
        }
    }
}

fn member_line(member: &ProjectionMember) -> String {
    let mut line = format!("{} {}", member.kind, member.name);
    if member.kind == MemberKind::Method {
        line.push_str(&format!("({})", params_text(&member.params)));
    }
    if let Some(ty) = &member.ty {
        line.push_str(": ");
        line.push_str(ty);
    }
    if let Some(accessor) = member.accessor {
        line.push_str(&format!(" [{accessor}]"));
    }
    if let Some(kind) = member.property_kind {
        line.push_str(&format!(" {kind}"));
    }
    if let Some(declared) = &member.declared_name {
        line.push_str(&format!(" from {declared}"));
    }
    if let Some(overload) = &member.overload_name {
        line.push_str(&format!(" overload {overload}"));
    }
    if let Some(collection) = &member.collection {
        line.push_str(&format!(" as {collection}"));
    }
    line
}
