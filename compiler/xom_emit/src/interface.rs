//! Interface description emitter.
//!
//! Members are split into versioned interfaces by the type version they were
//! introduced in: a class `Foo` gets `IFoo`, `IFoo2`, ...; an interface
//! `IBar` gets `IBar`, `IBar2`, ...

use serde::Serialize;
use xom_ir::{AccessorShape, Artifact, DeclId, MemberId, MemberKind, TypeKind};
use xom_sema::{GenericHead, TypeHead, TypeId};

use crate::{params_text, EmitContext, Emitter, GateRecord, ParamRecord, TextWriter};

pub struct InterfaceEmitter;

#[derive(Clone, Eq, PartialEq, Debug, Serialize)]
pub struct InterfaceType {
    pub name: String,
    pub kind: TypeKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub guid: Option<String>,
    /// Interface file group the type is written to.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub idl_group: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub type_params: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base: Option<String>,
    pub interfaces: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deprecated: Option<String>,
    pub platforms: Vec<GateRecord>,
    /// Member names reachable through several interfaces.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub conflicts: Vec<ConflictRecord>,
    pub groups: Vec<InterfaceGroup>,
}

#[derive(Clone, Eq, PartialEq, Debug, Serialize)]
pub struct ConflictRecord {
    pub member: String,
    pub interfaces: Vec<String>,
}

/// One versioned interface of a type.
#[derive(Clone, Eq, PartialEq, Debug, Serialize)]
pub struct InterfaceGroup {
    pub name: String,
    /// Type version index.
    pub version: u32,
    pub contract: String,
    /// First contract version the group ships in.
    pub introduced: u32,
    pub members: Vec<InterfaceMember>,
}

#[derive(Clone, Eq, PartialEq, Debug, Serialize)]
pub struct InterfaceMember {
    pub name: String,
    pub kind: MemberKind,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub ty: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub accessor: Option<AccessorShape>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub params: Vec<ParamRecord>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<i64>,
    /// Needs an explicit interface-qualified name.
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub explicit: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deprecated: Option<String>,
    pub platforms: Vec<GateRecord>,
}

fn group_name(kind: TypeKind, name: &str, version: u32) -> String {
    let base = if kind == TypeKind::Class {
        format!("I{name}")
    } else {
        name.to_owned()
    };
    if version <= 1 {
        base
    } else {
        format!("{base}{version}")
    }
}

impl InterfaceEmitter {
    fn type_record(cx: &EmitContext<'_>, id: DeclId) -> InterfaceType {
        let table = cx.table;
        let analysis = cx.analysis;
        let decl = table.ty(id);
        let shape = analysis.shapes.ty(id);
        let node = analysis.graph.node(TypeId::from_decl(id));

        let visible = |target: TypeId| analysis.shapes.ty(target.decl()).is_visible_in(Artifact::Interface);
        let interfaces = node
            .interfaces
            .iter()
            .filter(|iface| match iface.head {
                TypeHead::Declared(target) => visible(target),
                TypeHead::Instance(inst) => match analysis.graph.instantiation(inst).generic {
                    GenericHead::Declared(target) => visible(target),
                    GenericHead::Builtin(_) => true,
                },
                TypeHead::Primitive(_) | TypeHead::Param { .. } | TypeHead::Error => false,
            })
            .map(|iface| cx.type_text(*iface))
            .collect();

        let conflicts: Vec<ConflictRecord> = analysis
            .graph
            .conflicts_for(TypeId::from_decl(id))
            .map(|c| ConflictRecord {
                member: cx.name(c.name).to_owned(),
                interfaces: c.interfaces.iter().map(|i| cx.fqn(i.decl())).collect(),
            })
            .collect();

        let mut groups: Vec<InterfaceGroup> = Vec::new();
        for member in cx.members_in(id, Artifact::Interface) {
            let version = cx.member_gate(member).version_index().unwrap_or(1);
            let record = Self::member_record(cx, member, &conflicts);
            match groups.iter_mut().find(|g| g.version == version) {
                Some(group) => group.members.push(record),
                None => {
                    let entry = analysis.gates.type_version(id, version);
                    groups.push(InterfaceGroup {
                        name: group_name(decl.kind, cx.name(decl.name), version),
                        version,
                        contract: entry.map(|v| v.platform.to_string()).unwrap_or_default(),
                        introduced: entry.map_or(0, |v| v.range.start),
                        members: vec![record],
                    });
                }
            }
        }
        groups.sort_by_key(|g| g.version);

        InterfaceType {
            name: cx.fqn(id),
            kind: decl.kind,
            guid: analysis.identities.guid_of(id).map(str::to_owned),
            idl_group: shape.idl_group.map(|group| cx.name(group).to_owned()),
            type_params: decl.type_params.iter().map(|p| cx.name(*p).to_owned()).collect(),
            base: node.base.map(|base| cx.fqn(base.decl())),
            interfaces,
            deprecated: shape.deprecated.clone(),
            platforms: GateRecord::all(cx.type_gate(id), cx),
            conflicts,
            groups,
        }
    }

    fn member_record(
        cx: &EmitContext<'_>,
        id: MemberId,
        conflicts: &[ConflictRecord],
    ) -> InterfaceMember {
        let member = cx.table.member(id);
        let shape = cx.analysis.shapes.member(id);
        let name = cx.name(member.name);
        InterfaceMember {
            name: name.to_owned(),
            kind: member.kind,
            ty: cx.analysis.graph.member(id).ty.map(|ty| cx.type_text(ty)),
            accessor: match member.kind {
                MemberKind::Property => shape.accessor,
                _ => None,
            },
            params: ParamRecord::all(id, cx),
            value: member.value,
            explicit: conflicts.iter().any(|c| c.member == name),
            deprecated: shape.deprecated.clone(),
            platforms: GateRecord::all(cx.member_gate(id), cx),
        }
    }
}

impl Emitter for InterfaceEmitter {
    type Record = InterfaceType;

    const ARTIFACT: Artifact = Artifact::Interface;

    fn records(&self, cx: &EmitContext<'_>) -> Vec<InterfaceType> {
        cx.types_in(Artifact::Interface)
            .map(|id| Self::type_record(cx, id))
            .collect()
    }

    fn render_text(&self, records: &[InterfaceType], out: &mut TextWriter) {
        for (i, ty) in records.iter().enumerate() {
            if i > 0 {
                out.blank();
            }
            let mut header = format!("{} {}", ty.kind, ty.name);
            if !ty.type_params.is_empty() {
                header.push_str(&format!("<{}>", ty.type_params.join(", ")));
            }
            out.line(&header);
            out.indent();
            if let Some(guid) = &ty.guid {
                out.line(&format!("guid {guid}"));
            }
            if let Some(group) = &ty.idl_group {
                out.line(&format!("idl_group {group}"));
            }
            if let Some(base) = &ty.base {
                out.line(&format!("base {base}"));
            }
            for iface in &ty.interfaces {
                out.line(&format!("implements {iface}"));
            }
            if let Some(message) = &ty.deprecated {
                out.line(&format!("deprecated {message:?}"));
            }
            for gate in &ty.platforms {
                out.line(&gate.text());
            }
            for conflict in &ty.conflicts {
                out.line(&format!(
                    "conflict {} in {}",
                    conflict.member,
                    conflict.interfaces.join(", ")
                ));
            }
            for group in &ty.groups {
                out.line(&format!(
                    "interface {} version {} ({} {})",
                    group.name, group.version, group.contract, group.introduced
                ));
                out.indent();
                for member in &group.members {
                    render_member(member, out);
                }
                out.dedent();
            }
            out.dedent();
        }
    }
}

fn render_member(member: &InterfaceMember, out: &mut TextWriter) {
    let mut line = format!("{} {}", member.kind, member.name);
    if member.kind == MemberKind::Method {
        line.push_str(&format!("({})", params_text(&member.params)));
    }
    if let Some(ty) = &member.ty {
        line.push_str(": ");
        line.push_str(ty);
    }
    if let Some(value) = member.value {
        line.push_str(&format!(" = {value}"));
    }
    if let Some(accessor) = member.accessor {
        line.push_str(&format!(" [{accessor}]"));
    }
    if member.explicit {
        line.push_str(" explicit");
    }
    out.line(&line);
    out.indent();
    if let Some(message) = &member.deprecated {
        out.line(&format!("deprecated {message:?}"));
    }
    for gate in &member.platforms {
        out.line(&gate.text());
    }
    out.dedent();
}
