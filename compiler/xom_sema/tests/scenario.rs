//! End-to-end analysis of small declaration sets.

use pretty_assertions::assert_eq;
use xom_diagnostic::{ErrorCode, ErrorKind};
use xom_ir::raw::{lower, parse_file};
use xom_ir::{AccessorShape, ArtifactSet, DeclarationTable, StorageKind};
use xom_sema::{analyze, AnalysisOptions, TypeId};

fn load(text: &str) -> DeclarationTable {
    let file = match parse_file(text) {
        Ok(file) => file,
        Err(err) => panic!("fixture does not parse: {err}"),
    };
    let lowered = lower([("scenario.xom.json".to_owned(), file)]);
    assert!(lowered.errors.is_empty(), "{:?}", lowered.errors);
    lowered.table
}

fn foo_bar_ibaz(foo_guid: Option<&str>) -> String {
    let guid = foo_guid
        .map(|g| format!(r#"{{ "kind": "guid", "value": "{g}" }}"#))
        .unwrap_or_default();
    format!(
        r#"{{ "namespace": "Demo", "types": [
            {{ "name": "IBaz", "kind": "interface",
               "annotations": [{{ "kind": "guid", "value": "1c9f3b2e-6a0d-4d8e-9f21-7b5c4e3a2d10" }}],
               "members": [{{ "name": "Bar", "kind": "property", "type": "Boolean" }}] }},
            {{ "name": "Foo", "kind": "class", "interfaces": ["IBaz"],
               "annotations": [{guid}],
               "members": [{{ "name": "Bar", "kind": "property", "type": "Boolean",
                              "annotations": [{{ "kind": "storage", "storage": "bool" }}] }}] }}
        ] }}"#
    )
}

fn find_type(table: &DeclarationTable, fqn: &str) -> xom_ir::DeclId {
    match table.types().find(|(id, _)| table.qualified_name(*id) == fqn) {
        Some((id, _)) => id,
        None => panic!("no type {fqn}"),
    }
}

#[test]
fn foo_with_guid_analyzes_cleanly() {
    let table = load(&foo_bar_ibaz(Some("5e1a0c3b-2f4d-4b6a-8c9e-0d1f2a3b4c5d")));
    for parallel in [false, true] {
        let options = AnalysisOptions {
            parallel,
            ..AnalysisOptions::default()
        };
        let (analysis, diagnostics) = analyze(&table, &options);
        assert_eq!(diagnostics, vec![]);

        let foo = find_type(&table, "Demo.Foo");
        let ibaz = find_type(&table, "Demo.IBaz");
        let node = analysis.graph.node(TypeId::from_decl(foo));
        assert_eq!(node.base, None);
        assert_eq!(node.interfaces.len(), 1);
        assert_eq!(node.interfaces[0].declared(), Some(TypeId::from_decl(ibaz)));

        let bar = table.ty(foo).members[0];
        let shape = analysis.shapes.member(bar);
        assert_eq!(shape.artifacts, ArtifactSet::all());
        assert_eq!(shape.storage, Some(StorageKind::Bool));
        assert_eq!(shape.accessor, Some(AccessorShape::GetSet));
        assert_eq!(analysis.identities.len(), 2);
    }
}

#[test]
fn foo_without_guid_fails_identity() {
    let table = load(&foo_bar_ibaz(None));
    let (_, diagnostics) = analyze(&table, &AnalysisOptions::default());
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].code, ErrorCode::E4001);
    assert_eq!(diagnostics[0].kind(), ErrorKind::IdentityValidationFailed);
    assert_eq!(diagnostics[0].primary_decl(), Some("Demo.Foo"));
}

#[test]
fn errors_from_every_stage_accumulate() {
    let table = load(
        r#"{ "namespace": "Demo", "types": [
            { "name": "Loop", "kind": "class", "base": "Loop",
              "annotations": [{ "kind": "guid", "value": "5e1a0c3b-2f4d-4b6a-8c9e-0d1f2a3b4c5d" }],
              "members": [
                { "name": "Text", "kind": "property", "type": "String",
                  "annotations": [{ "kind": "storage", "storage": "bool" }] },
                { "name": "Size", "kind": "property", "type": "Double",
                  "annotations": [
                    { "kind": "platform", "contract": "C", "version": 1 },
                    { "kind": "platform", "contract": "C", "version": 2, "rename": "Extent" } ] }
              ] },
            { "name": "Orphan", "kind": "class", "base": "Nowhere" }
        ] }"#,
    );
    let (_, diagnostics) = analyze(&table, &AnalysisOptions::default());
    let codes: Vec<ErrorCode> = diagnostics.iter().map(|d| d.code).collect();
    assert_eq!(
        codes,
        vec![
            ErrorCode::E1001,
            ErrorCode::E1005,
            ErrorCode::E2002,
            ErrorCode::E3001,
            ErrorCode::E4001,
        ]
    );
}
