use pretty_assertions::assert_eq;
use proptest::prelude::*;

use super::*;
use crate::test_support::{codes, member_id, single, type_id};

const DEFAULT: &str = "Xom.Foundation.UniversalApiContract";

fn gates(text: &str) -> (DeclarationTable, Gates, Vec<Diagnostic>) {
    let table = single(text);
    let (gates, diagnostics) = build_gates(&table, DEFAULT, false);
    (table, gates, diagnostics)
}

/// `UI.Foo` with the given class annotations and a property `Bar` with the
/// given member annotations.
fn foo(class_annotations: &str, annotations: &str) -> String {
    format!(
        r#"{{ "namespace": "UI", "types": [
            {{ "name": "Foo", "kind": "class", "annotations": [{class_annotations}],
               "members": [{{ "name": "Bar", "kind": "property", "type": "Int32",
                              "annotations": [{annotations}] }}] }}
        ] }}"#
    )
}

fn platform(contract: &str, version: u32, until: Option<u32>, rename: Option<&str>) -> String {
    let until = until.map(|u| format!(r#", "until": {u}"#)).unwrap_or_default();
    let rename = rename
        .map(|r| format!(r#", "rename": "{r}""#))
        .unwrap_or_default();
    format!(r#"{{ "kind": "platform", "contract": "{contract}", "version": {version}{until}{rename} }}"#)
}

fn ranges(gate: &GateTable) -> Vec<(String, VersionRange)> {
    gate.entries()
        .iter()
        .map(|e| (e.platform.to_string(), e.range))
        .collect()
}

#[test]
fn test_unannotated_declarations_use_defaults() {
    let (table, gates, diagnostics) = gates(&foo("", ""));
    assert_eq!(diagnostics, vec![]);
    let foo = type_id(&table, "UI.Foo");
    assert_eq!(
        ranges(gates.ty(foo)),
        vec![(DEFAULT.to_owned(), VersionRange::ALWAYS)]
    );
    assert_eq!(
        ranges(gates.member(member_id(&table, "UI.Foo.Bar"))),
        vec![(DEFAULT.to_owned(), VersionRange::ALWAYS)]
    );
    assert_eq!(gates.type_versions(foo).len(), 1);
    assert_eq!(gates.type_versions(foo)[0].index, 1);
}

#[test]
fn test_member_defaults_to_owner_primary_platform() {
    let (table, gates, diagnostics) = gates(&foo(&platform("Contoso", 3, None, None), ""));
    assert_eq!(diagnostics, vec![]);
    let bar = gates.member(member_id(&table, "UI.Foo.Bar"));
    assert_eq!(ranges(bar), vec![("Contoso".to_owned(), VersionRange::ALWAYS)]);
    assert!(bar.is_visible(&PlatformKey::contract("Contoso"), 0));
    assert!(!bar.is_visible(&PlatformKey::contract(DEFAULT), 0));
}

#[test]
fn test_disjoint_ranges_stay_sorted_and_separate() {
    let annotations = format!(
        "{}, {}",
        platform("Contoso", 7, None, None),
        platform("Contoso", 1, Some(4), None)
    );
    let (table, gates, diagnostics) = gates(&foo("", &annotations));
    assert_eq!(diagnostics, vec![]);
    let bar = gates.member(member_id(&table, "UI.Foo.Bar"));
    assert_eq!(
        ranges(bar),
        vec![
            ("Contoso".to_owned(), VersionRange { start: 1, end: Some(4) }),
            ("Contoso".to_owned(), VersionRange { start: 7, end: None }),
        ]
    );
    let contoso = PlatformKey::contract("Contoso");
    assert!(bar.is_visible(&contoso, 3));
    assert!(!bar.is_visible(&contoso, 4));
    assert!(!bar.is_visible(&contoso, 6));
    assert!(bar.is_visible(&contoso, 100));
}

#[test]
fn test_overlapping_same_shape_merges() {
    let annotations = format!(
        "{}, {}",
        platform("Contoso", 1, Some(5), Some("Baz")),
        platform("Contoso", 3, Some(9), Some("Baz"))
    );
    let (table, gates, diagnostics) = gates(&foo("", &annotations));
    assert_eq!(diagnostics, vec![]);
    let bar = gates.member(member_id(&table, "UI.Foo.Bar"));
    assert_eq!(
        ranges(bar),
        vec![("Contoso".to_owned(), VersionRange { start: 1, end: Some(9) })]
    );
    let shape = bar.visible_at(&PlatformKey::contract("Contoso"), 8);
    assert_eq!(shape.and_then(|s| s.rename).map(|n| table.name(n)), Some("Baz"));
}

#[test]
fn test_overlapping_different_shape_is_ambiguous() {
    let annotations = format!(
        "{}, {}",
        platform("Contoso", 1, None, None),
        platform("Contoso", 5, None, Some("Renamed"))
    );
    let (_, _, diagnostics) = gates(&foo("", &annotations));
    assert_eq!(codes(&diagnostics), vec![ErrorCode::E3001]);
    assert_eq!(
        diagnostics[0].kind(),
        xom_diagnostic::ErrorKind::AmbiguousVersionShape
    );
}

#[test]
fn test_every_conflicting_overlap_is_reported() {
    // [1,3) overlaps [2,10), which also overlaps [5,8); [1,3) and [5,8) are disjoint.
    let annotations = format!(
        "{}, {}, {}",
        platform("Contoso", 1, Some(3), Some("X")),
        platform("Contoso", 2, Some(10), Some("Y")),
        platform("Contoso", 5, Some(8), Some("Z"))
    );
    let (table, gates, diagnostics) = gates(&foo("", &annotations));
    assert_eq!(codes(&diagnostics), vec![ErrorCode::E3001, ErrorCode::E3001]);
    let labels: Vec<&str> = diagnostics
        .iter()
        .map(|d| d.labels[0].message.as_str())
        .collect();
    assert_eq!(
        labels,
        vec![
            "[1, 3) named `X` overlaps [2, 10) named `Y`",
            "[2, 10) named `Y` overlaps [5, 8) named `Z`",
        ]
    );

    let bar = gates.member(member_id(&table, "UI.Foo.Bar"));
    assert_eq!(
        ranges(bar),
        vec![
            ("Contoso".to_owned(), VersionRange { start: 1, end: Some(3) }),
            ("Contoso".to_owned(), VersionRange { start: 5, end: Some(8) }),
        ]
    );
}

#[test]
fn test_platforms_are_keyed_by_contract_and_feature() {
    let annotations = format!(
        r#"{}, {{ "kind": "platform", "contract": "Contoso", "version": 1, "feature": "Preview", "rename": "Other" }}"#,
        platform("Contoso", 1, None, None)
    );
    let (table, gates, diagnostics) = gates(&foo("", &annotations));
    assert_eq!(diagnostics, vec![]);
    let bar = gates.member(member_id(&table, "UI.Foo.Bar"));
    assert_eq!(bar.entries().len(), 2);
    let preview = PlatformKey {
        contract: "Contoso".to_owned(),
        feature: Some("Preview".to_owned()),
    };
    assert!(bar.is_visible(&preview, 1));
    assert_eq!(preview.to_string(), "Contoso[Preview]");
}

#[test]
fn test_empty_range_is_rejected() {
    let (_, _, diagnostics) = gates(&foo("", &platform("Contoso", 4, Some(4), None)));
    assert_eq!(codes(&diagnostics), vec![ErrorCode::E3002]);
}

#[test]
fn test_member_version_resolves_through_type_table() {
    let class = format!(
        r#"{}, {{ "kind": "platform", "contract": "Contoso", "version": 5, "type_version": 2 }}"#,
        platform("Contoso", 1, None, None)
    );
    let (table, gates, diagnostics) = gates(&foo(&class, r#"{ "kind": "version", "index": 2 }"#));
    assert_eq!(diagnostics, vec![]);

    let foo = type_id(&table, "UI.Foo");
    let indexes: Vec<u32> = gates.type_versions(foo).iter().map(|v| v.index).collect();
    assert_eq!(indexes, vec![1, 2]);
    // Both type entries overlap with the same shape.
    assert_eq!(
        ranges(gates.ty(foo)),
        vec![("Contoso".to_owned(), VersionRange { start: 1, end: None })]
    );

    let bar = gates.member(member_id(&table, "UI.Foo.Bar"));
    assert_eq!(bar.version_index(), Some(2));
    assert_eq!(
        ranges(bar),
        vec![("Contoso".to_owned(), VersionRange { start: 5, end: None })]
    );
}

#[test]
fn test_unknown_type_version() {
    let (_, _, diagnostics) = gates(&foo("", r#"{ "kind": "version", "index": 3 }"#));
    assert_eq!(codes(&diagnostics), vec![ErrorCode::E1008]);
}

#[test]
fn test_range_predicates() {
    let a = VersionRange { start: 1, end: Some(4) };
    let b = VersionRange { start: 4, end: None };
    assert!(!a.overlaps(b));
    assert!(a.overlaps(VersionRange { start: 3, end: Some(10) }));
    assert!(VersionRange::ALWAYS.overlaps(a));
    assert_eq!(a.union(b), VersionRange { start: 1, end: None });
    assert_eq!(a.to_string(), "[1, 4)");
    assert_eq!(b.to_string(), "[4, ..)");
}

proptest! {
    /// Merged same-shape entries are disjoint and cover exactly the inputs.
    #[test]
    fn prop_merge_covers_inputs(spans in prop::collection::vec((0u32..20, 1u32..6), 1..6)) {
        let annotations: Vec<String> = spans
            .iter()
            .map(|(start, len)| platform("Contoso", *start, Some(start + len), None))
            .collect();
        let (table, gates, diagnostics) = gates(&foo("", &annotations.join(", ")));
        prop_assert!(diagnostics.is_empty());

        let bar = gates.member(member_id(&table, "UI.Foo.Bar"));
        for pair in bar.entries().windows(2) {
            prop_assert!(!pair[0].range.overlaps(pair[1].range));
            prop_assert!(pair[0].range.start < pair[1].range.start);
        }
        let contoso = PlatformKey::contract("Contoso");
        for version in 0..30 {
            let expected = spans
                .iter()
                .any(|(start, len)| version >= *start && version < start + len);
            prop_assert_eq!(bar.is_visible(&contoso, version), expected);
        }
    }
}
