//! End-to-end runs of the library pipeline against declaration files on disk.

use std::fs;
use std::path::{Path, PathBuf};

use pretty_assertions::assert_eq;
use xom_diagnostic::{Diagnostic, ErrorCode, ErrorKind};
use xom_emit::OutputFormat;
use xomc::{analyze_inputs, generate, render_graph, GenerateError, GenerateOptions};

const IBAZ: &str = r#"{ "namespace": "Demo", "types": [
    { "name": "IBaz", "kind": "interface",
      "annotations": [{ "kind": "guid", "value": "1c9f3b2e-6a0d-4d8e-9f21-7b5c4e3a2d10" }],
      "members": [{ "name": "Bar", "kind": "property", "type": "Boolean" }] }
] }"#;

const FOO: &str = r#"{ "namespace": "Demo", "types": [
    { "name": "Foo", "kind": "class", "interfaces": ["IBaz"],
      "annotations": [{ "kind": "guid", "value": "5E1A0C3B-2F4D-4B6A-8C9E-0D1F2A3B4C5D" }],
      "members": [{ "name": "Bar", "kind": "property", "type": "Boolean",
                    "annotations": [{ "kind": "storage", "storage": "bool" }] }] }
] }"#;

struct Fixture {
    dir: tempfile::TempDir,
}

impl Fixture {
    fn new(files: &[(&str, &str)]) -> Self {
        let dir = match tempfile::tempdir() {
            Ok(dir) => dir,
            Err(err) => panic!("cannot create temp dir: {err}"),
        };
        for (name, text) in files {
            let path = dir.path().join("decls").join(name);
            if let Some(parent) = path.parent() {
                if let Err(err) = fs::create_dir_all(parent) {
                    panic!("cannot create {}: {err}", parent.display());
                }
            }
            if let Err(err) = fs::write(&path, text) {
                panic!("cannot write {}: {err}", path.display());
            }
        }
        Fixture { dir }
    }

    fn inputs(&self) -> Vec<PathBuf> {
        vec![self.dir.path().join("decls")]
    }

    fn out(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    fn options(&self, out: &str) -> GenerateOptions {
        GenerateOptions {
            out_dir: self.out(out),
            ..GenerateOptions::default()
        }
    }
}

fn read(path: &Path) -> String {
    match fs::read_to_string(path) {
        Ok(text) => text,
        Err(err) => panic!("cannot read {}: {err}", path.display()),
    }
}

fn invalid(result: Result<xomc::Generated, GenerateError>) -> Vec<Diagnostic> {
    match result {
        Err(GenerateError::Invalid(diagnostics)) => diagnostics,
        Err(other) => panic!("unexpected failure: {other}"),
        Ok(generated) => panic!("generation unexpectedly succeeded: {generated:?}"),
    }
}

fn codes(diagnostics: &[Diagnostic]) -> Vec<ErrorCode> {
    diagnostics.iter().map(|d| d.code).collect()
}

#[test]
fn scenario_generates_all_three_artifacts() {
    let fixture = Fixture::new(&[("ibaz.xom.json", IBAZ), ("nested/foo.xom.json", FOO)]);
    let options = fixture.options("gen");
    let generated = match generate(&fixture.inputs(), &options) {
        Ok(generated) => generated,
        Err(err) => panic!("generation failed: {err}"),
    };
    assert_eq!(generated.files, 2);
    assert_eq!(generated.types, 2);
    assert_eq!(generated.warnings, vec![]);
    assert_eq!(
        generated.artifacts,
        vec![
            options.out_dir.join("interface.txt"),
            options.out_dir.join("native_stub.txt"),
            options.out_dir.join("projection.txt"),
        ]
    );

    let interface = read(&options.out_dir.join("interface.txt"));
    assert!(interface.contains("class Demo.Foo\n  guid 5e1a0c3b-2f4d-4b6a-8c9e-0d1f2a3b4c5d\n"));
    assert!(interface.contains("    property Bar: Boolean [get_set]\n"));

    let native = read(&options.out_dir.join("native_stub.txt"));
    assert!(native.contains("class Demo.Foo -> CFoo\n  property Bar storage=bool\n"));

    let projection = read(&options.out_dir.join("projection.txt"));
    assert_eq!(
        projection,
        "class Demo.Foo\n  property Bar: Boolean [get_set]\n\ninterface Demo.IBaz\n  property Bar: Boolean [get_set]\n"
    );
}

#[test]
fn output_is_byte_identical_across_runs_and_modes() {
    let fixture = Fixture::new(&[("ibaz.xom.json", IBAZ), ("foo.xom.json", FOO)]);
    for format in [OutputFormat::Text, OutputFormat::Json] {
        let mut outputs = Vec::new();
        for (i, parallel) in [true, true, false].into_iter().enumerate() {
            let options = GenerateOptions {
                format,
                parallel,
                ..fixture.options(&format!("{format}-{i}"))
            };
            let generated = match generate(&fixture.inputs(), &options) {
                Ok(generated) => generated,
                Err(err) => panic!("generation failed: {err}"),
            };
            let contents: Vec<String> = generated.artifacts.iter().map(|p| read(p)).collect();
            outputs.push(contents);
        }
        assert_eq!(outputs[0], outputs[1]);
        assert_eq!(outputs[0], outputs[2]);
    }
}

#[test]
fn warnings_do_not_stop_generation() {
    let hidden = r#"{ "namespace": "Demo", "types": [
        { "name": "Hidden", "kind": "class",
          "annotations": [
              { "kind": "guid", "value": "7f3a9c1e-2b4d-4e6f-8a0b-1c2d3e4f5a6b" },
              { "kind": "exclude", "target": "interface" }
          ],
          "members": [{ "name": "Bar", "kind": "property", "type": "Boolean",
                        "annotations": [{ "kind": "force_include", "target": "interface" }] }] }
    ] }"#;
    let fixture = Fixture::new(&[("hidden.xom.json", hidden)]);
    let options = fixture.options("gen");
    let generated = match generate(&fixture.inputs(), &options) {
        Ok(generated) => generated,
        Err(err) => panic!("generation failed: {err}"),
    };
    assert_eq!(codes(&generated.warnings), vec![ErrorCode::E2006]);
    assert!(!generated.warnings[0].is_error());
    assert_eq!(generated.artifacts.len(), 3);
    let interface = read(&options.out_dir.join("interface.txt"));
    assert!(!interface.contains("Demo.Hidden"), "{interface}");
}

#[test]
fn cycle_aborts_without_artifacts() {
    let fixture = Fixture::new(&[(
        "cycle.xom.json",
        r#"{ "namespace": "UI", "types": [
            { "name": "A", "kind": "class", "base": "B",
              "annotations": [{ "kind": "guid", "value": "00000000-0000-0000-0000-00000000000a" }] },
            { "name": "B", "kind": "class", "base": "A",
              "annotations": [{ "kind": "guid", "value": "00000000-0000-0000-0000-00000000000b" }] }
        ] }"#,
    )]);
    let options = fixture.options("gen");
    let diagnostics = invalid(generate(&fixture.inputs(), &options));
    assert_eq!(codes(&diagnostics), vec![ErrorCode::E1005]);
    assert_eq!(diagnostics[0].kind(), ErrorKind::CyclicInheritance);
    assert!(!options.out_dir.exists());
}

#[test]
fn failed_run_keeps_previous_outputs() {
    let fixture = Fixture::new(&[("ibaz.xom.json", IBAZ), ("foo.xom.json", FOO)]);
    let options = fixture.options("gen");
    if let Err(err) = generate(&fixture.inputs(), &options) {
        panic!("generation failed: {err}");
    }
    let before = read(&options.out_dir.join("interface.txt"));

    let broken = Fixture::new(&[("foo.xom.json", FOO)]);
    let diagnostics = invalid(generate(&broken.inputs(), &options));
    assert_eq!(codes(&diagnostics), vec![ErrorCode::E1001]);
    assert_eq!(read(&options.out_dir.join("interface.txt")), before);
}

#[test]
fn missing_guid_is_one_identity_error() {
    let foo = FOO.replace(
        r#"{ "kind": "guid", "value": "5E1A0C3B-2F4D-4B6A-8C9E-0D1F2A3B4C5D" }"#,
        "",
    );
    let fixture = Fixture::new(&[("ibaz.xom.json", IBAZ), ("foo.xom.json", &foo)]);
    let diagnostics = invalid(generate(&fixture.inputs(), &fixture.options("gen")));
    assert_eq!(codes(&diagnostics), vec![ErrorCode::E4001]);
    assert_eq!(diagnostics[0].primary_decl(), Some("Demo.Foo"));
    assert!(!fixture.out("gen").exists());
}

#[test]
fn duplicate_guid_names_both_declarations() {
    let foo = FOO.replace(
        "5E1A0C3B-2F4D-4B6A-8C9E-0D1F2A3B4C5D",
        "{1C9F3B2E-6A0D-4D8E-9F21-7B5C4E3A2D10}",
    );
    let fixture = Fixture::new(&[("ibaz.xom.json", IBAZ), ("foo.xom.json", &foo)]);
    let diagnostics = invalid(generate(&fixture.inputs(), &fixture.options("gen")));
    assert_eq!(codes(&diagnostics), vec![ErrorCode::E4001]);
    let decls: Vec<&str> = diagnostics[0]
        .labels
        .iter()
        .map(|l| l.decl.as_str())
        .collect();
    assert!(decls.contains(&"Demo.Foo"), "{decls:?}");
    assert!(decls.contains(&"Demo.IBaz"), "{decls:?}");
}

#[test]
fn input_errors_and_analysis_errors_accumulate() {
    let fixture = Fixture::new(&[(
        "demo.xom.json",
        r#"{ "namespace": "Demo", "types": [
            { "name": "Foo", "kind": "class", "base": "Missing",
              "annotations": [
                { "kind": "guid", "value": "5e1a0c3b-2f4d-4b6a-8c9e-0d1f2a3b4c5d" },
                { "kind": "shiny" } ] }
        ] }"#,
    )]);
    let diagnostics = invalid(generate(&fixture.inputs(), &fixture.options("gen")));
    assert_eq!(codes(&diagnostics), vec![ErrorCode::E0003, ErrorCode::E1001]);
}

#[test]
fn unreadable_file_stops_before_analysis() {
    let fixture = Fixture::new(&[("ibaz.xom.json", IBAZ), ("foo.xom.json", "{ \"namespace\": ")]);
    let diagnostics = match analyze_inputs(&fixture.inputs(), &GenerateOptions::default()) {
        Err(diagnostics) => diagnostics,
        Ok(_) => panic!("analysis unexpectedly succeeded"),
    };
    assert_eq!(codes(&diagnostics), vec![ErrorCode::E0002]);
}

#[test]
fn graph_lists_types_and_edges() {
    let fixture = Fixture::new(&[
        ("ibaz.xom.json", IBAZ),
        ("foo.xom.json", FOO),
        (
            "ui.xom.json",
            r#"{ "namespace": "UI", "types": [
                { "name": "Base", "kind": "class",
                  "annotations": [{ "kind": "guid", "value": "00000000-0000-0000-0000-000000000001" }] },
                { "name": "Button", "kind": "class", "base": "Base",
                  "annotations": [
                    { "kind": "guid", "value": "00000000-0000-0000-0000-000000000002" },
                    { "kind": "core_base", "type": "Demo.Foo" } ] }
            ] }"#,
        ),
    ]);
    let session = match analyze_inputs(&fixture.inputs(), &GenerateOptions::default()) {
        Ok(session) => session,
        Err(diagnostics) => panic!("analysis failed: {diagnostics:?}"),
    };
    assert_eq!(
        render_graph(&session),
        "class Demo.Foo
  implements Demo.IBaz
interface Demo.IBaz
class UI.Base
class UI.Button
  base UI.Base
  core_base Demo.Foo
"
    );
}
