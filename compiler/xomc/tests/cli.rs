//! Runs of the `xomc` binary: exit codes and what reaches stdout/stderr.

use std::fs;
use std::path::Path;
use std::process::{Command, Output};

use pretty_assertions::assert_eq;

const DECLS: &str = r#"{ "namespace": "Demo", "types": [
    { "name": "Orientation", "kind": "enum",
      "members": [
        { "name": "Horizontal", "kind": "enum_value", "value": 0 },
        { "name": "Vertical", "kind": "enum_value", "value": 1 } ] },
    { "name": "Slider", "kind": "class",
      "annotations": [{ "kind": "guid", "value": "0f6e2c8a-1b3d-4e5f-8a9b-0c1d2e3f4a5b" }],
      "members": [
        { "name": "Value", "kind": "property", "type": "Double" },
        { "name": "Orientation", "kind": "property", "type": "Orientation" } ] }
] }"#;

fn xomc(args: &[&str], cwd: &Path) -> Output {
    let result = Command::new(env!("CARGO_BIN_EXE_xomc"))
        .args(args)
        .current_dir(cwd)
        .env_remove("RUST_LOG")
        .output();
    match result {
        Ok(output) => output,
        Err(err) => panic!("cannot run xomc: {err}"),
    }
}

fn text(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).into_owned()
}

fn workspace(decls: &str) -> tempfile::TempDir {
    let dir = match tempfile::tempdir() {
        Ok(dir) => dir,
        Err(err) => panic!("cannot create temp dir: {err}"),
    };
    if let Err(err) = fs::write(dir.path().join("slider.xom.json"), decls) {
        panic!("cannot write declarations: {err}");
    }
    dir
}

#[test]
fn generate_writes_json_artifacts() {
    let dir = workspace(DECLS);
    let output = xomc(
        &["generate", "slider.xom.json", "--out=gen", "--format=json"],
        dir.path(),
    );
    assert!(output.status.success(), "{}", text(&output.stderr));
    assert!(text(&output.stdout).starts_with("generated 3 artifact(s) for 2 type(s) from 1 file(s)"));

    for name in ["interface.json", "native_stub.json", "projection.json"] {
        let content = match fs::read_to_string(dir.path().join("gen").join(name)) {
            Ok(content) => content,
            Err(err) => panic!("missing {name}: {err}"),
        };
        if let Err(err) = serde_json::from_str::<serde_json::Value>(&content) {
            panic!("{name} is not JSON: {err}");
        }
    }
}

#[test]
fn check_fails_with_terminal_diagnostics() {
    let dir = workspace(&DECLS.replace(r#""type": "Double""#, r#""type": "Doubel""#));
    let output = xomc(&["check", ".", "--color=never"], dir.path());
    assert_eq!(output.status.code(), Some(1));
    let stderr = text(&output.stderr);
    assert!(stderr.starts_with("error[E1001]: "), "{stderr}");
    assert!(stderr.contains("--> Demo.Slider.Value"), "{stderr}");
    assert!(stderr.contains("= kind: UnresolvedReference"), "{stderr}");
    assert!(stderr.ends_with("error: aborting due to previous error\n"), "{stderr}");
    assert!(!dir.path().join("generated").exists());
}

#[test]
fn json_diagnostics_are_machine_readable() {
    let dir = workspace(&DECLS.replace("0f6e2c8a-1b3d-4e5f-8a9b-0c1d2e3f4a5b", "not-a-guid"));
    let output = xomc(&["generate", ".", "--diagnostics=json"], dir.path());
    assert_eq!(output.status.code(), Some(1));
    let value: serde_json::Value = match serde_json::from_str(&text(&output.stderr)) {
        Ok(value) => value,
        Err(err) => panic!("stderr is not JSON: {err}"),
    };
    assert_eq!(value[0]["code"], "E4001");
    assert_eq!(value[0]["kind"], "IdentityValidationFailed");
}

#[test]
fn graph_prints_types() {
    let dir = workspace(DECLS);
    let output = xomc(&["graph", "slider.xom.json"], dir.path());
    assert!(output.status.success(), "{}", text(&output.stderr));
    assert_eq!(text(&output.stdout), "enum Demo.Orientation\nclass Demo.Slider\n");
}

#[test]
fn explain_known_and_unknown_codes() {
    let dir = workspace(DECLS);
    let known = xomc(&["explain", "e2002"], dir.path());
    assert!(known.status.success());
    assert!(text(&known.stdout).starts_with("# E2002"));

    let unknown = xomc(&["explain", "E9999"], dir.path());
    assert_eq!(unknown.status.code(), Some(1));
    assert!(text(&unknown.stderr).starts_with("Unknown error code: E9999"));
}

#[test]
fn bad_arguments_fail() {
    let dir = workspace(DECLS);
    let output = xomc(&["generate", "--format=yaml", "."], dir.path());
    assert_eq!(output.status.code(), Some(1));
    assert!(text(&output.stderr).starts_with("error: invalid value `yaml` for `--format`"));

    let output = xomc(&["frobnicate"], dir.path());
    assert_eq!(output.status.code(), Some(1));

    let output = xomc(&["version"], dir.path());
    assert!(output.status.success());
    assert!(text(&output.stdout).starts_with("xomc "));
}
