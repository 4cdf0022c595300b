use std::fs;

use pretty_assertions::assert_eq;
use xom_diagnostic::ErrorKind;

use super::*;

fn temp_dir() -> tempfile::TempDir {
    match tempfile::tempdir() {
        Ok(dir) => dir,
        Err(err) => panic!("cannot create temp dir: {err}"),
    }
}

fn write(path: &Path, text: &str) {
    if let Some(parent) = path.parent() {
        if let Err(err) = fs::create_dir_all(parent) {
            panic!("cannot create {}: {err}", parent.display());
        }
    }
    if let Err(err) = fs::write(path, text) {
        panic!("cannot write {}: {err}", path.display());
    }
}

const WIDGET: &str = r#"{ "namespace": "Demo", "types": [{ "name": "Widget", "kind": "struct" }] }"#;

#[test]
fn test_discover_walks_and_sorts() {
    let dir = temp_dir();
    let root = dir.path();
    write(&root.join("b.xom.json"), WIDGET);
    write(&root.join("nested/a.xom.json"), WIDGET);
    write(&root.join("notes.json"), "{}");
    write(&root.join(".hidden/c.xom.json"), WIDGET);

    let (files, errors) = discover(&[root.to_path_buf(), root.join("b.xom.json")]);
    assert!(errors.is_empty());
    assert_eq!(
        files,
        vec![root.join("b.xom.json"), root.join("nested/a.xom.json")]
    );
}

#[cfg(unix)]
#[test]
fn test_discover_skips_symlinked_directories() {
    let dir = temp_dir();
    let root = dir.path();
    write(&root.join("nested/a.xom.json"), WIDGET);
    write(&root.join("shared/b.xom.json"), WIDGET);
    let links = [
        (root.to_path_buf(), root.join("nested/loop")),
        (root.join("shared/b.xom.json"), root.join("nested/linked.xom.json")),
    ];
    for (target, link) in &links {
        if let Err(err) = std::os::unix::fs::symlink(target, link) {
            panic!("cannot link {}: {err}", link.display());
        }
    }

    let (files, errors) = discover(&[root.to_path_buf()]);
    assert!(errors.is_empty());
    assert_eq!(
        files,
        vec![
            root.join("nested/a.xom.json"),
            root.join("nested/linked.xom.json"),
            root.join("shared/b.xom.json"),
        ]
    );
}

#[test]
fn test_missing_input() {
    let dir = temp_dir();
    let missing = dir.path().join("absent");
    let loaded = load(&[missing], true);
    assert_eq!(loaded.failed_files, 1);
    assert_eq!(loaded.diagnostics.len(), 1);
    assert_eq!(loaded.diagnostics[0].code, ErrorCode::E0001);
    assert_eq!(loaded.diagnostics[0].kind(), ErrorKind::InvalidInput);
}

#[test]
fn test_load_reports_every_bad_file() {
    let dir = temp_dir();
    let root = dir.path();
    write(&root.join("a.xom.json"), WIDGET);
    write(&root.join("b.xom.json"), "{ not json");
    write(
        &root.join("c.xom.json"),
        r#"{ "namespace": "Demo", "types": [{ "name": "Panel", "kind": "widget" }] }"#,
    );

    let loaded = load(&[root.to_path_buf()], true);
    assert_eq!(loaded.files.len(), 3);
    assert_eq!(loaded.failed_files, 2);
    let codes: Vec<ErrorCode> = loaded.diagnostics.iter().map(|d| d.code).collect();
    assert_eq!(codes, vec![ErrorCode::E0002, ErrorCode::E0002]);
    assert_eq!(loaded.table.type_count(), 1);
}

#[test]
fn test_lowering_errors_become_diagnostics() {
    let dir = temp_dir();
    let file = dir.path().join("demo.xom.json");
    write(
        &file,
        r#"{ "namespace": "Demo", "types": [
            { "name": "Foo", "kind": "class",
              "annotations": [{ "kind": "sparkle" }, { "kind": "storage", "storage": 3 }],
              "members": [
                { "name": "Bar", "kind": "property", "type": "IMap<String" },
                { "name": "9lives", "kind": "method" } ] }
        ] }"#,
    );

    let loaded = load(&[file.clone()], false);
    assert_eq!(loaded.failed_files, 0);
    let codes: Vec<ErrorCode> = loaded.diagnostics.iter().map(|d| d.code).collect();
    assert_eq!(
        codes,
        vec![
            ErrorCode::E0003,
            ErrorCode::E0004,
            ErrorCode::E0005,
            ErrorCode::E0006
        ]
    );

    let unknown = &loaded.diagnostics[0];
    assert_eq!(unknown.primary_decl(), Some("Demo.Foo"));
    assert_eq!(
        unknown.labels[0].file.as_deref(),
        Some(file.display().to_string().as_str())
    );
    assert!(unknown.notes[0].contains("storage"));
}

#[test]
fn test_parallel_load_matches_sequential() {
    let dir = temp_dir();
    for i in 0..8 {
        write(
            &dir.path().join(format!("f{i}.xom.json")),
            &format!(r#"{{ "namespace": "N{i}", "types": [{{ "name": "T", "kind": "struct" }}] }}"#),
        );
    }
    let inputs = [dir.path().to_path_buf()];
    let parallel = load(&inputs, true);
    let sequential = load(&inputs, false);
    let names = |table: &DeclarationTable| -> Vec<String> {
        table.types().map(|(id, _)| table.qualified_name(id)).collect()
    };
    assert_eq!(names(&parallel.table), names(&sequential.table));
    assert_eq!(names(&parallel.table)[0], "N0.T");
}
