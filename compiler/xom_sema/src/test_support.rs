//! Fixtures shared by the unit tests.

use xom_diagnostic::{Diagnostic, ErrorCode};
use xom_ir::raw::{lower, parse_file};
use xom_ir::{DeclId, DeclarationTable, MemberId};

/// Lower declaration files given as `(path, json)` pairs.
pub(crate) fn table(files: &[(&str, &str)]) -> DeclarationTable {
    let sources = files.iter().map(|(path, text)| match parse_file(text) {
        Ok(file) => ((*path).to_owned(), file),
        Err(err) => panic!("fixture {path} does not parse: {err}"),
    });
    let lowered = lower(sources);
    assert!(
        lowered.errors.is_empty(),
        "fixture has lowering errors: {:?}",
        lowered.errors
    );
    lowered.table
}

/// Lower a single declaration file.
pub(crate) fn single(text: &str) -> DeclarationTable {
    table(&[("test.xom.json", text)])
}

pub(crate) fn type_id(table: &DeclarationTable, fqn: &str) -> DeclId {
    match table.types().find(|(id, _)| table.qualified_name(*id) == fqn) {
        Some((id, _)) => id,
        None => panic!("no type `{fqn}`"),
    }
}

pub(crate) fn member_id(table: &DeclarationTable, path: &str) -> MemberId {
    match table.members().find(|(id, _)| table.member_path(*id) == path) {
        Some((id, _)) => id,
        None => panic!("no member `{path}`"),
    }
}

pub(crate) fn codes(diagnostics: &[Diagnostic]) -> Vec<ErrorCode> {
    let mut codes: Vec<_> = diagnostics.iter().map(|d| d.code).collect();
    codes.sort();
    codes
}
