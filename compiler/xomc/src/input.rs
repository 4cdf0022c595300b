//! Declaration file discovery and loading.
//!
//! Inputs are files or directories. Directories are walked recursively for
//! `*.xom.json` files; hidden entries are skipped. The resulting list is
//! sorted by path so the table's declaration order does not depend on the
//! file system.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use rayon::prelude::*;
use xom_diagnostic::{Diagnostic, ErrorCode, Label};
use xom_ir::raw::{lower, parse_file, LowerError, LowerErrorKind, RawFile};
use xom_ir::DeclarationTable;

/// Suffix of declaration files found by directory walks.
pub const DECL_SUFFIX: &str = ".xom.json";

/// A declaration file that could not be loaded.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("input `{}` does not exist", path.display())]
    Missing { path: PathBuf },
    #[error("cannot read `{}`: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("`{}` is not a valid declaration file: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl LoadError {
    pub fn path(&self) -> &Path {
        match self {
            LoadError::Missing { path }
            | LoadError::Read { path, .. }
            | LoadError::Parse { path, .. } => path,
        }
    }

    pub fn to_diagnostic(&self) -> Diagnostic {
        let path = self.path().display().to_string();
        let (code, label) = match self {
            LoadError::Missing { .. } => (ErrorCode::E0001, "no such file or directory"),
            LoadError::Read { .. } => (ErrorCode::E0001, "unreadable"),
            LoadError::Parse { .. } => (ErrorCode::E0002, "malformed declaration file"),
        };
        Diagnostic::error(code)
            .with_message(self.to_string())
            .with_full_label(Label::primary(path.clone(), label).in_file(path))
    }
}

/// Convert a rejected annotation, type expression or identifier.
pub fn lower_diagnostic(err: &LowerError) -> Diagnostic {
    let (code, label) = match &err.kind {
        LowerErrorKind::UnknownAnnotation { .. } => (ErrorCode::E0003, "unknown annotation"),
        LowerErrorKind::MalformedAnnotation { .. } => (ErrorCode::E0004, "malformed annotation"),
        LowerErrorKind::MalformedType(_) => (ErrorCode::E0005, "malformed type expression"),
        LowerErrorKind::InvalidIdentifier { .. } => (ErrorCode::E0006, "invalid identifier"),
    };
    let diag = Diagnostic::error(code)
        .with_message(err.to_string())
        .with_full_label(Label::primary(err.decl.clone(), label).in_file(err.file.clone()));
    match &err.kind {
        LowerErrorKind::UnknownAnnotation { .. } => diag.with_note(format!(
            "known annotation kinds: {}",
            xom_ir::AnnotationTag::ALL
                .map(xom_ir::AnnotationTag::as_str)
                .join(", ")
        )),
        _ => diag,
    }
}

/// Expand `inputs` into the sorted list of declaration files.
///
/// Files named explicitly are taken whatever their extension. Symlinked
/// directories below an input directory are not entered.
pub fn discover(inputs: &[PathBuf]) -> (Vec<PathBuf>, Vec<LoadError>) {
    let mut files = Vec::new();
    let mut errors = Vec::new();
    for input in inputs {
        if input.is_file() {
            files.push(input.clone());
        } else if input.is_dir() {
            walk(input, &mut files, &mut errors);
        } else {
            errors.push(LoadError::Missing {
                path: input.clone(),
            });
        }
    }
    files.sort();
    files.dedup();
    (files, errors)
}

fn walk(dir: &Path, files: &mut Vec<PathBuf>, errors: &mut Vec<LoadError>) {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(source) => {
            errors.push(LoadError::Read {
                path: dir.to_path_buf(),
                source,
            });
            return;
        }
    };

    for entry in entries.flatten() {
        let path = entry.path();
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        if name.starts_with('.') {
            continue;
        }
        let Ok(file_type) = entry.file_type() else {
            continue;
        };
        if file_type.is_dir() {
            walk(&path, files, errors);
        } else if file_type.is_symlink() && path.is_dir() {
            tracing::debug!(path = %path.display(), "skipping symlinked directory");
        } else if name.ends_with(DECL_SUFFIX) {
            files.push(path);
        }
    }
}

fn read(path: &Path) -> Result<RawFile, LoadError> {
    let text = fs::read_to_string(path).map_err(|source| LoadError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    parse_file(&text).map_err(|source| LoadError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// The declaration table built from every loadable input.
#[derive(Debug)]
pub struct Loaded {
    pub table: DeclarationTable,
    pub files: Vec<PathBuf>,
    /// Input-level problems, in file order.
    pub diagnostics: Vec<Diagnostic>,
    /// Inputs that were missing, unreadable or malformed.
    pub failed_files: usize,
}

/// Discover, read and lower the declaration files under `inputs`.
///
/// Files are read and parsed on the rayon pool when `parallel` is set and
/// then lowered in path order.
#[tracing::instrument(level = "debug", skip_all, fields(inputs = inputs.len(), parallel = parallel))]
pub fn load(inputs: &[PathBuf], parallel: bool) -> Loaded {
    let (files, discovery_errors) = discover(inputs);
    tracing::debug!(files = files.len(), "declaration files discovered");

    let parsed: Vec<Result<RawFile, LoadError>> = if parallel && files.len() > 1 {
        files.par_iter().map(|path| read(path)).collect()
    } else {
        files.iter().map(|path| read(path)).collect()
    };

    let mut diagnostics: Vec<Diagnostic> =
        discovery_errors.iter().map(LoadError::to_diagnostic).collect();
    let mut failed_files = discovery_errors.len();
    let mut sources = Vec::with_capacity(files.len());
    for (path, result) in files.iter().zip(parsed) {
        match result {
            Ok(raw) => sources.push((path.display().to_string(), raw)),
            Err(err) => {
                tracing::debug!(error = %err, "declaration file rejected");
                diagnostics.push(err.to_diagnostic());
                failed_files += 1;
            }
        }
    }

    let lowered = lower(sources);
    diagnostics.extend(lowered.errors.iter().map(lower_diagnostic));
    tracing::debug!(
        types = lowered.table.type_count(),
        members = lowered.table.member_count(),
        errors = diagnostics.len(),
        "declarations loaded"
    );

    Loaded {
        table: lowered.table,
        files,
        diagnostics,
        failed_files,
    }
}

#[cfg(test)]
mod tests;
