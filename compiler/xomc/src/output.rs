//! Artifact output.
//!
//! Artifacts are staged as hidden temporary files next to their targets and
//! renamed into place only once every one of them was written, so a failed
//! run leaves the previous outputs untouched.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use xom_emit::Rendered;

#[derive(Debug, thiserror::Error)]
pub enum OutputError {
    #[error("cannot create output directory `{}`: {source}", path.display())]
    CreateDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("cannot write `{}`: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("cannot move `{}` into place: {source}", path.display())]
    Rename {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

fn staging_path(dir: &Path, file_name: &str) -> PathBuf {
    dir.join(format!(".{file_name}.tmp"))
}

fn discard(staged: &[(PathBuf, PathBuf)]) {
    for (temp, _) in staged {
        if let Err(err) = fs::remove_file(temp) {
            tracing::warn!(path = %temp.display(), error = %err, "cannot remove staged artifact");
        }
    }
}

/// Write every artifact into `dir`, or none of them.
///
/// Returns the written paths in the order of `rendered`.
#[tracing::instrument(level = "debug", skip_all, fields(dir = %dir.display(), artifacts = rendered.len()))]
pub fn write_artifacts(dir: &Path, rendered: &[Rendered]) -> Result<Vec<PathBuf>, OutputError> {
    fs::create_dir_all(dir).map_err(|source| OutputError::CreateDir {
        path: dir.to_path_buf(),
        source,
    })?;

    let mut staged: Vec<(PathBuf, PathBuf)> = Vec::with_capacity(rendered.len());
    for artifact in rendered {
        let file_name = artifact.file_name();
        let temp = staging_path(dir, &file_name);
        if let Err(source) = fs::write(&temp, &artifact.content) {
            discard(&staged);
            return Err(OutputError::Write { path: temp, source });
        }
        staged.push((temp, dir.join(file_name)));
    }

    let mut written = Vec::with_capacity(staged.len());
    for (i, (temp, target)) in staged.iter().enumerate() {
        if let Err(source) = fs::rename(temp, target) {
            discard(&staged[i..]);
            return Err(OutputError::Rename {
                path: target.clone(),
                source,
            });
        }
        tracing::debug!(path = %target.display(), "artifact written");
        written.push(target.clone());
    }
    Ok(written)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use xom_emit::OutputFormat;
    use xom_ir::Artifact;

    use super::*;

    fn rendered(artifact: Artifact, content: &str) -> Rendered {
        Rendered {
            artifact,
            format: OutputFormat::Text,
            content: content.to_owned(),
        }
    }

    #[test]
    fn test_writes_all_and_leaves_no_staging_files() {
        let dir = match tempfile::tempdir() {
            Ok(dir) => dir,
            Err(err) => panic!("cannot create temp dir: {err}"),
        };
        let out = dir.path().join("gen");
        let artifacts = [
            rendered(Artifact::Interface, "interface\n"),
            rendered(Artifact::NativeStub, "native\n"),
            rendered(Artifact::Projection, "projection\n"),
        ];
        let written = match write_artifacts(&out, &artifacts) {
            Ok(written) => written,
            Err(err) => panic!("write failed: {err}"),
        };
        assert_eq!(
            written,
            vec![
                out.join("interface.txt"),
                out.join("native_stub.txt"),
                out.join("projection.txt"),
            ]
        );
        assert_eq!(fs::read_to_string(out.join("native_stub.txt")).ok().as_deref(), Some("native\n"));

        let mut entries: Vec<String> = match fs::read_dir(&out) {
            Ok(entries) => entries
                .flatten()
                .map(|e| e.file_name().to_string_lossy().into_owned())
                .collect(),
            Err(err) => panic!("cannot list output: {err}"),
        };
        entries.sort();
        assert_eq!(entries, vec!["interface.txt", "native_stub.txt", "projection.txt"]);
    }

    #[test]
    fn test_output_dir_is_a_file() {
        let file = match tempfile::NamedTempFile::new() {
            Ok(file) => file,
            Err(err) => panic!("cannot create temp file: {err}"),
        };
        let result = write_artifacts(file.path(), &[rendered(Artifact::Interface, "x")]);
        assert!(matches!(result, Err(OutputError::CreateDir { .. })));
    }
}
