//! Command-line options shared by `generate`, `check` and `graph`.

use std::path::PathBuf;

use xom_diagnostic::emitter::ColorMode;
use xom_emit::OutputFormat;
use xom_sema::{AnalysisOptions, DEFAULT_CONTRACT};

/// How diagnostics are written to stderr.
#[derive(Copy, Clone, Eq, PartialEq, Debug, Default)]
pub enum DiagnosticFormat {
    #[default]
    Terminal,
    Json,
}

/// Options of a generation run.
#[derive(Clone, Debug)]
pub struct GenerateOptions {
    /// Directory the artifacts are written to.
    pub out_dir: PathBuf,
    pub format: OutputFormat,
    pub diagnostics: DiagnosticFormat,
    /// Contract of declarations without `platform` annotations.
    pub default_contract: String,
    /// Maximum number of errors shown (0 = unlimited).
    pub error_limit: usize,
    pub parallel: bool,
    pub color: ColorMode,
}

impl Default for GenerateOptions {
    fn default() -> Self {
        GenerateOptions {
            out_dir: PathBuf::from("generated"),
            format: OutputFormat::Text,
            diagnostics: DiagnosticFormat::Terminal,
            default_contract: DEFAULT_CONTRACT.to_owned(),
            error_limit: 0,
            parallel: true,
            color: ColorMode::Auto,
        }
    }
}

impl GenerateOptions {
    pub fn analysis(&self) -> AnalysisOptions {
        AnalysisOptions {
            default_contract: self.default_contract.clone(),
            parallel: self.parallel,
        }
    }
}

/// A command-line argument that could not be understood.
#[derive(Clone, Debug, Eq, PartialEq, thiserror::Error)]
pub enum OptionsError {
    #[error("unknown option `{0}`")]
    Unknown(String),
    #[error("option `--{0}` requires a value")]
    MissingValue(&'static str),
    #[error("invalid value `{value}` for `--{option}`: expected {expected}")]
    InvalidValue {
        option: &'static str,
        value: String,
        expected: &'static str,
    },
    #[error("no declaration files or directories given")]
    NoInputs,
}

/// Parse `args` into options and input paths.
///
/// Options take the form `--name=value`; `--out` and `-o` also accept the
/// value as the next argument. Everything not starting with `-` is an input.
pub fn parse_args(args: &[String]) -> Result<(GenerateOptions, Vec<PathBuf>), OptionsError> {
    let mut options = GenerateOptions::default();
    let mut inputs = Vec::new();
    let mut args = args.iter();

    while let Some(arg) = args.next() {
        if !arg.starts_with('-') {
            inputs.push(PathBuf::from(arg));
            continue;
        }
        let (name, inline) = match arg.split_once('=') {
            Some((name, value)) => (name, Some(value.to_owned())),
            None => (arg.as_str(), None),
        };
        match name {
            "--out" | "-o" => {
                let value = inline
                    .or_else(|| args.next().cloned())
                    .ok_or(OptionsError::MissingValue("out"))?;
                options.out_dir = PathBuf::from(value);
            }
            "--format" => {
                let value = inline.ok_or(OptionsError::MissingValue("format"))?;
                options.format = value.parse().map_err(|()| OptionsError::InvalidValue {
                    option: "format",
                    value,
                    expected: "text or json",
                })?;
            }
            "--diagnostics" => {
                options.diagnostics = match inline.as_deref() {
                    Some("terminal") => DiagnosticFormat::Terminal,
                    Some("json") => DiagnosticFormat::Json,
                    Some(other) => {
                        return Err(OptionsError::InvalidValue {
                            option: "diagnostics",
                            value: other.to_owned(),
                            expected: "terminal or json",
                        })
                    }
                    None => return Err(OptionsError::MissingValue("diagnostics")),
                };
            }
            "--default-contract" => {
                let value = inline.ok_or(OptionsError::MissingValue("default-contract"))?;
                if value.is_empty() {
                    return Err(OptionsError::InvalidValue {
                        option: "default-contract",
                        value,
                        expected: "a contract name",
                    });
                }
                options.default_contract = value;
            }
            "--error-limit" => {
                let value = inline.ok_or(OptionsError::MissingValue("error-limit"))?;
                options.error_limit = value.parse().map_err(|_| OptionsError::InvalidValue {
                    option: "error-limit",
                    value,
                    expected: "a non-negative number",
                })?;
            }
            "--color" => {
                let value = inline.ok_or(OptionsError::MissingValue("color"))?;
                options.color = value.parse().map_err(|_| OptionsError::InvalidValue {
                    option: "color",
                    value,
                    expected: "auto, always or never",
                })?;
            }
            "--no-parallel" => options.parallel = false,
            _ => return Err(OptionsError::Unknown(arg.clone())),
        }
    }

    if inputs.is_empty() {
        return Err(OptionsError::NoInputs);
    }
    Ok((options, inputs))
}

#[cfg(test)]
mod tests;
