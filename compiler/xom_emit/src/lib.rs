//! Artifact emitters for the xom generator.
//!
//! Three emitters read the same analysis and never mutate it:
//!
//! ```text
//!                  ┌── InterfaceEmitter  ──► interface.{txt,json}
//! EmitContext ─────┼── NativeStubEmitter ──► native_stub.{txt,json}
//!                  └── ProjectionEmitter ──► projection.{txt,json}
//! ```
//!
//! Each emitter turns the declarations visible in its artifact into
//! records ordered by (namespace, type name, member order). Records render
//! either as indented text or as JSON; both are byte-identical across runs.

mod context;
pub mod interface;
pub mod native_stub;
pub mod projection;

use std::fmt;
use std::str::FromStr;

use serde::Serialize;
use xom_ir::Artifact;
use xom_sema::{GateTable, VersionRange};

pub use context::{EmitContext, TextWriter};
pub use interface::InterfaceEmitter;
pub use native_stub::NativeStubEmitter;
pub use projection::ProjectionEmitter;

/// Output encoding of the artifacts.
#[derive(Copy, Clone, Eq, PartialEq, Debug, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl OutputFormat {
    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Text => "txt",
            OutputFormat::Json => "json",
        }
    }
}

impl FromStr for OutputFormat {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "text" | "txt" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            _ => Err(()),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            OutputFormat::Text => "text",
            OutputFormat::Json => "json",
        })
    }
}

/// Failure while rendering an artifact.
#[derive(Debug, thiserror::Error)]
pub enum EmitError {
    #[error("failed to encode the {artifact} artifact as JSON: {source}")]
    Json {
        artifact: Artifact,
        #[source]
        source: serde_json::Error,
    },
}

/// One rendered artifact, ready to be written.
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct Rendered {
    pub artifact: Artifact,
    pub format: OutputFormat,
    pub content: String,
}

impl Rendered {
    /// File name of the artifact inside the output directory.
    pub fn file_name(&self) -> String {
        format!("{}.{}", self.artifact.as_str(), self.format.extension())
    }
}

/// An artifact emitter.
pub trait Emitter: Sync {
    type Record: Serialize;

    const ARTIFACT: Artifact;

    /// Records for every declaration visible in [`Self::ARTIFACT`].
    fn records(&self, cx: &EmitContext<'_>) -> Vec<Self::Record>;

    fn render_text(&self, records: &[Self::Record], out: &mut TextWriter);
}

/// Build and render one artifact.
pub fn render<E: Emitter>(
    emitter: &E,
    cx: &EmitContext<'_>,
    format: OutputFormat,
) -> Result<Rendered, EmitError> {
    let span = tracing::debug_span!("emit", artifact = %E::ARTIFACT, %format);
    let _guard = span.enter();

    let records = emitter.records(cx);
    tracing::debug!(records = records.len(), "records built");
    let content = match format {
        OutputFormat::Text => {
            let mut out = TextWriter::new();
            emitter.render_text(&records, &mut out);
            out.take_output()
        }
        OutputFormat::Json => {
            let mut json = serde_json::to_string_pretty(&records).map_err(|source| {
                EmitError::Json {
                    artifact: E::ARTIFACT,
                    source,
                }
            })?;
            json.push('\n');
            json
        }
    };
    Ok(Rendered {
        artifact: E::ARTIFACT,
        format,
        content,
    })
}

/// Render all three artifacts, concurrently when `parallel` is set.
///
/// Returned in emission order: interface, native stub, projection.
#[tracing::instrument(level = "debug", skip_all, fields(format = %format, parallel = parallel))]
pub fn emit_all(
    cx: &EmitContext<'_>,
    format: OutputFormat,
    parallel: bool,
) -> Result<Vec<Rendered>, EmitError> {
    let interface = || render(&InterfaceEmitter, cx, format);
    let native = || render(&NativeStubEmitter, cx, format);
    let projection = || render(&ProjectionEmitter, cx, format);

    let (interface, (native, projection)) = if parallel {
        rayon::join(interface, || rayon::join(native, projection))
    } else {
        (interface(), (native(), projection()))
    };
    Ok(vec![interface?, native?, projection?])
}

// ============================================================================
// Shared records
// ============================================================================

/// One version-gate entry.
#[derive(Clone, Eq, PartialEq, Debug, Serialize)]
pub struct GateRecord {
    pub contract: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub feature: Option<String>,
    pub start: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rename: Option<String>,
}

impl GateRecord {
    pub(crate) fn all(gate: &GateTable, cx: &EmitContext<'_>) -> Vec<GateRecord> {
        gate.entries()
            .iter()
            .map(|entry| GateRecord {
                contract: entry.platform.contract.clone(),
                feature: entry.platform.feature.clone(),
                start: entry.range.start,
                end: entry.range.end,
                rename: entry.shape.rename.map(|n| cx.name(n).to_owned()),
            })
            .collect()
    }

    pub(crate) fn text(&self) -> String {
        let range = VersionRange {
            start: self.start,
            end: self.end,
        };
        let mut text = match &self.feature {
            Some(feature) => format!("platform {}[{feature}] {range}", self.contract),
            None => format!("platform {} {range}", self.contract),
        };
        if let Some(rename) = &self.rename {
            text.push_str(" as ");
            text.push_str(rename);
        }
        text
    }
}

/// A method parameter.
#[derive(Clone, Eq, PartialEq, Debug, Serialize)]
pub struct ParamRecord {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: String,
}

impl ParamRecord {
    pub(crate) fn all(member: xom_ir::MemberId, cx: &EmitContext<'_>) -> Vec<ParamRecord> {
        let declared = &cx.table.member(member).params;
        let resolved = &cx.analysis.graph.member(member).params;
        declared
            .iter()
            .zip(resolved)
            .map(|(param, ty)| ParamRecord {
                name: cx.name(param.name).to_owned(),
                ty: cx.type_text(*ty),
            })
            .collect()
    }
}

/// `name: Type, other: Type` for text output.
pub(crate) fn params_text(params: &[ParamRecord]) -> String {
    params
        .iter()
        .map(|p| format!("{}: {}", p.name, p.ty))
        .collect::<Vec<_>>()
        .join(", ")
}
