//! The three generated artifacts and sets of them.

use std::fmt;

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

/// One of the three generated outputs.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Artifact {
    /// COM-style interface description.
    Interface,
    /// Native engine stub with storage bindings.
    NativeStub,
    /// Managed/projection wrapper surface.
    Projection,
}

impl Artifact {
    /// All artifacts in emission order.
    pub const ALL: [Artifact; 3] = [Artifact::Interface, Artifact::NativeStub, Artifact::Projection];

    pub fn as_str(self) -> &'static str {
        match self {
            Artifact::Interface => "interface",
            Artifact::NativeStub => "native_stub",
            Artifact::Projection => "projection",
        }
    }

    /// The single-artifact set for this artifact.
    pub fn flag(self) -> ArtifactSet {
        match self {
            Artifact::Interface => ArtifactSet::INTERFACE,
            Artifact::NativeStub => ArtifactSet::NATIVE_STUB,
            Artifact::Projection => ArtifactSet::PROJECTION,
        }
    }
}

impl fmt::Display for Artifact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

bitflags! {
    /// Set of artifacts a declaration is visible in.
    #[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
    pub struct ArtifactSet: u8 {
        const INTERFACE = 1 << 0;
        const NATIVE_STUB = 1 << 1;
        const PROJECTION = 1 << 2;
    }
}

impl ArtifactSet {
    /// Whether `artifact` is a member of this set.
    #[inline]
    pub fn includes(self, artifact: Artifact) -> bool {
        self.contains(artifact.flag())
    }

    /// Iterate the member artifacts in emission order.
    pub fn artifacts(self) -> impl Iterator<Item = Artifact> {
        Artifact::ALL.into_iter().filter(move |a| self.includes(*a))
    }
}

impl fmt::Display for ArtifactSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return f.write_str("none");
        }
        for (i, artifact) in self.artifacts().enumerate() {
            if i > 0 {
                f.write_str("|")?;
            }
            f.write_str(artifact.as_str())?;
        }
        Ok(())
    }
}
