//! Version/Platform Gate.
//!
//! Turns `platform` and `version` annotations into small sorted tables of
//! `(platform, [start, end), shape)` entries. "Is this declaration visible
//! at version V of platform P" is then a linear scan of one table.
//!
//! Types also get a version table: `platform` annotations carrying a
//! `type_version` number the type's interface versions, and a member's
//! `version(N)` annotation borrows the range of entry `N`.

mod merge;

use std::fmt;

use smallvec::SmallVec;
use xom_diagnostic::{Diagnostic, ErrorCode};
use xom_ir::{Annotation, DeclId, DeclarationTable, MemberId, Name, PlatformSpec};

use crate::par_map;
use crate::site::Site;

/// A platform contract, optionally narrowed by a feature gate.
#[derive(Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug)]
pub struct PlatformKey {
    pub contract: String,
    pub feature: Option<String>,
}

impl PlatformKey {
    pub fn contract(contract: impl Into<String>) -> Self {
        PlatformKey {
            contract: contract.into(),
            feature: None,
        }
    }

    fn from_spec(spec: &PlatformSpec, table: &DeclarationTable) -> Self {
        PlatformKey {
            contract: table.name(spec.contract).to_owned(),
            feature: spec.feature.map(|f| table.name(f).to_owned()),
        }
    }
}

impl fmt::Display for PlatformKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.feature {
            Some(feature) => write!(f, "{}[{feature}]", self.contract),
            None => f.write_str(&self.contract),
        }
    }
}

/// Half-open version range `[start, end)`; `end: None` is unbounded.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug)]
pub struct VersionRange {
    pub start: u32,
    pub end: Option<u32>,
}

impl VersionRange {
    pub const ALWAYS: VersionRange = VersionRange {
        start: 0,
        end: None,
    };

    pub fn contains(self, version: u32) -> bool {
        version >= self.start && self.end.map_or(true, |end| version < end)
    }

    pub fn overlaps(self, other: VersionRange) -> bool {
        let before_end = |start: u32, end: Option<u32>| end.map_or(true, |end| start < end);
        before_end(self.start, other.end) && before_end(other.start, self.end)
    }

    /// Smallest range covering both.
    pub fn union(self, other: VersionRange) -> VersionRange {
        VersionRange {
            start: self.start.min(other.start),
            end: match (self.end, other.end) {
                (Some(a), Some(b)) => Some(a.max(b)),
                _ => None,
            },
        }
    }
}

impl fmt::Display for VersionRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.end {
            Some(end) => write!(f, "[{}, {end})", self.start),
            None => write!(f, "[{}, ..)", self.start),
        }
    }
}

/// How a declaration looks within one range.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
pub struct GateShape {
    pub rename: Option<Name>,
}

#[derive(Clone, Eq, PartialEq, Debug)]
pub struct GateEntry {
    pub platform: PlatformKey,
    pub range: VersionRange,
    pub shape: GateShape,
}

/// Visibility entries of one declaration, sorted by platform then start.
#[derive(Clone, Eq, PartialEq, Debug, Default)]
pub struct GateTable {
    entries: SmallVec<[GateEntry; 2]>,
    /// Lowest type version index a member was introduced in.
    version_index: Option<u32>,
}

impl GateTable {
    pub fn entries(&self) -> &[GateEntry] {
        &self.entries
    }

    /// Shape of the declaration at `version` of `platform`, if visible.
    pub fn visible_at(&self, platform: &PlatformKey, version: u32) -> Option<&GateShape> {
        self.entries
            .iter()
            .find(|e| e.platform == *platform && e.range.contains(version))
            .map(|e| &e.shape)
    }

    pub fn is_visible(&self, platform: &PlatformKey, version: u32) -> bool {
        self.visible_at(platform, version).is_some()
    }

    /// Type version index from `version` annotations.
    pub fn version_index(&self) -> Option<u32> {
        self.version_index
    }

    /// First entry, the declaration's primary platform.
    pub fn primary(&self) -> Option<&GateEntry> {
        self.entries.first()
    }
}

/// One numbered interface version of a type.
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct TypeVersion {
    pub index: u32,
    pub platform: PlatformKey,
    pub range: VersionRange,
}

/// Gate tables of every declaration plus per-type version tables.
#[derive(Clone, Debug, Default)]
pub struct Gates {
    types: Vec<GateTable>,
    members: Vec<GateTable>,
    versions: Vec<Vec<TypeVersion>>,
}

impl Gates {
    pub fn ty(&self, id: DeclId) -> &GateTable {
        &self.types[id.index()]
    }

    pub fn member(&self, id: MemberId) -> &GateTable {
        &self.members[id.index()]
    }

    /// Version table of a type, sorted by index. Never empty.
    pub fn type_versions(&self, id: DeclId) -> &[TypeVersion] {
        &self.versions[id.index()]
    }

    pub fn type_version(&self, id: DeclId, index: u32) -> Option<&TypeVersion> {
        self.type_versions(id).iter().find(|v| v.index == index)
    }
}

/// Build gate tables for every declaration.
///
/// Declarations without annotations are visible from version zero: types on
/// `default_contract`, members on their owner's primary platform.
#[tracing::instrument(level = "debug", skip_all, fields(default_contract = %default_contract, parallel = parallel))]
pub fn build_gates(
    table: &DeclarationTable,
    default_contract: &str,
    parallel: bool,
) -> (Gates, Vec<Diagnostic>) {
    let mut diagnostics = Vec::new();

    let type_ids: Vec<DeclId> = table.types().map(|(id, _)| id).collect();
    let built = par_map(&type_ids, parallel, |id| gate_type(table, *id, default_contract));
    let mut types = Vec::with_capacity(built.len());
    let mut versions = Vec::with_capacity(built.len());
    for (gate, version_table, found) in built {
        types.push(gate);
        versions.push(version_table);
        diagnostics.extend(found);
    }

    let member_ids: Vec<MemberId> = table.members().map(|(id, _)| id).collect();
    let built = par_map(&member_ids, parallel, |id| {
        let owner = table.member(*id).owner;
        gate_member(table, *id, &types[owner.index()], &versions[owner.index()])
    });
    let mut members = Vec::with_capacity(built.len());
    for (gate, found) in built {
        members.push(gate);
        diagnostics.extend(found);
    }

    tracing::debug!(errors = diagnostics.len(), "version gates built");
    (
        Gates {
            types,
            members,
            versions,
        },
        diagnostics,
    )
}

fn gate_type(
    table: &DeclarationTable,
    id: DeclId,
    default_contract: &str,
) -> (GateTable, Vec<TypeVersion>, Vec<Diagnostic>) {
    let site = Site::Type(id);
    let mut diagnostics = Vec::new();
    let mut candidates = Vec::new();
    let mut versions: Vec<TypeVersion> = Vec::new();

    for spec in platforms(&table.ty(id).annotations) {
        let Some(range) = spec_range(spec, site, table, &mut diagnostics) else {
            continue;
        };
        let platform = PlatformKey::from_spec(spec, table);
        let index = spec.type_version.unwrap_or(1);
        if !versions.iter().any(|v| v.index == index) {
            versions.push(TypeVersion {
                index,
                platform: platform.clone(),
                range,
            });
        }
        candidates.push(GateEntry {
            platform,
            range,
            shape: GateShape {
                rename: spec.rename,
            },
        });
    }

    if candidates.is_empty() && diagnostics.is_empty() {
        candidates.push(GateEntry {
            platform: PlatformKey::contract(default_contract),
            range: VersionRange::ALWAYS,
            shape: GateShape::default(),
        });
    }
    if !versions.iter().any(|v| v.index == 1) {
        let primary = candidates
            .first()
            .map_or_else(|| PlatformKey::contract(default_contract), |e| e.platform.clone());
        versions.push(TypeVersion {
            index: 1,
            platform: primary,
            range: VersionRange::ALWAYS,
        });
    }
    versions.sort_by_key(|v| v.index);

    let entries = merge::merge(candidates, site, table, &mut diagnostics);
    let gate = GateTable {
        entries,
        version_index: None,
    };
    (gate, versions, diagnostics)
}

fn gate_member(
    table: &DeclarationTable,
    id: MemberId,
    owner: &GateTable,
    versions: &[TypeVersion],
) -> (GateTable, Vec<Diagnostic>) {
    let member = table.member(id);
    let site = Site::Member(id);
    let mut diagnostics = Vec::new();
    let mut candidates = Vec::new();
    let mut version_index: Option<u32> = None;

    for annotation in &member.annotations {
        match annotation {
            Annotation::Platform(spec) => {
                if let Some(range) = spec_range(spec, site, table, &mut diagnostics) {
                    candidates.push(GateEntry {
                        platform: PlatformKey::from_spec(spec, table),
                        range,
                        shape: GateShape {
                            rename: spec.rename,
                        },
                    });
                }
            }
            Annotation::Version(index) => {
                version_index = Some(version_index.map_or(*index, |v| v.min(*index)));
                match versions.iter().find(|v| v.index == *index) {
                    Some(version) => candidates.push(GateEntry {
                        platform: version.platform.clone(),
                        range: version.range,
                        shape: GateShape::default(),
                    }),
                    None => diagnostics.push(unknown_version(*index, versions, site, table)),
                }
            }
            _ => {}
        }
    }

    if candidates.is_empty() && diagnostics.is_empty() {
        if let Some(primary) = owner.primary() {
            candidates.push(GateEntry {
                platform: primary.platform.clone(),
                range: VersionRange::ALWAYS,
                shape: GateShape::default(),
            });
        }
    }

    let entries = merge::merge(candidates, site, table, &mut diagnostics);
    let gate = GateTable {
        entries,
        version_index,
    };
    (gate, diagnostics)
}

fn platforms(annotations: &[Annotation]) -> impl Iterator<Item = &PlatformSpec> {
    annotations.iter().filter_map(|a| match a {
        Annotation::Platform(spec) => Some(spec),
        _ => None,
    })
}

/// The range of one `platform` annotation; empty ranges are reported.
fn spec_range(
    spec: &PlatformSpec,
    site: Site,
    table: &DeclarationTable,
    diagnostics: &mut Vec<Diagnostic>,
) -> Option<VersionRange> {
    let range = VersionRange {
        start: spec.version,
        end: spec.until,
    };
    match spec.until {
        Some(until) if until <= spec.version => {
            diagnostics.push(
                Diagnostic::error(ErrorCode::E3002)
                    .with_message(format!(
                        "empty version range on `{}`: `until` {until} is not after `version` {}",
                        site.path(table),
                        spec.version
                    ))
                    .with_full_label(site.label(
                        table,
                        format!("`{}` {range}", table.name(spec.contract)),
                    )),
            );
            None
        }
        _ => Some(range),
    }
}

#[cold]
fn unknown_version(
    index: u32,
    versions: &[TypeVersion],
    site: Site,
    table: &DeclarationTable,
) -> Diagnostic {
    let known = versions
        .iter()
        .map(|v| v.index.to_string())
        .collect::<Vec<_>>()
        .join(", ");
    Diagnostic::error(ErrorCode::E1008)
        .with_message(format!(
            "`{}` refers to type version {index}, which its type does not declare",
            site.path(table)
        ))
        .with_full_label(site.label(table, format!("version({index})")))
        .with_note(format!("declared type versions: {known}"))
}

#[cfg(test)]
mod tests;
