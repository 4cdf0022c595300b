//! Identity Registrar.
//!
//! Checks stable identifiers and name identity across the whole table:
//!
//! - every GUID is well formed and unique (case-insensitive, braces ignored);
//! - classes, interfaces and delegates visible in the interface or projection
//!   artifact carry a GUID;
//! - no two types share a fully-qualified name, ignoring case;
//! - no two members of one type share a name, ignoring case, except methods
//!   overloading each other.
//!
//! Every violation lands in one aggregated diagnostic.

use std::collections::BTreeMap;
use std::fmt::Write as _;

use rustc_hash::FxHashMap;
use xom_diagnostic::{Diagnostic, ErrorCode};
use xom_ir::{DeclId, DeclarationTable, MemberId, MemberKind, TypeKind};

use crate::resolve::Shapes;
use crate::site::Site;

/// Lowercase a GUID and strip surrounding braces.
pub fn normalize_guid(text: &str) -> String {
    let trimmed = text.trim();
    let inner = trimmed
        .strip_prefix('{')
        .and_then(|s| s.strip_suffix('}'))
        .unwrap_or(trimmed);
    inner.to_ascii_lowercase()
}

/// Whether a normalized GUID has the `8-4-4-4-12` hex layout.
pub fn is_well_formed(normalized: &str) -> bool {
    const GROUPS: [usize; 5] = [8, 4, 4, 4, 12];
    let groups: Vec<&str> = normalized.split('-').collect();
    groups.len() == GROUPS.len()
        && groups
            .iter()
            .zip(GROUPS)
            .all(|(group, len)| group.len() == len && group.bytes().all(|b| b.is_ascii_hexdigit()))
}

/// Normalized GUID to the one type declaring it, and back.
#[derive(Clone, Debug, Default)]
pub struct IdentityTable {
    by_guid: BTreeMap<String, DeclId>,
    by_decl: FxHashMap<DeclId, String>,
}

impl IdentityTable {
    fn insert(&mut self, guid: String, decl: DeclId) {
        self.by_decl.insert(decl, guid.clone());
        self.by_guid.insert(guid, decl);
    }

    pub fn get(&self, guid: &str) -> Option<DeclId> {
        self.by_guid.get(&normalize_guid(guid)).copied()
    }

    /// Normalized GUID of `decl`, if it carries a valid unique one.
    pub fn guid_of(&self, decl: DeclId) -> Option<&str> {
        self.by_decl.get(&decl).map(String::as_str)
    }

    /// Entries in GUID order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, DeclId)> {
        self.by_guid.iter().map(|(guid, id)| (guid.as_str(), *id))
    }

    pub fn len(&self) -> usize {
        self.by_guid.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_guid.is_empty()
    }
}

/// One identity problem.
#[derive(Clone, Eq, PartialEq, Debug)]
pub enum IdentityViolation {
    Missing(DeclId),
    Malformed { decl: DeclId, value: String },
    DuplicateGuid { guid: String, decls: Vec<DeclId> },
    TypeNameCollision(Vec<DeclId>),
    MemberNameCollision(Vec<MemberId>),
}

impl IdentityViolation {
    fn sites(&self) -> Vec<Site> {
        match self {
            IdentityViolation::Missing(decl) | IdentityViolation::Malformed { decl, .. } => {
                vec![Site::Type(*decl)]
            }
            IdentityViolation::DuplicateGuid { decls, .. }
            | IdentityViolation::TypeNameCollision(decls) => {
                decls.iter().map(|d| Site::Type(*d)).collect()
            }
            IdentityViolation::MemberNameCollision(members) => {
                members.iter().map(|m| Site::Member(*m)).collect()
            }
        }
    }

    fn describe(&self, table: &DeclarationTable) -> String {
        let list = |sites: Vec<Site>| {
            sites
                .iter()
                .map(|s| format!("`{}`", s.path(table)))
                .collect::<Vec<_>>()
                .join(", ")
        };
        match self {
            IdentityViolation::Missing(decl) => format!(
                "`{}` is generated into the interface or projection but has no `guid`",
                table.qualified_name(*decl)
            ),
            IdentityViolation::Malformed { decl, value } => format!(
                "`{}` has malformed guid `{value}`",
                table.qualified_name(*decl)
            ),
            IdentityViolation::DuplicateGuid { guid, .. } => {
                format!("guid `{guid}` is shared by {}", list(self.sites()))
            }
            IdentityViolation::TypeNameCollision(_) => {
                format!("type names collide ignoring case: {}", list(self.sites()))
            }
            IdentityViolation::MemberNameCollision(_) => {
                format!("member names collide ignoring case: {}", list(self.sites()))
            }
        }
    }
}

fn requires_guid(kind: TypeKind) -> bool {
    matches!(
        kind,
        TypeKind::Class | TypeKind::Interface | TypeKind::Delegate
    )
}

/// Register every GUID and collect all identity violations.
#[tracing::instrument(level = "debug", skip_all, fields(types = table.type_count()))]
pub fn register_identities(
    table: &DeclarationTable,
    shapes: &Shapes,
) -> (IdentityTable, Vec<IdentityViolation>) {
    let mut violations = Vec::new();

    let mut by_guid: BTreeMap<String, Vec<DeclId>> = BTreeMap::new();
    for (id, decl) in table.types() {
        let shape = shapes.ty(id);
        match shape.guid {
            Some(value) => {
                let text = table.name(value);
                let normalized = normalize_guid(text);
                if is_well_formed(&normalized) {
                    by_guid.entry(normalized).or_default().push(id);
                } else {
                    violations.push(IdentityViolation::Malformed {
                        decl: id,
                        value: text.to_owned(),
                    });
                }
            }
            None => {
                let surfaced = shape.artifacts.intersects(
                    xom_ir::ArtifactSet::INTERFACE | xom_ir::ArtifactSet::PROJECTION,
                );
                if surfaced && requires_guid(decl.kind) {
                    violations.push(IdentityViolation::Missing(id));
                }
            }
        }
    }

    let mut identities = IdentityTable::default();
    for (guid, decls) in by_guid {
        if let [only] = decls[..] {
            identities.insert(guid, only);
        } else {
            violations.push(IdentityViolation::DuplicateGuid { guid, decls });
        }
    }

    let mut by_name: BTreeMap<String, Vec<DeclId>> = BTreeMap::new();
    for (id, _) in table.types() {
        by_name
            .entry(table.qualified_name(id).to_lowercase())
            .or_default()
            .push(id);
    }
    violations.extend(
        by_name
            .into_values()
            .filter(|decls| decls.len() > 1)
            .map(IdentityViolation::TypeNameCollision),
    );

    for (_, decl) in table.types() {
        let mut by_member: BTreeMap<String, Vec<MemberId>> = BTreeMap::new();
        for member in &decl.members {
            by_member
                .entry(table.name(table.member(*member).name).to_lowercase())
                .or_default()
                .push(*member);
        }
        violations.extend(
            by_member
                .into_values()
                .filter(|members| {
                    members.len() > 1
                        && !members
                            .iter()
                            .all(|m| table.member(*m).kind == MemberKind::Method)
                })
                .map(IdentityViolation::MemberNameCollision),
        );
    }

    tracing::debug!(
        guids = identities.len(),
        violations = violations.len(),
        "identities registered"
    );
    (identities, violations)
}

/// Fold all violations into one diagnostic, or `None` when there are none.
pub fn identity_diagnostic(
    violations: &[IdentityViolation],
    table: &DeclarationTable,
) -> Option<Diagnostic> {
    if violations.is_empty() {
        return None;
    }
    let mut message = format!(
        "identity validation failed with {} violation{}",
        violations.len(),
        if violations.len() == 1 { "" } else { "s" }
    );
    let mut diagnostic = Diagnostic::error(ErrorCode::E4001);
    let mut labelled = false;
    for violation in violations {
        let description = violation.describe(table);
        let _ = write!(message, "\n  - {description}");
        for site in violation.sites() {
            let label = if labelled {
                site.secondary_label(table, identity_problem(violation))
            } else {
                labelled = true;
                site.label(table, identity_problem(violation))
            };
            diagnostic = diagnostic.with_full_label(label);
        }
    }
    Some(diagnostic.with_message(message))
}

fn identity_problem(violation: &IdentityViolation) -> &'static str {
    match violation {
        IdentityViolation::Missing(_) => "missing guid",
        IdentityViolation::Malformed { .. } => "malformed guid",
        IdentityViolation::DuplicateGuid { .. } => "duplicate guid",
        IdentityViolation::TypeNameCollision(_) => "colliding type name",
        IdentityViolation::MemberNameCollision(_) => "colliding member name",
    }
}
