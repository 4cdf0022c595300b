//! Union of version ranges per platform.

use smallvec::SmallVec;
use xom_diagnostic::{Diagnostic, ErrorCode};
use xom_ir::DeclarationTable;

use super::{GateEntry, GateShape};
use crate::site::Site;

/// Merge candidate entries into a sorted gate table.
///
/// Overlapping ranges of one platform merge when their shapes agree and are
/// an ambiguity otherwise. Every overlapping pair with differing shapes is
/// reported, and the later entry of such a pair is left out of the table.
/// Disjoint ranges stay separate, even when adjacent.
pub(super) fn merge(
    mut candidates: Vec<GateEntry>,
    site: Site,
    table: &DeclarationTable,
    diagnostics: &mut Vec<Diagnostic>,
) -> SmallVec<[GateEntry; 2]> {
    candidates.sort_by(|a, b| {
        (&a.platform, a.range.start, a.range.end.is_none(), a.range.end)
            .cmp(&(&b.platform, b.range.start, b.range.end.is_none(), b.range.end))
    });

    let mut dropped = vec![false; candidates.len()];
    for (i, first) in candidates.iter().enumerate() {
        for (j, second) in candidates.iter().enumerate().skip(i + 1) {
            if second.platform != first.platform {
                break;
            }
            if first.range.overlaps(second.range) && first.shape != second.shape {
                diagnostics.push(ambiguous(first, second, site, table));
                dropped[j] = true;
            }
        }
    }

    let mut merged: SmallVec<[GateEntry; 2]> = SmallVec::new();
    for (entry, dropped) in candidates.into_iter().zip(dropped) {
        if dropped {
            continue;
        }
        match merged.last_mut() {
            Some(last)
                if last.platform == entry.platform
                    && last.range.overlaps(entry.range)
                    && last.shape == entry.shape =>
            {
                last.range = last.range.union(entry.range);
            }
            _ => merged.push(entry),
        }
    }
    merged
}

#[cold]
fn ambiguous(
    first: &GateEntry,
    other: &GateEntry,
    site: Site,
    table: &DeclarationTable,
) -> Diagnostic {
    let describe = |shape: &GateShape| match shape.rename {
        Some(name) => format!("named `{}`", table.name(name)),
        None => "under its declared name".to_owned(),
    };
    Diagnostic::error(ErrorCode::E3001)
        .with_message(format!(
            "overlapping version ranges of `{}` on `{}` disagree on its shape",
            site.path(table),
            first.platform
        ))
        .with_full_label(site.label(
            table,
            format!(
                "{} {} overlaps {} {}",
                first.range,
                describe(&first.shape),
                other.range,
                describe(&other.shape)
            ),
        ))
        .with_suggestion("split the ranges so they do not overlap, or give them the same name")
}
