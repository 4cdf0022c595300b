//! Emission context and text output buffer.
//!
//! `EmitContext` gives emitters read-only access to the declaration table
//! and the analysis results, plus the canonical declaration order.
//! `TextWriter` is the indented line buffer text renderers write into.

use xom_ir::{Artifact, DeclId, DeclarationTable, MemberId, Name};
use xom_sema::{Analysis, GateTable, ResolvedType};

/// Emission context shared by all emitters.
pub struct EmitContext<'a> {
    pub table: &'a DeclarationTable,
    pub analysis: &'a Analysis,
    /// Types ordered by (namespace, name), then table order.
    order: Vec<DeclId>,
}

impl<'a> EmitContext<'a> {
    pub fn new(table: &'a DeclarationTable, analysis: &'a Analysis) -> Self {
        let mut order: Vec<DeclId> = table.types().map(|(id, _)| id).collect();
        order.sort_by(|a, b| {
            let (a_decl, b_decl) = (table.ty(*a), table.ty(*b));
            table
                .name(a_decl.namespace)
                .cmp(table.name(b_decl.namespace))
                .then_with(|| table.name(a_decl.name).cmp(table.name(b_decl.name)))
                .then_with(|| a.cmp(b))
        });
        EmitContext {
            table,
            analysis,
            order,
        }
    }

    /// Resolve a name to its string.
    #[inline]
    pub fn name(&self, name: Name) -> &'a str {
        let table: &'a DeclarationTable = self.table;
        table.name(name)
    }

    pub fn fqn(&self, id: DeclId) -> String {
        self.table.qualified_name(id)
    }

    /// Render a resolved type with fully-qualified names.
    pub fn type_text(&self, ty: ResolvedType) -> String {
        self.analysis.graph.display(ty, self.table)
    }

    /// Every type, in output order.
    pub fn types_in_order(&self) -> impl Iterator<Item = DeclId> + '_ {
        self.order.iter().copied()
    }

    /// Types visible in `artifact`, in output order.
    pub fn types_in(&self, artifact: Artifact) -> impl Iterator<Item = DeclId> + '_ {
        self.order
            .iter()
            .copied()
            .filter(move |id| self.analysis.shapes.ty(*id).is_visible_in(artifact))
    }

    /// Members of `ty` visible in `artifact`, in declaration order.
    pub fn members_in(&self, ty: DeclId, artifact: Artifact) -> impl Iterator<Item = MemberId> + 'a {
        let (table, analysis): (&'a DeclarationTable, &'a Analysis) = (self.table, self.analysis);
        let shapes = &analysis.shapes;
        table
            .ty(ty)
            .members
            .iter()
            .copied()
            .filter(move |id| shapes.member(*id).is_visible_in(artifact))
    }

    pub fn type_gate(&self, id: DeclId) -> &'a GateTable {
        let analysis: &'a Analysis = self.analysis;
        analysis.gates.ty(id)
    }

    pub fn member_gate(&self, id: MemberId) -> &'a GateTable {
        let analysis: &'a Analysis = self.analysis;
        analysis.gates.member(id)
    }
}

/// Indented line buffer.
#[derive(Default)]
pub struct TextWriter {
    indent: usize,
    output: String,
}

impl TextWriter {
    pub fn new() -> Self {
        TextWriter {
            indent: 0,
            output: String::with_capacity(4096),
        }
    }

    pub fn indent(&mut self) {
        self.indent += 1;
    }

    pub fn dedent(&mut self) {
        debug_assert!(self.indent > 0, "dedent called with zero indent");
        self.indent = self.indent.saturating_sub(1);
    }

    /// Write a line at the current indentation.
    pub fn line(&mut self, s: &str) {
        for _ in 0..self.indent {
            self.output.push_str("  ");
        }
        self.output.push_str(s);
        self.output.push('\n');
    }

    pub fn blank(&mut self) {
        self.output.push('\n');
    }

    pub fn take_output(&mut self) -> String {
        std::mem::take(&mut self.output)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_indent_dedent() {
        let mut out = TextWriter::new();
        out.line("class A");
        out.indent();
        out.line("property P");
        out.indent();
        out.line("storage bool");
        out.dedent();
        out.dedent();
        out.blank();
        out.line("class B");
        assert_eq!(
            out.take_output(),
            "class A\n  property P\n    storage bool\n\nclass B\n"
        );
        assert_eq!(out.take_output(), "");
    }
}
