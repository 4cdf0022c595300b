//! Declarations as diagnostic locations.

use xom_diagnostic::Label;
use xom_ir::{DeclId, DeclarationTable, MemberId};

/// A type or member declaration a diagnostic points at.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub(crate) enum Site {
    Type(DeclId),
    Member(MemberId),
}

impl Site {
    pub(crate) fn path(self, table: &DeclarationTable) -> String {
        match self {
            Site::Type(id) => table.qualified_name(id),
            Site::Member(id) => table.member_path(id),
        }
    }

    fn file(self, table: &DeclarationTable) -> &str {
        let decl = match self {
            Site::Type(id) => id,
            Site::Member(id) => table.member(id).owner,
        };
        table.file_path(table.ty(decl).file)
    }

    pub(crate) fn label(self, table: &DeclarationTable, message: impl Into<String>) -> Label {
        Label::primary(self.path(table), message).in_file(self.file(table))
    }

    pub(crate) fn secondary_label(
        self,
        table: &DeclarationTable,
        message: impl Into<String>,
    ) -> Label {
        Label::secondary(self.path(table), message).in_file(self.file(table))
    }
}
