//! The declaration table: flat arena of every parsed declaration.

use crate::{
    DeclId, FileId, MemberDeclaration, MemberId, Name, StringInterner, TypeDeclaration, TypeRef,
};

/// Owns all raw declarations of one generation run.
///
/// Types and members live in two flat arenas addressed by [`DeclId`] and
/// [`MemberId`]; a type lists its members in declaration order. The table is
/// populated once (by [`crate::raw::lower`] or the builder methods) and is
/// only read afterwards.
#[derive(Clone, Debug, Default)]
pub struct DeclarationTable {
    interner: StringInterner,
    files: Vec<String>,
    types: Vec<TypeDeclaration>,
    members: Vec<MemberDeclaration>,
}

fn arena_index(len: usize, what: &str) -> u32 {
    u32::try_from(len).unwrap_or_else(|_| panic!("declaration table exceeded u32::MAX {what}"))
}

impl DeclarationTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn interner(&self) -> &StringInterner {
        &self.interner
    }

    pub(crate) fn interner_mut(&mut self) -> &mut StringInterner {
        &mut self.interner
    }

    pub fn intern(&mut self, s: &str) -> Name {
        self.interner.intern(s)
    }

    /// Look up the string for a Name.
    pub fn name(&self, name: Name) -> &str {
        self.interner.lookup(name)
    }

    /// Register a declaration file path.
    pub fn add_file(&mut self, path: impl Into<String>) -> FileId {
        let id = FileId::from_raw(arena_index(self.files.len(), "files"));
        self.files.push(path.into());
        id
    }

    pub fn file_path(&self, file: FileId) -> &str {
        self.files.get(file.index()).map_or("<unknown>", String::as_str)
    }

    /// Add a type. Its members are attached with [`Self::add_member`].
    pub fn add_type(&mut self, decl: TypeDeclaration) -> DeclId {
        let id = DeclId::from_raw(arena_index(self.types.len(), "types"));
        self.types.push(decl);
        id
    }

    /// Add a member and append it to its owner's member list.
    pub fn add_member(&mut self, member: MemberDeclaration) -> MemberId {
        let id = MemberId::from_raw(arena_index(self.members.len(), "members"));
        let owner = member.owner;
        self.members.push(member);
        if let Some(owner) = self.types.get_mut(owner.index()) {
            owner.members.push(id);
        }
        id
    }

    /// # Panics
    /// Panics if `id` was not produced by this table.
    pub fn ty(&self, id: DeclId) -> &TypeDeclaration {
        &self.types[id.index()]
    }

    /// # Panics
    /// Panics if `id` was not produced by this table.
    pub fn member(&self, id: MemberId) -> &MemberDeclaration {
        &self.members[id.index()]
    }

    pub fn types(&self) -> impl ExactSizeIterator<Item = (DeclId, &TypeDeclaration)> {
        self.types
            .iter()
            .enumerate()
            .map(|(i, decl)| (DeclId::from_raw(arena_index(i, "types")), decl))
    }

    pub fn members(&self) -> impl ExactSizeIterator<Item = (MemberId, &MemberDeclaration)> {
        self.members
            .iter()
            .enumerate()
            .map(|(i, member)| (MemberId::from_raw(arena_index(i, "members")), member))
    }

    pub fn type_count(&self) -> usize {
        self.types.len()
    }

    pub fn member_count(&self) -> usize {
        self.members.len()
    }

    pub fn file_count(&self) -> usize {
        self.files.len()
    }

    /// `Namespace.TypeName`, or just `TypeName` in the empty namespace.
    pub fn qualified_name(&self, id: DeclId) -> String {
        let decl = self.ty(id);
        qualify(self.name(decl.namespace), self.name(decl.name))
    }

    /// `Namespace.TypeName.MemberName`.
    pub fn member_path(&self, id: MemberId) -> String {
        let member = self.member(id);
        format!(
            "{}.{}",
            self.qualified_name(member.owner),
            self.name(member.name)
        )
    }

    /// Render a type reference back to text.
    pub fn type_ref_text(&self, ty: &TypeRef) -> String {
        ty.display(&self.interner).to_string()
    }
}

/// Join a namespace and a simple name.
pub(crate) fn qualify(namespace: &str, name: &str) -> String {
    if namespace.is_empty() {
        name.to_owned()
    } else {
        format!("{namespace}.{name}")
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::{AccessorShape, MemberKind, TypeKind, Visibility};

    fn class(table: &mut DeclarationTable, namespace: &str, name: &str) -> DeclId {
        let file = table.add_file("controls.xom.json");
        let decl = TypeDeclaration {
            name: table.intern(name),
            namespace: table.intern(namespace),
            kind: TypeKind::Class,
            base: None,
            interfaces: Vec::new(),
            visibility: Visibility::Public,
            type_params: Vec::new(),
            annotations: Vec::new(),
            members: Vec::new(),
            file,
        };
        table.add_type(decl)
    }

    #[test]
    fn test_members_attach_to_owner_in_order() {
        let mut table = DeclarationTable::new();
        let frame = class(&mut table, "Microsoft.UI.Xaml.Controls", "Frame");
        for name in ["CacheSize", "CanGoBack"] {
            let member = MemberDeclaration {
                owner: frame,
                name: table.intern(name),
                kind: MemberKind::Property,
                ty: None,
                accessor: AccessorShape::GetSet,
                params: Vec::new(),
                value: None,
                annotations: Vec::new(),
            };
            table.add_member(member);
        }

        let members: Vec<_> = table
            .ty(frame)
            .members
            .iter()
            .map(|id| table.member_path(*id))
            .collect();
        assert_eq!(
            members,
            vec![
                "Microsoft.UI.Xaml.Controls.Frame.CacheSize",
                "Microsoft.UI.Xaml.Controls.Frame.CanGoBack",
            ]
        );
    }

    #[test]
    fn test_qualified_name_in_empty_namespace() {
        let mut table = DeclarationTable::new();
        let foo = class(&mut table, "", "Foo");
        assert_eq!(table.qualified_name(foo), "Foo");
        assert_eq!(table.file_path(table.ty(foo).file), "controls.xom.json");
    }
}
