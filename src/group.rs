//! Declaration groups: statements that declare one or more names under
//! one set of specifiers, such as `int a, b = 2, *c;`.

use crate::{
    binding::DeclId,
    syntax::{child, SyntaxKind::*, SyntaxNode},
};

/// Index of a group in its `Groups` arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GroupId(usize);

#[derive(Debug, Clone)]
pub struct DeclGroup {
    /// The `NODE_DECL_GROUP`
    pub node: SyntaxNode,
    /// Declarators in source order
    pub members: Vec<DeclId>,
}

impl DeclGroup {
    pub fn contains(&self, id: DeclId) -> bool {
        self.members.contains(&id)
    }

    pub fn position(&self, id: DeclId) -> Option<usize> {
        self.members.iter().position(|member| *member == id)
    }

    pub fn is_single(&self) -> bool {
        self.members.len() == 1
    }

    /// `struct S { ... } s;` also defines a type that must survive
    pub fn defines_tag(&self) -> bool {
        child(&self.node, NODE_SPECIFIERS)
            .into_iter()
            .flat_map(|specifiers| specifiers.children())
            .filter(|node| node.kind() == NODE_TAG_SPECIFIER)
            .any(|tag| {
                tag.children()
                    .any(|body| matches!(body.kind(), NODE_STRUCT_BODY | NODE_ENUM_BODY))
            })
    }
}

/// All groups of one program, built during the scan
#[derive(Debug, Clone, Default)]
pub struct Groups {
    groups: Vec<DeclGroup>,
}

impl Groups {
    pub fn open(&mut self, node: SyntaxNode) -> GroupId {
        self.groups.push(DeclGroup {
            node,
            members: Vec::new(),
        });
        GroupId(self.groups.len() - 1)
    }

    pub fn add_member(&mut self, group: GroupId, member: DeclId) {
        if let Some(group) = self.groups.get_mut(group.0) {
            group.members.push(member);
        }
    }

    pub fn get(&self, group: GroupId) -> Option<&DeclGroup> {
        self.groups.get(group.0)
    }

    pub(crate) fn len(&self) -> usize {
        self.groups.len()
    }
}
