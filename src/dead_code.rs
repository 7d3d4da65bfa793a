use std::{fmt, num::NonZeroUsize};

use rowan::WalkEvent;
use tracing::debug;

use crate::{
    binding::{declarator_name, is_function_declarator, Binding, BindingKind, DeclId, Storage},
    group::{DeclGroup, GroupId, Groups},
    syntax::{child, has_token, SyntaxKind::*, SyntaxNode, SyntaxToken},
    usage::{find_references, References},
};

/// An unused variable declaration, and the counter that selects it
#[derive(Debug, Clone)]
pub struct DeadCode {
    pub index: NonZeroUsize,
    pub binding: Binding,
}

impl fmt::Display for DeadCode {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        write!(
            fmt,
            "unused {} variable `{}`",
            self.binding.storage,
            self.binding.name()
        )
    }
}

/// Every declaration of one program in source order, and the groups
/// they were declared in
#[derive(Debug, Clone, Default)]
pub struct Declarations {
    bindings: Vec<Binding>,
    groups: Groups,
}

impl Declarations {
    pub fn get(&self, id: DeclId) -> Option<&Binding> {
        self.bindings.get(id.0)
    }

    pub fn group_of(&self, id: DeclId) -> Option<&DeclGroup> {
        self.get(id)?.group.and_then(|group| self.groups.get(group))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Binding> {
        self.bindings.iter()
    }

    pub fn groups(&self) -> &Groups {
        &self.groups
    }

    /// Eligible declarations in source order
    pub fn candidates(&self) -> impl Iterator<Item = &Binding> {
        self.bindings.iter().filter(|binding| binding.is_candidate())
    }
}

/// Result of one pass over the tree
#[derive(Debug, Clone)]
pub struct Scan {
    /// number of eligible declarations
    pub count: usize,
    /// the declaration whose position among the eligible ones equals
    /// the requested index
    pub selected: Option<DeclId>,
    pub declarations: Declarations,
}

/// Walk all declarations once in source order, counting the unused
/// variables and picking the `index`th one.
pub fn scan(root: &SyntaxNode, references: &References, index: Option<NonZeroUsize>) -> Scan {
    let mut scanner = Scanner {
        references,
        index,
        count: 0,
        selected: None,
        declarations: Declarations::default(),
        open_groups: Vec::new(),
    };
    for event in root.preorder() {
        match event {
            WalkEvent::Enter(node) => scanner.enter(&node),
            WalkEvent::Leave(node) => {
                if node.kind() == NODE_DECL_GROUP {
                    scanner.open_groups.pop();
                }
            }
        }
    }
    debug!(
        count = scanner.count,
        declarations = scanner.declarations.bindings.len(),
        groups = scanner.declarations.groups.len(),
        "scanned declarations"
    );
    Scan {
        count: scanner.count,
        selected: scanner.selected,
        declarations: scanner.declarations,
    }
}

/// List every unused variable declaration of a program
pub fn find_dead_code(root: &SyntaxNode) -> Vec<DeadCode> {
    let references = find_references(root);
    let scan = scan(root, &references, None);
    scan.declarations
        .candidates()
        .zip(1..)
        .filter_map(|(binding, index)| {
            NonZeroUsize::new(index).map(|index| DeadCode {
                index,
                binding: binding.clone(),
            })
        })
        .collect()
}

struct Scanner<'a> {
    references: &'a References,
    index: Option<NonZeroUsize>,
    count: usize,
    selected: Option<DeclId>,
    declarations: Declarations,
    /// groups entered but not yet left, innermost last
    open_groups: Vec<GroupId>,
}

impl Scanner<'_> {
    fn enter(&mut self, node: &SyntaxNode) {
        match node.kind() {
            NODE_DECL_GROUP => {
                let group = self.declarations.groups.open(node.clone());
                self.open_groups.push(group);
            }
            NODE_INIT_DECLARATOR => self.init_declarator(node),
            NODE_PARAM => {
                if let Some(name) = child(node, NODE_DECLARATOR).and_then(|d| declarator_name(&d)) {
                    self.push(name, node, BindingKind::Parameter, Storage::Local, None);
                }
            }
            NODE_FUNCTION_DEF => {
                if let Some(name) = child(node, NODE_DECLARATOR).and_then(|d| declarator_name(&d)) {
                    self.push(name, node, BindingKind::Function, Storage::Global, None);
                }
            }
            NODE_ENUMERATOR => {
                if let Some(name) = child(node, NODE_NAME).and_then(|name| name.first_token()) {
                    self.push(name, node, BindingKind::Enumerator, storage_of(node), None);
                }
            }
            _ => {}
        }
    }

    fn init_declarator(&mut self, node: &SyntaxNode) {
        let Some(group_node) = node.parent() else {
            return;
        };
        let Some(declarator) = child(node, NODE_DECLARATOR) else {
            return;
        };
        let Some(name) = declarator_name(&declarator) else {
            return;
        };

        let typedef = child(&group_node, NODE_SPECIFIERS)
            .map_or(false, |specifiers| has_token(&specifiers, TOKEN_TYPEDEF));
        let old_style_param = group_node
            .parent()
            .map_or(false, |parent| parent.kind() == NODE_FUNCTION_DEF);
        let kind = if typedef {
            BindingKind::Typedef
        } else if old_style_param {
            BindingKind::Parameter
        } else if is_function_declarator(&declarator) {
            BindingKind::Function
        } else {
            BindingKind::Variable
        };
        // a direct child of the innermost open group
        let group = self.open_groups.last().copied();
        self.push(name, node, kind, storage_of(&group_node), group);
    }

    fn push(
        &mut self,
        name: SyntaxToken,
        node: &SyntaxNode,
        kind: BindingKind,
        storage: Storage,
        group: Option<GroupId>,
    ) {
        let id = DeclId(self.declarations.bindings.len());
        let referenced = self.references.is_referenced(&name);
        let binding = Binding::new(id, name, node.clone(), kind, storage, group, referenced);

        if let Some(group) = group {
            self.declarations.groups.add_member(group, id);
        }
        if binding.is_candidate() {
            self.count += 1;
            if self.index.map_or(false, |index| index.get() == self.count) {
                debug!(name = binding.name(), count = self.count, "selected declaration");
                self.selected = Some(id);
            }
        }
        self.declarations.bindings.push(binding);
    }
}

fn storage_of(node: &SyntaxNode) -> Storage {
    let local = node
        .ancestors()
        .any(|ancestor| matches!(ancestor.kind(), NODE_FUNCTION_DEF | NODE_PARAM_LIST));
    if local {
        Storage::Local
    } else {
        Storage::Global
    }
}
