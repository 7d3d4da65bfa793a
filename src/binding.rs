use std::fmt;

use crate::{
    group::GroupId,
    syntax::{child, SyntaxKind::*, SyntaxNode, SyntaxToken},
};

/// Position of a declaration in source order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DeclId(pub(crate) usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindingKind {
    Variable,
    Parameter,
    Function,
    Typedef,
    Enumerator,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Storage {
    Global,
    Local,
}

impl fmt::Display for Storage {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Storage::Global => write!(fmt, "global"),
            Storage::Local => write!(fmt, "local"),
        }
    }
}

/// One declared name, with the syntax that declares it
#[derive(Debug, Clone)]
pub struct Binding {
    pub id: DeclId,
    pub name: SyntaxToken,
    /// `NODE_INIT_DECLARATOR`, `NODE_PARAM`, `NODE_FUNCTION_DEF`, or
    /// `NODE_ENUMERATOR`
    pub node: SyntaxNode,
    pub kind: BindingKind,
    pub storage: Storage,
    pub group: Option<GroupId>,
    referenced: bool,
}

impl PartialEq for Binding {
    fn eq(&self, other: &Self) -> bool {
        self.node == other.node && self.name == other.name
    }
}
impl Eq for Binding {}

impl Binding {
    pub fn new(
        id: DeclId,
        name: SyntaxToken,
        node: SyntaxNode,
        kind: BindingKind,
        storage: Storage,
        group: Option<GroupId>,
        referenced: bool,
    ) -> Self {
        Binding {
            id,
            name,
            node,
            kind,
            storage,
            group,
            referenced,
        }
    }

    pub fn name(&self) -> &str {
        self.name.text()
    }

    pub fn is_referenced(&self) -> bool {
        self.referenced
    }

    pub fn is_parameter(&self) -> bool {
        self.kind == BindingKind::Parameter
    }

    /// An unreferenced variable that is not a parameter
    pub fn is_candidate(&self) -> bool {
        self.kind == BindingKind::Variable && !self.referenced
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Derivation {
    Pointer,
    Array,
    Function,
}

/// Finds the declarator level that holds the name together with the
/// first type derivation applied to it: suffixes bind tighter than `*`,
/// and parentheses nest.
fn derivation(declarator: &SyntaxNode) -> Option<(SyntaxNode, Derivation)> {
    let inner = child(declarator, NODE_NESTED_DECLARATOR)
        .and_then(|nested| child(&nested, NODE_DECLARATOR));
    if let Some(found) = inner.and_then(|inner| derivation(&inner)) {
        return Some(found);
    }

    let suffix = declarator.children().find_map(|node| match node.kind() {
        NODE_PARAM_LIST => Some(Derivation::Function),
        NODE_ARRAY_SUFFIX => Some(Derivation::Array),
        _ => None,
    });
    suffix
        .or_else(|| {
            declarator
                .children_with_tokens()
                .any(|element| element.kind() == TOKEN_STAR)
                .then_some(Derivation::Pointer)
        })
        .map(|derived| (declarator.clone(), derived))
}

/// `int *f(void)` declares a function, `int (*f)(void)` a variable
pub fn is_function_declarator(declarator: &SyntaxNode) -> bool {
    matches!(derivation(declarator), Some((_, Derivation::Function)))
}

/// The parameter list of a function declarator
pub fn function_params(declarator: &SyntaxNode) -> Option<SyntaxNode> {
    match derivation(declarator)? {
        (level, Derivation::Function) => child(&level, NODE_PARAM_LIST),
        _ => None,
    }
}

/// The identifier a `NODE_DECLARATOR` declares, if it is not abstract
pub fn declarator_name(declarator: &SyntaxNode) -> Option<SyntaxToken> {
    for node in declarator.children() {
        match node.kind() {
            NODE_NAME => return node.first_token(),
            NODE_NESTED_DECLARATOR => {
                return child(&node, NODE_DECLARATOR).and_then(|inner| declarator_name(&inner))
            }
            _ => {}
        }
    }
    None
}
