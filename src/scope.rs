use std::collections::HashMap;

use rowan::TextRange;

use crate::syntax::{SyntaxKind, SyntaxNode};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeKind {
    File,
    Function,
    Block,
    For,
    Prototype,
}

/// What an ordinary identifier stands for
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Entity {
    /// A variable, identified by the range of its declared name
    Variable { decl: TextRange, linkage: bool },
    /// Functions, parameters, typedef names, and enumerators. They
    /// shadow variables but are never removed.
    Other,
}

/// Names declared in one C scope
#[derive(Debug, Clone)]
pub struct Scope {
    pub kind: ScopeKind,
    names: HashMap<String, Entity>,
}

impl Scope {
    /// Construct a new Scope *if* this is an AST node that opens one.
    ///
    /// Function definitions open theirs explicitly, since the parameter
    /// list and the body share it.
    pub fn new(node: &SyntaxNode) -> Option<Self> {
        let kind = match node.kind() {
            SyntaxKind::NODE_ROOT => ScopeKind::File,
            SyntaxKind::NODE_COMPOUND_STMT => ScopeKind::Block,
            SyntaxKind::NODE_FOR_STMT => ScopeKind::For,
            SyntaxKind::NODE_PARAM_LIST => ScopeKind::Prototype,
            _ => return None,
        };
        Some(Scope::empty(kind))
    }

    pub fn empty(kind: ScopeKind) -> Self {
        Scope {
            kind,
            names: HashMap::new(),
        }
    }

    /// Later declarations of the same name replace earlier ones
    pub fn declare(&mut self, name: &str, entity: Entity) {
        self.names.insert(name.to_string(), entity);
    }

    pub fn lookup(&self, name: &str) -> Option<&Entity> {
        self.names.get(name)
    }
}
