use std::collections::{HashMap, HashSet};

use rowan::TextRange;
use tracing::trace;

use crate::{
    binding::{declarator_name, function_params, is_function_declarator},
    scope::{Entity, Scope, ScopeKind},
    syntax::{child, has_token, SyntaxKind::*, SyntaxNode, SyntaxToken},
};

/// Variable declarations that are referenced somewhere in the program,
/// keyed by the range of their declared name
#[derive(Debug, Clone, Default)]
pub struct References {
    declarations: HashSet<TextRange>,
}

impl References {
    pub fn is_referenced(&self, name: &SyntaxToken) -> bool {
        self.declarations.contains(&name.text_range())
    }
}

/// Resolve every identifier expression to the variable it names.
///
/// Writes count as references just like reads do, and so do `sizeof`
/// operands. Declarations with linkage that share a name are one entity.
pub fn find_references(root: &SyntaxNode) -> References {
    let mut resolver = Resolver::default();
    resolver.walk(root);
    resolver.finish()
}

#[derive(Default)]
struct Resolver {
    scopes: Vec<Scope>,
    /// declarations with linkage, by name
    linked: HashMap<String, Vec<TextRange>>,
    linked_referenced: HashSet<String>,
    referenced: HashSet<TextRange>,
    /// the parameter list of the function definition being entered
    definition_params: Option<SyntaxNode>,
}

impl Resolver {
    fn walk(&mut self, node: &SyntaxNode) {
        match node.kind() {
            NODE_FUNCTION_DEF => self.function_def(node),
            NODE_DECL_GROUP => self.decl_group(node),
            NODE_PARAM => {
                self.walk_children(node);
                if let Some(name) = child(node, NODE_DECLARATOR).and_then(|d| declarator_name(&d)) {
                    self.declare(&name, Entity::Other);
                }
            }
            NODE_ENUMERATOR => {
                // in scope after its own value
                self.walk_children(node);
                if let Some(name) = child(node, NODE_NAME).and_then(|name| name.first_token()) {
                    self.declare(&name, Entity::Other);
                }
            }
            NODE_NAME_REF => self.reference(node),
            NODE_PARAM_LIST if self.definition_params.as_ref() == Some(node) => {
                // parameters of a definition live in the function scope
                self.definition_params = None;
                self.walk_children(node);
            }
            _ => match Scope::new(node) {
                Some(scope) => {
                    self.scopes.push(scope);
                    self.walk_children(node);
                    self.scopes.pop();
                }
                None => self.walk_children(node),
            },
        }
    }

    fn walk_children(&mut self, node: &SyntaxNode) {
        for child in node.children() {
            self.walk(&child);
        }
    }

    fn function_def(&mut self, node: &SyntaxNode) {
        if let Some(specifiers) = child(node, NODE_SPECIFIERS) {
            self.walk(&specifiers);
        }
        let declarator = child(node, NODE_DECLARATOR);
        if let Some(name) = declarator.as_ref().and_then(declarator_name) {
            self.declare(&name, Entity::Other);
        }

        self.scopes.push(Scope::empty(ScopeKind::Function));
        self.definition_params = declarator.as_ref().and_then(function_params);
        for child in node.children().filter(|child| child.kind() != NODE_SPECIFIERS) {
            self.walk(&child);
        }
        self.definition_params = None;
        self.scopes.pop();
    }

    fn decl_group(&mut self, node: &SyntaxNode) {
        let specifiers = child(node, NODE_SPECIFIERS);
        let typedef = specifiers
            .as_ref()
            .map_or(false, |specifiers| has_token(specifiers, TOKEN_TYPEDEF));
        // parameter declarations of an old-style definition
        let parameters = node
            .parent()
            .map_or(false, |parent| parent.kind() == NODE_FUNCTION_DEF);
        let linkage = node.parent().map_or(false, |parent| parent.kind() == NODE_ROOT)
            || specifiers
                .as_ref()
                .map_or(false, |specifiers| has_token(specifiers, TOKEN_EXTERN));

        for child in node.children() {
            if child.kind() == NODE_INIT_DECLARATOR {
                self.init_declarator(&child, typedef || parameters, linkage);
            } else {
                self.walk(&child);
            }
        }
    }

    /// Declares the name of `node` as a variable unless `other` says it
    /// names something else
    fn init_declarator(&mut self, node: &SyntaxNode, other: bool, linkage: bool) {
        let declarator = child(node, NODE_DECLARATOR);
        if let Some(declarator) = &declarator {
            self.walk(declarator);
        }

        // the name is visible in its own initializer
        if let Some(declarator) = &declarator {
            if let Some(name) = declarator_name(declarator) {
                let entity = if other || is_function_declarator(declarator) {
                    Entity::Other
                } else {
                    Entity::Variable {
                        decl: name.text_range(),
                        linkage,
                    }
                };
                if linkage && entity != Entity::Other {
                    self.linked
                        .entry(name.text().to_string())
                        .or_default()
                        .push(name.text_range());
                }
                self.declare(&name, entity);
            }
        }

        for child in node.children().filter(|child| child.kind() != NODE_DECLARATOR) {
            self.walk(&child);
        }
    }

    fn declare(&mut self, name: &SyntaxToken, entity: Entity) {
        if let Some(scope) = self.scopes.last_mut() {
            scope.declare(name.text(), entity);
        }
    }

    fn lookup(&self, name: &str) -> Option<Entity> {
        self.scopes
            .iter()
            .rev()
            .find_map(|scope| scope.lookup(name))
            .cloned()
    }

    fn reference(&mut self, node: &SyntaxNode) {
        let Some(token) = node.first_token() else {
            return;
        };
        let name = token.text();
        match self.lookup(name) {
            Some(Entity::Variable { linkage: true, .. }) => {
                self.linked_referenced.insert(name.to_string());
            }
            Some(Entity::Variable { decl, .. }) => {
                self.referenced.insert(decl);
            }
            Some(Entity::Other) => {}
            None => {
                // undeclared so far: keep any later declaration with
                // linkage alive
                trace!(name, "unresolved reference");
                self.linked_referenced.insert(name.to_string());
            }
        }
    }

    fn finish(self) -> References {
        let mut declarations = self.referenced;
        for name in &self.linked_referenced {
            if let Some(ranges) = self.linked.get(name) {
                declarations.extend(ranges.iter().copied());
            }
        }
        References { declarations }
    }
}
