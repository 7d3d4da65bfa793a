//! Find unused variable declarations in C programs and remove them, one
//! at a time, for test-case reduction.

mod binding;
mod dead_code;
mod edit;
mod edit_tests;
mod error;
mod group;
mod lexer;
mod parser;
mod parser_tests;
mod pass;
mod pass_tests;
mod registry;
pub mod report;
mod scope;
mod syntax;
mod usage;
mod usage_tests;

pub use binding::{Binding, BindingKind, DeclId, Storage};
pub use dead_code::{find_dead_code, scan, DeadCode, Declarations, Scan};
pub use edit::{remove_declaration, removal_range, Rewriter};
pub use error::{EditError, InvariantViolation, InvocationError, ParseError, PassError};
pub use group::{DeclGroup, GroupId, Groups};
pub use parser::{parse, Parse};
pub use pass::{run, Invocation, Mode, Outcome, Program, RemoveUnusedVar, DESCRIPTION, NAME};
pub use registry::{Registry, Transformation};
pub use scope::{Entity, Scope, ScopeKind};
pub use syntax::{CLanguage, SyntaxElement, SyntaxKind, SyntaxNode, SyntaxToken};
pub use usage::{find_references, References};
