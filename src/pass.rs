//! The `remove-unused-var` transformation: enumerate the unused
//! variable declarations of a program, and delete the one the driver
//! picked by its 1-based counter.

use std::num::NonZeroUsize;

use rowan::TextRange;
use tracing::{debug, debug_span, warn};

use crate::{
    dead_code::scan,
    edit::{remove_declaration, Rewriter},
    error::{EditError, InvariantViolation, InvocationError, ParseError, PassError},
    parser,
    registry::Transformation,
    syntax::{SyntaxKind::*, SyntaxNode},
    usage::find_references,
};

pub const NAME: &str = "remove-unused-var";
pub const DESCRIPTION: &str = "Remove unused local/global variable declarations.";

/// A freshly parsed program. Each invocation gets its own.
#[derive(Debug, Clone)]
pub struct Program {
    text: String,
    root: SyntaxNode,
}

impl Program {
    /// Parse `text`, refusing programs with syntax errors
    pub fn parse(text: impl Into<String>) -> Result<Self, PassError> {
        let text = text.into();
        let parse = parser::parse(&text);
        if !parse.errors().is_empty() {
            return Err(PassError::Parse {
                errors: parse.errors().to_vec(),
            });
        }
        Ok(Program {
            root: parse.node(),
            text,
        })
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn root(&self) -> &SyntaxNode {
        &self.root
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Only count the instances
    Query,
    /// Transform the instance with this counter
    Apply(NonZeroUsize),
}

/// What the driver asked for
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub transformation: String,
    pub mode: Mode,
}

impl Invocation {
    /// Counters are 1-based; a counter is required unless only querying.
    pub fn new(
        transformation: impl Into<String>,
        counter: Option<usize>,
        query_only: bool,
    ) -> Result<Self, InvocationError> {
        let counter = counter
            .map(|counter| NonZeroUsize::new(counter).ok_or(InvocationError::ZeroCounter))
            .transpose()?;
        let mode = match (query_only, counter) {
            (true, _) => Mode::Query,
            (false, Some(counter)) => Mode::Apply(counter),
            (false, None) => return Err(InvocationError::MissingCounter),
        };
        Ok(Invocation {
            transformation: transformation.into(),
            mode,
        })
    }
}

/// Result of one invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Number of instances; nothing was changed
    CountReported(usize),
    /// The edited program
    Applied(String),
    /// The counter exceeds the number of instances; nothing was changed
    IndexOutOfRange { index: NonZeroUsize, count: usize },
    /// A bug in the pass; the program must not be used
    InvariantViolation(InvariantViolation),
    /// The edit went wrong; any output must be discarded
    EditFailed(EditError),
}

impl Outcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::CountReported(_) | Outcome::Applied(_))
    }

    /// The transformed program, only after a successful edit
    pub fn output(&self) -> Option<&str> {
        match self {
            Outcome::Applied(output) => Some(output),
            _ => None,
        }
    }
}

/// Run the pass once over `program`
pub fn run(program: &Program, mode: Mode) -> Outcome {
    let span = debug_span!("remove_unused_var", ?mode);
    let _enter = span.enter();

    let references = find_references(program.root());
    let index = match mode {
        Mode::Query => None,
        Mode::Apply(index) => Some(index),
    };
    let scan = scan(program.root(), &references, index);

    let Some(index) = index else {
        return Outcome::CountReported(scan.count);
    };
    if index.get() > scan.count {
        debug!(index = index.get(), count = scan.count, "counter out of range");
        return Outcome::IndexOutOfRange {
            index,
            count: scan.count,
        };
    }

    let Some(selected) = scan.selected.and_then(|id| scan.declarations.get(id)) else {
        return Outcome::InvariantViolation(InvariantViolation::NoSelection {
            index: index.get(),
            count: scan.count,
        });
    };
    let Some(group) = scan.declarations.group_of(selected.id) else {
        return Outcome::InvariantViolation(InvariantViolation::MissingGroup {
            name: selected.name().to_string(),
        });
    };

    let mut rewriter = Rewriter::new(program.text());
    if let Err(error) = remove_declaration(&mut rewriter, selected, group) {
        warn!(%error, name = selected.name(), "failed to remove declaration");
        return Outcome::EditFailed(error);
    }
    let edited = rewriter.finish();

    if let Err(error) = check_edit(program.root(), &edited) {
        warn!(%error, name = selected.name(), "edited program is broken");
        return Outcome::EditFailed(error);
    }

    debug!(name = selected.name(), "removed declaration");
    Outcome::Applied(edited)
}

/// Reparse an edited program. Besides syntax errors, this rejects
/// labels the edit left at the end of a block, which `original` did not
/// have.
pub(crate) fn check_edit(original: &SyntaxNode, edited: &str) -> Result<(), EditError> {
    let parse = parser::parse(edited);
    if !parse.errors().is_empty() {
        return Err(EditError::Diagnostics(parse.errors().to_vec()));
    }

    let dangling = dangling_labels(&parse.node());
    if dangling.len() > dangling_labels(original).len() {
        let errors = dangling
            .into_iter()
            .map(|range| ParseError {
                message: "expected a statement after label".to_string(),
                range,
            })
            .collect();
        return Err(EditError::Diagnostics(errors));
    }
    Ok(())
}

/// Labels directly followed by the `}` of their block
fn dangling_labels(root: &SyntaxNode) -> Vec<TextRange> {
    root.descendants()
        .filter(|node| matches!(node.kind(), NODE_LABELED_STMT | NODE_CASE_STMT))
        .filter(|label| {
            label.last_token().map(|token| token.kind()) == Some(TOKEN_COLON)
                || label.last_child().map(|node| node.kind()) == Some(NODE_ATTRIBUTE)
        })
        .map(|label| label.text_range())
        .collect()
}

/// `remove-unused-var`, as registered with a `Registry`
#[derive(Debug, Clone, Copy, Default)]
pub struct RemoveUnusedVar;

impl Transformation for RemoveUnusedVar {
    fn name(&self) -> &'static str {
        NAME
    }

    fn description(&self) -> &'static str {
        DESCRIPTION
    }

    fn transform(&self, program: &Program, mode: Mode) -> Outcome {
        run(program, mode)
    }
}
