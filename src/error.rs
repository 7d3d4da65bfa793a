//! Error types for parsing, editing, and invoking transformations.

use rowan::TextRange;
use thiserror::Error;

/// A syntax error found while building the tree.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message} at {range:?}")]
pub struct ParseError {
    pub message: String,
    pub range: TextRange,
}

/// Failures of the text rewriter, or of the program it produced.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EditError {
    /// The range does not lie within the buffer on char boundaries.
    #[error("edit range {range:?} is outside of the {len} byte buffer")]
    OutOfBounds { range: TextRange, len: usize },

    /// Two edits touch the same bytes.
    #[error("edit range {range:?} overlaps an earlier edit")]
    Overlap { range: TextRange },

    /// The declarator is not a member of the group it was filed under.
    #[error("declaration `{name}` is not part of its declaration group")]
    NotInGroup { name: String },

    /// No comma next to a declarator in a multi-declarator group.
    #[error("no separator next to declaration `{name}`")]
    MissingSeparator { name: String },

    /// The edited program no longer parses.
    #[error("edited program has {} syntax error(s)", .0.len())]
    Diagnostics(Vec<ParseError>),
}

/// Internal consistency checks of the pass controller.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvariantViolation {
    /// The counter is in range yet the scanner recorded no selection.
    #[error("counter {index} is within {count} instance(s) but no declaration was selected")]
    NoSelection { index: usize, count: usize },

    /// The selected declaration was never filed under a group.
    #[error("selected declaration `{name}` has no declaration group")]
    MissingGroup { name: String },
}

/// Invalid requests from the driver.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvocationError {
    /// Counters are 1-based.
    #[error("counter must be a positive integer, got 0")]
    ZeroCounter,

    /// Apply mode without a counter.
    #[error("a counter is required unless only querying instances")]
    MissingCounter,

    #[error("unknown transformation `{0}`")]
    UnknownTransformation(String),

    #[error("transformation `{0}` is already registered")]
    DuplicateTransformation(String),
}

/// Errors preparing a program for a pass.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PassError {
    #[error("program has {} syntax error(s)", .errors.len())]
    Parse { errors: Vec<ParseError> },
}
