use rowan::{TextRange, TextSize};

use crate::{
    binding::Binding,
    error::EditError,
    group::DeclGroup,
    syntax::{SyntaxElement, SyntaxKind::*, SyntaxNode},
};

#[derive(Debug, Clone, PartialEq, Eq)]
struct Edit {
    start: usize,
    end: usize,
    replacement: String,
}

fn apply_edits<'a>(src: &str, edits: impl Iterator<Item = &'a Edit>) -> String {
    let mut pos = 0;
    let mut result = String::with_capacity(src.len());
    for edit in edits {
        if pos <= edit.start {
            result.push_str(&src[pos..edit.start]);
            result.push_str(&edit.replacement);
            pos = edit.end;
        }
    }
    result.push_str(&src[pos..]);
    result
}

/// Byte range edits over the original source. Nothing is applied to
/// the text until `finish`.
#[derive(Debug, Clone)]
pub struct Rewriter<'a> {
    original: &'a str,
    edits: Vec<Edit>,
}

impl<'a> Rewriter<'a> {
    pub fn new(original: &'a str) -> Self {
        Rewriter {
            original,
            edits: Vec::new(),
        }
    }

    pub fn remove(&mut self, range: TextRange) -> Result<(), EditError> {
        self.replace(range, "")
    }

    pub fn replace(&mut self, range: TextRange, replacement: &str) -> Result<(), EditError> {
        let start = usize::from(range.start());
        let end = usize::from(range.end());
        if end > self.original.len()
            || !self.original.is_char_boundary(start)
            || !self.original.is_char_boundary(end)
        {
            return Err(EditError::OutOfBounds {
                range,
                len: self.original.len(),
            });
        }
        if self
            .edits
            .iter()
            .any(|edit| start < edit.end && edit.start < end)
        {
            return Err(EditError::Overlap { range });
        }

        self.edits.push(Edit {
            start,
            end,
            replacement: replacement.to_string(),
        });
        Ok(())
    }

    /// The original text with all edits applied
    pub fn finish(&self) -> String {
        let mut edits = self.edits.iter().collect::<Vec<_>>();
        edits.sort_unstable_by_key(|edit| (edit.start, edit.end));
        apply_edits(self.original, edits.into_iter())
    }
}

/// Deletes the declarator of `target`, taking as much of `group` with
/// it as needed to keep the remaining source well-formed.
///
/// The initializer goes along with the declarator even when it has side
/// effects.
pub fn remove_declaration(
    rewriter: &mut Rewriter,
    target: &Binding,
    group: &DeclGroup,
) -> Result<(), EditError> {
    let range = removal_range(target, group)?;
    rewriter.remove(range)
}

/// The source range `remove_declaration` deletes
pub fn removal_range(target: &Binding, group: &DeclGroup) -> Result<TextRange, EditError> {
    let not_in_group = || EditError::NotInGroup {
        name: target.name().to_string(),
    };
    let missing_separator = || EditError::MissingSeparator {
        name: target.name().to_string(),
    };

    let position = group.position(target.id).ok_or_else(not_in_group)?;
    if target.node.parent().as_ref() != Some(&group.node) {
        return Err(not_in_group());
    }

    if group.is_single() {
        // the whole statement, unless it also defines a type
        let node = if group.defines_tag() {
            &target.node
        } else {
            &group.node
        };
        return Ok(TextRange::new(
            start_with_whitespace(node),
            node.text_range().end(),
        ));
    }

    let range = target.node.text_range();
    if position > 0 {
        // `int a, b;` -> `int a;`
        let comma = prev_significant(&target.node)
            .filter(|element| element.kind() == TOKEN_COMMA)
            .ok_or_else(missing_separator)?;
        Ok(TextRange::new(comma.text_range().start(), range.end()))
    } else {
        // `int a, b;` -> `int b;`
        let comma = next_significant(&target.node)
            .filter(|element| element.kind() == TOKEN_COMMA)
            .ok_or_else(missing_separator)?;
        let mut end = comma.text_range().end();
        if let Some(next) = comma.next_sibling_or_token() {
            if next.kind() == TOKEN_WHITESPACE {
                end = next.text_range().end();
            }
        }
        Ok(TextRange::new(range.start(), end))
    }
}

/// Start of `node`, widened over the whitespace before it. That
/// whitespace stays if it ends a `#` line or a `//` comment, which would
/// otherwise swallow whatever follows.
fn start_with_whitespace(node: &SyntaxNode) -> TextSize {
    let start = node.text_range().start();
    let Some(whitespace) = node
        .prev_sibling_or_token()
        .and_then(|element| element.into_token())
        .filter(|token| token.kind() == TOKEN_WHITESPACE)
    else {
        return start;
    };

    let ends_line_trivia = whitespace.prev_token().map_or(false, |token| {
        token.kind() == TOKEN_PREPROCESSOR
            || (token.kind() == TOKEN_COMMENT && token.text().starts_with("//"))
    });
    if ends_line_trivia {
        start
    } else {
        whitespace.text_range().start()
    }
}

fn prev_significant(node: &SyntaxNode) -> Option<SyntaxElement> {
    std::iter::successors(node.prev_sibling_or_token(), |element| {
        element.prev_sibling_or_token()
    })
    .find(|element| !element.kind().is_trivia())
}

fn next_significant(node: &SyntaxNode) -> Option<SyntaxElement> {
    std::iter::successors(node.next_sibling_or_token(), |element| {
        element.next_sibling_or_token()
    })
    .find(|element| !element.kind().is_trivia())
}
