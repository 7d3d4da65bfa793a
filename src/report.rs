use std::io;

use ariadne::{sources, Color, Config, Label, Report, ReportKind};

use crate::{binding::Storage, dead_code::DeadCode, error::ParseError};

/// ariadne counts chars, the tree counts bytes
fn char_offset(content: &str, byte: usize) -> usize {
    content.get(..byte).map_or(0, |prefix| prefix.chars().count())
}

fn color(storage: Storage) -> Color {
    match storage {
        Storage::Global => Color::Yellow,
        Storage::Local => Color::Cyan,
    }
}

/// Render the unused declarations of one file.
///
/// Assumes `results` to be sorted by occurrence in the file.
pub fn print(file: String, content: &str, results: &[DeadCode]) -> io::Result<()> {
    let Some(first) = results.first() else {
        return Ok(());
    };
    let first_start = usize::from(first.binding.name.text_range().start());
    let mut builder = Report::build(ReportKind::Warning, file.clone(), char_offset(content, first_start))
        .with_config(Config::default().with_compact(true))
        .with_message("Unused variable declarations were found.");

    // reverse order to avoid overlapping lanes
    let mut order = results.len();
    for result in results {
        order -= 1;
        let range = result.binding.name.text_range();
        let start = char_offset(content, usize::from(range.start()));
        let end = char_offset(content, usize::from(range.end()));
        builder = builder.with_label(
            Label::new((file.clone(), start..end))
                .with_message(format!("#{}: {}", result.index, result))
                .with_color(color(result.binding.storage))
                .with_order(order as i32),
        );
    }

    builder.finish().print(sources(vec![(file, content)]))
}

/// Render syntax errors of one file to stderr
pub fn print_parse_errors(file: String, content: &str, errors: &[ParseError]) -> io::Result<()> {
    let Some(first) = errors.first() else {
        return Ok(());
    };
    let offset = char_offset(content, usize::from(first.range.start()));
    let mut builder = Report::build(ReportKind::Error, file.clone(), offset)
        .with_message(format!("Failed to parse {}", file));
    for error in errors {
        let start = char_offset(content, usize::from(error.range.start()));
        let end = char_offset(content, usize::from(error.range.end()));
        builder = builder.with_label(
            Label::new((file.clone(), start..end))
                .with_message(&error.message)
                .with_color(Color::Red),
        );
    }

    builder.finish().eprint(sources(vec![(file, content)]))
}

#[cfg(feature = "json-out")]
pub use json::{print_json, print_outcome_json};

#[cfg(feature = "json-out")]
mod json {
    use serde::Serialize;

    use crate::{dead_code::DeadCode, pass::Outcome};

    #[derive(Serialize)]
    #[serde(rename_all = "camelCase")]
    struct JsonResult {
        index: usize,
        name: String,
        message: String,
        line: usize,
        column: usize,
        end_column: usize,
    }

    #[derive(Serialize)]
    struct JsonFile<'a> {
        file: &'a str,
        results: Vec<JsonResult>,
    }

    #[derive(Serialize)]
    #[serde(tag = "status", rename_all = "kebab-case")]
    enum JsonOutcome<'a> {
        CountReported { count: usize },
        Applied { output: &'a str },
        IndexOutOfRange { index: usize, count: usize },
        InvariantViolation { error: String },
        EditFailed { error: String },
    }

    /// 1-based line and column of a byte offset
    fn line_column(content: &str, byte: usize) -> (usize, usize) {
        let prefix = content.get(..byte).unwrap_or(content);
        let line = prefix.matches('\n').count() + 1;
        let line_start = prefix.rfind('\n').map_or(0, |newline| newline + 1);
        (line, prefix[line_start..].chars().count() + 1)
    }

    pub fn print_json(file: &str, content: &str, results: &[DeadCode]) -> serde_json::Result<()> {
        let results = results
            .iter()
            .map(|result| {
                let range = result.binding.name.text_range();
                let (line, column) = line_column(content, usize::from(range.start()));
                let (_, end_column) = line_column(content, usize::from(range.end()));
                JsonResult {
                    index: result.index.get(),
                    name: result.binding.name().to_string(),
                    message: result.to_string(),
                    line,
                    column,
                    end_column,
                }
            })
            .collect();
        println!("{}", serde_json::to_string(&JsonFile { file, results })?);
        Ok(())
    }

    pub fn print_outcome_json(outcome: &Outcome) -> serde_json::Result<()> {
        let json = match outcome {
            Outcome::CountReported(count) => JsonOutcome::CountReported { count: *count },
            Outcome::Applied(output) => JsonOutcome::Applied { output },
            Outcome::IndexOutOfRange { index, count } => JsonOutcome::IndexOutOfRange {
                index: index.get(),
                count: *count,
            },
            Outcome::InvariantViolation(error) => JsonOutcome::InvariantViolation {
                error: error.to_string(),
            },
            Outcome::EditFailed(error) => JsonOutcome::EditFailed {
                error: error.to_string(),
            },
        };
        println!("{}", serde_json::to_string(&json)?);
        Ok(())
    }
}
