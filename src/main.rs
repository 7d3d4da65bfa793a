use std::{fs, io::Write, path::PathBuf, process::ExitCode};

use clap::{builder::PossibleValuesParser, Arg, ArgAction, ArgMatches, Command};
use tracing::{error, warn};
use walkdir::WalkDir;

use deadvar::{find_dead_code, report, DeadCode, Invocation, Outcome, PassError, Program, Registry, NAME};

const EXIT_OUT_OF_RANGE: u8 = 1;
const EXIT_USAGE: u8 = 2;
const EXIT_FAILED: u8 = 3;

const EXTENSIONS: [&str; 3] = ["c", "h", "i"];

fn main() -> ExitCode {
    let mut formats = vec!["human-readable"];
    if cfg!(feature = "json-out") {
        formats.push("json");
    }

    let matches = Command::new("deadvar")
        .about("Remove unused variable declarations from C programs")
        .arg(
            Arg::new("TRANSFORMATION")
                .long("transformation")
                .value_name("NAME")
                .default_value(NAME)
                .help("Transformation to run"),
        )
        .arg(
            Arg::new("COUNTER")
                .long("counter")
                .value_name("N")
                .value_parser(clap::value_parser!(usize))
                .help("Transform the Nth instance, counting from 1"),
        )
        .arg(
            Arg::new("QUERY_INSTANCES")
                .long("query-instances")
                .action(ArgAction::SetTrue)
                .conflicts_with("COUNTER")
                .help("Only report the number of instances"),
        )
        .arg(
            Arg::new("OUTPUT")
                .short('o')
                .long("output")
                .value_name("FILE")
                .help("Write the transformed program to FILE instead of stdout"),
        )
        .arg(
            Arg::new("LIST")
                .short('l')
                .long("list")
                .action(ArgAction::SetTrue)
                .conflicts_with_all(["COUNTER", "QUERY_INSTANCES", "OUTPUT"])
                .help("List all unused variable declarations, recursing into directories"),
        )
        .arg(
            Arg::new("LIST_TRANSFORMATIONS")
                .long("transformations")
                .action(ArgAction::SetTrue)
                .exclusive(true)
                .help("List the available transformations"),
        )
        .arg(
            Arg::new("OUTPUT_FORMAT")
                .short('f')
                .long("output-format")
                .value_parser(PossibleValuesParser::new(formats))
                .default_value("human-readable")
                .help("Output format to use"),
        )
        .arg(
            Arg::new("VERBOSE")
                .short('v')
                .long("verbose")
                .action(ArgAction::SetTrue)
                .help("Log progress to stderr"),
        )
        .arg(
            Arg::new("FILE_PATHS")
                .num_args(1..)
                .required_unless_present("LIST_TRANSFORMATIONS")
                .help("C source files, or directories with --list"),
        )
        .get_matches();

    init_tracing(matches.get_flag("VERBOSE"));

    let registry = Registry::with_builtins();
    if matches.get_flag("LIST_TRANSFORMATIONS") {
        for transformation in registry.iter() {
            println!("{}: {}", transformation.name(), transformation.description());
        }
        return ExitCode::SUCCESS;
    }

    let json = matches
        .get_one::<String>("OUTPUT_FORMAT")
        .map_or(false, |format| format == "json");
    let file_paths = matches
        .get_many::<String>("FILE_PATHS")
        .into_iter()
        .flatten()
        .collect::<Vec<_>>();

    if matches.get_flag("LIST") {
        list(&file_paths, json)
    } else {
        transform(&registry, &matches, &file_paths, json)
    }
}

fn init_tracing(verbose: bool) {
    let level = if verbose { "debug" } else { "warn" };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    if let Err(error) = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
    {
        eprintln!("Failed to initialize logging: {}", error);
    }
}

fn transform(registry: &Registry, matches: &ArgMatches, file_paths: &[&String], json: bool) -> ExitCode {
    let transformation = matches
        .get_one::<String>("TRANSFORMATION")
        .map_or(NAME, String::as_str);
    let counter = matches.get_one::<usize>("COUNTER").copied();
    let invocation = match Invocation::new(transformation, counter, matches.get_flag("QUERY_INSTANCES")) {
        Ok(invocation) => invocation,
        Err(err) => {
            eprintln!("Error: {}", err);
            return ExitCode::from(EXIT_USAGE);
        }
    };

    let [file_path] = file_paths else {
        eprintln!("Error: expected exactly one input file, got {}", file_paths.len());
        return ExitCode::from(EXIT_USAGE);
    };
    let content = match fs::read_to_string(file_path) {
        Ok(content) => content,
        Err(err) => {
            eprintln!("Error reading file {}: {}", file_path, err);
            return ExitCode::from(EXIT_USAGE);
        }
    };

    let program = match Program::parse(content.as_str()) {
        Ok(program) => program,
        Err(PassError::Parse { errors }) => {
            if let Err(err) = report::print_parse_errors(file_path.to_string(), &content, &errors) {
                error!(%err, "failed to render syntax errors");
            }
            return ExitCode::from(EXIT_USAGE);
        }
    };

    let outcome = match registry.invoke(&invocation, &program) {
        Ok(outcome) => outcome,
        Err(err) => {
            eprintln!("Error: {}", err);
            return ExitCode::from(EXIT_USAGE);
        }
    };

    if json && !print_outcome_json(&outcome) {
        return ExitCode::from(EXIT_FAILED);
    }

    match &outcome {
        Outcome::CountReported(count) => {
            if !json {
                println!("Available transformation instances: {}", count);
            }
            ExitCode::SUCCESS
        }
        Outcome::Applied(output) => {
            let written = match matches.get_one::<String>("OUTPUT") {
                Some(output_path) => fs::write(output_path, output),
                None if json => Ok(()),
                None => std::io::stdout().write_all(output.as_bytes()),
            };
            match written {
                Ok(()) => ExitCode::SUCCESS,
                Err(err) => {
                    eprintln!("Error writing output: {}", err);
                    ExitCode::from(EXIT_USAGE)
                }
            }
        }
        Outcome::IndexOutOfRange { index, count } => {
            warn!(index = index.get(), count, "counter exceeds the number of instances");
            eprintln!("Error: No modification to the transformed program!");
            ExitCode::from(EXIT_OUT_OF_RANGE)
        }
        Outcome::InvariantViolation(err) => {
            error!(%err, file = %file_path, "invariant violated");
            eprintln!("Error: {}", err);
            ExitCode::from(EXIT_FAILED)
        }
        Outcome::EditFailed(err) => {
            error!(%err, file = %file_path, "edit failed");
            eprintln!("Error: {}", err);
            ExitCode::from(EXIT_FAILED)
        }
    }
}

fn list(file_paths: &[&String], json: bool) -> ExitCode {
    let mut failed = false;
    for file_path in file_paths.iter().flat_map(|path| source_files(path)) {
        let file_name = file_path.display().to_string();
        let content = match fs::read_to_string(&file_path) {
            Ok(content) => content,
            Err(err) => {
                eprintln!("Error reading file {}: {}", file_name, err);
                failed = true;
                continue;
            }
        };

        let parse = deadvar::parse(&content);
        if !parse.errors().is_empty() {
            if let Err(err) = report::print_parse_errors(file_name, &content, parse.errors()) {
                error!(%err, "failed to render syntax errors");
            }
            failed = true;
            continue;
        }

        let results = find_dead_code(&parse.node());
        if json {
            failed |= !print_json(&file_name, &content, &results);
        } else if let Err(err) = report::print(file_name, &content, &results) {
            error!(%err, "failed to render report");
            failed = true;
        }
    }

    if failed {
        ExitCode::from(EXIT_USAGE)
    } else {
        ExitCode::SUCCESS
    }
}

#[cfg(feature = "json-out")]
fn print_outcome_json(outcome: &Outcome) -> bool {
    report::print_outcome_json(outcome)
        .map_err(|err| error!(%err, "failed to write JSON"))
        .is_ok()
}

#[cfg(not(feature = "json-out"))]
fn print_outcome_json(_outcome: &Outcome) -> bool {
    false
}

#[cfg(feature = "json-out")]
fn print_json(file_name: &str, content: &str, results: &[DeadCode]) -> bool {
    report::print_json(file_name, content, results)
        .map_err(|err| error!(%err, "failed to write JSON"))
        .is_ok()
}

#[cfg(not(feature = "json-out"))]
fn print_json(_file_name: &str, _content: &str, _results: &[DeadCode]) -> bool {
    false
}

/// Files named on the command line, and C sources below named directories
fn source_files(path: &str) -> impl Iterator<Item = PathBuf> {
    WalkDir::new(path)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(err) => {
                warn!(%err, "skipping unreadable path");
                None
            }
        })
        .filter(|entry| {
            entry.file_type().is_file()
                && (entry.depth() == 0
                    || entry
                        .path()
                        .extension()
                        .and_then(|extension| extension.to_str())
                        .map_or(false, |extension| EXTENSIONS.contains(&extension)))
        })
        .map(|entry| entry.into_path())
}
