//! The spoof Command-Line Interface.
//!
//! This module is the main entry point for all CLI commands and orchestrates
//! the core library functions.

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use clap::Parser;
use walkdir::WalkDir;

use crate::cli::args::{Command, SpoofArgs, TransformArgs};
use crate::cli::output::{print_file_diff, print_file_header, TerminalSink};
use crate::errors::SpoofError;
use crate::pass::{DefaultSampler, PartialPassConfig, Transformer};
use crate::program::Program;
use crate::syntax::parser;
use crate::syntax::printer::print_source_unit;

pub mod args;
pub mod output;

const SOURCE_EXTENSIONS: &[&str] = &["ts", "tsx"];

/// The main entry point for the CLI.
pub fn run() -> Result<(), SpoofError> {
    let args = SpoofArgs::parse();

    // Dispatch to the appropriate subcommand handler.
    match args.command {
        Command::Transform(transform) => handle_transform(&transform),
        Command::Format { file } => handle_format(&file),
        Command::Ast { file } => handle_ast(&file),
    }
}

// ============================================================================
// COMMAND HANDLERS
// ============================================================================

/// Handles the `transform` subcommand.
fn handle_transform(args: &TransformArgs) -> Result<(), SpoofError> {
    let inputs = discover_sources(&args.paths)?;
    if let Some(out_dir) = &args.out_dir {
        ensure_distinct_outputs(&inputs, out_dir)?;
    }
    let texts = inputs
        .iter()
        .map(|input| read_source(&input.path))
        .collect::<Result<Vec<_>, _>>()?;
    let names: Vec<String> = inputs.iter().map(|i| i.path.display().to_string()).collect();
    let program = Program::parse_sources(
        names
            .iter()
            .map(String::as_str)
            .zip(texts.iter().map(String::as_str)),
    )?;

    let overrides = match &args.config {
        Some(path) => PartialPassConfig::from_json_str(&read_source(path)?)?,
        None => PartialPassConfig::default(),
    }
    .merge(args.overrides());
    let sampler = match args.seed {
        Some(seed) => DefaultSampler::seeded(seed),
        None => DefaultSampler::from_entropy(),
    };
    let mut transformer =
        Transformer::with_capabilities(&program, overrides, sampler, TerminalSink::new());

    let outputs = program.emit(&mut transformer);
    let show_headers = outputs.len() > 1;

    for ((input, source), output) in inputs.iter().zip(program.files()).zip(&outputs) {
        let printed = print_source_unit(output);
        if args.diff {
            print_file_diff(&source.file_name, &print_source_unit(source), &printed);
        } else if let Some(out_dir) = &args.out_dir {
            write_output(&out_dir.join(&input.relative), &printed)?;
        } else {
            if show_headers {
                print_file_header(&source.file_name);
            }
            print!("{}", printed);
        }
    }
    Ok(())
}

/// Handles the `format` subcommand.
fn handle_format(path: &Path) -> Result<(), SpoofError> {
    let source = read_source(path)?;
    let unit = parser::parse(&source, &path.display().to_string())?;
    print!("{}", print_source_unit(&unit));
    Ok(())
}

/// Handles the `ast` subcommand.
fn handle_ast(path: &Path) -> Result<(), SpoofError> {
    let source = read_source(path)?;
    let unit = parser::parse(&source, &path.display().to_string())?;
    let json = serde_json::to_string_pretty(&unit).map_err(|e| SpoofError::io(path, e.into()))?;
    println!("{}", json);
    Ok(())
}

// ============================================================================
// FILE DISCOVERY
// ============================================================================

/// A source file and its path relative to the argument that named it.
#[derive(Debug, Clone, PartialEq, Eq)]
struct SourceInput {
    path: PathBuf,
    relative: PathBuf,
}

fn discover_sources(paths: &[PathBuf]) -> Result<Vec<SourceInput>, SpoofError> {
    let mut inputs = Vec::new();
    for root in paths {
        if root.is_file() {
            let relative = root.file_name().map(PathBuf::from).unwrap_or_else(|| root.clone());
            inputs.push(SourceInput {
                path: root.clone(),
                relative,
            });
            continue;
        }
        for entry in WalkDir::new(root).sort_by_file_name() {
            let entry = entry.map_err(|e| {
                let path = e.path().unwrap_or(root).to_path_buf();
                SpoofError::io(path, e.into())
            })?;
            if !entry.file_type().is_file() || !is_source_file(entry.path()) {
                continue;
            }
            let relative = entry
                .path()
                .strip_prefix(root)
                .unwrap_or(entry.path())
                .to_path_buf();
            inputs.push(SourceInput {
                path: entry.into_path(),
                relative,
            });
        }
    }
    Ok(inputs)
}

/// Two inputs must not be written to the same file under `out_dir`.
fn ensure_distinct_outputs(inputs: &[SourceInput], out_dir: &Path) -> Result<(), SpoofError> {
    let mut seen: HashMap<&Path, &Path> = HashMap::new();
    for input in inputs {
        if let Some(first) = seen.insert(&input.relative, &input.path) {
            let message = format!(
                "`{}` and `{}` would both be written here",
                first.display(),
                input.path.display()
            );
            return Err(SpoofError::io(
                out_dir.join(&input.relative),
                io::Error::new(io::ErrorKind::AlreadyExists, message),
            ));
        }
    }
    Ok(())
}

fn is_source_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| SOURCE_EXTENSIONS.contains(&ext))
}

fn read_source(path: &Path) -> Result<String, SpoofError> {
    fs::read_to_string(path).map_err(|e| SpoofError::io(path, e))
}

fn write_output(path: &Path, contents: &str) -> Result<(), SpoofError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| SpoofError::io(parent, e))?;
    }
    fs::write(path, contents).map_err(|e| SpoofError::io(path, e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn directories_are_walked_for_typescript_files() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("nested")).unwrap();
        fs::write(dir.path().join("a.ts"), "").unwrap();
        fs::write(dir.path().join("nested/b.tsx"), "").unwrap();
        fs::write(dir.path().join("notes.md"), "").unwrap();

        let inputs = discover_sources(&[dir.path().to_path_buf()]).unwrap();
        let relative: Vec<_> = inputs.iter().map(|i| i.relative.clone()).collect();
        assert_eq!(
            relative,
            vec![PathBuf::from("a.ts"), PathBuf::from("nested").join("b.tsx")]
        );
    }

    #[test]
    fn colliding_output_paths_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("a")).unwrap();
        fs::create_dir_all(dir.path().join("b")).unwrap();
        fs::write(dir.path().join("a/keys.ts"), "").unwrap();
        fs::write(dir.path().join("b/keys.ts"), "").unwrap();

        let inputs = discover_sources(&[
            dir.path().join("a/keys.ts"),
            dir.path().join("b/keys.ts"),
        ])
        .unwrap();
        let out = dir.path().join("out");
        let err = ensure_distinct_outputs(&inputs, &out).unwrap_err();
        assert_eq!(err.code_str(), "spoof::io");
        assert!(err.to_string().contains("keys.ts"));

        let distinct = discover_sources(&[dir.path().join("a")]).unwrap();
        assert!(ensure_distinct_outputs(&distinct, &out).is_ok());
    }

    #[test]
    fn missing_paths_are_io_errors() {
        let err = discover_sources(&[PathBuf::from("/definitely/not/here")]).unwrap_err();
        assert_eq!(err.code_str(), "spoof::io");
    }
}
