//! `gqlmodel generate`: write one Rust module per operation document.

use clap::Args;
use console::style;
use gqlmodel_core::{
    GenerateOptions, Generated, GenerationError, Generator, LoadedSchema, SchemaCache,
    SchemaLocator,
};
use rayon::prelude::*;
use std::fmt::Display;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use walkdir::WalkDir;

use crate::config::{Config, InputArgs, Settings};
use crate::run_command;

const OPERATION_EXTENSION: &str = "graphql";

/// Arguments of `gqlmodel generate`.
#[derive(Args, Debug, Clone)]
pub struct GenerateArgs {
    /// Schema and operation inputs shared with `check`.
    #[command(flatten)]
    pub input: InputArgs,

    /// Output directory override.
    #[arg(
        long = "out-dir",
        short = 'o',
        value_name = "DIR",
        help = "Where to write generated files. Defaults to next to each document"
    )]
    pub out_dir: Option<PathBuf>,
}

/// Run the command and return the process exit code.
pub fn run(args: GenerateArgs) -> i32 {
    run_command(|| run_inner(args))
}

/// Generate every document; the error is the message printed on failure.
pub fn run_inner(args: GenerateArgs) -> Result<(), String> {
    let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    let config = Config::discover(args.input.config.as_deref(), &cwd)?;
    let settings = Settings::resolve(&args.input, args.out_dir, config, &cwd)?;

    let outcomes = generate_all(&settings)?;
    let total = outcomes.len();
    let mut failed = 0;

    for outcome in outcomes {
        match outcome.result {
            Ok(generated) => {
                report_warnings(&outcome.document, &generated);
                let target = output_path(&outcome.document, settings.out_dir.as_deref());
                if let Err(err) = write_output(&target, &generated.source) {
                    failed += 1;
                    report_error(&outcome.document, &err);
                    continue;
                }
                println!(
                    "{} {} -> {}",
                    style("generated").green(),
                    outcome.document.display(),
                    target.display()
                );
            }
            Err(err) => {
                failed += 1;
                report_error(&outcome.document, &err);
            }
        }
    }

    if failed > 0 {
        return Err(format!("{failed} of {total} operation documents failed"));
    }
    info!("Generated {total} operation documents");
    Ok(())
}

/// Result of one operation document.
#[derive(Debug)]
pub(crate) struct Outcome {
    /// Path of the operation document.
    pub document: PathBuf,
    /// Generated module, or why it could not be generated.
    pub result: Result<Generated, GenerationError>,
}

/// Load the schema once and generate every document in parallel.
///
/// Per-document failures are returned in the outcomes; only a schema that
/// cannot be loaded fails the whole run.
pub(crate) fn generate_all(settings: &Settings) -> Result<Vec<Outcome>, String> {
    let cache = SchemaCache::new(SchemaLocator::new(settings.schema_dirs.clone()));
    let loaded = cache.get(&settings.schema).map_err(|err| err.to_string())?;
    let schema_path = cache
        .locator()
        .locate(&settings.schema)
        .map_err(|err| err.to_string())?;

    let documents = collect_documents(&settings.operations, &schema_path)?;
    if documents.is_empty() {
        return Err("No operation documents found".to_string());
    }
    debug!("Generating {} operation documents", documents.len());

    let options = GenerateOptions {
        operation_name: settings.operation_name.clone(),
        variables: settings.variables,
        ..GenerateOptions::default()
    };

    Ok(documents
        .into_par_iter()
        .map(|document| {
            let result = generate_one(&loaded, &document, &options);
            Outcome { document, result }
        })
        .collect())
}

fn generate_one(
    loaded: &LoadedSchema,
    document: &Path,
    options: &GenerateOptions,
) -> Result<Generated, GenerationError> {
    let text = fs::read_to_string(document).map_err(|source| GenerationError::Io {
        path: document.to_path_buf(),
        source,
    })?;
    Generator::new(loaded).generate(&text, options)
}

/// Expand directories to their `*.graphql` files, sorted, skipping the schema.
pub(crate) fn collect_documents(
    inputs: &[PathBuf],
    schema_path: &Path,
) -> Result<Vec<PathBuf>, String> {
    let mut documents = Vec::new();
    for input in inputs {
        if input.is_file() {
            documents.push(input.clone());
            continue;
        }
        if !input.is_dir() {
            return Err(format!("{} does not exist", input.display()));
        }
        let mut found = WalkDir::new(input)
            .into_iter()
            .filter_map(Result::ok)
            .filter(|entry| entry.file_type().is_file())
            .map(|entry| entry.into_path())
            .filter(|path| {
                path.extension()
                    .is_some_and(|ext| ext == OPERATION_EXTENSION)
            })
            .filter(|path| !same_file(path, schema_path))
            .collect::<Vec<_>>();
        found.sort();
        documents.extend(found);
    }
    Ok(documents)
}

fn same_file(a: &Path, b: &Path) -> bool {
    match (a.canonicalize(), b.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => a == b,
    }
}

/// `<out_dir>/<stem>.rs`, or `<stem>.rs` next to the document.
pub(crate) fn output_path(document: &Path, out_dir: Option<&Path>) -> PathBuf {
    let file_name = document.with_extension("rs");
    match (out_dir, file_name.file_name()) {
        (Some(dir), Some(name)) => dir.join(name),
        _ => file_name,
    }
}

fn write_output(target: &Path, source: &str) -> Result<(), String> {
    if let Some(parent) = target.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .map_err(|err| format!("Failed to create {}: {err}", parent.display()))?;
    }
    fs::write(target, source).map_err(|err| format!("Failed to write {}: {err}", target.display()))
}

pub(crate) fn report_warnings(document: &Path, generated: &Generated) {
    for warning in &generated.warnings {
        eprintln!(
            "{} {}: {}",
            style("warning").yellow().bold(),
            document.display(),
            warning
        );
    }
}

pub(crate) fn report_error(document: &Path, err: &dyn Display) {
    eprintln!(
        "{} {}: {}",
        style("error").red().bold(),
        document.display(),
        err
    );
}
