#![forbid(unsafe_code)]
#![deny(unused_must_use, missing_debug_implementations)]
#![deny(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::todo,
    clippy::unimplemented,
    clippy::dbg_macro
)]

//! Command-line front end for `gqlmodel-core`.

use clap::{CommandFactory, Parser, Subcommand};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::prelude::*;

pub mod check;
pub mod config;
pub mod generate;

#[derive(Parser, Debug)]
#[command(
    name = "gqlmodel",
    version,
    about = "Typed Rust models and serde bindings for GraphQL operations"
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Generate Rust modules for operation documents
    Generate(generate::GenerateArgs),
    /// Resolve operation documents without writing anything
    Check(check::CheckArgs),
}

/// Parse `args` (including the program name) and run; returns the exit code.
pub fn run_cli<I, T>(args: I) -> i32
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    match Cli::try_parse_from(args) {
        Ok(cli) => {
            init_tracing();
            match cli.command {
                Some(Commands::Generate(args)) => generate::run(args),
                Some(Commands::Check(args)) => check::run(args),
                None => {
                    let mut cmd = Cli::command();
                    let _ = cmd.print_help();
                    println!();
                    0
                }
            }
        }
        Err(e) => {
            let code = e.exit_code();
            let _ = e.print();
            code
        }
    }
}

/// Run a command body, printing its error to stderr.
pub fn run_command<F>(f: F) -> i32
where
    F: FnOnce() -> Result<(), String>,
{
    match f() {
        Ok(()) => 0,
        Err(err) => {
            eprintln!("{err}");
            1
        }
    }
}

const LOG_ENV: &str = "GQLMODEL_LOG";

fn init_tracing() {
    let filter = log_filter(std::env::var(LOG_ENV).ok().as_deref());

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_filter(EnvFilter::new(filter));

    if tracing_subscriber::registry()
        .with(fmt_layer)
        .try_init()
        .is_err()
    {
        eprintln!("Warning: tracing subscriber already initialized");
    }
}

/// GQLMODEL_LOG is either a plain level, applied to this tool's crates, or a
/// full filter spec like "gqlmodel_core=debug,warn".
fn log_filter(env: Option<&str>) -> String {
    match env {
        Some(level) if is_plain_level(level) => {
            format!("gqlmodel_core={level},gqlmodel_cli={level}")
        }
        Some(spec) if !spec.trim().is_empty() => spec.to_string(),
        _ => "gqlmodel_core=warn,gqlmodel_cli=info".to_string(),
    }
}

fn is_plain_level(s: &str) -> bool {
    matches!(
        s.to_ascii_lowercase().as_str(),
        "trace" | "debug" | "info" | "warn" | "error"
    )
}
