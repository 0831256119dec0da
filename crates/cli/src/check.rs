//! `gqlmodel check`: resolve every operation document without writing output.

use clap::Args;
use console::style;
use std::path::PathBuf;

use crate::config::{Config, InputArgs, Settings};
use crate::generate::{generate_all, report_error, report_warnings};
use crate::run_command;

/// Arguments of `gqlmodel check`.
#[derive(Args, Debug, Clone)]
pub struct CheckArgs {
    /// Schema and operation inputs shared with `generate`.
    #[command(flatten)]
    pub input: InputArgs,

    /// Fail when any document produced warnings.
    #[arg(long = "deny-warnings", help = "Treat warnings as failures")]
    pub deny_warnings: bool,
}

/// Run the command and return the process exit code.
pub fn run(args: CheckArgs) -> i32 {
    run_command(|| run_inner(args))
}

/// Resolve every document without writing anything.
pub fn run_inner(args: CheckArgs) -> Result<(), String> {
    let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    let config = Config::discover(args.input.config.as_deref(), &cwd)?;
    let settings = Settings::resolve(&args.input, None, config, &cwd)?;

    let outcomes = generate_all(&settings)?;
    let total = outcomes.len();
    let mut failed = 0;
    let mut warned = 0;

    for outcome in &outcomes {
        match &outcome.result {
            Ok(generated) if generated.warnings.is_empty() => {
                println!("{} {}", style("ok").green(), outcome.document.display());
            }
            Ok(generated) => {
                warned += 1;
                report_warnings(&outcome.document, generated);
            }
            Err(err) => {
                failed += 1;
                report_error(&outcome.document, err);
            }
        }
    }

    if failed > 0 {
        return Err(format!("{failed} of {total} operation documents failed"));
    }
    if args.deny_warnings && warned > 0 {
        return Err(format!("{warned} of {total} operation documents have warnings"));
    }
    Ok(())
}
