//! gqlmodel - generate typed Rust models for GraphQL operations.

fn main() {
    std::process::exit(gqlmodel_cli::run_cli(std::env::args_os()));
}
