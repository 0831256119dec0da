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

//! Typed record models and serde bindings for GraphQL operations.
//!
//! Given a schema (SDL) and an operation document, the generator produces
//! Rust source declaring one struct per selection set, a `Data` struct for
//! the response root, a `Variables` struct, and `decode`/`encode` helpers.
//!
//! ```no_run
//! use gqlmodel_core::{GenerateOptions, Generator, SchemaLocator};
//!
//! let loaded = SchemaLocator::new(["schemas"]).load("starwars")?;
//! let generated = Generator::new(&loaded)
//!     .generate("query Hero { hero { name } }", &GenerateOptions::default())?;
//! println!("{}", generated.source);
//! # Ok::<(), gqlmodel_core::GenerationError>(())
//! ```

pub mod emit;
pub mod error;
pub mod generator;
pub mod loader;
pub mod mapping;
pub mod query;
pub mod resolver;
pub mod schema;

pub use emit::{EmitOptions, Provided, ProvidedDeclarations};
pub use error::{GenerationError, Warning, WarningKind};
pub use generator::{GenerateOptions, Generated, Generator, VariableSource};
pub use loader::{LoadedSchema, Metadata, SchemaCache, SchemaLocator};
pub use mapping::NameMapping;
pub use query::Operation;
pub use resolver::{RecordDefinition, Resolver, VariableDefinition};
pub use schema::Schema;
