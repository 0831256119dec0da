//! Rust code emission for resolved operations.
//!
//! Two layers:
//! 1. `codegen`: resolved records and variables to a Rust IR (`RsModule`)
//! 2. `render`: IR to source text via the `Emit` trait
//!
//! Emission is purely mechanical; every naming and merge decision is made in
//! `codegen`.

mod codegen;
mod render;
mod types;
pub mod utils;

pub use codegen::{EmitOptions, OPERATION_CONST, Provided, ProvidedDeclarations, codegen_module};
pub use render::Emit;
pub use types::{BindingKind, RsBinding, RsConst, RsField, RsModule, RsStruct, RsType, SerdeAttr};
