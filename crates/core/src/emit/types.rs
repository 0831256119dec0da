//! Rust IR types for code generation.
//!
//! - RsType: field types (paths, `Option`, `Vec`)
//! - RsStruct: a record or variables struct with its serde attributes
//! - RsBinding: a decode or encode `impl` block
//! - RsModule: the complete generated file

use crate::resolver::ResolvedType;

/// Rust type of a generated field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RsType {
    /// A type path: `String`, `Character`, `chrono::NaiveDate`
    Path(String),
    /// `Option<T>`
    Option(Box<RsType>),
    /// `Vec<T>`
    Vec(Box<RsType>),
}

impl RsType {
    /// Whether the outermost type is `Option`.
    pub fn is_option(&self) -> bool {
        matches!(self, RsType::Option(_))
    }
}

impl ResolvedType {
    /// Convert a resolved type to its Rust shape.
    pub fn to_rs_type(&self) -> RsType {
        match self {
            ResolvedType::Named(name) => RsType::Path(name.clone()),
            ResolvedType::List(inner) => RsType::Vec(Box::new(inner.to_rs_type())),
            ResolvedType::Optional(inner) => RsType::Option(Box::new(inner.to_rs_type())),
        }
    }
}

/// A single `#[serde(...)]` argument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SerdeAttr {
    /// `rename = "wireName"`
    Rename(String),
    /// `default`
    Default,
    /// `skip_serializing_if = "Option::is_none"`
    SkipNone,
}

/// A struct field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RsField {
    /// Field identifier, possibly raw (`r#type`).
    pub ident: String,
    /// Field type.
    pub ty: RsType,
    /// Arguments of the field's `#[serde(...)]`, empty for none.
    pub serde: Vec<SerdeAttr>,
}

/// A generated struct.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RsStruct {
    /// Struct name.
    pub name: String,
    /// Single-line doc comment.
    pub doc: Option<String>,
    /// Derive macros, in emission order.
    pub derives: Vec<String>,
    /// Fields in wire order.
    pub fields: Vec<RsField>,
}

/// Which way a binding converts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BindingKind {
    /// `fn decode(serde_json::Value) -> serde_json::Result<Self>`
    Decode,
    /// `fn encode(&self) -> serde_json::Result<serde_json::Value>`
    Encode {
        /// Sent as `operationName` when present.
        operation_name: Option<String>,
    },
}

/// An inherent `impl` block attached to a generated struct.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RsBinding {
    /// Struct the `impl` block is for.
    pub target: String,
    /// Generated method.
    pub kind: BindingKind,
}

/// `pub const NAME: &str = ...;`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RsConst {
    /// Constant name.
    pub name: String,
    /// Single-line doc comment.
    pub doc: Option<String>,
    /// String value, emitted verbatim.
    pub value: String,
}

/// A complete generated file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RsModule {
    /// Leading `//` comment lines.
    pub header: Vec<String>,
    /// Full `use` lines, in emission order.
    pub imports: Vec<String>,
    /// String constants.
    pub consts: Vec<RsConst>,
    /// Structs, nested records first.
    pub structs: Vec<RsStruct>,
    /// Decode and encode `impl` blocks.
    pub bindings: Vec<RsBinding>,
}
