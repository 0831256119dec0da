//! Errors and non-fatal diagnostics produced by a generation run.
//!
//! Every error aborts the run for one operation document. Warnings never
//! abort; they travel alongside a successful result and are also logged.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// Fatal failure of one generation run.
#[derive(Debug, Error)]
pub enum GenerationError {
    /// No `<name>.graphql` in any of the search directories.
    #[error("Schema '{name}' not found (searched: {})", display_dirs(searched))]
    SchemaNotFound {
        /// Schema name without extension.
        name: String,
        /// Directories searched, in order.
        searched: Vec<PathBuf>,
    },

    /// The SDL document failed to parse.
    #[error("Failed to parse schema '{name}': {message}")]
    SchemaParse {
        /// Schema name or path.
        name: String,
        /// Parser message.
        message: String,
    },

    /// The operation document failed to parse or contains no usable operation.
    #[error("Failed to parse operation document: {message}")]
    QueryParse {
        /// Parser message.
        message: String,
    },

    /// A selection could not be resolved against the schema.
    #[error("Cannot resolve field '{field}' on type '{parent}': {reason}")]
    UnresolvedField {
        /// Type the selection was made on.
        parent: String,
        /// Selected field name.
        field: String,
        /// What went wrong.
        reason: String,
    },

    /// An argument binding names an argument the field does not declare.
    #[error(
        "Field '{parent}.{field}' has no argument '{argument}' (bound to variable '${variable}')"
    )]
    UnboundArgument {
        /// Type declaring the field.
        parent: String,
        /// Field carrying the binding.
        field: String,
        /// Argument name used in the binding.
        argument: String,
        /// Variable the argument was bound to.
        variable: String,
    },

    /// The metadata document next to a schema is malformed.
    #[error("Failed to parse metadata {}: {message}", path.display())]
    MetadataParse {
        /// Metadata file path.
        path: PathBuf,
        /// Deserializer message.
        message: String,
    },

    /// The operation document text is absent or empty.
    #[error("Operation document is missing: {reason}")]
    MissingDocument {
        /// Why the document could not be obtained.
        reason: String,
    },

    /// The schema defines no root type for the operation kind.
    #[error("Schema has no root type for {operation} operations")]
    MissingRootType {
        /// `query`, `mutation` or `subscription`.
        operation: String,
    },

    /// Reading a located file failed.
    #[error("Failed to read {}: {source}", path.display())]
    Io {
        /// File being read.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}

fn display_dirs(dirs: &[PathBuf]) -> String {
    if dirs.is_empty() {
        return "no directories".to_string();
    }
    dirs.iter()
        .map(|dir| dir.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Category of a non-fatal diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WarningKind {
    /// The schema parsed but contains recoverable issues.
    SchemaParse,
    /// The operation document parsed but contains ignored constructs.
    QueryParse,
    /// The resolver met a selection shape it does not understand.
    UnsupportedSelection,
    /// The same variable was inferred with two different types.
    VariableConflict,
}

impl WarningKind {
    /// Short label used in logs and CLI output.
    pub fn as_str(&self) -> &'static str {
        match self {
            WarningKind::SchemaParse => "schema",
            WarningKind::QueryParse => "query",
            WarningKind::UnsupportedSelection => "selection",
            WarningKind::VariableConflict => "variables",
        }
    }
}

/// A non-fatal diagnostic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Warning {
    /// Category.
    pub kind: WarningKind,
    /// Human-readable message naming the offending construct.
    pub message: String,
}

impl Warning {
    /// Create a warning of the given kind.
    pub fn new(kind: WarningKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.kind.as_str(), self.message)
    }
}
