//! One generation run: operation document in, Rust source out.

use tracing::{debug, warn};

use crate::emit::{Emit, ProvidedDeclarations, codegen_module};
use crate::error::{GenerationError, Warning};
use crate::loader::LoadedSchema;
use crate::query::Operation;
use crate::resolver::{RecordDefinition, Resolver, VariableDefinition};
use crate::schema::SchemaType;

/// Where the `Variables` struct gets its fields from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum VariableSource {
    /// Declared variables if the operation has any, otherwise bindings.
    #[default]
    Auto,
    /// Only the operation's variable declarations.
    Declared,
    /// Inferred from argument bindings in the selection.
    Bindings,
}

impl std::str::FromStr for VariableSource {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "auto" => Ok(Self::Auto),
            "declared" => Ok(Self::Declared),
            "bindings" => Ok(Self::Bindings),
            other => Err(format!(
                "Unknown variable source '{other}' (expected auto, declared or bindings)"
            )),
        }
    }
}

/// Per-run options.
#[derive(Debug, Clone, Default)]
pub struct GenerateOptions {
    /// Operation to pick from a document containing several.
    pub operation_name: Option<String>,
    /// Where the `Variables` fields come from.
    pub variables: VariableSource,
    /// Declarations the destination already has.
    pub provided: ProvidedDeclarations,
}

/// Result of a successful run.
#[derive(Debug, Clone)]
pub struct Generated {
    /// The operation that was generated.
    pub operation: Operation,
    /// Resolved records, `Data` last.
    pub records: Vec<RecordDefinition>,
    /// Fields of the `Variables` struct.
    pub variables: Vec<VariableDefinition>,
    /// Rendered Rust source.
    pub source: String,
    /// Schema, document and resolution warnings, in that order.
    pub warnings: Vec<Warning>,
}

/// Generates code for operations against one loaded schema.
#[derive(Debug, Clone, Copy)]
pub struct Generator<'a> {
    loaded: &'a LoadedSchema,
}

impl<'a> Generator<'a> {
    /// Generate against `loaded`.
    pub fn new(loaded: &'a LoadedSchema) -> Self {
        Self { loaded }
    }

    /// Parse, resolve and render one operation document.
    ///
    /// Either everything succeeds or nothing is produced.
    pub fn generate(
        &self,
        document: &str,
        options: &GenerateOptions,
    ) -> Result<Generated, GenerationError> {
        let (operation, mut run_warnings) =
            Operation::parse(document, options.operation_name.as_deref())?;
        debug!(
            "Generating {} {}",
            operation.kind,
            operation.name.as_deref().unwrap_or("<anonymous>")
        );

        let schema = &self.loaded.schema;
        let root = schema
            .root(operation.kind)
            .ok_or_else(|| GenerationError::MissingRootType {
                operation: operation.kind.as_str().to_string(),
            })?;
        let root = SchemaType::named(root);

        let resolver = Resolver::new(schema, &self.loaded.mapping);
        let resolved = resolver.resolve(&operation.selection, &root)?;
        run_warnings.extend(resolved.warnings);

        let use_declared = match options.variables {
            VariableSource::Declared => true,
            VariableSource::Bindings => false,
            VariableSource::Auto => !operation.variables.is_empty(),
        };
        let variables = if use_declared {
            resolver.resolve_variables(&operation.variables)
        } else {
            let bound = resolver.bind_arguments(&operation.selection, &root)?;
            run_warnings.extend(bound.warnings);
            bound.variables
        };

        for warning in &run_warnings {
            warn!("{warning}");
        }

        let source = codegen_module(
            &operation,
            &resolved.records,
            &variables,
            &self.loaded.emit,
            &options.provided,
        )
        .emit();

        let mut warnings = self.loaded.warnings.clone();
        warnings.extend(run_warnings);

        Ok(Generated {
            operation,
            records: resolved.records,
            variables,
            source,
            warnings,
        })
    }
}
