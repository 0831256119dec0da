//! SDL document to [`Schema`] conversion.
//!
//! Text parsing is delegated to `graphql-parser`; this module only adapts its
//! AST. Recoverable issues become warnings instead of errors.

use std::collections::BTreeSet;

use graphql_parser::schema::{
    Definition, Document, Field, InputValue, Type, TypeDefinition as AstTypeDefinition,
    TypeExtension,
};
use indexmap::IndexMap;
use tracing::debug;

use super::{FieldDefinition, RootTypes, Schema, SchemaType, TypeDefinition, TypeKind};
use crate::error::{GenerationError, Warning, WarningKind};

impl Schema {
    /// Parse SDL text into a schema. `name` is only used in messages.
    pub fn from_sdl(name: &str, sdl: &str) -> Result<(Schema, Vec<Warning>), GenerationError> {
        let document = graphql_parser::parse_schema::<String>(sdl).map_err(|err| {
            GenerationError::SchemaParse {
                name: name.to_string(),
                message: err.to_string(),
            }
        })?;
        let (schema, warnings) = convert_document(&document);
        debug!(
            schema = name,
            types = schema.types().count(),
            warnings = warnings.len(),
            "Converted SDL document."
        );
        Ok((schema, warnings))
    }
}

fn convert_document(document: &Document<'_, String>) -> (Schema, Vec<Warning>) {
    let mut schema = Schema::new();
    let mut warnings = Vec::new();
    let mut explicit_roots = None;

    for definition in &document.definitions {
        match definition {
            Definition::SchemaDefinition(definition) => {
                explicit_roots = Some(RootTypes {
                    query: definition.query.clone(),
                    mutation: definition.mutation.clone(),
                    subscription: definition.subscription.clone(),
                });
            }
            Definition::TypeDefinition(definition) => {
                let converted = convert_type_definition(definition);
                let name = converted.name.clone();
                if !schema.insert(converted) {
                    warnings.push(Warning::new(
                        WarningKind::SchemaParse,
                        format!("Duplicate definition of type '{name}' ignored"),
                    ));
                }
            }
            Definition::TypeExtension(extension) => {
                apply_extension(&mut schema, extension, &mut warnings);
            }
            Definition::DirectiveDefinition(_) => {}
        }
    }

    if let Some(roots) = explicit_roots {
        schema.set_roots(roots);
    }

    warnings.extend(undefined_references(&schema));
    (schema, warnings)
}

fn convert_type_definition(definition: &AstTypeDefinition<'_, String>) -> TypeDefinition {
    match definition {
        AstTypeDefinition::Scalar(scalar) => TypeDefinition::new(&scalar.name, TypeKind::Scalar),
        AstTypeDefinition::Object(object) => {
            with_fields(TypeDefinition::new(&object.name, TypeKind::Object), &object.fields)
        }
        AstTypeDefinition::Interface(interface) => with_fields(
            TypeDefinition::new(&interface.name, TypeKind::Interface),
            &interface.fields,
        ),
        AstTypeDefinition::Union(union) => TypeDefinition::new(&union.name, TypeKind::Union),
        AstTypeDefinition::Enum(enumeration) => {
            TypeDefinition::new(&enumeration.name, TypeKind::Enum)
        }
        AstTypeDefinition::InputObject(input) => with_input_fields(
            TypeDefinition::new(&input.name, TypeKind::InputObject),
            &input.fields,
        ),
    }
}

fn with_fields(mut definition: TypeDefinition, fields: &[Field<'_, String>]) -> TypeDefinition {
    for field in fields {
        let arguments: IndexMap<_, _> = field
            .arguments
            .iter()
            .map(|argument| (argument.name.clone(), convert_type(&argument.value_type)))
            .collect();
        definition.fields.insert(
            field.name.clone(),
            FieldDefinition {
                ty: convert_type(&field.field_type),
                arguments,
            },
        );
    }
    definition
}

fn with_input_fields(
    mut definition: TypeDefinition,
    fields: &[InputValue<'_, String>],
) -> TypeDefinition {
    for field in fields {
        definition.fields.insert(
            field.name.clone(),
            FieldDefinition::new(convert_type(&field.value_type)),
        );
    }
    definition
}

fn apply_extension(
    schema: &mut Schema,
    extension: &TypeExtension<'_, String>,
    warnings: &mut Vec<Warning>,
) {
    let (name, patch) = match extension {
        TypeExtension::Object(object) => (
            &object.name,
            Some(with_fields(
                TypeDefinition::new(&object.name, TypeKind::Object),
                &object.fields,
            )),
        ),
        TypeExtension::Interface(interface) => (
            &interface.name,
            Some(with_fields(
                TypeDefinition::new(&interface.name, TypeKind::Interface),
                &interface.fields,
            )),
        ),
        TypeExtension::InputObject(input) => (
            &input.name,
            Some(with_input_fields(
                TypeDefinition::new(&input.name, TypeKind::InputObject),
                &input.fields,
            )),
        ),
        TypeExtension::Scalar(scalar) => (&scalar.name, None),
        TypeExtension::Union(union) => (&union.name, None),
        TypeExtension::Enum(enumeration) => (&enumeration.name, None),
    };

    let Some(target) = schema.type_mut(name) else {
        warnings.push(Warning::new(
            WarningKind::SchemaParse,
            format!("Extension of undefined type '{name}' ignored"),
        ));
        return;
    };

    if let Some(patch) = patch {
        target.fields.extend(patch.fields);
    }
}

/// Field and argument types naming types the schema never defines.
fn undefined_references(schema: &Schema) -> Vec<Warning> {
    let mut missing = BTreeSet::new();
    for definition in schema.types() {
        for (field_name, field) in &definition.fields {
            let referenced = std::iter::once(&field.ty).chain(field.arguments.values());
            for ty in referenced {
                if let Some(name) = ty.underlying() {
                    if schema.get(name).is_none() {
                        missing.insert((name.to_string(), definition.name.clone(), field_name));
                    }
                }
            }
        }
    }

    missing
        .into_iter()
        .map(|(name, parent, field)| {
            Warning::new(
                WarningKind::SchemaParse,
                format!(
                    "Type '{name}' referenced by '{parent}.{field}' is not defined; treating it as a scalar"
                ),
            )
        })
        .collect()
}

/// Convert an SDL type reference. Every level is nullable unless wrapped in `!`.
pub(crate) fn convert_type(ty: &Type<'_, String>) -> SchemaType {
    match ty {
        Type::NamedType(name) => SchemaType::named(name.clone()).nullable(),
        Type::ListType(inner) => convert_type(inner).list().nullable(),
        Type::NonNullType(inner) => match convert_type(inner) {
            SchemaType::Nullable(inner) => *inner,
            other => other,
        },
    }
}
