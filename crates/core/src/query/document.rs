//! Operation document to [`Operation`] conversion.
//!
//! Text parsing is delegated to `graphql-parser`. Constructs the resolver has
//! no use for (fragments, directives) are dropped with a warning, and
//! fragment spreads inside selections become [`QueryNode::Unsupported`].

use graphql_parser::query::{
    Definition, Document, Field, OperationDefinition, Selection, SelectionSet, Type, TypeCondition,
    Value, VariableDefinition,
};
use tracing::debug;

use super::{
    ArgumentBinding, Operation, OperationKind, QueryNode, QueryTypeRef, VariableDeclaration,
};
use crate::error::{GenerationError, Warning, WarningKind};

struct RawOperation<'d, 'a> {
    kind: OperationKind,
    name: Option<&'d str>,
    variables: &'d [VariableDefinition<'a, String>],
    selection_set: &'d SelectionSet<'a, String>,
}

impl Operation {
    /// Parse `document` and take the operation called `operation_name`, or
    /// the first operation when no name is given.
    pub fn parse(
        document: &str,
        operation_name: Option<&str>,
    ) -> Result<(Operation, Vec<Warning>), GenerationError> {
        if document.trim().is_empty() {
            return Err(GenerationError::MissingDocument {
                reason: "the operation document is empty".to_string(),
            });
        }

        let parsed = graphql_parser::parse_query::<String>(document).map_err(|err| {
            GenerationError::QueryParse {
                message: err.to_string(),
            }
        })?;

        let mut warnings = Vec::new();
        let operations = collect_operations(&parsed, &mut warnings);
        let raw = select_operation(operations, operation_name, &mut warnings)?;

        let variables = raw
            .variables
            .iter()
            .map(|variable| VariableDeclaration {
                name: variable.name.clone(),
                ty: convert_type(&variable.var_type),
            })
            .collect();
        let selection = convert_selection_set(raw.selection_set, &mut warnings);

        debug!(
            kind = %raw.kind,
            name = raw.name.unwrap_or("<anonymous>"),
            warnings = warnings.len(),
            "Converted operation document."
        );

        Ok((
            Operation {
                kind: raw.kind,
                name: raw.name.map(str::to_string),
                variables,
                selection,
                source: document.to_string(),
            },
            warnings,
        ))
    }
}

fn collect_operations<'d, 'a>(
    document: &'d Document<'a, String>,
    warnings: &mut Vec<Warning>,
) -> Vec<RawOperation<'d, 'a>> {
    let mut operations = Vec::new();
    for definition in &document.definitions {
        let raw = match definition {
            Definition::Fragment(fragment) => {
                warnings.push(Warning::new(
                    WarningKind::QueryParse,
                    format!(
                        "Fragment definition '{}' ignored; fragments are not supported",
                        fragment.name
                    ),
                ));
                continue;
            }
            Definition::Operation(OperationDefinition::SelectionSet(selection_set)) => {
                RawOperation {
                    kind: OperationKind::Query,
                    name: None,
                    variables: &[],
                    selection_set,
                }
            }
            Definition::Operation(OperationDefinition::Query(query)) => RawOperation {
                kind: OperationKind::Query,
                name: query.name.as_deref(),
                variables: &query.variable_definitions,
                selection_set: &query.selection_set,
            },
            Definition::Operation(OperationDefinition::Mutation(mutation)) => RawOperation {
                kind: OperationKind::Mutation,
                name: mutation.name.as_deref(),
                variables: &mutation.variable_definitions,
                selection_set: &mutation.selection_set,
            },
            Definition::Operation(OperationDefinition::Subscription(subscription)) => {
                RawOperation {
                    kind: OperationKind::Subscription,
                    name: subscription.name.as_deref(),
                    variables: &subscription.variable_definitions,
                    selection_set: &subscription.selection_set,
                }
            }
        };
        operations.push(raw);
    }
    operations
}

fn select_operation<'d, 'a>(
    operations: Vec<RawOperation<'d, 'a>>,
    operation_name: Option<&str>,
    warnings: &mut Vec<Warning>,
) -> Result<RawOperation<'d, 'a>, GenerationError> {
    if let Some(wanted) = operation_name {
        return operations
            .into_iter()
            .find(|operation| operation.name == Some(wanted))
            .ok_or_else(|| GenerationError::QueryParse {
                message: format!("document contains no operation named '{wanted}'"),
            });
    }

    let count = operations.len();
    let first = operations
        .into_iter()
        .next()
        .ok_or_else(|| GenerationError::QueryParse {
            message: "document contains no operation".to_string(),
        })?;
    if count > 1 {
        warnings.push(Warning::new(
            WarningKind::QueryParse,
            format!(
                "Document contains {count} operations; using the first ('{}')",
                first.name.unwrap_or("<anonymous>")
            ),
        ));
    }
    Ok(first)
}

fn convert_selection_set(
    selection_set: &SelectionSet<'_, String>,
    warnings: &mut Vec<Warning>,
) -> QueryNode {
    QueryNode::Group(
        selection_set
            .items
            .iter()
            .map(|selection| convert_selection(selection, warnings))
            .collect(),
    )
}

fn convert_selection(selection: &Selection<'_, String>, warnings: &mut Vec<Warning>) -> QueryNode {
    match selection {
        Selection::Field(field) => convert_field(field, warnings),
        Selection::FragmentSpread(spread) => {
            QueryNode::Unsupported(format!("fragment spread '...{}'", spread.fragment_name))
        }
        Selection::InlineFragment(fragment) => match &fragment.type_condition {
            Some(TypeCondition::On(on)) => {
                QueryNode::Unsupported(format!("inline fragment on '{on}'"))
            }
            None => QueryNode::Unsupported("inline fragment".to_string()),
        },
    }
}

fn convert_field(field: &Field<'_, String>, warnings: &mut Vec<Warning>) -> QueryNode {
    for directive in &field.directives {
        warnings.push(Warning::new(
            WarningKind::QueryParse,
            format!(
                "Directive '@{}' on field '{}' ignored",
                directive.name, field.name
            ),
        ));
    }

    let mut arguments = Vec::new();
    for (param, value) in &field.arguments {
        match value {
            Value::Variable(variable) => arguments.push(ArgumentBinding::new(param, variable)),
            other if contains_variable(other) => warnings.push(Warning::new(
                WarningKind::QueryParse,
                format!(
                    "Variables nested in the literal for argument '{param}' of field '{}' are not inferred",
                    field.name
                ),
            )),
            _ => {}
        }
    }

    let child = if field.selection_set.items.is_empty() {
        QueryNode::Empty
    } else {
        convert_selection_set(&field.selection_set, warnings)
    };
    let select = QueryNode::select(&field.name, arguments, child);

    match &field.alias {
        Some(alias) if *alias != field.name => QueryNode::rename(alias, select),
        _ => select,
    }
}

fn contains_variable(value: &Value<'_, String>) -> bool {
    match value {
        Value::Variable(_) => true,
        Value::List(items) => items.iter().any(contains_variable),
        Value::Object(fields) => fields.values().any(contains_variable),
        _ => false,
    }
}

fn convert_type(ty: &Type<'_, String>) -> QueryTypeRef {
    match ty {
        Type::NamedType(name) => QueryTypeRef::named(name),
        Type::ListType(inner) => convert_type(inner).list(),
        Type::NonNullType(inner) => convert_type(inner).non_null(),
    }
}
