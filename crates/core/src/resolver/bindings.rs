//! Variables inferred from argument bindings at their point of use.
//!
//! For `hero(episode: $ep)` the variable `ep` takes the declared type of the
//! `episode` argument. A binding to an argument the field does not declare is
//! fatal, since the variable type would otherwise be a guess.

use indexmap::IndexMap;

use super::{Resolver, VariableDefinition};
use crate::error::{GenerationError, Warning, WarningKind};
use crate::query::{ArgumentBinding, QueryNode};
use crate::schema::SchemaType;

/// Output of [`Resolver::bind_arguments`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BoundVariables {
    /// Variables in order of first use.
    pub variables: Vec<VariableDefinition>,
    /// Conflicting re-bindings of the same variable.
    pub warnings: Vec<Warning>,
}

impl BoundVariables {
    fn push(&mut self, variable: VariableDefinition) {
        match self.variables.iter().find(|known| known.name == variable.name) {
            None => self.variables.push(variable),
            Some(known) if known.ty != variable.ty => self.warnings.push(Warning::new(
                WarningKind::VariableConflict,
                format!(
                    "Variable '${}' is bound to arguments of different types; keeping {:?}",
                    variable.name, known.ty
                ),
            )),
            Some(_) => {}
        }
    }

    fn merge(mut self, other: BoundVariables) -> Self {
        self.warnings.extend(other.warnings);
        for variable in other.variables {
            self.push(variable);
        }
        self
    }
}

impl Resolver<'_> {
    /// Variables bound by one field's arguments.
    ///
    /// Each binding yields a variable named after the bound variable (not the
    /// argument) typed with the argument's declared type.
    pub fn bind_field_arguments(
        &self,
        parent: &str,
        field: &str,
        bindings: &[ArgumentBinding],
        signatures: &IndexMap<String, SchemaType>,
    ) -> Result<Vec<VariableDefinition>, GenerationError> {
        bindings
            .iter()
            .map(|binding| {
                let declared = signatures.get(&binding.param).ok_or_else(|| {
                    GenerationError::UnboundArgument {
                        parent: parent.to_string(),
                        field: field.to_string(),
                        argument: binding.param.clone(),
                        variable: binding.variable.clone(),
                    }
                })?;
                let ty = self
                    .dealias(declared)
                    .ok_or_else(|| GenerationError::UnresolvedField {
                        parent: parent.to_string(),
                        field: field.to_string(),
                        reason: format!("argument '{}' has no type", binding.param),
                    })?;
                Ok(VariableDefinition {
                    name: binding.variable.clone(),
                    ty,
                })
            })
            .collect()
    }

    /// Infer the variables of a whole selection tree from its bindings.
    pub fn bind_arguments(
        &self,
        query: &QueryNode,
        root: &SchemaType,
    ) -> Result<BoundVariables, GenerationError> {
        let root_name = self.composite_root(root)?;
        self.collect_bindings(query, root_name)
    }

    fn collect_bindings(
        &self,
        node: &QueryNode,
        current: &str,
    ) -> Result<BoundVariables, GenerationError> {
        match node {
            QueryNode::Select {
                field,
                arguments,
                child,
            } => {
                let definition = self.schema.field(current, field).ok_or_else(|| {
                    GenerationError::UnresolvedField {
                        parent: current.to_string(),
                        field: field.clone(),
                        reason: "the type has no such field".to_string(),
                    }
                })?;

                let mut bound = BoundVariables::default();
                for variable in
                    self.bind_field_arguments(current, field, arguments, &definition.arguments)?
                {
                    bound.push(variable);
                }

                match definition.ty.underlying() {
                    Some(underlying)
                        if self
                            .schema
                            .kind_of(underlying)
                            .is_some_and(|kind| kind.is_composite()) =>
                    {
                        Ok(bound.merge(self.collect_bindings(child, underlying)?))
                    }
                    _ => Ok(bound),
                }
            }
            QueryNode::Rename { child, .. } => self.collect_bindings(child, current),
            QueryNode::Group(selections) => selections.iter().try_fold(
                BoundVariables::default(),
                |acc, selection| -> Result<BoundVariables, GenerationError> {
                    Ok(acc.merge(self.collect_bindings(selection, current)?))
                },
            ),
            QueryNode::Empty | QueryNode::Unsupported(_) => Ok(BoundVariables::default()),
        }
    }
}
