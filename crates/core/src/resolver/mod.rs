//! Type resolution: walks a selection tree in lock-step with the schema and
//! produces the record definitions describing the response shape.
//!
//! The walk is a fold. Each call returns its own [`Resolution`] and the
//! caller merges child results into its own, so nothing is shared between
//! calls and independent runs need no coordination.
//!
//! Records come out children first: a record naming another record in one of
//! its fields is always preceded by that record. The synthetic `Data` record
//! holding the top-level selection closes the list.

mod bindings;

pub use bindings::BoundVariables;

use crate::error::{GenerationError, Warning, WarningKind};
use crate::mapping::{NameMapping, capitalize_first};
use crate::query::{QueryNode, QueryTypeRef, VariableDeclaration};
use crate::schema::{Schema, SchemaType};

/// Name of the record holding the top-level selection.
pub const DATA_RECORD: &str = "Data";

/// Name of the record holding the operation variables.
pub const VARIABLES_RECORD: &str = "Variables";

/// A schema type with names replaced by their mapped target names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolvedType {
    /// Target type name.
    Named(String),
    /// List of the inner type.
    List(Box<ResolvedType>),
    /// The inner type may be absent.
    Optional(Box<ResolvedType>),
}

impl ResolvedType {
    /// Shorthand for `Named`.
    pub fn named(name: impl Into<String>) -> Self {
        ResolvedType::Named(name.into())
    }

    /// Wrap in `List`.
    pub fn list(self) -> Self {
        ResolvedType::List(Box::new(self))
    }

    /// Wrap in `Optional`.
    pub fn optional(self) -> Self {
        ResolvedType::Optional(Box::new(self))
    }

    /// Whether the outermost wrapper is `Optional`.
    pub fn is_optional(&self) -> bool {
        matches!(self, ResolvedType::Optional(_))
    }
}

/// One field of a record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedField {
    /// Response key: the alias if the selection has one, else the field name.
    pub name: String,
    /// Field type.
    pub ty: ResolvedType,
}

/// One generated record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordDefinition {
    /// Record name.
    pub name: String,
    /// Fields in selection order.
    pub fields: Vec<ResolvedField>,
}

/// One operation variable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariableDefinition {
    /// Variable name, without `$`.
    pub name: String,
    /// Variable type.
    pub ty: ResolvedType,
}

/// Output of [`Resolver::resolve`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolved {
    /// Records, children before parents, `Data` last.
    pub records: Vec<RecordDefinition>,
    /// Non-fatal diagnostics met during the walk.
    pub warnings: Vec<Warning>,
}

/// Accumulator of one walk step.
#[derive(Debug, Default)]
struct Resolution {
    classes: Vec<RecordDefinition>,
    fields: Vec<ResolvedField>,
    warnings: Vec<Warning>,
}

impl Resolution {
    fn merge(mut self, other: Resolution) -> Self {
        self.classes.extend(other.classes);
        self.fields.extend(other.fields);
        self.warnings.extend(other.warnings);
        self
    }
}

/// Resolves selections and variables against one schema and mapping table.
#[derive(Debug, Clone, Copy)]
pub struct Resolver<'a> {
    schema: &'a Schema,
    mapping: &'a NameMapping,
}

impl<'a> Resolver<'a> {
    /// Create a resolver. Both inputs are only read.
    pub fn new(schema: &'a Schema, mapping: &'a NameMapping) -> Self {
        Self { schema, mapping }
    }

    /// Resolve `query` against the composite type `root`.
    pub fn resolve(
        &self,
        query: &QueryNode,
        root: &SchemaType,
    ) -> Result<Resolved, GenerationError> {
        let root_name = self.composite_root(root)?;
        let resolution = self.walk(query, root_name)?;

        let mut records = resolution.classes;
        records.push(RecordDefinition {
            name: DATA_RECORD.to_string(),
            fields: resolution.fields,
        });
        Ok(Resolved {
            records,
            warnings: resolution.warnings,
        })
    }

    /// Resolve the variables an operation declares, in declaration order.
    pub fn resolve_variables(&self, declared: &[VariableDeclaration]) -> Vec<VariableDefinition> {
        declared
            .iter()
            .map(|variable| VariableDefinition {
                name: variable.name.clone(),
                ty: self.resolve_variable_type(&variable.ty),
            })
            .collect()
    }

    fn resolve_variable_type(&self, ty: &QueryTypeRef) -> ResolvedType {
        match ty {
            QueryTypeRef::Named(name) => ResolvedType::named(self.mapping.map(name)).optional(),
            QueryTypeRef::List(inner) => self.resolve_variable_type(inner).list(),
            // Strips the optional produced for the operand, nothing deeper.
            QueryTypeRef::NonNull(inner) => match self.resolve_variable_type(inner) {
                ResolvedType::Optional(inner) => *inner,
                other => other,
            },
        }
    }

    fn composite_root<'t>(&self, root: &'t SchemaType) -> Result<&'t str, GenerationError> {
        let name = root.underlying().unwrap_or("<none>");
        let composite = self
            .schema
            .kind_of(name)
            .is_some_and(|kind| kind.is_composite());
        if composite {
            Ok(name)
        } else {
            Err(GenerationError::UnresolvedField {
                parent: name.to_string(),
                field: "<root>".to_string(),
                reason: "the root type is not an object type".to_string(),
            })
        }
    }

    fn walk(&self, node: &QueryNode, current: &str) -> Result<Resolution, GenerationError> {
        match node {
            QueryNode::Select { field, child, .. } => self.select(current, field, child),
            QueryNode::Rename { alias, child } => {
                let mut resolution = self.walk(child, current)?;
                for field in &mut resolution.fields {
                    field.name.clone_from(alias);
                }
                Ok(resolution)
            }
            QueryNode::Group(selections) => {
                selections
                    .iter()
                    .try_fold(
                        Resolution::default(),
                        |acc, selection| -> Result<Resolution, GenerationError> {
                            Ok(acc.merge(self.walk(selection, current)?))
                        },
                    )
            }
            QueryNode::Empty => Ok(Resolution::default()),
            QueryNode::Unsupported(construct) => {
                let message = format!("Unsupported selection {construct} on '{current}' skipped");
                Ok(Resolution {
                    warnings: vec![Warning::new(WarningKind::UnsupportedSelection, message)],
                    ..Resolution::default()
                })
            }
        }
    }

    fn select(
        &self,
        current: &str,
        field: &str,
        child: &QueryNode,
    ) -> Result<Resolution, GenerationError> {
        let next = self.schema.field_type(current, field);
        let Some(underlying) = next.underlying() else {
            return Err(GenerationError::UnresolvedField {
                parent: current.to_string(),
                field: field.to_string(),
                reason: "the type has no such field".to_string(),
            });
        };
        let ty = self.dealias(&next).ok_or_else(|| GenerationError::UnresolvedField {
            parent: current.to_string(),
            field: field.to_string(),
            reason: "the field type is unresolved".to_string(),
        })?;
        let selected = ResolvedField {
            name: field.to_string(),
            ty,
        };

        let composite = self
            .schema
            .kind_of(underlying)
            .is_some_and(|kind| kind.is_composite());
        if !composite {
            if !matches!(child, QueryNode::Empty) {
                return Err(GenerationError::UnresolvedField {
                    parent: current.to_string(),
                    field: field.to_string(),
                    reason: format!(
                        "'{underlying}' is a leaf type and cannot have a sub-selection"
                    ),
                });
            }
            return Ok(Resolution {
                fields: vec![selected],
                ..Resolution::default()
            });
        }

        let mut nested = self.walk(child, underlying)?;
        if matches!(child, QueryNode::Empty) {
            nested.warnings.push(Warning::new(
                WarningKind::UnsupportedSelection,
                format!(
                    "Field '{current}.{field}' of composite type '{underlying}' has no sub-selection"
                ),
            ));
        }
        // A mapped composite points at a caller-provided type.
        let name = capitalize_first(underlying);
        if self.mapping.map(underlying) == name {
            nested.classes.push(RecordDefinition {
                name,
                fields: nested.fields,
            });
        }
        Ok(Resolution {
            classes: nested.classes,
            fields: vec![selected],
            warnings: nested.warnings,
        })
    }

    /// Map a schema type into a resolved type, `None` for [`SchemaType::NoType`].
    pub(crate) fn dealias(&self, ty: &SchemaType) -> Option<ResolvedType> {
        Some(match ty {
            SchemaType::Named(name) => ResolvedType::named(self.mapping.map(name)),
            SchemaType::List(inner) => self.dealias(inner)?.list(),
            SchemaType::Nullable(inner) => self.dealias(inner)?.optional(),
            SchemaType::NoType => return None,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;
    use crate::query::ArgumentBinding;
    use crate::schema::{FieldDefinition, TypeDefinition, TypeKind};

    fn starwars() -> Schema {
        Schema::new()
            .with_type(
                TypeDefinition::new("Query", TypeKind::Object)
                    .with_field(
                        "hero",
                        FieldDefinition::new(SchemaType::named("Character").nullable())
                            .with_argument("episode", SchemaType::named("Episode").nullable()),
                    )
                    .with_field("count", FieldDefinition::new(SchemaType::named("Int")))
                    .with_field(
                        "search",
                        FieldDefinition::new(SchemaType::named("SearchResult").list())
                            .with_argument("text", SchemaType::named("String")),
                    ),
            )
            .with_type(
                TypeDefinition::new("Character", TypeKind::Object)
                    .with_field("name", FieldDefinition::new(SchemaType::named("String")))
                    .with_field(
                        "friends",
                        FieldDefinition::new(
                            SchemaType::named("Character").nullable().list().nullable(),
                        ),
                    )
                    .with_field(
                        "appearsIn",
                        FieldDefinition::new(SchemaType::named("Episode").list()),
                    ),
            )
            .with_type(TypeDefinition::new("SearchResult", TypeKind::Union))
            .with_type(TypeDefinition::new("Episode", TypeKind::Enum))
    }

    fn resolve(query: &QueryNode) -> Result<Resolved, GenerationError> {
        let schema = starwars();
        let mapping = NameMapping::default();
        Resolver::new(&schema, &mapping).resolve(query, &SchemaType::named("Query"))
    }

    fn hero_query() -> QueryNode {
        QueryNode::Group(vec![QueryNode::select(
            "hero",
            vec![ArgumentBinding::new("episode", "ep")],
            QueryNode::Group(vec![
                QueryNode::leaf("name"),
                QueryNode::select(
                    "friends",
                    vec![],
                    QueryNode::Group(vec![QueryNode::leaf("name")]),
                ),
            ]),
        )])
    }

    fn field(name: &str, ty: ResolvedType) -> ResolvedField {
        ResolvedField {
            name: name.to_string(),
            ty,
        }
    }

    #[test]
    fn hero_query_produces_nested_records() {
        let resolved = resolve(&hero_query()).unwrap();
        assert!(resolved.warnings.is_empty());
        assert_eq!(
            resolved.records,
            vec![
                RecordDefinition {
                    name: "Character".into(),
                    fields: vec![field("name", ResolvedType::named("String"))],
                },
                RecordDefinition {
                    name: "Character".into(),
                    fields: vec![
                        field("name", ResolvedType::named("String")),
                        field(
                            "friends",
                            ResolvedType::named("Character").optional().list().optional()
                        ),
                    ],
                },
                RecordDefinition {
                    name: DATA_RECORD.into(),
                    fields: vec![field("hero", ResolvedType::named("Character").optional())],
                },
            ]
        );
    }

    #[test]
    fn resolution_is_deterministic() {
        let first = resolve(&hero_query()).unwrap();
        let second = resolve(&hero_query()).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn children_precede_parents() {
        let resolved = resolve(&hero_query()).unwrap();
        for (index, record) in resolved.records.iter().enumerate() {
            for field in &record.fields {
                let mut ty = &field.ty;
                while let ResolvedType::List(inner) | ResolvedType::Optional(inner) = ty {
                    ty = inner.as_ref();
                }
                let ResolvedType::Named(name) = ty else {
                    unreachable!()
                };
                if let Some(position) = resolved.records.iter().position(|r| &r.name == name) {
                    assert!(position < index, "{name} must precede {}", record.name);
                }
            }
        }
    }

    #[test]
    fn nested_aliases_keep_children_first_and_field_order() {
        let query = QueryNode::select(
            "hero",
            vec![],
            QueryNode::Group(vec![
                QueryNode::leaf("name"),
                QueryNode::rename(
                    "allies",
                    QueryNode::select(
                        "friends",
                        vec![],
                        QueryNode::Group(vec![
                            QueryNode::select(
                                "friends",
                                vec![],
                                QueryNode::Group(vec![QueryNode::leaf("name")]),
                            ),
                            QueryNode::rename("label", QueryNode::leaf("name")),
                        ]),
                    ),
                ),
                QueryNode::leaf("appearsIn"),
            ]),
        );
        let resolved = resolve(&query).unwrap();
        let friends = ResolvedType::named("Character").optional().list().optional();
        assert_eq!(
            resolved.records,
            vec![
                RecordDefinition {
                    name: "Character".into(),
                    fields: vec![field("name", ResolvedType::named("String"))],
                },
                RecordDefinition {
                    name: "Character".into(),
                    fields: vec![
                        field("friends", friends.clone()),
                        field("label", ResolvedType::named("String")),
                    ],
                },
                RecordDefinition {
                    name: "Character".into(),
                    fields: vec![
                        field("name", ResolvedType::named("String")),
                        field("allies", friends),
                        field("appearsIn", ResolvedType::named("Episode").list()),
                    ],
                },
                RecordDefinition {
                    name: DATA_RECORD.into(),
                    fields: vec![field("hero", ResolvedType::named("Character").optional())],
                },
            ]
        );
    }

    #[test]
    fn data_record_closes_the_list_in_selection_order() {
        let query = QueryNode::Group(vec![
            QueryNode::leaf("count"),
            QueryNode::rename(
                "first",
                QueryNode::select(
                    "hero",
                    vec![],
                    QueryNode::Group(vec![QueryNode::leaf("name")]),
                ),
            ),
            QueryNode::leaf("__typename"),
        ]);
        let resolved = resolve(&query).unwrap();
        let data = resolved.records.last().unwrap();
        assert_eq!(data.name, DATA_RECORD);
        let names: Vec<_> = data.fields.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, ["count", "first", "__typename"]);
    }

    #[test]
    fn rename_keeps_type_and_changes_name() {
        let query =
            QueryNode::rename("total", QueryNode::select("count", vec![], QueryNode::Empty));
        let resolved = resolve(&query).unwrap();
        assert_eq!(
            resolved.records,
            vec![RecordDefinition {
                name: DATA_RECORD.into(),
                fields: vec![field("total", ResolvedType::named("i32"))],
            }]
        );
    }

    #[test]
    fn enum_lists_are_leaves() {
        let query = QueryNode::select(
            "hero",
            vec![],
            QueryNode::Group(vec![QueryNode::leaf("appearsIn")]),
        );
        let resolved = resolve(&query).unwrap();
        assert_eq!(
            resolved.records[0].fields,
            vec![field("appearsIn", ResolvedType::named("Episode").list())]
        );
    }

    #[test]
    fn sub_selection_on_scalar_is_an_error() {
        let query = QueryNode::select(
            "count",
            vec![],
            QueryNode::Group(vec![QueryNode::leaf("value")]),
        );
        let err = resolve(&query).unwrap_err();
        let GenerationError::UnresolvedField { parent, field, reason } = err else {
            panic!("expected UnresolvedField, got {err:?}");
        };
        assert_eq!(parent, "Query");
        assert_eq!(field, "count");
        assert!(reason.contains("leaf type"), "{reason}");
    }

    #[test]
    fn unknown_field_is_an_error() {
        let query = QueryNode::select(
            "hero",
            vec![],
            QueryNode::Group(vec![QueryNode::leaf("height")]),
        );
        let err = resolve(&query).unwrap_err();
        assert!(
            matches!(err, GenerationError::UnresolvedField { ref parent, ref field, .. }
                if parent == "Character" && field == "height"),
            "{err:?}"
        );
    }

    #[test]
    fn unsupported_selections_warn_and_continue() {
        let query = QueryNode::Group(vec![
            QueryNode::leaf("count"),
            QueryNode::Unsupported("fragment spread '...Stats'".into()),
        ]);
        let resolved = resolve(&query).unwrap();
        assert_eq!(resolved.records.len(), 1);
        assert_eq!(resolved.records[0].fields.len(), 1);
        assert_eq!(resolved.warnings.len(), 1);
        assert_eq!(resolved.warnings[0].kind, WarningKind::UnsupportedSelection);
        assert!(resolved.warnings[0].message.contains("...Stats"));
    }

    #[test]
    fn composite_without_sub_selection_yields_empty_record() {
        let resolved = resolve(&QueryNode::leaf("hero")).unwrap();
        assert_eq!(
            resolved.records[0],
            RecordDefinition {
                name: "Character".into(),
                fields: vec![],
            }
        );
        assert_eq!(resolved.warnings.len(), 1);
    }

    #[test]
    fn union_selection_allows_typename() {
        let query = QueryNode::select(
            "search",
            vec![],
            QueryNode::Group(vec![QueryNode::leaf("__typename")]),
        );
        let resolved = resolve(&query).unwrap();
        assert_eq!(resolved.records[0].name, "SearchResult");
        assert_eq!(
            resolved.records[1].fields,
            vec![field("search", ResolvedType::named("SearchResult").list())]
        );
    }

    #[test]
    fn non_composite_root_is_rejected() {
        let schema = starwars();
        let mapping = NameMapping::default();
        let err = Resolver::new(&schema, &mapping)
            .resolve(&QueryNode::Empty, &SchemaType::named("Episode"))
            .unwrap_err();
        assert!(matches!(err, GenerationError::UnresolvedField { .. }));
    }

    #[test]
    fn non_null_applies_to_exactly_one_level() {
        let schema = starwars();
        let mapping = NameMapping::default();
        let resolver = Resolver::new(&schema, &mapping);
        let declared = vec![
            VariableDeclaration {
                name: "ids".into(),
                ty: QueryTypeRef::named("Int").list().non_null(),
            },
            VariableDeclaration {
                name: "names".into(),
                ty: QueryTypeRef::named("String").non_null().list(),
            },
            VariableDeclaration {
                name: "tags".into(),
                ty: QueryTypeRef::named("Int").list(),
            },
            VariableDeclaration {
                name: "ep".into(),
                ty: QueryTypeRef::named("Episode"),
            },
            VariableDeclaration {
                name: "id".into(),
                ty: QueryTypeRef::named("ID").non_null(),
            },
        ];
        let variables = resolver.resolve_variables(&declared);
        let types: Vec<_> = variables.iter().map(|v| v.ty.clone()).collect();
        assert_eq!(
            types,
            vec![
                ResolvedType::named("i32").optional().list(),
                ResolvedType::named("String").list(),
                ResolvedType::named("i32").optional().list(),
                ResolvedType::named("Episode").optional(),
                ResolvedType::named("String"),
            ]
        );
    }

    #[test]
    fn mapped_composites_are_not_generated() {
        let schema = starwars();
        let mapping = NameMapping::with_overrides([
            ("Character", "crate::model::Person"),
            ("Int", "i64"),
        ]);
        let query = QueryNode::Group(vec![
            QueryNode::leaf("count"),
            QueryNode::select("hero", vec![], QueryNode::Group(vec![QueryNode::leaf("name")])),
        ]);
        let resolved = Resolver::new(&schema, &mapping)
            .resolve(&query, &SchemaType::named("Query"))
            .unwrap();
        assert_eq!(resolved.records.len(), 1);
        assert_eq!(
            resolved.records[0].fields,
            vec![
                field("count", ResolvedType::named("i64")),
                field("hero", ResolvedType::named("crate::model::Person").optional()),
            ]
        );
    }

    #[test]
    fn unmapped_records_use_the_capitalized_type_name() {
        let schema = Schema::new()
            .with_type(TypeDefinition::new("Query", TypeKind::Object).with_field(
                "viewer",
                FieldDefinition::new(SchemaType::named("user").nullable()),
            ))
            .with_type(
                TypeDefinition::new("user", TypeKind::Object)
                    .with_field("login", FieldDefinition::new(SchemaType::named("String"))),
            );
        let mapping = NameMapping::default();
        let query = QueryNode::select(
            "viewer",
            vec![],
            QueryNode::Group(vec![QueryNode::leaf("login")]),
        );
        let resolved = Resolver::new(&schema, &mapping)
            .resolve(&query, &SchemaType::named("Query"))
            .unwrap();
        assert_eq!(resolved.records[0].name, "User");
        assert_eq!(
            resolved.records[1].fields,
            vec![field("viewer", ResolvedType::named("User").optional())]
        );
    }
}
