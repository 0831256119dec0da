//! In-memory GraphQL type graph.
//!
//! The model is produced once per schema (see [`sdl`]) and only read
//! afterwards, so a loaded [`Schema`] can be shared between threads.

pub mod sdl;

use indexmap::IndexMap;

/// Names of the scalars every schema carries implicitly.
pub const BUILTIN_SCALARS: [&str; 5] = ["Int", "Float", "String", "Boolean", "ID"];

/// Meta-field available on every composite type.
pub const TYPENAME_FIELD: &str = "__typename";

/// Reference to a type as written in a field or argument signature.
///
/// Non-null is the unwrapped form: SDL `String` is
/// `Nullable(Named("String"))` and `[Int!]!` is `List(Named("Int"))`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchemaType {
    /// A named type.
    Named(String),
    /// A list of the inner type.
    List(Box<SchemaType>),
    /// The inner type may be null.
    Nullable(Box<SchemaType>),
    /// Unresolved or absent.
    NoType,
}

impl SchemaType {
    /// Shorthand for `Named`.
    pub fn named(name: impl Into<String>) -> Self {
        SchemaType::Named(name.into())
    }

    /// Wrap in `Nullable`.
    pub fn nullable(self) -> Self {
        SchemaType::Nullable(Box::new(self))
    }

    /// Wrap in `List`.
    pub fn list(self) -> Self {
        SchemaType::List(Box::new(self))
    }

    /// Name of the type after stripping every list and nullable wrapper.
    pub fn underlying(&self) -> Option<&str> {
        match self {
            SchemaType::Named(name) => Some(name),
            SchemaType::List(inner) | SchemaType::Nullable(inner) => inner.underlying(),
            SchemaType::NoType => None,
        }
    }
}

/// Kind of a named type definition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeKind {
    /// `type Foo { ... }`
    Object,
    /// `interface Foo { ... }`
    Interface,
    /// `union Foo = A | B`
    Union,
    /// `enum Foo { ... }`
    Enum,
    /// `scalar Foo`, or a built-in scalar
    Scalar,
    /// `input Foo { ... }`
    InputObject,
}

impl TypeKind {
    /// Whether selections on this type need a sub-selection set.
    pub fn is_composite(self) -> bool {
        matches!(self, TypeKind::Object | TypeKind::Interface | TypeKind::Union)
    }
}

/// Signature of one field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDefinition {
    /// Return type (or input field type).
    pub ty: SchemaType,
    /// Argument name to argument type, in declaration order.
    pub arguments: IndexMap<String, SchemaType>,
}

impl FieldDefinition {
    /// A field without arguments.
    pub fn new(ty: SchemaType) -> Self {
        Self {
            ty,
            arguments: IndexMap::new(),
        }
    }

    /// Add an argument.
    pub fn with_argument(mut self, name: impl Into<String>, ty: SchemaType) -> Self {
        self.arguments.insert(name.into(), ty);
        self
    }
}

/// A named type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeDefinition {
    /// Type name.
    pub name: String,
    /// What sort of type this is.
    pub kind: TypeKind,
    /// Fields in declaration order (empty for leaves and unions).
    pub fields: IndexMap<String, FieldDefinition>,
}

impl TypeDefinition {
    /// A type definition without fields.
    pub fn new(name: impl Into<String>, kind: TypeKind) -> Self {
        Self {
            name: name.into(),
            kind,
            fields: IndexMap::new(),
        }
    }

    /// Add a field.
    pub fn with_field(mut self, name: impl Into<String>, field: FieldDefinition) -> Self {
        self.fields.insert(name.into(), field);
        self
    }
}

/// Root operation types.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RootTypes {
    /// Root for `query` operations.
    pub query: Option<String>,
    /// Root for `mutation` operations.
    pub mutation: Option<String>,
    /// Root for `subscription` operations.
    pub subscription: Option<String>,
}

/// A complete schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schema {
    types: IndexMap<String, TypeDefinition>,
    roots: RootTypes,
}

impl Default for Schema {
    fn default() -> Self {
        Self::new()
    }
}

impl Schema {
    /// A schema holding only the built-in scalars and the conventional roots.
    pub fn new() -> Self {
        let types = BUILTIN_SCALARS
            .iter()
            .map(|name| {
                (
                    (*name).to_string(),
                    TypeDefinition::new(*name, TypeKind::Scalar),
                )
            })
            .collect();
        Self {
            types,
            roots: RootTypes {
                query: Some("Query".to_string()),
                mutation: Some("Mutation".to_string()),
                subscription: Some("Subscription".to_string()),
            },
        }
    }

    /// Add a type definition. An existing definition with the same name is
    /// kept and `false` is returned.
    pub fn insert(&mut self, definition: TypeDefinition) -> bool {
        if self.types.contains_key(&definition.name) {
            return false;
        }
        self.types.insert(definition.name.clone(), definition);
        true
    }

    /// Builder form of [`Schema::insert`].
    pub fn with_type(mut self, definition: TypeDefinition) -> Self {
        self.insert(definition);
        self
    }

    /// Override the root operation types.
    pub fn set_roots(&mut self, roots: RootTypes) {
        self.roots = roots;
    }

    pub(crate) fn type_mut(&mut self, name: &str) -> Option<&mut TypeDefinition> {
        self.types.get_mut(name)
    }

    /// Look up a named type.
    pub fn get(&self, name: &str) -> Option<&TypeDefinition> {
        self.types.get(name)
    }

    /// Kind of a named type, if it is defined.
    pub fn kind_of(&self, name: &str) -> Option<TypeKind> {
        self.get(name).map(|definition| definition.kind)
    }

    /// All type definitions in declaration order.
    pub fn types(&self) -> impl Iterator<Item = &TypeDefinition> {
        self.types.values()
    }

    /// Root type name for the operation kind, if the schema defines it.
    pub fn root(&self, kind: crate::query::OperationKind) -> Option<&str> {
        use crate::query::OperationKind;

        let name = match kind {
            OperationKind::Query => self.roots.query.as_deref(),
            OperationKind::Mutation => self.roots.mutation.as_deref(),
            OperationKind::Subscription => self.roots.subscription.as_deref(),
        }?;
        self.types.contains_key(name).then_some(name)
    }

    /// Signature of `field` on the composite type `parent`.
    ///
    /// `__typename` resolves on every composite type.
    pub fn field(&self, parent: &str, field: &str) -> Option<FieldDefinition> {
        let definition = self.get(parent)?;
        if field == TYPENAME_FIELD && definition.kind.is_composite() {
            return Some(FieldDefinition::new(SchemaType::named("String")));
        }
        definition.fields.get(field).cloned()
    }

    /// Type returned by `field` on `parent`, or [`SchemaType::NoType`].
    pub fn field_type(&self, parent: &str, field: &str) -> SchemaType {
        self.field(parent, field)
            .map_or(SchemaType::NoType, |definition| definition.ty)
    }
}
