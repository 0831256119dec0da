//! Query AST: one operation's selections and declared variables.

pub mod document;

use std::fmt;

/// Operation kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationKind {
    /// `query`
    Query,
    /// `mutation`
    Mutation,
    /// `subscription`
    Subscription,
}

impl OperationKind {
    /// Keyword as written in a document.
    pub fn as_str(&self) -> &'static str {
        match self {
            OperationKind::Query => "query",
            OperationKind::Mutation => "mutation",
            OperationKind::Subscription => "subscription",
        }
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A field argument bound to an operation variable: `episode: $ep`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArgumentBinding {
    /// Formal argument name declared by the field.
    pub param: String,
    /// Variable the argument is bound to, without `$`.
    pub variable: String,
}

impl ArgumentBinding {
    /// Bind `param` to `$variable`.
    pub fn new(param: impl Into<String>, variable: impl Into<String>) -> Self {
        Self {
            param: param.into(),
            variable: variable.into(),
        }
    }
}

/// One node of a selection tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryNode {
    /// Select `field`, binding `arguments`, with `child` as sub-selection.
    Select {
        /// Field name on the enclosing type.
        field: String,
        /// Variable bindings of the field's arguments.
        arguments: Vec<ArgumentBinding>,
        /// Sub-selection, `Empty` for leaves.
        child: Box<QueryNode>,
    },
    /// Record the field produced by `child` under `alias`.
    Rename {
        /// Response key.
        alias: String,
        /// Aliased selection.
        child: Box<QueryNode>,
    },
    /// Sibling selections, in document order.
    Group(Vec<QueryNode>),
    /// No selection.
    Empty,
    /// A selection construct the resolver does not understand.
    Unsupported(String),
}

impl QueryNode {
    /// A leaf selection without arguments.
    pub fn leaf(field: impl Into<String>) -> Self {
        QueryNode::select(field, Vec::new(), QueryNode::Empty)
    }

    /// A selection with arguments and a sub-selection.
    pub fn select(
        field: impl Into<String>,
        arguments: Vec<ArgumentBinding>,
        child: QueryNode,
    ) -> Self {
        QueryNode::Select {
            field: field.into(),
            arguments,
            child: Box::new(child),
        }
    }

    /// Alias `child`.
    pub fn rename(alias: impl Into<String>, child: QueryNode) -> Self {
        QueryNode::Rename {
            alias: alias.into(),
            child: Box::new(child),
        }
    }
}

/// Variable type as written in an operation, nullable unless `NonNull`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryTypeRef {
    /// `Episode`
    Named(String),
    /// `[T]`
    List(Box<QueryTypeRef>),
    /// `T!`
    NonNull(Box<QueryTypeRef>),
}

impl QueryTypeRef {
    /// Shorthand for `Named`.
    pub fn named(name: impl Into<String>) -> Self {
        QueryTypeRef::Named(name.into())
    }

    /// Wrap in `List`.
    pub fn list(self) -> Self {
        QueryTypeRef::List(Box::new(self))
    }

    /// Wrap in `NonNull`.
    pub fn non_null(self) -> Self {
        QueryTypeRef::NonNull(Box::new(self))
    }
}

/// `$name: Type` in an operation header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariableDeclaration {
    /// Variable name, without `$`.
    pub name: String,
    /// Declared type.
    pub ty: QueryTypeRef,
}

/// A single operation taken from a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Operation {
    /// Operation kind.
    pub kind: OperationKind,
    /// Operation name, if any.
    pub name: Option<String>,
    /// Declared variables, in declaration order.
    pub variables: Vec<VariableDeclaration>,
    /// Top-level selection set.
    pub selection: QueryNode,
    /// Document text the operation was taken from.
    pub source: String,
}
