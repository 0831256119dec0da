//! Resolved records and variables to Rust IR.

use std::collections::{BTreeSet, HashSet};

use super::types::{BindingKind, RsBinding, RsConst, RsField, RsModule, RsStruct, SerdeAttr};
use super::utils::{dedupe_ident, field_ident, unraw};
use crate::query::Operation;
use crate::resolver::{DATA_RECORD, RecordDefinition, VARIABLES_RECORD, VariableDefinition};

/// Name of the generated constant holding the operation document.
pub const OPERATION_CONST: &str = "OPERATION";

const BASE_DERIVES: [&str; 3] = ["Debug", "Clone", "PartialEq"];

/// What the destination already declares for one of the two top-level
/// structs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Provided {
    /// The struct itself exists; do not emit it.
    pub has_record: bool,
    /// Its decode/encode `impl` exists; do not emit the binding.
    pub has_module: bool,
}

/// Declarations already present in the destination.
///
/// Anything listed here is left out of the generated file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProvidedDeclarations {
    /// The `Data` struct and its decode binding.
    pub data: Provided,
    /// The `Variables` struct and its encode binding.
    pub variables: Provided,
    /// Nested record names that exist already.
    pub records: BTreeSet<String>,
}

/// Extra imports and derives applied to every generated file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EmitOptions {
    /// Additional `use` paths, without `use` or the trailing semicolon.
    pub imports: Vec<String>,
    /// Additional derive macros for every struct.
    pub derives: Vec<String>,
}

/// Build the IR for one operation.
///
/// The last of `records` is the response root; the others are nested.
pub fn codegen_module(
    operation: &Operation,
    records: &[RecordDefinition],
    variables: &[VariableDefinition],
    options: &EmitOptions,
    provided: &ProvidedDeclarations,
) -> RsModule {
    let (root, nested) = records
        .split_last()
        .map_or((None, records), |(root, nested)| (Some(root), nested));
    let emits_variables = !provided.variables.has_record;

    let mut structs = nested
        .iter()
        .filter(|record| !provided.records.contains(&record.name))
        .map(|record| codegen_record(record, None, options))
        .collect::<Vec<_>>();
    if let Some(root) = root.filter(|_| !provided.data.has_record) {
        structs.push(codegen_record(root, Some(operation), options));
    }
    let emits_response = !structs.is_empty();
    if emits_variables {
        structs.push(codegen_variables(variables, operation, options));
    }

    let mut bindings = Vec::new();
    if !provided.data.has_module {
        bindings.push(RsBinding {
            target: DATA_RECORD.to_string(),
            kind: BindingKind::Decode,
        });
    }
    if !provided.variables.has_module {
        bindings.push(RsBinding {
            target: VARIABLES_RECORD.to_string(),
            kind: BindingKind::Encode {
                operation_name: operation.name.clone(),
            },
        });
    }

    RsModule {
        header: codegen_header(operation),
        imports: codegen_imports(emits_response, emits_variables, &options.imports),
        consts: vec![RsConst {
            name: OPERATION_CONST.to_string(),
            doc: Some("Operation document sent as `query`.".to_string()),
            value: operation.source.clone(),
        }],
        structs,
        bindings,
    }
}

fn codegen_header(operation: &Operation) -> Vec<String> {
    let subject = match &operation.name {
        Some(name) => format!("{} `{name}`", operation.kind),
        None => format!("anonymous {}", operation.kind),
    };
    vec![
        format!("Generated by gqlmodel from {subject}."),
        "Do not edit by hand.".to_string(),
    ]
}

fn codegen_imports(response: bool, variables: bool, extra: &[String]) -> Vec<String> {
    let serde = match (response, variables) {
        (true, true) => Some("serde::{Deserialize, Serialize}".to_string()),
        (true, false) => Some("serde::Deserialize".to_string()),
        (false, true) => Some("serde::Serialize".to_string()),
        (false, false) => None,
    };

    let mut seen = HashSet::new();
    serde
        .into_iter()
        .chain(extra.iter().map(|path| normalize_import(path)))
        .filter(|path| seen.insert(path.clone()))
        .map(|path| format!("use {path};"))
        .collect()
}

/// Accept `use a::b;`, `a::b;` and `a::b` alike.
fn normalize_import(path: &str) -> String {
    let path = path.trim();
    let path = path.strip_prefix("use ").unwrap_or(path);
    path.trim_end_matches(';').trim().to_string()
}

fn derives(base: &str, options: &EmitOptions) -> Vec<String> {
    let mut derives = BASE_DERIVES
        .iter()
        .map(|derive| (*derive).to_string())
        .collect::<Vec<_>>();
    derives.push(base.to_string());
    for extra in &options.derives {
        if !derives.contains(extra) {
            derives.push(extra.clone());
        }
    }
    derives
}

/// `root` carries the operation when `record` is the response root.
fn codegen_record(
    record: &RecordDefinition,
    root: Option<&Operation>,
    options: &EmitOptions,
) -> RsStruct {
    let mut taken = HashSet::new();
    let fields = record
        .fields
        .iter()
        .map(|field| {
            let ty = field.ty.to_rs_type();
            let ident = dedupe_ident(field_ident(&field.name), &mut taken);
            let mut serde = rename_attr(&ident, &field.name);
            if ty.is_option() {
                serde.push(SerdeAttr::Default);
            }
            RsField { ident, ty, serde }
        })
        .collect();

    let doc = root.map(|operation| match &operation.name {
        Some(name) => format!("Response data of `{name}`."),
        None => "Response data.".to_string(),
    });

    RsStruct {
        name: record.name.clone(),
        doc,
        derives: derives("Deserialize", options),
        fields,
    }
}

fn codegen_variables(
    variables: &[VariableDefinition],
    operation: &Operation,
    options: &EmitOptions,
) -> RsStruct {
    let mut taken = HashSet::new();
    let fields = variables
        .iter()
        .map(|variable| {
            let ty = variable.ty.to_rs_type();
            let ident = dedupe_ident(field_ident(&variable.name), &mut taken);
            let mut serde = rename_attr(&ident, &variable.name);
            if ty.is_option() {
                serde.push(SerdeAttr::SkipNone);
            }
            RsField { ident, ty, serde }
        })
        .collect();

    let doc = Some(match &operation.name {
        Some(name) => format!("Variables of `{name}`."),
        None => "Operation variables.".to_string(),
    });

    RsStruct {
        name: VARIABLES_RECORD.to_string(),
        doc,
        derives: derives("Serialize", options),
        fields,
    }
}

fn rename_attr(ident: &str, wire_name: &str) -> Vec<SerdeAttr> {
    if unraw(ident) == wire_name {
        Vec::new()
    } else {
        vec![SerdeAttr::Rename(wire_name.to_string())]
    }
}
