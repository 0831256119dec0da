//! Rust code emission via the Emit trait.
//!
//! Each IR node renders itself; the module renderer only concatenates.

use super::types::{
    BindingKind, RsBinding, RsConst, RsField, RsModule, RsStruct, RsType, SerdeAttr,
};
use super::utils::{escape_rust_string, raw_string_literal};

/// Trait for emitting Rust source from IR nodes.
pub trait Emit {
    /// Convert the node to its Rust source representation.
    fn emit(&self) -> String;
}

impl Emit for RsType {
    fn emit(&self) -> String {
        match self {
            RsType::Path(path) => path.clone(),
            RsType::Option(inner) => format!("Option<{}>", inner.emit()),
            RsType::Vec(inner) => format!("Vec<{}>", inner.emit()),
        }
    }
}

impl Emit for SerdeAttr {
    fn emit(&self) -> String {
        match self {
            SerdeAttr::Rename(name) => format!("rename = \"{}\"", escape_rust_string(name)),
            SerdeAttr::Default => "default".to_string(),
            SerdeAttr::SkipNone => "skip_serializing_if = \"Option::is_none\"".to_string(),
        }
    }
}

impl Emit for RsField {
    fn emit(&self) -> String {
        let mut output = String::new();
        if !self.serde.is_empty() {
            let args = self.serde.iter().map(Emit::emit).collect::<Vec<_>>();
            output.push_str(&format!("    #[serde({})]\n", args.join(", ")));
        }
        output.push_str(&format!("    pub {}: {},\n", self.ident, self.ty.emit()));
        output
    }
}

impl Emit for RsStruct {
    fn emit(&self) -> String {
        let mut output = String::new();
        if let Some(doc) = &self.doc {
            output.push_str(&format!("/// {doc}\n"));
        }
        if !self.derives.is_empty() {
            output.push_str(&format!("#[derive({})]\n", self.derives.join(", ")));
        }
        if self.fields.is_empty() {
            output.push_str(&format!("pub struct {} {{}}\n", self.name));
            return output;
        }
        output.push_str(&format!("pub struct {} {{\n", self.name));
        for field in &self.fields {
            output.push_str(&field.emit());
        }
        output.push_str("}\n");
        output
    }
}

impl Emit for RsConst {
    fn emit(&self) -> String {
        let mut output = String::new();
        if let Some(doc) = &self.doc {
            output.push_str(&format!("/// {doc}\n"));
        }
        output.push_str(&format!(
            "pub const {}: &str = {};\n",
            self.name,
            raw_string_literal(&self.value)
        ));
        output
    }
}

impl Emit for RsBinding {
    fn emit(&self) -> String {
        match &self.kind {
            BindingKind::Decode => format!(
                "impl {} {{\n    \
                 /// Decode the `data` member of a response.\n    \
                 pub fn decode(data: serde_json::Value) -> serde_json::Result<Self> {{\n        \
                 serde_json::from_value(data)\n    \
                 }}\n\
                 }}\n",
                self.target
            ),
            BindingKind::Encode { operation_name } => {
                let operation_name = operation_name
                    .as_ref()
                    .map(|name| {
                        format!(
                            "            \"operationName\": \"{}\",\n",
                            escape_rust_string(name)
                        )
                    })
                    .unwrap_or_default();
                format!(
                    "impl {} {{\n    \
                     /// Encode a request payload for `OPERATION` with these variables.\n    \
                     pub fn encode(&self) -> serde_json::Result<serde_json::Value> {{\n        \
                     Ok(serde_json::json!({{\n            \
                     \"query\": OPERATION,\n\
                     {operation_name}            \
                     \"variables\": serde_json::to_value(self)?,\n        \
                     }}))\n    \
                     }}\n\
                     }}\n",
                    self.target
                )
            }
        }
    }
}

impl Emit for RsModule {
    fn emit(&self) -> String {
        let mut sections = Vec::new();

        if !self.header.is_empty() {
            sections.push(
                self.header
                    .iter()
                    .map(|line| format!("// {line}\n"))
                    .collect::<String>(),
            );
        }

        if !self.imports.is_empty() {
            sections.push(
                self.imports
                    .iter()
                    .map(|import| format!("{import}\n"))
                    .collect::<String>(),
            );
        }

        sections.extend(self.consts.iter().map(Emit::emit));
        sections.extend(self.structs.iter().map(Emit::emit));
        sections.extend(self.bindings.iter().map(Emit::emit));

        sections.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nested_types() {
        let ty = RsType::Option(Box::new(RsType::Vec(Box::new(RsType::Option(Box::new(
            RsType::Path("Character".into()),
        ))))));
        assert_eq!(ty.emit(), "Option<Vec<Option<Character>>>");
    }

    #[test]
    fn field_with_attributes() {
        let field = RsField {
            ident: "friend_count".into(),
            ty: RsType::Option(Box::new(RsType::Path("i32".into()))),
            serde: vec![SerdeAttr::Rename("friendCount".into()), SerdeAttr::Default],
        };
        assert_eq!(
            field.emit(),
            "    #[serde(rename = \"friendCount\", default)]\n    pub friend_count: Option<i32>,\n"
        );
    }

    #[test]
    fn struct_with_doc_and_derives() {
        let item = RsStruct {
            name: "Data".into(),
            doc: Some("Response data.".into()),
            derives: vec!["Debug".into(), "Deserialize".into()],
            fields: vec![RsField {
                ident: "name".into(),
                ty: RsType::Path("String".into()),
                serde: vec![],
            }],
        };
        assert_eq!(
            item.emit(),
            "/// Response data.\n#[derive(Debug, Deserialize)]\npub struct Data {\n    pub name: String,\n}\n"
        );
    }

    #[test]
    fn empty_struct_uses_braces() {
        let item = RsStruct {
            name: "Variables".into(),
            doc: None,
            derives: vec![],
            fields: vec![],
        };
        assert_eq!(item.emit(), "pub struct Variables {}\n");
    }

    #[test]
    fn const_holds_raw_document() {
        let item = RsConst {
            name: "OPERATION".into(),
            doc: None,
            value: "query { hero { name } }".into(),
        };
        assert_eq!(
            item.emit(),
            "pub const OPERATION: &str = r#\"query { hero { name } }\"#;\n"
        );
    }

    #[test]
    fn encode_binding_includes_operation_name() {
        let binding = RsBinding {
            target: "Variables".into(),
            kind: BindingKind::Encode {
                operation_name: Some("Hero".into()),
            },
        };
        let code = binding.emit();
        assert!(code.contains("impl Variables {"));
        assert!(code.contains("\"query\": OPERATION,"));
        assert!(code.contains("\"operationName\": \"Hero\","));
        assert!(code.contains("\"variables\": serde_json::to_value(self)?,"));
    }

    #[test]
    fn anonymous_encode_binding_omits_operation_name() {
        let binding = RsBinding {
            target: "Variables".into(),
            kind: BindingKind::Encode {
                operation_name: None,
            },
        };
        assert!(!binding.emit().contains("operationName"));
    }

    #[test]
    fn decode_binding() {
        let binding = RsBinding {
            target: "Data".into(),
            kind: BindingKind::Decode,
        };
        let code = binding.emit();
        assert!(code.starts_with("impl Data {\n"));
        assert!(code.contains("pub fn decode(data: serde_json::Value) -> serde_json::Result<Self>"));
    }

    #[test]
    fn module_sections_are_separated_by_blank_lines() {
        let module = RsModule {
            header: vec!["Generated.".into()],
            imports: vec!["use serde::Deserialize;".into()],
            ..RsModule::default()
        };
        assert_eq!(module.emit(), "// Generated.\n\nuse serde::Deserialize;\n");
    }
}
