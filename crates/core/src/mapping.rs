//! Schema type name to Rust type name mapping.

use indexmap::IndexMap;

/// Built-in scalars and the Rust types they map to unless overridden.
const DEFAULT_MAPPINGS: [(&str, &str); 5] = [
    ("ID", "String"),
    ("String", "String"),
    ("Int", "i32"),
    ("Float", "f64"),
    ("Boolean", "bool"),
];

/// Lookup from schema type name to target type name.
///
/// Names without an entry are capitalized. Pure and total: every name maps
/// to something.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NameMapping {
    entries: IndexMap<String, String>,
}

impl Default for NameMapping {
    fn default() -> Self {
        Self {
            entries: DEFAULT_MAPPINGS
                .iter()
                .map(|(from, to)| ((*from).to_string(), (*to).to_string()))
                .collect(),
        }
    }
}

impl NameMapping {
    /// Defaults with `overrides` merged on top; an override always wins.
    pub fn with_overrides<I, K, V>(overrides: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut mapping = Self::default();
        mapping.extend(overrides);
        mapping
    }

    /// Merge `overrides` into this table.
    pub fn extend<I, K, V>(&mut self, overrides: I)
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.entries.extend(
            overrides
                .into_iter()
                .map(|(from, to)| (from.into(), to.into())),
        );
    }

    /// Target type name for `schema_name`.
    pub fn map(&self, schema_name: &str) -> String {
        self.entries
            .get(schema_name)
            .cloned()
            .unwrap_or_else(|| capitalize_first(schema_name))
    }
}

/// Upper-case the first character.
pub fn capitalize_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_scalars_map_to_rust_primitives() {
        let mapping = NameMapping::default();
        assert_eq!(mapping.map("ID"), "String");
        assert_eq!(mapping.map("Int"), "i32");
        assert_eq!(mapping.map("Float"), "f64");
        assert_eq!(mapping.map("Boolean"), "bool");
        assert_eq!(mapping.map("String"), "String");
    }

    #[test]
    fn unknown_names_are_capitalized() {
        let mapping = NameMapping::default();
        assert_eq!(mapping.map("Character"), "Character");
        assert_eq!(mapping.map("episode"), "Episode");
        assert_eq!(mapping.map(""), "");
    }

    #[test]
    fn overrides_win_over_defaults() {
        let mapping = NameMapping::with_overrides([
            ("ID", "uuid::Uuid"),
            ("DateTime", "chrono::DateTime<chrono::Utc>"),
        ]);
        assert_eq!(mapping.map("ID"), "uuid::Uuid");
        assert_eq!(mapping.map("DateTime"), "chrono::DateTime<chrono::Utc>");
        assert_eq!(mapping.map("Int"), "i32");
    }
}
