//! Identifier and literal helpers for the Rust renderer.

use std::collections::HashSet;
use std::sync::LazyLock;

use heck::ToSnakeCase;

/// Rust keywords that need a raw identifier (`r#type`) as field names.
pub static RUST_KEYWORDS: LazyLock<HashSet<&'static str>> = LazyLock::new(|| {
    [
        "as", "async", "await", "break", "const", "continue", "dyn", "else", "enum", "extern",
        "false", "fn", "for", "gen", "if", "impl", "in", "let", "loop", "match", "mod", "move",
        "mut", "pub", "ref", "return", "static", "struct", "trait", "true", "try", "type",
        "unsafe", "use", "where", "while", "abstract", "become", "box", "do", "final", "macro",
        "override", "priv", "typeof", "unsized", "virtual", "yield",
    ]
    .into_iter()
    .collect()
});

/// Keywords that cannot be raw identifiers.
const NON_RAW_KEYWORDS: [&str; 5] = ["self", "Self", "super", "crate", "_"];

/// Rust field identifier for a GraphQL response key.
pub fn field_ident(wire_name: &str) -> String {
    let snake = wire_name.to_snake_case();
    if snake.is_empty() || snake.starts_with(|c: char| c.is_ascii_digit()) {
        return format!("field_{snake}");
    }
    if NON_RAW_KEYWORDS.contains(&snake.as_str()) {
        return format!("{snake}_");
    }
    if RUST_KEYWORDS.contains(snake.as_str()) {
        return format!("r#{snake}");
    }
    snake
}

/// Identifier without a raw prefix, for comparing against a wire name.
pub fn unraw(ident: &str) -> &str {
    ident.strip_prefix("r#").unwrap_or(ident)
}

/// Make `ident` unique among `taken` by appending a counter.
pub fn dedupe_ident(ident: String, taken: &mut HashSet<String>) -> String {
    if taken.insert(ident.clone()) {
        return ident;
    }
    let base = unraw(&ident).to_string();
    let mut counter = 2;
    loop {
        let candidate = format!("{base}_{counter}");
        if taken.insert(candidate.clone()) {
            return candidate;
        }
        counter += 1;
    }
}

/// Raw string literal holding `s` verbatim, with as many `#` as needed.
pub fn raw_string_literal(s: &str) -> String {
    let mut hashes = 1;
    while s.contains(&format!("\"{}", "#".repeat(hashes))) {
        hashes += 1;
    }
    let fence = "#".repeat(hashes);
    format!("r{fence}\"{s}\"{fence}")
}

/// Escape for a normal string literal.
pub fn escape_rust_string(s: &str) -> String {
    s.replace('\\', "\\\\").replace('"', "\\\"")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn camel_case_becomes_snake_case() {
        assert_eq!(field_ident("friendsConnection"), "friends_connection");
        assert_eq!(field_ident("name"), "name");
        assert_eq!(field_ident("__typename"), "typename");
    }

    #[test]
    fn keywords_are_escaped() {
        assert_eq!(field_ident("type"), "r#type");
        assert_eq!(field_ident("match"), "r#match");
        assert_eq!(field_ident("self"), "self_");
        assert_eq!(field_ident("Self"), "self_");
    }

    #[test]
    fn digits_and_empty_names_get_a_prefix() {
        assert_eq!(field_ident("3d"), "field_3d");
        assert_eq!(field_ident("_"), "field_");
    }

    #[test]
    fn dedupe_appends_counter() {
        let mut taken = HashSet::new();
        assert_eq!(dedupe_ident("foo_bar".into(), &mut taken), "foo_bar");
        assert_eq!(dedupe_ident("foo_bar".into(), &mut taken), "foo_bar_2");
        assert_eq!(dedupe_ident("foo_bar".into(), &mut taken), "foo_bar_3");
        assert_eq!(dedupe_ident("r#type".into(), &mut taken), "r#type");
        assert_eq!(dedupe_ident("r#type".into(), &mut taken), "type_2");
    }

    #[test]
    fn raw_literal_outgrows_embedded_fences() {
        assert_eq!(raw_string_literal("{ a }"), "r#\"{ a }\"#");
        assert_eq!(raw_string_literal("say \"#hi\""), "r##\"say \"#hi\"\"##");
    }

    #[test]
    fn escapes_quotes_and_backslashes() {
        assert_eq!(escape_rust_string(r#"a"b\c"#), r#"a\"b\\c"#);
    }
}
