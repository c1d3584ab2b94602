//! Naming and quoting helpers shared by the walker and the generator.

use std::collections::HashSet;
use std::sync::LazyLock;

/// TypeScript reserved words that cannot be used as identifiers.
pub static TS_RESERVED_WORDS: LazyLock<HashSet<&'static str>> = LazyLock::new(|| {
    [
        "break",
        "case",
        "catch",
        "class",
        "const",
        "continue",
        "debugger",
        "default",
        "delete",
        "do",
        "else",
        "enum",
        "export",
        "extends",
        "false",
        "finally",
        "for",
        "function",
        "if",
        "import",
        "in",
        "instanceof",
        "new",
        "null",
        "return",
        "super",
        "switch",
        "this",
        "throw",
        "true",
        "try",
        "typeof",
        "var",
        "void",
        "while",
        "with",
        "yield",
        "let",
        "static",
        "implements",
        "interface",
        "package",
        "private",
        "protected",
        "public",
        "await",
        "async",
    ]
    .into_iter()
    .collect()
});

/// Check if a name needs quoting when used as an object key.
///
/// Returns true if the name:
/// - Is empty
/// - Doesn't start with a letter, underscore, or dollar sign
/// - Contains characters other than alphanumeric, underscore, or dollar sign
pub fn needs_quoting(name: &str) -> bool {
    name.is_empty()
        || !name
            .chars()
            .next()
            .is_some_and(|c| c.is_ascii_alphabetic() || c == '_' || c == '$')
        || !name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
}

/// Whether `name` can be used as a declared TypeScript symbol.
pub fn is_valid_identifier(name: &str) -> bool {
    !needs_quoting(name) && !TS_RESERVED_WORDS.contains(name)
}

/// Escape a string for a single-quoted JavaScript literal. Line terminators
/// are escaped so the literal stays on one line.
pub fn escape_single_quoted(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\'' => out.push_str("\\'"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\u{2028}' => out.push_str("\\u2028"),
            '\u{2029}' => out.push_str("\\u2029"),
            other => out.push(other),
        }
    }
    out
}

/// Single-quoted string literal: `'value'`.
pub fn single_quoted(s: &str) -> String {
    format!("'{}'", escape_single_quoted(s))
}

/// Quote an object key only when it is not a plain identifier.
pub fn quote_key_if_needed(name: &str) -> String {
    if needs_quoting(name) {
        single_quoted(name)
    } else {
        name.to_string()
    }
}

/// Capitalize the first letter of a string.
pub fn capitalize_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        None => String::new(),
        Some(first) => first.to_uppercase().chain(chars).collect(),
    }
}

/// Convert a DTO name to its lowercase hyphenated file stem.
///
/// A hyphen is inserted before every ASCII uppercase letter except the first
/// character: `UserProfile` -> `user-profile`.
pub fn to_kebab_case(s: &str) -> String {
    let mut result = String::with_capacity(s.len() + 4);
    for (i, c) in s.chars().enumerate() {
        if i > 0 && c.is_ascii_uppercase() {
            result.push('-');
        }
        result.push(c);
    }
    result.to_lowercase()
}

/// Trailing path segment of a `$ref`: `#/components/schemas/User` -> `User`.
pub fn ref_to_type_name(ref_path: &str) -> String {
    ref_path
        .rsplit('/')
        .next()
        .unwrap_or(ref_path)
        .to_string()
}

/// Make free text safe inside a `/** ... */` block.
pub fn sanitize_doc_comment(s: &str) -> String {
    s.trim().replace("*/", "*\\/")
}
