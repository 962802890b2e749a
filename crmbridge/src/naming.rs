//! Identifier rules shared by the record generator and the field resolver.
//!
//! A CRM logical name that is a valid identifier becomes the generated field name verbatim.
//! Otherwise the generator capitalizes it, strips illegal characters and disambiguates what is
//! left; [`generated_field_name`] is that transformation, and resolution depends on it staying
//! stable.

use once_cell::sync::Lazy;
use regex::Regex;

/// Identifiers the generator will not emit verbatim. Sorted for binary search.
const RESERVED_WORDS: &[&str] = &[
    "Self",
    "abstract",
    "as",
    "async",
    "await",
    "become",
    "box",
    "break",
    "class",
    "const",
    "continue",
    "crate",
    "do",
    "dyn",
    "else",
    "enum",
    "event",
    "extern",
    "false",
    "final",
    "fn",
    "for",
    "gen",
    "if",
    "impl",
    "in",
    "interface",
    "let",
    "loop",
    "macro",
    "match",
    "mod",
    "move",
    "mut",
    "namespace",
    "object",
    "override",
    "priv",
    "pub",
    "ref",
    "return",
    "self",
    "static",
    "string",
    "struct",
    "super",
    "trait",
    "true",
    "try",
    "type",
    "typeof",
    "unsafe",
    "unsized",
    "use",
    "virtual",
    "where",
    "while",
    "yield",
];

static ILLEGAL_IDENTIFIER_CHARS: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^A-Za-z0-9_]").expect("identifier pattern compiles"));

pub fn is_reserved_word(name: &str) -> bool {
    RESERVED_WORDS.binary_search(&name).is_ok()
}

/// True when `name` cannot be used as a generated field name as-is.
pub fn is_invalid_field_name(name: &str) -> bool {
    name.is_empty()
        || is_reserved_word(name)
        || name.starts_with(|c: char| c.is_ascii_digit())
        || ILLEGAL_IDENTIFIER_CHARS.is_match(name)
}

/// Upper-cases the first character, leaving the rest untouched.
pub fn capitalize_first(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Removes characters that are illegal in an identifier, then fixes up a leading digit and a
/// reserved-word collision with `_`.
pub fn strip_invalid_characters(name: &str) -> String {
    let mut cleaned = ILLEGAL_IDENTIFIER_CHARS.replace_all(name, "").into_owned();
    if cleaned.is_empty() || cleaned.starts_with(|c: char| c.is_ascii_digit()) {
        cleaned.insert(0, '_');
    }
    if is_reserved_word(&cleaned) {
        cleaned.push('_');
    }
    cleaned
}

/// Name of the generated field for a CRM logical name.
pub fn generated_field_name(crm_name: &str) -> String {
    if !is_invalid_field_name(crm_name) {
        return crm_name.to_string();
    }
    strip_invalid_characters(&capitalize_first(crm_name))
}
