//! XML name validation and identifier normalization
//!
//! This module validates XML names and turns schema element names into the
//! display names and Rust identifiers used by compiled descriptors and the
//! declaration emitter.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

static NCNAME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Z_a-z\u{C0}-\u{D6}\u{D8}-\u{F6}\u{F8}-\u{2FF}\u{370}-\u{37D}][A-Z_a-z\u{C0}-\u{D6}\u{D8}-\u{F6}\u{F8}-\u{2FF}\u{370}-\u{37D}\-\.0-9\u{B7}]*$")
        .expect("NCName pattern is valid")
});

/// Rust keywords that must be written as raw identifiers
const RUST_KEYWORDS: &[&str] = &[
    "as", "async", "await", "box", "break", "const", "continue", "do", "dyn", "else", "enum",
    "extern", "false", "final", "fn", "for", "if", "impl", "in", "let", "loop", "macro", "match",
    "mod", "move", "mut", "override", "priv", "pub", "ref", "return", "static", "struct", "trait",
    "true", "try", "type", "typeof", "unsafe", "unsized", "use", "virtual", "where", "while",
    "yield",
];

/// Keywords that cannot be raw identifiers at all
const RESERVED_PATH_KEYWORDS: &[&str] = &["crate", "self", "super", "Self"];

/// Check if a string is a valid NCName (non-colonized name)
pub fn is_valid_ncname(name: &str) -> bool {
    NCNAME.is_match(name)
}

/// Check if a string is a valid QName (qualified name)
pub fn is_valid_qname(name: &str) -> bool {
    match name.split_once(':') {
        Some((prefix, local)) => is_valid_ncname(prefix) && is_valid_ncname(local),
        None => is_valid_ncname(name),
    }
}

/// Split a QName into prefix and local name
pub fn split_qname(qname: &str) -> (Option<&str>, &str) {
    if let Some((prefix, local)) = qname.split_once(':') {
        (Some(prefix), local)
    } else {
        (None, qname)
    }
}

/// Local part of a possibly prefixed name
pub fn local_name(qname: &str) -> &str {
    split_qname(qname).1
}

/// One suffix correction applied to display names
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AcronymRule {
    /// Suffix as produced by capitalization, e.g. `Url`
    pub suffix: String,
    /// Replacement suffix, e.g. `URL`
    pub replacement: String,
}

impl AcronymRule {
    /// Create a new rule
    pub fn new(suffix: impl Into<String>, replacement: impl Into<String>) -> Self {
        Self {
            suffix: suffix.into(),
            replacement: replacement.into(),
        }
    }
}

/// Ordered table of acronym suffix corrections
///
/// The first rule whose suffix matches wins. The table is configuration: an
/// empty table leaves capitalized names untouched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AcronymTable {
    rules: Vec<AcronymRule>,
}

impl Default for AcronymTable {
    fn default() -> Self {
        Self {
            rules: vec![AcronymRule::new("Url", "URL"), AcronymRule::new("Id", "ID")],
        }
    }
}

impl AcronymTable {
    /// Create an empty table
    pub fn empty() -> Self {
        Self { rules: Vec::new() }
    }

    /// Append a rule
    pub fn with_rule(mut self, suffix: impl Into<String>, replacement: impl Into<String>) -> Self {
        self.rules.push(AcronymRule::new(suffix, replacement));
        self
    }

    /// Get the rules in application order
    pub fn rules(&self) -> &[AcronymRule] {
        &self.rules
    }

    /// Apply the first matching suffix correction
    pub fn apply(&self, name: &str) -> String {
        for rule in &self.rules {
            if rule.suffix.is_empty() {
                continue;
            }
            if let Some(stem) = name.strip_suffix(rule.suffix.as_str()) {
                return format!("{}{}", stem, rule.replacement);
            }
        }
        name.to_string()
    }
}

/// Upper-case the first character of a name
pub fn capitalize(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Public display name for a schema element name
pub fn display_name(name: &str, acronyms: &AcronymTable) -> String {
    acronyms.apply(&capitalize(name))
}

/// Convert a display or wire name to snake_case
///
/// Runs of capitals count as one word, so `GroupID` becomes `group_id` and
/// `URLPattern` becomes `url_pattern`.
pub fn to_snake_case(name: &str) -> String {
    let chars: Vec<char> = name.chars().collect();
    let mut result = String::with_capacity(name.len() + 4);

    for (i, &c) in chars.iter().enumerate() {
        if !c.is_alphanumeric() {
            if !result.is_empty() && !result.ends_with('_') {
                result.push('_');
            }
            continue;
        }
        if c.is_uppercase() && i > 0 {
            let prev = chars[i - 1];
            let next_is_lower = chars.get(i + 1).map_or(false, |n| n.is_lowercase());
            let boundary = prev.is_lowercase()
                || prev.is_ascii_digit()
                || (prev.is_uppercase() && next_is_lower);
            if boundary && !result.is_empty() && !result.ends_with('_') {
                result.push('_');
            }
        }
        result.extend(c.to_lowercase());
    }

    while result.ends_with('_') {
        result.pop();
    }
    result
}

/// Turn a name into a usable Rust field identifier
pub fn rust_field_ident(name: &str) -> String {
    let mut ident = to_snake_case(name);
    if ident.is_empty() {
        ident.push_str("field");
    }
    if ident.starts_with(|c: char| c.is_ascii_digit()) {
        ident.insert(0, '_');
    }
    if RESERVED_PATH_KEYWORDS.contains(&ident.as_str()) {
        ident.push('_');
    } else if RUST_KEYWORDS.contains(&ident.as_str()) {
        ident.insert_str(0, "r#");
    }
    ident
}

/// Turn a type name into a Rust type identifier
///
/// `project` becomes `Project` and `build-base` becomes `BuildBase`.
pub fn rust_type_ident(name: &str) -> String {
    let mut ident = String::with_capacity(name.len());
    let mut upper = true;
    for c in name.chars() {
        if !c.is_alphanumeric() {
            upper = true;
            continue;
        }
        if upper {
            ident.extend(c.to_uppercase());
            upper = false;
        } else {
            ident.push(c);
        }
    }
    if ident.is_empty() || ident.starts_with(|c: char| c.is_ascii_digit()) {
        ident.insert(0, '_');
    }
    if ident == "Self" {
        ident.push('_');
    }
    ident
}
