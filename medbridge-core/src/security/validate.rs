//! Markup rejection for untrusted input.

use std::sync::OnceLock;

use regex::Regex;
use serde_json::Value;

fn tag_pattern() -> &'static Regex {
    static TAG: OnceLock<Regex> = OnceLock::new();
    TAG.get_or_init(|| Regex::new(r"<[^>]*>").expect("static tag pattern"))
}

/// `false` if `text` contains anything shaped like an HTML tag.
pub fn validate_text(text: &str) -> bool {
    !tag_pattern().is_match(text)
}

/// Strings are checked with [`validate_text`]; every other value passes.
pub fn validate_data(value: &Value) -> bool {
    match value {
        Value::String(text) => validate_text(text),
        _ => true,
    }
}
