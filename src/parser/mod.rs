//! Response parsing: coerce free-form generations into the artifact schemas.
//!
//! One pure function per artifact kind. Parsers never fail; they return whatever
//! entries they could recover (possibly none) and leave the decision to substitute
//! heuristic content to the caller.

mod notes;
mod quiz;
mod resources;
mod study_guide;

pub use notes::{normalize_notes, parse_notes};
pub use quiz::{normalize_quiz, parse_quiz};
pub use resources::{normalize_resources, parse_resources};
pub use study_guide::{normalize_study_guide, parse_study_guide};

use regex::Regex;
use serde_json::Value;
use std::sync::LazyLock;

static FENCED_BLOCK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)```(?:json|JSON)?\s*(.*?)\s*```").expect("valid regex"));

/// Bullet or numbering prefix at the start of an item.
static ITEM_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*(?:[-*•·]+|\d+\s*[.)]|#+)\s*").expect("valid regex"));

/// Inline bullet or numbering marker inside a single line.
static INLINE_BULLET: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+(?:•|·|\d+[.)])\s+").expect("valid regex"));

/// Clean up a free-text summary. `None` when nothing usable remains.
pub fn parse_summary(text: &str) -> Option<String> {
    let trimmed = text.trim();
    if trimmed.is_empty() || trimmed.chars().all(|c| !c.is_alphanumeric()) {
        return None;
    }
    Some(trimmed.to_string())
}

/// Find a JSON document in generated text.
///
/// Tries a fenced code block, then the whole text, then the widest `[...]` or `{...}` slice.
pub fn extract_json(text: &str) -> Option<Value> {
    if let Some(caps) = FENCED_BLOCK.captures(text) {
        if let Ok(value) = serde_json::from_str::<Value>(&caps[1]) {
            return Some(value);
        }
    }

    let trimmed = text.trim();
    if let Ok(value) = serde_json::from_str::<Value>(trimmed) {
        return Some(value);
    }

    [('[', ']'), ('{', '}')].into_iter().find_map(|(open, close)| {
        let start = trimmed.find(open)?;
        let end = trimmed.rfind(close)?;
        (end > start)
            .then(|| serde_json::from_str::<Value>(&trimmed[start..=end]).ok())
            .flatten()
    })
}

/// The text between the first match of `header` and the next match of any of `others`.
pub(crate) fn section_block<'a>(text: &'a str, header: &Regex, others: &[&Regex]) -> Option<&'a str> {
    let start = header.find(text)?.end();
    let rest = &text[start..];
    let end = others
        .iter()
        .filter_map(|re| re.find(rest).map(|m| m.start()))
        .min()
        .unwrap_or(rest.len());

    let block = rest[..end].trim();
    (!block.is_empty()).then_some(block)
}

/// Split a block into items: one per line, with inline bullets split further.
pub(crate) fn split_items(block: &str) -> Vec<String> {
    block
        .lines()
        .flat_map(|line| INLINE_BULLET.split(line).map(str::to_string).collect::<Vec<_>>())
        .map(|item| strip_item_prefix(&item))
        .filter(|item| !item.is_empty())
        .collect()
}

/// Remove a bullet/numbering prefix and markdown emphasis from an item.
pub(crate) fn strip_item_prefix(item: &str) -> String {
    let without_prefix = ITEM_PREFIX.replace(item, "");
    without_prefix.replace("**", "").replace("__", "").trim().to_string()
}

/// First string value among `keys` in a JSON object.
pub(crate) fn string_field(value: &Value, keys: &[&str]) -> Option<String> {
    keys.iter()
        .filter_map(|key| value.get(*key))
        .find_map(|v| match v {
            Value::String(s) => Some(s.trim().to_string()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        })
        .filter(|s| !s.is_empty())
}

/// The list an object most likely holds: `value[key]`, the value itself, or its first array field.
pub(crate) fn entries<'a>(value: &'a Value, key: &str, singular_keys: &[&str]) -> Vec<&'a Value> {
    match value {
        Value::Array(items) => items.iter().collect(),
        Value::Object(map) => {
            if let Some(inner) = map.get(key) {
                return match inner {
                    Value::Array(items) => items.iter().collect(),
                    other => entries(other, key, singular_keys),
                };
            }
            if singular_keys.iter().any(|k| map.contains_key(*k)) {
                return vec![value];
            }
            map.values()
                .find_map(|v| v.as_array())
                .map(|items| items.iter().collect())
                .unwrap_or_default()
        }
        _ => Vec::new(),
    }
}
