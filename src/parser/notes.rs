use super::{entries, string_field, strip_item_prefix};
use crate::heuristics::text::split_sentences;
use crate::kit::NoteSection;
use regex::Regex;
use serde_json::Value;
use std::sync::LazyLock;

/// Section heading: markdown heading, `Section N: Title`, or a bold line on its own.
static HEADING: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?im)^\s*(?:#{1,6}\s+(.+?)|(?:section|topic)\s*\d*\s*[:.\-]\s*(.+?)|\*\*([^*]+)\*\*)\s*:?\s*$")
        .expect("valid regex")
});

/// Labelled field inside a section, e.g. `Definition: ...` or `Key Points:`.
static FIELD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^\s*(?:[-*]\s*)?(?:\*\*)?(definition|key\s+points?|main\s+points?|examples?|diagrams?|figures?|visuals?|content|details|explanation)(?:\*\*)?\s*:\s*(.*)$",
    )
    .expect("valid regex")
});

#[derive(Clone, Copy, PartialEq)]
enum Field {
    Definition,
    KeyPoints,
    Examples,
    Diagrams,
    Content,
}

impl Field {
    fn from_label(label: &str) -> Self {
        let label = label.to_lowercase();
        if label.starts_with("definition") {
            Field::Definition
        } else if label.contains("point") {
            Field::KeyPoints
        } else if label.starts_with("example") {
            Field::Examples
        } else if label.starts_with("diagram") || label.starts_with("figure") || label.starts_with("visual") {
            Field::Diagrams
        } else {
            Field::Content
        }
    }
}

/// Parse sectioned free-text notes, keeping at most `max_sections`.
///
/// Sections start at headings. Inside a section, labelled fields route the lines that
/// follow them; unlabelled bullets become key points and prose becomes content.
pub fn parse_notes(text: &str, max_sections: usize) -> Vec<NoteSection> {
    let headings: Vec<(String, usize, usize)> = HEADING
        .captures_iter(text)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            let title = (1..=3).find_map(|i| caps.get(i))?.as_str();
            let title = title.replace("**", "").trim().trim_end_matches(':').trim().to_string();
            Some((title, whole.start(), whole.end()))
        })
        .filter(|(title, _, _)| !title.is_empty() && !FIELD.is_match(&format!("{}:", title)))
        .collect();

    headings
        .iter()
        .enumerate()
        .map(|(i, (title, _, body_start))| {
            let body_end = headings.get(i + 1).map(|(_, start, _)| *start).unwrap_or(text.len());
            parse_section(title, &text[*body_start..body_end])
        })
        .take(max_sections)
        .collect()
}

fn parse_section(title: &str, body: &str) -> NoteSection {
    let mut section = NoteSection::titled(title);
    let mut field: Option<Field> = None;
    let mut content: Vec<String> = Vec::new();

    for line in body.lines().map(str::trim).filter(|line| !line.is_empty()) {
        if let Some(caps) = FIELD.captures(line) {
            let current = Field::from_label(&caps[1]);
            field = Some(current);
            let inline = strip_item_prefix(&caps[2]);
            if !inline.is_empty() {
                push_field(&mut section, &mut content, current, inline);
            }
            continue;
        }

        let is_bullet = line.starts_with(['-', '*', '•']) || line.chars().next().is_some_and(|c| c.is_ascii_digit());
        let item = strip_item_prefix(line);
        if item.is_empty() {
            continue;
        }

        let target = match field {
            Some(Field::Definition) if !section.definition.is_empty() => {
                if is_bullet {
                    Field::KeyPoints
                } else {
                    Field::Content
                }
            }
            Some(current) => current,
            None if is_bullet => Field::KeyPoints,
            None => Field::Content,
        };
        push_field(&mut section, &mut content, target, item);
    }

    section.content = content.join(" ");
    if section.definition.is_empty() {
        if let Some(first) = split_sentences(&section.content).into_iter().next() {
            section.definition = first;
        }
    }
    section
}

fn push_field(section: &mut NoteSection, content: &mut Vec<String>, field: Field, item: String) {
    match field {
        Field::Definition if section.definition.is_empty() => section.definition = item,
        Field::Definition | Field::Content => content.push(item),
        Field::KeyPoints => section.key_points.push(item),
        Field::Examples => section.examples.push(item),
        Field::Diagrams => section.diagram_references.push(item),
    }
}

/// Normalize a structured notes payload (the value under `notes`), keeping at most `max_sections`.
pub fn normalize_notes(value: &Value, max_sections: usize) -> Vec<NoteSection> {
    entries(value, "notes", &["topic", "title"])
        .into_iter()
        .filter_map(|entry| {
            let mut section = NoteSection::titled(string_field(entry, &["topic", "title", "name"])?);
            section.definition = string_field(entry, &["definition"]).unwrap_or_default();
            section.key_points = string_list(entry, &["key_points", "points"]);
            section.content = string_field(entry, &["content", "details"]).unwrap_or_default();
            section.examples = string_list(entry, &["examples"]);
            section.diagram_references = string_list(entry, &["diagram_references", "diagrams"]);
            Some(section)
        })
        .take(max_sections)
        .collect()
}

fn string_list(entry: &Value, keys: &[&str]) -> Vec<String> {
    match keys.iter().find_map(|key| entry.get(*key)) {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(Value::as_str)
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect(),
        Some(Value::String(s)) if !s.trim().is_empty() => vec![s.trim().to_string()],
        _ => Vec::new(),
    }
}
