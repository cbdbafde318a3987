use super::{entries, extract_json, string_field};
use crate::heuristics::{is_valid_url, reliable_url};
use crate::kit::ResourceItem;
use regex::Regex;
use serde_json::{json, Value};
use std::sync::LazyLock;

/// `- Title: "...", Type: "...", Description: "...", URL: "..."` records.
static RECORD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"(?i)Title:\s*"?(.*?)"?,\s*Type:\s*"?(.*?)"?,\s*Description:\s*"?(.*?)"?,\s*URL:\s*"?(https?://[^"\s]+)"#,
    )
    .expect("valid regex")
});

static MARKDOWN_LINK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[([^\]]+)\]\((https?://[^)\s]+)\)").expect("valid regex"));

const DEFAULT_TYPE: &str = "Article";

/// Parse generated text into at most `max` resources for `topic`.
///
/// Accepts JSON (fenced, bare or embedded), `Title:/Type:/Description:/URL:` records,
/// or markdown links. Every returned entry has all four fields and a valid URL.
pub fn parse_resources(text: &str, topic: &str, max: usize) -> Vec<ResourceItem> {
    if let Some(value) = extract_json(text) {
        let resources = normalize_resources(&value, topic, max);
        if !resources.is_empty() {
            return resources;
        }
    }

    let records: Vec<Value> = RECORD
        .captures_iter(text)
        .map(|caps| {
            json!({
                "title": caps[1].trim(),
                "type": caps[2].trim(),
                "description": caps[3].trim(),
                "url": caps[4].trim(),
            })
        })
        .collect();
    if !records.is_empty() {
        return normalize_resources(&Value::Array(records), topic, max);
    }

    let links: Vec<Value> = MARKDOWN_LINK
        .captures_iter(text)
        .map(|caps| json!({ "title": caps[1].trim(), "url": caps[2].trim() }))
        .collect();
    normalize_resources(&Value::Array(links), topic, max)
}

/// Normalize a JSON payload (list, wrapped list, or single object) into resources.
pub fn normalize_resources(value: &Value, topic: &str, max: usize) -> Vec<ResourceItem> {
    entries(value, "resources", &["title", "url"])
        .into_iter()
        .filter_map(|entry| match entry {
            Value::Object(_) => Some(entry.clone()),
            Value::String(s) if is_valid_url(s) => Some(json!({ "url": s })),
            Value::String(s) if !s.trim().is_empty() => Some(json!({ "title": s })),
            _ => None,
        })
        .take(max)
        .enumerate()
        .map(|(i, entry)| normalize_entry(&entry, i, topic))
        .collect()
}

fn normalize_entry(entry: &Value, index: usize, topic: &str) -> ResourceItem {
    let title = string_field(entry, &["title", "name"]).unwrap_or_else(|| format!("Resource {}", index + 1));
    let resource_type =
        string_field(entry, &["type", "resource_type", "kind"]).unwrap_or_else(|| DEFAULT_TYPE.to_string());
    let description = string_field(entry, &["description", "summary", "desc"])
        .unwrap_or_else(|| format!("A resource about {}.", topic));
    let url = string_field(entry, &["url", "link", "href"])
        .filter(|url| is_valid_url(url))
        .unwrap_or_else(|| reliable_url(topic, &resource_type));

    ResourceItem {
        title,
        resource_type,
        description,
        url,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_resources_shapes() {
        let cases: &[(&str, &str, usize)] = &[
            (
                "fenced json",
                "```json\n[{\"title\": \"Khan\", \"type\": \"Video\", \"description\": \"Lessons\", \"url\": \"https://www.khanacademy.org\"}]\n```",
                1,
            ),
            (
                "wrapped json",
                "{\"resources\": [{\"title\": \"A\"}, {\"title\": \"B\"}]}",
                2,
            ),
            (
                "records",
                "- Title: \"Intro\", Type: \"Article\", Description: \"Basics\", URL: \"https://example.org/intro\"\n\
                 - Title: Deep Dive, Type: Course, Description: More, URL: https://example.org/deep",
                2,
            ),
            ("markdown links", "See [Plants](https://example.org/plants) for details.", 1),
            ("nothing", "I could not find anything.", 0),
        ];

        for (name, text, expected) in cases {
            let resources = parse_resources(text, "Photosynthesis", 5);
            assert_eq!(resources.len(), *expected, "case: {}", name);
            for resource in &resources {
                assert!(!resource.title.is_empty(), "case: {}", name);
                assert!(!resource.resource_type.is_empty(), "case: {}", name);
                assert!(!resource.description.is_empty(), "case: {}", name);
                assert!(is_valid_url(&resource.url), "case: {}", name);
            }
        }
    }

    #[test]
    fn test_record_fields() {
        let text = "- Title: \"Intro\", Type: \"Video\", Description: \"Basics\", URL: \"https://example.org/intro\"";
        let resources = parse_resources(text, "Cells", 3);
        assert_eq!(resources[0].title, "Intro");
        assert_eq!(resources[0].resource_type, "Video");
        assert_eq!(resources[0].description, "Basics");
        assert_eq!(resources[0].url, "https://example.org/intro");
    }

    #[test]
    fn test_invalid_url_replaced() {
        let value = json!([{"title": "Doc", "type": "Book", "url": "not a link"}]);
        let resources = normalize_resources(&value, "Cells", 3);
        assert!(resources[0].url.starts_with("https://openlibrary.org/search"));
    }

    #[test]
    fn test_defaults_filled() {
        let value = json!({"resources": [{}, {"name": "Named"}]});
        let resources = normalize_resources(&value, "Cells", 3);
        assert_eq!(resources[0].title, "Resource 1");
        assert_eq!(resources[0].resource_type, DEFAULT_TYPE);
        assert_eq!(resources[0].description, "A resource about Cells.");
        assert_eq!(resources[1].title, "Named");
    }

    #[test]
    fn test_capped_at_max() {
        let value = json!([{"title": "1"}, {"title": "2"}, {"title": "3"}, {"title": "4"}]);
        assert_eq!(normalize_resources(&value, "x", 3).len(), 3);
    }
}
