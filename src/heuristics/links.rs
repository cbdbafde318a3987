//! Reliable resource links that never depend on generated text.

use crate::kit::ResourceItem;
use url::Url;

/// Resource types cycled through when synthesizing suggestions.
const RESOURCE_TYPES: [&str; 5] = ["Article", "Video", "Course", "Book", "Lecture"];

const DEFAULT_TOPIC: &str = "General Studies";

/// True when `candidate` is an absolute http(s) URL with a host.
pub fn is_valid_url(candidate: &str) -> bool {
    Url::parse(candidate.trim())
        .map(|url| matches!(url.scheme(), "http" | "https") && url.host_str().is_some_and(|h| !h.is_empty()))
        .unwrap_or(false)
}

/// A search or lookup URL on an educational domain, chosen by resource type.
pub fn reliable_url(topic: &str, resource_type: &str) -> String {
    let topic = normalize_topic(topic);
    let kind = resource_type.to_lowercase();

    if kind.contains("video") {
        search_url("https://www.youtube.com/results", "search_query", &topic)
    } else if kind.contains("course") || kind.contains("mooc") {
        search_url("https://www.coursera.org/search", "query", &topic)
    } else if kind.contains("book") {
        search_url("https://openlibrary.org/search", "q", &topic)
    } else if kind.contains("lecture") {
        search_url("https://ocw.mit.edu/search/", "q", &topic)
    } else if kind.contains("talk") {
        search_url("https://www.ted.com/search", "q", &topic)
    } else {
        encyclopedia_url(&topic)
    }
}

/// `n` generic but well-formed resources for `topic`.
pub fn synthesize_resources(topic: &str, n: usize) -> Vec<ResourceItem> {
    let topic = normalize_topic(topic);

    (0..n)
        .map(|i| {
            let resource_type = RESOURCE_TYPES[i % RESOURCE_TYPES.len()];
            let round = i / RESOURCE_TYPES.len();
            let mut title = match resource_type {
                "Article" => format!("{} - Encyclopedia Overview", topic),
                "Video" => format!("{} - Video Lessons", topic),
                "Course" => format!("{} - Online Courses", topic),
                "Book" => format!("{} - Books and Readings", topic),
                _ => format!("{} - Open Courseware Lectures", topic),
            };
            if round > 0 {
                title.push_str(&format!(" ({})", round + 1));
            }

            ResourceItem {
                title,
                resource_type: resource_type.to_string(),
                description: format!("A {} about {}.", resource_type.to_lowercase(), topic),
                url: reliable_url(&topic, resource_type),
            }
        })
        .collect()
}

fn normalize_topic(topic: &str) -> String {
    let collapsed = topic.split_whitespace().collect::<Vec<_>>().join(" ");
    if collapsed.is_empty() {
        DEFAULT_TOPIC.to_string()
    } else {
        collapsed
    }
}

fn search_url(base: &str, param: &str, topic: &str) -> String {
    Url::parse_with_params(base, &[(param, topic)])
        .map(|url| url.to_string())
        .unwrap_or_else(|_| base.to_string())
}

fn encyclopedia_url(topic: &str) -> String {
    let base = "https://en.wikipedia.org/wiki/";
    match Url::parse(base) {
        Ok(mut url) => {
            if let Ok(mut segments) = url.path_segments_mut() {
                segments.clear().push("wiki").push(&topic.replace(' ', "_"));
            }
            url.to_string()
        }
        Err(_) => base.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_url() {
        assert!(is_valid_url("https://www.khanacademy.org/science"));
        assert!(is_valid_url("http://example.org"));
        assert!(!is_valid_url("ftp://example.org/file"));
        assert!(!is_valid_url("www.example.org"));
        assert!(!is_valid_url("not a url"));
    }

    #[test]
    fn test_reliable_url_by_type() {
        let video = reliable_url("cell biology", "Video");
        assert!(video.starts_with("https://www.youtube.com/results?search_query=cell"));

        let article = reliable_url("cell biology", "Article");
        assert_eq!(article, "https://en.wikipedia.org/wiki/cell_biology");

        let course = reliable_url("cell biology", "online course");
        assert!(course.starts_with("https://www.coursera.org/search?query="));
    }

    #[test]
    fn test_synthesize_exact_count() {
        for n in [0, 1, 3, 7] {
            let resources = synthesize_resources("Photosynthesis", n);
            assert_eq!(resources.len(), n);
            for resource in &resources {
                assert!(!resource.title.is_empty());
                assert!(!resource.resource_type.is_empty());
                assert!(!resource.description.is_empty());
                assert!(is_valid_url(&resource.url));
            }
        }
    }

    #[test]
    fn test_synthesize_blank_topic() {
        let resources = synthesize_resources("  ", 1);
        assert!(resources[0].title.starts_with(DEFAULT_TOPIC));
    }
}
