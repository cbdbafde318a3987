//! Topic extraction used as the query key for resource lookup.

use super::text::{
    clean_word, contains_word, first_words, frequent_words, is_stop_word, rank_by_frequency, split_sentences,
    strip_terminator, word_count,
};
use regex::Regex;
use std::sync::LazyLock;

/// Explicit "topic: ..." style markers.
static MARKER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:topic|subject|about|focuses on)\s*:\s*([^.\n]+)").expect("valid regex")
});

/// Repeated slide or section headings, e.g. "Slide 3: Cell Division".
static SLIDE_TITLE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?im)^\s*(?:slide|section|chapter|part|lecture|module)\s*\d+\s*[:.\-–]\s*(.+?)\s*$")
        .expect("valid regex")
});

const TOP_WORDS: usize = 15;
const SCANNED_SENTENCES: usize = 10;
const EXCERPT_WORDS: usize = 7;
const DEFAULT_TOPIC: &str = "General Studies";

/// Derive a short topic phrase from a transcript.
///
/// Rules are tried in order and the first one that yields a phrase wins:
/// explicit markers, most frequent slide title, frequency analysis over the first
/// sentences, leading content words of the first sentence, then the first five words.
pub fn extract_topic(text: &str) -> String {
    from_marker(text)
        .or_else(|| from_slide_titles(text))
        .or_else(|| from_frequency(text))
        .or_else(|| from_first_sentence(text))
        .or_else(|| {
            let words = first_words(text, 5);
            (!words.is_empty()).then_some(words)
        })
        .unwrap_or_else(|| DEFAULT_TOPIC.to_string())
}

fn from_marker(text: &str) -> Option<String> {
    MARKER
        .captures_iter(text)
        .filter_map(|caps| caps.get(1))
        .map(|m| tidy(m.as_str()))
        .find(|phrase| (3..=10).contains(&word_count(phrase)))
}

fn from_slide_titles(text: &str) -> Option<String> {
    let titles = SLIDE_TITLE
        .captures_iter(text)
        .filter_map(|caps| caps.get(1))
        .map(|m| tidy(m.as_str()))
        .filter(|title| (1..=10).contains(&word_count(title)));

    rank_by_frequency(titles).into_iter().next()
}

fn from_frequency(text: &str) -> Option<String> {
    let top: Vec<String> = frequent_words(text).into_iter().take(TOP_WORDS).collect();
    if top.is_empty() {
        return None;
    }

    split_sentences(text)
        .into_iter()
        .take(SCANNED_SENTENCES)
        .find(|sentence| top.iter().any(|word| contains_word(sentence, word)))
        .map(|sentence| tidy(&first_words(&sentence, EXCERPT_WORDS)))
        .filter(|excerpt| !excerpt.is_empty())
}

fn from_first_sentence(text: &str) -> Option<String> {
    let first = split_sentences(text).into_iter().next()?;
    let content: Vec<&str> = first
        .split_whitespace()
        .map(clean_word)
        .filter(|w| !w.is_empty() && !is_stop_word(w))
        .take(5)
        .collect();

    (content.len() >= 3).then(|| content.join(" "))
}

fn tidy(phrase: &str) -> String {
    strip_terminator(phrase.trim())
        .trim_matches(|c: char| c == '"' || c == '\'' || c == '*')
        .trim()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_marker_phrase() {
        let text = "Welcome everyone. Today's topic: the structure of plant cells. Let's begin.";
        assert_eq!(extract_topic(text), "the structure of plant cells");
    }

    #[test]
    fn test_marker_too_short_is_skipped() {
        let text = "Topic: cells. Slide 1: Mitosis Overview\nSlide 2: Mitosis Overview\nSlide 3: Meiosis";
        assert_eq!(extract_topic(text), "Mitosis Overview");
    }

    #[test]
    fn test_frequency_excerpt() {
        let text = "Photosynthesis is the process plants use to convert light into energy. \
                    Chlorophyll absorbs light. Glucose is produced.";
        let topic = extract_topic(text);
        assert_eq!(topic, "Photosynthesis is the process plants use to");
        assert!(word_count(&topic) <= 7);
    }

    #[test]
    fn test_short_text_falls_back_to_first_words() {
        assert_eq!(extract_topic("so it is on"), "so it is on");
    }

    #[test]
    fn test_empty_text_uses_default() {
        assert_eq!(extract_topic("   "), DEFAULT_TOPIC);
    }

    #[test]
    fn test_extraction_is_deterministic() {
        let text = "Entropy measures disorder. Energy flows. Systems tend toward entropy and energy balance.";
        let first = extract_topic(text);
        for _ in 0..10 {
            assert_eq!(extract_topic(text), first);
        }
    }
}
