//! Sentence and word helpers shared by the heuristic extractors.

use regex::Regex;
use std::collections::HashMap;
use std::sync::LazyLock;

/// Capitalized words of six or more letters, the cheapest proxy for domain terms.
static CAPITALIZED_TERM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b[A-Z][a-z]{5,}\b").expect("valid regex"));

static TOKEN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[A-Za-z][A-Za-z'\-]*").expect("valid regex"));

const STOP_WORDS: &[&str] = &[
    "a", "about", "above", "after", "again", "against", "all", "also", "although", "am", "an", "and", "any",
    "are", "around", "as", "at", "be", "because", "been", "before", "being", "below", "between", "both",
    "but", "by", "can", "could", "did", "do", "does", "doing", "down", "during", "each", "either", "else",
    "even", "every", "few", "first", "for", "from", "further", "get", "gets", "had", "has", "have", "having",
    "he", "her", "here", "hers", "him", "his", "how", "however", "i", "if", "in", "into", "is", "it", "its",
    "itself", "just", "let", "like", "many", "may", "me", "might", "more", "most", "much", "must", "my",
    "next", "no", "nor", "not", "now", "of", "off", "often", "on", "once", "one", "only", "or", "other",
    "our", "ours", "out", "over", "own", "really", "same", "she", "should", "so", "some", "such", "than",
    "that", "the", "their", "theirs", "them", "then", "there", "therefore", "these", "they", "thing",
    "things", "this", "those", "through", "thus", "to", "today", "too", "under", "until", "up", "us",
    "use", "used", "uses", "using", "very", "was", "we", "well", "were", "what", "when", "where", "whether",
    "which", "while", "who", "whom", "why", "will", "with", "within", "without", "would", "yet", "you",
    "your", "yours", "going", "gonna", "okay", "right", "know", "think", "want", "actually", "basically",
];

/// True for common function words that carry no topical meaning.
pub fn is_stop_word(word: &str) -> bool {
    let lower = word.to_lowercase();
    STOP_WORDS.contains(&lower.as_str())
}

/// Split text into trimmed sentences.
///
/// A sentence ends at `.`, `!` or `?` followed by whitespace, or at a line break.
/// Internal whitespace is collapsed to single spaces.
pub fn split_sentences(text: &str) -> Vec<String> {
    let mut sentences = Vec::new();
    let mut current = String::new();
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        if c == '\n' || c == '\r' {
            push_sentence(&mut sentences, &mut current);
            continue;
        }
        current.push(c);
        if matches!(c, '.' | '!' | '?') {
            match chars.peek() {
                Some(next) if next.is_whitespace() => push_sentence(&mut sentences, &mut current),
                None => push_sentence(&mut sentences, &mut current),
                _ => {}
            }
        }
    }
    push_sentence(&mut sentences, &mut current);

    sentences
}

fn push_sentence(sentences: &mut Vec<String>, current: &mut String) {
    let collapsed = current.split_whitespace().collect::<Vec<_>>().join(" ");
    if !collapsed.is_empty() {
        sentences.push(collapsed);
    }
    current.clear();
}

/// Number of whitespace-separated words.
pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

/// Strip leading/trailing punctuation from a word.
pub fn clean_word(word: &str) -> &str {
    word.trim_matches(|c: char| !c.is_alphanumeric())
}

/// Strip a trailing sentence terminator (and any whitespace before it).
pub fn strip_terminator(sentence: &str) -> &str {
    sentence.trim_end().trim_end_matches(['.', '!', '?', ';', ':', ',']).trim_end()
}

/// Capitalized terms ordered by frequency, ties broken by first appearance.
pub fn capitalized_terms(text: &str) -> Vec<String> {
    rank_by_frequency(
        CAPITALIZED_TERM
            .find_iter(text)
            .map(|m| m.as_str())
            .filter(|w| !is_stop_word(w))
            .map(str::to_string),
    )
}

/// Lowercased content words (longer than three letters, not stop words) ordered by frequency.
pub fn frequent_words(text: &str) -> Vec<String> {
    rank_by_frequency(
        TOKEN
            .find_iter(text)
            .map(|m| m.as_str().trim_matches(['\'', '-']).to_lowercase())
            .filter(|w| w.chars().count() > 3 && !is_stop_word(w)),
    )
}

/// Order distinct items by descending count, keeping first-seen order among equals.
pub fn rank_by_frequency(items: impl Iterator<Item = String>) -> Vec<String> {
    let mut counts: HashMap<String, (usize, usize)> = HashMap::new();
    for (position, item) in items.enumerate() {
        counts.entry(item).or_insert((0, position)).0 += 1;
    }

    let mut ranked: Vec<(String, usize, usize)> =
        counts.into_iter().map(|(item, (count, first))| (item, count, first)).collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then(a.2.cmp(&b.2)));
    ranked.into_iter().map(|(item, _, _)| item).collect()
}

/// True when `sentence` contains `word` as a whole word, ignoring case.
pub fn contains_word(sentence: &str, word: &str) -> bool {
    sentence
        .split_whitespace()
        .any(|w| clean_word(w).eq_ignore_ascii_case(word))
}

/// First `n` words of `text`, joined by single spaces.
pub fn first_words(text: &str, n: usize) -> String {
    text.split_whitespace().take(n).collect::<Vec<_>>().join(" ")
}
