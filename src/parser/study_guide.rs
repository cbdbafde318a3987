use super::{entries, section_block, split_items, string_field};
use crate::kit::{Flashcard, KeyTerm, StudyGuide};
use regex::Regex;
use serde_json::Value;
use std::sync::LazyLock;

static TERMS_HEADER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:key\s+terms?|terms?|definitions?)(?:\s+and\s+definitions?)?\s*[*_]*\s*(?::|\n)")
        .expect("valid regex")
});

static CONCEPTS_HEADER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:important\s+|key\s+|main\s+)?concepts?\s*[*_]*\s*(?::|\n)").expect("valid regex")
});

static FLASHCARDS_HEADER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:flash\s*cards?|questions\s+and\s+answers)\s*[*_]*\s*(?::|\n)").expect("valid regex")
});

static QUESTION_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^(?:q|question|front)\s*\d*\s*[:.)]\s*").expect("valid regex"));

static ANSWER_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^(?:a|answer|back)\s*[:.)]\s*").expect("valid regex"));

const MAX_TERM_WORDS: usize = 8;

/// Parse a free-text study guide.
///
/// Looks for key term, concept and flashcard sections by their headers. Sections that
/// cannot be parsed come back empty; the caller decides whether to fill them.
pub fn parse_study_guide(text: &str) -> StudyGuide {
    let terms = &*TERMS_HEADER;
    let concepts = &*CONCEPTS_HEADER;
    let flashcards = &*FLASHCARDS_HEADER;

    StudyGuide {
        key_terms: section_block(text, terms, &[concepts, flashcards])
            .map(parse_key_terms)
            .unwrap_or_default(),
        important_concepts: section_block(text, concepts, &[terms, flashcards])
            .map(parse_concepts)
            .unwrap_or_default(),
        flashcards: section_block(text, flashcards, &[terms, concepts])
            .map(parse_flashcards)
            .unwrap_or_default(),
    }
}

fn parse_key_terms(block: &str) -> Vec<KeyTerm> {
    split_items(block)
        .iter()
        .filter_map(|item| {
            let (term, definition) = split_term(item)?;
            let term = term.trim_matches(|c: char| c == '*' || c == '"' || c.is_whitespace());
            let definition = definition.trim();
            let plausible = !term.is_empty()
                && !definition.is_empty()
                && term.split_whitespace().count() <= MAX_TERM_WORDS;
            plausible.then(|| KeyTerm::new(term, definition))
        })
        .collect()
}

fn split_term(item: &str) -> Option<(&str, &str)> {
    if let Some(pos) = item.find(':') {
        return Some((&item[..pos], &item[pos + 1..]));
    }
    [" - ", " – ", " — "]
        .iter()
        .find_map(|sep| item.find(sep).map(|pos| (&item[..pos], &item[pos + sep.len()..])))
}

fn parse_concepts(block: &str) -> Vec<String> {
    split_items(block)
}

/// Pair questions (items containing `?`) with the lines that follow them.
fn parse_flashcards(block: &str) -> Vec<Flashcard> {
    let mut cards = Vec::new();
    let mut current: Option<(String, String)> = None;

    for item in split_items(block) {
        let item = QUESTION_PREFIX.replace(&item, "").to_string();

        if let Some(pos) = item.find('?') {
            cards.extend(current.take());
            let question = item[..=pos].trim().to_string();
            let rest = ANSWER_PREFIX.replace(item[pos + 1..].trim(), "").trim().to_string();
            current = Some((question, rest));
        } else if let Some((_, answer)) = current.as_mut() {
            let line = ANSWER_PREFIX.replace(&item, "");
            if !answer.is_empty() {
                answer.push(' ');
            }
            answer.push_str(line.trim());
        }
    }
    cards.extend(current);

    cards
        .into_iter()
        .filter(|(question, answer)| question.len() > 1 && !answer.is_empty())
        .map(|(question, answer)| Flashcard::new(question, answer))
        .collect()
}

/// Normalize a structured study guide payload (the object under `study_guide`).
pub fn normalize_study_guide(value: &Value) -> StudyGuide {
    let key_terms = match value.get("key_terms") {
        Some(Value::Object(map)) => map
            .iter()
            .filter_map(|(term, definition)| {
                let definition = definition.as_str()?.trim();
                (!term.trim().is_empty() && !definition.is_empty()).then(|| KeyTerm::new(term.trim(), definition))
            })
            .collect(),
        Some(list) => entries(list, "key_terms", &["term"])
            .into_iter()
            .filter_map(|entry| match entry {
                Value::String(s) => parse_key_terms(s).into_iter().next(),
                other => Some(KeyTerm::new(
                    string_field(other, &["term", "name", "word"])?,
                    string_field(other, &["definition", "meaning", "description"])?,
                )),
            })
            .collect(),
        None => Vec::new(),
    };

    let important_concepts = value
        .get("important_concepts")
        .or_else(|| value.get("concepts"))
        .map(|list| {
            entries(list, "important_concepts", &["concept"])
                .into_iter()
                .filter_map(|entry| match entry {
                    Value::String(s) => Some(s.trim().to_string()).filter(|s| !s.is_empty()),
                    other => string_field(other, &["concept", "description", "explanation", "text"]),
                })
                .collect()
        })
        .unwrap_or_default();

    let flashcards = value
        .get("flashcards")
        .map(|list| {
            entries(list, "flashcards", &["question"])
                .into_iter()
                .filter_map(|entry| {
                    Some(Flashcard::new(
                        string_field(entry, &["question", "front", "q"])?,
                        string_field(entry, &["answer", "back", "a"])?,
                    ))
                })
                .collect()
        })
        .unwrap_or_default();

    StudyGuide {
        key_terms,
        important_concepts,
        flashcards,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const WELL_FORMED: &str = "Key Terms:\n\
        - Photosynthesis: the process plants use to convert light into energy\n\
        - Chlorophyll: the pigment that absorbs light\n\
        Important Concepts:\n\
        - Light energy is stored as chemical energy\n\
        - Oxygen is released as a by-product\n\
        Flashcards:\n\
        Q: What absorbs light in plants?\n\
        A: Chlorophyll\n\
        Q: What gas is released? A: Oxygen\n";

    #[test]
    fn test_well_formed_sections() {
        let guide = parse_study_guide(WELL_FORMED);

        assert_eq!(guide.key_terms.len(), 2);
        assert_eq!(guide.key_terms[0].term, "Photosynthesis");
        assert_eq!(guide.key_terms[1].definition, "the pigment that absorbs light");

        assert_eq!(guide.important_concepts.len(), 2);
        assert_eq!(guide.important_concepts[1], "Oxygen is released as a by-product");

        assert_eq!(guide.flashcards.len(), 2);
        assert_eq!(guide.flashcards[0].question, "What absorbs light in plants?");
        assert_eq!(guide.flashcards[0].answer, "Chlorophyll");
        assert_eq!(guide.flashcards[1].answer, "Oxygen");
    }

    #[test]
    fn test_section_variants() {
        let cases: &[(&str, &str, usize, usize, usize)] = &[
            (
                "markdown headers",
                "**Key Terms**\n1. Osmosis - movement of water\n**Concepts**\n1. Diffusion is passive\n",
                1,
                1,
                0,
            ),
            (
                "inline bullets",
                "Definitions: Cell: basic unit • Tissue: group of cells\nFlashcards:\nWhat is a cell? The basic unit of life\n",
                2,
                0,
                1,
            ),
            (
                "malformed flashcards",
                "Flashcards:\nPhotosynthesis -> light to energy\nChlorophyll => pigment\n",
                0,
                0,
                0,
            ),
            ("no sections", "Plants are green and need sunlight.", 0, 0, 0),
        ];

        for (name, text, terms, concepts, cards) in cases {
            let guide = parse_study_guide(text);
            assert_eq!(guide.key_terms.len(), *terms, "terms, case: {}", name);
            assert_eq!(guide.important_concepts.len(), *concepts, "concepts, case: {}", name);
            assert_eq!(guide.flashcards.len(), *cards, "flashcards, case: {}", name);
        }
    }

    #[test]
    fn test_normalize_structured_guide() {
        let value = json!({
            "key_terms": [{"term": "Cell", "definition": "Basic unit"}, {"term": "Orphan"}],
            "important_concepts": ["Cells divide", {"concept": "Cells grow"}],
            "flashcards": [{"question": "What divides?", "answer": "Cells"}],
        });
        let guide = normalize_study_guide(&value);
        assert_eq!(guide.key_terms.len(), 1);
        assert_eq!(guide.important_concepts, vec!["Cells divide", "Cells grow"]);
        assert_eq!(guide.flashcards[0].answer, "Cells");
    }

    #[test]
    fn test_normalize_term_map() {
        let value = json!({"key_terms": {"Cell": "Basic unit", "Tissue": "Group of cells"}});
        let guide = normalize_study_guide(&value);
        assert_eq!(guide.key_terms.len(), 2);
        assert!(guide.important_concepts.is_empty());
    }
}
