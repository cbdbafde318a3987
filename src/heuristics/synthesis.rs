//! Deterministic study artifacts synthesized straight from the transcript.
//!
//! Every function here returns a schema-valid value for any input. When an
//! extraction step finds nothing, a context-free placeholder takes its place.

use super::text::{
    capitalized_terms, clean_word, contains_word, frequent_words, is_stop_word, rank_by_frequency,
    split_sentences, strip_terminator, word_count,
};
use crate::kit::{Flashcard, KeyTerm, NoteSection, OptionLabel, QuizOptions, QuizQuestion, StudyGuide};
use rand::Rng;
use regex::Regex;
use std::collections::BTreeMap;
use std::sync::LazyLock;

static CAPITALIZED_BIGRAM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b([A-Z][a-z]+)\s+([A-Z][a-z]+)\b").expect("valid regex"));

const GENERIC_DEFINITION: &str = "A concept related to the main topic.";
const GENERIC_EXPLANATION: &str = "Review the material for details.";
const FALLBACK_DISTRACTORS: [&str; 4] = ["alternative", "option", "choice", "none of these"];
const EXAMPLE_MARKERS: [&str; 6] = ["for example", "for instance", "e.g.", "such as", "example", "instance of"];
const DIAGRAM_MARKERS: [&str; 8] = ["diagram", "figure", "chart", "graph", "illustrat", "image", "table", "visual"];
const MIN_CONCEPT_WORDS: usize = 6;
const MIN_KEY_POINT_WORDS: usize = 5;

/// Markdown bullet summary made of the leading sentences.
pub fn synthesize_summary(text: &str, max_bullets: usize) -> String {
    let sentences: Vec<String> = split_sentences(text).into_iter().take(max_bullets.max(1)).collect();

    let mut summary = String::from("## Key Concepts\n\n");
    if sentences.is_empty() {
        summary.push_str("- No content was available to summarize.\n");
    } else {
        for sentence in sentences {
            summary.push_str(&format!("- {}\n", sentence));
        }
    }
    summary
}

/// Key terms, concepts and flashcards, each capped at `max_items` and never empty.
pub fn synthesize_study_guide(text: &str, max_items: usize) -> StudyGuide {
    let max_items = max_items.max(1);
    let sentences = split_sentences(text);

    let key_terms = synthesize_key_terms(text, &sentences, max_items);
    let important_concepts = synthesize_concepts(&sentences, max_items);
    let flashcards = synthesize_flashcards(&sentences, &key_terms, max_items);

    StudyGuide {
        key_terms,
        important_concepts,
        flashcards,
    }
}

/// Key terms from capitalized-word frequency, defined by the first sentence using them.
pub fn synthesize_key_terms(text: &str, sentences: &[String], max_items: usize) -> Vec<KeyTerm> {
    let mut terms = capitalized_terms(text);
    if terms.is_empty() {
        terms = frequent_words(text).into_iter().map(|w| title_case(&w)).collect();
    }
    if terms.is_empty() {
        terms.push("Main Topic".to_string());
    }

    terms
        .into_iter()
        .take(max_items)
        .map(|term| {
            let definition = sentences
                .iter()
                .find(|s| contains_word(s, &term))
                .cloned()
                .unwrap_or_else(|| GENERIC_DEFINITION.to_string());
            KeyTerm::new(term, definition)
        })
        .collect()
}

/// Longer sentences read as standalone concepts.
pub fn synthesize_concepts(sentences: &[String], max_items: usize) -> Vec<String> {
    let mut concepts: Vec<String> = sentences
        .iter()
        .filter(|s| word_count(s) >= MIN_CONCEPT_WORDS)
        .take(max_items)
        .cloned()
        .collect();

    if concepts.is_empty() {
        concepts = sentences.iter().take(max_items).cloned().collect();
    }
    if concepts.is_empty() {
        concepts.push("Review the main ideas of the material.".to_string());
    }
    concepts
}

/// Flashcards from adjacent sentence pairs, falling back to term cards.
pub fn synthesize_flashcards(sentences: &[String], key_terms: &[KeyTerm], max_items: usize) -> Vec<Flashcard> {
    let mut cards: Vec<Flashcard> = sentences
        .chunks_exact(2)
        .take(max_items)
        .map(|pair| {
            Flashcard::new(
                format!("What is described in this sentence: \"{}\"?", strip_terminator(&pair[0])),
                pair[1].clone(),
            )
        })
        .collect();

    if cards.is_empty() {
        cards = key_terms
            .iter()
            .take(max_items)
            .map(|kt| Flashcard::new(format!("What is {}?", kt.term), kt.definition.clone()))
            .collect();
    }
    if cards.is_empty() {
        cards.push(Flashcard::new(
            "What is the main idea of this material?",
            "See the text for details.",
        ));
    }
    cards
}

/// Fill-in-the-blank questions using a thread-local random source.
pub fn synthesize_quiz(text: &str, n: usize) -> Vec<QuizQuestion> {
    synthesize_quiz_with_rng(text, n, &mut rand::thread_rng())
}

/// Fill-in-the-blank questions: one interior word of a sentence is blanked and becomes
/// the correct option; distractors come from other capitalized terms.
pub fn synthesize_quiz_with_rng<R: Rng>(text: &str, n: usize, rng: &mut R) -> Vec<QuizQuestion> {
    let sentences = split_sentences(text);
    let keywords = capitalized_terms(text);

    let mut eligible: Vec<&String> = sentences.iter().filter(|s| word_count(s) >= MIN_CONCEPT_WORDS).collect();
    if eligible.is_empty() {
        eligible = sentences.iter().filter(|s| word_count(s) >= 3).collect();
    }

    let mut questions: Vec<QuizQuestion> = eligible
        .into_iter()
        .enumerate()
        .filter_map(|(i, sentence)| blank_question(sentence, i, &keywords, &mut *rng))
        .take(n)
        .collect();

    if questions.is_empty() && n > 0 {
        questions.push(placeholder_question(text, &keywords));
    }
    questions
}

fn blank_question<R: Rng>(
    sentence: &str,
    offset: usize,
    keywords: &[String],
    rng: &mut R,
) -> Option<QuizQuestion> {
    let words: Vec<&str> = sentence.split_whitespace().collect();
    if words.len() < 3 {
        return None;
    }

    let interior = 1..words.len() - 1;
    let mut candidates: Vec<usize> = interior
        .clone()
        .filter(|&i| {
            let w = clean_word(words[i]);
            !w.is_empty() && !is_stop_word(w)
        })
        .collect();
    if candidates.is_empty() {
        candidates = interior.filter(|&i| !clean_word(words[i]).is_empty()).collect();
    }
    if candidates.is_empty() {
        return None;
    }

    let blank_idx = candidates[rng.gen_range(0..candidates.len())];
    let answer = clean_word(words[blank_idx]).to_string();

    let blanked: Vec<String> = words
        .iter()
        .enumerate()
        .map(|(i, w)| if i == blank_idx { w.replacen(&answer, "_____", 1) } else { w.to_string() })
        .collect();

    let distractors = pick_distractors(&answer, keywords, offset);
    let correct_answer = OptionLabel::ALL[rng.gen_range(0..OptionLabel::ALL.len())];

    Some(QuizQuestion {
        question: format!("Fill in the blank: {}", blanked.join(" ")),
        options: arrange_options(&answer, &distractors, correct_answer),
        correct_answer,
        explanation: format!("The complete sentence is: {}", sentence),
    })
}

/// Three distinct distractors, cycling through the keywords from `offset`.
fn pick_distractors(answer: &str, keywords: &[String], offset: usize) -> Vec<String> {
    let pool: Vec<&String> = keywords.iter().filter(|k| !k.eq_ignore_ascii_case(answer)).collect();
    let mut picked: Vec<String> = Vec::with_capacity(3);

    for k in 0..pool.len() {
        if picked.len() == 3 {
            break;
        }
        let candidate = pool[(offset + k) % pool.len()];
        if !picked.iter().any(|p| p.eq_ignore_ascii_case(candidate)) {
            picked.push(candidate.clone());
        }
    }

    for fallback in FALLBACK_DISTRACTORS {
        if picked.len() == 3 {
            break;
        }
        if !fallback.eq_ignore_ascii_case(answer) && !picked.iter().any(|p| p == fallback) {
            picked.push(fallback.to_string());
        }
    }
    picked
}

fn arrange_options(answer: &str, distractors: &[String], correct: OptionLabel) -> QuizOptions {
    let mut remaining = distractors.iter();
    let options: BTreeMap<OptionLabel, String> = OptionLabel::ALL
        .into_iter()
        .map(|label| {
            let text = if label == correct {
                answer.to_string()
            } else {
                remaining.next().cloned().unwrap_or_default()
            };
            (label, text)
        })
        .collect();
    QuizOptions::from_partial(options)
}

fn placeholder_question(text: &str, keywords: &[String]) -> QuizQuestion {
    let answer = keywords
        .first()
        .cloned()
        .or_else(|| text.split_whitespace().map(clean_word).find(|w| !w.is_empty()).map(str::to_string))
        .unwrap_or_else(|| "The study material".to_string());
    let distractors = pick_distractors(&answer, &[], 0);

    QuizQuestion {
        question: "Which of the following appears in the study material?".to_string(),
        options: arrange_options(&answer, &distractors, OptionLabel::A),
        correct_answer: OptionLabel::A,
        explanation: GENERIC_EXPLANATION.to_string(),
    }
}

/// Split the text into `max_sections` note sections, or one per sentence when there are fewer.
pub fn synthesize_notes(text: &str, max_sections: usize) -> Vec<NoteSection> {
    let sentences = split_sentences(text);
    if sentences.is_empty() {
        let mut section = NoteSection::titled("Topic 1");
        section.definition = "No content was available for this section.".to_string();
        return vec![section];
    }

    // One section per chunk; the first `extra` chunks take one sentence more.
    let sections = max_sections.clamp(1, sentences.len());
    let base = sentences.len() / sections;
    let extra = sentences.len() % sections;

    let mut start = 0;
    (0..sections)
        .map(|i| {
            let end = start + base + usize::from(i < extra);
            let section = note_section(i, &sentences[start..end]);
            start = end;
            section
        })
        .collect()
}

fn note_section(index: usize, chunk: &[String]) -> NoteSection {
    let chunk_text = chunk.join(" ");
    let title = section_title(&chunk_text).unwrap_or_else(|| format!("Topic {}", index + 1));

    let mut section = NoteSection::titled(title);
    section.definition = chunk[0].clone();

    let rest = &chunk[1..];
    let mut key_point_idx = Vec::new();
    for (i, sentence) in rest.iter().enumerate() {
        if key_point_idx.len() == 3 {
            break;
        }
        if word_count(sentence) >= MIN_KEY_POINT_WORDS {
            key_point_idx.push(i);
        }
    }
    section.key_points = key_point_idx.iter().map(|&i| rest[i].clone()).collect();
    section.content = rest
        .iter()
        .enumerate()
        .filter(|(i, _)| !key_point_idx.contains(i))
        .map(|(_, s)| s.as_str())
        .collect::<Vec<_>>()
        .join(" ");

    section.examples = sentences_with(chunk, &EXAMPLE_MARKERS);
    if section.examples.is_empty() {
        section.examples.push("No specific examples were given in this section.".to_string());
    }
    section.diagram_references = sentences_with(chunk, &DIAGRAM_MARKERS);
    section
}

/// Most frequent capitalized bigram, skipping ones made of stop words.
fn section_title(text: &str) -> Option<String> {
    let bigrams = CAPITALIZED_BIGRAM
        .captures_iter(text)
        .filter(|caps| !is_stop_word(&caps[1]) && !is_stop_word(&caps[2]))
        .map(|caps| format!("{} {}", &caps[1], &caps[2]));
    rank_by_frequency(bigrams).into_iter().next()
}

fn sentences_with(sentences: &[String], markers: &[&str]) -> Vec<String> {
    sentences
        .iter()
        .filter(|s| {
            let lower = s.to_lowercase();
            markers.iter().any(|m| lower.contains(m))
        })
        .cloned()
        .collect()
}

fn title_case(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
