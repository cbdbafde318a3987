//! Artifact records produced by the pipeline.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// ============================================================================
// Resources
// ============================================================================

/// A suggested external learning resource.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceItem {
    pub title: String,
    /// Resource kind as reported by the provider (Article, Video, Course, Book, ...).
    #[serde(rename = "type")]
    pub resource_type: String,
    pub description: String,
    pub url: String,
}

/// Wrapper matching the `{"resources": [...]}` output shape.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResourceList {
    pub resources: Vec<ResourceItem>,
}

impl ResourceList {
    pub fn new(resources: Vec<ResourceItem>) -> Self {
        Self { resources }
    }

    pub fn len(&self) -> usize {
        self.resources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }
}

// ============================================================================
// Study guide
// ============================================================================

/// A term and its definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeyTerm {
    pub term: String,
    pub definition: String,
}

impl KeyTerm {
    pub fn new(term: impl Into<String>, definition: impl Into<String>) -> Self {
        Self {
            term: term.into(),
            definition: definition.into(),
        }
    }
}

/// A question/answer card.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Flashcard {
    pub question: String,
    pub answer: String,
}

impl Flashcard {
    pub fn new(question: impl Into<String>, answer: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            answer: answer.into(),
        }
    }
}

/// Key terms, concepts and flashcards for one transcript.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StudyGuide {
    #[serde(default)]
    pub key_terms: Vec<KeyTerm>,
    #[serde(default)]
    pub important_concepts: Vec<String>,
    #[serde(default)]
    pub flashcards: Vec<Flashcard>,
}

impl StudyGuide {
    /// True when none of the three sections has any entry.
    pub fn is_empty(&self) -> bool {
        self.key_terms.is_empty() && self.important_concepts.is_empty() && self.flashcards.is_empty()
    }

    /// Cap every section to at most `max` entries.
    pub fn truncate(&mut self, max: usize) {
        self.key_terms.truncate(max);
        self.important_concepts.truncate(max);
        self.flashcards.truncate(max);
    }
}

/// Wrapper matching the `{"study_guide": {...}}` output shape.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StudyGuideDoc {
    pub study_guide: StudyGuide,
}

// ============================================================================
// Quiz
// ============================================================================

/// Label of a multiple-choice option.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum OptionLabel {
    A,
    B,
    C,
    D,
}

impl OptionLabel {
    pub const ALL: [OptionLabel; 4] = [OptionLabel::A, OptionLabel::B, OptionLabel::C, OptionLabel::D];

    pub fn as_char(self) -> char {
        match self {
            OptionLabel::A => 'A',
            OptionLabel::B => 'B',
            OptionLabel::C => 'C',
            OptionLabel::D => 'D',
        }
    }

    /// Parse a label from a letter, case-insensitively.
    pub fn from_char(c: char) -> Option<Self> {
        match c.to_ascii_uppercase() {
            'A' => Some(OptionLabel::A),
            'B' => Some(OptionLabel::B),
            'C' => Some(OptionLabel::C),
            'D' => Some(OptionLabel::D),
            _ => None,
        }
    }

    pub fn index(self) -> usize {
        self as usize
    }
}

impl std::fmt::Display for OptionLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

impl std::str::FromStr for OptionLabel {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let mut chars = s.trim().chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Self::from_char(c).ok_or_else(|| format!("Unknown option label: {}", s)),
            _ => Err(format!("Unknown option label: {}", s)),
        }
    }
}

/// Exactly four answer options, serialized as `{"A": .., "B": .., "C": .., "D": ..}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizOptions {
    #[serde(rename = "A")]
    pub a: String,
    #[serde(rename = "B")]
    pub b: String,
    #[serde(rename = "C")]
    pub c: String,
    #[serde(rename = "D")]
    pub d: String,
}

impl QuizOptions {
    pub fn new(a: impl Into<String>, b: impl Into<String>, c: impl Into<String>, d: impl Into<String>) -> Self {
        Self {
            a: a.into(),
            b: b.into(),
            c: c.into(),
            d: d.into(),
        }
    }

    /// Build from whatever options were produced, padding missing labels with `Option X`.
    pub fn from_partial(mut partial: BTreeMap<OptionLabel, String>) -> Self {
        let mut take = |label: OptionLabel| {
            partial
                .remove(&label)
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| format!("Option {}", label))
        };
        Self {
            a: take(OptionLabel::A),
            b: take(OptionLabel::B),
            c: take(OptionLabel::C),
            d: take(OptionLabel::D),
        }
    }

    pub fn get(&self, label: OptionLabel) -> &str {
        match label {
            OptionLabel::A => &self.a,
            OptionLabel::B => &self.b,
            OptionLabel::C => &self.c,
            OptionLabel::D => &self.d,
        }
    }

    /// Iterate `(label, text)` pairs in label order.
    pub fn iter(&self) -> impl Iterator<Item = (OptionLabel, &str)> {
        OptionLabel::ALL.into_iter().map(move |label| (label, self.get(label)))
    }

    /// Find the label whose text matches `text`, ignoring case and surrounding whitespace.
    pub fn label_of(&self, text: &str) -> Option<OptionLabel> {
        let needle = text.trim();
        self.iter()
            .find(|(_, option)| option.trim().eq_ignore_ascii_case(needle))
            .map(|(label, _)| label)
    }
}

/// A multiple-choice question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuizQuestion {
    pub question: String,
    pub options: QuizOptions,
    pub correct_answer: OptionLabel,
    pub explanation: String,
}

impl QuizQuestion {
    /// Text of the correct option.
    pub fn correct_text(&self) -> &str {
        self.options.get(self.correct_answer)
    }
}

/// Wrapper matching the `{"quiz": [...]}` output shape.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Quiz {
    pub quiz: Vec<QuizQuestion>,
}

impl Quiz {
    pub fn new(quiz: Vec<QuizQuestion>) -> Self {
        Self { quiz }
    }

    pub fn len(&self) -> usize {
        self.quiz.len()
    }

    pub fn is_empty(&self) -> bool {
        self.quiz.is_empty()
    }
}

// ============================================================================
// Notes
// ============================================================================

/// One section of the detailed topic notes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NoteSection {
    pub topic: String,
    pub definition: String,
    #[serde(default)]
    pub key_points: Vec<String>,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub examples: Vec<String>,
    #[serde(default)]
    pub diagram_references: Vec<String>,
}

impl NoteSection {
    pub fn titled(topic: impl Into<String>) -> Self {
        Self {
            topic: topic.into(),
            definition: String::new(),
            key_points: Vec::new(),
            content: String::new(),
            examples: Vec::new(),
            diagram_references: Vec::new(),
        }
    }
}

/// Wrapper matching the `{"notes": [...]}` output shape.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Notes {
    pub notes: Vec<NoteSection>,
}

impl Notes {
    pub fn new(notes: Vec<NoteSection>) -> Self {
        Self { notes }
    }

    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }
}
